use serde_json::{Map, Value};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, models::MatchedDocument};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &sift_config::Postgres) -> Result<Self> {
		let pool =
			PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	/// Calls the server-side `match_documents` function. The server applies `match_threshold`
	/// before any row is returned.
	pub async fn match_documents(
		&self,
		embedding: &[f32],
		match_threshold: f64,
		match_count: u32,
		filter: &Map<String, Value>,
	) -> Result<Vec<MatchedDocument>> {
		let match_count = i32::try_from(match_count).map_err(|_| {
			crate::Error::InvalidArgument("match_count does not fit in an integer.".to_string())
		})?;
		let rows = sqlx::query_as::<_, MatchedDocument>(
			"\
SELECT
	content::text AS content,
	metadata::jsonb AS metadata,
	similarity::float8 AS similarity
FROM match_documents($1::text::vector, $2, $3, $4)",
		)
		.bind(vector_to_pg(embedding))
		.bind(match_threshold)
		.bind(match_count)
		.bind(Value::Object(filter.clone()))
		.fetch_all(&self.pool)
		.await?;

		Ok(rows)
	}
}

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}
