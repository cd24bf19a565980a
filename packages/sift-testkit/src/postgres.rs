use std::str::FromStr;

use serde_json::Value;
use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection, PgPoolOptions},
};
use uuid::Uuid;

use crate::{Error, PG_DSN_VAR, Result, error::pg};

/// A throwaway pgvector database holding a `documents` table and the `match_documents` function
/// the relational backend calls.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	pool: PgPool,
	dropped: bool,
}
impl TestDatabase {
	/// Creates the database and installs the fixture for `dimensions`-wide embeddings.
	pub async fn create(base_dsn: &str, dimensions: u32) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::InvalidEnv { var: PG_DSN_VAR, message: err.to_string() })?;
		let (maintenance, mut conn) = maintenance_connection(&base).await?;
		let name = format!("sift_test_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
			.await
			.map_err(pg("create the database"))?;
		conn.close().await.map_err(pg("close the maintenance connection"))?;

		let options = base.database(&name);
		let dsn = options.to_url_lossy().to_string();
		let pool = PgPoolOptions::new()
			.max_connections(2)
			.connect_with(options)
			.await
			.map_err(pg("connect to the test database"))?;
		let db = Self { name, dsn, maintenance, pool, dropped: false };

		sqlx::raw_sql(match_documents_sql(dimensions).as_str())
			.execute(&db.pool)
			.await
			.map_err(pg("install match_documents"))?;

		Ok(db)
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Inserts one row into `documents` and returns its id.
	pub async fn insert_document(
		&self,
		content: &str,
		metadata: Value,
		embedding: &[f32],
	) -> Result<i64> {
		let literal = format!(
			"[{}]",
			embedding.iter().map(f32::to_string).collect::<Vec<_>>().join(",")
		);
		let (id,): (i64,) = sqlx::query_as(
			"\
INSERT INTO documents (content, metadata, embedding)
VALUES ($1, $2, $3::text::vector)
RETURNING id",
		)
		.bind(content)
		.bind(metadata)
		.bind(literal)
		.fetch_one(&self.pool)
		.await
		.map_err(pg("insert a document"))?;

		Ok(id)
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.pool.close().await;

		let result = drop_database(&self.name, &self.maintenance).await;

		self.dropped = result.is_ok();

		result
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();

		crate::run_detached("Test database cleanup", async move {
			drop_database(&name, &maintenance).await
		});
	}
}

/// Mirrors the production function: cosine similarity, a server-side threshold, and a JSONB
/// containment filter.
fn match_documents_sql(dimensions: u32) -> String {
	format!(
		"\
CREATE EXTENSION IF NOT EXISTS vector;
CREATE TABLE documents (
	id bigserial PRIMARY KEY,
	content text,
	metadata jsonb NOT NULL DEFAULT '{{}}'::jsonb,
	embedding vector({dimensions})
);
CREATE FUNCTION match_documents(
	query_embedding vector({dimensions}),
	match_threshold float,
	match_count int,
	filter jsonb
)
RETURNS TABLE (id bigint, content text, metadata jsonb, similarity float)
LANGUAGE sql STABLE
AS $$
	SELECT
		documents.id,
		documents.content,
		documents.metadata,
		1 - (documents.embedding <=> query_embedding) AS similarity
	FROM documents
	WHERE documents.metadata @> filter
		AND 1 - (documents.embedding <=> query_embedding) > match_threshold
	ORDER BY documents.embedding <=> query_embedding
	LIMIT match_count
$$;"
	)
}

async fn maintenance_connection(
	base: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let primary = base.clone().database("postgres");

	if let Ok(conn) = PgConnection::connect_with(&primary).await {
		return Ok((primary, conn));
	}

	let fallback = base.clone().database("template1");
	let conn = PgConnection::connect_with(&fallback)
		.await
		.map_err(pg("connect to a maintenance database"))?;

	Ok((fallback, conn))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance)
		.await
		.map_err(pg("reconnect for cleanup"))?;

	sqlx::query(
		"\
SELECT pg_terminate_backend(pid)
FROM pg_stat_activity
WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await
	.map_err(pg("end open sessions"))?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str())
		.await
		.map_err(pg("drop the database"))?;

	Ok(())
}
