use serde_json::{Map, Value};

use sift_storage::models::{MatchedDocument, StoredPoint};

use crate::{Backend, Candidate, Result, SearchQuery, SiftService, VectorStore};

/// Threshold the relational backend applies server-side, deliberately laxer than the final cutoff.
pub const RELATIONAL_PREFILTER_THRESHOLD: f64 = 0.2;

pub(crate) const CONTENT_FIELD: &str = "content";
pub(crate) const FILE_NAME_FIELD: &str = "fileName";
pub(crate) const METADATA_FIELD: &str = "metadata";

const ID_FIELD: &str = "id";

impl SiftService {
	/// Fetches up to `limit` candidates from `backend`. Relational failures propagate; a failing
	/// Qdrant collection yields no candidates.
	pub async fn fetch_vector_candidates(
		&self,
		backend: Backend,
		vector: &[f32],
		query: &SearchQuery,
		limit: u32,
	) -> Result<Vec<Candidate>> {
		match backend {
			Backend::Postgres => {
				let rows = self
					.backends
					.relational
					.match_documents(vector, RELATIONAL_PREFILTER_THRESHOLD, limit, &query.filter)
					.await?;

				Ok(rows.into_iter().map(candidate_from_match).collect())
			},
			Backend::Qdrant => {
				let collection = self.cfg.storage.qdrant.default_collection.as_str();

				Ok(query_collection(self.backends.vector.as_ref(), collection, vector, limit).await)
			},
		}
	}
}

/// One nearest-neighbour query with errors downgraded to an empty result.
pub(crate) async fn query_collection(
	store: &dyn VectorStore,
	collection: &str,
	vector: &[f32],
	limit: u32,
) -> Vec<Candidate> {
	match store.near_vector(collection, vector, u64::from(limit)).await {
		Ok(points) =>
			points.into_iter().map(|point| candidate_from_point(collection, point)).collect(),
		Err(err) => {
			tracing::warn!(error = %err, collection, "Collection query failed; skipping.");

			Vec::new()
		},
	}
}

/// On a cosine collection Qdrant reports similarity as the point score, i.e. `1 - distance`. Other
/// metrics are not supported. A point without a score is treated as distance zero.
pub fn candidate_from_point(collection: &str, point: StoredPoint) -> Candidate {
	let StoredPoint { id, score, mut payload } = point;
	let similarity = score.map(f64::from).unwrap_or(1.0);

	Candidate {
		id: Some(id),
		collection: Some(collection.to_string()),
		content: take_string(&mut payload, CONTENT_FIELD),
		file_name: take_string(&mut payload, FILE_NAME_FIELD),
		metadata: take_object(&mut payload, METADATA_FIELD),
		similarity,
		final_score: None,
	}
}

/// `fileName` and `id` are lifted out of the row metadata when present.
pub fn candidate_from_match(row: MatchedDocument) -> Candidate {
	let metadata = match row.metadata {
		Some(Value::Object(metadata)) => metadata,
		_ => Map::new(),
	};
	let file_name = metadata.get(FILE_NAME_FIELD).and_then(Value::as_str).unwrap_or_default();
	let id = match metadata.get(ID_FIELD) {
		Some(Value::String(id)) => Some(id.clone()),
		Some(Value::Number(id)) => Some(id.to_string()),
		_ => None,
	};

	Candidate {
		id,
		collection: None,
		content: row.content.unwrap_or_default(),
		file_name: file_name.to_string(),
		similarity: row.similarity.unwrap_or(0.0),
		metadata,
		final_score: None,
	}
}

pub(crate) fn take_string(payload: &mut Map<String, Value>, key: &str) -> String {
	match payload.remove(key) {
		Some(Value::String(text)) => text,
		_ => String::new(),
	}
}

fn take_object(payload: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
	match payload.remove(key) {
		Some(Value::Object(object)) => object,
		_ => Map::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn point(score: Option<f32>, payload: Value) -> StoredPoint {
		StoredPoint {
			id: "7".to_string(),
			score,
			payload: payload.as_object().cloned().unwrap_or_default(),
		}
	}

	#[test]
	fn point_payload_is_resolved_into_fields() {
		let candidate = candidate_from_point(
			"Receipt",
			point(
				Some(0.75),
				serde_json::json!({
					"content": "야근 식대 영수증",
					"fileName": "영수증.png",
					"metadata": { "page": 1 },
				}),
			),
		);

		assert_eq!(candidate.id.as_deref(), Some("7"));
		assert_eq!(candidate.collection.as_deref(), Some("Receipt"));
		assert_eq!(candidate.content, "야근 식대 영수증");
		assert_eq!(candidate.file_name, "영수증.png");
		assert_eq!(candidate.metadata["page"], 1);
		assert_eq!(candidate.similarity, 0.75);
		assert!(candidate.final_score.is_none());
	}

	#[test]
	fn missing_or_mistyped_payload_fields_default() {
		let candidate =
			candidate_from_point("Receipt", point(None, serde_json::json!({ "content": 3 })));

		assert_eq!(candidate.content, "");
		assert_eq!(candidate.file_name, "");
		assert!(candidate.metadata.is_empty());
		assert_eq!(candidate.similarity, 1.0);
	}

	#[test]
	fn relational_rows_lift_file_name_and_id() {
		let candidate = candidate_from_match(MatchedDocument {
			content: None,
			metadata: Some(serde_json::json!({ "fileName": "복리후생규정.pdf", "id": 12 })),
			similarity: None,
		});

		assert_eq!(candidate.content, "");
		assert_eq!(candidate.file_name, "복리후생규정.pdf");
		assert_eq!(candidate.id.as_deref(), Some("12"));
		assert_eq!(candidate.similarity, 0.0);
		assert!(candidate.collection.is_none());
	}
}
