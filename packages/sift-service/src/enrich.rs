use sift_storage::models::{FetchedRecord, StoredPoint};

use crate::{
	EnrichedRecord, RecordIds, SiftService,
	fetch::{self, CONTENT_FIELD, FILE_NAME_FIELD},
};

impl SiftService {
	/// Fetches full records plus, when the collection has an outgoing edge, the linked records.
	/// Backend failures are logged and yield an empty list.
	pub async fn fetch_data_by_ids(
		&self,
		collection: &str,
		ids: impl Into<RecordIds>,
	) -> Vec<EnrichedRecord> {
		let ids = ids.into().into_vec();

		if ids.is_empty() {
			return Vec::new();
		}

		let edge = self.relations.edge_for(collection);

		match self.backends.vector.fetch_with_references(collection, &ids, edge).await {
			Ok(records) =>
				records.into_iter().map(|record| enriched_record(collection, record)).collect(),
			Err(err) => {
				tracing::warn!(error = %err, collection, edge, "Enrichment fetch failed.");

				Vec::new()
			},
		}
	}
}

fn enriched_record(collection: &str, record: FetchedRecord) -> EnrichedRecord {
	let FetchedRecord { point, references } = record;
	let cross_reference =
		references.as_deref().map(format_cross_reference).unwrap_or_default();
	let StoredPoint { id, mut payload, .. } = point;

	EnrichedRecord {
		id,
		table: collection.to_string(),
		file_name: fetch::take_string(&mut payload, FILE_NAME_FIELD),
		content: fetch::take_string(&mut payload, CONTENT_FIELD),
		cross_reference,
	}
}

/// One `[참조 문서: {fileName}] {content}` line per linked record, trailing whitespace trimmed.
pub fn format_cross_reference(references: &[StoredPoint]) -> String {
	let mut out = String::new();

	for reference in references {
		let field = |key: &str| reference.payload.get(key).and_then(|value| value.as_str());

		out.push_str(&format!(
			"[참조 문서: {}] {}\n",
			field(FILE_NAME_FIELD).unwrap_or_default(),
			field(CONTENT_FIELD).unwrap_or_default(),
		));
	}

	out.trim_end().to_string()
}
