use std::collections::HashMap;

use crate::{Candidate, EnrichedRecord, Result, SearchQuery, SiftService};

pub const NO_RELEVANT_DATA: &str = "관련 데이터를 찾을 수 없습니다.";

impl SiftService {
	/// Multi-collection search rendered as one plain-text block, enriched with cross-references
	/// when the winning collection has an edge.
	pub async fn knowledge_summary(&self, query_text: &str) -> Result<String> {
		let winners = self.search_target_table(query_text, None).await?;
		let Some(collection) = winners.first().and_then(|c| c.collection.clone()) else {
			return Ok(NO_RELEVANT_DATA.to_string());
		};
		let ids: Vec<String> = winners.iter().filter_map(|c| c.id.clone()).collect();
		let records = order_by_ranking(self.fetch_data_by_ids(&collection, ids).await, &winners);

		if records.is_empty() {
			tracing::info!(collection = %collection, "Enrichment returned nothing; rendering candidates.");

			return Ok(render_candidates(&collection, &winners));
		}

		Ok(render_records(&collection, &records, &winners))
	}

	/// Single-collection hybrid search rendered as one plain-text block.
	pub async fn search_summary(&self, query: &SearchQuery) -> Result<String> {
		let ranked = self.search_logic(query).await?;

		if ranked.is_empty() {
			return Ok(NO_RELEVANT_DATA.to_string());
		}

		Ok(render_scored(query.backend.as_str(), &ranked))
	}
}

/// Records come back in backend order; put them in the ranking's order and drop strays.
fn order_by_ranking(records: Vec<EnrichedRecord>, ranking: &[Candidate]) -> Vec<EnrichedRecord> {
	let mut by_id: HashMap<String, EnrichedRecord> =
		records.into_iter().map(|record| (record.id.clone(), record)).collect();

	ranking.iter().filter_map(|c| c.id.as_deref().and_then(|id| by_id.remove(id))).collect()
}

pub fn render_records(collection: &str, records: &[EnrichedRecord], ranking: &[Candidate]) -> String {
	let similarity: HashMap<&str, f64> = ranking
		.iter()
		.filter_map(|c| c.id.as_deref().map(|id| (id, c.similarity)))
		.collect();
	let blocks = records.iter().enumerate().map(|(i, record)| {
		let label = format!(
			"similarity {:.3}",
			similarity.get(record.id.as_str()).copied().unwrap_or_default()
		);

		block(i + 1, &record.file_name, &label, &record.content, &record.cross_reference)
	});

	with_header(collection, blocks)
}

pub fn render_candidates(collection: &str, candidates: &[Candidate]) -> String {
	let blocks = candidates.iter().enumerate().map(|(i, c)| {
		block(i + 1, &c.file_name, &format!("similarity {:.3}", c.similarity), &c.content, "")
	});

	with_header(collection, blocks)
}

pub fn render_scored(source: &str, candidates: &[Candidate]) -> String {
	let blocks = candidates.iter().enumerate().map(|(i, c)| {
		let score = c.final_score.unwrap_or(c.similarity);

		block(i + 1, &c.file_name, &format!("score {score:.3}"), &c.content, "")
	});

	with_header(source, blocks)
}

fn with_header(source: &str, blocks: impl Iterator<Item = String>) -> String {
	let mut out = format!("[검색 결과: {source}]\n");
	let body: Vec<String> = blocks.collect();

	out.push_str(&body.join("\n\n"));

	out
}

fn block(rank: usize, file_name: &str, label: &str, content: &str, cross_reference: &str) -> String {
	let mut out = format!("{rank}. {file_name} ({label})\n{content}");

	if !cross_reference.is_empty() {
		out.push('\n');
		out.push_str(cross_reference);
	}

	out
}
