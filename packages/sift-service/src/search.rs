use crate::{Candidate, Result, SearchQuery, SiftService, lexical, scoring};

/// Candidates requested from the backend before hybrid re-ranking.
pub const CANDIDATE_LIMIT: u32 = 200;

impl SiftService {
	/// Single-collection hybrid search: embed, fetch, score, cut off, sort, truncate.
	pub async fn search_logic(&self, query: &SearchQuery) -> Result<Vec<Candidate>> {
		crate::require_query_text(&query.query_text)?;

		let vector = self.embed_query(&query.query_text).await?;
		let candidates =
			self.fetch_vector_candidates(query.backend, &vector, query, CANDIDATE_LIMIT).await?;

		if candidates.is_empty() {
			tracing::info!(backend = %query.backend, "No candidates retrieved.");

			return Ok(Vec::new());
		}

		let fetched = candidates.len();
		let features = lexical::extract(&query.query_text);
		let ranked = scoring::rank_candidates(candidates, &features, query.return_count as usize);

		tracing::info!(
			backend = %query.backend,
			fetched,
			returned = ranked.len(),
			"Hybrid search finished."
		);

		Ok(ranked)
	}
}
