use std::{sync::Arc, time::Duration};

use tokio::task::JoinSet;

use crate::{Candidate, Result, SiftService, fetch};

/// Nearest points requested from each collection.
pub const PER_COLLECTION_LIMIT: u32 = 3;
pub const DEFAULT_MATCH_COUNT: u32 = 3;

/// What one collection contributed to a fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionHits {
	pub collection: String,
	pub candidates: Vec<Candidate>,
}
impl CollectionHits {
	/// Highest similarity among the candidates, `None` when the collection returned nothing.
	pub fn max_similarity(&self) -> Option<f64> {
		self.candidates.iter().map(|candidate| candidate.similarity).reduce(f64::max)
	}
}

impl SiftService {
	/// Queries every configured collection concurrently and returns the candidates of the single
	/// collection holding the best match.
	pub async fn search_target_table(
		&self,
		query_text: &str,
		match_count: Option<u32>,
	) -> Result<Vec<Candidate>> {
		crate::require_query_text(query_text)?;

		let vector: Arc<[f32]> = self.embed_query(query_text).await?.into();
		let collections = &self.cfg.search.target_collections;
		let timeout = Duration::from_millis(self.cfg.search.fanout.collection_timeout_ms);
		let mut tasks = JoinSet::new();

		for (index, collection) in collections.iter().enumerate() {
			let store = Arc::clone(&self.backends.vector);
			let vector = Arc::clone(&vector);
			let collection = collection.clone();

			tasks.spawn(async move {
				let lookup = fetch::query_collection(
					store.as_ref(),
					&collection,
					&vector,
					PER_COLLECTION_LIMIT,
				);
				let candidates = match tokio::time::timeout(timeout, lookup).await {
					Ok(candidates) => candidates,
					Err(_) => {
						tracing::warn!(
							collection = %collection,
							timeout_ms = timeout.as_millis() as u64,
							"Collection query timed out; skipping."
						);

						Vec::new()
					},
				};

				(index, CollectionHits { collection, candidates })
			});
		}

		let mut slots: Vec<Option<CollectionHits>> = vec![None; collections.len()];

		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok((index, hits)) => slots[index] = Some(hits),
				Err(err) => {
					tracing::warn!(error = %err, "Collection search task failed; skipping.");
				},
			}
		}

		let results: Vec<CollectionHits> = slots.into_iter().flatten().collect();
		let match_count = match_count.unwrap_or(DEFAULT_MATCH_COUNT) as usize;
		let winners = select_winner(results, match_count);

		match winners.first().and_then(|candidate| candidate.collection.as_deref()) {
			Some(collection) => {
				tracing::info!(collection, returned = winners.len(), "Winning collection selected.");
			},
			None => tracing::info!("No collection returned candidates."),
		}

		Ok(winners)
	}
}

/// Winner-take-all over per-collection results given in configured order. Only a strictly
/// greater maximum replaces the current winner, so ties go to the earliest collection. The
/// winner's candidates are sorted by descending similarity (stable) and cut to `match_count`.
pub fn select_winner(results: Vec<CollectionHits>, match_count: usize) -> Vec<Candidate> {
	let mut best: Option<(f64, CollectionHits)> = None;

	for hits in results {
		let Some(max) = hits.max_similarity() else {
			continue;
		};

		if best.as_ref().is_none_or(|(best_max, _)| max > *best_max) {
			best = Some((max, hits));
		}
	}

	let Some((_, winner)) = best else {
		return Vec::new();
	};
	let mut candidates = winner.candidates;

	candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
	candidates.truncate(match_count);

	candidates
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use super::*;

	fn hits(collection: &str, similarities: &[f64]) -> CollectionHits {
		let candidates = similarities
			.iter()
			.enumerate()
			.map(|(i, similarity)| Candidate {
				id: Some(format!("{collection}-{i}")),
				collection: Some(collection.to_string()),
				content: String::new(),
				file_name: String::new(),
				metadata: Map::new(),
				similarity: *similarity,
				final_score: None,
			})
			.collect();

		CollectionHits { collection: collection.to_string(), candidates }
	}

	fn ids(candidates: &[Candidate]) -> Vec<&str> {
		candidates.iter().filter_map(|candidate| candidate.id.as_deref()).collect()
	}

	#[test]
	fn highest_maximum_wins_regardless_of_count() {
		let winners =
			select_winner(vec![hits("A", &[0.80, 0.79, 0.78]), hits("B", &[0.91])], 3);

		assert_eq!(ids(&winners), vec!["B-0"]);
	}

	#[test]
	fn ties_go_to_the_earliest_collection() {
		let winners = select_winner(vec![hits("A", &[0.7, 0.9]), hits("B", &[0.9, 0.8])], 3);

		assert_eq!(ids(&winners), vec!["A-1", "A-0"]);
	}

	#[test]
	fn empty_collections_are_ignored() {
		let winners = select_winner(vec![hits("A", &[]), hits("B", &[0.4]), hits("C", &[])], 3);

		assert_eq!(ids(&winners), vec!["B-0"]);
		assert!(select_winner(vec![hits("A", &[])], 3).is_empty());
		assert!(select_winner(Vec::new(), 3).is_empty());
	}

	#[test]
	fn winner_is_sorted_and_truncated() {
		let winners = select_winner(vec![hits("A", &[0.5, 0.9, 0.5, 0.7])], 3);

		assert_eq!(ids(&winners), vec!["A-1", "A-3", "A-0"]);
	}
}
