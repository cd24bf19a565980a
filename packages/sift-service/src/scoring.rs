use crate::{Candidate, lexical::LexicalFeatures};

pub const KEYWORD_BOOST: f64 = 0.1;
pub const BIGRAM_BOOST: f64 = 0.02;
/// Candidates must score strictly above this to survive single-collection search.
pub const FINAL_SCORE_CUTOFF: f64 = 0.6;

/// Similarity plus an additive boost per query keyword and per bigram found verbatim in the
/// content. The result is not normalised and may exceed 1.0.
pub fn hybrid_score(candidate: &Candidate, features: &LexicalFeatures) -> f64 {
	let content = candidate.content.as_str();
	let keyword_hits =
		features.keywords.iter().filter(|keyword| content.contains(keyword.as_str())).count();
	let bigram_hits =
		features.bigrams.iter().filter(|bigram| content.contains(bigram.as_str())).count();

	candidate.similarity + KEYWORD_BOOST * keyword_hits as f64 + BIGRAM_BOOST * bigram_hits as f64
}

/// Scores every candidate, drops those at or below the cutoff, then keeps the first
/// `return_count` in descending score order. Equal scores keep their fetch order.
pub fn rank_candidates(
	candidates: Vec<Candidate>,
	features: &LexicalFeatures,
	return_count: usize,
) -> Vec<Candidate> {
	let mut ranked: Vec<Candidate> = candidates
		.into_iter()
		.filter_map(|mut candidate| {
			let score = hybrid_score(&candidate, features);

			if score > FINAL_SCORE_CUTOFF {
				candidate.final_score = Some(score);

				Some(candidate)
			} else {
				None
			}
		})
		.collect();

	ranked.sort_by(|a, b| {
		let a = a.final_score.unwrap_or(f64::NEG_INFINITY);
		let b = b.final_score.unwrap_or(f64::NEG_INFINITY);

		b.total_cmp(&a)
	});
	ranked.truncate(return_count);

	ranked
}
