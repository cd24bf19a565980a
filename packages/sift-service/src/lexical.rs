use std::collections::HashSet;

const MIN_KEYWORD_CHARS: usize = 2;

/// Lexical features of one query, extracted once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexicalFeatures {
	/// Distinct whitespace-delimited words of at least two characters, in first-seen order.
	pub keywords: Vec<String>,
	pub bigrams: HashSet<String>,
}

pub fn extract(query: &str) -> LexicalFeatures {
	LexicalFeatures { keywords: keyword_tokens(query), bigrams: char_bigrams(query) }
}

/// Words are kept verbatim: no case folding, no stemming.
pub fn keyword_tokens(query: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for word in query.split_whitespace() {
		if word.chars().count() < MIN_KEYWORD_CHARS {
			continue;
		}
		if seen.insert(word) {
			out.push(word.to_string());
		}
	}

	out
}

/// Every overlapping two-character window of `text` after dropping characters outside
/// `[A-Za-z0-9_]` and Hangul.
pub fn char_bigrams(text: &str) -> HashSet<String> {
	let kept: Vec<char> = text.chars().filter(|ch| is_bigram_char(*ch)).collect();

	kept.windows(2).map(|pair| pair.iter().collect()).collect()
}

fn is_bigram_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '_' || is_hangul(ch)
}

// Compatibility jamo (consonants and vowels) plus precomposed syllables.
fn is_hangul(ch: char) -> bool {
	matches!(ch, '\u{3131}'..='\u{3163}' | '\u{AC00}'..='\u{D7A3}')
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set(items: &[&str]) -> HashSet<String> {
		items.iter().map(|item| item.to_string()).collect()
	}

	#[test]
	fn keywords_skip_short_words_and_keep_case() {
		let keywords = keyword_tokens("CEO 신년사 a 2026 신년사 ceo");

		assert_eq!(keywords, vec!["CEO", "신년사", "2026", "ceo"]);
	}

	#[test]
	fn keywords_count_characters_not_bytes() {
		assert_eq!(keyword_tokens("식 대 식대"), vec!["식대"]);
	}

	#[test]
	fn bigrams_strip_punctuation_and_whitespace() {
		let bigrams = char_bigrams("학자금 지급?");

		assert_eq!(bigrams, set(&["학자", "자금", "금지", "지급"]));
	}

	#[test]
	fn bigrams_keep_jamo_digits_and_underscore() {
		assert_eq!(char_bigrams("ㅋㅏ_1"), set(&["ㅋㅏ", "ㅏ_", "_1"]));
	}

	#[test]
	fn bigrams_deduplicate() {
		assert_eq!(char_bigrams("aaaa"), set(&["aa"]));
	}

	#[test]
	fn short_input_yields_no_bigrams() {
		assert!(char_bigrams("").is_empty());
		assert!(char_bigrams("가").is_empty());
		assert!(char_bigrams("가 !? 。").is_empty());
	}

	#[test]
	fn extraction_is_idempotent() {
		for query in ["학자금 지급대상이 누구야?", "야근 식대 한도", "", "x", "2026년 신년사!!"] {
			assert_eq!(extract(query), extract(query));
		}
	}
}
