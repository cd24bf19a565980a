use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;
const DEFAULT_MATCH_COUNT: u32 = 50;
const DEFAULT_RETURN_COUNT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
	pub query_text: String,
	/// Accepted for compatibility. Neither the relational pre-filter nor the final cutoff reads it.
	#[serde(default = "default_match_threshold")]
	pub match_threshold: f64,
	#[serde(default = "default_match_count")]
	pub match_count: u32,
	#[serde(default = "default_return_count")]
	pub return_count: u32,
	/// Passed through to the relational backend's native filter.
	#[serde(default)]
	pub filter: Map<String, Value>,
	#[serde(default)]
	pub backend: Backend,
}
impl SearchQuery {
	pub fn new(query_text: impl Into<String>) -> Self {
		Self {
			query_text: query_text.into(),
			match_threshold: DEFAULT_MATCH_THRESHOLD,
			match_count: DEFAULT_MATCH_COUNT,
			return_count: DEFAULT_RETURN_COUNT,
			filter: Map::new(),
			backend: Backend::default(),
		}
	}

	pub fn with_backend(mut self, backend: Backend) -> Self {
		self.backend = backend;

		self
	}

	pub fn with_return_count(mut self, return_count: u32) -> Self {
		self.return_count = return_count;

		self
	}
}

/// Backend used by single-collection search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Backend {
	/// Postgres `match_documents`.
	#[default]
	Postgres,
	/// Qdrant default collection.
	Qdrant,
}
impl Backend {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Postgres => "postgres",
			Self::Qdrant => "qdrant",
		}
	}
}

impl FromStr for Backend {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"postgres" | "supabase" => Ok(Self::Postgres),
			"qdrant" | "weaviate" => Ok(Self::Qdrant),
			other => Err(format!("Unknown backend {other:?}; expected postgres or qdrant.")),
		}
	}
}

impl TryFrom<String> for Backend {
	type Error = String;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		raw.parse()
	}
}

impl From<Backend> for String {
	fn from(backend: Backend) -> Self {
		backend.as_str().to_string()
	}
}

impl fmt::Display for Backend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One retrieved item. Every field is resolved when the candidate is built, so downstream code
/// never branches on payload shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub collection: Option<String>,
	#[serde(default)]
	pub content: String,
	#[serde(default, rename = "fileName")]
	pub file_name: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
	pub similarity: f64,
	/// Set by hybrid scoring only.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub final_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
	pub id: String,
	pub table: String,
	#[serde(rename = "fileName")]
	pub file_name: String,
	pub content: String,
	pub cross_reference: String,
}

/// Record ids for enrichment. A single id is the same as a one-element list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordIds {
	One(String),
	Many(Vec<String>),
}
impl RecordIds {
	pub fn into_vec(self) -> Vec<String> {
		match self {
			Self::One(id) => vec![id],
			Self::Many(ids) => ids,
		}
	}
}

impl From<String> for RecordIds {
	fn from(id: String) -> Self {
		Self::One(id)
	}
}

impl From<&str> for RecordIds {
	fn from(id: &str) -> Self {
		Self::One(id.to_string())
	}
}

impl From<Vec<String>> for RecordIds {
	fn from(ids: Vec<String>) -> Self {
		Self::Many(ids)
	}
}

impl From<&[&str]> for RecordIds {
	fn from(ids: &[&str]) -> Self {
		Self::Many(ids.iter().map(|id| id.to_string()).collect())
	}
}

fn default_match_threshold() -> f64 {
	DEFAULT_MATCH_THRESHOLD
}

fn default_match_count() -> u32 {
	DEFAULT_MATCH_COUNT
}

fn default_return_count() -> u32 {
	DEFAULT_RETURN_COUNT
}
