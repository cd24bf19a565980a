use std::collections::HashMap;

use crate::{Error, Result};

/// Collection name to the single outgoing cross-reference edge followed during enrichment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationsMap {
	edges: HashMap<String, String>,
}
impl RelationsMap {
	pub fn new(edges: HashMap<String, String>) -> Self {
		Self { edges }
	}

	pub fn parse(raw: &str) -> Result<Self> {
		let edges: HashMap<String, String> =
			serde_json::from_str(raw).map_err(|err| Error::ParseRelations { source: err })?;

		Ok(Self { edges })
	}

	/// Exact-name lookup. `None` means the collection is not enriched.
	pub fn edge_for(&self, collection: &str) -> Option<&str> {
		self.edges.get(collection).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.edges.is_empty()
	}
}
