use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	#[serde(default)]
	pub relations: Relations,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Every collection searched through Qdrant must use cosine distance, since point scores are read
/// directly as similarities. `sift-api` logs a warning at startup for any collection that does not.
#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	/// Collection queried by single-collection search on the Qdrant backend.
	pub default_collection: String,
	/// Named dense vector to query. Unnamed collections leave this unset.
	pub vector_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Search order for multi-collection search. Earlier entries win ties.
	pub target_collections: Vec<String>,
	#[serde(default)]
	pub fanout: SearchFanout,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchFanout {
	pub collection_timeout_ms: u64,
}
impl Default for SearchFanout {
	fn default() -> Self {
		Self { collection_timeout_ms: 5_000 }
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct Relations {
	/// JSON object mapping a collection name to its cross-reference edge name.
	pub map_json: Option<String>,
}
