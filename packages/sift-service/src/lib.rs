pub mod enrich;
pub mod fetch;
pub mod lexical;
pub mod scoring;
pub mod search;
pub mod selector;
pub mod summary;
pub mod types;

mod error;

pub use error::{Error, Result};
pub use types::{Backend, Candidate, EnrichedRecord, RecordIds, SearchQuery};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};

use sift_config::{Config, EmbeddingProviderConfig, RelationsMap};
use sift_providers::embedding;
use sift_storage::{
	db::Db,
	models::{FetchedRecord, MatchedDocument, StoredPoint},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Nearest-neighbour search and id lookups over named collections.
pub trait VectorStore
where
	Self: Send + Sync,
{
	fn near_vector<'a>(
		&'a self,
		collection: &'a str,
		vector: &'a [f32],
		limit: u64,
	) -> BoxFuture<'a, sift_storage::Result<Vec<StoredPoint>>>;

	fn fetch_with_references<'a>(
		&'a self,
		collection: &'a str,
		ids: &'a [String],
		edge: Option<&'a str>,
	) -> BoxFuture<'a, sift_storage::Result<Vec<FetchedRecord>>>;
}

/// The relational fallback: a server-side similarity function over stored documents.
pub trait DocumentMatcher
where
	Self: Send + Sync,
{
	fn match_documents<'a>(
		&'a self,
		embedding: &'a [f32],
		match_threshold: f64,
		match_count: u32,
		filter: &'a Map<String, Value>,
	) -> BoxFuture<'a, sift_storage::Result<Vec<MatchedDocument>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

#[derive(Clone)]
pub struct Backends {
	pub vector: Arc<dyn VectorStore>,
	pub relational: Arc<dyn DocumentMatcher>,
}

pub struct SiftService {
	pub cfg: Config,
	pub relations: RelationsMap,
	pub backends: Backends,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl VectorStore for QdrantStore {
	fn near_vector<'a>(
		&'a self,
		collection: &'a str,
		vector: &'a [f32],
		limit: u64,
	) -> BoxFuture<'a, sift_storage::Result<Vec<StoredPoint>>> {
		Box::pin(QdrantStore::near_vector(self, collection, vector, limit))
	}

	fn fetch_with_references<'a>(
		&'a self,
		collection: &'a str,
		ids: &'a [String],
		edge: Option<&'a str>,
	) -> BoxFuture<'a, sift_storage::Result<Vec<FetchedRecord>>> {
		Box::pin(QdrantStore::fetch_with_references(self, collection, ids, edge))
	}
}

impl DocumentMatcher for Db {
	fn match_documents<'a>(
		&'a self,
		embedding: &'a [f32],
		match_threshold: f64,
		match_count: u32,
		filter: &'a Map<String, Value>,
	) -> BoxFuture<'a, sift_storage::Result<Vec<MatchedDocument>>> {
		Box::pin(Db::match_documents(self, embedding, match_threshold, match_count, filter))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

impl SiftService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let backends = Backends { vector: Arc::new(qdrant), relational: Arc::new(db) };

		Self::with_backends(cfg, backends, Providers::default())
	}

	pub fn with_backends(cfg: Config, backends: Backends, providers: Providers) -> Self {
		let relations = load_relations(&cfg);

		Self { cfg, relations, backends, providers }
	}

	/// Embeds one query text. Any provider failure is fatal to the request.
	pub(crate) async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&query.to_string()))
			.await?;
		let query_vec = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if query_vec.len() != self.cfg.providers.embedding.dimensions as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(query_vec)
	}
}

pub(crate) fn require_query_text(query_text: &str) -> Result<()> {
	if query_text.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "query_text must be non-empty.".to_string() });
	}

	Ok(())
}

fn load_relations(cfg: &Config) -> RelationsMap {
	match sift_config::relations_map(cfg) {
		Ok(relations) => {
			tracing::info!(edges = relations.len(), "Relations map loaded.");

			relations
		},
		Err(err) => {
			tracing::warn!(error = %err, "Relations map is malformed; enrichment is disabled.");

			RelationsMap::default()
		},
	}
}
