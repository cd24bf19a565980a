use std::sync::Arc;

use sift_service::SiftService;
use sift_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
}
impl AppState {
	pub async fn new(config: sift_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		check_distances(&qdrant, &scored_collections(&config)).await;

		let service = SiftService::new(config, db, qdrant);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: SiftService) -> Self {
		Self { service: Arc::new(service) }
	}
}

/// Every collection whose point scores are read as similarities, in first-seen order.
pub fn scored_collections(config: &sift_config::Config) -> Vec<&str> {
	let mut collections = vec![config.storage.qdrant.default_collection.as_str()];

	for collection in &config.search.target_collections {
		if !collections.contains(&collection.as_str()) {
			collections.push(collection);
		}
	}

	collections
}

/// Point scores are only similarities in `[0, 1]` on cosine collections. Anything else is logged
/// and startup continues.
async fn check_distances(qdrant: &QdrantStore, collections: &[&str]) {
	for &collection in collections {
		match qdrant.collection_distance(collection).await {
			Ok(Some(qdrant_client::qdrant::Distance::Cosine)) => {},
			Ok(distance) => {
				tracing::warn!(
					collection,
					?distance,
					"Collection does not use cosine distance. Scores will not be similarities."
				);
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					collection,
					"Failed to read collection distance metric."
				);
			},
		}
	}
}
