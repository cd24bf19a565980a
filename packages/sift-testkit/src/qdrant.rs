use std::{
	future::Future,
	mem,
	sync::{Mutex, PoisonError},
	time::Duration,
};

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, VectorParamsBuilder,
	},
};
use serde_json::Value;
use tokio::time;
use uuid::Uuid;

use crate::{Error, Result, error::qdrant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SeedPoint {
	pub id: u64,
	pub vector: Vec<f32>,
	/// Must be a JSON object.
	pub payload: Value,
}
impl SeedPoint {
	pub fn new(id: u64, vector: impl Into<Vec<f32>>, payload: Value) -> Self {
		Self { id, vector: vector.into(), payload }
	}
}

/// Uniquely named collections for one test, deleted on cleanup or drop.
pub struct TestCollections {
	url: String,
	client: Qdrant,
	run_id: String,
	created: Mutex<Vec<String>>,
}
impl TestCollections {
	pub fn connect(url: &str) -> Result<Self> {
		let client = Qdrant::from_url(url).build().map_err(qdrant("build a client"))?;

		Ok(Self {
			url: url.to_string(),
			client,
			run_id: Uuid::new_v4().simple().to_string(),
			created: Mutex::new(Vec::new()),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn client(&self) -> &Qdrant {
		&self.client
	}

	/// A name unique to this run. Nothing is created until [`Self::seed`].
	pub fn name(&self, prefix: &str) -> String {
		format!("sift_test_{prefix}_{}", self.run_id)
	}

	/// Creates a cosine collection of `dimensions`-wide unnamed vectors and upserts `points`.
	pub async fn seed(&self, name: &str, dimensions: u64, points: Vec<SeedPoint>) -> Result<()> {
		let mut structs = Vec::with_capacity(points.len());

		for SeedPoint { id, vector, payload } in points {
			let payload = Payload::try_from(payload).map_err(|_| Error::InvalidPayload { id })?;

			structs.push(PointStruct::new(id, vector, payload));
		}

		bounded(
			format!("creating {name}"),
			self.client.create_collection(
				CreateCollectionBuilder::new(name)
					.vectors_config(VectorParamsBuilder::new(dimensions, Distance::Cosine)),
			),
		)
		.await?
		.map_err(qdrant("create a collection"))?;
		self.created.lock().unwrap_or_else(PoisonError::into_inner).push(name.to_string());
		bounded(
			format!("seeding {name}"),
			self.client.upsert_points(UpsertPointsBuilder::new(name, structs).wait(true)),
		)
		.await?
		.map_err(qdrant("upsert points"))?;

		Ok(())
	}

	pub async fn cleanup(self) -> Result<()> {
		let names = self.take_created();

		delete_collections(&self.client, &names).await
	}

	fn take_created(&self) -> Vec<String> {
		mem::take(&mut *self.created.lock().unwrap_or_else(PoisonError::into_inner))
	}
}
impl Drop for TestCollections {
	fn drop(&mut self) {
		let names = self.take_created();

		if names.is_empty() {
			return;
		}

		let url = self.url.clone();

		crate::run_detached("Qdrant collection cleanup", async move {
			let client = Qdrant::from_url(&url).build().map_err(qdrant("build a client"))?;

			delete_collections(&client, &names).await
		});
	}
}

async fn bounded<T>(step: String, request: impl Future<Output = T>) -> Result<T> {
	time::timeout(REQUEST_TIMEOUT, request).await.map_err(|_| Error::Timeout { step })
}

async fn delete_collections(client: &Qdrant, names: &[String]) -> Result<()> {
	for name in names {
		bounded(format!("deleting {name}"), client.delete_collection(name.clone()))
			.await?
			.map_err(qdrant("delete a collection"))?;
	}

	Ok(())
}
