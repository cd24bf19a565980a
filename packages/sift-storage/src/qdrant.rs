use std::collections::{BTreeMap, HashMap};

use qdrant_client::qdrant::{
	Distance, GetPointsBuilder, PointId, Query, QueryPointsBuilder, VectorsConfig, vectors_config,
};

use crate::{
	Result,
	models::{FetchedRecord, PointRef, StoredPoint},
	payload,
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub vector_name: Option<String>,
}
impl QdrantStore {
	pub fn new(cfg: &sift_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, vector_name: cfg.vector_name.clone() })
	}

	/// The distance metric of the vector this store queries in `collection`. `None` when the
	/// collection reports no usable vector config.
	pub async fn collection_distance(&self, collection: &str) -> Result<Option<Distance>> {
		let response = self.client.collection_info(collection).await?;
		let vectors = response
			.result
			.and_then(|info| info.config)
			.and_then(|config| config.params)
			.and_then(|params| params.vectors_config);

		Ok(vectors.and_then(|vectors| vector_distance(&vectors, self.vector_name.as_deref())))
	}

	/// Nearest-neighbour query over one collection. Points without an id are dropped.
	pub async fn near_vector(
		&self,
		collection: &str,
		vector: &[f32],
		limit: u64,
	) -> Result<Vec<StoredPoint>> {
		let mut search = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector.to_vec()))
			.limit(limit)
			.with_payload(true);

		if let Some(name) = self.vector_name.as_deref() {
			search = search.using(name);
		}

		let response = self.client.query(search).await?;
		let points = response
			.result
			.into_iter()
			.filter_map(|point| {
				let id = point.id.as_ref().and_then(payload::point_id_to_string)?;

				Some(StoredPoint {
					id,
					score: Some(point.score),
					payload: payload::payload_to_json(point.payload),
				})
			})
			.collect();

		Ok(points)
	}

	/// Fetches the points whose id is in `ids`. Ids that are not valid Qdrant ids match nothing.
	pub async fn fetch_points(&self, collection: &str, ids: &[String]) -> Result<Vec<StoredPoint>> {
		let point_ids: Vec<PointId> =
			ids.iter().filter_map(|id| payload::parse_point_id(id)).collect();

		if point_ids.is_empty() {
			return Ok(Vec::new());
		}

		let response = self
			.client
			.get_points(GetPointsBuilder::new(collection, point_ids).with_payload(true))
			.await?;
		let points = response
			.result
			.into_iter()
			.filter_map(|point| {
				let id = point.id.as_ref().and_then(payload::point_id_to_string)?;

				Some(StoredPoint { id, score: None, payload: payload::payload_to_json(point.payload) })
			})
			.collect();

		Ok(points)
	}

	/// Fetches records by id and, when `edge` is set, resolves the points each record links to
	/// across that payload field. Each target collection is read once.
	pub async fn fetch_with_references(
		&self,
		collection: &str,
		ids: &[String],
		edge: Option<&str>,
	) -> Result<Vec<FetchedRecord>> {
		let points = self.fetch_points(collection, ids).await?;
		let Some(edge) = edge else {
			return Ok(points
				.into_iter()
				.map(|point| FetchedRecord { point, references: None })
				.collect());
		};
		let refs_by_record: Vec<Vec<PointRef>> = points
			.iter()
			.map(|point| payload::references_in(&point.payload, edge, collection))
			.collect();
		let mut wanted: BTreeMap<&str, Vec<String>> = BTreeMap::new();

		for point_ref in refs_by_record.iter().flatten() {
			let ids = wanted.entry(point_ref.collection.as_str()).or_default();

			if !ids.contains(&point_ref.id) {
				ids.push(point_ref.id.clone());
			}
		}

		let mut resolved: HashMap<PointRef, StoredPoint> = HashMap::new();

		for (target, target_ids) in wanted {
			for linked in self.fetch_points(target, &target_ids).await? {
				resolved.insert(
					PointRef { collection: target.to_string(), id: linked.id.clone() },
					linked,
				);
			}
		}

		let records = points
			.into_iter()
			.zip(refs_by_record)
			.map(|(point, refs)| {
				let references =
					refs.iter().filter_map(|point_ref| resolved.get(point_ref).cloned()).collect();

				FetchedRecord { point, references: Some(references) }
			})
			.collect();

		Ok(records)
	}
}

/// Distance of the unnamed vector, or of `vector_name` when the collection uses named vectors.
pub fn vector_distance(vectors: &VectorsConfig, vector_name: Option<&str>) -> Option<Distance> {
	let params = match (vectors.config.as_ref()?, vector_name) {
		(vectors_config::Config::Params(params), _) => params,
		(vectors_config::Config::ParamsMap(named), Some(name)) => named.map.get(name)?,
		(vectors_config::Config::ParamsMap(_), None) => return None,
	};

	Distance::try_from(params.distance).ok()
}
