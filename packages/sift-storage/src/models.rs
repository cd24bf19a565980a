use serde_json::{Map, Value};

/// One row of the server-side `match_documents` function.
#[derive(Debug, sqlx::FromRow)]
pub struct MatchedDocument {
	pub content: Option<String>,
	pub metadata: Option<Value>,
	pub similarity: Option<f64>,
}

/// A Qdrant point with its payload converted to JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
	pub id: String,
	/// Present for nearest-neighbour hits, absent for lookups by id.
	pub score: Option<f32>,
	pub payload: Map<String, Value>,
}

/// Target of one cross-reference stored in a point payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointRef {
	pub collection: String,
	pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
	pub point: StoredPoint,
	/// `None` when no edge was requested; otherwise the resolved linked points in payload order.
	pub references: Option<Vec<StoredPoint>>,
}
