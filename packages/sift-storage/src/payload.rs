use std::collections::HashMap;

use qdrant_client::qdrant::{PointId, Value, point_id::PointIdOptions, value::Kind};
use serde_json::{Map, Number};

use crate::models::PointRef;

pub fn payload_to_json(payload: HashMap<String, Value>) -> Map<String, serde_json::Value> {
	payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect()
}

pub fn value_to_json(value: Value) -> serde_json::Value {
	match value.kind {
		None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
		Some(Kind::BoolValue(flag)) => serde_json::Value::Bool(flag),
		Some(Kind::IntegerValue(number)) => serde_json::Value::from(number),
		Some(Kind::DoubleValue(number)) =>
			Number::from_f64(number).map(serde_json::Value::Number).unwrap_or_default(),
		Some(Kind::StringValue(text)) => serde_json::Value::String(text),
		Some(Kind::ListValue(list)) =>
			serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => serde_json::Value::Object(payload_to_json(object.fields)),
	}
}

pub fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Num(id)) => Some(id.to_string()),
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		None => None,
	}
}

/// Qdrant accepts unsigned integers and UUIDs as point ids. Anything else cannot match a point.
pub fn parse_point_id(raw: &str) -> Option<PointId> {
	let trimmed = raw.trim();

	if let Ok(id) = trimmed.parse::<u64>() {
		return Some(PointId::from(id));
	}

	uuid::Uuid::parse_str(trimmed).ok().map(|id| PointId::from(id.to_string()))
}

/// Canonical string form of a point id, matching what Qdrant returns for the same point.
pub fn canonical_point_id(raw: &str) -> Option<String> {
	parse_point_id(raw).as_ref().and_then(point_id_to_string)
}

/// Reads the references stored under `edge`. Each entry is either `{"collection", "id"}` or a bare
/// id that resolves inside `source_collection`. Entries without a valid point id are skipped.
pub fn references_in(
	payload: &Map<String, serde_json::Value>,
	edge: &str,
	source_collection: &str,
) -> Vec<PointRef> {
	let Some(raw) = payload.get(edge) else { return Vec::new() };
	let entries = match raw {
		serde_json::Value::Array(items) => items.iter().collect::<Vec<_>>(),
		serde_json::Value::Null => Vec::new(),
		other => vec![other],
	};
	let mut out = Vec::with_capacity(entries.len());

	for entry in entries {
		let (collection, raw_id) = match entry {
			serde_json::Value::String(id) => (source_collection, id.clone()),
			serde_json::Value::Number(id) => (source_collection, id.to_string()),
			serde_json::Value::Object(object) => {
				let raw_id = match object.get("id") {
					Some(serde_json::Value::String(id)) => id.clone(),
					Some(serde_json::Value::Number(id)) => id.to_string(),
					_ => continue,
				};
				let collection = object
					.get("collection")
					.and_then(serde_json::Value::as_str)
					.unwrap_or(source_collection);

				(collection, raw_id)
			},
			_ => continue,
		};
		let Some(id) = canonical_point_id(&raw_id) else { continue };

		out.push(PointRef { collection: collection.to_string(), id });
	}

	out
}
