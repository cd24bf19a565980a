use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use sift_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

static COUNTER: AtomicU64 = AtomicU64::new(0);

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn table_mut<'a>(value: &'a mut Value, path: &[&str]) -> &'a mut toml::Table {
	let mut current = value.as_table_mut().expect("Template config must be a table.");

	for key in path {
		current = current
			.get_mut(*key)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{key}]."));
	}

	current
}

fn write_temp_config(payload: String) -> PathBuf {
	let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("Clock before epoch.").as_nanos();
	let seq = COUNTER.fetch_add(1, Ordering::SeqCst);
	let path = env::temp_dir().join(format!("sift_config_test_{nanos}_{seq}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_value(value: Value) -> sift_config::Result<Config> {
	let rendered = toml::to_string(&value).expect("Failed to render template config.");
	let path = write_temp_config(rendered);
	let result = sift_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn validation_message(result: sift_config::Result<Config>) -> String {
	match result {
		Err(Error::Validation { message }) => message,
		Err(err) => panic!("Expected validation error, got {err:?}."),
		Ok(_) => panic!("Expected validation error."),
	}
}

#[test]
fn sample_config_loads() {
	let cfg = load_value(sample_value()).expect("Failed to load sample config.");

	assert_eq!(cfg.storage.qdrant.default_collection, "Welfare_Doc");
	assert_eq!(cfg.search.target_collections, vec!["Regulation", "Receipt", "CeoMessage"]);
	assert_eq!(cfg.search.fanout.collection_timeout_ms, 3_000);
	assert!(cfg.storage.qdrant.vector_name.is_none());

	let relations = sift_config::relations_map(&cfg).expect("Failed to parse relations.");

	assert_eq!(relations.edge_for("Receipt"), Some("hasPolicy"));
}

#[test]
fn fanout_and_relations_sections_are_optional() {
	let mut value = sample_value();
	let root = value.as_table_mut().expect("Template config must be a table.");

	root.remove("relations");
	table_mut(&mut value, &["search"]).remove("fanout");

	let cfg = load_value(value).expect("Failed to load config without optional sections.");

	assert_eq!(cfg.search.fanout.collection_timeout_ms, 5_000);
	assert!(sift_config::relations_map(&cfg).expect("Expected empty relations.").is_empty());
}

#[test]
fn blank_relations_json_is_treated_as_absent() {
	let mut value = sample_value();

	table_mut(&mut value, &["relations"])
		.insert("map_json".to_string(), Value::String("   ".to_string()));

	let cfg = load_value(value).expect("Failed to load config.");

	assert!(cfg.relations.map_json.is_none());
}

#[test]
fn malformed_relations_json_is_reported_but_config_loads() {
	let mut value = sample_value();

	table_mut(&mut value, &["relations"])
		.insert("map_json".to_string(), Value::String("{not json".to_string()));

	let cfg = load_value(value).expect("Malformed relations must not fail config load.");

	assert!(matches!(sift_config::relations_map(&cfg), Err(Error::ParseRelations { .. })));
}

#[test]
fn empty_target_collections_are_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["search"])
		.insert("target_collections".to_string(), Value::Array(Vec::new()));

	let message = validation_message(load_value(value));

	assert_eq!(message, "search.target_collections must be non-empty.");
}

#[test]
fn duplicate_target_collections_are_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["search"]).insert(
		"target_collections".to_string(),
		Value::Array(vec![
			Value::String("Receipt".to_string()),
			Value::String(" Receipt ".to_string()),
		]),
	);

	let message = validation_message(load_value(value));

	assert!(message.contains("more than once"), "Unexpected message: {message}");
}

#[test]
fn zero_fanout_timeout_is_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["search", "fanout"])
		.insert("collection_timeout_ms".to_string(), Value::Integer(0));

	let message = validation_message(load_value(value));

	assert_eq!(message, "search.fanout.collection_timeout_ms must be greater than zero.");
}

#[test]
fn blank_api_key_is_rejected() {
	let mut value = sample_value();

	table_mut(&mut value, &["providers", "embedding"])
		.insert("api_key".to_string(), Value::String(" ".to_string()));

	let message = validation_message(load_value(value));

	assert_eq!(message, "Provider embedding api_key must be non-empty.");
}

#[test]
fn blank_vector_name_is_normalized_away() {
	let mut value = sample_value();

	table_mut(&mut value, &["storage", "qdrant"])
		.insert("vector_name".to_string(), Value::String(String::new()));

	let cfg = load_value(value).expect("Failed to load config.");

	assert!(cfg.storage.qdrant.vector_name.is_none());
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("sift_config_missing_file.toml");
	let result = sift_config::load(&path);

	assert!(matches!(result, Err(Error::ReadConfig { .. })));
}
