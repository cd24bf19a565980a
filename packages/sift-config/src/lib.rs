mod error;
mod relations;
mod types;

pub use error::{Error, Result};
pub use relations::RelationsMap;
pub use types::{
	Config, EmbeddingProviderConfig, Postgres, Providers, Qdrant, Relations, Search, SearchFanout,
	Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.default_collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.default_collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.search.target_collections.is_empty() {
		return Err(Error::Validation {
			message: "search.target_collections must be non-empty.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for collection in &cfg.search.target_collections {
		if collection.trim().is_empty() {
			return Err(Error::Validation {
				message: "search.target_collections entries must be non-empty.".to_string(),
			});
		}
		if !seen.insert(collection.as_str()) {
			return Err(Error::Validation {
				message: format!("search.target_collections lists {collection} more than once."),
			});
		}
	}

	if cfg.search.fanout.collection_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.fanout.collection_timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

/// Parses `relations.map_json`. An absent or blank value is an empty map.
pub fn relations_map(cfg: &Config) -> Result<RelationsMap> {
	match cfg.relations.map_json.as_deref() {
		Some(raw) => RelationsMap::parse(raw),
		None => Ok(RelationsMap::default()),
	}
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.vector_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.qdrant.vector_name = None;
	}
	if cfg.relations.map_json.as_deref().map(|raw| raw.trim().is_empty()).unwrap_or(false) {
		cfg.relations.map_json = None;
	}

	for collection in &mut cfg.search.target_collections {
		let trimmed = collection.trim();

		if trimmed.len() != collection.len() {
			*collection = trimmed.to_string();
		}
	}
}
