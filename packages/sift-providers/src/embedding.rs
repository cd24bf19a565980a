use std::time::Duration;

use color_eyre::{
	Result,
	eyre::{self, WrapErr},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
	model: &'a str,
	input: &'a [String],
	dimensions: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	/// Some compatible servers omit it; list position is used instead.
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` with an OpenAI-compatible embeddings endpoint, returning one vector per input
/// in input order.
pub async fn embed(
	cfg: &sift_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = endpoint_url(&cfg.api_base, &cfg.path);
	let request = EmbeddingRequest { model: &cfg.model, input: texts, dimensions: cfg.dimensions };
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&request)
		.send()
		.await?
		.error_for_status()?;
	let body = res.bytes().await?;

	vectors_in_input_order(&body, texts.len())
		.wrap_err_with(|| format!("Unusable embedding response from {url}."))
}

fn endpoint_url(api_base: &str, path: &str) -> String {
	format!("{}/{}", api_base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn vectors_in_input_order(body: &[u8], expected: usize) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_slice(body)?;
	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);
		let Some(slot) = slots.get_mut(index) else {
			return Err(eyre::eyre!(
				"Embedding index {index} is out of range for {expected} inputs."
			));
		};

		if slot.replace(item.embedding).is_some() {
			return Err(eyre::eyre!("Embedding index {index} was returned twice."));
		}
	}

	slots
		.into_iter()
		.enumerate()
		.map(|(index, slot)| {
			slot.ok_or_else(|| eyre::eyre!("No embedding returned for input {index}."))
		})
		.collect()
}
