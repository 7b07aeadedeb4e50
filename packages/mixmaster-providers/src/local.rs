//! The user-owned catalog behind the backend REST process.
//!
//! Every response is wrapped as `{ "success": bool, "data": ..., "error": "..." }`. Ingredient
//! links and instructions are present on the wire but are not part of the canonical record.

use reqwest::{StatusCode, Url};
use serde_json::Value;

use mixmaster_config::LocalSourceConfig;
use mixmaster_domain::{CanonicalRecord, SourceKind};

use crate::{Error, Result};

/// Lists the catalog, constrained by `term` when it is non-empty.
pub async fn search(cfg: &LocalSourceConfig, term: &str) -> Result<Vec<CanonicalRecord>> {
	let client = crate::client(cfg.timeout_ms, &cfg.default_headers)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut req = client.get(url);

	if !term.trim().is_empty() {
		req = req.query(&[("search", term)]);
	}

	let json: Value = req.send().await?.error_for_status()?.json().await?;
	let data = unwrap_envelope(json)?;
	let Value::Array(items) = data else {
		return Err(Error::InvalidResponse {
			message: "Local catalog data must be an array.".to_string(),
		});
	};

	Ok(items.iter().filter_map(map_record).collect())
}

pub async fn get(cfg: &LocalSourceConfig, id: &str) -> Result<Option<CanonicalRecord>> {
	let client = crate::client(cfg.timeout_ms, &cfg.default_headers)?;
	let res = client.get(record_url(cfg, id)?).send().await?;

	if res.status() == StatusCode::NOT_FOUND {
		return Ok(None);
	}

	let json: Value = res.error_for_status()?.json().await?;
	let data = unwrap_envelope(json)?;

	Ok(map_record(&data))
}

fn record_url(cfg: &LocalSourceConfig, id: &str) -> Result<Url> {
	let base = format!("{}{}", cfg.api_base, cfg.path);
	let mut url = Url::parse(&base).map_err(|err| Error::InvalidConfig {
		message: format!("sources.local api_base and path do not form a URL: {err}."),
	})?;

	url.path_segments_mut()
		.map_err(|_| Error::InvalidConfig {
			message: "sources.local api_base cannot carry a path.".to_string(),
		})?
		.pop_if_empty()
		.push(id);

	Ok(url)
}

fn unwrap_envelope(mut json: Value) -> Result<Value> {
	let success = json.get("success").and_then(Value::as_bool).unwrap_or(false);

	if !success {
		let message = json
			.get("error")
			.and_then(Value::as_str)
			.unwrap_or("Local catalog reported failure.")
			.to_string();

		return Err(Error::InvalidResponse { message });
	}

	json.get_mut("data").map(Value::take).ok_or_else(|| Error::InvalidResponse {
		message: "Local catalog response is missing data.".to_string(),
	})
}

fn map_record(item: &Value) -> Option<CanonicalRecord> {
	let record = CanonicalRecord::from_parts(
		SourceKind::Local,
		crate::str_field(item, "id"),
		crate::str_field(item, "name"),
		crate::str_field(item, "image"),
		crate::str_field(item, "alcoholic"),
		crate::str_field(item, "category"),
		crate::str_field(item, "glass"),
	);

	if record.is_none() {
		tracing::debug!(item = %item, "Dropping local cocktail without id or name.");
	}

	record
}
