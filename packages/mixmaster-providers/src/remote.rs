//! The read-only provider catalog (TheCocktailDB response shape).

use serde_json::Value;

use mixmaster_config::RemoteSourceConfig;
use mixmaster_domain::{CanonicalRecord, SourceKind};

use crate::{Error, Result};

/// Searches by free-text term. An empty term is replaced by `cfg.default_term`.
pub async fn search(cfg: &RemoteSourceConfig, term: &str) -> Result<Vec<CanonicalRecord>> {
	let term = if term.trim().is_empty() { cfg.default_term.as_str() } else { term };
	let url = format!("{}{}", cfg.api_base, cfg.search_path);
	let json = get_json(cfg, &url, &[("s", term)]).await?;

	parse_drinks(json)
}

pub async fn lookup(cfg: &RemoteSourceConfig, id: &str) -> Result<Option<CanonicalRecord>> {
	let url = format!("{}{}", cfg.api_base, cfg.lookup_path);
	let json = get_json(cfg, &url, &[("i", id)]).await?;

	Ok(parse_drinks(json)?.into_iter().next())
}

pub async fn random(cfg: &RemoteSourceConfig) -> Result<Option<CanonicalRecord>> {
	let url = format!("{}{}", cfg.api_base, cfg.random_path);
	let json = get_json(cfg, &url, &[]).await?;

	Ok(parse_drinks(json)?.into_iter().next())
}

async fn get_json(cfg: &RemoteSourceConfig, url: &str, query: &[(&str, &str)]) -> Result<Value> {
	let client = crate::client(cfg.timeout_ms, &cfg.default_headers)?;
	let res = client.get(url).query(query).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(json)
}

fn parse_drinks(json: Value) -> Result<Vec<CanonicalRecord>> {
	let drinks = match json.get("drinks") {
		Some(Value::Array(drinks)) => drinks,
		// The provider answers `null` (or an explanatory string) when nothing matches.
		Some(Value::Null) | Some(Value::String(_)) => return Ok(Vec::new()),
		_ => {
			return Err(Error::InvalidResponse {
				message: "Remote catalog response is missing drinks.".to_string(),
			});
		},
	};
	let mut records = Vec::with_capacity(drinks.len());

	for item in drinks {
		let record = CanonicalRecord::from_parts(
			SourceKind::Remote,
			crate::str_field(item, "idDrink"),
			crate::str_field(item, "strDrink"),
			crate::str_field(item, "strDrinkThumb"),
			crate::str_field(item, "strAlcoholic"),
			crate::str_field(item, "strCategory"),
			crate::str_field(item, "strGlass"),
		);

		match record {
			Some(record) => records.push(record),
			None => tracing::debug!(item = %item, "Dropping remote drink without id or name."),
		}
	}

	Ok(records)
}
