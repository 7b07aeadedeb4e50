mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, Favorites, LocalSourceConfig, RemoteSourceConfig, Service, Sources,
};

use std::{fs, path::Path};

use serde_json::{Map, Value};

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
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	for (label, base) in [
		("sources.remote.api_base", &cfg.sources.remote.api_base),
		("sources.local.api_base", &cfg.sources.local.api_base),
	] {
		if !(base.starts_with("http://") || base.starts_with("https://")) {
			return Err(Error::Validation {
				message: format!("{label} must start with http:// or https://."),
			});
		}
	}

	if cfg.sources.remote.default_term.is_empty() {
		return Err(Error::Validation {
			message: "sources.remote.default_term must be non-empty.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("sources.remote.timeout_ms", cfg.sources.remote.timeout_ms),
		("sources.local.timeout_ms", cfg.sources.local.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	validate_headers("sources.remote.default_headers", &cfg.sources.remote.default_headers)?;
	validate_headers("sources.local.default_headers", &cfg.sources.local.default_headers)?;

	if cfg.cache.stale_after_ms == 0 {
		return Err(Error::Validation {
			message: "cache.stale_after_ms must be greater than zero.".to_string(),
		});
	}

	let backend = cfg.favorites.backend.as_str();

	if !matches!(backend, "file" | "memory") {
		return Err(Error::Validation {
			message: "favorites.backend must be one of file or memory.".to_string(),
		});
	}
	if backend == "file" && cfg.favorites.dir.is_none() {
		return Err(Error::Validation {
			message: "favorites.dir is required when favorites.backend is file.".to_string(),
		});
	}
	if cfg.favorites.key.is_empty()
		|| cfg.favorites.key == "."
		|| cfg.favorites.key == ".."
		|| cfg.favorites.key.contains(['/', '\\'])
	{
		return Err(Error::Validation {
			message: "favorites.key must be a plain name without path separators.".to_string(),
		});
	}
	if cfg.favorites.poll_interval_ms == 0 {
		return Err(Error::Validation {
			message: "favorites.poll_interval_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	if headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation { message: format!("{label} values must be strings.") });
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for base in [&mut cfg.sources.remote.api_base, &mut cfg.sources.local.api_base] {
		let trimmed = base.trim().trim_end_matches('/').to_string();

		*base = trimmed;
	}

	cfg.sources.remote.default_term = cfg.sources.remote.default_term.trim().to_string();
	cfg.favorites.key = cfg.favorites.key.trim().to_string();

	if cfg.favorites.dir.as_ref().map(|dir| dir.as_os_str().is_empty()).unwrap_or(false) {
		cfg.favorites.dir = None;
	}
}
