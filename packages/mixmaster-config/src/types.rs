use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub sources: Sources,
	#[serde(default)]
	pub cache: Cache,
	pub favorites: Favorites,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sources {
	pub remote: RemoteSourceConfig,
	pub local: LocalSourceConfig,
}

/// The read-only provider catalog. Paths are appended to `api_base`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSourceConfig {
	pub api_base: String,
	#[serde(default = "default_search_path")]
	pub search_path: String,
	#[serde(default = "default_lookup_path")]
	pub lookup_path: String,
	#[serde(default = "default_random_path")]
	pub random_path: String,
	/// Sent instead of an empty search term; the provider rejects unconstrained searches.
	#[serde(default = "default_term")]
	pub default_term: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// The user-owned catalog served by the backend REST process.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalSourceConfig {
	pub api_base: String,
	#[serde(default = "default_local_path")]
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub stale_after_ms: u64,
}
impl Default for Cache {
	fn default() -> Self {
		Self { stale_after_ms: 300_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Favorites {
	/// One of `file` or `memory`.
	pub backend: String,
	pub dir: Option<PathBuf>,
	#[serde(default = "default_favorites_key")]
	pub key: String,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	#[serde(default = "default_watch")]
	pub watch: bool,
}

fn default_search_path() -> String {
	"/search.php".to_string()
}

fn default_lookup_path() -> String {
	"/lookup.php".to_string()
}

fn default_random_path() -> String {
	"/random.php".to_string()
}

fn default_term() -> String {
	"a".to_string()
}

fn default_local_path() -> String {
	"/api/cocktails".to_string()
}

fn default_favorites_key() -> String {
	"favoriteCocktails".to_string()
}

fn default_poll_interval_ms() -> u64 {
	500
}

fn default_watch() -> bool {
	true
}
