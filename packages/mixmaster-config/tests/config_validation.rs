use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use mixmaster_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &[&str], key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for name in section {
		table = table
			.get_mut(*name)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{name}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("mixmaster_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> mixmaster_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = mixmaster_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads_with_defaults() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string()).expect("Config must load.");

	assert_eq!(cfg.sources.remote.api_base, "https://www.thecocktaildb.com/api/json/v1/1");
	assert_eq!(cfg.sources.remote.search_path, "/search.php");
	assert_eq!(cfg.sources.remote.default_term, "a");
	assert_eq!(cfg.sources.local.path, "/api/cocktails");
	assert_eq!(cfg.cache.stale_after_ms, 300_000);
	assert_eq!(cfg.favorites.key, "favoriteCocktails");
	assert_eq!(cfg.favorites.poll_interval_ms, 500);
	assert!(cfg.favorites.watch);
}

#[test]
fn missing_file_reports_read_error() {
	let err = mixmaster_config::load(&PathBuf::from("/nonexistent/mixmaster.toml"))
		.expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn api_base_must_be_http() {
	let payload =
		sample_toml_with(&["sources", "remote"], "api_base", Value::String("ftp://x".into()));
	let err = load_payload(payload).expect_err("Expected api_base validation error.");

	assert!(
		err.to_string().contains("sources.remote.api_base must start with http:// or https://."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_term_must_not_be_blank() {
	let payload =
		sample_toml_with(&["sources", "remote"], "default_term", Value::String("   ".into()));
	let err = load_payload(payload).expect_err("Expected default_term validation error.");

	assert!(
		err.to_string().contains("sources.remote.default_term must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn stale_window_must_be_positive() {
	let payload = sample_toml_with(&["cache"], "stale_after_ms", Value::Integer(0));
	let err = load_payload(payload).expect_err("Expected stale window validation error.");

	assert!(
		err.to_string().contains("cache.stale_after_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn file_backend_requires_dir() {
	let mut cfg = base_config();

	cfg.favorites.dir = None;

	let err = mixmaster_config::validate(&cfg).expect_err("Expected favorites.dir error.");

	assert!(
		err.to_string().contains("favorites.dir is required when favorites.backend is file."),
		"Unexpected error: {err}"
	);

	cfg.favorites.backend = "memory".to_string();

	assert!(mixmaster_config::validate(&cfg).is_ok());
}

#[test]
fn unknown_backend_is_rejected() {
	let mut cfg = base_config();

	cfg.favorites.backend = "redis".to_string();

	let err = mixmaster_config::validate(&cfg).expect_err("Expected backend error.");

	assert!(
		err.to_string().contains("favorites.backend must be one of file or memory."),
		"Unexpected error: {err}"
	);
}

#[test]
fn favorites_key_must_be_file_safe() {
	for key in ["", "..", "nested/key", "win\\key"] {
		let mut cfg = base_config();

		cfg.favorites.key = key.to_string();

		assert!(mixmaster_config::validate(&cfg).is_err(), "Key {key:?} must be rejected.");
	}
}

#[test]
fn poll_interval_must_be_positive() {
	let mut cfg = base_config();

	cfg.favorites.poll_interval_ms = 0;

	let err = mixmaster_config::validate(&cfg).expect_err("Expected poll interval error.");

	assert!(
		err.to_string().contains("favorites.poll_interval_ms must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn header_values_must_be_strings() {
	let payload = sample_toml_with(&["sources", "local", "default_headers"], "x-retry", Value::Integer(3));
	let err = load_payload(payload).expect_err("Expected header validation error.");

	assert!(
		err.to_string().contains("sources.local.default_headers values must be strings."),
		"Unexpected error: {err}"
	);
}
