mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	path::Path,
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use axum::{
	Json, Router,
	extract::{Path as UrlPath, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing,
};
use serde_json::{Map, Value};
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::oneshot};

use mixmaster_config::{
	Cache, Config, Favorites, LocalSourceConfig, RemoteSourceConfig, Service, Sources,
};

/// A unique directory under the system temp dir, removed on drop.
pub struct TestDir {
	dir: TempDir,
}
impl TestDir {
	pub fn new(prefix: &str) -> Result<Self> {
		let dir = tempfile::Builder::new().prefix(&format!("{prefix}_")).tempdir()?;

		Ok(Self { dir })
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}
}

#[derive(Default)]
struct MockState {
	remote_drinks: Mutex<Vec<Value>>,
	local_cocktails: Mutex<Vec<Value>>,
	remote_failing: AtomicBool,
	local_failing: AtomicBool,
	remote_hits: AtomicUsize,
	local_hits: AtomicUsize,
	remote_terms: Mutex<Vec<String>>,
	local_terms: Mutex<Vec<Option<String>>>,
}

/// An in-process server that speaks both catalog wire formats.
///
/// The remote provider lives under `/remote` and the local backend under `/local/api/cocktails`.
pub struct MockCatalog {
	base: String,
	state: Arc<MockState>,
	shutdown: Option<oneshot::Sender<()>>,
}
impl MockCatalog {
	pub async fn start() -> Result<Self> {
		let state = Arc::new(MockState::default());
		let app = Router::new()
			.route("/remote/search.php", routing::get(remote_search))
			.route("/remote/lookup.php", routing::get(remote_lookup))
			.route("/remote/random.php", routing::get(remote_random))
			.route("/local/api/cocktails", routing::get(local_list))
			.route("/local/api/cocktails/{id}", routing::get(local_get))
			.with_state(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await?;
		let addr = listener.local_addr()?;
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		Ok(Self { base: format!("http://{addr}"), state, shutdown: Some(tx) })
	}

	pub fn remote_base(&self) -> String {
		format!("{}/remote", self.base)
	}

	pub fn local_base(&self) -> String {
		format!("{}/local", self.base)
	}

	pub fn set_remote_drinks(&self, drinks: Vec<Value>) {
		*lock(&self.state.remote_drinks) = drinks;
	}

	pub fn set_local_cocktails(&self, cocktails: Vec<Value>) {
		*lock(&self.state.local_cocktails) = cocktails;
	}

	pub fn set_remote_failing(&self, failing: bool) {
		self.state.remote_failing.store(failing, Ordering::SeqCst);
	}

	pub fn set_local_failing(&self, failing: bool) {
		self.state.local_failing.store(failing, Ordering::SeqCst);
	}

	pub fn remote_hits(&self) -> usize {
		self.state.remote_hits.load(Ordering::SeqCst)
	}

	pub fn local_hits(&self) -> usize {
		self.state.local_hits.load(Ordering::SeqCst)
	}

	/// Search terms the remote endpoint received, in arrival order.
	pub fn remote_terms(&self) -> Vec<String> {
		lock(&self.state.remote_terms).clone()
	}

	/// `search` parameters the local endpoint received; `None` for an unconstrained list.
	pub fn local_terms(&self) -> Vec<Option<String>> {
		lock(&self.state.local_terms).clone()
	}
}
impl Drop for MockCatalog {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

pub fn remote_drink(id: &str, name: &str, alcoholic: &str, category: &str) -> Value {
	serde_json::json!({
		"idDrink": id,
		"strDrink": name,
		"strDrinkThumb": format!("https://img.example/{id}.jpg"),
		"strAlcoholic": alcoholic,
		"strCategory": category,
		"strGlass": "Cocktail glass",
		"strInstructions": "Shake with ice.",
		"strIngredient1": "Lime juice",
	})
}

pub fn local_cocktail(id: &str, name: &str, alcoholic: &str, category: &str) -> Value {
	serde_json::json!({
		"id": id,
		"name": name,
		"category": category,
		"alcoholic": alcoholic,
		"glass": "Highball glass",
		"instructions": "Build over ice.",
		"image": format!("https://img.example/{id}.jpg"),
		"ingredients": [
			{ "measure": "1 oz", "ingredient": { "id": format!("{id}-i1"), "name": "Soda" } }
		],
	})
}

/// A valid config pointing both sources at `catalog` with in-memory favorites.
pub fn sample_config(catalog: &MockCatalog) -> Config {
	config_with_bases(catalog.remote_base(), catalog.local_base())
}

/// A valid config pointing at arbitrary source bases, for tests that stub the sources.
pub fn config_with_bases(remote_base: String, local_base: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		sources: Sources {
			remote: RemoteSourceConfig {
				api_base: remote_base,
				search_path: "/search.php".to_string(),
				lookup_path: "/lookup.php".to_string(),
				random_path: "/random.php".to_string(),
				default_term: "a".to_string(),
				timeout_ms: 2_000,
				default_headers: Map::new(),
			},
			local: LocalSourceConfig {
				api_base: local_base,
				path: "/api/cocktails".to_string(),
				timeout_ms: 2_000,
				default_headers: Map::new(),
			},
		},
		cache: Cache { stale_after_ms: 300_000 },
		favorites: Favorites {
			backend: "memory".to_string(),
			dir: None,
			key: "favoriteCocktails".to_string(),
			poll_interval_ms: 500,
			watch: true,
		},
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn name_matches(item: &Value, key: &str, term: &str) -> bool {
	item.get(key)
		.and_then(Value::as_str)
		.map(|name| name.to_lowercase().contains(&term.to_lowercase()))
		.unwrap_or(false)
}

fn drinks_body(drinks: Vec<Value>) -> Json<Value> {
	if drinks.is_empty() {
		return Json(serde_json::json!({ "drinks": null }));
	}

	Json(serde_json::json!({ "drinks": drinks }))
}

async fn remote_search(
	State(state): State<Arc<MockState>>,
	Query(params): Query<HashMap<String, String>>,
) -> Response {
	state.remote_hits.fetch_add(1, Ordering::SeqCst);

	if state.remote_failing.load(Ordering::SeqCst) {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let term = params.get("s").cloned().unwrap_or_default();

	lock(&state.remote_terms).push(term.clone());

	let drinks: Vec<Value> = lock(&state.remote_drinks)
		.iter()
		.filter(|drink| name_matches(drink, "strDrink", &term))
		.cloned()
		.collect();

	drinks_body(drinks).into_response()
}

async fn remote_lookup(
	State(state): State<Arc<MockState>>,
	Query(params): Query<HashMap<String, String>>,
) -> Response {
	if state.remote_failing.load(Ordering::SeqCst) {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let id = params.get("i").cloned().unwrap_or_default();
	let drinks: Vec<Value> = lock(&state.remote_drinks)
		.iter()
		.filter(|drink| drink.get("idDrink").and_then(Value::as_str) == Some(id.as_str()))
		.cloned()
		.collect();

	drinks_body(drinks).into_response()
}

async fn remote_random(State(state): State<Arc<MockState>>) -> Response {
	if state.remote_failing.load(Ordering::SeqCst) {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let drinks: Vec<Value> = lock(&state.remote_drinks).iter().take(1).cloned().collect();

	drinks_body(drinks).into_response()
}

async fn local_list(
	State(state): State<Arc<MockState>>,
	Query(params): Query<HashMap<String, String>>,
) -> Response {
	state.local_hits.fetch_add(1, Ordering::SeqCst);

	if state.local_failing.load(Ordering::SeqCst) {
		return (
			StatusCode::INTERNAL_SERVER_ERROR,
			Json(serde_json::json!({ "success": false, "error": "database unavailable" })),
		)
			.into_response();
	}

	let search = params.get("search").cloned();

	lock(&state.local_terms).push(search.clone());

	let cocktails: Vec<Value> = lock(&state.local_cocktails)
		.iter()
		.filter(|item| search.as_deref().map(|term| name_matches(item, "name", term)).unwrap_or(true))
		.cloned()
		.collect();

	Json(serde_json::json!({ "success": true, "data": cocktails })).into_response()
}

async fn local_get(State(state): State<Arc<MockState>>, UrlPath(id): UrlPath<String>) -> Response {
	if state.local_failing.load(Ordering::SeqCst) {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let found = lock(&state.local_cocktails)
		.iter()
		.find(|item| item.get("id").and_then(Value::as_str) == Some(id.as_str()))
		.cloned();

	match found {
		Some(item) => Json(serde_json::json!({ "success": true, "data": item })).into_response(),
		None => (
			StatusCode::NOT_FOUND,
			Json(serde_json::json!({ "success": false, "error": "Cocktail not found" })),
		)
			.into_response(),
	}
}

#[cfg(test)]
mod tests {
	use super::TestDir;

	#[test]
	fn test_dir_is_unique_and_removed_on_drop() {
		let first = TestDir::new("mixmaster_testkit").expect("Failed to create test dir.");
		let second = TestDir::new("mixmaster_testkit").expect("Failed to create test dir.");
		let path = first.path().to_path_buf();

		assert!(path.is_dir());
		assert_ne!(first.path(), second.path());
		assert!(
			path.file_name()
				.and_then(|name| name.to_str())
				.is_some_and(|name| name.starts_with("mixmaster_testkit_"))
		);

		drop(first);

		assert!(!path.exists());
	}
}
