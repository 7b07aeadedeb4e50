pub mod aggregate;
pub mod cache;
pub mod favorites;
pub mod lookup;
pub mod search;

mod error;

pub use aggregate::{AggregationResult, Aggregator, SourceOutcome};
pub use cache::{QueryCache, normalize_term};
pub use error::{Error, Result};
pub use favorites::{FavoriteStore, SyncGuard, open_medium};
pub use search::{SearchRequest, SearchResponse, SourceReport};

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use mixmaster_config::{Config, LocalSourceConfig, RemoteSourceConfig};
use mixmaster_domain::{CanonicalRecord, FavoriteSet, FilterSpec};
use mixmaster_providers::{local, remote};
use mixmaster_storage::KeyValueStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type SourceResult<T> = mixmaster_providers::Result<T>;

pub trait RemoteCatalog
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
		term: &'a str,
	) -> BoxFuture<'a, SourceResult<Vec<CanonicalRecord>>>;

	fn lookup<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
		id: &'a str,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>>;

	fn random<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>>;
}

pub trait LocalCatalog
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a LocalSourceConfig,
		term: &'a str,
	) -> BoxFuture<'a, SourceResult<Vec<CanonicalRecord>>>;

	fn get<'a>(
		&'a self,
		cfg: &'a LocalSourceConfig,
		id: &'a str,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>>;
}

#[derive(Clone)]
pub struct Sources {
	pub remote: Arc<dyn RemoteCatalog>,
	pub local: Arc<dyn LocalCatalog>,
}
impl Sources {
	pub fn new(remote: Arc<dyn RemoteCatalog>, local: Arc<dyn LocalCatalog>) -> Self {
		Self { remote, local }
	}
}
impl Default for Sources {
	fn default() -> Self {
		let sources = Arc::new(HttpSources);

		Self { remote: sources.clone(), local: sources }
	}
}

/// The rendering boundary: aggregation through the query cache, filtering, and favorites.
pub struct CatalogService {
	pub cfg: Arc<Config>,
	pub sources: Sources,
	pub cache: QueryCache,
	pub favorites: FavoriteStore,
}
impl CatalogService {
	pub fn new(cfg: Config, medium: Arc<dyn KeyValueStore>) -> Self {
		Self::with_sources(cfg, medium, Sources::default())
	}

	pub fn with_sources(cfg: Config, medium: Arc<dyn KeyValueStore>, sources: Sources) -> Self {
		let cfg = Arc::new(cfg);
		let aggregator = Aggregator::new(cfg.clone(), sources.clone());
		let cache =
			QueryCache::new(aggregator, Duration::from_millis(cfg.cache.stale_after_ms));
		let favorites = FavoriteStore::open(
			medium,
			cfg.favorites.key.clone(),
			Duration::from_millis(cfg.favorites.poll_interval_ms),
		);

		Self { cfg, sources, cache, favorites }
	}

	/// The cached aggregate for `term`. Never fails; failed sources contribute nothing.
	pub async fn aggregate(&self, term: &str) -> Arc<AggregationResult> {
		self.cache.get_or_fetch(term).await
	}

	/// Filters against the current favorite snapshot.
	pub fn filter(&self, records: &[CanonicalRecord], spec: &FilterSpec) -> Vec<CanonicalRecord> {
		mixmaster_domain::filter(records, spec, &self.favorites.snapshot())
	}

	pub fn is_favorite(&self, id: &str) -> bool {
		self.favorites.is_favorite(id)
	}

	pub fn toggle_favorite(&self, id: &str) -> bool {
		self.favorites.toggle(id)
	}

	pub fn favorites_snapshot(&self) -> FavoriteSet {
		self.favorites.snapshot()
	}

	/// Starts cross-context favorite reconciliation. Keep the guard for the lifetime of the view.
	pub fn start_favorite_sync(&self) -> SyncGuard {
		self.favorites.start_sync()
	}

	/// Drops every cached aggregate, e.g. after the local catalog was written.
	pub fn invalidate(&self) {
		self.cache.invalidate_all();
	}
}

struct HttpSources;

impl RemoteCatalog for HttpSources {
	fn search<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
		term: &'a str,
	) -> BoxFuture<'a, SourceResult<Vec<CanonicalRecord>>> {
		Box::pin(remote::search(cfg, term))
	}

	fn lookup<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
		id: &'a str,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>> {
		Box::pin(remote::lookup(cfg, id))
	}

	fn random<'a>(
		&'a self,
		cfg: &'a RemoteSourceConfig,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>> {
		Box::pin(remote::random(cfg))
	}
}

impl LocalCatalog for HttpSources {
	fn search<'a>(
		&'a self,
		cfg: &'a LocalSourceConfig,
		term: &'a str,
	) -> BoxFuture<'a, SourceResult<Vec<CanonicalRecord>>> {
		Box::pin(local::search(cfg, term))
	}

	fn get<'a>(
		&'a self,
		cfg: &'a LocalSourceConfig,
		id: &'a str,
	) -> BoxFuture<'a, SourceResult<Option<CanonicalRecord>>> {
		Box::pin(local::get(cfg, id))
	}
}
