use std::sync::Arc;

use mixmaster_config::Config;
use mixmaster_service::{CatalogService, SyncGuard};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CatalogService>,
	sync: Arc<SyncGuard>,
}
impl AppState {
	/// Opens the configured favorites medium and starts favorite sync. Needs a tokio runtime.
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let medium = mixmaster_service::open_medium(&config.favorites)?;

		Ok(Self::with_service(CatalogService::new(config, medium)))
	}

	pub fn with_service(service: CatalogService) -> Self {
		let sync = service.start_favorite_sync();

		Self { service: Arc::new(service), sync: Arc::new(sync) }
	}

	pub fn favorites_syncing(&self) -> bool {
		self.sync.is_running()
	}
}
