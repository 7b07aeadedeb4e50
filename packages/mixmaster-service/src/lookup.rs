use crate::{CatalogService, Error, Result};
use mixmaster_domain::{CanonicalRecord, SourceKind};

impl CatalogService {
	/// One record by id from the named source. `Ok(None)` when the source does not know it.
	pub async fn record(&self, kind: SourceKind, id: &str) -> Result<Option<CanonicalRecord>> {
		let id = id.trim();

		if id.is_empty() {
			return Err(Error::InvalidRequest { message: "id is required.".to_string() });
		}

		let record = match kind {
			SourceKind::Remote => self.sources.remote.lookup(&self.cfg.sources.remote, id).await?,
			SourceKind::Local => self.sources.local.get(&self.cfg.sources.local, id).await?,
		};

		Ok(record)
	}

	/// A random remote record, or `None` when the remote source is unavailable.
	pub async fn random(&self) -> Option<CanonicalRecord> {
		match self.sources.remote.random(&self.cfg.sources.remote).await {
			Ok(Some(record)) => Some(record),
			Ok(None) => {
				tracing::warn!("Remote catalog returned no random record.");

				None
			},
			Err(err) => {
				tracing::warn!(error = %err, "Random pick failed.");

				None
			},
		}
	}
}
