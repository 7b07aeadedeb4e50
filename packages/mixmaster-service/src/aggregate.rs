use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{SourceResult, Sources};
use mixmaster_config::Config;
use mixmaster_domain::{CanonicalRecord, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
	Ok { count: usize },
	Failed { message: String },
}
impl SourceOutcome {
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Ok { .. })
	}
}

/// One aggregation pass: remote records first, then local records, each in source order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
	pub records: Vec<CanonicalRecord>,
	pub remote: SourceOutcome,
	pub local: SourceOutcome,
}
impl AggregationResult {
	pub fn empty() -> Self {
		let outcome = SourceOutcome::Ok { count: 0 };

		Self { records: Vec::new(), remote: outcome.clone(), local: outcome }
	}
}

#[derive(Clone)]
pub struct Aggregator {
	cfg: Arc<Config>,
	sources: Sources,
}
impl Aggregator {
	pub fn new(cfg: Arc<Config>, sources: Sources) -> Self {
		Self { cfg, sources }
	}

	/// Queries both sources concurrently and waits for both to settle. Never fails.
	pub async fn aggregate(&self, term: &str) -> AggregationResult {
		let (remote, local) = tokio::join!(
			self.sources.remote.search(&self.cfg.sources.remote, term),
			self.sources.local.search(&self.cfg.sources.local, term),
		);
		let mut records = Vec::new();
		let remote = settle(SourceKind::Remote, term, remote, &mut records);
		let local = settle(SourceKind::Local, term, local, &mut records);

		tracing::debug!(term, total = records.len(), "Aggregation settled.");

		AggregationResult { records, remote, local }
	}
}

fn settle(
	kind: SourceKind,
	term: &str,
	result: SourceResult<Vec<CanonicalRecord>>,
	records: &mut Vec<CanonicalRecord>,
) -> SourceOutcome {
	match result {
		Ok(batch) => {
			let count = batch.len();

			records.extend(batch);

			SourceOutcome::Ok { count }
		},
		Err(err) => {
			tracing::warn!(
				source = %kind,
				term,
				error = %err,
				"Catalog source failed; contributing no records."
			);

			SourceOutcome::Failed { message: err.to_string() }
		},
	}
}
