use serde::{Deserialize, Serialize};

use crate::{CatalogService, SourceOutcome};
use mixmaster_domain::{CanonicalRecord, FilterSpec};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	#[serde(default)]
	pub term: String,
	#[serde(default)]
	pub filter: FilterSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
	pub remote: SourceOutcome,
	pub local: SourceOutcome,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
	pub items: Vec<CanonicalRecord>,
	/// Categories across the whole aggregate, before filtering.
	pub categories: Vec<String>,
	pub sources: SourceReport,
}

impl CatalogService {
	/// Aggregates `req.term` through the cache and narrows it by `req.filter`.
	pub async fn search(&self, req: SearchRequest) -> SearchResponse {
		let aggregate = self.aggregate(&req.term).await;
		let items = self.filter(&aggregate.records, &req.filter);
		let categories = mixmaster_domain::category_options(&aggregate.records);

		tracing::debug!(
			term = req.term.as_str(),
			total = aggregate.records.len(),
			shown = items.len(),
			"Search served."
		);

		SearchResponse {
			items,
			categories,
			sources: SourceReport {
				remote: aggregate.remote.clone(),
				local: aggregate.local.clone(),
			},
		}
	}
}
