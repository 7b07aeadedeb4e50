use std::sync::Arc;

use mixmaster_domain::{AlcoholicStatus, FilterSpec, Selection, SourceKind};
use mixmaster_service::{CatalogService, SearchRequest, SourceOutcome, open_medium};
use mixmaster_storage::MemoryStore;
use mixmaster_testkit::{MockCatalog, TestDir, local_cocktail, remote_drink, sample_config};

async fn seeded_catalog() -> MockCatalog {
	let catalog = MockCatalog::start().await.expect("Failed to start mock catalog.");

	catalog.set_remote_drinks(vec![
		remote_drink("11007", "Margarita", "Alcoholic", "Cocktail"),
		remote_drink("11000", "Mojito", "Alcoholic", "Cocktail"),
		remote_drink("12560", "Afterglow", "Optional alcohol", "Cocktail"),
	]);
	catalog.set_local_cocktails(vec![local_cocktail(
		"7",
		"Virgin Mojito",
		"Non alcoholic",
		"Ordinary Drink",
	)]);

	catalog
}

fn service_for(catalog: &MockCatalog) -> CatalogService {
	CatalogService::new(sample_config(catalog), Arc::new(MemoryStore::new()))
}

fn ids(response: &mixmaster_service::SearchResponse) -> Vec<&str> {
	response.items.iter().map(|record| record.id.as_str()).collect()
}

#[tokio::test]
async fn search_merges_both_catalogs_over_http() {
	let catalog = seeded_catalog().await;
	let service = service_for(&catalog);
	let response = service
		.search(SearchRequest { term: "Mojito".to_string(), filter: FilterSpec::default() })
		.await;

	assert_eq!(ids(&response), vec!["11000", "7"]);
	assert_eq!(response.items[1].source_kind, SourceKind::Local);
	assert_eq!(catalog.remote_terms(), vec!["mojito".to_string()]);
	assert_eq!(catalog.local_terms(), vec![Some("mojito".to_string())]);
}

#[tokio::test]
async fn empty_term_uses_the_default_remote_term() {
	let catalog = seeded_catalog().await;
	let service = service_for(&catalog);
	let response = service.search(SearchRequest::default()).await;

	assert_eq!(catalog.remote_terms(), vec!["a".to_string()]);
	assert_eq!(catalog.local_terms(), vec![None]);
	assert_eq!(ids(&response), vec!["11007", "12560", "7"]);
	assert_eq!(response.items[1].alcoholic_status, None);
}

#[tokio::test]
async fn failing_remote_still_shows_local_records() {
	let catalog = seeded_catalog().await;
	let service = service_for(&catalog);

	catalog.set_remote_failing(true);

	let response = service
		.search(SearchRequest { term: "mojito".to_string(), filter: FilterSpec::default() })
		.await;

	assert_eq!(ids(&response), vec!["7"]);
	assert!(matches!(response.sources.remote, SourceOutcome::Failed { .. }));
	assert_eq!(response.sources.local, SourceOutcome::Ok { count: 1 });
}

#[tokio::test]
async fn repeated_searches_hit_each_source_once() {
	let catalog = seeded_catalog().await;
	let service = service_for(&catalog);
	let spec = FilterSpec {
		alcoholic_type: Selection::Only(AlcoholicStatus::NonAlcoholic),
		..FilterSpec::default()
	};

	for _ in 0..3 {
		let response = service
			.search(SearchRequest { term: "mojito".to_string(), filter: spec.clone() })
			.await;

		assert_eq!(ids(&response), vec!["7"]);
	}

	assert_eq!(catalog.remote_hits(), 1);
	assert_eq!(catalog.local_hits(), 1);

	service.invalidate();
	service.search(SearchRequest { term: "mojito".to_string(), filter: spec }).await;

	assert_eq!(catalog.remote_hits(), 2);
	assert_eq!(catalog.local_hits(), 2);
}

#[tokio::test]
async fn favorites_persist_through_the_file_medium() {
	let catalog = seeded_catalog().await;
	let dir = TestDir::new("mixmaster_service").expect("Failed to create test dir.");
	let mut cfg = sample_config(&catalog);

	cfg.favorites.backend = "file".to_string();
	cfg.favorites.dir = Some(dir.path().to_path_buf());
	cfg.favorites.watch = false;

	let medium = open_medium(&cfg.favorites).expect("Failed to open favorites medium.");
	let service = CatalogService::new(cfg.clone(), medium);

	assert!(service.toggle_favorite("11007"));

	let reopened = CatalogService::new(
		cfg.clone(),
		open_medium(&cfg.favorites).expect("Failed to open favorites medium."),
	);
	let response = reopened
		.search(SearchRequest {
			term: String::new(),
			filter: FilterSpec { favorites_only: true, ..FilterSpec::default() },
		})
		.await;

	assert_eq!(ids(&response), vec!["11007"]);
	assert!(dir.path().join("favoriteCocktails.json").exists());
}

#[tokio::test]
async fn detail_lookups_use_each_source() {
	let catalog = seeded_catalog().await;
	let service = service_for(&catalog);
	let remote = service.record(SourceKind::Remote, "11007").await.expect("remote lookup");
	let local = service.record(SourceKind::Local, "7").await.expect("local lookup");
	let missing = service.record(SourceKind::Local, "999").await.expect("local lookup");

	assert_eq!(remote.map(|record| record.name), Some("Margarita".to_string()));
	assert_eq!(local.map(|record| record.name), Some("Virgin Mojito".to_string()));
	assert!(missing.is_none());
	assert!(service.random().await.is_some());
}

#[test]
fn unknown_backend_is_rejected() {
	let mut cfg = mixmaster_testkit::config_with_bases(
		"http://remote.invalid".to_string(),
		"http://local.invalid".to_string(),
	);

	cfg.favorites.backend = "cloud".to_string();

	assert!(open_medium(&cfg.favorites).is_err());
}
