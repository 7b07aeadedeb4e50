use std::time::Duration;

use mixmaster_storage::{Error, FileStore, KeyValueStore};
use mixmaster_testkit::TestDir;

#[test]
fn missing_key_reads_as_none() {
	let dir = TestDir::new("mixmaster_storage").expect("Failed to create test dir.");
	let store = FileStore::open(dir.path(), false).expect("Failed to open store.");

	assert_eq!(store.get("favoriteCocktails").expect("get failed"), None);
}

#[test]
fn values_are_shared_between_handles() {
	let dir = TestDir::new("mixmaster_storage").expect("Failed to create test dir.");
	let writer = FileStore::open(dir.path(), false).expect("Failed to open store.");
	let reader = FileStore::open(dir.path(), false).expect("Failed to open store.");

	writer.set("favoriteCocktails", "[\"11007\"]").expect("set failed");
	writer.set("favoriteCocktails", "[\"11007\",\"11008\"]").expect("set failed");

	assert_eq!(
		reader.get("favoriteCocktails").expect("get failed").as_deref(),
		Some("[\"11007\",\"11008\"]")
	);

	let leftovers = std::fs::read_dir(dir.path())
		.expect("Failed to list dir.")
		.filter_map(Result::ok)
		.filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
		.count();

	assert_eq!(leftovers, 0);
}

#[test]
fn rejects_path_like_keys() {
	let dir = TestDir::new("mixmaster_storage").expect("Failed to create test dir.");
	let store = FileStore::open(dir.path(), false).expect("Failed to open store.");
	let err = store.set("../escape", "[]").expect_err("Expected invalid key.");

	assert!(matches!(err, Error::InvalidKey(_)));
}

#[test]
fn unwatched_store_has_no_subscription() {
	let dir = TestDir::new("mixmaster_storage").expect("Failed to create test dir.");
	let store = FileStore::open(dir.path(), false).expect("Failed to open store.");

	assert!(store.subscribe("favoriteCocktails").expect("subscribe failed").is_none());
}

#[tokio::test]
async fn watcher_signals_writes_from_another_handle() {
	let dir = TestDir::new("mixmaster_storage").expect("Failed to create test dir.");
	let watched = FileStore::open(dir.path(), true).expect("Failed to open store.");
	let other = FileStore::open(dir.path(), false).expect("Failed to open store.");
	let mut subscription = watched
		.subscribe("favoriteCocktails")
		.expect("subscribe failed")
		.expect("watching store must subscribe");

	other.set("favoriteCocktails", "[\"17222\"]").expect("set failed");

	let signal = tokio::time::timeout(Duration::from_secs(5), subscription.changed())
		.await
		.expect("Timed out waiting for a change signal.");

	assert_eq!(signal, Some(()));
}
