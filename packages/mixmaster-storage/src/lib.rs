pub mod file;
pub mod memory;

mod error;

pub use error::Error;
pub use file::FileStore;
pub use memory::MemoryStore;

use tokio::sync::mpsc;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A string key/value medium shared by every context of one user.
///
/// Reads and writes are synchronous. Change notification is optional and only promised for
/// writes made by other contexts.
pub trait KeyValueStore
where
	Self: Send + Sync,
{
	fn get(&self, key: &str) -> Result<Option<String>>;

	fn set(&self, key: &str, value: &str) -> Result<()>;

	/// Returns `Ok(None)` when the medium has no native change notification.
	fn subscribe(&self, key: &str) -> Result<Option<Subscription>>;
}

/// A stream of "the value under this key may have changed" signals. Dropping it unsubscribes.
pub struct Subscription {
	rx: mpsc::UnboundedReceiver<()>,
	_watcher: Option<notify::RecommendedWatcher>,
}
impl Subscription {
	pub(crate) fn new(
		rx: mpsc::UnboundedReceiver<()>,
		watcher: Option<notify::RecommendedWatcher>,
	) -> Self {
		Self { rx, _watcher: watcher }
	}

	/// Resolves on the next signal, or `None` once the medium stops delivering.
	pub async fn changed(&mut self) -> Option<()> {
		self.rx.recv().await
	}
}

pub(crate) fn check_key(key: &str) -> Result<()> {
	if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
		return Err(Error::InvalidKey(key.to_string()));
	}

	Ok(())
}
