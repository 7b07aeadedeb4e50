use std::{
	sync::{Arc, Mutex},
	time::Duration,
};

use tokio::{
	sync::watch,
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};

use crate::{Error, Result};
use mixmaster_config::Favorites;
use mixmaster_domain::FavoriteSet;
use mixmaster_storage::{FileStore, KeyValueStore, MemoryStore, Subscription};

struct Inner {
	medium: Arc<dyn KeyValueStore>,
	key: String,
	poll_interval: Duration,
	snapshot: watch::Sender<FavoriteSet>,
	write: Mutex<()>,
}

/// The favorite set of one execution context, kept in step with the shared medium.
///
/// A context's own toggles land in the snapshot immediately. Writes from other contexts arrive
/// through the medium's change notification when it has one, and through polling regardless.
#[derive(Clone)]
pub struct FavoriteStore {
	inner: Arc<Inner>,
}
impl FavoriteStore {
	pub fn open(
		medium: Arc<dyn KeyValueStore>,
		key: impl Into<String>,
		poll_interval: Duration,
	) -> Self {
		let key = key.into();
		let initial = match medium.get(&key) {
			Ok(raw) => FavoriteSet::decode(raw.as_deref()),
			Err(err) => {
				tracing::warn!(
					key = key.as_str(),
					error = %err,
					"Failed to read favorites; starting empty."
				);

				FavoriteSet::default()
			},
		};
		let (snapshot, _) = watch::channel(initial);
		let inner = Inner { medium, key, poll_interval, snapshot, write: Mutex::new(()) };

		Self { inner: Arc::new(inner) }
	}

	pub fn is_favorite(&self, id: &str) -> bool {
		self.inner.snapshot.borrow().contains(id)
	}

	pub fn snapshot(&self) -> FavoriteSet {
		self.inner.snapshot.borrow().clone()
	}

	/// Observes every change to the snapshot, local or reconciled.
	pub fn subscribe(&self) -> watch::Receiver<FavoriteSet> {
		self.inner.snapshot.subscribe()
	}

	/// Flips membership of `id`, persists it, and returns the resulting membership.
	///
	/// A failed write is logged and leaves the snapshot untouched.
	pub fn toggle(&self, id: &str) -> bool {
		let _write = self.inner.write.lock().unwrap_or_else(|err| err.into_inner());
		let mut next = match self.inner.medium.get(&self.inner.key) {
			Ok(raw) => FavoriteSet::decode(raw.as_deref()),
			Err(err) => {
				tracing::warn!(
					error = %err,
					"Failed to read favorites before toggling; using the snapshot."
				);

				self.snapshot()
			},
		};
		let member = next.toggle(id);

		if let Err(err) = self.inner.medium.set(&self.inner.key, &next.encode()) {
			tracing::error!(id, error = %err, "Failed to persist favorites.");

			return self.is_favorite(id);
		}

		self.inner.snapshot.send_replace(next);

		member
	}

	/// Re-reads the medium. Returns whether the snapshot changed.
	///
	/// Serialized with `toggle`, so a read that predates this context's own write never lands
	/// after it.
	pub fn reconcile(&self) -> bool {
		let _write = self.inner.write.lock().unwrap_or_else(|err| err.into_inner());
		let raw = match self.inner.medium.get(&self.inner.key) {
			Ok(raw) => raw,
			Err(err) => {
				tracing::warn!(
					error = %err,
					"Failed to read favorites; keeping the current snapshot."
				);

				return false;
			},
		};
		let next = FavoriteSet::decode(raw.as_deref());
		let changed = self.inner.snapshot.send_if_modified(|current| {
			if *current == next {
				return false;
			}

			*current = next;

			true
		});

		if changed {
			tracing::debug!(count = self.inner.snapshot.borrow().len(), "Favorites reconciled.");
		}

		changed
	}

	/// Starts polling and change notification. Both stop when the guard is dropped.
	pub fn start_sync(&self) -> SyncGuard {
		let subscription = match self.inner.medium.subscribe(&self.inner.key) {
			Ok(subscription) => subscription,
			Err(err) => {
				tracing::warn!(error = %err, "Change notification unavailable; polling only.");

				None
			},
		};
		let store = self.clone();
		let task = tokio::spawn(async move { store.sync_loop(subscription).await });

		SyncGuard { task }
	}

	async fn sync_loop(self, mut subscription: Option<Subscription>) {
		let mut ticker = time::interval(self.inner.poll_interval);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			let closed = tokio::select! {
				_ = ticker.tick() => false,
				signal = next_signal(&mut subscription) => signal.is_none(),
			};

			if closed {
				tracing::debug!("Favorite change notification closed; polling only.");

				subscription = None;
			}

			self.reconcile();
		}
	}
}

/// Owns a running sync loop.
pub struct SyncGuard {
	task: JoinHandle<()>,
}
impl SyncGuard {
	pub fn is_running(&self) -> bool {
		!self.task.is_finished()
	}
}
impl Drop for SyncGuard {
	fn drop(&mut self) {
		self.task.abort();
	}
}

/// Builds the configured favorites medium.
pub fn open_medium(cfg: &Favorites) -> Result<Arc<dyn KeyValueStore>> {
	match cfg.backend.as_str() {
		"file" => {
			let Some(dir) = cfg.dir.as_ref() else {
				return Err(Error::InvalidRequest {
					message: "favorites.dir is required for the file backend.".to_string(),
				});
			};

			Ok(Arc::new(FileStore::open(dir.clone(), cfg.watch)?))
		},
		"memory" => Ok(Arc::new(MemoryStore::new())),
		other => Err(Error::InvalidRequest {
			message: format!("Unsupported favorites backend: {other}."),
		}),
	}
}

async fn next_signal(subscription: &mut Option<Subscription>) -> Option<()> {
	match subscription {
		Some(subscription) => subscription.changed().await,
		None => std::future::pending().await,
	}
}
