use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
};

use tokio::sync::mpsc;

use crate::{KeyValueStore, Result, Subscription};

struct Subscriber {
	context: u64,
	key: String,
	tx: mpsc::UnboundedSender<()>,
}

struct Shared {
	values: Mutex<HashMap<String, String>>,
	subscribers: Mutex<Vec<Subscriber>>,
	next_context: AtomicU64,
	notifications: AtomicBool,
}

/// A process-local medium with browser-storage semantics: handles created through
/// [`MemoryStore::context`] share values, and a write notifies every context except the writer.
#[derive(Clone)]
pub struct MemoryStore {
	shared: Arc<Shared>,
	context: u64,
}
impl MemoryStore {
	pub fn new() -> Self {
		let shared = Shared {
			values: Mutex::new(HashMap::new()),
			subscribers: Mutex::new(Vec::new()),
			next_context: AtomicU64::new(1),
			notifications: AtomicBool::new(true),
		};

		Self { shared: Arc::new(shared), context: 0 }
	}

	/// Another execution context over the same values.
	pub fn context(&self) -> Self {
		let context = self.shared.next_context.fetch_add(1, Ordering::SeqCst);

		Self { shared: self.shared.clone(), context }
	}

	/// Turns cross-context notification on or off for every context.
	pub fn set_notifications(&self, enabled: bool) {
		self.shared.notifications.store(enabled, Ordering::SeqCst);
	}

	fn notify_others(&self, key: &str) {
		if !self.shared.notifications.load(Ordering::SeqCst) {
			return;
		}

		lock(&self.shared.subscribers).retain(|subscriber| {
			if subscriber.context == self.context || subscriber.key != key {
				return !subscriber.tx.is_closed();
			}

			subscriber.tx.send(()).is_ok()
		});
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}
impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		crate::check_key(key)?;

		Ok(lock(&self.shared.values).get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		crate::check_key(key)?;

		lock(&self.shared.values).insert(key.to_string(), value.to_string());

		self.notify_others(key);

		Ok(())
	}

	fn subscribe(&self, key: &str) -> Result<Option<Subscription>> {
		crate::check_key(key)?;

		let (tx, rx) = mpsc::unbounded_channel();

		lock(&self.shared.subscribers).push(Subscriber {
			context: self.context,
			key: key.to_string(),
			tx,
		});

		Ok(Some(Subscription::new(rx, None)))
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn writes_notify_other_contexts_only() {
		let a = MemoryStore::new();
		let b = a.context();
		let mut sub_a = a.subscribe("favorites").expect("subscribe").expect("supported");
		let mut sub_b = b.subscribe("favorites").expect("subscribe").expect("supported");

		a.set("favorites", "[\"1\"]").expect("set");

		assert_eq!(sub_b.changed().await, Some(()));
		assert!(sub_a.rx.try_recv().is_err());
		assert_eq!(b.get("favorites").expect("get").as_deref(), Some("[\"1\"]"));
	}

	#[test]
	fn disabled_notifications_stay_silent() {
		let a = MemoryStore::new();
		let b = a.context();
		let mut sub_b = b.subscribe("favorites").expect("subscribe").expect("supported");

		a.set_notifications(false);
		a.set("favorites", "[]").expect("set");

		assert!(sub_b.rx.try_recv().is_err());
	}
}
