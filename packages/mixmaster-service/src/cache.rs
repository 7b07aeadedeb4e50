use std::{
	collections::HashMap,
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use tokio::{sync::watch, time::Instant};

use crate::{AggregationResult, Aggregator};

#[derive(Clone)]
struct Settled {
	result: Arc<AggregationResult>,
	settled_at: Instant,
}

enum Entry {
	Pending(watch::Receiver<Option<Settled>>),
	Settled { settled: Settled, refreshing: bool },
}

struct State {
	entries: HashMap<String, Entry>,
	generation: u64,
}

struct Inner {
	aggregator: Aggregator,
	stale_after: Duration,
	state: Mutex<State>,
}

enum Lookup {
	Ready(Arc<AggregationResult>),
	Wait(watch::Receiver<Option<Settled>>),
}

/// Aggregation results keyed by normalized search term.
///
/// Concurrent requests for one key share a single pass. Entries older than the staleness window
/// are served as-is while one background pass replaces them.
#[derive(Clone)]
pub struct QueryCache {
	inner: Arc<Inner>,
}
impl QueryCache {
	pub fn new(aggregator: Aggregator, stale_after: Duration) -> Self {
		let state = State { entries: HashMap::new(), generation: 0 };

		Self { inner: Arc::new(Inner { aggregator, stale_after, state: Mutex::new(state) }) }
	}

	pub async fn get_or_fetch(&self, term: &str) -> Arc<AggregationResult> {
		let key = normalize_term(term);
		let mut rx = match self.lookup(&key) {
			Lookup::Ready(result) => return result,
			Lookup::Wait(rx) => rx,
		};
		let settled = match rx.wait_for(Option::is_some).await {
			Ok(value) => value.as_ref().map(|settled| settled.result.clone()),
			Err(_) => None,
		};

		settled.unwrap_or_else(|| {
			tracing::error!(term = key.as_str(), "Aggregation pass ended without a result.");

			Arc::new(AggregationResult::empty())
		})
	}

	/// Forgets every entry. Passes already in flight still answer their waiters but are not kept.
	pub fn invalidate_all(&self) {
		let mut state = lock(&self.inner.state);

		state.entries.clear();

		state.generation += 1;

		tracing::info!(generation = state.generation, "Query cache invalidated.");
	}

	pub fn len(&self) -> usize {
		lock(&self.inner.state).entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lookup(&self, key: &str) -> Lookup {
		let mut state = lock(&self.inner.state);
		let generation = state.generation;

		match state.entries.get_mut(key) {
			Some(Entry::Settled { settled, refreshing }) => {
				if settled.settled_at.elapsed() >= self.inner.stale_after && !*refreshing {
					*refreshing = true;

					tracing::debug!(term = key, "Serving stale entry while refreshing.");

					self.spawn_refresh(key.to_string(), generation);
				}

				return Lookup::Ready(settled.result.clone());
			},
			Some(Entry::Pending(rx)) if rx.has_changed().is_ok() => {
				return Lookup::Wait(rx.clone());
			},
			_ => {},
		}

		let (tx, rx) = watch::channel(None);

		tracing::debug!(term = key, "Query cache miss.");

		state.entries.insert(key.to_string(), Entry::Pending(rx.clone()));
		self.spawn_fetch(key.to_string(), generation, tx);

		Lookup::Wait(rx)
	}

	fn spawn_fetch(&self, key: String, generation: u64, tx: watch::Sender<Option<Settled>>) {
		let inner = self.inner.clone();

		tokio::spawn(async move {
			let settled = run_pass(&inner, &key).await;

			store(&inner, key, generation, settled.clone());

			tx.send_replace(Some(settled));
		});
	}

	fn spawn_refresh(&self, key: String, generation: u64) {
		let inner = self.inner.clone();

		tokio::spawn(async move {
			let settled = run_pass(&inner, &key).await;

			store(&inner, key, generation, settled);
		});
	}
}

/// The cache key for a search term: surrounding whitespace removed, lowercased.
pub fn normalize_term(term: &str) -> String {
	term.trim().to_lowercase()
}

async fn run_pass(inner: &Inner, key: &str) -> Settled {
	let result = inner.aggregator.aggregate(key).await;

	Settled { result: Arc::new(result), settled_at: Instant::now() }
}

fn store(inner: &Inner, key: String, generation: u64, settled: Settled) {
	let mut state = lock(&inner.state);

	if state.generation != generation {
		tracing::debug!(
			term = key.as_str(),
			"Discarding aggregation from an invalidated generation."
		);

		return;
	}

	state.entries.insert(key, Entry::Settled { settled, refreshing: false });
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[cfg(test)]
mod tests {
	use super::normalize_term;

	#[test]
	fn normalized_terms_share_keys() {
		assert_eq!(normalize_term("  Margarita "), "margarita");
		assert_eq!(normalize_term("MARGARITA"), normalize_term("margarita"));
		assert_eq!(normalize_term("   "), "");
		assert_ne!(normalize_term(""), normalize_term("a"));
	}
}
