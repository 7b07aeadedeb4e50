use std::{
	fs, io,
	path::{Path, PathBuf},
	sync::atomic::{AtomicU64, Ordering},
};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{Error, KeyValueStore, Result, Subscription};

/// One JSON file per key inside a directory. Every process pointed at the same directory sees
/// the same values; changes are observed through a filesystem watcher.
pub struct FileStore {
	dir: PathBuf,
	watch: bool,
}
impl FileStore {
	pub fn open(dir: impl Into<PathBuf>, watch: bool) -> Result<Self> {
		let dir = dir.into();

		fs::create_dir_all(&dir).map_err(|err| Error::Io { path: dir.clone(), source: err })?;

		Ok(Self { dir, watch })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	fn path_for(&self, key: &str) -> Result<PathBuf> {
		crate::check_key(key)?;

		Ok(self.dir.join(format!("{key}.json")))
	}
}
impl KeyValueStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		let path = self.path_for(key)?;

		match fs::read_to_string(&path) {
			Ok(raw) => Ok(Some(raw)),
			Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(Error::Io { path, source: err }),
		}
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let path = self.path_for(key)?;
		let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
		// Readers only ever see the old or the new file, never a partial write.
		let tmp = self.dir.join(format!(".{key}.{}.{ordinal}.tmp", std::process::id()));

		fs::write(&tmp, value).map_err(|err| Error::Io { path: tmp.clone(), source: err })?;

		if let Err(err) = fs::rename(&tmp, &path) {
			let _ = fs::remove_file(&tmp);

			return Err(Error::Io { path, source: err });
		}

		Ok(())
	}

	fn subscribe(&self, key: &str) -> Result<Option<Subscription>> {
		if !self.watch {
			return Ok(None);
		}

		let target = self.path_for(key)?;
		let file_name = target.file_name().map(|name| name.to_os_string());
		let (tx, rx) = mpsc::unbounded_channel();
		let mut watcher = RecommendedWatcher::new(
			move |res: notify::Result<Event>| match res {
				Ok(event) => {
					let touches_key = event
						.paths
						.iter()
						.any(|path| path.file_name().map(|name| name.to_os_string()) == file_name);

					if touches_key {
						let _ = tx.send(());
					}
				},
				Err(err) => tracing::warn!(error = %err, "Favorite store watcher error."),
			},
			Config::default(),
		)?;

		watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

		Ok(Some(Subscription::new(rx, Some(watcher))))
	}
}
