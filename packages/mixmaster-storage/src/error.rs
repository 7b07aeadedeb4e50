#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O error at {path:?}.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error(transparent)]
	Watch(#[from] notify::Error),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}
