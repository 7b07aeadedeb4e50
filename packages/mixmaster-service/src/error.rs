pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Source error: {message}")]
	Source { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<mixmaster_providers::Error> for Error {
	fn from(err: mixmaster_providers::Error) -> Self {
		Self::Source { message: err.to_string() }
	}
}

impl From<mixmaster_storage::Error> for Error {
	fn from(err: mixmaster_storage::Error) -> Self {
		match err {
			mixmaster_storage::Error::InvalidKey(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}
