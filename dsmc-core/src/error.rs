//! Error type shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = DsmcError> = std::result::Result<T, E>;

/// Failures surfaced by the engine.
///
/// Inserting and generating never fail; everything here comes from
/// configuration, persistence or the shared-store lock.
#[derive(Debug, Error)]
pub enum DsmcError {
	/// Engine configuration failed validation.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
	/// A persisted chain could not be decoded. Nothing was loaded.
	#[error("malformed persisted data at field {position}: {reason}")]
	MalformedPersistedData {
		/// Zero-based index of the offending whitespace-delimited field.
		position: usize,
		reason: String,
	},
	/// Filesystem failure, with the path involved when known.
	#[error("io error while processing {path:?}: {source}")]
	Io {
		source: std::io::Error,
		path: Option<PathBuf>,
	},
	/// Binary snapshot encoding or decoding failure.
	#[error("serialization error: {0}")]
	Serialization(String),
	/// Two stores of different order cannot be merged.
	#[error("order mismatch: {left} vs {right}")]
	OrderMismatch { left: usize, right: usize },
	/// Another thread panicked while holding the shared chain.
	#[error("shared chain lock poisoned")]
	LockPoisoned,
}

impl From<postcard::Error> for DsmcError {
	fn from(err: postcard::Error) -> Self {
		Self::Serialization(err.to_string())
	}
}

impl DsmcError {
	/// Wraps an IO error together with the path it happened on.
	pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
		Self::Io { source, path }
	}

	pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
		Self::MalformedPersistedData { position, reason: reason.into() }
	}
}
