//! Persistence of a `ChainStore`.
//!
//! Two formats are supported, picked from the file extension:
//! - the whitespace-delimited text format (`text`), the default
//! - a compact `postcard` snapshot (`binary`) for paths ending in `.bin`
//!
//! Saving always goes through the sibling backup path and an atomic rename,
//! so an interrupted save never destroys the previous database.

use std::path::Path;

use log::{info, warn};

use crate::chain::ChainStore;
use crate::error::{DsmcError, Result};
use crate::io::{build_backup_path, read_if_exists, write_atomically};

/// Flat `postcard` snapshot encoding.
pub mod binary;
/// Whitespace-delimited text encoding.
pub mod text;

/// On-disk encoding of a database file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	Text,
	Binary,
}

impl Format {
	/// `.bin` files are binary snapshots, everything else is text.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
		match path.as_ref().extension().and_then(|e| e.to_str()) {
			Some("bin") => Format::Binary,
			_ => Format::Text,
		}
	}
}

/// Serializes a store in the given format.
pub fn to_bytes(store: &ChainStore, format: Format) -> Result<Vec<u8>> {
	match format {
		Format::Text => Ok(text::encode(store).into_bytes()),
		Format::Binary => binary::encode(store),
	}
}

/// Deserializes a store in the given format.
///
/// # Errors
/// `MalformedPersistedData` when the content is not a valid store.
pub fn from_bytes(bytes: &[u8], format: Format) -> Result<ChainStore> {
	match format {
		Format::Text => {
			let input = std::str::from_utf8(bytes)
				.map_err(|e| DsmcError::malformed(0, format!("database is not UTF-8: {e}")))?;
			text::decode(input)
		}
		Format::Binary => binary::decode(bytes),
	}
}

/// Saves a store to `path`, atomically.
pub fn save_file<P: AsRef<Path>>(store: &ChainStore, path: P) -> Result<()> {
	let path = path.as_ref();
	let bytes = to_bytes(store, Format::from_path(path))?;
	write_atomically(path, &bytes).map_err(|e| DsmcError::io(e, Some(path.to_path_buf())))?;
	info!("Saved database {} ({} roots, {} nodes)", path.display(), store.len(), store.node_count());
	Ok(())
}

/// Loads a store from `path`.
///
/// A missing file is not an error: an empty store of `default_order` is
/// returned. When the file exists its own order wins over `default_order`.
///
/// # Errors
/// - `Io` for any failure other than "not found"
/// - `MalformedPersistedData` if the content does not decode
pub fn load_file<P: AsRef<Path>>(path: P, default_order: usize) -> Result<ChainStore> {
	let path = path.as_ref();

	if let Ok(backup) = build_backup_path(path) {
		if backup.exists() {
			warn!("Ignoring leftover {} from an interrupted save", backup.display());
		}
	}

	let bytes = match read_if_exists(path).map_err(|e| DsmcError::io(e, Some(path.to_path_buf())))? {
		Some(bytes) => bytes,
		None => {
			info!("No database at {}, starting empty", path.display());
			return ChainStore::new(default_order);
		}
	};

	let store = from_bytes(&bytes, Format::from_path(path))?;
	if store.order() != default_order {
		info!("Database order {} overrides configured order {}", store.order(), default_order);
	}
	info!("Loaded database {} ({} roots, {} nodes)", path.display(), store.len(), store.node_count());
	Ok(store)
}
