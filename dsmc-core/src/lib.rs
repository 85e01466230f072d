//! Markov word-chain text generation library.
//!
//! This crate provides:
//! - A weighted word trie of configurable order (`chain`)
//! - Weighted-random and deterministic sentence generation
//! - A validated text format and binary snapshots for persistence (`codec`)
//! - Tokenization, Gutenberg cleanup and parallel learning (`text`)
//!
//! The chain itself is synchronous. Share it between threads through
//! `SharedChain`, which serializes every operation on the store.

/// Word trie, insertion, sampling and the shared handle.
pub mod chain;

/// Saving and loading of a chain.
pub mod codec;

/// Engine settings.
pub mod config;

/// Crate error type.
pub mod error;

/// Text to insertion windows.
pub mod text;

/// Sentence formatting for output sinks.
pub mod voice;

/// File helpers (backup paths, atomic writes).
///
/// Not exposed
pub(crate) mod io;

pub use chain::{ChainStore, Flag, Generation, Occurrence, Sampler, SharedChain, Termination, WordNode};
pub use config::EngineConfig;
pub use error::{DsmcError, Result};
pub use voice::Voice;

/// Reads a corpus file, for binaries learning from disk.
pub fn read_corpus<P: AsRef<std::path::Path>>(path: P) -> Result<String> {
	let path = path.as_ref();
	io::read_file(path).map_err(|e| DsmcError::io(e, Some(path.to_path_buf())))
}
