//! The Markov word chain.
//!
//! - `WordNode`: one token in one context, owning its successors
//! - `ChainStore`: the trie root, filled window by window
//! - `Sampler`: weighted walks producing token sequences
//! - `SharedChain`: a store shared between threads behind one lock

/// Trie root and insertion entry point.
pub mod chain_store;

/// Per-occurrence token annotations.
pub mod flag;

/// Sentence generation by weighted walk.
pub mod sampler;

/// Thread-safe handle around a single store.
pub mod shared;

/// Trie nodes and token occurrences.
pub mod word_node;

pub use chain_store::{ChainStore, MAX_ORDER};
pub use flag::{Flag, Flags};
pub use sampler::{DEFAULT_MAX_STEPS, Generation, Sampler, Termination};
pub use shared::SharedChain;
pub use word_node::{Occurrence, WordNode};
