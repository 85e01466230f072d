//! Turning raw text into insertion windows.
//!
//! This is the token producer feeding the chain: it splits text into flagged
//! sentences, cuts them into windows of `order` tokens and inserts them,
//! sequentially or on worker threads.

/// Project Gutenberg boilerplate removal.
pub mod gutenberg;

/// Sentence splitting and flag detection.
pub mod tokenizer;

/// Window production and (parallel) learning.
pub mod learner;

pub use learner::{learn, learn_parallel, windows};
pub use tokenizer::tokenize;
