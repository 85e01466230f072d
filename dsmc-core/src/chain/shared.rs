use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;

use super::chain_store::ChainStore;
use super::sampler::{Generation, Sampler};
use super::word_node::Occurrence;
use crate::codec;
use crate::error::{DsmcError, Result};
use crate::text;

/// A `ChainStore` shared between a producer and a generating/saving loop.
///
/// Every operation locks the whole store for its whole duration: an insert,
/// a generation walk, a save or a load never observes another one halfway.
/// Cloning the handle shares the same store.
#[derive(Clone, Debug)]
pub struct SharedChain {
	inner: Arc<Mutex<ChainStore>>,
}

impl SharedChain {
	pub fn new(store: ChainStore) -> Self {
		Self { inner: Arc::new(Mutex::new(store)) }
	}

	/// Loads `path` (or starts empty if it does not exist) and shares the result.
	pub fn open<P: AsRef<Path>>(path: P, default_order: usize) -> Result<Self> {
		Ok(Self::new(codec::load_file(path, default_order)?))
	}

	fn lock(&self) -> Result<MutexGuard<'_, ChainStore>> {
		self.inner.lock().map_err(|_| DsmcError::LockPoisoned)
	}

	pub fn insert(&self, tokens: &[Occurrence]) -> Result<()> {
		self.lock()?.insert(tokens);
		Ok(())
	}

	/// Tokenizes and inserts `text` under a single lock. Returns the window count.
	pub fn learn(&self, text: &str) -> Result<usize> {
		let mut store = self.lock()?;
		Ok(text::learn(&mut store, text))
	}

	/// Merges a separately built store (see `text::learn_parallel`).
	pub fn merge(&self, other: &ChainStore) -> Result<()> {
		self.lock()?.merge(other)
	}

	pub fn generate<R: Rng + ?Sized>(&self, sampler: &Sampler, rng: &mut R) -> Result<Generation> {
		let store = self.lock()?;
		Ok(sampler.generate(&*store, rng))
	}

	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let store = self.lock()?;
		codec::save_file(&*store, path)
	}

	/// Replaces the shared store with the content of `path`.
	///
	/// On error the current store is left untouched.
	pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let mut store = self.lock()?;
		*store = codec::load_file(path, store.order())?;
		Ok(())
	}

	/// Runs `f` on the store while holding the lock.
	pub fn read<T>(&self, f: impl FnOnce(&ChainStore) -> T) -> Result<T> {
		let store = self.lock()?;
		Ok(f(&*store))
	}
}
