use std::sync::mpsc;
use std::thread;

use log::info;

use super::tokenizer::tokenize;
use crate::chain::{ChainStore, Occurrence};
use crate::error::Result;

/// Cuts a sentence into insertion windows.
///
/// Yields one window per token: the `order` tokens starting at it, or fewer
/// near the end of the sentence. Every token thus becomes a root, and the last
/// token of a sentence keeps its end flag at every depth it appears.
pub fn windows(sentence: &[Occurrence], order: usize) -> impl Iterator<Item = &[Occurrence]> {
	let order = order.max(1);
	(0..sentence.len()).map(move |i| &sentence[i..(i + order).min(sentence.len())])
}

/// Tokenizes `text` and inserts all its windows into `store`.
///
/// Returns the number of windows inserted.
pub fn learn(store: &mut ChainStore, text: &str) -> usize {
	let order = store.order();
	let mut inserted = 0;
	for sentence in tokenize(text) {
		for window in windows(&sentence, order) {
			store.insert(window);
			inserted += 1;
		}
	}
	inserted
}

/// Builds a store from a large text using every core.
///
/// - Tokenizes the whole text first, so no sentence is split across workers
/// - Splits the sentences into chunks (CPU cores * factor)
/// - Builds one partial store per chunk on its own thread
/// - Merges the partial stores into the result
///
/// The result is identical to calling `learn` on an empty store.
pub fn learn_parallel(text: &str, order: usize) -> Result<ChainStore> {
	let empty = ChainStore::new(order)?;
	let sentences = tokenize(text);
	if sentences.is_empty() {
		return Ok(empty);
	}

	let cpus = num_cpus::get();
	let factor = 8;
	let chunks = cpus * factor;
	let chunk_size = sentences.len().div_ceil(chunks);

	let (tx, rx) = mpsc::channel();
	for chunk in sentences.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<Vec<Occurrence>> = chunk.to_vec();
		let mut partial_store = empty.clone();

		thread::spawn(move || {
			for sentence in &chunk {
				for window in windows(sentence, order) {
					partial_store.insert(window);
				}
			}
			// The receiver outlives every sender
			let _ = tx.send(partial_store);
		});
	}
	drop(tx);

	let mut final_store = empty;
	for partial_store in rx.iter() {
		final_store.merge(&partial_store)?;
	}

	info!("Learned {} sentences ({} roots, {} nodes)", sentences.len(), final_store.len(), final_store.node_count());
	Ok(final_store)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain::{Flag, WordNode};

	#[test]
	fn windows_include_shorter_tails() {
		let sentence: Vec<Occurrence> = ["a", "b", "c"].iter().map(|t| Occurrence::new(*t)).collect();
		let cut: Vec<Vec<&str>> = windows(&sentence, 2)
			.map(|w| w.iter().map(|o| o.token.as_str()).collect())
			.collect();
		assert_eq!(cut, vec![vec!["a", "b"], vec!["b", "c"], vec!["c"]]);
	}

	#[test]
	fn learn_inserts_every_window() {
		let mut store = ChainStore::new(3).unwrap();
		assert_eq!(learn(&mut store, "The quick fox. The slow fox."), 6);

		let the = store.root("The").unwrap();
		assert_eq!(the.weight(), 2);
		assert!(the.flags().contains(Flag::SentenceStart));
		let fox = the.child("quick").and_then(|q| q.child("fox.")).unwrap();
		assert!(fox.ends_sentence());
		assert!(store.root("fox.").is_some_and(WordNode::ends_sentence));
	}

	#[test]
	fn parallel_learning_matches_sequential() {
		let text = "One fish two fish. Red fish blue fish! ".repeat(50) + "Where is Wally? Nobody knows.";
		let mut sequential = ChainStore::new(3).unwrap();
		learn(&mut sequential, &text);
		assert_eq!(learn_parallel(&text, 3).unwrap(), sequential);
	}

	#[test]
	fn parallel_learning_of_nothing_is_empty() {
		let store = learn_parallel("   ", 2).unwrap();
		assert!(store.is_empty());
		assert_eq!(store.order(), 2);
	}
}
