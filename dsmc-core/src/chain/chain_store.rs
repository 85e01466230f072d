use std::collections::BTreeMap;

use log::debug;

use super::word_node::{Occurrence, WordNode};
use crate::error::{DsmcError, Result};

/// Largest supported order.
///
/// Node depth never exceeds the order, so this also bounds the recursion of
/// every tree walk (decoding, merging, counting, dropping).
pub const MAX_ORDER: usize = 64;

/// Root of the word trie.
///
/// Maps every first token of an inserted window to the subtree of what was
/// observed after it. Structurally this is the `children` map of a node
/// without a parent.
///
/// # Invariants
/// - `1 <= order <= MAX_ORDER`
/// - no path from a root is longer than `order` nodes
/// - every node was produced by an insertion (or a merge of insertions)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainStore {
	/// Number of tokens per insertion window.
	order: usize,
	roots: BTreeMap<String, WordNode>,
}

impl ChainStore {
	/// Creates an empty store of the given order.
	///
	/// # Errors
	/// Returns an error if `order` is not in `1..=MAX_ORDER`.
	pub fn new(order: usize) -> Result<Self> {
		if !(1..=MAX_ORDER).contains(&order) {
			return Err(DsmcError::InvalidConfig(format!("order must be between 1 and {MAX_ORDER}, got {order}")));
		}
		Ok(Self { order, roots: BTreeMap::new() })
	}

	pub(crate) fn from_parts(order: usize, roots: BTreeMap<String, WordNode>) -> Self {
		Self { order, roots }
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn roots(&self) -> &BTreeMap<String, WordNode> {
		&self.roots
	}

	pub fn root(&self, token: &str) -> Option<&WordNode> {
		self.roots.get(token)
	}

	/// Number of distinct first tokens.
	pub fn len(&self) -> usize {
		self.roots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.roots.is_empty()
	}

	/// Total number of nodes in the trie.
	pub fn node_count(&self) -> usize {
		self.roots.values().map(WordNode::node_count).sum()
	}

	/// Folds one window of tokens into the trie.
	///
	/// Windows longer than `order` only contribute their first `order` tokens,
	/// shorter ones (sentence tails) are inserted as they are. An empty window
	/// is a no-op.
	pub fn insert(&mut self, tokens: &[Occurrence]) {
		let tokens = if tokens.len() > self.order {
			debug!("Truncating window of {} tokens to order {}", tokens.len(), self.order);
			&tokens[..self.order]
		} else {
			tokens
		};
		WordNode::insert_chain(&mut self.roots, tokens);
	}

	/// Merges another store of the same order into this one.
	///
	/// The result is the store that inserting both sets of windows would
	/// have produced: weights add up, flags are united.
	///
	/// # Errors
	/// Returns an error if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(DsmcError::OrderMismatch { left: self.order, right: other.order });
		}
		WordNode::merge_level(&mut self.roots, &other.roots).map_err(DsmcError::InvalidConfig)
	}

	/// Indented view of the whole trie, one node per line.
	pub fn dump(&self) -> String {
		let mut out = String::new();
		for node in self.roots.values() {
			node.dump(0, &mut out);
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain::flag::Flag;

	fn window(tokens: &[&str]) -> Vec<Occurrence> {
		tokens.iter().map(|t| Occurrence::new(*t)).collect()
	}

	#[test]
	fn rejects_out_of_range_orders() {
		assert!(matches!(ChainStore::new(0), Err(DsmcError::InvalidConfig(_))));
		assert!(matches!(ChainStore::new(MAX_ORDER + 1), Err(DsmcError::InvalidConfig(_))));
		assert!(ChainStore::new(MAX_ORDER).is_ok());
	}

	#[test]
	fn quick_and_slow_fox_share_the_root() {
		let mut store = ChainStore::new(3).unwrap();
		let fox = Occurrence::new("fox").with_flag(Flag::SentenceEnd);
		store.insert(&[Occurrence::new("the"), Occurrence::new("quick"), fox.clone()]);
		store.insert(&[Occurrence::new("the"), Occurrence::new("slow"), fox]);

		let the = store.root("the").unwrap();
		assert_eq!(the.weight(), 2);
		assert_eq!(the.children().keys().collect::<Vec<_>>(), ["quick", "slow"]);
		assert!(the.children().values().all(|n| n.weight() == 1));
		assert_eq!(store.node_count(), 5);
	}

	#[test]
	fn empty_window_is_a_no_op() {
		let mut store = ChainStore::new(2).unwrap();
		store.insert(&[]);
		assert!(store.is_empty());
	}

	#[test]
	fn long_windows_are_truncated_to_order() {
		let mut store = ChainStore::new(2).unwrap();
		store.insert(&window(&["a", "b", "c", "d"]));
		let a = store.root("a").unwrap();
		assert_eq!(a.depth(), 2);
		assert!(a.child("b").unwrap().is_leaf());
	}

	#[test]
	fn same_window_twice_bumps_every_position_by_one() {
		let mut once = ChainStore::new(3).unwrap();
		once.insert(&window(&["a", "b", "c"]));
		let mut twice = once.clone();
		twice.insert(&window(&["a", "b", "c"]));

		let path = |s: &ChainStore| {
			let a = s.root("a").unwrap();
			let b = a.child("b").unwrap();
			let c = b.child("c").unwrap();
			[a.weight(), b.weight(), c.weight()]
		};
		let before = path(&once);
		let after = path(&twice);
		for (b, a) in before.iter().zip(after.iter()) {
			assert_eq!(*a, b + 1);
		}
	}

	#[test]
	fn nested_node_does_not_borrow_flags_from_a_root_of_the_same_token() {
		let mut store = ChainStore::new(3).unwrap();
		store.insert(&[Occurrence::new("x").with_flag(Flag::ProperName)]);
		store.insert(&[Occurrence::new("y"), Occurrence::new("x")]);

		let nested = store.root("y").unwrap().child("x").unwrap();
		assert!(!nested.flags().contains(Flag::ProperName));
		assert!(store.root("x").unwrap().flags().contains(Flag::ProperName));
	}

	#[test]
	fn merge_matches_sequential_insertion() {
		let mut sequential = ChainStore::new(2).unwrap();
		let mut left = ChainStore::new(2).unwrap();
		let mut right = ChainStore::new(2).unwrap();
		for (i, w) in [["a", "b"], ["a", "c"], ["b", "a"], ["a", "b"]].iter().enumerate() {
			sequential.insert(&window(w));
			if i % 2 == 0 { left.insert(&window(w)) } else { right.insert(&window(w)) }
		}
		left.merge(&right).unwrap();
		assert_eq!(left, sequential);
	}

	#[test]
	fn merge_rejects_other_orders() {
		let mut a = ChainStore::new(2).unwrap();
		let b = ChainStore::new(3).unwrap();
		assert!(matches!(a.merge(&b), Err(DsmcError::OrderMismatch { left: 2, right: 3 })));
	}

	#[test]
	fn dump_indents_children() {
		let mut store = ChainStore::new(2).unwrap();
		store.insert(&[Occurrence::new("hi").with_flag(Flag::SentenceStart), Occurrence::new("there")]);
		assert_eq!(store.dump(), "\"hi\" 1 (START)\n  \"there\" 1\n");
	}
}
