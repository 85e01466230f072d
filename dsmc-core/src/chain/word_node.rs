use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Write;


use super::flag::{Flag, Flags};

/// One observed occurrence of a token, as produced by the tokenizer.
///
/// This is the unit handed to the inserter: the literal token plus the flags
/// detected for this particular occurrence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
	pub token: String,
	pub flags: Flags,
}

impl Occurrence {
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: token.into(), flags: Flags::new() }
	}

	pub fn with_flag(mut self, flag: Flag) -> Self {
		self.flags.insert(flag);
		self
	}
}

/// A node of the word trie: one token observed in one specific context.
///
/// The context is the path of tokens from a root down to this node. The node
/// exclusively owns its successors, so dropping a node drops its whole subtree.
///
/// ## Invariants
/// - `weight >= 1` and equals the number of insertions that went through this node
/// - `children` keys are unique and equal to the child's own `token`
/// - `flags` only grow
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordNode {
	token: String,
	weight: u64,
	flags: Flags,
	/// Successors indexed by token. Ordered, so iteration (and tie-breaking
	/// during generation) follows the lexicographic order of the keys.
	children: BTreeMap<String, WordNode>,
}

impl WordNode {
	/// Creates a node for a first observation (`weight == 1`).
	pub fn new(occurrence: &Occurrence) -> Self {
		Self {
			token: occurrence.token.clone(),
			weight: 1,
			flags: occurrence.flags.clone(),
			children: BTreeMap::new(),
		}
	}

	/// Rebuilds a node from decoded fields. Validation is the caller's job.
	pub(crate) fn from_parts(
		token: String,
		weight: u64,
		flags: Flags,
		children: BTreeMap<String, WordNode>,
	) -> Self {
		Self { token, weight, flags, children }
	}

	pub fn token(&self) -> &str {
		&self.token
	}

	pub fn weight(&self) -> u64 {
		self.weight
	}

	pub fn flags(&self) -> &Flags {
		&self.flags
	}

	pub fn children(&self) -> &BTreeMap<String, WordNode> {
		&self.children
	}

	pub(crate) fn children_mut(&mut self) -> &mut BTreeMap<String, WordNode> {
		&mut self.children
	}

	pub fn child(&self, token: &str) -> Option<&WordNode> {
		self.children.get(token)
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_empty()
	}

	pub fn ends_sentence(&self) -> bool {
		self.flags.contains(Flag::SentenceEnd)
	}

	/// Records one more observation of this token in this context.
	fn observe(&mut self, flags: &Flags) {
		self.weight = self.weight.saturating_add(1);
		self.flags.union_with(flags);
	}

	/// Folds an ordered token sequence into `level`, descending one level per token.
	///
	/// Existing entries get their weight bumped and their flags merged, missing
	/// ones are created with a weight of 1. Nothing is ever removed.
	pub(crate) fn insert_chain(mut level: &mut BTreeMap<String, WordNode>, tokens: &[Occurrence]) {
		for occurrence in tokens {
			let node = match level.entry(occurrence.token.clone()) {
				Entry::Occupied(entry) => {
					let node = entry.into_mut();
					node.observe(&occurrence.flags);
					node
				}
				Entry::Vacant(entry) => entry.insert(WordNode::new(occurrence)),
			};
			level = &mut node.children;
		}
	}

	/// Merges another node with the same token into this one.
	///
	/// Weights are summed and flags are united, recursively.
	///
	/// # Errors
	/// Returns an error if the tokens do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.token != other.token {
			return Err(format!("Token mismatch: '{}' vs '{}'", self.token, other.token));
		}
		self.weight = self.weight.saturating_add(other.weight);
		self.flags.union_with(&other.flags);
		Self::merge_level(&mut self.children, &other.children)
	}

	pub(crate) fn merge_level(
		level: &mut BTreeMap<String, WordNode>,
		other: &BTreeMap<String, WordNode>,
	) -> Result<(), String> {
		for (token, node) in other {
			if let Some(existing) = level.get_mut(token) {
				existing.merge(node)?;
			} else {
				level.insert(token.clone(), node.clone());
			}
		}
		Ok(())
	}

	/// Number of nodes in this subtree, this one included.
	pub fn node_count(&self) -> usize {
		1 + self.children.values().map(WordNode::node_count).sum::<usize>()
	}

	/// Length of the longest path from this node down to a leaf, this node included.
	pub fn depth(&self) -> usize {
		1 + self.children.values().map(WordNode::depth).max().unwrap_or(0)
	}

	/// Appends an indented, human readable view of the subtree to `out`.
	pub(crate) fn dump(&self, indent: usize, out: &mut String) {
		let flags: String = self.flags.iter().map(|f| format!(" ({f})")).collect();
		let _ = writeln!(out, "{}\"{}\" {}{}", "  ".repeat(indent), self.token, self.weight, flags);
		for child in self.children.values() {
			child.dump(indent + 1, out);
		}
	}
}
