//! Compact `postcard` snapshot of a `ChainStore`.
//!
//! The trie is stored as a flat preorder list of nodes, each tagged with its
//! depth (roots are at depth 1). Decoding rebuilds the tree with an explicit
//! stack, so a hostile file cannot nest deeper than the order it declares.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::{ChainStore, Flags, MAX_ORDER, WordNode};
use crate::error::{DsmcError, Result};

#[derive(Serialize, Deserialize, Debug)]
struct Snapshot {
	order: usize,
	nodes: Vec<FlatNode>,
}

#[derive(Serialize, Deserialize, Debug)]
struct FlatNode {
	depth: usize,
	token: String,
	weight: u64,
	flags: Flags,
}

/// Encodes the whole store.
pub fn encode(store: &ChainStore) -> Result<Vec<u8>> {
	let mut nodes = Vec::with_capacity(store.node_count());
	for node in store.roots().values() {
		flatten(node, 1, &mut nodes);
	}
	Ok(postcard::to_stdvec(&Snapshot { order: store.order(), nodes })?)
}

fn flatten(node: &WordNode, depth: usize, out: &mut Vec<FlatNode>) {
	out.push(FlatNode {
		depth,
		token: node.token().to_owned(),
		weight: node.weight(),
		flags: node.flags().clone(),
	});
	for child in node.children().values() {
		flatten(child, depth + 1, out);
	}
}

/// Decodes a store, validating every record.
///
/// # Errors
/// Returns `MalformedPersistedData` when the bytes are not a snapshot or a
/// record breaks a structural invariant. The position is the index of the
/// offending record.
pub fn decode(bytes: &[u8]) -> Result<ChainStore> {
	let snapshot: Snapshot =
		postcard::from_bytes(bytes).map_err(|e| DsmcError::malformed(0, format!("invalid binary snapshot: {e}")))?;
	let order = snapshot.order;
	if !(1..=MAX_ORDER).contains(&order) {
		return Err(DsmcError::malformed(0, format!("order must be between 1 and {MAX_ORDER}, got {order}")));
	}

	let mut roots = BTreeMap::new();
	// Open ancestors of the next record, outermost first
	let mut open: Vec<(usize, WordNode)> = Vec::with_capacity(order);

	for (index, record) in snapshot.nodes.into_iter().enumerate() {
		if record.depth < 1 || record.depth > order {
			return Err(DsmcError::malformed(index, format!("depth {} outside 1..={order}", record.depth)));
		}
		if record.depth > open.len() + 1 {
			return Err(DsmcError::malformed(index, format!("depth {} skips a level", record.depth)));
		}
		if record.weight == 0 {
			return Err(DsmcError::malformed(index, "weight must be >= 1"));
		}
		while open.len() >= record.depth {
			close(&mut open, &mut roots)?;
		}
		let node = WordNode::from_parts(record.token, record.weight, record.flags, BTreeMap::new());
		open.push((index, node));
	}
	while !open.is_empty() {
		close(&mut open, &mut roots)?;
	}

	Ok(ChainStore::from_parts(order, roots))
}

/// Pops the innermost open node and attaches it to its parent.
fn close(open: &mut Vec<(usize, WordNode)>, roots: &mut BTreeMap<String, WordNode>) -> Result<()> {
	let Some((index, node)) = open.pop() else {
		return Ok(());
	};
	let siblings = match open.last_mut() {
		Some((_, parent)) => parent.children_mut(),
		None => roots,
	};
	let key = node.token().to_owned();
	if siblings.insert(key, node).is_some() {
		return Err(DsmcError::malformed(index, "duplicate sibling token"));
	}
	Ok(())
}
