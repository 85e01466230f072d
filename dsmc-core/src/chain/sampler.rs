use rand::Rng;

use super::chain_store::ChainStore;
use super::flag::Flag;
use super::word_node::WordNode;

/// Default bound on the number of tokens a single generation may emit.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Why a generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
	/// A token flagged as sentence end was emitted.
	SentenceEnd,
	/// The walk reached a node without successors.
	Leaf,
	/// The step bound was hit first. The tokens are still usable.
	StepLimit,
	/// Nothing to start from (empty store or unknown start token).
	Empty,
}

/// Output of a generation walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
	pub tokens: Vec<String>,
	pub termination: Termination,
}

impl Generation {
	fn empty() -> Self {
		Self { tokens: Vec::new(), termination: Termination::Empty }
	}

	/// `true` when the walk closed a sentence on its own.
	pub fn is_complete(&self) -> bool {
		self.termination == Termination::SentenceEnd
	}
}

/// Walks a `ChainStore` to produce token sequences.
///
/// # Selection policy
/// - `randomness == 0`: the successor with the strictly highest weight wins,
///   ties go to the first key in iteration order (lexicographic order of tokens).
/// - `randomness = p > 0`: successors are sorted by descending weight (ties keep
///   key order) and one of the top `max(1, floor(p * count))` is drawn uniformly.
///
/// The same policy picks the start token among the roots, restricted to roots
/// flagged as sentence start when there are any.
///
/// # Termination
/// A walk stops after emitting a sentence-end token, on a node without
/// successors, or once `max_steps` tokens were emitted, whichever comes first.
/// With `continuation` enabled, a leaf does not end the walk: it resumes from
/// the root entry of the last emitted token, so only the first and last rules
/// apply. The step bound keeps chained walks finite whatever the data.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampler {
	randomness: f32,
	max_steps: usize,
	continuation: bool,
}

impl Default for Sampler {
	fn default() -> Self {
		Self::new(0.0)
	}
}

impl Sampler {
	/// Creates a sampler. `randomness` is clamped to `[0.0, 1.0]`, NaN counts as 0.
	pub fn new(randomness: f32) -> Self {
		let randomness = if randomness.is_nan() { 0.0 } else { randomness.clamp(0.0, 1.0) };
		Self { randomness, max_steps: DEFAULT_MAX_STEPS, continuation: false }
	}

	/// Sets the step bound. At least one token is always allowed.
	pub fn with_max_steps(mut self, max_steps: usize) -> Self {
		self.max_steps = max_steps.max(1);
		self
	}

	pub fn with_continuation(mut self, continuation: bool) -> Self {
		self.continuation = continuation;
		self
	}

	pub fn randomness(&self) -> f32 {
		self.randomness
	}

	pub fn max_steps(&self) -> usize {
		self.max_steps
	}

	/// Generates a sequence from a start token chosen among the roots.
	///
	/// Does not touch the store. An empty store yields an empty sequence.
	pub fn generate<R: Rng + ?Sized>(&self, store: &ChainStore, rng: &mut R) -> Generation {
		let starters: Vec<&WordNode> = store
			.roots()
			.values()
			.filter(|node| node.flags().contains(Flag::SentenceStart))
			.collect();
		let start = if starters.is_empty() {
			self.pick(store.roots().values().collect(), rng)
		} else {
			self.pick(starters, rng)
		};

		match start {
			Some(node) => self.walk(store, node, rng),
			None => Generation::empty(),
		}
	}

	/// Generates a sequence starting at the root entry of `token`.
	///
	/// Yields an empty sequence when `token` is not a root.
	pub fn generate_from<R: Rng + ?Sized>(&self, store: &ChainStore, token: &str, rng: &mut R) -> Generation {
		match store.root(token) {
			Some(node) => self.walk(store, node, rng),
			None => Generation::empty(),
		}
	}

	fn walk<'a, R: Rng + ?Sized>(&self, store: &'a ChainStore, start: &'a WordNode, rng: &mut R) -> Generation {
		let mut tokens = vec![start.token().to_owned()];
		let mut node = start;

		let termination = loop {
			if node.ends_sentence() {
				break Termination::SentenceEnd;
			}

			let mut parent = node;
			if parent.is_leaf() {
				match self.reenter(store, parent) {
					Some(root) => parent = root,
					None => break Termination::Leaf,
				}
			}

			if tokens.len() >= self.max_steps {
				break Termination::StepLimit;
			}

			match self.pick(parent.children().values().collect(), rng) {
				Some(next) => {
					tokens.push(next.token().to_owned());
					node = next;
				}
				None => break Termination::Leaf,
			}
		};

		Generation { tokens, termination }
	}

	/// Root entry to resume from after `leaf`, if continuation applies.
	fn reenter<'a>(&self, store: &'a ChainStore, leaf: &WordNode) -> Option<&'a WordNode> {
		if !self.continuation {
			return None;
		}
		store.root(leaf.token()).filter(|root| !root.is_leaf())
	}

	/// Picks one candidate according to the selection policy.
	///
	/// `candidates` must be in key order for ties to resolve as documented.
	fn pick<'a, R: Rng + ?Sized>(&self, mut candidates: Vec<&'a WordNode>, rng: &mut R) -> Option<&'a WordNode> {
		if candidates.is_empty() {
			return None;
		}

		if self.randomness <= 0.0 {
			let mut best: Option<&WordNode> = None;
			for node in candidates {
				if best.is_none_or(|b| node.weight() > b.weight()) {
					best = Some(node);
				}
			}
			return best;
		}

		// Stable sort, equal weights keep their key order
		candidates.sort_by(|a, b| b.weight().cmp(&a.weight()));
		let range = breadth(self.randomness, candidates.len());
		Some(candidates[rng.random_range(0..range)])
	}
}

/// `max(1, floor(randomness * count))`, capped at `count`.
///
/// Computed in `f64` with a relative margin: an `f32` such as `0.53` is stored
/// slightly below its decimal value and would otherwise lose one candidate.
pub(crate) fn breadth(randomness: f32, count: usize) -> usize {
	let scaled = f64::from(randomness) * count as f64 * (1.0 + 1e-6);
	(scaled.floor() as usize).clamp(1, count.max(1))
}
