use dsmc_core::chain::{ChainStore, Flag, Occurrence, Sampler, Termination, WordNode};
use dsmc_core::codec::{self, Format};
use dsmc_core::DsmcError;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn token() -> impl Strategy<Value = String> {
	prop_oneof![
		8 => "[a-d]{1,2}",
		1 => Just(String::new()),
		1 => "[a %\t]{1,3}",
	]
}

fn occurrence() -> impl Strategy<Value = Occurrence> {
	(token(), 0u8..8).prop_map(|(token, bits)| {
		let mut occurrence = Occurrence::new(token);
		for (bit, flag) in [Flag::SentenceStart, Flag::SentenceEnd, Flag::ProperName].into_iter().enumerate() {
			if bits & (1 << bit) != 0 {
				occurrence = occurrence.with_flag(flag);
			}
		}
		occurrence
	})
}

fn windows(order: usize) -> impl Strategy<Value = Vec<Vec<Occurrence>>> {
	prop::collection::vec(prop::collection::vec(occurrence(), 0..=order), 0..20)
}

fn build(order: usize, windows: &[Vec<Occurrence>]) -> ChainStore {
	let mut store = ChainStore::new(order).expect("valid order");
	for window in windows {
		store.insert(window);
	}
	store
}

/// Weight of the node reached by following `window` from the roots.
fn path_weights(store: &ChainStore, window: &[Occurrence]) -> Vec<u64> {
	let mut weights = Vec::new();
	let mut node: Option<&WordNode> = None;
	for occurrence in window {
		let next = match node {
			None => store.root(&occurrence.token),
			Some(parent) => parent.child(&occurrence.token),
		};
		let Some(next) = next else { break };
		weights.push(next.weight());
		node = Some(next);
	}
	weights
}

proptest! {
	#[test]
	fn text_format_round_trips(order in 1usize..5, windows in windows(4)) {
		let store = build(order, &windows);
		let bytes = codec::to_bytes(&store, Format::Text).unwrap();
		prop_assert_eq!(codec::from_bytes(&bytes, Format::Text).unwrap(), store);
	}

	#[test]
	fn binary_format_round_trips(order in 1usize..5, windows in windows(4)) {
		let store = build(order, &windows);
		let bytes = codec::to_bytes(&store, Format::Binary).unwrap();
		prop_assert_eq!(codec::from_bytes(&bytes, Format::Binary).unwrap(), store);
	}

	#[test]
	fn reinserting_bumps_each_position_by_one(windows in windows(3), extra in prop::collection::vec(occurrence(), 1..=3)) {
		let before = build(3, &windows);
		let mut after = before.clone();
		after.insert(&extra);

		let old = path_weights(&before, &extra);
		let new = path_weights(&after, &extra);
		prop_assert_eq!(new.len(), extra.len());
		for (i, weight) in new.iter().enumerate() {
			prop_assert_eq!(*weight, old.get(i).copied().unwrap_or(0) + 1);
		}
	}

	#[test]
	fn flags_never_disappear(windows in windows(3), extra in prop::collection::vec(occurrence(), 1..=3)) {
		let before = build(3, &windows);
		let mut after = before.clone();
		after.insert(&extra);

		let mut old_node: Option<&WordNode> = None;
		let mut new_node: Option<&WordNode> = None;
		// Once the path leaves the old trie every deeper node is new
		let mut on_old_path = true;
		for occurrence in &extra {
			let new = match new_node {
				None => after.root(&occurrence.token),
				Some(parent) => parent.child(&occurrence.token),
			}.unwrap();
			prop_assert!(new.flags().is_superset(&occurrence.flags));

			let old = if on_old_path {
				match old_node {
					None => before.root(&occurrence.token),
					Some(parent) => parent.child(&occurrence.token),
				}
			} else {
				None
			};
			match old {
				Some(old) => prop_assert!(new.flags().is_superset(old.flags())),
				None => on_old_path = false,
			}
			old_node = old;
			new_node = Some(new);
		}
	}

	#[test]
	fn deterministic_generation_repeats(order in 1usize..4, windows in windows(3), seed in any::<u64>()) {
		let store = build(order, &windows);
		let sampler = Sampler::new(0.0).with_continuation(true).with_max_steps(200);
		let first = sampler.generate(&store, &mut StdRng::seed_from_u64(seed));
		let second = sampler.generate(&store, &mut StdRng::seed_from_u64(seed.wrapping_add(1)));
		prop_assert_eq!(first, second);
	}

	#[test]
	fn generation_stays_within_the_step_bound(windows in windows(3), randomness in 0.0f32..=1.0, steps in 1usize..50, seed in any::<u64>()) {
		let store = build(3, &windows);
		let sampler = Sampler::new(randomness).with_continuation(true).with_max_steps(steps);
		let generation = sampler.generate(&store, &mut StdRng::seed_from_u64(seed));
		prop_assert!(generation.tokens.len() <= steps);
		prop_assert_eq!(generation.tokens.is_empty(), store.is_empty());
		if generation.termination == Termination::StepLimit {
			prop_assert_eq!(generation.tokens.len(), steps);
		}
	}
}

#[test]
fn fox_scenario() {
	let mut store = ChainStore::new(3).unwrap();
	let fox = Occurrence::new("fox").with_flag(Flag::SentenceEnd);
	store.insert(&[Occurrence::new("the"), Occurrence::new("quick"), fox.clone()]);
	store.insert(&[Occurrence::new("the"), Occurrence::new("slow"), fox]);

	let the = store.root("the").unwrap();
	assert_eq!(the.weight(), 2);
	assert_eq!(the.child("quick").map(WordNode::weight), Some(1));
	assert_eq!(the.child("slow").map(WordNode::weight), Some(1));

	let generation = Sampler::new(0.0).generate(&store, &mut StdRng::seed_from_u64(0));
	assert_eq!(generation.tokens, ["the", "quick", "fox"]);
	assert_eq!(generation.termination, Termination::SentenceEnd);
}

#[test]
fn truncated_file_is_reported_not_loaded() {
	let dir = tempfile::tempdir().expect("tempdir");
	let path = dir.path().join("data.txt");

	let mut store = ChainStore::new(2).unwrap();
	store.insert(&[Occurrence::new("hello"), Occurrence::new("world")]);
	codec::save_file(&store, &path).unwrap();

	let text = std::fs::read_to_string(&path).unwrap();
	std::fs::write(&path, &text[..text.len() / 2]).unwrap();

	assert!(matches!(codec::load_file(&path, 2), Err(DsmcError::MalformedPersistedData { .. })));
}
