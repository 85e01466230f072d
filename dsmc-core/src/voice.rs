use rand::Rng;

use crate::chain::{Sampler, SharedChain};
use crate::error::Result;

/// Turns generated token sequences into printable sentences.
#[derive(Clone, Debug, Default)]
pub struct Voice {
	sampler: Sampler,
}

impl Voice {
	pub fn new(sampler: Sampler) -> Self {
		Self { sampler }
	}

	/// Generates up to `count` sentences. Empty walks are skipped, so an empty
	/// chain yields no sentence at all.
	pub fn speak<R: Rng + ?Sized>(&self, chain: &SharedChain, count: usize, rng: &mut R) -> Result<Vec<String>> {
		let mut sentences = Vec::with_capacity(count);
		for _ in 0..count {
			let generation = chain.generate(&self.sampler, rng)?;
			if !generation.tokens.is_empty() {
				sentences.push(Self::join(&generation.tokens));
			}
		}
		Ok(sentences)
	}

	/// Joins tokens with single spaces and capitalizes the first letter.
	pub fn join(tokens: &[String]) -> String {
		let sentence = tokens.join(" ");
		let mut chars = sentence.chars();
		match chars.next() {
			Some(first) => first.to_uppercase().chain(chars).collect(),
			None => sentence,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::chain::ChainStore;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn join_capitalizes() {
		let tokens = ["élan".to_owned(), "vital.".to_owned()];
		assert_eq!(Voice::join(&tokens), "Élan vital.");
		assert_eq!(Voice::join(&[]), "");
	}

	#[test]
	fn speaks_the_requested_count() {
		let chain = SharedChain::new(ChainStore::new(3).unwrap());
		chain.learn("the cat sat on the mat.").unwrap();
		let sentences = Voice::default().speak(&chain, 3, &mut StdRng::seed_from_u64(1)).unwrap();
		assert_eq!(sentences, vec!["The cat sat"; 3]);
	}

	#[test]
	fn empty_chain_is_silent() {
		let chain = SharedChain::new(ChainStore::new(3).unwrap());
		let sentences = Voice::default().speak(&chain, 2, &mut StdRng::seed_from_u64(1)).unwrap();
		assert!(sentences.is_empty());
	}
}
