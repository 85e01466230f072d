//! Engine configuration shared by the binaries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::chain::{DEFAULT_MAX_STEPS, MAX_ORDER, Sampler};
use crate::error::{DsmcError, Result};

pub const DEFAULT_ORDER: usize = 3;
pub const DEFAULT_DATABASE: &str = "data.txt";

/// Settings consumed by the chain engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
	/// Markov order: tokens per insertion window.
	pub order: usize,
	/// Sampling breadth, 0.0 (always the heaviest successor) to 1.0 (any successor).
	pub randomness: f32,
	/// Bound on the tokens emitted by one generation.
	pub max_steps: usize,
	/// Resume walks from the roots when they reach a leaf.
	pub continuation: bool,
	/// Database file. `.bin` selects binary snapshots.
	pub database: PathBuf,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			order: DEFAULT_ORDER,
			randomness: 0.0,
			max_steps: DEFAULT_MAX_STEPS,
			continuation: false,
			database: PathBuf::from(DEFAULT_DATABASE),
		}
	}
}

impl EngineConfig {
	/// Sets the randomness, clamping values above 1.0 down to 1.0.
	///
	/// Anything else (negative, NaN) is kept as is for `validate` to reject.
	pub fn with_randomness(mut self, randomness: f32) -> Self {
		self.randomness = if randomness > 1.0 { 1.0 } else { randomness };
		self
	}

	/// Validates the invariants required by the engine.
	pub fn validate(&self) -> Result<()> {
		if self.order == 0 || self.order > MAX_ORDER {
			return Err(DsmcError::InvalidConfig(format!(
				"order must be between 1 and {MAX_ORDER}, got {}",
				self.order
			)));
		}
		if !(0.0..=1.0).contains(&self.randomness) {
			return Err(DsmcError::InvalidConfig(format!(
				"randomness must be between 0.0 and 1.0, got {}",
				self.randomness
			)));
		}
		if self.max_steps == 0 {
			return Err(DsmcError::InvalidConfig("max_steps must be greater than zero".into()));
		}
		Ok(())
	}

	/// Sampler matching this configuration.
	pub fn sampler(&self) -> Sampler {
		Sampler::new(self.randomness)
			.with_max_steps(self.max_steps)
			.with_continuation(self.continuation)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = EngineConfig::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.order, 3);
		assert_eq!(config.database, PathBuf::from("data.txt"));
	}

	#[test]
	fn randomness_above_one_is_clamped() {
		let config = EngineConfig::default().with_randomness(3.5);
		assert_eq!(config.randomness, 1.0);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn invalid_values_are_rejected() {
		let negative = EngineConfig::default().with_randomness(-0.1);
		assert!(matches!(negative.validate(), Err(DsmcError::InvalidConfig(_))));
		let nan = EngineConfig::default().with_randomness(f32::NAN);
		assert!(nan.randomness.is_nan());
		assert!(matches!(nan.validate(), Err(DsmcError::InvalidConfig(_))));
		let zero_order = EngineConfig { order: 0, ..EngineConfig::default() };
		assert!(zero_order.validate().is_err());
		let huge_order = EngineConfig { order: MAX_ORDER + 1, ..EngineConfig::default() };
		assert!(huge_order.validate().is_err());
		let zero_steps = EngineConfig { max_steps: 0, ..EngineConfig::default() };
		assert!(zero_steps.validate().is_err());
	}

	#[test]
	fn sampler_carries_the_settings() {
		let config = EngineConfig { max_steps: 12, continuation: true, ..EngineConfig::default() }.with_randomness(0.4);
		let sampler = config.sampler();
		assert_eq!(sampler.randomness(), 0.4);
		assert_eq!(sampler.max_steps(), 12);
	}
}
