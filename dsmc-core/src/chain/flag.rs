use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Annotation attached to one observed occurrence of a token.
///
/// Flags are supplied by the tokenizer and merged (set union) every time the
/// same token is observed again in the same context.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Flag {
	/// The token opened a sentence.
	SentenceStart,
	/// The token closed a sentence. Generation stops on it.
	SentenceEnd,
	/// Capitalized token found in the middle of a sentence.
	ProperName,
}

impl Flag {
	/// Name used by the text codec.
	pub fn as_str(&self) -> &'static str {
		match self {
			Flag::SentenceStart => "START",
			Flag::SentenceEnd => "END",
			Flag::ProperName => "NAME",
		}
	}
}

impl fmt::Display for Flag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Flag {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"START" => Ok(Flag::SentenceStart),
			"END" => Ok(Flag::SentenceEnd),
			"NAME" => Ok(Flag::ProperName),
			other => Err(format!("unknown flag '{other}'")),
		}
	}
}

/// Ordered set of flags. Only ever grows.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags(BTreeSet<Flag>);

impl Flags {
	pub fn new() -> Self {
		Self(BTreeSet::new())
	}

	pub fn insert(&mut self, flag: Flag) {
		self.0.insert(flag);
	}

	/// Adds every flag of `other` to this set.
	pub fn union_with(&mut self, other: &Flags) {
		self.0.extend(other.0.iter().copied());
	}

	pub fn contains(&self, flag: Flag) -> bool {
		self.0.contains(&flag)
	}

	pub fn is_superset(&self, other: &Flags) -> bool {
		self.0.is_superset(&other.0)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
		self.0.iter().copied()
	}
}

impl FromIterator<Flag> for Flags {
	fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<const N: usize> From<[Flag; N]> for Flags {
	fn from(flags: [Flag; N]) -> Self {
		flags.into_iter().collect()
	}
}
