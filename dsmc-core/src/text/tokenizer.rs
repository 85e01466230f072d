use crate::chain::{Flag, Occurrence};

/// Characters that may trail a sentence terminator, as in `"Stop!"` or `(see above.)`.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '»', '”', '’'];

/// Splits text into sentences of flagged tokens.
///
/// - Tokens are whitespace-separated words, punctuation stays attached
/// - A token ending in `.`, `!` or `?` (possibly followed by closing quotes or
///   brackets) ends its sentence and is flagged `SentenceEnd`
/// - The first token of each sentence is flagged `SentenceStart`
/// - A later token starting with an uppercase letter is flagged `ProperName`
///
/// Trailing tokens without a terminator form a last, open sentence.
pub fn tokenize(text: &str) -> Vec<Vec<Occurrence>> {
	let mut sentences = Vec::new();
	let mut current: Vec<Occurrence> = Vec::new();

	for word in text.split_whitespace() {
		let mut occurrence = Occurrence::new(word);
		if current.is_empty() {
			occurrence = occurrence.with_flag(Flag::SentenceStart);
		} else if word.chars().next().is_some_and(char::is_uppercase) {
			occurrence = occurrence.with_flag(Flag::ProperName);
		}

		let ends = ends_sentence(word);
		if ends {
			occurrence = occurrence.with_flag(Flag::SentenceEnd);
		}
		current.push(occurrence);

		if ends {
			sentences.push(std::mem::take(&mut current));
		}
	}

	if !current.is_empty() {
		sentences.push(current);
	}
	sentences
}

fn ends_sentence(word: &str) -> bool {
	word.trim_end_matches(CLOSERS).ends_with(['.', '!', '?'])
}

#[cfg(test)]
mod tests {
	use super::*;

	fn tokens(sentence: &[Occurrence]) -> Vec<&str> {
		sentence.iter().map(|o| o.token.as_str()).collect()
	}

	#[test]
	fn splits_on_terminators() {
		let sentences = tokenize("The fox ran. Did it?  Yes!\nmaybe not");
		assert_eq!(sentences.len(), 4);
		assert_eq!(tokens(&sentences[0]), ["The", "fox", "ran."]);
		assert_eq!(tokens(&sentences[1]), ["Did", "it?"]);
		assert_eq!(tokens(&sentences[2]), ["Yes!"]);
		assert_eq!(tokens(&sentences[3]), ["maybe", "not"]);
	}

	#[test]
	fn flags_starts_ends_and_names() {
		let sentences = tokenize("then Alice said \"stop.\"");
		let s = &sentences[0];
		assert!(s[0].flags.contains(Flag::SentenceStart));
		assert!(!s[0].flags.contains(Flag::ProperName));
		assert!(s[1].flags.contains(Flag::ProperName));
		assert!(s[2].flags.is_empty());
		assert!(s[3].flags.contains(Flag::SentenceEnd));
	}

	#[test]
	fn one_word_sentence_is_start_and_end() {
		let sentences = tokenize("Hi.");
		assert!(sentences[0][0].flags.contains(Flag::SentenceStart));
		assert!(sentences[0][0].flags.contains(Flag::SentenceEnd));
	}

	#[test]
	fn blank_text_has_no_sentences() {
		assert!(tokenize(" \n\t ").is_empty());
	}
}
