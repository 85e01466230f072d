//! Cleanup of Project Gutenberg books before tokenization.

const START_MARKER: &str = "*** START OF";
const END_MARKER: &str = "*** END OF";
const DROPPED_BLOCKS: &[&str] = &["[Illustration", "[Footnote"];

/// Strips Gutenberg boilerplate and typographic noise from a book.
///
/// - Keeps only the lines between the `*** START OF` and `*** END OF`
///   marker lines, when those markers are present
/// - Drops `[Illustration ...]` and `[Footnote ...]` blocks, even across lines
/// - Removes `_` emphasis markers
pub fn clean(text: &str) -> String {
	let body = strip_license(text);
	drop_blocks(&body).replace('_', "")
}

fn strip_license(text: &str) -> String {
	let lines: Vec<&str> = text.lines().collect();
	let start = lines
		.iter()
		.position(|line| line.trim_start().starts_with(START_MARKER))
		.map_or(0, |i| i + 1);
	let end = lines[start..]
		.iter()
		.position(|line| line.trim_start().starts_with(END_MARKER))
		.map_or(lines.len(), |i| start + i);
	lines[start..end].join("\n")
}

fn drop_blocks(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut rest = text;
	while let Some(start) = DROPPED_BLOCKS.iter().filter_map(|marker| rest.find(marker)).min() {
		out.push_str(&rest[..start]);
		rest = match rest[start..].find(']') {
			Some(end) => &rest[start + end + 1..],
			None => "",
		};
	}
	out.push_str(rest);
	out
}
