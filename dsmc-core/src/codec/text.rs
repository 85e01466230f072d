//! Whitespace-delimited text encoding of a `ChainStore`.
//!
//! ```text
//! <order>
//! <root_count>
//! (<token> <node>) * root_count
//!
//! node := <token> <weight>
//!         <flag_count> <flag_name> * flag_count
//!         <child_count> (<token> <node>) * child_count
//! ```
//!
//! Any whitespace separates fields, line breaks are cosmetic. Tokens holding
//! `%` or whitespace are percent-escaped byte by byte, the empty token is a
//! lone `%`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::str::SplitWhitespace;

use crate::chain::{ChainStore, Flag, Flags, MAX_ORDER, WordNode};
use crate::error::{DsmcError, Result};

/// Encodes the whole store.
pub fn encode(store: &ChainStore) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", store.order());
	let _ = writeln!(out, "{}", store.len());
	for (key, node) in store.roots() {
		let _ = writeln!(out, "{}", escape(key));
		encode_node(node, &mut out);
	}
	out
}

fn encode_node(node: &WordNode, out: &mut String) {
	let _ = writeln!(out, "{} {}", escape(node.token()), node.weight());
	let _ = writeln!(out, "{}", node.flags().len());
	for flag in node.flags().iter() {
		let _ = writeln!(out, "{flag}");
	}
	let _ = writeln!(out, "{}", node.children().len());
	for (key, child) in node.children() {
		let _ = writeln!(out, "{}", escape(key));
		encode_node(child, out);
	}
}

/// Decodes a store, validating every field.
///
/// # Errors
/// Returns `MalformedPersistedData` on the first field that is missing, does
/// not parse, or breaks a structural invariant. No partial store is returned.
pub fn decode(input: &str) -> Result<ChainStore> {
	let mut reader = FieldReader::new(input);

	let order: usize = reader.next_number("order")?;
	if !(1..=MAX_ORDER).contains(&order) {
		return Err(reader.error(format!("order must be between 1 and {MAX_ORDER}, got {order}")));
	}
	let root_count: usize = reader.next_number("root count")?;

	let mut roots = BTreeMap::new();
	for _ in 0..root_count {
		let (key, node) = decode_entry(&mut reader, 1, order)?;
		if roots.insert(key, node).is_some() {
			return Err(reader.error("duplicate root token"));
		}
	}

	if let Ok(field) = reader.next_field("end of data") {
		return Err(reader.error(format!("trailing field '{field}' after the last root")));
	}

	Ok(ChainStore::from_parts(order, roots))
}

fn decode_entry(reader: &mut FieldReader<'_>, depth: usize, order: usize) -> Result<(String, WordNode)> {
	if depth > order {
		return Err(reader.error(format!("nesting deeper than order {order}")));
	}

	let key = reader.next_token("entry key")?;
	let token = reader.next_token("node token")?;
	if key != token {
		return Err(reader.error(format!("entry key '{key}' does not match node token '{token}'")));
	}

	let weight: u64 = reader.next_number("weight")?;
	if weight == 0 {
		return Err(reader.error("weight must be >= 1"));
	}

	let flag_count: usize = reader.next_number("flag count")?;
	if flag_count > 3 {
		return Err(reader.error(format!("{flag_count} flags, at most 3 exist")));
	}
	let mut flags = Flags::new();
	for _ in 0..flag_count {
		let flag: Flag = reader
			.next_field("flag name")?
			.parse()
			.map_err(|e: String| reader.error(e))?;
		if flags.contains(flag) {
			return Err(reader.error(format!("duplicate flag {flag}")));
		}
		flags.insert(flag);
	}

	let child_count: usize = reader.next_number("child count")?;
	let mut children = BTreeMap::new();
	for _ in 0..child_count {
		let (child_key, child) = decode_entry(reader, depth + 1, order)?;
		if children.insert(child_key, child).is_some() {
			return Err(reader.error("duplicate child token"));
		}
	}

	Ok((key, WordNode::from_parts(token, weight, flags, children)))
}

/// Sequential access to whitespace-delimited fields, tracking the position
/// of the last field read for error reporting.
struct FieldReader<'a> {
	fields: SplitWhitespace<'a>,
	position: usize,
	started: bool,
}

impl<'a> FieldReader<'a> {
	fn new(input: &'a str) -> Self {
		Self { fields: input.split_whitespace(), position: 0, started: false }
	}

	fn next_field(&mut self, what: &str) -> Result<&'a str> {
		if self.started {
			self.position += 1;
		}
		self.started = true;
		self.fields
			.next()
			.ok_or_else(|| DsmcError::malformed(self.position, format!("unexpected end of data, expected {what}")))
	}

	fn next_number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
		let field = self.next_field(what)?;
		field
			.parse()
			.map_err(|_| self.error(format!("expected {what}, got '{field}'")))
	}

	fn next_token(&mut self, what: &str) -> Result<String> {
		let field = self.next_field(what)?;
		unescape(field).map_err(|e| self.error(e))
	}

	fn error(&self, reason: impl Into<String>) -> DsmcError {
		DsmcError::malformed(self.position, reason)
	}
}

fn needs_escape(c: char) -> bool {
	c == '%' || c.is_whitespace()
}

/// Makes a token safe to store as a single whitespace-free field.
pub(crate) fn escape(token: &str) -> Cow<'_, str> {
	if token.is_empty() {
		return Cow::Borrowed("%");
	}
	if !token.chars().any(needs_escape) {
		return Cow::Borrowed(token);
	}

	let mut out = String::with_capacity(token.len() + 8);
	let mut buf = [0u8; 4];
	for c in token.chars() {
		if needs_escape(c) {
			for byte in c.encode_utf8(&mut buf).bytes() {
				let _ = write!(out, "%{byte:02X}");
			}
		} else {
			out.push(c);
		}
	}
	Cow::Owned(out)
}

/// Reverses `escape`.
pub(crate) fn unescape(field: &str) -> std::result::Result<String, String> {
	if field == "%" {
		return Ok(String::new());
	}
	if !field.contains('%') {
		return Ok(field.to_owned());
	}

	let bytes = field.as_bytes();
	let mut out = Vec::with_capacity(bytes.len());
	let mut i = 0;
	while i < bytes.len() {
		if bytes[i] == b'%' {
			let high = bytes.get(i + 1).and_then(|b| hex_value(*b));
			let low = bytes.get(i + 2).and_then(|b| hex_value(*b));
			match (high, low) {
				(Some(high), Some(low)) => out.push(high << 4 | low),
				_ => return Err(format!("bad escape sequence in '{field}'")),
			}
			i += 3;
		} else {
			out.push(bytes[i]);
			i += 1;
		}
	}
	String::from_utf8(out).map_err(|_| format!("escaped token '{field}' is not valid UTF-8"))
}

fn hex_value(byte: u8) -> Option<u8> {
	(byte as char).to_digit(16).map(|d| d as u8)
}
