//! Property codes attached to patch-local entities, and their text forms

use nom::{
	bytes::complete::take_till1,
	character::complete::{space0, space1},
	combinator::all_consuming,
	multi::separated_list0,
	sequence::delimited,
	IResult, Parser,
};
use serde::{Serialize, Deserialize};
use serde_with::serde_as;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use crate::{Error, Result};

/// Opaque tag, either numeric or text. A model holds only one of the kinds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyCode {
	Int(i64),
	Text(String),
}

impl PropertyCode {
	pub fn parse(s: &str) -> Self {
		match s.parse::<i64>() {
			Ok(i) => PropertyCode::Int(i),
			Err(_) => PropertyCode::Text(s.to_string()),
		}
	}

	pub fn same_kind(&self, other: &PropertyCode) -> bool {
		std::mem::discriminant(self) == std::mem::discriminant(other)
	}

	/// The same code as a text tag
	pub fn to_text(&self) -> PropertyCode {
		PropertyCode::Text(self.to_string())
	}
}

impl fmt::Display for PropertyCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PropertyCode::Int(i) => write!(f, "{}", i),
			PropertyCode::Text(s) => write!(f, "{}", s),
		}
	}
}

impl From<i64> for PropertyCode {
	fn from(i: i64) -> Self {
		PropertyCode::Int(i)
	}
}

impl From<i32> for PropertyCode {
	fn from(i: i32) -> Self {
		PropertyCode::Int(i.into())
	}
}

impl From<&str> for PropertyCode {
	fn from(s: &str) -> Self {
		PropertyCode::Text(s.to_string())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
	Volume,
	Face,
	Line,
	Vertex,
}

impl EntityKind {
	pub fn keyword(self) -> &'static str {
		match self {
			EntityKind::Volume => "volume",
			EntityKind::Face => "face",
			EntityKind::Line => "line",
			EntityKind::Vertex => "vertex",
		}
	}

	fn xml_type(self) -> &'static str {
		match self {
			EntityKind::Line => "edge",
			k => k.keyword(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
	pub patch: usize,
	pub kind: EntityKind,
	pub local: usize,
}

impl EntityKey {
	pub fn new(patch: usize, kind: EntityKind, local: usize) -> Self {
		Self { patch, kind, local }
	}
}

#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyTable {
	#[serde_as(as = "Vec<(_, _)>")]
	codes: BTreeMap<EntityKey, PropertyCode>,
}

impl PropertyTable {
	pub fn get(&self, key: &EntityKey) -> Option<&PropertyCode> {
		self.codes.get(key)
	}

	pub fn is_empty(&self) -> bool {
		self.codes.is_empty()
	}

	pub fn len(&self) -> usize {
		self.codes.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &PropertyCode)> {
		self.codes.iter()
	}

	pub fn is_text_coded(&self) -> bool {
		matches!(self.codes.values().next(), Some(PropertyCode::Text(_)))
	}

	pub fn check_kind(&self, code: &PropertyCode) -> Result<()> {
		match self.codes.values().next() {
			Some(c) if !c.same_kind(code) => Err(Error::MixedPropertyCodes),
			_ => Ok(()),
		}
	}

	/// Set unconditionally, or only where no code exists yet
	pub fn set(&mut self, key: EntityKey, code: &PropertyCode, overwrite: bool) {
		if overwrite || !self.codes.contains_key(&key) {
			self.codes.insert(key, code.clone());
		}
	}

	pub fn clear(&mut self) {
		self.codes.clear();
	}

	/// Relabel the codes of `patch` after its direction `dir` was reversed
	pub fn reflect(&mut self, patch: usize, dir: usize, volume: bool) {
		let keys: Vec<EntityKey> = self.codes.keys()
			.filter(|k| k.patch == patch)
			.copied()
			.collect();
		let moved: Vec<(EntityKey, PropertyCode)> = keys.into_iter()
			.filter_map(|k| self.codes.remove(&k).map(|c| (k, c)))
			.collect();
		for (mut k, code) in moved {
			k.local = match k.kind {
				EntityKind::Volume => k.local,
				EntityKind::Vertex => k.local ^ (1 << dir),
				EntityKind::Face if k.local / 2 == dir => k.local ^ 1,
				EntityKind::Face => k.local,
				EntityKind::Line if volume => {
					let along = k.local / 4;
					let fixed: Vec<usize> = (0..3).filter(|d| *d != along).collect();
					if along == dir {
						k.local
					} else if fixed[0] == dir {
						k.local ^ 1
					} else {
						k.local ^ 2
					}
				}
				// surface edge e lies on side e % 2 of direction e / 2
				EntityKind::Line if k.local / 2 == dir => k.local ^ 1,
				EntityKind::Line => k.local,
			};
			self.codes.insert(k, code);
		}
	}

	/// One command per code, readable by `parse_commands`
	pub fn write<W: Write>(&self, os: &mut W) -> Result<()> {
		for (key, code) in self.codes.iter() {
			match key.kind {
				EntityKind::Volume => writeln!(os, "volume {} {} exclusive", key.patch, code)?,
				EntityKind::Vertex => writeln!(os, "vertex {} {} {}", key.patch, key.local, code)?,
				kind => writeln!(os, "{} {} {} {} exclusive", kind.keyword(), key.patch, key.local, code)?,
			}
		}
		Ok(())
	}

	/// Topology sets grouped by code, with 1-based patch and entity ids
	pub fn write_xml<W: Write>(&self, os: &mut W) -> Result<()> {
		let mut sets: BTreeMap<(&PropertyCode, EntityKind), BTreeMap<usize, Vec<usize>>> = BTreeMap::new();
		for (key, code) in self.codes.iter() {
			sets.entry((code, key.kind))
				.or_default()
				.entry(key.patch)
				.or_default()
				.push(key.local);
		}
		writeln!(os, "<topologysets>")?;
		for ((code, kind), items) in sets {
			writeln!(os, "  <set name=\"{}\" type=\"{}\">", xml_escape(&code.to_string()), kind.xml_type())?;
			for (patch, locals) in items {
				if kind == EntityKind::Volume {
					writeln!(os, "    <item patch=\"{}\"/>", patch + 1)?;
				} else {
					let ids: Vec<String> = locals.iter().map(|l| (l + 1).to_string()).collect();
					writeln!(os, "    <item patch=\"{}\">{}</item>", patch + 1, ids.join(" "))?;
				}
			}
			writeln!(os, "  </set>")?;
		}
		writeln!(os, "</topologysets>")?;
		Ok(())
	}
}

fn xml_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

/// One line of a property stream
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyCommand {
	pub kind: EntityKind,
	pub patch: usize,
	pub local: usize,
	pub code: PropertyCode,
	/// `None` keeps the default for the entity kind
	pub inclusive: Option<bool>,
}

fn words(input: &str) -> IResult<&str, Vec<&str>> {
	all_consuming(delimited(
		space0,
		separated_list0(space1, take_till1(|c: char| c.is_whitespace())),
		space0,
	))
	.parse(input)
}

fn parse_command(words: &[&str], line: usize) -> Result<PropertyCommand> {
	let number = |s: &str, what: &str| {
		s.parse::<usize>()
			.map_err(|_| Error::parse(line, format!("{} must be a non-negative integer, got \"{}\"", what, s)))
	};
	let kind = match words[0].to_ascii_lowercase().as_str() {
		"volume" => EntityKind::Volume,
		"face" => EntityKind::Face,
		"line" | "edge" => EntityKind::Line,
		"vertex" => EntityKind::Vertex,
		other => return Err(Error::parse(line, format!("unknown entity \"{}\"", other))),
	};
	let ids = if kind == EntityKind::Volume { 1 } else { 2 };
	let max_words = if kind == EntityKind::Vertex { ids + 2 } else { ids + 3 };
	if words.len() < ids + 2 || words.len() > max_words {
		return Err(Error::parse(line, format!("wrong number of fields for {}", kind.keyword())))
	}
	let patch = number(words[1], "patch")?;
	let local = if ids == 2 { number(words[2], "local id")? } else { 0 };
	let inclusive = match words.get(ids + 2).map(|w| w.to_ascii_lowercase()) {
		None => None,
		Some(w) if w == "inclusive" => Some(true),
		Some(w) if w == "exclusive" => Some(false),
		Some(w) => return Err(Error::parse(line, format!("unknown flag \"{}\"", w))),
	};
	Ok(PropertyCommand {
		kind,
		patch,
		local,
		code: PropertyCode::parse(words[ids + 1]),
		inclusive,
	})
}

/// Parse a property stream; blank lines and `#` comments are skipped
pub fn parse_commands(input: &str) -> Result<Vec<PropertyCommand>> {
	let mut out = Vec::new();
	for (idx, raw) in input.lines().enumerate() {
		let text = raw.split('#').next().unwrap_or("");
		let (_, w) = words(text).map_err(|_| Error::parse(idx + 1, "unreadable line"))?;
		if w.is_empty() {
			continue
		}
		out.push(parse_command(&w, idx + 1)?);
	}
	Ok(out)
}
