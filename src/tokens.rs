//! Whitespace separated number streams, with line numbers kept for errors

use nom::{
	character::complete::{space0, space1},
	combinator::{all_consuming, opt},
	multi::separated_list0,
	number::complete::double,
	sequence::delimited,
	IResult, Parser,
};

use crate::{Error, Result};

fn numbers(input: &str) -> IResult<&str, Vec<f64>> {
	all_consuming(delimited(space0, separated_list0(space1, double), opt(space0)))
		.parse(input)
}

pub(crate) struct Tokens {
	values: Vec<(f64, usize)>,
	pos: usize,
}

impl Tokens {
	pub fn parse(input: &str) -> Result<Self> {
		let mut values = Vec::new();
		for (idx, line) in input.lines().enumerate() {
			let line = line.trim_end_matches('\r');
			let (_, nums) = numbers(line)
				.map_err(|_| Error::parse(idx + 1, format!("expected numbers, got \"{}\"", line.trim())))?;
			values.extend(nums.into_iter().map(|v| (v, idx + 1)));
		}
		Ok(Self { values, pos: 0 })
	}

	pub fn is_empty(&self) -> bool {
		self.pos >= self.values.len()
	}

	/// Line of the next token (or the last line when exhausted)
	pub fn line(&self) -> usize {
		self.values.get(self.pos)
			.or_else(|| self.values.last())
			.map_or(0, |v| v.1)
	}

	pub fn float(&mut self, what: &str) -> Result<f64> {
		let (v, _) = *self.values.get(self.pos)
			.ok_or_else(|| Error::parse(self.line(), format!("stream ended before {}", what)))?;
		self.pos += 1;
		Ok(v)
	}

	pub fn int(&mut self, what: &str) -> Result<i64> {
		let line = self.line();
		let v = self.float(what)?;
		if v.fract() != 0.0 || !v.is_finite() {
			return Err(Error::parse(line, format!("{} must be an integer, got {}", what, v)))
		}
		// i64::MAX itself rounds up to 2^63 as f64
		if v >= i64::MAX as f64 || v < i64::MIN as f64 {
			return Err(Error::parse(line, format!("{} out of range, got {}", what, v)))
		}
		Ok(v as i64)
	}

	pub fn index(&mut self, what: &str) -> Result<usize> {
		let line = self.line();
		let v = self.int(what)?;
		usize::try_from(v)
			.map_err(|_| Error::parse(line, format!("{} must not be negative, got {}", what, v)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tokens() {
		let mut t = Tokens::parse("700 1 0 0\n  3 0 \n\n0.5 -1e-3\n").unwrap();
		assert_eq!(t.index("class").unwrap(), 700);
		assert_eq!(t.int("major").unwrap(), 1);
		t.int("minor").unwrap();
		t.int("aux").unwrap();
		assert_eq!(t.line(), 2);
		assert_eq!(t.index("dim").unwrap(), 3);
		t.index("rational").unwrap();
		assert!(t.int("half").is_err());
		assert_eq!(t.float("small").unwrap(), -1e-3);
		assert!(t.is_empty());
		assert!(t.float("more").is_err());
	}

	#[test]
	fn test_bad_token() {
		match Tokens::parse("1 2\n3 x 4\n") {
			Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
			_ => panic!("expected parse error"),
		}
	}

	#[test]
	fn test_negative_index() {
		let mut t = Tokens::parse("-2 1e30").unwrap();
		assert!(t.index("count").is_err());
		assert!(t.int("huge").is_err());
	}
}
