//! Reading and writing patches in the GoTools text format.
//!
//! Each patch is a header `200 1 0 0` (surface) or `700 1 0 0` (volume),
//! then `dim rational`, then per direction `n order` with its knot vector,
//! then the coefficient rows.

use std::io::Write;

use crate::spline::{Basis, SplinePatch};
use crate::tokens::Tokens;
use crate::{Error, Result};

pub const SURFACE_CLASS: usize = 200;
pub const VOLUME_CLASS: usize = 700;

fn read_patch(t: &mut Tokens) -> Result<SplinePatch> {
	let line = t.line();
	let class = t.index("class type")?;
	let pdim = match class {
		SURFACE_CLASS => 2,
		VOLUME_CLASS => 3,
		_ => return Err(Error::parse(line, format!("unsupported class type {}", class))),
	};
	for what in ["major version", "minor version", "auxiliary field"] {
		t.int(what)?;
	}
	let dim = t.index("dimension")?;
	let rational = t.index("rational flag")? != 0;

	let mut bases = Vec::with_capacity(pdim);
	for _ in 0..pdim {
		let line = t.line();
		let n = t.index("number of coefficients")?;
		let order = t.index("order")?;
		let knots = (0..n + order)
			.map(|_| t.float("knot"))
			.collect::<Result<Vec<_>>>()?;
		let basis = Basis::new(order, knots).map_err(|e| Error::parse(line, e.to_string()))?;
		if basis.num_coefs() != n {
			return Err(Error::parse(line, "coefficient count does not match knots"))
		}
		bases.push(basis);
	}

	let line = t.line();
	let count = bases.iter().map(Basis::num_coefs).product::<usize>() * (dim + rational as usize);
	let coefs = (0..count)
		.map(|_| t.float("coefficient"))
		.collect::<Result<Vec<_>>>()?;
	SplinePatch::new(bases, dim, rational, coefs).map_err(|e| Error::parse(line, e.to_string()))
}

pub fn read_splines(input: &str) -> Result<Vec<SplinePatch>> {
	let mut t = Tokens::parse(input)?;
	let mut patches = Vec::new();
	while !t.is_empty() {
		patches.push(read_patch(&mut t)?);
	}
	Ok(patches)
}

pub fn write_splines<W: Write>(patches: &[SplinePatch], os: &mut W) -> Result<()> {
	for patch in patches {
		let class = if patch.is_volume() { VOLUME_CLASS } else { SURFACE_CLASS };
		writeln!(os, "{} 1 0 0", class)?;
		writeln!(os, "{} {}", patch.dim, patch.rational as usize)?;
		for basis in patch.bases.iter() {
			writeln!(os, "{} {}", basis.num_coefs(), basis.order)?;
			let knots: Vec<String> = basis.knots.iter().map(f64::to_string).collect();
			writeln!(os, "{}", knots.join(" "))?;
		}
		let stride = patch.dim + patch.rational as usize;
		for row in patch.coefs.chunks(stride) {
			let row: Vec<String> = row.iter().map(f64::to_string).collect();
			writeln!(os, "{}", row.join(" "))?;
		}
		writeln!(os)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::P3;

	const CUBE: &str = "700 1 0 0
3 0
2 2
0 0 1 1
2 2
0 0 1 1
2 2
0 0 1 1
0 0 0
1 0 0
0 1 0
1 1 0
0 0 1
1 0 1
0 1 1
1 1 1
";

	#[test]
	fn test_read_cube() {
		let patches = read_splines(CUBE).unwrap();
		assert_eq!(patches.len(), 1);
		let v = &patches[0];
		assert!(v.is_volume());
		assert_eq!(v.dims(), [2, 2, 2]);
		assert_eq!(v.control_point(1, 0, 1), P3::new(1.0, 0.0, 1.0));
	}

	#[test]
	fn test_write_read() {
		let mut a = SplinePatch::cuboid(P3::new(0.0, 0.0, 0.0), P3::new(1.0, 2.0, 3.0), [3, 2, 2], [4, 2, 3]).unwrap();
		a.insert_knot(0, 0.3).unwrap();
		let mut out = Vec::new();
		write_splines(&[a.clone(), a.clone()], &mut out).unwrap();
		let back = read_splines(std::str::from_utf8(&out).unwrap()).unwrap();
		assert_eq!(back, vec![a.clone(), a]);
	}

	#[test]
	fn test_surface() {
		let s = SplinePatch::rectangle([0.0, 0.0], [2.0, 1.0], [2, 3], [2, 4]).unwrap();
		let mut out = Vec::new();
		write_splines(&[s.clone()], &mut out).unwrap();
		let text = String::from_utf8(out).unwrap();
		assert!(text.starts_with("200 1 0 0\n2 0\n"));
		assert_eq!(read_splines(&text).unwrap(), vec![s]);
	}

	#[test]
	fn test_truncated() {
		let cut = &CUBE[..CUBE.len() - 8];
		assert!(matches!(read_splines(cut), Err(Error::Parse { .. })));
	}

	#[test]
	fn test_unknown_class() {
		assert!(matches!(read_splines("100 1 0 0\n3 0\n"), Err(Error::Parse { line: 1, .. })));
	}
}
