//! The gno stream: per patch its corner numbers, one `start incr` line per
//! edge, one `start incr_i incr_j` line per face (volumes only) and the
//! interior start, all as integers.

use std::io::Write;

use rustc_hash::FxHashMap;

use crate::numbering::{self, GlobalNumbering, PatchNumber, Scheme, SurfGlobNumber, VolGlobNumber};
use crate::primitives::FaceOrientation;
use crate::tokens::Tokens;
use crate::topology::TopologySet;
use crate::{Error, Result};

fn join<T: ToString>(xs: &[T]) -> String {
	xs.iter().map(T::to_string).collect::<Vec<_>>().join(" ")
}

pub fn write_global_number_ordering<W: Write>(num: &GlobalNumbering, os: &mut W) -> Result<()> {
	for rec in num.records.iter() {
		match rec {
			PatchNumber::Volume(r) => {
				writeln!(os, "{}", join(&r.vertex))?;
				for l in 0..12 {
					writeln!(os, "{} {}", r.edge[l], r.edge_incr[l])?;
				}
				for f in 0..6 {
					writeln!(os, "{} {} {}", r.surface[f], r.surface_incr_i[f], r.surface_incr_j[f])?;
				}
				writeln!(os, "{}", r.volume)?;
			}
			PatchNumber::Surface(r) => {
				writeln!(os, "{}", join(&r.vertex))?;
				for l in 0..4 {
					writeln!(os, "{} {}", r.edge[l], r.edge_incr[l])?;
				}
				writeln!(os, "{}", r.surface)?;
			}
		}
	}
	Ok(())
}

fn incr(t: &mut Tokens, what: &str) -> Result<isize> {
	let line = t.line();
	let v = t.int(what)?;
	isize::try_from(v).map_err(|_| Error::parse(line, format!("{} out of range", what)))
}

fn edge_incr(t: &mut Tokens) -> Result<isize> {
	let line = t.line();
	match incr(t, "edge increment")? {
		d @ (1 | -1) => Ok(d),
		d => Err(Error::parse(line, format!("edge increment {} is not 1 or -1", d))),
	}
}

// steps a patch may use on a face with `la` x `lb` interior points
fn face_incr_valid(la: usize, lb: usize, di: isize, dj: isize) -> bool {
	if la == 0 || lb == 0 {
		return true
	}
	FaceOrientation::all().any(|o| {
		let (ia, ib) = if o.swap { (lb, la) } else { (la, lb) };
		let (_, a, b) = o.increments(ia, ib);
		(a, b) == (di, dj)
	})
}

fn read_volume(t: &mut Tokens, n: [usize; 3]) -> Result<VolGlobNumber> {
	let mut r = VolGlobNumber::default();
	for v in r.vertex.iter_mut() {
		*v = t.index("corner number")?;
	}
	for l in 0..12 {
		r.edge[l] = t.index("edge start")?;
		r.edge_incr[l] = edge_incr(t)?;
	}
	for f in 0..6 {
		let [da, db] = match f / 2 {
			0 => [1, 2],
			1 => [0, 2],
			_ => [0, 1],
		};
		r.surface[f] = t.index("face start")?;
		let line = t.line();
		r.surface_incr_i[f] = incr(t, "face increment")?;
		r.surface_incr_j[f] = incr(t, "face increment")?;
		if !face_incr_valid(n[da] - 2, n[db] - 2, r.surface_incr_i[f], r.surface_incr_j[f]) {
			return Err(Error::parse(line, format!(
				"face increments {} {} do not fit a {}x{} face", r.surface_incr_i[f], r.surface_incr_j[f], n[da], n[db],
			)))
		}
	}
	r.volume = t.index("volume start")?;
	Ok(r)
}

fn read_surface(t: &mut Tokens) -> Result<SurfGlobNumber> {
	let mut r = SurfGlobNumber::default();
	for v in r.vertex.iter_mut() {
		*v = t.index("corner number")?;
	}
	for l in 0..4 {
		r.edge[l] = t.index("edge start")?;
		r.edge_incr[l] = edge_incr(t)?;
	}
	r.surface = t.index("surface start")?;
	Ok(r)
}

/// Read records for patches with the given point counts; `volumes` selects
/// the record layout. The records must number every patch one-to-one over a
/// contiguous range. With `topo`, points shared between patches must also
/// share their index.
pub fn read_global_number_ordering(
	input: &str,
	dims: &[[usize; 3]],
	volumes: bool,
	topo: Option<&TopologySet>,
) -> Result<GlobalNumbering> {
	let mut t = Tokens::parse(input)?;
	let mut records = Vec::with_capacity(dims.len());
	let mut lines = Vec::with_capacity(dims.len());
	for n in dims {
		lines.push(t.line());
		records.push(if volumes {
			PatchNumber::Volume(read_volume(&mut t, *n)?)
		} else {
			PatchNumber::Surface(read_surface(&mut t)?)
		});
	}
	if !t.is_empty() {
		return Err(Error::parse(t.line(), "trailing data after the last patch"))
	}

	let mut num = GlobalNumbering {
		scheme: Scheme::Imported,
		start: 0,
		count: 0,
		dims: dims.to_vec(),
		records,
		generation: 0,
	};
	let mut tables = Vec::with_capacity(dims.len());
	for (p, line) in lines.iter().enumerate() {
		let table = num.table(p).map_err(|e| Error::parse(*line, e.to_string()))?;
		let mut distinct = table.clone();
		distinct.sort_unstable();
		distinct.dedup();
		if distinct.len() != table.len() {
			return Err(Error::parse(*line, format!("patch {} numbers two local points alike", p)))
		}
		tables.push(table);
	}

	let mut all = tables.concat();
	all.sort_unstable();
	all.dedup();
	if let (Some(&lo), Some(&hi)) = (all.first(), all.last()) {
		if hi - lo != all.len() - 1 {
			return Err(Error::parse(1, format!("global indices {}..={} leave gaps", lo, hi)))
		}
		num.start = lo;
		num.count = all.len();
	}

	if let Some(topo) = topo {
		let reference = numbering::generate(topo, Scheme::Natural, 0, 0)?;
		if reference.dims != num.dims {
			return Err(Error::invalid("topology does not describe the numbered patches"))
		}
		let mut forward: FxHashMap<usize, usize> = FxHashMap::default();
		let mut backward: FxHashMap<usize, usize> = FxHashMap::default();
		for (p, table) in tables.iter().enumerate() {
			for (local, (&r, &g)) in reference.table(p)?.iter().zip(table).enumerate() {
				if *forward.entry(r).or_insert(g) != g || *backward.entry(g).or_insert(r) != r {
					return Err(Error::parse(lines[p], format!(
						"local point {} of patch {} disagrees with the patches sharing it", local, p,
					)))
				}
			}
		}
	}
	Ok(num)
}
