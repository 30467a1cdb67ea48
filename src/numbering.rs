//! Local-to-global numbering of control points
//!
//! Every canonical entity of the topology owns a contiguous block of global
//! indices for its interior points. Each patch records, per local entity,
//! where its first local point lands in that block and how the index moves
//! when stepping along the patch's own parameter directions.

use log::debug;
use serde::{Serialize, Deserialize};

use crate::topology::{FaceUse, LineUse, PatchEntities, TopologySet};
use crate::{Error, Result};

/// Global numbering of one volume patch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolGlobNumber {
	pub vertex: [usize; 8],
	/// Global index of the first interior point of each line, seen locally
	pub edge: [usize; 12],
	/// +1 or -1
	pub edge_incr: [isize; 12],
	pub surface: [usize; 6],
	pub surface_incr_i: [isize; 6],
	pub surface_incr_j: [isize; 6],
	pub volume: usize,
}

/// Global numbering of one surface patch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfGlobNumber {
	pub vertex: [usize; 4],
	pub edge: [usize; 4],
	pub edge_incr: [isize; 4],
	pub surface: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchNumber {
	Volume(VolGlobNumber),
	Surface(SurfGlobNumber),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
	/// All vertices, then line, face and volume interiors
	Natural,
	/// Patch by patch, each patch numbering what it sees first
	Petsc,
	/// Read back from a gno stream
	Imported,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlobalNumbering {
	pub scheme: Scheme,
	pub start: usize,
	/// Number of distinct global indices
	pub count: usize,
	/// Points per parametric direction for every patch
	pub dims: Vec<[usize; 3]>,
	pub records: Vec<PatchNumber>,
	#[serde(skip)]
	pub(crate) generation: u64,
}

#[derive(Clone, Copy)]
enum Side {
	Low,
	High,
	Inner(usize),
}

impl Side {
	fn of(i: usize, n: usize) -> Self {
		if i == 0 {
			Side::Low
		} else if i == n - 1 {
			Side::High
		} else {
			Side::Inner(i - 1)
		}
	}

	fn bit(self) -> usize {
		match self {
			Side::High => 1,
			_ => 0,
		}
	}
}

// `None` when the walk leaves the usize range
fn step(start: usize, offsets: &[(usize, isize)]) -> Option<usize> {
	offsets.iter().try_fold(start, |acc, &(t, incr)| {
		acc.checked_add_signed(isize::try_from(t).ok()?.checked_mul(incr)?)
	})
}

// interior block sizes per canonical entity, for a basis with `reduce`
// fewer points per direction
struct Blocks<'a> {
	topo: &'a TopologySet,
	reduce: usize,
	vertex: Vec<Option<usize>>,
	line: Vec<Option<usize>>,
	face: Vec<Option<usize>>,
	volume: Vec<Option<usize>>,
	next: usize,
}

impl<'a> Blocks<'a> {
	fn new(topo: &'a TopologySet, reduce: usize, start: usize) -> Self {
		Self {
			topo,
			reduce,
			vertex: vec![None; topo.numb_vertices()],
			line: vec![None; topo.numb_lines()],
			face: vec![None; topo.numb_faces()],
			volume: vec![None; topo.numb_volumes()],
			next: start,
		}
	}

	fn line_len(&self, id: usize) -> usize {
		self.topo.lines()[id].interior_len() - self.reduce
	}

	fn face_dims(&self, id: usize) -> [usize; 2] {
		self.topo.faces()[id].interior_dims().map(|n| n - self.reduce)
	}

	fn volume_len(&self, id: usize) -> usize {
		self.topo.volumes()[id].n.iter().map(|n| n - 2 - self.reduce).product()
	}

	fn claim(slot: &mut Option<usize>, next: &mut usize, len: usize) {
		if slot.is_none() {
			*slot = Some(*next);
			*next += len;
		}
	}

	fn vertex(&mut self, id: usize) {
		Self::claim(&mut self.vertex[id], &mut self.next, 1);
	}

	fn line(&mut self, id: usize) {
		let len = self.line_len(id);
		Self::claim(&mut self.line[id], &mut self.next, len);
	}

	fn face(&mut self, id: usize) {
		let [a, b] = self.face_dims(id);
		Self::claim(&mut self.face[id], &mut self.next, a * b);
	}

	fn volume(&mut self, id: usize) {
		let len = self.volume_len(id);
		Self::claim(&mut self.volume[id], &mut self.next, len);
	}

	fn patch(&mut self, pe: &PatchEntities) {
		for v in pe.vertices.iter() {
			self.vertex(v.0);
		}
		for l in pe.lines.iter() {
			self.line(l.line.0);
		}
		for f in pe.faces.iter() {
			self.face(f.face.0);
		}
		if let Some(v) = pe.volume {
			self.volume(v);
		}
	}

	fn edge(&self, lu: &LineUse) -> Result<(usize, isize)> {
		let block = self.line[lu.line.0].ok_or(Error::NotBuilt("line numbering"))?;
		let len = self.line_len(lu.line.0);
		Ok(if lu.reversed && len > 0 {
			(block + len - 1, -1)
		} else {
			(block, 1)
		})
	}

	fn surface(&self, fu: &FaceUse) -> Result<(usize, isize, isize)> {
		let block = self.face[fu.face.0].ok_or(Error::NotBuilt("face numbering"))?;
		let [ia, ib] = self.face_dims(fu.face.0);
		let (offset, di, dj) = fu.orientation.increments(ia, ib);
		Ok((block + offset, di, dj))
	}

	fn vertex_number(&self, id: usize) -> Result<usize> {
		self.vertex[id].ok_or(Error::NotBuilt("vertex numbering"))
	}

	fn record(&self, pe: &PatchEntities) -> Result<PatchNumber> {
		match pe.volume {
			Some(vol) => {
				let mut rec = VolGlobNumber::default();
				for (c, v) in pe.vertices.iter().enumerate() {
					rec.vertex[c] = self.vertex_number(v.0)?;
				}
				for (l, lu) in pe.lines.iter().enumerate() {
					(rec.edge[l], rec.edge_incr[l]) = self.edge(lu)?;
				}
				for (f, fu) in pe.faces.iter().enumerate() {
					(rec.surface[f], rec.surface_incr_i[f], rec.surface_incr_j[f]) = self.surface(fu)?;
				}
				rec.volume = self.volume[vol].ok_or(Error::NotBuilt("volume numbering"))?;
				Ok(PatchNumber::Volume(rec))
			}
			None => {
				let mut rec = SurfGlobNumber::default();
				for (c, v) in pe.vertices.iter().enumerate() {
					rec.vertex[c] = self.vertex_number(v.0)?;
				}
				for (l, lu) in pe.lines.iter().enumerate() {
					(rec.edge[l], rec.edge_incr[l]) = self.edge(lu)?;
				}
				rec.surface = self.surface(&pe.faces[0])?.0;
				Ok(PatchNumber::Surface(rec))
			}
		}
	}
}

/// Number all points of the topology, starting from `start`. With
/// `reduce = 1` the numbering is for a basis one order lower, one point
/// fewer in every direction.
pub fn generate(topo: &TopologySet, scheme: Scheme, start: usize, reduce: usize) -> Result<GlobalNumbering> {
	let dims: Vec<[usize; 3]> = topo.patches()
		.iter()
		.map(|pe| {
			let mut n = pe.n;
			let pdim = if pe.volume.is_some() { 3 } else { 2 };
			for d in n.iter_mut().take(pdim) {
				*d -= reduce.min(*d);
			}
			n
		})
		.collect();
	if let Some((p, _)) = topo.patches().iter().enumerate().find(|(_, pe)| {
		let pdim = if pe.volume.is_some() { 3 } else { 2 };
		pe.n.iter().take(pdim).any(|&n| n < 2 + reduce)
	}) {
		return Err(Error::invalid(format!(
			"patch {} has too few points for a basis {} order(s) lower", p, reduce,
		)))
	}

	let mut blocks = Blocks::new(topo, reduce, start);
	match scheme {
		Scheme::Petsc => {
			for pe in topo.patches() {
				blocks.patch(pe);
			}
		}
		_ => {
			for v in 0..topo.numb_vertices() {
				blocks.vertex(v);
			}
			for l in 0..topo.numb_lines() {
				blocks.line(l);
			}
			for f in 0..topo.numb_faces() {
				blocks.face(f);
			}
			for v in 0..topo.numb_volumes() {
				blocks.volume(v);
			}
		}
	}

	let records = topo.patches()
		.iter()
		.map(|pe| blocks.record(pe))
		.collect::<Result<Vec<_>>>()?;
	let count = blocks.next - start;
	debug!("numbering ({:?}, reduce {}): {} global indices from {}", scheme, reduce, count, start);
	Ok(GlobalNumbering {
		scheme,
		start,
		count,
		dims,
		records,
		generation: topo.generation,
	})
}

impl GlobalNumbering {
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn numb_patches(&self) -> usize {
		self.records.len()
	}

	fn patch_dims(&self, patch: usize) -> Result<[usize; 3]> {
		self.dims.get(patch)
			.copied()
			.ok_or_else(|| Error::invalid(format!("patch {} of {}", patch, self.dims.len())))
	}

	/// Points along parametric direction `dir` of `patch`
	pub fn num_points(&self, patch: usize, dir: usize) -> Result<usize> {
		let n = self.patch_dims(patch)?;
		let pdim = match self.records[patch] {
			PatchNumber::Volume(_) => 3,
			PatchNumber::Surface(_) => 2,
		};
		if dir >= pdim {
			return Err(Error::invalid(format!("parametric direction {}", dir)))
		}
		Ok(n[dir])
	}

	/// Global index of local point (u, v, w); `w` must be `None` for surfaces
	pub fn global_number(&self, patch: usize, u: usize, v: usize, w: Option<usize>) -> Result<usize> {
		let n = self.patch_dims(patch)?;
		match (&self.records[patch], w) {
			(PatchNumber::Volume(rec), Some(w)) => {
				let ijk = [u, v, w];
				if (0..3).any(|d| ijk[d] >= n[d]) {
					return Err(Error::invalid(format!("local point {:?} outside {:?}", ijk, n)))
				}
				volume_number(rec, n, ijk).ok_or_else(|| out_of_range(patch))
			}
			(PatchNumber::Surface(rec), None) => {
				if u >= n[0] || v >= n[1] {
					return Err(Error::invalid(format!("local point ({}, {}) outside {:?}", u, v, &n[..2])))
				}
				surface_number(rec, n, u, v).ok_or_else(|| out_of_range(patch))
			}
			(PatchNumber::Volume(_), None) => Err(Error::invalid("volume patch needs three indices")),
			(PatchNumber::Surface(_), Some(_)) => Err(Error::invalid("surface patch takes two indices")),
		}
	}

	/// Global index of every local point of `patch`, first direction fastest
	pub fn table(&self, patch: usize) -> Result<Vec<usize>> {
		let n = self.patch_dims(patch)?;
		let mut out = Vec::with_capacity(n.iter().product());
		match &self.records[patch] {
			PatchNumber::Volume(rec) => {
				for k in 0..n[2] {
					for j in 0..n[1] {
						for i in 0..n[0] {
							out.push(volume_number(rec, n, [i, j, k]).ok_or_else(|| out_of_range(patch))?);
						}
					}
				}
			}
			PatchNumber::Surface(rec) => {
				for j in 0..n[1] {
					for i in 0..n[0] {
						out.push(surface_number(rec, n, i, j).ok_or_else(|| out_of_range(patch))?);
					}
				}
			}
		}
		Ok(out)
	}

	pub fn tables(&self) -> Result<Vec<Vec<usize>>> {
		(0..self.records.len()).map(|p| self.table(p)).collect()
	}
}

fn out_of_range(patch: usize) -> Error {
	Error::invalid(format!("numbering of patch {} walks outside the index range", patch))
}

fn volume_number(rec: &VolGlobNumber, n: [usize; 3], ijk: [usize; 3]) -> Option<usize> {
	let s = [0, 1, 2].map(|d| Side::of(ijk[d], n[d]));
	let inner: Vec<(usize, usize)> = s.iter()
		.enumerate()
		.filter_map(|(d, s)| match s {
			Side::Inner(t) => Some((d, *t)),
			_ => None,
		})
		.collect();
	match inner.as_slice() {
		[] => Some(rec.vertex[s[0].bit() + 2 * s[1].bit() + 4 * s[2].bit()]),
		[(dir, t)] => {
			let fixed: Vec<usize> = (0..3).filter(|d| d != dir).collect();
			let l = dir * 4 + s[fixed[0]].bit() + 2 * s[fixed[1]].bit();
			step(rec.edge[l], &[(*t, rec.edge_incr[l])])
		}
		[(da, ta), (db, tb)] => {
			let fixed = 3 - da - db;
			let f = fixed * 2 + s[fixed].bit();
			step(rec.surface[f], &[(*ta, rec.surface_incr_i[f]), (*tb, rec.surface_incr_j[f])])
		}
		_ => {
			let (ia, ib) = (n[0] - 2, n[1] - 2);
			rec.volume.checked_add((ijk[0] - 1) + (ijk[1] - 1) * ia + (ijk[2] - 1) * ia * ib)
		}
	}
}

fn surface_number(rec: &SurfGlobNumber, n: [usize; 3], i: usize, j: usize) -> Option<usize> {
	match (Side::of(i, n[0]), Side::of(j, n[1])) {
		(Side::Inner(ti), Side::Inner(tj)) => rec.surface.checked_add(ti + tj * (n[0] - 2)),
		(si, Side::Inner(t)) => {
			let e = si.bit();
			step(rec.edge[e], &[(t, rec.edge_incr[e])])
		}
		(Side::Inner(t), sj) => {
			let e = 2 + sj.bit();
			step(rec.edge[e], &[(t, rec.edge_incr[e])])
		}
		(si, sj) => Some(rec.vertex[si.bit() + 2 * sj.bit()]),
	}
}
