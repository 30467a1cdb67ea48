use serde::{Serialize, Deserialize};
use std::fmt;

use crate::P3;

// local numbering of a volume: corner c = i + 2j + 4k, lines 0-3 run in u,
// 4-7 in v, 8-11 in w, faces are umin umax vmin vmax wmin wmax. Faces are
// parametrised by the two remaining directions in increasing order.

/// Corners of each volume line, from its low to its high end
pub const VOLUME_LINE_CORNERS: [[usize; 2]; 12] = [
	[0, 1], [2, 3], [4, 5], [6, 7],
	[0, 2], [1, 3], [4, 6], [5, 7],
	[0, 4], [1, 5], [2, 6], [3, 7],
];

/// Corners of each volume face in face-local order
pub const VOLUME_FACE_CORNERS: [[usize; 4]; 6] = [
	[0, 2, 4, 6], [1, 3, 5, 7],
	[0, 1, 4, 5], [2, 3, 6, 7],
	[0, 1, 2, 3], [4, 5, 6, 7],
];

pub const VOLUME_FACE_LINES: [[usize; 4]; 6] = [
	[4, 6, 8, 10], [5, 7, 9, 11],
	[0, 2, 8, 9], [1, 3, 10, 11],
	[0, 1, 4, 5], [2, 3, 6, 7],
];

// surface edges are umin umax vmin vmax, corner c = i + 2j
pub const SURFACE_LINE_CORNERS: [[usize; 2]; 4] = [[0, 2], [1, 3], [0, 1], [2, 3]];

/// Local line id joining two volume corners, if they share an edge
pub fn line_enumeration(c1: usize, c2: usize) -> Option<usize> {
	let (lo, hi) = (c1.min(c2), c1.max(c2));
	if hi > 7 {
		return None
	}
	match hi - lo {
		1 if lo % 2 == 0 => Some(lo / 2),
		2 if lo & 2 == 0 => Some((lo + hi) / 4 + 4),
		4 => Some(lo + 8),
		_ => None,
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct VertexId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct LineId(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct FaceId(pub usize);

/// One patch-local reference to a canonical entity
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct EntityUse {
	pub patch: usize,
	pub local: usize,
}

// the leading point must lie strictly inside the tolerance, later points
// may sit on it
fn traces<'a>(mut pairs: impl Iterator<Item = (&'a P3, &'a P3)>, tol: f64) -> bool {
	match pairs.next() {
		Some((a, b)) if (a - b).norm() < tol => pairs.all(|(a, b)| (a - b).norm() <= tol),
		_ => false,
	}
}

pub(crate) fn coincident<'a>(mut pts: impl Iterator<Item = &'a P3>, tol: f64) -> bool {
	match pts.next() {
		Some(first) => pts.all(|p| (p - first).norm() < tol),
		None => true,
	}
}

#[derive(Clone, Debug)]
pub struct Vertex {
	pub cp: P3,
	pub uses: Vec<EntityUse>,
	/// Lines ending here
	pub lines: Vec<LineId>,
}

#[derive(Clone, Debug)]
pub struct Line {
	pub v1: VertexId,
	pub v2: VertexId,
	/// All control points from v1 to v2
	pub cp: Vec<P3>,
	pub degenerate: bool,
	pub uses: Vec<EntityUse>,
	pub faces: Vec<FaceId>,
}

impl Line {
	pub fn new(v1: VertexId, v2: VertexId, cp: Vec<P3>, tol: f64) -> Self {
		let degenerate = coincident(cp.iter(), tol);
		Self {
			v1,
			v2,
			cp,
			degenerate,
			uses: Vec::new(),
			faces: Vec::new(),
		}
	}

	/// Whether `cp` traces this line, and if so whether it runs backwards
	pub fn orientation_of(&self, cp: &[P3], tol: f64) -> Option<bool> {
		if cp.len() != self.cp.len() {
			return None
		}
		if traces(self.cp.iter().zip(cp), tol) {
			Some(false)
		} else if traces(self.cp.iter().rev().zip(cp), tol) {
			Some(true)
		} else {
			None
		}
	}

	pub fn equals(&self, other: &Line, tol: f64) -> bool {
		self.orientation_of(&other.cp, tol).is_some()
	}

	pub fn interior_len(&self) -> usize {
		self.cp.len() - 2
	}
}

impl fmt::Display for Line {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (a, b) = (self.cp[0], self.cp[self.cp.len() - 1]);
		write!(f, "({}, {}, {}) -> ({}, {}, {})", a.x, a.y, a.z, b.x, b.y, b.z)
	}
}

/// How a patch sees a canonical face: its local (p, q) grid is first
/// transposed if `swap`, then each axis mirrored as flagged.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FaceOrientation {
	pub swap: bool,
	pub flip_i: bool,
	pub flip_j: bool,
}

impl FaceOrientation {
	pub const IDENTITY: Self = Self { swap: false, flip_i: false, flip_j: false };

	pub fn all() -> impl Iterator<Item = Self> {
		(0..8).map(|b| Self {
			swap: b & 4 != 0,
			flip_i: b & 1 != 0,
			flip_j: b & 2 != 0,
		})
	}

	/// Canonical (a, b) of local (p, q) on an `na` x `nb` canonical grid
	pub fn map(&self, p: usize, q: usize, na: usize, nb: usize) -> (usize, usize) {
		let (p, q) = if self.swap { (q, p) } else { (p, q) };
		let a = if self.flip_i { na - 1 - p } else { p };
		let b = if self.flip_j { nb - 1 - q } else { q };
		(a, b)
	}

	/// Offset of local (0, 0) and the offset steps along local p and q, for
	/// a canonical interior block of `ia` x `ib` points stored a-fastest
	pub fn increments(&self, ia: usize, ib: usize) -> (usize, isize, isize) {
		if ia == 0 || ib == 0 {
			return (0, 1, 1)
		}
		let a0 = if self.flip_i { ia - 1 } else { 0 };
		let b0 = if self.flip_j { ib - 1 } else { 0 };
		let start = a0 + b0 * ia;
		let step_a = if self.flip_i { -1 } else { 1 };
		let step_b = if self.flip_j { -(ia as isize) } else { ia as isize };
		if self.swap {
			(start, step_b, step_a)
		} else {
			(start, step_a, step_b)
		}
	}
}

#[derive(Clone, Debug)]
pub struct Face {
	/// Control grid, first index fastest
	pub cp: Vec<P3>,
	pub n: [usize; 2],
	/// Corner vertices in face-local order
	pub corners: [VertexId; 4],
	/// Bounding lines, once per distinct line
	pub lines: Vec<LineId>,
	pub degenerate: bool,
	pub uses: Vec<EntityUse>,
	/// Patches bounded by (or, for surface models, consisting of) this face
	pub volumes: Vec<usize>,
}

impl Face {
	pub fn new(cp: Vec<P3>, n: [usize; 2], corners: [VertexId; 4], tol: f64) -> Self {
		let at = |i: usize, j: usize| &cp[j * n[0] + i];
		let collapsed_i = (0..n[1]).all(|j| coincident((0..n[0]).map(|i| at(i, j)), tol));
		let collapsed_j = (0..n[0]).all(|i| coincident((0..n[1]).map(|j| at(i, j)), tol));
		Self {
			degenerate: collapsed_i || collapsed_j,
			cp,
			n,
			corners,
			lines: Vec::new(),
			uses: Vec::new(),
			volumes: Vec::new(),
		}
	}

	/// First of the eight quad symmetries under which `cp` coincides with
	/// this face
	pub fn orientation_of(&self, cp: &[P3], n: [usize; 2], tol: f64) -> Option<FaceOrientation> {
		let [na, nb] = self.n;
		FaceOrientation::all().find(|o| {
			let fits = if o.swap { n == [nb, na] } else { n == [na, nb] };
			fits && (0..n[1]).all(|q| {
				(0..n[0]).all(|p| {
					let (a, b) = o.map(p, q, na, nb);
					(cp[q * n[0] + p] - self.cp[b * na + a]).norm() < tol
				})
			})
		})
	}

	pub fn equals(&self, other: &Face, tol: f64) -> bool {
		self.orientation_of(&other.cp, other.n, tol).is_some()
	}

	pub fn interior_dims(&self) -> [usize; 2] {
		[self.n[0] - 2, self.n[1] - 2]
	}

	pub fn interior_len(&self) -> usize {
		let [a, b] = self.interior_dims();
		a * b
	}
}

#[derive(Clone, Debug)]
pub struct Volume {
	pub patch: usize,
	pub n: [usize; 3],
}

impl Volume {
	pub fn interior_len(&self) -> usize {
		self.n.iter().map(|n| n - 2).product()
	}
}
