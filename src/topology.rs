//! Topology discovery over a set of spline patches
//!
//! Corners are matched through a grid hash, lines and faces through the
//! vertex ids of their corners, and candidates are then compared control
//! point by control point. Matching is match-or-insert: a new entity either
//! refers to an existing canonical one (with the orientation it is seen in)
//! or becomes canonical itself.

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::{Serialize, Deserialize};

use crate::primitives::{
	coincident, line_enumeration, EntityUse, Face, FaceId, FaceOrientation, Line, LineId, Vertex,
	VertexId, Volume, SURFACE_LINE_CORNERS, VOLUME_FACE_CORNERS, VOLUME_FACE_LINES, VOLUME_LINE_CORNERS,
};
use crate::spatial::SpatialHash;
use crate::spline::SplinePatch;
use crate::{Error, Result, P3};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LineUse {
	pub line: LineId,
	/// Patch runs the line from v2 to v1
	pub reversed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct FaceUse {
	pub face: FaceId,
	pub orientation: FaceOrientation,
}

/// Canonical entities referenced by one patch, indexed by local id.
/// Surface patches have 4 vertices, 4 lines and the patch itself as face 0.
#[derive(Clone, Debug)]
pub struct PatchEntities {
	pub vertices: Vec<VertexId>,
	pub lines: Vec<LineUse>,
	pub faces: Vec<FaceUse>,
	pub volume: Option<usize>,
	/// Control points per parametric direction (1 in w for surfaces)
	pub n: [usize; 3],
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TopologySummary {
	pub vertices: usize,
	pub lines: usize,
	pub non_degenerate_lines: usize,
	pub faces: usize,
	pub non_degenerate_faces: usize,
	pub volumes: usize,
}

pub struct TopologySet {
	tol: f64,
	periodic: [bool; 3],
	pub(crate) generation: u64,
	vertices: Vec<Vertex>,
	lines: Vec<Line>,
	faces: Vec<Face>,
	volumes: Vec<Volume>,
	patches: Vec<PatchEntities>,
	vertex_hash: SpatialHash,
	line_index: FxHashMap<[VertexId; 2], Vec<LineId>>,
	face_index: FxHashMap<[VertexId; 4], Vec<FaceId>>,
}

// Whether corners `a` and `b` of one patch may be the same vertex. Walking
// from `a` to `b` one direction at a time, every step must cross a periodic
// direction or a local line collapsed to a point.
fn may_share(a: usize, b: usize, periodic: [bool; 3], collapsed: impl Fn(usize, usize) -> bool) -> bool {
	let mut cur = a;
	(0..3).filter(|d| (a ^ b) >> d & 1 == 1).all(|d| {
		let next = cur ^ (1 << d);
		let ok = periodic[d] || collapsed(cur, next);
		cur = next;
		ok
	})
}

impl TopologySet {
	/// Topology with no periodic directions
	pub fn build(patches: &[SplinePatch], tol: f64) -> Result<Self> {
		Self::build_periodic(patches, tol, &[])
	}

	/// Topology where a patch may meet itself across the parametric
	/// directions flagged in `periodic`. Missing flags count as false.
	pub fn build_periodic(patches: &[SplinePatch], tol: f64, periodic: &[bool]) -> Result<Self> {
		if !(tol > 0.0) || !tol.is_finite() {
			return Err(Error::invalid(format!("topology tolerance {}", tol)))
		}
		if periodic.len() > 3 {
			return Err(Error::invalid(format!("{} periodic flags for at most 3 directions", periodic.len())))
		}
		let mut flags = [false; 3];
		for (f, p) in flags.iter_mut().zip(periodic) {
			*f = *p;
		}
		if let Some(first) = patches.first() {
			if patches.iter().any(|p| p.param_dim() != first.param_dim()) {
				return Err(Error::ModelKind("surfaces and volumes in one topology".into()))
			}
		}
		let mut topo = Self {
			tol,
			periodic: flags,
			generation: 0,
			vertices: Vec::new(),
			lines: Vec::new(),
			faces: Vec::new(),
			volumes: Vec::new(),
			patches: Vec::with_capacity(patches.len()),
			vertex_hash: SpatialHash::new(tol),
			line_index: FxHashMap::default(),
			face_index: FxHashMap::default(),
		};
		for (id, patch) in patches.iter().enumerate() {
			if patch.is_volume() {
				topo.add_volume(id, patch);
			} else {
				topo.add_surface(id, patch);
			}
		}
		debug!(
			"topology: {} vertices, {} lines ({} non-degenerate), {} faces ({} non-degenerate), {} volumes",
			topo.numb_vertices(),
			topo.numb_lines(),
			topo.numb_non_degen_lines(),
			topo.numb_faces(),
			topo.numb_non_degen_faces(),
			topo.numb_volumes(),
		);
		let degenerate = topo.numb_lines() - topo.numb_non_degen_lines();
		if degenerate > 0 {
			warn!("{} degenerate lines", degenerate);
		}
		let degenerate = topo.numb_faces() - topo.numb_non_degen_faces();
		if degenerate > 0 {
			warn!("{} degenerate faces", degenerate);
		}
		Ok(topo)
	}

	fn add_volume(&mut self, id: usize, patch: &SplinePatch) {
		let n = patch.dims();
		let cp = |ijk: [usize; 3]| patch.control_point(ijk[0], ijk[1], ijk[2]);
		let corner = |c: usize| [(c & 1) * (n[0] - 1), ((c >> 1) & 1) * (n[1] - 1), (c >> 2) * (n[2] - 1)];

		let line_pts: Vec<Vec<P3>> = VOLUME_LINE_CORNERS.iter()
			.enumerate()
			.map(|(l, [c1, _])| {
				let dir = l / 4;
				let start = corner(*c1);
				(0..n[dir])
					.map(|t| {
						let mut ijk = start;
						ijk[dir] = t;
						cp(ijk)
					})
					.collect()
			})
			.collect();
		let collapsed: Vec<bool> = line_pts.iter().map(|pts| coincident(pts.iter(), self.tol)).collect();
		let periodic = self.periodic;
		let vertices: Vec<VertexId> = (0..8)
			.map(|c| {
				let used = EntityUse { patch: id, local: c };
				self.add_vertex(cp(corner(c)), used, |other| {
					may_share(c, other, periodic, |a, b| line_enumeration(a, b).map_or(false, |l| collapsed[l]))
				})
			})
			.collect();

		let mut lines = Vec::with_capacity(12);
		for (l, pts) in line_pts.into_iter().enumerate() {
			let [c1, c2] = VOLUME_LINE_CORNERS[l];
			let ends = [vertices[c1], vertices[c2]];
			lines.push(self.add_line(pts, ends, EntityUse { patch: id, local: l }));
		}

		let mut faces = Vec::with_capacity(6);
		for f in 0..6 {
			let fixed = f / 2;
			let side = (f % 2) * (n[fixed] - 1);
			let [da, db] = match fixed {
				0 => [1, 2],
				1 => [0, 2],
				_ => [0, 1],
			};
			let mut pts = Vec::with_capacity(n[da] * n[db]);
			for b in 0..n[db] {
				for a in 0..n[da] {
					let mut ijk = [0; 3];
					ijk[fixed] = side;
					ijk[da] = a;
					ijk[db] = b;
					pts.push(cp(ijk));
				}
			}
			let corners = VOLUME_FACE_CORNERS[f].map(|c| vertices[c]);
			let used = self.add_face(pts, [n[da], n[db]], corners, EntityUse { patch: id, local: f });
			for l in VOLUME_FACE_LINES[f] {
				self.link(lines[l].line, used.face);
			}
			faces.push(used);
		}

		self.volumes.push(Volume { patch: id, n });
		self.patches.push(PatchEntities {
			vertices,
			lines,
			faces,
			volume: Some(self.volumes.len() - 1),
			n,
		});
	}

	fn add_surface(&mut self, id: usize, patch: &SplinePatch) {
		let n = patch.dims();
		let cp = |i: usize, j: usize| patch.control_point(i, j, 0);

		let line_pts: Vec<Vec<P3>> = (0..4)
			.map(|e| {
				let side = e % 2;
				if e < 2 {
					(0..n[1]).map(|j| cp(side * (n[0] - 1), j)).collect()
				} else {
					(0..n[0]).map(|i| cp(i, side * (n[1] - 1))).collect()
				}
			})
			.collect();
		let collapsed: Vec<bool> = line_pts.iter().map(|pts| coincident(pts.iter(), self.tol)).collect();
		// a step in u runs along the vmin or vmax edge, a step in v along umin or umax
		let edge = |a: usize, b: usize| if a ^ b == 1 { 2 + (a >> 1) } else { a & 1 };
		let periodic = self.periodic;
		let vertices: Vec<VertexId> = (0..4)
			.map(|c| {
				let p = cp((c & 1) * (n[0] - 1), (c >> 1) * (n[1] - 1));
				let used = EntityUse { patch: id, local: c };
				self.add_vertex(p, used, |other| may_share(c, other, periodic, |a, b| collapsed[edge(a, b)]))
			})
			.collect();

		let mut lines = Vec::with_capacity(4);
		for (e, pts) in line_pts.into_iter().enumerate() {
			let [c1, c2] = SURFACE_LINE_CORNERS[e];
			let ends = [vertices[c1], vertices[c2]];
			lines.push(self.add_line(pts, ends, EntityUse { patch: id, local: e }));
		}

		let pts = (0..n[1]).flat_map(|j| (0..n[0]).map(move |i| (i, j)))
			.map(|(i, j)| cp(i, j))
			.collect();
		// a surface is its own face, never merged with another patch
		let corners = [vertices[0], vertices[1], vertices[2], vertices[3]];
		let used = self.insert_face(pts, [n[0], n[1]], corners, EntityUse { patch: id, local: 0 });
		for l in lines.iter() {
			self.link(l.line, used.face);
		}

		self.patches.push(PatchEntities {
			vertices,
			lines,
			faces: vec![used],
			volume: None,
			n,
		});
	}

	fn link(&mut self, line: LineId, face: FaceId) {
		let faces = &mut self.lines[line.0].faces;
		if !faces.contains(&face) {
			faces.push(face);
		}
		let lines = &mut self.faces[face.0].lines;
		if !lines.contains(&line) {
			lines.push(line);
		}
	}

	// `may_share` is asked about every corner of the same patch already on a
	// candidate vertex
	fn add_vertex(&mut self, p: P3, used: EntityUse, may_share: impl Fn(usize) -> bool) -> VertexId {
		let found = self.vertex_hash.within(&p).into_iter().find(|&id| {
			self.vertices[id].uses
				.iter()
				.filter(|u| u.patch == used.patch)
				.all(|u| may_share(u.local))
		});
		if let Some(id) = found {
			self.vertices[id].uses.push(used);
			return VertexId(id)
		}
		let id = self.vertices.len();
		self.vertex_hash.insert(p, id);
		self.vertices.push(Vertex {
			cp: p,
			uses: vec![used],
			lines: Vec::new(),
		});
		VertexId(id)
	}

	fn add_line(&mut self, cp: Vec<P3>, ends: [VertexId; 2], used: EntityUse) -> LineUse {
		let mut key = ends;
		key.sort_unstable();
		if let Some(candidates) = self.line_index.get(&key) {
			for &id in candidates.iter() {
				if let Some(reversed) = self.lines[id.0].orientation_of(&cp, self.tol) {
					self.lines[id.0].uses.push(used);
					return LineUse { line: id, reversed }
				}
			}
		}
		let id = LineId(self.lines.len());
		let mut line = Line::new(ends[0], ends[1], cp, self.tol);
		line.uses.push(used);
		self.lines.push(line);
		self.line_index.entry(key).or_default().push(id);
		for v in ends {
			let lines = &mut self.vertices[v.0].lines;
			if !lines.contains(&id) {
				lines.push(id);
			}
		}
		LineUse { line: id, reversed: false }
	}

	fn add_face(&mut self, cp: Vec<P3>, n: [usize; 2], corners: [VertexId; 4], used: EntityUse) -> FaceUse {
		let mut key = corners;
		key.sort_unstable();
		if let Some(candidates) = self.face_index.get(&key) {
			for &id in candidates.iter() {
				if let Some(orientation) = self.faces[id.0].orientation_of(&cp, n, self.tol) {
					let face = &mut self.faces[id.0];
					face.uses.push(used);
					if !face.volumes.contains(&used.patch) {
						face.volumes.push(used.patch);
					}
					return FaceUse { face: id, orientation }
				}
			}
		}
		self.insert_face(cp, n, corners, used)
	}

	fn insert_face(&mut self, cp: Vec<P3>, n: [usize; 2], corners: [VertexId; 4], used: EntityUse) -> FaceUse {
		let id = FaceId(self.faces.len());
		let mut face = Face::new(cp, n, corners, self.tol);
		face.uses.push(used);
		face.volumes.push(used.patch);
		self.faces.push(face);
		let mut key = corners;
		key.sort_unstable();
		self.face_index.entry(key).or_default().push(id);
		FaceUse { face: id, orientation: FaceOrientation::IDENTITY }
	}

	pub fn tolerance(&self) -> f64 {
		self.tol
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Parametric directions in which a patch may meet itself
	pub fn periodic(&self) -> [bool; 3] {
		self.periodic
	}

	pub fn numb_vertices(&self) -> usize {
		self.vertices.len()
	}

	pub fn numb_lines(&self) -> usize {
		self.lines.len()
	}

	pub fn numb_faces(&self) -> usize {
		self.faces.len()
	}

	pub fn numb_volumes(&self) -> usize {
		self.volumes.len()
	}

	pub fn numb_non_degen_lines(&self) -> usize {
		self.lines.iter().filter(|l| !l.degenerate).count()
	}

	pub fn numb_non_degen_faces(&self) -> usize {
		self.faces.iter().filter(|f| !f.degenerate).count()
	}

	pub fn summary(&self) -> TopologySummary {
		TopologySummary {
			vertices: self.numb_vertices(),
			lines: self.numb_lines(),
			non_degenerate_lines: self.numb_non_degen_lines(),
			faces: self.numb_faces(),
			non_degenerate_faces: self.numb_non_degen_faces(),
			volumes: self.numb_volumes(),
		}
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	pub fn faces(&self) -> &[Face] {
		&self.faces
	}

	pub fn volumes(&self) -> &[Volume] {
		&self.volumes
	}

	pub fn vertex(&self, id: VertexId) -> &Vertex {
		&self.vertices[id.0]
	}

	pub fn line(&self, id: LineId) -> &Line {
		&self.lines[id.0]
	}

	pub fn face(&self, id: FaceId) -> &Face {
		&self.faces[id.0]
	}

	pub fn numb_patches(&self) -> usize {
		self.patches.len()
	}

	pub fn patches(&self) -> &[PatchEntities] {
		&self.patches
	}

	pub fn patch(&self, id: usize) -> Result<&PatchEntities> {
		self.patches.get(id)
			.ok_or_else(|| Error::invalid(format!("patch {} of {}", id, self.patches.len())))
	}
}
