//! The spline model: patches, their topology, numbering and property codes.
//!
//! Every geometry change bumps a generation counter. Topology and numbering
//! remember the generation they were built from, and queries against an
//! outdated one fail with [`Error::Stale`] instead of answering with old data.

use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;

use crate::gno;
use crate::numbering::{self, GlobalNumbering, Scheme};
use crate::primitives::{
	SURFACE_LINE_CORNERS, VOLUME_FACE_CORNERS, VOLUME_FACE_LINES, VOLUME_LINE_CORNERS,
};
use crate::properties::{parse_commands, EntityKey, EntityKind, PropertyCode, PropertyCommand, PropertyTable};
use crate::spline::SplinePatch;
use crate::splinefile;
use crate::topology::TopologySet;
use crate::{Error, Result};

pub const DEFAULT_TOLERANCE: f64 = 1e-4;

pub struct SplineModel {
	patches: Vec<SplinePatch>,
	tol: f64,
	periodic: [bool; 3],
	generation: u64,
	topology: Option<TopologySet>,
	numbering: Option<GlobalNumbering>,
	mixed: Option<GlobalNumbering>,
	properties: PropertyTable,
}

impl Default for SplineModel {
	fn default() -> Self {
		Self::new()
	}
}

impl SplineModel {
	pub fn new() -> Self {
		Self {
			patches: Vec::new(),
			tol: DEFAULT_TOLERANCE,
			periodic: [false; 3],
			generation: 0,
			topology: None,
			numbering: None,
			mixed: None,
			properties: PropertyTable::default(),
		}
	}

	/// Model over `patches` with its topology already built
	pub fn from_patches(patches: Vec<SplinePatch>) -> Result<Self> {
		let mut model = Self::new();
		model.add_patches(patches)?;
		model.build_topology()?;
		Ok(model)
	}

	fn add_patches(&mut self, patches: Vec<SplinePatch>) -> Result<()> {
		let volumes = match self.patches.first().or_else(|| patches.first()) {
			Some(p) => p.is_volume(),
			None => return Ok(()),
		};
		if let Some(id) = patches.iter().position(|p| p.is_volume() != volumes) {
			let kind = if volumes { "volume" } else { "surface" };
			return Err(Error::ModelKind(format!("patch {} does not fit a {} model", self.patches.len() + id, kind)))
		}
		self.patches.extend(patches);
		self.touch();
		Ok(())
	}

	fn touch(&mut self) {
		self.generation += 1;
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_volumetric_model(&self) -> bool {
		self.patches.first().map_or(false, SplinePatch::is_volume)
	}

	pub fn is_surface_model(&self) -> bool {
		self.patches.first().map_or(false, |p| !p.is_volume())
	}

	pub fn numb_patches(&self) -> usize {
		self.patches.len()
	}

	pub fn patches(&self) -> &[SplinePatch] {
		&self.patches
	}

	pub fn patch(&self, id: usize) -> Result<&SplinePatch> {
		self.patches.get(id)
			.ok_or_else(|| Error::invalid(format!("patch {} of {}", id, self.patches.len())))
	}

	fn patch_mut(&mut self, id: usize) -> Result<&mut SplinePatch> {
		let count = self.patches.len();
		self.patches.get_mut(id)
			.ok_or_else(|| Error::invalid(format!("patch {} of {}", id, count)))
	}

	// ---- streams ----

	/// Append the patches of a splines stream
	pub fn read_splines(&mut self, input: &str, build_topology: bool) -> Result<()> {
		let patches = splinefile::read_splines(input)?;
		debug!("read {} patches", patches.len());
		self.add_patches(patches)?;
		if build_topology {
			self.build_topology()?;
		}
		Ok(())
	}

	pub fn load_splines<P: AsRef<Path>>(&mut self, file: P, build_topology: bool) -> Result<()> {
		let string = std::fs::read_to_string(file)?;
		self.read_splines(&string, build_topology)
	}

	pub fn write_splines<W: Write>(&self, os: &mut W) -> Result<()> {
		splinefile::write_splines(&self.patches, os)
	}

	// ---- topology ----

	pub fn tolerance(&self) -> f64 {
		self.tol
	}

	/// Takes effect at the next `build_topology`; the current one goes stale
	pub fn set_topology_tolerance(&mut self, tol: f64) -> Result<()> {
		if !(tol > 0.0) || !tol.is_finite() {
			return Err(Error::invalid(format!("topology tolerance {}", tol)))
		}
		self.tol = tol;
		self.touch();
		Ok(())
	}

	/// Let patches meet themselves across the flagged parametric directions.
	/// Missing flags count as false. Takes effect at the next `build_topology`.
	pub fn set_periodic(&mut self, periodic: &[bool]) -> Result<()> {
		if periodic.len() > 3 {
			return Err(Error::invalid(format!("{} periodic flags for at most 3 directions", periodic.len())))
		}
		self.periodic = [false; 3];
		for (f, p) in self.periodic.iter_mut().zip(periodic) {
			*f = *p;
		}
		self.touch();
		Ok(())
	}

	pub fn build_topology(&mut self) -> Result<&TopologySet> {
		let mut topo = TopologySet::build_periodic(&self.patches, self.tol, &self.periodic)?;
		topo.generation = self.generation;
		Ok(self.topology.insert(topo))
	}

	pub fn topology(&self) -> Result<&TopologySet> {
		match &self.topology {
			None => Err(Error::NotBuilt("topology")),
			Some(t) if t.generation != self.generation => Err(Error::Stale("topology")),
			Some(t) => Ok(t),
		}
	}

	/// Reverse the w direction of every left-handed volume. Returns whether
	/// anything changed; topology and numbering must then be rebuilt.
	pub fn enforce_right_hand_system(&mut self) -> Result<bool> {
		if !self.is_volumetric_model() {
			return Ok(false)
		}
		let mut changed = false;
		for (id, patch) in self.patches.iter_mut().enumerate() {
			if patch.handedness() < 0.0 {
				patch.reverse_direction(2)?;
				self.properties.reflect(id, 2, true);
				info!("patch {} reparameterized to a right-handed system", id);
				changed = true;
			}
		}
		if changed {
			self.touch();
		}
		Ok(changed)
	}

	// ---- refinement ----

	pub fn knot_insert(&mut self, patch: usize, dir: usize, knot: f64) -> Result<()> {
		self.patch_mut(patch)?.insert_knot(dir, knot)?;
		self.touch();
		Ok(())
	}

	pub fn boundary_layer_refinement(&mut self, patch: usize, dir: usize, at_start: bool, scale: f64, n: usize) -> Result<()> {
		self.patch_mut(patch)?.boundary_layer_refine(dir, at_start, scale, n)?;
		self.touch();
		Ok(())
	}

	pub fn uniform_h_refine(&mut self) -> Result<()> {
		for patch in self.patches.iter_mut() {
			patch.uniform_h_refine()?;
		}
		self.touch();
		Ok(())
	}

	// ---- numbering ----

	pub fn generate_global_numbers(&mut self) -> Result<&GlobalNumbering> {
		let num = numbering::generate(self.topology()?, Scheme::Natural, 0, 0)?;
		self.mixed = None;
		Ok(self.numbering.insert(num))
	}

	/// Patch-wise numbering from `i_start`. With `mixed`, a second numbering
	/// for a basis one order lower is made too, also from `i_start`.
	pub fn generate_global_numbers_petsc(&mut self, mixed: bool, i_start: usize) -> Result<&GlobalNumbering> {
		let topo = self.topology()?;
		let num = numbering::generate(topo, Scheme::Petsc, i_start, 0)?;
		let second = if mixed {
			Some(numbering::generate(topo, Scheme::Petsc, i_start, 1)?)
		} else {
			None
		};
		self.mixed = second;
		Ok(self.numbering.insert(num))
	}

	fn fresh<'a>(&self, num: &'a Option<GlobalNumbering>, what: &'static str) -> Result<&'a GlobalNumbering> {
		match num {
			None => Err(Error::NotBuilt(what)),
			Some(n) if n.generation != self.generation => Err(Error::Stale(what)),
			Some(n) => Ok(n),
		}
	}

	pub fn numbering(&self) -> Result<&GlobalNumbering> {
		self.fresh(&self.numbering, "global numbering")
	}

	pub fn mixed_numbering(&self) -> Result<&GlobalNumbering> {
		self.fresh(&self.mixed, "mixed numbering")
	}

	pub fn get_global_number(&self, patch: usize, u: usize, v: usize, w: Option<usize>) -> Result<usize> {
		self.numbering()?.global_number(patch, u, v, w)
	}

	/// Control points of `patch` along parametric direction `dir`
	pub fn get_numb_pts(&self, patch: usize, dir: usize) -> Result<usize> {
		self.patch(patch)?.num_coefs(dir)
	}

	/// Global index of every local point, per patch, first direction fastest
	pub fn global_numbering(&self) -> Result<Vec<Vec<usize>>> {
		self.numbering()?.tables()
	}

	pub fn write_global_number_ordering<W: Write>(&self, os: &mut W) -> Result<()> {
		gno::write_global_number_ordering(self.numbering()?, os)
	}

	/// Import a gno stream. With a current topology, indices on shared
	/// entities are checked against every patch that sees them.
	pub fn read_global_number_ordering(&mut self, input: &str) -> Result<&GlobalNumbering> {
		let dims: Vec<[usize; 3]> = self.patches.iter().map(SplinePatch::dims).collect();
		let topo = self.topology().ok();
		let mut num = gno::read_global_number_ordering(input, &dims, self.is_volumetric_model(), topo)?;
		num.generation = self.generation;
		self.mixed = None;
		Ok(self.numbering.insert(num))
	}

	pub fn save_numbering_json<W: Write>(&self, os: &mut W) -> Result<()> {
		serde_json::to_writer_pretty(os, self.numbering()?)?;
		Ok(())
	}

	// ---- property codes ----

	fn key(&self, patch: usize, kind: EntityKind, local: usize) -> Result<EntityKey> {
		self.patch(patch)?;
		let count = match (self.is_volumetric_model(), kind) {
			(true, EntityKind::Volume) => 1,
			(true, EntityKind::Face) => 6,
			(true, EntityKind::Line) => 12,
			(true, EntityKind::Vertex) => 8,
			(false, EntityKind::Volume) => 0,
			(false, EntityKind::Face) => 1,
			(false, _) => 4,
		};
		if local >= count {
			return Err(Error::invalid(format!(
				"{} {} of patch {} ({} available)", kind.keyword(), local, patch, count,
			)))
		}
		Ok(EntityKey::new(patch, kind, local))
	}

	// every patch-local use of the canonical entity behind `key`
	fn uses(&self, key: EntityKey) -> Result<Vec<EntityKey>> {
		let topo = self.topology()?;
		let pe = topo.patch(key.patch)?;
		let uses = match key.kind {
			EntityKind::Volume => return Ok(vec![key]),
			EntityKind::Face if pe.volume.is_none() => return Ok(vec![key]),
			EntityKind::Face => &topo.face(pe.faces[key.local].face).uses,
			EntityKind::Line => &topo.line(pe.lines[key.local].line).uses,
			EntityKind::Vertex => &topo.vertex(pe.vertices[key.local]).uses,
		};
		Ok(uses.iter().map(|u| EntityKey::new(u.patch, key.kind, u.local)).collect())
	}

	fn apply(&mut self, key: EntityKey, code: &PropertyCode, overwrite: bool) -> Result<()> {
		for k in self.uses(key)? {
			self.properties.set(k, code, overwrite);
		}
		Ok(())
	}

	fn apply_around(&mut self, patch: usize, lines: &[usize], corners: &[usize], code: &PropertyCode) -> Result<()> {
		for &l in lines {
			self.apply(EntityKey::new(patch, EntityKind::Line, l), code, false)?;
		}
		for &c in corners {
			self.apply(EntityKey::new(patch, EntityKind::Vertex, c), code, false)?;
		}
		Ok(())
	}

	/// Tag a volume patch; `inclusive` also tags its faces, lines and
	/// vertices that have no code yet
	pub fn add_volume_property_code(&mut self, patch: usize, code: impl Into<PropertyCode>, inclusive: bool) -> Result<()> {
		let code = code.into();
		let key = self.key(patch, EntityKind::Volume, 0)?;
		self.properties.check_kind(&code)?;
		self.apply(key, &code, true)?;
		if inclusive {
			for f in 0..6 {
				self.apply(EntityKey::new(patch, EntityKind::Face, f), &code, false)?;
			}
			let lines: Vec<usize> = (0..12).collect();
			let corners: Vec<usize> = (0..8).collect();
			self.apply_around(patch, &lines, &corners, &code)?;
		}
		Ok(())
	}

	/// Tag a face, and with `inclusive` its untagged bounding lines and vertices.
	/// In surface models the patch itself is face 0.
	pub fn add_face_property_code(&mut self, patch: usize, face: usize, code: impl Into<PropertyCode>, inclusive: bool) -> Result<()> {
		let code = code.into();
		let key = self.key(patch, EntityKind::Face, face)?;
		self.properties.check_kind(&code)?;
		self.apply(key, &code, true)?;
		if inclusive {
			if self.is_volumetric_model() {
				self.apply_around(patch, &VOLUME_FACE_LINES[face], &VOLUME_FACE_CORNERS[face], &code)?;
			} else {
				self.apply_around(patch, &[0, 1, 2, 3], &[0, 1, 2, 3], &code)?;
			}
		}
		Ok(())
	}

	pub fn add_line_property_code(&mut self, patch: usize, line: usize, code: impl Into<PropertyCode>, inclusive: bool) -> Result<()> {
		let code = code.into();
		let key = self.key(patch, EntityKind::Line, line)?;
		self.properties.check_kind(&code)?;
		self.apply(key, &code, true)?;
		if inclusive {
			let corners = if self.is_volumetric_model() {
				VOLUME_LINE_CORNERS[line]
			} else {
				SURFACE_LINE_CORNERS[line]
			};
			self.apply_around(patch, &[], &corners, &code)?;
		}
		Ok(())
	}

	pub fn add_vertex_property_code(&mut self, patch: usize, vertex: usize, code: impl Into<PropertyCode>) -> Result<()> {
		let code = code.into();
		let key = self.key(patch, EntityKind::Vertex, vertex)?;
		self.properties.check_kind(&code)?;
		self.apply(key, &code, true)
	}

	fn code(&self, patch: usize, kind: EntityKind, local: usize) -> Result<Option<&PropertyCode>> {
		let key = self.key(patch, kind, local)?;
		Ok(self.properties.get(&key))
	}

	/// `None` when no code is attached
	pub fn get_volume_property_code(&self, patch: usize) -> Result<Option<&PropertyCode>> {
		self.code(patch, EntityKind::Volume, 0)
	}

	pub fn get_face_property_code(&self, patch: usize, face: usize) -> Result<Option<&PropertyCode>> {
		self.code(patch, EntityKind::Face, face)
	}

	pub fn get_line_property_code(&self, patch: usize, line: usize) -> Result<Option<&PropertyCode>> {
		self.code(patch, EntityKind::Line, line)
	}

	pub fn get_vertex_property_code(&self, patch: usize, vertex: usize) -> Result<Option<&PropertyCode>> {
		self.code(patch, EntityKind::Vertex, vertex)
	}

	pub fn properties(&self) -> &PropertyTable {
		&self.properties
	}

	pub fn clear_properties(&mut self) {
		self.properties.clear();
	}

	/// Apply a property command stream, all of it or nothing. Numeric codes
	/// are read as text when the stream or the model already uses text codes.
	pub fn read_model_properties(&mut self, input: &str) -> Result<()> {
		let mut commands = parse_commands(input)?;
		if !commands.is_empty() && self.patches.is_empty() {
			warn!("property commands given for an empty model");
		}
		let text = self.properties.is_text_coded()
			|| commands.iter().any(|c| matches!(c.code, PropertyCode::Text(_)));
		if text {
			for cmd in commands.iter_mut() {
				cmd.code = cmd.code.to_text();
			}
		}

		let saved = self.properties.clone();
		let applied = commands.into_iter().try_for_each(|cmd| self.apply_command(cmd));
		if applied.is_err() {
			self.properties = saved;
		}
		applied
	}

	fn apply_command(&mut self, cmd: PropertyCommand) -> Result<()> {
		match cmd.kind {
			EntityKind::Volume => {
				self.add_volume_property_code(cmd.patch, cmd.code, cmd.inclusive.unwrap_or(false))
			}
			EntityKind::Face => {
				self.add_face_property_code(cmd.patch, cmd.local, cmd.code, cmd.inclusive.unwrap_or(true))
			}
			EntityKind::Line => {
				self.add_line_property_code(cmd.patch, cmd.local, cmd.code, cmd.inclusive.unwrap_or(true))
			}
			EntityKind::Vertex => self.add_vertex_property_code(cmd.patch, cmd.local, cmd.code),
		}
	}

	pub fn write_model_properties<W: Write>(&self, os: &mut W) -> Result<()> {
		self.properties.write(os)
	}

	pub fn write_model_xml_properties<W: Write>(&self, os: &mut W) -> Result<()> {
		self.properties.write_xml(os)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::P3;

	fn cube(x0: f64) -> SplinePatch {
		SplinePatch::cuboid(P3::new(x0, 0.0, 0.0), P3::new(x0 + 1.0, 1.0, 1.0), [2; 3], [3; 3]).unwrap()
	}

	#[test]
	fn test_stale_after_refinement() {
		let mut model = SplineModel::from_patches(vec![cube(0.0), cube(1.0)]).unwrap();
		assert!(matches!(model.numbering(), Err(Error::NotBuilt(_))));
		model.generate_global_numbers().unwrap();
		assert_eq!(model.numbering().unwrap().count, 45);
		model.uniform_h_refine().unwrap();
		assert!(matches!(model.topology(), Err(Error::Stale(_))));
		assert!(matches!(model.get_global_number(0, 0, 0, Some(0)), Err(Error::Stale(_))));
		assert!(model.generate_global_numbers().is_err());
		model.build_topology().unwrap();
		model.generate_global_numbers().unwrap();
		assert_eq!(model.numbering().unwrap().count, 5 * 5 * 5 * 2 - 25);
		assert_eq!(model.get_numb_pts(1, 2).unwrap(), 5);
	}

	#[test]
	fn test_tolerance_change_marks_stale() {
		let mut model = SplineModel::from_patches(vec![cube(0.0)]).unwrap();
		model.set_topology_tolerance(1e-6).unwrap();
		assert!(model.topology().is_err());
		assert!(model.set_topology_tolerance(-1.0).is_err());
		assert_eq!(model.build_topology().unwrap().tolerance(), 1e-6);
	}

	#[test]
	fn test_periodic_flags() {
		let mut model = SplineModel::from_patches(vec![cube(0.0)]).unwrap();
		assert!(model.set_periodic(&[true, false, true, false]).is_err());
		model.set_periodic(&[true]).unwrap();
		assert!(matches!(model.topology(), Err(Error::Stale(_))));
		assert_eq!(model.build_topology().unwrap().periodic(), [true, false, false]);
		// an open cube has nothing to close up
		assert_eq!(model.topology().unwrap().numb_vertices(), 8);
	}

	#[test]
	fn test_mixed_kinds() {
		let mut model = SplineModel::from_patches(vec![cube(0.0)]).unwrap();
		let s = SplinePatch::rectangle([0.0, 0.0], [1.0, 1.0], [2, 2], [2, 2]).unwrap();
		let mut text = Vec::new();
		splinefile::write_splines(&[s], &mut text).unwrap();
		let text = String::from_utf8(text).unwrap();
		assert!(matches!(model.read_splines(&text, true), Err(Error::ModelKind(_))));
		assert_eq!(model.numb_patches(), 1);
	}

	#[test]
	fn test_petsc_mixed() {
		let a = SplinePatch::cuboid(P3::new(0.0, 0.0, 0.0), P3::new(1.0, 1.0, 1.0), [3; 3], [4; 3]).unwrap();
		let b = SplinePatch::cuboid(P3::new(1.0, 0.0, 0.0), P3::new(2.0, 1.0, 1.0), [3; 3], [4; 3]).unwrap();
		let mut model = SplineModel::from_patches(vec![a, b]).unwrap();
		model.generate_global_numbers_petsc(true, 5).unwrap();
		assert_eq!(model.numbering().unwrap().count, 64 + 64 - 16);
		let mixed = model.mixed_numbering().unwrap();
		assert_eq!(mixed.start, 5);
		assert_eq!(mixed.count, 27 + 27 - 9);
		model.generate_global_numbers().unwrap();
		assert!(model.mixed_numbering().is_err());
	}

	#[test]
	fn test_face_code_inclusive() {
		let mut model = SplineModel::from_patches(vec![cube(0.0), cube(1.0)]).unwrap();
		model.add_line_property_code(0, 5, 7, false).unwrap();
		model.add_face_property_code(0, 1, 3, true).unwrap();

		assert_eq!(model.get_face_property_code(0, 1).unwrap(), Some(&PropertyCode::Int(3)));
		assert_eq!(model.get_face_property_code(1, 0).unwrap(), Some(&PropertyCode::Int(3)));
		for l in [7, 9, 11] {
			assert_eq!(model.get_line_property_code(0, l).unwrap(), Some(&PropertyCode::Int(3)));
		}
		assert_eq!(model.get_line_property_code(0, 5).unwrap(), Some(&PropertyCode::Int(7)));
		// line 5 of patch 0 is line 4 of patch 1
		assert_eq!(model.get_line_property_code(1, 4).unwrap(), Some(&PropertyCode::Int(7)));
		for c in [1, 3, 5, 7] {
			assert_eq!(model.get_vertex_property_code(0, c).unwrap(), Some(&PropertyCode::Int(3)));
			assert_eq!(model.get_vertex_property_code(1, c - 1).unwrap(), Some(&PropertyCode::Int(3)));
		}
		assert_eq!(model.get_vertex_property_code(0, 0).unwrap(), None);
		assert_eq!(model.get_face_property_code(0, 0).unwrap(), None);
		assert!(model.get_face_property_code(0, 6).is_err());
		assert!(model.get_vertex_property_code(2, 0).is_err());
		assert!(matches!(model.add_volume_property_code(0, "body", false), Err(Error::MixedPropertyCodes)));
	}

	#[test]
	fn test_property_stream_round_trip() {
		let mut model = SplineModel::from_patches(vec![cube(0.0), cube(1.0)]).unwrap();
		model.read_model_properties("volume 1 fluid\nface 0 0 inlet\nline 1 11 wall exclusive\nvertex 0 0 corner\n").unwrap();
		assert_eq!(model.get_volume_property_code(0).unwrap(), None);
		assert_eq!(model.get_vertex_property_code(0, 0).unwrap(), Some(&PropertyCode::from("corner")));
		assert_eq!(model.get_vertex_property_code(0, 2).unwrap(), Some(&PropertyCode::from("inlet")));
		assert_eq!(model.get_vertex_property_code(1, 7).unwrap(), None);

		let mut out = Vec::new();
		model.write_model_properties(&mut out).unwrap();
		let text = String::from_utf8(out).unwrap();
		let mut again = SplineModel::from_patches(vec![cube(0.0), cube(1.0)]).unwrap();
		again.read_model_properties(&text).unwrap();
		assert_eq!(again.properties(), model.properties());
	}

	#[test]
	fn test_right_hand_keeps_codes() {
		let mut left = cube(0.0);
		left.swap_directions(0, 1).unwrap();
		let mut model = SplineModel::from_patches(vec![left]).unwrap();
		model.add_face_property_code(0, 4, 1, false).unwrap();
		assert!(model.enforce_right_hand_system().unwrap());
		assert!(model.patch(0).unwrap().is_right_handed());
		assert!(!model.enforce_right_hand_system().unwrap());
		assert_eq!(model.get_face_property_code(0, 5).unwrap(), Some(&PropertyCode::Int(1)));
		assert_eq!(model.get_face_property_code(0, 4).unwrap(), None);
		assert!(matches!(model.topology(), Err(Error::Stale(_))));
	}

	#[test]
	fn test_failed_stream_leaves_codes_alone() {
		let mut model = SplineModel::from_patches(vec![cube(0.0), cube(1.0)]).unwrap();
		model.add_volume_property_code(1, 2, false).unwrap();
		let before = model.properties().clone();
		assert!(model.read_model_properties("face 0 0 5\nface 0 9 6\n").is_err());
		assert_eq!(model.properties(), &before);
		assert_eq!(model.get_face_property_code(0, 0).unwrap(), None);
		assert!(matches!(model.read_model_properties("face 0 0 5\nvolume 0 fluid\n"), Err(Error::MixedPropertyCodes)));
		assert_eq!(model.properties(), &before);
		model.read_model_properties("face 0 0 5\n").unwrap();
		assert_eq!(model.get_face_property_code(0, 0).unwrap(), Some(&PropertyCode::Int(5)));
		assert_eq!(model.get_volume_property_code(1).unwrap(), Some(&PropertyCode::Int(2)));
	}

	#[test]
	fn test_numeric_codes_in_text_stream() {
		let mut model = SplineModel::from_patches(vec![cube(0.0)]).unwrap();
		model.read_model_properties("volume 0 fluid\nface 0 0 2\n").unwrap();
		assert_eq!(model.get_face_property_code(0, 0).unwrap(), Some(&PropertyCode::from("2")));
		model.read_model_properties("face 0 1 3\n").unwrap();
		assert_eq!(model.get_face_property_code(0, 1).unwrap(), Some(&PropertyCode::from("3")));
		assert!(matches!(model.add_face_property_code(0, 2, 4, false), Err(Error::MixedPropertyCodes)));
	}
}
