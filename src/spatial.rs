//! Grid hash over corner points for tolerance matching.
//!
//! Cells are twice the tolerance wide, so every point closer than the
//! tolerance to a query sits in the query's cell or one of its 26 neighbours.

use rustc_hash::FxHashMap;

use crate::P3;

pub struct SpatialHash {
	cells: FxHashMap<(i64, i64, i64), Vec<(P3, usize)>>,
	cell_size: f64,
	tolerance: f64,
}

impl SpatialHash {
	pub fn new(tolerance: f64) -> Self {
		Self {
			cells: FxHashMap::default(),
			cell_size: tolerance * 2.0,
			tolerance,
		}
	}

	fn cell(&self, p: &P3) -> (i64, i64, i64) {
		let d = |v: f64| (v / self.cell_size).floor() as i64;
		(d(p.x), d(p.y), d(p.z))
	}

	/// Stored ids strictly closer than the tolerance, nearest first. Ties go
	/// to the earlier id so the order is independent of cell layout.
	pub fn within(&self, p: &P3) -> Vec<usize> {
		let (cx, cy, cz) = self.cell(p);
		let mut found: Vec<(f64, usize)> = Vec::new();
		for dx in -1..=1 {
			for dy in -1..=1 {
				for dz in -1..=1 {
					let Some(pts) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) else {
						continue
					};
					found.extend(pts.iter()
						.map(|(q, id)| ((q - p).norm(), *id))
						.filter(|(dist, _)| *dist < self.tolerance));
				}
			}
		}
		found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
		found.into_iter().map(|(_, id)| id).collect()
	}

	/// Nearest stored id strictly closer than the tolerance
	pub fn nearest(&self, p: &P3) -> Option<usize> {
		self.within(p).first().copied()
	}

	pub fn insert(&mut self, p: P3, id: usize) {
		self.cells.entry(self.cell(&p)).or_default().push((p, id));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_nearest_within_tolerance() {
		let mut hash = SpatialHash::new(1e-6);
		hash.insert(P3::new(1.0, 2.0, 3.0), 0);
		hash.insert(P3::new(2.0, 2.0, 3.0), 1);
		assert_eq!(hash.nearest(&P3::new(1.0 + 1e-7, 2.0, 3.0)), Some(0));
		assert_eq!(hash.nearest(&P3::new(1.5, 2.0, 3.0)), None);
	}

	#[test]
	fn test_cell_boundary() {
		let mut hash = SpatialHash::new(0.1);
		hash.insert(P3::new(0.199, 0.0, 0.0), 7);
		assert_eq!(hash.nearest(&P3::new(0.201, 0.0, 0.0)), Some(7));
	}

	#[test]
	fn test_exact_tolerance_is_distinct() {
		let mut hash = SpatialHash::new(0.5);
		hash.insert(P3::new(0.0, 0.0, 0.0), 0);
		assert_eq!(hash.nearest(&P3::new(0.5, 0.0, 0.0)), None);
		assert_eq!(hash.nearest(&P3::new(0.25, 0.0, 0.0)), Some(0));
	}

	#[test]
	fn test_prefers_nearest() {
		let mut hash = SpatialHash::new(1.0);
		hash.insert(P3::new(0.0, 0.0, 0.0), 0);
		hash.insert(P3::new(0.9, 0.0, 0.0), 1);
		assert_eq!(hash.nearest(&P3::new(0.6, 0.0, 0.0)), Some(1));
	}

	#[test]
	fn test_within_order() {
		let mut hash = SpatialHash::new(1.0);
		hash.insert(P3::new(0.5, 0.0, 0.0), 3);
		hash.insert(P3::new(0.0, 0.0, 0.0), 2);
		hash.insert(P3::new(0.0, 0.5, 0.0), 1);
		hash.insert(P3::new(2.0, 0.0, 0.0), 0);
		assert_eq!(hash.within(&P3::new(0.0, 0.0, 0.0)), vec![2, 1, 3]);
		assert!(hash.within(&P3::new(5.0, 0.0, 0.0)).is_empty());
	}
}
