use approx::assert_abs_diff_eq;
use spline_model::{Basis, Error, SplineModel, SplinePatch, P3};
use std::collections::BTreeMap;

fn block(x0: f64, y0: f64, n: [usize; 3]) -> SplinePatch {
	SplinePatch::cuboid(P3::new(x0, y0, 0.0), P3::new(x0 + 1.0, y0 + 1.0, 1.0), [2, 3, 2], n).unwrap()
}

const SWAPS: [&[(usize, usize)]; 6] = [&[], &[(0, 1)], &[(1, 2)], &[(0, 2)], &[(0, 1), (1, 2)], &[(1, 2), (0, 1)]];

fn reoriented(mut patch: SplinePatch, flips: usize, swaps: &[(usize, usize)]) -> SplinePatch {
	let pdim = patch.param_dim();
	for d in 0..pdim {
		if flips >> d & 1 == 1 {
			patch.reverse_direction(d).unwrap();
		}
	}
	for &(a, b) in swaps {
		patch.swap_directions(a, b).unwrap();
	}
	patch
}

// same global index exactly when same point, and the indices fill a range
fn check_consistent(model: &SplineModel) {
	let num = model.numbering().unwrap();
	let mut seen: BTreeMap<usize, P3> = BTreeMap::new();
	for (id, patch) in model.patches().iter().enumerate() {
		let n = patch.dims();
		for k in 0..n[2] {
			for j in 0..n[1] {
				for i in 0..n[0] {
					let w = if patch.is_volume() { Some(k) } else { None };
					let g = model.get_global_number(id, i, j, w).unwrap();
					let p = patch.control_point(i, j, k);
					match seen.get(&g) {
						Some(q) => assert_abs_diff_eq!(p, *q, epsilon = 1e-9),
						None => {
							seen.insert(g, p);
						}
					}
				}
			}
		}
	}
	assert_eq!(seen.len(), num.count);
	assert_eq!(seen.keys().copied().collect::<Vec<_>>(), (num.start..num.start + num.count).collect::<Vec<_>>());
	let points: Vec<P3> = seen.into_values().collect();
	for a in 0..points.len() {
		for b in a + 1..points.len() {
			assert!((points[a] - points[b]).norm() > 1e-6);
		}
	}
}

#[test]
fn test_two_glued_cubes() {
	let n = [3, 3, 3];
	let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), block(1.0, 0.0, n)]).unwrap();
	let topo = model.topology().unwrap();
	assert_eq!(topo.numb_vertices(), 12);
	assert_eq!(topo.numb_lines(), 20);
	assert_eq!(topo.numb_faces(), 11);
	model.generate_global_numbers().unwrap();
	assert_eq!(model.numbering().unwrap().count, 45);
	check_consistent(&model);
}

#[test]
fn test_every_neighbour_orientation() {
	let n = [3, 4, 5];
	for flips in 0..8 {
		for swaps in SWAPS {
			let b = reoriented(block(1.0, 0.0, n), flips, swaps);
			let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), b]).unwrap();
			assert_eq!(model.topology().unwrap().numb_faces(), 11, "flips {} swaps {:?}", flips, swaps);
			model.generate_global_numbers().unwrap();
			assert_eq!(model.numbering().unwrap().count, 2 * 60 - 20);
			check_consistent(&model);

			model.generate_global_numbers_petsc(false, 7).unwrap();
			assert_eq!(model.numbering().unwrap().start, 7);
			check_consistent(&model);
		}
	}
}

#[test]
fn test_surface_orientations() {
	let rect = |x0: f64| SplinePatch::rectangle([x0, 0.0], [x0 + 1.0, 1.0], [2, 3], [3, 4]).unwrap();
	for flips in 0..4 {
		for swap in [false, true] {
			let swaps: &[(usize, usize)] = if swap { &[(0, 1)] } else { &[] };
			let b = reoriented(rect(1.0), flips, swaps);
			let mut model = SplineModel::from_patches(vec![rect(0.0), b]).unwrap();
			assert!(model.is_surface_model());
			assert_eq!(model.topology().unwrap().numb_lines(), 7);
			model.generate_global_numbers().unwrap();
			assert_eq!(model.numbering().unwrap().count, 2 * 12 - 4);
			check_consistent(&model);
		}
	}
}

#[test]
fn test_patch_order_does_not_matter() {
	let n = [3, 3, 3];
	let blocks = vec![block(0.0, 0.0, n), block(1.0, 0.0, n), block(0.0, 1.0, n), block(1.0, 1.0, n)];
	let mut counts = Vec::new();
	for shift in 0..blocks.len() {
		let mut patches = blocks.clone();
		patches.rotate_left(shift);
		if shift % 2 == 1 {
			patches.reverse();
		}
		let mut model = SplineModel::from_patches(patches).unwrap();
		let summary = model.topology().unwrap().summary();
		let count = model.generate_global_numbers().unwrap().count;
		check_consistent(&model);
		counts.push((summary.vertices, summary.lines, summary.faces, count));
	}
	assert_eq!(counts[0], (18, 33, 20, 5 * 5 * 3));
	assert!(counts.iter().all(|c| *c == counts[0]));
}

#[test]
fn test_right_hand_system() {
	let n = [3, 3, 3];
	let left = reoriented(block(1.0, 0.0, n), 1, &[]);
	assert!(!left.is_right_handed());
	let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), left]).unwrap();
	model.add_vertex_property_code(1, 0, 4).unwrap();

	assert!(model.enforce_right_hand_system().unwrap());
	assert!(matches!(model.topology(), Err(Error::Stale(_))));
	assert!(model.patches().iter().all(SplinePatch::is_right_handed));
	// the tagged corner moved along w
	assert!(model.get_vertex_property_code(1, 4).unwrap().is_some());
	assert!(!model.enforce_right_hand_system().unwrap());

	model.build_topology().unwrap();
	model.generate_global_numbers().unwrap();
	assert_eq!(model.numbering().unwrap().count, 45);
	check_consistent(&model);

	let rect = SplinePatch::rectangle([0.0, 0.0], [1.0, 1.0], [2, 2], [2, 2]).unwrap();
	let mut surfaces = SplineModel::from_patches(vec![reoriented(rect, 1, &[])]).unwrap();
	assert!(!surfaces.enforce_right_hand_system().unwrap());
}

#[test]
fn test_inclusive_face_code() {
	let n = [3, 3, 3];
	let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), block(1.0, 0.0, n)]).unwrap();
	model.read_model_properties("# shared wall\nface 1 0 7\n").unwrap();
	// face, its four lines and four corners, seen from both patches
	assert_eq!(model.properties().len(), 2 * 9);
	let mut xml = Vec::new();
	model.write_model_xml_properties(&mut xml).unwrap();
	let xml = String::from_utf8(xml).unwrap();
	assert!(xml.contains("<set name=\"7\" type=\"face\">"));
	assert!(xml.contains("<item patch=\"1\">2</item>"));
	assert!(xml.contains("<item patch=\"2\">1</item>"));
}

#[test]
fn test_gno_round_trip() {
	let n = [3, 4, 5];
	let b = reoriented(block(1.0, 0.0, n), 5, SWAPS[4]);
	let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), b]).unwrap();
	model.generate_global_numbers_petsc(false, 1).unwrap();
	let mut out = Vec::new();
	model.write_global_number_ordering(&mut out).unwrap();
	let text = String::from_utf8(out).unwrap();

	let mut splines = Vec::new();
	model.write_splines(&mut splines).unwrap();
	let mut other = SplineModel::new();
	other.read_splines(std::str::from_utf8(&splines).unwrap(), false).unwrap();
	assert!(matches!(other.topology(), Err(Error::NotBuilt(_))));
	other.read_global_number_ordering(&text).unwrap();
	assert_eq!(other.global_numbering().unwrap(), model.global_numbering().unwrap());
	assert_eq!(other.get_global_number(1, 2, 3, Some(1)).unwrap(), model.get_global_number(1, 2, 3, Some(1)).unwrap());
	check_consistent(&other);
}

#[test]
fn test_refinement_invalidates_numbering() {
	let n = [3, 3, 3];
	let mut model = SplineModel::from_patches(vec![block(0.0, 0.0, n), block(1.0, 0.0, n)]).unwrap();
	model.generate_global_numbers().unwrap();
	model.knot_insert(0, 2, 0.25).unwrap();
	assert!(matches!(model.numbering(), Err(Error::Stale(_))));
	assert!(matches!(model.global_numbering(), Err(Error::Stale(_))));

	// the shared face no longer matches
	model.build_topology().unwrap();
	assert_eq!(model.topology().unwrap().numb_faces(), 12);
	model.knot_insert(1, 2, 0.25).unwrap();
	model.build_topology().unwrap();
	assert_eq!(model.topology().unwrap().numb_faces(), 11);

	model.boundary_layer_refinement(0, 0, true, 2.0, 2).unwrap();
	model.boundary_layer_refinement(1, 0, false, 2.0, 2).unwrap();
	model.build_topology().unwrap();
	model.generate_global_numbers().unwrap();
	assert_eq!(model.get_numb_pts(0, 0).unwrap(), 5);
	assert_eq!(model.numbering().unwrap().count, 2 * 5 * 3 * 4 - 3 * 4);
	check_consistent(&model);
}

// u runs once around the z axis and ends where it started
fn ring(volume: bool) -> SplinePatch {
	let n = [5, 3, if volume { 3 } else { 1 }];
	let mut coefs = Vec::new();
	for k in 0..n[2] {
		for j in 0..n[1] {
			for i in 0..n[0] {
				let angle = std::f64::consts::TAU * i as f64 / 4.0;
				let r = 1.0 + 0.5 * j as f64;
				coefs.extend([r * angle.cos(), r * angle.sin()]);
				if volume {
					coefs.push(0.5 * k as f64);
				}
			}
		}
	}
	let dirs = if volume { 3 } else { 2 };
	let bases = (0..dirs).map(|d| Basis::uniform(2, n[d]).unwrap()).collect();
	SplinePatch::new(bases, dirs, false, coefs).unwrap()
}

#[test]
fn test_periodic_ring_numbering() {
	let mut model = SplineModel::from_patches(vec![ring(true)]).unwrap();
	assert_eq!(model.generate_global_numbers().unwrap().count, 45);
	assert_ne!(model.get_global_number(0, 0, 1, Some(1)).unwrap(), model.get_global_number(0, 4, 1, Some(1)).unwrap());

	model.set_periodic(&[true, false, false]).unwrap();
	model.build_topology().unwrap();
	assert_eq!(model.generate_global_numbers().unwrap().count, 36);
	for k in 0..3 {
		for j in 0..3 {
			let first = model.get_global_number(0, 0, j, Some(k)).unwrap();
			assert_eq!(first, model.get_global_number(0, 4, j, Some(k)).unwrap());
		}
	}
	check_consistent(&model);
	model.generate_global_numbers_petsc(false, 3).unwrap();
	check_consistent(&model);

	let mut surface = SplineModel::from_patches(vec![ring(false)]).unwrap();
	assert_eq!(surface.generate_global_numbers().unwrap().count, 15);
	surface.set_periodic(&[true]).unwrap();
	surface.build_topology().unwrap();
	assert_eq!(surface.generate_global_numbers().unwrap().count, 12);
	check_consistent(&surface);
}
