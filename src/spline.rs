use serde::{Serialize, Deserialize};

use crate::{Error, Result, P3, V3};

/// Knot vector and order for one parametric direction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Basis {
	pub order: usize,
	pub knots: Vec<f64>,
}

impl Basis {
	pub fn new(order: usize, knots: Vec<f64>) -> Result<Self> {
		if order == 0 {
			return Err(Error::invalid("basis order must be positive"))
		}
		if knots.len() < 2 * order {
			return Err(Error::invalid(format!(
				"{} knots is too few for order {}", knots.len(), order,
			)))
		}
		if knots.windows(2).any(|w| w[1] < w[0]) {
			return Err(Error::invalid("knot vector is decreasing"))
		}
		Ok(Self { order, knots })
	}

	// clamped, uniform on [0, 1]
	pub fn uniform(order: usize, n: usize) -> Result<Self> {
		if n < order {
			return Err(Error::invalid(format!("{} coefficients for order {}", n, order)))
		}
		let inner = n - order;
		let mut knots = vec![0.0; order];
		knots.extend((1..=inner).map(|i| i as f64 / (inner + 1) as f64));
		knots.extend(std::iter::repeat(1.0).take(order));
		Self::new(order, knots)
	}

	pub fn num_coefs(&self) -> usize {
		self.knots.len() - self.order
	}

	pub fn start(&self) -> f64 {
		self.knots[self.order - 1]
	}

	pub fn end(&self) -> f64 {
		self.knots[self.num_coefs()]
	}

	fn reverse(&mut self) {
		let (a, b) = (self.start(), self.end());
		self.knots = self.knots.iter().rev().map(|k| a + b - k).collect();
	}

	// non-empty knot spans inside the domain
	fn spans(&self) -> Vec<(f64, f64)> {
		self.knots[self.order - 1..=self.num_coefs()]
			.windows(2)
			.filter(|w| w[1] > w[0])
			.map(|w| (w[0], w[1]))
			.collect()
	}
}

fn grid(n: [usize; 3]) -> impl Iterator<Item = [usize; 3]> {
	(0..n[2]).flat_map(move |k| {
		(0..n[1]).flat_map(move |j| (0..n[0]).map(move |i| [i, j, k]))
	})
}

fn flat(n: [usize; 3], ijk: [usize; 3]) -> usize {
	(ijk[2] * n[1] + ijk[1]) * n[0] + ijk[0]
}

/// Tensor-product spline surface or volume.
///
/// Coefficients are stored with the first parametric direction running
/// fastest. Rational patches keep homogeneous coefficients (weighted
/// coordinates followed by the weight).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplinePatch {
	pub bases: Vec<Basis>,
	pub dim: usize,
	pub rational: bool,
	pub coefs: Vec<f64>,
}

impl SplinePatch {
	pub fn new(bases: Vec<Basis>, dim: usize, rational: bool, coefs: Vec<f64>) -> Result<Self> {
		if bases.len() != 2 && bases.len() != 3 {
			return Err(Error::invalid(format!("{} parametric directions", bases.len())))
		}
		if dim == 0 || dim > 3 {
			return Err(Error::invalid(format!("spatial dimension {}", dim)))
		}
		let stride = dim + rational as usize;
		let expected = bases.iter().map(Basis::num_coefs).product::<usize>() * stride;
		if coefs.len() != expected {
			return Err(Error::invalid(format!(
				"expected {} coefficient values, got {}", expected, coefs.len(),
			)))
		}
		if let Some(b) = bases.iter().find(|b| b.num_coefs() < 2) {
			return Err(Error::invalid(format!(
				"{} control points along a direction", b.num_coefs(),
			)))
		}
		Ok(Self { bases, dim, rational, coefs })
	}

	/// Axis-aligned box with an evenly spaced control lattice
	pub fn cuboid(min: P3, max: P3, order: [usize; 3], n: [usize; 3]) -> Result<Self> {
		let bases = (0..3)
			.map(|d| Basis::uniform(order[d], n[d]))
			.collect::<Result<Vec<_>>>()?;
		let mut coefs = Vec::with_capacity(n.iter().product::<usize>() * 3);
		for ijk in grid(n) {
			for d in 0..3 {
				let s = ijk[d] as f64 / (n[d] - 1).max(1) as f64;
				coefs.push(min[d] + s * (max[d] - min[d]));
			}
		}
		Self::new(bases, 3, false, coefs)
	}

	/// Planar rectangle in the xy-plane, stored with two spatial coordinates
	pub fn rectangle(min: [f64; 2], max: [f64; 2], order: [usize; 2], n: [usize; 2]) -> Result<Self> {
		let bases = (0..2)
			.map(|d| Basis::uniform(order[d], n[d]))
			.collect::<Result<Vec<_>>>()?;
		let mut coefs = Vec::with_capacity(n[0] * n[1] * 2);
		for ijk in grid([n[0], n[1], 1]) {
			for d in 0..2 {
				let s = ijk[d] as f64 / (n[d] - 1).max(1) as f64;
				coefs.push(min[d] + s * (max[d] - min[d]));
			}
		}
		Self::new(bases, 2, false, coefs)
	}

	pub fn param_dim(&self) -> usize {
		self.bases.len()
	}

	pub fn is_volume(&self) -> bool {
		self.bases.len() == 3
	}

	fn stride(&self) -> usize {
		self.dim + self.rational as usize
	}

	/// Control points per direction, padded with 1 for surfaces
	pub fn dims(&self) -> [usize; 3] {
		let mut n = [1; 3];
		for (d, b) in self.bases.iter().enumerate() {
			n[d] = b.num_coefs();
		}
		n
	}

	pub fn num_coefs(&self, dir: usize) -> Result<usize> {
		Ok(self.basis(dir)?.num_coefs())
	}

	fn basis(&self, dir: usize) -> Result<&Basis> {
		self.bases.get(dir)
			.ok_or_else(|| Error::invalid(format!("parametric direction {}", dir)))
	}

	/// Projected control point, missing coordinates are zero
	pub fn control_point(&self, i: usize, j: usize, k: usize) -> P3 {
		let stride = self.stride();
		let at = flat(self.dims(), [i, j, k]) * stride;
		let c = &self.coefs[at..at + stride];
		let w = if self.rational { c[self.dim] } else { 1.0 };
		let mut p = P3::origin();
		for d in 0..self.dim {
			p[d] = c[d] / w;
		}
		p
	}

	fn rebuild(&mut self, n: [usize; 3], f: impl Fn([usize; 3], &mut [f64])) {
		let stride = self.stride();
		let mut coefs = vec![0.0; n.iter().product::<usize>() * stride];
		for ijk in grid(n) {
			let at = flat(n, ijk) * stride;
			f(ijk, &mut coefs[at..at + stride]);
		}
		self.coefs = coefs;
	}

	fn coef(&self, n: [usize; 3], ijk: [usize; 3]) -> &[f64] {
		let stride = self.stride();
		let at = flat(n, ijk) * stride;
		&self.coefs[at..at + stride]
	}

	pub fn reverse_direction(&mut self, dir: usize) -> Result<()> {
		self.basis(dir)?;
		let n = self.dims();
		let old = self.clone();
		self.rebuild(n, |mut ijk, dst| {
			ijk[dir] = n[dir] - 1 - ijk[dir];
			dst.copy_from_slice(old.coef(n, ijk));
		});
		self.bases[dir].reverse();
		Ok(())
	}

	pub fn swap_directions(&mut self, a: usize, b: usize) -> Result<()> {
		self.basis(a)?;
		self.basis(b)?;
		if a == b {
			return Ok(())
		}
		let old_n = self.dims();
		let mut n = old_n;
		n.swap(a, b);
		let old = self.clone();
		self.rebuild(n, |mut ijk, dst| {
			ijk.swap(a, b);
			dst.copy_from_slice(old.coef(old_n, ijk));
		});
		self.bases.swap(a, b);
		Ok(())
	}

	/// Boehm knot insertion along every parametric line in `dir`
	pub fn insert_knot(&mut self, dir: usize, t: f64) -> Result<()> {
		let basis = self.basis(dir)?.clone();
		if !(t > basis.start() && t < basis.end()) {
			return Err(Error::invalid(format!(
				"knot {} outside ({}, {})", t, basis.start(), basis.end(),
			)))
		}
		let p = basis.order - 1;
		let u = &basis.knots;
		let span = (p..basis.num_coefs()).rev().find(|&k| u[k] <= t).unwrap_or(p);
		let first = span + 1 - p;
		let alphas: Vec<f64> = (first..=span)
			.map(|i| (t - u[i]) / (u[i + p] - u[i]))
			.collect();

		let old_n = self.dims();
		let mut n = old_n;
		n[dir] += 1;
		let old = self.clone();
		self.rebuild(n, |ijk, dst| {
			let i = ijk[dir];
			let at = |i: usize| {
				let mut src = ijk;
				src[dir] = i;
				old.coef(old_n, src)
			};
			if i < first {
				dst.copy_from_slice(at(i));
			} else if i > span {
				dst.copy_from_slice(at(i - 1));
			} else {
				let a = alphas[i - first];
				for ((d, x), y) in dst.iter_mut().zip(at(i)).zip(at(i - 1)) {
					*d = a * x + (1.0 - a) * y;
				}
			}
		});
		self.bases[dir].knots.insert(span + 1, t);
		Ok(())
	}

	/// Split every non-empty knot span in half, in all directions
	pub fn uniform_h_refine(&mut self) -> Result<()> {
		for dir in 0..self.param_dim() {
			let mids: Vec<f64> = self.bases[dir].spans()
				.into_iter()
				.map(|(a, b)| 0.5 * (a + b))
				.collect();
			for t in mids {
				self.insert_knot(dir, t)?;
			}
		}
		Ok(())
	}

	/// Insert `n` knots into the first (or last) span of `dir`, each element
	/// `scale` times larger than its neighbour towards the boundary
	pub fn boundary_layer_refine(&mut self, dir: usize, at_start: bool, scale: f64, n: usize) -> Result<()> {
		if !(scale > 0.0) || n == 0 {
			return Err(Error::invalid(format!("boundary layer scale {} with {} knots", scale, n)))
		}
		let spans = self.basis(dir)?.spans();
		let span = if at_start { spans.first() } else { spans.last() };
		let (a, b) = *span.ok_or_else(|| Error::invalid("empty parameter domain"))?;
		let total: f64 = (0..=n).map(|m| scale.powi(m as i32)).sum();
		let h = (b - a) / total;
		let mut acc = 0.0;
		let mut knots = Vec::with_capacity(n);
		for m in 0..n {
			acc += h * scale.powi(m as i32);
			knots.push(if at_start { a + acc } else { b - acc });
		}
		for t in knots {
			self.insert_knot(dir, t)?;
		}
		Ok(())
	}

	/// Sum of the forward-difference Jacobians of the control net. Positive
	/// for right-handed volumes (or counter-clockwise planar surfaces).
	pub fn handedness(&self) -> f64 {
		let n = self.dims();
		let p = |i, j, k| self.control_point(i, j, k);
		let mut sum = 0.0;
		if self.is_volume() {
			for [i, j, k] in grid([n[0] - 1, n[1] - 1, n[2] - 1]) {
				let o = p(i, j, k);
				let du: V3 = p(i + 1, j, k) - o;
				let dv: V3 = p(i, j + 1, k) - o;
				let dw: V3 = p(i, j, k + 1) - o;
				sum += du.cross(&dv).dot(&dw);
			}
		} else {
			for [i, j, _] in grid([n[0] - 1, n[1] - 1, 1]) {
				let o = p(i, j, 0);
				sum += (p(i + 1, j, 0) - o).cross(&(p(i, j + 1, 0) - o)).z;
			}
		}
		sum
	}

	pub fn is_right_handed(&self) -> bool {
		self.handedness() > 0.0
	}
}
