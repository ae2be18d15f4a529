//! Deterministic initial positions for engines that do not lay out on their own.

/// Hash-style pseudo-random number in `[0, 1)`, stable for a given seed.
pub fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// A point for the `index`-th node inside a `width` x `height` area.
pub fn seeded_point(index: usize, width: f64, height: f64) -> (f64, f64) {
	let seed = index as f64 + 1.0;
	(pseudo_random(seed * 1.1) * width, pseudo_random(seed * 2.3) * height)
}

/// `(column * dx, row * dy)` on a grid `columns` wide.
pub fn grid_point(index: usize, columns: usize, dx: f64, dy: f64) -> (f64, f64) {
	let columns = columns.max(1);
	((index % columns) as f64 * dx, (index / columns) as f64 * dy)
}

/// Box placement that tries to keep `min_distance` between top-left corners.
#[derive(Clone, Debug)]
pub struct Scatter {
	pub width: f64,
	pub height: f64,
	pub item_width: f64,
	pub item_height: f64,
	pub margin: f64,
	pub min_distance: f64,
	pub attempts: usize,
}

impl Scatter {
	/// Positions for `count` boxes. After `attempts` tries without a free spot
	/// the last candidate is used anyway.
	pub fn place(&self, count: usize) -> Vec<(f64, f64)> {
		let span_x = (self.width - self.item_width - 2.0 * self.margin).max(0.0);
		let span_y = (self.height - self.item_height - 2.0 * self.margin).max(0.0);
		let mut placed: Vec<(f64, f64)> = Vec::with_capacity(count);

		for i in 0..count {
			let mut candidate = (self.margin, self.margin);
			for attempt in 0..self.attempts.max(1) {
				let seed = (i * self.attempts.max(1) + attempt) as f64 + 1.0;
				candidate = (
					self.margin + pseudo_random(seed * 1.7) * span_x,
					self.margin + pseudo_random(seed * 3.1) * span_y,
				);
				let crowded = placed.iter().any(|&(x, y)| {
					let (dx, dy) = (candidate.0 - x, candidate.1 - y);
					(dx * dx + dy * dy).sqrt() < self.min_distance
				});
				if !crowded {
					break;
				}
			}
			placed.push(candidate);
		}
		placed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pseudo_random_is_stable_and_bounded() {
		for i in 0..200 {
			let v = pseudo_random(i as f64 * 0.37);
			assert!((0.0..1.0).contains(&v));
			assert_eq!(v, pseudo_random(i as f64 * 0.37));
		}
	}

	#[test]
	fn grid_wraps_rows() {
		assert_eq!(grid_point(0, 5, 150.0, 100.0), (0.0, 0.0));
		assert_eq!(grid_point(4, 5, 150.0, 100.0), (600.0, 0.0));
		assert_eq!(grid_point(7, 5, 150.0, 100.0), (300.0, 100.0));
	}

	#[test]
	fn scatter_stays_inside_margins() {
		let scatter = Scatter {
			width: 800.0,
			height: 600.0,
			item_width: 100.0,
			item_height: 60.0,
			margin: 50.0,
			min_distance: 150.0,
			attempts: 50,
		};
		let points = scatter.place(12);
		assert_eq!(points.len(), 12);
		for &(x, y) in &points {
			assert!((50.0..=650.0).contains(&x));
			assert!((50.0..=490.0).contains(&y));
		}
		assert_eq!(points, scatter.place(12));
	}

	#[test]
	fn seeded_points_fill_the_area() {
		let (x, y) = seeded_point(3, 800.0, 600.0);
		assert!((0.0..800.0).contains(&x));
		assert!((0.0..600.0).contains(&y));
	}
}
