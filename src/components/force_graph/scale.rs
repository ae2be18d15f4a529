//! Zoom-dependent scaling for canvas visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the simulation. Values in
//!   world-space grow on screen when zooming in.
//! - **Screen-space**: canvas pixels. Values in screen-space stay the same
//!   size at every zoom level.
//!
//! Every value in [`ScaledValues`] is in world-space, ready to be used after
//! the view transform has been applied to the context.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	Constant,
	/// Alpha scales linearly with zoom, clamped to [0, 1].
	ScaleWithZoom,
	/// Fully visible at `full_alpha_k`, zero at `zero_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::ScaleWithZoom => k.clamp(0.0, 1.0),
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Radius in world units of a node whose mapped size equals `reference_size`.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Mapped size that draws at `radius`.
	pub reference_size: f64,
	/// Bounds on `size / reference_size`.
	pub size_factor: (f64, f64),
	pub hit_radius: f64,
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	pub label_min_k: f64,
	/// Labels of non-highlighted nodes fade out when zoomed far out.
	pub label_alpha_behavior: AlphaBehavior,
}

#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Line width in screen pixels for weight 1.
	pub line_width: f64,
	/// Bounds on the `sqrt(weight)` width multiplier.
	pub weight_factor: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct ArrowScaleConfig {
	pub size: f64,
	pub size_behavior: ScaleBehavior,
	pub alpha_behavior: AlphaBehavior,
	/// Minimum alpha to bother drawing.
	pub cull_alpha: f64,
}

/// Hover ring around the node under the pointer, in screen pixels.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	pub width: f64,
	pub offset: f64,
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub arrow: ArrowScaleConfig,
	pub ring: RingScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 6.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 3.0,
					max_screen: f64::INFINITY,
				},
				reference_size: 10.0,
				size_factor: (0.4, 4.0),
				hit_radius: 8.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 5.0,
					max_screen: f64::INFINITY,
				},
				label_size: 11.0,
				label_min_k: 0.5,
				label_alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.35,
					full_alpha_k: 0.7,
				},
			},
			edge: EdgeScaleConfig {
				line_width: 1.5,
				weight_factor: (0.5, 4.0),
			},
			arrow: ArrowScaleConfig {
				size: 5.0,
				size_behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 18.0,
				},
				alpha_behavior: AlphaBehavior::ScaleWithZoom,
				cull_alpha: 0.05,
			},
			ring: RingScaleConfig {
				width: 1.5,
				offset: 2.0,
			},
		}
	}
}

impl ScaleConfig {
	/// Radius multiplier for a node's mapped size.
	pub fn size_factor(&self, size: f64) -> f64 {
		let (min, max) = self.node.size_factor;
		if !size.is_finite() || self.node.reference_size <= 0.0 {
			return 1.0;
		}
		(size / self.node.reference_size).clamp(min, max)
	}

	/// Line width multiplier for a link's mapped weight.
	pub fn weight_factor(&self, weight: f64) -> f64 {
		let (min, max) = self.edge.weight_factor;
		if !weight.is_finite() {
			return 1.0;
		}
		weight.max(0.0).sqrt().clamp(min, max)
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub node_radius: f64,
	pub hit_radius: f64,
	/// Label font, e.g. `"11px sans-serif"`.
	pub label_font: String,
	pub label_alpha: f64,
	pub edge_line_width: f64,
	pub arrow_size: f64,
	pub arrow_alpha: f64,
	pub cull_arrows: bool,
	pub ring_width: f64,
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		let arrow_alpha = config.arrow.alpha_behavior.apply(k);

		Self {
			k,
			node_radius: config.node.radius_behavior.apply(config.node.radius, k),
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!("{label_font_size}px sans-serif"),
			label_alpha: config.node.label_alpha_behavior.apply(k),
			edge_line_width: config.edge.line_width / k,
			arrow_size: config.arrow.size_behavior.apply(config.arrow.size, k),
			arrow_alpha,
			cull_arrows: arrow_alpha < config.arrow.cull_alpha,
			ring_width: config.ring.width / k,
			ring_offset: config.ring.offset / k,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_values_respect_screen_bounds() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 5.0,
			max_screen: 20.0,
		};
		assert_eq!(behavior.apply(6.0, 1.0), 6.0);
		// 6 world units at k=0.5 would be 3px on screen.
		assert_eq!(behavior.apply(6.0, 0.5), 10.0);
		assert_eq!(behavior.apply(6.0, 10.0), 2.0);
		assert_eq!(ScaleBehavior::Screen.apply(4.0, 2.0), 2.0);
	}

	#[test]
	fn fade_interpolates_between_thresholds() {
		let fade = AlphaBehavior::Fade {
			zero_alpha_k: 0.4,
			full_alpha_k: 0.8,
		};
		assert_eq!(fade.apply(0.2), 0.0);
		assert!((fade.apply(0.6) - 0.5).abs() < 1e-9);
		assert_eq!(fade.apply(2.0), 1.0);
	}

	#[test]
	fn mapped_size_and_weight_are_bounded() {
		let config = ScaleConfig::default();
		assert_eq!(config.size_factor(10.0), 1.0);
		assert_eq!(config.size_factor(1000.0), 4.0);
		assert_eq!(config.size_factor(0.0), 0.4);
		assert_eq!(config.size_factor(f64::NAN), 1.0);
		assert_eq!(config.weight_factor(4.0), 2.0);
		assert_eq!(config.weight_factor(-3.0), 0.5);
	}

	#[test]
	fn arrows_are_culled_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert!(ScaledValues::new(&config, 0.01).cull_arrows);
		assert!(!ScaledValues::new(&config, 1.0).cull_arrows);
	}
}
