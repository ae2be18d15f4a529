//! Visual theming for the canvas force graph.
//!
//! Node and link colors come from the mapped data; a theme only sets the
//! surroundings: background, borders, labels, hover rings and the alpha
//! applied to link colors.

use log::warn;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses `#RGB`, `#RRGGBB` and `rgb()`/`rgba()` notation. Anything else,
	/// including named colors, yields `None`.
	pub fn parse(text: &str) -> Option<Self> {
		let text = text.trim();
		if let Some(hex) = text.strip_prefix('#') {
			if !hex.is_ascii() {
				return None;
			}
			let channel = |s: &str| u8::from_str_radix(s, 16).ok();
			return match hex.len() {
				6 => Some(Self::rgb(
					channel(&hex[0..2])?,
					channel(&hex[2..4])?,
					channel(&hex[4..6])?,
				)),
				3 => {
					let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
					Some(Self::rgb(short(0)?, short(1)?, short(2)?))
				}
				_ => None,
			};
		}
		let inner = text
			.strip_prefix("rgba(")
			.or_else(|| text.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
		let number = |i: usize| parts.get(i).and_then(|s| s.parse::<f64>().ok());
		let channel = |i: usize| number(i).map(|v| v.clamp(0.0, 255.0) as u8);
		let alpha = number(3).unwrap_or(1.0);
		Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, alpha.clamp(0.0, 1.0)))
	}
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Opacity applied to each link's own color.
	pub alpha: f64,
	/// Opacity of links not touching the hovered node.
	pub dimmed_alpha: f64,
	/// Used when a link color cannot be parsed.
	pub fallback: Color,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Border/stroke width in screen pixels (0 = no border)
	pub border_width: f64,
	pub border_color: Color,
	/// Used when a node color cannot be parsed.
	pub fallback: Color,
	/// Opacity of nodes outside the hovered neighborhood.
	pub dimmed_alpha: f64,
	/// Hover ring color.
	pub ring_color: Color,
}

/// Label text style.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	pub color: Color,
	/// Halo drawn behind the text so labels stay legible over links.
	pub halo: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: Color,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub label: LabelStyle,
}

impl Theme {
	/// White canvas matching the wizard pages (default).
	pub fn light() -> Self {
		Self {
			name: "light",
			background: Color::rgb(255, 255, 255),
			edge: EdgeStyle {
				alpha: 0.7,
				dimmed_alpha: 0.15,
				fallback: Color::rgb(107, 114, 128),
			},
			node: NodeStyle {
				border_width: 1.5,
				border_color: Color::rgb(255, 255, 255),
				fallback: Color::rgb(59, 130, 246),
				dimmed_alpha: 0.3,
				ring_color: Color::rgb(30, 41, 59),
			},
			label: LabelStyle {
				color: Color::rgb(31, 41, 55),
				halo: Color::rgba(255, 255, 255, 0.8),
			},
		}
	}

	/// Dark slate canvas.
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: Color::rgb(22, 27, 34),
			edge: EdgeStyle {
				alpha: 0.6,
				dimmed_alpha: 0.1,
				fallback: Color::rgb(140, 160, 180),
			},
			node: NodeStyle {
				border_width: 0.0,
				border_color: Color::rgba(255, 255, 255, 0.0),
				fallback: Color::rgb(94, 129, 172),
				dimmed_alpha: 0.3,
				ring_color: Color::rgb(255, 255, 255),
			},
			label: LabelStyle {
				color: Color::rgba(255, 255, 255, 0.9),
				halo: Color::rgba(22, 27, 34, 0.7),
			},
		}
	}

	/// Theme registered under `name`; unknown names fall back to light.
	pub fn by_name(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"light" | "" => Self::light(),
			"dark" => Self::dark(),
			other => {
				warn!("toile: unknown canvas theme {other:?}, using light");
				Self::light()
			}
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::light()
	}
}
