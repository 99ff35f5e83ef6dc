//! Colors and visual style for backdrop modules.
//!
//! Provides the RGB color type shared by particles, shapes and connection
//! lines, the accent palette the presets draw from, and the style constants
//! the renderer applies (opacities, point sizes, blending).

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

	/// Builds an opaque color from a packed `0xRRGGBB` value.
	pub const fn hex(value: u32) -> Self {
		Self::rgb(
			((value >> 16) & 0xff) as u8,
			((value >> 8) & 0xff) as u8,
			(value & 0xff) as u8,
		)
	}

	/// Normalized `[r, g, b]` channels, as uploaded to vertex attributes.
	pub fn to_rgb_f32(self) -> [f32; 3] {
		[
			self.r as f32 / 255.0,
			self.g as f32 / 255.0,
			self.b as f32 / 255.0,
		]
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`, `#RGB`, `0xRRGGBB`) and `rgb()`/`rgba()`
	/// functional notation. Returns `None` for anything else so callers can
	/// fall back to a default.
	pub fn parse(color_str: &str) -> Option<Color> {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#').or_else(|| s.strip_prefix("0x")) {
			return match hex.len() {
				6 => u32::from_str_radix(hex, 16).ok().map(Color::hex),
				3 => {
					let v = u32::from_str_radix(hex, 16).ok()?;
					let (r, g, b) = ((v >> 8) & 0xf, (v >> 4) & 0xf, v & 0xf);
					Some(Color::rgb((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
				}
				_ => None,
			};
		}
		if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			if nums.len() < 3 {
				return None;
			}
			let r = nums[0].trim().parse().ok()?;
			let g = nums[1].trim().parse().ok()?;
			let b = nums[2].trim().parse().ok()?;
			let a = match nums.get(3) {
				Some(a) => a.trim().parse::<f64>().ok()?.clamp(0.0, 1.0),
				None => 1.0,
			};
			return Some(Color::rgba(r, g, b, a));
		}
		None
	}
}

/// Accent colors used by the decorative presets.
pub mod palette {
	use super::Color;

	/// Primary blue, the default particle color.
	pub const BLUE: Color = Color::hex(0x3b82f6);
	/// Emerald accent.
	pub const GREEN: Color = Color::hex(0x10b981);
	/// Violet accent.
	pub const VIOLET: Color = Color::hex(0x8b5cf6);
	/// Amber accent.
	pub const AMBER: Color = Color::hex(0xf59e0b);
}

/// How fragments are combined with what is already on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
	/// `src * alpha + dst`, used for glowing points.
	Additive,
	/// `src * alpha + dst * (1 - alpha)`.
	Alpha,
}

/// Style constants applied by the render session.
#[derive(Clone, Debug)]
pub struct BackdropStyle {
	/// Opacity multiplier applied to glowing particles.
	pub particle_opacity: f32,
	/// Opacity of connection lines between nearby particles.
	pub connection_opacity: f32,
	/// Point size (before depth attenuation) of graph nodes in shapes.
	pub node_point_size: f32,
	/// Point size (before depth attenuation) of loose point clouds.
	pub cloud_point_size: f32,
	/// Surface clear color. Fully transparent so the page shows through.
	pub clear: Color,
}

impl Default for BackdropStyle {
	fn default() -> Self {
		Self {
			particle_opacity: 0.8,
			connection_opacity: 0.1,
			node_point_size: 1.2,
			cloud_point_size: 0.6,
			clear: Color::rgba(0, 0, 0, 0.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_forms() {
		assert_eq!(Color::parse("#3b82f6"), Some(palette::BLUE));
		assert_eq!(Color::parse("0x10b981"), Some(palette::GREEN));
		assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
	}

	#[test]
	fn parses_functional_notation() {
		assert_eq!(
			Color::parse("rgba(10, 20, 30, 0.5)"),
			Some(Color::rgba(10, 20, 30, 0.5))
		);
		assert_eq!(Color::parse("rgb(1,2,3)"), Some(Color::rgb(1, 2, 3)));
	}

	#[test]
	fn rejects_garbage() {
		assert_eq!(Color::parse("blue-ish"), None);
		assert_eq!(Color::parse("#12345"), None);
		assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
		assert_eq!(Color::parse("rgb(1, 2)"), None);
	}

	#[test]
	fn normalizes_channels() {
		let [r, g, b] = Color::rgb(255, 0, 51).to_rgb_f32();
		assert_eq!((r, g), (1.0, 0.0));
		assert!((b - 0.2).abs() < 1e-6);
	}
}
