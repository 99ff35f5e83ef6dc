//! Configuration accepted by backdrop modules.
//!
//! Raw configuration is deserialized leniently (every field has a default)
//! and then sanitized into validated settings. Out-of-range values never fail
//! a mount: each one is replaced by its default and reported once.

use log::warn;
use serde::Deserialize;

use super::error::BackdropError;
use super::theme::{Color, palette};

/// Default number of particles in a field.
pub const DEFAULT_PARTICLE_COUNT: usize = 200;
/// Upper bound on particles per field; the proximity rebuild is O(n²).
pub const MAX_PARTICLE_COUNT: usize = 2000;
/// Default distance under which two particles are connected.
pub const DEFAULT_CONNECTION_THRESHOLD: f32 = 15.0;
/// Default number of frames between proximity rebuilds.
pub const DEFAULT_REBUILD_INTERVAL: u32 = 10;
/// Default half-extent of the particle volume.
pub const DEFAULT_BOUND: f32 = 100.0;
/// Largest accepted half-extent; keeps `2 * bound` and wrapping finite.
pub const MAX_BOUND: f32 = 10_000.0;
/// Largest accepted connection distance.
pub const MAX_CONNECTION_THRESHOLD: f32 = 2.0 * MAX_BOUND;
/// Default full range of per-axis particle velocity (units per frame).
pub const DEFAULT_MAX_SPEED: f32 = 0.02;
/// Largest accepted velocity range.
pub const MAX_SPEED_LIMIT: f32 = 10.0;
/// Default amplitude of the oscillating drift term.
pub const DEFAULT_DRIFT_AMPLITUDE: f32 = 0.005;
/// Largest accepted drift amplitude.
pub const MAX_DRIFT_AMPLITUDE: f32 = 0.03;
/// Default particle point size before depth attenuation.
pub const DEFAULT_POINT_SIZE: f32 = 3.0;
/// Default animation time advanced per tick.
pub const DEFAULT_TIME_STEP: f32 = 0.01;

/// Raw particle-field configuration, as supplied by the host page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
	/// Number of particles. Non-positive values fall back to the default.
	pub particle_count: i64,
	/// CSS color of particles and connection lines (e.g. `"#3b82f6"`).
	pub color: String,
	/// Optional second color; particles alternate between the two.
	pub secondary_color: Option<String>,
	/// Particles closer than this are connected by a line.
	pub connection_threshold: f32,
	/// Frames between proximity rebuilds. `0` rebuilds once at mount only.
	pub rebuild_interval_frames: u32,
	/// Half-extent of the cube particles wrap around in.
	pub bound: f32,
	/// Full per-axis velocity range; components are drawn from `±max_speed/2`.
	pub max_speed: f32,
	/// Amplitude of the time-varying drift added each tick.
	pub drift_amplitude: f32,
	/// Point size before depth attenuation.
	pub point_size: f32,
	/// Animation time advanced per tick; drives drift and pulse.
	pub time_step: f32,
	/// Seed for particle placement. Random per mount when unset.
	pub seed: Option<u64>,
}

impl Default for FieldConfig {
	fn default() -> Self {
		Self {
			particle_count: DEFAULT_PARTICLE_COUNT as i64,
			color: palette::BLUE.to_css(),
			secondary_color: None,
			connection_threshold: DEFAULT_CONNECTION_THRESHOLD,
			rebuild_interval_frames: DEFAULT_REBUILD_INTERVAL,
			bound: DEFAULT_BOUND,
			max_speed: DEFAULT_MAX_SPEED,
			drift_amplitude: DEFAULT_DRIFT_AMPLITUDE,
			point_size: DEFAULT_POINT_SIZE,
			time_step: DEFAULT_TIME_STEP,
			seed: None,
		}
	}
}

/// Validated particle-field settings.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSettings {
	pub particle_count: usize,
	pub color: Color,
	pub secondary_color: Option<Color>,
	pub connection_threshold: f32,
	pub rebuild_interval_frames: u32,
	pub bound: f32,
	pub max_speed: f32,
	pub drift_amplitude: f32,
	pub point_size: f32,
	pub time_step: f32,
	pub seed: Option<u64>,
}

impl Default for FieldSettings {
	fn default() -> Self {
		FieldConfig::default().sanitize().0
	}
}

fn positive_or(value: f32, default: f32, name: &str, issues: &mut Vec<BackdropError>) -> f32 {
	if value.is_finite() && value > 0.0 {
		value
	} else {
		issues.push(BackdropError::Configuration(format!(
			"{} must be positive and finite, got {}; using {}",
			name, value, default
		)));
		default
	}
}

/// Like [`positive_or`], additionally capping the value at `max`.
fn capped_positive_or(
	value: f32,
	default: f32,
	max: f32,
	name: &str,
	issues: &mut Vec<BackdropError>,
) -> f32 {
	let value = positive_or(value, default, name, issues);
	if value > max {
		issues.push(BackdropError::Configuration(format!(
			"{} {} exceeds {}; capping",
			name, value, max
		)));
		return max;
	}
	value
}

impl FieldConfig {
	/// Validates every field, replacing bad values by their defaults.
	///
	/// Never fails; each replacement is returned as a
	/// [`BackdropError::Configuration`] so the caller can report it.
	pub fn sanitize(&self) -> (FieldSettings, Vec<BackdropError>) {
		let mut issues = Vec::new();

		let particle_count = if self.particle_count <= 0 {
			issues.push(BackdropError::Configuration(format!(
				"particle_count must be positive, got {}; using {}",
				self.particle_count, DEFAULT_PARTICLE_COUNT
			)));
			DEFAULT_PARTICLE_COUNT
		} else if self.particle_count > MAX_PARTICLE_COUNT as i64 {
			issues.push(BackdropError::Configuration(format!(
				"particle_count {} exceeds {}; capping",
				self.particle_count, MAX_PARTICLE_COUNT
			)));
			MAX_PARTICLE_COUNT
		} else {
			self.particle_count as usize
		};

		let color = Color::parse(&self.color).unwrap_or_else(|| {
			issues.push(BackdropError::Configuration(format!(
				"unrecognized color {:?}; using {}",
				self.color,
				palette::BLUE.to_css()
			)));
			palette::BLUE
		});

		let secondary_color = self.secondary_color.as_deref().and_then(|s| {
			let parsed = Color::parse(s);
			if parsed.is_none() {
				issues.push(BackdropError::Configuration(format!(
					"unrecognized secondary color {:?}; ignoring",
					s
				)));
			}
			parsed
		});

		let connection_threshold = capped_positive_or(
			self.connection_threshold,
			DEFAULT_CONNECTION_THRESHOLD,
			MAX_CONNECTION_THRESHOLD,
			"connection_threshold",
			&mut issues,
		);
		let bound = capped_positive_or(self.bound, DEFAULT_BOUND, MAX_BOUND, "bound", &mut issues);
		let point_size = positive_or(self.point_size, DEFAULT_POINT_SIZE, "point_size", &mut issues);
		let time_step = positive_or(self.time_step, DEFAULT_TIME_STEP, "time_step", &mut issues);

		let max_speed = if self.max_speed.is_finite() && self.max_speed >= 0.0 {
			if self.max_speed > MAX_SPEED_LIMIT {
				issues.push(BackdropError::Configuration(format!(
					"max_speed {} exceeds {}; capping",
					self.max_speed, MAX_SPEED_LIMIT
				)));
			}
			self.max_speed.min(MAX_SPEED_LIMIT)
		} else {
			issues.push(BackdropError::Configuration(format!(
				"max_speed must be non-negative, got {}; using {}",
				self.max_speed, DEFAULT_MAX_SPEED
			)));
			DEFAULT_MAX_SPEED
		};

		let drift_amplitude = if self.drift_amplitude.is_finite()
			&& (0.0..=MAX_DRIFT_AMPLITUDE).contains(&self.drift_amplitude)
		{
			self.drift_amplitude
		} else {
			issues.push(BackdropError::Configuration(format!(
				"drift_amplitude must be within 0..={}, got {}; using {}",
				MAX_DRIFT_AMPLITUDE, self.drift_amplitude, DEFAULT_DRIFT_AMPLITUDE
			)));
			DEFAULT_DRIFT_AMPLITUDE
		};

		(
			FieldSettings {
				particle_count,
				color,
				secondary_color,
				connection_threshold,
				rebuild_interval_frames: self.rebuild_interval_frames,
				bound,
				max_speed,
				drift_amplitude,
				point_size,
				time_step,
				seed: self.seed,
			},
			issues,
		)
	}

	/// Sanitizes and logs every replaced value with `warn!`.
	pub fn settings(&self) -> FieldSettings {
		let (settings, issues) = self.sanitize();
		for issue in &issues {
			warn!("backdrop: {}", issue);
		}
		settings
	}
}

/// Fixed arrangements of decorative shapes.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenePreset {
	/// No shapes; particle field only.
	#[default]
	None,
	/// Wireframe polyhedra, a torus, small cubes and a sparse point cloud.
	Polyhedra,
	/// A double helix, a node network and floating data cubes.
	SectionTech,
}

/// Perspective camera parameters.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
	/// Vertical field of view in degrees.
	pub fov_degrees: f32,
	pub near: f32,
	pub far: f32,
	/// Distance of the camera from the origin along +z.
	pub distance: f32,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			fov_degrees: 75.0,
			near: 0.1,
			far: 1000.0,
			distance: 50.0,
		}
	}
}

impl CameraConfig {
	/// Camera framing used by each preset when no camera is configured.
	pub fn for_preset(preset: ScenePreset) -> Self {
		match preset {
			ScenePreset::None => Self::default(),
			ScenePreset::Polyhedra => Self {
				distance: 30.0,
				..Self::default()
			},
			ScenePreset::SectionTech => Self {
				fov_degrees: 60.0,
				near: 1.0,
				far: 1000.0,
				distance: 20.0,
			},
		}
	}
}

/// Everything a single mounted module needs.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModuleConfig {
	/// Connected particle field, if any.
	pub field: Option<FieldConfig>,
	/// Decorative shapes to add around the field.
	pub preset: ScenePreset,
	/// Camera override; defaults depend on `preset`.
	pub camera: Option<CameraConfig>,
	/// Seed for preset shape placement. Random per mount when unset.
	pub seed: Option<u64>,
}

impl ModuleConfig {
	/// A module showing only a connected particle field.
	pub fn particle_field(field: FieldConfig) -> Self {
		Self {
			field: Some(field),
			..Self::default()
		}
	}

	/// A module showing only a shape preset.
	pub fn preset(preset: ScenePreset) -> Self {
		Self {
			preset,
			..Self::default()
		}
	}

	/// The camera to use: the explicit override, else the preset's framing.
	pub fn camera(&self) -> CameraConfig {
		self.camera
			.unwrap_or_else(|| CameraConfig::for_preset(self.preset))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_json_yields_defaults() {
		let config: ModuleConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, ModuleConfig::default());
		assert_eq!(config.camera(), CameraConfig::default());
	}

	#[test]
	fn partial_field_json_keeps_other_defaults() {
		let config: ModuleConfig = serde_json::from_str(
			r##"{ "field": { "particle_count": 150, "color": "#10b981" }, "preset": "section_tech" }"##,
		)
		.unwrap();
		let field = config.field.clone().unwrap();
		assert_eq!(field.particle_count, 150);
		assert_eq!(field.connection_threshold, DEFAULT_CONNECTION_THRESHOLD);
		assert_eq!(config.preset, ScenePreset::SectionTech);
		assert_eq!(config.camera().distance, 20.0);

		let (settings, issues) = field.sanitize();
		assert!(issues.is_empty());
		assert_eq!(settings.color, palette::GREEN);
	}

	#[test]
	fn non_positive_count_falls_back() {
		for count in [0, -5] {
			let (settings, issues) = FieldConfig {
				particle_count: count,
				..FieldConfig::default()
			}
			.sanitize();
			assert_eq!(settings.particle_count, DEFAULT_PARTICLE_COUNT);
			assert_eq!(issues.len(), 1);
		}
	}

	#[test]
	fn oversized_count_is_capped() {
		let (settings, _) = FieldConfig {
			particle_count: 1_000_000,
			..FieldConfig::default()
		}
		.sanitize();
		assert_eq!(settings.particle_count, MAX_PARTICLE_COUNT);
	}

	#[test]
	fn invalid_values_fall_back_individually() {
		let (settings, issues) = FieldConfig {
			color: "not-a-color".into(),
			connection_threshold: f32::NAN,
			bound: -1.0,
			drift_amplitude: 0.5,
			..FieldConfig::default()
		}
		.sanitize();
		assert_eq!(settings.color, palette::BLUE);
		assert_eq!(settings.connection_threshold, DEFAULT_CONNECTION_THRESHOLD);
		assert_eq!(settings.bound, DEFAULT_BOUND);
		assert_eq!(settings.drift_amplitude, DEFAULT_DRIFT_AMPLITUDE);
		assert_eq!(settings.particle_count, DEFAULT_PARTICLE_COUNT);
		assert_eq!(issues.len(), 4);
	}

	#[test]
	fn huge_extents_are_capped() {
		let (settings, issues) = FieldConfig {
			bound: 3.0e38,
			connection_threshold: f32::MAX,
			max_speed: 1.0e30,
			..FieldConfig::default()
		}
		.sanitize();
		assert_eq!(settings.bound, MAX_BOUND);
		assert_eq!(settings.connection_threshold, MAX_CONNECTION_THRESHOLD);
		assert_eq!(settings.max_speed, MAX_SPEED_LIMIT);
		assert_eq!(issues.len(), 3);
		assert!((2.0 * settings.bound).is_finite());
	}
}
