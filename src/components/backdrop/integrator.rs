//! Per-tick state update for particles and shapes.
//!
//! Particles drift by their velocity plus a small bounded sinusoid of time
//! and index, and re-enter from the opposite face when they cross the
//! bounding cube. Shapes spin and bob. Nothing here allocates.

use super::geometry::Shape;
use super::store::ParticleField;

/// Phase offset between consecutive particles in the drift sinusoid.
const DRIFT_PHASE_STEP: f32 = 0.1;

/// Wraps `v` into `[-bound, bound]` toroidally, keeping the overshoot.
///
/// Values already inside the range (including exactly `±bound`) are
/// returned unchanged; anything beyond re-enters from the opposite side.
#[inline]
pub fn wrap(v: f32, bound: f32) -> f32 {
	if (-bound..=bound).contains(&v) {
		return v;
	}
	let span = 2.0 * bound;
	((v + bound).rem_euclid(span) - bound).clamp(-bound, bound)
}

/// Advances every particle of `field` by one tick at animation time `time`.
pub fn integrate_field(field: &mut ParticleField, time: f32, drift_amplitude: f32) {
	let bound = field.bound;
	let (positions, velocities) = field.store.parts_mut();
	for (i, (p, v)) in positions
		.chunks_exact_mut(3)
		.zip(velocities.chunks_exact(3))
		.enumerate()
	{
		let phase = time + i as f32 * DRIFT_PHASE_STEP;
		p[0] = wrap(p[0] + v[0] + phase.sin() * drift_amplitude, bound);
		p[1] = wrap(p[1] + v[1] + phase.cos() * drift_amplitude, bound);
		p[2] = wrap(p[2] + v[2], bound);
	}
	field.rotation += field.spin;
}

/// Applies one tick of spin and oscillating drift to `shape`.
///
/// `elapsed` is wall-clock seconds since the module started running.
pub fn animate_shape(shape: &mut Shape, elapsed: f32) {
	let motion = shape.motion;
	shape.transform.rotation += motion.spin;
	if let Some(bob) = motion.bob {
		shape.transform.position.y += bob.sample(elapsed);
	}
	if let Some(sway) = motion.sway {
		shape.transform.position.x += sway.sample(elapsed);
	}
}

#[cfg(test)]
mod tests {
	use glam::Vec3;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::backdrop::geometry::{
		Motion, Oscillation, ShapeKind, ShapeParams, build_field, build_shape,
	};
	use crate::components::backdrop::store::{ColorPolicy, Particle, ParticleStore};
	use crate::components::backdrop::theme::palette;
	use crate::components::backdrop::types::{FieldConfig, FieldSettings};

	fn single(position: Vec3, velocity: Vec3, bound: f32) -> ParticleField {
		let settings = FieldSettings {
			particle_count: 0,
			bound,
			..FieldSettings::default()
		};
		let mut field = build_field(
			&settings,
			ColorPolicy::Uniform(palette::BLUE),
			&mut SmallRng::seed_from_u64(1),
		);
		field.store = ParticleStore::from_particles([Particle { position, velocity }]);
		field
	}

	#[test]
	fn wrap_leaves_in_range_values() {
		assert_eq!(wrap(0.0, 100.0), 0.0);
		assert_eq!(wrap(100.0, 100.0), 100.0);
		assert_eq!(wrap(-100.0, 100.0), -100.0);
	}

	#[test]
	fn wrap_reenters_from_opposite_side() {
		assert!((wrap(100.5, 100.0) - -99.5).abs() < 1e-4);
		assert!((wrap(-100.5, 100.0) - 99.5).abs() < 1e-4);
		// Far overshoots still land inside.
		let far = wrap(1234.5, 100.0);
		assert!((-100.0..=100.0).contains(&far));
	}

	#[test]
	fn crossing_positive_bound_wraps_to_negative_side() {
		let mut field = single(Vec3::new(99.99, 0.0, 0.0), Vec3::new(0.02, 0.0, 0.0), 100.0);
		integrate_field(&mut field, 0.01, 0.005);
		let x = field.store.get(0).unwrap().position.x;
		assert!(x >= -100.0, "x = {}", x);
		assert!(x <= -100.0 + 0.05, "x = {}", x);
	}

	#[test]
	fn positions_stay_in_bounds_over_many_ticks() {
		let settings = FieldSettings {
			particle_count: 64,
			bound: 5.0,
			max_speed: 0.8,
			drift_amplitude: 0.03,
			..FieldSettings::default()
		};
		let mut field = build_field(
			&settings,
			ColorPolicy::Uniform(palette::BLUE),
			&mut SmallRng::seed_from_u64(3),
		);
		let mut time = 0.0;
		for _ in 0..5_000 {
			time += settings.time_step;
			integrate_field(&mut field, time, settings.drift_amplitude);
			assert!(field.store.positions().iter().all(|c| c.abs() <= 5.0));
		}
		assert_eq!(field.len(), 64);
	}

	#[test]
	fn oversized_config_extent_stays_finite() {
		let settings = FieldConfig {
			particle_count: 150,
			bound: 3.0e38,
			..FieldConfig::default()
		}
		.settings();
		let mut field = build_field(
			&settings,
			ColorPolicy::Uniform(palette::BLUE),
			&mut SmallRng::seed_from_u64(9),
		);
		integrate_field(&mut field, settings.time_step, settings.drift_amplitude);
		let bound = field.bound;
		assert!(
			field
				.store
				.positions()
				.iter()
				.all(|c| c.is_finite() && c.abs() <= bound)
		);
	}

	#[test]
	fn z_axis_has_no_drift_term() {
		let mut field = single(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.01), 100.0);
		integrate_field(&mut field, 1.0, 0.03);
		let p = field.store.get(0).unwrap().position;
		assert!((p.z - 0.01).abs() < 1e-7);
		assert!((p.x - 1.0_f32.sin() * 0.03).abs() < 1e-6);
		assert!((p.y - 1.0_f32.cos() * 0.03).abs() < 1e-6);
	}

	#[test]
	fn field_rotation_accumulates_spin() {
		let mut field = single(Vec3::ZERO, Vec3::ZERO, 100.0);
		for _ in 0..10 {
			integrate_field(&mut field, 0.0, 0.0);
		}
		assert!((field.rotation - field.spin * 10.0).length() < 1e-6);
	}

	#[test]
	fn shape_spins_and_bobs() {
		let motion = Motion {
			spin: Vec3::new(0.01, -0.02, 0.0),
			bob: Some(Oscillation {
				amplitude: 0.5,
				frequency: 1.0,
				phase: 0.0,
			}),
			sway: None,
		};
		let mut shape = build_shape(
			ShapeKind::Box { size: 1.0 },
			ShapeParams::wireframe(palette::AMBER, 0.4, Vec3::ZERO).with_motion(motion),
			&mut SmallRng::seed_from_u64(0),
		);
		let geometry = shape.geometry.clone();
		animate_shape(&mut shape, std::f32::consts::FRAC_PI_2);
		assert_eq!(shape.transform.rotation, Vec3::new(0.01, -0.02, 0.0));
		assert!((shape.transform.position.y - 0.5).abs() < 1e-6);
		assert_eq!(shape.transform.position.x, 0.0);
		assert_eq!(shape.geometry, geometry);
	}
}
