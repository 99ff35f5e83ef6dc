//! Particle state for one field.
//!
//! Positions and velocities live in two flat buffers indexed by
//! `particle * 3 + axis`, which is also the layout uploaded to the GPU.
//! Only the frame integrator mutates them.

use glam::Vec3;

use super::theme::Color;

/// One particle, as seen through [`ParticleStore::get`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
	pub position: Vec3,
	pub velocity: Vec3,
}

/// Fixed-size position and velocity buffers.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
	positions: Vec<f32>,
	velocities: Vec<f32>,
}

impl ParticleStore {
	/// Builds a store from particles; its length never changes afterwards.
	pub fn from_particles(particles: impl IntoIterator<Item = Particle>) -> Self {
		let particles = particles.into_iter();
		let (lower, _) = particles.size_hint();
		let mut store = Self {
			positions: Vec::with_capacity(lower * 3),
			velocities: Vec::with_capacity(lower * 3),
		};
		for p in particles {
			store.positions.extend_from_slice(&p.position.to_array());
			store.velocities.extend_from_slice(&p.velocity.to_array());
		}
		store
	}

	pub fn len(&self) -> usize {
		self.positions.len() / 3
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	pub fn get(&self, i: usize) -> Option<Particle> {
		let at = i.checked_mul(3)?;
		let p = self.positions.get(at..at + 3)?;
		let v = self.velocities.get(at..at + 3)?;
		Some(Particle {
			position: Vec3::from_slice(p),
			velocity: Vec3::from_slice(v),
		})
	}

	/// Overwrites particle `i`. Out-of-range indices are ignored so the
	/// particle count stays fixed.
	pub fn set(&mut self, i: usize, particle: Particle) {
		let at = i * 3;
		if at + 3 > self.positions.len() {
			return;
		}
		particle
			.position
			.write_to_slice(&mut self.positions[at..at + 3]);
		particle
			.velocity
			.write_to_slice(&mut self.velocities[at..at + 3]);
	}

	/// Position of particle `i`; panics when out of range.
	#[inline]
	pub fn position(&self, i: usize) -> Vec3 {
		Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
	}

	pub fn for_each(&self, mut f: impl FnMut(usize, Particle)) {
		for (i, (p, v)) in self
			.positions
			.chunks_exact(3)
			.zip(self.velocities.chunks_exact(3))
			.enumerate()
		{
			f(
				i,
				Particle {
					position: Vec3::from_slice(p),
					velocity: Vec3::from_slice(v),
				},
			);
		}
	}

	/// Flat `[x, y, z, ...]` position buffer.
	pub fn positions(&self) -> &[f32] {
		&self.positions
	}

	/// Flat `[vx, vy, vz, ...]` velocity buffer.
	pub fn velocities(&self) -> &[f32] {
		&self.velocities
	}

	/// Mutable positions alongside read-only velocities, for the integrator.
	pub(crate) fn parts_mut(&mut self) -> (&mut [f32], &[f32]) {
		(&mut self.positions, &self.velocities)
	}
}

/// How particles in a field are colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorPolicy {
	Uniform(Color),
	/// Even particles take the first color, odd ones the second.
	Alternating(Color, Color),
}

impl ColorPolicy {
	/// The color used for connection lines and uniform particles.
	pub fn primary(&self) -> Color {
		match *self {
			ColorPolicy::Uniform(c) | ColorPolicy::Alternating(c, _) => c,
		}
	}

	pub fn color_for(&self, i: usize) -> Color {
		match *self {
			ColorPolicy::Uniform(c) => c,
			ColorPolicy::Alternating(a, b) => {
				if i % 2 == 0 {
					a
				} else {
					b
				}
			}
		}
	}
}

/// A fixed-size set of drifting particles with its connection settings.
#[derive(Clone, Debug)]
pub struct ParticleField {
	pub store: ParticleStore,
	pub colors: ColorPolicy,
	/// Per-particle `[r, g, b]` colors; only present for non-uniform policies.
	pub vertex_colors: Option<Vec<f32>>,
	/// Pairs closer than this are connected.
	pub threshold: f32,
	/// Half-extent of the wrap-around cube.
	pub bound: f32,
	/// Accumulated whole-field rotation (radians per axis).
	pub rotation: Vec3,
	/// Rotation added every tick.
	pub spin: Vec3,
	/// Point size before depth attenuation.
	pub point_size: f32,
}

impl ParticleField {
	pub fn len(&self) -> usize {
		self.store.len()
	}

	pub fn is_empty(&self) -> bool {
		self.store.is_empty()
	}
}
