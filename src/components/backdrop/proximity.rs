//! Proximity graph between particles.
//!
//! Connections are recomputed from scratch by a brute-force all-pairs scan,
//! which is the most expensive step of a tick, so it only runs on a
//! configurable cadence rather than every frame.

use glam::Vec3;

use super::store::ParticleStore;

/// A line between two particles closer than the connection threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
	/// Index of the first particle (always the smaller index).
	pub from: usize,
	/// Index of the second particle.
	pub to: usize,
	pub a: Vec3,
	pub b: Vec3,
}

/// Derived set of connection segments; holds no state across rebuilds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionGraph {
	segments: Vec<Segment>,
	/// Flat `[ax, ay, az, bx, by, bz, ...]`, as uploaded for line drawing.
	vertices: Vec<f32>,
}

impl ConnectionGraph {
	/// Replaces every segment with those of the current `store` snapshot.
	///
	/// A pair is connected iff its Euclidean distance is strictly below
	/// `threshold`; a pair exactly at `threshold` is not.
	pub fn rebuild(&mut self, store: &ParticleStore, threshold: f32) {
		self.segments.clear();
		self.vertices.clear();

		let n = store.len();
		for i in 0..n {
			let a = store.position(i);
			for j in i + 1..n {
				let b = store.position(j);
				if a.distance(b) < threshold {
					self.segments.push(Segment { from: i, to: j, a, b });
					self.vertices.extend_from_slice(&a.to_array());
					self.vertices.extend_from_slice(&b.to_array());
				}
			}
		}
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn line_vertices(&self) -> &[f32] {
		&self.vertices
	}

	pub fn len(&self) -> usize {
		self.segments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	/// Particle index pairs of every segment, in scan order.
	pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.segments.iter().map(|s| (s.from, s.to))
	}
}

/// Builds a fresh graph for `store`. See [`ConnectionGraph::rebuild`].
pub fn build_connections(store: &ParticleStore, threshold: f32) -> ConnectionGraph {
	let mut graph = ConnectionGraph::default();
	graph.rebuild(store, threshold);
	graph
}

/// How often the proximity graph is rebuilt while a module runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebuildCadence {
	/// Frames between rebuilds. `0` means only the rebuild at mount.
	pub interval_frames: u32,
}

impl RebuildCadence {
	pub fn every(interval_frames: u32) -> Self {
		Self { interval_frames }
	}

	/// Whether tick number `frame` (counted from 0) should rebuild.
	pub fn is_due(&self, frame: u64) -> bool {
		match self.interval_frames {
			0 => false,
			n => frame % n as u64 == 0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::backdrop::store::Particle;

	fn store_at(points: &[[f32; 3]]) -> ParticleStore {
		ParticleStore::from_particles(points.iter().map(|p| Particle {
			position: Vec3::from_array(*p),
			velocity: Vec3::ZERO,
		}))
	}

	#[test]
	fn connects_only_nearby_pairs() {
		let store = store_at(&[
			[0.0, 0.0, 0.0],
			[1.0, 0.0, 0.0],
			[50.0, 50.0, 50.0],
			[2.0, 0.0, 0.0],
		]);
		let graph = build_connections(&store, 5.0);
		let pairs: Vec<_> = graph.pairs().collect();
		assert_eq!(pairs, vec![(0, 1), (0, 3), (1, 3)]);
		assert_eq!(graph.line_vertices().len(), 3 * 6);
		assert_eq!(graph.segments()[1].b, Vec3::new(2.0, 0.0, 0.0));
	}

	#[test]
	fn pair_exactly_at_threshold_is_excluded() {
		let store = store_at(&[[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]]);
		assert!(build_connections(&store, 5.0).is_empty());
		assert_eq!(build_connections(&store, 5.0001).len(), 1);
	}

	#[test]
	fn rebuild_is_idempotent_on_frozen_snapshot() {
		let store = store_at(&[
			[0.0, 0.0, 0.0],
			[4.0, 1.0, 0.0],
			[8.0, 2.0, 0.0],
			[-3.0, 0.5, 2.0],
		]);
		let mut graph = build_connections(&store, 6.0);
		let first = graph.clone();
		graph.rebuild(&store, 6.0);
		assert_eq!(graph, first);
	}

	#[test]
	fn rebuild_discards_previous_segments() {
		let near = store_at(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
		let far = store_at(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0]]);
		let mut graph = build_connections(&near, 5.0);
		assert_eq!(graph.len(), 1);
		graph.rebuild(&far, 5.0);
		assert!(graph.is_empty());
		assert!(graph.line_vertices().is_empty());
	}

	#[test]
	fn matches_brute_force_distance_check() {
		let points: Vec<[f32; 3]> = (0..30)
			.map(|i| {
				let t = i as f32;
				[(t * 1.7).sin() * 10.0, (t * 0.9).cos() * 10.0, t * 0.3]
			})
			.collect();
		let store = store_at(&points);
		let graph = build_connections(&store, 7.5);
		for i in 0..points.len() {
			for j in i + 1..points.len() {
				let close = store.position(i).distance(store.position(j)) < 7.5;
				assert_eq!(graph.pairs().any(|p| p == (i, j)), close);
			}
		}
	}

	#[test]
	fn empty_store_gives_empty_graph() {
		assert!(build_connections(&ParticleStore::default(), 10.0).is_empty());
	}

	#[test]
	fn cadence() {
		let every_ten = RebuildCadence::every(10);
		let due: Vec<u64> = (0..25).filter(|f| every_ten.is_due(*f)).collect();
		assert_eq!(due, vec![0, 10, 20]);

		let mount_only = RebuildCadence::every(0);
		assert!((0..100).all(|f| !mount_only.is_due(f)));

		assert!((0..5).all(|f| RebuildCadence::every(1).is_due(f)));
	}
}
