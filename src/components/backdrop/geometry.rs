//! Procedural geometry for particle fields and decorative shapes.
//!
//! Everything here is closed-form: polyhedra come from fixed vertex tables
//! (the dodecahedron is built as the dual of the icosahedron), tori and
//! spheres from angle sweeps, and the helix/network groups from parametric
//! placement. Random placement is uniform over the requested volume and
//! always driven by a caller-supplied RNG so layouts are reproducible.

use std::collections::BTreeSet;
use std::f32::consts::{PI, TAU};

use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;

use super::store::{ColorPolicy, Particle, ParticleField, ParticleStore};
use super::theme::{Color, palette};
use super::types::{FieldSettings, ScenePreset};

/// Whole-field rotation added per tick, matching a slow tumble.
const FIELD_SPIN: Vec3 = Vec3::new(0.0002, 0.0005, 0.0);

/// Indexed triangle mesh with a precomputed wireframe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProceduralMesh {
	/// Flat `[x, y, z, ...]` vertex positions.
	pub positions: Vec<f32>,
	/// Flat triangle indices, three per face.
	pub triangles: Vec<u16>,
	/// Flat line indices, two per unique triangle edge.
	pub edges: Vec<u16>,
}

impl ProceduralMesh {
	fn from_parts(vertices: &[Vec3], triangles: Vec<[u16; 3]>) -> Self {
		let mut unique = BTreeSet::new();
		for [a, b, c] in &triangles {
			for (p, q) in [(*a, *b), (*b, *c), (*c, *a)] {
				unique.insert((p.min(q), p.max(q)));
			}
		}
		Self {
			positions: vertices.iter().flat_map(|v| v.to_array()).collect(),
			triangles: triangles.into_iter().flatten().collect(),
			edges: unique.into_iter().flat_map(|(a, b)| [a, b]).collect(),
		}
	}

	pub fn vertex_count(&self) -> usize {
		self.positions.len() / 3
	}

	pub fn triangle_count(&self) -> usize {
		self.triangles.len() / 3
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len() / 2
	}

	pub fn vertex(&self, i: usize) -> Vec3 {
		Vec3::from_slice(&self.positions[i * 3..i * 3 + 3])
	}
}

/// Geometry of a decorative shape.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeGeometry {
	/// Loose points rendered as sprites.
	PointCloud { positions: Vec<f32> },
	/// A triangle mesh, drawn as lines when the material is wireframe.
	SolidMesh(ProceduralMesh),
	/// Point nodes joined by line edges.
	LineGraph {
		/// Flat node positions.
		nodes: Vec<f32>,
		/// Flat per-node `[r, g, b]` colors.
		node_colors: Vec<f32>,
		/// Flat index pairs into `nodes`.
		edges: Vec<u16>,
		edge_color: Color,
		edge_opacity: f32,
	},
}

impl ShapeGeometry {
	/// Index pairs of the edges of a line graph; empty for other variants.
	pub fn edge_pairs(&self) -> Vec<(u16, u16)> {
		match self {
			ShapeGeometry::LineGraph { edges, .. } => {
				edges.chunks_exact(2).map(|e| (e[0], e[1])).collect()
			}
			_ => Vec::new(),
		}
	}
}

/// Surface appearance of a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
	pub color: Color,
	pub wireframe: bool,
	pub opacity: f32,
}

/// Position and Euler rotation (XYZ, radians).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
	pub position: Vec3,
	pub rotation: Vec3,
}

impl Transform {
	pub fn at(position: Vec3) -> Self {
		Self {
			position,
			rotation: Vec3::ZERO,
		}
	}

	/// Model matrix: rotate, then translate.
	pub fn matrix(&self) -> Mat4 {
		Mat4::from_translation(self.position)
			* Mat4::from_euler(
				EulerRot::XYZ,
				self.rotation.x,
				self.rotation.y,
				self.rotation.z,
			)
	}
}

/// A sinusoid `sin(elapsed * frequency + phase) * amplitude`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Oscillation {
	pub amplitude: f32,
	pub frequency: f32,
	pub phase: f32,
}

impl Oscillation {
	pub fn sample(&self, elapsed: f32) -> f32 {
		(elapsed * self.frequency + self.phase).sin() * self.amplitude
	}
}

/// Per-tick drift applied to a shape's transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
	/// Rotation added every tick.
	pub spin: Vec3,
	/// Added to `position.y` every tick.
	pub bob: Option<Oscillation>,
	/// Added to `position.x` every tick (cosine phase).
	pub sway: Option<Oscillation>,
}

/// A decorative mesh, point cloud or graph. Created once at mount; only its
/// transform changes afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
	pub geometry: ShapeGeometry,
	pub material: Material,
	pub transform: Transform,
	pub motion: Motion,
}

/// Procedural shape generators accepted by [`build_shape`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeKind {
	Box {
		size: f32,
	},
	Octahedron {
		radius: f32,
	},
	Icosahedron {
		radius: f32,
	},
	Dodecahedron {
		radius: f32,
	},
	Torus {
		radius: f32,
		tube: f32,
		radial_segments: u16,
		tubular_segments: u16,
	},
	Sphere {
		radius: f32,
		width_segments: u16,
		height_segments: u16,
	},
	/// Points uniformly spread over a cube of side `spread`.
	PointCloud {
		count: usize,
		spread: f32,
	},
	/// Two interleaved strands with a rung every fifth pair.
	Helix {
		pairs: u16,
		turns: f32,
		radius: f32,
		rise: f32,
	},
	/// Random nodes in a box, linked when closer than `link_distance`.
	Network {
		nodes: u16,
		extent: Vec3,
		link_distance: f32,
	},
}

/// Appearance and placement shared by every [`ShapeKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeParams {
	pub material: Material,
	pub position: Vec3,
	pub motion: Motion,
}

impl ShapeParams {
	pub fn wireframe(color: Color, opacity: f32, position: Vec3) -> Self {
		Self {
			material: Material {
				color,
				wireframe: true,
				opacity,
			},
			position,
			motion: Motion::default(),
		}
	}

	pub fn with_motion(self, motion: Motion) -> Self {
		Self { motion, ..self }
	}
}

/// Builds a particle field of `settings.particle_count` particles placed
/// uniformly in `[-bound, bound]³`. A zero count yields an empty field.
pub fn build_field(settings: &FieldSettings, colors: ColorPolicy, rng: &mut impl Rng) -> ParticleField {
	let (bound, speed) = (settings.bound, settings.max_speed);
	let mut spread = |scale: f32| (rng.r#gen::<f32>() - 0.5) * scale;

	let store = ParticleStore::from_particles((0..settings.particle_count).map(|_| Particle {
		position: Vec3::new(spread(2.0 * bound), spread(2.0 * bound), spread(2.0 * bound)),
		velocity: Vec3::new(spread(speed), spread(speed), spread(speed)),
	}));

	let vertex_colors = match colors {
		ColorPolicy::Uniform(_) => None,
		ColorPolicy::Alternating(..) => Some(
			(0..store.len())
				.flat_map(|i| colors.color_for(i).to_rgb_f32())
				.collect(),
		),
	};

	ParticleField {
		store,
		colors,
		vertex_colors,
		threshold: settings.connection_threshold,
		bound,
		rotation: Vec3::ZERO,
		spin: FIELD_SPIN,
		point_size: settings.point_size,
	}
}

/// Builds one decorative shape.
pub fn build_shape(kind: ShapeKind, params: ShapeParams, rng: &mut impl Rng) -> Shape {
	let geometry = match kind {
		ShapeKind::Box { size } => ShapeGeometry::SolidMesh(box_mesh(size)),
		ShapeKind::Octahedron { radius } => ShapeGeometry::SolidMesh(octahedron(radius)),
		ShapeKind::Icosahedron { radius } => ShapeGeometry::SolidMesh(icosahedron(radius)),
		ShapeKind::Dodecahedron { radius } => ShapeGeometry::SolidMesh(dodecahedron(radius)),
		ShapeKind::Torus {
			radius,
			tube,
			radial_segments,
			tubular_segments,
		} => ShapeGeometry::SolidMesh(torus(radius, tube, radial_segments, tubular_segments)),
		ShapeKind::Sphere {
			radius,
			width_segments,
			height_segments,
		} => ShapeGeometry::SolidMesh(uv_sphere(radius, width_segments, height_segments)),
		ShapeKind::PointCloud { count, spread } => ShapeGeometry::PointCloud {
			positions: (0..count * 3)
				.map(|_| (rng.r#gen::<f32>() - 0.5) * spread)
				.collect(),
		},
		ShapeKind::Helix {
			pairs,
			turns,
			radius,
			rise,
		} => helix(pairs, turns, radius, rise),
		ShapeKind::Network {
			nodes,
			extent,
			link_distance,
		} => network(nodes, extent, link_distance, params.material.color, rng),
	};

	Shape {
		geometry,
		material: params.material,
		transform: Transform::at(params.position),
		motion: params.motion,
	}
}

fn box_mesh(size: f32) -> ProceduralMesh {
	let h = size / 2.0;
	// Corner index bits: 1 = +x, 2 = +y, 4 = +z.
	let vertices: Vec<Vec3> = (0..8)
		.map(|i| {
			Vec3::new(
				if i & 1 != 0 { h } else { -h },
				if i & 2 != 0 { h } else { -h },
				if i & 4 != 0 { h } else { -h },
			)
		})
		.collect();
	let triangles = vec![
		[0, 2, 6],
		[0, 6, 4],
		[1, 5, 7],
		[1, 7, 3],
		[0, 4, 5],
		[0, 5, 1],
		[2, 3, 7],
		[2, 7, 6],
		[0, 1, 3],
		[0, 3, 2],
		[4, 6, 7],
		[4, 7, 5],
	];
	ProceduralMesh::from_parts(&vertices, triangles)
}

fn octahedron(radius: f32) -> ProceduralMesh {
	let vertices = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z].map(|v| v * radius);
	let triangles = vec![
		[0, 2, 4],
		[2, 1, 4],
		[1, 3, 4],
		[3, 0, 4],
		[2, 0, 5],
		[1, 2, 5],
		[3, 1, 5],
		[0, 3, 5],
	];
	ProceduralMesh::from_parts(&vertices, triangles)
}

const ICOSAHEDRON_FACES: [[u16; 3]; 20] = [
	[0, 11, 5],
	[0, 5, 1],
	[0, 1, 7],
	[0, 7, 10],
	[0, 10, 11],
	[1, 5, 9],
	[5, 11, 4],
	[11, 10, 2],
	[10, 7, 6],
	[7, 1, 8],
	[3, 9, 4],
	[3, 4, 2],
	[3, 2, 6],
	[3, 6, 8],
	[3, 8, 9],
	[4, 9, 5],
	[2, 4, 11],
	[6, 2, 10],
	[8, 6, 7],
	[9, 8, 1],
];

fn icosahedron_vertices(radius: f32) -> [Vec3; 12] {
	let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
	[
		Vec3::new(-1.0, t, 0.0),
		Vec3::new(1.0, t, 0.0),
		Vec3::new(-1.0, -t, 0.0),
		Vec3::new(1.0, -t, 0.0),
		Vec3::new(0.0, -1.0, t),
		Vec3::new(0.0, 1.0, t),
		Vec3::new(0.0, -1.0, -t),
		Vec3::new(0.0, 1.0, -t),
		Vec3::new(t, 0.0, -1.0),
		Vec3::new(t, 0.0, 1.0),
		Vec3::new(-t, 0.0, -1.0),
		Vec3::new(-t, 0.0, 1.0),
	]
	.map(|v| v.normalize() * radius)
}

fn icosahedron(radius: f32) -> ProceduralMesh {
	ProceduralMesh::from_parts(&icosahedron_vertices(radius), ICOSAHEDRON_FACES.to_vec())
}

/// Dual of the icosahedron: one vertex per icosahedron face, one pentagon
/// (fan of three triangles) per icosahedron vertex.
fn dodecahedron(radius: f32) -> ProceduralMesh {
	let ico = icosahedron_vertices(1.0);
	let vertices: Vec<Vec3> = ICOSAHEDRON_FACES
		.iter()
		.map(|f| (ico[f[0] as usize] + ico[f[1] as usize] + ico[f[2] as usize]).normalize() * radius)
		.collect();

	let mut triangles = Vec::with_capacity(36);
	for (vi, axis) in ico.iter().enumerate() {
		let u = axis.any_orthonormal_vector();
		let w = axis.cross(u);
		let mut ring: Vec<(f32, u16)> = ICOSAHEDRON_FACES
			.iter()
			.enumerate()
			.filter(|(_, f)| f.contains(&(vi as u16)))
			.map(|(fi, _)| {
				let c = vertices[fi];
				(c.dot(w).atan2(c.dot(u)), fi as u16)
			})
			.collect();
		ring.sort_by(|a, b| a.0.total_cmp(&b.0));
		for k in 1..ring.len() - 1 {
			triangles.push([ring[0].1, ring[k].1, ring[k + 1].1]);
		}
	}
	ProceduralMesh::from_parts(&vertices, triangles)
}

/// Largest segment count per grid axis whose `(n + 1)²` vertices are still
/// addressable with `u16` indices.
const MAX_GRID_SEGMENTS: u16 = 254;

fn torus(radius: f32, tube: f32, radial_segments: u16, tubular_segments: u16) -> ProceduralMesh {
	let radial = radial_segments.clamp(3, MAX_GRID_SEGMENTS);
	let tubular = tubular_segments.clamp(3, MAX_GRID_SEGMENTS);
	let mut vertices = Vec::with_capacity((radial as usize + 1) * (tubular as usize + 1));
	for j in 0..=radial {
		let v = j as f32 / radial as f32 * TAU;
		for i in 0..=tubular {
			let u = i as f32 / tubular as f32 * TAU;
			vertices.push(Vec3::new(
				(radius + tube * v.cos()) * u.cos(),
				(radius + tube * v.cos()) * u.sin(),
				tube * v.sin(),
			));
		}
	}

	let row = tubular + 1;
	let mut triangles = Vec::with_capacity(radial as usize * tubular as usize * 2);
	for j in 1..=radial {
		for i in 1..=tubular {
			let a = row * j + i - 1;
			let b = row * (j - 1) + i - 1;
			let c = row * (j - 1) + i;
			let d = row * j + i;
			triangles.push([a, b, d]);
			triangles.push([b, c, d]);
		}
	}
	ProceduralMesh::from_parts(&vertices, triangles)
}

fn uv_sphere(radius: f32, width_segments: u16, height_segments: u16) -> ProceduralMesh {
	let ws = width_segments.clamp(3, MAX_GRID_SEGMENTS);
	let hs = height_segments.clamp(2, MAX_GRID_SEGMENTS);
	let mut vertices = Vec::with_capacity((ws as usize + 1) * (hs as usize + 1));
	for iy in 0..=hs {
		let theta = iy as f32 / hs as f32 * PI;
		for ix in 0..=ws {
			let phi = ix as f32 / ws as f32 * TAU;
			vertices.push(Vec3::new(
				-radius * phi.cos() * theta.sin(),
				radius * theta.cos(),
				radius * phi.sin() * theta.sin(),
			));
		}
	}

	let row = ws + 1;
	let mut triangles = Vec::new();
	for iy in 0..hs {
		for ix in 0..ws {
			let a = iy * row + ix + 1;
			let b = iy * row + ix;
			let c = (iy + 1) * row + ix;
			let d = (iy + 1) * row + ix + 1;
			// The pole rows collapse to a single point; skip their degenerate halves.
			if iy != 0 {
				triangles.push([a, b, d]);
			}
			if iy != hs - 1 {
				triangles.push([b, c, d]);
			}
		}
	}
	ProceduralMesh::from_parts(&vertices, triangles)
}

/// Rung spacing of the helix, in pairs.
const HELIX_RUNG_EVERY: u16 = 5;
/// Two nodes per pair must stay addressable with `u16` indices.
const MAX_HELIX_PAIRS: u16 = u16::MAX / 2;

fn helix(pairs: u16, turns: f32, radius: f32, rise: f32) -> ShapeGeometry {
	let pairs = pairs.min(MAX_HELIX_PAIRS);
	let mut nodes = Vec::with_capacity(pairs as usize * 6);
	let mut node_colors = Vec::with_capacity(pairs as usize * 6);
	let mut edges = Vec::new();

	for i in 0..pairs {
		let angle = i as f32 / pairs as f32 * turns * TAU;
		let y = (i as f32 - pairs as f32 / 2.0) * rise;
		let color = if i % 2 == 0 { palette::BLUE } else { palette::GREEN };
		for strand_angle in [angle, angle + PI] {
			nodes.extend_from_slice(&[strand_angle.cos() * radius, y, strand_angle.sin() * radius]);
			node_colors.extend_from_slice(&color.to_rgb_f32());
		}
		if i % HELIX_RUNG_EVERY == 0 {
			edges.extend_from_slice(&[2 * i, 2 * i + 1]);
		}
	}

	ShapeGeometry::LineGraph {
		nodes,
		node_colors,
		edges,
		edge_color: palette::VIOLET,
		edge_opacity: 0.3,
	}
}

fn network(count: u16, extent: Vec3, link_distance: f32, color: Color, rng: &mut impl Rng) -> ShapeGeometry {
	let points: Vec<Vec3> = (0..count)
		.map(|_| {
			Vec3::new(
				(rng.r#gen::<f32>() - 0.5) * extent.x,
				(rng.r#gen::<f32>() - 0.5) * extent.y,
				(rng.r#gen::<f32>() - 0.5) * extent.z,
			)
		})
		.collect();

	let mut edges = Vec::new();
	for i in 0..points.len() {
		for j in i + 1..points.len() {
			if points[i].distance(points[j]) < link_distance {
				edges.extend_from_slice(&[i as u16, j as u16]);
			}
		}
	}

	ShapeGeometry::LineGraph {
		nodes: points.iter().flat_map(|p| p.to_array()).collect(),
		node_colors: points.iter().flat_map(|_| color.to_rgb_f32()).collect(),
		edges,
		edge_color: palette::GREEN,
		edge_opacity: 0.2,
	}
}

/// Rotation sign pattern: `+rate` when `index % modulus == 0`, else `-rate`.
fn alternating(rate: f32, index: usize, modulus: usize) -> f32 {
	if index % modulus == 0 { rate } else { -rate }
}

fn centered(rng: &mut impl Rng, extent: Vec3) -> Vec3 {
	Vec3::new(
		(rng.r#gen::<f32>() - 0.5) * extent.x,
		(rng.r#gen::<f32>() - 0.5) * extent.y,
		(rng.r#gen::<f32>() - 0.5) * extent.z,
	)
}

/// Builds the shapes of a preset arrangement.
pub fn build_preset(preset: ScenePreset, rng: &mut impl Rng) -> Vec<Shape> {
	match preset {
		ScenePreset::None => Vec::new(),
		ScenePreset::Polyhedra => polyhedra_preset(rng),
		ScenePreset::SectionTech => section_tech_preset(rng),
	}
}

fn polyhedra_preset(rng: &mut impl Rng) -> Vec<Shape> {
	let mut specs = vec![
		(
			ShapeKind::Dodecahedron { radius: 1.5 },
			ShapeParams::wireframe(palette::BLUE, 0.6, Vec3::new(-15.0, 10.0, -10.0)),
		),
		(
			ShapeKind::Octahedron { radius: 2.0 },
			ShapeParams::wireframe(palette::GREEN, 0.4, Vec3::new(15.0, -8.0, -15.0)),
		),
		(
			ShapeKind::Icosahedron { radius: 1.8 },
			ShapeParams::wireframe(palette::VIOLET, 0.5, Vec3::new(0.0, 15.0, -20.0)),
		),
		(
			ShapeKind::Torus {
				radius: 2.0,
				tube: 0.5,
				radial_segments: 8,
				tubular_segments: 16,
			},
			ShapeParams::wireframe(palette::AMBER, 0.3, Vec3::new(-8.0, -12.0, -8.0)),
		),
	];
	for _ in 0..12 {
		let color = if rng.gen_bool(0.5) { palette::BLUE } else { palette::GREEN };
		let position = centered(rng, Vec3::new(40.0, 30.0, 30.0));
		specs.push((ShapeKind::Box { size: 0.8 }, ShapeParams::wireframe(color, 0.2, position)));
	}

	let mut shapes: Vec<Shape> = specs
		.into_iter()
		.enumerate()
		.map(|(index, (kind, params))| {
			let motion = Motion {
				spin: Vec3::new(
					alternating(0.005, index, 2),
					alternating(0.008, index, 3),
					alternating(0.003, index, 4),
				),
				bob: Some(Oscillation {
					amplitude: 0.02,
					frequency: 1.0,
					phase: index as f32,
				}),
				sway: Some(Oscillation {
					amplitude: 0.01,
					frequency: 0.8,
					phase: index as f32 + PI / 2.0,
				}),
			};
			build_shape(kind, params.with_motion(motion), rng)
		})
		.collect();

	let cloud = ShapeParams {
		material: Material {
			color: palette::BLUE,
			wireframe: false,
			opacity: 0.8,
		},
		position: Vec3::ZERO,
		motion: Motion {
			spin: Vec3::new(0.0005, 0.001, 0.0),
			..Motion::default()
		},
	};
	shapes.push(build_shape(
		ShapeKind::PointCloud {
			count: 100,
			spread: 100.0,
		},
		cloud,
		rng,
	));
	shapes
}

fn section_tech_preset(rng: &mut impl Rng) -> Vec<Shape> {
	let group_motion = Motion {
		spin: Vec3::new(0.0, 0.005, 0.002),
		..Motion::default()
	};
	let node_material = |color, opacity| Material {
		color,
		wireframe: false,
		opacity,
	};

	let mut shapes = vec![
		build_shape(
			ShapeKind::Helix {
				pairs: 50,
				turns: 2.0,
				radius: 3.0,
				rise: 0.4,
			},
			ShapeParams {
				material: node_material(palette::BLUE, 0.7),
				position: Vec3::new(15.0, 0.0, -10.0),
				motion: group_motion,
			},
			rng,
		),
		build_shape(
			ShapeKind::Network {
				nodes: 15,
				extent: Vec3::new(20.0, 15.0, 10.0),
				link_distance: 8.0,
			},
			ShapeParams {
				material: node_material(palette::BLUE, 0.8),
				position: Vec3::new(-15.0, 5.0, -5.0),
				motion: group_motion,
			},
			rng,
		),
	];

	for _ in 0..20 {
		let index = shapes.len();
		let size = rng.r#gen::<f32>() * 0.5 + 0.2;
		let color = if rng.gen_bool(0.5) { palette::AMBER } else { palette::VIOLET };
		let position = centered(rng, Vec3::new(30.0, 20.0, 15.0));
		let motion = Motion {
			spin: Vec3::new(alternating(0.01, index, 2), alternating(0.015, index, 3), 0.0),
			bob: Some(Oscillation {
				amplitude: 0.03,
				frequency: 1.0,
				phase: index as f32 * 0.5,
			}),
			sway: None,
		};
		shapes.push(build_shape(
			ShapeKind::Box { size },
			ShapeParams::wireframe(color, 0.4, position).with_motion(motion),
			rng,
		));
	}
	shapes
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;

	fn rng() -> SmallRng {
		SmallRng::seed_from_u64(7)
	}

	fn mesh(kind: ShapeKind) -> ProceduralMesh {
		let params = ShapeParams::wireframe(palette::BLUE, 1.0, Vec3::ZERO);
		match build_shape(kind, params, &mut rng()).geometry {
			ShapeGeometry::SolidMesh(mesh) => mesh,
			other => panic!("expected a mesh, got {:?}", other),
		}
	}

	fn assert_on_sphere(mesh: &ProceduralMesh, radius: f32) {
		for i in 0..mesh.vertex_count() {
			let r = mesh.vertex(i).length();
			assert!((r - radius).abs() < 1e-4, "vertex {} at radius {}", i, r);
		}
	}

	#[test]
	fn box_counts() {
		let m = mesh(ShapeKind::Box { size: 2.0 });
		assert_eq!((m.vertex_count(), m.triangle_count(), m.edge_count()), (8, 12, 18));
		assert_eq!(m.vertex(7), Vec3::ONE);
	}

	#[test]
	fn octahedron_counts() {
		let m = mesh(ShapeKind::Octahedron { radius: 2.0 });
		assert_eq!((m.vertex_count(), m.triangle_count(), m.edge_count()), (6, 8, 12));
		assert_on_sphere(&m, 2.0);
	}

	#[test]
	fn icosahedron_counts() {
		let m = mesh(ShapeKind::Icosahedron { radius: 1.8 });
		assert_eq!((m.vertex_count(), m.triangle_count(), m.edge_count()), (12, 20, 30));
		assert_on_sphere(&m, 1.8);
	}

	#[test]
	fn dodecahedron_is_icosahedron_dual() {
		let m = mesh(ShapeKind::Dodecahedron { radius: 1.5 });
		assert_eq!(m.vertex_count(), 20);
		// 12 pentagons, each fanned into 3 triangles.
		assert_eq!(m.triangle_count(), 36);
		// 30 polyhedron edges plus 2 fan diagonals per pentagon.
		assert_eq!(m.edge_count(), 54);
		assert_on_sphere(&m, 1.5);
	}

	#[test]
	fn torus_grid() {
		let m = mesh(ShapeKind::Torus {
			radius: 2.0,
			tube: 0.5,
			radial_segments: 8,
			tubular_segments: 16,
		});
		assert_eq!(m.vertex_count(), 9 * 17);
		assert_eq!(m.triangle_count(), 8 * 16 * 2);
		for i in 0..m.vertex_count() {
			let v = m.vertex(i);
			let ring = Vec3::new(v.x, v.y, 0.0).length() - 2.0;
			assert!((ring.hypot(v.z) - 0.5).abs() < 1e-4);
		}
	}

	#[test]
	fn sphere_skips_pole_degenerates() {
		let m = mesh(ShapeKind::Sphere {
			radius: 1.0,
			width_segments: 8,
			height_segments: 6,
		});
		assert_eq!(m.triangle_count(), 8 * (6 * 2 - 2));
		assert_on_sphere(&m, 1.0);
	}

	#[test]
	fn dense_grids_stay_u16_addressable() {
		let dense = [
			ShapeKind::Torus {
				radius: 2.0,
				tube: 0.5,
				radial_segments: 300,
				tubular_segments: 1000,
			},
			ShapeKind::Sphere {
				radius: 1.0,
				width_segments: u16::MAX,
				height_segments: 1000,
			},
		];
		for kind in dense {
			let m = mesh(kind);
			let n = m.vertex_count();
			assert!(n <= u16::MAX as usize + 1);
			assert!(m.triangles.iter().chain(&m.edges).all(|&i| (i as usize) < n));
		}
	}

	#[test]
	fn oversized_helix_is_clamped() {
		let shape = build_shape(
			ShapeKind::Helix {
				pairs: u16::MAX,
				turns: 2.0,
				radius: 3.0,
				rise: 0.4,
			},
			ShapeParams::wireframe(palette::BLUE, 0.7, Vec3::ZERO),
			&mut rng(),
		);
		let ShapeGeometry::LineGraph { nodes, .. } = &shape.geometry else {
			panic!("helix is a line graph");
		};
		let n = nodes.len() / 3;
		assert_eq!(n, 2 * MAX_HELIX_PAIRS as usize);
		assert!(shape.geometry.edge_pairs().iter().all(|&(a, b)| (b as usize) < n && a < b));
	}

	#[test]
	fn helix_has_rung_every_fifth_pair() {
		let shape = build_shape(
			ShapeKind::Helix {
				pairs: 50,
				turns: 2.0,
				radius: 3.0,
				rise: 0.4,
			},
			ShapeParams::wireframe(palette::BLUE, 0.7, Vec3::ZERO),
			&mut rng(),
		);
		let pairs = shape.geometry.edge_pairs();
		assert_eq!(pairs.len(), 10);
		assert!(pairs.iter().all(|&(a, b)| a % 10 == 0 && b == a + 1));

		let ShapeGeometry::LineGraph { nodes, .. } = &shape.geometry else {
			panic!("helix is a line graph");
		};
		assert_eq!(nodes.len(), 50 * 2 * 3);
		// Both strands of a pair sit opposite each other at the same height.
		let (a, b) = (Vec3::from_slice(&nodes[0..3]), Vec3::from_slice(&nodes[3..6]));
		assert!((a + b).x.abs() < 1e-5 && (a + b).z.abs() < 1e-5);
		assert_eq!(a.y, b.y);
	}

	#[test]
	fn network_links_iff_closer_than_link_distance() {
		let shape = build_shape(
			ShapeKind::Network {
				nodes: 15,
				extent: Vec3::new(20.0, 15.0, 10.0),
				link_distance: 8.0,
			},
			ShapeParams::wireframe(palette::BLUE, 0.8, Vec3::ZERO),
			&mut rng(),
		);
		let ShapeGeometry::LineGraph { nodes, .. } = &shape.geometry else {
			panic!("network is a line graph");
		};
		let node = |i: usize| Vec3::from_slice(&nodes[i * 3..i * 3 + 3]);
		let pairs = shape.geometry.edge_pairs();
		for i in 0..15 {
			for j in i + 1..15 {
				let linked = pairs.contains(&(i as u16, j as u16));
				assert_eq!(linked, node(i).distance(node(j)) < 8.0);
			}
		}
	}

	#[test]
	fn field_is_uniform_within_bound() {
		let settings = FieldSettings {
			particle_count: 500,
			..FieldSettings::default()
		};
		let field = build_field(&settings, ColorPolicy::Uniform(palette::BLUE), &mut rng());
		assert_eq!(field.len(), 500);
		assert!(field.vertex_colors.is_none());
		field.store.for_each(|_, p| {
			assert!(p.position.abs().max_element() <= settings.bound);
			assert!(p.velocity.abs().max_element() <= settings.max_speed / 2.0);
		});
	}

	#[test]
	fn zero_count_degrades_to_empty_field() {
		let settings = FieldSettings {
			particle_count: 0,
			..FieldSettings::default()
		};
		let field = build_field(
			&settings,
			ColorPolicy::Alternating(palette::BLUE, palette::GREEN),
			&mut rng(),
		);
		assert!(field.is_empty());
		assert_eq!(field.vertex_colors, Some(Vec::new()));
	}

	#[test]
	fn same_seed_same_layout() {
		let settings = FieldSettings::default();
		let a = build_field(&settings, ColorPolicy::Uniform(palette::BLUE), &mut rng());
		let b = build_field(&settings, ColorPolicy::Uniform(palette::BLUE), &mut rng());
		assert_eq!(a.store.positions(), b.store.positions());
	}

	#[test]
	fn presets_have_expected_population() {
		assert!(build_preset(ScenePreset::None, &mut rng()).is_empty());
		let poly = build_preset(ScenePreset::Polyhedra, &mut rng());
		assert_eq!(poly.len(), 4 + 12 + 1);
		assert!(matches!(poly.last().unwrap().geometry, ShapeGeometry::PointCloud { .. }));
		let tech = build_preset(ScenePreset::SectionTech, &mut rng());
		assert_eq!(tech.len(), 2 + 20);
	}
}
