//! Render session: camera plus a GPU backend bound to one container.
//!
//! The session turns particle fields, connection graphs and shapes into
//! backend-neutral [`DrawBatch`]es each frame. Rendering order is:
//! 1. Shapes (meshes, graphs, point clouds) in registration order
//! 2. Connection lines of each field
//! 3. Glowing particles of each field, additively blended on top

use glam::Mat4;
use log::{debug, info};

use super::camera::{PerspectiveCamera, Viewport};
use super::error::BackdropError;
use super::geometry::{Shape, ShapeGeometry, Transform};
use super::proximity::ConnectionGraph;
use super::store::ParticleField;
use super::theme::{BackdropStyle, Blend, Color};
use super::types::CameraConfig;

/// Primitive assembly mode of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Primitive {
	Points,
	Lines,
	Triangles,
}

/// Where a batch takes its vertex colors from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VertexColors<'a> {
	/// One color for every vertex.
	Uniform(Color),
	/// Flat `[r, g, b, ...]`, one entry per vertex.
	PerVertex(&'a [f32]),
}

/// One draw call's worth of geometry and uniforms.
#[derive(Clone, Copy, Debug)]
pub struct DrawBatch<'a> {
	pub primitive: Primitive,
	/// Flat `[x, y, z, ...]` positions.
	pub positions: &'a [f32],
	pub colors: VertexColors<'a>,
	/// Optional index buffer into `positions`.
	pub indices: Option<&'a [u16]>,
	pub model_view: Mat4,
	pub projection: Mat4,
	pub opacity: f32,
	/// Point size before depth attenuation (points only).
	pub point_size: f32,
	/// Whether points pulse with `time`.
	pub pulse: bool,
	pub time: f32,
	pub blend: Blend,
}

impl DrawBatch<'_> {
	/// Number of vertices the batch will emit.
	pub fn vertex_count(&self) -> usize {
		match self.indices {
			Some(indices) => indices.len(),
			None => self.positions.len() / 3,
		}
	}
}

/// A GPU rendering surface attached to a host container.
///
/// Implementations own every GPU-side resource they allocate in `create` and
/// must release all of them in `dispose`.
pub trait RenderBackend: Sized {
	/// Host element the surface attaches to.
	type Container: ?Sized;

	/// Creates the surface, attaches it to `container` and compiles programs.
	fn create(container: &Self::Container, viewport: Viewport) -> Result<Self, BackdropError>;

	/// Resizes the drawing buffer and viewport.
	fn resize(&mut self, viewport: Viewport);

	/// Clears the surface for a new frame.
	fn begin_frame(&mut self, clear: Color);

	fn draw(&mut self, batch: &DrawBatch<'_>);

	/// Releases every resource and detaches the surface. Called at most once.
	fn dispose(&mut self);
}

/// Camera, style and backend for one mounted module.
pub struct RenderSession<B: RenderBackend> {
	backend: B,
	camera: PerspectiveCamera,
	style: BackdropStyle,
	viewport: Viewport,
	disposed: bool,
}

impl<B: RenderBackend> RenderSession<B> {
	/// Acquires a rendering surface inside `container`.
	pub fn mount(
		container: &B::Container,
		viewport: Viewport,
		camera: &CameraConfig,
	) -> Result<Self, BackdropError> {
		let backend = B::create(container, viewport)?;
		info!(
			"backdrop: render session mounted at {}x{}",
			viewport.width, viewport.height
		);
		Ok(Self {
			backend,
			camera: PerspectiveCamera::new(camera, viewport),
			style: BackdropStyle::default(),
			viewport,
			disposed: false,
		})
	}

	pub fn camera(&self) -> &PerspectiveCamera {
		&self.camera
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed
	}

	/// Updates camera aspect and surface size. Zero-sized viewports are ignored.
	pub fn resize(&mut self, viewport: Viewport) {
		if self.disposed {
			debug!("backdrop: resize after dispose ignored");
			return;
		}
		if self.camera.set_viewport(viewport) {
			self.viewport = viewport;
			self.backend.resize(viewport);
		}
	}

	/// Draws one frame.
	pub fn render(
		&mut self,
		fields: &[ParticleField],
		graphs: &[ConnectionGraph],
		shapes: &[Shape],
		time: f32,
	) {
		if self.disposed {
			debug!("backdrop: render after dispose ignored");
			return;
		}

		let view = self.camera.view_matrix();
		let projection = self.camera.projection_matrix();
		self.backend.begin_frame(self.style.clear);

		for shape in shapes {
			draw_shape(&mut self.backend, &self.style, shape, view, projection);
		}

		for (i, field) in fields.iter().enumerate() {
			let model_view = view
				* Transform {
					rotation: field.rotation,
					..Transform::default()
				}
				.matrix();

			if let Some(graph) = graphs.get(i).filter(|g| !g.is_empty()) {
				self.backend.draw(&DrawBatch {
					primitive: Primitive::Lines,
					positions: graph.line_vertices(),
					colors: VertexColors::Uniform(field.colors.primary()),
					indices: None,
					model_view,
					projection,
					opacity: self.style.connection_opacity,
					point_size: 0.0,
					pulse: false,
					time,
					blend: Blend::Alpha,
				});
			}

			if field.is_empty() {
				continue;
			}
			let colors = match &field.vertex_colors {
				Some(per_vertex) => VertexColors::PerVertex(per_vertex),
				None => VertexColors::Uniform(field.colors.primary()),
			};
			self.backend.draw(&DrawBatch {
				primitive: Primitive::Points,
				positions: field.store.positions(),
				colors,
				indices: None,
				model_view,
				projection,
				opacity: self.style.particle_opacity,
				point_size: field.point_size,
				pulse: true,
				time,
				blend: Blend::Additive,
			});
		}
	}

	/// Releases the surface and every GPU resource. Safe to call repeatedly.
	pub fn dispose(&mut self) {
		if self.disposed {
			debug!("backdrop: render session already disposed");
			return;
		}
		self.disposed = true;
		self.backend.dispose();
		info!("backdrop: render session disposed");
	}
}

fn draw_shape<B: RenderBackend>(
	backend: &mut B,
	style: &BackdropStyle,
	shape: &Shape,
	view: Mat4,
	projection: Mat4,
) {
	let material = shape.material;
	let base = DrawBatch {
		primitive: Primitive::Lines,
		positions: &[],
		colors: VertexColors::Uniform(material.color),
		indices: None,
		model_view: view * shape.transform.matrix(),
		projection,
		opacity: material.opacity,
		point_size: 0.0,
		pulse: false,
		time: 0.0,
		blend: Blend::Alpha,
	};

	match &shape.geometry {
		ShapeGeometry::PointCloud { positions } => backend.draw(&DrawBatch {
			primitive: Primitive::Points,
			positions,
			point_size: style.cloud_point_size,
			blend: Blend::Additive,
			..base
		}),
		ShapeGeometry::SolidMesh(mesh) => {
			let (primitive, indices) = if material.wireframe {
				(Primitive::Lines, mesh.edges.as_slice())
			} else {
				(Primitive::Triangles, mesh.triangles.as_slice())
			};
			backend.draw(&DrawBatch {
				primitive,
				positions: &mesh.positions,
				indices: Some(indices),
				..base
			});
		}
		ShapeGeometry::LineGraph {
			nodes,
			node_colors,
			edges,
			edge_color,
			edge_opacity,
		} => {
			if !edges.is_empty() {
				backend.draw(&DrawBatch {
					positions: nodes,
					colors: VertexColors::Uniform(*edge_color),
					indices: Some(edges.as_slice()),
					opacity: *edge_opacity,
					..base
				});
			}
			backend.draw(&DrawBatch {
				primitive: Primitive::Points,
				positions: nodes,
				colors: VertexColors::PerVertex(node_colors),
				point_size: style.node_point_size,
				blend: Blend::Additive,
				..base
			});
		}
	}
}
