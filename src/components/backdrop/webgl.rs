//! WebGL2 implementation of [`RenderBackend`].
//!
//! Creates a transparent canvas inside the container, compiles the point and
//! line programs once, and streams every batch through a single set of
//! scratch buffers.

use js_sys::{Float32Array, Object, Reflect, Uint16Array};
use log::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
	HtmlCanvasElement, HtmlElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
	WebGlShader, WebGlUniformLocation, WebGlVertexArrayObject,
};

use super::camera::Viewport;
use super::error::BackdropError;
use super::render::{DrawBatch, Primitive, RenderBackend, VertexColors};
use super::shaders::{
	ATTRIB_COLOR, ATTRIB_POSITION, LINE_FRAGMENT, LINE_VERTEX, POINT_FRAGMENT, POINT_VERTEX,
};
use super::theme::{Blend, Color};

/// A linked program and the uniform locations it exposes.
struct ProgramInfo {
	program: WebGlProgram,
	model_view: Option<WebGlUniformLocation>,
	projection: Option<WebGlUniformLocation>,
	opacity: Option<WebGlUniformLocation>,
	point_size: Option<WebGlUniformLocation>,
	time: Option<WebGlUniformLocation>,
	pulse: Option<WebGlUniformLocation>,
}

impl ProgramInfo {
	fn link(gl: &GL, vert_src: &str, frag_src: &str) -> Result<Self, BackdropError> {
		let program = link_program(gl, vert_src, frag_src)?;
		let loc = |name: &str| gl.get_uniform_location(&program, name);
		Ok(Self {
			model_view: loc("u_model_view"),
			projection: loc("u_projection"),
			opacity: loc("u_opacity"),
			point_size: loc("u_point_size"),
			time: loc("u_time"),
			pulse: loc("u_pulse"),
			program,
		})
	}
}

/// Canvas, context and GPU objects owned by one render session.
pub struct WebGlBackend {
	canvas: HtmlCanvasElement,
	gl: GL,
	points: ProgramInfo,
	lines: ProgramInfo,
	vao: WebGlVertexArrayObject,
	position_buffer: WebGlBuffer,
	color_buffer: WebGlBuffer,
	index_buffer: WebGlBuffer,
}

impl RenderBackend for WebGlBackend {
	type Container = HtmlElement;

	fn create(container: &HtmlElement, viewport: Viewport) -> Result<Self, BackdropError> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| BackdropError::resource("no document"))?;
		let canvas: HtmlCanvasElement = document
			.create_element("canvas")
			.map_err(|e| js_error("create canvas", e))?
			.dyn_into()
			.map_err(|_| BackdropError::resource("created element is not a canvas"))?;
		let style = canvas.style();
		let _ = style.set_property("display", "block");
		let _ = style.set_property("width", "100%");
		let _ = style.set_property("height", "100%");

		let gl: GL = canvas
			.get_context_with_context_options("webgl2", &context_options())
			.map_err(|e| js_error("get webgl2 context", e))?
			.ok_or_else(|| BackdropError::resource("WebGL2 not supported"))?
			.dyn_into()
			.map_err(|_| BackdropError::resource("context is not WebGL2"))?;

		let context = &gl;
		let mut rollback = Rollback::default();
		let points = ProgramInfo::link(&gl, POINT_VERTEX, POINT_FRAGMENT)?;
		let program = points.program.clone();
		rollback.on_failure(move || context.delete_program(Some(&program)));
		let lines = ProgramInfo::link(&gl, LINE_VERTEX, LINE_FRAGMENT)?;
		let program = lines.program.clone();
		rollback.on_failure(move || context.delete_program(Some(&program)));

		let vao = gl
			.create_vertex_array()
			.ok_or_else(|| BackdropError::resource("could not create vertex array"))?;
		let array = vao.clone();
		rollback.on_failure(move || context.delete_vertex_array(Some(&array)));
		let mut buffer = || {
			let buffer = context
				.create_buffer()
				.ok_or_else(|| BackdropError::resource("could not create buffer"))?;
			let created = buffer.clone();
			rollback.on_failure(move || context.delete_buffer(Some(&created)));
			Ok::<_, BackdropError>(buffer)
		};
		let (position_buffer, color_buffer, index_buffer) = (buffer()?, buffer()?, buffer()?);

		container
			.append_child(&canvas)
			.map_err(|e| js_error("attach canvas", e))?;
		rollback.commit();

		let mut backend = Self {
			canvas,
			gl,
			points,
			lines,
			vao,
			position_buffer,
			color_buffer,
			index_buffer,
		};
		backend.resize(viewport);
		info!("backdrop: webgl2 surface created");
		Ok(backend)
	}

	fn resize(&mut self, viewport: Viewport) {
		self.canvas.set_width(viewport.width);
		self.canvas.set_height(viewport.height);
		self.gl
			.viewport(0, 0, viewport.width as i32, viewport.height as i32);
	}

	fn begin_frame(&mut self, clear: Color) {
		let [r, g, b] = clear.to_rgb_f32();
		self.gl.clear_color(r, g, b, clear.a as f32);
		self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
	}

	fn draw(&mut self, batch: &DrawBatch<'_>) {
		let count = batch.vertex_count();
		if count == 0 {
			return;
		}
		let gl = &self.gl;
		let info = match batch.primitive {
			Primitive::Points => &self.points,
			Primitive::Lines | Primitive::Triangles => &self.lines,
		};
		gl.use_program(Some(&info.program));
		gl.bind_vertex_array(Some(&self.vao));

		gl.uniform_matrix4fv_with_f32_array(
			info.model_view.as_ref(),
			false,
			&batch.model_view.to_cols_array(),
		);
		gl.uniform_matrix4fv_with_f32_array(
			info.projection.as_ref(),
			false,
			&batch.projection.to_cols_array(),
		);
		gl.uniform1f(info.opacity.as_ref(), batch.opacity);
		gl.uniform1f(info.point_size.as_ref(), batch.point_size);
		gl.uniform1f(info.time.as_ref(), batch.time);
		gl.uniform1f(info.pulse.as_ref(), if batch.pulse { 1.0 } else { 0.0 });

		gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.position_buffer));
		gl.buffer_data_with_array_buffer_view(
			GL::ARRAY_BUFFER,
			&Float32Array::from(batch.positions),
			GL::DYNAMIC_DRAW,
		);
		gl.enable_vertex_attrib_array(ATTRIB_POSITION);
		gl.vertex_attrib_pointer_with_i32(ATTRIB_POSITION, 3, GL::FLOAT, false, 0, 0);

		match batch.colors {
			VertexColors::Uniform(color) => {
				let [r, g, b] = color.to_rgb_f32();
				gl.disable_vertex_attrib_array(ATTRIB_COLOR);
				gl.vertex_attrib3f(ATTRIB_COLOR, r, g, b);
			}
			VertexColors::PerVertex(colors) => {
				gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.color_buffer));
				gl.buffer_data_with_array_buffer_view(
					GL::ARRAY_BUFFER,
					&Float32Array::from(colors),
					GL::DYNAMIC_DRAW,
				);
				gl.enable_vertex_attrib_array(ATTRIB_COLOR);
				gl.vertex_attrib_pointer_with_i32(ATTRIB_COLOR, 3, GL::FLOAT, false, 0, 0);
			}
		}

		gl.enable(GL::BLEND);
		gl.depth_mask(false);
		match batch.blend {
			Blend::Additive => gl.blend_func(GL::SRC_ALPHA, GL::ONE),
			Blend::Alpha => gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA),
		}

		let mode = match batch.primitive {
			Primitive::Points => GL::POINTS,
			Primitive::Lines => GL::LINES,
			Primitive::Triangles => GL::TRIANGLES,
		};
		match batch.indices {
			Some(indices) => {
				gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&self.index_buffer));
				gl.buffer_data_with_array_buffer_view(
					GL::ELEMENT_ARRAY_BUFFER,
					&Uint16Array::from(indices),
					GL::DYNAMIC_DRAW,
				);
				gl.draw_elements_with_i32(mode, count as i32, GL::UNSIGNED_SHORT, 0);
			}
			None => gl.draw_arrays(mode, 0, count as i32),
		}
		gl.bind_vertex_array(None);
	}

	fn dispose(&mut self) {
		let gl = &self.gl;
		gl.delete_program(Some(&self.points.program));
		gl.delete_program(Some(&self.lines.program));
		gl.delete_buffer(Some(&self.position_buffer));
		gl.delete_buffer(Some(&self.color_buffer));
		gl.delete_buffer(Some(&self.index_buffer));
		gl.delete_vertex_array(Some(&self.vao));
		self.canvas.remove();
		debug!("backdrop: webgl2 surface released");
	}
}

/// Release steps for a partially built surface, run in reverse on drop
/// unless [`commit`](Self::commit) is called first.
#[derive(Default)]
struct Rollback<'a> {
	steps: Vec<Box<dyn FnOnce() + 'a>>,
}

impl<'a> Rollback<'a> {
	fn on_failure(&mut self, step: impl FnOnce() + 'a) {
		self.steps.push(Box::new(step));
	}

	fn commit(mut self) {
		self.steps.clear();
	}
}

impl Drop for Rollback<'_> {
	fn drop(&mut self) {
		while let Some(step) = self.steps.pop() {
			step();
		}
	}
}

/// `{ alpha: true, antialias: true }` as a JS object.
fn context_options() -> JsValue {
	let options = Object::new();
	let _ = Reflect::set(&options, &"alpha".into(), &JsValue::TRUE);
	let _ = Reflect::set(&options, &"antialias".into(), &JsValue::TRUE);
	options.into()
}

fn js_error(what: &str, e: JsValue) -> BackdropError {
	BackdropError::resource(format!("{}: {:?}", what, e))
}

fn compile_shader(gl: &GL, src: &str, shader_type: u32) -> Result<WebGlShader, BackdropError> {
	let shader = gl
		.create_shader(shader_type)
		.ok_or_else(|| BackdropError::resource("could not create shader"))?;
	gl.shader_source(&shader, src);
	gl.compile_shader(&shader);
	if gl
		.get_shader_parameter(&shader, GL::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(shader)
	} else {
		let log = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		Err(BackdropError::resource(format!("shader compile failed: {}", log)))
	}
}

fn link_program(gl: &GL, vert_src: &str, frag_src: &str) -> Result<WebGlProgram, BackdropError> {
	let vert = compile_shader(gl, vert_src, GL::VERTEX_SHADER)?;
	let frag = compile_shader(gl, frag_src, GL::FRAGMENT_SHADER).inspect_err(|_| {
		gl.delete_shader(Some(&vert));
	})?;
	let Some(program) = gl.create_program() else {
		gl.delete_shader(Some(&vert));
		gl.delete_shader(Some(&frag));
		return Err(BackdropError::resource("could not create program"));
	};
	gl.attach_shader(&program, &vert);
	gl.attach_shader(&program, &frag);
	gl.link_program(&program);

	// Shaders are only needed until the program is linked.
	gl.delete_shader(Some(&vert));
	gl.delete_shader(Some(&frag));

	if gl
		.get_program_parameter(&program, GL::LINK_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(program)
	} else {
		let log = gl.get_program_info_log(&program).unwrap_or_default();
		gl.delete_program(Some(&program));
		Err(BackdropError::resource(format!("program link failed: {}", log)))
	}
}
