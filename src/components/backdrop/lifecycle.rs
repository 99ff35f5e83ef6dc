//! Module lifecycle: mount, frame loop, resize and teardown.
//!
//! A [`ModuleHandle`] moves through
//! `Unmounted → Mounting → Running → Disposing → Unmounted`. While running,
//! every frame callback from the host performs one tick, strictly in order:
//! integrate particles and shapes, rebuild connections when the cadence says
//! so, render, then request the next frame. Teardown cancels the pending
//! frame before any resource is released, and every entry point is a no-op
//! outside the state it belongs to, so late callbacks and repeated detaches
//! are harmless.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::camera::Viewport;
use super::error::BackdropError;
use super::geometry::{Shape, build_field, build_preset};
use super::integrator::{animate_shape, integrate_field};
use super::proximity::{ConnectionGraph, RebuildCadence};
use super::render::{RenderBackend, RenderSession};
use super::store::{ColorPolicy, ParticleField};
use super::types::{DEFAULT_DRIFT_AMPLITUDE, DEFAULT_TIME_STEP, ModuleConfig};

/// Identifier of a frame callback scheduled with the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameToken(pub i32);

/// Services the host page provides to a mounted module.
///
/// All calls happen on the host's single UI thread. The host delivers
/// scheduled frames through [`ModuleHandle::on_frame`] and resize events
/// through [`ModuleHandle::on_resize`].
pub trait Host {
	/// Schedules one frame callback before the next repaint.
	fn request_frame(&mut self) -> Option<FrameToken>;

	/// Cancels a frame callback that has not fired yet.
	fn cancel_frame(&mut self, token: FrameToken);

	/// Starts delivering container resize events. Returns whether a listener
	/// was registered.
	fn listen_resize(&mut self) -> bool;

	/// Stops delivering resize events.
	fn unlisten_resize(&mut self);

	/// Seed for layouts that were not given an explicit one.
	fn random_seed(&mut self) -> u64;
}

/// Lifecycle states of a module.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
	Unmounted,
	Mounting,
	Running,
	Disposing,
}

/// What the host page can observe about a module.
#[derive(Clone, Debug, PartialEq)]
pub enum ModuleStatus {
	/// Not mounted, or detached.
	Inactive,
	/// Mounted and animating.
	Active,
	/// The rendering surface could not be acquired; the page continues
	/// without this decorative layer.
	VisualDisabled(BackdropError),
}

/// Owner of the single pending frame request of a module.
#[derive(Debug, Default)]
pub struct SessionHandle {
	pending: Option<FrameToken>,
}

impl SessionHandle {
	/// Requests the next frame unless one is already pending.
	pub fn start<H: Host>(&mut self, host: &mut H) -> bool {
		if self.pending.is_none() {
			self.pending = host.request_frame();
		}
		self.pending.is_some()
	}

	/// Cancels the pending frame, if any.
	pub fn cancel<H: Host>(&mut self, host: &mut H) {
		if let Some(token) = self.pending.take() {
			host.cancel_frame(token);
		}
	}

	pub fn is_pending(&self) -> bool {
		self.pending.is_some()
	}

	/// Marks the pending request as delivered.
	fn fired(&mut self) {
		self.pending = None;
	}
}

/// Frame counter and clocks driving animation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
	/// Ticks completed since mount.
	pub frame: u64,
	/// Animation time, advanced by a fixed step per tick.
	pub time: f32,
	/// Wall-clock seconds since the first tick.
	pub elapsed: f32,
	started_at_ms: Option<f64>,
}

impl FrameClock {
	fn advance(&mut self, timestamp_ms: f64, time_step: f32) {
		let start = *self.started_at_ms.get_or_insert(timestamp_ms);
		self.elapsed = ((timestamp_ms - start) / 1000.0).max(0.0) as f32;
		self.time += time_step;
	}
}

/// All mutable scene state threaded into each tick.
#[derive(Clone, Debug)]
pub struct FrameContext {
	pub fields: Vec<ParticleField>,
	/// One graph per field, same order.
	pub graphs: Vec<ConnectionGraph>,
	pub shapes: Vec<Shape>,
	pub clock: FrameClock,
	pub cadence: RebuildCadence,
	pub drift_amplitude: f32,
	pub time_step: f32,
}

impl FrameContext {
	/// Populates fields and shapes for `config` and builds the initial graphs.
	pub fn build(config: &ModuleConfig, fallback_seed: u64) -> Self {
		let mut context = Self {
			fields: Vec::new(),
			graphs: Vec::new(),
			shapes: Vec::new(),
			clock: FrameClock::default(),
			cadence: RebuildCadence::every(0),
			drift_amplitude: DEFAULT_DRIFT_AMPLITUDE,
			time_step: DEFAULT_TIME_STEP,
		};

		if let Some(field) = &config.field {
			let settings = field.settings();
			let colors = match settings.secondary_color {
				Some(secondary) => ColorPolicy::Alternating(settings.color, secondary),
				None => ColorPolicy::Uniform(settings.color),
			};
			let mut rng = SmallRng::seed_from_u64(settings.seed.unwrap_or(fallback_seed));
			context.fields.push(build_field(&settings, colors, &mut rng));
			context.graphs.push(ConnectionGraph::default());
			context.cadence = RebuildCadence::every(settings.rebuild_interval_frames);
			context.drift_amplitude = settings.drift_amplitude;
			context.time_step = settings.time_step;
		}

		let mut rng = SmallRng::seed_from_u64(config.seed.unwrap_or(fallback_seed).rotate_left(17));
		context.shapes = build_preset(config.preset, &mut rng);

		context.rebuild_graphs();
		context
	}

	/// Recomputes every connection graph from the current particle positions.
	pub fn rebuild_graphs(&mut self) {
		for (field, graph) in self.fields.iter().zip(self.graphs.iter_mut()) {
			graph.rebuild(&field.store, field.threshold);
		}
	}

	/// Integrates one tick, then rebuilds connections if due. Returns whether
	/// the graphs were rebuilt.
	pub fn advance(&mut self, timestamp_ms: f64) -> bool {
		self.clock.advance(timestamp_ms, self.time_step);
		for field in &mut self.fields {
			integrate_field(field, self.clock.time, self.drift_amplitude);
		}
		for shape in &mut self.shapes {
			animate_shape(shape, self.clock.elapsed);
		}

		let due = self.cadence.is_due(self.clock.frame);
		if due {
			self.rebuild_graphs();
		}
		self.clock.frame += 1;
		due
	}
}

/// One mounted visual module: render session, scene state and frame loop.
pub struct ModuleHandle<B: RenderBackend, H: Host> {
	state: LifecycleState,
	status: ModuleStatus,
	host: H,
	config: ModuleConfig,
	frame_loop: SessionHandle,
	listening: bool,
	session: Option<RenderSession<B>>,
	context: Option<FrameContext>,
}

impl<B: RenderBackend, H: Host> ModuleHandle<B, H> {
	/// Creates an unmounted module.
	pub fn new(host: H, config: ModuleConfig) -> Self {
		Self {
			state: LifecycleState::Unmounted,
			status: ModuleStatus::Inactive,
			host,
			config,
			frame_loop: SessionHandle::default(),
			listening: false,
			session: None,
			context: None,
		}
	}

	/// Creates a module and mounts it into `container`.
	///
	/// Always returns a handle. If the surface cannot be acquired the handle
	/// stays unmounted with [`ModuleStatus::VisualDisabled`], and
	/// [`detach`](Self::detach) remains safe to call.
	pub fn attach(container: &B::Container, host: H, config: ModuleConfig, viewport: Viewport) -> Self {
		let mut handle = Self::new(host, config);
		let _ = handle.mount(container, viewport);
		handle
	}

	/// Mounts into `container` and starts the frame loop.
	pub fn mount(&mut self, container: &B::Container, viewport: Viewport) -> Result<(), BackdropError> {
		if self.state != LifecycleState::Unmounted {
			warn!("backdrop: mount rejected in state {:?}", self.state);
			return Err(BackdropError::AlreadyMounted);
		}
		self.state = LifecycleState::Mounting;

		let session = match RenderSession::mount(container, viewport, &self.config.camera()) {
			Ok(session) => session,
			Err(e) => {
				warn!("backdrop: visual disabled: {}", e);
				self.state = LifecycleState::Unmounted;
				self.status = ModuleStatus::VisualDisabled(e.clone());
				return Err(e);
			}
		};
		let seed = self.host.random_seed();
		self.session = Some(session);
		self.context = Some(FrameContext::build(&self.config, seed));
		self.listening = self.host.listen_resize();
		self.state = LifecycleState::Running;

		if !self.frame_loop.start(&mut self.host) {
			return Err(self.stop_unscheduled());
		}

		self.status = ModuleStatus::Active;
		info!(
			"backdrop: module running ({} fields, {} shapes)",
			self.context.as_ref().map_or(0, |c| c.fields.len()),
			self.context.as_ref().map_or(0, |c| c.shapes.len())
		);
		Ok(())
	}

	/// Frame callback from the host: one full tick, then the next request.
	pub fn on_frame(&mut self, timestamp_ms: f64) {
		if self.state != LifecycleState::Running {
			debug!("backdrop: frame in state {:?} ignored", self.state);
			return;
		}
		self.frame_loop.fired();

		if let (Some(context), Some(session)) = (self.context.as_mut(), self.session.as_mut()) {
			context.advance(timestamp_ms);
			session.render(
				&context.fields,
				&context.graphs,
				&context.shapes,
				context.clock.time,
			);
		}

		if !self.frame_loop.start(&mut self.host) {
			self.stop_unscheduled();
		}
	}

	/// Tears down a module whose next frame could not be requested.
	fn stop_unscheduled(&mut self) -> BackdropError {
		let e = BackdropError::resource("frame scheduling unavailable");
		warn!("backdrop: visual disabled: {}", e);
		self.detach();
		self.status = ModuleStatus::VisualDisabled(e.clone());
		e
	}

	/// Resize notification from the host; handled synchronously.
	pub fn on_resize(&mut self, viewport: Viewport) {
		if self.state != LifecycleState::Running {
			debug!("backdrop: resize in state {:?} ignored", self.state);
			return;
		}
		if let Some(session) = self.session.as_mut() {
			session.resize(viewport);
		}
	}

	/// Stops the frame loop and releases every resource. Idempotent.
	pub fn detach(&mut self) {
		match self.state {
			LifecycleState::Unmounted | LifecycleState::Disposing => {
				debug!("backdrop: detach in state {:?} ignored", self.state);
				return;
			}
			LifecycleState::Mounting | LifecycleState::Running => {}
		}
		self.state = LifecycleState::Disposing;

		self.frame_loop.cancel(&mut self.host);
		if self.listening {
			self.host.unlisten_resize();
			self.listening = false;
		}
		if let Some(mut session) = self.session.take() {
			session.dispose();
		}
		self.context = None;

		self.state = LifecycleState::Unmounted;
		self.status = ModuleStatus::Inactive;
		info!("backdrop: module detached");
	}

	pub fn state(&self) -> LifecycleState {
		self.state
	}

	pub fn status(&self) -> &ModuleStatus {
		&self.status
	}

	pub fn session(&self) -> Option<&RenderSession<B>> {
		self.session.as_ref()
	}

	pub fn context(&self) -> Option<&FrameContext> {
		self.context.as_ref()
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	/// Whether a frame callback is currently scheduled.
	pub fn is_frame_pending(&self) -> bool {
		self.frame_loop.is_pending()
	}
}

impl<B: RenderBackend, H: Host> Drop for ModuleHandle<B, H> {
	fn drop(&mut self) {
		self.detach();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::backdrop::types::{FieldConfig, ScenePreset};

	fn field_config(count: i64, interval: u32) -> ModuleConfig {
		ModuleConfig::particle_field(FieldConfig {
			particle_count: count,
			rebuild_interval_frames: interval,
			seed: Some(11),
			..FieldConfig::default()
		})
	}

	#[test]
	fn context_builds_initial_graph() {
		let context = FrameContext::build(&field_config(150, 10), 0);
		assert_eq!(context.fields.len(), 1);
		assert_eq!(context.fields[0].len(), 150);
		let fresh = {
			let mut g = ConnectionGraph::default();
			g.rebuild(&context.fields[0].store, context.fields[0].threshold);
			g
		};
		assert_eq!(context.graphs[0], fresh);
	}

	#[test]
	fn rebuilds_follow_cadence() {
		let mut context = FrameContext::build(&field_config(20, 10), 0);
		let rebuilt: Vec<u64> = (0..25u64)
			.filter(|f| context.advance(*f as f64 * 16.0))
			.collect();
		assert_eq!(rebuilt, vec![0, 10, 20]);
		assert_eq!(context.clock.frame, 25);
	}

	#[test]
	fn graph_matches_positions_right_after_rebuild() {
		let mut context = FrameContext::build(&field_config(60, 3), 0);
		for f in 0..7 {
			context.advance(f as f64 * 16.0);
		}
		// Frame 6 rebuilt after integration.
		let mut expected = ConnectionGraph::default();
		expected.rebuild(&context.fields[0].store, context.fields[0].threshold);
		assert_eq!(context.graphs[0], expected);
	}

	#[test]
	fn mount_only_cadence_never_rebuilds_while_running() {
		let mut context = FrameContext::build(&field_config(20, 0), 0);
		let initial = context.graphs[0].clone();
		assert!((0..50).all(|f| !context.advance(f as f64)));
		assert_eq!(context.graphs[0], initial);
	}

	#[test]
	fn clocks_advance() {
		let mut context = FrameContext::build(&ModuleConfig::preset(ScenePreset::Polyhedra), 5);
		assert!(context.fields.is_empty());
		assert_eq!(context.shapes.len(), 17);
		context.advance(1000.0);
		context.advance(1500.0);
		assert_eq!(context.clock.frame, 2);
		assert!((context.clock.time - 2.0 * DEFAULT_TIME_STEP).abs() < 1e-6);
		assert!((context.clock.elapsed - 0.5).abs() < 1e-6);
	}

	#[test]
	fn explicit_seed_is_reproducible() {
		let a = FrameContext::build(&field_config(30, 10), 1);
		let b = FrameContext::build(&field_config(30, 10), 2);
		assert_eq!(a.fields[0].store.positions(), b.fields[0].store.positions());
	}
}
