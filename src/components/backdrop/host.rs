//! Browser implementation of [`Host`] and the glue that mounts a module
//! into a DOM element.
//!
//! The module lives in a shared slot. Frame and resize closures only hold a
//! weak reference to that slot, so dropping the slot tears everything down
//! and any callback still queued by the browser finds nothing to drive.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, Window};

use super::camera::Viewport;
use super::lifecycle::{FrameToken, Host, ModuleHandle};
use super::types::ModuleConfig;
use super::webgl::WebGlBackend;

/// A module as mounted in the browser.
pub type BrowserModule = ModuleHandle<WebGlBackend, BrowserHost>;

/// Shared owner of a mounted browser module.
pub type ModuleSlot = Rc<RefCell<Option<BrowserModule>>>;

/// Fallback size when the container cannot be measured.
const FALLBACK_VIEWPORT: Viewport = Viewport::new(800, 600);

/// `requestAnimationFrame` and window resize events for one module.
pub struct BrowserHost {
	window: Window,
	frame_cb: Closure<dyn FnMut(f64)>,
	resize_cb: Closure<dyn FnMut()>,
}

impl BrowserHost {
	fn new(
		window: Window,
		container: HtmlElement,
		fullscreen: bool,
		slot: Weak<RefCell<Option<BrowserModule>>>,
	) -> Self {
		let frame_slot = slot.clone();
		let frame_cb = Closure::new(move |timestamp: f64| {
			with_module(&frame_slot, |module| module.on_frame(timestamp));
		});

		let resize_window = window.clone();
		let resize_cb = Closure::new(move || {
			let viewport = measure(&resize_window, &container, fullscreen);
			with_module(&slot, |module| module.on_resize(viewport));
		});

		Self {
			window,
			frame_cb,
			resize_cb,
		}
	}
}

impl Host for BrowserHost {
	fn request_frame(&mut self) -> Option<FrameToken> {
		self.window
			.request_animation_frame(self.frame_cb.as_ref().unchecked_ref())
			.map(FrameToken)
			.map_err(|e| warn!("backdrop: requestAnimationFrame failed: {:?}", e))
			.ok()
	}

	fn cancel_frame(&mut self, token: FrameToken) {
		let _ = self.window.cancel_animation_frame(token.0);
	}

	fn listen_resize(&mut self) -> bool {
		self.window
			.add_event_listener_with_callback("resize", self.resize_cb.as_ref().unchecked_ref())
			.is_ok()
	}

	fn unlisten_resize(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback("resize", self.resize_cb.as_ref().unchecked_ref());
	}

	fn random_seed(&mut self) -> u64 {
		(js_sys::Math::random() * (1u64 << 53) as f64) as u64
	}
}

/// Runs `f` on the module if it is still alive and not already borrowed.
fn with_module(slot: &Weak<RefCell<Option<BrowserModule>>>, f: impl FnOnce(&mut BrowserModule)) {
	let Some(slot) = slot.upgrade() else {
		return;
	};
	// A callback re-entering while the module is borrowed is dropped.
	let Ok(mut guard) = slot.try_borrow_mut() else {
		return;
	};
	if let Some(module) = guard.as_mut() {
		f(module);
	}
}

/// Current drawing size: the window for fullscreen layers, else the container.
pub fn measure(window: &Window, container: &HtmlElement, fullscreen: bool) -> Viewport {
	let (width, height) = if fullscreen {
		let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
		(dim(window.inner_width()), dim(window.inner_height()))
	} else {
		(container.client_width() as f64, container.client_height() as f64)
	};
	if width < 1.0 || height < 1.0 {
		return FALLBACK_VIEWPORT;
	}
	Viewport::new(width as u32, height as u32)
}

/// Mounts a module into `container` and returns its owning slot.
///
/// The slot always holds a handle, even when the surface could not be
/// acquired; check its status to tell. Take and drop the handle (or call
/// `detach`) to tear the module down.
pub fn mount_module(
	container: &HtmlElement,
	config: ModuleConfig,
	fullscreen: bool,
) -> Option<ModuleSlot> {
	let window = web_sys::window()?;
	let slot: ModuleSlot = Rc::new(RefCell::new(None));
	let host = BrowserHost::new(
		window.clone(),
		container.clone(),
		fullscreen,
		Rc::downgrade(&slot),
	);
	let viewport = measure(&window, container, fullscreen);

	let mut module = ModuleHandle::new(host, config);
	let _ = module.mount(container, viewport);
	*slot.borrow_mut() = Some(module);
	Some(slot)
}
