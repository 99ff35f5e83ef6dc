//! Leptos components hosting backdrop modules.
//!
//! Each component renders an empty, non-interactive container and mounts a
//! module into it once the element exists. Changing the config tears down
//! the old module before the new one starts; unmounting the component
//! detaches it.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use send_wrapper::SendWrapper;

use super::host::{ModuleSlot, mount_module};
use super::types::{
	DEFAULT_CONNECTION_THRESHOLD, DEFAULT_PARTICLE_COUNT, FieldConfig, ModuleConfig, ScenePreset,
};

/// Container style for layers that cover their positioned parent.
const CONTAINED_STYLE: &str =
	"position: absolute; inset: 0; overflow: hidden; pointer-events: none; z-index: 0;";
/// Container style for layers that cover the whole window.
const FULLSCREEN_STYLE: &str =
	"position: fixed; inset: 0; overflow: hidden; pointer-events: none; z-index: -1;";

fn teardown(slot: &ModuleSlot) {
	let module = slot.borrow_mut().take();
	if let Some(mut module) = module {
		module.detach();
	}
}

/// Renders a decorative module behind sibling content.
///
/// Set `fullscreen = true` to cover the window and follow its size; otherwise
/// the layer fills its nearest positioned ancestor. The layer never receives
/// pointer events.
#[component]
pub fn BackdropLayer(
	#[prop(into)] config: Signal<ModuleConfig>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let mounted: Rc<RefCell<Option<ModuleSlot>>> = Rc::new(RefCell::new(None));
	let mounted_effect = mounted.clone();

	Effect::new(move |_| {
		let config = config.get();
		let Some(container) = container_ref.get() else {
			return;
		};
		if let Some(previous) = mounted_effect.borrow_mut().take() {
			teardown(&previous);
		}

		*mounted_effect.borrow_mut() = mount_module(&container, config, fullscreen);
	});

	let mounted = SendWrapper::new(mounted);
	on_cleanup(move || {
		if let Some(slot) = mounted.borrow_mut().take() {
			teardown(&slot);
		}
	});

	view! {
		<div
			node_ref=container_ref
			class="backdrop-layer"
			aria-hidden="true"
			style=if fullscreen { FULLSCREEN_STYLE } else { CONTAINED_STYLE }
		/>
	}
}

/// A drifting, self-connecting particle field.
///
/// Renders the field layer only. The helix and node-network section layer is
/// a separate module; place a [`SectionTech`] alongside this component where
/// a page wants both.
#[component]
pub fn ParticleField(
	#[prop(default = DEFAULT_PARTICLE_COUNT as i64)] particle_count: i64,
	#[prop(into, default = "#3b82f6".to_string())] color: String,
	#[prop(into, optional)] secondary_color: Option<String>,
	#[prop(default = DEFAULT_CONNECTION_THRESHOLD)] connection_threshold: f32,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let config = ModuleConfig::particle_field(FieldConfig {
		particle_count,
		color,
		secondary_color,
		connection_threshold,
		..FieldConfig::default()
	});
	view! { <BackdropLayer config=Signal::stored(config) fullscreen=fullscreen /> }
}

/// Floating wireframe polyhedra and a glowing point cloud.
#[component]
pub fn PolyhedraBackdrop(#[prop(default = false)] fullscreen: bool) -> impl IntoView {
	let config = ModuleConfig::preset(ScenePreset::Polyhedra);
	view! { <BackdropLayer config=Signal::stored(config) fullscreen=fullscreen /> }
}

/// A DNA-style helix, a node network and scattered cubes for section
/// backgrounds.
#[component]
pub fn SectionTech(#[prop(default = false)] fullscreen: bool) -> impl IntoView {
	let config = ModuleConfig::preset(ScenePreset::SectionTech);
	view! { <BackdropLayer config=Signal::stored(config) fullscreen=fullscreen /> }
}
