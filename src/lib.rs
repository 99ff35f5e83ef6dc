//! particle-backdrop: animated WebGL2 backgrounds for Leptos pages.
//!
//! Provides drifting particle fields joined by proximity lines, floating
//! wireframe polyhedra and themed shape presets, rendered as decorative
//! layers behind page content.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::backdrop::{
	BackdropError, BackdropLayer, FieldConfig, ModuleConfig, ModuleStatus, ParticleField,
	PolyhedraBackdrop, ScenePreset, SectionTech,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("backdrop: logging initialized");
}

/// Page-level backdrop configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
	/// Fullscreen layer behind the hero content.
	pub hero: ModuleConfig,
	/// Layer behind the feature section.
	pub section: ModuleConfig,
}

impl Default for PageConfig {
	fn default() -> Self {
		Self {
			hero: ModuleConfig::particle_field(FieldConfig::default()),
			section: ModuleConfig::preset(ScenePreset::SectionTech),
		}
	}
}

impl PageConfig {
	/// Parses page config JSON, falling back to defaults on malformed input.
	pub fn from_json(json_text: &str) -> Self {
		match serde_json::from_str::<PageConfig>(json_text) {
			Ok(config) => config,
			Err(e) => {
				warn!("backdrop: failed to parse page config: {}", e);
				Self::default()
			}
		}
	}
}

/// Load page config from a script element with id="backdrop-config".
/// Expected format: JSON with optional `hero` and `section` module configs.
fn load_page_config() -> PageConfig {
	let script = web_sys::window()
		.and_then(|window: Window| window.document())
		.and_then(|document| document.get_element_by_id("backdrop-config"))
		.and_then(|element| element.dyn_into::<HtmlScriptElement>().ok());
	match script.and_then(|s| s.text().ok()) {
		Some(json_text) => {
			let config = PageConfig::from_json(&json_text);
			info!("backdrop: loaded page config");
			config
		}
		None => PageConfig::default(),
	}
}

/// Main application component.
/// A fullscreen hero backdrop plus a section with its own contained layer.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let PageConfig { hero, section } = load_page_config();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Particle Backdrop" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<header class="hero">
			<BackdropLayer config=Signal::stored(hero) fullscreen=true />
			<div class="hero-overlay">
				<h1>"Particle Backdrop"</h1>
				<p class="subtitle">"Drifting particles, linked by proximity."</p>
			</div>
		</header>

		<section class="tech" style="position: relative; min-height: 60vh;">
			<BackdropLayer config=Signal::stored(section) />
			<div class="tech-content">
				<h2>"Under the hood"</h2>
				<p>"WebGL2, rendered from Rust."</p>
			</div>
		</section>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_config_defaults() {
		let config = PageConfig::from_json("{}");
		assert_eq!(config, PageConfig::default());
		assert!(config.hero.field.is_some());
		assert_eq!(config.section.preset, ScenePreset::SectionTech);
	}

	#[test]
	fn malformed_page_config_falls_back() {
		assert_eq!(PageConfig::from_json("{ not json"), PageConfig::default());
	}

	#[test]
	fn partial_page_config() {
		let config = PageConfig::from_json(
			r##"{ "hero": { "field": { "particle_count": 500, "color": "#10b981" } } }"##,
		);
		let field = config.hero.field.as_ref().map(FieldConfig::settings);
		assert_eq!(field.map(|s| s.particle_count), Some(500));
		assert_eq!(config.section, ModuleConfig::preset(ScenePreset::SectionTech));
	}
}
