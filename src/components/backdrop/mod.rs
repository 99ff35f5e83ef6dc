//! Animated decorative backdrops: drifting particle fields linked by
//! proximity lines, floating wireframe polyhedra, and themed shape presets.
//!
//! The simulation core (geometry, particle store, proximity graph,
//! integrator, lifecycle) is plain Rust and runs anywhere. Rendering goes
//! through the [`RenderBackend`] trait, implemented for the browser by
//! [`WebGlBackend`], and browser scheduling goes through [`Host`].
//!
//! # Example
//!
//! ```ignore
//! use particle_backdrop::{ParticleField, SectionTech};
//!
//! view! {
//!     <ParticleField particle_count=300 color="#10b981" />
//!     <section style="position: relative">
//!         <SectionTech />
//!     </section>
//! }
//! ```

pub mod camera;
mod component;
pub mod error;
pub mod geometry;
mod host;
pub mod integrator;
pub mod lifecycle;
pub mod proximity;
pub mod render;
pub mod shaders;
pub mod store;
pub mod theme;
pub mod types;
mod webgl;

pub use camera::{PerspectiveCamera, Viewport};
pub use component::{BackdropLayer, ParticleField, PolyhedraBackdrop, SectionTech};
pub use error::BackdropError;
pub use host::{BrowserHost, BrowserModule, ModuleSlot, mount_module};
pub use lifecycle::{FrameToken, Host, LifecycleState, ModuleHandle, ModuleStatus};
pub use render::{RenderBackend, RenderSession};
pub use types::{CameraConfig, FieldConfig, ModuleConfig, ScenePreset};
pub use webgl::WebGlBackend;
