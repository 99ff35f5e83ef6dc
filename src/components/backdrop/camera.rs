//! Perspective camera for backdrop scenes.

use glam::{Mat4, Vec3};

use super::types::CameraConfig;

/// Size of the rendering surface in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
	pub width: u32,
	pub height: u32,
}

impl Viewport {
	pub const fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Width over height, or `None` for a degenerate (zero-sized) viewport.
	pub fn aspect(&self) -> Option<f32> {
		(self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
	}
}

/// Fixed-position perspective camera looking down -z at the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
	/// Vertical field of view in radians.
	pub fov_y: f32,
	pub aspect: f32,
	pub near: f32,
	pub far: f32,
	pub position: Vec3,
}

impl PerspectiveCamera {
	pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
		Self {
			fov_y: config.fov_degrees.to_radians(),
			aspect: viewport.aspect().unwrap_or(1.0),
			near: config.near,
			far: config.far,
			position: Vec3::new(0.0, 0.0, config.distance),
		}
	}

	/// Recomputes the aspect ratio. Degenerate viewports are ignored.
	pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
		match viewport.aspect() {
			Some(aspect) => {
				self.aspect = aspect;
				true
			}
			None => false,
		}
	}

	pub fn view_matrix(&self) -> Mat4 {
		Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
	}

	pub fn projection_matrix(&self) -> Mat4 {
		Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn aspect_follows_viewport() {
		let mut camera = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(800, 600));
		assert_eq!(camera.aspect, 800.0 / 600.0);
		assert!(camera.set_viewport(Viewport::new(400, 300)));
		assert_eq!(camera.aspect, 400.0 / 300.0);
	}

	#[test]
	fn zero_sized_viewport_is_ignored() {
		let mut camera = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(0, 0));
		assert_eq!(camera.aspect, 1.0);
		camera.set_viewport(Viewport::new(640, 480));
		assert!(!camera.set_viewport(Viewport::new(640, 0)));
		assert_eq!(camera.aspect, 640.0 / 480.0);
	}

	#[test]
	fn origin_is_in_front_of_camera() {
		let camera = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(100, 100));
		let view = camera.view_matrix().transform_point3(Vec3::ZERO);
		assert!((view.z + 50.0).abs() < 1e-4);
		let clip = camera.projection_matrix() * view.extend(1.0);
		let ndc = clip.truncate() / clip.w;
		assert!(ndc.abs().max_element() < 1.0);
	}
}
