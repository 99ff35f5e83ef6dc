//! GLSL ES 3.00 programs for glowing points and lines.
//!
//! Points are sized inversely to their view depth and shaded with a soft
//! radial falloff; particle fields additionally pulse with time. The CPU
//! mirrors below follow the shader math exactly and are what the tests
//! check against.

/// Attribute location of vertex positions in both programs.
pub const ATTRIB_POSITION: u32 = 0;
/// Attribute location of vertex colors in both programs.
pub const ATTRIB_COLOR: u32 = 1;

/// Screen-space size reference: a point of size 1 at depth 300 is 1px.
pub const POINT_DEPTH_SCALE: f32 = 300.0;

pub const POINT_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_model_view;
uniform mat4 u_projection;
uniform float u_point_size;
out vec3 v_color;

void main() {
	vec4 mv_position = u_model_view * vec4(a_position, 1.0);
	gl_PointSize = u_point_size * (300.0 / -mv_position.z);
	gl_Position = u_projection * mv_position;
	v_color = a_color;
}
"#;

pub const POINT_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
uniform float u_time;
uniform float u_opacity;
uniform float u_pulse;
out vec4 frag_color;

void main() {
	float distance_to_center = length(gl_PointCoord - vec2(0.5));
	float alpha = 1.0 - smoothstep(0.0, 0.5, distance_to_center);
	alpha *= mix(1.0, 0.7 + 0.3 * sin(2.0 * u_time), u_pulse);
	frag_color = vec4(v_color, alpha * u_opacity);
}
"#;

pub const LINE_VERTEX: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_color;
uniform mat4 u_model_view;
uniform mat4 u_projection;
out vec3 v_color;

void main() {
	gl_Position = u_projection * u_model_view * vec4(a_position, 1.0);
	v_color = a_color;
}
"#;

pub const LINE_FRAGMENT: &str = r#"#version 300 es
precision mediump float;
in vec3 v_color;
uniform float u_opacity;
out vec4 frag_color;

void main() {
	frag_color = vec4(v_color, u_opacity);
}
"#;

/// Brightness multiplier of pulsing points at animation time `time`.
pub fn pulse_factor(time: f32) -> f32 {
	0.7 + 0.3 * (2.0 * time).sin()
}

/// On-screen point size for a vertex at view-space depth `view_z` (negative
/// in front of the camera).
pub fn point_size_for_depth(size: f32, view_z: f32) -> f32 {
	size * (POINT_DEPTH_SCALE / -view_z)
}

/// Radial alpha falloff at `distance` from the sprite center (0..=0.5).
pub fn radial_falloff(distance: f32) -> f32 {
	let t = (distance / 0.5).clamp(0.0, 1.0);
	1.0 - t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pulse_stays_in_range() {
		for step in 0..1000 {
			let p = pulse_factor(step as f32 * 0.01);
			assert!((0.4 - 1e-6..=1.0 + 1e-6).contains(&p));
		}
		assert!((pulse_factor(0.0) - 0.7).abs() < 1e-6);
		assert!((pulse_factor(std::f32::consts::FRAC_PI_4) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn point_size_is_inverse_to_depth() {
		let near = point_size_for_depth(3.0, -50.0);
		let far = point_size_for_depth(3.0, -100.0);
		assert!((near - 18.0).abs() < 1e-5);
		assert!((near / far - 2.0).abs() < 1e-5);
	}

	#[test]
	fn falloff_is_soft_disc() {
		assert_eq!(radial_falloff(0.0), 1.0);
		assert_eq!(radial_falloff(0.5), 0.0);
		assert_eq!(radial_falloff(0.7), 0.0);
		assert!((radial_falloff(0.25) - 0.5).abs() < 1e-6);
	}

	#[test]
	fn sources_declare_shared_attribute_locations() {
		for src in [POINT_VERTEX, LINE_VERTEX] {
			assert!(src.starts_with("#version 300 es"));
			assert!(src.contains(&format!("layout(location = {}) in vec3 a_position", ATTRIB_POSITION)));
			assert!(src.contains(&format!("layout(location = {}) in vec3 a_color", ATTRIB_COLOR)));
		}
	}
}
