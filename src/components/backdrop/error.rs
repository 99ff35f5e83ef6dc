//! Error types for backdrop modules.
//!
//! The decorative layer never takes the host page down with it, so most of
//! these are logged and absorbed rather than propagated. They surface to the
//! host only through [`ModuleStatus`](super::ModuleStatus).

use std::fmt;

/// Errors that can occur while configuring or mounting a backdrop module.
#[derive(Clone, Debug, PartialEq)]
pub enum BackdropError {
	/// A configuration value was out of range and has been replaced by its default.
	Configuration(String),
	/// The rendering surface or its GPU resources could not be created.
	ResourceAcquisition(String),
	/// `mount` was called on a module that is not unmounted.
	AlreadyMounted,
}

impl fmt::Display for BackdropError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BackdropError::Configuration(msg) => write!(f, "invalid configuration: {}", msg),
			BackdropError::ResourceAcquisition(msg) => {
				write!(f, "rendering surface unavailable: {}", msg)
			}
			BackdropError::AlreadyMounted => write!(f, "module is already mounted"),
		}
	}
}

impl std::error::Error for BackdropError {}

impl BackdropError {
	/// Shorthand for a [`BackdropError::ResourceAcquisition`] from any message.
	pub fn resource(msg: impl Into<String>) -> Self {
		BackdropError::ResourceAcquisition(msg.into())
	}
}
