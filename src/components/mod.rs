//! UI components.

pub mod backdrop;
