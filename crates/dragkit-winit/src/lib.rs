//! # dragkit-winit
//!
//! Winit backend for dragkit: routes window pointer events into a
//! [`dragkit::Document`] and drives its timers from the event loop.

mod input;

pub use input::*;

// Re-export the core crate so hosts only need one dependency
pub use dragkit;
