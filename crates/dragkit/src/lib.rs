//! # dragkit
//!
//! Backend-agnostic pointer gesture recognition.
//!
//! This crate turns raw press / move / release notifications into semantic
//! gestures (activation, drag, click, double click). It has no dependency on
//! any windowing library; backend crates like `dragkit-winit` feed it events.
//!
//! ## Core Types
//!
//! - [`GestureRecognizer`] - Classifies gestures on one element at a time
//! - [`GestureHandler`] - The callbacks a recognizer dispatches to
//! - [`CoordinateData`] - Activation, last and current positions with deltas
//!
//! ## Event Plumbing
//!
//! - [`PointerEvent`] - A single pointer notification
//! - [`EventTarget`] - Listener registry with explicit add/remove
//! - [`Document`] - Session-wide surface for moves, releases and timers
//! - [`Element`] - A press source inside a document
//! - [`TimerQueue`] - Cancellable timers on a host-driven clock

mod document;
mod gesture;
mod input;
mod primitives;
mod recognizer;
mod target;
mod timer;

pub use document::*;
pub use gesture::*;
pub use input::*;
pub use primitives::*;
pub use recognizer::*;
pub use target::*;
pub use timer::*;
