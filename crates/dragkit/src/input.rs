//! Backend-agnostic pointer input types
//!
//! Windowing backends (winit, a browser shim, a test harness) convert their own
//! mouse events into [`PointerEvent`]s and dispatch them through an
//! [`EventTarget`](crate::EventTarget).

use crate::Point;
use std::cell::Cell;

/// Backend-agnostic mouse button representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    /// Left mouse button
    #[default]
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
    /// Additional mouse buttons (back, forward, etc.)
    Other(u8),
}

/// Modifier keys held while a pointer event was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Whether Shift is held down
    pub shift: bool,
    /// Whether Ctrl is held down
    pub ctrl: bool,
    /// Whether Alt/Option is held down
    pub alt: bool,
    /// Whether Meta/Super/Command is held down
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }
}

/// Low-level pointer notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// A button went down
    Press,
    /// The pointer moved
    Move,
    /// A button went up
    Release,
}

impl PointerEventKind {
    pub(crate) const fn index(self) -> usize {
        match self {
            PointerEventKind::Press => 0,
            PointerEventKind::Move => 1,
            PointerEventKind::Release => 2,
        }
    }
}

/// A single pointer notification
///
/// Listeners receive events by shared reference. The default-prevented and
/// propagation-stopped flags live in cells so any listener can set them, and
/// the dispatcher (or the backend) reads them afterwards.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    /// What happened
    pub kind: PointerEventKind,
    /// Pointer position in the source's coordinate space
    pub position: Point,
    /// Which button this event concerns (the last pressed button for moves)
    pub button: MouseButton,
    /// Modifier keys held at the time of the event
    pub modifiers: Modifiers,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Point) -> Self {
        Self {
            kind,
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn press(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Press, Point::new(x, y))
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Move, Point::new(x, y))
    }

    pub fn release(x: f32, y: f32) -> Self {
        Self::new(PointerEventKind::Release, Point::new(x, y))
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Ask the backend not to run its default behavior for this event
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    /// Stop the event from reaching further targets
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_flags() {
        let event = PointerEvent::press(1.0, 2.0);
        assert!(!event.is_default_prevented());
        assert!(!event.is_propagation_stopped());

        event.prevent_default();
        assert!(event.is_default_prevented());
        assert!(!event.is_propagation_stopped());

        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn test_event_builders() {
        let event = PointerEvent::release(3.0, 4.0)
            .with_button(MouseButton::Right)
            .with_modifiers(Modifiers::NONE.with_meta(true));

        assert_eq!(event.kind, PointerEventKind::Release);
        assert_eq!(event.position, Point::new(3.0, 4.0));
        assert_eq!(event.button, MouseButton::Right);
        assert!(event.modifiers.meta);
        assert!(!event.modifiers.ctrl);
    }
}
