//! Gesture handler capability set and per-event coordinate data

use crate::{Point, PointerEvent};
use dragkit_macros::WithBuilders;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default window, in milliseconds, in which a second click counts as a double click
pub const DEFAULT_DOUBLE_CLICK_TIMEOUT_MSEC: u64 = 500;

static DOUBLE_CLICK_TIMEOUT_MSEC: AtomicU64 = AtomicU64::new(DEFAULT_DOUBLE_CLICK_TIMEOUT_MSEC);

/// Current double-click window, shared by every recognizer in the process
pub fn double_click_timeout() -> Duration {
    Duration::from_millis(DOUBLE_CLICK_TIMEOUT_MSEC.load(Ordering::Relaxed))
}

/// Change the double-click window for every recognizer in the process
///
/// Only affects clicks deferred after the call.
pub fn set_double_click_timeout(timeout: Duration) {
    let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    DOUBLE_CLICK_TIMEOUT_MSEC.store(millis, Ordering::Relaxed);
}

/// Pointer positions reported with every drag move and drag end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateData {
    /// Position of the press that started the gesture
    pub activation: Point,
    /// Position of this event
    pub current: Point,
    /// Position of the previous move (or the press, for the first move)
    pub last: Point,
    /// `current - last`
    pub delta: Point,
    /// `current - activation`
    pub offset: Point,
}

impl CoordinateData {
    pub fn new(activation: Point, last: Point, current: Point) -> Self {
        Self {
            activation,
            current,
            last,
            delta: current - last,
            offset: current - activation,
        }
    }
}

pub type ActivateCallback = Rc<dyn Fn(&PointerEvent) -> bool>;
pub type DragCallback = Rc<dyn Fn(&PointerEvent, &CoordinateData)>;
pub type ClickCallback = Rc<dyn Fn(&PointerEvent)>;

/// The callbacks and event-chain flags a recognizer dispatches to
///
/// Every callback is optional. A handler with no callbacks at all is not
/// valid and leaves the recognizer inert.
///
/// ```ignore
/// let handler = GestureHandler::new()
///     .on_activate(|event| event.button == MouseButton::Left)
///     .on_drag_move(|_, coords| println!("moved by {:?}", coords.delta))
///     .on_click(|_| println!("click"))
///     .with_prevent_default(true);
/// ```
#[derive(Clone, Default, WithBuilders)]
pub struct GestureHandler {
    /// Called on press. Returning `false` vetoes the gesture.
    #[with_builders(skip)]
    pub activate: Option<ActivateCallback>,
    /// Called for every move of a drag, and once more at its release
    #[with_builders(skip)]
    pub drag_move: Option<DragCallback>,
    /// Called once when a drag is released
    #[with_builders(skip)]
    pub drag_end: Option<DragCallback>,
    /// Called for a press/release pair without moves
    #[with_builders(skip)]
    pub click: Option<ClickCallback>,
    /// Called instead of two clicks when they land within the double-click window
    #[with_builders(skip)]
    pub double_click: Option<ClickCallback>,
    /// Call `prevent_default` on every event the recognizer handles
    pub prevent_default: bool,
    /// Call `stop_propagation` on every event the recognizer handles
    pub stop_propagation: bool,
}

impl GestureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(mut self, callback: impl Fn(&PointerEvent) -> bool + 'static) -> Self {
        self.activate = Some(Rc::new(callback));
        self
    }

    pub fn on_drag_move(
        mut self,
        callback: impl Fn(&PointerEvent, &CoordinateData) + 'static,
    ) -> Self {
        self.drag_move = Some(Rc::new(callback));
        self
    }

    pub fn on_drag_end(
        mut self,
        callback: impl Fn(&PointerEvent, &CoordinateData) + 'static,
    ) -> Self {
        self.drag_end = Some(Rc::new(callback));
        self
    }

    pub fn on_click(mut self, callback: impl Fn(&PointerEvent) + 'static) -> Self {
        self.click = Some(Rc::new(callback));
        self
    }

    pub fn on_double_click(mut self, callback: impl Fn(&PointerEvent) + 'static) -> Self {
        self.double_click = Some(Rc::new(callback));
        self
    }

    /// A handler is valid when it implements at least one callback
    pub fn is_valid(&self) -> bool {
        self.activate.is_some()
            || self.drag_move.is_some()
            || self.drag_end.is_some()
            || self.click.is_some()
            || self.double_click.is_some()
    }

    /// Apply `prevent_default` / `stop_propagation` to an event per the flags
    pub(crate) fn alter_event_chain(&self, event: &PointerEvent) {
        if self.prevent_default {
            event.prevent_default();
        }
        if self.stop_propagation {
            event.stop_propagation();
        }
    }
}

impl fmt::Debug for GestureHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureHandler")
            .field("activate", &self.activate.is_some())
            .field("drag_move", &self.drag_move.is_some())
            .field("drag_end", &self.drag_end.is_some())
            .field("click", &self.click.is_some())
            .field("double_click", &self.double_click.is_some())
            .field("prevent_default", &self.prevent_default)
            .field("stop_propagation", &self.stop_propagation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_data() {
        let coords = CoordinateData::new(
            Point::new(10.0, 10.0),
            Point::new(15.0, 12.0),
            Point::new(20.0, 15.0),
        );
        assert_eq!(coords.delta, Point::new(5.0, 3.0));
        assert_eq!(coords.offset, Point::new(10.0, 5.0));
        assert_eq!(coords.last, Point::new(15.0, 12.0));
    }

    #[test]
    fn test_handler_validity() {
        assert!(!GestureHandler::new().is_valid());
        assert!(!GestureHandler::new()
            .with_prevent_default(true)
            .with_stop_propagation(true)
            .is_valid());

        assert!(GestureHandler::new().on_activate(|_| true).is_valid());
        assert!(GestureHandler::new().on_drag_move(|_, _| {}).is_valid());
        assert!(GestureHandler::new().on_drag_end(|_, _| {}).is_valid());
        assert!(GestureHandler::new().on_click(|_| {}).is_valid());
        assert!(GestureHandler::new().on_double_click(|_| {}).is_valid());
    }

    #[test]
    fn test_alter_event_chain() {
        let handler = GestureHandler::new().with_stop_propagation(true);
        let event = PointerEvent::moved(0.0, 0.0);
        handler.alter_event_chain(&event);
        assert!(!event.is_default_prevented());
        assert!(event.is_propagation_stopped());
    }
}
