//! Winit input adapter for dragkit
//!
//! Converts winit window events into dragkit pointer events and routes them
//! the way a browser would: presses go to the element under the cursor and
//! bubble to the document, moves and releases go to the document.

use dragkit::{
    Document, Element, Modifiers, MouseButton, Point, PointerEvent, PointerEventKind, Rect,
};
use std::rc::Rc;
use std::time::Instant;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::ModifiersState;

/// An element and the window area it occupies
#[derive(Debug, Clone)]
pub struct Region {
    pub rect: Rect,
    pub element: Rc<Element>,
}

/// Routes winit pointer input into a [`Document`] and its elements
#[derive(Debug)]
pub struct PointerRouter {
    document: Rc<Document>,
    /// Later regions are on top
    regions: Vec<Region>,
    cursor: Option<Point>,
    last_position: Point,
    modifiers: Modifiers,
    last_button: MouseButton,
}

impl PointerRouter {
    pub fn new(document: Rc<Document>) -> Self {
        Self {
            document,
            regions: Vec::new(),
            cursor: None,
            last_position: Point::zero(),
            modifiers: Modifiers::NONE,
            last_button: MouseButton::Left,
        }
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// Add a region on top of the existing ones
    pub fn add_region(&mut self, rect: Rect, element: Rc<Element>) {
        self.regions.push(Region { rect, element });
    }

    pub fn clear_regions(&mut self) {
        self.regions.clear();
    }

    /// Cursor position in window coordinates, if the cursor is inside the window
    pub fn cursor(&self) -> Option<Point> {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Topmost region containing `point`
    pub fn hit_test(&self, point: Point) -> Option<&Region> {
        self.regions
            .iter()
            .rfind(|region| region.rect.contains(point))
    }

    /// Process a winit WindowEvent
    ///
    /// The timer clock is brought up to `Instant::now()` first, so deferred
    /// clicks are scheduled against wall-clock time. Returns true if a
    /// listener called `prevent_default` on the resulting pointer event.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.advance_timers(Instant::now());

        match event {
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(Point {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::CursorLeft { .. } => {
                self.pointer_left();
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = convert_mouse_button(*button);
                match state {
                    ElementState::Pressed => self.button_pressed(button),
                    ElementState::Released => self.button_released(button),
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(convert_modifiers(modifiers.state()));
                false
            }
            _ => false,
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// The cursor moved to `position`
    pub fn pointer_moved(&mut self, position: Point) -> bool {
        self.cursor = Some(position);
        self.last_position = position;
        let event = self.event(PointerEventKind::Move, position, self.last_button);
        self.document.dispatch(&event);
        event.is_default_prevented()
    }

    /// The cursor left the window. A drag in progress keeps going.
    pub fn pointer_left(&mut self) {
        self.cursor = None;
    }

    /// A button went down at the current cursor position
    ///
    /// Dispatched to the topmost region under the cursor, then to the
    /// document unless a listener stopped propagation.
    pub fn button_pressed(&mut self, button: MouseButton) -> bool {
        let Some(position) = self.cursor else {
            log::debug!("ignoring {:?} press with no cursor position", button);
            return false;
        };
        self.last_button = button;

        let event = self.event(PointerEventKind::Press, position, button);
        if let Some(region) = self.hit_test(position) {
            region.element.dispatch(&event);
        }
        if !event.is_propagation_stopped() {
            self.document.dispatch(&event);
        }
        event.is_default_prevented()
    }

    /// A button went up; delivered to the document at the last known position
    pub fn button_released(&mut self, button: MouseButton) -> bool {
        let event = self.event(PointerEventKind::Release, self.last_position, button);
        self.document.dispatch(&event);
        event.is_default_prevented()
    }

    /// Run deferred work (pending clicks) that is due at `now`
    pub fn advance_timers(&self, now: Instant) -> usize {
        self.document.timers().advance_to(now)
    }

    /// When the event loop next needs to wake up for deferred work
    pub fn next_timer_deadline(&self) -> Option<Instant> {
        self.document.timers().next_deadline()
    }

    fn event(&self, kind: PointerEventKind, position: Point, button: MouseButton) -> PointerEvent {
        PointerEvent::new(kind, position)
            .with_button(button)
            .with_modifiers(self.modifiers)
    }
}

/// Convert winit MouseButton to dragkit MouseButton
pub fn convert_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n as u8),
    }
}

/// Convert winit ModifiersState to dragkit Modifiers
pub fn convert_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragkit::{GestureHandler, GestureRecognizer};
    use std::cell::RefCell;
    use std::time::Duration;

    fn router_with_two_regions() -> (PointerRouter, Rc<Element>, Rc<Element>) {
        let document = Document::new();
        let back = document.create_element("back");
        let front = document.create_element("front");

        let mut router = PointerRouter::new(document);
        router.add_region(Rect::from_min_size([0.0, 0.0], [200.0, 200.0]), back.clone());
        router.add_region(Rect::from_min_size([50.0, 50.0], [50.0, 50.0]), front.clone());
        (router, back, front)
    }

    #[test]
    fn test_convert_mouse_button() {
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Left),
            MouseButton::Left
        );
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Forward),
            MouseButton::Other(4)
        );
        assert_eq!(
            convert_mouse_button(winit::event::MouseButton::Other(7)),
            MouseButton::Other(7)
        );
    }

    #[test]
    fn test_convert_modifiers() {
        let modifiers = convert_modifiers(ModifiersState::CONTROL | ModifiersState::SUPER);
        assert!(modifiers.ctrl);
        assert!(modifiers.meta);
        assert!(!modifiers.shift);
        assert!(!modifiers.alt);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let (router, back, front) = router_with_two_regions();

        let hit = router.hit_test(Point::new(60.0, 60.0)).map(|r| r.element.clone());
        assert!(hit.is_some_and(|element| Rc::ptr_eq(&element, &front)));

        let hit = router.hit_test(Point::new(10.0, 10.0)).map(|r| r.element.clone());
        assert!(hit.is_some_and(|element| Rc::ptr_eq(&element, &back)));

        assert!(router.hit_test(Point::new(300.0, 10.0)).is_none());
    }

    #[test]
    fn test_press_without_cursor_is_ignored() {
        let (mut router, _back, front) = router_with_two_regions();
        let pressed = Rc::new(RefCell::new(0));

        let counter = pressed.clone();
        front.target().add_listener(
            PointerEventKind::Press,
            Rc::new(move |_: &PointerEvent| *counter.borrow_mut() += 1),
        );

        router.button_pressed(MouseButton::Left);
        assert_eq!(*pressed.borrow(), 0);

        router.pointer_moved(Point::new(60.0, 60.0));
        router.button_pressed(MouseButton::Left);
        assert_eq!(*pressed.borrow(), 1);
    }

    #[test]
    fn test_drag_continues_outside_window() {
        let (mut router, _back, front) = router_with_two_regions();
        let offsets = Rc::new(RefCell::new(Vec::new()));
        let ended = Rc::new(RefCell::new(false));

        let (o, e) = (offsets.clone(), ended.clone());
        let mut recognizer = GestureRecognizer::new();
        recognizer.attach(
            &front,
            GestureHandler::new()
                .on_drag_move(move |_, coords| o.borrow_mut().push(coords.offset))
                .on_drag_end(move |_, _| *e.borrow_mut() = true)
                .with_prevent_default(true),
        );

        router.pointer_moved(Point::new(60.0, 60.0));
        assert!(router.button_pressed(MouseButton::Left));
        assert!(router.pointer_moved(Point::new(150.0, 60.0)));
        router.pointer_left();
        assert!(router.button_released(MouseButton::Left));

        assert_eq!(
            *offsets.borrow(),
            vec![Point::new(90.0, 0.0), Point::new(90.0, 0.0)]
        );
        assert!(*ended.borrow());
    }

    #[test]
    fn test_stop_propagation_keeps_press_from_document() {
        let (mut router, _back, front) = router_with_two_regions();
        let document_presses = Rc::new(RefCell::new(0));

        let counter = document_presses.clone();
        router.document().target().add_listener(
            PointerEventKind::Press,
            Rc::new(move |_: &PointerEvent| *counter.borrow_mut() += 1),
        );

        let mut recognizer = GestureRecognizer::new();
        recognizer.attach(
            &front,
            GestureHandler::new()
                .on_click(|_| {})
                .with_stop_propagation(true),
        );

        router.pointer_moved(Point::new(10.0, 10.0));
        router.button_pressed(MouseButton::Left);
        router.button_released(MouseButton::Left);
        assert_eq!(*document_presses.borrow(), 1);

        router.pointer_moved(Point::new(60.0, 60.0));
        router.button_pressed(MouseButton::Left);
        router.button_released(MouseButton::Left);
        assert_eq!(*document_presses.borrow(), 1);
    }

    #[test]
    fn test_modifiers_reach_handlers() {
        let (mut router, _back, front) = router_with_two_regions();
        let additive = Rc::new(RefCell::new(None));

        let seen = additive.clone();
        let mut recognizer = GestureRecognizer::new();
        recognizer.attach(
            &front,
            GestureHandler::new().on_click(move |event| {
                *seen.borrow_mut() = Some(GestureRecognizer::is_additive(event));
            }),
        );

        router.set_modifiers(Modifiers::NONE.with_ctrl(true));
        router.pointer_moved(Point::new(60.0, 60.0));
        router.button_pressed(MouseButton::Left);
        router.button_released(MouseButton::Left);

        assert_eq!(*additive.borrow(), Some(true));
    }

    #[test]
    fn test_timers_driven_by_router() {
        let (mut router, _back, front) = router_with_two_regions();
        let clicks = Rc::new(RefCell::new(0));

        let counter = clicks.clone();
        let mut recognizer = GestureRecognizer::new();
        recognizer.attach(
            &front,
            GestureHandler::new()
                .on_click(move |_| *counter.borrow_mut() += 1)
                .on_double_click(|_| {}),
        );

        router.pointer_moved(Point::new(60.0, 60.0));
        router.button_pressed(MouseButton::Left);
        router.button_released(MouseButton::Left);

        let deadline = router.next_timer_deadline();
        assert!(deadline.is_some());
        assert_eq!(*clicks.borrow(), 0);

        let now = router.document().timers().now();
        assert_eq!(router.advance_timers(now + Duration::from_secs(1)), 1);
        assert_eq!(*clicks.borrow(), 1);
        assert!(router.next_timer_deadline().is_none());
    }
}
