//! Pointer gesture recognizer
//!
//! Turns raw press / move / release notifications into activation, drag,
//! click and double-click callbacks.
//!
//! The recognizer listens for presses on one [`Element`]. Once a press is
//! accepted it listens for moves and releases on the element's [`Document`],
//! so a drag keeps being tracked when the pointer leaves the element. Those
//! document listeners are removed at release, and re-registered (remove, then
//! add) at every press in case a previous release never arrived.
//!
//! A press followed by a release with no move in between is a click. When the
//! handler has a double-click callback, the click is deferred by the
//! double-click window: a second click inside the window cancels it and fires
//! the double click instead.

use crate::{
    double_click_timeout, CoordinateData, Document, Element, GestureHandler, ListenerId, Point,
    PointerEvent, PointerEventKind, TimerHandle,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An element and the handler it was attached with
struct Binding {
    element: Rc<Element>,
    handler: Rc<GestureHandler>,
    press_listener: Option<ListenerId>,
}

/// The document-level listener pair owned during a gesture
struct DocumentListeners {
    document: Rc<Document>,
    move_listener: ListenerId,
    release_listener: ListenerId,
}

#[derive(Default)]
struct RecognizerState {
    binding: Option<Binding>,
    document_listeners: Option<DocumentListeners>,
    activation: Option<Point>,
    last: Option<Point>,
    is_activated: bool,
    is_dragging: bool,
    pending_click: Option<TimerHandle>,
}

impl RecognizerState {
    fn handler(&self) -> Option<Rc<GestureHandler>> {
        self.binding
            .as_ref()
            .map(|binding| Rc::clone(&binding.handler))
    }

    fn document(&self) -> Option<Rc<Document>> {
        self.binding
            .as_ref()
            .map(|binding| Rc::clone(binding.element.document()))
    }

    fn init_coordinates(&mut self, position: Point) {
        self.activation = Some(position);
        self.last = Some(position);
    }

    /// Coordinates for `current`, advancing `last`. None without an activation point.
    fn update_coordinates(&mut self, current: Point) -> Option<CoordinateData> {
        let activation = self.activation?;
        let last = self.last.unwrap_or(activation);
        self.last = Some(current);
        Some(CoordinateData::new(activation, last, current))
    }
}

/// What a release resolved to, decided while the state is borrowed and
/// dispatched after the borrow ends
enum ReleaseOutcome {
    None,
    DragEnd(CoordinateData),
    Click,
    DeferClick,
    DoubleClick,
}

/// Recognizes drag, click and double-click gestures on one element at a time
///
/// The recognizer can be re-attached any number of times. Dropping it
/// detaches it.
pub struct GestureRecognizer {
    state: Rc<RefCell<RecognizerState>>,
}

impl GestureRecognizer {
    /// Create an idle recognizer
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RecognizerState::default())),
        }
    }

    /// True if the event carries the additive-selection modifier (Ctrl or Meta)
    ///
    /// Callers use this to extend an existing selection instead of replacing it.
    pub fn is_additive(event: &PointerEvent) -> bool {
        event.modifiers.ctrl || event.modifiers.meta
    }

    /// Bind to `element` with `handler`, replacing any previous binding
    ///
    /// A handler without callbacks is stored but no press listener is
    /// registered, so the recognizer stays inert.
    pub fn attach(&mut self, element: &Rc<Element>, handler: GestureHandler) -> &mut Self {
        self.detach();

        let handler = Rc::new(handler);
        let press_listener = if handler.is_valid() {
            let weak = Rc::downgrade(&self.state);
            Some(element.target().add_listener(
                PointerEventKind::Press,
                Rc::new(move |event: &PointerEvent| handle_press(&weak, event)),
            ))
        } else {
            log::debug!(
                "gesture handler for `{}` has no callbacks; recognizer is inert",
                element.name()
            );
            None
        };

        self.state.borrow_mut().binding = Some(Binding {
            element: Rc::clone(element),
            handler,
            press_listener,
        });
        self
    }

    /// Unbind from the current element
    ///
    /// Removes every listener this recognizer registered and cancels a
    /// deferred click so it can never fire. No-op when nothing is attached.
    pub fn detach(&mut self) {
        let (binding, pending_click) = {
            let mut state = self.state.borrow_mut();
            state.activation = None;
            state.last = None;
            state.is_activated = false;
            state.is_dragging = false;
            (state.binding.take(), state.pending_click.take())
        };

        let Some(binding) = binding else {
            return;
        };

        if let Some(id) = binding.press_listener {
            binding
                .element
                .target()
                .remove_listener(PointerEventKind::Press, id);
        }
        detach_document_listeners(&self.state);

        if let Some(handle) = pending_click {
            binding.element.document().timers().clear_timeout(handle);
        }

        log::trace!("gesture recognizer detached from `{}`", binding.element.name());
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().binding.is_some()
    }

    /// A press was accepted and its release has not been processed yet
    pub fn is_activated(&self) -> bool {
        self.state.borrow().is_activated
    }

    /// The current gesture has moved since its press
    pub fn is_dragging(&self) -> bool {
        self.state.borrow().is_dragging
    }

    /// A click is being held back waiting for a possible second click
    pub fn has_pending_click(&self) -> bool {
        self.state.borrow().pending_click.is_some()
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for GestureRecognizer {
    fn drop(&mut self) {
        self.detach();
    }
}

fn handle_press(weak: &Weak<RefCell<RecognizerState>>, event: &PointerEvent) {
    let Some(state) = weak.upgrade() else {
        return;
    };

    let handler = {
        let mut state = state.borrow_mut();
        state.init_coordinates(event.position);
        state.handler()
    };
    let Some(handler) = handler else {
        return;
    };

    if let Some(activate) = &handler.activate {
        if !activate(event) {
            log::trace!("gesture vetoed at {:?}", event.position);
            return;
        }
    }

    // `activate` may have detached or re-attached this recognizer
    let document = {
        let mut state = state.borrow_mut();
        let still_bound = state
            .binding
            .as_ref()
            .is_some_and(|binding| Rc::ptr_eq(&binding.handler, &handler));
        if !still_bound {
            return;
        }
        state.is_activated = true;
        state.document()
    };
    handler.alter_event_chain(event);
    log::trace!("gesture activated at {:?}", event.position);

    // A release outside the window may never have reached us
    detach_document_listeners(&state);
    if let Some(document) = document {
        attach_document_listeners(&state, weak, document);
    }
}

fn handle_move(weak: &Weak<RefCell<RecognizerState>>, event: &PointerEvent) {
    let Some(state) = weak.upgrade() else {
        return;
    };

    let Some(handler) = state.borrow().handler() else {
        return;
    };
    handler.alter_event_chain(event);

    let coords = {
        let mut state = state.borrow_mut();
        if state.is_activated && !state.is_dragging {
            state.is_dragging = true;
            log::trace!("drag started at {:?}", event.position);
        }
        if state.is_dragging {
            state.update_coordinates(event.position)
        } else {
            None
        }
    };

    if let (Some(coords), Some(drag_move)) = (coords, &handler.drag_move) {
        drag_move(event, &coords);
    }
}

fn handle_release(weak: &Weak<RefCell<RecognizerState>>, event: &PointerEvent) {
    let Some(state) = weak.upgrade() else {
        return;
    };

    let Some(handler) = state.borrow().handler() else {
        return;
    };
    handler.alter_event_chain(event);

    let outcome = {
        let mut state = state.borrow_mut();
        if state.is_dragging {
            match state.update_coordinates(event.position) {
                Some(coords) => ReleaseOutcome::DragEnd(coords),
                None => ReleaseOutcome::None,
            }
        } else if state.is_activated {
            if handler.double_click.is_some() {
                match state.pending_click.take() {
                    Some(handle) => {
                        if let Some(document) = state.document() {
                            document.timers().clear_timeout(handle);
                        }
                        ReleaseOutcome::DoubleClick
                    }
                    None => ReleaseOutcome::DeferClick,
                }
            } else if handler.click.is_some() {
                ReleaseOutcome::Click
            } else {
                ReleaseOutcome::None
            }
        } else {
            ReleaseOutcome::None
        }
    };

    match outcome {
        ReleaseOutcome::None => {}
        ReleaseOutcome::DragEnd(coords) => {
            log::trace!("drag ended with offset {:?}", coords.offset);
            if let Some(drag_move) = &handler.drag_move {
                drag_move(event, &coords);
            }
            if let Some(drag_end) = &handler.drag_end {
                drag_end(event, &coords);
            }
        }
        ReleaseOutcome::Click => {
            if let Some(click) = &handler.click {
                click(event);
            }
        }
        ReleaseOutcome::DeferClick => defer_click(&state, weak, event),
        ReleaseOutcome::DoubleClick => {
            log::trace!("double click at {:?}", event.position);
            if let Some(double_click) = &handler.double_click {
                double_click(event);
            }
        }
    }

    {
        let mut state = state.borrow_mut();
        state.is_activated = false;
        state.is_dragging = false;
    }
    detach_document_listeners(&state);
}

/// Hold the click back for the double-click window
fn defer_click(
    state: &Rc<RefCell<RecognizerState>>,
    weak: &Weak<RefCell<RecognizerState>>,
    event: &PointerEvent,
) {
    let Some(document) = state.borrow().document() else {
        return;
    };

    let weak = weak.clone();
    let event = event.clone();
    let timeout = double_click_timeout();
    let handle = document.timers().set_timeout(timeout, move || {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let handler = {
            let mut state = state.borrow_mut();
            state.pending_click = None;
            state.handler()
        };
        if let Some(click) = handler.as_ref().and_then(|handler| handler.click.as_ref()) {
            click(&event);
        }
    });

    state.borrow_mut().pending_click = Some(handle);
    log::trace!("click deferred for {:?}", timeout);
}

fn attach_document_listeners(
    state: &Rc<RefCell<RecognizerState>>,
    weak: &Weak<RefCell<RecognizerState>>,
    document: Rc<Document>,
) {
    let move_weak = weak.clone();
    let move_listener = document.target().add_listener(
        PointerEventKind::Move,
        Rc::new(move |event: &PointerEvent| handle_move(&move_weak, event)),
    );

    let release_weak = weak.clone();
    let release_listener = document.target().add_listener(
        PointerEventKind::Release,
        Rc::new(move |event: &PointerEvent| handle_release(&release_weak, event)),
    );

    state.borrow_mut().document_listeners = Some(DocumentListeners {
        document,
        move_listener,
        release_listener,
    });
}

fn detach_document_listeners(state: &Rc<RefCell<RecognizerState>>) {
    let listeners = state.borrow_mut().document_listeners.take();
    if let Some(listeners) = listeners {
        let target = listeners.document.target();
        target.remove_listener(PointerEventKind::Move, listeners.move_listener);
        target.remove_listener(PointerEventKind::Release, listeners.release_listener);
        log::debug!("document listeners removed");
    }
}
