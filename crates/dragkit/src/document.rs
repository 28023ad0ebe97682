//! Session-scoped pointer surface and the elements that belong to it
//!
//! A [`Document`] is the shared, process/session-wide surface: it receives
//! pointer moves and releases wherever the pointer is, and it owns the timer
//! queue used for deferred work. An [`Element`] is a press source inside a
//! document (a widget, a table cell, a region of a window).

use crate::{EventTarget, PointerEvent, TimerQueue};
use std::rc::Rc;

/// Shared listener surface plus timer queue
#[derive(Debug, Default)]
pub struct Document {
    target: EventTarget,
    timers: TimerQueue,
}

impl Document {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Create a document whose timer queue uses the given queue (for a custom start time)
    pub fn with_timers(timers: TimerQueue) -> Rc<Self> {
        Rc::new(Self {
            target: EventTarget::new(),
            timers,
        })
    }

    /// Document-level listener registry (moves and releases during a gesture)
    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    /// Create a new element owned by this document
    pub fn create_element(self: &Rc<Self>, name: impl Into<String>) -> Rc<Element> {
        Rc::new(Element {
            name: name.into(),
            target: EventTarget::new(),
            document: Rc::clone(self),
        })
    }

    /// Deliver an event to document-level listeners
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        self.target.dispatch(event)
    }
}

/// A press source belonging to a [`Document`]
#[derive(Debug)]
pub struct Element {
    name: String,
    target: EventTarget,
    document: Rc<Document>,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &EventTarget {
        &self.target
    }

    pub fn document(&self) -> &Rc<Document> {
        &self.document
    }

    /// Deliver an event to this element's listeners
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        self.target.dispatch(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PointerEventKind;

    #[test]
    fn test_element_owned_by_document() {
        let document = Document::new();
        let element = document.create_element("cell");

        assert_eq!(element.name(), "cell");
        assert!(Rc::ptr_eq(element.document(), &document));
    }

    #[test]
    fn test_element_and_document_registries_are_separate() {
        let document = Document::new();
        let element = document.create_element("header");

        element
            .target()
            .add_listener(PointerEventKind::Press, Rc::new(|_: &PointerEvent| {}));

        assert_eq!(element.target().listener_count(PointerEventKind::Press), 1);
        assert_eq!(document.target().listener_count(PointerEventKind::Press), 0);
        assert_eq!(document.dispatch(&PointerEvent::press(0.0, 0.0)), 0);
        assert_eq!(element.dispatch(&PointerEvent::press(0.0, 0.0)), 1);
    }
}
