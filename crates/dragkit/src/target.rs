//! Listener registry shared by elements and the document

use crate::{PointerEvent, PointerEventKind};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// A pointer event callback registered on an [`EventTarget`]
pub type Listener = Rc<dyn Fn(&PointerEvent)>;

/// Identifies one registration on one [`EventTarget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Per-kind lists of pointer listeners
///
/// All methods take `&self`; listeners are free to add or remove listeners on
/// the same target while a dispatch is running.
pub struct EventTarget {
    next_id: Cell<u64>,
    listeners: RefCell<[Vec<(ListenerId, Listener)>; 3]>,
}

impl EventTarget {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new([Vec::new(), Vec::new(), Vec::new()]),
        }
    }

    /// Register a listener for one kind of event
    pub fn add_listener(&self, kind: PointerEventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut()[kind.index()].push((id, listener));
        id
    }

    /// Remove a registration. Returns false if it was not registered.
    pub fn remove_listener(&self, kind: PointerEventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let list = &mut listeners[kind.index()];
        match list.iter().position(|(existing, _)| *existing == id) {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_listener(&self, kind: PointerEventKind, id: ListenerId) -> bool {
        self.listeners.borrow()[kind.index()]
            .iter()
            .any(|(existing, _)| *existing == id)
    }

    pub fn listener_count(&self, kind: PointerEventKind) -> usize {
        self.listeners.borrow()[kind.index()].len()
    }

    /// Invoke every listener registered for `event.kind`, in registration order
    ///
    /// The list is snapshotted before the first call. Listeners added during
    /// the dispatch are not invoked; listeners removed during the dispatch are
    /// skipped. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> =
            self.listeners.borrow()[event.kind.index()].clone();

        let mut invoked = 0;
        for (id, listener) in snapshot {
            if !self.has_listener(event.kind, id) {
                continue;
            }
            listener(event);
            invoked += 1;
        }
        invoked
    }
}

impl Default for EventTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("press", &self.listener_count(PointerEventKind::Press))
            .field("move", &self.listener_count(PointerEventKind::Move))
            .field("release", &self.listener_count(PointerEventKind::Release))
            .finish()
    }
}
