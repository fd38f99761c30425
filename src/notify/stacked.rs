//! Flat event names with priority-ordered, short-circuiting listeners.
//!
//! Each subscription carries a signed level. Firing a name invokes its
//! listeners from the highest level to the lowest; equal levels keep
//! insertion order. A listener returning [`Flow::Stop`] claims the event:
//! the remaining (lower) listeners are skipped and `fire` returns `false`.

#[cfg(test)]
#[path = "stacked_test.rs"]
mod stacked_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use super::{Flow, ListenerId};

type Callback<P> = Rc<RefCell<dyn FnMut(&P) -> Flow>>;

struct Entry<P> {
    id: ListenerId,
    level: i32,
    callback: Callback<P>,
}

/// Priority dispatcher. See the module docs.
pub struct StackedNotifier<P> {
    events: RefCell<HashMap<String, Vec<Entry<P>>>>,
    next_id: Cell<u64>,
}

impl<P: 'static> StackedNotifier<P> {
    #[must_use]
    pub fn new() -> Self {
        Self { events: RefCell::new(HashMap::new()), next_id: Cell::new(1) }
    }

    /// Subscribe at level 0.
    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: FnMut(&P) -> Flow + 'static,
    {
        self.on_level(name, 0, callback)
    }

    /// Subscribe at `level`; higher levels run first.
    pub fn on_level<F>(&self, name: &str, level: i32, callback: F) -> ListenerId
    where
        F: FnMut(&P) -> Flow + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Callback<P> = Rc::new(RefCell::new(callback));
        let mut events = self.events.borrow_mut();
        let entries = events.entry(name.to_owned()).or_default();
        let at = entries.iter().position(|e| e.level < level).unwrap_or(entries.len());
        entries.insert(at, Entry { id, level, callback });
        id
    }

    /// Unsubscribe. Returns `false` if `id` was not registered on `name`.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        let mut events = self.events.borrow_mut();
        let Some(entries) = events.get_mut(name) else {
            warn!(name, "notify: off for unknown stacked event");
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn clear(&self, name: &str) {
        self.events.borrow_mut().remove(name);
    }

    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.events.borrow().get(name).map_or(0, Vec::len)
    }

    /// Dispatch `payload` to `name`'s listeners. Returns `false` if the event was claimed.
    pub fn fire(&self, name: &str, payload: &P) -> bool {
        let chain: Vec<(i32, Callback<P>)> = self
            .events
            .borrow()
            .get(name)
            .map(|entries| entries.iter().map(|e| (e.level, Rc::clone(&e.callback))).collect())
            .unwrap_or_default();
        for (level, callback) in chain {
            let Ok(mut f) = callback.try_borrow_mut() else {
                warn!(name, level, "notify: skipping re-entered stacked listener");
                continue;
            };
            if f(payload) == Flow::Stop {
                trace!(name, level, "notify: event claimed");
                return false;
            }
        }
        true
    }
}

impl<P: 'static> Default for StackedNotifier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for StackedNotifier<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackedNotifier")
            .field("events", &self.events.borrow().len())
            .finish_non_exhaustive()
    }
}
