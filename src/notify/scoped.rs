//! Hierarchical broadcast keyed by dot-delimited paths.
//!
//! Names form a trie: `"reloc.end"` lives under the `"reloc"` node. Firing a
//! path invokes, in order, the listeners registered on the root (empty path),
//! then on each ancestor path, then on the exact path. Firing `"reloc"` never
//! reaches listeners registered only on `"reloc.end"`.
//!
//! A listener returning [`Flow::Stop`] short-circuits the rest of that one
//! broadcast. Listeners that already ran are not undone.

#[cfg(test)]
#[path = "scoped_test.rs"]
mod scoped_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{trace, warn};

use super::{Flow, ListenerId};

type Callback<P> = Rc<RefCell<dyn FnMut(&str, &P) -> Flow>>;

struct Listener<P> {
    id: ListenerId,
    callback: Callback<P>,
}

struct Node<P> {
    listeners: Vec<Listener<P>>,
    children: HashMap<String, Node<P>>,
}

impl<P> Node<P> {
    fn new() -> Self {
        Self { listeners: Vec::new(), children: HashMap::new() }
    }

    fn find(&self, name: &str) -> Option<&Self> {
        let mut node = self;
        for seg in segments(name) {
            node = node.children.get(seg)?;
        }
        Some(node)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Self> {
        let mut node = self;
        for seg in segments(name) {
            node = node.children.get_mut(seg)?;
        }
        Some(node)
    }

    fn find_or_insert(&mut self, name: &str) -> &mut Self {
        let mut node = self;
        for seg in segments(name) {
            node = node.children.entry(seg.to_owned()).or_insert_with(Self::new);
        }
        node
    }
}

fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split('.').filter(|s| !s.is_empty())
}

fn join(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_owned(),
        (_, true) => prefix.to_owned(),
        _ => format!("{prefix}.{name}"),
    }
}

/// Trie-structured broadcaster. See the module docs for dispatch order.
pub struct ScopedNotifier<P> {
    root: RefCell<Node<P>>,
    next_id: Cell<u64>,
}

impl<P: 'static> ScopedNotifier<P> {
    #[must_use]
    pub fn new() -> Self {
        Self { root: RefCell::new(Node::new()), next_id: Cell::new(1) }
    }

    /// Subscribe to `name` and every path below it. The empty name subscribes to everything.
    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: FnMut(&str, &P) -> Flow + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let callback: Callback<P> = Rc::new(RefCell::new(callback));
        self.root
            .borrow_mut()
            .find_or_insert(name)
            .listeners
            .push(Listener { id, callback });
        id
    }

    /// Unsubscribe. Returns `false` if `id` was not registered on `name`.
    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        let mut root = self.root.borrow_mut();
        let Some(node) = root.find_mut(name) else {
            warn!(name, "notify: off for unknown scoped event");
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|l| l.id != id);
        node.listeners.len() != before
    }

    /// Drop every listener registered exactly on `name` (descendants are kept).
    pub fn clear(&self, name: &str) {
        if let Some(node) = self.root.borrow_mut().find_mut(name) {
            node.listeners.clear();
        }
    }

    /// Listeners registered exactly on `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.root.borrow().find(name).map_or(0, |n| n.listeners.len())
    }

    /// Broadcast `payload` along `name`. Returns `false` if a listener stopped the broadcast.
    pub fn fire(&self, name: &str, payload: &P) -> bool {
        let chain = self.collect(name);
        trace!(name, listeners = chain.len(), "notify: scoped fire");
        for callback in chain {
            let Ok(mut f) = callback.try_borrow_mut() else {
                warn!(name, "notify: skipping re-entered scoped listener");
                continue;
            };
            if f(name, payload) == Flow::Stop {
                return false;
            }
        }
        true
    }

    /// A view that prefixes every name with `prefix`.
    #[must_use]
    pub fn scope(self: &Rc<Self>, prefix: &str) -> Scope<P> {
        Scope { notifier: Rc::clone(self), prefix: prefix.to_owned() }
    }

    fn collect(&self, name: &str) -> Vec<Callback<P>> {
        let root = self.root.borrow();
        let mut chain: Vec<Callback<P>> = root.listeners.iter().map(|l| Rc::clone(&l.callback)).collect();
        let mut node = &*root;
        for seg in segments(name) {
            let Some(child) = node.children.get(seg) else {
                break;
            };
            chain.extend(child.listeners.iter().map(|l| Rc::clone(&l.callback)));
            node = child;
        }
        chain
    }
}

impl<P: 'static> Default for ScopedNotifier<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for ScopedNotifier<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedNotifier").field("next_id", &self.next_id.get()).finish_non_exhaustive()
    }
}

/// Prefixed view over a shared [`ScopedNotifier`].
///
/// `notifier.scope("memory").on("switch.after", ..)` is the same subscription
/// as `notifier.on("memory.switch.after", ..)`.
pub struct Scope<P> {
    notifier: Rc<ScopedNotifier<P>>,
    prefix: String,
}

impl<P: 'static> Scope<P> {
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn on<F>(&self, name: &str, callback: F) -> ListenerId
    where
        F: FnMut(&str, &P) -> Flow + 'static,
    {
        self.notifier.on(&join(&self.prefix, name), callback)
    }

    pub fn off(&self, name: &str, id: ListenerId) -> bool {
        self.notifier.off(&join(&self.prefix, name), id)
    }

    pub fn fire(&self, name: &str, payload: &P) -> bool {
        self.notifier.fire(&join(&self.prefix, name), payload)
    }

    /// Nested scope: `scope("a").scope("b")` prefixes with `"a.b"`.
    #[must_use]
    pub fn scope(&self, prefix: &str) -> Self {
        Self { notifier: Rc::clone(&self.notifier), prefix: join(&self.prefix, prefix) }
    }
}

impl<P> fmt::Debug for Scope<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}
