//! Document memories: isolated copies of every registered state field.
//!
//! DESIGN
//! ======
//! A field is registered once with [`MemoryManager::malloc`], which records a
//! prototype and seeds every existing memory with a clone of it. Each new
//! memory starts from clones of all prototypes. The caller keeps a
//! [`CurrentMemoryHandle`], which resolves the active memory on every access,
//! so the owner reads and writes "its" value while the manager swaps the
//! backing store underneath.
//!
//! Values are stored type-erased as `Box<dyn MemoryValue>`; any `Clone +
//! 'static` type qualifies, and cloning is an explicit `Clone` call rather
//! than a reflective object walk.
//!
//! TRADE-OFFS
//! ==========
//! The store sits behind `Rc<RefCell<..>>`. Handle accessors use `try_borrow`
//! and return `None` (with a warning) instead of panicking if the store is
//! already borrowed. Switch hooks run with their field value temporarily
//! moved out of the store, so a hook may read other handles, but reading its
//! own field from inside the hook yields `None`.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier of one memory (document).
pub type MemoryId = Uuid;

/// A value that can live in a memory: cloneable and downcastable.
pub trait MemoryValue {
    fn clone_box(&self) -> Box<dyn MemoryValue>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + 'static> MemoryValue for T {
    fn clone_box(&self) -> Box<dyn MemoryValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type Hook = Box<dyn FnMut(&mut dyn MemoryValue)>;

/// A field's hook and value, moved out of the store while the hook runs.
type Hooked = (String, Hook, Box<dyn MemoryValue>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HookKind {
    Before,
    After,
}

struct Field {
    name: String,
    proto: Box<dyn MemoryValue>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl Field {
    fn hook_mut(&mut self, kind: HookKind) -> &mut Option<Hook> {
        match kind {
            HookKind::Before => &mut self.before,
            HookKind::After => &mut self.after,
        }
    }
}

struct Memory {
    id: MemoryId,
    values: HashMap<String, Box<dyn MemoryValue>>,
}

struct Store {
    fields: Vec<Field>,
    memories: Vec<Memory>,
    current: MemoryId,
}

impl Store {
    fn new_memory(&self) -> Memory {
        let values = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), (*f.proto).clone_box()))
            .collect();
        Memory { id: Uuid::new_v4(), values }
    }

    fn memory(&self, id: MemoryId) -> Option<&Memory> {
        self.memories.iter().find(|m| m.id == id)
    }

    fn memory_mut(&mut self, id: MemoryId) -> Option<&mut Memory> {
        self.memories.iter_mut().find(|m| m.id == id)
    }

    fn current_value(&self, name: &str) -> Option<&dyn MemoryValue> {
        self.memory(self.current)?.values.get(name).map(|v| &**v)
    }

    fn current_value_mut(&mut self, name: &str) -> Option<&mut Box<dyn MemoryValue>> {
        let current = self.current;
        self.memory_mut(current)?.values.get_mut(name)
    }

    /// Move every hooked field's hook and value for `memory` out of the store.
    fn take_hooked(&mut self, memory: MemoryId, kind: HookKind) -> Vec<Hooked> {
        let mut taken = Vec::new();
        let Some(idx) = self.memories.iter().position(|m| m.id == memory) else {
            return taken;
        };
        for field in &mut self.fields {
            let Some(hook) = field.hook_mut(kind).take() else {
                continue;
            };
            match self.memories[idx].values.remove(&field.name) {
                Some(value) => taken.push((field.name.clone(), hook, value)),
                None => *field.hook_mut(kind) = Some(hook),
            }
        }
        taken
    }

    fn put_back(&mut self, memory: MemoryId, kind: HookKind, done: Vec<Hooked>) {
        for (name, hook, value) in done {
            if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
                *field.hook_mut(kind) = Some(hook);
            }
            if let Some(m) = self.memory_mut(memory) {
                m.values.insert(name, value);
            }
        }
    }
}

/// Owner of every memory. Clones share the same store.
#[derive(Clone)]
pub struct MemoryManager {
    inner: Rc<RefCell<Store>>,
}

impl fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(store) => f
                .debug_struct("MemoryManager")
                .field("current", &store.current)
                .field("memories", &store.memories.len())
                .field("fields", &store.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>())
                .finish(),
            Err(_) => f.write_str("MemoryManager { <busy> }"),
        }
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryManager {
    /// A manager holding one empty memory, which is current.
    #[must_use]
    pub fn new() -> Self {
        let first = Memory { id: Uuid::new_v4(), values: HashMap::new() };
        let current = first.id;
        Self { inner: Rc::new(RefCell::new(Store { fields: Vec::new(), memories: vec![first], current })) }
    }

    /// Register `name` with `proto` as its archetype and seed every memory with a clone.
    ///
    /// A duplicate name keeps the existing field and returns a handle to it.
    pub fn malloc<T: Clone + 'static>(&self, name: &str, proto: T) -> CurrentMemoryHandle<T> {
        self.register(name, Box::new(proto), None, None);
        self.handle(name)
    }

    /// [`MemoryManager::malloc`] with switch hooks. `before` receives the
    /// outgoing memory's value, `after` the incoming one.
    pub fn malloc_with<T, B, A>(&self, name: &str, proto: T, before: B, after: A) -> CurrentMemoryHandle<T>
    where
        T: Clone + 'static,
        B: FnMut(&mut T) + 'static,
        A: FnMut(&mut T) + 'static,
    {
        self.register(name, Box::new(proto), Some(typed_hook(name, before)), Some(typed_hook(name, after)));
        self.handle(name)
    }

    /// A handle for an already registered field.
    #[must_use]
    pub fn handle<T: Clone + 'static>(&self, name: &str) -> CurrentMemoryHandle<T> {
        CurrentMemoryHandle { store: Rc::clone(&self.inner), name: Rc::from(name), _marker: PhantomData }
    }

    fn register(&self, name: &str, proto: Box<dyn MemoryValue>, before: Option<Hook>, after: Option<Hook>) {
        let Ok(mut store) = self.inner.try_borrow_mut() else {
            warn!(field = name, "memory: store busy, malloc dropped");
            return;
        };
        if store.fields.iter().any(|f| f.name == name) {
            warn!(field = name, "memory: duplicate malloc, keeping existing field");
            return;
        }
        for memory in &mut store.memories {
            memory.values.insert(name.to_owned(), (*proto).clone_box());
        }
        store.fields.push(Field { name: name.to_owned(), proto, before, after });
        debug!(field = name, "memory: field registered");
    }

    /// Create a memory seeded from every prototype. Does not switch to it.
    pub fn create_memory(&self) -> Option<MemoryId> {
        let Ok(mut store) = self.inner.try_borrow_mut() else {
            warn!("memory: store busy, create dropped");
            return None;
        };
        let memory = store.new_memory();
        let id = memory.id;
        store.memories.push(memory);
        debug!(%id, "memory: created");
        Some(id)
    }

    /// Make `to` current, running `before` hooks on the outgoing memory and
    /// `after` hooks on the incoming one. Unknown ids are rejected.
    pub fn switch_memory(&self, to: MemoryId) -> bool {
        let from = {
            let Ok(store) = self.inner.try_borrow() else {
                warn!(%to, "memory: store busy, switch dropped");
                return false;
            };
            if store.memory(to).is_none() {
                warn!(%to, "memory: switch to unknown memory");
                return false;
            }
            store.current
        };
        if from == to {
            return true;
        }
        self.run_hooks(from, HookKind::Before);
        if let Ok(mut store) = self.inner.try_borrow_mut() {
            store.current = to;
        } else {
            warn!(%to, "memory: store busy, switch dropped");
            return false;
        }
        self.run_hooks(to, HookKind::After);
        debug!(%from, %to, "memory: switched");
        true
    }

    /// Delete a memory. Deleting the current one switches to a neighbour,
    /// creating a fresh memory first when no other exists.
    pub fn delete_memory(&self, id: MemoryId) -> bool {
        let (is_current, replacement) = {
            let Ok(store) = self.inner.try_borrow() else {
                warn!(%id, "memory: store busy, delete dropped");
                return false;
            };
            let Some(pos) = store.memories.iter().position(|m| m.id == id) else {
                warn!(%id, "memory: delete of unknown memory");
                return false;
            };
            let neighbour = store.memories.get(pos + 1).or_else(|| pos.checked_sub(1).and_then(|p| store.memories.get(p)));
            (store.current == id, neighbour.map(|m| m.id))
        };
        if is_current {
            let Some(next) = replacement.or_else(|| self.create_memory()) else {
                return false;
            };
            if !self.switch_memory(next) {
                return false;
            }
        }
        let Ok(mut store) = self.inner.try_borrow_mut() else {
            warn!(%id, "memory: store busy, delete dropped");
            return false;
        };
        store.memories.retain(|m| m.id != id);
        debug!(%id, remaining = store.memories.len(), "memory: deleted");
        true
    }

    /// The active memory. Falls back to the nil id only if the store is busy.
    #[must_use]
    pub fn current(&self) -> MemoryId {
        self.inner.try_borrow().map_or(Uuid::nil(), |s| s.current)
    }

    /// Memory ids in creation order.
    #[must_use]
    pub fn memory_ids(&self) -> Vec<MemoryId> {
        self.inner.try_borrow().map_or_else(|_| Vec::new(), |s| s.memories.iter().map(|m| m.id).collect())
    }

    #[must_use]
    pub fn contains(&self, id: MemoryId) -> bool {
        self.inner.try_borrow().is_ok_and(|s| s.memory(id).is_some())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.try_borrow().map_or(0, |s| s.memories.len())
    }

    /// Never true in practice: the manager always keeps one memory.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.inner
            .try_borrow()
            .map_or_else(|_| Vec::new(), |s| s.fields.iter().map(|f| f.name.clone()).collect())
    }

    fn run_hooks(&self, memory: MemoryId, kind: HookKind) {
        let taken = match self.inner.try_borrow_mut() {
            Ok(mut store) => store.take_hooked(memory, kind),
            Err(_) => {
                warn!(%memory, ?kind, "memory: store busy, hooks skipped");
                return;
            }
        };
        if taken.is_empty() {
            return;
        }
        let mut done = Vec::with_capacity(taken.len());
        for (name, mut hook, mut value) in taken {
            hook(&mut *value);
            done.push((name, hook, value));
        }
        match self.inner.try_borrow_mut() {
            Ok(mut store) => store.put_back(memory, kind, done),
            Err(_) => warn!(%memory, ?kind, "memory: store busy, hooked values lost"),
        }
    }
}

fn typed_hook<T: 'static>(name: &str, mut f: impl FnMut(&mut T) + 'static) -> Hook {
    let name = name.to_owned();
    Box::new(move |value: &mut dyn MemoryValue| match value.as_any_mut().downcast_mut::<T>() {
        Some(v) => f(v),
        None => warn!(field = %name, "memory: hook type mismatch"),
    })
}

/// Typed view of one field in whichever memory is current.
pub struct CurrentMemoryHandle<T> {
    store: Rc<RefCell<Store>>,
    name: Rc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CurrentMemoryHandle<T> {
    fn clone(&self) -> Self {
        Self { store: Rc::clone(&self.store), name: Rc::clone(&self.name), _marker: PhantomData }
    }
}

impl<T> fmt::Debug for CurrentMemoryHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentMemoryHandle").field("name", &self.name).finish()
    }
}

impl<T: Clone + 'static> CurrentMemoryHandle<T> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the current memory's value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let Ok(store) = self.store.try_borrow() else {
            warn!(field = %self.name, "memory: store busy, read dropped");
            return None;
        };
        let Some(value) = store.current_value(&self.name) else {
            warn!(field = %self.name, "memory: field missing from current memory");
            return None;
        };
        let Some(v) = value.as_any().downcast_ref::<T>() else {
            warn!(field = %self.name, "memory: field type mismatch");
            return None;
        };
        Some(f(v))
    }

    /// Mutate the current memory's value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let Ok(mut store) = self.store.try_borrow_mut() else {
            warn!(field = %self.name, "memory: store busy, write dropped");
            return None;
        };
        let Some(value) = store.current_value_mut(&self.name) else {
            warn!(field = %self.name, "memory: field missing from current memory");
            return None;
        };
        let Some(v) = (**value).as_any_mut().downcast_mut::<T>() else {
            warn!(field = %self.name, "memory: field type mismatch");
            return None;
        };
        Some(f(v))
    }

    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.with(T::clone)
    }

    pub fn set(&self, value: T) -> bool {
        self.with_mut(|v| *v = value).is_some()
    }
}
