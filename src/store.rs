//! Reactive Store Contract
//!
//! The compiler reads model values and subscribes to their changes through
//! [`ReactiveStore`]; it never intercepts property access itself.
//!
//! ## Collaborator Invariants
//!
//! 1. **Same-value writes are silent**: `set(key, v)` where `v` equals the current
//!    value MUST NOT notify observers. Two-way bindings write the view's value back
//!    into the model and rely on this to terminate.
//! 2. **Registration order**: observers of one key fire in the order they subscribed.
//! 3. **Re-entrancy**: observers may call `get`, `set` and `subscribe` while being notified.
//!    A nested `set` that changes the key being delivered supersedes the outer delivery;
//!    no observer may be left with the older value.
//!
//! [`Model`] is the in-memory implementation of this contract.

use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dom::Node;

pub type ChangeCallback = Rc<dyn Fn(&Value)>;

/// Handle for one registered observer. Released with [`ReactiveStore::unsubscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    key: String,
}

impl Subscription {
    pub fn new(id: u64, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A subscription owned by a node. Unsubscribes when released or dropped, so a
/// tree that is dropped without an explicit release leaves no observers behind.
pub struct SubscriptionGuard {
    store: Weak<dyn ReactiveStore>,
    subscription: Option<Subscription>,
}

impl SubscriptionGuard {
    pub fn new(store: &Rc<dyn ReactiveStore>, subscription: Subscription) -> Self {
        Self {
            store: Rc::downgrade(store),
            subscription: Some(subscription),
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    /// Unsubscribe now. Returns false when the store is gone or the
    /// subscription was already released.
    pub fn release(mut self) -> bool {
        self.unsubscribe()
    }

    fn unsubscribe(&mut self) -> bool {
        match (self.subscription.take(), self.store.upgrade()) {
            (Some(subscription), Some(store)) => store.unsubscribe(&subscription),
            _ => false,
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionGuard")
            .field("subscription", &self.subscription)
            .finish()
    }
}

pub trait ReactiveStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&self, key: &str, value: Value);

    fn subscribe(&self, key: &str, callback: ChangeCallback) -> Subscription;

    /// Returns false when the subscription was already released.
    fn unsubscribe(&self, subscription: &Subscription) -> bool;
}

/// String form of a model value as the view shows it.
///
/// Missing and `null` values render empty; strings render unquoted.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Release every subscription retained by `node` and its descendants and drop
/// their event listeners.
///
/// Returns the number of subscriptions released.
pub fn release_subtree(node: &Node) -> usize {
    let mut released = 0;
    for n in std::iter::once(node.clone()).chain(node.descendants()) {
        for guard in n.take_subscriptions() {
            if guard.release() {
                released += 1;
            }
        }
        n.clear_event_listeners();
    }
    released
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY MODEL
// ═══════════════════════════════════════════════════════════════════════════════

/// A flat key/value model with per-key observers.
#[derive(Default)]
pub struct Model {
    data: RefCell<HashMap<String, Value>>,
    observers: RefCell<HashMap<String, Vec<(u64, ChangeCallback)>>>,
    next_id: Cell<u64>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; each top-level member becomes one key.
    /// Non-object values produce an empty model.
    pub fn from_json(data: Value) -> Self {
        let model = Self::new();
        if let Value::Object(map) = data {
            model.data.borrow_mut().extend(map);
        }
        model
    }

    pub fn with(self, key: &str, value: impl Into<Value>) -> Self {
        self.data.borrow_mut().insert(key.to_string(), value.into());
        self
    }

    pub fn subscriber_count(&self, key: &str) -> usize {
        self.observers.borrow().get(key).map_or(0, Vec::len)
    }

    /// Snapshot of the current data as a JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .data
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(map)
    }
}

impl ReactiveStore for Model {
    fn get(&self, key: &str) -> Option<Value> {
        self.data.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        {
            let mut data = self.data.borrow_mut();
            if data.get(key) == Some(&value) {
                return;
            }
            data.insert(key.to_string(), value.clone());
        }

        let callbacks: Vec<ChangeCallback> = self
            .observers
            .borrow()
            .get(key)
            .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default();

        tracing::trace!(key, observers = callbacks.len(), "model value changed");
        for callback in callbacks {
            // A nested write has already delivered a newer value to everyone.
            if self.data.borrow().get(key) != Some(&value) {
                tracing::trace!(key, "superseded by a nested write");
                break;
            }
            callback(&value);
        }
    }

    fn subscribe(&self, key: &str, callback: ChangeCallback) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers
            .borrow_mut()
            .entry(key.to_string())
            .or_default()
            .push((id, callback));
        Subscription::new(id, key)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> bool {
        // Dropping a callback can drop a node, whose guards unsubscribe again;
        // removed callbacks are dropped only after the borrow ends.
        let removed: Vec<(u64, ChangeCallback)> = {
            let mut observers = self.observers.borrow_mut();
            let Some(list) = observers.get_mut(subscription.key()) else {
                return false;
            };
            let (removed, kept) = std::mem::take(list)
                .into_iter()
                .partition(|(id, _)| *id == subscription.id());
            *list = kept;
            if list.is_empty() {
                observers.remove(subscription.key());
            }
            removed
        };
        !removed.is_empty()
    }
}
