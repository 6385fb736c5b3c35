//! Model method table consulted by event bindings.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::Event;
use crate::store::ReactiveStore;

/// A model method. Receives the model as its receiver so it can read and write state.
pub type Handler = Rc<dyn Fn(&dyn ReactiveStore, &Event)>;

#[derive(Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, Handler>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&dyn ReactiveStore, &Event) + 'static,
    {
        self.insert(name, method);
        self
    }

    pub fn insert<F>(&mut self, name: &str, method: F)
    where
        F: Fn(&dyn ReactiveStore, &Event) + 'static,
    {
        self.methods.insert(name.to_string(), Rc::new(method));
    }

    pub fn get(&self, name: &str) -> Option<Handler> {
        self.methods.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}
