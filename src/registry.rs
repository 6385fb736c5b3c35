//! Directive Registry: a lookup table from directive kind to update strategy.

use std::collections::HashMap;
use std::fmt;

use crate::directive::DirectiveKind;
use crate::strategy::{EventBinding, MarkupReplace, TextSync, UpdateStrategy, ValueSync};

pub struct Registry {
    strategies: HashMap<DirectiveKind, Box<dyn UpdateStrategy>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// The four builtin strategies: text, model, on, html.
    pub fn standard() -> Self {
        Self::empty()
            .with_strategy(DirectiveKind::Text, TextSync)
            .with_strategy(DirectiveKind::Model, ValueSync)
            .with_strategy(DirectiveKind::On, EventBinding)
            .with_strategy(DirectiveKind::Html, MarkupReplace)
    }

    /// Register `strategy` for `kind`, replacing any previous one.
    pub fn with_strategy<S: UpdateStrategy + 'static>(
        mut self,
        kind: DirectiveKind,
        strategy: S,
    ) -> Self {
        self.strategies.insert(kind, Box::new(strategy));
        self
    }

    pub fn get(&self, kind: DirectiveKind) -> Option<&dyn UpdateStrategy> {
        self.strategies.get(&kind).map(|s| s.as_ref())
    }

    pub fn contains(&self, kind: DirectiveKind) -> bool {
        self.strategies.contains_key(&kind)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&'static str> =
            self.strategies.keys().map(DirectiveKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("Registry").field("kinds", &kinds).finish()
    }
}
