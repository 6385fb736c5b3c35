//! Update Strategies
//!
//! One strategy per directive kind. Every strategy performs one synchronous
//! initial write to the view and then registers exactly one subscription or
//! listener that keeps the view current.
//!
//! Ownership of the live channels:
//! - store callbacks hold the node weakly, so the store never keeps a node alive;
//! - node listeners hold the store strongly, which is safe because the store
//!   only reaches nodes through weak handles;
//! - subscriptions are retained on the bound node as guards and released with
//!   it, or when it is dropped.

use serde_json::Value;
use std::rc::Rc;

use crate::diagnostics::{
    Diagnostic, DIAG_MARKUP_FALLBACK, DIAG_MISSING_EVENT_NAME, DIAG_MISSING_HANDLER,
};
use crate::dom::{Event, Node};
use crate::methods::MethodTable;
use crate::options::CompileOptions;
use crate::parse::create_markup_node;
use crate::store::{display_value, release_subtree, ReactiveStore, SubscriptionGuard};

/// Shared state a strategy binds against.
pub struct BindContext<'a> {
    pub store: &'a Rc<dyn ReactiveStore>,
    pub methods: &'a MethodTable,
    pub options: &'a CompileOptions,
    pub diagnostics: &'a mut Vec<Diagnostic>,
}

impl BindContext<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// One directive occurrence being bound.
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub node: &'a Node,
    /// Store value for `key` at dispatch time.
    pub value: Option<&'a Value>,
    pub key: &'a str,
    pub modifier: Option<&'a str>,
    /// Attribute name as written, for diagnostics.
    pub attribute: &'a str,
}

/// What a strategy did to its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Bound,
    /// Bound, and the binding owns the node's content; its children are model
    /// output and are not compiled.
    BoundContent,
    Skipped,
    /// The node was replaced and is no longer part of the tree.
    Detached,
}

pub trait UpdateStrategy {
    fn apply(&self, cx: &mut BindContext<'_>, binding: Binding<'_>) -> Applied;
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEXT
// ═══════════════════════════════════════════════════════════════════════════════

/// `v-text`: the node's text content follows the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSync;

fn write_text(node: &Node, text: &str) {
    for replaced in node.set_text_content(text) {
        release_subtree(&replaced);
    }
}

impl UpdateStrategy for TextSync {
    fn apply(&self, cx: &mut BindContext<'_>, binding: Binding<'_>) -> Applied {
        write_text(binding.node, &display_value(binding.value));

        let target = binding.node.downgrade();
        let subscription = cx.store.subscribe(
            binding.key,
            Rc::new(move |value: &Value| {
                if let Some(node) = target.upgrade() {
                    write_text(&node, &display_value(Some(value)));
                }
            }),
        );
        binding
            .node
            .retain_subscription(SubscriptionGuard::new(cx.store, subscription));

        tracing::debug!(key = binding.key, "bound text directive");
        Applied::BoundContent
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TWO-WAY VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// `v-model`: model→view through a subscription, view→model through the
/// input listener.
///
/// The listener writes the node's value back under the same key, which fires
/// this binding's own subscription with an identical value. `set_value` is a
/// no-op for identical values and the store contract makes identical writes
/// silent, so the echo ends there.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueSync;

impl UpdateStrategy for ValueSync {
    fn apply(&self, cx: &mut BindContext<'_>, binding: Binding<'_>) -> Applied {
        binding.node.set_value(&display_value(binding.value));

        let target = binding.node.downgrade();
        let subscription = cx.store.subscribe(
            binding.key,
            Rc::new(move |value: &Value| {
                if let Some(node) = target.upgrade() {
                    node.set_value(&display_value(Some(value)));
                }
            }),
        );
        binding
            .node
            .retain_subscription(SubscriptionGuard::new(cx.store, subscription));

        let target = binding.node.downgrade();
        let store = Rc::clone(cx.store);
        let key = binding.key.to_string();
        binding.node.add_event_listener(
            &cx.options.input_event,
            Rc::new(move |_: &Event| {
                if let Some(node) = target.upgrade() {
                    store.set(&key, Value::String(node.value()));
                }
            }),
        );

        tracing::debug!(key = binding.key, "bound two-way value directive");
        Applied::Bound
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT BINDING
// ═══════════════════════════════════════════════════════════════════════════════

/// `v-on:<event>`: attaches the model method named by the key.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventBinding;

impl UpdateStrategy for EventBinding {
    fn apply(&self, cx: &mut BindContext<'_>, binding: Binding<'_>) -> Applied {
        let Some(event) = binding.modifier.filter(|m| !m.is_empty()) else {
            tracing::warn!(directive = binding.attribute, "event binding without an event name");
            cx.report(
                Diagnostic::new(
                    DIAG_MISSING_EVENT_NAME,
                    format!("`{}` does not name an event", binding.attribute),
                )
                .with_key(binding.key)
                .with_directive(binding.attribute),
            );
            return Applied::Skipped;
        };

        let Some(handler) = cx.methods.get(binding.key) else {
            tracing::warn!(method = binding.key, "cannot find method for event binding");
            cx.report(
                Diagnostic::new(
                    DIAG_MISSING_HANDLER,
                    format!("cannot find method `{}`", binding.key),
                )
                .with_key(binding.key)
                .with_directive(binding.attribute),
            );
            return Applied::Skipped;
        };

        let store = Rc::clone(cx.store);
        binding.node.add_event_listener(
            event,
            Rc::new(move |e: &Event| handler(store.as_ref(), e)),
        );

        tracing::debug!(method = binding.key, event, "bound event directive");
        Applied::Bound
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RAW MARKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// `v-html`: replaces the node with an element built from the value's markup.
/// Applied once; no subscription is registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupReplace;

impl UpdateStrategy for MarkupReplace {
    fn apply(&self, cx: &mut BindContext<'_>, binding: Binding<'_>) -> Applied {
        let Some(parent) = binding.node.parent() else {
            tracing::debug!(key = binding.key, "markup directive on a detached node");
            return Applied::Skipped;
        };

        let markup = display_value(binding.value);
        let replacement = create_markup_node(&markup, cx.options.markup_wrapper.as_ref());
        if replacement.fallback {
            tracing::warn!(key = binding.key, "markup is not a single node, injecting as text");
            cx.report(
                Diagnostic::new(
                    DIAG_MARKUP_FALLBACK,
                    format!("value of `{}` was injected as plain text", binding.key),
                )
                .with_key(binding.key)
                .with_directive(binding.attribute),
            );
        }

        parent.insert_before(replacement.node, binding.node);
        parent.remove_child(binding.node);
        release_subtree(binding.node);

        tracing::debug!(key = binding.key, "replaced node with injected markup");
        Applied::Detached
    }
}
