//! # MVVM Template Compiler
//!
//! Walks a view tree once and wires every directive attribute and interpolation
//! marker to a live model key, so later model changes reach the view without a
//! re-render.
//!
//! ## Directives
//!
//! | Attribute            | Effect                                                       |
//! |----------------------|--------------------------------------------------------------|
//! | `v-text="key"`       | text content follows `key`                                   |
//! | `v-model="key"`      | value field follows `key`; input events write back to `key`  |
//! | `v-on:event="method"`| the model method `method` handles `event`                    |
//! | `v-html="key"`       | the node is replaced by markup parsed from `key`, once       |
//!
//! Text nodes bind their first `{{ key }}` marker.
//!
//! ## Collaborators
//!
//! The compiler only reads and subscribes through [`ReactiveStore`]. The store MUST
//! treat same-value writes as silent; two-way bindings depend on it to terminate.
//! [`Model`] is an in-memory store that honours this.
//!
//! ```
//! use std::rc::Rc;
//! use mvvm_compiler::{parse_template, Compiler, MethodTable, Model, ReactiveStore};
//! use serde_json::json;
//!
//! let model = Rc::new(Model::new().with("name", "Ada"));
//! let root = parse_template(r#"<div><p>Hello, {{ name }}!</p></div>"#).unwrap();
//!
//! Compiler::new(model.clone(), MethodTable::new()).compile(&root).unwrap();
//! assert_eq!(root.text_content(), "Hello, Ada!");
//!
//! model.set("name", json!("Grace"));
//! assert_eq!(root.text_content(), "Hello, Grace!");
//! ```

mod compiler;
mod diagnostics;
mod directive;
mod dom;
mod interpolate;
mod methods;
mod options;
mod parse;
mod registry;
mod store;
mod strategy;
mod visitor;

#[cfg(test)]
mod safety_tests;

pub use compiler::{CompileReport, Compiler};
pub use diagnostics::{
    CompileError, Diagnostic, DIAG_MARKUP_FALLBACK, DIAG_MISSING_EVENT_NAME,
    DIAG_MISSING_HANDLER, DIAG_UNKNOWN_DIRECTIVE,
};
pub use directive::{parse_directive, parse_directives, Directive, DirectiveKind};
pub use dom::{Attribute, Event, Listener, ListenerId, Node, WeakNode};
pub use interpolate::{bind_text, Interpolator, Marker};
pub use methods::{Handler, MethodTable};
pub use options::{CompileOptions, MarkupWrapper};
pub use parse::{create_markup_node, parse_fragment_nodes, parse_template, MarkupNode};
pub use registry::Registry;
pub use store::{
    display_value, release_subtree, ChangeCallback, Model, ReactiveStore, Subscription,
    SubscriptionGuard,
};
pub use strategy::{
    Applied, BindContext, Binding, EventBinding, MarkupReplace, TextSync, UpdateStrategy,
    ValueSync,
};
pub use visitor::{walk_children, walk_node, NodeVisitor};
