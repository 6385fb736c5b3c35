//! # Compiler
//!
//! Walks a view root once, binding every directive and interpolation marker to
//! the store so later model changes reach the view without a re-render.
//!
//! ## Pass Invariants
//!
//! 1. **Document order**: children are visited depth-first in document order; every
//!    node reachable from the root is visited exactly once.
//! 2. **Directive order**: directives on one element are dispatched in attribute
//!    declaration order, each immediately as it is parsed.
//! 3. **Local failure**: unknown directives, missing handlers and unrepresentable
//!    markup are recorded as diagnostics; they never abort the pass.
//! 4. **Replacement**: a node replaced by injected markup is detached; its remaining
//!    directives are not dispatched, its children are not walked, and the injected
//!    markup itself is not compiled.
//! 5. **Literal text**: children written by a text directive are model output. They
//!    are not walked, so markers inside a model value stay literal.
//! 6. **Release**: subscriptions live on the node that owns them and are released
//!    when the node is detached through the compiler, replaced, or dropped.

use serde::Serialize;
use std::rc::Rc;

use crate::diagnostics::{CompileError, Diagnostic, DIAG_UNKNOWN_DIRECTIVE};
use crate::directive::{parse_directives, Directive};
use crate::dom::Node;
use crate::interpolate::{bind_text, Interpolator};
use crate::methods::MethodTable;
use crate::options::CompileOptions;
use crate::registry::Registry;
use crate::store::{release_subtree, ReactiveStore};
use crate::strategy::{Applied, BindContext, Binding};
use crate::visitor::{walk_children, walk_node, NodeVisitor};

/// Summary of one compile pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileReport {
    /// Nodes visited below the root.
    pub visited_nodes: usize,
    /// Directives whose strategy bound successfully.
    pub bindings: usize,
    /// Text nodes bound to a model key.
    pub interpolations: usize,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Compiler {
    store: Rc<dyn ReactiveStore>,
    methods: MethodTable,
    options: CompileOptions,
    registry: Registry,
}

impl Compiler {
    pub fn new(store: Rc<dyn ReactiveStore>, methods: MethodTable) -> Self {
        Self {
            store,
            methods,
            options: CompileOptions::default(),
            registry: Registry::standard(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn store(&self) -> &Rc<dyn ReactiveStore> {
        &self.store
    }

    /// Compile everything below `root`.
    pub fn compile(&self, root: &Node) -> Result<CompileReport, CompileError> {
        if !root.is_element() {
            return Err(CompileError::RootNotElement);
        }
        self.options.validate()?;
        let (open, close) = &self.options.delimiters;
        let interpolator = Interpolator::new(open, close)?;

        let mut pass = CompilePass {
            compiler: self,
            interpolator,
            report: CompileReport::default(),
        };
        pass.visit_children(root);

        tracing::debug!(
            visited = pass.report.visited_nodes,
            bindings = pass.report.bindings,
            interpolations = pass.report.interpolations,
            diagnostics = pass.report.diagnostics.len(),
            "compile pass finished"
        );
        Ok(pass.report)
    }

    /// Look up the directive's strategy and apply it with the store's current
    /// value for its key. The directive carries the key, base name and modifier
    /// parsed from the attribute. Unknown directives are ignored.
    pub fn dispatch(
        &self,
        node: &Node,
        directive: &Directive,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Applied {
        let Some(strategy) = directive.kind.and_then(|kind| self.registry.get(kind)) else {
            tracing::debug!(directive = %directive.attribute, "ignoring unknown directive");
            diagnostics.push(
                Diagnostic::new(
                    DIAG_UNKNOWN_DIRECTIVE,
                    format!("unknown directive `{}`", directive.attribute),
                )
                .with_key(&directive.key)
                .with_directive(&directive.attribute),
            );
            return Applied::Skipped;
        };

        let value = self.store.get(&directive.key);
        let mut cx = BindContext {
            store: &self.store,
            methods: &self.methods,
            options: &self.options,
            diagnostics,
        };
        strategy.apply(
            &mut cx,
            Binding {
                node,
                value: value.as_ref(),
                key: &directive.key,
                modifier: directive.modifier.as_deref(),
                attribute: &directive.attribute,
            },
        )
    }

    /// Release every subscription and listener held by `node` and its subtree.
    pub fn release(&self, node: &Node) -> usize {
        release_subtree(node)
    }

    /// Remove `node` from the tree and release what it held.
    pub fn detach(&self, node: &Node) -> usize {
        node.detach();
        self.release(node)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE PASS
// ═══════════════════════════════════════════════════════════════════════════════

struct CompilePass<'a> {
    compiler: &'a Compiler,
    interpolator: Interpolator,
    report: CompileReport,
}

impl NodeVisitor for CompilePass<'_> {
    fn visit_node(&mut self, node: &Node) {
        self.report.visited_nodes += 1;
        tracing::trace!(tag = node.tag().unwrap_or("#text"), "visit");
        walk_node(self, node);
    }

    fn visit_text(&mut self, text: &Node) {
        if bind_text(&self.compiler.store, &self.interpolator, text).is_some() {
            self.report.interpolations += 1;
        }
    }

    fn visit_element(&mut self, element: &Node) {
        let mut owns_content = false;
        for directive in parse_directives(element, &self.compiler.options) {
            match self
                .compiler
                .dispatch(element, &directive, &mut self.report.diagnostics)
            {
                Applied::Bound => self.report.bindings += 1,
                Applied::BoundContent => {
                    self.report.bindings += 1;
                    owns_content = true;
                }
                Applied::Skipped => {}
                Applied::Detached => {
                    self.report.bindings += 1;
                    return;
                }
            }
        }
        if !owns_content {
            walk_children(self, element);
        }
    }
}
