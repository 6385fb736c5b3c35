//! Text Interpolator
//!
//! Finds the first `{{ key }}` marker in a text node, substitutes the model value
//! and keeps the node in sync. Only the first marker of a node is bound.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::rc::Rc;

use crate::diagnostics::CompileError;
use crate::dom::Node;
use crate::store::{display_value, ReactiveStore, SubscriptionGuard};

lazy_static! {
    /// Non-greedy marker pattern for the default `{{ }}` delimiters.
    static ref DEFAULT_MARKER_RE: Regex = Regex::new(r"\{\{(.+?)\}\}").unwrap();
}

/// A located marker within a text template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Trimmed model key.
    pub key: String,
    /// Byte range of the whole marker, delimiters included.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Interpolator {
    pattern: Regex,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_MARKER_RE.clone(),
        }
    }
}

impl Interpolator {
    pub fn new(open: &str, close: &str) -> Result<Self, CompileError> {
        if open == "{{" && close == "}}" {
            return Ok(Self::default());
        }
        let pattern = Regex::new(&format!(
            "{}(.+?){}",
            regex::escape(open),
            regex::escape(close)
        ))?;
        Ok(Self { pattern })
    }

    /// The first marker in `template` with a non-blank key, if any. Blank
    /// markers are skipped and stay literal.
    pub fn find(&self, template: &str) -> Option<Marker> {
        self.pattern.captures_iter(template).find_map(|caps| {
            let whole = caps.get(0)?;
            let key = caps.get(1)?.as_str().trim();
            if key.is_empty() {
                return None;
            }
            Some(Marker {
                key: key.to_string(),
                start: whole.start(),
                end: whole.end(),
            })
        })
    }

    /// Replace the first bound marker of `template` with `value`, keeping the
    /// surrounding text. A template without one is returned unchanged.
    pub fn render(&self, template: &str, value: &str) -> String {
        match self.find(template) {
            Some(marker) => marker.render(template, value),
            None => template.to_string(),
        }
    }
}

impl Marker {
    /// Substitute `value` for this marker in the template it was found in.
    /// Always applied to the original template, never to an already
    /// substituted string.
    pub fn render(&self, template: &str, value: &str) -> String {
        let mut out = String::with_capacity(template.len() + value.len());
        out.push_str(&template[..self.start]);
        out.push_str(value);
        out.push_str(&template[self.end..]);
        out
    }
}

/// Bind the first marker of a text node to the store.
///
/// Writes the substituted payload and subscribes to the marker's key; every
/// change re-renders from the node's original payload. Returns the bound marker,
/// or `None` when the node holds no marker and was left untouched.
pub fn bind_text(
    store: &Rc<dyn ReactiveStore>,
    interpolator: &Interpolator,
    node: &Node,
) -> Option<Marker> {
    let template = node.payload()?;
    let marker = interpolator.find(&template)?;

    let current = store.get(&marker.key);
    node.set_payload(&marker.render(&template, &display_value(current.as_ref())));

    let target = node.downgrade();
    let bound = marker.clone();
    let subscription = store.subscribe(
        &marker.key,
        Rc::new(move |value: &Value| {
            if let Some(node) = target.upgrade() {
                node.set_payload(&bound.render(&template, &display_value(Some(value))));
            }
        }),
    );
    node.retain_subscription(SubscriptionGuard::new(store, subscription));

    tracing::debug!(key = %marker.key, "bound interpolation");
    Some(marker)
}
