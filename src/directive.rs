//! Attribute/Directive Parser
//!
//! An attribute is a directive iff its name starts with the directive prefix.
//! After the prefix comes the raw directive name, optionally compound:
//!
//! ```text
//! v-text="msg"         base = text, modifier = None
//! v-on:click="save"    base = on,   modifier = Some("click")
//! v-on:click:once="f"  base = on,   modifier = Some("click:once")
//! ```
//!
//! Only the first separator splits; the rest stays part of the modifier.

use crate::dom::Node;
use crate::options::CompileOptions;

/// The directive kinds the runtime knows how to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Text,
    Model,
    On,
    Html,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 4] = [
        DirectiveKind::Text,
        DirectiveKind::Model,
        DirectiveKind::On,
        DirectiveKind::Html,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(DirectiveKind::Text),
            "model" => Some(DirectiveKind::Model),
            "on" => Some(DirectiveKind::On),
            "html" => Some(DirectiveKind::Html),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveKind::Text => "text",
            DirectiveKind::Model => "model",
            DirectiveKind::On => "on",
            DirectiveKind::Html => "html",
        }
    }
}

/// A directive attribute decomposed for dispatch. Recomputed on every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Full attribute name as written, e.g. `v-on:click`.
    pub attribute: String,
    pub base_name: String,
    /// Resolved at parse time; `None` for base names nothing is registered under.
    pub kind: Option<DirectiveKind>,
    pub modifier: Option<String>,
    /// Model key named by the attribute value.
    pub key: String,
}

/// Decompose an attribute into a directive, or `None` if it is a plain attribute.
pub fn parse_directive(name: &str, value: &str, options: &CompileOptions) -> Option<Directive> {
    let raw = name.strip_prefix(options.directive_prefix.as_str())?;

    let (base_name, modifier) = match raw.split_once(options.modifier_separator) {
        Some((base, modifier)) => (base, Some(modifier.to_string())),
        None => (raw, None),
    };

    Some(Directive {
        attribute: name.to_string(),
        base_name: base_name.to_string(),
        kind: DirectiveKind::from_name(base_name),
        modifier,
        key: value.to_string(),
    })
}

/// Every directive on `node`, in attribute declaration order.
pub fn parse_directives(node: &Node, options: &CompileOptions) -> Vec<Directive> {
    node.attributes()
        .iter()
        .filter_map(|attr| parse_directive(&attr.name, &attr.value, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, value: &str) -> Option<Directive> {
        parse_directive(name, value, &CompileOptions::default())
    }

    #[test]
    fn test_plain_attribute_is_not_a_directive() {
        assert!(parse("class", "big").is_none());
        assert!(parse("data-v-text", "x").is_none());
    }

    #[test]
    fn test_simple_directive() {
        let d = parse("v-text", "msg").unwrap();
        assert_eq!(d.base_name, "text");
        assert_eq!(d.kind, Some(DirectiveKind::Text));
        assert_eq!(d.modifier, None);
        assert_eq!(d.key, "msg");
    }

    #[test]
    fn test_compound_directive() {
        let d = parse("v-on:click", "save").unwrap();
        assert_eq!(d.kind, Some(DirectiveKind::On));
        assert_eq!(d.modifier.as_deref(), Some("click"));
        assert_eq!(d.attribute, "v-on:click");
    }

    #[test]
    fn test_extra_separators_stay_in_modifier() {
        let d = parse("v-on:click:once", "save").unwrap();
        assert_eq!(d.base_name, "on");
        assert_eq!(d.modifier.as_deref(), Some("click:once"));
    }

    #[test]
    fn test_unknown_base_name_has_no_kind() {
        let d = parse("v-foo", "x").unwrap();
        assert_eq!(d.base_name, "foo");
        assert_eq!(d.kind, None);

        let empty = parse("v-", "x").unwrap();
        assert_eq!(empty.base_name, "");
        assert_eq!(empty.kind, None);
    }

    #[test]
    fn test_custom_prefix_and_separator() {
        let options = CompileOptions {
            directive_prefix: "x-".to_string(),
            modifier_separator: '.',
            ..CompileOptions::default()
        };
        let d = parse_directive("x-on.keyup", "go", &options).unwrap();
        assert_eq!(d.kind, Some(DirectiveKind::On));
        assert_eq!(d.modifier.as_deref(), Some("keyup"));
        assert!(parse_directive("v-text", "msg", &options).is_none());
    }

    #[test]
    fn test_parse_directives_in_declaration_order() {
        let node = Node::element("input")
            .with_attribute("v-model", "a")
            .with_attribute("type", "text")
            .with_attribute("v-on:input", "b");
        let kinds: Vec<_> = parse_directives(&node, &CompileOptions::default())
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(kinds, vec![Some(DirectiveKind::Model), Some(DirectiveKind::On)]);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in DirectiveKind::ALL {
            assert_eq!(DirectiveKind::from_name(kind.as_str()), Some(kind));
        }
    }
}
