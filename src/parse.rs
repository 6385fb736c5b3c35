//! Parse Module
//!
//! Builds host-tree nodes from markup strings with html5ever. Used both to load a
//! view template and to construct the replacement node for raw-markup injection.

use html5ever::{parse_fragment, LocalName, Namespace, ParseOpts, QualName};
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tendril::TendrilSink;

use crate::diagnostics::CompileError;
use crate::dom::Node;
use crate::options::MarkupWrapper;

lazy_static! {
    /// Fragments are parsed as if they were the contents of a `<body>`.
    static ref BODY_CONTEXT: QualName = QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from("body"),
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOM CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Convert an rcdom node into host nodes. Comments, doctypes and processing
/// instructions produce nothing; documents flatten into their children.
fn parse_dom_node(handle: &Handle) -> Vec<Node> {
    match &handle.data {
        NodeData::Document => handle
            .children
            .borrow()
            .iter()
            .flat_map(parse_dom_node)
            .collect(),

        NodeData::Text { contents } => vec![Node::text(contents.borrow().to_string())],

        NodeData::Element { name, attrs, .. } => {
            let element = Node::element(name.local.to_string());
            for attr in attrs.borrow().iter() {
                element.set_attribute(&attr.name.local, &attr.value);
            }
            for child in handle.children.borrow().iter() {
                for node in parse_dom_node(child) {
                    element.append_child(node);
                }
            }
            vec![element]
        }

        NodeData::Doctype { .. }
        | NodeData::Comment { .. }
        | NodeData::ProcessingInstruction { .. } => vec![],
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN PARSING FUNCTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse an HTML fragment into top-level host nodes, in document order.
pub fn parse_fragment_nodes(markup: &str) -> Vec<Node> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        BODY_CONTEXT.clone(),
        vec![],
    )
    .one(markup);

    // The fragment parser roots its output in a synthetic <html> element.
    let document = dom.document.children.borrow();
    let nodes: Vec<Node> = match document.first() {
        Some(root) => root
            .children
            .borrow()
            .iter()
            .flat_map(parse_dom_node)
            .collect(),
        None => Vec::new(),
    };
    nodes
}

/// Parse a view template. The first top-level element becomes the view root;
/// surrounding whitespace and text are discarded.
pub fn parse_template(markup: &str) -> Result<Node, CompileError> {
    parse_fragment_nodes(markup)
        .into_iter()
        .find(Node::is_element)
        .ok_or(CompileError::MissingRoot)
}

/// Replacement node produced for a raw-markup directive.
#[derive(Debug)]
pub struct MarkupNode {
    pub node: Node,
    /// True when the markup could not become a single node and was kept as text.
    pub fallback: bool,
}

/// Build the node injected in place of a raw-markup directive.
///
/// With a wrapper, the parsed fragment becomes the wrapper's children and the
/// result is always an element. Without one, a fragment of exactly one node is
/// returned as-is and anything else falls back to a text node holding `markup`.
pub fn create_markup_node(markup: &str, wrapper: Option<&MarkupWrapper>) -> MarkupNode {
    let nodes = parse_fragment_nodes(markup);

    if let Some(wrapper) = wrapper {
        let element = Node::element(wrapper.tag.as_str());
        if let Some(class) = &wrapper.class {
            element.set_attribute("class", class);
        }
        for node in nodes {
            element.append_child(node);
        }
        return MarkupNode {
            node: element,
            fallback: false,
        };
    }

    match <[Node; 1]>::try_from(nodes) {
        Ok([node]) => MarkupNode {
            node,
            fallback: false,
        },
        Err(_) => MarkupNode {
            node: Node::text(markup),
            fallback: true,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
