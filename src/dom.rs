//! Host Document Model
//!
//! A mutable UI tree owned by the host: text nodes and element nodes with ordered
//! attributes and children. Nodes are shared handles (`Rc`), parents are weak links.
//!
//! Besides structure, an element carries the host-side state the binding runtime
//! needs: an input-like `value` field, event listeners, and the store subscriptions
//! that keep it in sync (so they can be released when the node is detached).

use lazy_static::lazy_static;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::store::SubscriptionGuard;

lazy_static! {
    /// Elements serialized without a closing tag.
    static ref VOID_TAGS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("area");
        s.insert("base");
        s.insert("br");
        s.insert("col");
        s.insert("embed");
        s.insert("hr");
        s.insert("img");
        s.insert("input");
        s.insert("link");
        s.insert("meta");
        s.insert("source");
        s.insert("track");
        s.insert("wbr");
        s
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTES & EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An interaction event delivered to a node's listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }
}

pub type Listener = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    id: ListenerId,
    kind: String,
    listener: Listener,
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE
// ═══════════════════════════════════════════════════════════════════════════════

enum NodeData {
    Text {
        payload: RefCell<String>,
    },
    Element {
        tag: String,
        attributes: RefCell<Vec<Attribute>>,
        value: RefCell<Option<String>>,
    },
}

struct NodeInner {
    data: NodeData,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<ListenerEntry>>,
    next_listener: Cell<u64>,
    subscriptions: RefCell<Vec<SubscriptionGuard>>,
}

/// Shared handle to a node in the host tree.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

/// Non-owning handle, used by callbacks so they never keep a detached node alive.
#[derive(Clone)]
pub struct WeakNode(Weak<NodeInner>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl Node {
    fn from_data(data: NodeData) -> Self {
        Node(Rc::new(NodeInner {
            data,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            subscriptions: RefCell::new(Vec::new()),
        }))
    }

    pub fn text(payload: impl Into<String>) -> Self {
        Self::from_data(NodeData::Text {
            payload: RefCell::new(payload.into()),
        })
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::from_data(NodeData::Element {
            tag: tag.into(),
            attributes: RefCell::new(Vec::new()),
            value: RefCell::new(None),
        })
    }

    /// Builder-style attribute setter for constructing trees by hand.
    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append for constructing trees by hand.
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.data, NodeData::Text { .. })
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.data, NodeData::Element { .. })
    }

    /// Tag name for elements, `None` for text nodes.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text { .. } => None,
        }
    }

    // ── attributes ──────────────────────────────────────────────────────────

    /// Snapshot of the attributes in declared order.
    pub fn attributes(&self) -> Vec<Attribute> {
        match &self.0.data {
            NodeData::Element { attributes, .. } => attributes.borrow().clone(),
            NodeData::Text { .. } => Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attributes, .. } => attributes
                .borrow()
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.clone()),
            NodeData::Text { .. } => None,
        }
    }

    /// Set an attribute, replacing an existing one of the same name in place.
    /// Ignored on text nodes.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &self.0.data {
            let mut attributes = attributes.borrow_mut();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value.to_string(),
                None => attributes.push(Attribute::new(name, value)),
            }
        }
    }

    // ── structure ───────────────────────────────────────────────────────────

    /// Snapshot of the children in document order.
    pub fn children(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn has_children(&self) -> bool {
        !self.0.children.borrow().is_empty()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// Every descendant in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        fn collect(node: &Node, out: &mut Vec<Node>) {
            for child in node.children() {
                out.push(child.clone());
                collect(&child, out);
            }
        }
        collect(self, &mut out);
        out
    }

    fn index_of(&self, child: &Node) -> Option<usize> {
        self.0.children.borrow().iter().position(|c| c.ptr_eq(child))
    }

    pub fn append_child(&self, child: Node) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child);
    }

    /// Insert `child` immediately before `reference`. Appends when `reference`
    /// is not a child of `self`.
    pub fn insert_before(&self, child: Node, reference: &Node) {
        child.detach();
        let index = self.index_of(reference);
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        let mut children = self.0.children.borrow_mut();
        match index {
            Some(i) => children.insert(i, child),
            None => children.push(child),
        }
    }

    /// Remove `child` from this node. Returns false when it is not a child.
    pub fn remove_child(&self, child: &Node) -> bool {
        let Some(index) = self.index_of(child) else {
            return false;
        };
        self.0.children.borrow_mut().remove(index);
        *child.0.parent.borrow_mut() = Weak::new();
        true
    }

    /// Remove this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    // ── text ────────────────────────────────────────────────────────────────

    /// Text payload of a text node; `None` for elements.
    pub fn payload(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text { payload } => Some(payload.borrow().clone()),
            NodeData::Element { .. } => None,
        }
    }

    /// Overwrite a text node's payload. Returns whether anything changed.
    pub fn set_payload(&self, text: &str) -> bool {
        match &self.0.data {
            NodeData::Text { payload } => {
                if *payload.borrow() == text {
                    return false;
                }
                *payload.borrow_mut() = text.to_string();
                true
            }
            NodeData::Element { .. } => false,
        }
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self) -> String {
        match &self.0.data {
            NodeData::Text { payload } => payload.borrow().clone(),
            NodeData::Element { .. } => self
                .children()
                .iter()
                .map(|c| c.text_content())
                .collect(),
        }
    }

    /// Set the text content. Elements get their children replaced by a single
    /// text node; the replaced children are returned. Setting the content an
    /// element already shows through a single text child is a no-op.
    pub fn set_text_content(&self, text: &str) -> Vec<Node> {
        if self.is_text() {
            self.set_payload(text);
            return Vec::new();
        }

        {
            let children = self.0.children.borrow();
            if children.len() == 1 && children[0].payload().as_deref() == Some(text) {
                return Vec::new();
            }
        }

        let removed: Vec<Node> = self.0.children.borrow_mut().drain(..).collect();
        for child in &removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        if !text.is_empty() {
            self.append_child(Node::text(text));
        }
        removed
    }

    // ── value field ─────────────────────────────────────────────────────────

    /// Current value of an input-like element. Falls back to the `value`
    /// attribute until the field has been written.
    pub fn value(&self) -> String {
        match &self.0.data {
            NodeData::Element { value, .. } => match &*value.borrow() {
                Some(v) => v.clone(),
                None => self.attribute("value").unwrap_or_default(),
            },
            NodeData::Text { .. } => String::new(),
        }
    }

    /// Write the value field. Returns whether anything changed.
    pub fn set_value(&self, new_value: &str) -> bool {
        match &self.0.data {
            NodeData::Element { value, .. } => {
                if self.value() == new_value && value.borrow().is_some() {
                    return false;
                }
                *value.borrow_mut() = Some(new_value.to_string());
                true
            }
            NodeData::Text { .. } => false,
        }
    }

    // ── events ──────────────────────────────────────────────────────────────

    pub fn add_event_listener(&self, kind: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.0.next_listener.get());
        self.0.next_listener.set(id.0 + 1);
        self.0.listeners.borrow_mut().push(ListenerEntry {
            id,
            kind: kind.to_string(),
            listener,
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.0.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|entry| entry.id != id);
        listeners.len() != before
    }

    pub fn clear_event_listeners(&self) {
        self.0.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    /// Run the listeners registered for `event.kind`, in registration order.
    /// Returns how many listeners ran.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        // Snapshot so listeners may add or remove listeners on this node.
        let matching: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|entry| entry.kind == event.kind)
            .map(|entry| entry.listener.clone())
            .collect();
        for listener in &matching {
            listener(event);
        }
        matching.len()
    }

    // ── subscriptions ───────────────────────────────────────────────────────

    /// Tie a store subscription to this node. It is released with the node's
    /// subtree, or when the node itself is dropped.
    pub fn retain_subscription(&self, subscription: SubscriptionGuard) {
        self.0.subscriptions.borrow_mut().push(subscription);
    }

    pub fn subscription_count(&self) -> usize {
        self.0.subscriptions.borrow().len()
    }

    pub fn take_subscriptions(&self) -> Vec<SubscriptionGuard> {
        std::mem::take(&mut *self.0.subscriptions.borrow_mut())
    }

    // ── serialization ───────────────────────────────────────────────────────

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            child.write_html(&mut out);
        }
        out
    }

    fn write_html(&self, out: &mut String) {
        match &self.0.data {
            NodeData::Text { payload } => out.push_str(&escape_text(&payload.borrow())),
            NodeData::Element {
                tag, attributes, ..
            } => {
                out.push('<');
                out.push_str(tag);
                for attr in attributes.borrow().iter() {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attr.value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(tag.to_lowercase().as_str()) {
                    return;
                }
                for child in self.children() {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Node").field(&self.outer_html()).finish()
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn list() -> (Node, Node, Node, Node) {
        let a = Node::element("li").with_child(Node::text("a"));
        let b = Node::element("li").with_child(Node::text("b"));
        let c = Node::element("li").with_child(Node::text("c"));
        let ul = Node::element("ul")
            .with_child(a.clone())
            .with_child(b.clone())
            .with_child(c.clone());
        (ul, a, b, c)
    }

    #[test]
    fn test_insert_before_and_remove_keep_order() {
        let (ul, _a, b, _c) = list();
        let x = Node::element("li").with_child(Node::text("x"));
        ul.insert_before(x.clone(), &b);
        assert_eq!(ul.text_content(), "axbc");
        assert!(x.parent().unwrap().ptr_eq(&ul));

        assert!(ul.remove_child(&b));
        assert!(b.parent().is_none());
        assert_eq!(ul.text_content(), "axc");
        assert!(!ul.remove_child(&b));
    }

    #[test]
    fn test_append_moves_node_between_parents() {
        let (ul, a, _b, _c) = list();
        let other = Node::element("ol");
        other.append_child(a.clone());
        assert_eq!(ul.children().len(), 2);
        assert!(a.parent().unwrap().ptr_eq(&other));
    }

    #[test]
    fn test_set_attribute_keeps_names_unique() {
        let el = Node::element("input").with_attribute("type", "text");
        el.set_attribute("type", "checkbox");
        el.set_attribute("name", "agree");
        assert_eq!(
            el.attributes(),
            vec![
                Attribute::new("type", "checkbox"),
                Attribute::new("name", "agree")
            ]
        );
    }

    #[test]
    fn test_set_text_content_same_value_is_noop() {
        let p = Node::element("p").with_child(Node::text("hi"));
        let first = p.children()[0].clone();
        assert!(p.set_text_content("hi").is_empty());
        assert!(p.children()[0].ptr_eq(&first));

        let removed = p.set_text_content("bye");
        assert_eq!(removed.len(), 1);
        assert_eq!(p.text_content(), "bye");
    }

    #[test]
    fn test_value_falls_back_to_attribute() {
        let input = Node::element("input").with_attribute("value", "seed");
        assert_eq!(input.value(), "seed");
        assert!(input.set_value("typed"));
        assert!(!input.set_value("typed"));
        assert_eq!(input.value(), "typed");
        assert_eq!(input.attribute("value").as_deref(), Some("seed"));
    }

    #[test]
    fn test_dispatch_runs_matching_listeners_in_order() {
        let button = Node::element("button");
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = log.clone();
            button.add_event_listener(
                "click",
                Rc::new(move |_: &Event| log.borrow_mut().push(tag)),
            );
        }
        let other = {
            let log = log.clone();
            button.add_event_listener(
                "input",
                Rc::new(move |_: &Event| log.borrow_mut().push("input")),
            )
        };

        assert_eq!(button.dispatch_event(&Event::new("click")), 2);
        assert_eq!(*log.borrow(), vec!["first", "second"]);

        assert!(button.remove_event_listener(other));
        assert_eq!(button.dispatch_event(&Event::new("input")), 0);
        assert_eq!(button.listener_count("click"), 2);
    }

    #[test]
    fn test_outer_html_escapes_and_handles_void_tags() {
        let div = Node::element("div")
            .with_attribute("title", "a \"b\" & c")
            .with_child(Node::text("1 < 2"))
            .with_child(Node::element("br"));
        assert_eq!(
            div.outer_html(),
            "<div title=\"a &quot;b&quot; &amp; c\">1 &lt; 2<br></div>"
        );
    }

    #[test]
    fn test_descendants_are_in_document_order() {
        let (ul, ..) = list();
        let texts: Vec<String> = ul
            .descendants()
            .iter()
            .map(|n| n.tag().map(str::to_string).unwrap_or_else(|| n.text_content()))
            .collect();
        assert_eq!(texts, vec!["li", "a", "li", "b", "li", "c"]);
    }

    #[test]
    fn test_weak_handle_does_not_keep_node_alive() {
        let weak = Node::element("span").downgrade();
        assert!(weak.upgrade().is_none());
    }
}
