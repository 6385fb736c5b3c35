use crate::dom::Node;

/// The NodeVisitor trait defines the single traversal mechanism for host trees.
///
/// Rules:
/// 1. Children are visited in document order, depth-first.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call the `walk_*` functions to continue traversal unless pruning
///    is intended.
/// 4. Children are snapshotted when a node's children are walked, so nodes inserted
///    into an already-walked position are not visited.
pub trait NodeVisitor {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &Node) {
        walk_children(self, element);
    }

    fn visit_text(&mut self, _text: &Node) {
        // Leaf node, nothing to walk by default
    }

    fn visit_children(&mut self, parent: &Node) {
        walk_children(self, parent);
    }
}

pub fn walk_node<V: NodeVisitor + ?Sized>(visitor: &mut V, node: &Node) {
    if node.is_element() {
        visitor.visit_element(node);
    } else {
        visitor.visit_text(node);
    }
}

pub fn walk_children<V: NodeVisitor + ?Sized>(visitor: &mut V, parent: &Node) {
    for child in parent.children() {
        visitor.visit_node(&child);
    }
}
