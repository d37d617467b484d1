//! Tree structure and node data.

use indextree::{Arena, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
}

impl DomNode {
    pub fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn comment(text: &str) -> Self {
        Self {
            kind: NodeKind::Comment {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        }
    }
}

/// An owned HTML tree. One arena per document; node ids are only
/// meaningful against the document they came from.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.arena.get(id).map(indextree::Node::get)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut DomNode> {
        self.arena.get_mut(id).map(indextree::Node::get_mut)
    }

    /// Element tag name, lowercase. `None` for non-element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.node(id)?.kind {
            NodeKind::Element { ref tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(node) if matches!(node.kind, NodeKind::Element { .. }))
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(DomNode::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DomNode::text(text))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.arena.new_node(DomNode::comment(text))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Insert `new_sibling` immediately before `existing` under the same parent.
    pub fn insert_before(&mut self, existing: NodeId, new_sibling: NodeId) {
        existing.insert_before(new_sibling, &mut self.arena);
    }

    /// Detach a subtree from its parent. The nodes stay alive in the arena
    /// (ids held elsewhere remain valid) but are no longer reachable from
    /// the document root.
    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(indextree::Node::parent)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Element children collected up front, safe to hold across mutations.
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        id.children(&self.arena)
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// All nodes of the subtree in document order, `id` first.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Element nodes of the subtree in document order, `id` first when it
    /// is an element.
    pub fn elements_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// Ancestors from `id` itself up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.ancestors(&self.arena)
    }

    /// Whether `id` is still reachable from `root` (detached subtrees are not).
    pub fn is_attached_under(&self, root: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|ancestor| ancestor == root)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attrs
            .iter()
            .find(|(attr_name, _)| attr_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if let Some(existing) = node
            .attrs
            .iter_mut()
            .find(|(attr_name, _)| attr_name == name)
        {
            existing.1 = value.to_owned();
            return;
        }
        node.attrs.push((name.to_owned(), value.to_owned()));
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if let Some(index) = node.attrs.iter().position(|(attr_name, _)| attr_name == name) {
            node.attrs.remove(index);
        }
    }

    /// First element in the subtree whose `id` attribute equals `value`.
    pub fn element_by_id(&self, root: NodeId, value: &str) -> Option<NodeId> {
        self.elements_in(root)
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(value))
    }

    /// Concatenated text of the subtree, untrimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(DomNode {
                kind: NodeKind::Text { text },
                ..
            }) = self.node(node)
            {
                out.push_str(text);
            }
        }
        out
    }

    /// First descendant (excluding `id` itself) with the given tag.
    pub fn find_descendant_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .skip(1)
            .find(|node| self.tag(*node) == Some(tag))
    }

    /// Deep-copy the subtree at `source_root` into a fresh document.
    ///
    /// Returns the new document, the copied root's id, and the
    /// source→copy pair list in document order (all node kinds). The pair
    /// list is the structural mirror later passes use to look up computed
    /// styles for copied nodes.
    pub fn clone_subtree(&self, source_root: NodeId) -> (Self, NodeId, Vec<(NodeId, NodeId)>) {
        let mut copy = Self::new();
        let mut pairs = Vec::new();
        let copy_root = self.clone_into(source_root, copy.root, &mut copy, &mut pairs);
        (copy, copy_root, pairs)
    }

    fn clone_into(
        &self,
        source: NodeId,
        target_parent: NodeId,
        copy: &mut Self,
        pairs: &mut Vec<(NodeId, NodeId)>,
    ) -> NodeId {
        let data = self.node(source).cloned().unwrap_or_default();
        let copied = copy.arena.new_node(data);
        copy.append_child(target_parent, copied);
        pairs.push((source, copied));
        let children: Vec<NodeId> = self.children(source).collect();
        for child in children {
            self.clone_into(child, copied, copy, pairs);
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element("div");
        doc.set_attr(root, "id", "top");
        let child = doc.create_element("p");
        let text = doc.create_text("hello");
        doc.append_child(child, text);
        doc.append_child(root, child);
        let doc_root = doc.root();
        doc.append_child(doc_root, root);
        (doc, root)
    }

    #[test]
    fn attrs_set_and_replace() {
        let (mut doc, root) = sample();
        doc.set_attr(root, "id", "other");
        assert_eq!(doc.attr(root, "id"), Some("other"));
        doc.remove_attr(root, "id");
        assert_eq!(doc.attr(root, "id"), None);
    }

    #[test]
    fn clone_subtree_pairs_in_document_order() {
        let (doc, root) = sample();
        let (copy, copy_root, pairs) = doc.clone_subtree(root);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, root);
        assert_eq!(pairs[0].1, copy_root);
        assert_eq!(copy.tag(copy_root), Some("div"));
        assert_eq!(copy.attr(copy_root, "id"), Some("top"));
        assert_eq!(copy.text_content(copy_root), "hello");
    }

    #[test]
    fn detach_breaks_reachability_but_keeps_ids_valid() {
        let (mut doc, root) = sample();
        let paragraph = doc.child_elements(root)[0];
        doc.detach(paragraph);
        assert!(!doc.is_attached_under(root, paragraph));
        assert_eq!(doc.tag(paragraph), Some("p"));
        assert_eq!(doc.text_content(root), "");
    }

    #[test]
    fn element_by_id_scopes_to_subtree() {
        let (doc, root) = sample();
        assert_eq!(doc.element_by_id(doc.root(), "top"), Some(root));
        let paragraph = doc.child_elements(root)[0];
        assert_eq!(doc.element_by_id(paragraph, "top"), None);
    }
}
