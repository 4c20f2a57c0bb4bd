use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use indextree::{Arena, NodeId};

/// Arena-backed XML tree. `Clone` is cheap enough for document sizes in the
/// tens of thousands of nodes, which is what keeps every structural edit
/// pure: mutators clone, edit the clone and hand it back.
///
/// `NodeId`s are positions in the arena, so ids resolved against a document
/// remain valid in its clones.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.append(child, &mut self.arena);
        child
    }

    pub fn add_first_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        parent.prepend(child, &mut self.arena);
        child
    }

    pub fn add_before(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_before(new_node, &mut self.arena);
        new_node
    }

    pub fn add_after(&mut self, sibling: NodeId, data: XmlNodeData) -> NodeId {
        let new_node = self.arena.new_node(data);
        sibling.insert_after(new_node, &mut self.arena);
        new_node
    }

    // ------------------------------------------------------------------
    // Rearrangement
    // ------------------------------------------------------------------

    /// Unlink a node (subtree intact) so it can be re-attached elsewhere.
    pub fn detach(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    pub fn attach_child(&mut self, parent: NodeId, node: NodeId) {
        parent.append(node, &mut self.arena);
    }

    pub fn attach_before(&mut self, sibling: NodeId, node: NodeId) {
        sibling.insert_before(node, &mut self.arena);
    }

    pub fn attach_after(&mut self, sibling: NodeId, node: NodeId) {
        sibling.insert_after(node, &mut self.arena);
    }

    /// Remove a node and its whole subtree.
    pub fn remove_subtree(&mut self, node: NodeId) {
        if self.root == Some(node) {
            self.root = None;
        }
        node.remove_subtree(&mut self.arena);
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                if let Some(attr) = attrs.iter_mut().find(|a| &a.name == name) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(XAttribute::new(name.clone(), value));
                }
            }
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &XName) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                attrs.retain(|a| &a.name != name);
            }
        }
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        parent.children(&self.arena)
    }

    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent()
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.ancestors(&self.arena)
    }

    /// Child elements with the given local tag name.
    pub fn child_elements_named<'a>(
        &'a self,
        parent: NodeId,
        local_name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent).filter(move |&child_id| {
            self.local_name(child_id) == Some(local_name)
        })
    }

    /// First element in document order with the given local tag name,
    /// searching the whole tree.
    pub fn first_element_named(&self, local_name: &str) -> Option<NodeId> {
        let root = self.root?;
        self.descendants(root)
            .find(|&id| self.local_name(id) == Some(local_name))
    }

    /// Local tag name of a node, if it is an element.
    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.local_name()
    }

    /// Attribute value by local name, if the node is an element.
    pub fn attribute(&self, node: NodeId, local_name: &str) -> Option<&str> {
        self.get(node)?.attribute(local_name)
    }

    /// Concatenated text of all text/CDATA descendants.
    pub fn collect_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.descendants(node) {
            if let Some(data) = self.get(id) {
                if let Some(t) = data.text_content() {
                    out.push_str(t);
                }
            }
        }
        out
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_children() -> (XmlDocument, NodeId, NodeId, NodeId) {
        let mut doc = XmlDocument::new();
        let root = doc.add_root(XmlNodeData::element(XName::local("body")));
        let a = doc.add_child(root, XmlNodeData::element(XName::local("article")));
        let b = doc.add_child(root, XmlNodeData::element(XName::local("article")));
        (doc, root, a, b)
    }

    #[test]
    fn add_children_preserves_order() {
        let (doc, root, a, b) = doc_with_children();
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children, vec![a, b]);
    }

    #[test]
    fn detach_and_reattach_moves_subtree() {
        let (mut doc, root, a, b) = doc_with_children();
        doc.detach(a);
        doc.attach_child(root, a);
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children, vec![b, a]);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut doc, root, a, _b) = doc_with_children();
        doc.add_child(a, XmlNodeData::text("content"));
        doc.remove_subtree(a);
        assert_eq!(doc.children(root).count(), 1);
    }

    #[test]
    fn set_attribute_overwrites_existing_value() {
        let (mut doc, root, ..) = doc_with_children();
        let name = XName::local("id");
        doc.set_attribute(root, &name, "body_1");
        doc.set_attribute(root, &name, "body_2");
        assert_eq!(doc.attribute(root, "id"), Some("body_2"));
        assert_eq!(doc.get(root).unwrap().attributes().unwrap().len(), 1);
    }

    #[test]
    fn clone_keeps_node_ids_valid() {
        let (doc, _root, a, _b) = doc_with_children();
        let copy = doc.clone();
        assert_eq!(copy.local_name(a), Some("article"));
    }
}
