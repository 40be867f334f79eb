//! Nested, serializable form of a document.
//!
//! The arena is the working representation; `TreeNode` is how a tree
//! producer outside this crate hands a finished document over (for example
//! as JSON to the `folio` binary).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Document, NodeId, NodeKind};

/// A node with its children inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// The `{#id}` attribute. Named apart from kinds that carry an `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// `key=value` attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Vec<u8>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            node_id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

impl Document {
    /// Build an arena document from a nested tree.
    ///
    /// If the tree's root is a [`NodeKind::Document`] it becomes the arena
    /// root; otherwise the tree is placed below a fresh root.
    pub fn from_tree(tree: TreeNode) -> Self {
        let mut doc = Document::new();
        if tree.kind == NodeKind::Document {
            doc.apply_attributes(NodeId::ROOT, &tree);
            for child in tree.children {
                doc.insert_tree(NodeId::ROOT, child);
            }
        } else {
            doc.insert_tree(NodeId::ROOT, tree);
        }
        doc
    }

    fn insert_tree(&mut self, parent: NodeId, tree: TreeNode) {
        let mut pending = vec![(parent, tree)];
        while let Some((parent, node)) = pending.pop() {
            let id = self.append(parent, node.kind.clone());
            self.apply_attributes(id, &node);
            // Reverse so the stack pops children left-to-right
            pending.extend(node.children.into_iter().rev().map(|c| (id, c)));
        }
    }

    fn apply_attributes(&mut self, id: NodeId, node: &TreeNode) {
        if let Some(anchor) = &node.node_id {
            self.attributes.set_id(id, anchor);
        }
        for class in &node.classes {
            self.attributes.add_class(id, class);
        }
        for (key, value) in &node.attrs {
            self.attributes.set(id, key, value.clone());
        }
    }
}
