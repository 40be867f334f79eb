//! Intermediate Representation (IR) for annotated documents.
//!
//! The IR is an arena of nodes:
//! - Nodes with a closed set of semantic kinds (paragraphs, headings, citations, etc.)
//! - Parent / first-child / sibling links stored as [`NodeId`]s, never as owning pointers
//! - A sparse attribute side table (id, classes, key/value pairs)
//!
//! # Example
//!
//! ```
//! use folio::ir::{Document, NodeId, NodeKind};
//!
//! let mut doc = Document::new();
//! let para = doc.append(NodeId::ROOT, NodeKind::Paragraph);
//! doc.append(para, NodeKind::text("Hello"));
//! assert_eq!(doc.children(NodeId::ROOT).count(), 1);
//! ```

mod attributes;
mod node;
#[cfg(feature = "serde")]
mod tree;

use std::ops::Index;

pub use attributes::{AttributeMap, Attributes};
pub use node::{Align, CitationType, ListFlags, Matter, Node, NodeId, NodeKind};
#[cfg(feature = "serde")]
pub use tree::TreeNode;

/// A document in IR form.
///
/// Index 0 is always the root [`NodeKind::Document`] node.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    /// Sparse `{#id .class key=value}` attributes.
    pub attributes: AttributeMap,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl Document {
    /// Create a new document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            attributes: AttributeMap::new(),
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get the kind of a node.
    ///
    /// Panics on an ID that was not allocated by this document.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self[id].kind
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a new detached node and return its ID.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        match last {
            Some(last) => self.nodes[last.index()].next_sibling = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        self.nodes[parent.index()].last_child = Some(child);
    }

    /// Allocate a node of `kind` and append it under `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind);
        self.append_child(parent, id);
        id
    }

    /// Append a text leaf under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::text(text))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self[id].prev_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self[id].next_sibling
    }

    /// Whether `id` is the last child of its parent.
    pub fn is_last(&self, id: NodeId) -> bool {
        self[id].next_sibling.is_none()
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            doc: self,
            current: self[parent].first_child,
        }
    }

    /// Iterate over all nodes in depth-first order.
    pub fn iter_dfs(&self) -> DfsIter<'_> {
        DfsIter {
            doc: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Walk the subtree rooted at `root`, yielding enter and exit events.
    pub fn walk(&self, root: NodeId) -> Walk<'_> {
        Walk {
            doc: self,
            root,
            next: Some(WalkEvent::Enter(root)),
            entered: None,
        }
    }

    /// Find the node that opens the back matter, if any.
    pub fn back_matter(&self) -> Option<NodeId> {
        self.iter_dfs().find(|&id| {
            matches!(
                self.kind(id),
                NodeKind::DocumentMatter {
                    matter: Matter::Back
                }
            )
        })
    }

    /// Collect the plain text below a node.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        for event in self.walk(id) {
            if let WalkEvent::Enter(n) = event
                && let NodeKind::Text { literal } = self.kind(n)
            {
                result.push_str(literal);
            }
        }
        result
    }
}

/// Iterator over children of a node.
pub struct ChildIter<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc[current].next_sibling;
        Some(current)
    }
}

/// Depth-first iterator over all nodes.
pub struct DfsIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;

        // Push children in reverse order so they're visited left-to-right
        let mut children: Vec<NodeId> = self.doc.children(current).collect();
        children.reverse();
        self.stack.extend(children);

        Some(current)
    }
}

/// A single step of a [`Walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent {
    Enter(NodeId),
    Exit(NodeId),
}

/// Enter/exit traversal of a subtree.
///
/// Every `Enter(n)` is matched by exactly one `Exit(n)`, including for
/// nodes whose children were skipped with [`Walk::skip_children`].
pub struct Walk<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<WalkEvent>,
    entered: Option<NodeId>,
}

impl Walk<'_> {
    /// Do not descend into the node that was just entered.
    pub fn skip_children(&mut self) {
        if let Some(id) = self.entered.take() {
            self.next = Some(WalkEvent::Exit(id));
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = WalkEvent;

    fn next(&mut self) -> Option<WalkEvent> {
        let current = self.next.take()?;
        self.entered = None;
        self.next = match current {
            WalkEvent::Enter(id) => {
                self.entered = Some(id);
                match self.doc[id].first_child {
                    Some(child) => Some(WalkEvent::Enter(child)),
                    None => Some(WalkEvent::Exit(id)),
                }
            }
            WalkEvent::Exit(id) if id == self.root => None,
            WalkEvent::Exit(id) => match (self.doc[id].next_sibling, self.doc[id].parent) {
                (Some(sibling), _) => Some(WalkEvent::Enter(sibling)),
                (None, Some(parent)) => Some(WalkEvent::Exit(parent)),
                (None, None) => None,
            },
        };
        Some(current)
    }
}
