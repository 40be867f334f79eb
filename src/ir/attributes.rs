//! Sparse attribute side table for IR nodes.
//!
//! Most nodes carry no `{#id .class key=value}` block, so attributes live in
//! a map keyed by node rather than as an `Option` on every node.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::node::NodeId;

/// The attribute block attached to a single node.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Explicit identifier.
    pub id: Option<String>,
    /// Class names, kept sorted.
    pub classes: BTreeSet<String>,
    /// Free-form key/value pairs.
    pub attrs: BTreeMap<String, Vec<u8>>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }
}

/// Sparse map from node to its attribute block.
#[derive(Debug, Default, Clone)]
pub struct AttributeMap {
    entries: HashMap<NodeId, Attributes>,
}

impl AttributeMap {
    /// Create a new empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the attribute block for a node.
    pub fn get(&self, node: NodeId) -> Option<&Attributes> {
        self.entries.get(&node)
    }

    fn entry(&mut self, node: NodeId) -> &mut Attributes {
        self.entries.entry(node).or_default()
    }

    // --- id ---

    /// Set the id for a node.
    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if !id.is_empty() {
            self.entry(node).id = Some(id.to_string());
        }
    }

    /// Get the id for a node.
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.entries.get(&node).and_then(|a| a.id.as_deref())
    }

    // --- classes ---

    /// Add a class to a node.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !class.is_empty() {
            self.entry(node).classes.insert(class.to_string());
        }
    }

    /// Check whether a node carries a class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.entries
            .get(&node)
            .is_some_and(|a| a.classes.contains(class))
    }

    // --- key/value ---

    /// Set a key/value attribute on a node.
    pub fn set(&mut self, node: NodeId, key: &str, value: impl Into<Vec<u8>>) {
        self.entry(node).attrs.insert(key.to_string(), value.into());
    }

    /// Get a key/value attribute of a node.
    pub fn value(&self, node: NodeId, key: &str) -> Option<&[u8]> {
        self.entries
            .get(&node)
            .and_then(|a| a.attrs.get(key))
            .map(Vec::as_slice)
    }

    /// Find the node whose id equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(_, a)| a.id.as_deref() == Some(id))
            .map(|(node, _)| *node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
