//! Index-marker collection and back-of-book index grouping.

use std::collections::BTreeMap;

use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ir::{Document, NodeId, NodeKind};

/// One place in the document where an index marker appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexOccurrence {
    pub id: String,
    pub subitem: Option<String>,
    pub primary: bool,
}

/// All occurrences of one index item, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexItem {
    pub item: String,
    pub occurrences: Vec<IndexOccurrence>,
}

impl IndexItem {
    /// Occurrences that name no subitem.
    pub fn main_occurrences(&self) -> impl Iterator<Item = &IndexOccurrence> {
        self.occurrences.iter().filter(|o| o.subitem.is_none())
    }

    /// Occurrences grouped by subitem, in order of first appearance.
    pub fn subitems(&self) -> Vec<(&str, Vec<&IndexOccurrence>)> {
        let mut groups: Vec<(&str, Vec<&IndexOccurrence>)> = Vec::new();
        for occurrence in &self.occurrences {
            let Some(sub) = occurrence.subitem.as_deref() else {
                continue;
            };
            match groups.iter_mut().find(|(name, _)| *name == sub) {
                Some((_, list)) => list.push(occurrence),
                None => groups.push((sub, vec![occurrence])),
            }
        }
        groups
    }
}

/// An entry of the emitted index: a letter header or an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    Letter(String),
    Item(IndexItem),
}

/// Items sorted by key with a letter header before each change of leading
/// character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexGroup {
    pub entries: Vec<IndexEntry>,
}

impl IndexGroup {
    /// The letter headers, in order.
    pub fn letters(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            IndexEntry::Letter(l) => Some(l.as_str()),
            IndexEntry::Item(_) => None,
        })
    }

    /// The items, in order.
    pub fn items(&self) -> impl Iterator<Item = &IndexItem> {
        self.entries.iter().filter_map(|e| match e {
            IndexEntry::Item(i) => Some(i),
            IndexEntry::Letter(_) => None,
        })
    }

    /// Splice the group under `parent` as an `Index` node.
    pub fn splice(self, doc: &mut Document, parent: NodeId) -> NodeId {
        let index = doc.append(parent, NodeKind::Index);
        for entry in self.entries {
            let kind = match entry {
                IndexEntry::Letter(letter) => NodeKind::IndexLetter { letter },
                IndexEntry::Item(item) => NodeKind::IndexItem(item),
            };
            doc.append(index, kind);
        }
        index
    }
}

/// Groups index markers by their exact item text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexResolver;

impl IndexResolver {
    pub fn new() -> Self {
        Self
    }

    /// Walk the document once and build the index, or `None` if the
    /// document has no index markers.
    ///
    /// Every occurrence is kept; how subitems and primary occurrences are
    /// shown is up to the renderer.
    pub fn resolve(&self, doc: &Document) -> Option<IndexGroup> {
        let mut items: BTreeMap<&str, Vec<IndexOccurrence>> = BTreeMap::new();

        for id in doc.iter_dfs() {
            if let NodeKind::IndexMarker {
                item,
                subitem,
                primary,
                id,
            } = doc.kind(id)
            {
                items.entry(item.as_str()).or_default().push(IndexOccurrence {
                    id: id.clone(),
                    subitem: subitem.clone(),
                    primary: *primary,
                });
            }
        }
        if items.is_empty() {
            return None;
        }
        debug!("collected {} index items", items.len());

        let mut group = IndexGroup::default();
        let mut previous: Option<char> = None;
        for (item, occurrences) in items {
            let letter = item.chars().next();
            if letter.is_some() && letter != previous {
                group
                    .entries
                    .push(IndexEntry::Letter(letter.map(String::from).unwrap_or_default()));
            }
            previous = letter;
            group.entries.push(IndexEntry::Item(IndexItem {
                item: item.to_string(),
                occurrences,
            }));
        }
        Some(group)
    }
}

/// Resolve the index and append it to the end of the document.
///
/// Returns false if the document has no index markers.
pub fn attach_index(doc: &mut Document) -> bool {
    match IndexResolver::new().resolve(doc) {
        Some(group) => {
            group.splice(doc, NodeId::ROOT);
            true
        }
        None => false,
    }
}
