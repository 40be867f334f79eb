//! Citation collection and bibliography grouping.

use std::collections::{BTreeMap, HashMap};

use bstr::ByteSlice;
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::reference::Reference;
use crate::ir::{CitationType, Document, NodeId, NodeKind};
use crate::util::decode_text;

/// What is known about a cited reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReferencePayload {
    /// The document embeds a `<reference>` for this anchor.
    Parsed(Box<Reference>),
    /// The embedded markup could not be parsed and is passed through as is.
    Raw(Vec<u8>),
    /// Cited, but no markup for it exists in the document.
    Unresolved,
}

/// A single bibliography entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BibliographyItem {
    /// Anchor as spelled by its first citation.
    pub anchor: String,
    /// Citation type of the first citation.
    pub kind: CitationType,
    pub payload: ReferencePayload,
}

/// Items of one citation type, sorted by case-folded anchor. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BibliographyGroup {
    pub kind: CitationType,
    pub items: Vec<BibliographyItem>,
}

impl BibliographyGroup {
    fn new(kind: CitationType) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Splice the group under `parent` as a `Bibliography` node with one
    /// `BibliographyItem` child per item.
    pub fn splice(self, doc: &mut Document, parent: NodeId) -> NodeId {
        let group = doc.append(parent, NodeKind::Bibliography { kind: self.kind });
        for item in self.items {
            doc.append(group, NodeKind::BibliographyItem(item));
        }
        group
    }
}

/// Result of a reference resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBibliography {
    /// Normative and suppressed citations.
    pub normative: Option<BibliographyGroup>,
    pub informative: Option<BibliographyGroup>,
}

impl ResolvedBibliography {
    pub fn is_empty(&self) -> bool {
        self.normative.is_none() && self.informative.is_none()
    }
}

/// Collects citations and embedded reference markup into bibliography groups.
///
/// Anchors are deduplicated case-insensitively and the first citation of an
/// anchor decides its type: a later normative citation of an anchor first
/// cited as informative stays informative.
// TODO: decide whether a later normative citation should promote an
// earlier informative one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceResolver;

impl ReferenceResolver {
    pub fn new() -> Self {
        Self
    }

    /// Walk the document once and group every cited anchor.
    ///
    /// The document is not modified.
    pub fn resolve(&self, doc: &Document) -> ResolvedBibliography {
        // case-folded anchor -> (anchor, type of first citation)
        let mut seen: BTreeMap<String, (String, CitationType)> = BTreeMap::new();
        // case-folded anchor -> embedded markup
        let mut raw: HashMap<String, &[u8]> = HashMap::new();

        for id in doc.iter_dfs() {
            match doc.kind(id) {
                NodeKind::Citation {
                    destinations,
                    types,
                } => {
                    for (i, destination) in destinations.iter().enumerate() {
                        let key = destination.to_lowercase();
                        if seen.contains_key(&key) {
                            continue;
                        }
                        let kind = types.get(i).copied().unwrap_or_default();
                        seen.insert(key, (destination.clone(), kind));
                    }
                }
                NodeKind::ReferenceBlock { raw: literal } => {
                    if let Some(anchor) = anchor_from_reference(literal) {
                        raw.insert(anchor.to_str_lossy().to_lowercase(), literal);
                    }
                }
                _ => {}
            }
        }

        debug!(
            "collected {} cited anchors and {} reference blocks",
            seen.len(),
            raw.len()
        );

        let mut resolved = ResolvedBibliography::default();
        // BTreeMap iteration is sorted by folded anchor
        for (key, (anchor, kind)) in seen {
            let payload = match raw.get(&key) {
                Some(literal) => parse_payload(&anchor, literal),
                None => ReferencePayload::Unresolved,
            };
            let item = BibliographyItem {
                anchor,
                kind,
                payload,
            };

            let group = match kind {
                CitationType::Informative => &mut resolved.informative,
                CitationType::Normative | CitationType::Suppressed => &mut resolved.normative,
            };
            let group_kind = match kind {
                CitationType::Informative => CitationType::Informative,
                _ => CitationType::Normative,
            };
            group
                .get_or_insert_with(|| BibliographyGroup::new(group_kind))
                .items
                .push(item);
        }
        resolved
    }
}

fn parse_payload(anchor: &str, literal: &[u8]) -> ReferencePayload {
    let text = decode_text(literal, None);
    match Reference::parse(&text) {
        Ok(reference) => ReferencePayload::Parsed(Box::new(reference)),
        Err(e) => {
            warn!("failed to parse reference {anchor:?}: {e}, keeping raw markup");
            ReferencePayload::Raw(literal.to_vec())
        }
    }
}

/// Extract the anchor from literal reference markup such as
/// `<reference anchor='CBR03' target=''>`.
///
/// The value must be quoted with `'` or `"` and the quote must be closed.
pub fn anchor_from_reference(data: &[u8]) -> Option<&[u8]> {
    let start = data.find("anchor=")? + "anchor=".len();
    let quote = *data.get(start)?;
    if quote != b'\'' && quote != b'"' {
        return None;
    }
    let value = &data[start + 1..];
    let end = memchr::memchr(quote, value)?;
    Some(&value[..end])
}

/// Resolve the bibliography and splice it after the back-matter marker.
///
/// Returns false (and leaves the document untouched) if there is no back
/// matter or nothing was cited.
pub fn attach_bibliography(doc: &mut Document) -> bool {
    let Some(back) = doc.back_matter() else {
        debug!("no back matter in document, not adding a bibliography");
        return false;
    };

    let resolved = ReferenceResolver::new().resolve(doc);
    let added = !resolved.is_empty();
    if let Some(normative) = resolved.normative {
        normative.splice(doc, back);
    }
    if let Some(informative) = resolved.informative {
        informative.splice(doc, back);
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Matter;

    fn cite(doc: &mut Document, parent: NodeId, cites: &[(&str, CitationType)]) {
        doc.append(
            parent,
            NodeKind::Citation {
                destinations: cites.iter().map(|(d, _)| d.to_string()).collect(),
                types: cites.iter().map(|(_, t)| *t).collect(),
            },
        );
    }

    fn anchors(group: &Option<BibliographyGroup>) -> Vec<&str> {
        group
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.anchor.as_str()))
            .collect()
    }

    #[test]
    fn test_anchor_from_reference() {
        assert_eq!(
            anchor_from_reference(b"<reference anchor='CBR03' target=''>"),
            Some(&b"CBR03"[..])
        );
        assert_eq!(
            anchor_from_reference(b"<reference anchor=\"RFC2119\">"),
            Some(&b"RFC2119"[..])
        );
        assert_eq!(anchor_from_reference(b"<reference anchor=RFC2119>"), None);
        assert_eq!(anchor_from_reference(b"<reference anchor='open"), None);
        assert_eq!(anchor_from_reference(b"<reference target='x'>"), None);
        assert_eq!(anchor_from_reference(b"anchor="), None);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut doc = Document::new();
        let p = doc.append(NodeId::ROOT, NodeKind::Paragraph);
        cite(&mut doc, p, &[("rfc1234", CitationType::Informative)]);
        cite(&mut doc, p, &[("RFC1234", CitationType::Normative)]);
        cite(&mut doc, p, &[("Rfc1234", CitationType::Suppressed)]);

        let resolved = ReferenceResolver::new().resolve(&doc);
        assert!(resolved.normative.is_none());
        let informative = resolved.informative.unwrap();
        assert_eq!(informative.items.len(), 1);
        assert_eq!(informative.items[0].anchor, "rfc1234");
        assert_eq!(informative.items[0].kind, CitationType::Informative);
    }

    #[test]
    fn test_suppressed_folds_into_normative() {
        let mut doc = Document::new();
        cite(
            &mut doc,
            NodeId::ROOT,
            &[("B", CitationType::Suppressed), ("A", CitationType::Normative)],
        );

        let resolved = ReferenceResolver::new().resolve(&doc);
        let normative = resolved.normative.as_ref().unwrap();
        assert_eq!(normative.kind, CitationType::Normative);
        assert_eq!(anchors(&resolved.normative), vec!["A", "B"]);
        assert_eq!(normative.items[1].kind, CitationType::Suppressed);
    }

    #[test]
    fn test_sorted_by_folded_anchor() {
        let mut doc = Document::new();
        cite(
            &mut doc,
            NodeId::ROOT,
            &[
                ("zeta", CitationType::Informative),
                ("Alpha", CitationType::Informative),
                ("beta", CitationType::Informative),
            ],
        );
        let resolved = ReferenceResolver::new().resolve(&doc);
        assert_eq!(anchors(&resolved.informative), vec!["Alpha", "beta", "zeta"]);
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        let resolved = ReferenceResolver::new().resolve(&Document::new());
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_missing_types_default_to_informative() {
        let mut doc = Document::new();
        doc.append(
            NodeId::ROOT,
            NodeKind::Citation {
                destinations: vec!["x".into()],
                types: Vec::new(),
            },
        );
        let resolved = ReferenceResolver::new().resolve(&doc);
        assert_eq!(anchors(&resolved.informative), vec!["x"]);
    }

    #[test]
    fn test_malformed_reference_falls_back_to_raw() {
        let mut doc = Document::new();
        cite(&mut doc, NodeId::ROOT, &[("bcp14", CitationType::Normative)]);
        let raw = b"<referencegroup anchor='BCP14'><reference anchor='RFC2119'/></referencegroup>";
        doc.append(NodeId::ROOT, NodeKind::ReferenceBlock { raw: raw.to_vec() });

        let resolved = ReferenceResolver::new().resolve(&doc);
        let item = &resolved.normative.unwrap().items[0];
        assert_eq!(item.payload, ReferencePayload::Raw(raw.to_vec()));
    }

    #[test]
    fn test_attach_requires_back_matter() {
        let mut doc = Document::new();
        cite(&mut doc, NodeId::ROOT, &[("a", CitationType::Normative)]);
        assert!(!attach_bibliography(&mut doc));
        let before = doc.node_count();

        let back = doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });
        assert_eq!(doc.node_count(), before + 1);
        assert!(attach_bibliography(&mut doc));

        let groups: Vec<_> = doc.children(back).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(
            doc.kind(groups[0]),
            &NodeKind::Bibliography {
                kind: CitationType::Normative
            }
        );
        assert_eq!(doc.children(groups[0]).count(), 1);
    }

    #[test]
    fn test_attach_orders_normative_first() {
        let mut doc = Document::new();
        cite(
            &mut doc,
            NodeId::ROOT,
            &[("i", CitationType::Informative), ("n", CitationType::Normative)],
        );
        let back = doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });
        assert!(attach_bibliography(&mut doc));

        let kinds: Vec<_> = doc.children(back).map(|g| doc.kind(g).clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Bibliography {
                    kind: CitationType::Normative
                },
                NodeKind::Bibliography {
                    kind: CitationType::Informative
                },
            ]
        );
    }
}
