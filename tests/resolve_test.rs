//! Bibliography and index resolution over whole documents.

use folio::ir::{CitationType, Document, Matter, NodeId, NodeKind};
use folio::resolve::{
    IndexResolver, ReferencePayload, ReferenceResolver, attach_bibliography, attach_index,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const RFC2119: &str = r#"<reference anchor="RFC2119" target="https://www.rfc-editor.org/info/rfc2119">
  <front>
    <title>Key words for use in RFCs to Indicate Requirement Levels</title>
    <author fullname="S. Bradner" initials="S." surname="Bradner"/>
    <date month="March" year="1997"/>
  </front>
  <seriesInfo name="BCP" value="14"/>
  <seriesInfo name="RFC" value="2119"/>
</reference>"#;

fn cite(doc: &mut Document, anchor: &str, kind: CitationType) {
    let p = doc.append(NodeId::ROOT, NodeKind::Paragraph);
    doc.append(
        p,
        NodeKind::Citation {
            destinations: vec![anchor.to_string()],
            types: vec![kind],
        },
    );
}

fn mark(doc: &mut Document, item: &str, subitem: Option<&str>, id: &str) {
    let p = doc.append(NodeId::ROOT, NodeKind::Paragraph);
    doc.append(
        p,
        NodeKind::IndexMarker {
            item: item.to_string(),
            subitem: subitem.map(String::from),
            primary: false,
            id: id.to_string(),
        },
    );
}

fn citation_type() -> impl Strategy<Value = CitationType> {
    prop_oneof![
        Just(CitationType::Normative),
        Just(CitationType::Informative),
        Just(CitationType::Suppressed),
    ]
}

#[test]
fn test_parsed_and_unresolved_references() {
    let mut doc = Document::new();
    cite(&mut doc, "RFC2119", CitationType::Normative);
    cite(&mut doc, "RFC8174", CitationType::Informative);
    doc.append(
        NodeId::ROOT,
        NodeKind::ReferenceBlock {
            raw: RFC2119.as_bytes().to_vec(),
        },
    );

    let resolved = ReferenceResolver::new().resolve(&doc);

    let normative = resolved.normative.expect("normative group");
    assert_eq!(normative.kind, CitationType::Normative);
    assert_eq!(normative.items.len(), 1);
    assert_eq!(normative.items[0].anchor, "RFC2119");
    let ReferencePayload::Parsed(reference) = &normative.items[0].payload else {
        panic!("expected parsed payload, got {:?}", normative.items[0].payload);
    };
    assert_eq!(reference.anchor, "RFC2119");
    assert_eq!(
        reference.front.title,
        "Key words for use in RFCs to Indicate Requirement Levels"
    );
    assert_eq!(reference.front.authors[0].surname.as_deref(), Some("Bradner"));
    assert_eq!(reference.series.len(), 2);

    let informative = resolved.informative.expect("informative group");
    assert_eq!(informative.items.len(), 1);
    assert_eq!(informative.items[0].anchor, "RFC8174");
    assert_eq!(informative.items[0].payload, ReferencePayload::Unresolved);
}

#[test]
fn test_index_groups_and_letters() {
    let mut doc = Document::new();
    mark(&mut doc, "cat", None, "s1");
    mark(&mut doc, "cat", Some("breed"), "s2");
    mark(&mut doc, "dog", None, "s3");

    let index = IndexResolver::new().resolve(&doc).expect("index");
    let items: Vec<_> = index
        .items()
        .map(|i| (i.item.as_str(), i.occurrences.len()))
        .collect();
    assert_eq!(items, vec![("cat", 2), ("dog", 1)]);
    assert_eq!(index.letters().collect::<Vec<_>>(), vec!["c", "d"]);
}

#[test]
fn test_no_markers_means_no_index() {
    let mut doc = Document::new();
    cite(&mut doc, "RFC2119", CitationType::Normative);
    assert!(IndexResolver::new().resolve(&doc).is_none());
    assert!(!attach_index(&mut doc));
}

#[test]
fn test_resolvers_are_idempotent() {
    let mut doc = Document::new();
    cite(&mut doc, "RFC8174", CitationType::Informative);
    cite(&mut doc, "rfc2119", CitationType::Normative);
    mark(&mut doc, "dog", None, "s3");
    mark(&mut doc, "cat", None, "s1");
    doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });

    let bibliography = ReferenceResolver::new().resolve(&doc);
    let index = IndexResolver::new().resolve(&doc);
    assert!(attach_bibliography(&mut doc));
    assert!(attach_index(&mut doc));

    assert_eq!(ReferenceResolver::new().resolve(&doc), bibliography);
    assert_eq!(IndexResolver::new().resolve(&doc), index);
}

#[test]
fn test_spliced_nodes_are_ordinary_children() {
    let mut doc = Document::new();
    cite(&mut doc, "A", CitationType::Normative);
    mark(&mut doc, "cat", None, "s1");
    let back = doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });

    assert!(attach_bibliography(&mut doc));
    assert!(attach_index(&mut doc));

    let group = doc.children(back).next().expect("bibliography group");
    assert_eq!(doc.parent(group), Some(back));
    let last = doc.children(NodeId::ROOT).last().expect("index");
    assert_eq!(doc.kind(last), &NodeKind::Index);
    assert!(doc.is_last(last));
}

proptest! {
    #[test]
    fn prop_case_variants_collapse_to_one_item(
        variants in prop::collection::vec(
            ("[rR][fF][cC]2119", citation_type()),
            1..12
        )
    ) {
        let mut doc = Document::new();
        for (anchor, kind) in &variants {
            cite(&mut doc, anchor, *kind);
        }

        let resolved = ReferenceResolver::new().resolve(&doc);
        let items: Vec<_> = resolved
            .normative
            .iter()
            .chain(resolved.informative.iter())
            .flat_map(|g| g.items.iter())
            .collect();
        prop_assert_eq!(items.len(), 1);
        prop_assert_eq!(&items[0].anchor, &variants[0].0);
        prop_assert_eq!(items[0].kind, variants[0].1);
    }

    #[test]
    fn prop_bibliography_order_ignores_input_order(
        cited in Just(vec![
            ("RFC8174", CitationType::Informative),
            ("rfc2119", CitationType::Normative),
            ("BCP14", CitationType::Normative),
            ("draft-ietf-x", CitationType::Informative),
            ("RFC7991", CitationType::Suppressed),
        ]).prop_shuffle()
    ) {
        let mut doc = Document::new();
        for (anchor, kind) in &cited {
            cite(&mut doc, anchor, *kind);
        }
        let resolved = ReferenceResolver::new().resolve(&doc);
        let anchors = |group: &Option<folio::resolve::BibliographyGroup>| -> Vec<String> {
            group.iter().flat_map(|g| g.items.iter().map(|i| i.anchor.clone())).collect()
        };
        prop_assert_eq!(anchors(&resolved.normative), vec!["BCP14", "rfc2119", "RFC7991"]);
        prop_assert_eq!(anchors(&resolved.informative), vec!["draft-ietf-x", "RFC8174"]);
    }

    #[test]
    fn prop_index_order_ignores_input_order(
        markers in Just(vec![
            ("dog", "s3"),
            ("cat", "s1"),
            ("cow", "s5"),
            ("ant", "s2"),
            ("cat", "s4"),
        ]).prop_shuffle()
    ) {
        let mut doc = Document::new();
        for (item, id) in &markers {
            mark(&mut doc, item, None, id);
        }
        let index = IndexResolver::new().resolve(&doc).expect("index");

        prop_assert_eq!(index.letters().collect::<Vec<_>>(), vec!["a", "c", "d"]);
        let items: Vec<_> = index
            .items()
            .map(|i| {
                let mut ids: Vec<_> = i.occurrences.iter().map(|o| o.id.clone()).collect();
                ids.sort();
                (i.item.clone(), ids)
            })
            .collect();
        prop_assert_eq!(
            items,
            vec![
                ("ant".to_string(), vec!["s2".to_string()]),
                ("cat".to_string(), vec!["s1".to_string(), "s4".to_string()]),
                ("cow".to_string(), vec!["s5".to_string()]),
                ("dog".to_string(), vec!["s3".to_string()]),
            ]
        );
    }
}
