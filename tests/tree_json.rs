//! Documents handed over as JSON trees.

#![cfg(feature = "cli")]

use folio::ir::{CitationType, Document, NodeId, NodeKind, TreeNode};
use folio::resolve::attach_bibliography;
use folio::{LayoutEngine, RenderConfig};
use pretty_assertions::assert_eq;

const DRAFT: &str = r#"{
  "type": "document",
  "children": [
    {
      "type": "paragraph",
      "node_id": "intro",
      "classes": ["lead"],
      "attrs": { "lang": [110, 108] },
      "children": [
        { "type": "text", "literal": "See " },
        { "type": "citation", "destinations": ["RFC2119"], "types": ["normative"] },
        { "type": "text", "literal": " and " },
        { "type": "link", "destination": "https://example.org", "deferred_id": "ex",
          "children": [{ "type": "text", "literal": "the site" }] }
      ]
    },
    { "type": "document_matter", "matter": "back" }
  ]
}"#;

fn parse(json: &str) -> Document {
    let tree: TreeNode = serde_json::from_str(json).expect("valid tree");
    Document::from_tree(tree)
}

#[test]
fn test_json_tree_builds_arena() {
    let doc = parse(DRAFT);

    let top: Vec<_> = doc.children(NodeId::ROOT).collect();
    assert_eq!(top.len(), 2);
    assert_eq!(doc.kind(top[0]), &NodeKind::Paragraph);
    assert_eq!(doc.attributes.id(top[0]), Some("intro"));
    assert!(doc.attributes.has_class(top[0], "lead"));
    assert_eq!(doc.attributes.value(top[0], "lang"), Some(&b"nl"[..]));

    let citation = doc.children(top[0]).nth(1).expect("citation");
    assert_eq!(
        doc.kind(citation),
        &NodeKind::Citation {
            destinations: vec!["RFC2119".into()],
            types: vec![CitationType::Normative],
        }
    );
    assert_eq!(doc.back_matter(), Some(top[1]));
}

#[test]
fn test_json_tree_renders() {
    let mut doc = parse(DRAFT);
    assert!(attach_bibliography(&mut doc));

    let out = LayoutEngine::with_config(RenderConfig::default()).render(&doc);
    assert_eq!(
        out,
        "See [RFC2119] and the site[ex]

Bibliography (Normative)

[RFC2119]


   [ex]: https://example.org
"
    );
}

#[test]
fn test_serialized_tree_reads_back() {
    let mut para = TreeNode::new(NodeKind::Paragraph);
    para.children.push(TreeNode::new(NodeKind::IndexMarker {
        item: "cat".into(),
        subitem: Some("breed".into()),
        primary: true,
        id: "s2".into(),
    }));
    let mut root = TreeNode::new(NodeKind::Document);
    root.children.push(para);

    let json = serde_json::to_string(&root).expect("serializable");
    let back: TreeNode = serde_json::from_str(&json).expect("readable");
    assert_eq!(back, root);
}

#[test]
fn test_unknown_kind_is_rejected() {
    let result: Result<TreeNode, _> = serde_json::from_str(r#"{ "type": "marquee" }"#);
    assert!(result.is_err());
}
