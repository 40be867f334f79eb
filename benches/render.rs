//! Benchmarks for resolution and text layout.
//!
//! Run with: cargo bench

use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use folio::ir::{Align, CitationType, Document, ListFlags, Matter, NodeId, NodeKind};
use folio::resolve::{IndexResolver, ReferenceResolver, attach_bibliography, attach_index};
use folio::{Exporter, LayoutEngine, RenderConfig};

const SECTIONS: usize = 200;

const LOREM: &str = "The key words MUST, MUST NOT, REQUIRED, SHALL, SHALL NOT, SHOULD, \
SHOULD NOT, RECOMMENDED, NOT RECOMMENDED, MAY, and OPTIONAL in this document are to be \
interpreted as described in BCP 14 when, and only when, they appear in all capitals.";

/// A draft-sized document: headings, wrapped paragraphs, quotes, lists,
/// tables, citations, index markers and deferred links.
fn sample_document() -> Document {
    let mut doc = Document::new();
    doc.append(
        NodeId::ROOT,
        NodeKind::Title {
            content: "Internet Engineering Task Force".into(),
        },
    );

    for section in 0..SECTIONS {
        let heading = doc.append(
            NodeId::ROOT,
            NodeKind::Heading {
                level: (section % 3 + 1) as u8,
                special: false,
            },
        );
        doc.append_text(heading, &format!("Section {section}"));

        let p = doc.append(NodeId::ROOT, NodeKind::Paragraph);
        doc.append_text(p, LOREM);
        doc.append(
            p,
            NodeKind::Citation {
                destinations: vec![format!("RFC{}", 1000 + section % 50)],
                types: vec![if section % 2 == 0 {
                    CitationType::Normative
                } else {
                    CitationType::Informative
                }],
            },
        );
        doc.append(
            p,
            NodeKind::IndexMarker {
                item: format!("term{}", section % 40),
                subitem: None,
                primary: section % 7 == 0,
                id: format!("section-{section}"),
            },
        );
        let link = doc.append(
            p,
            NodeKind::Link {
                destination: format!("https://example.org/{}", section % 10),
                title: String::new(),
                footnote_id: None,
                deferred_id: Some(format!("l{}", section % 10)),
            },
        );
        doc.append_text(link, "details");

        let quote = doc.append(NodeId::ROOT, NodeKind::BlockQuote);
        let inner = doc.append(quote, NodeKind::Paragraph);
        doc.append_text(inner, LOREM);

        let list = doc.append(
            NodeId::ROOT,
            NodeKind::List {
                ordered: true,
                definition: false,
                term: false,
                start: 1,
            },
        );
        for _ in 0..4 {
            let item = doc.append(
                list,
                NodeKind::ListItem {
                    flags: ListFlags::Ordered,
                },
            );
            let p = doc.append(item, NodeKind::Paragraph);
            doc.append_text(p, LOREM);
        }

        let table = doc.append(NodeId::ROOT, NodeKind::Table);
        for row in 0..5 {
            let tr = doc.append(table, NodeKind::TableRow);
            for col in 0..3 {
                let cell = doc.append(
                    tr,
                    NodeKind::TableCell {
                        header: false,
                        align: Align::None,
                        colspan: 1,
                    },
                );
                doc.append_text(cell, &format!("r{row}c{col}"));
            }
        }
    }

    doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });
    doc
}

fn bench_resolve(c: &mut Criterion) {
    let doc = sample_document();

    c.bench_function("resolve_bibliography", |b| {
        b.iter(|| ReferenceResolver::new().resolve(black_box(&doc)));
    });
    c.bench_function("resolve_index", |b| {
        b.iter(|| IndexResolver::new().resolve(black_box(&doc)));
    });
}

fn bench_render(c: &mut Criterion) {
    let mut doc = sample_document();
    attach_bibliography(&mut doc);
    attach_index(&mut doc);

    c.bench_function("render_plain", |b| {
        let mut engine = LayoutEngine::new();
        b.iter(|| engine.render(black_box(&doc)));
    });

    c.bench_function("render_ansi", |b| {
        let mut engine = LayoutEngine::with_config(RenderConfig::default().with_ansi(true));
        b.iter(|| engine.render(black_box(&doc)));
    });

    c.bench_function("export_narrow", |b| {
        let mut engine = LayoutEngine::with_config(RenderConfig::default().with_width(40));
        b.iter(|| {
            let mut output = Cursor::new(Vec::new());
            engine.export(&doc, &mut output).unwrap();
        });
    });
}

criterion_group!(benches, bench_resolve, bench_render);
criterion_main!(benches);
