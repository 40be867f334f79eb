//! Cross-reference resolution passes.
//!
//! Each resolver makes one read-only pass over a [`Document`](crate::ir::Document)
//! and returns transient groups. Callers splice them into the tree, after
//! which they are ordinary nodes owned by the document:
//!
//! - [`ReferenceResolver`]: citations and embedded `<reference>` markup into
//!   normative and informative [`BibliographyGroup`]s
//! - [`IndexResolver`]: index markers into an [`IndexGroup`] with letter headers
//!
//! # Example
//!
//! ```
//! use folio::ir::{CitationType, Document, Matter, NodeId, NodeKind};
//! use folio::resolve::{attach_bibliography, ReferenceResolver};
//!
//! let mut doc = Document::new();
//! doc.append(NodeId::ROOT, NodeKind::Citation {
//!     destinations: vec!["RFC2119".into()],
//!     types: vec![CitationType::Normative],
//! });
//! doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });
//!
//! let resolved = ReferenceResolver::new().resolve(&doc);
//! assert_eq!(resolved.normative.unwrap().items[0].anchor, "RFC2119");
//! assert!(attach_bibliography(&mut doc));
//! ```

mod bibliography;
mod index;
mod reference;

pub use bibliography::{
    BibliographyGroup, BibliographyItem, ReferencePayload, ReferenceResolver,
    ResolvedBibliography, anchor_from_reference, attach_bibliography,
};
pub use index::{IndexEntry, IndexGroup, IndexItem, IndexOccurrence, IndexResolver, attach_index};
pub use reference::{Address, Author, Date, Format, Front, Organization, Reference, SeriesInfo};
