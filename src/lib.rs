//! # folio
//!
//! Cross-reference resolution and terminal text layout for annotated
//! document trees (RFC-style markdown documents after parsing).
//!
//! ## Features
//!
//! - Arena-based document tree with a closed set of node kinds
//! - Citation collection into normative and informative bibliography groups,
//!   with embedded `<reference>` markup parsed into structured data
//! - Back-of-book index built from inline index markers
//! - Text layout with word wrapping, nested margins, tables, ANSI styling and
//!   deferred footnote/link definitions
//!
//! ## Quick Start
//!
//! ```
//! use folio::ir::{CitationType, Document, Matter, NodeId, NodeKind};
//! use folio::resolve::attach_bibliography;
//! use folio::{LayoutEngine, RenderConfig};
//!
//! let mut doc = Document::new();
//! let para = doc.append(NodeId::ROOT, NodeKind::Paragraph);
//! doc.append_text(para, "Keywords are defined in ");
//! doc.append(
//!     para,
//!     NodeKind::Citation {
//!         destinations: vec!["RFC2119".into()],
//!         types: vec![CitationType::Normative],
//!     },
//! );
//! doc.append(NodeId::ROOT, NodeKind::DocumentMatter { matter: Matter::Back });
//! assert!(attach_bibliography(&mut doc));
//!
//! let text = LayoutEngine::with_config(RenderConfig::default()).render(&doc);
//! assert!(text.starts_with("Keywords are defined in [RFC2119]\n"));
//! assert!(text.contains("Bibliography (Normative)"));
//! ```

pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod resolve;
pub(crate) mod util;

pub use config::{RenderConfig, Terms};
pub use error::{Error, Result};
pub use ir::{Document, NodeId, NodeKind};
pub use layout::{Exporter, LayoutEngine};
