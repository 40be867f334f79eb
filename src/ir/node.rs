//! IR node types and kinds.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::resolve::{BibliographyItem, IndexItem};

/// Unique identifier for a node within a [`Document`](super::Document).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a citation affects bibliography bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CitationType {
    #[default]
    Informative,
    Normative,
    /// Cited but not shown inline; bucketed with the normative references.
    Suppressed,
}

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Align {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Which part of the document a matter marker opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Matter {
    Front,
    Main,
    Back,
}

/// Kind of list a list item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ListFlags {
    #[default]
    Unordered,
    Ordered,
    /// Term in a definition list.
    Term,
    /// Definition body in a definition list.
    Definition,
}

/// Semantic kind of a node, together with its kind-specific payload.
///
/// The set is closed: every consumer matches it exhaustively, so adding a
/// kind is a compile error in each renderer until it is handled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum NodeKind {
    /// Root document node.
    Document,
    /// Title block rendered verbatim at the top of the document.
    Title { content: String },
    /// Front/main/back matter marker. Back matter is where the bibliography goes.
    DocumentMatter { matter: Matter },

    // --- leaves and inline containers ---
    Text { literal: String },
    Softbreak,
    Hardbreak,
    Emph,
    Strong,
    Del,
    Code { literal: String },
    Math { literal: String },
    Subscript { literal: String },
    Superscript { literal: String },
    HtmlSpan { literal: String },
    Callout { id: String },
    CrossReference { destination: String },
    /// Inline link. A link with a `footnote_id` is a footnote whose text is
    /// carried in `title`. A `deferred_id` moves the definition to the epilogue.
    Link {
        destination: String,
        #[cfg_attr(feature = "serde", serde(default))]
        title: String,
        #[cfg_attr(feature = "serde", serde(default))]
        footnote_id: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        deferred_id: Option<String>,
    },
    Image {
        destination: String,
        #[cfg_attr(feature = "serde", serde(default))]
        title: String,
    },
    /// Parallel arrays: `types[i]` is the citation type of `destinations[i]`.
    Citation {
        destinations: Vec<String>,
        types: Vec<CitationType>,
    },
    IndexMarker {
        item: String,
        #[cfg_attr(feature = "serde", serde(default))]
        subitem: Option<String>,
        #[cfg_attr(feature = "serde", serde(default))]
        primary: bool,
        id: String,
    },
    /// Inlined content that could not be read by the include collaborator.
    IncludeError { path: String, message: String },

    // --- blocks ---
    Heading {
        level: u8,
        #[cfg_attr(feature = "serde", serde(default))]
        special: bool,
    },
    Paragraph,
    List {
        #[cfg_attr(feature = "serde", serde(default))]
        ordered: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        definition: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        term: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        start: u32,
    },
    ListItem {
        #[cfg_attr(feature = "serde", serde(default))]
        flags: ListFlags,
    },
    Table,
    TableHeader,
    TableBody,
    TableFooter,
    TableRow,
    TableCell {
        #[cfg_attr(feature = "serde", serde(default))]
        header: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        align: Align,
        #[cfg_attr(feature = "serde", serde(default = "one"))]
        colspan: u32,
    },
    BlockQuote,
    Aside,
    CodeBlock { literal: String },
    MathBlock { literal: String },
    HtmlBlock { literal: String },
    HorizontalRule,
    Caption,
    CaptionFigure,
    /// Inline literal `<reference>` markup.
    ReferenceBlock { raw: Vec<u8> },

    // --- produced by the resolvers ---
    /// One bibliography group; children are `BibliographyItem`s of `kind`.
    Bibliography { kind: CitationType },
    BibliographyItem(BibliographyItem),
    /// Back-of-book index; children are `IndexLetter` and `IndexItem` nodes.
    Index,
    IndexLetter { letter: String },
    IndexItem(IndexItem),
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

impl NodeKind {
    /// Create a text leaf.
    pub fn text(literal: impl Into<String>) -> Self {
        NodeKind::Text {
            literal: literal.into(),
        }
    }
}

/// A node in the IR tree.
///
/// Nodes are owned by the document arena. `parent` is a lookup-only
/// back reference; ownership flows strictly from parent to children.
#[derive(Debug, Clone)]
pub struct Node {
    /// Semantic kind and payload.
    pub kind: NodeKind,
    /// Parent node (None for root).
    pub parent: Option<NodeId>,
    /// First child node.
    pub first_child: Option<NodeId>,
    /// Last child node, kept so appends are O(1).
    pub last_child: Option<NodeId>,
    /// Previous sibling node.
    pub prev_sibling: Option<NodeId>,
    /// Next sibling node.
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Create a detached node.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    /// Create a detached text node.
    pub fn text(literal: impl Into<String>) -> Self {
        Self::new(NodeKind::text(literal))
    }
}
