//! Text layout of a resolved document tree.
//!
//! [`LayoutEngine`] walks the tree once with enter/exit events and produces a
//! single wrapped, indented and optionally ANSI-styled text stream:
//!
//! - Block quotes, asides and lists push onto an indent stack whose
//!   concatenation is the left margin of every emitted line
//! - Paragraphs are buffered, word-wrapped to the remaining width and
//!   re-indented; list markers are written over the first line's margin
//! - Tables are measured in a throwaway pass before they are drawn
//! - Deferred footnotes and links emit a short marker inline and their
//!   definitions once, after the walk
//!
//! # Example
//!
//! ```
//! use folio::ir::{Document, NodeId, NodeKind};
//! use folio::layout::LayoutEngine;
//! use folio::RenderConfig;
//!
//! let mut doc = Document::new();
//! let para = doc.append(NodeId::ROOT, NodeKind::Paragraph);
//! doc.append_text(para, "Hello,   world!");
//!
//! let mut engine = LayoutEngine::with_config(RenderConfig::default().with_width(40));
//! assert_eq!(engine.render(&doc), "Hello, world!\n");
//! ```

mod ansi;
mod backmatter;
mod stack;
mod table;
mod wrap;

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::mem;

use log::debug;

use crate::config::RenderConfig;
use crate::ir::{CitationType, Document, ListFlags, NodeId, NodeKind, WalkEvent};
use crate::util::collapse_spaces;

pub use stack::{Stack, StyleStack};
use table::{TableRegion, TableState};

/// Margin pushed by block quotes and asides.
const QUOTE: &[u8] = b"| ";
/// Extra indentation of code block lines.
const CODE_INDENT: &[u8] = b"   ";
/// Indentation of deferred definitions in the epilogue.
const DEFERRED_INDENT: &str = "   ";

/// Trait for writing a rendered document to an output stream.
pub trait Exporter {
    /// Render `doc` and write the result to `writer`.
    fn export<W: Write>(&mut self, doc: &Document, writer: &mut W) -> io::Result<()>;
}

/// Epilogue text keyed by the ids already written to it.
#[derive(Debug, Clone, Default)]
struct DeferredBuffer {
    text: Vec<u8>,
    seen: HashSet<String>,
}

impl DeferredBuffer {
    /// Record `id`; false if it was recorded before.
    fn insert(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }
}

/// Text transform installed while a heading is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum HeadingTransform {
    #[default]
    Identity,
    Center,
    UpperCenter,
}

impl HeadingTransform {
    /// Per-emission part of the transform.
    fn apply(self, text: &str) -> Cow<'_, str> {
        match self {
            HeadingTransform::UpperCenter => Cow::Owned(text.to_uppercase()),
            HeadingTransform::Identity | HeadingTransform::Center => Cow::Borrowed(text),
        }
    }

    /// Whether the heading is centered when the transform is removed.
    fn centers(self) -> bool {
        self != HeadingTransform::Identity
    }
}

/// Paragraph being buffered: where it starts and where hard breaks fall.
#[derive(Debug, Clone, Default)]
struct ParagraphScratch {
    start: usize,
    breaks: Vec<usize>,
}

/// Everything that lives for the duration of one render.
#[derive(Debug, Default)]
struct LayoutState {
    buf: Vec<u8>,
    indent: Stack<Vec<u8>>,
    styles: StyleStack,
    transform: HeadingTransform,
    heading_start: usize,
    suppress_blank: bool,
    paragraphs: Vec<ParagraphScratch>,
    /// Next ordinal of each open list, innermost last.
    lists: Vec<u32>,
    tables: Vec<TableState>,
    /// Nesting depth of table measurement passes.
    measuring: usize,
    footnotes: DeferredBuffer,
    links: DeferredBuffer,
}

/// Renders a [`Document`] to text.
///
/// The engine can be reused: every call to [`render`](Self::render) starts
/// from fresh state.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: RenderConfig,
    state: LayoutState,
}

impl LayoutEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the specified configuration.
    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            state: LayoutState::default(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of entries on the indent stack.
    ///
    /// Zero whenever no render is in progress.
    pub fn indent_depth(&self) -> usize {
        self.state.indent.len()
    }

    /// Render the whole document.
    pub fn render(&mut self, doc: &Document) -> String {
        self.state = LayoutState::default();
        self.render_subtree(doc, doc.root());
        self.flush_deferred();

        let out = wrap::postprocess(&mem::take(&mut self.state.buf));
        debug!(
            "rendered {} nodes into {} bytes",
            doc.node_count(),
            out.len()
        );
        String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    fn render_subtree(&mut self, doc: &Document, root: NodeId) {
        let mut walk = doc.walk(root);
        while let Some(event) = walk.next() {
            match event {
                WalkEvent::Enter(id) => {
                    if !self.enter(doc, id) {
                        walk.skip_children();
                    }
                }
                WalkEvent::Exit(id) => self.exit(doc, id),
            }
        }
    }

    /// Handle an enter event. Returns false if the children were already
    /// rendered or must not be.
    fn enter(&mut self, doc: &Document, id: NodeId) -> bool {
        match doc.kind(id) {
            NodeKind::Document | NodeKind::DocumentMatter { .. } | NodeKind::ListItem { .. } => true,
            NodeKind::Title { content } => {
                self.out(content);
                self.endline();
                self.newline();
                false
            }
            NodeKind::Text { literal } => {
                let in_cell = doc
                    .parent(id)
                    .is_some_and(|p| matches!(doc.kind(p), NodeKind::TableCell { .. }));
                if !(in_cell && literal.trim().is_empty()) {
                    self.out(literal);
                }
                false
            }
            NodeKind::Softbreak => {
                self.out(" ");
                false
            }
            NodeKind::Hardbreak => {
                self.hard_break();
                false
            }
            NodeKind::Emph => {
                self.push_style(ansi::ITALICS);
                true
            }
            NodeKind::Strong => {
                self.push_style(ansi::BOLD);
                true
            }
            NodeKind::Del => {
                self.push_style(ansi::STRIKETHROUGH);
                true
            }
            NodeKind::Code { literal } => {
                self.delimited("`", literal);
                false
            }
            NodeKind::Math { literal } => {
                self.delimited("$", literal);
                false
            }
            NodeKind::Subscript { literal } => {
                self.delimited("~", literal);
                false
            }
            NodeKind::Superscript { literal } => {
                self.delimited("^", literal);
                false
            }
            NodeKind::HtmlSpan { literal } => {
                self.out(literal);
                false
            }
            NodeKind::Callout { id } => {
                self.out("<<");
                self.out(id);
                self.out(">>");
                false
            }
            NodeKind::CrossReference { destination } => {
                self.push_style(ansi::UNDERLINE);
                self.out("(#");
                self.out(destination);
                self.out(")");
                self.pop_style();
                false
            }
            NodeKind::Link {
                destination,
                title,
                footnote_id,
                deferred_id,
            } => {
                match footnote_id {
                    Some(_) => self.footnote(title, deferred_id.as_deref()),
                    None => self.link(doc, id, destination, title, deferred_id.as_deref()),
                }
                false
            }
            NodeKind::Image { destination, title } => {
                self.out("![");
                for child in doc.children(id) {
                    self.render_subtree(doc, child);
                }
                self.out("](");
                self.out(destination);
                if !title.is_empty() {
                    self.out(" \"");
                    self.out(title);
                    self.out("\"");
                }
                self.out(")");
                false
            }
            NodeKind::Citation {
                destinations,
                types,
            } => {
                self.citation(destinations, types);
                false
            }
            NodeKind::IndexMarker {
                item,
                subitem,
                primary,
                ..
            } => {
                self.out(if *primary { "(!!" } else { "(!" });
                self.out(item);
                if let Some(subitem) = subitem {
                    self.out(", ");
                    self.out(subitem);
                }
                self.out(")");
                false
            }
            NodeKind::IncludeError { path, message } => {
                self.out(&format!("[include \"{path}\": {message}]"));
                false
            }
            NodeKind::Heading { level, special } => {
                self.enter_heading(*level, *special);
                true
            }
            NodeKind::Paragraph => {
                self.state.paragraphs.push(ParagraphScratch {
                    start: self.state.buf.len(),
                    breaks: Vec::new(),
                });
                true
            }
            NodeKind::List { ordered, start, .. } => {
                self.enter_list(doc, id, *ordered, *start);
                true
            }
            NodeKind::Table => {
                self.enter_table(doc, id);
                true
            }
            NodeKind::TableHeader => {
                self.set_table_region(TableRegion::Header);
                true
            }
            NodeKind::TableBody => {
                self.set_table_region(TableRegion::Body);
                true
            }
            NodeKind::TableFooter => {
                self.set_table_region(TableRegion::Footer);
                true
            }
            NodeKind::TableRow => {
                self.enter_table_row();
                true
            }
            NodeKind::TableCell { .. } => {
                self.enter_table_cell();
                true
            }
            NodeKind::BlockQuote | NodeKind::Aside => {
                self.push_indent(QUOTE);
                true
            }
            NodeKind::CodeBlock { literal } => {
                self.code_block(literal);
                false
            }
            NodeKind::MathBlock { literal } => {
                self.math_block(literal);
                if !doc.is_last(id) {
                    self.newline();
                }
                false
            }
            NodeKind::HtmlBlock { literal } => {
                let margin = self.margin();
                for line in literal.trim_end_matches('\n').split('\n') {
                    self.raw(&margin);
                    self.out(line);
                    self.endline();
                }
                self.newline();
                false
            }
            NodeKind::HorizontalRule => {
                self.newline();
                self.out_margin();
                self.out("********");
                self.endline();
                self.newline();
                false
            }
            NodeKind::Caption => {
                let label = match doc.prev_sibling(id).map(|p| doc.kind(p)) {
                    Some(NodeKind::BlockQuote) => "Quote: ",
                    Some(NodeKind::Table) => "Table: ",
                    Some(NodeKind::CodeBlock { .. }) => "Figure: ",
                    _ => "",
                };
                self.out_margin();
                self.out(label);
                true
            }
            NodeKind::CaptionFigure => true,
            NodeKind::ReferenceBlock { .. } => false,
            NodeKind::Bibliography { kind } => {
                self.bibliography_header(*kind);
                true
            }
            NodeKind::BibliographyItem(item) => {
                self.bibliography_item(item);
                false
            }
            NodeKind::Index => {
                self.index_header();
                true
            }
            NodeKind::IndexLetter { letter } => {
                self.index_letter(letter);
                false
            }
            NodeKind::IndexItem(item) => {
                self.index_item(item);
                false
            }
        }
    }

    fn exit(&mut self, doc: &Document, id: NodeId) {
        match doc.kind(id) {
            NodeKind::Emph | NodeKind::Strong | NodeKind::Del => self.pop_style(),
            NodeKind::Heading { .. } => self.exit_heading(),
            NodeKind::Paragraph => self.exit_paragraph(doc, id),
            NodeKind::List { .. } => {
                self.pop_indent();
                self.state.lists.pop();
                self.newline();
            }
            NodeKind::Table => self.exit_table(),
            NodeKind::TableRow => self.exit_table_row(),
            NodeKind::TableCell { align, colspan, .. } => self.exit_table_cell(*align, *colspan),
            NodeKind::BlockQuote => {
                self.pop_indent();
                self.newline();
            }
            NodeKind::Aside => {
                self.pop_indent();
                if !doc.is_last(id) {
                    self.newline();
                }
            }
            NodeKind::Caption => {
                self.endline();
                self.newline();
            }
            NodeKind::CaptionFigure | NodeKind::Bibliography { .. } | NodeKind::Index => {
                self.newline()
            }
            NodeKind::Document
            | NodeKind::Title { .. }
            | NodeKind::DocumentMatter { .. }
            | NodeKind::Text { .. }
            | NodeKind::Softbreak
            | NodeKind::Hardbreak
            | NodeKind::Code { .. }
            | NodeKind::Math { .. }
            | NodeKind::Subscript { .. }
            | NodeKind::Superscript { .. }
            | NodeKind::HtmlSpan { .. }
            | NodeKind::Callout { .. }
            | NodeKind::CrossReference { .. }
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::Citation { .. }
            | NodeKind::IndexMarker { .. }
            | NodeKind::IncludeError { .. }
            | NodeKind::ListItem { .. }
            | NodeKind::TableHeader
            | NodeKind::TableBody
            | NodeKind::TableFooter
            | NodeKind::CodeBlock { .. }
            | NodeKind::MathBlock { .. }
            | NodeKind::HtmlBlock { .. }
            | NodeKind::HorizontalRule
            | NodeKind::ReferenceBlock { .. }
            | NodeKind::BibliographyItem(_)
            | NodeKind::IndexLetter { .. }
            | NodeKind::IndexItem(_) => {}
        }
    }

    // --- emission primitives ---

    fn width(&self) -> usize {
        self.config.text_width()
    }

    fn margin(&self) -> Vec<u8> {
        self.state.indent.flatten()
    }

    /// Columns left for text after the current margin.
    fn text_width(&self) -> usize {
        self.width().saturating_sub(self.state.indent.width()).max(1)
    }

    /// Write content through the active heading transform.
    fn out(&mut self, text: &str) {
        let text = self.state.transform.apply(text);
        self.state.buf.extend_from_slice(text.as_bytes());
        self.state.suppress_blank = false;
    }

    /// Write already laid out bytes.
    fn raw(&mut self, data: &[u8]) {
        self.state.buf.extend_from_slice(data);
        self.state.suppress_blank = false;
    }

    fn out_margin(&mut self) {
        let margin = self.margin();
        self.raw(&margin);
    }

    fn endline(&mut self) {
        self.raw(b"\n");
    }

    /// Emit a blank separator line unless one was just emitted.
    fn newline(&mut self) {
        if self.state.suppress_blank {
            return;
        }
        let margin = self.margin();
        self.state.buf.extend_from_slice(&margin);
        self.state.buf.push(b'\n');
        self.state.suppress_blank = true;
    }

    fn push_indent(&mut self, prefix: &[u8]) {
        self.state.indent.push(prefix.to_vec());
    }

    fn pop_indent(&mut self) {
        self.state.indent.pop();
        if self.state.indent.width() == 0 {
            self.state.suppress_blank = false;
        }
    }

    fn push_style(&mut self, code: &'static str) {
        if !self.config.ansi {
            return;
        }
        self.state.styles.push(code);
        self.state.buf.extend_from_slice(code.as_bytes());
    }

    /// Reset all styling, then restore what is still active.
    fn pop_style(&mut self) {
        if !self.config.ansi {
            return;
        }
        self.state.styles.pop();
        self.state.buf.extend_from_slice(ansi::RESET.as_bytes());
        self.state.styles.print(&mut self.state.buf);
    }

    fn delimited(&mut self, delimiter: &str, literal: &str) {
        self.out(delimiter);
        self.out(literal);
        self.out(delimiter);
    }

    // --- blocks ---

    fn enter_heading(&mut self, level: u8, special: bool) {
        self.state.transform = match level {
            1 => HeadingTransform::UpperCenter,
            2 => HeadingTransform::Center,
            _ if special => HeadingTransform::Center,
            _ => HeadingTransform::Identity,
        };
        self.state.heading_start = self.state.buf.len();
        self.push_style(ansi::BOLD);
    }

    fn exit_heading(&mut self) {
        self.pop_style();
        let transform = mem::take(&mut self.state.transform);
        let start = self.state.heading_start.min(self.state.buf.len());
        let content = self.state.buf.split_off(start);

        let text = if transform.centers() {
            wrap::center(&content, self.width())
        } else {
            wrap::indent(&wrap::wrap(&content, self.text_width()), &self.margin())
        };
        self.raw(&text);
        self.newline();
    }

    fn hard_break(&mut self) {
        let at = self.state.buf.len();
        match self.state.paragraphs.last_mut() {
            Some(paragraph) => paragraph.breaks.push(at),
            None => {
                self.endline();
                self.out_margin();
            }
        }
    }

    fn exit_paragraph(&mut self, doc: &Document, id: NodeId) {
        let Some(scratch) = self.state.paragraphs.pop() else {
            return;
        };
        let start = scratch.start.min(self.state.buf.len());
        let content = self.state.buf.split_off(start);

        let width = self.text_width();
        let mut lines = Vec::new();
        let mut from = 0;
        for at in scratch.breaks {
            let to = at.saturating_sub(start).clamp(from, content.len());
            lines.extend(wrap::wrap(&collapse_spaces(&content[from..to]), width));
            from = to;
        }
        lines.extend(wrap::wrap(&collapse_spaces(&content[from..]), width));
        if lines.is_empty() {
            lines.push(Vec::new());
        }

        let mut text = wrap::indent(&lines, &self.margin());
        let parent = doc.parent(id);
        if doc.prev_sibling(id).is_none()
            && let Some(parent) = parent
            && let NodeKind::ListItem { flags } = doc.kind(parent)
        {
            self.mark_list_item(&mut text, *flags);
        }
        self.raw(&text);

        let in_figure = parent.is_some_and(|p| matches!(doc.kind(p), NodeKind::CaptionFigure));
        if !in_figure && !doc.is_last(id) {
            self.newline();
        }
    }

    /// Overwrite the list's share of the first line's margin with the item
    /// marker.
    fn mark_list_item(&mut self, text: &mut [u8], flags: ListFlags) {
        let at = self.state.indent.width() - self.state.indent.peek_width();
        let marker: Cow<'_, [u8]> = match flags {
            ListFlags::Ordered => {
                let ordinal = match self.state.lists.last_mut() {
                    Some(next) => {
                        let ordinal = *next;
                        *next += 1;
                        ordinal
                    }
                    None => 1,
                };
                Cow::Owned(format!("{ordinal}. ").into_bytes())
            }
            ListFlags::Unordered if self.state.lists.len() % 2 == 1 => Cow::Borrowed(&b"o  "[..]),
            ListFlags::Unordered => Cow::Borrowed(&b"+  "[..]),
            ListFlags::Term => Cow::Borrowed(&b"*  "[..]),
            ListFlags::Definition => Cow::Borrowed(&b"   "[..]),
        };

        let line_end = memchr::memchr(b'\n', text).unwrap_or(text.len());
        for (i, &b) in marker.iter().enumerate() {
            if at + i >= line_end {
                break;
            }
            text[at + i] = b;
        }
    }

    fn enter_list(&mut self, doc: &Document, id: NodeId, ordered: bool, start: u32) {
        let start = start.max(1);
        let width = if ordered {
            list_prefix_width(doc.children(id).count() + start as usize)
        } else {
            3
        };
        self.push_indent(&vec![b' '; width]);
        self.state.lists.push(start);
    }

    fn code_block(&mut self, literal: &str) {
        let mut prefix = self.margin();
        prefix.extend_from_slice(CODE_INDENT);
        let body = literal.strip_suffix('\n').unwrap_or(literal);
        for line in body.split('\n') {
            let line = replace_callout(line, &self.config.comments);
            self.raw(&prefix);
            self.raw(line.as_bytes());
            self.endline();
        }
        self.newline();
    }

    fn math_block(&mut self, literal: &str) {
        let margin = self.margin();
        self.raw(&margin);
        self.out("$$");
        self.endline();
        for line in literal.trim_end_matches('\n').split('\n') {
            self.raw(&margin);
            self.out(line);
            self.endline();
        }
        self.raw(&margin);
        self.out("$$");
        self.endline();
    }

    // --- inline ---

    fn citation(&mut self, destinations: &[String], types: &[CitationType]) {
        let shown: Vec<&str> = destinations
            .iter()
            .enumerate()
            .filter(|(i, _)| types.get(*i) != Some(&CitationType::Suppressed))
            .map(|(_, d)| d.as_str())
            .collect();
        if shown.is_empty() {
            return;
        }
        self.out("[");
        self.out(&shown.join(", "));
        self.out("]");
    }

    fn footnote(&mut self, text: &str, deferred_id: Option<&str>) {
        let Some(deferred) = deferred_id else {
            self.out("^[");
            self.out(text);
            self.out("]");
            return;
        };

        // the marker must match its definition
        self.raw(format!("[^{deferred}]").as_bytes());
        if self.state.measuring == 0 && self.state.footnotes.insert(deferred) {
            let definition = format!("{DEFERRED_INDENT}[^{deferred}]: {text}\n");
            self.state.footnotes.text.extend_from_slice(definition.as_bytes());
        }
    }

    fn link(
        &mut self,
        doc: &Document,
        id: NodeId,
        destination: &str,
        title: &str,
        deferred_id: Option<&str>,
    ) {
        self.push_style(ansi::UNDERLINE);
        let text_start = self.state.buf.len();
        for child in doc.children(id) {
            if matches!(doc.kind(child), NodeKind::Text { literal } if literal == destination) {
                continue;
            }
            self.render_subtree(doc, child);
        }
        let has_text = self.state.buf.len() > text_start;
        self.pop_style();

        let Some(deferred) = deferred_id else {
            self.out(if has_text { " <" } else { "<" });
            self.out(destination);
            self.out(">");
            if !title.is_empty() {
                self.out(" \"");
                self.out(title);
                self.out("\"");
            }
            return;
        };

        self.raw(format!("[{deferred}]").as_bytes());
        if self.state.measuring == 0 && self.state.links.insert(deferred) {
            let mut definition = format!("{DEFERRED_INDENT}[{deferred}]: {destination}");
            if !title.is_empty() {
                let _ = write!(definition, " \"{title}\"");
            }
            definition.push('\n');
            self.state.links.text.extend_from_slice(definition.as_bytes());
        }
    }

    /// Append the deferred footnote and link definitions, footnotes first.
    fn flush_deferred(&mut self) {
        let footnotes = mem::take(&mut self.state.footnotes.text);
        if !footnotes.is_empty() {
            let header = self.config.terms.footnotes.clone();
            self.endline();
            self.out(&header);
            self.endline();
            self.endline();
            self.raw(&footnotes);
        }
        let links = mem::take(&mut self.state.links.text);
        if !links.is_empty() {
            self.endline();
            self.raw(&links);
        }
    }
}

impl Exporter for LayoutEngine {
    fn export<W: Write>(&mut self, doc: &Document, writer: &mut W) -> io::Result<()> {
        let text = self.render(doc);
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }
}

/// Indent width of an ordered list whose last ordinal is below `count`.
fn list_prefix_width(count: usize) -> usize {
    match count {
        0..=9 => 3,
        10..=99 => 4,
        100..=999 => 5,
        _ => 6,
    }
}

/// Rewrite a `<<N>>` callout that follows one of `comments` as `<N>`.
fn replace_callout<'a>(line: &'a str, comments: &[String]) -> Cow<'a, str> {
    let Some(open) = line.find("<<") else {
        return Cow::Borrowed(line);
    };
    let before = line[..open].trim_end();
    if !comments.iter().any(|c| !c.is_empty() && before.ends_with(c.as_str())) {
        return Cow::Borrowed(line);
    }
    let rest = &line[open + 2..];
    let Some(close) = rest.find(">>") else {
        return Cow::Borrowed(line);
    };
    let callout = &rest[..close];
    if callout.is_empty() || !callout.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Cow::Borrowed(line);
    }
    Cow::Owned(format!("{}<{}>{}", &line[..open], callout, &rest[close + 2..]))
}
