//! Two-pass table layout: measure every column, then draw.

use std::iter;

use bstr::ByteSlice;

use super::LayoutEngine;
use crate::ir::{Align, Document, NodeId, NodeKind};
use crate::util::display_width;

/// Which part of a table the current rows belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) enum TableRegion {
    Header,
    #[default]
    Body,
    Footer,
}

/// Column layout of the table being drawn.
#[derive(Debug, Clone, Default)]
pub(super) struct TableState {
    widths: Vec<usize>,
    aligns: Vec<Align>,
    region: TableRegion,
    col: usize,
    cell_start: usize,
}

impl TableState {
    /// Columns available to a cell's content, including the padding column.
    fn cell_area(&self, col: usize, span: usize) -> usize {
        let end = (col + span).min(self.widths.len());
        let col = col.min(end);
        // every column is one wider than its content, spans absorb the separators
        let area: usize =
            self.widths[col..end].iter().map(|w| w + 1).sum::<usize>() + (end - col).saturating_sub(1);
        // cells after the first start with a space
        if col > 0 { area.saturating_sub(1) } else { area }
    }
}

/// Row nodes of a table, in order, whether or not they are grouped into
/// header, body and footer sections.
fn table_rows(doc: &Document, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in doc.children(table) {
        match doc.kind(child) {
            NodeKind::TableRow => rows.push(child),
            NodeKind::TableHeader | NodeKind::TableBody | NodeKind::TableFooter => rows.extend(
                doc.children(child)
                    .filter(|&row| matches!(doc.kind(row), NodeKind::TableRow)),
            ),
            _ => {}
        }
    }
    rows
}

/// A separator rule of `fill` characters, one segment per column.
fn rule(widths: &[usize], fill: u8) -> Vec<u8> {
    let mut line = Vec::new();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push(b'|');
        }
        line.extend(iter::repeat_n(fill, width + 1));
    }
    line
}

impl LayoutEngine {
    /// Measure the column widths of `table`: the widest rendered cell of
    /// each column plus one column of padding.
    ///
    /// Cells are rendered into a scratch buffer; nothing is written to the
    /// output and no deferred definitions are recorded.
    pub fn measure_columns(&mut self, doc: &Document, table: NodeId) -> Vec<usize> {
        self.measure_table(doc, table).0
    }

    fn measure_table(&mut self, doc: &Document, table: NodeId) -> (Vec<usize>, Vec<Align>) {
        let saved = std::mem::take(&mut self.state.buf);
        let suppress_blank = self.state.suppress_blank;
        self.state.measuring += 1;

        let mut widths: Vec<usize> = Vec::new();
        let mut aligns: Vec<Align> = Vec::new();
        for row in table_rows(doc, table) {
            let mut col = 0;
            for cell in doc.children(row) {
                let NodeKind::TableCell { align, colspan, .. } = doc.kind(cell) else {
                    continue;
                };
                let span = (*colspan).max(1) as usize;

                self.state.buf.clear();
                for child in doc.children(cell) {
                    self.render_subtree(doc, child);
                }
                let width = display_width(self.state.buf.trim());

                if widths.len() < col + span {
                    widths.resize(col + span, 0);
                    aligns.resize(col + span, Align::None);
                }
                if span == 1 {
                    widths[col] = widths[col].max(width + 1);
                }
                if aligns[col] == Align::None {
                    aligns[col] = *align;
                }
                col += span;
            }
        }

        self.state.measuring -= 1;
        self.state.buf = saved;
        self.state.suppress_blank = suppress_blank;

        // columns only ever covered by spans
        for width in &mut widths {
            *width = (*width).max(1);
        }
        (widths, aligns)
    }

    pub(super) fn enter_table(&mut self, doc: &Document, table: NodeId) {
        let (widths, aligns) = self.measure_table(doc, table);
        self.state.tables.push(TableState {
            widths,
            aligns,
            ..TableState::default()
        });
    }

    pub(super) fn exit_table(&mut self) {
        self.state.tables.pop();
        self.newline();
    }

    pub(super) fn set_table_region(&mut self, region: TableRegion) {
        if let Some(table) = self.state.tables.last_mut() {
            table.region = region;
        }
    }

    pub(super) fn enter_table_row(&mut self) {
        let Some(table) = self.state.tables.last_mut() else {
            return;
        };
        table.col = 0;
        let footer_rule = (table.region == TableRegion::Footer).then(|| rule(&table.widths, b'='));

        self.out_margin();
        if let Some(footer_rule) = footer_rule {
            self.raw(&footer_rule);
            self.endline();
            self.out_margin();
        }
    }

    pub(super) fn exit_table_row(&mut self) {
        let Some(table) = self.state.tables.last() else {
            return;
        };
        let unfinished = table.col < table.widths.len();
        let header_rule = (table.region == TableRegion::Header).then(|| rule(&table.widths, b'-'));

        if unfinished {
            self.endline();
        }
        if let Some(header_rule) = header_rule {
            self.out_margin();
            self.raw(&header_rule);
            self.endline();
        }
    }

    pub(super) fn enter_table_cell(&mut self) {
        let Some(table) = self.state.tables.last_mut() else {
            return;
        };
        if table.col > 0 {
            self.state.buf.push(b' ');
        }
        table.cell_start = self.state.buf.len();
    }

    pub(super) fn exit_table_cell(&mut self, align: Align, colspan: u32) {
        let Some(table) = self.state.tables.last_mut() else {
            return;
        };
        let span = colspan.max(1) as usize;
        let start = table.cell_start.min(self.state.buf.len());
        // draw exactly what was measured
        let content = self.state.buf[start..].trim().to_vec();
        self.state.buf.truncate(start);
        self.state.buf.extend_from_slice(&content);
        let fill = table
            .cell_area(table.col, span)
            .saturating_sub(display_width(&self.state.buf[start..]));
        let align = match align {
            Align::None => table.aligns.get(table.col).copied().unwrap_or_default(),
            align => align,
        };
        let (left, right) = match align {
            Align::Center => (fill / 2, fill - fill / 2),
            Align::Right => (fill, 0),
            Align::Left | Align::None => (0, fill),
        };
        table.col += span;
        let last = table.col >= table.widths.len();

        self.state
            .buf
            .splice(start..start, iter::repeat_n(b' ', left));
        self.state.buf.extend(iter::repeat_n(b' ', right));
        if last {
            self.endline();
        } else {
            self.raw(b"|");
        }
    }
}
