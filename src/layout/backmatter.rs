//! Rendering of the bibliography and index sections.

use super::{LayoutEngine, ansi, wrap};
use crate::ir::CitationType;
use crate::resolve::{BibliographyItem, IndexItem, IndexOccurrence, ReferencePayload};
use crate::util::{decode_text, display_width};

/// Hanging indent of continuation lines and nested entries.
const ENTRY_INDENT: &[u8] = b"   ";

fn occurrence_label(occurrence: &IndexOccurrence) -> String {
    if occurrence.primary {
        format!("!{}", occurrence.id)
    } else {
        occurrence.id.clone()
    }
}

fn join_occurrences<'a>(occurrences: impl IntoIterator<Item = &'a IndexOccurrence>) -> String {
    occurrences
        .into_iter()
        .map(occurrence_label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LayoutEngine {
    fn section_header(&mut self, title: &str) {
        self.newline();
        self.out_margin();
        self.push_style(ansi::BOLD);
        self.out(title);
        self.pop_style();
        self.endline();
        self.newline();
    }

    /// Write `text` wrapped, the first line after `first` and the rest after
    /// `first` plus a hanging indent.
    fn hanging(&mut self, text: &str, first: &[u8]) {
        let mut rest = first.to_vec();
        rest.extend_from_slice(ENTRY_INDENT);
        let width = self.width().saturating_sub(display_width(&rest));
        for (i, line) in wrap::wrap(text.as_bytes(), width).iter().enumerate() {
            self.raw(if i == 0 { first } else { &rest[..] });
            self.raw(line);
            self.endline();
        }
    }

    pub(super) fn bibliography_header(&mut self, kind: CitationType) {
        let terms = &self.config.terms;
        let group = match kind {
            CitationType::Informative => &terms.informative,
            CitationType::Normative | CitationType::Suppressed => &terms.normative,
        };
        let title = format!("{} ({group})", terms.bibliography);
        self.section_header(&title);
    }

    pub(super) fn bibliography_item(&mut self, item: &BibliographyItem) {
        let margin = self.margin();
        let label = format!("[{}]", item.anchor);
        match &item.payload {
            ReferencePayload::Parsed(reference) => {
                let text = format!("{label} {}", reference.citation_text());
                self.hanging(&text, &margin);
            }
            ReferencePayload::Raw(raw) => {
                self.raw(&margin);
                self.out(&label);
                self.endline();
                let mut indent = margin;
                indent.extend_from_slice(ENTRY_INDENT);
                for line in decode_text(raw, None).lines() {
                    self.raw(&indent);
                    self.out(line.trim_end());
                    self.endline();
                }
            }
            ReferencePayload::Unresolved => {
                self.raw(&margin);
                self.out(&label);
                self.endline();
            }
        }
        self.newline();
    }

    pub(super) fn index_header(&mut self) {
        let title = self.config.terms.index.clone();
        self.section_header(&title);
    }

    pub(super) fn index_letter(&mut self, letter: &str) {
        self.newline();
        self.out_margin();
        self.out(&letter.to_uppercase());
        self.endline();
    }

    pub(super) fn index_item(&mut self, item: &IndexItem) {
        let mut first = self.margin();
        first.extend_from_slice(ENTRY_INDENT);

        let main = join_occurrences(item.main_occurrences());
        let line = if main.is_empty() {
            item.item.clone()
        } else {
            format!("{}: {main}", item.item)
        };
        self.hanging(&line, &first);

        first.extend_from_slice(ENTRY_INDENT);
        for (subitem, occurrences) in item.subitems() {
            let line = format!("{subitem}: {}", join_occurrences(occurrences));
            self.hanging(&line, &first);
        }
    }
}
