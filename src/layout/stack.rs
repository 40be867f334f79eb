//! LIFO stacks for the left margin and active ANSI styles.

use crate::util::display_width;

/// A plain LIFO stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// The most recently pushed item.
    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Number of entries on the stack.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: AsRef<[u8]>> Stack<T> {
    /// Concatenation of all entries in push order.
    pub fn flatten(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.items.iter().map(|i| i.as_ref().len()).sum());
        for item in &self.items {
            out.extend_from_slice(item.as_ref());
        }
        out
    }

    /// Columns taken by the flattened stack.
    pub fn width(&self) -> usize {
        self.items.iter().map(|i| display_width(i.as_ref())).sum()
    }

    /// Columns taken by the top entry.
    pub fn peek_width(&self) -> usize {
        self.peek().map_or(0, |i| display_width(i.as_ref()))
    }
}

/// Stack of active ANSI escape codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleStack {
    codes: Stack<&'static str>,
}

impl StyleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: &'static str) {
        self.codes.push(code);
    }

    pub fn pop(&mut self) -> Option<&'static str> {
        self.codes.pop()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Replay every active code, bottom first, into `sink`.
    pub fn print(&self, sink: &mut Vec<u8>) {
        for code in self.codes.iter() {
            sink.extend_from_slice(code.as_bytes());
        }
    }
}
