//! Word wrapping, indentation, centering and output cleanup.

use crate::util::display_width;

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Greedily wrap `data` into lines of at most `width` columns.
///
/// Words are separated by any run of whitespace. A word wider than `width`
/// gets a line of its own. Returned lines carry no trailing newline.
pub fn wrap(data: &[u8], width: usize) -> Vec<Vec<u8>> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line: Vec<u8> = Vec::new();
    let mut line_width = 0;

    for word in data.split(|&b| is_blank(b)).filter(|w| !w.is_empty()) {
        let word_width = display_width(word);
        if !line.is_empty() && line_width + 1 + word_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(b' ');
            line_width += 1;
        }
        line.extend_from_slice(word);
        line_width += word_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Prefix every line with `prefix` and terminate it with a newline.
pub fn indent(lines: &[Vec<u8>], prefix: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(prefix);
        out.extend_from_slice(line);
        out.push(b'\n');
    }
    out
}

/// Wrap `data` to `width` and center each resulting line.
pub fn center(data: &[u8], width: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for line in wrap(data, width) {
        let left = width.saturating_sub(display_width(&line)) / 2;
        out.resize(out.len() + left, b' ');
        out.extend_from_slice(&line);
        out.push(b'\n');
    }
    out
}

/// Strip trailing spaces from every line and keep at most two blank lines
/// at the end of the output.
pub fn postprocess(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for line in data.split(|&b| b == b'\n') {
        let end = line
            .iter()
            .rposition(|&b| b != b' ' && b != b'\t')
            .map_or(0, |p| p + 1);
        out.extend_from_slice(&line[..end]);
        out.push(b'\n');
    }
    // split yields one more piece than there are newlines
    out.pop();

    let content_end = out.iter().rposition(|&b| b != b'\n').map_or(0, |p| p + 1);
    // one newline ends the last line, each further one is a blank line
    let newlines = out.len() - content_end;
    if newlines > 3 {
        out.truncate(content_end + 3);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(data: &[u8], width: usize) -> Vec<String> {
        wrap(data, width)
            .into_iter()
            .map(|l| String::from_utf8(l).unwrap())
            .collect()
    }

    #[test]
    fn test_wrap_greedy() {
        assert_eq!(
            lines(b"the quick brown fox jumps over the lazy dog", 15),
            vec!["the quick brown", "fox jumps over", "the lazy dog"]
        );
    }

    #[test]
    fn test_wrap_width_twenty() {
        let text = b"abcdefghijkl mnopqrstuvw";
        assert_eq!(text.len(), 24);
        for line in wrap(text, 20) {
            assert!(line.len() <= 20);
        }
        assert_eq!(lines(text, 20), vec!["abcdefghijkl", "mnopqrstuvw"]);
    }

    #[test]
    fn test_wrap_long_word_on_its_own_line() {
        assert_eq!(lines(b"a abcdefghij b", 5), vec!["a", "abcdefghij", "b"]);
    }

    #[test]
    fn test_wrap_ignores_escape_width() {
        let text = b"\x1b[1mbold\x1b[0m text";
        assert_eq!(wrap(text, 9).len(), 1);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap(b"   \n ", 10).is_empty());
    }

    #[test]
    fn test_indent() {
        let wrapped = wrap(b"one two", 3);
        assert_eq!(indent(&wrapped, b"| "), b"| one\n| two\n");
    }

    #[test]
    fn test_center() {
        assert_eq!(center(b"abc", 9), b"   abc\n");
        assert_eq!(center(b"abcdef", 4), b"abcdef\n");
    }

    #[test]
    fn test_postprocess_trims_lines() {
        assert_eq!(postprocess(b"a  \nb \t\n"), b"a\nb\n");
    }

    #[test]
    fn test_postprocess_collapses_trailing_blank_lines() {
        assert_eq!(postprocess(b"a\n\n\n\n\n"), b"a\n\n\n");
        assert_eq!(postprocess(b"a\n   \n  \n \n"), b"a\n\n\n");
        assert_eq!(postprocess(b"a\n\n"), b"a\n\n");
        assert_eq!(postprocess(b"a\n\n\n\nb\n"), b"a\n\n\n\nb\n");
    }
}
