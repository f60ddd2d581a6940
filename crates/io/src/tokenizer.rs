//! Byte-level line and field splitting shared by the ASCII and PCD parsers.
//!
//! Only ASCII whitespace is recognized: space and tab separate fields, CR and
//! LF separate lines. Nothing here allocates per field; lines and fields are
//! sub-slices of the caller's buffer.

/// Location of one non-blank line inside the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub len: usize,
}

impl LineSpan {
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.start..self.start + self.len]
    }
}

#[inline]
pub fn is_field_separator(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[inline]
pub fn is_line_separator(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|&b| is_field_separator(b))
}

/// Lazy iterator over non-blank lines.
///
/// Besides the span of each line, [`Lines::offset`] exposes where scanning
/// will resume, which the PCD parser uses to find the first byte after the
/// `DATA` line without touching the binary payload.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Byte offset just past the terminator of the last yielded line.
    pub fn offset(&self) -> usize {
        self.pos
    }
}

impl Iterator for Lines<'_> {
    type Item = LineSpan;

    fn next(&mut self) -> Option<LineSpan> {
        while self.pos < self.buf.len() {
            let start = self.pos;
            let len = self.buf[start..]
                .iter()
                .position(|&b| is_line_separator(b))
                .unwrap_or(self.buf.len() - start);

            // Consume a single terminator; CRLF counts as one.
            let mut next = start + len;
            if next < self.buf.len() {
                if self.buf[next] == b'\r' && self.buf.get(next + 1) == Some(&b'\n') {
                    next += 2;
                } else {
                    next += 1;
                }
            }
            self.pos = next;

            if !is_blank(&self.buf[start..start + len]) {
                return Some(LineSpan { start, len });
            }
        }
        None
    }
}

/// Splits one line into whitespace-delimited fields.
pub fn fields(line: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    line.split(|&b| is_field_separator(b) || is_line_separator(b))
        .filter(|f| !f.is_empty())
}

/// Large-file mode: spans of every non-blank line, fields left unsplit.
pub fn line_spans(buf: &[u8]) -> Vec<LineSpan> {
    Lines::new(buf).collect()
}

/// Eager mode: every non-blank line split into its fields.
pub fn tokenize_lines(buf: &[u8]) -> Vec<Vec<&[u8]>> {
    Lines::new(buf)
        .map(|span| fields(span.slice(buf)).collect())
        .collect()
}

/// Field as `&str`; fields that are not valid UTF-8 read as empty.
pub fn field_str(field: &[u8]) -> &str {
    std::str::from_utf8(field).unwrap_or("")
}

/// Locale-independent float parse. Anything unparseable yields `0.0`.
pub fn parse_f64(field: &[u8]) -> f64 {
    field_str(field).parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_skip_blank_lines() {
        let buf = b"1 2 3\n\n  \t \r\n4 5 6\r\n7 8 9";
        let spans = line_spans(buf);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].slice(buf), b"1 2 3");
        assert_eq!(spans[1].slice(buf), b"4 5 6");
        assert_eq!(spans[2].slice(buf), b"7 8 9");
    }

    #[test]
    fn bare_cr_separates_lines() {
        let spans = line_spans(b"a\rb\rc");
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn fields_split_on_spaces_and_tabs() {
        let f: Vec<&[u8]> = fields(b"  1.5\t\t-2  3e2 ").collect();
        assert_eq!(f, vec![&b"1.5"[..], &b"-2"[..], &b"3e2"[..]]);
    }

    #[test]
    fn tokenize_lines_eager() {
        let lines = tokenize_lines(b"FIELDS x y z\nSIZE 4 4 4\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], vec![&b"FIELDS"[..], &b"x"[..], &b"y"[..], &b"z"[..]]);
        assert_eq!(lines[1].len(), 4);
    }

    #[test]
    fn offset_points_past_terminator() {
        let buf = b"DATA binary\r\n\x01\x02";
        let mut lines = Lines::new(buf);
        let span = lines.next().unwrap();
        assert_eq!(span.slice(buf), b"DATA binary");
        assert_eq!(lines.offset(), 13);
    }

    #[test]
    fn parse_defaults_to_zero() {
        assert_eq!(parse_f64(b"2.5"), 2.5);
        assert_eq!(parse_f64(b"-1e3"), -1000.0);
        assert_eq!(parse_f64(b"abc"), 0.0);
        assert_eq!(parse_f64(b""), 0.0);
        assert_eq!(parse_f64(&[0xff, 0xfe]), 0.0);
    }

    #[test]
    fn empty_buffer_has_no_lines() {
        assert!(line_spans(b"").is_empty());
        assert!(tokenize_lines(b"\n\r\n").is_empty());
    }
}
