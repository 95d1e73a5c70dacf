use serde::Serialize;
use std::fmt;

/// Location in a source text (either a grammar or a parsed subject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    /// Byte offset from the beginning of the source
    pub offset: usize,

    /// Line number, starting at 1
    pub line: usize,

    /// Column number in characters, starting at 1
    pub column: usize,
}

impl SourceLocation {
    /// Location of the very first character of a source
    pub const START: Self = Self {
        offset: 0,
        line: 1,
        column: 1,
    };

    /// Compute the location of a byte offset in a source
    ///
    /// Offsets past the end of the source are clamped to its length.
    pub fn of(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut loc = Self::START;

        for c in source[..offset].chars() {
            loc.advance(c);
        }

        loc
    }

    /// Move the location after a character
    pub fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();

        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A range in a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Span {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Compute a span from two byte offsets in a source
    pub fn of(source: &str, start: usize, end: usize) -> Self {
        let start = SourceLocation::of(source, start);
        let mut end_loc = start;

        for c in source[start.offset..end.min(source.len()).max(start.offset)].chars() {
            end_loc.advance(c);
        }

        Self {
            start,
            end: end_loc,
        }
    }

    /// Length of the span, in bytes
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

/// Start offsets of the lines of a source
///
/// Computes locations without scanning the source from its beginning every time.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            starts: std::iter::once(0)
                .chain(source.match_indices('\n').map(|(i, _)| i + 1))
                .collect(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Compute the location of a byte offset, clamped to the source's length
    pub fn locate(&self, offset: usize) -> SourceLocation {
        let offset = offset.min(self.source.len());

        // The first line starts at offset 0, so at least one start is before the offset
        let line = self.starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.starts[line];

        SourceLocation {
            offset,
            line: line + 1,
            column: self.source[line_start..offset].chars().count() + 1,
        }
    }

    /// Same as [`Span::of`]
    pub fn span(&self, start: usize, end: usize) -> Span {
        let start = self.locate(start);

        Span {
            start,
            end: self.locate(end.max(start.offset)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_count_lines_and_characters() {
        let source = "ab\ncé\nd";
        let loc = SourceLocation::of(source, source.find('d').unwrap());

        assert_eq!(loc.line, 3);
        assert_eq!(loc.column, 1);

        let loc = SourceLocation::of(source, source.find('é').unwrap() + 'é'.len_utf8());
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 3);
    }

    #[test]
    fn spans_are_clamped_to_the_source() {
        let span = Span::of("abc", 1, 10);
        assert_eq!(span.start.offset, 1);
        assert_eq!(span.end.offset, 3);
        assert_eq!(span.len(), 2);
    }

    #[test]
    fn line_index_agrees_with_scanning() {
        let source = "ab\ncé\n\nd";
        let lines = LineIndex::new(source);

        for offset in (0..=source.len() + 2).filter(|offset| source.is_char_boundary((*offset).min(source.len()))) {
            assert_eq!(lines.locate(offset), SourceLocation::of(source, offset), "offset {}", offset);
        }

        assert_eq!(lines.span(1, 7), Span::of(source, 1, 7));
        assert_eq!(lines.span(4, 2), Span::of(source, 4, 2));
    }
}
