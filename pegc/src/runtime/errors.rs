use crate::ast::quote;
use crate::location::Span;
use std::fmt;

/// Error returned when parsing an input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("can't start parsing from rule \"{0}\"")]
    InvalidStartRule(String),
}

/// The input does not match the grammar, or user code aborted the parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,

    /// What the parser would have accepted at the failure position, sorted and without duplicates
    ///
    /// Empty when user code aborted the parse.
    pub expected: Vec<Expectation>,

    /// Character found at the failure position (`None` at the end of input)
    pub found: Option<String>,

    pub location: Span,
}

impl SyntaxError {
    /// Build the error for the furthest failure position
    pub(crate) fn unexpected(input: &str, offset: usize, expected: Vec<&Expectation>) -> Self {
        let mut expected: Vec<Expectation> = expected.into_iter().cloned().collect();
        expected.sort_by_cached_key(Expectation::description);
        expected.dedup_by(|a, b| a.description() == b.description());

        let found = input[offset..].chars().next();

        Self {
            message: build_message(&expected, found),
            expected,
            found: found.map(String::from),
            location: Span::of(input, offset, offset + found.map_or(0, char::len_utf8)),
        }
    }

    /// Build an error raised by user code
    pub(crate) fn custom(input: &str, message: String, start: usize, end: usize) -> Self {
        Self {
            message,
            expected: vec![],
            found: None,
            location: Span::of(input, start, end),
        }
    }

    /// Format the error in a human-readable way, showing the faulty line
    pub fn pretty_format(&self, input: &str) -> String {
        let line = self.location.start.line;
        let col = self.location.start.column - 1;
        let padding = " ".repeat(col + line.to_string().len() + 3);

        format!(
            "ERROR: At line {}, column {}:\n\n{} | {}\n{}^\n{}{}",
            line,
            col + 1,
            line,
            input.lines().nth(line - 1).unwrap_or(""),
            padding,
            padding,
            self.message
        )
    }
}

fn build_message(expected: &[Expectation], found: Option<char>) -> String {
    let descriptions: Vec<String> = expected.iter().map(Expectation::description).collect();

    let expected = match descriptions.as_slice() {
        [] => "nothing".to_string(),
        [single] => single.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    };

    let found = match found {
        Some(c) => quote(&c.to_string()),
        None => "end of input".to_string(),
    };

    format!("Expected {} but {} found.", expected, found)
}

/// Something the parser expected to find
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expectation {
    Literal { text: String, ignore_case: bool },
    Class { raw: String },
    Any,
    End,

    /// Display name of a named rule
    Other(String),
}

impl Expectation {
    /// Human-readable description, used to sort and deduplicate expectations
    pub fn description(&self) -> String {
        match self {
            Self::Literal { text, .. } => quote(text),
            Self::Class { raw } => raw.clone(),
            Self::Any => "any character".to_string(),
            Self::End => "end of input".to_string(),
            Self::Other(description) => description.clone(),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Expectation {
        Expectation::Literal {
            text: text.to_string(),
            ignore_case: false,
        }
    }

    #[test]
    fn lists_sorted_unique_expectations() {
        let class = Expectation::Class {
            raw: "[0-9]".to_string(),
        };
        let (a, b) = (literal("a"), literal("b"));

        let err = SyntaxError::unexpected("x", 0, vec![&b, &class, &a, &b]);

        assert_eq!(err.expected, [literal("a"), literal("b"), class]);
        assert_eq!(err.message, "Expected \"a\", \"b\", or [0-9] but \"x\" found.");
        assert_eq!(err.found.as_deref(), Some("x"));
    }

    #[test]
    fn describes_the_end_of_input() {
        let (a, end) = (literal("a"), Expectation::End);

        assert_eq!(
            SyntaxError::unexpected("", 0, vec![&a]).message,
            "Expected \"a\" but end of input found."
        );
        assert_eq!(
            SyntaxError::unexpected("ab", 1, vec![&end, &Expectation::Any]).message,
            "Expected any character or end of input but \"b\" found."
        );
    }

    #[test]
    fn pretty_formats_the_faulty_line() {
        let input = "first\nsecXnd";
        let err = SyntaxError::unexpected(input, 9, vec![]);

        assert_eq!(
            err.pretty_format(input),
            "ERROR: At line 2, column 4:\n\n2 | secXnd\n       ^\n       Expected nothing but \"X\" found."
        );
    }
}
