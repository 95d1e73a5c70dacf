use super::parser::GrammarParser;
use crate::compiler::{GrammarError, SyntaxErrorContent};
use crate::location::SourceLocation;

impl<'a> GrammarParser<'a> {
    /// Skip whitespaces, line comments (`// ...`) and block comments (`/* ... */`)
    pub(super) fn skip_trivia(&mut self) -> Result<(), GrammarError> {
        loop {
            let rest = self.rest();

            // Whitespaces, including line breaks
            let trimmed = count_start_whitespaces(rest);

            if trimmed > 0 {
                self.pos += trimmed;
                continue;
            }

            // Line comments run until the end of the line
            if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
                continue;
            }

            // Block comments must be closed
            if rest.starts_with("/*") {
                match rest[2..].find("*/") {
                    Some(end) => {
                        self.pos += end + 4;
                        continue;
                    }
                    None => {
                        return Err(GrammarError::syntax(
                            SyntaxErrorContent::UnterminatedComment {
                                started_at: SourceLocation::of(self.input, self.pos),
                            },
                            self.input,
                            self.input.len(),
                            self.input.len(),
                        ))
                    }
                }
            }

            return Ok(());
        }
    }
}

/// Count start whitespaces, in bytes
pub fn count_start_whitespaces(input: &str) -> usize {
    input
        .chars()
        .take_while(|c| c.is_whitespace())
        .fold(0, |acc, c| acc + c.len_utf8())
}

/// Check if a character can begin an identifier
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier
pub fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
