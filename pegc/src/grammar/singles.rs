use super::parser::GrammarParser;
use super::utils::is_ident_continue;
use crate::ast::{ClassPart, Code, Expr, ExprKind};
use crate::compiler::{GrammarError, SyntaxErrorContent};

impl<'a> GrammarParser<'a> {
    /// Parse a string literal, with an optional case-insensitivity marker (`"abc"i`)
    pub(super) fn literal(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        let value = self.string_literal()?;
        let ignore_case = self.case_insensitivity_marker();

        Ok(Expr::new(
            ExprKind::Literal { value, ignore_case },
            self.span(start),
        ))
    }

    /// Parse a quoted string (`"..."` or `'...'`) and decode its escape sequences
    pub(super) fn string_literal(&mut self) -> Result<String, GrammarError> {
        let start = self.pos;

        let quote = match self.bump() {
            Some(c @ '"') | Some(c @ '\'') => c,
            _ => return Err(self.error_here(SyntaxErrorContent::ExpectedExpression)),
        };

        let unterminated = |parser: &Self| {
            parser.error_here(SyntaxErrorContent::UnterminatedString {
                started_at: parser.loc(start),
            })
        };

        let mut value = String::new();

        loop {
            match self.peek() {
                // Strings cannot span multiple lines
                None | Some('\n') => return Err(unterminated(self)),

                Some('\\') => {
                    self.bump();

                    if let Some(c) = self.escape()? {
                        value.push(c);
                    }
                }

                Some(c) => {
                    self.bump();

                    if c == quote {
                        break;
                    }

                    value.push(c);
                }
            }
        }

        Ok(value)
    }

    /// Parse a character class (`[a-z_]`, `[^0-9]i`)
    pub(super) fn class(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;

        // Opening bracket
        self.bump();

        let inverted = self.eat('^');
        let mut parts = vec![];

        loop {
            let from = match self.class_char(start)? {
                Some(c) => c,
                None => break,
            };

            // A dash between two characters makes a range, a dash before the closing bracket is a character
            if self.peek() == Some('-') && self.peek_second() != Some(']') {
                let dash = self.pos;
                self.bump();

                let to = match self.class_char(start)? {
                    Some(c) => c,
                    None => {
                        self.pos = dash;
                        parts.push(ClassPart::Char(from));
                        continue;
                    }
                };

                if from > to {
                    return Err(GrammarError::syntax(
                        SyntaxErrorContent::InvalidClassRange { from, to },
                        self.input,
                        dash - from.len_utf8(),
                        self.pos,
                    ));
                }

                parts.push(ClassPart::Range(from, to));
            } else {
                parts.push(ClassPart::Char(from));
            }
        }

        let ignore_case = self.case_insensitivity_marker();

        Ok(Expr::new(
            ExprKind::Class {
                parts,
                inverted,
                ignore_case,
                raw: self.input[start..self.pos].to_string(),
            },
            self.span(start),
        ))
    }

    /// Parse a single character of a class
    ///
    /// Returns `None` (and consumes it) when the closing bracket is found.
    fn class_char(&mut self, class_start: usize) -> Result<Option<char>, GrammarError> {
        match self.peek() {
            None | Some('\n') => Err(self.error_here(SyntaxErrorContent::UnterminatedClass {
                started_at: self.loc(class_start),
            })),

            Some(']') => {
                self.bump();
                Ok(None)
            }

            Some('\\') => {
                self.bump();

                match self.escape()? {
                    Some(c) => Ok(Some(c)),

                    // Line continuations don't make sense in classes
                    None => Err(self.error_here(SyntaxErrorContent::UnterminatedClass {
                        started_at: self.loc(class_start),
                    })),
                }
            }

            Some(c) => {
                self.bump();
                Ok(Some(c))
            }
        }
    }

    /// Decode an escape sequence, right after its backslash
    ///
    /// Returns `None` for line continuations (a backslash followed by a line break).
    fn escape(&mut self) -> Result<Option<char>, GrammarError> {
        let escape_start = self.pos;

        let c = match self.bump() {
            Some(c) => c,
            None => return Err(self.error_here(SyntaxErrorContent::InvalidEscape(' '))),
        };

        let decoded = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'v' => '\u{b}',
            '0' if !matches!(self.peek(), Some('0'..='9')) => '\0',
            '\n' => return Ok(None),

            'x' | 'u' => {
                let digits = if c == 'x' { 2 } else { 4 };
                let hex = self.rest().get(..digits).unwrap_or("");

                let decoded = if hex.len() == digits && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };

                match decoded {
                    Some(decoded) => {
                        self.pos += digits;
                        decoded
                    }
                    None => {
                        return Err(GrammarError::syntax(
                            SyntaxErrorContent::InvalidEscape(c),
                            self.input,
                            escape_start - 1,
                            self.pos,
                        ))
                    }
                }
            }

            '0'..='9' => {
                return Err(GrammarError::syntax(
                    SyntaxErrorContent::InvalidEscape(c),
                    self.input,
                    escape_start - 1,
                    self.pos,
                ))
            }

            // Any other character stands for itself (`\"`, `\]`, `\\`, ...)
            c => c,
        };

        Ok(Some(decoded))
    }

    /// Consume a trailing `i` marker right after a literal or a class
    fn case_insensitivity_marker(&mut self) -> bool {
        if self.peek() == Some('i') && !self.peek_second().map_or(false, is_ident_continue) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Parse a code block (`{ ... }`), which may contain balanced braces, string literals and comments
    pub(super) fn code_block(&mut self) -> Result<Code, GrammarError> {
        let start = self.pos;

        // Opening brace
        self.bump();

        let mut depth: u32 = 0;
        let mut string_quote = None;

        let content_end = loop {
            let offset = self.pos;

            let c = self.bump().ok_or_else(|| {
                self.error_here(SyntaxErrorContent::UnterminatedCode {
                    started_at: self.loc(start),
                })
            })?;

            if let Some(quote) = string_quote {
                if c == '\\' {
                    self.bump();
                } else if c == quote {
                    string_quote = None;
                }

                continue;
            }

            match c {
                '"' | '\'' | '`' => string_quote = Some(c),

                // Quotes and braces in comments don't count
                '/' if self.peek() == Some('/') => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                '/' if self.peek() == Some('*') => {
                    self.bump();

                    while !self.rest().is_empty() && !self.rest().starts_with("*/") {
                        self.bump();
                    }

                    self.pos += self.rest().len().min(2);
                }

                '{' => depth += 1,
                '}' if depth == 0 => break offset,
                '}' => depth -= 1,
                _ => {}
            }
        };

        Ok(Code {
            text: self.input[start + 1..content_end].to_string(),
            location: self.span(start),
        })
    }
}
