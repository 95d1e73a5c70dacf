use crate::location::{SourceLocation, Span};
use std::fmt;

/// Compile-time error
///
/// Every error aborts the compilation immediately; no partial program is ever returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarError {
    /// The grammar text itself is malformed
    #[error("{content}")]
    Syntax {
        content: SyntaxErrorContent,
        location: Span,
    },

    #[error("rule \"{name}\" is not defined")]
    UndefinedRule { name: String, location: Span },

    #[error("rule \"{name}\" is already defined at {}", .previous.start)]
    DuplicateRule {
        name: String,
        location: Span,
        previous: Span,
    },

    #[error("label \"{label}\" is already defined at {}", .previous.start)]
    DuplicateLabel {
        label: String,
        location: Span,
        previous: Span,
    },

    #[error("possible infinite loop when parsing (left recursion: {})", .path.join("->"))]
    LeftRecursion { path: Vec<String>, location: Span },

    #[error("possible infinite loop when parsing (repetition used with an expression that may not consume any input)")]
    InfiniteRepetition { location: Span },

    #[error("start rule \"{name}\" is not defined")]
    UnknownStartRule { name: String },

    #[error("grammar must contain at least one rule")]
    EmptyGrammar,

    #[error("cannot bind code block {{{code}}}: {reason}")]
    UnresolvedCode {
        code: String,
        reason: String,
        location: Span,
    },

    /// A custom pass of the [pipeline](super::Pipeline) failed
    #[error("pass \"{pass}\" failed: {message}")]
    Pass {
        pass: String,
        message: String,
        location: Option<Span>,
    },
}

impl GrammarError {
    /// Get the location of the error in the grammar, if it applies to a specific place
    pub fn location(&self) -> Option<Span> {
        match self {
            Self::Syntax { location, .. }
            | Self::UndefinedRule { location, .. }
            | Self::DuplicateRule { location, .. }
            | Self::DuplicateLabel { location, .. }
            | Self::LeftRecursion { location, .. }
            | Self::InfiniteRepetition { location }
            | Self::UnresolvedCode { location, .. } => Some(*location),
            Self::Pass { location, .. } => *location,
            Self::UnknownStartRule { .. } | Self::EmptyGrammar => None,
        }
    }

    /// Get the optional error's tip
    pub fn tip(&self) -> Option<&'static str> {
        match self {
            Self::Syntax { content, .. } => content.tip(),
            Self::UndefinedRule { .. } => Some("check if you have spelled the rule's name correctly"),
            Self::LeftRecursion { .. } => {
                Some("make the recursive reference consume some input before it, or rewrite the rule with a repetition")
            }
            Self::InfiniteRepetition { .. } => {
                Some("the repeated expression must consume at least one character when it succeeds")
            }
            Self::UnresolvedCode { .. } => Some(
                "register a handler for this code with `HostCode::register`, or use one of the inline forms (e.g. 'return label')",
            ),
            _ => None,
        }
    }

    pub(crate) fn syntax(content: SyntaxErrorContent, source: &str, start: usize, end: usize) -> Self {
        Self::Syntax {
            content,
            location: Span::of(source, start, end),
        }
    }
}

/// Content of a [`GrammarError::Syntax`] error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorContent {
    ExpectedRuleDeclaration,
    ExpectedRuleAssignmentOp,
    ExpectedExpression,
    IllegalSymbol(char),
    UnclosedGroup { started_at: SourceLocation },
    UnterminatedString { started_at: SourceLocation },
    UnterminatedClass { started_at: SourceLocation },
    UnterminatedCode { started_at: SourceLocation },
    UnterminatedComment { started_at: SourceLocation },
    InvalidEscape(char),
    InvalidClassRange { from: char, to: char },
}

impl SyntaxErrorContent {
    /// Get the optional error's tip
    pub fn tip(&self) -> Option<&'static str> {
        match self {
            Self::ExpectedRuleDeclaration => Some("rules are declared with the 'name = expression' syntax"),
            Self::ExpectedRuleAssignmentOp => {
                Some("you may have forgot to add the rule assignment operator '='")
            }
            Self::ExpectedExpression => Some(
                "an expression may be a string, a class, a rule's name, '.', or a group opened with '('",
            ),
            Self::UnclosedGroup { .. } => Some("you may need to add a closing parenthesis ')'"),
            Self::UnterminatedString { .. } => Some("you may need to add a closing quote"),
            Self::UnterminatedClass { .. } => Some("you may need to add a closing bracket ']'"),
            Self::UnterminatedCode { .. } => Some("you may need to add a closing brace '}'"),
            Self::UnterminatedComment { .. } => Some("block comments are closed with '*/'"),
            Self::InvalidEscape(_) => {
                Some("supported escapes are \\n \\r \\t \\b \\f \\v \\0 \\xHH \\uHHHH and escaped punctuation")
            }
            Self::InvalidClassRange { .. } => Some("a range's start must come before its end"),
            Self::IllegalSymbol(_) => None,
        }
    }
}

impl fmt::Display for SyntaxErrorContent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ExpectedRuleDeclaration => write!(f, "expected rule declaration"),
            Self::ExpectedRuleAssignmentOp => write!(f, "expected rule assignment operator (=)"),
            Self::ExpectedExpression => write!(f, "expected an expression"),
            Self::IllegalSymbol(c) => write!(f, "illegal symbol {:?}", c),
            Self::UnclosedGroup { started_at } => write!(f, "unclosed group starting at {}", started_at),
            Self::UnterminatedString { started_at } => {
                write!(f, "unterminated string literal starting at {}", started_at)
            }
            Self::UnterminatedClass { started_at } => {
                write!(f, "unterminated character class starting at {}", started_at)
            }
            Self::UnterminatedCode { started_at } => {
                write!(f, "unterminated code block starting at {}", started_at)
            }
            Self::UnterminatedComment { started_at } => {
                write!(f, "unterminated multi-line comment opened at {}", started_at)
            }
            Self::InvalidEscape(c) => write!(f, "invalid escape sequence '\\{}'", c),
            Self::InvalidClassRange { from, to } => {
                write!(f, "invalid character range {:?}-{:?}", from, to)
            }
        }
    }
}

/// Non-fatal diagnostic collected during compilation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrammarWarning {
    #[error("rule \"{name}\" is not referenced")]
    UnusedRule { name: String, location: Span },

    /// A custom pass replaced a pass with the same name
    #[error("pass \"{name}\" was redefined")]
    PassRedefined { name: String },
}
