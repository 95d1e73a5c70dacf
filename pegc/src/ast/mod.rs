//! # Grammar syntax tree
//!
//! The [grammar parser](crate::grammar::parse_grammar) produces a [`Grammar`], which is then owned by a single compile session.
//!
//! Compiler passes annotate the tree in place: rules get their failure reporting flag and register counts,
//! expressions get their storage [slots](`Slots`), and user code nodes get their [parameter table](`Params`).
//! Once every pass ran, the [generator](crate::generator) lowers the tree to an executable program and the tree is discarded.

mod display;
mod visitor;

pub(crate) use display::quote;
pub use visitor::*;

use crate::location::Span;
use std::collections::BTreeMap;
use std::fmt;

/// A complete grammar
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    /// Optional code block preceding the first rule
    pub initializer: Option<Code>,

    /// Rules, in declaration order
    pub rules: Vec<Rule>,

    pub location: Span,
}

impl Grammar {
    /// Find a rule by its name
    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Get the index of a rule in declaration order
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }
}

/// A single rule (`name "display name" = expression`)
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: String,

    /// Rule's body
    ///
    /// When the rule was declared with a display name, the body is a [`ExprKind::Named`] node.
    pub expression: Expr,

    /// Location of the rule's name
    pub name_location: Span,

    /// Location of the whole declaration
    pub location: Span,

    /// Should failures inside this rule be recorded in the expectation set?
    pub report_failures: bool,

    /// Registers needed to evaluate the rule's body
    pub registers: Registers,
}

impl Rule {
    pub fn new(name: impl Into<String>, expression: Expr, name_location: Span, location: Span) -> Self {
        Self {
            name: name.into(),
            expression,
            name_location,
            location,
            report_failures: true,
            registers: Registers::default(),
        }
    }

    /// Get the rule's display name, if any
    pub fn display_name(&self) -> Option<&str> {
        match &self.expression.kind {
            ExprKind::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Number of registers a rule's body needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    /// Result slots (`result0`..)
    pub results: usize,

    /// Saved position slots (`pos0`..)
    pub positions: usize,
}

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Span,
    pub slots: Slots,
}

impl Expr {
    pub fn new(kind: ExprKind, location: Span) -> Self {
        Self {
            kind,
            location,
            slots: Slots::default(),
        }
    }

    /// Get the node's tag
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            ExprKind::Named { .. } => NodeTag::Named,
            ExprKind::Choice(_) => NodeTag::Choice,
            ExprKind::Sequence(_) => NodeTag::Sequence,
            ExprKind::Labeled { .. } => NodeTag::Labeled,
            ExprKind::Action { .. } => NodeTag::Action,
            ExprKind::Text(_) => NodeTag::Text,
            ExprKind::SimpleAnd(_) => NodeTag::SimpleAnd,
            ExprKind::SimpleNot(_) => NodeTag::SimpleNot,
            ExprKind::SemanticAnd { .. } => NodeTag::SemanticAnd,
            ExprKind::SemanticNot { .. } => NodeTag::SemanticNot,
            ExprKind::Optional(_) => NodeTag::Optional,
            ExprKind::ZeroOrMore(_) => NodeTag::ZeroOrMore,
            ExprKind::OneOrMore(_) => NodeTag::OneOrMore,
            ExprKind::RuleRef(_) => NodeTag::RuleRef,
            ExprKind::Literal { .. } => NodeTag::Literal,
            ExprKind::Class { .. } => NodeTag::Class,
            ExprKind::Any => NodeTag::Any,
        }
    }
}

/// Content of an [`Expr`]
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Expression reported under a user-facing name in error messages
    Named { name: String, expression: Box<Expr> },

    /// Ordered alternatives, the first one to match wins
    Choice(Vec<Expr>),

    /// Elements which must all match, in order
    Sequence(Vec<Expr>),

    /// Expression whose result is bound to a label
    Labeled { label: String, expression: Box<Expr> },

    /// Expression whose result is replaced by the value returned by user code
    Action {
        expression: Box<Expr>,
        code: Code,
        params: Params,
    },

    /// Match the inner expression and produce the matched text (`$expr`)
    Text(Box<Expr>),

    /// Positive lookahead (`&expr`)
    SimpleAnd(Box<Expr>),

    /// Negative lookahead (`!expr`)
    SimpleNot(Box<Expr>),

    /// Succeed if user code returns a truthy value (`&{ code }`)
    SemanticAnd { code: Code, params: Params },

    /// Succeed if user code returns a falsy value (`!{ code }`)
    SemanticNot { code: Code, params: Params },

    /// `expr?`
    Optional(Box<Expr>),

    /// `expr*`
    ZeroOrMore(Box<Expr>),

    /// `expr+`
    OneOrMore(Box<Expr>),

    /// Reference to another rule
    RuleRef(String),

    /// Exact string
    Literal { value: String, ignore_case: bool },

    /// Character class
    Class {
        parts: Vec<ClassPart>,
        inverted: bool,
        ignore_case: bool,

        /// Class as written in the grammar, used in error messages
        raw: String,
    },

    /// Any single character (`.`)
    Any,
}

/// A member of a character class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassPart {
    Char(char),
    Range(char, char),
}

impl ClassPart {
    pub fn contains(&self, c: char) -> bool {
        match *self {
            ClassPart::Char(expected) => c == expected,
            ClassPart::Range(from, to) => from <= c && c <= to,
        }
    }
}

/// Tags of all node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Grammar,
    Rule,
    Named,
    Choice,
    Sequence,
    Labeled,
    Action,
    Text,
    SimpleAnd,
    SimpleNot,
    SemanticAnd,
    SemanticNot,
    Optional,
    ZeroOrMore,
    OneOrMore,
    RuleRef,
    Literal,
    Class,
    Any,
}

/// A user code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// Code between the braces, untouched
    pub text: String,

    pub location: Span,
}

/// Storage slots assigned to an expression by the [allocation pass](crate::compiler::passes::AllocateSlots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slots {
    /// Result slot the expression writes its value into
    pub result: usize,

    /// Slot holding the position saved before the expression started, for nodes which need to restore or slice it
    pub pos: Option<usize>,
}

/// Mapping from labels visible to a code block to the slot holding their value
pub type Params = BTreeMap<String, SlotPath>;

/// Path to a value stored in a result slot
///
/// Sequences store their elements as a single array in their own slot. Labels bound inside a sequence are therefore
/// reached through the sequence's slot and the element's index (`result0[1][2]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotPath {
    pub slot: usize,
    pub indices: Vec<usize>,
}

impl SlotPath {
    pub fn slot(slot: usize) -> Self {
        Self {
            slot,
            indices: vec![],
        }
    }

    /// Rebase a path on the slot of the sequence containing it
    pub(crate) fn nest_in(&self, slot: usize, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.indices.len() + 1);
        indices.push(index);
        indices.extend_from_slice(&self.indices);

        Self { slot, indices }
    }
}

impl fmt::Display for SlotPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "result{}", self.slot)?;

        for index in &self.indices {
            write!(f, "[{}]", index)?;
        }

        Ok(())
    }
}
