//! # Grammar parser
//!
//! This module turns grammar text into a [syntax tree](crate::ast::Grammar).
//!
//! The parser is a hand-written recursive descent over the grammar language, so it never needs to be bootstrapped
//! from a grammar of its own. It only checks the syntax: semantic checks (missing rules, left recursion, ...) are
//! performed by the [compiler passes](crate::compiler::passes).

mod parser;
mod singles;
mod utils;

pub use parser::parse_grammar;
