//! # Pegc
//!
//! Pegc is a parser generator for PEG grammars written in the classic `rule = expression` notation,
//! with labels, actions and semantic predicates.
//!
//! It provides functions to [parse grammars](`grammar::parse_grammar`), to [check and transform](`compiler::Pipeline`)
//! them and to [compile](`compiler::compile`) them to a [parser](`runtime::Parser`) which can then be run on any input.
//!
//! Parse results are JSON-like [values](`serde_json::Value`): literals, classes and `.` produce strings,
//! sequences and repetitions produce arrays, optional misses and predicates produce `null`,
//! and actions produce whatever their code returns.
//!
//! Code blocks are bound to host functions when compiling, either through a [`generator::HostCode`] registry
//! or through one of the supported inline forms (`{ return label; }`, `{ return text(); }`, `{ return 42; }`, ...).
//!
//! ## Usage
//!
//! ```rust
//! use pegc::compiler::{compile, pretty_format_grammar_err, CompileOptions};
//! use serde_json::json;
//!
//! // 1. Define the grammar
//! static GRAMMAR: &str = r#"
//! list = head:item tail:("," item:item { return item; })* { return text(); }
//! item "item" = $[a-z]+
//! "#;
//!
//! // 2. Compile the grammar
//! let parser = compile(GRAMMAR, &CompileOptions::new())
//!     .unwrap_or_else(|err| panic!("{}", pretty_format_grammar_err(GRAMMAR, &err)));
//!
//! // 3. Parse an input
//! assert_eq!(parser.parse("ab,cd").unwrap(), json!("ab,cd"));
//!
//! // 4. Errors tell what was expected
//! let err = parser.parse("ab,").unwrap_err();
//! assert_eq!(err.to_string(), "Expected item but end of input found.");
//! ```

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

pub mod ast;
pub mod compiler;
pub mod generator;
pub mod grammar;
pub mod location;
pub mod runtime;
