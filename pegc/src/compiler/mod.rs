//! # Grammar compiler
//!
//! This module turns grammar text into an executable [`Parser`](crate::runtime::Parser).
//!
//! Compilation runs the [grammar parser](crate::grammar::parse_grammar), then the [pipeline](`Pipeline`)'s passes
//! (checks, transformations and allocations) over the syntax tree, and finally the [generator](crate::generator).
//! The first error aborts the whole compilation.

mod errors;
mod options;
pub mod passes;
mod pipeline;
mod report;
mod session;

pub use errors::*;
pub use options::*;
pub use pipeline::*;
pub use report::*;
pub use session::*;

use crate::ast::Grammar;
use crate::generator::{generate, CodeResolver, HostCode};
use crate::grammar::parse_grammar;
use crate::runtime::Parser;

/// Compile a grammar with the default pipeline and the built-in code forms
///
/// Use a [`Compiler`] to register host code, add passes or collect warnings.
pub fn compile(grammar: &str, options: &CompileOptions) -> Result<Parser, GrammarError> {
    Compiler::new(options.clone())
        .compile(grammar)
        .map(|compilation| compilation.parser)
}

/// Result of a successful compilation
pub struct Compilation {
    pub parser: Parser,

    /// Non-fatal diagnostics reported by the passes
    pub warnings: Vec<GrammarWarning>,
}

/// A configured compiler
///
/// Nothing is shared between two compilations: each one parses its own syntax tree and opens its own [`Session`].
pub struct Compiler {
    options: CompileOptions,
    pipeline: Pipeline,
    code: Box<dyn CodeResolver>,
}

impl Compiler {
    /// Create a compiler with the default pipeline
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            pipeline: Pipeline::default(),
            code: Box::new(HostCode::new()),
        }
    }

    /// Use a custom resolver for the grammar's code blocks
    pub fn with_code(mut self, code: impl CodeResolver + 'static) -> Self {
        self.code = Box::new(code);
        self
    }

    /// Add a pass to the pipeline (see [`Pipeline::add`])
    pub fn with_pass(mut self, stage: Stage, pass: impl Pass + 'static) -> Self {
        self.pipeline.add(stage, pass);
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Parse a grammar and run every pass of the pipeline, without generating a parser
    ///
    /// Returns the annotated syntax tree.
    pub fn check(&self, grammar: &str) -> Result<(Grammar, Session), GrammarError> {
        let mut ast = parse_grammar(grammar)?;
        let mut session = Session::new(&ast, &self.options)?;

        for name in self.pipeline.redefined() {
            session.warn(GrammarWarning::PassRedefined { name: name.clone() });
        }

        self.pipeline.run(&mut ast, &mut session)?;

        Ok((ast, session))
    }

    /// Compile a grammar to a parser
    pub fn compile(&self, grammar: &str) -> Result<Compilation, GrammarError> {
        let (ast, session) = self.check(grammar)?;

        log::debug!(
            "generating program for {} rule(s), start rules: {}",
            ast.rules.len(),
            session.start_rules().join(", ")
        );

        let program = generate(&ast, &session, self.code.as_ref())?;

        Ok(Compilation {
            parser: Parser::new(program),
            warnings: session.into_warnings(),
        })
    }
}
