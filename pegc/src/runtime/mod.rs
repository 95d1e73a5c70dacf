//! # Parser runtime
//!
//! Executes a generated [`Program`] against an input.
//!
//! Each parse gets its own register frames, expectation state and memoization table:
//! a [`Parser`] can be shared and used for several parses, including from several threads.

mod errors;
mod executor;
mod trace;

pub use errors::*;
pub use trace::*;

use crate::generator::Program;
use serde_json::{Map, Value};

/// Options of a single parse
#[derive(Default)]
pub struct ParseOptions<'a> {
    /// Rule to start from, which must be an allowed start rule (defaults to the first one)
    pub start_rule: Option<String>,

    /// Receiver of trace events, for parsers compiled with tracing enabled (defaults to a [`LogTracer`])
    pub tracer: Option<&'a dyn Tracer>,

    /// Arbitrary values, available to user code (see [`ActionContext::options`](crate::generator::ActionContext::options))
    pub user: Map<String, Value>,
}

impl<'a> ParseOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_rule(mut self, rule: impl Into<String>) -> Self {
        self.start_rule = Some(rule.into());
        self
    }

    pub fn with_tracer(mut self, tracer: &'a dyn Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_user_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.user.insert(key.into(), value);
        self
    }
}

/// A compiled parser
#[derive(Debug, Clone)]
pub struct Parser {
    program: Program,
}

impl Parser {
    pub(crate) fn new(program: Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Names of the rules parsing may start from, the default one first
    pub fn start_rules(&self) -> Vec<&str> {
        self.program
            .start_rules
            .iter()
            .map(|index| self.program.rules[*index].name.as_str())
            .collect()
    }

    /// Parse a whole input from the default start rule
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        self.parse_with(input, &ParseOptions::default())
    }

    /// Parse a whole input
    pub fn parse_with(&self, input: &str, options: &ParseOptions) -> Result<Value, ParseError> {
        let rule = match &options.start_rule {
            None => self.program.start_rules.first().copied(),
            Some(name) => self
                .program
                .start_rules
                .iter()
                .copied()
                .find(|index| self.program.rules[*index].name == *name),
        };

        let rule = rule.ok_or_else(|| {
            ParseError::InvalidStartRule(options.start_rule.clone().unwrap_or_default())
        })?;

        log::debug!(
            "parsing {} byte(s) from rule \"{}\"",
            input.len(),
            self.program.rules[rule].name
        );

        executor::execute(&self.program, input, rule, &options.user, options.tracer)
    }
}
