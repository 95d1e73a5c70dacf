//! # Program generator
//!
//! Lowers an annotated syntax tree to a [`Program`]: a tree of [operations](`Op`) addressing the register slots
//! assigned by the allocation passes, executed by the [runtime](crate::runtime).
//!
//! Labels disappear at this point (they only live in the code nodes' parameters),
//! rule references are resolved to rule indices and user code is bound through a [`CodeResolver`].

mod code;
mod program;

pub use code::*;
pub use program::*;

use crate::ast::{Code, Expr, ExprKind, Grammar, Params};
use crate::compiler::{GrammarError, Optimize, Session};
use crate::runtime::Expectation;
use std::collections::HashMap;

/// Generate the program of an annotated grammar
pub fn generate(grammar: &Grammar, session: &Session, code: &dyn CodeResolver) -> Result<Program, GrammarError> {
    if let Some(initializer) = &grammar.initializer {
        code.initializer(initializer)
            .map_err(|reason| unresolved(initializer, reason))?;
    }

    let lowering = Lowering {
        rules: grammar
            .rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.name.as_str(), i))
            .collect(),
        code,
        optimize: session.options().optimize,
    };

    let mut rules = Vec::with_capacity(grammar.rules.len());

    for rule in &grammar.rules {
        if rule.registers.results == 0 {
            return Err(not_allocated(rule.location));
        }

        rules.push(CompiledRule {
            name: rule.name.clone(),
            display_name: rule.display_name().map(str::to_string),
            report_failures: rule.report_failures,
            registers: rule.registers,
            body: lowering.lower(&rule.expression)?,
        });
    }

    let start_rules = session
        .start_rules()
        .iter()
        .map(|name| {
            lowering
                .rules
                .get(name.as_str())
                .copied()
                .ok_or_else(|| GrammarError::UnknownStartRule { name: name.clone() })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Program {
        rules,
        start_rules,
        cache: session.options().cache,
        trace: session.options().trace,
    })
}

struct Lowering<'g> {
    rules: HashMap<&'g str, usize>,
    code: &'g dyn CodeResolver,
    optimize: Optimize,
}

impl<'g> Lowering<'g> {
    fn lower(&self, expr: &Expr) -> Result<Op, GrammarError> {
        let result = expr.slots.result;
        let pos = || expr.slots.pos.ok_or_else(|| not_allocated(expr.location));

        Ok(match &expr.kind {
            ExprKind::Named { name, expression } => Op::Named {
                expectation: Expectation::Other(name.clone()),
                inner: self.boxed(expression)?,
            },

            ExprKind::Choice(alternatives) => Op::Choice(
                alternatives
                    .iter()
                    .map(|alternative| self.lower(alternative))
                    .collect::<Result<_, _>>()?,
            ),

            ExprKind::Sequence(elements) => Op::Sequence {
                result,
                pos: pos()?,
                elements: elements
                    .iter()
                    .map(|element| self.lower(element))
                    .collect::<Result<_, _>>()?,
            },

            ExprKind::Labeled { expression, .. } => self.lower(expression)?,

            ExprKind::Action {
                expression,
                code,
                params,
            } => Op::Action {
                result,
                pos: pos()?,
                inner: self.boxed(expression)?,
                code: self.bind(code, params)?,
            },

            ExprKind::Text(expression) => Op::Text {
                result,
                pos: pos()?,
                inner: self.boxed(expression)?,
            },

            ExprKind::SimpleAnd(expression) => Op::SimpleAnd {
                result,
                pos: pos()?,
                inner: self.boxed(expression)?,
            },

            ExprKind::SimpleNot(expression) => Op::SimpleNot {
                result,
                pos: pos()?,
                inner: self.boxed(expression)?,
            },

            ExprKind::SemanticAnd { code, params } => Op::SemanticAnd {
                result,
                code: self.bind(code, params)?,
            },

            ExprKind::SemanticNot { code, params } => Op::SemanticNot {
                result,
                code: self.bind(code, params)?,
            },

            ExprKind::Optional(expression) => Op::Optional {
                result,
                inner: self.boxed(expression)?,
            },

            ExprKind::ZeroOrMore(expression) => Op::ZeroOrMore {
                result,
                inner: self.boxed(expression)?,
            },

            ExprKind::OneOrMore(expression) => Op::OneOrMore {
                result,
                inner: self.boxed(expression)?,
            },

            ExprKind::RuleRef(name) => Op::RuleRef {
                result,
                rule: self
                    .rules
                    .get(name.as_str())
                    .copied()
                    .ok_or_else(|| GrammarError::UndefinedRule {
                        name: name.clone(),
                        location: expr.location,
                    })?,
            },

            ExprKind::Literal { value, ignore_case } => Op::Literal {
                result,
                matcher: LiteralMatcher::new(value, *ignore_case, self.optimize),
            },

            ExprKind::Class {
                parts,
                inverted,
                ignore_case,
                raw,
            } => Op::Class {
                result,
                matcher: ClassMatcher::new(parts, *inverted, *ignore_case, raw, self.optimize),
            },

            ExprKind::Any => Op::Any { result },
        })
    }

    fn boxed(&self, expr: &Expr) -> Result<Box<Op>, GrammarError> {
        self.lower(expr).map(Box::new)
    }

    fn bind(&self, code: &Code, params: &Params) -> Result<BoundCode, GrammarError> {
        let labels: Vec<&str> = params.keys().map(String::as_str).collect();

        let run = self
            .code
            .resolve(code, &labels)
            .map_err(|reason| unresolved(code, reason))?;

        Ok(BoundCode {
            text: code.text.clone(),
            params: params
                .iter()
                .map(|(label, path)| (label.clone(), path.clone()))
                .collect(),
            run,
        })
    }
}

fn unresolved(code: &Code, reason: String) -> GrammarError {
    GrammarError::UnresolvedCode {
        code: code.text.trim().to_string(),
        reason,
        location: code.location,
    }
}

fn not_allocated(location: crate::location::Span) -> GrammarError {
    GrammarError::Pass {
        pass: "allocate_slots".to_string(),
        message: "expression has no allocated slot".to_string(),
        location: Some(location),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOptions, Compiler, Pipeline};

    fn program(grammar: &str) -> Program {
        Compiler::new(CompileOptions::new())
            .compile(grammar)
            .unwrap()
            .parser
            .program()
            .clone()
    }

    #[test]
    fn resolves_references_to_rule_indices() {
        let program = program("start = first second\nfirst = 'a' second\nsecond = 'b'");

        assert_eq!(program.start_rules, [0]);

        match &program.rules[1].body {
            Op::Sequence { elements, .. } => {
                assert!(matches!(elements[1], Op::RuleRef { result: 1, rule: 2 }));
            }
            op => panic!("unexpected op: {:?}", op),
        }
    }

    #[test]
    fn labels_leave_no_operation_behind() {
        let program = program("start = value:'a' { return value; }");

        match &program.rules[0].body {
            Op::Action { inner, code, .. } => {
                assert!(matches!(**inner, Op::Literal { result: 0, .. }));
                assert_eq!(code.params.len(), 1);
                assert_eq!(code.params[0].0, "value");
            }
            op => panic!("unexpected op: {:?}", op),
        }
    }

    #[test]
    fn unresolvable_code_is_an_error() {
        let err = Compiler::new(CompileOptions::new())
            .compile("start = 'a' { return computeSomething(); }")
            .err()
            .unwrap();

        match err {
            GrammarError::UnresolvedCode { code, .. } => assert_eq!(code, "return computeSomething();"),
            err => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn requires_slot_allocation() {
        let mut compiler = Compiler::new(CompileOptions::new());
        *compiler.pipeline_mut() = Pipeline::empty();

        let err = compiler.compile("start = 'a'").err().unwrap();
        assert!(matches!(err, GrammarError::Pass { ref pass, .. } if pass == "allocate_slots"));
    }
}
