use crate::ast::{Code, Expr, Grammar, Params, Visitor};
use crate::compiler::{GrammarError, Pass, Session};
use std::collections::HashSet;

/// Fail on rules which may reach themselves without consuming any input
///
/// Only the first element of a sequence is followed: an element which may match without consuming anything
/// does not make the next one reachable. This is conservative: some left-recursive grammars are accepted
/// and will loop forever at parse time.
pub struct LeftRecursion;

impl Pass for LeftRecursion {
    fn name(&self) -> &str {
        "left_recursion"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        let mut checker = Checker {
            grammar,
            stack: vec![],
            clean: HashSet::new(),
            error: None,
        };

        for rule in &grammar.rules {
            checker.stack.push(&rule.name);
            checker.visit_expr(&rule.expression);
            checker.stack.pop();

            if let Some(err) = checker.error.take() {
                return Err(err);
            }

            checker.clean.insert(&rule.name);
        }

        Ok(())
    }
}

struct Checker<'g> {
    grammar: &'g Grammar,

    /// Rules being visited, outermost first
    stack: Vec<&'g str>,

    /// Rules whose left-most references were already explored without finding a cycle
    clean: HashSet<&'g str>,

    error: Option<GrammarError>,
}

impl<'g> Visitor<'g> for Checker<'g> {
    type Output = ();

    fn visit_sequence(&mut self, _: &'g Expr, elements: &'g [Expr]) {
        if let Some(first) = elements.first() {
            self.visit_expr(first);
        }
    }

    fn visit_action(&mut self, _: &'g Expr, expression: &'g Expr, _: &'g Code, _: &'g Params) {
        self.visit_expr(expression);
    }

    fn visit_rule_ref(&mut self, node: &'g Expr, name: &'g str) {
        if self.error.is_some() || self.clean.contains(name) {
            return;
        }

        if let Some(cycle_start) = self.stack.iter().position(|rule| *rule == name) {
            let mut path: Vec<String> = self.stack[cycle_start..].iter().map(|rule| rule.to_string()).collect();
            path.push(name.to_string());

            self.error = Some(GrammarError::LeftRecursion {
                path,
                location: node.location,
            });

            return;
        }

        // Undefined rules are reported by another pass
        if let Some(rule) = self.grammar.find_rule(name) {
            self.stack.push(name);
            self.visit_expr(&rule.expression);
            self.stack.pop();
        }
    }
}
