use crate::ast::{Code, Expr, Grammar, Params, Rule, Visitor};
use crate::compiler::{GrammarError, Pass, Session};
use crate::location::Span;
use std::collections::HashMap;

/// Fail when a label is bound twice in the same scope
///
/// Sequences share their scope with their elements. Every other node with children opens a new scope,
/// so labels of a choice's alternatives or of a repeated expression don't clash with each other.
pub struct DuplicateLabels;

impl Pass for DuplicateLabels {
    fn name(&self) -> &str {
        "duplicate_labels"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        let mut checker = Checker::default();
        checker.visit_grammar(grammar);
        checker.error.map_or(Ok(()), Err)
    }
}

#[derive(Default)]
struct Checker {
    env: HashMap<String, Span>,
    error: Option<GrammarError>,
}

impl Checker {
    fn scoped(&mut self, expression: &Expr) {
        let outer = self.env.clone();
        self.visit_expr(expression);
        self.env = outer;
    }
}

impl<'g> Visitor<'g> for Checker {
    type Output = ();

    fn visit_rule(&mut self, rule: &'g Rule) {
        self.env.clear();
        self.visit_expr(&rule.expression);
    }

    fn visit_choice(&mut self, _: &'g Expr, alternatives: &'g [Expr]) {
        for alternative in alternatives {
            self.scoped(alternative);
        }
    }

    fn visit_labeled(&mut self, node: &'g Expr, label: &'g str, expression: &'g Expr) {
        self.scoped(expression);

        if self.error.is_some() {
            return;
        }

        match self.env.get(label) {
            Some(previous) => {
                self.error = Some(GrammarError::DuplicateLabel {
                    label: label.to_string(),
                    location: node.location,
                    previous: *previous,
                })
            }
            None => {
                self.env.insert(label.to_string(), node.location);
            }
        }
    }

    fn visit_action(&mut self, _: &'g Expr, expression: &'g Expr, _: &'g Code, _: &'g Params) {
        self.scoped(expression);
    }

    fn visit_text(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }

    fn visit_simple_and(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }

    fn visit_simple_not(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }

    fn visit_optional(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }

    fn visit_zero_or_more(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }

    fn visit_one_or_more(&mut self, _: &'g Expr, expression: &'g Expr) {
        self.scoped(expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::run;

    #[test]
    fn rejects_labels_bound_twice_in_a_sequence() {
        let err = run("start = a:'a' b:'b' a:'c'", &[&DuplicateLabels]).err().unwrap();

        match err {
            GrammarError::DuplicateLabel {
                label,
                location,
                previous,
            } => {
                assert_eq!(label, "a");
                assert_eq!(location.start.offset, 20);
                assert_eq!(previous.start.offset, 8);
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn alternatives_and_subexpressions_have_their_own_scope() {
        let grammars = [
            "start = a:'a' / a:'b'",
            "start = (a:'a')* a:'b'",
            "start = $(a:'a') a:'b'",
            "start = (a:'a' { return a; }) a:'b'",
            "start = a:(a:'a' 'b')",
            "first = a:'a'\nsecond = a:'a'",
        ];

        for grammar in grammars {
            assert!(run(grammar, &[&DuplicateLabels]).is_ok(), "{}", grammar);
        }
    }
}
