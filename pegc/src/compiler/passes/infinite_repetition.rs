use super::always_consumes;
use crate::ast::{Expr, Grammar, Visitor};
use crate::compiler::{GrammarError, Pass, Session};

/// Fail on repetitions of expressions which may succeed without consuming input
pub struct InfiniteRepetition;

impl Pass for InfiniteRepetition {
    fn name(&self) -> &str {
        "infinite_repetition"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        let mut checker = Checker { grammar, error: None };
        checker.visit_grammar(grammar);
        checker.error.map_or(Ok(()), Err)
    }
}

struct Checker<'g> {
    grammar: &'g Grammar,
    error: Option<GrammarError>,
}

impl<'g> Checker<'g> {
    fn check_repeated(&mut self, node: &'g Expr, expression: &'g Expr) {
        if self.error.is_none() && !always_consumes(self.grammar, expression) {
            self.error = Some(GrammarError::InfiniteRepetition {
                location: node.location,
            });
        }

        self.visit_expr(expression);
    }
}

impl<'g> Visitor<'g> for Checker<'g> {
    type Output = ();

    fn visit_zero_or_more(&mut self, node: &'g Expr, expression: &'g Expr) {
        self.check_repeated(node, expression);
    }

    fn visit_one_or_more(&mut self, node: &'g Expr, expression: &'g Expr) {
        self.check_repeated(node, expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::run;

    #[test]
    fn rejects_repeated_empty_matches() {
        for grammar in ["start = ('')*", "start = ('a'?)+", "start = x:(&'a')* { return x; }"] {
            let err = run(grammar, &[&InfiniteRepetition]).err().unwrap();
            assert!(matches!(err, GrammarError::InfiniteRepetition { .. }), "{}", grammar);
        }
    }

    #[test]
    fn accepts_repeated_consuming_expressions() {
        for grammar in ["start = ('a')*", "start = ('a' / 'b' 'c')+", "start = item*\nitem = [0-9]+ ','?"] {
            assert!(run(grammar, &[&InfiniteRepetition]).is_ok(), "{}", grammar);
        }
    }

    #[test]
    fn points_to_the_repetition() {
        let err = run("start = 'a' ('')*", &[&InfiniteRepetition]).err().unwrap();

        let location = err.location().unwrap();
        assert_eq!(location.start.offset, 12);
        assert_eq!(location.end.offset, 17);
    }
}
