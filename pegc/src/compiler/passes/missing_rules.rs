use crate::ast::{Expr, Grammar, Visitor};
use crate::compiler::{GrammarError, Pass, Session};
use std::collections::HashSet;

/// Fail on references to undeclared rules
pub struct MissingRules;

impl Pass for MissingRules {
    fn name(&self) -> &str {
        "missing_rules"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        let mut checker = Checker {
            declared: grammar.rules.iter().map(|rule| rule.name.as_str()).collect(),
            error: None,
        };

        checker.visit_grammar(grammar);
        checker.error.map_or(Ok(()), Err)
    }
}

struct Checker<'g> {
    declared: HashSet<&'g str>,
    error: Option<GrammarError>,
}

impl<'g> Visitor<'g> for Checker<'g> {
    type Output = ();

    fn visit_rule_ref(&mut self, node: &'g Expr, name: &'g str) {
        if self.error.is_none() && !self.declared.contains(name) {
            self.error = Some(GrammarError::UndefinedRule {
                name: name.to_string(),
                location: node.location,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::run;

    #[test]
    fn reports_the_first_undefined_rule() {
        let err = run("start = missing other", &[&MissingRules]).err().unwrap();

        match err {
            GrammarError::UndefinedRule { name, location } => {
                assert_eq!(name, "missing");
                assert_eq!(location.start.offset, 8);
                assert_eq!(location.end.offset, 15);
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn accepts_forward_and_self_references() {
        assert!(run("start = 'a' start? / later\nlater = 'b'", &[&MissingRules]).is_ok());
    }
}
