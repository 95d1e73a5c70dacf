use crate::ast::Grammar;
use crate::compiler::{GrammarError, Pass, Session};
use crate::location::Span;
use std::collections::HashMap;

/// Fail when two rules share a name
pub struct DuplicateRules;

impl Pass for DuplicateRules {
    fn name(&self) -> &str {
        "duplicate_rules"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        let mut declared = HashMap::<&str, Span>::new();

        for rule in &grammar.rules {
            if let Some(previous) = declared.insert(&rule.name, rule.name_location) {
                return Err(GrammarError::DuplicateRule {
                    name: rule.name.clone(),
                    location: rule.name_location,
                    previous,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::run;

    #[test]
    fn points_to_both_declarations() {
        let err = run("a = 'a'\nb = 'b'\na = 'c'", &[&DuplicateRules]).err().unwrap();

        match err {
            GrammarError::DuplicateRule {
                name,
                location,
                previous,
            } => {
                assert_eq!(name, "a");
                assert_eq!(location.start.line, 3);
                assert_eq!(previous.start.line, 1);
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }
}
