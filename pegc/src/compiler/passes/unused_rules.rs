use crate::ast::{Expr, Grammar, Visitor};
use crate::compiler::{GrammarError, GrammarWarning, Pass, Session};
use std::collections::HashSet;

/// Warn about rules which are neither referenced nor allowed as start rules
pub struct UnusedRules;

impl Pass for UnusedRules {
    fn name(&self) -> &str {
        "unused_rules"
    }

    fn run(&self, grammar: &mut Grammar, session: &mut Session) -> Result<(), GrammarError> {
        let mut collector = References::default();
        collector.visit_grammar(grammar);

        for rule in &grammar.rules {
            if !collector.names.contains(rule.name.as_str()) && !session.is_start_rule(&rule.name) {
                session.warn(GrammarWarning::UnusedRule {
                    name: rule.name.clone(),
                    location: rule.name_location,
                });
            }
        }

        Ok(())
    }
}

#[derive(Default)]
struct References<'g> {
    names: HashSet<&'g str>,
}

impl<'g> Visitor<'g> for References<'g> {
    type Output = ();

    fn visit_rule_ref(&mut self, _: &'g Expr, name: &'g str) {
        self.names.insert(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::{run, run_with};
    use crate::compiler::CompileOptions;

    fn unused(grammar: &str, options: &CompileOptions) -> Vec<String> {
        let (_, session) = run_with(grammar, options, &[&UnusedRules]).unwrap();

        session
            .warnings()
            .iter()
            .map(|warning| match warning {
                GrammarWarning::UnusedRule { name, .. } => name.clone(),
                warning => panic!("unexpected warning: {:?}", warning),
            })
            .collect()
    }

    #[test]
    fn warns_about_unreferenced_rules() {
        assert_eq!(
            unused("start = used\nused = 'a'\nlost = 'b'", &CompileOptions::new()),
            ["lost"]
        );
    }

    #[test]
    fn start_rules_are_used() {
        let options = CompileOptions::new().with_start_rules(["start", "other"]);
        assert!(unused("start = 'a'\nother = 'b'", &options).is_empty());
    }

    #[test]
    fn unused_rules_are_not_errors() {
        assert!(run("start = 'a'\nlost = 'b'", &[&UnusedRules]).is_ok());
    }
}
