use crate::ast::{Expr, Grammar, Visitor};
use crate::compiler::{GrammarError, Pass, Session};

/// Decide which rules record their failures in the expectation set
///
/// Start rules report their failures, and so do the rules they reference, transitively.
/// Rules only reachable through a named expression don't: the named expression reports its display name instead.
pub struct ReportFailures;

impl Pass for ReportFailures {
    fn name(&self) -> &str {
        "report_failures"
    }

    fn run(&self, grammar: &mut Grammar, session: &mut Session) -> Result<(), GrammarError> {
        let mut reporting = vec![false; grammar.rules.len()];
        let mut queue = vec![];

        for name in session.start_rules() {
            if let Some(index) = grammar.rule_index(name) {
                reporting[index] = true;
                queue.push(index);
            }
        }

        while let Some(index) = queue.pop() {
            let mut collector = UnnamedReferences::default();
            collector.visit_expr(&grammar.rules[index].expression);

            for name in collector.names {
                if let Some(referenced) = grammar.rule_index(name) {
                    if !reporting[referenced] {
                        reporting[referenced] = true;
                        queue.push(referenced);
                    }
                }
            }
        }

        for (rule, report_failures) in grammar.rules.iter_mut().zip(reporting) {
            rule.report_failures = report_failures;
        }

        Ok(())
    }
}

/// References which are not nested inside a named expression
#[derive(Default)]
struct UnnamedReferences<'g> {
    names: Vec<&'g str>,
}

impl<'g> Visitor<'g> for UnnamedReferences<'g> {
    type Output = ();

    fn visit_named(&mut self, _: &'g Expr, _: &'g str, _: &'g Expr) {}

    fn visit_rule_ref(&mut self, _: &'g Expr, name: &'g str) {
        self.names.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::passes::testing::run;

    #[test]
    fn named_expressions_stop_propagation() {
        let (grammar, _) = run(
            "start = number ' ' word\nnumber \"number\" = digit+\ndigit = [0-9]\nword = letter+\nletter = [a-z]\nlost = 'x'",
            &[&ReportFailures],
        )
        .unwrap();

        let reporting: Vec<_> = grammar
            .rules
            .iter()
            .map(|rule| (rule.name.as_str(), rule.report_failures))
            .collect();

        assert_eq!(
            reporting,
            [
                ("start", true),
                ("number", true),
                ("digit", false),
                ("word", true),
                ("letter", true),
                ("lost", false),
            ]
        );
    }
}
