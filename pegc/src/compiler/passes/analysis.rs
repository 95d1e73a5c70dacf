use crate::ast::{ClassPart, Code, Expr, Grammar, Params, Visitor};

/// Check if an expression always consumes some input when it succeeds
///
/// Rule references are followed. A reference cycle is assumed to consume, as left recursion is reported separately.
pub fn always_consumes(grammar: &Grammar, expression: &Expr) -> bool {
    ConsumesOnSuccess {
        grammar,
        visiting: vec![],
    }
    .visit_expr(expression)
}

struct ConsumesOnSuccess<'g> {
    grammar: &'g Grammar,
    visiting: Vec<&'g str>,
}

impl<'g> Visitor<'g> for ConsumesOnSuccess<'g> {
    type Output = bool;

    fn visit_choice(&mut self, _: &'g Expr, alternatives: &'g [Expr]) -> bool {
        alternatives.iter().all(|alternative| self.visit_expr(alternative))
    }

    fn visit_sequence(&mut self, _: &'g Expr, elements: &'g [Expr]) -> bool {
        elements.iter().any(|element| self.visit_expr(element))
    }

    fn visit_action(&mut self, _: &'g Expr, expression: &'g Expr, _: &'g Code, _: &'g Params) -> bool {
        self.visit_expr(expression)
    }

    fn visit_simple_and(&mut self, _: &'g Expr, _: &'g Expr) -> bool {
        false
    }

    fn visit_simple_not(&mut self, _: &'g Expr, _: &'g Expr) -> bool {
        false
    }

    fn visit_optional(&mut self, _: &'g Expr, _: &'g Expr) -> bool {
        false
    }

    fn visit_zero_or_more(&mut self, _: &'g Expr, _: &'g Expr) -> bool {
        false
    }

    fn visit_rule_ref(&mut self, _: &'g Expr, name: &'g str) -> bool {
        if self.visiting.contains(&name) {
            return true;
        }

        match self.grammar.find_rule(name) {
            Some(rule) => {
                self.visiting.push(name);
                let consumes = self.visit_expr(&rule.expression);
                self.visiting.pop();
                consumes
            }

            // Undefined rules are reported by another pass
            None => true,
        }
    }

    fn visit_literal(&mut self, _: &'g Expr, value: &'g str, _: bool) -> bool {
        !value.is_empty()
    }

    fn visit_class(&mut self, _: &'g Expr, _: &'g [ClassPart], _: bool, _: bool) -> bool {
        true
    }

    fn visit_any(&mut self, _: &'g Expr) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_grammar;

    fn consumes(grammar: &str) -> bool {
        let grammar = parse_grammar(grammar).unwrap();
        always_consumes(&grammar, &grammar.rules[0].expression)
    }

    #[test]
    fn detects_expressions_which_may_not_consume() {
        for grammar in [
            "start = ''",
            "start = 'a'?",
            "start = 'a'*",
            "start = &'a'",
            "start = !'a'",
            "start = &{ return true; }",
            "start = 'a' / ''",
            "start = '' ''",
            "start = other\nother = 'a'?",
        ] {
            assert!(!consumes(grammar), "{}", grammar);
        }
    }

    #[test]
    fn detects_expressions_which_always_consume() {
        for grammar in [
            "start = 'a'",
            "start = [a-z]",
            "start = []",
            "start = .",
            "start = 'a'+",
            "start = 'a' / 'b'",
            "start = '' 'a'",
            "start = $(x:'a' { return x; })",
            "start = other\nother = 'a' other?",
        ] {
            assert!(consumes(grammar), "{}", grammar);
        }
    }
}
