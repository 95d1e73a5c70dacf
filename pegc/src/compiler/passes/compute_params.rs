use crate::ast::{Code, Expr, Grammar, NodeMut, Params, Rule, SlotPath, VisitorMut};
use crate::compiler::{GrammarError, Pass, Session};

/// Bind the labels visible to each action and semantic predicate to the slot holding their value
///
/// Must run after [`AllocateSlots`](super::AllocateSlots).
///
/// Scoping follows the duplicate labels check: sequences share their scope with their elements,
/// and the other nodes with children see their enclosing labels but don't leak their own.
pub struct ComputeParams;

impl Pass for ComputeParams {
    fn name(&self) -> &str {
        "compute_params"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        Binder::default().visit_grammar(grammar);
        Ok(())
    }
}

#[derive(Default)]
struct Binder {
    scopes: Vec<Params>,
}

impl Binder {
    fn env(&mut self) -> &mut Params {
        if self.scopes.is_empty() {
            self.scopes.push(Params::new());
        }

        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Visit an expression in a copy of the current scope
    fn scoped(&mut self, expression: &mut Expr) -> Params {
        let inner = self.env().clone();
        self.scopes.push(inner);
        self.visit_expr(expression);
        self.scopes.pop().unwrap_or_default()
    }
}

impl VisitorMut for Binder {
    type Output = ();

    fn visit_rule(&mut self, rule: &mut Rule) {
        self.scopes = vec![Params::new()];
        self.visit_expr(&mut rule.expression);
    }

    fn visit_choice(&mut self, _: NodeMut, alternatives: &mut [Expr]) {
        for alternative in alternatives {
            self.scoped(alternative);
        }
    }

    fn visit_sequence(&mut self, node: NodeMut, elements: &mut [Expr]) {
        for element in elements.iter_mut() {
            self.visit_expr(element);
        }

        // Values of the elements end up in the sequence's array
        let sequence_slot = node.slots.result;

        for path in self.env().values_mut() {
            if let Some(index) = elements.iter().position(|element| element.slots.result == path.slot) {
                *path = path.nest_in(sequence_slot, index);
            }
        }
    }

    fn visit_labeled(&mut self, node: NodeMut, label: &str, expression: &mut Expr) {
        self.scoped(expression);

        // Bound after the expression so the label isn't rewritten by a sequence inside it
        self.env().insert(label.to_string(), SlotPath::slot(node.slots.result));
    }

    fn visit_action(&mut self, _: NodeMut, expression: &mut Expr, _: &Code, params: &mut Params) {
        *params = self.scoped(expression);
    }

    fn visit_text(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }

    fn visit_simple_and(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }

    fn visit_simple_not(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }

    fn visit_semantic_and(&mut self, _: NodeMut, _: &Code, params: &mut Params) {
        *params = self.env().clone();
    }

    fn visit_semantic_not(&mut self, _: NodeMut, _: &Code, params: &mut Params) {
        *params = self.env().clone();
    }

    fn visit_optional(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }

    fn visit_zero_or_more(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }

    fn visit_one_or_more(&mut self, _: NodeMut, expression: &mut Expr) {
        self.scoped(expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Visitor};
    use crate::compiler::passes::testing::run;
    use crate::compiler::passes::AllocateSlots;

    /// Collect the parameters of every code node, as `label=path` strings
    #[derive(Default)]
    struct CodeParams(Vec<Vec<String>>);

    impl CodeParams {
        fn push(&mut self, params: &Params) {
            self.0.push(
                params
                    .iter()
                    .map(|(label, path)| format!("{}={}", label, path))
                    .collect(),
            );
        }
    }

    impl<'g> Visitor<'g> for CodeParams {
        type Output = ();

        fn visit_action(&mut self, _: &'g Expr, expression: &'g Expr, _: &'g Code, params: &'g Params) {
            self.visit_expr(expression);
            self.push(params);
        }

        fn visit_semantic_and(&mut self, _: &'g Expr, _: &'g Code, params: &'g Params) {
            self.push(params);
        }
    }

    fn params(grammar: &str) -> Vec<Vec<String>> {
        let (grammar, _) = run(grammar, &[&AllocateSlots, &ComputeParams]).unwrap();

        let mut collector = CodeParams::default();
        collector.visit_grammar(&grammar);
        collector.0
    }

    #[test]
    fn labels_of_a_sequence_point_into_its_array() {
        assert_eq!(
            params("start = a:'a' b:'b' c:'c' { }"),
            [["a=result0[0]", "b=result0[1]", "c=result0[2]"]]
        );
    }

    #[test]
    fn labels_of_nested_sequences_are_rebased() {
        assert_eq!(
            params("start = a:'a' ('b' b:'b') { }"),
            [["a=result0[0]", "b=result0[1][1]"]]
        );
    }

    #[test]
    fn single_labeled_expressions_use_their_own_slot() {
        assert_eq!(params("start = a:'a' { }"), [["a=result0"]]);
    }

    #[test]
    fn alternatives_do_not_leak_labels() {
        assert_eq!(params("start = (a:'a' / b:'b') { }"), [Vec::<String>::new()]);
    }

    #[test]
    fn predicates_see_the_labels_bound_before_them() {
        assert_eq!(
            params("start = a:'a' &{ return a; } b:'b'"),
            [["a=result0"]]
        );
    }

    #[test]
    fn inner_actions_capture_their_own_scope() {
        let found = params("start = a:'a' (b:'b' { }) { }");

        assert_eq!(found[0], ["a=result0", "b=result1"]);
        assert_eq!(found[1], ["a=result0[0]"]);
    }

    #[test]
    fn labels_are_bound_to_the_labeled_node() {
        let (grammar, _) = run("start = 'x' a:$('a' 'b') { }", &[&AllocateSlots, &ComputeParams]).unwrap();

        let params = match &grammar.rules[0].expression.kind {
            ExprKind::Action { params, .. } => params,
            kind => panic!("unexpected node: {:?}", kind),
        };

        assert_eq!(params["a"], SlotPath { slot: 0, indices: vec![1] });
    }
}
