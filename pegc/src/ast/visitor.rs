use super::{ClassPart, Code, Expr, ExprKind, Grammar, Params, Rule, Slots};
use crate::location::Span;

/// Read-only traversal over a [`Grammar`]
///
/// [`Visitor::visit_expr`] dispatches every node to the handler of its kind through an exhaustive match,
/// so adding a node kind is a compile error until every traversal handles it.
///
/// By default, wrapper nodes return their inner expression's output, nodes with several children visit all of them
/// and return the default output, and leaves return the default output.
/// Passes override the handlers they care about and keep any extra state they need in `self`.
pub trait Visitor<'g>: Sized {
    type Output: Default;

    fn visit_grammar(&mut self, grammar: &'g Grammar) {
        for rule in &grammar.rules {
            self.visit_rule(rule);
        }
    }

    fn visit_rule(&mut self, rule: &'g Rule) -> Self::Output {
        self.visit_expr(&rule.expression)
    }

    fn visit_expr(&mut self, expr: &'g Expr) -> Self::Output {
        walk_expr(self, expr)
    }

    fn visit_named(&mut self, _node: &'g Expr, _name: &'g str, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_choice(&mut self, _node: &'g Expr, alternatives: &'g [Expr]) -> Self::Output {
        for alternative in alternatives {
            self.visit_expr(alternative);
        }

        Self::Output::default()
    }

    fn visit_sequence(&mut self, _node: &'g Expr, elements: &'g [Expr]) -> Self::Output {
        for element in elements {
            self.visit_expr(element);
        }

        Self::Output::default()
    }

    fn visit_labeled(&mut self, _node: &'g Expr, _label: &'g str, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_action(
        &mut self,
        _node: &'g Expr,
        expression: &'g Expr,
        _code: &'g Code,
        _params: &'g Params,
    ) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_text(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_simple_and(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_simple_not(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_semantic_and(&mut self, _node: &'g Expr, _code: &'g Code, _params: &'g Params) -> Self::Output {
        Self::Output::default()
    }

    fn visit_semantic_not(&mut self, _node: &'g Expr, _code: &'g Code, _params: &'g Params) -> Self::Output {
        Self::Output::default()
    }

    fn visit_optional(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_zero_or_more(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_one_or_more(&mut self, _node: &'g Expr, expression: &'g Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_rule_ref(&mut self, _node: &'g Expr, _name: &'g str) -> Self::Output {
        Self::Output::default()
    }

    fn visit_literal(&mut self, _node: &'g Expr, _value: &'g str, _ignore_case: bool) -> Self::Output {
        Self::Output::default()
    }

    fn visit_class(
        &mut self,
        _node: &'g Expr,
        _parts: &'g [ClassPart],
        _inverted: bool,
        _ignore_case: bool,
    ) -> Self::Output {
        Self::Output::default()
    }

    fn visit_any(&mut self, _node: &'g Expr) -> Self::Output {
        Self::Output::default()
    }
}

/// Dispatch an expression to the [`Visitor`] handler of its kind
pub fn walk_expr<'g, V: Visitor<'g>>(visitor: &mut V, expr: &'g Expr) -> V::Output {
    match &expr.kind {
        ExprKind::Named { name, expression } => visitor.visit_named(expr, name, expression),
        ExprKind::Choice(alternatives) => visitor.visit_choice(expr, alternatives),
        ExprKind::Sequence(elements) => visitor.visit_sequence(expr, elements),
        ExprKind::Labeled { label, expression } => visitor.visit_labeled(expr, label, expression),
        ExprKind::Action {
            expression,
            code,
            params,
        } => visitor.visit_action(expr, expression, code, params),
        ExprKind::Text(expression) => visitor.visit_text(expr, expression),
        ExprKind::SimpleAnd(expression) => visitor.visit_simple_and(expr, expression),
        ExprKind::SimpleNot(expression) => visitor.visit_simple_not(expr, expression),
        ExprKind::SemanticAnd { code, params } => visitor.visit_semantic_and(expr, code, params),
        ExprKind::SemanticNot { code, params } => visitor.visit_semantic_not(expr, code, params),
        ExprKind::Optional(expression) => visitor.visit_optional(expr, expression),
        ExprKind::ZeroOrMore(expression) => visitor.visit_zero_or_more(expr, expression),
        ExprKind::OneOrMore(expression) => visitor.visit_one_or_more(expr, expression),
        ExprKind::RuleRef(name) => visitor.visit_rule_ref(expr, name),
        ExprKind::Literal { value, ignore_case } => visitor.visit_literal(expr, value, *ignore_case),
        ExprKind::Class {
            parts,
            inverted,
            ignore_case,
            ..
        } => visitor.visit_class(expr, parts, *inverted, *ignore_case),
        ExprKind::Any => visitor.visit_any(expr),
    }
}

/// Annotatable part of an expression, handed to [`VisitorMut`] handlers next to the node's fields
pub struct NodeMut<'a> {
    pub location: Span,
    pub slots: &'a mut Slots,
}

/// Mutable traversal over a [`Grammar`], used by the passes which annotate or rewrite the tree
///
/// Defaults mirror the ones of [`Visitor`].
pub trait VisitorMut: Sized {
    type Output: Default;

    fn visit_grammar(&mut self, grammar: &mut Grammar) {
        for rule in &mut grammar.rules {
            self.visit_rule(rule);
        }
    }

    fn visit_rule(&mut self, rule: &mut Rule) -> Self::Output {
        self.visit_expr(&mut rule.expression)
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> Self::Output {
        walk_expr_mut(self, expr)
    }

    fn visit_named(&mut self, _node: NodeMut, _name: &str, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_choice(&mut self, _node: NodeMut, alternatives: &mut [Expr]) -> Self::Output {
        for alternative in alternatives {
            self.visit_expr(alternative);
        }

        Self::Output::default()
    }

    fn visit_sequence(&mut self, _node: NodeMut, elements: &mut [Expr]) -> Self::Output {
        for element in elements {
            self.visit_expr(element);
        }

        Self::Output::default()
    }

    fn visit_labeled(&mut self, _node: NodeMut, _label: &str, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_action(
        &mut self,
        _node: NodeMut,
        expression: &mut Expr,
        _code: &Code,
        _params: &mut Params,
    ) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_text(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_simple_and(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_simple_not(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_semantic_and(&mut self, _node: NodeMut, _code: &Code, _params: &mut Params) -> Self::Output {
        Self::Output::default()
    }

    fn visit_semantic_not(&mut self, _node: NodeMut, _code: &Code, _params: &mut Params) -> Self::Output {
        Self::Output::default()
    }

    fn visit_optional(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_zero_or_more(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_one_or_more(&mut self, _node: NodeMut, expression: &mut Expr) -> Self::Output {
        self.visit_expr(expression)
    }

    fn visit_rule_ref(&mut self, _node: NodeMut, _name: &mut String) -> Self::Output {
        Self::Output::default()
    }

    fn visit_literal(&mut self, _node: NodeMut, _value: &str, _ignore_case: bool) -> Self::Output {
        Self::Output::default()
    }

    fn visit_class(
        &mut self,
        _node: NodeMut,
        _parts: &[ClassPart],
        _inverted: bool,
        _ignore_case: bool,
    ) -> Self::Output {
        Self::Output::default()
    }

    fn visit_any(&mut self, _node: NodeMut) -> Self::Output {
        Self::Output::default()
    }
}

/// Dispatch an expression to the [`VisitorMut`] handler of its kind
pub fn walk_expr_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expr) -> V::Output {
    let Expr {
        kind,
        location,
        slots,
    } = expr;

    let node = NodeMut {
        location: *location,
        slots,
    };

    match kind {
        ExprKind::Named { name, expression } => visitor.visit_named(node, name, expression),
        ExprKind::Choice(alternatives) => visitor.visit_choice(node, alternatives),
        ExprKind::Sequence(elements) => visitor.visit_sequence(node, elements),
        ExprKind::Labeled { label, expression } => visitor.visit_labeled(node, label, expression),
        ExprKind::Action {
            expression,
            code,
            params,
        } => visitor.visit_action(node, expression, code, params),
        ExprKind::Text(expression) => visitor.visit_text(node, expression),
        ExprKind::SimpleAnd(expression) => visitor.visit_simple_and(node, expression),
        ExprKind::SimpleNot(expression) => visitor.visit_simple_not(node, expression),
        ExprKind::SemanticAnd { code, params } => visitor.visit_semantic_and(node, code, params),
        ExprKind::SemanticNot { code, params } => visitor.visit_semantic_not(node, code, params),
        ExprKind::Optional(expression) => visitor.visit_optional(node, expression),
        ExprKind::ZeroOrMore(expression) => visitor.visit_zero_or_more(node, expression),
        ExprKind::OneOrMore(expression) => visitor.visit_one_or_more(node, expression),
        ExprKind::RuleRef(name) => visitor.visit_rule_ref(node, name),
        ExprKind::Literal { value, ignore_case } => visitor.visit_literal(node, value, *ignore_case),
        ExprKind::Class {
            parts,
            inverted,
            ignore_case,
            ..
        } => visitor.visit_class(node, parts, *inverted, *ignore_case),
        ExprKind::Any => visitor.visit_any(node),
    }
}
