use crate::ast::{ClassPart, Code, Expr, Grammar, NodeMut, Params, Registers, Rule, VisitorMut};
use crate::compiler::{GrammarError, Pass, Session};

/// Assign every expression the result slot it writes into, and the position slot it saves its start to
///
/// Slots are indices in the register frame of the enclosing rule, allocated as a stack:
/// a node's children are placed right above the slots the node itself still needs.
///
/// * sequences save their start position, and their elements write into consecutive slots (the first one shares the
///   sequence's own slot), so the elements can be collected into an array once they all matched
/// * repetitions write each iteration's value one slot above their own, then append it to their array
/// * actions, text extractions and simple predicates save their start position
/// * choices share their slot between all alternatives
///
/// The rule's [registers](`Registers`) are then set to the maximum depth reached.
pub struct AllocateSlots;

impl Pass for AllocateSlots {
    fn name(&self) -> &str {
        "allocate_slots"
    }

    fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
        Allocator::default().visit_grammar(grammar);
        Ok(())
    }
}

/// Number of slots used above (and including) a base index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Depth {
    result: usize,
    pos: usize,
}

impl Depth {
    fn max(self, other: Self) -> Self {
        Self {
            result: self.result.max(other.result),
            pos: self.pos.max(other.pos),
        }
    }
}

#[derive(Default)]
struct Allocator {
    /// First free slots for the node being visited
    base: Depth,
}

impl Allocator {
    /// Visit an expression placed at the provided base
    fn visit_at(&mut self, base: Depth, expression: &mut Expr) -> Depth {
        let outer = std::mem::replace(&mut self.base, base);
        let depth = self.visit_expr(expression);
        self.base = outer;
        depth
    }

    /// Allocate a node with a single child placed `offset` slots above its own
    fn wrapper(&mut self, node: NodeMut, expression: &mut Expr, offset: Depth) -> Depth {
        let base = self.base;

        node.slots.result = base.result;
        node.slots.pos = if offset.pos > 0 { Some(base.pos) } else { None };

        let inner = self.visit_at(
            Depth {
                result: base.result + offset.result,
                pos: base.pos + offset.pos,
            },
            expression,
        );

        Depth {
            result: inner.result + offset.result,
            pos: inner.pos + offset.pos,
        }
    }

    fn leaf(&mut self, node: NodeMut) -> Depth {
        node.slots.result = self.base.result;
        node.slots.pos = None;
        Depth::default()
    }
}

const SAME: Depth = Depth { result: 0, pos: 0 };
const SAVE_POS: Depth = Depth { result: 0, pos: 1 };
const ITEM: Depth = Depth { result: 1, pos: 0 };

impl VisitorMut for Allocator {
    type Output = Depth;

    fn visit_rule(&mut self, rule: &mut Rule) -> Depth {
        let depth = self.visit_at(Depth::default(), &mut rule.expression);

        rule.registers = Registers {
            results: depth.result + 1,
            positions: depth.pos,
        };

        log::trace!(
            "rule \"{}\" needs {} result slot(s) and {} position slot(s)",
            rule.name,
            rule.registers.results,
            rule.registers.positions
        );

        depth
    }

    fn visit_named(&mut self, node: NodeMut, _: &str, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAME)
    }

    fn visit_choice(&mut self, node: NodeMut, alternatives: &mut [Expr]) -> Depth {
        let base = self.base;
        node.slots.result = base.result;
        node.slots.pos = None;

        alternatives
            .iter_mut()
            .map(|alternative| self.visit_at(base, alternative))
            .fold(Depth::default(), Depth::max)
    }

    fn visit_sequence(&mut self, node: NodeMut, elements: &mut [Expr]) -> Depth {
        let base = self.base;
        node.slots.result = base.result;
        node.slots.pos = Some(base.pos);

        let mut depth = Depth::default();

        for (i, element) in elements.iter_mut().enumerate() {
            let inner = self.visit_at(
                Depth {
                    result: base.result + i,
                    pos: base.pos + 1,
                },
                element,
            );

            depth = depth.max(Depth {
                result: inner.result + i,
                pos: inner.pos,
            });
        }

        Depth {
            result: depth.result,
            pos: depth.pos + 1,
        }
    }

    fn visit_labeled(&mut self, node: NodeMut, _: &str, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAME)
    }

    fn visit_action(&mut self, node: NodeMut, expression: &mut Expr, _: &Code, _: &mut Params) -> Depth {
        self.wrapper(node, expression, SAVE_POS)
    }

    fn visit_text(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAVE_POS)
    }

    fn visit_simple_and(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAVE_POS)
    }

    fn visit_simple_not(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAVE_POS)
    }

    fn visit_semantic_and(&mut self, node: NodeMut, _: &Code, _: &mut Params) -> Depth {
        self.leaf(node)
    }

    fn visit_semantic_not(&mut self, node: NodeMut, _: &Code, _: &mut Params) -> Depth {
        self.leaf(node)
    }

    fn visit_optional(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, SAME)
    }

    fn visit_zero_or_more(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, ITEM)
    }

    fn visit_one_or_more(&mut self, node: NodeMut, expression: &mut Expr) -> Depth {
        self.wrapper(node, expression, ITEM)
    }

    fn visit_rule_ref(&mut self, node: NodeMut, _: &mut String) -> Depth {
        self.leaf(node)
    }

    fn visit_literal(&mut self, node: NodeMut, _: &str, _: bool) -> Depth {
        self.leaf(node)
    }

    fn visit_class(&mut self, node: NodeMut, _: &[ClassPart], _: bool, _: bool) -> Depth {
        self.leaf(node)
    }

    fn visit_any(&mut self, node: NodeMut) -> Depth {
        self.leaf(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Slots};
    use crate::compiler::passes::testing::run;

    fn allocate(grammar: &str) -> Grammar {
        run(grammar, &[&AllocateSlots]).unwrap().0
    }

    fn registers(grammar: &str) -> (usize, usize) {
        let registers = allocate(grammar).rules[0].registers;
        (registers.results, registers.positions)
    }

    #[test]
    fn leaves_need_a_single_result_slot() {
        assert_eq!(registers("start = 'a'"), (1, 0));
        assert_eq!(registers("start = 'a' / [b] / ."), (1, 0));
    }

    #[test]
    fn sequences_stack_their_elements() {
        assert_eq!(registers("start = 'a' 'b' 'c'"), (3, 1));

        let grammar = allocate("start = 'a' ('b' 'c')");

        let elements = match &grammar.rules[0].expression.kind {
            ExprKind::Sequence(elements) => elements,
            kind => panic!("unexpected node: {:?}", kind),
        };

        assert_eq!(grammar.rules[0].expression.slots, Slots { result: 0, pos: Some(0) });
        assert_eq!(elements[0].slots, Slots { result: 0, pos: None });
        assert_eq!(elements[1].slots, Slots { result: 1, pos: Some(1) });
        assert_eq!(grammar.rules[0].registers, Registers { results: 3, positions: 2 });
    }

    #[test]
    fn repetitions_and_actions_use_extra_slots() {
        assert_eq!(registers("start = 'a'*"), (2, 0));
        assert_eq!(registers("start = $'a'"), (1, 1));
        assert_eq!(registers("start = x:'a'+ { return x; }"), (2, 1));
        assert_eq!(registers("start = ('a' 'b')* 'c'"), (3, 2));
    }
}
