use super::code::HostFn;
use crate::ast::{ClassPart, Registers, SlotPath};
use crate::compiler::Optimize;
use crate::runtime::Expectation;
use std::fmt;

/// An executable parser program
#[derive(Debug, Clone)]
pub struct Program {
    /// Rules, in declaration order
    pub rules: Vec<CompiledRule>,

    /// Indices of the rules parsing may start from, the default one first
    pub start_rules: Vec<usize>,

    /// Memoize rule results
    pub cache: bool,

    /// Emit trace events
    pub trace: bool,
}

impl Program {
    /// Find a rule's index by its name
    pub fn rule_index(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub display_name: Option<String>,
    pub report_failures: bool,
    pub registers: Registers,
    pub body: Op,
}

/// A single operation
///
/// `result` is the slot the operation writes its value into, `pos` the slot it saves its starting position to.
/// Failed operations always restore the input position they started at.
#[derive(Debug, Clone)]
pub enum Op {
    /// Run silently, and report the display name as expected on failure
    Named { expectation: Expectation, inner: Box<Op> },

    /// Run each alternative until one succeeds, all of them writing into the same slot
    Choice(Vec<Op>),

    /// Run each element (the i-th one writing into slot `result + i`) and collect their values into an array
    Sequence { result: usize, pos: usize, elements: Vec<Op> },

    Action {
        result: usize,
        pos: usize,
        inner: Box<Op>,
        code: BoundCode,
    },

    Text { result: usize, pos: usize, inner: Box<Op> },

    SimpleAnd { result: usize, pos: usize, inner: Box<Op> },

    SimpleNot { result: usize, pos: usize, inner: Box<Op> },

    SemanticAnd { result: usize, code: BoundCode },

    SemanticNot { result: usize, code: BoundCode },

    Optional { result: usize, inner: Box<Op> },

    /// Repeat the inner operation, which writes into slot `result + 1`
    ZeroOrMore { result: usize, inner: Box<Op> },

    OneOrMore { result: usize, inner: Box<Op> },

    RuleRef { result: usize, rule: usize },

    Literal { result: usize, matcher: LiteralMatcher },

    Class { result: usize, matcher: ClassMatcher },

    Any { result: usize },
}

/// User code bound to a host function
#[derive(Clone)]
pub struct BoundCode {
    /// Code as written in the grammar
    pub text: String,

    /// Labels visible to the code, and where to find their value
    pub params: Vec<(String, SlotPath)>,

    pub(crate) run: HostFn,
}

impl fmt::Debug for BoundCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BoundCode")
            .field("text", &self.text)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    pub value: String,
    pub ignore_case: bool,

    /// Lowercased characters, precomputed for case-insensitive literals
    folded: Option<Vec<char>>,

    pub expectation: Expectation,
}

impl LiteralMatcher {
    pub fn new(value: &str, ignore_case: bool, optimize: Optimize) -> Self {
        Self {
            value: value.to_string(),
            ignore_case,
            folded: if ignore_case && optimize == Optimize::Speed {
                Some(value.chars().map(fold).collect())
            } else {
                None
            },
            expectation: Expectation::Literal {
                text: value.to_string(),
                ignore_case,
            },
        }
    }

    /// Match the beginning of an input, returning the matched length in bytes
    pub fn match_at(&self, input: &str) -> Option<usize> {
        if !self.ignore_case {
            return input.starts_with(&self.value).then(|| self.value.len());
        }

        let mut chars = input.chars();
        let mut len = 0;

        let mut eat = |expected: char| -> Option<()> {
            let c = chars.next()?;

            if fold(c) != expected {
                return None;
            }

            len += c.len_utf8();
            Some(())
        };

        match &self.folded {
            Some(folded) => {
                for expected in folded {
                    eat(*expected)?;
                }
            }
            None => {
                for expected in self.value.chars() {
                    eat(fold(expected))?;
                }
            }
        }

        Some(len)
    }
}

#[derive(Debug, Clone)]
pub struct ClassMatcher {
    pub parts: Vec<ClassPart>,
    pub inverted: bool,
    pub ignore_case: bool,

    /// Precomputed answers for ASCII characters (bit N is set if the character with code N matches)
    ascii: Option<u128>,

    pub expectation: Expectation,
}

impl ClassMatcher {
    pub fn new(parts: &[ClassPart], inverted: bool, ignore_case: bool, raw: &str, optimize: Optimize) -> Self {
        let mut matcher = Self {
            parts: parts.to_vec(),
            inverted,
            ignore_case,
            ascii: None,
            expectation: Expectation::Class {
                raw: raw.to_string(),
            },
        };

        if optimize == Optimize::Speed {
            matcher.ascii = Some(
                (0u8..128)
                    .filter(|code| matcher.test(char::from(*code)))
                    .fold(0, |table, code| table | (1u128 << code)),
            );
        }

        matcher
    }

    pub fn matches(&self, c: char) -> bool {
        match self.ascii {
            Some(table) if c.is_ascii() => table & (1u128 << (c as u32)) != 0,
            _ => self.test(c),
        }
    }

    fn test(&self, c: char) -> bool {
        let contains = |c: char| self.parts.iter().any(|part| part.contains(c));

        let found = contains(c)
            || (self.ignore_case && (c.to_lowercase().any(contains) || c.to_uppercase().any(contains)));

        found != self.inverted
    }
}

/// Simple case folding
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();

    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_may_ignore_case() {
        for optimize in [Optimize::Speed, Optimize::Size] {
            let matcher = LiteralMatcher::new("Select", true, optimize);

            assert_eq!(matcher.match_at("SELECT *"), Some(6));
            assert_eq!(matcher.match_at("select"), Some(6));
            assert_eq!(matcher.match_at("selec"), None);
            assert_eq!(matcher.match_at("delete"), None);
        }

        let matcher = LiteralMatcher::new("Select", false, Optimize::Speed);
        assert_eq!(matcher.match_at("SELECT"), None);
        assert_eq!(matcher.match_at("Selection"), Some(6));
    }

    #[test]
    fn classes_match_the_same_way_whatever_the_optimization() {
        let parts = [ClassPart::Range('a', 'f'), ClassPart::Char('_'), ClassPart::Range('α', 'ω')];

        for optimize in [Optimize::Speed, Optimize::Size] {
            let plain = ClassMatcher::new(&parts, false, false, "[a-f_α-ω]", optimize);
            let inverted = ClassMatcher::new(&parts, true, false, "[^a-f_α-ω]", optimize);
            let folded = ClassMatcher::new(&parts, false, true, "[a-f_α-ω]i", optimize);

            for c in ['a', 'f', '_', 'β', 'g', 'A', 'Β', '0'] {
                assert_eq!(plain.matches(c), matches!(c, 'a'..='f' | '_' | 'β'), "{}", c);
                assert_eq!(inverted.matches(c), !plain.matches(c), "{}", c);
                assert_eq!(folded.matches(c), matches!(c, 'a'..='f' | '_' | 'β' | 'A' | 'Β'), "{}", c);
            }
        }
    }
}
