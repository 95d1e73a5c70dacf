//! Turn syntax trees back into grammar text
//!
//! Comments and original whitespace are not restored, and parenthesis are only emitted where precedence requires them.

use super::{Expr, ExprKind, Grammar, Rule};
use std::fmt;

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(initializer) = &self.initializer {
            writeln!(f, "{{{}}}", initializer.text)?;
        }

        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            write!(f, "{}", rule)?;
        }

        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.expression.kind {
            ExprKind::Named { name, expression } => {
                write!(f, "{} {} = ", self.name, quote(name))?;
                write_expr(f, expression, Level::Choice)
            }
            _ => {
                write!(f, "{} = ", self.name)?;
                write_expr(f, &self.expression, Level::Choice)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_expr(f, self, Level::Choice)
    }
}

/// Binding strength of the grammar's operators, loosest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Choice,
    Action,
    Sequence,
    Labeled,
    Prefixed,
    Suffixed,
    Primary,
}

fn level(expr: &Expr) -> Level {
    match &expr.kind {
        ExprKind::Named { expression, .. } => level(expression),
        ExprKind::Choice(_) => Level::Choice,
        ExprKind::Action { .. } => Level::Action,
        ExprKind::Sequence(_) => Level::Sequence,
        ExprKind::Labeled { .. } => Level::Labeled,
        ExprKind::Text(_) | ExprKind::SimpleAnd(_) | ExprKind::SimpleNot(_) => Level::Prefixed,
        ExprKind::Optional(_) | ExprKind::ZeroOrMore(_) | ExprKind::OneOrMore(_) => Level::Suffixed,
        ExprKind::SemanticAnd { .. }
        | ExprKind::SemanticNot { .. }
        | ExprKind::RuleRef(_)
        | ExprKind::Literal { .. }
        | ExprKind::Class { .. }
        | ExprKind::Any => Level::Primary,
    }
}

fn write_expr(f: &mut fmt::Formatter, expr: &Expr, min: Level) -> fmt::Result {
    if level(expr) < min {
        write!(f, "(")?;
        write_expr(f, expr, Level::Choice)?;
        return write!(f, ")");
    }

    match &expr.kind {
        // Display names are only printed at the rule level
        ExprKind::Named { expression, .. } => write_expr(f, expression, min),
        ExprKind::Choice(alternatives) => {
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    write!(f, " / ")?;
                }

                write_expr(f, alternative, Level::Action)?;
            }

            Ok(())
        }
        ExprKind::Sequence(elements) => {
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }

                write_expr(f, element, Level::Labeled)?;
            }

            Ok(())
        }
        ExprKind::Action {
            expression, code, ..
        } => {
            write_expr(f, expression, Level::Sequence)?;
            write!(f, " {{{}}}", code.text)
        }
        ExprKind::Labeled { label, expression } => {
            write!(f, "{}:", label)?;
            write_expr(f, expression, Level::Prefixed)
        }
        ExprKind::Text(expression) => prefixed(f, '$', expression),
        ExprKind::SimpleAnd(expression) => prefixed(f, '&', expression),
        ExprKind::SimpleNot(expression) => prefixed(f, '!', expression),
        ExprKind::Optional(expression) => suffixed(f, expression, '?'),
        ExprKind::ZeroOrMore(expression) => suffixed(f, expression, '*'),
        ExprKind::OneOrMore(expression) => suffixed(f, expression, '+'),
        ExprKind::SemanticAnd { code, .. } => write!(f, "&{{{}}}", code.text),
        ExprKind::SemanticNot { code, .. } => write!(f, "!{{{}}}", code.text),
        ExprKind::RuleRef(name) => write!(f, "{}", name),
        ExprKind::Literal { value, ignore_case } => {
            write!(f, "{}{}", quote(value), if *ignore_case { "i" } else { "" })
        }
        ExprKind::Class { raw, .. } => write!(f, "{}", raw),
        ExprKind::Any => write!(f, "."),
    }
}

fn prefixed(f: &mut fmt::Formatter, operator: char, expression: &Expr) -> fmt::Result {
    write!(f, "{}", operator)?;
    write_expr(f, expression, Level::Suffixed)
}

fn suffixed(f: &mut fmt::Formatter, expression: &Expr, operator: char) -> fmt::Result {
    write_expr(f, expression, Level::Primary)?;
    write!(f, "{}", operator)
}

/// Quote a string the way the grammar language writes literals
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || c == '\x7f' => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}
