use crate::location::Span;
use serde_json::Value;
use std::cell::Cell;
use std::fmt;

/// Receives rule enter/match/fail events from parsers compiled with tracing enabled
pub trait Tracer {
    fn trace(&self, event: &TraceEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEventKind {
    RuleEnter,
    RuleMatch,
    RuleFail,
}

impl fmt::Display for TraceEventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Self::RuleEnter => "rule.enter",
            Self::RuleMatch => "rule.match",
            Self::RuleFail => "rule.fail",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent<'a> {
    pub kind: TraceEventKind,
    pub rule: &'a str,

    /// Matched input for [`TraceEventKind::RuleMatch`], the rule's start position otherwise
    pub location: Span,

    /// Value produced by a matching rule
    pub result: Option<&'a Value>,
}

/// Tracer writing indented events to the `log` facade, at the trace level
///
/// Used when tracing is enabled and no tracer is provided.
#[derive(Debug, Default)]
pub struct LogTracer {
    depth: Cell<usize>,
}

impl Tracer for LogTracer {
    fn trace(&self, event: &TraceEvent) {
        if event.kind != TraceEventKind::RuleEnter {
            self.depth.set(self.depth.get().saturating_sub(1));
        }

        log::trace!(
            "{}:{}-{}:{} {:<10} {}{}",
            event.location.start.line,
            event.location.start.column,
            event.location.end.line,
            event.location.end.column,
            event.kind,
            "  ".repeat(self.depth.get()),
            event.rule
        );

        if event.kind == TraceEventKind::RuleEnter {
            self.depth.set(self.depth.get() + 1);
        }
    }
}
