use super::errors::{Expectation, ParseError, SyntaxError};
use super::trace::{LogTracer, TraceEvent, TraceEventKind, Tracer};
use crate::ast::{Registers, SlotPath};
use crate::generator::{ActionContext, BoundCode, Op, Program};
use crate::location::LineIndex;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::mem;

static END_OF_INPUT: Expectation = Expectation::End;
static ANY_CHARACTER: Expectation = Expectation::Any;

/// Run a program's rule against a whole input
pub(crate) fn execute(
    program: &Program,
    input: &str,
    rule: usize,
    options: &Map<String, Value>,
    tracer: Option<&dyn Tracer>,
) -> Result<Value, ParseError> {
    let mut machine = Machine {
        program,
        input,
        options,
        tracer,
        fallback_tracer: LogTracer::default(),
        lines: OnceCell::new(),
        pos: 0,
        max_fail_pos: 0,
        max_fail_expected: vec![],
        silent: 0,
        memo: HashMap::new(),
    };

    match machine.call_rule(rule) {
        Err(abort) => Err(SyntaxError::custom(input, abort.message, abort.start, abort.end).into()),

        Ok(Some(value)) if machine.pos == input.len() => Ok(value),

        Ok(matched) => {
            // The rule matched, but not the whole input
            if matched.is_some() {
                machine.fail(&END_OF_INPUT);
            }

            Err(SyntaxError::unexpected(input, machine.max_fail_pos, machine.max_fail_expected).into())
        }
    }
}

/// User code asked to stop parsing
struct Abort {
    message: String,
    start: usize,
    end: usize,
}

/// Outcome of an operation: did it match?
type Step = Result<bool, Abort>;

struct Memo {
    end: usize,
    result: Option<Value>,

    /// Were failures recorded while computing the entry?
    recorded: bool,
}

/// Registers of a rule invocation
struct Frame {
    results: Vec<Value>,
    positions: Vec<usize>,
}

impl Frame {
    fn new(registers: Registers) -> Self {
        Self {
            results: vec![Value::Null; registers.results],
            positions: vec![0; registers.positions],
        }
    }

    fn take(&mut self, slot: usize) -> Value {
        mem::take(&mut self.results[slot])
    }

    /// Get a copy of the value a label points to
    fn resolve(&self, path: &SlotPath) -> Value {
        path.indices
            .iter()
            .try_fold(&self.results[path.slot], |value, index| value.get(*index))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

struct Machine<'a> {
    program: &'a Program,
    input: &'a str,
    options: &'a Map<String, Value>,
    tracer: Option<&'a dyn Tracer>,
    fallback_tracer: LogTracer,

    /// Built on first use, when code or tracing needs a location
    lines: OnceCell<LineIndex<'a>>,

    /// Current position in the input
    pos: usize,

    /// Furthest position a failure was recorded at, and what was expected there
    max_fail_pos: usize,
    max_fail_expected: Vec<&'a Expectation>,

    /// Failures are only recorded when this is zero
    silent: usize,

    /// Rule results, by rule index and start position
    memo: HashMap<(usize, usize), Memo>,
}

impl<'a> Machine<'a> {
    /// Record a failure at the current position
    fn fail(&mut self, expected: &'a Expectation) {
        if self.silent > 0 || self.pos < self.max_fail_pos {
            return;
        }

        if self.pos > self.max_fail_pos {
            self.max_fail_pos = self.pos;
            self.max_fail_expected.clear();
        }

        self.max_fail_expected.push(expected);
    }

    /// Run an operation with failure recording disabled
    fn silently(&mut self, op: &'a Op, frame: &mut Frame) -> Step {
        self.silent += 1;
        let matched = self.eval(op, frame);
        self.silent -= 1;
        matched
    }

    fn call_rule(&mut self, index: usize) -> Result<Option<Value>, Abort> {
        let program = self.program;
        let rule = &program.rules[index];
        let start = self.pos;

        self.trace(TraceEventKind::RuleEnter, &rule.name, start, None);

        if program.cache {
            // An entry computed with failure recording disabled can't stand for a run which records them
            let cached = self
                .memo
                .get(&(index, start))
                .filter(|memo| memo.recorded || self.silent > 0)
                .map(|memo| (memo.end, memo.result.clone()));

            if let Some((end, result)) = cached {
                log::trace!("memo hit for rule \"{}\" at offset {}", rule.name, start);
                self.pos = end;
                self.trace_outcome(&rule.name, start, result.as_ref());
                return Ok(result);
            }
        }

        let mut frame = Frame::new(rule.registers);

        let matched = if rule.report_failures {
            self.eval(&rule.body, &mut frame)?
        } else {
            self.silently(&rule.body, &mut frame)?
        };

        let result = if matched { Some(frame.take(0)) } else { None };

        self.trace_outcome(&rule.name, start, result.as_ref());

        if program.cache {
            self.memo.insert(
                (index, start),
                Memo {
                    end: self.pos,
                    result: result.clone(),
                    recorded: self.silent == 0,
                },
            );
        }

        Ok(result)
    }

    fn eval(&mut self, op: &'a Op, frame: &mut Frame) -> Step {
        let input = self.input;

        match op {
            Op::Named { expectation, inner } => {
                let matched = self.silently(inner, frame)?;

                if !matched {
                    self.fail(expectation);
                }

                Ok(matched)
            }

            Op::Choice(alternatives) => {
                for alternative in alternatives {
                    if self.eval(alternative, frame)? {
                        return Ok(true);
                    }
                }

                Ok(false)
            }

            Op::Sequence { result, pos, elements } => {
                frame.positions[*pos] = self.pos;

                for element in elements {
                    if !self.eval(element, frame)? {
                        self.pos = frame.positions[*pos];
                        return Ok(false);
                    }
                }

                let values = (0..elements.len()).map(|i| frame.take(result + i)).collect();
                frame.results[*result] = Value::Array(values);
                Ok(true)
            }

            Op::Action { result, pos, inner, code } => {
                frame.positions[*pos] = self.pos;

                if !self.eval(inner, frame)? {
                    return Ok(false);
                }

                let value = self.run_code(code, frame, frame.positions[*pos])?;
                frame.results[*result] = value;
                Ok(true)
            }

            Op::Text { result, pos, inner } => {
                let start = self.pos;
                frame.positions[*pos] = start;

                if !self.eval(inner, frame)? {
                    return Ok(false);
                }

                frame.results[*result] = Value::String(input[start..self.pos].to_string());
                Ok(true)
            }

            Op::SimpleAnd { result, pos, inner } | Op::SimpleNot { result, pos, inner } => {
                frame.positions[*pos] = self.pos;
                let matched = self.silently(inner, frame)?;
                self.pos = frame.positions[*pos];
                frame.results[*result] = Value::Null;

                let expected = matches!(op, Op::SimpleAnd { .. });
                Ok(matched == expected)
            }

            Op::SemanticAnd { result, code } | Op::SemanticNot { result, code } => {
                let value = self.run_code(code, frame, self.pos)?;
                frame.results[*result] = Value::Null;

                let expected = matches!(op, Op::SemanticAnd { .. });
                Ok(truthy(&value) == expected)
            }

            Op::Optional { result, inner } => {
                if !self.eval(inner, frame)? {
                    frame.results[*result] = Value::Null;
                }

                Ok(true)
            }

            Op::ZeroOrMore { result, inner } | Op::OneOrMore { result, inner } => {
                let mut items = vec![];

                loop {
                    let before = self.pos;

                    if !self.eval(inner, frame)? {
                        break;
                    }

                    items.push(frame.take(result + 1));

                    // Only reachable if the infinite repetition check was removed from the pipeline
                    if self.pos == before {
                        break;
                    }
                }

                if items.is_empty() && matches!(op, Op::OneOrMore { .. }) {
                    return Ok(false);
                }

                frame.results[*result] = Value::Array(items);
                Ok(true)
            }

            Op::RuleRef { result, rule } => match self.call_rule(*rule)? {
                Some(value) => {
                    frame.results[*result] = value;
                    Ok(true)
                }
                None => Ok(false),
            },

            Op::Literal { result, matcher } => match matcher.match_at(&input[self.pos..]) {
                Some(len) => {
                    frame.results[*result] = Value::String(input[self.pos..self.pos + len].to_string());
                    self.pos += len;
                    Ok(true)
                }
                None => {
                    self.fail(&matcher.expectation);
                    Ok(false)
                }
            },

            Op::Class { result, matcher } => match input[self.pos..].chars().next() {
                Some(c) if matcher.matches(c) => {
                    frame.results[*result] = Value::String(c.to_string());
                    self.pos += c.len_utf8();
                    Ok(true)
                }
                _ => {
                    self.fail(&matcher.expectation);
                    Ok(false)
                }
            },

            Op::Any { result } => match input[self.pos..].chars().next() {
                Some(c) => {
                    frame.results[*result] = Value::String(c.to_string());
                    self.pos += c.len_utf8();
                    Ok(true)
                }
                None => {
                    self.fail(&ANY_CHARACTER);
                    Ok(false)
                }
            },
        }
    }

    fn lines(&self) -> &LineIndex<'a> {
        self.lines.get_or_init(|| LineIndex::new(self.input))
    }

    fn run_code(&self, code: &BoundCode, frame: &Frame, start: usize) -> Result<Value, Abort> {
        let ctx = ActionContext {
            labels: code
                .params
                .iter()
                .map(|(label, path)| (label.as_str(), frame.resolve(path)))
                .collect(),
            lines: self.lines(),
            range: start..self.pos,
            options: self.options,
        };

        (code.run)(&ctx).map_err(|message| Abort {
            message,
            start,
            end: self.pos,
        })
    }

    fn trace_outcome(&self, rule: &str, start: usize, result: Option<&Value>) {
        match result {
            Some(value) => self.trace(TraceEventKind::RuleMatch, rule, start, Some(value)),
            None => self.trace(TraceEventKind::RuleFail, rule, start, None),
        }
    }

    fn trace(&self, kind: TraceEventKind, rule: &str, start: usize, result: Option<&Value>) {
        if !self.program.trace {
            return;
        }

        let tracer = self.tracer.unwrap_or(&self.fallback_tracer);

        let end = match kind {
            TraceEventKind::RuleMatch => self.pos,
            TraceEventKind::RuleEnter | TraceEventKind::RuleFail => start,
        };

        tracer.trace(&TraceEvent {
            kind,
            rule,
            location: self.lines().span(start, end),
            result,
        });
    }
}

/// Truthiness of a value returned by a semantic predicate
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(number) => number.as_f64().map_or(true, |number| number != 0.0),
        Value::String(string) => !string.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
