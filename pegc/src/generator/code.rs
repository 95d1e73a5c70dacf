use crate::ast::Code;
use crate::location::{LineIndex, Span};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// A host function standing for a grammar's code block
///
/// Returning an error aborts the parse with the provided message.
pub type HostFn = Arc<dyn Fn(&ActionContext) -> Result<Value, String> + Send + Sync>;

/// Binds the code blocks of a grammar to host functions
pub trait CodeResolver {
    /// Bind an action's or a semantic predicate's code
    ///
    /// `labels` lists the labels visible to the code. Returns the reason of the failure when the code can't be bound.
    fn resolve(&self, code: &Code, labels: &[&str]) -> Result<HostFn, String>;

    /// Handle the grammar's initializer, run once per compilation
    fn initializer(&self, _code: &Code) -> Result<(), String> {
        Ok(())
    }
}

/// Registry of host functions, indexed by the code block they replace
///
/// Code is looked up with its surrounding whitespace trimmed. Unregistered code must use one of the inline forms:
///
/// * an empty block, returning `null`
/// * `return <JSON literal>;` (`return 42;`, `return "add";`, `return [1, 2];`)
/// * `return <label>;`
/// * `return text();` or `return location();`
/// * `return options.<key>;`, reading a value from [`ParseOptions::user`](crate::runtime::ParseOptions::user)
///
/// ```
/// use pegc::compiler::{CompileOptions, Compiler};
/// use pegc::generator::HostCode;
/// use serde_json::json;
///
/// let code = HostCode::new().with("return a + b;", |ctx| {
///     let a = ctx.label("a").and_then(|a| a.as_str()).unwrap_or_default();
///     let b = ctx.label("b").and_then(|b| b.as_str()).unwrap_or_default();
///     Ok(json!(format!("{}{}", a, b)))
/// });
///
/// let parser = Compiler::new(CompileOptions::new())
///     .with_code(code)
///     .compile("start = a:'a' b:'b' { return a + b; }")
///     .unwrap()
///     .parser;
///
/// assert_eq!(parser.parse("ab").unwrap(), json!("ab"));
/// ```
#[derive(Clone, Default)]
pub struct HostCode {
    handlers: HashMap<String, HostFn>,
}

impl HostCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the function to run in place of a code block
    pub fn register(
        &mut self,
        code: &str,
        handler: impl Fn(&ActionContext) -> Result<Value, String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.handlers.insert(code.trim().to_string(), Arc::new(handler));
        self
    }

    pub fn with(
        mut self,
        code: &str,
        handler: impl Fn(&ActionContext) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.register(code, handler);
        self
    }
}

impl CodeResolver for HostCode {
    fn resolve(&self, code: &Code, labels: &[&str]) -> Result<HostFn, String> {
        match self.handlers.get(code.text.trim()) {
            Some(handler) => Ok(Arc::clone(handler)),
            None => inline(&code.text, labels),
        }
    }
}

/// Bind code written in one of the inline forms (see [`HostCode`])
pub fn inline(code: &str, labels: &[&str]) -> Result<HostFn, String> {
    let body = code.trim().trim_end_matches(';').trim_end();

    if body.is_empty() {
        return Ok(host(|_| Ok(Value::Null)));
    }

    let returned = match body.strip_prefix("return") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => return Err("only 'return' statements can be used without a registered handler".to_string()),
    };

    if returned.is_empty() {
        return Ok(host(|_| Ok(Value::Null)));
    }

    match returned {
        "text()" => return Ok(host(|ctx| Ok(Value::String(ctx.text().to_string())))),
        "location()" => {
            return Ok(host(|ctx| {
                serde_json::to_value(ctx.location()).map_err(|err| err.to_string())
            }))
        }
        _ => {}
    }

    if let Some(key) = returned.strip_prefix("options.") {
        if is_identifier(key) {
            let key = key.to_string();
            return Ok(host(move |ctx| Ok(ctx.options().get(&key).cloned().unwrap_or(Value::Null))));
        }
    }

    if let Ok(constant) = serde_json::from_str::<Value>(returned) {
        return Ok(host(move |_| Ok(constant.clone())));
    }

    if is_identifier(returned) {
        if !labels.contains(&returned) {
            return Err(format!("label \"{}\" is not visible here", returned));
        }

        let label = returned.to_string();
        return Ok(host(move |ctx| Ok(ctx.label(&label).cloned().unwrap_or(Value::Null))));
    }

    Err("unsupported expression, register a handler for this code".to_string())
}

fn host(handler: impl Fn(&ActionContext) -> Result<Value, String> + Send + Sync + 'static) -> HostFn {
    Arc::new(handler)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// What user code sees when it runs
pub struct ActionContext<'a> {
    pub(crate) labels: Vec<(&'a str, Value)>,
    pub(crate) lines: &'a LineIndex<'a>,
    pub(crate) range: Range<usize>,
    pub(crate) options: &'a Map<String, Value>,
}

impl<'a> ActionContext<'a> {
    /// Get the value bound to a label
    pub fn label(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .find(|(label, _)| *label == name)
            .map(|(_, value)| value)
    }

    /// Iterate over the labels visible to the code
    pub fn labels(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(|(label, value)| (*label, value))
    }

    /// Input matched by the expression the code is attached to
    ///
    /// Always empty for semantic predicates.
    pub fn text(&self) -> &'a str {
        &self.lines.source()[self.range.clone()]
    }

    /// Byte range of the matched input
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Location of the matched input
    pub fn location(&self) -> Span {
        self.lines.span(self.range.start, self.range.end)
    }

    /// Whole input being parsed
    pub fn input(&self) -> &'a str {
        self.lines.source()
    }

    /// User options provided when parsing
    pub fn options(&self) -> &Map<String, Value> {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context<'a>(
        labels: Vec<(&'a str, Value)>,
        lines: &'a LineIndex<'a>,
        options: &'a Map<String, Value>,
    ) -> ActionContext<'a> {
        ActionContext {
            labels,
            range: 0..lines.source().len(),
            lines,
            options,
        }
    }

    fn run(code: &str, labels: &[&str], ctx: &ActionContext) -> Result<Value, String> {
        let handler = inline(code, labels)?;
        handler(ctx)
    }

    #[test]
    fn binds_inline_forms() {
        let mut options = Map::new();
        options.insert("mode".to_string(), json!("strict"));

        let lines = LineIndex::new("ab\nc");
        let ctx = context(vec![("value", json!(12))], &lines, &options);

        assert_eq!(run("", &[], &ctx), Ok(Value::Null));
        assert_eq!(run("  return;  ", &[], &ctx), Ok(Value::Null));
        assert_eq!(run("return 42;", &[], &ctx), Ok(json!(42)));
        assert_eq!(run(" return [1, \"two\", null] ", &[], &ctx), Ok(json!([1, "two", null])));
        assert_eq!(run("return value;", &["value"], &ctx), Ok(json!(12)));
        assert_eq!(run("return text();", &[], &ctx), Ok(json!("ab\nc")));
        assert_eq!(run("return options.mode;", &[], &ctx), Ok(json!("strict")));
        assert_eq!(run("return options.missing;", &[], &ctx), Ok(Value::Null));
        assert_eq!(
            run("return location();", &[], &ctx),
            Ok(json!({
                "start": { "offset": 0, "line": 1, "column": 1 },
                "end": { "offset": 4, "line": 2, "column": 2 },
            }))
        );
    }

    #[test]
    fn rejects_unknown_code() {
        assert!(inline("return value;", &["other"]).is_err());
        assert!(inline("return a + b;", &["a", "b"]).is_err());
        assert!(inline("console.log('hi')", &[]).is_err());
        assert!(inline("returned", &[]).is_err());
    }

    #[test]
    fn registered_handlers_take_precedence() {
        let code = HostCode::new().with("return 1;", |_| Ok(json!("registered")));
        let options = Map::new();
        let lines = LineIndex::new("");
        let ctx = context(vec![], &lines, &options);

        let block = Code {
            text: "  return 1;\n".to_string(),
            location: Span::default(),
        };

        let handler = code.resolve(&block, &[]).unwrap();
        assert_eq!(handler(&ctx), Ok(json!("registered")));
    }
}
