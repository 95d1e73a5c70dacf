use serde::Deserialize;

/// Compilation options
///
/// Field names follow the camelCase convention so the options may be loaded from a JSON or TOML configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// Rules the generated parser may start from
    ///
    /// The first one is used when no start rule is given at parse time. When empty, only the grammar's first rule is allowed.
    pub allowed_start_rules: Vec<String>,

    /// Memoize rule results per position
    pub cache: bool,

    pub optimize: Optimize,

    /// Report rule enter/match/fail events to a [tracer](crate::runtime::Tracer)
    pub trace: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_start_rules<S: Into<String>>(mut self, rules: impl IntoIterator<Item = S>) -> Self {
        self.allowed_start_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_optimize(mut self, optimize: Optimize) -> Self {
        self.optimize = optimize;
        self
    }
}

/// Speed / size trade-off of the generated program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimize {
    /// Precompute lookup tables for character classes and case-folded literals
    #[default]
    Speed,

    /// Only store what the grammar declares
    Size,
}
