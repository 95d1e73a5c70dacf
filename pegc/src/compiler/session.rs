use super::{CompileOptions, GrammarError, GrammarWarning};
use crate::ast::Grammar;

/// State of a single compilation, handed to every pass
#[derive(Debug)]
pub struct Session {
    options: CompileOptions,
    start_rules: Vec<String>,
    warnings: Vec<GrammarWarning>,
}

impl Session {
    /// Open a session for a freshly parsed grammar
    ///
    /// Resolves the allowed start rules, which must all be declared.
    pub fn new(grammar: &Grammar, options: &CompileOptions) -> Result<Self, GrammarError> {
        let mut start_rules: Vec<String> = vec![];

        if options.allowed_start_rules.is_empty() {
            start_rules.extend(grammar.rules.first().map(|rule| rule.name.clone()));
        } else {
            for name in &options.allowed_start_rules {
                if grammar.find_rule(name).is_none() {
                    return Err(GrammarError::UnknownStartRule { name: name.clone() });
                }

                if !start_rules.contains(name) {
                    start_rules.push(name.clone());
                }
            }
        }

        if start_rules.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }

        Ok(Self {
            options: options.clone(),
            start_rules,
            warnings: vec![],
        })
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Rules the parser may start from, the default one first
    pub fn start_rules(&self) -> &[String] {
        &self.start_rules
    }

    pub fn is_start_rule(&self, name: &str) -> bool {
        self.start_rules.iter().any(|rule| rule == name)
    }

    /// Report a non-fatal diagnostic
    pub fn warn(&mut self, warning: GrammarWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[GrammarWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<GrammarWarning> {
        self.warnings
    }
}
