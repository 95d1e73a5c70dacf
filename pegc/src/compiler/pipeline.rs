use super::passes::*;
use super::{GrammarError, Session};
use crate::ast::Grammar;

/// A compiler pass
///
/// Passes run over the whole syntax tree, in their [stage](`Stage`)'s order.
/// Checks report errors, transformations rewrite the tree and allocations annotate it.
pub trait Pass {
    /// Unique name of the pass
    ///
    /// Adding a pass with an existing name replaces the existing one.
    fn name(&self) -> &str;

    fn run(&self, grammar: &mut Grammar, session: &mut Session) -> Result<(), GrammarError>;
}

/// Stages of the pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Check,
    Transform,
    Allocate,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Check, Stage::Transform, Stage::Allocate];
}

/// Ordered list of passes, grouped by stage
pub struct Pipeline {
    stages: Vec<(Stage, Vec<Box<dyn Pass>>)>,
    redefined: Vec<String>,
}

impl Pipeline {
    /// Create a pipeline without any pass
    pub fn empty() -> Self {
        Self {
            stages: Stage::ALL.iter().map(|stage| (*stage, vec![])).collect(),
            redefined: vec![],
        }
    }

    /// Add a pass at the end of a stage
    ///
    /// If a pass with the same name already exists (in any stage), it is replaced in place
    /// and a [`PassRedefined`](super::GrammarWarning::PassRedefined) warning will be emitted by every compilation.
    pub fn add(&mut self, stage: Stage, pass: impl Pass + 'static) -> &mut Self {
        let name = pass.name().to_string();

        let existing = self.stages.iter_mut().find_map(|(_, passes)| {
            passes
                .iter_mut()
                .find(|existing| existing.name() == name)
        });

        match existing {
            Some(existing) => {
                *existing = Box::new(pass);
                self.redefined.push(name);
            }

            None => {
                if let Some((_, passes)) = self.stages.iter_mut().find(|(s, _)| *s == stage) {
                    passes.push(Box::new(pass));
                }
            }
        }

        self
    }

    /// Remove a pass by its name
    pub fn remove(&mut self, name: &str) -> bool {
        for (_, passes) in &mut self.stages {
            if let Some(index) = passes.iter().position(|pass| pass.name() == name) {
                passes.remove(index);
                return true;
            }
        }

        false
    }

    /// Names of the passes, in execution order
    pub fn pass_names(&self) -> Vec<(Stage, &str)> {
        self.stages
            .iter()
            .flat_map(|(stage, passes)| passes.iter().map(move |pass| (*stage, pass.name())))
            .collect()
    }

    /// Names of the passes which were replaced by another one
    pub fn redefined(&self) -> &[String] {
        &self.redefined
    }

    /// Run every pass, stopping at the first error
    pub fn run(&self, grammar: &mut Grammar, session: &mut Session) -> Result<(), GrammarError> {
        for (stage, passes) in &self.stages {
            for pass in passes {
                log::debug!("running {:?} pass \"{}\"", stage, pass.name());
                pass.run(grammar, session)?;
            }
        }

        Ok(())
    }
}

impl Default for Pipeline {
    /// The standard pipeline
    fn default() -> Self {
        let mut pipeline = Self::empty();

        pipeline
            .add(Stage::Check, MissingRules)
            .add(Stage::Check, DuplicateRules)
            .add(Stage::Check, DuplicateLabels)
            .add(Stage::Check, LeftRecursion)
            .add(Stage::Check, InfiniteRepetition)
            .add(Stage::Check, UnusedRules)
            .add(Stage::Transform, RemoveProxyRules)
            .add(Stage::Transform, ReportFailures)
            .add(Stage::Allocate, AllocateSlots)
            .add(Stage::Allocate, ComputeParams);

        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOptions, Compiler, GrammarWarning};

    struct NoRuleNamedFoo;

    impl Pass for NoRuleNamedFoo {
        fn name(&self) -> &str {
            "no_foo"
        }

        fn run(&self, grammar: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
            match grammar.find_rule("foo") {
                Some(rule) => Err(GrammarError::Pass {
                    pass: self.name().to_string(),
                    message: "rules may not be named foo".to_string(),
                    location: Some(rule.name_location),
                }),
                None => Ok(()),
            }
        }
    }

    struct Silent;

    impl Pass for Silent {
        fn name(&self) -> &str {
            "unused_rules"
        }

        fn run(&self, _: &mut Grammar, _: &mut Session) -> Result<(), GrammarError> {
            Ok(())
        }
    }

    #[test]
    fn default_pipeline_runs_checks_first() {
        let pipeline = Pipeline::default();
        let names = pipeline.pass_names();

        assert_eq!(names.first(), Some(&(Stage::Check, "missing_rules")));
        assert_eq!(names.last(), Some(&(Stage::Allocate, "compute_params")));
        assert!(pipeline.redefined().is_empty());
    }

    #[test]
    fn custom_passes_run_and_may_fail() {
        let compiler = Compiler::new(CompileOptions::new()).with_pass(Stage::Check, NoRuleNamedFoo);

        assert!(compiler.compile("start = 'a'").is_ok());

        let err = compiler.compile("start = foo\nfoo = 'a'").err().unwrap();
        assert!(matches!(err, GrammarError::Pass { ref pass, .. } if pass == "no_foo"));
    }

    #[test]
    fn redefining_a_pass_replaces_it_with_a_warning() {
        let compiler = Compiler::new(CompileOptions::new()).with_pass(Stage::Check, Silent);

        let names = compiler.pipeline().pass_names();
        assert_eq!(names.iter().filter(|(_, name)| *name == "unused_rules").count(), 1);

        let compilation = compiler.compile("start = 'a'\nunused = 'b'").unwrap();

        assert_eq!(
            compilation.warnings,
            [GrammarWarning::PassRedefined {
                name: "unused_rules".to_string()
            }]
        );
    }
}
