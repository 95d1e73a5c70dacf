use crate::ast::{ExprKind, Grammar, NodeMut, VisitorMut};
use crate::compiler::{GrammarError, Pass, Session};
use std::collections::HashMap;

/// Inline rules whose whole body is a reference to another rule (`a = b`)
///
/// References to a proxy are redirected to the rule it forwards to, and the proxy is removed
/// unless it is an allowed start rule.
pub struct RemoveProxyRules;

impl Pass for RemoveProxyRules {
    fn name(&self) -> &str {
        "remove_proxy_rules"
    }

    fn run(&self, grammar: &mut Grammar, session: &mut Session) -> Result<(), GrammarError> {
        let proxies: HashMap<String, String> = grammar
            .rules
            .iter()
            .filter_map(|rule| match &rule.expression.kind {
                ExprKind::RuleRef(target) if *target != rule.name => Some((rule.name.clone(), target.clone())),
                _ => None,
            })
            .collect();

        if proxies.is_empty() {
            return Ok(());
        }

        // Follow chains of proxies up to the rule doing the actual work
        let targets: HashMap<String, String> = proxies
            .keys()
            .map(|proxy| {
                let mut target = proxy;

                for _ in 0..proxies.len() {
                    match proxies.get(target) {
                        Some(next) => target = next,
                        None => break,
                    }
                }

                (proxy.clone(), target.clone())
            })
            .collect();

        log::debug!("inlining {} proxy rule(s)", targets.len());

        Redirect { targets: &targets }.visit_grammar(grammar);

        grammar
            .rules
            .retain(|rule| !proxies.contains_key(&rule.name) || session.is_start_rule(&rule.name));

        Ok(())
    }
}

struct Redirect<'a> {
    targets: &'a HashMap<String, String>,
}

impl VisitorMut for Redirect<'_> {
    type Output = ();

    fn visit_rule_ref(&mut self, _: NodeMut, name: &mut String) {
        if let Some(target) = self.targets.get(name.as_str()) {
            *name = target.clone();
        }
    }
}
