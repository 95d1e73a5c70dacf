use super::utils::{is_ident_continue, is_ident_start};
use crate::ast::{Expr, ExprKind, Grammar, Params, Rule};
use crate::compiler::{GrammarError, SyntaxErrorContent};
use crate::location::{SourceLocation, Span};

/// Parse a grammar's text into a [syntax tree](`Grammar`)
///
/// Only the syntax is checked here. The returned tree must go through the compiler's passes before it can be executed.
pub fn parse_grammar(input: &str) -> Result<Grammar, GrammarError> {
    let mut parser = GrammarParser::new(input);

    parser.skip_trivia()?;

    // Optional initializer, before the first rule
    let initializer = if parser.peek() == Some('{') {
        let code = parser.code_block()?;
        parser.skip_trivia()?;

        if parser.eat(';') {
            parser.skip_trivia()?;
        }

        Some(code)
    } else {
        None
    };

    // Collect rules until the end of the input
    let mut rules = vec![];

    while parser.peek().is_some() {
        rules.push(parser.rule()?);
        parser.skip_trivia()?;
    }

    if rules.is_empty() {
        return Err(GrammarError::EmptyGrammar);
    }

    Ok(Grammar {
        initializer,
        rules,
        location: Span::of(input, 0, input.len()),
    })
}

/// Cursor over a grammar's text
#[derive(Debug, Clone, Copy)]
pub(crate) struct GrammarParser<'a> {
    pub(super) input: &'a str,

    /// Current byte offset
    pub(super) pos: usize,
}

impl<'a> GrammarParser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Remaining input
    pub(super) fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(super) fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    pub(super) fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Span from a byte offset to the current position
    pub(super) fn span(&self, start: usize) -> Span {
        Span::of(self.input, start, self.pos)
    }

    pub(super) fn loc(&self, offset: usize) -> SourceLocation {
        SourceLocation::of(self.input, offset)
    }

    /// Build an error covering the next character (or nothing at the end of the input)
    pub(super) fn error_here(&self, content: SyntaxErrorContent) -> GrammarError {
        let end = self.pos + self.peek().map(char::len_utf8).unwrap_or(0);
        GrammarError::syntax(content, self.input, self.pos, end)
    }

    /// Parse a rule declaration (`name "display name"? = expression ;?`)
    fn rule(&mut self) -> Result<Rule, GrammarError> {
        let start = self.pos;

        // The line must begin with a rule's name...
        let name = match self.identifier() {
            Some(name) => name,
            None => {
                return Err(self.error_here(match self.peek() {
                    Some(c) if !c.is_alphanumeric() => SyntaxErrorContent::IllegalSymbol(c),
                    _ => SyntaxErrorContent::ExpectedRuleDeclaration,
                }))
            }
        };

        let name_location = self.span(start);

        self.skip_trivia()?;

        // ...optionally followed by a display name...
        let display_name = match self.peek() {
            Some('"') | Some('\'') => {
                let display_start = self.pos;
                let display_name = self.string_literal()?;
                let display_location = self.span(display_start);
                self.skip_trivia()?;
                Some((display_name, display_location))
            }
            _ => None,
        };

        // ...and by the assignment operator
        if !self.eat('=') {
            return Err(self.error_here(SyntaxErrorContent::ExpectedRuleAssignmentOp));
        }

        self.skip_trivia()?;

        let mut expression = self.expression()?;

        if let Some((name, location)) = display_name {
            let location = Span::new(location.start, expression.location.end);

            expression = Expr::new(
                ExprKind::Named {
                    name,
                    expression: Box::new(expression),
                },
                location,
            );
        }

        // Rules may be terminated by a semicolon
        let before_terminator = self.pos;
        self.skip_trivia()?;

        if !self.eat(';') {
            self.pos = before_terminator;
        }

        Ok(Rule::new(name, expression, name_location, self.span(start)))
    }

    /// Parse an expression (a choice, the loosest construct)
    pub(super) fn expression(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        let mut alternatives = vec![self.action()?];

        loop {
            let before_separator = self.pos;
            self.skip_trivia()?;

            if !self.eat('/') {
                self.pos = before_separator;
                break;
            }

            self.skip_trivia()?;
            alternatives.push(self.action()?);
        }

        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            Expr::new(ExprKind::Choice(alternatives), self.span(start))
        })
    }

    /// Parse a sequence, optionally followed by an action's code block
    fn action(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        let expression = self.sequence()?;

        let before_code = self.pos;
        self.skip_trivia()?;

        if self.peek() != Some('{') {
            self.pos = before_code;
            return Ok(expression);
        }

        let code = self.code_block()?;

        Ok(Expr::new(
            ExprKind::Action {
                expression: Box::new(expression),
                code,
                params: Params::new(),
            },
            self.span(start),
        ))
    }

    /// Parse whitespace-separated elements
    fn sequence(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        let mut elements = vec![self.labeled()?];

        loop {
            let before_element = self.pos;
            self.skip_trivia()?;

            if !self.at_element_start() {
                self.pos = before_element;
                break;
            }

            elements.push(self.labeled()?);
        }

        Ok(if elements.len() == 1 {
            elements.remove(0)
        } else {
            Expr::new(ExprKind::Sequence(elements), self.span(start))
        })
    }

    /// Check if the upcoming input is the beginning of another sequence element
    ///
    /// An identifier followed by `=` (or by a display name and `=`) begins the next rule instead.
    fn at_element_start(&self) -> bool {
        match self.peek() {
            Some('"') | Some('\'') | Some('[') | Some('.') | Some('(') | Some('$') | Some('&')
            | Some('!') => true,
            Some(c) if is_ident_start(c) => !self.at_rule_start(),
            _ => false,
        }
    }

    fn at_rule_start(&self) -> bool {
        let mut probe = *self;

        if probe.identifier().is_none() || probe.skip_trivia().is_err() {
            return false;
        }

        if matches!(probe.peek(), Some('"') | Some('\'')) {
            if probe.string_literal().is_err() || probe.skip_trivia().is_err() {
                return false;
            }
        }

        probe.peek() == Some('=')
    }

    /// Parse a possibly labeled expression (`label:expression`)
    fn labeled(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;

        if let Some(label) = self.identifier() {
            self.skip_trivia()?;

            if self.eat(':') {
                self.skip_trivia()?;
                let expression = self.prefixed()?;

                return Ok(Expr::new(
                    ExprKind::Labeled {
                        label,
                        expression: Box::new(expression),
                    },
                    self.span(start),
                ));
            }

            // Not a label, this was a rule reference
            self.pos = start;
        }

        self.prefixed()
    }

    /// Parse an expression with an optional prefix operator (`$`, `&`, `!`)
    fn prefixed(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;

        let kind = match self.peek() {
            Some('$') => {
                self.bump();
                self.skip_trivia()?;
                ExprKind::Text(Box::new(self.suffixed()?))
            }

            Some(op @ '&') | Some(op @ '!') => {
                self.bump();
                self.skip_trivia()?;

                // Semantic predicates are followed by a code block
                if self.peek() == Some('{') {
                    let code = self.code_block()?;
                    let params = Params::new();

                    if op == '&' {
                        ExprKind::SemanticAnd { code, params }
                    } else {
                        ExprKind::SemanticNot { code, params }
                    }
                } else {
                    let expression = Box::new(self.suffixed()?);

                    if op == '&' {
                        ExprKind::SimpleAnd(expression)
                    } else {
                        ExprKind::SimpleNot(expression)
                    }
                }
            }

            _ => return self.suffixed(),
        };

        Ok(Expr::new(kind, self.span(start)))
    }

    /// Parse an expression with an optional repetition operator (`?`, `*`, `+`)
    fn suffixed(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;
        let expression = self.primary()?;

        let before_operator = self.pos;
        self.skip_trivia()?;

        let wrap: fn(Box<Expr>) -> ExprKind = match self.peek() {
            Some('?') => ExprKind::Optional,
            Some('*') => ExprKind::ZeroOrMore,
            Some('+') => ExprKind::OneOrMore,
            _ => {
                self.pos = before_operator;
                return Ok(expression);
            }
        };

        self.bump();

        Ok(Expr::new(wrap(Box::new(expression)), self.span(start)))
    }

    /// Parse a primary expression: literal, class, wildcard, rule reference or parenthesized expression
    fn primary(&mut self) -> Result<Expr, GrammarError> {
        let start = self.pos;

        match self.peek() {
            Some('"') | Some('\'') => self.literal(),
            Some('[') => self.class(),

            Some('.') => {
                self.bump();
                Ok(Expr::new(ExprKind::Any, self.span(start)))
            }

            Some('(') => {
                self.bump();
                self.skip_trivia()?;

                let expression = self.expression()?;
                self.skip_trivia()?;

                if !self.eat(')') {
                    return Err(self.error_here(SyntaxErrorContent::UnclosedGroup {
                        started_at: self.loc(start),
                    }));
                }

                Ok(expression)
            }

            Some(c) if is_ident_start(c) => {
                let name = self.identifier().unwrap_or_default();
                Ok(Expr::new(ExprKind::RuleRef(name), self.span(start)))
            }

            _ => Err(self.error_here(SyntaxErrorContent::ExpectedExpression)),
        }
    }

    /// Try to parse an identifier
    pub(super) fn identifier(&mut self) -> Option<String> {
        let rest = self.rest();

        match rest.chars().next() {
            Some(c) if is_ident_start(c) => {}
            _ => return None,
        }

        let len = rest
            .char_indices()
            .find(|(_, c)| !is_ident_continue(*c))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        self.pos += len;

        Some(rest[..len].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ClassPart;

    fn single_rule(grammar: &str) -> Rule {
        let mut grammar = parse_grammar(grammar).unwrap();
        assert_eq!(grammar.rules.len(), 1);
        grammar.rules.remove(0)
    }

    #[test]
    fn parses_rules_with_display_names() {
        let grammar = parse_grammar("start \"the start\" = a\na = 'x'").unwrap();

        assert_eq!(grammar.rules.len(), 2);
        assert_eq!(grammar.rules[0].name, "start");
        assert_eq!(grammar.rules[0].display_name(), Some("the start"));
        assert_eq!(grammar.rules[1].display_name(), None);
    }

    #[test]
    fn respects_operator_precedence() {
        let rule = single_rule("start = a:'a' b? / !c $d* { return a }");

        let alternatives = match &rule.expression.kind {
            ExprKind::Choice(alternatives) => alternatives,
            other => panic!("expected a choice, got {:?}", other),
        };

        match &alternatives[0].kind {
            ExprKind::Sequence(elements) => {
                assert!(matches!(&elements[0].kind, ExprKind::Labeled { label, .. } if label == "a"));
                assert!(matches!(&elements[1].kind, ExprKind::Optional(_)));
            }
            other => panic!("expected a sequence, got {:?}", other),
        }

        match &alternatives[1].kind {
            ExprKind::Action {
                expression, code, ..
            } => {
                assert_eq!(code.text.trim(), "return a");

                match &expression.kind {
                    ExprKind::Sequence(elements) => {
                        assert!(matches!(&elements[0].kind, ExprKind::SimpleNot(_)));
                        assert!(
                            matches!(&elements[1].kind, ExprKind::Text(inner) if matches!(inner.kind, ExprKind::ZeroOrMore(_)))
                        );
                    }
                    other => panic!("expected a sequence, got {:?}", other),
                }
            }
            other => panic!("expected an action, got {:?}", other),
        }
    }

    #[test]
    fn rules_may_follow_each_other_without_separators() {
        let grammar = parse_grammar("a = b c\nb \"B\" = 'b' c = 'c'; d = .").unwrap();
        let names: Vec<_> = grammar.rules.iter().map(|rule| rule.name.as_str()).collect();

        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn parses_literals_and_classes() {
        let rule = single_rule(r#"start = "a\n\x41é"i [^a-z_\]]i"#);

        match &rule.expression.kind {
            ExprKind::Sequence(elements) => {
                assert_eq!(
                    elements[0].kind,
                    ExprKind::Literal {
                        value: "a\nAé".to_string(),
                        ignore_case: true
                    }
                );

                assert_eq!(
                    elements[1].kind,
                    ExprKind::Class {
                        parts: vec![
                            ClassPart::Range('a', 'z'),
                            ClassPart::Char('_'),
                            ClassPart::Char(']')
                        ],
                        inverted: true,
                        ignore_case: true,
                        raw: r"[^a-z_\]]i".to_string()
                    }
                );
            }
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn code_blocks_may_contain_braces() {
        let rule = single_rule("start = 'a' { if (x) { return \"}\" } }");

        match &rule.expression.kind {
            ExprKind::Action { code, .. } => assert_eq!(code.text, " if (x) { return \"}\" } "),
            other => panic!("expected an action, got {:?}", other),
        }
    }

    #[test]
    fn code_blocks_may_contain_comments() {
        let rule = single_rule("start = 'a' { // don't }\n return 1; /* it's { */ }");

        match &rule.expression.kind {
            ExprKind::Action { code, .. } => {
                assert_eq!(code.text, " // don't }\n return 1; /* it's { */ ")
            }
            other => panic!("expected an action, got {:?}", other),
        }

        assert!(matches!(
            parse_grammar("start = 'a' { /* unterminated }").unwrap_err(),
            GrammarError::Syntax {
                content: SyntaxErrorContent::UnterminatedCode { .. },
                ..
            }
        ));
    }

    #[test]
    fn skips_comments_and_reads_initializer() {
        let grammar = parse_grammar("{ init }\n// comment\nstart /* inline */ = 'a' // trailing").unwrap();

        assert_eq!(grammar.initializer.map(|code| code.text), Some(" init ".to_string()));
        assert_eq!(grammar.rules.len(), 1);
    }

    #[test]
    fn parses_semantic_predicates() {
        let rule = single_rule("start = &{ return true } !{ return false }");

        match &rule.expression.kind {
            ExprKind::Sequence(elements) => {
                assert!(matches!(elements[0].kind, ExprKind::SemanticAnd { .. }));
                assert!(matches!(elements[1].kind, ExprKind::SemanticNot { .. }));
            }
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn reports_syntax_errors_with_locations() {
        let err = parse_grammar("start = ('a'").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Syntax {
                content: SyntaxErrorContent::UnclosedGroup { .. },
                ..
            }
        ));

        let err = parse_grammar("start 'a'").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Syntax {
                content: SyntaxErrorContent::ExpectedRuleAssignmentOp,
                ..
            }
        ));

        let err = parse_grammar("start = [z-a]").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Syntax {
                content: SyntaxErrorContent::InvalidClassRange { from: 'z', to: 'a' },
                ..
            }
        ));

        let err = parse_grammar("\nstart = \"abc").unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.start.line, 2);

        assert_eq!(parse_grammar("  // nothing").unwrap_err(), GrammarError::EmptyGrammar);
    }
}
