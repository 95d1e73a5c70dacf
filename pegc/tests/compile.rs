use pegc::compiler::{compile, CompileOptions, Compiler, GrammarError, GrammarWarning, SyntaxErrorContent};
use rstest::rstest;
use serde_json::json;

fn compile_err(grammar: &str) -> GrammarError {
    match compile(grammar, &CompileOptions::new()) {
        Ok(_) => panic!("grammar should not compile: {}", grammar),
        Err(err) => err,
    }
}

#[test]
fn missing_rules_are_reported() {
    match compile_err("start = 'a' missing") {
        GrammarError::UndefinedRule { name, location } => {
            assert_eq!(name, "missing");
            assert_eq!(location.start.offset, 12);
        }
        err => panic!("unexpected error: {:?}", err),
    }
}

#[rstest]
#[case("start = start", "start->start")]
#[case("start = stop\nstop = start", "start->stop->start")]
#[case("start = 'a' / list\nlist = item*\nitem = start ','", "start->list->item->start")]
fn left_recursion_is_reported(#[case] grammar: &str, #[case] expected: &str) {
    match compile_err(grammar) {
        GrammarError::LeftRecursion { path, .. } => assert_eq!(path.join("->"), expected),
        err => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn repeating_possibly_empty_expressions_is_rejected() {
    assert!(matches!(
        compile_err("start = ('')*"),
        GrammarError::InfiniteRepetition { .. }
    ));

    assert!(compile("start = ('a')*", &CompileOptions::new()).is_ok());
}

#[test]
fn the_first_error_stops_the_compilation() {
    // Both undefined and left-recursive, the missing rule check runs first
    assert!(matches!(
        compile_err("start = start missing"),
        GrammarError::UndefinedRule { .. }
    ));
}

#[test]
fn duplicates_are_reported() {
    assert!(matches!(
        compile_err("start = 'a'\nstart = 'b'"),
        GrammarError::DuplicateRule { .. }
    ));

    assert!(matches!(
        compile_err("start = a:'a' a:'b'"),
        GrammarError::DuplicateLabel { .. }
    ));
}

#[test]
fn syntax_errors_carry_their_location() {
    match compile_err("start = 'a'\nother = ('b' 'c'") {
        GrammarError::Syntax { content, location } => {
            assert!(matches!(content, SyntaxErrorContent::UnclosedGroup { started_at } if started_at.line == 2));
            assert_eq!(location.start.line, 2);
        }
        err => panic!("unexpected error: {:?}", err),
    }

    assert!(matches!(compile_err("// nothing here"), GrammarError::EmptyGrammar));
}

#[test]
fn unknown_start_rules_are_rejected() {
    let options = CompileOptions::new().with_start_rules(["b"]);

    assert_eq!(
        compile("a = 'a'", &options).err(),
        Some(GrammarError::UnknownStartRule { name: "b".to_string() })
    );
}

#[test]
fn unused_rules_are_warnings() {
    let compilation = Compiler::new(CompileOptions::new())
        .compile("start = 'a'\nlost = 'b'")
        .unwrap();

    match compilation.warnings.as_slice() {
        [GrammarWarning::UnusedRule { name, location }] => {
            assert_eq!(name, "lost");
            assert_eq!(location.start.line, 2);
        }
        warnings => panic!("unexpected warnings: {:?}", warnings),
    }

    assert_eq!(compilation.parser.parse("a").unwrap(), json!("a"));
}

#[test]
fn proxy_rules_are_inlined_without_changing_results() {
    let with_proxy = compile(
        "start = proxy '!'\nproxy = word\nword = $[a-z]+",
        &CompileOptions::new(),
    )
    .unwrap();

    let without_proxy = compile("start = word '!'\nword = $[a-z]+", &CompileOptions::new()).unwrap();

    let names: Vec<_> = with_proxy.program().rules.iter().map(|rule| rule.name.as_str()).collect();
    assert_eq!(names, ["start", "word"]);

    for input in ["abc!", "abc", "!", "ab1!", ""] {
        assert_eq!(with_proxy.parse(input), without_proxy.parse(input), "{:?}", input);
    }
}

#[test]
fn proxies_allowed_as_start_rules_are_kept() {
    let parser = compile(
        "start = proxy '!'\nproxy = word\nword = $[a-z]+",
        &CompileOptions::new().with_start_rules(["start", "proxy"]),
    )
    .unwrap();

    assert_eq!(parser.start_rules(), ["start", "proxy"]);

    let options = pegc::runtime::ParseOptions::new().with_start_rule("proxy");
    assert_eq!(parser.parse_with("abc", &options).unwrap(), json!("abc"));
}

#[test]
fn compiled_grammars_can_be_printed_back() {
    let (grammar, _) = Compiler::new(CompileOptions::new())
        .check("start = x:('a' / 'b')+ { return x; }\nnum \"number\" = [0-9]+")
        .unwrap();

    assert_eq!(
        grammar.to_string(),
        "start = x:(\"a\" / \"b\")+ { return x; }\nnum \"number\" = [0-9]+"
    );
}
