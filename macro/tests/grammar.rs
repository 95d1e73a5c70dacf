use pegc_macro::pegc_grammar;
use serde_json::json;

#[pegc_grammar(filename = "../tests/list.pegc", start = "list, item", cache = true)]
mod list {}

#[pegc_grammar(filename = "../tests/list.pegc")]
pub mod default_list {}

#[test]
fn exposes_the_grammar_and_its_options() {
    assert!(list::GRAMMAR.starts_with("// Comma-separated"));
    assert_eq!(list::START_RULES, ["list", "item"]);

    let options = list::options();
    assert_eq!(options.allowed_start_rules, ["list", "item"]);
    assert!(options.cache);

    assert!(default_list::START_RULES.is_empty());
    assert!(!default_list::options().cache);
}

#[test]
fn compiles_the_checked_grammar() {
    let parser = list::compile().unwrap();

    assert_eq!(parser.parse("ab,cd").unwrap(), json!("ab,cd"));
    assert!(parser.parse("ab,").is_err());

    let options = pegc::runtime::ParseOptions::new().with_start_rule("item");
    assert_eq!(parser.parse_with("xyz", &options).unwrap(), json!("xyz"));
}

#[test]
fn host_code_can_be_registered() {
    let parser = default_list::compiler()
        .with_code(pegc::generator::HostCode::new().with("return text();", |ctx| Ok(json!(ctx.text().len()))))
        .compile(default_list::GRAMMAR)
        .unwrap()
        .parser;

    assert_eq!(parser.parse("ab,cd").unwrap(), json!(5));
}
