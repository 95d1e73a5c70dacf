use pegc::generator::{ActionContext, HostCode};
use pegc_macro::pegc_grammar;
use serde_json::{json, Map, Value};

#[pegc_grammar(filename = "../examples/json.pegc", start = "json")]
mod json_grammar {}

/// Merge an optional first element with the following ones
fn head_and_tail(ctx: &ActionContext) -> Vec<Value> {
    let head = ctx.label("head").filter(|head| !head.is_null()).cloned();
    let tail = ctx.label("tail").and_then(Value::as_array).cloned().unwrap_or_default();

    head.into_iter().chain(tail).collect()
}

fn main() {
    let code = HostCode::new()
        .with("return list(head, tail);", |ctx| Ok(Value::Array(head_and_tail(ctx))))
        .with("return pair(key, value);", |ctx| {
            Ok(json!([ctx.label("key"), ctx.label("value")]))
        })
        .with("return object(head, tail);", |ctx| {
            let mut object = Map::new();

            for member in head_and_tail(ctx) {
                if let Value::Array(mut pair) = member {
                    let value = pair.pop().unwrap_or_default();

                    if let Some(Value::String(key)) = pair.pop() {
                        object.insert(key, value);
                    }
                }
            }

            Ok(Value::Object(object))
        })
        .with("return unescape(chars);", |ctx| {
            let raw = ctx.label("chars").and_then(Value::as_str).unwrap_or_default();

            serde_json::from_str(&format!("\"{}\"", raw)).map_err(|err| format!("invalid string: {}", err))
        })
        .with("return number();", |ctx| {
            ctx.text()
                .parse::<f64>()
                .map(|number| json!(number))
                .map_err(|err| format!("invalid number: {}", err))
        });

    let parser = json_grammar::compiler()
        .with_code(code)
        .compile(json_grammar::GRAMMAR)
        .unwrap()
        .parser;

    let value = parser
        .parse(r#"{ "name": "pegc", "tags": ["parser", "generator"], "stable": false, "version": 0.1 }"#)
        .unwrap();

    println!("{:#}", value);

    assert_eq!(
        value,
        json!({ "name": "pegc", "tags": ["parser", "generator"], "stable": false, "version": 0.1 })
    );

    let err = parser.parse(r#"{ "name": }"#).unwrap_err();
    println!("{}", err);
}
