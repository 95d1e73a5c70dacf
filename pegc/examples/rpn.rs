//! This file demonstrates how to make a simple Reverse Polish Notation (RPN) evaluator using Pegc
//!
//! Set `RUST_LOG=trace` to see the compiler's passes and every rule the parser enters.

use pegc::compiler::{pretty_format_grammar_err, CompileOptions, Compiler};
use pegc::generator::{ActionContext, HostCode};
use pegc::runtime::ParseOptions;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Instant;

static RPN_GRAMMAR: &str = r#"
// Grammar's entrypoint
main = _ value:expr _ { return value; }

expr = operation / operand

operation = left:operand _ right:operand _ op:operator { return apply(left, right, op); }

operand
  = number
  / "(" _ inner:expr _ ")" { return inner; }

number "number" = digits:$([0-9]+ ([.,] [0-9]+)?) { return number(digits); }

operator = [+\-*/]

_ "whitespace" = [ \t\r\n]*
"#;

static TEST_SUBJECT: &str = r"(3 (9.3 3 /) +) (5 (2 3 /) /) /";

fn main() {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_owned());
    let level = log::LevelFilter::from_str(&level).unwrap_or(log::LevelFilter::Info);

    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new().build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )
    .unwrap();

    let code = HostCode::new()
        .with("return number(digits);", |ctx| {
            let digits = label_str(ctx, "digits")?;

            digits
                .replace(',', ".")
                .parse::<f64>()
                .map(|number| json!(number))
                .map_err(|err| format!("invalid number {:?}: {}", digits, err))
        })
        .with("return apply(left, right, op);", |ctx| {
            let left = label_f64(ctx, "left")?;
            let right = label_f64(ctx, "right")?;

            Ok(json!(match label_str(ctx, "op")? {
                "+" => left + right,
                "-" => left - right,
                "*" => left * right,
                "/" => left / right,
                op => return Err(format!("unknown operator: {}", op)),
            }))
        });

    // Measure performances
    let now = Instant::now();

    // Compile the grammar
    let compilation = Compiler::new(CompileOptions::new().with_trace(level == log::LevelFilter::Trace))
        .with_code(code)
        .compile(RPN_GRAMMAR)
        .unwrap_or_else(|err| {
            eprintln!("{}", pretty_format_grammar_err(RPN_GRAMMAR, &err));
            panic!("Failed to compile RPN grammar");
        });

    for warning in &compilation.warnings {
        eprintln!("WARNING: {}", warning);
    }

    // Get elapsed time
    let elapsed = now.elapsed();

    // Display performance
    println!(
        "Grammar in: {}.{:#003} ms{}",
        elapsed.as_millis(),
        elapsed.subsec_micros(),
        if cfg!(debug_assertions) {
            " [WARNING: debug mode heavily impacts performances]"
        } else {
            ""
        }
    );

    // Measure performances
    let now = Instant::now();

    // Parse and evaluate the input
    let result = compilation
        .parser
        .parse_with(TEST_SUBJECT, &ParseOptions::new())
        .unwrap_or_else(|err| {
            if let pegc::runtime::ParseError::Syntax(err) = &err {
                eprintln!("{}", err.pretty_format(TEST_SUBJECT));
            }

            panic!("Failed to match RPN grammar against a RPN expression: {}", err);
        });

    // Get elapsed time
    let elapsed = now.elapsed();

    println!("Expression: {}", TEST_SUBJECT);

    // Display performance
    println!(
        "Parse time: {}.{:#003} ms{}",
        elapsed.as_millis(),
        elapsed.subsec_micros(),
        if cfg!(debug_assertions) {
            " [WARNING: debug mode heavily impacts performances]"
        } else {
            ""
        }
    );

    let result = result.as_f64().unwrap();
    println!("Result    : {}", result);

    // Ensure the result is correct
    assert!((result - 0.8133333333333332).abs() < 1e-12);
}

fn label_str<'a>(ctx: &'a ActionContext, label: &str) -> Result<&'a str, String> {
    ctx.label(label)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("label {} is not a string", label))
}

fn label_f64(ctx: &ActionContext, label: &str) -> Result<f64, String> {
    ctx.label(label)
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("label {} is not a number", label))
}
