//! Compile-time checked grammars
//!
//! ```ignore
//! use pegc_macro::pegc_grammar;
//!
//! #[pegc_grammar(filename = "grammars/list.pegc", start = "list, item", cache = true)]
//! pub mod list {}
//!
//! let parser = list::compile().unwrap();
//! ```
//!
//! The grammar file's path starts from the crate's `src` directory. The grammar is parsed and goes through all the
//! compiler's checks when the crate is built, so syntax errors, undefined rules or left recursion fail the build.
//! Code blocks are only bound at run time, when calling `compile()` (inline forms) or `compiler()` (to register host code).

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]

use lazy_static::lazy_static;
use pegc::compiler::{pretty_format_grammar_err, CompileOptions, Compiler};
use proc_macro::TokenStream;
use quote::quote;
use regex::Regex;
use std::env;
use std::fs;
use std::path::PathBuf;
use syn::{Ident, ItemMod, Visibility};

lazy_static! {
    static ref ATTR_CONTENT: Regex = Regex::new(
        "^filename\\s*=\\s*\"(?P<filename>[^\"]+)\"(?:\\s*,\\s*start\\s*=\\s*\"(?P<start>[^\"]*)\")?(?:\\s*,\\s*cache\\s*=\\s*(?P<cache>true|false))?\\s*$"
    ).unwrap();
}

/// Options decoded from the attribute
struct Options {
    /// Input file (grammar)
    grammar_file: PathBuf,

    /// Allowed start rules
    start_rules: Vec<String>,

    cache: bool,
}

#[proc_macro_attribute]
pub fn pegc_grammar(attr: TokenStream, item: TokenStream) -> TokenStream {
    let (mod_ident, mod_vis) = parse_input_mod(item);

    let options = parse_options_attr(attr);

    if !options.grammar_file.exists() {
        panic!("Grammar file was not found at path (tip: path starts from your crate's \"src\" directory)");
    }

    let grammar_src = fs::read_to_string(&options.grammar_file)
        .unwrap_or_else(|err| panic!("Provided file could not be read: {}", err));

    check_grammar(&grammar_src, &options);

    let grammar_path = options.grammar_file.to_string_lossy().to_string();
    let start_rules = &options.start_rules;
    let cache = options.cache;

    let expanded = quote! {
        #mod_vis mod #mod_ident {
            /// Source of the grammar
            pub const GRAMMAR: &str = include_str!(#grammar_path);

            /// Rules the parser may start from, the default one first
            pub const START_RULES: &[&str] = &[#(#start_rules),*];

            pub fn options() -> ::pegc::compiler::CompileOptions {
                ::pegc::compiler::CompileOptions::new()
                    .with_start_rules(START_RULES.iter().copied())
                    .with_cache(#cache)
            }

            /// Get a compiler for the grammar, to register host code before compiling it
            pub fn compiler() -> ::pegc::compiler::Compiler {
                ::pegc::compiler::Compiler::new(options())
            }

            /// Compile the grammar, with code blocks written in the inline forms
            pub fn compile() -> ::std::result::Result<::pegc::runtime::Parser, ::pegc::compiler::GrammarError> {
                ::pegc::compiler::compile(GRAMMAR, &options())
            }
        }
    };

    TokenStream::from(expanded)
}

fn parse_input_mod(item: TokenStream) -> (Ident, Visibility) {
    let item = syn::parse::<ItemMod>(item).unwrap_or_else(|_| {
        panic!("This macro must be used on a module which will be filled with the grammar's data")
    });

    let mod_ident = item.ident;

    let mod_content = item.content.unwrap_or_else(|| {
        panic!(
            "This macro must be used on an inline, empty module (e.g. 'mod {} {{}}')",
            mod_ident
        )
    });

    if !mod_content.1.is_empty() {
        panic!(
            "This macro must be used on an inline, empty module (e.g. 'mod {} {{}}')",
            mod_ident
        )
    }

    (mod_ident, item.vis)
}

fn parse_options_attr(attr: TokenStream) -> Options {
    let attr = attr.to_string();

    let captured = ATTR_CONTENT.captures(&attr).unwrap_or_else(|| {
        panic!("Please provide a grammar file path under the form: #[pegc_grammar(filename = \"<path>\")] ('start = \"rule1, rule2\"' and 'cache = true' may be added after it)")
    });

    let mut grammar_file = PathBuf::from(
        env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| panic!("CARGO_MANIFEST_DIR is not set")),
    );
    grammar_file.push("src");
    grammar_file.push(&captured["filename"]);

    Options {
        grammar_file,
        start_rules: captured
            .name("start")
            .map(|start| {
                start
                    .as_str()
                    .split(',')
                    .map(str::trim)
                    .filter(|rule| !rule.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        cache: captured.name("cache").map_or(false, |cache| cache.as_str() == "true"),
    }
}

/// Run every check of the compiler on the grammar, failing the build on error
fn check_grammar(grammar_src: &str, options: &Options) {
    let compile_options = CompileOptions::new()
        .with_start_rules(options.start_rules.iter().cloned())
        .with_cache(options.cache);

    let (_, session) = Compiler::new(compile_options)
        .check(grammar_src)
        .unwrap_or_else(|err| {
            panic!(
                "Failed to compile grammar: {}",
                pretty_format_grammar_err(grammar_src, &err)
            )
        });

    // Proc macros can't emit warnings on stable, so they are only logged
    for warning in session.warnings() {
        eprintln!("warning: {}", warning);
    }
}
