use super::errors::GrammarError;

/// Format in a human-readable way a compilation error
pub fn pretty_format_grammar_err(input: &str, err: &GrammarError) -> String {
    let location = match err.location() {
        Some(location) => location,
        None => return format!("ERROR: {}", err),
    };

    let line = location.start.line;
    let col = location.start.column - 1;

    let padding = " ".repeat(col + line.to_string().len() + 3);
    let tip = err.tip().map(|tip| format!("\n{}Tip: {}", padding, tip));

    // Only underline the part of the error on its first line
    let underline = if location.end.line == location.start.line {
        location.end.column.saturating_sub(location.start.column)
    } else {
        1
    };

    format!(
        "ERROR: At line {}, column {}:\n\n{} | {}\n{}{}{}{}",
        line,
        col + 1,
        line,
        input.lines().nth(line - 1).unwrap_or(""),
        padding,
        "^".repeat(underline.max(1)),
        format!("{}", err)
            .lines()
            .map(|line| format!("\n{}{}", padding, line))
            .collect::<String>(),
        tip.unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile, CompileOptions};

    #[test]
    fn underlines_the_offending_reference() {
        let grammar = "start = 'a' missing";
        let err = compile(grammar, &CompileOptions::new()).err().unwrap();

        let formatted = pretty_format_grammar_err(grammar, &err);
        let lines: Vec<_> = formatted.lines().collect();

        assert_eq!(lines[0], "ERROR: At line 1, column 13:");
        assert_eq!(lines[2], "1 | start = 'a' missing");
        assert_eq!(lines[3], format!("{}^^^^^^^", " ".repeat(16)));
        assert!(lines[4].trim_start().starts_with("rule \"missing\" is not defined"));
    }

    #[test]
    fn formats_errors_without_location() {
        let err = compile("a = 'a'", &CompileOptions::new().with_start_rules(["b"]))
            .err()
            .unwrap();

        assert_eq!(
            pretty_format_grammar_err("a = 'a'", &err),
            "ERROR: start rule \"b\" is not defined"
        );
    }
}
