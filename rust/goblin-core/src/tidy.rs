//! Formatter round-trip behind `:tidy`.
//!
//! The buffer is assembled into the tidy skeleton, formatted as a whole
//! program, and split back into buffer lines. The formatted `main` lands in
//! the declarations block on the way back and has to be pulled out again.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::assemble::Skeleton;
use crate::partition::{partition, partition_source, Partition};
use crate::toolchain::{FormatError, SourceFormatter};

/// Outermost `func main()`, from its header to the last closing brace.
static MAIN_FUNC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)func main\(\) \{(?:\}|\n?(.*)\n\s*\})").expect("main func pattern is valid")
});

/// Format `lines` and return the tidied buffer.
///
/// The buffer is left to the caller; on error nothing has been changed.
pub fn tidy<S, F>(lines: &[S], formatter: &F) -> Result<Vec<String>, FormatError>
where
    S: AsRef<str>,
    F: SourceFormatter + ?Sized,
{
    let source = partition(lines).assemble(Skeleton::Tidy);
    let formatted = formatter.format(&source)?;

    let reparsed = partition_source(&formatted);
    let (declarations, statements) = extract_main_body(&reparsed.declarations);

    let mut sections = Vec::new();
    if let Some(clause) = import_clause(&reparsed) {
        sections.push(clause);
    }
    let declarations = declarations.trim();
    if !declarations.is_empty() {
        sections.push(declarations.to_string());
    }
    if !statements.is_empty() {
        sections.push(statements);
    }

    let content = sections.join("\n\n");
    debug!(sections = sections.len(), "buffer tidied");
    if content.is_empty() {
        return Ok(Vec::new());
    }
    Ok(content.split('\n').map(str::to_string).collect())
}

/// Split the formatted `main` out of `declarations`.
///
/// Returns the remaining declarations and the body of `main` with one level
/// of indentation removed and blank edge lines trimmed.
pub fn extract_main_body(declarations: &str) -> (String, String) {
    let Some(caps) = MAIN_FUNC.captures(declarations) else {
        return (declarations.to_string(), String::new());
    };
    let Some(whole) = caps.get(0) else {
        return (declarations.to_string(), String::new());
    };

    let body = caps.get(1).map_or("", |m| m.as_str());
    let mut remaining = String::with_capacity(declarations.len());
    remaining.push_str(&declarations[..whole.start()]);
    remaining.push_str(&declarations[whole.end()..]);

    (remaining, dedent_body(body))
}

fn dedent_body(body: &str) -> String {
    let lines: Vec<&str> = body
        .split('\n')
        .map(|line| line.strip_prefix('\t').unwrap_or(line).trim_end())
        .collect();
    let start = lines.iter().position(|line| !line.is_empty());
    let end = lines.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

fn import_clause(parts: &Partition) -> Option<String> {
    let specs: Vec<&str> = parts.import_specs().collect();
    match specs.as_slice() {
        [] => None,
        [single] => Some(format!("import {single}")),
        many => {
            let body: Vec<String> = many.iter().map(|spec| format!("\t{spec}")).collect();
            Some(format!("import (\n{}\n)", body.join("\n")))
        }
    }
}
