//! Compilation database emitter.
//!
//! Emits one `{directory, command, file}` record per (project, source) pair
//! in the worklist, in worklist order. The array is rendered textually: the
//! fixed escape table below defines exactly how embedded values are
//! sanitised, so the emitter does not route through a JSON serialiser.

use itertools::Itertools;

use crate::context::GenerationContext;
use crate::ir::Worklist;

/// Render the compilation database for `worklist` as a string.
#[must_use]
pub fn generate(worklist: &Worklist, ctx: &GenerationContext) -> String {
    let separator = if cfg!(windows) { "\\" } else { "/" };
    let directory = escape(&format!("{}{separator}build", ctx.cwd));

    let entries: Vec<String> = worklist
        .projects
        .iter()
        .flat_map(|project| {
            let directory = directory.clone();
            project.sources.iter().map(move |source| {
                let flags = source
                    .compile_options
                    .as_deref()
                    .unwrap_or(&project.compile_options);
                format!(
                    "\t{{\n\t\t\"directory\": \"{directory}\",\n\t\t\"command\": \
                     \"clang++ {}\",\n\t\t\"file\": \"{}\"\n\t}}",
                    escape(flags),
                    escape(&format!("../{}", source.path)),
                )
            })
        })
        .collect();

    if entries.is_empty() {
        "[\n]\n".to_owned()
    } else {
        format!("[\n{}\n]\n", entries.iter().join(",\n"))
    }
}

/// Apply the fixed substitution table for control and quoting characters.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\x07' => escaped.push_str("\\a"),
            '\x08' => escaped.push_str("\\b"),
            '\x0c' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x0b' => escaped.push_str("\\v"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '?' => escaped.push_str("\\?"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
