//! Error rendering for stderr.
//!
//! Rendered errors look like:
//!
//! ```text
//! error: no OAuth2 authentication files found (checked: ...) [FST-A001]
//!
//! How to fix:
//!   1. mkdir -p ~/shopping-samples/content
//!
//! Why this happened:
//!   ...
//! ```

use colored::Colorize;

use crate::error::{FeedstatError, FixSuggestion};

const WRAP_WIDTH: usize = 72;

/// Render `error` with its fix suggestions. Colour only when `color` is set.
#[must_use]
pub fn render_error(error: &FeedstatError, color: bool) -> String {
    let suggestions = error.fix_suggestions();
    let mut out = Vec::new();

    out.push(render_header(error, color));

    let commands = render_commands(&suggestions, color);
    if !commands.is_empty() {
        out.push(String::new());
        out.push(heading("How to fix:", color));
        out.extend(commands);
    }

    if let Some(first) = suggestions.first() {
        if !first.context.is_empty() {
            out.push(String::new());
            out.push(heading("Why this happened:", color));
            out.extend(wrap_text(&first.context, WRAP_WIDTH).into_iter().map(indent));
        }
        if let Some(prevention) = &first.prevention {
            out.push(String::new());
            out.push(heading("Prevention:", color));
            out.extend(wrap_text(prevention, WRAP_WIDTH).into_iter().map(indent));
        }
        if let Some(url) = &first.doc_url {
            out.push(String::new());
            out.push(format!("Docs: {url}"));
        }
    }

    out.join("\n")
}

fn render_header(error: &FeedstatError, color: bool) -> String {
    let code = format!("[{}]", error.error_code());
    if color {
        format!("{} {error} {}", "error:".red().bold(), code.dimmed())
    } else {
        format!("error: {error} {code}")
    }
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn indent(line: String) -> String {
    format!("  {line}")
}

fn render_commands(suggestions: &[FixSuggestion], color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut number = 0;
    for suggestion in suggestions {
        for (j, command) in suggestion.commands.iter().enumerate() {
            let command = if color {
                command.cyan().to_string()
            } else {
                command.clone()
            };
            if j == 0 {
                number += 1;
                lines.push(format!("  {number}. {command}"));
            } else {
                lines.push(format!("     Or: {command}"));
            }
        }
    }
    lines
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
