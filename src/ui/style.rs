use console::style;
use std::fmt::Display;

/// Green bold: approvals, successful results
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold: cancellations, failures
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold: envelope field names, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: prompts, warnings
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Blue: model answers, labels
pub fn blue<D: Display>(text: D) -> String {
    style(text).blue().to_string()
}
