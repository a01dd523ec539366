//! Error, warning and location types shared across the crate.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Identifier attached to every diagnostic raised by the expander.
pub const PLUGIN_NAME: &str = "responsive-query";

/// 1-based position of the first character of a node in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Failure to build a usable set of options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Breakpoints must be specified in the plugin options")]
    MissingBreakpoints,
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// The stylesheet text could not be turned into a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError {
            message: message.into(),
            location,
        }
    }
}

/// Fatal problems found inside a `@responsive` block. Any of these aborts the
/// whole expansion before the stylesheet is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error(
        "{}: {location}: Non-class rule detected inside @responsive rule: \"{selector}\"",
        PLUGIN_NAME
    )]
    NonClassRule {
        selector: String,
        location: SourceLocation,
    },
    #[error(
        "{}: {location}: Non-class parameter detected in @responsive rule: \"{params}\"",
        PLUGIN_NAME
    )]
    NonClassParameter {
        params: String,
        location: SourceLocation,
    },
}

impl SyntaxError {
    pub fn plugin(&self) -> &'static str {
        PLUGIN_NAME
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            SyntaxError::NonClassRule { location, .. }
            | SyntaxError::NonClassParameter { location, .. } => *location,
        }
    }
}

/// A non-fatal diagnostic attached to the rule that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub plugin: &'static str,
    pub message: String,
    pub selector: String,
    pub location: SourceLocation,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {} (\"{}\")",
            self.plugin, self.location, self.message, self.selector
        )
    }
}

/// Everything that can go wrong between CSS text in and CSS text out.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("failed to minify output: {0}")]
    Minify(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_names_plugin_and_location() {
        let err = SyntaxError::NonClassRule {
            selector: "div".to_string(),
            location: SourceLocation::new(1, 15),
        };
        assert_eq!(err.plugin(), "responsive-query");
        assert_eq!(err.location(), SourceLocation::new(1, 15));
        assert_eq!(
            err.to_string(),
            "responsive-query: 1:15: Non-class rule detected inside @responsive rule: \"div\""
        );
    }

    #[test]
    fn parse_error_wraps_into_pipeline_error() {
        let err: Error = ParseError::new("Unexpected }", SourceLocation::new(2, 1)).into();
        assert_eq!(err.to_string(), "parse error at 2:1: Unexpected }");
    }
}
