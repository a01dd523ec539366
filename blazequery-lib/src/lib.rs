//! Expands `@responsive` blocks into per-breakpoint `@media` blocks.
//!
//! # Example
//!
//! ```
//! use blazequery_lib::blaze_process::blaze_query;
//! use blazequery_lib::{Breakpoints, Options, OutputStyle, ResponsiveExpander};
//!
//! let options = Options::with_breakpoints(
//!     Breakpoints::new()
//!         .with("m", "(max-width: 600px)")
//!         .with("d", "(min-width: 961px)"),
//! );
//! let expander = ResponsiveExpander::new(options).unwrap();
//! let out = blaze_query::process(
//!     "@responsive { .a { color: red; } }",
//!     &expander,
//!     OutputStyle::Compact,
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     out.css,
//!     "@media (max-width: 600px) { .a-m { color: red; } } \
//!      @media (min-width: 961px) { .a-d { color: red; } }"
//! );
//! ```

pub mod blaze_process;
pub mod config;
pub mod css;
pub mod error;
pub mod responsive;
pub mod tree;

pub use config::{Breakpoint, Breakpoints, Options};
pub use css::ast::Stylesheet;
pub use css::parser::parse;
pub use css::printer::OutputStyle;
pub use error::{ConfigError, Error, ParseError, SourceLocation, SyntaxError, Warning};
pub use responsive::{Report, ResponsiveExpander};
pub use tree::{CssTree, StyleRule};
