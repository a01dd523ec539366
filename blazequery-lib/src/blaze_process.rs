use crate::css::parser;
use crate::css::printer::OutputStyle;
use crate::error::Error;
use crate::responsive::{Report, ResponsiveExpander};
use rayon::prelude::*;

pub mod blaze_query {
    use super::*;

    /// CSS text produced by [`process`] along with what the expander did.
    #[derive(Debug)]
    pub struct Processed {
        pub css: String,
        pub report: Report,
    }

    /// Parse `css`, expand its `@responsive` blocks and print the result.
    ///
    /// A stylesheet without `@responsive` is returned byte for byte,
    /// whatever the output style.
    pub fn process(
        css: &str,
        expander: &ResponsiveExpander,
        style: OutputStyle,
    ) -> Result<Processed, Error> {
        let mut sheet = parser::parse(css)?;
        let report = expander.expand(&mut sheet)?;
        let css = if report.expanded {
            sheet.to_css(style)?
        } else {
            css.to_string()
        };
        Ok(Processed { css, report })
    }

    /// Process independent stylesheets in parallel. Results come back in
    /// input order.
    pub fn process_batch<S: AsRef<str> + Sync>(
        inputs: &[S],
        expander: &ResponsiveExpander,
        style: OutputStyle,
    ) -> Vec<Result<Processed, Error>> {
        inputs
            .par_iter()
            .map(|css| process(css.as_ref(), expander, style))
            .collect()
    }
}
