//! Expansion of `@responsive` blocks into per-breakpoint `@media` blocks.
//!
//! ```text
//! @responsive (.test) { .foo.test + .bar { color: blue; } }
//! ```
//!
//! becomes, for breakpoints `m` and `d`,
//!
//! ```text
//! @media (max-width: 600px) { .foo.test-m + .bar { color: blue; } }
//! @media (min-width: 961px) { .foo.test-d + .bar { color: blue; } }
//! ```
//!
//! An existing top-level `@media` whose params equal a breakpoint's query
//! receives that breakpoint's rules instead of a new block being created.

use crate::config::{Breakpoint, Breakpoints, Options};
use crate::error::{ConfigError, SyntaxError, Warning, PLUGIN_NAME};
use crate::tree::{CssTree, NodeId, StyleRule};
use log::{debug, trace, warn};

const RESPONSIVE: &str = "responsive";
const MEDIA: &str = "media";

pub const UNMATCHED_SELECTOR: &str = "selector invalid under this responsive query's parameters";

/// Outcome of a successful [`ResponsiveExpander::expand`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// `false` when the stylesheet had no `@responsive` block and was left
    /// untouched.
    pub expanded: bool,
    pub removed_blocks: usize,
    /// Rule variants written into `@media` blocks, over all breakpoints.
    pub variants: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ResponsiveExpander {
    breakpoints: Breakpoints,
}

/// Where a breakpoint's variants end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// A new `@media` block appended once everything else is done.
    Created,
    /// An `@media` block already present in the stylesheet.
    Adopted(NodeId),
}

#[derive(Debug)]
struct Accumulator<'b, R> {
    breakpoint: &'b Breakpoint,
    target: Target,
    variants: Vec<R>,
}

/// Everything `expand` will do, computed without touching the tree.
#[derive(Debug)]
struct Plan<'b, R> {
    accumulators: Vec<Accumulator<'b, R>>,
    responsive: Vec<NodeId>,
    warnings: Vec<Warning>,
}

impl ResponsiveExpander {
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        let breakpoints = options
            .breakpoints
            .ok_or(ConfigError::MissingBreakpoints)?;

        if breakpoints.is_empty() {
            warn!("no breakpoints configured, @responsive blocks will be dropped without output");
        }
        for name in breakpoints.unparseable_queries() {
            warn!("breakpoint \"{}\" does not look like a media query", name);
        }

        Ok(ResponsiveExpander { breakpoints })
    }

    pub fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// Rewrite every top-level `@responsive` block of `tree`.
    ///
    /// On `Err` the tree is left exactly as it was.
    pub fn expand<T: CssTree>(&self, tree: &mut T) -> Result<Report, SyntaxError> {
        let responsive = tree.at_rule_ids(RESPONSIVE);
        if responsive.is_empty() {
            debug!("no @responsive at-rule found, nothing to expand");
            return Ok(Report::default());
        }

        let plan = self.plan(tree, responsive)?;
        Ok(plan.commit(tree))
    }

    fn resolve_accumulators<T: CssTree>(&self, tree: &T) -> Vec<Accumulator<'_, T::Rule>> {
        let mut accumulators: Vec<Accumulator<'_, T::Rule>> = self
            .breakpoints
            .iter()
            .map(|breakpoint| Accumulator {
                breakpoint,
                target: Target::Created,
                variants: Vec::new(),
            })
            .collect();

        for id in tree.at_rule_ids(MEDIA) {
            let params = tree.at_rule_params(id);
            let Some(accumulator) = accumulators
                .iter_mut()
                .find(|acc| acc.breakpoint.query == params)
            else {
                continue;
            };
            // First matching block wins; later duplicates stay untouched.
            if accumulator.target == Target::Created {
                debug!(
                    "reusing existing @media {} for breakpoint \"{}\"",
                    params, accumulator.breakpoint.name
                );
                accumulator.target = Target::Adopted(id);
            }
        }

        accumulators
    }

    fn plan<'b, T: CssTree>(
        &'b self,
        tree: &T,
        responsive: Vec<NodeId>,
    ) -> Result<Plan<'b, T::Rule>, SyntaxError> {
        let mut accumulators = self.resolve_accumulators(tree);
        let mut warnings = Vec::new();

        for &id in &responsive {
            let params = tree.at_rule_params(id).trim();
            let filters = parse_filters(params);

            if let Some(filters) = &filters {
                if filters.iter().any(|fragment| !fragment.starts_with('.')) {
                    return Err(SyntaxError::NonClassParameter {
                        params: params.to_string(),
                        location: tree.at_rule_source(id),
                    });
                }
            }

            let nested = tree.child_at_rule_count(id);
            if nested > 0 {
                warn!(
                    "{}: dropping {} at-rule(s) nested in @responsive",
                    tree.at_rule_source(id),
                    nested
                );
            }

            for rule in tree.child_rules(id) {
                let selector = rule.selector();
                if !selector.starts_with('.') {
                    return Err(SyntaxError::NonClassRule {
                        selector: selector.to_string(),
                        location: rule.source(),
                    });
                }

                let matching: Vec<&str> = match &filters {
                    Some(filters) => filters
                        .iter()
                        .copied()
                        .filter(|fragment| selector.contains(fragment))
                        .collect(),
                    None => Vec::new(),
                };
                if filters.is_some() && matching.is_empty() {
                    let warning = Warning {
                        plugin: PLUGIN_NAME,
                        message: UNMATCHED_SELECTOR.to_string(),
                        selector: selector.to_string(),
                        location: rule.source(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                    continue;
                }

                for accumulator in accumulators.iter_mut() {
                    let name = &accumulator.breakpoint.name;
                    let renamed = if filters.is_some() {
                        suffix_fragments(selector, &matching, name)
                    } else {
                        format!("{}-{}", selector, name)
                    };
                    trace!("{} -> {}", selector, renamed);
                    accumulator.variants.push(rule.with_selector(renamed));
                }
            }
        }

        Ok(Plan {
            accumulators,
            responsive,
            warnings,
        })
    }
}

impl<'b, R: StyleRule> Plan<'b, R> {
    fn commit<T: CssTree<Rule = R>>(self, tree: &mut T) -> Report {
        let mut report = Report {
            expanded: true,
            removed_blocks: self.responsive.len(),
            variants: 0,
            warnings: self.warnings,
        };

        // Adopted ids are only valid before anything is removed.
        let mut created = Vec::new();
        for accumulator in self.accumulators {
            report.variants += accumulator.variants.len();
            match accumulator.target {
                Target::Adopted(id) => {
                    for variant in accumulator.variants {
                        tree.append_rule(id, variant);
                    }
                }
                Target::Created => created.push(accumulator),
            }
        }

        debug!("removing {} @responsive block(s)", self.responsive.len());
        tree.remove(&self.responsive);

        for accumulator in created {
            debug!(
                "appending @media {} for breakpoint \"{}\"",
                accumulator.breakpoint.query, accumulator.breakpoint.name
            );
            tree.append_at_rule(MEDIA, &accumulator.breakpoint.query, accumulator.variants);
        }

        report
    }
}

/// `(.a, .b)` into `[".a", ".b"]`; empty params mean no filter.
fn parse_filters(params: &str) -> Option<Vec<&str>> {
    if params.is_empty() {
        return None;
    }
    let inner = params.strip_prefix('(').unwrap_or(params);
    let inner = inner.strip_suffix(')').unwrap_or(inner);
    Some(inner.split(',').map(str::trim).collect())
}

/// Append `-<breakpoint>` after every occurrence of any of `fragments`.
///
/// Single left-to-right pass: the longest fragment starting at a position
/// wins and scanning resumes after it, so suffixes are never re-matched.
fn suffix_fragments(selector: &str, fragments: &[&str], breakpoint: &str) -> String {
    let mut out = String::with_capacity(selector.len() + breakpoint.len() + 1);
    let mut rest = selector;
    while !rest.is_empty() {
        let longest = fragments
            .iter()
            .filter(|fragment| !fragment.is_empty() && rest.starts_with(**fragment))
            .max_by_key(|fragment| fragment.len());
        match longest {
            Some(fragment) => {
                out.push_str(fragment);
                out.push('-');
                out.push_str(breakpoint);
                rest = &rest[fragment.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(ch) = chars.next() {
                    out.push(ch);
                }
                rest = chars.as_str();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parser::parse;
    use pretty_assertions::assert_eq;

    fn expander() -> ResponsiveExpander {
        ResponsiveExpander::new(Options::with_breakpoints(
            Breakpoints::new()
                .with("m", "(max-width: 600px)")
                .with("d", "(min-width: 961px)"),
        ))
        .unwrap()
    }

    #[test]
    fn filters_strip_one_pair_of_parens() {
        assert_eq!(parse_filters(""), None);
        assert_eq!(parse_filters("(.a)"), Some(vec![".a"]));
        assert_eq!(parse_filters("( .a , .b )"), Some(vec![".a", ".b"]));
        assert_eq!(parse_filters(".a, .b"), Some(vec![".a", ".b"]));
        assert_eq!(parse_filters("()"), Some(vec![""]));
    }

    #[test]
    fn suffixes_every_occurrence() {
        assert_eq!(
            suffix_fragments(".foo.test + .bar .test", &[".test"], "m"),
            ".foo.test-m + .bar .test-m"
        );
    }

    #[test]
    fn substring_matches_are_suffixed_too() {
        assert_eq!(suffix_fragments(".testing", &[".test"], "m"), ".test-ming");
    }

    #[test]
    fn longest_fragment_wins_and_suffix_is_not_rematched() {
        assert_eq!(
            suffix_fragments(".ab .a", &[".a", ".ab"], "m"),
            ".ab-m .a-m"
        );
        assert_eq!(suffix_fragments(".a", &[".a", ".a-m"], "m"), ".a-m");
    }

    #[test]
    fn first_matching_media_block_is_adopted() {
        let sheet = parse(
            "@media (min-width: 961px) { .x {} } @media (min-width: 961px) { .y {} } @responsive { .a {} }",
        )
        .unwrap();
        let expander = expander();
        let accumulators = expander.resolve_accumulators(&sheet);
        assert_eq!(accumulators[0].target, Target::Created);
        assert_eq!(accumulators[1].target, Target::Adopted(0));
    }

    #[test]
    fn config_without_breakpoints_is_rejected() {
        let err = ResponsiveExpander::new(Options::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBreakpoints));
    }
}
