use crate::error::ConfigError;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet as LightningStyleSheet};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Options accepted by the expander. Only `breakpoints` is read; anything
/// else in a config file is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub breakpoints: Option<Breakpoints>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Suffix appended to expanded selectors, e.g. "m" for `.a-m`.
    pub name: String,
    /// Media query params, e.g. "(max-width: 600px)".
    pub query: String,
}

/// Breakpoints in configuration order. Output `@media` blocks follow it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Breakpoints(Vec<Breakpoint>);

impl Options {
    pub fn with_breakpoints(breakpoints: Breakpoints) -> Self {
        Options {
            breakpoints: Some(breakpoints),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

impl Breakpoints {
    pub fn new() -> Self {
        Breakpoints(Vec::new())
    }

    /// Add a breakpoint at the end, or replace the query of an existing one
    /// in place.
    pub fn insert(&mut self, name: impl Into<String>, query: impl Into<String>) {
        let name = name.into();
        let query = query.into();
        match self.0.iter_mut().find(|bp| bp.name == name) {
            Some(existing) => existing.query = query,
            None => self.0.push(Breakpoint { name, query }),
        }
    }

    pub fn with(mut self, name: impl Into<String>, query: impl Into<String>) -> Self {
        self.insert(name, query);
        self
    }

    /// Parse a `name=query` pair as given on the command line.
    pub fn parse_pair(pair: &str) -> Result<(String, String), ConfigError> {
        match pair.split_once('=') {
            Some((name, query)) if !name.trim().is_empty() && !query.trim().is_empty() => {
                Ok((name.trim().to_string(), query.trim().to_string()))
            }
            _ => Err(ConfigError::Parse(format!(
                "expected NAME=QUERY, got \"{}\"",
                pair
            ))),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of breakpoints whose query LightningCSS cannot read as the
    /// prelude of an `@media` rule.
    pub fn unparseable_queries(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|bp| !is_media_query(&bp.query))
            .map(|bp| bp.name.as_str())
            .collect()
    }
}

fn is_media_query(query: &str) -> bool {
    let source = format!("@media {} {{}}", query);
    let is_media = match LightningStyleSheet::parse(&source, ParserOptions::default()) {
        Ok(sheet) => matches!(sheet.rules.0.first(), Some(CssRule::Media(_))),
        Err(_) => false,
    };
    is_media
}

impl<'a> IntoIterator for &'a Breakpoints {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<N: Into<String>, Q: Into<String>> FromIterator<(N, Q)> for Breakpoints {
    fn from_iter<I: IntoIterator<Item = (N, Q)>>(iter: I) -> Self {
        let mut breakpoints = Breakpoints::new();
        for (name, query) in iter {
            breakpoints.insert(name, query);
        }
        breakpoints
    }
}

// Deserialized by hand so the map keeps the key order of the source document.
impl<'de> Deserialize<'de> for Breakpoints {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BreakpointsVisitor;

        impl<'de> Visitor<'de> for BreakpointsVisitor {
            type Value = Breakpoints;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of breakpoint names to media queries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Breakpoints, A::Error> {
                let mut breakpoints = Breakpoints::new();
                while let Some((name, query)) = map.next_entry::<String, String>()? {
                    breakpoints.insert(name, query);
                }
                Ok(breakpoints)
            }
        }

        deserializer.deserialize_map(BreakpointsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn names(breakpoints: &Breakpoints) -> Vec<&str> {
        breakpoints.iter().map(|bp| bp.name.as_str()).collect()
    }

    #[test]
    fn keeps_document_order() {
        let options = Options::from_json(
            r#"{ "breakpoints": { "z": "(min-width: 1px)", "a": "(min-width: 2px)", "m": "(min-width: 3px)" } }"#,
        )
        .unwrap();
        let breakpoints = options.breakpoints.unwrap();
        assert_eq!(names(&breakpoints), vec!["z", "a", "m"]);
    }

    #[test]
    fn repeated_key_keeps_first_position() {
        let options =
            Options::from_json(r#"{ "breakpoints": { "m": "(a)", "d": "(b)", "m": "(c)" } }"#)
                .unwrap();
        let breakpoints = options.breakpoints.unwrap();
        assert_eq!(names(&breakpoints), vec!["m", "d"]);
        assert_eq!(breakpoints.iter().next().unwrap().query, "(c)");
    }

    #[test]
    fn absent_or_null_breakpoints_are_none() {
        assert_eq!(Options::from_json("{}").unwrap().breakpoints, None);
        assert_eq!(Options::from_json(r#"{ "invalid": true }"#).unwrap().breakpoints, None);
        assert_eq!(Options::from_json(r#"{ "breakpoints": null }"#).unwrap().breakpoints, None);
    }

    #[test]
    fn non_string_query_is_a_parse_error() {
        let err = Options::from_json(r#"{ "breakpoints": { "m": 600 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn parses_cli_pairs() {
        assert_eq!(
            Breakpoints::parse_pair("t=(max-width: 960px) and (min-width: 600px)").unwrap(),
            (
                "t".to_string(),
                "(max-width: 960px) and (min-width: 600px)".to_string()
            )
        );
        assert!(Breakpoints::parse_pair("nope").is_err());
        assert!(Breakpoints::parse_pair("=(a)").is_err());
    }

    #[test]
    fn well_formed_queries_pass_the_check() {
        let breakpoints = Breakpoints::new()
            .with("m", "(max-width: 600px)")
            .with("t", "(max-width: 960px) and (min-width: 600px)")
            .with("p", "print");
        assert!(breakpoints.unparseable_queries().is_empty());
    }

    #[test]
    fn garbage_queries_are_reported_by_name() {
        let breakpoints = Breakpoints::new()
            .with("m", "(max-width: 600px)")
            .with("x", "max-width: 600px");
        assert_eq!(breakpoints.unparseable_queries(), vec!["x"]);
    }

    #[test]
    fn loads_from_file() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("blazequery_config_{}.json", nanos));
        fs::write(&path, r#"{ "breakpoints": { "d": "(min-width: 961px)" } }"#).unwrap();
        let options = Options::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(
            options.breakpoints,
            Some(Breakpoints::new().with("d", "(min-width: 961px)"))
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Options::load(Path::new("/nonexistent/blazequery.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
