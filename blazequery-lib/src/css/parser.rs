use crate::css::ast::{AtRule, Comment, Declaration, Node, Rule, Stylesheet};
use crate::error::{ParseError, SourceLocation};
use cssparser::{
    ParseError as CssParseError, ParseErrorKind, Parser, ParserInput,
    SourceLocation as CssLocation, Token,
};

type ParseResult<'i, T> = Result<T, CssParseError<'i, ParseError>>;

/// What ended the tokens of a selector, at-rule prelude or declaration.
enum Terminator {
    Semicolon,
    Block,
    End,
}

/// Parse raw CSS text into an owned [`Stylesheet`].
///
/// Tokenizing is left to `cssparser`, so strings, escapes, `url(...)` and
/// comments follow CSS syntax rules. Selectors, at-rule params and
/// declaration values are kept as trimmed slices of the source text. As in
/// CSS, blocks still open at the end of input are closed implicitly.
pub fn parse(css: &str) -> Result<Stylesheet, ParseError> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let nodes = parse_nodes(&mut parser).map_err(|err| match err.kind {
        ParseErrorKind::Custom(err) => err,
        ParseErrorKind::Basic(kind) => ParseError::new(format!("{:?}", kind), location(err.location)),
    })?;
    Ok(Stylesheet { nodes })
}

/// cssparser lines start at 0, columns at 1.
fn location(loc: CssLocation) -> SourceLocation {
    SourceLocation::new(loc.line as usize + 1, loc.column as usize)
}

fn fail<'i, T>(
    parser: &Parser<'i, '_>,
    message: impl Into<String>,
    at: CssLocation,
) -> ParseResult<'i, T> {
    Err(parser.new_custom_error(ParseError::new(message, location(at))))
}

/// Sibling nodes up to the end of the input or of the enclosing block.
fn parse_nodes<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        let state = parser.state();
        let start = parser.current_source_location();
        let next = parser.next_including_whitespace_and_comments().cloned();
        let token = match next {
            Ok(token) => token,
            Err(_) => return Ok(nodes),
        };
        match token {
            Token::WhiteSpace(_) | Token::Semicolon => {}
            Token::Comment(text) => nodes.push(Node::Comment(Comment {
                text: text.trim().to_string(),
                source: location(start),
            })),
            Token::AtKeyword(name) => {
                let at_rule = parse_at_rule(parser, name.to_string(), start)?;
                nodes.push(Node::AtRule(at_rule));
            }
            Token::CloseCurlyBracket => return fail(parser, "Unexpected }", start),
            _ => {
                parser.reset(&state);
                nodes.push(parse_rule_or_declaration(parser, start)?);
            }
        }
    }
}

/// Consume tokens up to the next `;` or `{` at this nesting level and return
/// their source text. A `{` leaves the parser ready for `parse_nested_block`.
fn scan_prelude<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, (&'i str, Terminator)> {
    let start = parser.position();
    loop {
        let before = parser.position();
        let at = parser.current_source_location();
        let next = parser.next_including_whitespace_and_comments().cloned();
        let token = match next {
            Ok(token) => token,
            Err(_) => return Ok((parser.slice_from(start), Terminator::End)),
        };
        match token {
            Token::Semicolon => return Ok((parser.slice(start..before), Terminator::Semicolon)),
            Token::CurlyBracketBlock => return Ok((parser.slice(start..before), Terminator::Block)),
            Token::CloseCurlyBracket => return fail(parser, "Unexpected }", at),
            Token::BadString(_) => return fail(parser, "Unclosed string", at),
            Token::BadUrl(_) => return fail(parser, "Malformed url()", at),
            _ => {}
        }
    }
}

fn parse_at_rule<'i>(
    parser: &mut Parser<'i, '_>,
    name: String,
    start: CssLocation,
) -> ParseResult<'i, AtRule> {
    let (params, terminator) = scan_prelude(parser)?;
    let params = params.trim().to_string();
    let nodes = match terminator {
        Terminator::Block => Some(parser.parse_nested_block(|p| parse_nodes(p))?),
        Terminator::Semicolon | Terminator::End => None,
    };
    Ok(AtRule {
        name,
        params,
        nodes,
        source: location(start),
    })
}

fn parse_rule_or_declaration<'i>(
    parser: &mut Parser<'i, '_>,
    start: CssLocation,
) -> ParseResult<'i, Node> {
    let (prelude, terminator) = scan_prelude(parser)?;
    match terminator {
        Terminator::Block => {
            let nodes = parser.parse_nested_block(|p| parse_nodes(p))?;
            Ok(Node::Rule(Rule {
                selector: prelude.trim().to_string(),
                nodes,
                source: location(start),
            }))
        }
        Terminator::Semicolon | Terminator::End => parse_declaration(prelude, location(start))
            .map(Node::Declaration)
            .map_err(|err| parser.new_custom_error(err)),
    }
}

/// Split `prop: value [!important]` into a [`Declaration`].
fn parse_declaration(text: &str, start: SourceLocation) -> Result<Declaration, ParseError> {
    let (property, value) = match text.split_once(':') {
        Some(parts) => parts,
        None => {
            return Err(ParseError::new(
                format!("Unknown word \"{}\"", text.trim()),
                start,
            ))
        }
    };
    let property = property.trim();
    if property.is_empty() {
        return Err(ParseError::new("Declaration without property", start));
    }

    let mut value = value.trim();
    let mut important = false;
    if let Some(tail_start) = value.len().checked_sub("!important".len()) {
        if let Some(tail) = value.get(tail_start..) {
            if tail.eq_ignore_ascii_case("!important") {
                important = true;
                value = value[..tail_start].trim_end();
            }
        }
    }

    Ok(Declaration {
        property: property.to_string(),
        value: value.to_string(),
        important,
        source: start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_at_rule(sheet: &Stylesheet) -> &AtRule {
        match &sheet.nodes[0] {
            Node::AtRule(at_rule) => at_rule,
            other => panic!("expected at-rule, got {:?}", other),
        }
    }

    fn first_rule(sheet: &Stylesheet) -> &Rule {
        match &sheet.nodes[0] {
            Node::Rule(rule) => rule,
            other => panic!("expected rule, got {:?}", other),
        }
    }

    #[test]
    fn parses_responsive_block_with_params() {
        let sheet = parse("@responsive (.test) { .foo.test + .bar { color: blue; } }").unwrap();
        let at_rule = first_at_rule(&sheet);
        assert_eq!(at_rule.name, "responsive");
        assert_eq!(at_rule.params, "(.test)");

        let rules: Vec<&Rule> = at_rule.rules().collect();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".foo.test + .bar");
        let decls: Vec<&Declaration> = rules[0].declarations().collect();
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[0].value, "blue");
    }

    #[test]
    fn records_one_based_locations() {
        let sheet = parse("a {}\n  @media print {\n    .b { x: y }\n  }").unwrap();
        let media = match &sheet.nodes[1] {
            Node::AtRule(at_rule) => at_rule,
            other => panic!("expected at-rule, got {:?}", other),
        };
        assert_eq!(media.source, SourceLocation::new(2, 3));
        let rule = media.rules().next().unwrap();
        assert_eq!(rule.source, SourceLocation::new(3, 5));
    }

    #[test]
    fn strings_and_urls_hide_delimiters() {
        let sheet = parse(r#".a::after { content: "}{;"; background: url(a;b.png); }"#).unwrap();
        let values: Vec<&str> = first_rule(&sheet)
            .declarations()
            .map(|d| d.value.as_str())
            .collect();
        assert_eq!(values, vec![r#""}{;""#, "url(a;b.png)"]);
    }

    #[test]
    fn comment_opener_inside_unquoted_url_is_plain_text() {
        let sheet = parse(".a { background: url(/img/*.png); color: red }").unwrap();
        let decls: Vec<&Declaration> = first_rule(&sheet).declarations().collect();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "url(/img/*.png)");
        assert_eq!(decls[1].property, "color");
    }

    #[test]
    fn important_flag_is_split_off() {
        let sheet = parse(".a { color: red !IMPORTANT }").unwrap();
        let decl = first_rule(&sheet).declarations().next().unwrap();
        assert_eq!(decl.value, "red");
        assert!(decl.important);
    }

    #[test]
    fn statement_at_rules_and_comments() {
        let sheet = parse("@import \"a.css\";\n/* note */\n.a {}").unwrap();
        let import = first_at_rule(&sheet);
        assert_eq!(import.params, "\"a.css\"");
        assert!(import.nodes.is_none());
        assert_eq!(
            sheet.nodes[1],
            Node::Comment(Comment {
                text: "note".to_string(),
                source: SourceLocation::new(2, 1),
            })
        );
    }

    #[test]
    fn open_blocks_close_at_end_of_input() {
        let sheet = parse("@media print { .a { color: red;").unwrap();
        let media = first_at_rule(&sheet);
        let rule = media.rules().next().unwrap();
        assert_eq!(rule.selector, ".a");
        assert_eq!(rule.declarations().count(), 1);
    }

    #[test]
    fn reports_stray_closing_brace() {
        let err = parse(".a {} }").unwrap_err();
        assert_eq!(err.message, "Unexpected }");
        assert_eq!(err.location, SourceLocation::new(1, 7));
    }

    #[test]
    fn reports_string_broken_by_newline() {
        let err = parse(".a { content: \"x\n; }").unwrap_err();
        assert_eq!(err.message, "Unclosed string");
        assert_eq!(err.location, SourceLocation::new(1, 15));
    }

    #[test]
    fn rejects_declaration_without_colon() {
        let err = parse(".a { color red }").unwrap_err();
        assert_eq!(err.message, "Unknown word \"color red\"");
        assert_eq!(err.location, SourceLocation::new(1, 6));
    }
}
