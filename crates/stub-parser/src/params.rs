//! Method parameter list parsing.

use crate::error::{ParseError, Result};
use crate::events::{Param, ParamKind, ParamList};
use crate::line::is_identifier;

/// Parse the text between the parentheses of a `def` into parameter
/// descriptors. Defaults are kept as raw text; nesting and string literals
/// are respected when splitting on commas.
pub fn parse_params(text: &str, line: u32) -> Result<ParamList> {
    let mut params = ParamList::new();
    let text = text.trim();
    if text.is_empty() {
        return Ok(params);
    }
    for piece in split_top_level(text) {
        let piece = piece.trim();
        if piece.is_empty() {
            return Err(ParseError::MalformedParams {
                text: text.to_string(),
                line,
            });
        }
        params.push(classify(piece, text, line)?);
    }
    Ok(params)
}

fn classify(piece: &str, full: &str, line: u32) -> Result<Param> {
    let malformed = || ParseError::MalformedParams {
        text: full.to_string(),
        line,
    };

    if let Some(rest) = piece.strip_prefix('&') {
        let name = rest.trim();
        if !is_identifier(name) {
            return Err(malformed());
        }
        return Ok(Param {
            name: name.to_string(),
            kind: ParamKind::Block,
            default_text: None,
        });
    }
    if let Some(rest) = piece.strip_prefix("**") {
        return splat(rest.trim(), ParamKind::KeywordRest, malformed);
    }
    if let Some(rest) = piece.strip_prefix('*') {
        return splat(rest.trim(), ParamKind::Rest, malformed);
    }

    let end = piece
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(piece.len());
    let name = &piece[..end];
    if !is_identifier(name) {
        return Err(malformed());
    }
    let rest = piece[end..].trim_start();
    if rest.is_empty() {
        return Ok(Param {
            name: name.to_string(),
            kind: ParamKind::Required,
            default_text: None,
        });
    }
    if let Some(default) = rest.strip_prefix(':') {
        let default = default.trim();
        return Ok(Param {
            name: name.to_string(),
            kind: ParamKind::Keyword,
            default_text: (!default.is_empty()).then(|| default.to_string()),
        });
    }
    if let Some(default) = rest.strip_prefix('=') {
        let default = default.trim();
        if default.is_empty() {
            return Err(malformed());
        }
        return Ok(Param {
            name: name.to_string(),
            kind: ParamKind::Optional,
            default_text: Some(default.to_string()),
        });
    }
    Err(malformed())
}

fn splat(
    name: &str,
    kind: ParamKind,
    malformed: impl Fn() -> ParseError,
) -> Result<Param> {
    // a bare `*` / `**` splat is legal and stays nameless
    if !name.is_empty() && !is_identifier(name) {
        return Err(malformed());
    }
    Ok(Param {
        name: name.to_string(),
        kind,
        default_text: None,
    })
}

/// Split on commas at bracket depth zero, outside string literals.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_single || in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' | '[' | '{' if !in_single && !in_double => depth += 1,
            ')' | ']' | '}' if !in_single && !in_double => depth = depth.saturating_sub(1),
            ',' if depth == 0 && !in_single && !in_double => {
                pieces.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Find the index of the `)` matching the `(` that `s` starts with.
pub fn find_closing_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_single || in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '(' | '[' | '{' if !in_single && !in_double => depth += 1,
            ')' | ']' | '}' if !in_single && !in_double => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (ch == ')').then_some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<ParamKind> {
        parse_params(text, 1).unwrap().iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_empty_list() {
        assert!(parse_params("", 1).unwrap().is_empty());
        assert!(parse_params("  ", 1).unwrap().is_empty());
    }

    #[test]
    fn test_full_shape() {
        let params = parse_params("year, month = -1, *rest, locale: :en, **opts, &blk", 1).unwrap();
        assert_eq!(
            params.iter().map(|p| p.kind).collect::<Vec<_>>(),
            vec![
                ParamKind::Required,
                ParamKind::Optional,
                ParamKind::Rest,
                ParamKind::Keyword,
                ParamKind::KeywordRest,
                ParamKind::Block,
            ]
        );
        assert_eq!(params[1].default_text.as_deref(), Some("-1"));
        assert_eq!(params[3].default_text.as_deref(), Some(":en"));
        assert_eq!(params[5].name, "blk");
    }

    #[test]
    fn test_defaults_with_nested_commas() {
        let params = parse_params("fields = [1, 2], opts = {a: 1, b: 2}", 1).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].default_text.as_deref(), Some("[1, 2]"));
        assert_eq!(params[1].default_text.as_deref(), Some("{a: 1, b: 2}"));
    }

    #[test]
    fn test_default_with_constant_path() {
        let params = parse_params("sg = Date::ITALY", 1).unwrap();
        assert_eq!(params[0].kind, ParamKind::Optional);
        assert_eq!(params[0].default_text.as_deref(), Some("Date::ITALY"));
    }

    #[test]
    fn test_keyword_without_default() {
        assert_eq!(kinds("name:"), vec![ParamKind::Keyword]);
        assert!(parse_params("name:", 1).unwrap()[0].default_text.is_none());
    }

    #[test]
    fn test_anonymous_splats() {
        let params = parse_params("*, **", 1).unwrap();
        assert_eq!(params[0].kind, ParamKind::Rest);
        assert_eq!(params[1].kind, ParamKind::KeywordRest);
        assert!(params[0].name.is_empty());
    }

    #[test]
    fn test_malformed_pieces() {
        assert!(parse_params("a,,b", 1).is_err());
        assert!(parse_params("1bad", 1).is_err());
        assert!(parse_params("a =", 1).is_err());
    }

    #[test]
    fn test_find_closing_paren() {
        assert_eq!(find_closing_paren("(a, b)"), Some(5));
        assert_eq!(find_closing_paren("(a = [1, (2)], b) end"), Some(16));
        assert_eq!(find_closing_paren("(never closed"), None);
    }
}
