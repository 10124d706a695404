//! Raw line helpers: comment splitting and token validation.

/// Split a source line into its code part and trailing comment text.
///
/// Quote-aware so a `#` inside a string literal does not start a comment.
/// One leading space of the comment is stripped (`# text` reads as `text`);
/// an empty comment (`#` alone) comes back as `Some("")` because it still
/// continues a documentation block.
pub fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_single || in_double => escaped = true,
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                let text = &line[idx + 1..];
                let text = text.strip_prefix(' ').unwrap_or(text);
                return (&line[..idx], Some(text.trim_end()));
            }
            _ => {}
        }
    }
    (line, None)
}

/// `true` for a plain Ruby identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `true` for a single constant segment: uppercase start, identifier tail.
pub fn is_constant_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `true` for a constant path such as `OpenSSL::PKey::RSA`.
pub fn is_constant_path(s: &str) -> bool {
    !s.is_empty() && s.split("::").all(is_constant_name)
}

/// Methods the stub corpus declares with operator names.
const OPERATOR_METHODS: &[&str] = &[
    "+", "-", "*", "/", "%", "**", "==", "!=", "<", "<=", ">", ">=", "<=>", "===", "=~", "!~",
    "<<", ">>", "[]", "[]=", "+@", "-@", "!", "~", "&", "|", "^",
];

/// `true` for a method name: an identifier with an optional `?`/`!`/`=`
/// suffix, or one of the operator names.
pub fn is_method_name(s: &str) -> bool {
    if OPERATOR_METHODS.contains(&s) {
        return true;
    }
    let base = s.strip_suffix(['?', '!', '=']).unwrap_or(s);
    is_identifier(base)
}

/// Consume the leading constant path of `s`, returning `(path, rest)`.
/// Returns an empty path when `s` does not start with one.
pub fn take_constant_path(s: &str) -> (&str, &str) {
    let b = s.as_bytes();
    let mut end = 0;
    let mut i = 0;
    loop {
        if i >= b.len() || !b[i].is_ascii_uppercase() {
            break;
        }
        i += 1;
        while i < b.len() && (b[i].is_ascii_alphanumeric() || b[i] == b'_') {
            i += 1;
        }
        end = i;
        if i + 1 < b.len() && b[i] == b':' && b[i + 1] == b':' {
            i += 2;
        } else {
            break;
        }
    }
    (&s[..end], &s[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comment_plain() {
        let (code, comment) = split_comment("def close() end # Closes the stream.");
        assert_eq!(code, "def close() end ");
        assert_eq!(comment, Some("Closes the stream."));
    }

    #[test]
    fn test_split_comment_inside_string() {
        let (code, comment) = split_comment("FORMAT = \"a # b\"");
        assert_eq!(code, "FORMAT = \"a # b\"");
        assert_eq!(comment, None);
    }

    #[test]
    fn test_split_comment_empty_marker() {
        let (code, comment) = split_comment("#");
        assert_eq!(code, "");
        assert_eq!(comment, Some(""));
    }

    #[test]
    fn test_split_comment_keeps_doc_indent() {
        let (_, comment) = split_comment("#    Date.new(2001, 2, 3)");
        assert_eq!(comment, Some("   Date.new(2001, 2, 3)"));
    }

    #[test]
    fn test_constant_path_checks() {
        assert!(is_constant_path("Date"));
        assert!(is_constant_path("OpenSSL::PKey::RSA"));
        assert!(!is_constant_path("openssl"));
        assert!(!is_constant_path("Date::"));
        assert!(!is_constant_path(""));
    }

    #[test]
    fn test_method_names() {
        for name in ["to_s", "empty?", "upcase!", "sec=", "<=>", "[]=", "+"] {
            assert!(is_method_name(name), "expected `{name}` to be accepted");
        }
        for name in ["", "9lives", "a?=", "foo bar", "::"] {
            assert!(!is_method_name(name), "expected `{name}` to be rejected");
        }
    }

    #[test]
    fn test_take_constant_path() {
        assert_eq!(take_constant_path("Exception; end"), ("Exception", "; end"));
        assert_eq!(take_constant_path("Date::Infinity rest"), ("Date::Infinity", " rest"));
        assert_eq!(take_constant_path("< Super"), ("", "< Super"));
    }
}
