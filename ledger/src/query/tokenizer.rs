//! Tokenizer for the filter query language.
//!
//! Converts a raw query string into typed tokens. Fail-open by design:
//! characters that match no rule are dropped so partial or malformed input
//! degrades to fewer constraints instead of an error.

use super::expr::FilterField;

/// A single token from a filter query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    And,
    Or,
    /// A `field:value` predicate. `is_empty` is set when the captured value
    /// was exactly the sentinel `-`.
    Filter {
        field: FilterField,
        value: String,
        is_empty: bool,
    },
    /// End of input. Always present, always last.
    Eof,
}

/// Tokenize a raw query string.
///
/// Whitespace between tokens is insignificant. The returned sequence always
/// ends with exactly one `Eof` so lookahead never runs off the end.
pub fn tokenize(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0usize;

    while cursor < raw.len() {
        let rest = &raw[cursor..];
        let ch = match rest.chars().next() {
            Some(ch) => ch,
            None => break,
        };

        if ch.is_whitespace() {
            cursor += ch.len_utf8();
            continue;
        }

        if ch == '(' {
            tokens.push(Token::LParen);
            cursor += 1;
            continue;
        }
        if ch == ')' {
            tokens.push(Token::RParen);
            cursor += 1;
            continue;
        }

        if let Some(len) = match_keyword(rest, "and") {
            tokens.push(Token::And);
            cursor += len;
            continue;
        }
        if let Some(len) = match_keyword(rest, "or") {
            tokens.push(Token::Or);
            cursor += len;
            continue;
        }

        if let Some((token, len)) = match_filter(rest) {
            tokens.push(token);
            cursor += len;
            continue;
        }

        // No rule matched: drop the character and keep going.
        cursor += ch.len_utf8();
    }

    tokens.push(Token::Eof);
    tokens
}

/// Match a boolean keyword, case-insensitively, at a word boundary.
///
/// The keyword must be immediately followed by whitespace or end of input,
/// so `android:x` or `organization:y` never reads as an operator prefix.
fn match_keyword(rest: &str, keyword: &str) -> Option<usize> {
    let candidate = rest.get(..keyword.len())?;
    if !candidate.eq_ignore_ascii_case(keyword) {
        return None;
    }
    match rest[keyword.len()..].chars().next() {
        None => Some(keyword.len()),
        Some(next) if next.is_whitespace() => Some(keyword.len()),
        Some(_) => None,
    }
}

/// Match a `field:value` filter at the start of `rest`.
///
/// The field must be one of the known names (case-insensitive); the value is
/// either double-quoted (with `""` escaping an embedded quote) or an
/// unquoted run ending at whitespace or a parenthesis.
fn match_filter(rest: &str) -> Option<(Token, usize)> {
    let field = FilterField::ALL.into_iter().find(|field| {
        let name = field.name();
        rest.get(..name.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(name))
            && rest[name.len()..].starts_with(':')
    })?;

    let value_start = field.name().len() + 1;
    let (value, value_len) = match_value(&rest[value_start..])?;
    let is_empty = value == "-";

    Some((
        Token::Filter {
            field,
            value,
            is_empty,
        },
        value_start + value_len,
    ))
}

/// Capture a filter value, returning it with the number of bytes consumed.
///
/// Control characters never survive capture; the wire encoding reserves one
/// to mark the empty sentinel, so typed input must not be able to carry it.
fn match_value(rest: &str) -> Option<(String, usize)> {
    if rest.starts_with('"') {
        let (value, len) = consume_quoted_value(rest);
        return Some((value, len));
    }

    let mut value = String::new();
    let mut end = 0usize;
    for ch in rest.chars() {
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            break;
        }
        if !ch.is_control() {
            value.push(ch);
        }
        end += ch.len_utf8();
    }

    if end == 0 || value.is_empty() {
        // `field:` with nothing attached is not a filter.
        return None;
    }
    Some((value, end))
}

/// Consume a double-quoted value starting at the opening quote.
///
/// `""` inside the quotes is an escaped literal quote. An unterminated quote
/// fails open: the rest of the input becomes the value.
fn consume_quoted_value(rest: &str) -> (String, usize) {
    let mut value = String::new();
    let mut chars = rest.char_indices().skip(1).peekable();

    while let Some((index, ch)) = chars.next() {
        if ch != '"' {
            if !ch.is_control() {
                value.push(ch);
            }
            continue;
        }
        if let Some((_, '"')) = chars.peek() {
            // Escaped quote
            value.push('"');
            chars.next();
            continue;
        }
        return (value, index + 1);
    }

    (value, rest.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(tokenize(""), vec![Token::Eof]);
        assert_eq!(tokenize("   \t "), vec![Token::Eof]);
    }

    #[test]
    fn test_parens_and_operators() {
        assert_eq!(
            tokenize("( ) and or"),
            vec![
                Token::LParen,
                Token::RParen,
                Token::And,
                Token::Or,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_simple_filter() {
        assert_eq!(
            tokenize("category:groceries"),
            vec![
                Token::Filter {
                    field: FilterField::Category,
                    value: "groceries".to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_field_name_case_insensitive() {
        assert_eq!(tokenize("CATEGORY:Food"), tokenize("category:Food"));
        assert_eq!(tokenize("Tag:trip AND Account:checking").len(), 4);
    }

    #[test]
    fn test_empty_sentinel() {
        assert_eq!(
            tokenize("tag:-"),
            vec![
                Token::Filter {
                    field: FilterField::Tag,
                    value: "-".to_string(),
                    is_empty: true,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_quoted_value_with_spaces() {
        assert_eq!(
            tokenize(r#"category:"Office Supplies""#),
            vec![
                Token::Filter {
                    field: FilterField::Category,
                    value: "Office Supplies".to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_quoted_value_escaped_quote() {
        assert_eq!(
            tokenize(r#"counterparty:"Joe""s Diner""#),
            vec![
                Token::Filter {
                    field: FilterField::Counterparty,
                    value: r#"Joe"s Diner"#.to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_quote_fails_open() {
        assert_eq!(
            tokenize(r#"category:"Office Sup"#),
            vec![
                Token::Filter {
                    field: FilterField::Category,
                    value: "Office Sup".to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        // "android:x" must not be read as `and` + junk
        let tokens = tokenize("android:x");
        assert!(!tokens.contains(&Token::And));
        // "organization" must not be read as `or` + junk
        let tokens = tokenize("organization");
        assert!(!tokens.contains(&Token::Or));
    }

    #[test]
    fn test_keyword_at_end_of_input() {
        assert_eq!(tokenize("and"), vec![Token::And, Token::Eof]);
        assert_eq!(tokenize("OR"), vec![Token::Or, Token::Eof]);
    }

    #[test]
    fn test_value_stops_at_paren() {
        assert_eq!(
            tokenize("(tag:travel or tag:work)"),
            vec![
                Token::LParen,
                Token::Filter {
                    field: FilterField::Tag,
                    value: "travel".to_string(),
                    is_empty: false,
                },
                Token::Or,
                Token::Filter {
                    field: FilterField::Tag,
                    value: "work".to_string(),
                    is_empty: false,
                },
                Token::RParen,
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_unrecognized_input_dropped() {
        assert_eq!(tokenize("?!* ;;"), vec![Token::Eof]);
        // Unknown field names fall through to the skip rule
        assert_eq!(tokenize("payee:someone"), vec![Token::Eof]);
    }

    #[test]
    fn test_control_characters_stripped_from_values() {
        // The wire encoding reserves a control character for the empty
        // sentinel; typed input must not be able to smuggle it through.
        assert_eq!(
            tokenize("tag:\"\u{1}empty\""),
            vec![
                Token::Filter {
                    field: FilterField::Tag,
                    value: "empty".to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
        assert_eq!(
            tokenize("tag:a\u{1}b"),
            vec![
                Token::Filter {
                    field: FilterField::Tag,
                    value: "ab".to_string(),
                    is_empty: false,
                },
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_bare_field_name_dropped() {
        // `tag:` with no value matches no rule
        assert_eq!(tokenize("tag: "), vec![Token::Eof]);
    }
}
