//! Tokenizer for guard/effect expressions

use crate::error::{ParseError, ParseErrorCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    Int(i64),
    Str(String),
    /// `${name}` (scalar) or `@{name}` (variadic)
    Placeholder { variadic: bool, name: String },
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Assign,
    PlusAssign,
    MinusAssign,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let kind = match c {
            b'(' => single(&mut pos, TokenKind::LParen),
            b')' => single(&mut pos, TokenKind::RParen),
            b'[' => single(&mut pos, TokenKind::LBracket),
            b']' => single(&mut pos, TokenKind::RBracket),
            b',' => single(&mut pos, TokenKind::Comma),
            b'.' => single(&mut pos, TokenKind::Dot),
            b'*' => single(&mut pos, TokenKind::Star),
            b'/' => single(&mut pos, TokenKind::Slash),
            b'%' => single(&mut pos, TokenKind::Percent),
            b'+' => paired(bytes, &mut pos, TokenKind::PlusAssign, TokenKind::Plus),
            b'-' => paired(bytes, &mut pos, TokenKind::MinusAssign, TokenKind::Minus),
            b'=' => paired(bytes, &mut pos, TokenKind::Eq, TokenKind::Assign),
            b'<' => paired(bytes, &mut pos, TokenKind::Le, TokenKind::Lt),
            b'>' => paired(bytes, &mut pos, TokenKind::Ge, TokenKind::Gt),
            b'!' if bytes.get(pos + 1) == Some(&b'=') => {
                pos += 2;
                TokenKind::Ne
            }
            b'$' | b'@' if bytes.get(pos + 1) == Some(&b'{') => {
                let name_start = pos + 2;
                let Some(len) = source[name_start..].find('}') else {
                    return Err(ParseError::new(
                        ParseErrorCode::Unterminated,
                        "placeholder is missing its closing '}'",
                        start,
                    ));
                };
                pos = name_start + len + 1;
                TokenKind::Placeholder {
                    variadic: c == b'@',
                    name: source[name_start..name_start + len].trim().to_string(),
                }
            }
            b'\'' | b'"' => {
                let body_start = pos + 1;
                let Some(len) = source[body_start..].find(c as char) else {
                    return Err(ParseError::new(
                        ParseErrorCode::Unterminated,
                        "string literal is missing its closing quote",
                        start,
                    ));
                };
                pos = body_start + len + 1;
                TokenKind::Str(source[body_start..body_start + len].to_string())
            }
            b'0'..=b'9' => {
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                let digits = &source[start..pos];
                let value = digits.parse::<i64>().map_err(|_| {
                    ParseError::new(
                        ParseErrorCode::IntegerOverflow,
                        format!("integer literal {digits} is out of range"),
                        start,
                    )
                })?;
                TokenKind::Int(value)
            }
            c if c == b'_' || c.is_ascii_alphabetic() => {
                while pos < bytes.len() && (bytes[pos] == b'_' || bytes[pos].is_ascii_alphanumeric())
                {
                    pos += 1;
                }
                TokenKind::Ident(source[start..pos].to_string())
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(ParseError::new(
                    ParseErrorCode::UnexpectedCharacter,
                    format!("unexpected character '{ch}'"),
                    start,
                ));
            }
        };

        tokens.push(Token { kind, offset: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: bytes.len(),
    });
    Ok(tokens)
}

fn single(pos: &mut usize, kind: TokenKind) -> TokenKind {
    *pos += 1;
    kind
}

/// Two-character operator ending in `=`, or its one-character form
fn paired(bytes: &[u8], pos: &mut usize, with_eq: TokenKind, alone: TokenKind) -> TokenKind {
    if bytes.get(*pos + 1) == Some(&b'=') {
        *pos += 2;
        with_eq
    } else {
        *pos += 1;
        alone
    }
}

/// Whether `text` lexes as a single identifier
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn operators_and_placeholders() {
        assert_eq!(
            kinds("${item} in basket.items"),
            vec![
                TokenKind::Placeholder {
                    variadic: false,
                    name: "item".into()
                },
                TokenKind::Ident("in".into()),
                TokenKind::Ident("basket".into()),
                TokenKind::Dot,
                TokenKind::Ident("items".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("a.n += 1"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Dot,
                TokenKind::Ident("n".into()),
                TokenKind::PlusAssign,
                TokenKind::Int(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(
            kinds("<= >= != == < >"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Ne,
                TokenKind::Eq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_with_either_quote() {
        assert_eq!(
            kinds(r#"'a b' "c""#),
            vec![
                TokenKind::Str("a b".into()),
                TokenKind::Str("c".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_is_reported() {
        let err = tokenize("'oops").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::Unterminated);
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn unexpected_character_is_reported() {
        let err = tokenize("a ? b").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::UnexpectedCharacter);
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("apple_2"));
        assert!(!is_identifier("2apple"));
        assert!(!is_identifier("big apple"));
        assert!(!is_identifier(""));
    }
}
