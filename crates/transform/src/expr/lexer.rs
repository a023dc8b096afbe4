//! Expression tokenizer

use crate::error::{EvalError, EvalResult};

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    String(String),
    Ident(String),
    True,
    False,
    In,
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    RegexMatch,
    RegexNotMatch,
    And,
    Or,
    Not,
}

impl Token {
    /// Source-like rendering for error messages
    pub(crate) fn describe(&self) -> String {
        let s = match self {
            Self::Number(n) => return n.to_string(),
            Self::String(s) => return format!("{s:?}"),
            Self::Ident(name) => return name.clone(),
            Self::True => "true",
            Self::False => "false",
            Self::In => "in",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::RegexMatch => "=~",
            Self::RegexNotMatch => "!~",
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
        };
        s.to_string()
    }
}

/// A token and the byte offset it starts at
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub position: usize,
}

/// Split an expression into tokens
pub(crate) fn tokenize(src: &str) -> EvalResult<Vec<Spanned>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let token = match c {
            b'0'..=b'9' => {
                let (n, end) = lex_number(src, pos)?;
                pos = end;
                Token::Number(n)
            }
            b'\'' | b'"' => {
                let (s, end) = lex_string(src, pos)?;
                pos = end;
                Token::String(s)
            }
            b'[' => {
                let close = src[pos + 1..]
                    .find(']')
                    .ok_or_else(|| EvalError::parse(pos, "unterminated '[' identifier"))?;
                let name = &src[pos + 1..pos + 1 + close];
                if name.is_empty() {
                    return Err(EvalError::parse(pos, "empty '[]' identifier"));
                }
                pos += close + 2;
                Token::Ident(name.to_string())
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while pos < bytes.len()
                    && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_')
                {
                    pos += 1;
                }
                match &src[start..pos] {
                    "true" => Token::True,
                    "false" => Token::False,
                    "in" | "IN" => Token::In,
                    ident => Token::Ident(ident.to_string()),
                }
            }
            _ => {
                let next = bytes.get(pos + 1).copied();
                let (token, len) = match (c, next) {
                    (b'=', Some(b'=')) => (Token::Eq, 2),
                    (b'=', Some(b'~')) => (Token::RegexMatch, 2),
                    (b'!', Some(b'=')) => (Token::Ne, 2),
                    (b'!', Some(b'~')) => (Token::RegexNotMatch, 2),
                    (b'<', Some(b'=')) => (Token::Le, 2),
                    (b'>', Some(b'=')) => (Token::Ge, 2),
                    (b'&', Some(b'&')) => (Token::And, 2),
                    (b'|', Some(b'|')) => (Token::Or, 2),
                    (b'!', _) => (Token::Not, 1),
                    (b'<', _) => (Token::Lt, 1),
                    (b'>', _) => (Token::Gt, 1),
                    (b'+', _) => (Token::Plus, 1),
                    (b'-', _) => (Token::Minus, 1),
                    (b'*', _) => (Token::Star, 1),
                    (b'/', _) => (Token::Slash, 1),
                    (b'%', _) => (Token::Percent, 1),
                    (b'(', _) => (Token::LParen, 1),
                    (b')', _) => (Token::RParen, 1),
                    (b',', _) => (Token::Comma, 1),
                    _ => {
                        let ch = src[pos..].chars().next().unwrap_or('?');
                        return Err(EvalError::parse(pos, format!("unexpected character '{ch}'")));
                    }
                };
                pos += len;
                token
            }
        };

        tokens.push(Spanned {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

fn lex_number(src: &str, start: usize) -> EvalResult<(f64, usize)> {
    let bytes = src.as_bytes();
    let mut pos = start;

    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let text = &src[start..pos];
    text.parse::<f64>()
        .map(|n| (n, pos))
        .map_err(|_| EvalError::parse(start, format!("invalid number '{text}'")))
}

fn lex_string(src: &str, start: usize) -> EvalResult<(String, usize)> {
    let mut chars = src[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(EvalError::parse(start, "unterminated string")),
    };

    let mut out = String::new();
    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped)) => out.push(escaped),
                None => break,
            },
            c if c == quote => return Ok((out, start + offset + c.len_utf8())),
            c => out.push(c),
        }
    }

    Err(EvalError::parse(start, "unterminated string"))
}
