//! Tokenizer for the C subset found in the public header.
//!
//! Only what prototypes need survives: identifiers, `*`, parentheses,
//! commas, semicolons and block comments. Preprocessor lines and `//`
//! comments are dropped; string and character literals collapse into a
//! single opaque token so their contents can never split a statement.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Star,
    LParen,
    RParen,
    Comma,
    Semi,
    /// Text between `/*` and `*/`.
    Comment(String),
    /// Literals, numbers and punctuation the grammar has no use for.
    Other(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
    /// 1-based line of the first character.
    pub line: usize,
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;
    let mut line_start = true;

    while i < bytes.len() {
        let b = bytes[i];

        if b == b'\n' {
            line += 1;
            line_start = true;
            i += 1;
            continue;
        }
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // Preprocessor directive, with backslash continuations
        if b == b'#' && line_start {
            while i < bytes.len() && bytes[i] != b'\n' {
                if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\n') {
                    line += 1;
                    i += 1;
                }
                i += 1;
            }
            continue;
        }
        line_start = false;

        let start = i;
        let start_line = line;

        if src[i..].starts_with("/*") {
            let close = src[i + 2..].find("*/").map(|p| i + 2 + p);
            let (text_end, end) = match close {
                Some(c) => (c, c + 2),
                None => (bytes.len(), bytes.len()),
            };
            let text = &src[i + 2..text_end];
            line += text.matches('\n').count();
            tokens.push(Token {
                kind: TokenKind::Comment(text.to_string()),
                start,
                end,
                line: start_line,
            });
            i = end;
            continue;
        }

        if src[i..].starts_with("//") {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        if b == b'"' || b == b'\'' {
            i += 1;
            while i < bytes.len() && bytes[i] != b {
                match bytes[i] {
                    b'\\' => i += 1,
                    b'\n' => line += 1,
                    _ => {}
                }
                i += 1;
            }
            i = (i + 1).min(bytes.len());
            tokens.push(Token {
                kind: TokenKind::Other(b as char),
                start,
                end: i,
                line: start_line,
            });
            continue;
        }

        if b.is_ascii_alphanumeric() || b == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &src[start..i];
            let kind = if b.is_ascii_digit() {
                TokenKind::Other('0')
            } else {
                TokenKind::Ident(word.to_string())
            };
            tokens.push(Token {
                kind,
                start,
                end: i,
                line: start_line,
            });
            continue;
        }

        let ch = src[i..].chars().next().unwrap_or('\u{fffd}');
        i += ch.len_utf8().max(1);
        let kind = match ch {
            '*' => TokenKind::Star,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semi,
            other => TokenKind::Other(other),
        };
        tokens.push(Token {
            kind,
            start,
            end: i,
            line: start_line,
        });
    }

    tokens
}

/// Split a token stream into statements, dropping the separators.
/// Besides `;`, braces end a statement so `extern "C" {` and its closing
/// `}` never run into a prototype. A trailing statement without `;` is kept.
pub fn statements(tokens: &[Token]) -> Vec<&[Token]> {
    tokens
        .split(|t| {
            matches!(
                t.kind,
                TokenKind::Semi | TokenKind::Other('{') | TokenKind::Other('}')
            )
        })
        .filter(|s| !s.is_empty())
        .collect()
}
