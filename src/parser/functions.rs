//! Function extractor: a small recursive-descent parser over tokens.
//!
//! Accepted grammar, one `;`-terminated statement at a time:
//!
//! ```text
//! declaration := comment* specifier* type-token+ NAME '(' params ')' comment*
//! type-token  := IDENT | '*'
//! params      := ( param ( ',' param )* )?        -- comments allowed anywhere
//! param       := type-token* IDENT?               -- last IDENT is the name
//! ```
//!
//! `NAME` must start with the profile's function prefix. Statements that do
//! not fit are not function declarations and are dropped silently.

use tracing::debug;

use crate::model::{FunctionSignature, Parameter};
use crate::parser::doc;
use crate::parser::lexer::{self, Token, TokenKind};
use crate::profile::Profile;

/// Extract every non-excluded function prototype in header order.
pub fn extract(header: &str, profile: &Profile) -> Vec<FunctionSignature> {
    let tokens = lexer::tokenize(header);
    let mut functions = Vec::new();

    for statement in lexer::statements(&tokens) {
        let Some(func) = parse_declaration(header, statement, profile) else {
            continue;
        };
        if profile.is_excluded(&func.name) {
            debug!("skipping internal function {}", func.name);
            continue;
        }
        functions.push(func);
    }

    functions
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn skip_comments(&mut self) {
        while matches!(self.peek(), Some(t) if matches!(t.kind, TokenKind::Comment(_))) {
            self.pos += 1;
        }
    }
}

fn parse_declaration(src: &str, statement: &[Token], profile: &Profile) -> Option<FunctionSignature> {
    let mut cur = Cursor {
        tokens: statement,
        pos: 0,
    };

    // Leading comments; the one closest to the declaration documents it.
    let mut raw_doc = None;
    while let Some(Token {
        kind: TokenKind::Comment(text),
        ..
    }) = cur.peek()
    {
        raw_doc = Some(text.clone());
        cur.pos += 1;
    }

    while let Some(Token {
        kind: TokenKind::Ident(word),
        ..
    }) = cur.peek()
    {
        if !profile.decl_specifiers.iter().any(|s| s == word) {
            break;
        }
        cur.pos += 1;
    }

    let mut head: Vec<&Token> = Vec::new();
    let lparen = loop {
        cur.skip_comments();
        let tok = cur.bump()?;
        match tok.kind {
            TokenKind::Ident(_) | TokenKind::Star => head.push(tok),
            TokenKind::LParen => break tok,
            _ => return None,
        }
    };

    let (name_tok, type_toks) = head.split_last()?;
    let TokenKind::Ident(name) = &name_tok.kind else {
        return None;
    };
    if type_toks.is_empty() || !name.starts_with(profile.function_prefix.as_str()) {
        return None;
    }

    let body_start = cur.pos;
    let mut depth = 0usize;
    let rparen = loop {
        let tok = cur.bump()?;
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen if depth == 0 => break tok,
            TokenKind::RParen => depth -= 1,
            _ => {}
        }
    };
    let body = &statement[body_start..cur.pos - 1];

    // Nothing but comments may follow the parameter list.
    cur.skip_comments();
    if cur.peek().is_some() {
        return None;
    }

    let parameters = parse_parameters(src, body);
    let doc = doc::parse(raw_doc.as_deref());

    Some(FunctionSignature {
        return_type: render_type(src, type_toks.iter().copied()),
        name: name.clone(),
        parameters,
        raw_doc_comment: raw_doc,
        raw_parameter_text: src[lparen.end..rparen.start].to_string(),
        doc,
    })
}

/// Split the tokens between the parentheses on top-level commas.
fn parse_parameters(src: &str, body: &[Token]) -> Vec<Parameter> {
    let comments: Vec<(usize, &Token)> = body
        .iter()
        .enumerate()
        .filter(|(_, t)| matches!(t.kind, TokenKind::Comment(_)))
        .collect();

    let mut segments: Vec<Vec<(usize, &Token)>> = vec![Vec::new()];
    let mut depth = 0usize;
    for (idx, tok) in body.iter().enumerate() {
        match tok.kind {
            TokenKind::Comment(_) => continue,
            TokenKind::Comma if depth == 0 => {
                segments.push(Vec::new());
                continue;
            }
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        if let Some(seg) = segments.last_mut() {
            seg.push((idx, tok));
        }
    }

    if segments.len() == 1 {
        let only = &segments[0];
        let is_void = only.len() == 1 && only[0].1.kind == TokenKind::Ident("void".to_string());
        if only.is_empty() || is_void {
            return Vec::new();
        }
    }

    segments
        .iter()
        .enumerate()
        .filter(|(_, seg)| !seg.is_empty())
        .map(|(n, seg)| {
            let (last_idx, last) = seg[seg.len() - 1];
            // A comment documents this parameter only until the next one starts.
            let limit = segments
                .get(n + 1)
                .and_then(|next| next.first())
                .map_or(usize::MAX, |(idx, _)| *idx);
            let (c_type, name) = match &last.kind {
                TokenKind::Ident(word) if seg.len() > 1 => (
                    render_type(src, seg[..seg.len() - 1].iter().map(|(_, t)| *t)),
                    word.clone(),
                ),
                _ => (render_type(src, seg.iter().map(|(_, t)| *t)), String::new()),
            };
            let doc = comments
                .iter()
                .find(|(idx, t)| *idx > last_idx && *idx < limit && t.line == last.line)
                .and_then(|(_, t)| match &t.kind {
                    TokenKind::Comment(text) => Some(text.trim().to_string()),
                    _ => None,
                });
            Parameter { c_type, name, doc }
        })
        .collect()
}

/// Canonical spelling of a type: words separated by spaces, `*` attached
/// to the word before it (`const char *` → `const char*`).
fn render_type<'a>(src: &str, tokens: impl Iterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    for tok in tokens {
        match &tok.kind {
            TokenKind::Ident(word) => {
                if !out.is_empty() && !out.ends_with('(') {
                    out.push(' ');
                }
                out.push_str(word);
            }
            TokenKind::Star => out.push('*'),
            TokenKind::LParen => out.push('('),
            TokenKind::RParen => out.push(')'),
            TokenKind::Comma => out.push(','),
            // Numbers and literals are collapsed in the token; keep their text.
            TokenKind::Other(_) => out.push_str(&src[tok.start..tok.end]),
            TokenKind::Semi | TokenKind::Comment(_) => {}
        }
    }
    out
}
