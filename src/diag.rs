//! Consumer-side diagnostics.
//!
//! The lexer itself never reports anything — malformed input degrades to
//! best-effort tokens. This module is the reporting layer a parser or
//! highlighter builds on top of the token stream: [`tokenize`] pairs the
//! tokens of a source text with diagnostics for everything the lexer had
//! to degrade.

use thiserror::Error;

use crate::lexer::{Lexer, LexerOptions};
use crate::token::{Token, TokenId};

/// Compact byte span used across diagnostics.
///
/// Offsets are clamped to `u32`; inputs beyond 4 GiB are out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    /// Exclusive.
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        let start = if start > u32::MAX as usize {
            u32::MAX
        } else {
            start as u32
        };
        let end = if end > u32::MAX as usize {
            u32::MAX
        } else {
            end as u32
        };
        Self { start, end }
    }

    #[inline]
    pub fn from_token(tok: &Token) -> Self {
        Self::new(tok.offset, tok.offset + tok.length)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unknown token")]
    UnknownToken,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unknown preprocessor directive")]
    UnknownDirective,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// A rendered diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub span: Span,
    pub message: String,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

/// Lex `source` to completion, pairing the full token stream (including
/// the final `Eof`) with diagnostics for unknown bytes, strings cut off by
/// a newline or the end of input, and unrecognized directives.
pub fn tokenize(source: &str, options: LexerOptions) -> (Vec<Token>, Vec<Diag>) {
    let mut tokens = Vec::new();
    let mut diags = Vec::new();

    for tok in Lexer::with_options(source, options).tokens() {
        let kind = match tok.id {
            TokenId::Unknown => Some(LexErrorKind::UnknownToken),
            TokenId::HashUnknown => Some(LexErrorKind::UnknownDirective),
            TokenId::StringLit => {
                let end = (tok.offset + tok.length).min(source.len());
                let raw = &source.as_bytes()[tok.offset..end];
                if raw.len() < 2 || raw.last() != Some(&b'"') {
                    Some(LexErrorKind::UnterminatedString)
                } else {
                    None
                }
            }
            _ => None,
        };

        if let Some(kind) = kind {
            let err = LexError {
                kind,
                span: Span::from_token(&tok),
            };
            diags.push(err.diag());
        }

        tokens.push(tok);
    }

    (tokens, diags)
}
