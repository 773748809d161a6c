//! Lexer for constant-declaration sources (no_std).

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::diagnostic::Diagnostic;
use crate::span::{FileId, Span};

/// Kind of a token produced by the lexer.
///
/// Operator names such as `add` are plain identifiers; the parser
/// gives them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,
    /// End of a line; declarations are line separated.
    Newline,

    // Identifiers and literals
    Ident,
    IntLiteral,
    FloatLiteral,
    BoolLiteral, // true / false

    // Punctuation
    LParen,      // (
    RParen,      // )
    Semi,        // ;
    Colon,       // :
    DoubleColon, // ::
}

/// A single token with its kind and span.
///
/// `text_start` / `text_end` are byte offsets into the source, so
/// higher layers can slice the literal text back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text_start: u32,
    pub text_end: u32,
}

impl Token {
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.text_start as usize..self.text_end as usize]
    }
}

#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Largest source the lexer accepts; spans hold `u32` byte offsets.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// Lex a source string into tokens, always ending with `Eof`.
///
/// Problems are reported as diagnostics and the offending bytes are
/// skipped, so the token stream is always usable. A source longer than
/// [`MAX_SOURCE_LEN`] is rejected as a whole with `E0001`.
pub fn lex(file_id: FileId, source: &str) -> LexResult {
    if source.len() > MAX_SOURCE_LEN {
        return oversized(file_id, source.len());
    }
    let mut lexer = Lexer {
        file_id,
        chars: source.as_bytes(),
        source,
        len: source.len(),
        index: 0,
        diagnostics: Vec::new(),
    };
    lexer.run()
}

fn oversized(file_id: FileId, len: usize) -> LexResult {
    let span = Span::new(file_id, 0, 0);
    let diag = Diagnostic::error(
        format!("source is {len} bytes; at most {MAX_SOURCE_LEN} are supported"),
        span,
    )
    .with_code("E0001");
    LexResult {
        tokens: vec![Token {
            kind: TokenKind::Eof,
            span,
            text_start: 0,
            text_end: 0,
        }],
        diagnostics: vec![diag],
    }
}

struct Lexer<'src> {
    file_id: FileId,
    source: &'src str,
    chars: &'src [u8],
    len: usize,
    index: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    fn run(&mut self) -> LexResult {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if is_blank(ch) {
                self.consume_char();
                continue;
            }

            let start = self.index as u32;
            let token = match ch {
                b'\n' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Newline, start)
                }
                b'/' if self.peek_next() == Some(b'/') => {
                    self.skip_line_comment();
                    None
                }
                b'(' => {
                    self.consume_char();
                    self.simple_token(TokenKind::LParen, start)
                }
                b')' => {
                    self.consume_char();
                    self.simple_token(TokenKind::RParen, start)
                }
                b';' => {
                    self.consume_char();
                    self.simple_token(TokenKind::Semi, start)
                }
                b':' => {
                    self.consume_char();
                    if self.peek_char() == Some(b':') {
                        self.consume_char();
                        self.simple_token(TokenKind::DoubleColon, start)
                    } else {
                        self.simple_token(TokenKind::Colon, start)
                    }
                }
                b'-' if self.peek_next().is_some_and(|next| next.is_ascii_digit()) => {
                    self.consume_char();
                    self.lex_number(start)
                }
                b'0'..=b'9' => self.lex_number(start),
                _ => {
                    if is_ident_start(ch) {
                        self.lex_ident(start)
                    } else {
                        self.consume_utf8_char();
                        self.unexpected_char(start)
                    }
                }
            };

            if let Some(tok) = token {
                tokens.push(tok);
            }
        }

        let eof_span = Span::new(self.file_id, self.len as u32, self.len as u32);
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: eof_span,
            text_start: self.len as u32,
            text_end: self.len as u32,
        });

        LexResult {
            tokens,
            diagnostics: core::mem::take(&mut self.diagnostics),
        }
    }

    fn simple_token(&self, kind: TokenKind, start: u32) -> Option<Token> {
        let end = self.index as u32;
        Some(Token {
            kind,
            span: Span::new(self.file_id, start, end),
            text_start: start,
            text_end: end,
        })
    }

    fn unexpected_char(&mut self, start: u32) -> Option<Token> {
        let end = self.index as u32;
        let span = Span::new(self.file_id, start, end);
        let text = &self.source[start as usize..end as usize];
        let diag = Diagnostic::error(format!("unexpected character `{text}`"), span)
            .with_code("E0001");
        self.diagnostics.push(diag);
        None
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == b'\n' {
                break;
            }
            self.consume_char();
        }
    }

    // Integer literals use the BigInt grammar: an optional base prefix,
    // digits of any base with `_` separators, and a decimal exponent.
    // A fraction or a signed exponent makes a float. Letters and digits
    // are consumed greedily so that `12abc` is one malformed literal
    // instead of a number followed by an identifier.
    fn lex_number(&mut self, start: u32) -> Option<Token> {
        let mut is_float = false;

        let prefixed = self.peek_char() == Some(b'0')
            && self
                .peek_next()
                .is_some_and(|next| matches!(next, b'b' | b'o' | b'd' | b'z' | b'x' | b'h'));
        if prefixed {
            self.consume_char();
            self.consume_char();
        }

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.consume_char();
                let exponent = !prefixed && matches!(ch, b'e' | b'E');
                if exponent && matches!(self.peek_char(), Some(b'+' | b'-')) {
                    is_float |= self.peek_char() == Some(b'-');
                    self.consume_char();
                }
            } else if ch == b'.'
                && !prefixed
                && !is_float
                && self.peek_next().is_some_and(|next| next.is_ascii_digit())
            {
                is_float = true;
                self.consume_char();
            } else {
                break;
            }
        }

        let end = self.index as u32;
        let span = Span::new(self.file_id, start, end);
        let kind = if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Some(Token {
            kind,
            span,
            text_start: start,
            text_end: end,
        })
    }

    fn lex_ident(&mut self, start: u32) -> Option<Token> {
        while let Some(ch) = self.peek_char() {
            if is_ident_continue(ch) {
                self.consume_char();
            } else {
                break;
            }
        }

        let end = self.index as u32;
        let span = Span::new(self.file_id, start, end);
        let kind = match &self.source[start as usize..end as usize] {
            "true" | "false" => TokenKind::BoolLiteral,
            _ => TokenKind::Ident,
        };

        Some(Token {
            kind,
            span,
            text_start: start,
            text_end: end,
        })
    }

    fn peek_char(&self) -> Option<u8> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<u8> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        if self.index < self.len {
            self.index += 1;
        }
    }

    // Skips a whole UTF-8 sequence so spans stay on char boundaries.
    fn consume_utf8_char(&mut self) {
        self.consume_char();
        while self.peek_char().is_some_and(|ch| ch & 0xC0 == 0x80) {
            self.consume_char();
        }
    }
}

fn is_blank(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\r')
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(FileId(0), source)
            .tokens
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn rejects_sources_beyond_u32_offsets() {
        let result = oversized(FileId(3), MAX_SOURCE_LEN + 1);
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].kind, TokenKind::Eof);
        assert_eq!(result.diagnostics[0].code, Some("E0001"));
        assert_eq!(result.diagnostics[0].span.file_id, FileId(3));
    }

    #[test]
    fn lexes_declarations() {
        use TokenKind::*;
        assert_eq!(
            kinds("A :: add 1 (neg 2)\nB : u8 : true; // done"),
            vec![
                Ident, DoubleColon, Ident, IntLiteral, LParen, Ident, IntLiteral, RParen,
                Newline, Ident, Colon, Ident, Colon, BoolLiteral, Semi, Eof
            ]
        );
    }

    #[test]
    fn keeps_literal_text() {
        let source = "0x_ff_ff -12 1e3 2.5 1e-3 0b1010 12abc";
        let result = lex(FileId(0), source);
        assert!(result.diagnostics.is_empty());
        let texts: Vec<_> = result
            .tokens
            .iter()
            .filter(|token| token.kind != TokenKind::Eof)
            .map(|token| (token.kind, token.text(source)))
            .collect();
        assert_eq!(
            texts,
            vec![
                (TokenKind::IntLiteral, "0x_ff_ff"),
                (TokenKind::IntLiteral, "-12"),
                (TokenKind::IntLiteral, "1e3"),
                (TokenKind::FloatLiteral, "2.5"),
                (TokenKind::FloatLiteral, "1e-3"),
                (TokenKind::IntLiteral, "0b1010"),
                (TokenKind::IntLiteral, "12abc"),
            ]
        );
    }

    #[test]
    fn hex_digits_are_not_exponents() {
        let source = "0x1e-1";
        let result = lex(FileId(0), source);
        assert_eq!(result.tokens[0].text(source), "0x1e");
        assert_eq!(result.tokens[1].text(source), "-1");
    }

    #[test]
    fn reports_unexpected_characters() {
        let result = lex(FileId(3), "A :: 1 $ é");
        assert_eq!(result.diagnostics.len(), 2);
        assert_eq!(result.diagnostics[0].code, Some("E0001"));
        assert_eq!(result.diagnostics[0].span, Span::new(FileId(3), 7, 8));
        assert_eq!(result.diagnostics[1].span, Span::new(FileId(3), 9, 11));
    }
}
