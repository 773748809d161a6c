//! Parser for constant declarations in prefix-call notation.
//!
//! ```text
//! WIDTH : u32 : 64
//! MASK  :: sub (shl 1 WIDTH) 1
//! ```
//!
//! Every operator has a fixed arity, so `add 1 mul 2 3` needs no
//! parentheses; they are still accepted for grouping. Newlines end a
//! declaration except inside parentheses.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::ast::{ConvertOp, Decl, Expr, ExprKind, SourceFile, TypeRef};
use crate::diagnostic::Diagnostic;
use crate::exact_value::{BinaryOp, CompareOp, UnaryOp};
use crate::lexer::{Token, TokenKind, lex};
use crate::span::{FileId, Span};
use crate::types::IntType;

#[derive(Debug)]
pub struct ParseResult {
    pub file: SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub struct ExprParseResult {
    /// `None` when the expression could not be parsed at all.
    pub expr: Option<Expr>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a whole source file. Lexer diagnostics are included.
pub fn parse(file_id: FileId, source: &str) -> ParseResult {
    let lexed = lex(file_id, source);
    let mut parser = Parser::new(source, &lexed.tokens);
    parser.diagnostics = lexed.diagnostics;
    let file = parser.parse_file();
    ParseResult {
        file,
        diagnostics: parser.diagnostics,
    }
}

/// Parses a single expression that must span the whole input.
pub fn parse_expression(file_id: FileId, source: &str) -> ExprParseResult {
    let lexed = lex(file_id, source);
    let mut parser = Parser::new(source, &lexed.tokens);
    parser.diagnostics = lexed.diagnostics;
    parser.skip_separators();
    let expr = parser.parse_expr();
    if expr.is_some() {
        parser.skip_separators();
        if parser.peek().kind != TokenKind::Eof {
            let span = parser.peek().span;
            parser.error("unexpected trailing input", span, "E0101");
        }
    }
    ExprParseResult {
        expr,
        diagnostics: parser.diagnostics,
    }
}

/// Deepest expression nesting accepted, counting operator calls and
/// parentheses alike.
pub const MAX_NESTING: usize = 256;

enum Operator {
    Unary(UnaryOp),
    Binary(BinaryOp),
    Compare(CompareOp),
    Convert(ConvertOp),
}

fn operator(name: &str) -> Option<Operator> {
    if let Some(op) = BinaryOp::from_name(name) {
        return Some(Operator::Binary(op));
    }
    if let Some(op) = CompareOp::from_name(name) {
        return Some(Operator::Compare(op));
    }
    let op = match name {
        "neg" => Operator::Unary(UnaryOp::Neg),
        "plus" => Operator::Unary(UnaryOp::Plus),
        "not" => Operator::Unary(UnaryOp::Not),
        "bit_not" => Operator::Convert(ConvertOp::BitNot),
        "cast" => Operator::Convert(ConvertOp::Cast),
        "trunc" => Operator::Convert(ConvertOp::Trunc),
        _ => return None,
    };
    Some(op)
}

/// Whether `name` is reserved for an operator.
pub fn is_operator(name: &str) -> bool {
    operator(name).is_some()
}

struct Parser<'a> {
    source: &'a str,
    tokens: &'a [Token],
    position: usize,
    /// Open parentheses; newlines are insignificant while non-zero.
    depth: usize,
    /// Expressions currently being parsed.
    nesting: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: &'a [Token]) -> Self {
        Parser {
            source,
            tokens,
            position: 0,
            depth: 0,
            nesting: 0,
            diagnostics: Vec::new(),
        }
    }

    fn parse_file(&mut self) -> SourceFile {
        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            match self.parse_decl() {
                Some(decl) => {
                    decls.push(decl);
                    if !self.at_separator() {
                        let span = self.peek().span;
                        self.error("expected end of declaration", span, "E0101");
                        self.recover();
                    }
                }
                None => self.recover(),
            }
        }
        SourceFile { decls }
    }

    fn parse_decl(&mut self) -> Option<Decl> {
        let name_token = self.expect(TokenKind::Ident, "expected a constant name")?;
        let name = name_token.text(self.source).to_string();
        if is_operator(&name) {
            self.error(
                format!("`{name}` is an operator and cannot name a constant"),
                name_token.span,
                "E0101",
            );
            return None;
        }

        let separator = self.peek().kind;
        let ty = match separator {
            TokenKind::DoubleColon => {
                self.advance();
                None
            }
            TokenKind::Colon => {
                self.advance();
                let ty = self.parse_type()?;
                self.expect(TokenKind::Colon, "expected `:` after the type")?;
                Some(ty)
            }
            _ => {
                let span = self.peek().span;
                self.error("expected `::` or `:` after the constant name", span, "E0101");
                return None;
            }
        };

        let value = self.parse_expr()?;
        let span = name_token.span.join(value.span);
        Some(Decl {
            name,
            name_span: name_token.span,
            ty,
            value,
            span,
        })
    }

    fn parse_type(&mut self) -> Option<TypeRef> {
        let token = self.expect(TokenKind::Ident, "expected a type name")?;
        let name = token.text(self.source);
        match IntType::parse(name) {
            Some(ty) => Some(TypeRef {
                ty,
                span: token.span,
            }),
            None => {
                self.error(format!("unknown type `{name}`"), token.span, "E0203");
                None
            }
        }
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        if self.nesting >= MAX_NESTING {
            let span = self.peek().span;
            self.error("expression nested too deeply", span, "E0101");
            return None;
        }
        self.nesting += 1;
        let expr = self.parse_term();
        self.nesting -= 1;
        expr
    }

    fn parse_term(&mut self) -> Option<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::IntLiteral | TokenKind::FloatLiteral => Some(Expr::new(
                ExprKind::Number(token.text(self.source).to_string()),
                token.span,
            )),
            TokenKind::BoolLiteral => Some(Expr::new(
                ExprKind::Bool(token.text(self.source) == "true"),
                token.span,
            )),
            TokenKind::LParen => {
                self.depth += 1;
                let inner = self.parse_expr();
                let closing = self.peek().clone();
                self.depth -= 1;
                let inner = inner?;
                if closing.kind == TokenKind::RParen {
                    self.advance();
                    Some(Expr::new(inner.kind, token.span.join(closing.span)))
                } else {
                    self.error("expected `)`", closing.span, "E0101");
                    None
                }
            }
            TokenKind::Ident => {
                let name = token.text(self.source);
                match operator(name) {
                    Some(op) => self.parse_call(op, &token),
                    None => Some(Expr::new(ExprKind::Name(name.to_string()), token.span)),
                }
            }
            TokenKind::Eof | TokenKind::Newline | TokenKind::Semi => {
                self.error("expected an expression", token.span, "E0101");
                // Leave the separator for recovery.
                if token.kind != TokenKind::Eof {
                    self.position -= 1;
                }
                None
            }
            _ => {
                let text = token.text(self.source);
                self.error(format!("unexpected `{text}`"), token.span, "E0101");
                None
            }
        }
    }

    fn parse_call(&mut self, op: Operator, head: &Token) -> Option<Expr> {
        let kind = match op {
            Operator::Unary(op) => ExprKind::Unary {
                op,
                operand: Box::new(self.parse_operand(head)?),
            },
            Operator::Binary(op) => {
                let lhs = Box::new(self.parse_operand(head)?);
                let rhs = Box::new(self.parse_operand(head)?);
                ExprKind::Binary { op, lhs, rhs }
            }
            Operator::Compare(op) => {
                let lhs = Box::new(self.parse_operand(head)?);
                let rhs = Box::new(self.parse_operand(head)?);
                ExprKind::Compare { op, lhs, rhs }
            }
            Operator::Convert(op) => {
                let ty = self.parse_type()?;
                let operand = Box::new(self.parse_operand(head)?);
                ExprKind::Convert { op, ty, operand }
            }
        };
        let end = self.previous_span();
        Some(Expr::new(kind, head.span.join(end)))
    }

    // An operand that is missing because the line ended is reported as
    // an arity error on the operator.
    fn parse_operand(&mut self, head: &Token) -> Option<Expr> {
        if self.at_separator() || self.peek().kind == TokenKind::RParen {
            let name = head.text(self.source);
            let arity = match operator(name) {
                Some(Operator::Unary(_)) => 1,
                _ => 2,
            };
            self.error(
                format!("operator `{name}` expects {arity} operand(s)"),
                head.span,
                "E0202",
            );
            return None;
        }
        self.parse_expr()
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.peek().kind == kind {
            Some(self.advance())
        } else {
            let span = self.peek().span;
            self.error(message, span, "E0101");
            None
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span, code: &'static str) {
        self.diagnostics
            .push(Diagnostic::error(message, span).with_code(code));
    }

    // Skips the rest of a broken declaration.
    fn recover(&mut self) {
        self.depth = 0;
        while !self.at_separator() {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek_raw().kind, TokenKind::Newline | TokenKind::Semi) {
            self.position += 1;
        }
    }

    fn at_separator(&mut self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline | TokenKind::Semi | TokenKind::Eof
        )
    }

    fn peek_raw(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    // Inside parentheses newlines are skipped.
    fn peek(&mut self) -> &Token {
        while self.depth > 0 && self.peek_raw().kind == TokenKind::Newline {
            self.position += 1;
        }
        self.peek_raw()
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.position.saturating_sub(1)].span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn parse_ok(source: &str) -> SourceFile {
        let result = parse(FileId(0), source);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        result.file
    }

    fn is_binary(expr: &Expr, op: BinaryOp) -> bool {
        matches!(&expr.kind, ExprKind::Binary { op: found, .. } if *found == op)
    }

    fn codes(source: &str) -> Vec<&'static str> {
        parse(FileId(0), source)
            .diagnostics
            .iter()
            .filter_map(|diag| diag.code)
            .collect()
    }

    #[test]
    fn parses_untyped_and_typed_declarations() {
        let file = parse_ok("A :: add 1 (mul 2 3)\nB : u8 : neg A; C :: true");
        assert_eq!(file.decls.len(), 3);
        assert_eq!(file.decls[0].name, "A");
        assert!(is_binary(&file.decls[0].value, BinaryOp::Add));
        assert_eq!(file.decls[1].ty.map(|ty| ty.ty), Some(IntType::U8));
        assert!(matches!(file.decls[2].value.kind, ExprKind::Bool(true)));
    }

    #[test]
    fn prefix_calls_nest_without_parentheses() {
        let file = parse_ok("X :: add 1 mul 2 3");
        let ExprKind::Binary { op, rhs, .. } = &file.decls[0].value.kind else {
            panic!("unexpected expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(is_binary(rhs, BinaryOp::Mul));
        assert_eq!(file.decls[0].value.span, Span::new(FileId(0), 5, 18));
    }

    #[test]
    fn conversions_take_a_type() {
        let file = parse_ok("X :: bit_not u16 0\nY :: cast i8 (trunc u8 300)");
        let ExprKind::Convert { op, ty, .. } = &file.decls[0].value.kind else {
            panic!("unexpected expression");
        };
        assert_eq!(*op, ConvertOp::BitNot);
        assert_eq!(ty.ty, IntType::U16);
    }

    #[test]
    fn parentheses_span_lines() {
        let file = parse_ok("X :: (add 1\n  2)\nY :: X");
        assert_eq!(file.decls.len(), 2);
        assert_eq!(file.decls[1].value.kind, ExprKind::Name("X".to_string()));
    }

    #[test]
    fn reports_arity_and_recovers() {
        let result = parse(FileId(0), "A :: add 1\nB :: 2");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, Some("E0202"));
        assert_eq!(result.file.decls.len(), 1);
        assert_eq!(result.file.decls[0].name, "B");
    }

    #[test]
    fn reports_syntax_errors() {
        assert_eq!(codes("A : f32 : 1"), vec!["E0203"]);
        assert_eq!(codes("A 1"), vec!["E0101"]);
        assert_eq!(codes("A :: 1 2"), vec!["E0101"]);
        assert_eq!(codes("A :: (add 1 2"), vec!["E0101"]);
        assert_eq!(codes("add :: 1"), vec!["E0101"]);
        assert_eq!(codes("A :: 1 $"), vec!["E0001"]);
    }

    #[test]
    fn parses_single_expressions() {
        let result = parse_expression(FileId(0), "shl 1 100");
        assert!(result.diagnostics.is_empty());
        assert!(result.expr.is_some_and(|expr| is_binary(&expr, BinaryOp::Shl)));

        let result = parse_expression(FileId(0), "1 2");
        assert_eq!(result.diagnostics[0].code, Some("E0101"));

        let result = parse_expression(FileId(0), "");
        assert!(result.expr.is_none());
    }

    #[test]
    fn limits_nesting_depth() {
        let deep = format!("{}1", "neg ".repeat(100_000));
        let result = parse_expression(FileId(0), &deep);
        assert!(result.expr.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, Some("E0101"));
        assert_eq!(result.diagnostics[0].message, "expression nested too deeply");

        let parens = format!("{}1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(codes(&format!("A :: {parens}")), vec!["E0101"]);

        let result = parse(FileId(0), &format!("A :: {deep}\nB :: 2"));
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.file.decls.len(), 1);
        assert_eq!(result.file.decls[0].name, "B");

        let shallow = format!("{}1", "neg ".repeat(MAX_NESTING - 1));
        assert!(parse_expression(FileId(0), &shallow).expr.is_some());
    }
}
