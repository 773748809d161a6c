//! Constant folding.
//!
//! The folder walks declarations in order, evaluating each value with
//! exact arithmetic and binding it for later declarations. Every
//! problem becomes a diagnostic; folding goes on with the next
//! declaration. A declaration whose value failed is remembered so that
//! references to it do not produce a second, misleading error.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::ast::{ConvertOp, Decl, Expr, ExprKind, SourceFile, TypeRef};
use crate::diagnostic::Diagnostic;
use crate::error::{BigIntError, ExactValueError};
use crate::exact_value::{self, BinaryOp, ExactValue, UnaryOp};
use crate::span::Span;
use crate::types::IntType;

/// A folded constant declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    /// Declared type, `Untyped` for `NAME :: expr`.
    pub ty: IntType,
    pub value: ExactValue,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct Folder {
    constants: Vec<Constant>,
    by_name: BTreeMap<String, usize>,
    failed: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Folder {
    pub fn new() -> Self {
        Folder::default()
    }

    pub fn fold_file(&mut self, file: &SourceFile) {
        for decl in &file.decls {
            self.fold_decl(decl);
        }
    }

    pub fn fold_decl(&mut self, decl: &Decl) {
        if self.by_name.contains_key(&decl.name) || self.failed.contains(&decl.name) {
            self.error(
                format!("constant `{}` is already declared", decl.name),
                decl.name_span,
                "E0305",
            );
            return;
        }

        let folded = self
            .evaluate(&decl.value)
            .and_then(|value| match decl.ty {
                Some(ty) => self.check_declared_type(value, ty, decl.value.span),
                None => Some(value),
            });

        match folded {
            Some(value) => {
                self.by_name.insert(decl.name.clone(), self.constants.len());
                self.constants.push(Constant {
                    name: decl.name.clone(),
                    ty: decl.ty.map_or(IntType::Untyped, |ty| ty.ty),
                    value,
                    span: decl.span,
                });
            }
            None => {
                self.failed.insert(decl.name.clone());
            }
        }
    }

    /// Evaluates an expression against the constants folded so far.
    /// `None` means a diagnostic has been recorded.
    pub fn evaluate(&mut self, expr: &Expr) -> Option<ExactValue> {
        match &expr.kind {
            ExprKind::Number(text) => match ExactValue::from_literal(text) {
                Ok(value) => Some(value),
                Err(BigIntError::MalformedLiteral) => {
                    self.error(format!("malformed numeric literal `{text}`"), expr.span, "E0002");
                    None
                }
                Err(err) => {
                    self.value_error(err.into(), expr.span);
                    None
                }
            },
            ExprKind::Bool(value) => Some(ExactValue::Bool(*value)),
            ExprKind::Name(name) => {
                if let Some(constant) = self.lookup(name) {
                    return Some(constant.value.clone());
                }
                if !self.failed.contains(name) {
                    self.error(format!("unknown constant `{name}`"), expr.span, "E0201");
                }
                None
            }
            ExprKind::Unary { op, operand } => {
                let value = self.evaluate(operand)?;
                self.apply(exact_value::unary(*op, &value, IntType::Untyped), expr.span)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.evaluate(lhs);
                let rhs = self.evaluate(rhs);
                let (lhs, rhs) = (lhs?, rhs?);
                if *op == BinaryOp::Div && lhs.as_integer().is_some() && rhs.as_integer().is_some() {
                    self.diagnostics.push(
                        Diagnostic::warning(
                            "`div` on integers yields a float; use `quo` for an integer quotient",
                            expr.span,
                        )
                        .with_code("W0001"),
                    );
                }
                self.apply(exact_value::binary(*op, &lhs, &rhs), expr.span)
            }
            ExprKind::Compare { op, lhs, rhs } => {
                let lhs = self.evaluate(lhs);
                let rhs = self.evaluate(rhs);
                let (lhs, rhs) = (lhs?, rhs?);
                let holds = self.apply(exact_value::compare(*op, &lhs, &rhs), expr.span)?;
                Some(ExactValue::Bool(holds))
            }
            ExprKind::Convert { op, ty, operand } => {
                let value = self.evaluate(operand)?;
                self.convert(*op, *ty, value, expr.span)
            }
        }
    }

    fn convert(&mut self, op: ConvertOp, ty: TypeRef, value: ExactValue, span: Span) -> Option<ExactValue> {
        let integer = match (&value, op) {
            (_, ConvertOp::BitNot) => {
                return self.apply(exact_value::unary(UnaryOp::BitNot, &value, ty.ty), span);
            }
            (ExactValue::Integer(integer), _) => integer,
            _ => {
                let verb = if op == ConvertOp::Cast { "cast" } else { "truncate" };
                self.error(
                    format!("cannot {verb} a {} value to `{}`", value.kind_name(), ty.ty),
                    span,
                    "E0304",
                );
                return None;
            }
        };
        match (op, ty.ty.bits()) {
            (ConvertOp::Trunc, Some(bits)) => {
                Some(ExactValue::Integer(integer.wrap(bits, ty.ty.is_signed())))
            }
            _ if ty.ty.is_representable(integer) => Some(value),
            _ => {
                self.error(
                    format!("value `{}` does not fit `{}`", integer.to_text_abbreviated(), ty.ty),
                    span,
                    "E0302",
                );
                None
            }
        }
    }

    fn check_declared_type(&mut self, value: ExactValue, ty: TypeRef, span: Span) -> Option<ExactValue> {
        let Some(integer) = value.as_integer() else {
            self.error(
                format!("cannot declare a {} constant as `{}`", value.kind_name(), ty.ty),
                ty.span,
                "E0304",
            );
            return None;
        };
        if !ty.ty.is_representable(integer) {
            self.error(
                format!("constant `{}` overflows `{}`", integer.to_text_abbreviated(), ty.ty),
                span,
                "E0302",
            );
            return None;
        }
        Some(value)
    }

    fn apply<T>(&mut self, result: Result<T, ExactValueError>, span: Span) -> Option<T> {
        result.map_err(|err| self.value_error(err, span)).ok()
    }

    fn value_error(&mut self, err: ExactValueError, span: Span) {
        let (message, code) = match err {
            ExactValueError::Arithmetic(BigIntError::DivisionByZero) => {
                (String::from("division by zero in constant expression"), "E0301")
            }
            ExactValueError::Arithmetic(BigIntError::Overflow) => {
                (String::from("integer overflow in constant expression"), "E0302")
            }
            ExactValueError::Arithmetic(BigIntError::ShiftOutOfRange) => {
                (String::from("shift amount out of range"), "E0303")
            }
            ExactValueError::Arithmetic(BigIntError::Negative) => (
                String::from("operand must be a non-negative integer"),
                "E0304",
            ),
            ExactValueError::Arithmetic(BigIntError::MalformedLiteral) => {
                (String::from("malformed integer literal"), "E0002")
            }
            ExactValueError::InvalidOperation { op, operand } => (
                format!("operator `{op}` is not defined for {operand} operands"),
                "E0304",
            ),
        };
        self.error(message, span, code);
    }

    fn error(&mut self, message: impl Into<String>, span: Span, code: &'static str) {
        self.diagnostics
            .push(Diagnostic::error(message, span).with_code(code));
    }

    pub fn lookup(&self, name: &str) -> Option<&Constant> {
        self.by_name.get(name).map(|&index| &self.constants[index])
    }

    /// Adds diagnostics from earlier stages so they are reported in
    /// order with the folder's own.
    pub fn report(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Folded constants in declaration order, and every diagnostic.
    pub fn finish(self) -> (Vec<Constant>, Vec<Diagnostic>) {
        (self.constants, self.diagnostics)
    }
}
