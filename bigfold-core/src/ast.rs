use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::exact_value::{BinaryOp, CompareOp, UnaryOp};
use crate::span::Span;
use crate::types::IntType;

/// A parsed source file: its declarations in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub decls: Vec<Decl>,
}

/// `NAME :: expr` or `NAME : type : expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub name_span: Span,
    pub ty: Option<TypeRef>,
    pub value: Expr,
    pub span: Span,
}

/// A type name resolved while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRef {
    pub ty: IntType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Conversions that take a type as their first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertOp {
    /// Representability-checked conversion.
    Cast,
    /// Wrap to the width of the type.
    Trunc,
    /// Complement within the width of the type.
    BitNot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal text, integer or float.
    Number(String),
    Bool(bool),
    /// Reference to a previously declared constant.
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Convert {
        op: ConvertOp,
        ty: TypeRef,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}
