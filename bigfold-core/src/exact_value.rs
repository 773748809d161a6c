//! Exact compile-time values and the operators defined on them.
//!
//! Integers are arbitrary precision and never wrap; whether a result
//! fits its declared type is decided later by the folder.

use alloc::string::{String, ToString};
use core::fmt;

use crate::big_int::BigInt;
use crate::error::{BigIntError, ExactValueError};
use crate::types::IntType;

#[derive(Debug, Clone, PartialEq)]
pub enum ExactValue {
    Bool(bool),
    Integer(BigInt),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    /// Logical not.
    Not,
    /// Complement within the width of a sized integer type.
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// `/`: float division, also for integer operands.
    Div,
    /// Truncating integer quotient.
    Quo,
    /// Truncating remainder.
    Rem,
    /// Euclidean remainder, never negative.
    Mod,
    Pow,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Plus => "plus",
            UnaryOp::Not => "not",
            UnaryOp::BitNot => "bit_not",
        }
    }
}

impl BinaryOp {
    pub fn from_name(name: &str) -> Option<BinaryOp> {
        let op = match name {
            "add" => BinaryOp::Add,
            "sub" => BinaryOp::Sub,
            "mul" => BinaryOp::Mul,
            "div" => BinaryOp::Div,
            "quo" => BinaryOp::Quo,
            "rem" => BinaryOp::Rem,
            "mod" => BinaryOp::Mod,
            "pow" => BinaryOp::Pow,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            "xor" => BinaryOp::Xor,
            "and_not" => BinaryOp::AndNot,
            "shl" => BinaryOp::Shl,
            "shr" => BinaryOp::Shr,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Quo => "quo",
            BinaryOp::Rem => "rem",
            BinaryOp::Mod => "mod",
            BinaryOp::Pow => "pow",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::AndNot => "and_not",
            BinaryOp::Shl => "shl",
            BinaryOp::Shr => "shr",
        }
    }
}

impl CompareOp {
    pub fn from_name(name: &str) -> Option<CompareOp> {
        let op = match name {
            "eq" => CompareOp::Eq,
            "ne" => CompareOp::Ne,
            "lt" => CompareOp::Lt,
            "le" => CompareOp::Le,
            "gt" => CompareOp::Gt,
            "ge" => CompareOp::Ge,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
        }
    }

    fn holds<T: PartialOrd>(self, x: &T, y: &T) -> bool {
        match self {
            CompareOp::Eq => x == y,
            CompareOp::Ne => x != y,
            CompareOp::Lt => x < y,
            CompareOp::Le => x <= y,
            CompareOp::Gt => x > y,
            CompareOp::Ge => x >= y,
        }
    }
}

impl ExactValue {
    /// Reads a numeric literal. Integer syntax (prefixes, `_`, decimal
    /// exponents) yields an integer; anything else must be a float.
    pub fn from_literal(text: &str) -> Result<ExactValue, BigIntError> {
        match text.parse::<BigInt>() {
            Ok(value) => Ok(ExactValue::Integer(value)),
            Err(BigIntError::MalformedLiteral) if is_float_literal(text) => {
                let cleaned: String = text.chars().filter(|&ch| ch != '_').collect();
                cleaned
                    .parse::<f64>()
                    .map(ExactValue::Float)
                    .map_err(|_| BigIntError::MalformedLiteral)
            }
            Err(err) => Err(err),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ExactValue::Bool(_) => "boolean",
            ExactValue::Integer(_) => "integer",
            ExactValue::Float(_) => "float",
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            ExactValue::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Renders the value, integers in `base` with their literal
    /// prefix.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not in `2..=16`.
    pub fn to_text_in_base(&self, base: u32) -> String {
        match self {
            ExactValue::Integer(value) if base == 10 => value.to_text(10),
            ExactValue::Integer(value) => value.to_literal(base),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ExactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExactValue::Bool(value) => write!(f, "{value}"),
            ExactValue::Integer(value) => write!(f, "{value}"),
            ExactValue::Float(value) => write!(f, "{value:?}"),
        }
    }
}

// Decimal digits with a fraction or a signed exponent; rules out the
// `inf`/`nan` spellings `f64` would also accept.
fn is_float_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    unsigned.starts_with(|ch: char| ch.is_ascii_digit())
        && text.contains(['.', 'e', 'E'])
        && text
            .bytes()
            .all(|byte| byte.is_ascii_digit() || matches!(byte, b'.' | b'e' | b'E' | b'+' | b'-' | b'_'))
}

fn invalid(op: &'static str, value: &ExactValue) -> ExactValueError {
    ExactValueError::InvalidOperation {
        op,
        operand: value.kind_name(),
    }
}

/// Applies a unary operator. `ty` is the type the operand is viewed
/// at; only [`UnaryOp::BitNot`] looks at it.
pub fn unary(op: UnaryOp, value: &ExactValue, ty: IntType) -> Result<ExactValue, ExactValueError> {
    match (op, value) {
        (UnaryOp::Plus, ExactValue::Integer(_) | ExactValue::Float(_)) => Ok(value.clone()),
        (UnaryOp::Neg, ExactValue::Integer(x)) => Ok(ExactValue::Integer(-x)),
        (UnaryOp::Neg, ExactValue::Float(x)) => Ok(ExactValue::Float(-x)),
        (UnaryOp::Not, ExactValue::Bool(x)) => Ok(ExactValue::Bool(!x)),
        (UnaryOp::BitNot, ExactValue::Integer(x)) => match ty.bits() {
            Some(bits) => Ok(ExactValue::Integer(x.bitwise_not(bits, ty.is_signed()))),
            None => Err(ExactValueError::InvalidOperation {
                op: op.name(),
                operand: ty.name(),
            }),
        },
        _ => Err(invalid(op.name(), value)),
    }
}

/// Applies a binary operator. An integer meeting a float is promoted
/// to a float first.
pub fn binary(op: BinaryOp, x: &ExactValue, y: &ExactValue) -> Result<ExactValue, ExactValueError> {
    match (x, y) {
        (ExactValue::Integer(a), ExactValue::Integer(b)) => integer_binary(op, a, b),
        (ExactValue::Bool(a), ExactValue::Bool(b)) => bool_binary(op, *a, *b),
        (ExactValue::Float(a), ExactValue::Float(b)) => float_binary(op, *a, *b),
        (ExactValue::Integer(a), ExactValue::Float(b)) => float_binary(op, a.to_f64(), *b),
        (ExactValue::Float(a), ExactValue::Integer(b)) => float_binary(op, *a, b.to_f64()),
        (ExactValue::Bool(_), _) => Err(invalid(op.name(), x)),
        (_, ExactValue::Bool(_)) => Err(invalid(op.name(), y)),
    }
}

fn integer_binary(op: BinaryOp, a: &BigInt, b: &BigInt) -> Result<ExactValue, ExactValueError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(BigIntError::DivisionByZero.into());
            }
            return Ok(ExactValue::Float(a.to_f64() / b.to_f64()));
        }
        BinaryOp::Quo => a.quo(b)?,
        BinaryOp::Rem => a.rem(b)?,
        BinaryOp::Mod => a.rem_euclid(b)?,
        BinaryOp::Pow => a.pow(b.to_u64()?)?,
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::AndNot => a.and_not(b),
        BinaryOp::Shl => a.shl_big(b)?,
        BinaryOp::Shr => shr_floor(a, b)?,
    };
    Ok(ExactValue::Integer(value))
}

// Arithmetic right shift rounding toward negative infinity, so that
// `-1 shr n == -1`.
fn shr_floor(value: &BigInt, amount: &BigInt) -> Result<BigInt, BigIntError> {
    if value.is_negative() {
        let shifted = (value.abs() - BigInt::ONE).shr_big(amount)?;
        Ok(-shifted - BigInt::ONE)
    } else {
        value.shr_big(amount)
    }
}

fn bool_binary(op: BinaryOp, a: bool, b: bool) -> Result<ExactValue, ExactValueError> {
    let value = match op {
        BinaryOp::And => a && b,
        BinaryOp::Or => a || b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::AndNot => a && !b,
        _ => {
            return Err(ExactValueError::InvalidOperation {
                op: op.name(),
                operand: "boolean",
            });
        }
    };
    Ok(ExactValue::Bool(value))
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Result<ExactValue, ExactValueError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => {
            return Err(ExactValueError::InvalidOperation {
                op: op.name(),
                operand: "float",
            });
        }
    };
    Ok(ExactValue::Float(value))
}

/// Evaluates a comparison. Booleans support only `eq` and `ne`.
pub fn compare(op: CompareOp, x: &ExactValue, y: &ExactValue) -> Result<bool, ExactValueError> {
    match (x, y) {
        (ExactValue::Integer(a), ExactValue::Integer(b)) => Ok(op.holds(a, b)),
        (ExactValue::Float(a), ExactValue::Float(b)) => Ok(op.holds(a, b)),
        (ExactValue::Integer(a), ExactValue::Float(b)) => Ok(op.holds(&a.to_f64(), b)),
        (ExactValue::Float(a), ExactValue::Integer(b)) => Ok(op.holds(a, &b.to_f64())),
        (ExactValue::Bool(a), ExactValue::Bool(b)) if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
            Ok(op.holds(a, b))
        }
        (ExactValue::Bool(_), _) => Err(invalid(op.name(), x)),
        (_, _) => Err(invalid(op.name(), y)),
    }
}
