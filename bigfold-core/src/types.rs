//! Integer types a constant can be declared with.
//!
//! Every sized type has a fixed width and signedness; `Untyped` is the
//! type of a constant declared without a type and accepts any value.

use core::fmt;

use crate::big_int::BigInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    /// Target word-sized signed integer (64 bits).
    Int,
    /// Target word-sized unsigned integer (64 bits).
    Uint,
    Untyped,
}

impl IntType {
    /// Width in bits; `None` for `Untyped`.
    pub fn bits(self) -> Option<u64> {
        match self {
            IntType::I8 | IntType::U8 => Some(8),
            IntType::I16 | IntType::U16 => Some(16),
            IntType::I32 | IntType::U32 => Some(32),
            IntType::I64 | IntType::U64 | IntType::Int | IntType::Uint => Some(64),
            IntType::I128 | IntType::U128 => Some(128),
            IntType::Untyped => None,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntType::I8
                | IntType::I16
                | IntType::I32
                | IntType::I64
                | IntType::I128
                | IntType::Int
                | IntType::Untyped
        )
    }

    /// Smallest value of the type; `None` for `Untyped`.
    pub fn min_value(self) -> Option<BigInt> {
        let bits = self.bits()?;
        if self.is_signed() {
            Some(-(BigInt::ONE << (bits - 1)))
        } else {
            Some(BigInt::ZERO)
        }
    }

    /// Largest value of the type; `None` for `Untyped`.
    pub fn max_value(self) -> Option<BigInt> {
        let bits = self.bits()?;
        let width = if self.is_signed() { bits - 1 } else { bits };
        Some((BigInt::ONE << width) - BigInt::ONE)
    }

    /// Whether `value` lies in `min_value()..=max_value()`.
    pub fn is_representable(self, value: &BigInt) -> bool {
        match (self.min_value(), self.max_value()) {
            (Some(min), Some(max)) => min <= *value && *value <= max,
            _ => true,
        }
    }

    pub fn parse(name: &str) -> Option<IntType> {
        let ty = match name {
            "i8" => IntType::I8,
            "i16" => IntType::I16,
            "i32" => IntType::I32,
            "i64" => IntType::I64,
            "i128" => IntType::I128,
            "u8" => IntType::U8,
            "u16" => IntType::U16,
            "u32" => IntType::U32,
            "u64" => IntType::U64,
            "u128" => IntType::U128,
            "int" => IntType::Int,
            "uint" => IntType::Uint,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            IntType::I8 => "i8",
            IntType::I16 => "i16",
            IntType::I32 => "i32",
            IntType::I64 => "i64",
            IntType::I128 => "i128",
            IntType::U8 => "u8",
            IntType::U16 => "u16",
            IntType::U32 => "u32",
            IntType::U64 => "u64",
            IntType::U128 => "u128",
            IntType::Int => "int",
            IntType::Uint => "uint",
            IntType::Untyped => "untyped integer",
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_of_sized_types() {
        assert_eq!(IntType::I8.min_value(), Some(BigInt::from(i8::MIN)));
        assert_eq!(IntType::I8.max_value(), Some(BigInt::from(i8::MAX)));
        assert_eq!(IntType::U64.max_value(), Some(BigInt::from(u64::MAX)));
        assert_eq!(IntType::I128.min_value(), Some(BigInt::from(i128::MIN)));
        assert_eq!(IntType::U128.max_value(), Some(BigInt::from(u128::MAX)));
        assert_eq!(IntType::Untyped.max_value(), None);
    }

    #[test]
    fn representability_uses_full_width() {
        assert!(IntType::U8.is_representable(&BigInt::from(255)));
        assert!(!IntType::U8.is_representable(&BigInt::from(256)));
        assert!(!IntType::U8.is_representable(&BigInt::from(-1)));
        assert!(IntType::I128.is_representable(&BigInt::from(i128::MIN)));
        assert!(!IntType::I128.is_representable(&(BigInt::from(i128::MAX) + BigInt::ONE)));
        assert!(IntType::U128.is_representable(&BigInt::from(u128::MAX)));
        assert!(IntType::Untyped.is_representable(&(BigInt::ONE << 1000)));
    }

    #[test]
    fn parses_type_names() {
        assert_eq!(IntType::parse("u16"), Some(IntType::U16));
        assert_eq!(IntType::parse("int"), Some(IntType::Int));
        assert_eq!(IntType::parse("f32"), None);
        assert_eq!(IntType::parse("untyped"), None);
        assert_eq!(IntType::Uint.bits(), Some(64));
        assert!(!IntType::Uint.is_signed());
    }
}
