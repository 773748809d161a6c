//! Conversions between `BigInt`, native integers, floats and text.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use super::arith::mul_add_word;
use super::division::div_rem_word;
use super::word::{WORD_BITS, Word};
use super::{BigInt, Words};
use crate::error::BigIntError;

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Magnitudes wider than this many bits (about `10^150`) are shown
/// approximately by [`BigInt::to_text_abbreviated`].
pub const ABBREVIATE_BITS: u64 = 498;

impl BigInt {
    pub fn from_u64(value: u64) -> BigInt {
        BigInt::from_word(false, value)
    }

    pub fn from_i64(value: i64) -> BigInt {
        BigInt::from_word(value < 0, value.unsigned_abs())
    }

    pub fn from_u128(value: u128) -> BigInt {
        BigInt::from_words(false, vec![value as Word, (value >> WORD_BITS) as Word])
    }

    pub fn from_i128(value: i128) -> BigInt {
        let mut result = BigInt::from_u128(value.unsigned_abs());
        result.neg = value < 0;
        result.normalize();
        result
    }

    /// Converts to `u64`.
    ///
    /// Fails with [`BigIntError::Negative`] for negative values and
    /// with [`BigIntError::Overflow`] when more than one word is used.
    pub fn to_u64(&self) -> Result<u64, BigIntError> {
        if self.neg {
            return Err(BigIntError::Negative);
        }
        match self.words {
            Words::Inline(word) => Ok(word),
            Words::Heap(_) => Err(BigIntError::Overflow),
        }
    }

    /// Converts to `i64`, failing outside `[-2^63, 2^63 - 1]`.
    pub fn to_i64(&self) -> Result<i64, BigIntError> {
        let Words::Inline(word) = self.words else {
            return Err(BigIntError::Overflow);
        };
        if self.neg {
            if word > 1 << 63 {
                return Err(BigIntError::Overflow);
            }
            Ok(0u64.wrapping_sub(word) as i64)
        } else {
            i64::try_from(word).map_err(|_| BigIntError::Overflow)
        }
    }

    pub fn to_u128(&self) -> Result<u128, BigIntError> {
        if self.neg {
            return Err(BigIntError::Negative);
        }
        match self.magnitude_words() {
            [] => Ok(0),
            [low] => Ok(*low as u128),
            [low, high] => Ok(((*high as u128) << WORD_BITS) | *low as u128),
            _ => Err(BigIntError::Overflow),
        }
    }

    pub fn to_i128(&self) -> Result<i128, BigIntError> {
        let magnitude = self.abs().to_u128()?;
        if self.neg {
            if magnitude > 1 << 127 {
                return Err(BigIntError::Overflow);
            }
            Ok(0u128.wrapping_sub(magnitude) as i128)
        } else {
            i128::try_from(magnitude).map_err(|_| BigIntError::Overflow)
        }
    }

    /// Nearest-ish `f64`.
    ///
    /// Exact for single-word values. Wider values accumulate
    /// `result * 2^64 + word` from the most significant word, so
    /// precision beyond 53 bits is lost and huge values become
    /// infinite.
    pub fn to_f64(&self) -> f64 {
        let magnitude = match self.magnitude_words() {
            [] => 0.0,
            [word] => *word as f64,
            words => {
                let base = 2f64.powi(WORD_BITS as i32);
                words
                    .iter()
                    .rev()
                    .fold(0.0, |acc, &word| acc * base + word as f64)
            }
        };
        if self.neg { -magnitude } else { magnitude }
    }

    /// Formats the value in `base`, without any prefix.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not in `2..=16`.
    pub fn to_text(&self, base: u32) -> String {
        assert!(
            (2..=16).contains(&base),
            "to_text: base {base} is out of range"
        );
        let mut out = String::new();
        if self.neg {
            out.push('-');
        }
        out.push_str(&format_magnitude(self.magnitude_words(), base));
        out
    }

    /// Formats the value with the literal prefix of `base` (`0b`, `0o`,
    /// `0z`, `0x`). For those bases and base 10 the result reads back
    /// through [`BigInt::from_text`]; other bases are plain digits.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not in `2..=16`.
    pub fn to_literal(&self, base: u32) -> String {
        let mut out = String::new();
        if self.neg {
            out.push('-');
        }
        if let Some(prefix) = literal_prefix(base) {
            out.push_str(prefix);
        }
        out.push_str(&self.abs().to_text(base));
        out
    }

    /// Decimal text for messages: exact up to [`ABBREVIATE_BITS`] bits,
    /// otherwise four truncated significant digits such as
    /// `~ 2.003e19728`.
    pub fn to_text_abbreviated(&self) -> String {
        if self.bit_len() <= ABBREVIATE_BITS {
            return self.to_text(10);
        }
        match self.leading_decimal_digits() {
            Some((lead, exponent)) => {
                let sign = if self.neg { "-" } else { "" };
                format!("~ {sign}{}.{:03}e{exponent}", lead / 1000, lead % 1000)
            }
            None => self.to_text(10),
        }
    }

    // The first four decimal digits of the magnitude and its decimal
    // exponent. `None` for magnitudes under about 10^4.
    fn leading_decimal_digits(&self) -> Option<(u64, u64)> {
        // 30103 / 100000 approximates log10(2); the estimate is at most
        // one above the true exponent for any width that fits memory.
        let estimate = (self.bit_len().checked_sub(1)? * 30_103) / 100_000;
        let mut scale_exponent = estimate.checked_sub(4)?;
        let scale = BigInt::from_u64(10).pow_within(scale_exponent, u64::MAX).ok()?;
        let mut lead = self.abs().quo(&scale).ok()?.to_u64().ok()?;
        while lead >= 10_000 {
            lead /= 10;
            scale_exponent += 1;
        }
        Some((lead, scale_exponent + 3))
    }

    /// Parses an integer literal.
    ///
    /// The grammar is `-? prefix? digits exponent?` where the prefix is
    /// one of `0b 0o 0d 0z 0x 0h`, digits may contain `_` separators,
    /// and a decimal literal may end in `e[+]digits`. Parsing stops at
    /// the first byte that does not belong to the literal, so
    /// `"12abc"` yields 12; use [`BigInt::parse_prefix`] to learn how
    /// much was read, or `str::parse` to reject trailing input.
    pub fn from_text(text: &str) -> Result<BigInt, BigIntError> {
        BigInt::parse_prefix(text).map(|(value, _)| value)
    }

    /// Like [`BigInt::from_text`], also returning the number of bytes
    /// consumed.
    pub fn parse_prefix(text: &str) -> Result<(BigInt, usize), BigIntError> {
        let bytes = text.as_bytes();
        let mut index = 0;
        let neg = bytes.first() == Some(&b'-');
        if neg {
            index += 1;
        }

        let mut radix = 10;
        if bytes.len() > index + 2 && bytes[index] == b'0' {
            if let Some(prefixed) = prefix_radix(bytes[index + 1]) {
                radix = prefixed;
                index += 2;
            }
        }

        let (mut words, consumed) = accumulate_digits(&bytes[index..], radix)?;
        index += consumed;

        if matches!(bytes.get(index), Some(b'e' | b'E')) {
            if radix != 10 {
                return Err(BigIntError::MalformedLiteral);
            }
            let (exponent, consumed) = parse_exponent(&bytes[index + 1..])?;
            index += 1 + consumed;
            let mantissa = BigInt::from_words(false, words);
            let scaled = if mantissa.is_zero() {
                mantissa
            } else {
                &mantissa * &BigInt::from_u64(10).pow(exponent)?
            };
            words = scaled.magnitude_words().to_vec();
        }

        Ok((BigInt::from_words(neg, words), index))
    }

    /// Parses `text` as digits in an arbitrary `radix` (2..=16), with
    /// an optional leading `-` and `_` separators but no prefix or
    /// exponent. The whole string must be digits.
    pub fn from_text_radix(text: &str, radix: u32) -> Result<BigInt, BigIntError> {
        if !(2..=16).contains(&radix) {
            return Err(BigIntError::MalformedLiteral);
        }
        let (neg, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (words, consumed) = accumulate_digits(digits.as_bytes(), radix as Word)?;
        if consumed != digits.len() {
            return Err(BigIntError::MalformedLiteral);
        }
        Ok(BigInt::from_words(neg, words))
    }
}

fn prefix_radix(byte: u8) -> Option<Word> {
    match byte {
        b'b' => Some(2),
        b'o' => Some(8),
        b'd' => Some(10),
        b'z' => Some(12),
        b'x' | b'h' => Some(16),
        _ => None,
    }
}

fn literal_prefix(base: u32) -> Option<&'static str> {
    match base {
        2 => Some("0b"),
        8 => Some("0o"),
        12 => Some("0z"),
        16 => Some("0x"),
        _ => None,
    }
}

fn digit_value(byte: u8) -> Option<Word> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as Word),
        b'a'..=b'z' => Some((byte - b'a') as Word + 10),
        b'A'..=b'Z' => Some((byte - b'A') as Word + 10),
        _ => None,
    }
}

// Reads digits of `radix` (and `_` separators) until the first byte
// that is neither. At least one digit is required.
fn accumulate_digits(bytes: &[u8], radix: Word) -> Result<(Vec<Word>, usize), BigIntError> {
    let mut words = Vec::new();
    let mut digits = 0;
    let mut consumed = 0;
    for &byte in bytes {
        if byte == b'_' {
            consumed += 1;
            continue;
        }
        match digit_value(byte) {
            Some(digit) if digit < radix => {
                mul_add_word(&mut words, radix, digit);
                digits += 1;
                consumed += 1;
            }
            _ => break,
        }
    }
    if digits == 0 {
        return Err(BigIntError::MalformedLiteral);
    }
    Ok((words, consumed))
}

// `[+] digits` after the `e`; a `-` exponent is not an integer.
fn parse_exponent(bytes: &[u8]) -> Result<(u64, usize), BigIntError> {
    let mut index = 0;
    match bytes.first() {
        Some(b'+') => index += 1,
        Some(b'-') => return Err(BigIntError::MalformedLiteral),
        _ => {}
    }
    let mut exponent: u64 = 0;
    let mut digits = 0;
    while let Some(&byte) = bytes.get(index) {
        match byte {
            b'_' => {}
            b'0'..=b'9' => {
                exponent = exponent
                    .checked_mul(10)
                    .and_then(|value| value.checked_add((byte - b'0') as u64))
                    .ok_or(BigIntError::Overflow)?;
                digits += 1;
            }
            _ => break,
        }
        index += 1;
    }
    if digits == 0 {
        return Err(BigIntError::MalformedLiteral);
    }
    Ok((exponent, index))
}

// Repeated division by `base`, least significant digit first, then
// reversed.
fn format_magnitude(words: &[Word], base: u32) -> String {
    if words.is_empty() {
        return String::from("0");
    }
    let mut digits = Vec::new();
    let mut rest = words.to_vec();
    while !rest.is_empty() {
        let (quotient, digit) = div_rem_word(&rest, base as Word);
        digits.push(DIGITS[digit as usize]);
        rest = quotient;
        while rest.last() == Some(&0) {
            rest.pop();
        }
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

impl FromStr for BigInt {
    type Err = BigIntError;

    /// Strict parse: the whole string must be one literal.
    fn from_str(text: &str) -> Result<BigInt, BigIntError> {
        let (value, consumed) = BigInt::parse_prefix(text)?;
        if consumed != text.len() {
            return Err(BigIntError::MalformedLiteral);
        }
        Ok(value)
    }
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for BigInt {
            fn from(value: $ty) -> BigInt {
                BigInt::from_u64(value as u64)
            }
        }
    )*};
}

macro_rules! from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for BigInt {
            fn from(value: $ty) -> BigInt {
                BigInt::from_i64(value as i64)
            }
        }
    )*};
}

from_unsigned!(u8, u16, u32, u64, usize);
from_signed!(i8, i16, i32, i64, isize);

impl From<u128> for BigInt {
    fn from(value: u128) -> BigInt {
        BigInt::from_u128(value)
    }
}

impl From<i128> for BigInt {
    fn from(value: i128) -> BigInt {
        BigInt::from_i128(value)
    }
}

impl TryFrom<&BigInt> for u64 {
    type Error = BigIntError;

    fn try_from(value: &BigInt) -> Result<u64, BigIntError> {
        value.to_u64()
    }
}

impl TryFrom<&BigInt> for i64 {
    type Error = BigIntError;

    fn try_from(value: &BigInt) -> Result<i64, BigIntError> {
        value.to_i64()
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(
            !self.neg,
            "",
            &format_magnitude(self.magnitude_words(), 10),
        )
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::LowerHex for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(
            !self.neg,
            "0x",
            &format_magnitude(self.magnitude_words(), 16),
        )
    }
}

impl fmt::Octal for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(
            !self.neg,
            "0o",
            &format_magnitude(self.magnitude_words(), 8),
        )
    }
}

impl fmt::Binary for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad_integral(
            !self.neg,
            "0b",
            &format_magnitude(self.magnitude_words(), 2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn native_round_trips() {
        for value in [0, 1, 42, u64::MAX] {
            assert_eq!(BigInt::from_u64(value).to_u64(), Ok(value));
        }
        for value in [0, -1, 1, i64::MIN, i64::MAX] {
            assert_eq!(BigInt::from_i64(value).to_i64(), Ok(value));
        }
        for value in [0, -1, i128::MIN, i128::MAX] {
            assert_eq!(BigInt::from_i128(value).to_i128(), Ok(value));
        }
        assert_eq!(BigInt::from_u128(u128::MAX).to_u128(), Ok(u128::MAX));
    }

    #[test]
    fn native_conversion_failures() {
        assert_eq!(BigInt::from_i64(-1).to_u64(), Err(BigIntError::Negative));
        assert_eq!(BigInt::from_u128(1 << 64).to_u64(), Err(BigIntError::Overflow));
        assert_eq!(BigInt::from_u64(1 << 63).to_i64(), Err(BigIntError::Overflow));
        assert_eq!(
            (-BigInt::from_u64(1 << 63) - BigInt::one()).to_i64(),
            Err(BigIntError::Overflow)
        );
        assert!(!BigInt::from_u64(u64::MAX).fits_i64());
        assert!(BigInt::from_u64(u64::MAX).fits_u64());
        assert!(!BigInt::from_i64(-1).fits_u64());
        assert_eq!(
            (BigInt::from_u128(u128::MAX) + BigInt::one()).to_u128(),
            Err(BigIntError::Overflow)
        );
    }

    #[test]
    fn parses_prefixes_separators_and_exponents() {
        assert_eq!(BigInt::from_text("0x10"), Ok(BigInt::from(16)));
        assert_eq!(BigInt::from_text("0h1F"), Ok(BigInt::from(31)));
        assert_eq!(BigInt::from_text("0b1010"), Ok(BigInt::from(10)));
        assert_eq!(BigInt::from_text("0o777"), Ok(BigInt::from(511)));
        assert_eq!(BigInt::from_text("0d99"), Ok(BigInt::from(99)));
        assert_eq!(BigInt::from_text("0z10"), Ok(BigInt::from(12)));
        assert_eq!(BigInt::from_text("1_000"), Ok(BigInt::from(1000)));
        assert_eq!(BigInt::from_text("2e3"), Ok(BigInt::from(2000)));
        assert_eq!(BigInt::from_text("2E+3"), Ok(BigInt::from(2000)));
        assert_eq!(BigInt::from_text("-5"), Ok(BigInt::from(-5)));
        assert_eq!(
            BigInt::from_text("1e30"),
            Ok(BigInt::from(1_000_000_000_000_000_000_000_000_000_000u128))
        );
    }

    #[test]
    fn parsing_stops_at_first_foreign_byte() {
        assert_eq!(BigInt::parse_prefix("12abc"), Ok((BigInt::from(12), 2)));
        assert_eq!(BigInt::parse_prefix("0b102"), Ok((BigInt::from(2), 4)));
        assert_eq!(BigInt::parse_prefix("0x"), Ok((BigInt::ZERO, 1)));
        assert_eq!("0x".parse::<BigInt>(), Err(BigIntError::MalformedLiteral));
        assert_eq!("12abc".parse::<BigInt>(), Err(BigIntError::MalformedLiteral));
        assert_eq!("0xff".parse::<BigInt>(), Ok(BigInt::from(255)));
    }

    #[test]
    fn malformed_literals() {
        assert_eq!(BigInt::from_text(""), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("-"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("0x_"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("_"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("1e-3"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("1e"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("0b1e1"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("0o7E2"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("--1"), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text("1e99999999999"), Err(BigIntError::Overflow));
    }

    #[test]
    fn abbreviates_huge_values() {
        assert_eq!(BigInt::from(-12_345).to_text_abbreviated(), "-12345");
        let just_below = BigInt::ONE << (ABBREVIATE_BITS - 1);
        assert_eq!(just_below.to_text_abbreviated(), just_below.to_text(10));

        let ten = BigInt::from(10);
        assert_eq!(ten.pow(150).map(|v| v.to_text_abbreviated()), Ok(String::from("~ 1.000e150")));
        assert_eq!((-(BigInt::ONE << 1000)).to_text_abbreviated(), "~ -1.071e301");
        assert_eq!((BigInt::ONE << 65_536).to_text_abbreviated(), "~ 2.003e19728");
        let nines = &ten.pow(400).expect("pow") - &BigInt::ONE;
        assert_eq!(nines.to_text_abbreviated(), "~ 9.999e399");
    }

    #[test]
    fn decimal_exponents_are_bounded() {
        assert_eq!(BigInt::from_text("1e300000000"), Err(BigIntError::Overflow));
        assert_eq!(BigInt::from_text("1e19729"), Err(BigIntError::Overflow));
        assert_eq!(
            BigInt::from_text("1e19728").map(|value| value.bit_len()),
            Ok(65_535)
        );
        assert_eq!(BigInt::from_text("0e300000000"), Ok(BigInt::ZERO));
    }

    #[test]
    fn formats_in_any_base() {
        let value = BigInt::from(255);
        assert_eq!(value.to_text(16), "ff");
        assert_eq!(value.to_text(2), "11111111");
        assert_eq!(BigInt::from(-255).to_text(10), "-255");
        assert_eq!(BigInt::ZERO.to_text(7), "0");
        assert_eq!(BigInt::from(-16).to_literal(16), "-0x10");
        assert_eq!(BigInt::from(144).to_literal(12), "0z100");
        assert_eq!(BigInt::from(9).to_literal(3), "100");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn to_text_rejects_large_base() {
        let _ = BigInt::from(1).to_text(17);
    }

    #[test]
    fn formatting_traits() {
        let value = BigInt::from(-255);
        assert_eq!(format!("{value}"), "-255");
        assert_eq!(format!("{value:x}"), "-ff");
        assert_eq!(format!("{value:#x}"), "-0xff");
        assert_eq!(format!("{:#b}", BigInt::from(5)), "0b101");
        assert_eq!(format!("{:o}", BigInt::from(8)), "10");
        assert_eq!(format!("{:>6}", BigInt::from(42)), "    42");
        assert_eq!(format!("{:?}", BigInt::from_u128(1 << 64)), "18446744073709551616");
    }

    #[test]
    fn radix_text_round_trip() {
        let value = BigInt::from_u128(0xdead_beef_cafe_babe_0123_4567_89ab_cdef);
        for radix in 2..=16 {
            let text = value.negate().to_text(radix);
            assert_eq!(BigInt::from_text_radix(&text, radix), Ok(value.negate()));
        }
        assert_eq!(BigInt::from_text_radix("12", 2), Err(BigIntError::MalformedLiteral));
        assert_eq!(BigInt::from_text_radix("1", 17), Err(BigIntError::MalformedLiteral));
    }

    #[test]
    fn float_conversion() {
        assert_eq!(BigInt::from(-3).to_f64(), -3.0);
        assert_eq!(BigInt::from_u128(1 << 64).to_f64(), 18446744073709551616.0);
        assert_eq!(BigInt::one().shl_big(&BigInt::from(2000)).map(|v| v.to_f64()), Ok(f64::INFINITY));
    }
}
