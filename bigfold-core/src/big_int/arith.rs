//! Addition, subtraction, multiplication, shifts and powers.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Neg, Shl, ShlAssign, Shr, ShrAssign};

use super::word::{self, WORD_BITS, Word};
use super::{BigInt, Words, cmp_magnitude};
use crate::error::BigIntError;

/// Largest left shift accepted from a `BigInt` shift amount.
pub const MAX_SHIFT: u64 = 1 << 16;

/// Widest result [`BigInt::pow`] produces, the width of `1 << MAX_SHIFT`.
pub const MAX_POW_BITS: u64 = MAX_SHIFT + 1;

/// `a + b` over magnitudes. The result has one spare word for the
/// final carry and is not trimmed.
pub(crate) fn add_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut out = Vec::with_capacity(long.len() + 1);
    let mut carry = false;
    for (i, &digit) in long.iter().enumerate() {
        let other = short.get(i).copied().unwrap_or(0);
        let (sum, c) = word::add_with_carry(digit, other, carry);
        out.push(sum);
        carry = c;
    }
    out.push(carry as Word);
    out
}

/// `a - b` over magnitudes, for `a >= b`.
pub(crate) fn sub_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    debug_assert!(cmp_magnitude(a, b) != Ordering::Less);
    let mut out = Vec::with_capacity(a.len());
    let mut borrow = false;
    for (i, &digit) in a.iter().enumerate() {
        let other = b.get(i).copied().unwrap_or(0);
        let (diff, br) = word::sub_with_borrow(digit, other, borrow);
        out.push(diff);
        borrow = br;
    }
    debug_assert!(!borrow);
    out
}

/// Schoolbook product of two magnitudes, `a.len() + b.len()` words.
pub(crate) fn mul_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    let mut out = vec![0; a.len() + b.len()];
    for (j, &multiplier) in b.iter().enumerate() {
        if multiplier == 0 {
            continue;
        }
        let mut carry = 0;
        for (i, &digit) in a.iter().enumerate() {
            let (low, high) = word::mul_add_carry(digit, multiplier, out[i + j], carry);
            out[i + j] = low;
            carry = high;
        }
        out[j + a.len()] = carry;
    }
    out
}

/// `words = words * multiplier + addend`, in place.
pub(crate) fn mul_add_word(words: &mut Vec<Word>, multiplier: Word, addend: Word) {
    let mut carry = addend;
    for digit in words.iter_mut() {
        let (low, high) = word::mul_add_carry(*digit, multiplier, 0, carry);
        *digit = low;
        carry = high;
    }
    if carry != 0 {
        words.push(carry);
    }
}

/// Shifts a magnitude left by `bits`.
pub(crate) fn shl_magnitude(a: &[Word], bits: u64) -> Vec<Word> {
    if a.is_empty() {
        return Vec::new();
    }
    let word_shift = (bits / WORD_BITS as u64) as usize;
    let bit_shift = (bits % WORD_BITS as u64) as u32;

    let mut out = Vec::with_capacity(word_shift + a.len() + 1);
    out.resize(word_shift, 0);
    if bit_shift == 0 {
        out.extend_from_slice(a);
    } else {
        let mut carry = 0;
        for &digit in a {
            out.push((digit << bit_shift) | carry);
            carry = digit >> (WORD_BITS - bit_shift);
        }
        out.push(carry);
    }
    out
}

/// Shifts a magnitude right by `bits`, discarding the low bits.
pub(crate) fn shr_magnitude(a: &[Word], bits: u64) -> Vec<Word> {
    let word_shift = bits / WORD_BITS as u64;
    if word_shift >= a.len() as u64 {
        return Vec::new();
    }
    let rest = &a[word_shift as usize..];
    let bit_shift = (bits % WORD_BITS as u64) as u32;
    if bit_shift == 0 {
        return rest.to_vec();
    }
    rest.iter()
        .enumerate()
        .map(|(i, &digit)| {
            let high = rest
                .get(i + 1)
                .map_or(0, |next| next << (WORD_BITS - bit_shift));
            (digit >> bit_shift) | high
        })
        .collect()
}

/// Adds two signed magnitudes given as borrowed views.
///
/// Subtraction goes through here with the right-hand sign flipped, so
/// neither operand is ever copied to change its sign.
fn add_signed(lhs_neg: bool, lhs: &[Word], rhs_neg: bool, rhs: &[Word]) -> BigInt {
    if rhs.is_empty() {
        return BigInt::from_words(lhs_neg, lhs.to_vec());
    }
    if lhs.is_empty() {
        return BigInt::from_words(rhs_neg, rhs.to_vec());
    }

    if let ([a], [b]) = (lhs, rhs) {
        if lhs_neg == rhs_neg {
            let (sum, carry) = word::add_with_overflow(*a, *b);
            return if carry {
                BigInt::from_words(lhs_neg, vec![sum, 1])
            } else {
                BigInt::from_word(lhs_neg, sum)
            };
        }
        return match a.cmp(b) {
            Ordering::Equal => BigInt::ZERO,
            Ordering::Greater => BigInt::from_word(lhs_neg, a - b),
            Ordering::Less => BigInt::from_word(rhs_neg, b - a),
        };
    }

    if lhs_neg == rhs_neg {
        return BigInt::from_words(lhs_neg, add_magnitudes(lhs, rhs));
    }
    match cmp_magnitude(lhs, rhs) {
        Ordering::Equal => BigInt::ZERO,
        Ordering::Greater => BigInt::from_words(lhs_neg, sub_magnitudes(lhs, rhs)),
        Ordering::Less => BigInt::from_words(rhs_neg, sub_magnitudes(rhs, lhs)),
    }
}

impl BigInt {
    fn add_ref(&self, other: &BigInt) -> BigInt {
        add_signed(
            self.neg,
            self.magnitude_words(),
            other.neg,
            other.magnitude_words(),
        )
    }

    fn sub_ref(&self, other: &BigInt) -> BigInt {
        add_signed(
            self.neg,
            self.magnitude_words(),
            !other.neg,
            other.magnitude_words(),
        )
    }

    fn mul_ref(&self, other: &BigInt) -> BigInt {
        if self.is_zero() || other.is_zero() {
            return BigInt::ZERO;
        }
        let neg = self.neg != other.neg;
        if let (Words::Inline(a), Words::Inline(b)) = (&self.words, &other.words) {
            let (low, high) = word::mul_wide(*a, *b);
            return if high == 0 {
                BigInt::from_word(neg, low)
            } else {
                BigInt::from_words(neg, vec![low, high])
            };
        }
        BigInt::from_words(
            neg,
            mul_magnitudes(self.magnitude_words(), other.magnitude_words()),
        )
    }

    /// Multiplies by a single word without building a second `BigInt`.
    pub fn mul_word(&self, multiplier: Word) -> BigInt {
        if self.is_zero() || multiplier == 0 {
            return BigInt::ZERO;
        }
        let mut words = self.magnitude_words().to_vec();
        mul_add_word(&mut words, multiplier, 0);
        BigInt::from_words(self.neg, words)
    }

    /// `self` raised to `exponent` by square-and-multiply.
    ///
    /// A result wider than [`MAX_POW_BITS`] is rejected with
    /// [`BigIntError::Overflow`]. Zero and `±1` accept any exponent.
    pub fn pow(&self, exponent: u64) -> Result<BigInt, BigIntError> {
        self.pow_within(exponent, MAX_POW_BITS)
    }

    pub(crate) fn pow_within(&self, exponent: u64, max_bits: u64) -> Result<BigInt, BigIntError> {
        // `|self| >= 2` yields at least `(bit_len - 1) * exponent + 1` bits.
        let bits = self.bit_len();
        if bits > 1 && (bits - 1).saturating_mul(exponent) >= max_bits {
            return Err(BigIntError::Overflow);
        }
        let mut result = BigInt::ONE;
        let mut base = self.clone();
        let mut remaining = exponent;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul_ref(&base);
                check_pow_width(&result, max_bits)?;
            }
            remaining >>= 1;
            // Every squared base is a factor of the final result.
            if remaining > 0 {
                base = base.mul_ref(&base);
                check_pow_width(&base, max_bits)?;
            }
        }
        Ok(result)
    }

    fn shl_bits(&self, bits: u64) -> BigInt {
        if bits == 0 || self.is_zero() {
            return self.clone();
        }
        if let Words::Inline(word) = self.words {
            if bits < WORD_BITS as u64 && word.leading_zeros() as u64 >= bits {
                return BigInt::from_word(self.neg, word << bits);
            }
        }
        BigInt::from_words(self.neg, shl_magnitude(self.magnitude_words(), bits))
    }

    fn shr_bits(&self, bits: u64) -> BigInt {
        if bits == 0 || self.is_zero() {
            return self.clone();
        }
        if let Words::Inline(word) = self.words {
            let shifted = if bits >= WORD_BITS as u64 { 0 } else { word >> bits };
            return BigInt::from_word(self.neg, shifted);
        }
        BigInt::from_words(self.neg, shr_magnitude(self.magnitude_words(), bits))
    }

    /// Left shift by an amount held in another `BigInt`.
    ///
    /// The amount must be non-negative and fit one word; non-zero
    /// values may not be shifted by more than [`MAX_SHIFT`] bits.
    pub fn shl_big(&self, amount: &BigInt) -> Result<BigInt, BigIntError> {
        let bits = shift_amount(amount)?;
        if bits > MAX_SHIFT && !self.is_zero() {
            return Err(BigIntError::ShiftOutOfRange);
        }
        Ok(self.shl_bits(bits))
    }

    /// Right shift of the magnitude by an amount held in another
    /// `BigInt`. The sign of `self` is kept.
    pub fn shr_big(&self, amount: &BigInt) -> Result<BigInt, BigIntError> {
        Ok(self.shr_bits(shift_amount(amount)?))
    }
}

fn shift_amount(amount: &BigInt) -> Result<u64, BigIntError> {
    amount.to_u64().map_err(|_| BigIntError::ShiftOutOfRange)
}

fn check_pow_width(value: &BigInt, max_bits: u64) -> Result<(), BigIntError> {
    if value.bit_len() > max_bits {
        return Err(BigIntError::Overflow);
    }
    Ok(())
}

forward_binop!(Add, add, AddAssign, add_assign, BigInt::add_ref);
forward_binop!(Sub, sub, SubAssign, sub_assign, BigInt::sub_ref);
forward_binop!(Mul, mul, MulAssign, mul_assign, BigInt::mul_ref);

impl Neg for BigInt {
    type Output = BigInt;

    fn neg(mut self) -> BigInt {
        self.neg = !self.neg;
        self.normalize();
        self
    }
}

impl Neg for &BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        self.negate()
    }
}

impl Shl<u64> for &BigInt {
    type Output = BigInt;

    fn shl(self, bits: u64) -> BigInt {
        self.shl_bits(bits)
    }
}

impl Shl<u64> for BigInt {
    type Output = BigInt;

    fn shl(self, bits: u64) -> BigInt {
        self.shl_bits(bits)
    }
}

impl ShlAssign<u64> for BigInt {
    fn shl_assign(&mut self, bits: u64) {
        *self = self.shl_bits(bits);
    }
}

impl Shr<u64> for &BigInt {
    type Output = BigInt;

    fn shr(self, bits: u64) -> BigInt {
        self.shr_bits(bits)
    }
}

impl Shr<u64> for BigInt {
    type Output = BigInt;

    fn shr(self, bits: u64) -> BigInt {
        self.shr_bits(bits)
    }
}

impl ShrAssign<u64> for BigInt {
    fn shr_assign(&mut self, bits: u64) {
        *self = self.shr_bits(bits);
    }
}
