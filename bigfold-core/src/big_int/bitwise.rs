//! Two's-complement bitwise logic over sign-magnitude storage.
//!
//! A negative value `-v` behaves like the infinite bit pattern
//! `!(v - 1)`. Rather than materializing that pattern, every case is
//! rewritten with De Morgan's laws into an unsigned operation on
//! magnitudes, and the sign of the result is derived algebraically.
//! Below, `a` and `b` are the magnitudes of the operands and
//! `a1 = a - 1`, `b1 = b - 1`.

use alloc::vec::Vec;

use super::arith::{add_magnitudes, sub_magnitudes};
use super::word::{WORD_BITS, Word};
use super::BigInt;

fn zip_words(a: &[Word], b: &[Word], len: usize, op: impl Fn(Word, Word) -> Word) -> Vec<Word> {
    (0..len)
        .map(|i| {
            op(
                a.get(i).copied().unwrap_or(0),
                b.get(i).copied().unwrap_or(0),
            )
        })
        .collect()
}

fn and_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    zip_words(a, b, a.len().min(b.len()), |x, y| x & y)
}

fn or_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    zip_words(a, b, a.len().max(b.len()), |x, y| x | y)
}

fn xor_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    zip_words(a, b, a.len().max(b.len()), |x, y| x ^ y)
}

// `a & !b`
fn and_not_magnitudes(a: &[Word], b: &[Word]) -> Vec<Word> {
    zip_words(a, b, a.len(), |x, y| x & !y)
}

fn decrement(magnitude: &[Word]) -> Vec<Word> {
    sub_magnitudes(magnitude, &[1])
}

// `-(m + 1)`, the value whose two's-complement pattern is `!m`.
fn negative_successor(magnitude: Vec<Word>) -> BigInt {
    BigInt::from_words(true, add_magnitudes(&magnitude, &[1]))
}

fn positive(magnitude: Vec<Word>) -> BigInt {
    BigInt::from_words(false, magnitude)
}

impl BigInt {
    fn and_ref(&self, other: &BigInt) -> BigInt {
        let (a, b) = (self.magnitude_words(), other.magnitude_words());
        match (self.neg, other.neg) {
            (false, false) => positive(and_magnitudes(a, b)),
            // !a1 & !b1 == !(a1 | b1)
            (true, true) => negative_successor(or_magnitudes(&decrement(a), &decrement(b))),
            // !a1 & b == b & !a1
            (true, false) => positive(and_not_magnitudes(b, &decrement(a))),
            // a & !b1
            (false, true) => positive(and_not_magnitudes(a, &decrement(b))),
        }
    }

    fn or_ref(&self, other: &BigInt) -> BigInt {
        let (a, b) = (self.magnitude_words(), other.magnitude_words());
        match (self.neg, other.neg) {
            (false, false) => positive(or_magnitudes(a, b)),
            // !a1 | !b1 == !(a1 & b1)
            (true, true) => negative_successor(and_magnitudes(&decrement(a), &decrement(b))),
            // !a1 | b == !(a1 & !b)
            (true, false) => negative_successor(and_not_magnitudes(&decrement(a), b)),
            // a | !b1 == !(b1 & !a)
            (false, true) => negative_successor(and_not_magnitudes(&decrement(b), a)),
        }
    }

    fn xor_ref(&self, other: &BigInt) -> BigInt {
        let (a, b) = (self.magnitude_words(), other.magnitude_words());
        match (self.neg, other.neg) {
            (false, false) => positive(xor_magnitudes(a, b)),
            // !a1 ^ !b1 == a1 ^ b1
            (true, true) => positive(xor_magnitudes(&decrement(a), &decrement(b))),
            // !a1 ^ b == !(a1 ^ b)
            (true, false) => negative_successor(xor_magnitudes(&decrement(a), b)),
            (false, true) => negative_successor(xor_magnitudes(a, &decrement(b))),
        }
    }

    /// `self & !other` with two's-complement semantics.
    pub fn and_not(&self, other: &BigInt) -> BigInt {
        let (a, b) = (self.magnitude_words(), other.magnitude_words());
        match (self.neg, other.neg) {
            (false, false) => positive(and_not_magnitudes(a, b)),
            // !a1 & !!b1 == b1 & !a1
            (true, true) => positive(and_not_magnitudes(&decrement(b), &decrement(a))),
            // !a1 & !b == !(a1 | b)
            (true, false) => negative_successor(or_magnitudes(&decrement(a), b)),
            // a & !!b1 == a & b1
            (false, true) => positive(and_magnitudes(a, &decrement(b))),
        }
    }

    /// Bitwise complement restricted to `bit_count` bits.
    ///
    /// The result is the complement of the low `bit_count` bits of the
    /// two's-complement pattern of `self`, read as an unsigned number.
    /// With `is_signed` the same bits are read as a `bit_count`-wide
    /// two's-complement number instead, which is what `~x` means for a
    /// sized signed integer type. A zero width yields zero.
    pub fn bitwise_not(&self, bit_count: u64, is_signed: bool) -> BigInt {
        if bit_count == 0 {
            return BigInt::ZERO;
        }
        let unsigned = if self.neg {
            // !(-a) == a - 1
            positive(decrement(self.magnitude_words())).truncate_bits(bit_count)
        } else {
            positive(complement_words(self.magnitude_words(), bit_count))
        };
        if is_signed {
            reinterpret_signed(unsigned, bit_count)
        } else {
            unsigned
        }
    }

    /// Wraps `self` into a `bit_count`-bit integer, the way a cast to a
    /// sized integer type truncates: the low `bit_count` bits of the
    /// two's-complement pattern, read as unsigned or as signed.
    pub fn wrap(&self, bit_count: u64, is_signed: bool) -> BigInt {
        if bit_count == 0 {
            return BigInt::ZERO;
        }
        let low = self.abs().truncate_bits(bit_count);
        let unsigned = if self.neg && !low.is_zero() {
            (&BigInt::ONE << bit_count) - &low
        } else {
            low
        };
        if is_signed {
            reinterpret_signed(unsigned, bit_count)
        } else {
            unsigned
        }
    }

    /// Keeps the low `bit_count` bits of the magnitude; the sign is
    /// kept as is.
    pub fn truncate_bits(&self, bit_count: u64) -> BigInt {
        let full_words = (bit_count / WORD_BITS as u64) as usize;
        let partial = (bit_count % WORD_BITS as u64) as u32;
        let words = self.magnitude_words();
        if full_words >= words.len() {
            return self.clone();
        }
        let mut kept = words[..full_words].to_vec();
        if partial != 0 {
            kept.push(words[full_words] & low_mask(partial));
        }
        BigInt::from_words(self.neg, kept)
    }
}

fn low_mask(bits: u32) -> Word {
    if bits >= WORD_BITS {
        Word::MAX
    } else {
        (1 << bits) - 1
    }
}

// Complements `words` across `bit_count` bits: stored words are
// inverted, missing words are all ones, and the top partial word is
// masked.
fn complement_words(words: &[Word], bit_count: u64) -> Vec<Word> {
    let word_count = bit_count.div_ceil(WORD_BITS as u64) as usize;
    let mut out: Vec<Word> = (0..word_count)
        .map(|i| !words.get(i).copied().unwrap_or(0))
        .collect();
    let partial = (bit_count % WORD_BITS as u64) as u32;
    if partial != 0 {
        if let Some(top) = out.last_mut() {
            *top &= low_mask(partial);
        }
    }
    out
}

// Reads the low `bit_count` bits of a non-negative value as two's
// complement: when the top bit is set its weight counts negatively,
// so it is subtracted twice.
fn reinterpret_signed(value: BigInt, bit_count: u64) -> BigInt {
    if value.bit(bit_count - 1) {
        &value - &(&BigInt::ONE << bit_count)
    } else {
        value
    }
}

forward_binop!(BitAnd, bitand, BitAndAssign, bitand_assign, BigInt::and_ref);
forward_binop!(BitOr, bitor, BitOrAssign, bitor_assign, BigInt::or_ref);
forward_binop!(BitXor, bitxor, BitXorAssign, bitxor_assign, BigInt::xor_ref);
