//! Arbitrary-precision integers for compile-time constant folding.
//!
//! A [`BigInt`] is stored in sign-magnitude form: a `neg` flag and a
//! magnitude in base 2^64, least significant word first. Values that
//! fit in one word are kept inline and never touch the allocator.
//!
//! Every constructor and operation returns a normalized value:
//!
//! * zero has no words and is never negative,
//! * the most significant stored word is never zero,
//! * a single word is always stored inline.
//!
//! Because the representation is canonical, the derived `PartialEq`
//! and `Hash` agree with numeric equality.

// Implements a binary operator and its compound-assignment form for
// every owned/borrowed operand combination in terms of one
// `fn(&BigInt, &BigInt) -> BigInt`.
macro_rules! forward_binop {
    ($imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident, $body:path) => {
        impl core::ops::$imp<&BigInt> for &BigInt {
            type Output = BigInt;

            fn $method(self, other: &BigInt) -> BigInt {
                $body(self, other)
            }
        }

        impl core::ops::$imp<BigInt> for &BigInt {
            type Output = BigInt;

            fn $method(self, other: BigInt) -> BigInt {
                $body(self, &other)
            }
        }

        impl core::ops::$imp<&BigInt> for BigInt {
            type Output = BigInt;

            fn $method(self, other: &BigInt) -> BigInt {
                $body(&self, other)
            }
        }

        impl core::ops::$imp<BigInt> for BigInt {
            type Output = BigInt;

            fn $method(self, other: BigInt) -> BigInt {
                $body(&self, &other)
            }
        }

        impl core::ops::$assign_imp<&BigInt> for BigInt {
            fn $assign_method(&mut self, other: &BigInt) {
                *self = $body(self, other);
            }
        }

        impl core::ops::$assign_imp<BigInt> for BigInt {
            fn $assign_method(&mut self, other: BigInt) {
                *self = $body(self, &other);
            }
        }
    };
}

mod arith;
mod bitwise;
mod convert;
mod division;
pub mod word;

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::slice;

pub use self::arith::{MAX_POW_BITS, MAX_SHIFT};
pub use self::word::{WORD_BITS, Word};

/// Sign of a [`BigInt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

#[derive(Clone, PartialEq, Eq, Hash)]
enum Words {
    /// Zero (no words) or exactly one word.
    Inline(Word),
    /// Two or more words, most significant word non-zero.
    Heap(Vec<Word>),
}

/// Sign-magnitude arbitrary-precision integer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    neg: bool,
    words: Words,
}

impl BigInt {
    pub const ZERO: BigInt = BigInt {
        neg: false,
        words: Words::Inline(0),
    };

    pub const ONE: BigInt = BigInt {
        neg: false,
        words: Words::Inline(1),
    };

    pub fn zero() -> BigInt {
        BigInt::ZERO
    }

    pub fn one() -> BigInt {
        BigInt::ONE
    }

    /// Builds a single-word value with the given sign.
    pub(crate) fn from_word(neg: bool, word: Word) -> BigInt {
        BigInt {
            neg: neg && word != 0,
            words: Words::Inline(word),
        }
    }

    /// Takes ownership of a little-endian word vector and normalizes it.
    pub(crate) fn from_words(neg: bool, words: Vec<Word>) -> BigInt {
        let mut value = BigInt {
            neg,
            words: Words::Heap(words),
        };
        value.normalize();
        value
    }

    /// Restores the representation invariants.
    ///
    /// Trims most significant zero words, demotes a single remaining
    /// word to the inline form and clears the sign of zero. Calling it
    /// on an already normalized value does nothing.
    pub(crate) fn normalize(&mut self) {
        if let Words::Heap(words) = &mut self.words {
            while words.last() == Some(&0) {
                words.pop();
            }
            let demoted = match words.as_slice() {
                [] => Some(0),
                [single] => Some(*single),
                _ => None,
            };
            if let Some(word) = demoted {
                self.words = Words::Inline(word);
            }
        }
        if self.is_zero() {
            self.neg = false;
        }
    }

    /// Borrowed, sign-less view of the magnitude words.
    ///
    /// Zero is the empty slice; the top word of a non-empty slice is
    /// never zero.
    pub fn magnitude_words(&self) -> &[Word] {
        match &self.words {
            Words::Inline(0) => &[],
            Words::Inline(word) => slice::from_ref(word),
            Words::Heap(words) => words,
        }
    }

    /// Number of words in the magnitude; `0` for zero.
    pub fn len(&self) -> usize {
        self.magnitude_words().len()
    }

    pub fn is_zero(&self) -> bool {
        matches!(self.words, Words::Inline(0))
    }

    pub fn is_negative(&self) -> bool {
        self.neg
    }

    pub fn is_positive(&self) -> bool {
        !self.neg && !self.is_zero()
    }

    pub fn sign(&self) -> Sign {
        if self.is_zero() {
            Sign::Zero
        } else if self.neg {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> BigInt {
        BigInt {
            neg: false,
            words: self.words.clone(),
        }
    }

    /// Copy of `self` with the sign flipped. Zero stays non-negative.
    pub fn negate(&self) -> BigInt {
        let mut value = self.clone();
        value.neg = !value.neg;
        value.normalize();
        value
    }

    /// Number of significant bits in the magnitude (`0` for zero).
    pub fn bit_len(&self) -> u64 {
        match self.magnitude_words().split_last() {
            None => 0,
            Some((top, rest)) => {
                rest.len() as u64 * WORD_BITS as u64
                    + (WORD_BITS - word::leading_zero_count(*top)) as u64
            }
        }
    }

    /// Whether the magnitude has bit `index` set.
    pub fn bit(&self, index: u64) -> bool {
        let word_index = (index / WORD_BITS as u64) as usize;
        let bit_index = index % WORD_BITS as u64;
        self.magnitude_words()
            .get(word_index)
            .is_some_and(|word| (word >> bit_index) & 1 == 1)
    }

    /// Whether the value converts to `u64` without error.
    pub fn fits_u64(&self) -> bool {
        !self.neg && self.len() <= 1
    }

    /// Whether the value converts to `i64` without error.
    pub fn fits_i64(&self) -> bool {
        self.to_i64().is_ok()
    }
}

impl Default for BigInt {
    fn default() -> Self {
        BigInt::ZERO
    }
}

/// Compares two magnitudes: by length first, then from the most
/// significant word down.
pub(crate) fn cmp_magnitude(a: &[Word], b: &[Word]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        if core::ptr::eq(self, other) {
            return Ordering::Equal;
        }
        match (self.neg, other.neg) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => cmp_magnitude(self.magnitude_words(), other.magnitude_words()),
            (true, true) => cmp_magnitude(other.magnitude_words(), self.magnitude_words()),
        }
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn normalization_trims_and_demotes() {
        let value = BigInt::from_words(false, vec![7, 0, 0]);
        assert_eq!(value.len(), 1);
        assert!(matches!(value.words, Words::Inline(7)));

        let zero = BigInt::from_words(true, vec![0, 0]);
        assert!(zero.is_zero());
        assert!(!zero.is_negative());
        assert_eq!(zero, BigInt::ZERO);

        let wide = BigInt::from_words(true, vec![1, 2, 0]);
        assert_eq!(wide.magnitude_words(), &[1, 2]);
        assert!(wide.is_negative());
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut value = BigInt::from_words(false, vec![0, 5]);
        let before = value.clone();
        value.normalize();
        assert_eq!(value, before);
    }

    #[test]
    fn sign_of_values() {
        assert_eq!(BigInt::ZERO.sign(), Sign::Zero);
        assert_eq!(BigInt::from_word(false, 3).sign(), Sign::Positive);
        assert_eq!(BigInt::from_word(true, 3).sign(), Sign::Negative);
        assert_eq!(BigInt::from_word(true, 0).sign(), Sign::Zero);
    }

    #[test]
    fn ordering_by_sign_length_then_words() {
        let big = BigInt::from_words(false, vec![0, 1]);
        let small = BigInt::from_word(false, Word::MAX);
        let neg_big = big.negate();
        let neg_small = small.negate();

        assert!(small < big);
        assert!(neg_big < neg_small);
        assert!(neg_small < BigInt::ZERO);
        assert!(BigInt::ZERO < small);
        assert_eq!(big.cmp(&big), Ordering::Equal);

        let a = BigInt::from_words(false, vec![5, 9]);
        let b = BigInt::from_words(false, vec![6, 8]);
        assert!(b < a);
    }

    #[test]
    fn negate_keeps_zero_non_negative() {
        assert!(!BigInt::ZERO.negate().is_negative());
        let wide = BigInt::from_words(false, vec![1, 1]);
        assert_eq!(wide.negate().negate(), wide);
    }

    #[test]
    fn bit_queries() {
        let value = BigInt::from_words(false, vec![0b1010, 1]);
        assert_eq!(value.bit_len(), 65);
        assert!(value.bit(1));
        assert!(!value.bit(2));
        assert!(value.bit(64));
        assert!(!value.bit(500));
        assert_eq!(BigInt::ZERO.bit_len(), 0);
    }
}
