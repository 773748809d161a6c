//! Single-word primitives used by the multi-word algorithms.
//!
//! Everything here is a pure function on 64-bit words. Carries and
//! borrows are reported as `bool`, double-word products as
//! `(low, high)` pairs.

/// A single digit of a magnitude, in base 2^64.
pub type Word = u64;

/// Number of bits in a [`Word`].
pub const WORD_BITS: u32 = Word::BITS;

const HALF_BITS: u32 = WORD_BITS / 2;
const HALF_BASE: Word = 1 << HALF_BITS;
const HALF_MASK: Word = HALF_BASE - 1;

/// `a + b`, returning the wrapped sum and the carry out.
#[inline]
pub fn add_with_overflow(a: Word, b: Word) -> (Word, bool) {
    a.overflowing_add(b)
}

/// `a + b + carry`, returning the wrapped sum and the carry out.
#[inline]
pub fn add_with_carry(a: Word, b: Word, carry: bool) -> (Word, bool) {
    let (sum, c1) = a.overflowing_add(b);
    let (sum, c2) = sum.overflowing_add(carry as Word);
    (sum, c1 | c2)
}

/// `a - b`, returning the wrapped difference and the borrow out.
#[inline]
pub fn sub_with_overflow(a: Word, b: Word) -> (Word, bool) {
    a.overflowing_sub(b)
}

/// `a - b - borrow`, returning the wrapped difference and the borrow out.
#[inline]
pub fn sub_with_borrow(a: Word, b: Word, borrow: bool) -> (Word, bool) {
    let (diff, b1) = a.overflowing_sub(b);
    let (diff, b2) = diff.overflowing_sub(borrow as Word);
    (diff, b1 | b2)
}

/// Full product `a * b` as `(low, high)`.
#[inline]
pub fn mul_wide(a: Word, b: Word) -> (Word, Word) {
    let product = (a as u128) * (b as u128);
    (product as Word, (product >> WORD_BITS) as Word)
}

/// `a * b + addend + carry` as `(low, high)`. Never overflows two words.
#[inline]
pub fn mul_add_carry(a: Word, b: Word, addend: Word, carry: Word) -> (Word, Word) {
    let wide = (a as u128) * (b as u128) + (addend as u128) + (carry as u128);
    (wide as Word, (wide >> WORD_BITS) as Word)
}

#[inline]
pub fn leading_zero_count(word: Word) -> u32 {
    word.leading_zeros()
}

/// Divides the double word `high:low` by `divisor`.
///
/// The quotient must fit in one word, so callers guarantee
/// `high < divisor`. When that does not hold (including a zero
/// divisor) both quotient and remainder are `Word::MAX`.
///
/// This is the portable long division from Hacker's Delight (`divlu`):
/// the divisor is normalized so its top bit is set, then two quotient
/// half-words are estimated in base 2^32 and corrected downwards.
pub fn divide_wide(high: Word, low: Word, divisor: Word) -> (Word, Word) {
    if high >= divisor {
        return (Word::MAX, Word::MAX);
    }

    let shift = leading_zero_count(divisor);
    let divisor = divisor << shift;
    let div_hi = divisor >> HALF_BITS;
    let div_lo = divisor & HALF_MASK;

    let num_top = if shift == 0 {
        high
    } else {
        (high << shift) | (low >> (WORD_BITS - shift))
    };
    let num_low = low << shift;
    let num_1 = num_low >> HALF_BITS;
    let num_0 = num_low & HALF_MASK;

    let (q1, _) = estimate_half(num_top, num_1, div_hi, div_lo);
    let partial = num_top
        .wrapping_mul(HALF_BASE)
        .wrapping_add(num_1)
        .wrapping_sub(q1.wrapping_mul(divisor));

    let (q0, _) = estimate_half(partial, num_0, div_hi, div_lo);
    let remainder = partial
        .wrapping_mul(HALF_BASE)
        .wrapping_add(num_0)
        .wrapping_sub(q0.wrapping_mul(divisor))
        >> shift;

    (q1 * HALF_BASE + q0, remainder)
}

// One quotient half-word of `num:next / div_hi:div_lo`, corrected so it
// is never more than the true digit.
fn estimate_half(num: Word, next: Word, div_hi: Word, div_lo: Word) -> (Word, Word) {
    let mut q = num / div_hi;
    let mut rhat = num - q * div_hi;
    while q >= HALF_BASE || q * div_lo > HALF_BASE * rhat + next {
        q -= 1;
        rhat += div_hi;
        if rhat >= HALF_BASE {
            break;
        }
    }
    (q, rhat)
}

/// Same contract as [`divide_wide`], computed with the native
/// double-word integer type.
pub fn divide_wide_native(high: Word, low: Word, divisor: Word) -> (Word, Word) {
    if high >= divisor {
        return (Word::MAX, Word::MAX);
    }
    let dividend = ((high as u128) << WORD_BITS) | (low as u128);
    let divisor = divisor as u128;
    ((dividend / divisor) as Word, (dividend % divisor) as Word)
}
