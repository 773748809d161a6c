//! Truncating and Euclidean division.
//!
//! Both flavours sit on [`div_rem_magnitudes`], which divides unsigned
//! magnitudes: a single-word divisor is handled word by word with
//! [`divide_wide`], anything wider goes through Knuth's Algorithm D
//! (TAOCP vol. 2, 4.3.1).

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;

use super::arith::{shl_magnitude, shr_magnitude};
use super::word::{self, Word, divide_wide, leading_zero_count};
use super::{BigInt, Words, cmp_magnitude};
use crate::error::BigIntError;

/// Divides a magnitude by a single non-zero word.
pub(crate) fn div_rem_word(dividend: &[Word], divisor: Word) -> (Vec<Word>, Word) {
    debug_assert!(divisor != 0);
    let mut quotient = vec![0; dividend.len()];
    let mut remainder = 0;
    for (slot, &digit) in quotient.iter_mut().zip(dividend).rev() {
        let (q, r) = divide_wide(remainder, digit, divisor);
        *slot = q;
        remainder = r;
    }
    (quotient, remainder)
}

/// Unsigned quotient and remainder of two magnitudes. Neither result
/// is trimmed.
pub(crate) fn div_rem_magnitudes(
    dividend: &[Word],
    divisor: &[Word],
) -> Result<(Vec<Word>, Vec<Word>), BigIntError> {
    if divisor.is_empty() {
        return Err(BigIntError::DivisionByZero);
    }
    if divisor == [1] {
        return Ok((dividend.to_vec(), Vec::new()));
    }
    match cmp_magnitude(dividend, divisor) {
        Ordering::Less => return Ok((Vec::new(), dividend.to_vec())),
        Ordering::Equal => return Ok((vec![1], Vec::new())),
        Ordering::Greater => {}
    }
    if let [single] = divisor {
        let (quotient, remainder) = div_rem_word(dividend, *single);
        return Ok((quotient, vec![remainder]));
    }
    Ok(div_rem_knuth(dividend, divisor))
}

// Algorithm D for `divisor.len() >= 2` and `dividend > divisor`.
fn div_rem_knuth(dividend: &[Word], divisor: &[Word]) -> (Vec<Word>, Vec<Word>) {
    let n = divisor.len();
    let m = dividend.len() - n;

    // D1: normalize so the top divisor word has its high bit set. The
    // shifted dividend gets one extra word so every step sees n + 1
    // words.
    let shift = leading_zero_count(divisor[n - 1]) as u64;
    let v = shl_magnitude(divisor, shift);
    let v = &v[..n];
    let mut u = shl_magnitude(dividend, shift);
    u.resize(dividend.len() + 1, 0);

    let v_top = v[n - 1];
    let v_next = v[n - 2];
    let mut quotient = vec![0; m + 1];

    for j in (0..=m).rev() {
        // D3: estimate the quotient word from the top two dividend
        // words, then refine it against the second divisor word.
        let u_top = u[j + n];
        let u_mid = u[j + n - 1];
        let u_low = u[j + n - 2];

        let (mut q_hat, mut r_hat, mut r_overflow) = if u_top >= v_top {
            let (r, carry) = word::add_with_overflow(u_mid, v_top);
            (Word::MAX, r, carry)
        } else {
            let (q, r) = divide_wide(u_top, u_mid, v_top);
            (q, r, false)
        };
        while !r_overflow {
            let (low, high) = word::mul_wide(q_hat, v_next);
            if (high, low) <= (r_hat, u_low) {
                break;
            }
            q_hat -= 1;
            let (r, carry) = word::add_with_overflow(r_hat, v_top);
            r_hat = r;
            r_overflow = carry;
        }

        // D4: u[j..=j+n] -= q_hat * v
        let mut carry: Word = 0;
        let mut borrow = false;
        for i in 0..n {
            let (low, high) = word::mul_add_carry(q_hat, v[i], 0, carry);
            carry = high;
            let (diff, br) = word::sub_with_borrow(u[i + j], low, borrow);
            u[i + j] = diff;
            borrow = br;
        }
        let (diff, br) = word::sub_with_borrow(u[j + n], carry, borrow);
        u[j + n] = diff;

        // D5/D6: the estimate was one too large; add the divisor back.
        if br {
            q_hat -= 1;
            let mut carry = false;
            for i in 0..n {
                let (sum, c) = word::add_with_carry(u[i + j], v[i], carry);
                u[i + j] = sum;
                carry = c;
            }
            u[j + n] = u[j + n].wrapping_add(carry as Word);
        }

        quotient[j] = q_hat;
    }

    // D8: the remainder is the low n words, shifted back.
    let remainder = shr_magnitude(&u[..n], shift);
    (quotient, remainder)
}

impl BigInt {
    /// Truncating division: the quotient is rounded toward zero and the
    /// remainder takes the sign of `self`.
    ///
    /// `self == divisor * quotient + remainder` and
    /// `|remainder| < |divisor|`.
    pub fn quo_rem(&self, divisor: &BigInt) -> Result<(BigInt, BigInt), BigIntError> {
        if let (Words::Inline(a), Words::Inline(b)) = (&self.words, &divisor.words) {
            if *b == 0 {
                return Err(BigIntError::DivisionByZero);
            }
            return Ok((
                BigInt::from_word(self.neg != divisor.neg, a / b),
                BigInt::from_word(self.neg, a % b),
            ));
        }
        let (quotient, remainder) =
            div_rem_magnitudes(self.magnitude_words(), divisor.magnitude_words())?;
        Ok((
            BigInt::from_words(self.neg != divisor.neg, quotient),
            BigInt::from_words(self.neg, remainder),
        ))
    }

    pub fn quo(&self, divisor: &BigInt) -> Result<BigInt, BigIntError> {
        self.quo_rem(divisor).map(|(quotient, _)| quotient)
    }

    pub fn rem(&self, divisor: &BigInt) -> Result<BigInt, BigIntError> {
        self.quo_rem(divisor).map(|(_, remainder)| remainder)
    }

    /// Euclidean division: the remainder is always non-negative.
    pub fn div_rem_euclid(&self, divisor: &BigInt) -> Result<(BigInt, BigInt), BigIntError> {
        let (mut quotient, mut remainder) = self.quo_rem(divisor)?;
        if remainder.is_negative() {
            if divisor.is_negative() {
                quotient += &BigInt::ONE;
                remainder -= divisor;
            } else {
                quotient -= &BigInt::ONE;
                remainder += divisor;
            }
        }
        Ok((quotient, remainder))
    }

    pub fn div_euclid(&self, divisor: &BigInt) -> Result<BigInt, BigIntError> {
        self.div_rem_euclid(divisor).map(|(quotient, _)| quotient)
    }

    pub fn rem_euclid(&self, divisor: &BigInt) -> Result<BigInt, BigIntError> {
        self.div_rem_euclid(divisor).map(|(_, remainder)| remainder)
    }
}

// The operator forms panic on a zero divisor, like the primitive
// integer operators do.
fn quo_or_panic(dividend: &BigInt, divisor: &BigInt) -> BigInt {
    match dividend.quo(divisor) {
        Ok(quotient) => quotient,
        Err(err) => panic!("attempt to divide: {err}"),
    }
}

fn rem_or_panic(dividend: &BigInt, divisor: &BigInt) -> BigInt {
    match dividend.rem(divisor) {
        Ok(remainder) => remainder,
        Err(err) => panic!("attempt to calculate the remainder: {err}"),
    }
}

forward_binop!(Div, div, DivAssign, div_assign, quo_or_panic);
forward_binop!(Rem, rem, RemAssign, rem_assign, rem_or_panic);

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i128) -> BigInt {
        BigInt::from(value)
    }

    fn hex(text: &str) -> BigInt {
        BigInt::from_text_radix(text, 16).expect("hex literal")
    }

    fn check_identity(x: &BigInt, y: &BigInt) {
        let (q, r) = x.quo_rem(y).expect("non-zero divisor");
        assert_eq!(&(y * &q) + &r, *x, "{x} / {y}");
        assert!(r.abs() < y.abs(), "{x} % {y} = {r}");
        assert!(r.is_zero() || r.is_negative() == x.is_negative());
    }

    #[test]
    fn truncating_signs() {
        assert_eq!(int(-7).quo_rem(&int(2)), Ok((int(-3), int(-1))));
        assert_eq!(int(7).quo_rem(&int(-2)), Ok((int(-3), int(1))));
        assert_eq!(int(-7).quo_rem(&int(-2)), Ok((int(3), int(-1))));
        assert_eq!(int(-6).quo_rem(&int(2)), Ok((int(-3), BigInt::ZERO)));
        assert!(!int(-6).rem(&int(2)).expect("rem").is_negative());
    }

    #[test]
    fn euclidean_signs() {
        assert_eq!(int(-7).div_rem_euclid(&int(2)), Ok((int(-4), int(1))));
        assert_eq!(int(-7).div_rem_euclid(&int(-2)), Ok((int(4), int(1))));
        assert_eq!(int(7).div_rem_euclid(&int(-2)), Ok((int(-3), int(1))));
        assert_eq!(int(7).rem_euclid(&int(2)), Ok(int(1)));
        assert_eq!(int(-(1 << 80)).div_euclid(&int(3)), Ok(int(-(1 << 80) / 3 - 1)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(int(1).quo_rem(&BigInt::ZERO), Err(BigIntError::DivisionByZero));
        assert_eq!(int(1 << 100).quo(&BigInt::ZERO), Err(BigIntError::DivisionByZero));
        assert_eq!(BigInt::ZERO.rem_euclid(&BigInt::ZERO), Err(BigIntError::DivisionByZero));
    }

    #[test]
    fn operator_forms() {
        let mut x = int(-(1 << 90) - 5);
        assert_eq!(&x / &int(1 << 45), int((-(1 << 90) - 5) / (1 << 45)));
        assert_eq!(&x % int(1 << 45), int((-(1 << 90) - 5) % (1 << 45)));
        x /= int(-3);
        assert_eq!(x, int(((1 << 90) + 5) / 3));
        x %= &int(1000);
        assert_eq!(x, int((((1 << 90) + 5) / 3) % 1000));
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn operator_division_by_zero_panics() {
        let _ = int(1) / BigInt::ZERO;
    }

    #[test]
    fn fast_paths() {
        let big = int(-(1 << 100) - 12345);
        assert_eq!(big.quo_rem(&int(1)), Ok((big.clone(), BigInt::ZERO)));
        assert_eq!(big.quo_rem(&int(-1)), Ok((-&big, BigInt::ZERO)));
        assert_eq!(int(5).quo_rem(&big), Ok((BigInt::ZERO, int(5))));
        assert_eq!(big.quo_rem(&big), Ok((int(1), BigInt::ZERO)));
        assert_eq!(big.quo_rem(&-&big), Ok((int(-1), BigInt::ZERO)));
    }

    #[test]
    fn single_word_divisor() {
        let raw: i128 = 0x1234_5678_9abc_def0_0fed_cba9_8765_4321;
        let x = int(raw);
        assert_eq!(x.quo_rem(&int(10)), Ok((int(raw / 10), int(raw % 10))));
        check_identity(&x, &int(u64::MAX as i128));
        check_identity(&-&x, &int(7));
    }

    #[test]
    fn knuth_division() {
        let x = hex("fffffffffffffffffffffffffffffffffffffffffffffffe");
        let y = hex("ffffffffffffffffffffffffffffffff");
        check_identity(&x, &y);

        let x = hex("1000000000000000000000000000000000000000000000000");
        let y = hex("100000000000000000000000000000001");
        check_identity(&x, &y);
        check_identity(&-&x, &y);
        check_identity(&x, &-&y);

        // Divisors whose top word needs normalizing, and estimates that
        // overshoot and need the add-back step.
        let x = hex("7fffffff800000010000000000000000");
        let y = hex("800000008000000200000005");
        check_identity(&x, &y);
        let x = hex("8000000000000000000000000000000000000000000000000000000000000000");
        let y = hex("80000000000000000000000000000001");
        check_identity(&x, &y);
        let x = hex("3fffffffffffffffc00000000000000000000000000000000");
        let y = hex("1fffffffffffffffffffffffffffffffe");
        check_identity(&x, &y);

        let (q, r) = x.quo_rem(&y).expect("quo_rem");
        assert_eq!(q, hex("1fffffffffffffffe"));
        assert_eq!(r, hex("3fffffffffffffffc"));
    }

    #[test]
    fn known_quotient() {
        let ten = int(10);
        let x = ten.pow(40).expect("pow");
        let y = ten.pow(20).expect("pow");
        assert_eq!(x.quo_rem(&y), Ok((y.clone(), BigInt::ZERO)));
        let x = &x + &int(123);
        assert_eq!(x.quo_rem(&y), Ok((y.clone(), int(123))));
    }
}
