//! Two's-complement (signed) interpretation of [`U256`].
//!
//! The EVM has no separate signed word type: SDIV/SMOD/SLT/SGT/SAR/SIGNEXTEND all
//! reinterpret the same 256-bit stack slot. Keeping these helpers in their own
//! module next to the unsigned type (rather than growing a parallel signed
//! bignum) is the shape this corpus's other EVM implementations use.

use crate::u256::U256;
use std::cmp::Ordering;

pub const SIGN_BIT_INDEX: usize = 255;

pub fn is_negative(value: U256) -> bool {
    value.bit(SIGN_BIT_INDEX)
}

/// Two's-complement negation: `!value + 1`.
pub fn negate(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

pub fn abs(value: U256) -> U256 {
    if is_negative(value) {
        negate(value)
    } else {
        value
    }
}

pub fn signed_cmp(a: U256, b: U256) -> Ordering {
    match (is_negative(a), is_negative(b)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.cmp(&b),
    }
}

/// SDIV: truncated signed division. Division by zero and `MIN / -1` both yield
/// `MIN` is wrong — only `MIN / -1` yields `MIN` (it doesn't fit in 256 bits
/// otherwise); division by zero yields zero.
pub fn signed_div(dividend: U256, divisor: U256) -> U256 {
    if divisor.is_zero() {
        return U256::zero();
    }
    let min = min_value();
    let neg_one = negate(U256::one());
    if dividend == min && divisor == neg_one {
        return min;
    }
    let dividend_neg = is_negative(dividend);
    let divisor_neg = is_negative(divisor);
    let abs_dividend = abs(dividend);
    let abs_divisor = abs(divisor);
    let quotient = match abs_dividend.checked_div(abs_divisor) {
        Some(q) => q,
        None => return U256::zero(),
    };
    if dividend_neg != divisor_neg {
        negate(quotient)
    } else {
        quotient
    }
}

/// SMOD: the remainder takes the sign of the dividend (truncated division),
/// matching C's `%` rather than Euclidean modulo.
pub fn signed_mod(dividend: U256, divisor: U256) -> U256 {
    if divisor.is_zero() || dividend.is_zero() {
        return U256::zero();
    }
    let abs_dividend = abs(dividend);
    let abs_divisor = abs(divisor);
    let remainder = match abs_dividend.checked_rem(abs_divisor) {
        Some(r) => r,
        None => return U256::zero(),
    };
    if is_negative(dividend) {
        negate(remainder)
    } else {
        remainder
    }
}

/// SAR: arithmetic (sign-extending) right shift. Shift amounts >= 256 saturate
/// to all-zero or all-one bits depending on the sign of `value`.
pub fn arithmetic_shift_right(value: U256, shift: U256) -> U256 {
    if shift >= U256::from(256u64) {
        return if is_negative(value) {
            U256::MAX
        } else {
            U256::zero()
        };
    }
    let shifted = value.shr(shift);
    if !is_negative(value) {
        return shifted;
    }
    // Fill in the vacated high bits with ones.
    let shift_amount = shift.as_usize();
    if shift_amount == 0 {
        return value;
    }
    let ones_mask = (!U256::zero()).shl_u32((256 - shift_amount) as u32);
    shifted | ones_mask
}

pub fn min_value() -> U256 {
    // 1 << 255
    U256::one().shl_u32(255)
}

pub fn max_value() -> U256 {
    !min_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdiv_by_zero_is_zero() {
        assert_eq!(signed_div(U256::from(10u64), U256::zero()), U256::zero());
    }

    #[test]
    fn sdiv_min_by_neg_one_is_min() {
        let min = min_value();
        let neg_one = negate(U256::one());
        assert_eq!(signed_div(min, neg_one), min);
    }

    #[test]
    fn sdiv_signs() {
        let ten = U256::from(10u64);
        let neg_ten = negate(ten);
        let three = U256::from(3u64);
        // -10 / 3 == -3 (truncated toward zero)
        assert_eq!(signed_div(neg_ten, three), negate(U256::from(3u64)));
        assert_eq!(signed_div(ten, negate(three)), negate(U256::from(3u64)));
    }

    #[test]
    fn smod_takes_dividend_sign() {
        let neg_seven = negate(U256::from(7u64));
        let three = U256::from(3u64);
        // -7 % 3 == -1
        assert_eq!(signed_mod(neg_seven, three), negate(U256::one()));
    }

    #[test]
    fn sar_of_negative_sign_extends() {
        let neg_one = negate(U256::one());
        assert_eq!(arithmetic_shift_right(neg_one, U256::from(4u64)), neg_one);
    }

    #[test]
    fn sar_shift_over_256_saturates_by_sign() {
        let neg_one = negate(U256::one());
        assert_eq!(
            arithmetic_shift_right(neg_one, U256::from(300u64)),
            U256::MAX
        );
        assert_eq!(
            arithmetic_shift_right(U256::from(5u64), U256::from(300u64)),
            U256::zero()
        );
    }

    #[test]
    fn signed_cmp_orders_negative_below_positive() {
        let neg_one = negate(U256::one());
        assert_eq!(signed_cmp(neg_one, U256::one()), Ordering::Less);
    }
}
