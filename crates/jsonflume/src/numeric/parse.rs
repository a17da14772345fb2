//! Correctly-rounded composition of a decimal significand and exponent into
//! an IEEE-754 double.
//!
//! The parser accumulates at most 19 decimal digits into a `u64` and hands
//! the `(significand, power_of_ten)` pair to [`raise_to_pow_ten`]. Exactly
//! representable combinations take a native multiply or divide; everything
//! else goes through a 64×128-bit multiply against the shared power tables
//! with an explicit exactness bit feeding round-to-nearest-even.

use super::{
    bit_count_of_5, is_divisible_by_pow5, mul_128_shift, ExplodedFloat, NEGATIVE_POWERS_OF_TEN,
    POSITIVE_POWERS_OF_TEN,
};

/// Powers of ten exactly representable as doubles.
static POW10_F64: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Computes `significand * 10^pow_ten` with a single rounding.
///
/// The caller screens out the extremes beforehand (decimal magnitudes at or
/// beyond ±324/+310 flush to zero or infinity), so the table lookups here
/// stay in range for any 19-digit significand.
pub(crate) fn raise_to_pow_ten(significand: u64, pow_ten: i32) -> f64 {
    debug_assert!(significand > 0);
    if pow_ten.unsigned_abs() <= 22
        && (significand <= 1 << 53 || significand & 0xFFF == 0)
    {
        // Both factors are exact doubles, so one multiply or divide rounds
        // correctly on its own.
        let d = significand as f64;
        if pow_ten < 0 {
            return d / POW10_F64[-pow_ten as usize];
        }
        return d * POW10_F64[pow_ten as usize];
    }
    if pow_ten == 0 {
        return significand as f64;
    }

    let mut exploded = ExplodedFloat {
        mantissa: significand,
        exponent: 0,
    };
    exploded.normalize();
    let top_bit = 63 + exploded.exponent; // floor(log2(significand))

    let scaled;
    let exponent;
    let exact;
    if pow_ten > 0 {
        let j = bit_count_of_5(pow_ten) - 1;
        scaled = mul_128_shift(exploded.mantissa, POSITIVE_POWERS_OF_TEN[pow_ten as usize], 61);
        exponent = top_bit + j + pow_ten - 62;
        // The table entry is 5^pow_ten exactly while it fits 125 bits, and
        // the discarded product bits are zero iff 2^(j+1-lz) divides the
        // significand.
        let low_bits = j + 1 - (63 - top_bit);
        exact = pow_ten <= 53
            && (low_bits <= 0 || (low_bits < 64 && significand & ((1 << low_bits) - 1) == 0));
    } else {
        let q = -pow_ten;
        let j = bit_count_of_5(q) - 1;
        scaled = mul_128_shift(exploded.mantissa, NEGATIVE_POWERS_OF_TEN[q as usize], 61);
        exponent = top_bit - j + pow_ten - 63;
        exact = is_divisible_by_pow5(significand, q);
    }
    compose_double(scaled, exponent, exact)
}

/// Rounds `scaled(.fraction) * 2^exponent` into double bits, where `scaled`
/// has bit 62 or 63 set and the fraction is nonzero exactly when `exact` is
/// false. Handles mantissa rollover, overflow to infinity, and gradual
/// underflow through the subnormals.
fn compose_double(mut scaled: u64, mut exponent: i32, exact: bool) -> f64 {
    if scaled >> 63 == 0 {
        scaled <<= 1;
        exponent -= 1;
    }
    let mut biased = exponent + 1086;
    if biased >= 2047 {
        return f64::INFINITY;
    }
    let shift = if biased > 0 { 11 } else { 12 - biased };
    if shift > 64 {
        return 0.0;
    }
    if shift == 64 {
        // Below the smallest subnormal's magnitude; only its half-point
        // can still round up
        let half = 1u64 << 63;
        if scaled > half || (scaled == half && !exact) {
            return f64::from_bits(1);
        }
        return 0.0;
    }
    let mut mantissa = scaled >> shift;
    let remainder = scaled & ((1u64 << shift) - 1);
    let half = 1u64 << (shift - 1);
    if remainder > half || (remainder == half && (!exact || mantissa & 1 == 1)) {
        mantissa += 1;
    }
    if biased <= 0 {
        // Subnormal; a carry into bit 52 rolls into the smallest normal
        return f64::from_bits(mantissa);
    }
    if mantissa == 1 << 53 {
        mantissa >>= 1;
        biased += 1;
        if biased >= 2047 {
            return f64::INFINITY;
        }
    }
    f64::from_bits(((biased as u64) << 52) | (mantissa & ((1 << 52) - 1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_double_fast_path() {
        assert_eq!(raise_to_pow_ten(1, 0), 1.0);
        assert_eq!(raise_to_pow_ten(1012, 0), 1012.0);
        assert_eq!(raise_to_pow_ten(12, -1), 1.2);
        assert_eq!(raise_to_pow_ten(1, 22), 1e22);
        assert_eq!(raise_to_pow_ten(3, -22), 3e-22);
        assert_eq!(raise_to_pow_ten(1 << 53, 10), 9.007199254740992e25);
    }

    #[test]
    fn table_path_bit_patterns() {
        assert_eq!(raise_to_pow_ten(1, 100).to_bits(), 0x54b249ad2594c37d);
        assert_eq!(raise_to_pow_ten(1, -100).to_bits(), 0x2b2bff2ee48e0530);
        assert_eq!(raise_to_pow_ten(9007199254740993, 30).to_bits(), 0x49793e5939a08ceb);
        assert_eq!(
            raise_to_pow_ten(9223372036854775807, 0).to_bits(),
            0x43e0000000000000
        );
        assert_eq!(
            raise_to_pow_ten(17976931348623157, 292).to_bits(),
            0x7fefffffffffffff
        );
        assert_eq!(
            raise_to_pow_ten(4503599627370497, -40).to_bits(),
            0x3ae16c262777579d
        );
        assert_eq!(
            raise_to_pow_ten(123456789123456789, -200).to_bits(),
            0x19f4fbb4e842e472
        );
        assert_eq!(
            raise_to_pow_ten(1084930143755888731, 290).to_bits(),
            0x7fe34ff94a2bd05e
        );
    }

    #[test]
    fn subnormal_boundaries() {
        assert_eq!(raise_to_pow_ten(49, -325).to_bits(), 1); // 4.9e-324
        assert_eq!(raise_to_pow_ten(5, -324).to_bits(), 1);
        assert_eq!(raise_to_pow_ten(1, -323).to_bits(), 2);
        assert_eq!(raise_to_pow_ten(5, -323).to_bits(), 10);
        assert_eq!(
            raise_to_pow_ten(22250738585072014, -324).to_bits(),
            0x0010000000000000 // smallest normal
        );
        // Just under half the smallest subnormal
        assert_eq!(raise_to_pow_ten(247032822920623272u64, -341), 0.0);
    }

    #[test]
    fn overflow_to_infinity() {
        assert_eq!(raise_to_pow_ten(17976931348623159, 292), f64::INFINITY);
        assert_eq!(raise_to_pow_ten(2, 308), f64::INFINITY);
    }
}
