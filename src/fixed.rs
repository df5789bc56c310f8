//! Q16.16 fixed-point helpers shared by the line scanner and the rotator.
//!
//! A value `v` is stored as the `i32` `round_toward_zero(v * 65536)`. Products
//! of two Q16.16 values are formed in `i64` and shifted back by [`SHIFT`], so
//! they cannot overflow for weights in `[0, ONE]`.

/// Number of fractional bits.
pub const SHIFT: u32 = 16;

/// 1.0 in Q16.16.
pub const ONE: i32 = 1 << SHIFT;

/// 0.5 in Q16.16. Added before a final shift to round to nearest.
pub const HALF: i32 = ONE >> 1;

/// Converts a fraction to Q16.16, truncating toward zero like a C cast.
#[inline(always)]
pub fn from_fraction(frac: f64) -> i32 {
    (frac * ONE as f64) as i32
}

/// Multiplies two Q16.16 values, widening to `i64` before the shift.
#[inline(always)]
pub fn mul(a: i32, b: i32) -> i32 {
    ((a as i64 * b as i64) >> SHIFT) as i32
}

/// Moves `from` toward `to` by the Q16.16 `weight`.
///
/// The shift is arithmetic, so a negative difference rounds toward negative
/// infinity exactly as the integer kernels expect.
#[inline(always)]
pub fn lerp(from: i32, to: i32, weight: i32) -> i32 {
    from + (((to - from) * weight) >> SHIFT)
}

/// Converts Q16.16 to `f64`. Only used for diagnostics.
pub fn to_f64(value: i32) -> f64 {
    value as f64 / ONE as f64
}
