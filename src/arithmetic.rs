//! Scalar arithmetic kernel.
//!
//! Small pure helpers shared by the vector, matrix and transform types.
//! Anything the `f32` inherent API already covers (floor, ceil, round,
//! min, max, abs, sqrt) is used directly and not re-wrapped here.

/// Default scale factor for [`float_equals`].
///
/// Chained transform composition accumulates a few ULPs of error per
/// multiply; a scale of 4 absorbs that without masking real differences.
pub const DEFAULT_EQ_SCALE: f32 = 4.0;

/// Scale-aware relative-epsilon float comparison.
///
/// Returns `true` when `|a - b| <= eps * scale * max(1, |a|, |b|)`.
/// Never compare floats with `==` in this crate; accumulated rounding from
/// chained matrix products makes exact equality meaningless.
#[must_use]
pub fn float_equals_scaled(a: f32, b: f32, scale: f32) -> bool {
    let max_one = 1.0_f32.max(a.abs()).max(b.abs());
    (a - b).abs() <= f32::EPSILON * scale * max_one
}

/// [`float_equals_scaled`] with the default scale.
#[must_use]
pub fn float_equals(a: f32, b: f32) -> bool {
    float_equals_scaled(a, b, DEFAULT_EQ_SCALE)
}

/// Clamps `value` to the inclusive range spanned by `a` and `b`
/// (in either order).
#[must_use]
pub fn clamp(value: f32, a: f32, b: f32) -> f32 {
    value.clamp(a.min(b), a.max(b))
}

/// Wraps `value` into the half-open range `[min(a, b), max(a, b))`.
#[must_use]
pub fn wrap(value: f32, a: f32, b: f32) -> f32 {
    let min = a.min(b);
    let max = a.max(b);
    value - (max - min) * ((value - min) / (max - min)).floor()
}

/// Snaps `value` to whichever of `a` or `b` is closest.
#[must_use]
pub fn snap(value: f32, a: f32, b: f32) -> f32 {
    if (value - a).abs() < (value - b).abs() {
        a
    } else {
        b
    }
}

/// Linear interpolation between `from` and `to` at parameter `t`.
///
/// `t` is intentionally unclamped; values outside `[0, 1]` extrapolate.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Sign of `value`: `-1.0` for negative values, `1.0` otherwise.
#[must_use]
pub fn sign(value: f32) -> f32 {
    if value < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Whether `value` lies in the inclusive range spanned by `a` and `b`.
#[must_use]
pub fn is_in_range(value: f32, a: f32, b: f32) -> bool {
    a.min(b) <= value && value <= a.max(b)
}

/// Integer power by repeated multiplication.
///
/// Negative exponents divide, so `pow_i(2.0, -2) == 0.25`.
#[must_use]
pub fn pow_i(value: f32, exponent: i32) -> f32 {
    if exponent == 0 {
        return 1.0;
    }

    let mut result = 1.0;

    if exponent > 0 {
        for _ in 0..exponent {
            result *= value;
        }
    } else {
        for _ in 0..-exponent {
            result /= value;
        }
    }

    result
}
