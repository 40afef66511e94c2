//! Affine range mapping shared by every tensor-producing encoder.

/// Linearly map `value` from `[x0, x1]` onto `[y0, y1]`.
///
/// Values outside the source range extrapolate; use [`lmap_clipped`]
/// to bound the result. The inverse map is `lmap(v, to, from)`.
///
/// `from.0 != from.1` is a caller precondition, checked only in debug
/// builds. A zero-width source range yields `inf` or `NaN` in release.
///
/// # Examples
///
/// ```
/// use lanesight_obs::normalize::lmap;
///
/// assert_eq!(lmap(5.0, (0.0, 10.0), (-1.0, 1.0)), 0.0);
/// assert_eq!(lmap(0.0, (-1.0, 1.0), (0.0, 10.0)), 5.0);
/// assert_eq!(lmap(20.0, (0.0, 10.0), (-1.0, 1.0)), 3.0);
/// ```
#[inline]
pub fn lmap(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    debug_assert!(from.0 != from.1, "lmap: zero-width source range {from:?}");
    to.0 + (value - from.0) * (to.1 - to.0) / (from.1 - from.0)
}

/// [`lmap`] followed by clamping into `[min(to), max(to)]`.
#[inline]
pub fn lmap_clipped(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lo, hi) = if to.0 <= to.1 { to } else { (to.1, to.0) };
    lmap(value, from, to).clamp(lo, hi)
}

/// Apply [`lmap`] in place to every element, clamping into the target
/// range when `clip` is set.
pub fn lmap_slice(values: &mut [f64], from: (f64, f64), to: (f64, f64), clip: bool) {
    for v in values {
        *v = if clip {
            lmap_clipped(*v, from, to)
        } else {
            lmap(*v, from, to)
        };
    }
}
