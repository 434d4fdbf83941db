//! One-dimensional linear interpolation shared by the position and OPD stages.

/// Evaluates the piecewise-linear function through `(xp, fp)` at `x`.
///
/// Values left of `xp[0]` take `fp[0]` and values right of the last knot take
/// the last `fp`, the same boundary behaviour as `numpy.interp`. `xp` must be
/// ascending; callers that cannot guarantee this check with
/// [`first_non_increasing`] first.
pub fn interp_at(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }

    // first knot strictly greater than x, always in 1..n here
    let j = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    if x == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    x.iter().map(|&xi| interp_at(xi, xp, fp)).collect()
}

/// Index of the first knot that does not increase on its predecessor.
pub fn first_non_increasing(xp: &[f64]) -> Option<usize> {
    xp.windows(2)
        .position(|w| !(w[1] > w[0]))
        .map(|i| i + 1)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
