//! Cox–de Boor B-spline basis functions.
//!
//! Only the `degree + 1` functions that are non-zero on the active knot span
//! are ever computed. `knots` is assumed validated (see
//! [`KnotVector`](crate::geometry::KnotVector)).

/// Finds the knot span index `s` with `knots[s] <= u < knots[s + 1]`.
///
/// `last` is the index of the last control point and `degree` the polynomial
/// degree. The end of the domain maps to the last non-empty span.
#[must_use]
pub fn find_span(last: usize, degree: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[last + 1] {
        return last;
    }
    if u <= knots[degree] {
        return degree;
    }

    let mut lo = degree;
    let mut hi = last + 1;
    let mut mid = (lo + hi) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            hi = mid;
        } else {
            lo = mid;
        }
        mid = (lo + hi) / 2;
    }
    mid
}

/// Evaluates the non-zero basis functions and their derivatives up to
/// `order` at `u`.
///
/// Returns `ders[k][j]` for derivative order `k` in `0..=order` and basis
/// function `N[span-degree+j]`. Orders above `degree` are zero.
#[must_use]
#[allow(clippy::many_single_char_names)]
pub fn ders_basis_funs(span: usize, u: f64, degree: usize, order: usize, knots: &[f64]) -> Vec<Vec<f64>> {
    let p = degree;
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];
    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = u - knots[span + 1 - j];
        right[j] = knots[span + j] - u;
        let mut saved = 0.0;
        for r in 0..j {
            // lower triangle keeps the knot differences
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = ndu[r][j - 1] / ndu[j][r];
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; order + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let top = order.min(p);
    let mut a = vec![vec![0.0; p + 1]; 2];
    for r in 0..=p {
        let (mut s1, mut s2) = (0_usize, 1_usize);
        a[0][0] = 1.0;
        for k in 1..=top {
            let mut d = 0.0;
            let pk = p - k;
            if r >= k {
                a[s2][0] = a[s1][0] / ndu[pk + 1][r - k];
                d = a[s2][0] * ndu[r - k][pk];
            }
            let j1 = if r + 1 >= k { 1 } else { k - r };
            let j2 = if r <= pk + 1 { k - 1 } else { p - r };
            for j in j1..=j2 {
                a[s2][j] = (a[s1][j] - a[s1][j - 1]) / ndu[pk + 1][r + j - k];
                d += a[s2][j] * ndu[r + j - k][pk];
            }
            if r <= pk {
                a[s2][k] = -a[s1][k - 1] / ndu[pk + 1][r];
                d += a[s2][k] * ndu[r][pk];
            }
            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    let mut factor = p as f64;
    for k in 1..=top {
        for value in &mut ders[k] {
            *value *= factor;
        }
        factor *= (p - k) as f64;
    }
    ders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::bernstein::bernstein_derivatives;
    use crate::math::TOLERANCE;

    const CUBIC_BEZIER: [f64; 8] = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

    #[test]
    fn span_at_domain_ends() {
        let knots = [0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        assert_eq!(find_span(3, 2, 0.0, &knots), 2);
        assert_eq!(find_span(3, 2, 0.5, &knots), 3);
        assert_eq!(find_span(3, 2, 1.0, &knots), 3);
        assert_eq!(find_span(3, 2, 0.25, &knots), 2);
    }

    #[test]
    fn basis_sums_to_one() {
        let knots = [0.0, 0.0, 0.0, 0.3, 0.6, 1.0, 1.0, 1.0];
        for &u in &[0.0, 0.1, 0.3, 0.45, 0.99, 1.0] {
            let span = find_span(4, 2, u, &knots);
            let sum: f64 = ders_basis_funs(span, u, 2, 0, &knots)[0].iter().sum();
            assert!((sum - 1.0).abs() < TOLERANCE, "u = {u}");
        }
    }

    #[test]
    fn clamped_single_span_matches_bernstein() {
        for &u in &[0.0, 0.2, 0.7, 1.0] {
            let span = find_span(3, 3, u, &CUBIC_BEZIER);
            let ders = ders_basis_funs(span, u, 3, 2, &CUBIC_BEZIER);
            let expected = bernstein_derivatives(3, u, 2);
            for k in 0..=2 {
                for j in 0..=3 {
                    assert!((ders[k][j] - expected[k][j]).abs() < 1e-9, "k={k} j={j} u={u}");
                }
            }
        }
    }

    #[test]
    fn derivative_orders_above_degree_are_zero() {
        let knots = [0.0, 0.0, 1.0, 1.0];
        let ders = ders_basis_funs(1, 0.4, 1, 2, &knots);
        assert!(ders[2].iter().all(|v| v.abs() < TOLERANCE));
        assert!((ders[1][0] + 1.0).abs() < TOLERANCE);
        assert!((ders[1][1] - 1.0).abs() < TOLERANCE);
    }
}
