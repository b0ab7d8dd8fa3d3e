//! Bernstein polynomials and the de Casteljau algorithm.
//!
//! Used by the Bézier and rational Bézier forms. Points may be plain
//! [`Vector3`](super::Vector3)s or homogeneous [`Vector4`](super::Vector4)s;
//! the rational forms run the same recurrences on weighted coordinates and
//! divide at the end.

use std::ops::{Add, Mul, Sub};

use super::binomial;

/// Evaluates all `n + 1` Bernstein polynomials of degree `n` at `t`.
///
/// Uses the triangular recurrence `B_{i,k} = (1-t)·B_{i,k-1} + t·B_{i-1,k-1}`,
/// which stays stable for large degrees.
#[must_use]
pub fn all_bernstein(n: usize, t: f64) -> Vec<f64> {
    let mut b = vec![0.0; n + 1];
    b[0] = 1.0;
    let t1 = 1.0 - t;
    for j in 1..=n {
        let mut saved = 0.0;
        for k in 0..j {
            let temp = b[k];
            b[k] = saved + t1 * temp;
            saved = t * temp;
        }
        b[j] = saved;
    }
    b
}

/// Derivatives of all Bernstein polynomials of degree `n` at `t`.
///
/// Returns `ders[k][i] = d^k B_{i,n} / dt^k` for `k` in `0..=order`. Orders
/// above `n` are identically zero.
#[must_use]
pub fn bernstein_derivatives(n: usize, t: f64, order: usize) -> Vec<Vec<f64>> {
    let mut ders = vec![vec![0.0; n + 1]; order + 1];
    for (k, row) in ders.iter_mut().enumerate() {
        if k > n {
            break;
        }
        let lower = all_bernstein(n - k, t);
        let falling: f64 = (0..k).map(|s| (n - s) as f64).product();
        for (i, value) in row.iter_mut().enumerate() {
            let mut sum = 0.0;
            for j in 0..=k {
                if j > i || i - j > n - k {
                    continue;
                }
                let sign = if (k - j) % 2 == 0 { 1.0 } else { -1.0 };
                sum += sign * binomial(k, j) * lower[i - j];
            }
            *value = falling * sum;
        }
    }
    ders
}

/// Evaluates a Bézier polynomial by repeated affine blending of its control
/// points (de Casteljau). An empty slice is the caller's responsibility.
#[must_use]
pub fn de_casteljau<V>(points: &[V], t: f64) -> V
where
    V: Copy + Add<Output = V> + Mul<f64, Output = V>,
{
    let mut work = points.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i] * (1.0 - t) + work[i + 1] * t;
        }
    }
    work[0]
}

/// Hodograph of a Bézier polynomial: control points of its first derivative,
/// `n·(P_{i+1} − P_i)`.
#[must_use]
pub fn hodograph<V>(points: &[V]) -> Vec<V>
where
    V: Copy + Sub<Output = V> + Mul<f64, Output = V>,
{
    let degree = points.len().saturating_sub(1) as f64;
    points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) * degree)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vector3, TOLERANCE};

    #[test]
    fn partition_of_unity() {
        for &t in &[0.0, 0.25, 0.5, 0.9, 1.0] {
            let sum: f64 = all_bernstein(7, t).iter().sum();
            assert!((sum - 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn recurrence_matches_closed_form() {
        let values = all_bernstein(5, 0.37);
        for (i, v) in values.iter().enumerate() {
            let closed = binomial(5, i) * 0.37_f64.powi(i as i32) * 0.63_f64.powi(5 - i as i32);
            assert!((v - closed).abs() < TOLERANCE);
        }
    }

    #[test]
    fn derivative_basis_matches_hodograph() {
        let pts = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 2.0, 0.0),
            Vector3::new(3.0, 2.0, 1.0),
            Vector3::new(4.0, 0.0, 0.0),
        ];
        let t = 0.3;
        let ders = bernstein_derivatives(3, t, 2);
        for k in 1..=2 {
            let from_basis: Vector3 = pts
                .iter()
                .zip(&ders[k])
                .fold(Vector3::zeros(), |acc, (p, b)| acc + p * *b);
            let mut hodo = pts.clone();
            for _ in 0..k {
                hodo = hodograph(&hodo);
            }
            let from_hodograph = de_casteljau(&hodo, t);
            assert!((from_basis - from_hodograph).norm() < 1e-9);
        }
    }

    #[test]
    fn derivatives_vanish_above_degree() {
        let ders = bernstein_derivatives(1, 0.5, 2);
        assert!(ders[2].iter().all(|v| v.abs() < TOLERANCE));
    }

    #[test]
    fn de_casteljau_interpolates_endpoints() {
        let pts = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 5.0, 0.0), Vector3::new(3.0, 1.0, 2.0)];
        assert!((de_casteljau(&pts, 0.0) - pts[0]).norm() < TOLERANCE);
        assert!((de_casteljau(&pts, 1.0) - pts[2]).norm() < TOLERANCE);
    }
}
