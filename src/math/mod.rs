pub mod basis;
pub mod bernstein;
pub mod polygon;

/// 3D point type. Planar geometry lives in the `z = 0` plane.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Homogeneous (weighted) control point `(w·x, w·y, w·z, w)`.
pub type Vector4 = nalgebra::Vector4<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Lifts a point and weight into homogeneous coordinates.
#[must_use]
pub fn homogeneous(point: &Point3, weight: f64) -> Vector4 {
    Vector4::new(point.x * weight, point.y * weight, point.z * weight, weight)
}

/// Computes the binomial coefficient `C(n, k)` as a float.
#[must_use]
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut result = 1.0;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result
}

/// Returns `n` evenly spaced values from `start` to `end`, both inclusive.
///
/// The last value is exactly `end`; `n == 1` yields `[start]`.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Relative closeness test used by verification routines:
/// `|a - b| <= tol * max(1, |a|, |b|)`.
#[must_use]
pub fn vectors_close(a: &Vector3, b: &Vector3, tol: f64) -> bool {
    let scale = 1.0_f64.max(a.norm()).max(b.norm());
    (a - b).norm() <= tol * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_small_values() {
        assert!((binomial(4, 2) - 6.0).abs() < TOLERANCE);
        assert!((binomial(10, 0) - 1.0).abs() < TOLERANCE);
        assert!((binomial(10, 10) - 1.0).abs() < TOLERANCE);
        assert!(binomial(3, 4).abs() < TOLERANCE);
    }

    #[test]
    fn homogeneous_roundtrip() {
        let h = homogeneous(&Point3::new(1.0, 2.0, 3.0), 0.5);
        assert!((h.xyz() / h.w - Vector3::new(1.0, 2.0, 3.0)).norm() < TOLERANCE);
    }

    #[test]
    fn closeness_is_relative_for_large_vectors() {
        let a = Vector3::new(1e6, 0.0, 0.0);
        let b = Vector3::new(1e6 + 1e-3, 0.0, 0.0);
        assert!(vectors_close(&a, &b, 1e-8));
        assert!(!vectors_close(&Vector3::zeros(), &Vector3::x(), 1e-8));
    }
}
