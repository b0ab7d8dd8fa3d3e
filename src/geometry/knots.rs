use crate::error::{GeometryError, Result};
use crate::math::TOLERANCE;

/// A validated, clamped (open) knot vector.
///
/// Invariants: `len == n_control_points + degree + 1`, values finite and
/// non-decreasing, first and last value each repeated exactly `degree + 1`
/// times, interior multiplicities at most `max(degree, 1)`, non-empty domain.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVector {
    values: Vec<f64>,
}

impl KnotVector {
    /// Validates `values` against the given degree and control-point count.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidKnots`] if any invariant is violated.
    pub fn new(values: Vec<f64>, degree: usize, n_control_points: usize) -> Result<Self> {
        let expected = n_control_points + degree + 1;
        if n_control_points == 0 {
            return Err(GeometryError::InvalidKnots("no control points".into()).into());
        }
        if values.len() != expected {
            return Err(GeometryError::InvalidKnots(format!(
                "expected {expected} knots for {n_control_points} control points of degree {degree}, got {}",
                values.len()
            ))
            .into());
        }
        if values.iter().any(|k| !k.is_finite()) {
            return Err(GeometryError::InvalidKnots("non-finite knot value".into()).into());
        }
        if values.windows(2).any(|w| w[1] < w[0]) {
            return Err(GeometryError::InvalidKnots("knots must be non-decreasing".into()).into());
        }

        let runs = multiplicity_runs(&values);
        let first = runs.first().map_or(0, |r| r.1);
        let last = runs.last().map_or(0, |r| r.1);
        if runs.len() < 2 || first != degree + 1 || last != degree + 1 {
            return Err(GeometryError::InvalidKnots(format!(
                "knot vector must be clamped with end multiplicity {}",
                degree + 1
            ))
            .into());
        }
        let max_interior = degree.max(1);
        if let Some(&(value, mult)) = runs[1..runs.len() - 1].iter().find(|r| r.1 > max_interior) {
            return Err(GeometryError::InvalidKnots(format!(
                "interior knot {value} has multiplicity {mult} > {max_interior}"
            ))
            .into());
        }
        Ok(Self { values })
    }

    /// The implicit knot vector of a single Bézier span on `[0, 1]`.
    #[must_use]
    pub fn bezier(degree: usize) -> Self {
        let mut values = vec![0.0; degree + 1];
        values.extend(std::iter::repeat(1.0).take(degree + 1));
        Self { values }
    }

    /// A clamped knot vector with uniformly spaced interior knots on `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `degree + 1` control points are given.
    pub fn uniform_clamped(degree: usize, n_control_points: usize) -> Result<Self> {
        if n_control_points < degree + 1 {
            return Err(GeometryError::InvalidKnots(format!(
                "{n_control_points} control points cannot carry degree {degree}"
            ))
            .into());
        }
        let spans = n_control_points - degree;
        let mut values = vec![0.0; degree + 1];
        values.extend((1..spans).map(|i| i as f64 / spans as f64));
        values.extend(std::iter::repeat(1.0).take(degree + 1));
        Self::new(values, degree, n_control_points)
    }

    /// Returns the knot values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Returns the number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no knots (never the case once validated).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Start of the parametric domain.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    /// End of the parametric domain.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.values.last().copied().unwrap_or(1.0)
    }

    /// Returns whether the vector has exactly one non-empty span.
    #[must_use]
    pub fn is_single_span(&self) -> bool {
        multiplicity_runs(&self.values).len() == 2
    }

    /// Returns the knot vector of the reversed parameterization
    /// (`u -> start + end - u`).
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let (a, b) = (self.start(), self.end());
        Self {
            values: self.values.iter().rev().map(|k| a + b - k).collect(),
        }
    }

    /// Element-wise comparison within `tol`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    /// Maps a parameter of the reversed parameterization back onto this one.
    #[must_use]
    pub fn mirror_parameter(&self, t: f64) -> f64 {
        self.start() + self.end() - t
    }

    /// Returns whether `t` lies inside the domain (with tolerance).
    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start() - TOLERANCE && t <= self.end() + TOLERANCE
    }
}

/// Groups equal consecutive values into `(value, multiplicity)` runs.
#[allow(clippy::float_cmp)]
fn multiplicity_runs(values: &[f64]) -> Vec<(f64, usize)> {
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &v in values {
        match runs.last_mut() {
            Some(last) if last.0 == v => last.1 += 1,
            _ => runs.push((v, 1)),
        }
    }
    runs
}
