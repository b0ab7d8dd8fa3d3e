mod composite;
mod line;
mod spline;

pub use composite::{CompositeCurve, CurveSegment};
pub use line::Line;
pub use spline::SplineCurve;

use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::{linspace, Point3, Vector3, TOLERANCE};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Fails if `t` lies outside the domain, otherwise clamps round-off.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] for out-of-range values.
    pub fn check(&self, t: f64) -> Result<f64> {
        if !t.is_finite() || t < self.t_min - TOLERANCE || t > self.t_max + TOLERANCE {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: self.t_min,
                max: self.t_max,
            }
            .into());
        }
        Ok(t.clamp(self.t_min, self.t_max))
    }
}

/// One end of a curve, the curve analogue of a surface edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CurveEnd {
    Start,
    End,
}

impl CurveEnd {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

impl fmt::Display for CurveEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the (unnormalized) first derivative at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Evaluates `n` points evenly spaced over the domain, ends included.
    ///
    /// # Errors
    ///
    /// Returns an error if any evaluation fails.
    fn evaluate_grid(&self, n: usize) -> Result<Vec<Point3>> {
        let d = self.domain();
        linspace(d.t_min, d.t_max, n)
            .into_iter()
            .map(|t| self.evaluate(t))
            .collect()
    }
}
