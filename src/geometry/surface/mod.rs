mod plane;
mod revolution;
mod ruled;
mod spline;
mod trimmed;

pub use plane::Plane;
pub use revolution::SurfaceOfRevolution;
pub use ruled::RuledSurface;
pub use spline::SplineSurface;
pub use trimmed::{BoundedSurface, CurveOnSurface, TrimmedSurface};

use std::fmt;

use crate::error::{GeometryError, Result};
use crate::math::{linspace, Point3, Vector3, TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Fails if `(u, v)` lies outside the domain, otherwise clamps round-off.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ParameterOutOfRange`] for out-of-range values.
    pub fn check(&self, u: f64, v: f64) -> Result<(f64, f64)> {
        Ok((
            check_range("u", u, self.u_min, self.u_max)?,
            check_range("v", v, self.v_min, self.v_max)?,
        ))
    }
}

fn check_range(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
    if !value.is_finite() || value < min - TOLERANCE || value > max + TOLERANCE {
        return Err(GeometryError::ParameterOutOfRange {
            parameter,
            value,
            min,
            max,
        }
        .into());
    }
    Ok(value.clamp(min, max))
}

/// One of the four boundaries of a tensor-product patch.
///
/// The derived ordering (`U0 < U1 < V0 < V1`) is the order in which
/// multi-face continuity visits the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceEdge {
    /// Control row `i = 0` (`u = u_min`), running along v.
    U0,
    /// Control row `i = n` (`u = u_max`), running along v.
    U1,
    /// Control column `j = 0` (`v = v_min`), running along u.
    V0,
    /// Control column `j = m` (`v = v_max`), running along u.
    V1,
}

impl SurfaceEdge {
    /// All edges in canonical order.
    pub const ALL: [Self; 4] = [Self::U0, Self::U1, Self::V0, Self::V1];

    /// Returns whether `u` is constant along this edge.
    #[must_use]
    pub fn is_u_edge(self) -> bool {
        matches!(self, Self::U0 | Self::U1)
    }

    /// Returns whether the edge sits at the end of its perpendicular
    /// parameter, so that the inward direction is the decreasing one.
    #[must_use]
    pub fn is_far(self) -> bool {
        matches!(self, Self::U1 | Self::V1)
    }

    /// The edge across the patch from this one.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::U0 => Self::U1,
            Self::U1 => Self::U0,
            Self::V0 => Self::V1,
            Self::V1 => Self::V0,
        }
    }
}

impl fmt::Display for SurfaceEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::U0 => "U0",
            Self::U1 => "U1",
            Self::V0 => "V0",
            Self::V1 => "V1",
        };
        f.write_str(s)
    }
}

/// Trait for parametric surfaces in 3D space.
pub trait Surface {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Computes the unit surface normal at parameters `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or the normal is degenerate.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    /// Evaluates an `nu × nv` grid of points, `nu` rows along u.
    ///
    /// # Errors
    ///
    /// Returns an error if any evaluation fails.
    fn evaluate_grid(&self, nu: usize, nv: usize) -> Result<Vec<Vec<Point3>>> {
        let d = self.domain();
        let vs = linspace(d.v_min, d.v_max, nv);
        linspace(d.u_min, d.u_max, nu)
            .into_iter()
            .map(|u| vs.iter().map(|&v| self.evaluate(u, v)).collect())
            .collect()
    }
}

/// Unit normal from the two first partial derivatives.
pub(crate) fn unit_normal(su: &Vector3, sv: &Vector3) -> Result<Vector3> {
    let n = su.cross(sv);
    let len = n.norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate("surface normal is undefined here".into()).into());
    }
    Ok(n / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_edge_order() {
        let mut edges = vec![SurfaceEdge::V1, SurfaceEdge::U0, SurfaceEdge::V0, SurfaceEdge::U1];
        edges.sort();
        assert_eq!(edges, SurfaceEdge::ALL.to_vec());
    }

    #[test]
    fn domain_check_clamps_round_off() {
        let d = SurfaceDomain::new(0.0, 1.0, 0.0, 2.0);
        let (u, v) = d.check(1.0 + 1e-12, -1e-12).unwrap_or((f64::NAN, f64::NAN));
        assert!((u - 1.0).abs() < TOLERANCE);
        assert!(v.abs() < TOLERANCE);
        assert!(d.check(0.5, 2.5).is_err());
    }
}
