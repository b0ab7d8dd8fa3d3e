use crate::error::{GeometryError, Result};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::units::{Angle, Length};

use super::{Curve, CurveDomain};

/// A bounded line segment from `p0` to `p1`.
///
/// The parametric form is: `P(t) = p0 + t * (p1 - p0)`, `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Line {
    p0: Point3,
    p1: Point3,
    info: GeometryInfo,
}

impl Line {
    /// Creates a new segment between two points.
    ///
    /// # Errors
    ///
    /// Returns an error if the end points coincide.
    pub fn new(p0: Point3, p1: Point3) -> Result<Self> {
        if (p1 - p0).norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            p0,
            p1,
            info: GeometryInfo::named("Line"),
        })
    }

    /// Creates a segment of length `length` leaving `p0` in the direction given
    /// by the azimuth `theta` (from +x in the xy-plane) and elevation `phi`.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is zero.
    pub fn from_angles(p0: Point3, theta: Angle, phi: Angle, length: Length) -> Result<Self> {
        let d = length.meters();
        let dir = Vector3::new(
            phi.rad().cos() * theta.rad().cos(),
            phi.rad().cos() * theta.rad().sin(),
            phi.rad().sin(),
        );
        Self::new(p0, p0 + dir * d)
    }

    /// Returns the start point.
    #[must_use]
    pub fn p0(&self) -> &Point3 {
        &self.p0
    }

    /// Returns the end point.
    #[must_use]
    pub fn p1(&self) -> &Point3 {
        &self.p1
    }

    /// Returns the segment vector `p1 - p0`.
    #[must_use]
    pub fn vector(&self) -> Vector3 {
        self.p1 - self.p0
    }

    /// Returns the unit direction of the segment.
    #[must_use]
    pub fn direction(&self) -> Vector3 {
        self.vector().normalize()
    }

    /// Returns the segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = self.domain().check(t)?;
        Ok(self.p0 + self.vector() * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.vector())
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

impl Geometry for Line {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_midpoint() {
        let l = Line::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0)).unwrap();
        let p = l.evaluate(0.5).unwrap();
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < TOLERANCE);
    }

    #[test]
    fn coincident_points_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Line::new(p, p).is_err());
    }

    #[test]
    fn from_angles_points_along_direction() {
        let l = Line::from_angles(
            Point3::origin(),
            Angle::from_deg(90.0),
            Angle::from_deg(0.0),
            Length::from_meters(2.0),
        )
        .unwrap();
        assert!((l.p1() - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
        assert!((l.length() - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn out_of_domain_parameter_fails() {
        let l = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(l.evaluate(1.5).is_err());
    }
}
