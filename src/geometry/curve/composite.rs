use crate::error::{GeometryError, Result};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::polygon::signed_area_2d;
use crate::math::{linspace, Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain, Line, SplineCurve};

/// A member of a [`CompositeCurve`].
#[derive(Debug, Clone)]
pub enum CurveSegment {
    Line(Line),
    Spline(SplineCurve),
}

impl CurveSegment {
    fn as_curve(&self) -> &dyn Curve {
        match self {
            Self::Line(line) => line,
            Self::Spline(spline) => spline,
        }
    }

    /// Evaluates the segment at its local parameter in `[0, 1]`.
    fn at_fraction(&self, s: f64) -> Result<Point3> {
        let d = self.as_curve().domain();
        self.as_curve().evaluate(d.t_min + s * (d.t_max - d.t_min))
    }

    fn tangent_at_fraction(&self, s: f64) -> Result<Vector3> {
        let d = self.as_curve().domain();
        let scale = d.t_max - d.t_min;
        Ok(self.as_curve().tangent(d.t_min + s * scale)? * scale)
    }

    /// Start point of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn start_point(&self) -> Result<Point3> {
        self.at_fraction(0.0)
    }

    /// End point of the segment.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn end_point(&self) -> Result<Point3> {
        self.at_fraction(1.0)
    }
}

impl From<Line> for CurveSegment {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<SplineCurve> for CurveSegment {
    fn from(curve: SplineCurve) -> Self {
        Self::Spline(curve)
    }
}

/// A chain of segments joined end to start.
///
/// The composite is parameterized over `[0, 1]`, with each segment owning an
/// equal share of the domain.
#[derive(Debug, Clone)]
pub struct CompositeCurve {
    segments: Vec<CurveSegment>,
    info: GeometryInfo,
}

impl CompositeCurve {
    /// Creates a composite curve from connected segments.
    ///
    /// # Errors
    ///
    /// Returns an error if `segments` is empty or consecutive segments do not
    /// share an end point.
    pub fn new(segments: Vec<CurveSegment>) -> Result<Self> {
        if segments.is_empty() {
            return Err(GeometryError::Degenerate("composite curve without segments".into()).into());
        }
        for (i, pair) in segments.windows(2).enumerate() {
            let gap = (pair[1].start_point()? - pair[0].end_point()?).norm();
            if gap > TOLERANCE {
                return Err(GeometryError::Degenerate(format!(
                    "segment {} does not start where segment {i} ends (gap {gap})",
                    i + 1
                ))
                .into());
            }
        }
        Ok(Self {
            segments,
            info: GeometryInfo::named("CompositeCurve"),
        })
    }

    /// Returns the member segments in order.
    #[must_use]
    pub fn segments(&self) -> &[CurveSegment] {
        &self.segments
    }

    /// Samples each segment at `per_segment` points (at least 2) and returns
    /// the chained polyline without duplicated joints.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn polyline(&self, per_segment: usize) -> Result<Vec<Point3>> {
        let per_segment = per_segment.max(2);
        let mut points = Vec::with_capacity(self.segments.len() * per_segment);
        for (k, segment) in self.segments.iter().enumerate() {
            let skip = usize::from(k > 0);
            for s in linspace(0.0, 1.0, per_segment).into_iter().skip(skip) {
                points.push(segment.at_fraction(s)?);
            }
        }
        Ok(points)
    }

    /// Signed area enclosed by the curve projected onto the XY plane,
    /// positive when counter-clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails.
    pub fn signed_area(&self, per_segment: usize) -> Result<f64> {
        Ok(signed_area_2d(&self.polyline(per_segment)?))
    }

    /// Splits a global parameter into `(segment index, local fraction)`.
    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.segments.len();
        let scaled = t * n as f64;
        let index = (scaled.floor() as usize).min(n - 1);
        (index, scaled - index as f64)
    }
}

impl Curve for CompositeCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = self.domain().check(t)?;
        let (index, s) = self.locate(t);
        self.segments[index].at_fraction(s)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        let t = self.domain().check(t)?;
        let (index, s) = self.locate(t);
        Ok(self.segments[index].tangent_at_fraction(s)? * self.segments.len() as f64)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        let first = self.segments.first().map(CurveSegment::start_point);
        let last = self.segments.last().map(CurveSegment::end_point);
        match (first, last) {
            (Some(Ok(a)), Some(Ok(b))) => (a - b).norm() < TOLERANCE,
            _ => false,
        }
    }
}

impl Geometry for CompositeCurve {
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

    fn unit_square() -> CompositeCurve {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let segments = (0..4)
            .map(|i| Line::new(corners[i], corners[(i + 1) % 4]).unwrap().into())
            .collect();
        CompositeCurve::new(segments).unwrap()
    }

    #[test]
    fn square_is_closed() {
        let sq = unit_square();
        assert!(sq.is_closed());
        assert!((sq.evaluate(0.25).unwrap() - Point3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((sq.evaluate(0.625).unwrap() - Point3::new(0.5, 1.0, 0.0)).norm() < TOLERANCE);
        assert!((sq.evaluate(1.0).unwrap() - Point3::new(0.0, 0.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn square_area() {
        let sq = unit_square();
        assert_eq!(sq.polyline(3).unwrap().len(), 9);
        assert!((sq.signed_area(2).unwrap() - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn tangent_scales_with_segment_count() {
        let sq = unit_square();
        let t = sq.tangent(0.1).unwrap();
        assert!((t - Vector3::new(4.0, 0.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn disconnected_segments_rejected() {
        let a = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let b = Line::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)).unwrap();
        assert!(CompositeCurve::new(vec![a.into(), b.into()]).is_err());
        assert!(CompositeCurve::new(Vec::new()).is_err());
    }

    #[test]
    fn mixed_segments() {
        let line = Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0)).unwrap();
        let arc = SplineCurve::bezier(vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ])
        .unwrap();
        let c = CompositeCurve::new(vec![line.into(), arc.into()]).unwrap();
        assert!(!c.is_closed());
        assert!((c.evaluate(1.0).unwrap() - Point3::new(1.0, 2.0, 0.0)).norm() < TOLERANCE);
    }
}
