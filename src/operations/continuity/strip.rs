use std::fmt;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, CurveEnd, SplineCurve};
use crate::geometry::surface::{SplineSurface, SurfaceEdge};
use crate::geometry::{Geometry, KnotVector};
use crate::math::basis::{ders_basis_funs, find_span};
use crate::math::{Point3, Vector3};

/// Boundary access shared by spline curves and surfaces.
///
/// A boundary is a row of `boundary_len` control points; "distance" counts
/// rows away from it into the net, and "column" indexes positions along it.
pub trait ControlNet {
    type Boundary: Copy + Ord + fmt::Display + fmt::Debug;

    /// Number of control points along the boundary.
    fn boundary_len(&self, boundary: Self::Boundary) -> usize;

    /// Degree and knot vector along the boundary.
    fn edge_basis(&self, boundary: Self::Boundary) -> (usize, KnotVector);

    /// Degree and knot vector across the boundary.
    fn cross_basis(&self, boundary: Self::Boundary) -> (usize, &KnotVector);

    /// Number of control rows across the boundary.
    fn depth(&self, boundary: Self::Boundary) -> usize;

    /// The boundary on the other side of the net.
    fn opposite(boundary: Self::Boundary) -> Self::Boundary;

    /// Whether the boundary sits at the end of the cross parameter.
    fn is_far(&self, boundary: Self::Boundary) -> bool;

    fn is_rational(&self) -> bool;

    fn point(&self, boundary: Self::Boundary, distance: usize, column: usize) -> Point3;

    fn weight(&self, boundary: Self::Boundary, distance: usize, column: usize) -> f64;

    /// Replaces a control point.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    fn set_point(&mut self, boundary: Self::Boundary, distance: usize, column: usize, point: Point3) -> Result<()>;

    /// Replaces a weight.
    ///
    /// # Errors
    ///
    /// Returns an error if the net is polynomial or the weight is invalid.
    fn set_weight(&mut self, boundary: Self::Boundary, distance: usize, column: usize, weight: f64) -> Result<()>;

    /// Inward cross-boundary derivatives of orders `0..=order` at edge
    /// parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the edge range.
    fn boundary_derivatives(&self, boundary: Self::Boundary, t: f64, order: usize) -> Result<Vec<Vector3>>;

    /// Parameter range along the boundary.
    fn edge_range(&self, boundary: Self::Boundary) -> (f64, f64) {
        let (_, knots) = self.edge_basis(boundary);
        (knots.start(), knots.end())
    }

    /// Short description used in error messages.
    fn describe(&self, boundary: Self::Boundary) -> String;
}

impl ControlNet for SplineCurve {
    type Boundary = CurveEnd;

    fn boundary_len(&self, _boundary: CurveEnd) -> usize {
        1
    }

    fn edge_basis(&self, _boundary: CurveEnd) -> (usize, KnotVector) {
        (0, KnotVector::bezier(0))
    }

    fn cross_basis(&self, _boundary: CurveEnd) -> (usize, &KnotVector) {
        (self.degree(), self.knots())
    }

    fn depth(&self, _boundary: CurveEnd) -> usize {
        self.control_points().len()
    }

    fn opposite(boundary: CurveEnd) -> CurveEnd {
        boundary.opposite()
    }

    fn is_far(&self, boundary: CurveEnd) -> bool {
        boundary == CurveEnd::End
    }

    fn is_rational(&self) -> bool {
        self.form().is_rational()
    }

    fn point(&self, boundary: CurveEnd, distance: usize, _column: usize) -> Point3 {
        self.control_points()[curve_index(self, boundary, distance)]
    }

    fn weight(&self, boundary: CurveEnd, distance: usize, _column: usize) -> f64 {
        SplineCurve::weight(self, curve_index(self, boundary, distance))
    }

    fn set_point(&mut self, boundary: CurveEnd, distance: usize, _column: usize, point: Point3) -> Result<()> {
        let i = curve_index(self, boundary, distance);
        self.set_control_point(i, point)
    }

    fn set_weight(&mut self, boundary: CurveEnd, distance: usize, _column: usize, weight: f64) -> Result<()> {
        let i = curve_index(self, boundary, distance);
        SplineCurve::set_weight(self, i, weight)
    }

    fn boundary_derivatives(&self, boundary: CurveEnd, _t: f64, order: usize) -> Result<Vec<Vector3>> {
        let d = self.domain();
        let t = match boundary {
            CurveEnd::Start => d.t_min,
            CurveEnd::End => d.t_max,
        };
        Ok(inward(self.derivatives(t, order)?, boundary == CurveEnd::End))
    }

    fn edge_range(&self, _boundary: CurveEnd) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn describe(&self, boundary: CurveEnd) -> String {
        format!("{} {boundary} (degree {})", self.name(), self.degree())
    }
}

fn curve_index(curve: &SplineCurve, end: CurveEnd, distance: usize) -> usize {
    match end {
        CurveEnd::Start => distance,
        CurveEnd::End => curve.control_points().len() - 1 - distance,
    }
}

impl ControlNet for SplineSurface {
    type Boundary = SurfaceEdge;

    fn boundary_len(&self, edge: SurfaceEdge) -> usize {
        self.edge_len(edge)
    }

    fn edge_basis(&self, edge: SurfaceEdge) -> (usize, KnotVector) {
        let (degree, knots) = SplineSurface::edge_basis(self, edge);
        (degree, knots.clone())
    }

    fn cross_basis(&self, edge: SurfaceEdge) -> (usize, &KnotVector) {
        SplineSurface::cross_basis(self, edge)
    }

    fn depth(&self, edge: SurfaceEdge) -> usize {
        SplineSurface::depth(self, edge)
    }

    fn opposite(edge: SurfaceEdge) -> SurfaceEdge {
        edge.opposite()
    }

    fn is_far(&self, edge: SurfaceEdge) -> bool {
        edge.is_far()
    }

    fn is_rational(&self) -> bool {
        self.form().is_rational()
    }

    fn point(&self, edge: SurfaceEdge, distance: usize, column: usize) -> Point3 {
        let (i, j) = self.edge_index(edge, distance, column);
        self.control_point(i, j)
    }

    fn weight(&self, edge: SurfaceEdge, distance: usize, column: usize) -> f64 {
        let (i, j) = self.edge_index(edge, distance, column);
        SplineSurface::weight(self, i, j)
    }

    fn set_point(&mut self, edge: SurfaceEdge, distance: usize, column: usize, point: Point3) -> Result<()> {
        let (i, j) = self.edge_index(edge, distance, column);
        self.set_control_point(i, j, point)
    }

    fn set_weight(&mut self, edge: SurfaceEdge, distance: usize, column: usize, weight: f64) -> Result<()> {
        let (i, j) = self.edge_index(edge, distance, column);
        SplineSurface::set_weight(self, i, j, weight)
    }

    fn boundary_derivatives(&self, edge: SurfaceEdge, t: f64, order: usize) -> Result<Vec<Vector3>> {
        (0..=order).map(|k| self.boundary_derivative(edge, t, k)).collect()
    }

    fn describe(&self, edge: SurfaceEdge) -> String {
        let (degree, _) = SplineSurface::edge_basis(self, edge);
        format!(
            "{} {edge} ({} control points, degree {degree})",
            self.name(),
            self.edge_len(edge)
        )
    }
}

/// Flips odd orders so derivatives are taken along the inward parameter.
fn inward(mut ders: Vec<Vector3>, far: bool) -> Vec<Vector3> {
    if far {
        for (k, d) in ders.iter_mut().enumerate() {
            if k % 2 == 1 {
                *d = -*d;
            }
        }
    }
    ders
}

/// Snapshot of the control rows nearest to a boundary.
#[derive(Debug, Clone)]
pub struct BoundaryStrip {
    /// `points[d][c]`: row at distance `d`, column `c`.
    pub points: Vec<Vec<Point3>>,
    /// Weights of the same rows (all 1 for polynomial nets).
    pub weights: Vec<Vec<f64>>,
    /// `coefficients[k][d]`: weight of row `d` in the `k`-th inward
    /// derivative at the boundary.
    pub coefficients: Vec<Vec<f64>>,
    pub edge_degree: usize,
    pub edge_knots: KnotVector,
    pub rational: bool,
    pub description: String,
}

impl BoundaryStrip {
    /// Extracts rows `0..=order` next to `boundary`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the degree across the boundary
    /// is lower than `order`.
    pub fn extract<N: ControlNet + ?Sized>(net: &N, boundary: N::Boundary, order: usize) -> Result<Self> {
        let (cross_degree, cross_knots) = net.cross_basis(boundary);
        if cross_degree < order {
            return Err(GeometryError::Degenerate(format!(
                "{}: degree {cross_degree} across the boundary cannot carry order {order} continuity",
                net.describe(boundary)
            ))
            .into());
        }
        let coefficients = inward_coefficients(cross_degree, cross_knots, net.is_far(boundary), order);
        let columns = net.boundary_len(boundary);
        let points = (0..=order)
            .map(|d| (0..columns).map(|c| net.point(boundary, d, c)).collect())
            .collect();
        let weights = (0..=order)
            .map(|d| (0..columns).map(|c| net.weight(boundary, d, c)).collect())
            .collect();
        let (edge_degree, edge_knots) = net.edge_basis(boundary);
        Ok(Self {
            points,
            weights,
            coefficients,
            edge_degree,
            edge_knots,
            rational: net.is_rational(),
            description: net.describe(boundary),
        })
    }

    /// Number of columns along the boundary.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.points.first().map_or(0, Vec::len)
    }

    /// Highest derivative order the strip holds.
    #[must_use]
    pub fn order(&self) -> usize {
        self.points.len() - 1
    }

    /// Weight-basis derivatives `W_k = Σ_d a_k[d] w_d` of column `c`.
    #[must_use]
    pub fn weight_derivatives(&self, c: usize) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|a| a.iter().enumerate().map(|(d, ad)| ad * self.weights[d][c]).sum())
            .collect()
    }

    /// Inward derivatives `S_k` of column `c` at the boundary (`S_0` is the
    /// boundary point), via the rational quotient rule.
    #[must_use]
    pub fn column_derivatives(&self, c: usize) -> Vec<Vector3> {
        let w = self.weight_derivatives(c);
        let mut s: Vec<Vector3> = Vec::with_capacity(self.coefficients.len());
        for (k, a) in self.coefficients.iter().enumerate() {
            let mut v: Vector3 = a
                .iter()
                .enumerate()
                .map(|(d, ad)| self.points[d][c].coords * (ad * self.weights[d][c]))
                .sum();
            for i in 1..=k {
                v -= s[k - i] * (crate::math::binomial(k, i) * w[i]);
            }
            s.push(v / w[0]);
        }
        s
    }
}

/// `a[k][d]` for `k, d ∈ 0..=order`: basis derivatives of the rows at the
/// boundary, signed for the inward direction.
fn inward_coefficients(degree: usize, knots: &KnotVector, far: bool, order: usize) -> Vec<Vec<f64>> {
    let k = knots.as_slice();
    let last = knots.len() - degree - 2;
    let (t, span) = if far {
        (knots.end(), find_span(last, degree, knots.end(), k))
    } else {
        (knots.start(), find_span(last, degree, knots.start(), k))
    };
    let ders = ders_basis_funs(span, t, degree, order, k);
    (0..=order)
        .map(|kk| {
            let sign = if far && kk % 2 == 1 { -1.0 } else { 1.0 };
            (0..=order)
                .map(|d| {
                    let j = if far { degree - d } else { d };
                    sign * ders[kk][j]
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn cubic() -> SplineCurve {
        SplineCurve::rational_bezier(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(2.0, 1.0, 0.5),
                Point3::new(3.0, 0.0, 0.0),
            ],
            vec![1.0, 0.7, 1.3, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn bezier_coefficients_are_forward_differences() {
        let a = inward_coefficients(3, &KnotVector::bezier(3), false, 2);
        assert!((a[0][0] - 1.0).abs() < TOLERANCE);
        assert!((a[1][0] + 3.0).abs() < TOLERANCE && (a[1][1] - 3.0).abs() < TOLERANCE);
        assert!((a[2][0] - 6.0).abs() < TOLERANCE);
        assert!((a[2][1] + 12.0).abs() < TOLERANCE);
        assert!((a[2][2] - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn far_coefficients_mirror_near_ones() {
        let near = inward_coefficients(3, &KnotVector::bezier(3), false, 2);
        let far = inward_coefficients(3, &KnotVector::bezier(3), true, 2);
        for (a, b) in near.iter().flatten().zip(far.iter().flatten()) {
            assert!((a - b).abs() < TOLERANCE);
        }
    }

    #[test]
    fn strip_derivatives_match_curve() {
        let c = cubic();
        for end in [CurveEnd::Start, CurveEnd::End] {
            let strip = BoundaryStrip::extract(&c, end, 2).unwrap();
            let s = strip.column_derivatives(0);
            let exact = c.boundary_derivatives(end, 0.0, 2).unwrap();
            for (a, b) in s.iter().zip(&exact) {
                assert!((a - b).norm() < 1e-9);
            }
        }
    }

    #[test]
    fn strip_needs_enough_degree() {
        let line = SplineCurve::bezier(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]).unwrap();
        assert!(BoundaryStrip::extract(&line, CurveEnd::Start, 1).is_ok());
        assert!(BoundaryStrip::extract(&line, CurveEnd::Start, 2).is_err());
    }

    #[test]
    fn surface_strip_matches_boundary_derivative() {
        let grid: Vec<Vec<Point3>> = (0..4)
            .map(|i| {
                (0..5)
                    .map(|j| Point3::new(i as f64, j as f64, ((i * j) as f64 * 0.3).sin()))
                    .collect()
            })
            .collect();
        let s = SplineSurface::bspline(
            grid,
            vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.4, 1.0, 1.0, 1.0, 1.0],
            2,
            3,
        )
        .unwrap();
        for edge in SurfaceEdge::ALL {
            let strip = BoundaryStrip::extract(&s, edge, 2).unwrap();
            // the first column sits at the start of the edge parameter
            let (t0, _) = s.edge_range(edge);
            let exact = s.boundary_derivatives(edge, t0, 2).unwrap();
            let approx = strip.column_derivatives(0);
            for (a, b) in approx.iter().zip(&exact) {
                assert!((a - b).norm() < 1e-9);
            }
        }
    }
}
