#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Line, SplineCurve};
use crate::geometry::eval::{active_basis, check_parameter, rational_surface_derivatives};
use crate::geometry::{validate_weights, Geometry, GeometryInfo, KnotVector, SplineForm};
use crate::math::bernstein::de_casteljau;
use crate::math::{homogeneous, linspace, Point3, Vector3, Vector4};

use super::{unit_normal, Surface, SurfaceDomain, SurfaceEdge};

/// A tensor-product Bézier, rational Bézier, B-spline or NURBS surface.
///
/// Control points form a rectangular grid `control_points[i][j]`, with `i`
/// running along u (rows) and `j` along v (columns).
#[derive(Debug, Clone)]
pub struct SplineSurface {
    form: SplineForm,
    degree_u: usize,
    degree_v: usize,
    control_points: Vec<Vec<Point3>>,
    weights: Option<Vec<Vec<f64>>>,
    knots_u: KnotVector,
    knots_v: KnotVector,
    info: GeometryInfo,
}

impl SplineSurface {
    /// Creates a Bézier patch whose degrees follow from the grid shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or not rectangular.
    pub fn bezier(grid: Vec<Vec<Point3>>) -> Result<Self> {
        let (rows, cols) = grid_shape(&grid)?;
        Ok(Self::assemble(
            SplineForm::Bezier,
            (rows - 1, cols - 1),
            grid,
            None,
            (KnotVector::bezier(rows - 1), KnotVector::bezier(cols - 1)),
        ))
    }

    /// Creates a rational Bézier patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty or not rectangular, the weight
    /// grid has a different shape, or a weight is not strictly positive.
    pub fn rational_bezier(grid: Vec<Vec<Point3>>, weights: Vec<Vec<f64>>) -> Result<Self> {
        let (rows, cols) = grid_shape(&grid)?;
        check_weight_grid(&weights, rows, cols)?;
        Ok(Self::assemble(
            SplineForm::RationalBezier,
            (rows - 1, cols - 1),
            grid,
            Some(weights),
            (KnotVector::bezier(rows - 1), KnotVector::bezier(cols - 1)),
        ))
    }

    /// Creates a (non-rational) B-spline surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not rectangular or a knot vector does
    /// not match its direction.
    pub fn bspline(
        grid: Vec<Vec<Point3>>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        degree_u: usize,
        degree_v: usize,
    ) -> Result<Self> {
        let (rows, cols) = grid_shape(&grid)?;
        let knots_u = KnotVector::new(knots_u, degree_u, rows)?;
        let knots_v = KnotVector::new(knots_v, degree_v, cols)?;
        Ok(Self::assemble(
            SplineForm::BSpline,
            (degree_u, degree_v),
            grid,
            None,
            (knots_u, knots_v),
        ))
    }

    /// Creates a NURBS surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not rectangular, a knot vector does not
    /// match its direction, or the weights are invalid.
    pub fn nurbs(
        grid: Vec<Vec<Point3>>,
        weights: Vec<Vec<f64>>,
        knots_u: Vec<f64>,
        knots_v: Vec<f64>,
        degree_u: usize,
        degree_v: usize,
    ) -> Result<Self> {
        let (rows, cols) = grid_shape(&grid)?;
        check_weight_grid(&weights, rows, cols)?;
        let knots_u = KnotVector::new(knots_u, degree_u, rows)?;
        let knots_v = KnotVector::new(knots_v, degree_v, cols)?;
        Ok(Self::assemble(
            SplineForm::Nurbs,
            (degree_u, degree_v),
            grid,
            Some(weights),
            (knots_u, knots_v),
        ))
    }

    /// Creates the bilinear patch through four corners, `pij` being the
    /// corner at `u = i`, `v = j`.
    #[must_use]
    pub fn bilinear(p00: Point3, p01: Point3, p10: Point3, p11: Point3) -> Self {
        Self::assemble(
            SplineForm::Bezier,
            (1, 1),
            vec![vec![p00, p01], vec![p10, p11]],
            None,
            (KnotVector::bezier(1), KnotVector::bezier(1)),
        )
    }

    pub(crate) fn assemble(
        form: SplineForm,
        (degree_u, degree_v): (usize, usize),
        control_points: Vec<Vec<Point3>>,
        weights: Option<Vec<Vec<f64>>>,
        (knots_u, knots_v): (KnotVector, KnotVector),
    ) -> Self {
        Self {
            form,
            degree_u,
            degree_v,
            control_points,
            weights,
            knots_u,
            knots_v,
            info: GeometryInfo::named(format!("{}Surface", form.label())),
        }
    }

    /// Sets the name and returns the surface.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    #[must_use]
    pub fn form(&self) -> SplineForm {
        self.form
    }

    #[must_use]
    pub fn degree_u(&self) -> usize {
        self.degree_u
    }

    #[must_use]
    pub fn degree_v(&self) -> usize {
        self.degree_v
    }

    /// Number of control rows (along u).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.control_points.len()
    }

    /// Number of control columns (along v).
    #[must_use]
    pub fn cols(&self) -> usize {
        self.control_points.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn control_points(&self) -> &[Vec<Point3>] {
        &self.control_points
    }

    #[must_use]
    pub fn control_point(&self, i: usize, j: usize) -> Point3 {
        self.control_points[i][j]
    }

    /// Returns the explicit weight grid (rational forms only).
    #[must_use]
    pub fn weights(&self) -> Option<&[Vec<f64>]> {
        self.weights.as_deref()
    }

    /// Returns the weight of control point `(i, j)` (1 for polynomial forms).
    #[must_use]
    pub fn weight(&self, i: usize, j: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[i][j])
    }

    #[must_use]
    pub fn knots_u(&self) -> &KnotVector {
        &self.knots_u
    }

    #[must_use]
    pub fn knots_v(&self) -> &KnotVector {
        &self.knots_v
    }

    /// Replaces control point `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range.
    pub fn set_control_point(&mut self, i: usize, j: usize, point: Point3) -> Result<()> {
        let (rows, cols) = (self.rows(), self.cols());
        let slot = self
            .control_points
            .get_mut(i)
            .and_then(|row| row.get_mut(j))
            .ok_or_else(|| {
                GeometryError::ShapeMismatch(format!("index ({i}, {j}) outside {rows}x{cols} grid"))
            })?;
        *slot = point;
        Ok(())
    }

    /// Replaces the weight of control point `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface is polynomial, the index is out of
    /// range, or the weight is not strictly positive.
    pub fn set_weight(&mut self, i: usize, j: usize, weight: f64) -> Result<()> {
        let cols = self.cols();
        let grid = self.weights.as_mut().ok_or_else(|| {
            GeometryError::ShapeMismatch("polynomial surfaces carry no weights".into())
        })?;
        if !(weight.is_finite() && weight > 0.0) {
            return Err(GeometryError::InvalidWeight {
                index: i * cols + j,
                value: weight,
            }
            .into());
        }
        let slot = grid.get_mut(i).and_then(|row| row.get_mut(j)).ok_or_else(|| {
            GeometryError::ShapeMismatch(format!("weight index ({i}, {j}) out of range"))
        })?;
        *slot = weight;
        Ok(())
    }

    fn homogeneous_grid(&self) -> Vec<Vec<Vector4>> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, p)| homogeneous(p, self.weight(i, j)))
                    .collect()
            })
            .collect()
    }

    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let pw = self.homogeneous_grid();
        let h = if self.form.is_bezier() {
            let lu = (u - self.knots_u.start()) / (self.knots_u.end() - self.knots_u.start());
            let lv = (v - self.knots_v.start()) / (self.knots_v.end() - self.knots_v.start());
            let column: Vec<Vector4> = pw.iter().map(|row| de_casteljau(row, lv)).collect();
            de_casteljau(&column, lu)
        } else {
            let bu = active_basis(self.form, self.degree_u, &self.knots_u, self.rows(), u, 0);
            let bv = active_basis(self.form, self.degree_v, &self.knots_v, self.cols(), v, 0);
            let mut h = Vector4::zeros();
            for (a, nu) in bu.ders[0].iter().enumerate() {
                for (b, nv) in bv.ders[0].iter().enumerate() {
                    h += pw[bu.first + a][bv.first + b] * (nu * nv);
                }
            }
            h
        };
        Point3::from(h.xyz() / h.w)
    }

    /// Returns `skl[k][l] = ∂^(k+l) S / ∂u^k ∂v^l` for `k + l <= order`;
    /// `skl[0][0]` is the position as a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `(u, v)` is outside the domain.
    pub fn derivatives(&self, u: f64, v: f64, order: usize) -> Result<Vec<Vec<Vector3>>> {
        let u = check_parameter("u", u, &self.knots_u)?;
        let v = check_parameter("v", v, &self.knots_v)?;
        let pw = self.homogeneous_grid();
        let bu = active_basis(self.form, self.degree_u, &self.knots_u, self.rows(), u, order);
        let bv = active_basis(self.form, self.degree_v, &self.knots_v, self.cols(), v, order);

        let mut aders = vec![vec![Vector4::zeros(); order + 1]; order + 1];
        for k in 0..=order {
            for l in 0..=(order - k) {
                let mut sum = Vector4::zeros();
                for (a, nu) in bu.ders[k].iter().enumerate() {
                    for (b, nv) in bv.ders[l].iter().enumerate() {
                        sum += pw[bu.first + a][bv.first + b] * (nu * nv);
                    }
                }
                aders[k][l] = sum;
            }
        }
        Ok(rational_surface_derivatives(&aders, order))
    }

    /// `order`-th partial derivative along u.
    ///
    /// # Errors
    ///
    /// Returns an error if `(u, v)` is outside the domain.
    pub fn derivative_u(&self, u: f64, v: f64, order: usize) -> Result<Vector3> {
        Ok(self.derivatives(u, v, order)?[order][0])
    }

    /// `order`-th partial derivative along v.
    ///
    /// # Errors
    ///
    /// Returns an error if `(u, v)` is outside the domain.
    pub fn derivative_v(&self, u: f64, v: f64, order: usize) -> Result<Vector3> {
        Ok(self.derivatives(u, v, order)?[0][order])
    }

    /// Parameter range of the edge parameter along `edge`.
    #[must_use]
    pub fn edge_range(&self, edge: SurfaceEdge) -> (f64, f64) {
        let knots = if edge.is_u_edge() { &self.knots_v } else { &self.knots_u };
        (knots.start(), knots.end())
    }

    /// Degree and knot vector along `edge`.
    #[must_use]
    pub fn edge_basis(&self, edge: SurfaceEdge) -> (usize, &KnotVector) {
        if edge.is_u_edge() {
            (self.degree_v, &self.knots_v)
        } else {
            (self.degree_u, &self.knots_u)
        }
    }

    /// Degree and knot vector across `edge`.
    #[must_use]
    pub fn cross_basis(&self, edge: SurfaceEdge) -> (usize, &KnotVector) {
        if edge.is_u_edge() {
            (self.degree_u, &self.knots_u)
        } else {
            (self.degree_v, &self.knots_v)
        }
    }

    /// Grid index of the control point `distance` rows in from `edge`, at
    /// position `column` along it.
    #[must_use]
    pub fn edge_index(&self, edge: SurfaceEdge, distance: usize, column: usize) -> (usize, usize) {
        match edge {
            SurfaceEdge::U0 => (distance, column),
            SurfaceEdge::U1 => (self.rows() - 1 - distance, column),
            SurfaceEdge::V0 => (column, distance),
            SurfaceEdge::V1 => (column, self.cols() - 1 - distance),
        }
    }

    /// Number of control points along `edge`.
    #[must_use]
    pub fn edge_len(&self, edge: SurfaceEdge) -> usize {
        if edge.is_u_edge() {
            self.cols()
        } else {
            self.rows()
        }
    }

    /// Number of control rows parallel to `edge`.
    #[must_use]
    pub fn depth(&self, edge: SurfaceEdge) -> usize {
        if edge.is_u_edge() {
            self.rows()
        } else {
            self.cols()
        }
    }

    /// Extracts the boundary curve along `edge` (rational if the surface is).
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary data cannot form a curve.
    pub fn edge_curve(&self, edge: SurfaceEdge) -> Result<SplineCurve> {
        let n = self.edge_len(edge);
        let points: Vec<Point3> = (0..n)
            .map(|c| {
                let (i, j) = self.edge_index(edge, 0, c);
                self.control_points[i][j]
            })
            .collect();
        let weights = || -> Vec<f64> {
            (0..n)
                .map(|c| {
                    let (i, j) = self.edge_index(edge, 0, c);
                    self.weight(i, j)
                })
                .collect()
        };
        let (degree, knots) = self.edge_basis(edge);
        let curve = match self.form {
            SplineForm::Bezier => SplineCurve::bezier(points)?,
            SplineForm::RationalBezier => SplineCurve::rational_bezier(points, weights())?,
            SplineForm::BSpline => SplineCurve::bspline(points, knots.as_slice().to_vec(), degree)?,
            SplineForm::Nurbs => {
                SplineCurve::nurbs(points, weights(), knots.as_slice().to_vec(), degree)?
            }
        };
        Ok(curve.named(&format!("{}.{edge}", self.name())))
    }

    /// Derivative of order `order` across `edge`, taken with respect to the
    /// parameter running into the surface, at edge parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the edge range.
    pub fn boundary_derivative(&self, edge: SurfaceEdge, t: f64, order: usize) -> Result<Vector3> {
        let d = self.domain();
        let raw = match edge {
            SurfaceEdge::U0 => self.derivative_u(d.u_min, t, order)?,
            SurfaceEdge::U1 => self.derivative_u(d.u_max, t, order)?,
            SurfaceEdge::V0 => self.derivative_v(t, d.v_min, order)?,
            SurfaceEdge::V1 => self.derivative_v(t, d.v_max, order)?,
        };
        Ok(if edge.is_far() && order % 2 == 1 { -raw } else { raw })
    }

    /// Iso-lines of the control grid, rows first, as line segments.
    /// Coincident neighbours are skipped.
    #[must_use]
    pub fn control_net_lines(&self) -> Vec<Line> {
        let rows = self
            .control_points
            .iter()
            .flat_map(|row| row.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>());
        let columns = (0..self.cols()).flat_map(|j| {
            self.control_points
                .windows(2)
                .map(move |w| (w[0][j], w[1][j]))
                .collect::<Vec<_>>()
        });
        rows.chain(columns)
            .filter_map(|(a, b)| Line::new(a, b).ok())
            .collect()
    }
}

impl Surface for SplineSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let u = check_parameter("u", u, &self.knots_u)?;
        let v = check_parameter("v", v, &self.knots_v)?;
        Ok(self.point_at(u, v))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let skl = self.derivatives(u, v, 1)?;
        unit_normal(&skl[1][0], &skl[0][1])
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(
            self.knots_u.start(),
            self.knots_u.end(),
            self.knots_v.start(),
            self.knots_v.end(),
        )
    }

    fn evaluate_grid(&self, nu: usize, nv: usize) -> Result<Vec<Vec<Point3>>> {
        let us = linspace(self.knots_u.start(), self.knots_u.end(), nu);
        let vs = linspace(self.knots_v.start(), self.knots_v.end(), nv);
        let row = |u: f64| -> Vec<Point3> { vs.iter().map(|&v| self.point_at(u, v)).collect() };
        #[cfg(feature = "parallel")]
        let grid = us.par_iter().map(|&u| row(u)).collect();
        #[cfg(not(feature = "parallel"))]
        let grid = us.iter().map(|&u| row(u)).collect();
        Ok(grid)
    }
}

impl Geometry for SplineSurface {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

fn grid_shape(grid: &[Vec<Point3>]) -> Result<(usize, usize)> {
    let rows = grid.len();
    let cols = grid.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(GeometryError::Degenerate("empty control grid".into()).into());
    }
    if let Some(i) = grid.iter().position(|row| row.len() != cols) {
        return Err(GeometryError::ShapeMismatch(format!(
            "row {i} has {} control points, expected {cols}",
            grid[i].len()
        ))
        .into());
    }
    Ok((rows, cols))
}

fn check_weight_grid(weights: &[Vec<f64>], rows: usize, cols: usize) -> Result<()> {
    if weights.len() != rows || weights.iter().any(|row| row.len() != cols) {
        return Err(GeometryError::ShapeMismatch(format!(
            "weight grid does not match {rows}x{cols} control grid"
        ))
        .into());
    }
    let flat: Vec<f64> = weights.iter().flatten().copied().collect();
    validate_weights(&flat)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Curve;
    use crate::math::TOLERANCE;

    fn wavy_grid(rows: usize, cols: usize) -> Vec<Vec<Point3>> {
        (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| {
                        let (x, y) = (i as f64, j as f64);
                        Point3::new(x, y, (x * 0.7).sin() + (y * 0.4).cos())
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn bilinear_corners_and_center() {
        let s = SplineSurface::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        );
        assert!((s.evaluate(1.0, 1.0).unwrap() - Point3::new(1.0, 1.0, 1.0)).norm() < TOLERANCE);
        assert!((s.evaluate(0.5, 0.5).unwrap() - Point3::new(0.5, 0.5, 0.25)).norm() < TOLERANCE);
    }

    #[test]
    fn bezier_corners_interpolate() {
        let grid = wavy_grid(4, 3);
        let s = SplineSurface::bezier(grid.clone()).unwrap();
        assert_eq!((s.degree_u(), s.degree_v()), (3, 2));
        assert!((s.evaluate(0.0, 0.0).unwrap() - grid[0][0]).norm() < TOLERANCE);
        assert!((s.evaluate(1.0, 0.0).unwrap() - grid[3][0]).norm() < TOLERANCE);
        assert!((s.evaluate(0.0, 1.0).unwrap() - grid[0][2]).norm() < TOLERANCE);
        assert!((s.evaluate(1.0, 1.0).unwrap() - grid[3][2]).norm() < TOLERANCE);
    }

    #[test]
    fn ragged_grid_rejected() {
        let mut grid = wavy_grid(3, 3);
        grid[1].pop();
        assert!(SplineSurface::bezier(grid).is_err());
    }

    #[test]
    fn unit_weights_match_polynomial() {
        let grid = wavy_grid(3, 4);
        let poly = SplineSurface::bezier(grid.clone()).unwrap();
        let rational = SplineSurface::rational_bezier(grid, vec![vec![1.0; 4]; 3]).unwrap();
        for u in linspace(0.0, 1.0, 5) {
            for v in linspace(0.0, 1.0, 5) {
                let a = poly.evaluate(u, v).unwrap();
                let b = rational.evaluate(u, v).unwrap();
                assert!((a - b).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn bspline_with_bezier_knots_matches_bezier() {
        let grid = wavy_grid(4, 4);
        let bez = SplineSurface::bezier(grid.clone()).unwrap();
        let k = KnotVector::bezier(3).as_slice().to_vec();
        let bsp = SplineSurface::bspline(grid, k.clone(), k, 3, 3).unwrap();
        for (u, v) in [(0.1, 0.7), (0.5, 0.5), (1.0, 0.3)] {
            assert!((bez.evaluate(u, v).unwrap() - bsp.evaluate(u, v).unwrap()).norm() < 1e-12);
            let a = bez.derivatives(u, v, 2).unwrap();
            let b = bsp.derivatives(u, v, 2).unwrap();
            assert!((a[1][1] - b[1][1]).norm() < 1e-9);
            assert!((a[2][0] - b[2][0]).norm() < 1e-9);
        }
    }

    #[test]
    fn nurbs_partials_match_finite_differences() {
        let grid = wavy_grid(5, 4);
        let weights: Vec<Vec<f64>> = (0..5)
            .map(|i| (0..4).map(|j| 1.0 + 0.1 * i as f64 + 0.2 * j as f64).collect())
            .collect();
        let s = SplineSurface::nurbs(
            grid,
            weights,
            vec![0.0, 0.0, 0.0, 0.4, 0.6, 1.0, 1.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
            2,
            2,
        )
        .unwrap();
        let h = 1e-6;
        let (u, v) = (0.3, 0.7);
        let fd_u = (s.evaluate(u + h, v).unwrap() - s.evaluate(u - h, v).unwrap()) / (2.0 * h);
        let fd_v = (s.evaluate(u, v + h).unwrap() - s.evaluate(u, v - h).unwrap()) / (2.0 * h);
        assert!((fd_u - s.derivative_u(u, v, 1).unwrap()).norm() < 1e-5);
        assert!((fd_v - s.derivative_v(u, v, 1).unwrap()).norm() < 1e-5);
    }

    #[test]
    fn edge_curve_matches_surface_boundary() {
        let s = SplineSurface::bezier(wavy_grid(4, 3)).unwrap();
        for edge in SurfaceEdge::ALL {
            let c = s.edge_curve(edge).unwrap();
            for t in linspace(0.0, 1.0, 7) {
                let on_surface = match edge {
                    SurfaceEdge::U0 => s.evaluate(0.0, t),
                    SurfaceEdge::U1 => s.evaluate(1.0, t),
                    SurfaceEdge::V0 => s.evaluate(t, 0.0),
                    SurfaceEdge::V1 => s.evaluate(t, 1.0),
                }
                .unwrap();
                assert!((c.evaluate(t).unwrap() - on_surface).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn far_edge_derivative_points_inward() {
        let s = SplineSurface::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        );
        let inward_u1 = s.boundary_derivative(SurfaceEdge::U1, 0.5, 1).unwrap();
        let inward_u0 = s.boundary_derivative(SurfaceEdge::U0, 0.5, 1).unwrap();
        assert!((inward_u1 - Vector3::new(-2.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert!((inward_u0 - Vector3::new(2.0, 0.0, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn control_net_line_count() {
        let s = SplineSurface::bezier(wavy_grid(3, 4)).unwrap();
        // 3 rows of 3 segments, 4 columns of 2 segments
        assert_eq!(s.control_net_lines().len(), 17);
    }

    #[test]
    fn grid_shape_and_normal() {
        let s = SplineSurface::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );
        let grid = s.evaluate_grid(4, 6).unwrap();
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|row| row.len() == 6));
        let n = s.normal(0.5, 0.5).unwrap();
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn set_weight_rejects_polynomial_and_non_positive() {
        let mut s = SplineSurface::bezier(wavy_grid(2, 2)).unwrap();
        assert!(s.set_weight(0, 0, 2.0).is_err());
        let mut r = SplineSurface::rational_bezier(wavy_grid(2, 2), vec![vec![1.0; 2]; 2]).unwrap();
        assert!(r.set_weight(1, 1, 0.0).is_err());
        assert!(r.set_weight(1, 1, 3.0).is_ok());
        assert!((r.weight(1, 1) - 3.0).abs() < TOLERANCE);
    }
}
