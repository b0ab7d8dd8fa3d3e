#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{GeometryError, Result};
use crate::geometry::eval::{
    active_basis, check_parameter, curvature_vector, rational_curve_derivatives,
};
use crate::geometry::{validate_weights, Geometry, GeometryInfo, KnotVector, SplineForm};
use crate::math::bernstein::{de_casteljau, hodograph};
use crate::math::{homogeneous, linspace, Point3, Vector3, Vector4, TOLERANCE};

use super::{Curve, CurveDomain, Line};

/// A Bézier, rational Bézier, B-spline or NURBS curve.
///
/// All four forms share one representation: a degree, an ordered control
/// polygon, optional weights (rational forms only) and a clamped knot vector
/// (implicit `[0, …, 0, 1, …, 1]` for the Bézier forms). The form tag selects
/// the evaluation strategy.
#[derive(Debug, Clone)]
pub struct SplineCurve {
    form: SplineForm,
    degree: usize,
    control_points: Vec<Point3>,
    weights: Option<Vec<f64>>,
    knots: KnotVector,
    info: GeometryInfo,
}

impl SplineCurve {
    /// Creates a Bézier curve of degree `points.len() - 1`.
    ///
    /// # Errors
    ///
    /// Returns an error if no control points are given.
    pub fn bezier(points: Vec<Point3>) -> Result<Self> {
        let degree = bezier_degree(&points)?;
        Ok(Self::assemble(SplineForm::Bezier, degree, points, None, KnotVector::bezier(degree)))
    }

    /// Creates a rational Bézier curve.
    ///
    /// # Errors
    ///
    /// Returns an error if no control points are given, the weight count does
    /// not match, or a weight is not strictly positive.
    pub fn rational_bezier(points: Vec<Point3>, weights: Vec<f64>) -> Result<Self> {
        let degree = bezier_degree(&points)?;
        check_weights(&points, &weights)?;
        Ok(Self::assemble(
            SplineForm::RationalBezier,
            degree,
            points,
            Some(weights),
            KnotVector::bezier(degree),
        ))
    }

    /// Creates a (non-rational) B-spline curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the knot vector is invalid for the control points
    /// and degree.
    pub fn bspline(points: Vec<Point3>, knots: Vec<f64>, degree: usize) -> Result<Self> {
        let knots = KnotVector::new(knots, degree, points.len())?;
        Ok(Self::assemble(SplineForm::BSpline, degree, points, None, knots))
    }

    /// Creates a NURBS curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the knot vector is invalid, the weight count does not
    /// match, or a weight is not strictly positive.
    pub fn nurbs(points: Vec<Point3>, weights: Vec<f64>, knots: Vec<f64>, degree: usize) -> Result<Self> {
        let knots = KnotVector::new(knots, degree, points.len())?;
        check_weights(&points, &weights)?;
        Ok(Self::assemble(SplineForm::Nurbs, degree, points, Some(weights), knots))
    }

    /// Converts a line segment into a degree-1 Bézier curve.
    #[must_use]
    pub fn from_line(line: &Line) -> Self {
        let mut curve = Self::assemble(
            SplineForm::Bezier,
            1,
            vec![*line.p0(), *line.p1()],
            None,
            KnotVector::bezier(1),
        );
        curve.info.name.clone_from(&line.info().name);
        curve
    }

    fn assemble(
        form: SplineForm,
        degree: usize,
        control_points: Vec<Point3>,
        weights: Option<Vec<f64>>,
        knots: KnotVector,
    ) -> Self {
        Self {
            form,
            degree,
            control_points,
            weights,
            knots,
            info: GeometryInfo::named(format!("{}Curve", form.label())),
        }
    }

    /// Sets the name and returns the curve.
    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    /// Returns the representation tag.
    #[must_use]
    pub fn form(&self) -> SplineForm {
        self.form
    }

    /// Returns the polynomial degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Returns the control polygon.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    /// Returns the explicit weights (rational forms only).
    #[must_use]
    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Returns the weight of control point `i` (1 for polynomial forms).
    #[must_use]
    pub fn weight(&self, i: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[i])
    }

    /// Returns the knot vector (implicit for Bézier forms).
    #[must_use]
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    /// Replaces control point `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if `i` is out of range.
    pub fn set_control_point(&mut self, i: usize, point: Point3) -> Result<()> {
        let n = self.control_points.len();
        let slot = self.control_points.get_mut(i).ok_or_else(|| {
            GeometryError::ShapeMismatch(format!("control point index {i} out of range 0..{n}"))
        })?;
        *slot = point;
        Ok(())
    }

    /// Replaces the weight of control point `i`.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve is polynomial, `i` is out of range, or the
    /// weight is not strictly positive.
    pub fn set_weight(&mut self, i: usize, weight: f64) -> Result<()> {
        let weights = self.weights.as_mut().ok_or_else(|| {
            GeometryError::ShapeMismatch("polynomial curves carry no weights".into())
        })?;
        if !(weight.is_finite() && weight > 0.0) {
            return Err(GeometryError::InvalidWeight { index: i, value: weight }.into());
        }
        let n = weights.len();
        let slot = weights.get_mut(i).ok_or_else(|| {
            GeometryError::ShapeMismatch(format!("weight index {i} out of range 0..{n}"))
        })?;
        *slot = weight;
        Ok(())
    }

    /// Control points lifted to homogeneous coordinates.
    #[must_use]
    pub fn homogeneous_points(&self) -> Vec<Vector4> {
        self.control_points
            .iter()
            .enumerate()
            .map(|(i, p)| homogeneous(p, self.weight(i)))
            .collect()
    }

    /// Returns the derivatives `C^(k)(t)` for `k` in `0..=order`; index 0 is
    /// the position as a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the domain.
    pub fn derivatives(&self, t: f64, order: usize) -> Result<Vec<Vector3>> {
        let t = check_parameter("t", t, &self.knots)?;
        let pw = self.homogeneous_points();
        let aders: Vec<Vector4> = if self.form.is_bezier() {
            let span = self.knots.end() - self.knots.start();
            let local = (t - self.knots.start()) / span;
            let mut net = pw;
            let mut scale = 1.0;
            let mut out = Vec::with_capacity(order + 1);
            for _ in 0..=order {
                if net.is_empty() {
                    out.push(Vector4::zeros());
                    continue;
                }
                out.push(de_casteljau(&net, local) * scale);
                net = hodograph(&net);
                scale /= span;
            }
            out
        } else {
            let basis = active_basis(self.form, self.degree, &self.knots, pw.len(), t, order);
            basis
                .ders
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .fold(Vector4::zeros(), |acc, (j, b)| acc + pw[basis.first + j] * *b)
                })
                .collect()
        };
        Ok(rational_curve_derivatives(&aders))
    }

    /// Returns the `order`-th derivative at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the domain.
    pub fn derivative(&self, t: f64, order: usize) -> Result<Vector3> {
        let ders = self.derivatives(t, order)?;
        Ok(ders[order])
    }

    /// Returns the curvature `|C' × C''| / |C'|³` at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the domain or `C'(t)` vanishes.
    pub fn curvature(&self, t: f64) -> Result<f64> {
        let ders = self.derivatives(t, 2)?;
        let speed = ders[1].norm();
        if speed < TOLERANCE {
            return Err(GeometryError::Degenerate(
                "curvature is undefined where the first derivative vanishes".into(),
            )
            .into());
        }
        Ok(ders[1].cross(&ders[2]).norm() / speed.powi(3))
    }

    /// Returns the curvature vector (pointing to the center of curvature, with
    /// magnitude equal to the curvature) at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside the domain or `C'(t)` vanishes.
    pub fn curvature_vector(&self, t: f64) -> Result<Vector3> {
        let ders = self.derivatives(t, 2)?;
        curvature_vector(&ders[1], &ders[2])
    }

    /// Returns the same curve traversed in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.control_points.clone();
        points.reverse();
        let weights = self.weights.as_ref().map(|w| w.iter().rev().copied().collect());
        Self {
            form: self.form,
            degree: self.degree,
            control_points: points,
            weights,
            knots: self.knots.mirrored(),
            info: self.info.clone(),
        }
    }

    fn point_at(&self, t: f64) -> Point3 {
        let local = (t - self.knots.start()) / (self.knots.end() - self.knots.start());
        match self.form {
            SplineForm::Bezier => {
                let coords: Vec<Vector3> = self.control_points.iter().map(|p| p.coords).collect();
                Point3::from(de_casteljau(&coords, local))
            }
            SplineForm::RationalBezier => {
                let h = de_casteljau(&self.homogeneous_points(), local);
                Point3::from(h.xyz() / h.w)
            }
            SplineForm::BSpline | SplineForm::Nurbs => {
                let pw = self.homogeneous_points();
                let basis = active_basis(self.form, self.degree, &self.knots, pw.len(), t, 0);
                let h = basis.ders[0]
                    .iter()
                    .enumerate()
                    .fold(Vector4::zeros(), |acc, (j, b)| acc + pw[basis.first + j] * *b);
                Point3::from(h.xyz() / h.w)
            }
        }
    }
}

impl Curve for SplineCurve {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        let t = check_parameter("t", t, &self.knots)?;
        Ok(self.point_at(t))
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        self.derivative(t, 1)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(self.knots.start(), self.knots.end())
    }

    fn is_closed(&self) -> bool {
        match (self.control_points.first(), self.control_points.last()) {
            (Some(a), Some(b)) => self.control_points.len() > 1 && (a - b).norm() < TOLERANCE,
            _ => false,
        }
    }

    fn evaluate_grid(&self, n: usize) -> Result<Vec<Point3>> {
        let params = linspace(self.knots.start(), self.knots.end(), n);
        #[cfg(feature = "parallel")]
        let points = params.par_iter().map(|&t| self.point_at(t)).collect();
        #[cfg(not(feature = "parallel"))]
        let points = params.iter().map(|&t| self.point_at(t)).collect();
        Ok(points)
    }
}

impl Geometry for SplineCurve {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

fn bezier_degree(points: &[Point3]) -> Result<usize> {
    if points.is_empty() {
        return Err(GeometryError::Degenerate("a curve needs at least one control point".into()).into());
    }
    Ok(points.len() - 1)
}

fn check_weights(points: &[Point3], weights: &[f64]) -> Result<()> {
    if weights.len() != points.len() {
        return Err(GeometryError::ShapeMismatch(format!(
            "{} weights for {} control points",
            weights.len(),
            points.len()
        ))
        .into());
    }
    validate_weights(weights)
}
