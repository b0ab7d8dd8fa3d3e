//! Evaluation kernel shared by spline curves and surfaces.
//!
//! Every form is evaluated in homogeneous coordinates (polynomial forms use
//! unit weights), and the quotient rule turns homogeneous derivatives into
//! Cartesian ones.

use super::{KnotVector, SplineForm};
use crate::error::{GeometryError, Result};
use crate::math::basis::{ders_basis_funs, find_span};
use crate::math::bernstein::bernstein_derivatives;
use crate::math::{binomial, Vector3, Vector4};

/// Non-zero basis functions of one parametric direction at a parameter.
pub(crate) struct ActiveBasis {
    /// Index of the control point multiplied by `ders[_][0]`.
    pub first: usize,
    /// `ders[k][j]`: k-th derivative of basis function `first + j`.
    pub ders: Vec<Vec<f64>>,
}

/// Evaluates the active basis of one direction, choosing the Bernstein or
/// the Cox–de Boor strategy from the form.
pub(crate) fn active_basis(
    form: SplineForm,
    degree: usize,
    knots: &KnotVector,
    n_control_points: usize,
    t: f64,
    order: usize,
) -> ActiveBasis {
    if form.is_bezier() {
        let (a, b) = (knots.start(), knots.end());
        let span = b - a;
        let local = (t - a) / span;
        let mut ders = bernstein_derivatives(degree, local, order);
        let mut scale = 1.0;
        for row in ders.iter_mut().skip(1) {
            scale /= span;
            for v in row.iter_mut() {
                *v *= scale;
            }
        }
        ActiveBasis { first: 0, ders }
    } else {
        let span = find_span(n_control_points - 1, degree, t, knots.as_slice());
        let ders = ders_basis_funs(span, t, degree, order, knots.as_slice());
        ActiveBasis {
            first: span - degree,
            ders,
        }
    }
}

/// Turns homogeneous derivatives `A^(k)` (with weight in `w`) into Cartesian
/// derivatives of the projected curve.
pub(crate) fn rational_curve_derivatives(aders: &[Vector4]) -> Vec<Vector3> {
    let w0 = aders[0].w;
    let mut ck: Vec<Vector3> = Vec::with_capacity(aders.len());
    for k in 0..aders.len() {
        let mut v = aders[k].xyz();
        for i in 1..=k {
            v -= ck[k - i] * (binomial(k, i) * aders[i].w);
        }
        ck.push(v / w0);
    }
    ck
}

/// Surface version of [`rational_curve_derivatives`]: `skl[k][l]` for
/// `k + l <= order`.
pub(crate) fn rational_surface_derivatives(aders: &[Vec<Vector4>], order: usize) -> Vec<Vec<Vector3>> {
    let w00 = aders[0][0].w;
    let mut skl = vec![vec![Vector3::zeros(); order + 1]; order + 1];
    for k in 0..=order {
        for l in 0..=(order - k) {
            let mut v = aders[k][l].xyz();
            for j in 1..=l {
                v -= skl[k][l - j] * (binomial(l, j) * aders[0][j].w);
            }
            for i in 1..=k {
                v -= skl[k - i][l] * (binomial(k, i) * aders[i][0].w);
                let mut v2 = Vector3::zeros();
                for j in 1..=l {
                    v2 += skl[k - i][l - j] * (binomial(l, j) * aders[i][j].w);
                }
                v -= v2 * binomial(k, i);
            }
            skl[k][l] = v / w00;
        }
    }
    skl
}

/// Rejects parameters outside `[start, end]` and clamps round-off at the ends.
pub(crate) fn check_parameter(name: &'static str, t: f64, knots: &KnotVector) -> Result<f64> {
    if !t.is_finite() || !knots.contains(t) {
        return Err(GeometryError::ParameterOutOfRange {
            parameter: name,
            value: t,
            min: knots.start(),
            max: knots.end(),
        }
        .into());
    }
    Ok(t.clamp(knots.start(), knots.end()))
}

/// Curvature vector `(C'' − (C''·T)T) / |C'|²` from the first two derivatives.
pub(crate) fn curvature_vector(d1: &Vector3, d2: &Vector3) -> Result<Vector3> {
    let speed_sq = d1.norm_squared();
    if speed_sq.sqrt() < crate::math::TOLERANCE {
        return Err(GeometryError::Degenerate(
            "curvature is undefined where the first derivative vanishes".into(),
        )
        .into());
    }
    let tangent = d1 / speed_sq.sqrt();
    Ok((d2 - tangent * d2.dot(&tangent)) / speed_sq)
}
