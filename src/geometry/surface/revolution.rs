use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::{Rotation3, Unit};
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::curve::{Curve, Line, SplineCurve};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::units::Angle;

use super::{unit_normal, SplineSurface, Surface, SurfaceDomain};

/// A profile curve swept about an axis between two angles.
///
/// `u` follows the profile, `v` is the rotation angle in radians.
#[derive(Debug, Clone)]
pub struct SurfaceOfRevolution {
    axis: Line,
    profile: SplineCurve,
    start: Angle,
    end: Angle,
    info: GeometryInfo,
}

impl SurfaceOfRevolution {
    /// Creates a surface of revolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep is not in `(0, 2π]`.
    pub fn new(axis: Line, profile: SplineCurve, start: Angle, end: Angle) -> Result<Self> {
        sweep_of(start, end)?;
        Ok(Self {
            axis,
            profile,
            start,
            end,
            info: GeometryInfo::named("SurfaceOfRevolution"),
        })
    }

    #[must_use]
    pub fn axis(&self) -> &Line {
        &self.axis
    }

    #[must_use]
    pub fn profile(&self) -> &SplineCurve {
        &self.profile
    }

    #[must_use]
    pub fn start(&self) -> Angle {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Angle {
        self.end
    }

    fn rotation(&self, angle: f64) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Unit::new_normalize(self.axis.vector()), angle)
    }

    /// Converts to the equivalent exact NURBS surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep is invalid.
    pub fn to_spline(&self) -> Result<SplineSurface> {
        Ok(SplineSurface::revolve(&self.profile, &self.axis, self.start, self.end)?.named(self.name()))
    }
}

impl Surface for SurfaceOfRevolution {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let (u, v) = self.domain().check(u, v)?;
        let p = self.profile.evaluate(u)?;
        let origin = self.axis.p0();
        Ok(origin + self.rotation(v) * (p - origin))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let (u, v) = self.domain().check(u, v)?;
        let rot = self.rotation(v);
        let p = self.profile.evaluate(u)?;
        let su = rot * self.profile.tangent(u)?;
        let radial = rot * (p - self.axis.p0());
        let sv = self.axis.direction().cross(&radial);
        unit_normal(&su, &sv)
    }

    fn domain(&self) -> SurfaceDomain {
        let d = self.profile.domain();
        SurfaceDomain::new(d.t_min, d.t_max, self.start.rad(), self.end.rad())
    }
}

impl Geometry for SurfaceOfRevolution {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

fn sweep_of(start: Angle, end: Angle) -> Result<f64> {
    let sweep = end.rad() - start.rad();
    if !(sweep > TOLERANCE && sweep <= TAU + TOLERANCE) {
        return Err(GeometryError::Degenerate(format!(
            "revolution sweep {sweep} rad must lie in (0, 2π]"
        ))
        .into());
    }
    Ok(sweep.min(TAU))
}

impl SplineSurface {
    /// Sweeps `profile` about `axis` from `start` to `end`, producing an exact
    /// NURBS surface: the profile runs along u, and each profile control point
    /// traces rational quadratic arcs along v (one arc per started quarter
    /// turn).
    ///
    /// # Errors
    ///
    /// Returns an error if the sweep is not in `(0, 2π]`.
    pub fn revolve(profile: &SplineCurve, axis: &Line, start: Angle, end: Angle) -> Result<Self> {
        let sweep = sweep_of(start, end)?;
        let narcs: u32 = match sweep / FRAC_PI_2 {
            q if q <= 1.0 + TOLERANCE => 1,
            q if q <= 2.0 + TOLERANCE => 2,
            q if q <= 3.0 + TOLERANCE => 3,
            _ => 4,
        };
        let dtheta = sweep / f64::from(narcs);
        let wm = (dtheta / 2.0).cos();
        debug!(narcs, sweep, "revolving profile");

        let origin = axis.p0();
        let dir = axis.direction();
        let cols = 2 * narcs as usize + 1;

        let mut grid = Vec::with_capacity(profile.control_points().len());
        let mut weights = Vec::with_capacity(profile.control_points().len());
        for (i, p) in profile.control_points().iter().enumerate() {
            let center = origin + dir * (p - origin).dot(&dir);
            let offset = p - center;
            let radius = offset.norm();
            let (x, y) = if radius < TOLERANCE {
                (Vector3::zeros(), Vector3::zeros())
            } else {
                let x = offset / radius;
                (x, dir.cross(&x))
            };
            let on_circle = |angle: f64, r: f64| center + (x * angle.cos() + y * angle.sin()) * r;

            let mut row = Vec::with_capacity(cols);
            let mut row_w = Vec::with_capacity(cols);
            let w = profile.weight(i);
            row.push(on_circle(start.rad(), radius));
            row_w.push(w);
            for k in 0..narcs {
                let a0 = start.rad() + dtheta * f64::from(k);
                row.push(on_circle(a0 + dtheta / 2.0, radius / wm));
                row_w.push(w * wm);
                row.push(on_circle(a0 + dtheta, radius));
                row_w.push(w);
            }
            grid.push(row);
            weights.push(row_w);
        }

        let mut knots_v = vec![0.0; 3];
        for k in 1..narcs {
            let t = f64::from(k) / f64::from(narcs);
            knots_v.extend([t, t]);
        }
        knots_v.extend([1.0; 3]);

        let knots_u = profile.knots().as_slice().to_vec();
        Ok(Self::nurbs(grid, weights, knots_u, knots_v, profile.degree(), 2)?.named("RevolvedSurface"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::linspace;

    fn z_axis() -> Line {
        Line::new(Point3::origin(), Point3::new(0.0, 0.0, 1.0)).unwrap()
    }

    fn vertical_segment() -> SplineCurve {
        SplineCurve::bezier(vec![Point3::new(2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 3.0)]).unwrap()
    }

    #[test]
    fn cylinder_radius_is_exact() {
        for degrees in [30.0, 90.0, 135.0, 270.0, 360.0] {
            let s = SplineSurface::revolve(
                &vertical_segment(),
                &z_axis(),
                Angle::from_deg(0.0),
                Angle::from_deg(degrees),
            )
            .unwrap();
            for row in s.evaluate_grid(5, 13).unwrap() {
                for p in row {
                    assert!((p.x.hypot(p.y) - 2.0).abs() < 1e-10);
                }
            }
        }
    }

    #[test]
    fn arc_count_follows_sweep() {
        let s = |deg: f64| {
            SplineSurface::revolve(&vertical_segment(), &z_axis(), Angle::from_deg(0.0), Angle::from_deg(deg))
                .unwrap()
                .cols()
        };
        assert_eq!(s(45.0), 3);
        assert_eq!(s(90.0), 3);
        assert_eq!(s(180.0), 5);
        assert_eq!(s(360.0), 9);
    }

    #[test]
    fn end_angle_matches_analytic_surface() {
        let rev = SurfaceOfRevolution::new(
            z_axis(),
            vertical_segment(),
            Angle::from_deg(10.0),
            Angle::from_deg(200.0),
        )
        .unwrap();
        let spline = rev.to_spline().unwrap();
        for u in linspace(0.0, 1.0, 4) {
            let a = rev.evaluate(u, Angle::from_deg(200.0).rad()).unwrap();
            let b = spline.evaluate(u, 1.0).unwrap();
            assert!((a - b).norm() < 1e-12);
            let a = rev.evaluate(u, Angle::from_deg(10.0).rad()).unwrap();
            let b = spline.evaluate(u, 0.0).unwrap();
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn cylinder_normal_is_radial() {
        let rev = SurfaceOfRevolution::new(
            z_axis(),
            vertical_segment(),
            Angle::from_deg(0.0),
            Angle::from_deg(360.0),
        )
        .unwrap();
        let n = rev.normal(0.5, 0.0).unwrap();
        assert!((n.abs() - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn invalid_sweep_rejected() {
        assert!(SplineSurface::revolve(
            &vertical_segment(),
            &z_axis(),
            Angle::from_deg(90.0),
            Angle::from_deg(90.0)
        )
        .is_err());
        assert!(SurfaceOfRevolution::new(
            z_axis(),
            vertical_segment(),
            Angle::from_deg(0.0),
            Angle::from_deg(400.0)
        )
        .is_err());
    }
}
