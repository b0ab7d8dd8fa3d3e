use crate::error::Result;
use crate::geometry::curve::{Curve, SplineCurve};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::{Point3, Vector3};

use super::{unit_normal, Surface, SurfaceDomain};

/// The surface swept by straight rulings between two rails.
///
/// Both rails are reparameterized onto `u ∈ [0, 1]`; `v ∈ [0, 1]` runs from
/// the first rail to the second.
#[derive(Debug, Clone)]
pub struct RuledSurface {
    first: SplineCurve,
    second: SplineCurve,
    info: GeometryInfo,
}

impl RuledSurface {
    #[must_use]
    pub fn new(first: SplineCurve, second: SplineCurve) -> Self {
        Self {
            first,
            second,
            info: GeometryInfo::named("RuledSurface"),
        }
    }

    #[must_use]
    pub fn first(&self) -> &SplineCurve {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &SplineCurve {
        &self.second
    }

    /// Rail parameter and chain-rule scale for normalized `u`.
    fn rail_parameter(rail: &SplineCurve, u: f64) -> (f64, f64) {
        let d = rail.domain();
        let span = d.t_max - d.t_min;
        (d.t_min + u * span, span)
    }
}

impl Surface for RuledSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let (u, v) = self.domain().check(u, v)?;
        let (ta, _) = Self::rail_parameter(&self.first, u);
        let (tb, _) = Self::rail_parameter(&self.second, u);
        let a = self.first.evaluate(ta)?;
        let b = self.second.evaluate(tb)?;
        Ok(a + (b - a) * v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let (u, v) = self.domain().check(u, v)?;
        let (ta, sa) = Self::rail_parameter(&self.first, u);
        let (tb, sb) = Self::rail_parameter(&self.second, u);
        let da = self.first.tangent(ta)? * sa;
        let db = self.second.tangent(tb)? * sb;
        let su = da * (1.0 - v) + db * v;
        let sv = self.second.evaluate(tb)? - self.first.evaluate(ta)?;
        unit_normal(&su, &sv)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, 0.0, 1.0)
    }
}

impl Geometry for RuledSurface {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}
