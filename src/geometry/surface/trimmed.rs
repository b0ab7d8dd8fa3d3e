use crate::error::{GeometryError, Result};
use crate::geometry::curve::{CompositeCurve, Curve};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::polygon::point_in_polygon_2d;
use crate::math::{Point3, Vector3};

use super::{SplineSurface, Surface, SurfaceDomain};

/// Samples per boundary segment when classifying parameter points.
const BOUNDARY_SAMPLES: usize = 64;

/// A closed curve lying on a surface, given in the surface's parameter plane
/// (`x = u`, `y = v`, `z = 0`) and optionally also in model space.
#[derive(Debug, Clone)]
pub struct CurveOnSurface {
    parametric: CompositeCurve,
    model: Option<CompositeCurve>,
    info: GeometryInfo,
}

impl CurveOnSurface {
    /// Creates a curve on surface from its parameter-space image.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter-space curve is not closed.
    pub fn new(parametric: CompositeCurve) -> Result<Self> {
        if !parametric.is_closed() {
            return Err(GeometryError::Degenerate("trimming curves must be closed".into()).into());
        }
        Ok(Self {
            parametric,
            model: None,
            info: GeometryInfo::named("CurveOnSurface"),
        })
    }

    /// Attaches the model-space image of the curve.
    #[must_use]
    pub fn with_model(mut self, model: CompositeCurve) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn parametric(&self) -> &CompositeCurve {
        &self.parametric
    }

    #[must_use]
    pub fn model(&self) -> Option<&CompositeCurve> {
        self.model.as_ref()
    }

    /// Returns whether `(u, v)` is enclosed by the parameter-space curve.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be sampled.
    pub fn encloses(&self, u: f64, v: f64) -> Result<bool> {
        let polygon = self.parametric.polyline(BOUNDARY_SAMPLES)?;
        Ok(point_in_polygon_2d(u, v, &polygon))
    }
}

impl Geometry for CurveOnSurface {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

/// A spline surface restricted by an optional outer loop and any number of
/// holes. Without an outer loop the whole parameter domain is kept.
#[derive(Debug, Clone)]
pub struct TrimmedSurface {
    surface: SplineSurface,
    outer: Option<CurveOnSurface>,
    inner: Vec<CurveOnSurface>,
    info: GeometryInfo,
}

impl TrimmedSurface {
    #[must_use]
    pub fn new(surface: SplineSurface) -> Self {
        Self {
            surface,
            outer: None,
            inner: Vec::new(),
            info: GeometryInfo::named("TrimmedSurface"),
        }
    }

    #[must_use]
    pub fn with_outer(mut self, outer: CurveOnSurface) -> Self {
        self.outer = Some(outer);
        self
    }

    #[must_use]
    pub fn with_hole(mut self, hole: CurveOnSurface) -> Self {
        self.inner.push(hole);
        self
    }

    #[must_use]
    pub fn surface(&self) -> &SplineSurface {
        &self.surface
    }

    #[must_use]
    pub fn outer(&self) -> Option<&CurveOnSurface> {
        self.outer.as_ref()
    }

    #[must_use]
    pub fn inner(&self) -> &[CurveOnSurface] {
        &self.inner
    }

    /// Returns whether parameter point `(u, v)` belongs to the kept region.
    ///
    /// # Errors
    ///
    /// Returns an error if a trimming curve cannot be sampled.
    pub fn contains(&self, u: f64, v: f64) -> Result<bool> {
        if self.surface.domain().check(u, v).is_err() {
            return Ok(false);
        }
        if let Some(outer) = &self.outer {
            if !outer.encloses(u, v)? {
                return Ok(false);
            }
        }
        for hole in &self.inner {
            if hole.encloses(u, v)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Surface for TrimmedSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.surface.evaluate(u, v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        self.surface.normal(u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        self.surface.domain()
    }
}

impl Geometry for TrimmedSurface {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}

/// A spline surface bounded by loops known in both model and parameter space.
#[derive(Debug, Clone)]
pub struct BoundedSurface {
    surface: SplineSurface,
    boundaries: Vec<CurveOnSurface>,
    info: GeometryInfo,
}

impl BoundedSurface {
    /// Creates a bounded surface.
    ///
    /// # Errors
    ///
    /// Returns an error if no boundary is given or a boundary lacks its
    /// model-space curve.
    pub fn new(surface: SplineSurface, boundaries: Vec<CurveOnSurface>) -> Result<Self> {
        if boundaries.is_empty() {
            return Err(GeometryError::Degenerate("bounded surface without boundaries".into()).into());
        }
        if let Some(i) = boundaries.iter().position(|b| b.model().is_none()) {
            return Err(GeometryError::Degenerate(format!(
                "boundary {i} has no model-space curve"
            ))
            .into());
        }
        Ok(Self {
            surface,
            boundaries,
            info: GeometryInfo::named("BoundedSurface"),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &SplineSurface {
        &self.surface
    }

    #[must_use]
    pub fn boundaries(&self) -> &[CurveOnSurface] {
        &self.boundaries
    }
}

impl Surface for BoundedSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.surface.evaluate(u, v)
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        self.surface.normal(u, v)
    }

    fn domain(&self) -> SurfaceDomain {
        self.surface.domain()
    }
}

impl Geometry for BoundedSurface {
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
    use crate::geometry::curve::{CurveSegment, Line};

    fn square_loop(min: f64, max: f64) -> CompositeCurve {
        let corners = [
            Point3::new(min, min, 0.0),
            Point3::new(max, min, 0.0),
            Point3::new(max, max, 0.0),
            Point3::new(min, max, 0.0),
        ];
        let segments: Vec<CurveSegment> = (0..4)
            .map(|i| Line::new(corners[i], corners[(i + 1) % 4]).unwrap().into())
            .collect();
        CompositeCurve::new(segments).unwrap()
    }

    fn flat_patch() -> SplineSurface {
        SplineSurface::bilinear(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn hole_excludes_points() {
        let hole = CurveOnSurface::new(square_loop(0.4, 0.6)).unwrap();
        let t = TrimmedSurface::new(flat_patch()).with_hole(hole);
        assert!(t.contains(0.1, 0.1).unwrap());
        assert!(!t.contains(0.5, 0.5).unwrap());
        assert!(!t.contains(1.5, 0.5).unwrap());
    }

    #[test]
    fn outer_loop_restricts_domain() {
        let outer = CurveOnSurface::new(square_loop(0.2, 0.8)).unwrap();
        let t = TrimmedSurface::new(flat_patch()).with_outer(outer);
        assert!(t.contains(0.5, 0.5).unwrap());
        assert!(!t.contains(0.1, 0.5).unwrap());
    }

    #[test]
    fn open_curve_rejected() {
        let open = CompositeCurve::new(vec![Line::new(Point3::origin(), Point3::new(1.0, 0.0, 0.0))
            .unwrap()
            .into()])
        .unwrap();
        assert!(CurveOnSurface::new(open).is_err());
    }

    #[test]
    fn bounded_surface_needs_model_curves() {
        let boundary = CurveOnSurface::new(square_loop(0.0, 1.0)).unwrap();
        assert!(BoundedSurface::new(flat_patch(), vec![boundary.clone()]).is_err());
        let with_model = boundary.with_model(square_loop(0.0, 1.0));
        assert!(BoundedSurface::new(flat_patch(), vec![with_model]).is_ok());
    }
}
