pub mod curve;
pub(crate) mod eval;
mod knots;
pub mod surface;

pub use curve::{CompositeCurve, Curve, CurveDomain, CurveEnd, CurveSegment, Line, SplineCurve};
pub use knots::KnotVector;
pub use surface::{
    BoundedSurface, CurveOnSurface, Plane, RuledSurface, SplineSurface, Surface, SurfaceDomain,
    SurfaceEdge, SurfaceOfRevolution, TrimmedSurface,
};

use crate::error::{GeometryError, Result};

/// Representation tag shared by spline curves and surfaces.
///
/// Bézier forms are the single-span specialization of the B-spline forms; the
/// rational forms carry a strictly positive weight per control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineForm {
    Bezier,
    RationalBezier,
    BSpline,
    Nurbs,
}

impl SplineForm {
    /// Returns whether control points carry explicit weights.
    #[must_use]
    pub fn is_rational(self) -> bool {
        matches!(self, Self::RationalBezier | Self::Nurbs)
    }

    /// Returns whether the form is a single Bézier span.
    #[must_use]
    pub fn is_bezier(self) -> bool {
        matches!(self, Self::Bezier | Self::RationalBezier)
    }

    /// Picks the form for the given span structure and rationality.
    #[must_use]
    pub fn classify(single_span: bool, rational: bool) -> Self {
        match (single_span, rational) {
            (true, false) => Self::Bezier,
            (true, true) => Self::RationalBezier,
            (false, false) => Self::BSpline,
            (false, true) => Self::Nurbs,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Bezier => "Bezier",
            Self::RationalBezier => "RationalBezier",
            Self::BSpline => "BSpline",
            Self::Nurbs => "NURBS",
        }
    }
}

/// Identity and export metadata attached to every geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryInfo {
    /// Diagnostic name, also used to group entities on export.
    pub name: String,
    /// Helper geometry that collaborators should not export.
    pub construction: bool,
}

impl GeometryInfo {
    /// Creates metadata for a regular (exportable) geometry.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            construction: false,
        }
    }
}

/// Access to the metadata collaborators rely on.
pub trait Geometry {
    /// Returns the metadata block.
    fn info(&self) -> &GeometryInfo;

    /// Returns the metadata block mutably.
    fn info_mut(&mut self) -> &mut GeometryInfo;

    /// Returns the geometry name.
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Returns whether this is construction (helper) geometry.
    fn is_construction(&self) -> bool {
        self.info().construction
    }

    /// Renames the geometry.
    fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.info_mut().name);
    }

    /// Marks or unmarks the geometry as construction geometry.
    fn set_construction(&mut self, construction: bool) {
        self.info_mut().construction = construction;
    }
}

/// Rejects any weight that is not strictly positive and finite.
pub(crate) fn validate_weights(weights: &[f64]) -> Result<()> {
    match weights
        .iter()
        .enumerate()
        .find(|(_, w)| !(w.is_finite() && **w > 0.0))
    {
        Some((index, &value)) => Err(GeometryError::InvalidWeight { index, value }.into()),
        None => Ok(()),
    }
}
