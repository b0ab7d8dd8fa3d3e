//! G0/G1/G2 continuity between boundaries of spline curves and surfaces.
//!
//! The target's control rows nearest to its boundary are solved so that its
//! cross-boundary derivatives reproduce the source's. Only the rows at
//! distance `0..=order` from the target boundary move (plus the boundary
//! weights, which are copied for G0).

mod enforce;
mod multiface;
mod strip;
mod verify;

pub use enforce::EnforceContinuity;
pub use multiface::EnforceMultiface;
pub use strip::{BoundaryStrip, ControlNet};
pub use verify::{VerifyContinuity, DEFAULT_SAMPLES};

use crate::error::Result;

/// Geometric continuity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Continuity {
    /// Shared boundary positions.
    G0,
    /// Shared positions and tangent planes.
    G1,
    /// Shared positions, tangent planes and curvature.
    G2,
}

impl Continuity {
    /// Highest derivative order involved.
    #[must_use]
    pub fn level(self) -> usize {
        match self {
            Self::G0 => 0,
            Self::G1 => 1,
            Self::G2 => 2,
        }
    }
}

/// How edge parameters of the two sides correspond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Column `j` of the target meets column `j` of the source.
    #[default]
    Aligned,
    /// Column `j` of the target meets column `k - 1 - j` of the source.
    Reversed,
}

/// A pair of boundaries to be joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeLink<B> {
    pub target_edge: B,
    pub source_edge: B,
    pub orientation: Orientation,
}

impl<B> EdgeLink<B> {
    /// Links two boundaries with aligned edge parameters.
    #[must_use]
    pub fn new(target_edge: B, source_edge: B) -> Self {
        Self {
            target_edge,
            source_edge,
            orientation: Orientation::Aligned,
        }
    }

    /// Runs the source edge parameter backwards.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.orientation = Orientation::Reversed;
        self
    }
}

fn single_level<T, S>(
    target: &mut T,
    target_edge: T::Boundary,
    source: &S,
    source_edge: T::Boundary,
    level: usize,
    tension: f64,
) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    let strip = BoundaryStrip::extract(source, source_edge, level)?;
    enforce::enforce_level(target, EdgeLink::new(target_edge, source_edge), &strip, level, tension)
}

fn single_level_on_self<N: ControlNet>(
    net: &mut N,
    target_edge: N::Boundary,
    source_edge: N::Boundary,
    level: usize,
    tension: f64,
) -> Result<()> {
    let link = EdgeLink::new(target_edge, source_edge);
    enforce::check_self_link(&*net, link, level)?;
    let strip = BoundaryStrip::extract(&*net, source_edge, level)?;
    enforce::enforce_level(net, link, &strip, level, tension)
}

/// Copies the source boundary (points and weights) onto the target boundary.
///
/// # Errors
///
/// Returns [`crate::error::ContinuityError::IncompatibleEdge`] if the
/// boundaries cannot be matched.
pub fn enforce_g0<T, S>(target: &mut T, target_edge: T::Boundary, source: &S, source_edge: T::Boundary) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    single_level(target, target_edge, source, source_edge, 0, 1.0)
}

/// Moves the first interior row of the target so that its inward
/// derivative equals `f` times the source's outward derivative.
///
/// Rational nets are solved column by column, which holds along the whole
/// edge only when the weights of rows 0 and 1 on each side are proportional
/// (as with separable weight grids `w[i][j] = a[i] * b[j]`). Other weight
/// layouts are refused rather than joined approximately.
///
/// # Errors
///
/// Returns an error if the boundaries are incompatible, the degree across
/// either boundary is below 1, or `f` is not finite and positive, and
/// [`crate::error::ContinuityError::NonSeparableWeights`] for the weight
/// layouts described above.
pub fn enforce_g1<T, S>(
    target: &mut T,
    target_edge: T::Boundary,
    source: &S,
    source_edge: T::Boundary,
    f: f64,
) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    single_level(target, target_edge, source, source_edge, 1, f)
}

/// Moves the second interior row of the target so that its second inward
/// derivative equals `f²` times the source's.
///
/// The same weight restriction as [`enforce_g1`] applies to rows 0 to 2.
///
/// # Errors
///
/// Returns an error if the boundaries are incompatible, the degree across
/// either boundary is below 2, `f` is not finite and positive, or the
/// weights are not separable.
pub fn enforce_g2<T, S>(
    target: &mut T,
    target_edge: T::Boundary,
    source: &S,
    source_edge: T::Boundary,
    f: f64,
) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    single_level(target, target_edge, source, source_edge, 2, f)
}

/// G0 then G1.
///
/// # Errors
///
/// See [`enforce_g1`].
pub fn enforce_g0g1<T, S>(
    target: &mut T,
    source: &S,
    target_edge: T::Boundary,
    source_edge: T::Boundary,
    f: f64,
) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    EnforceContinuity::new(EdgeLink::new(target_edge, source_edge), Continuity::G1)
        .with_tension(f)
        .execute(target, source)
}

/// G0, G1 and G2 in order.
///
/// # Errors
///
/// See [`enforce_g2`].
pub fn enforce_g0g1g2<T, S>(
    target: &mut T,
    source: &S,
    target_edge: T::Boundary,
    source_edge: T::Boundary,
    f: f64,
) -> Result<()>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    EnforceContinuity::new(EdgeLink::new(target_edge, source_edge), Continuity::G2)
        .with_tension(f)
        .execute(target, source)
}

/// [`enforce_g0`] between two boundaries of the same net.
///
/// The two boundaries must be opposite and their control rows must not
/// overlap.
///
/// # Errors
///
/// See [`enforce_g0`]; overlapping rows are
/// [`crate::error::ContinuityError::OverlappingRows`].
pub fn enforce_g0_self<N: ControlNet>(net: &mut N, target_edge: N::Boundary, source_edge: N::Boundary) -> Result<()> {
    single_level_on_self(net, target_edge, source_edge, 0, 1.0)
}

/// [`enforce_g1`] between two boundaries of the same net (at least four
/// rows deep).
///
/// # Errors
///
/// See [`enforce_g1`] and [`enforce_g0_self`].
pub fn enforce_g1_self<N: ControlNet>(
    net: &mut N,
    target_edge: N::Boundary,
    source_edge: N::Boundary,
    f: f64,
) -> Result<()> {
    single_level_on_self(net, target_edge, source_edge, 1, f)
}

/// [`enforce_g2`] between two boundaries of the same net (at least six
/// rows deep).
///
/// # Errors
///
/// See [`enforce_g2`] and [`enforce_g0_self`].
pub fn enforce_g2_self<N: ControlNet>(
    net: &mut N,
    target_edge: N::Boundary,
    source_edge: N::Boundary,
    f: f64,
) -> Result<()> {
    single_level_on_self(net, target_edge, source_edge, 2, f)
}

/// Whether the boundaries coincide.
///
/// # Errors
///
/// Only evaluation failures are errors; a mismatch is `Ok(false)`.
pub fn verify_g0<T, S>(
    target: &T,
    source: &S,
    target_edge: T::Boundary,
    source_edge: T::Boundary,
    tolerance: f64,
) -> Result<bool>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    let link = EdgeLink::new(target_edge, source_edge);
    verify::check_level(target, source, link, 0, tolerance, DEFAULT_SAMPLES)
}

/// Whether the unit cross-boundary tangents agree (target inward against
/// source outward).
///
/// # Errors
///
/// Returns an error if a cross-boundary tangent vanishes.
pub fn verify_g1<T, S>(
    target: &T,
    source: &S,
    target_edge: T::Boundary,
    source_edge: T::Boundary,
    tolerance: f64,
) -> Result<bool>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    let link = EdgeLink::new(target_edge, source_edge);
    verify::check_level(target, source, link, 1, tolerance, DEFAULT_SAMPLES)
}

/// Whether the curvature vectors of the cross-boundary curves agree.
///
/// # Errors
///
/// Returns an error if a cross-boundary tangent vanishes.
pub fn verify_g2<T, S>(
    target: &T,
    source: &S,
    target_edge: T::Boundary,
    source_edge: T::Boundary,
    tolerance: f64,
) -> Result<bool>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    let link = EdgeLink::new(target_edge, source_edge);
    verify::check_level(target, source, link, 2, tolerance, DEFAULT_SAMPLES)
}
