use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::eval::curvature_vector;
use crate::math::{linspace, vectors_close, Vector3, TOLERANCE};

use super::strip::ControlNet;
use super::{Continuity, EdgeLink, Orientation};

/// Default number of edge parameters checked by verification.
pub const DEFAULT_SAMPLES: usize = 11;

/// Checks whether two boundaries meet with the requested continuity.
///
/// Every level up to the requested one is checked at evenly spaced edge
/// parameters. A geometric mismatch yields `Ok(false)`.
pub struct VerifyContinuity<B> {
    link: EdgeLink<B>,
    order: Continuity,
    tolerance: f64,
    samples: usize,
}

impl<B: Copy + Ord + std::fmt::Display + std::fmt::Debug> VerifyContinuity<B> {
    /// Creates a new `VerifyContinuity` check.
    #[must_use]
    pub fn new(link: EdgeLink<B>, order: Continuity, tolerance: f64) -> Self {
        Self {
            link,
            order,
            tolerance,
            samples: DEFAULT_SAMPLES,
        }
    }

    /// Sets the number of edge parameters to sample (at least one).
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples.max(1);
        self
    }

    /// Runs the check.
    ///
    /// # Errors
    ///
    /// Returns an error if a cross-boundary derivative vanishes where a
    /// tangent or curvature is needed.
    pub fn execute<T, S>(&self, target: &T, source: &S) -> Result<bool>
    where
        T: ControlNet<Boundary = B>,
        S: ControlNet<Boundary = B>,
    {
        for level in 0..=self.order.level() {
            if !check_level(target, source, self.link, level, self.tolerance, self.samples)? {
                debug!(
                    target_edge = %self.link.target_edge,
                    source_edge = %self.link.source_edge,
                    level,
                    "continuity check failed"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Checks a single continuity level.
pub(super) fn check_level<T, S>(
    target: &T,
    source: &S,
    link: EdgeLink<T::Boundary>,
    level: usize,
    tolerance: f64,
    samples: usize,
) -> Result<bool>
where
    T: ControlNet,
    S: ControlNet<Boundary = T::Boundary>,
{
    let (a, b) = target.edge_range(link.target_edge);
    let (sa, sb) = source.edge_range(link.source_edge);
    let (_, source_knots) = source.edge_basis(link.source_edge);
    let samples = if (b - a).abs() < TOLERANCE { 1 } else { samples };
    for t in linspace(a, b, samples) {
        // edge parameter on the source, normalized to its own range
        let s = (t - a) / if samples == 1 { 1.0 } else { b - a };
        let s = sa + s * (sb - sa);
        let s = match link.orientation {
            Orientation::Aligned => s,
            Orientation::Reversed => source_knots.mirror_parameter(s),
        };
        let dt = target.boundary_derivatives(link.target_edge, t, level)?;
        let ds = source.boundary_derivatives(link.source_edge, s, level)?;
        let matched = match level {
            0 => vectors_close(&dt[0], &ds[0], tolerance),
            1 => vectors_close(&unit(&dt[1])?, &-unit(&ds[1])?, tolerance),
            _ => vectors_close(
                &curvature_vector(&dt[1], &dt[2])?,
                &curvature_vector(&ds[1], &ds[2])?,
                tolerance,
            ),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn unit(v: &Vector3) -> Result<Vector3> {
    let n = v.norm();
    if n < TOLERANCE {
        return Err(GeometryError::Degenerate("cross-boundary tangent vanishes".into()).into());
    }
    Ok(v / n)
}
