use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::Result;

use super::strip::ControlNet;
use super::{Continuity, EdgeLink, EnforceContinuity};

struct Face<'a, S: ControlNet> {
    adjacent: &'a S,
    adjacent_edge: S::Boundary,
    tension: f64,
}

/// Joins one target net to up to one neighbour per boundary.
///
/// Boundaries are processed in their canonical order (`U0, U1, V0, V1` for
/// surfaces); where two passes share control points (corners, or opposite
/// edges on a shallow net) the later pass wins.
pub struct EnforceMultiface<'a, S: ControlNet> {
    faces: BTreeMap<S::Boundary, Face<'a, S>>,
}

impl<S: ControlNet> Default for EnforceMultiface<'_, S> {
    fn default() -> Self {
        Self {
            faces: BTreeMap::new(),
        }
    }
}

impl<'a, S: ControlNet> EnforceMultiface<'a, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the neighbour across `edge`. A second registration for the
    /// same edge replaces the first.
    #[must_use]
    pub fn face(mut self, edge: S::Boundary, adjacent: &'a S, adjacent_edge: S::Boundary, tension: f64) -> Self {
        self.faces.insert(
            edge,
            Face {
                adjacent,
                adjacent_edge,
                tension,
            },
        );
        self
    }

    /// Number of registered neighbours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Enforces `order` across every registered boundary.
    ///
    /// # Errors
    ///
    /// Fails on the first boundary that cannot be joined; boundaries
    /// processed before it keep their changes.
    pub fn execute<T>(&self, target: &mut T, order: Continuity) -> Result<()>
    where
        T: ControlNet<Boundary = S::Boundary>,
    {
        debug!(faces = self.faces.len(), order = ?order, "enforcing multi-face continuity");
        if self.faces.len() > 1 {
            warn!(
                faces = self.faces.len(),
                "later multi-face passes take precedence where boundary rows overlap"
            );
        }
        for (&edge, face) in &self.faces {
            EnforceContinuity::new(EdgeLink::new(edge, face.adjacent_edge), order)
                .with_tension(face.tension)
                .execute(target, face.adjacent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::{SplineSurface, SurfaceEdge};
    use crate::math::Point3;
    use crate::operations::continuity::VerifyContinuity;

    fn patch(rows: usize, cols: usize, dx: f64, dy: f64) -> SplineSurface {
        let grid = (0..rows)
            .map(|i| {
                (0..cols)
                    .map(|j| {
                        let (x, y) = (i as f64 + dx, j as f64 + dy);
                        Point3::new(x, y, 0.1 * x * y)
                    })
                    .collect()
            })
            .collect();
        SplineSurface::bezier(grid).unwrap()
    }

    #[test]
    fn opposite_edges_both_hold() {
        let below = patch(4, 6, -3.0, 0.0);
        let above = patch(4, 6, 8.0, 0.0);
        let mut target = patch(6, 6, 0.5, 0.0);
        EnforceMultiface::new()
            .face(SurfaceEdge::U1, &above, SurfaceEdge::U0, 1.0)
            .face(SurfaceEdge::U0, &below, SurfaceEdge::U1, 1.0)
            .execute(&mut target, Continuity::G2)
            .unwrap();
        for (edge, other, other_edge) in [
            (SurfaceEdge::U0, &below, SurfaceEdge::U1),
            (SurfaceEdge::U1, &above, SurfaceEdge::U0),
        ] {
            let link = EdgeLink::new(edge, other_edge);
            assert!(VerifyContinuity::new(link, Continuity::G2, 1e-9)
                .execute(&target, other)
                .unwrap());
        }
    }

    #[test]
    fn later_edge_owns_shared_corner() {
        let u_side = patch(4, 4, -3.0, 0.0);
        let v_side = patch(4, 4, 0.0, -3.0);
        let mut target = patch(4, 4, 0.5, 0.5);
        EnforceMultiface::new()
            .face(SurfaceEdge::V0, &v_side, SurfaceEdge::V1, 1.0)
            .face(SurfaceEdge::U0, &u_side, SurfaceEdge::U1, 1.0)
            .execute(&mut target, Continuity::G0)
            .unwrap();
        // V0 is processed after U0, so the corner comes from the V neighbour
        assert_eq!(target.control_point(0, 0), v_side.control_point(0, 3));
    }
}
