use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::{
    BoundedSurface, CompositeCurve, CurveOnSurface, CurveSegment, Line, Plane, SplineSurface,
    TrimmedSurface,
};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Fills a closed, planar loop of line segments with a flat patch.
///
/// The patch is the bilinear rectangle spanning the loop's bounding box in
/// its own plane (optionally enlarged by a margin), and the loop becomes its
/// outer boundary in both model and parameter space.
pub struct MakePlanarFill {
    edges: Vec<Line>,
    margin: f64,
}

impl MakePlanarFill {
    /// Creates a new `MakePlanarFill` operation. Each edge must start where
    /// the previous one ends, and the last must end at the first's start.
    #[must_use]
    pub fn new(edges: Vec<Line>) -> Self {
        Self { edges, margin: 0.0 }
    }

    /// Enlarges the bounding box on every side by `fraction` of its size.
    #[must_use]
    pub fn with_margin(mut self, fraction: f64) -> Self {
        self.margin = fraction.max(0.0);
        self
    }

    /// The plane of the loop, through its centroid, with the normal oriented
    /// so that the loop runs counter-clockwise around it.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if there are fewer than three
    /// edges, the loop is open, encloses no area, or is not planar.
    pub fn plane(&self) -> Result<Plane> {
        let n = self.edges.len();
        if n < 3 {
            return Err(GeometryError::Degenerate(format!("planar fill needs at least three edges, got {n}")).into());
        }
        for (i, edge) in self.edges.iter().enumerate() {
            let next = (i + 1) % n;
            let gap = (self.edges[next].p0() - edge.p1()).norm();
            if gap > TOLERANCE {
                return Err(GeometryError::Degenerate(format!(
                    "edge {next} does not start where edge {i} ends (gap {gap})"
                ))
                .into());
            }
        }

        let corners = self.corners();
        let centroid = Point3::from(corners.iter().map(|p| p.coords).sum::<Vector3>() / n as f64);
        // Newell's normal
        let normal: Vector3 = corners
            .iter()
            .zip(corners.iter().cycle().skip(1))
            .map(|(a, b)| (a - centroid).cross(&(b - centroid)))
            .sum();
        if normal.norm() < TOLERANCE {
            return Err(GeometryError::Degenerate("loop encloses no area".into()).into());
        }
        let plane = Plane::from_normal(centroid, normal)?;

        let scale = corners
            .iter()
            .map(|p| (p - centroid).norm())
            .fold(1.0_f64, f64::max);
        if let Some(p) = corners
            .iter()
            .find(|p| plane.signed_distance(p).abs() > TOLERANCE * scale)
        {
            return Err(GeometryError::Degenerate(format!(
                "corner ({}, {}, {}) is off the loop plane by {}",
                p.x,
                p.y,
                p.z,
                plane.signed_distance(p)
            ))
            .into());
        }
        Ok(plane)
    }

    /// Executes the operation, returning the patch bounded by the loop.
    ///
    /// # Errors
    ///
    /// Fails as [`MakePlanarFill::plane`] does.
    pub fn execute(&self) -> Result<BoundedSurface> {
        let (surface, boundary) = self.build()?;
        BoundedSurface::new(surface, vec![boundary])
    }

    /// Executes the operation, returning the patch trimmed by the loop.
    ///
    /// # Errors
    ///
    /// Fails as [`MakePlanarFill::plane`] does.
    pub fn execute_trimmed(&self) -> Result<TrimmedSurface> {
        let (surface, boundary) = self.build()?;
        Ok(TrimmedSurface::new(surface).with_outer(boundary))
    }

    fn corners(&self) -> Vec<Point3> {
        self.edges.iter().map(|edge| *edge.p0()).collect()
    }

    fn build(&self) -> Result<(SplineSurface, CurveOnSurface)> {
        let plane = self.plane()?;
        let local: Vec<(f64, f64)> = self.corners().iter().map(|p| plane.project(p)).collect();
        let (mut u0, mut u1, mut v0, mut v1) = (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
        for &(u, v) in &local {
            u0 = u0.min(u);
            u1 = u1.max(u);
            v0 = v0.min(v);
            v1 = v1.max(v);
        }
        let (du, dv) = (self.margin * (u1 - u0), self.margin * (v1 - v0));
        let (u0, u1, v0, v1) = (u0 - du, u1 + du, v0 - dv, v1 + dv);
        debug!(edges = self.edges.len(), width = u1 - u0, height = v1 - v0, "filling planar loop");

        let surface = plane.patch(u0, u1, v0, v1).named("PlanarFill");
        let uv: Vec<Point3> = local
            .iter()
            .map(|&(u, v)| Point3::new((u - u0) / (u1 - u0), (v - v0) / (v1 - v0), 0.0))
            .collect();
        let parametric = uv
            .iter()
            .zip(uv.iter().cycle().skip(1))
            .map(|(a, b)| Line::new(*a, *b).map(CurveSegment::from))
            .collect::<Result<Vec<_>>>()?;
        let model = self.edges.iter().cloned().map(CurveSegment::from).collect();
        let boundary = CurveOnSurface::new(CompositeCurve::new(parametric)?)?.with_model(CompositeCurve::new(model)?);
        Ok((surface, boundary))
    }
}
