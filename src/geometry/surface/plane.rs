use crate::error::{GeometryError, Result};
use crate::geometry::{Geometry, GeometryInfo};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::units::Length;

use super::{SplineSurface, Surface, SurfaceDomain};

/// An infinite plane in 3D space.
///
/// Defined by an origin point and two orthonormal in-plane directions
/// (`u_dir`, `v_dir`). The normal is `u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
    info: GeometryInfo,
}

impl Plane {
    /// Creates a plane from an origin and two in-plane directions. `v_dir` is
    /// made orthogonal to `u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a direction is zero-length or the two are parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE || v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;
        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE * v_dir.norm() {
            return Err(GeometryError::Degenerate("plane directions are parallel".into()).into());
        }
        let normal = normal / normal_len;
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
            info: GeometryInfo::named("Plane"),
        })
    }

    /// Creates the plane through three points, oriented so that the normal
    /// is `(p1 - p0) × (p2 - p0)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the points are coincident or collinear.
    pub fn from_points(p0: Point3, p1: Point3, p2: Point3) -> Result<Self> {
        Self::new(p0, p1 - p0, p2 - p0)
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // any reference not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u_dir = normal.cross(&reference).normalize();
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
            info: GeometryInfo::named("Plane"),
        })
    }

    /// The plane `x = distance`, with normal `+X`.
    #[must_use]
    pub fn parallel_x(distance: Length) -> Self {
        Self::axis_aligned(Vector3::x(), Vector3::y(), distance)
    }

    /// The plane `y = distance`, with normal `+Y`.
    #[must_use]
    pub fn parallel_y(distance: Length) -> Self {
        Self::axis_aligned(Vector3::y(), Vector3::z(), distance)
    }

    /// The plane `z = distance`, with normal `+Z`.
    #[must_use]
    pub fn parallel_z(distance: Length) -> Self {
        Self::axis_aligned(Vector3::z(), Vector3::x(), distance)
    }

    fn axis_aligned(normal: Vector3, u_dir: Vector3, distance: Length) -> Self {
        Self {
            origin: Point3::from(normal * distance.meters()),
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
            info: GeometryInfo::named("Plane"),
        }
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the unit normal of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// `D` in the implicit form `n · p = D`.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.normal.dot(&self.origin.coords)
    }

    /// Signed distance of `p` along the normal.
    #[must_use]
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.normal.dot(&(p - self.origin))
    }

    /// In-plane coordinates `(u, v)` of the orthogonal projection of `p`.
    #[must_use]
    pub fn project(&self, p: &Point3) -> (f64, f64) {
        let d = p - self.origin;
        (self.u_dir.dot(&d), self.v_dir.dot(&d))
    }

    /// The rectangle `[u0, u1] × [v0, v1]` of the plane as a bilinear patch,
    /// reparameterized onto the unit square.
    #[must_use]
    pub fn patch(&self, u0: f64, u1: f64, v0: f64, v1: f64) -> SplineSurface {
        let at = |u: f64, v: f64| self.origin + self.u_dir * u + self.v_dir * v;
        SplineSurface::bilinear(at(u0, v0), at(u0, v1), at(u1, v0), at(u1, v1)).named("PlanarPatch")
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl Geometry for Plane {
    fn info(&self) -> &GeometryInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut GeometryInfo {
        &mut self.info
    }
}
