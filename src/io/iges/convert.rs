use tracing::trace;

use crate::error::{GeometryError, Result};
use crate::geometry::{
    BoundedSurface, CompositeCurve, Curve, CurveOnSurface, CurveSegment, Geometry, Line, Plane,
    RuledSurface, SplineCurve, SplineSurface, SurfaceOfRevolution, TrimmedSurface,
};
use crate::math::{Point3, TOLERANCE};

use super::entity::{Entity, EntityType, Param};
use super::model::{EntityId, IgesModel};

/// Conversion of a geometry into IGES entities.
///
/// Dependencies (axis lines, profiles, member curves) are added to the model
/// before the entity that points at them; the returned id is the top-level
/// entity.
pub trait ToIges {
    /// Adds this geometry, and everything it references, to `model`.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced geometry cannot be converted.
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId>;
}

fn add(model: &mut IgesModel, entity: Entity, name: &str) -> EntityId {
    trace!(entity_type = entity.entity_type.code(), name, "emitting IGES entity");
    model.add(entity)
}

fn push_point(params: &mut Vec<Param>, p: &Point3) {
    params.extend([Param::Real(p.x), Param::Real(p.y), Param::Real(p.z)]);
}

fn push_reals(params: &mut Vec<Param>, values: &[f64]) {
    params.extend(values.iter().copied().map(Param::Real));
}

fn points_coincide(a: &[Point3], b: &[Point3]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (p - q).norm() < TOLERANCE)
}

/// Returns whether all points lie in one plane, and that plane's unit normal.
fn plane_of(points: &[Point3]) -> Option<[f64; 3]> {
    let origin = points.first()?;
    let mut normal = None;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let n = (a - origin).cross(&(b - origin));
            if n.norm() > TOLERANCE {
                normal = Some(n.normalize());
                break;
            }
        }
        if normal.is_some() {
            break;
        }
    }
    let n = normal?;
    points
        .iter()
        .all(|p| (p - origin).dot(&n).abs() < TOLERANCE)
        .then(|| [n.x, n.y, n.z])
}

impl ToIges for Point3 {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let mut params = Vec::with_capacity(4);
        push_point(&mut params, self);
        params.push(Param::Int(0));
        Ok(add(model, Entity::new(EntityType::Point, params), "point"))
    }
}

impl ToIges for Line {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let mut params = Vec::with_capacity(6);
        push_point(&mut params, self.p0());
        push_point(&mut params, self.p1());
        Ok(add(model, Entity::new(EntityType::Line, params), self.name()))
    }
}

impl ToIges for SplineCurve {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let points = self.control_points();
        let n = points.len();
        let plane = plane_of(points);
        let mut params: Vec<Param> = vec![
            (n - 1).into(),
            self.degree().into(),
            plane.is_some().into(),
            self.is_closed().into(),
            (!self.form().is_rational()).into(),
            Param::Int(0),
        ];
        push_reals(&mut params, self.knots().as_slice());
        params.extend((0..n).map(|i| Param::Real(self.weight(i))));
        for p in points {
            push_point(&mut params, p);
        }
        let domain = self.domain();
        params.extend([Param::Real(domain.t_min), Param::Real(domain.t_max)]);
        push_reals(&mut params, &plane.unwrap_or([0.0; 3]));
        Ok(add(
            model,
            Entity::new(EntityType::RationalBSplineCurve, params),
            self.name(),
        ))
    }
}

impl ToIges for SplineSurface {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let (rows, cols) = (self.rows(), self.cols());
        let grid = self.control_points();
        let closed_u = points_coincide(&grid[0], &grid[rows - 1]);
        let first_col: Vec<Point3> = grid.iter().map(|row| row[0]).collect();
        let last_col: Vec<Point3> = grid.iter().map(|row| row[cols - 1]).collect();
        let closed_v = points_coincide(&first_col, &last_col);

        let mut params: Vec<Param> = vec![
            (rows - 1).into(),
            (cols - 1).into(),
            self.degree_u().into(),
            self.degree_v().into(),
            closed_u.into(),
            closed_v.into(),
            (!self.form().is_rational()).into(),
            Param::Int(0),
            Param::Int(0),
        ];
        push_reals(&mut params, self.knots_u().as_slice());
        push_reals(&mut params, self.knots_v().as_slice());
        for j in 0..cols {
            params.extend((0..rows).map(|i| Param::Real(self.weight(i, j))));
        }
        for j in 0..cols {
            for row in grid {
                push_point(&mut params, &row[j]);
            }
        }
        params.extend([
            Param::Real(self.knots_u().start()),
            Param::Real(self.knots_u().end()),
            Param::Real(self.knots_v().start()),
            Param::Real(self.knots_v().end()),
        ]);
        Ok(add(
            model,
            Entity::new(EntityType::RationalBSplineSurface, params),
            self.name(),
        ))
    }
}

impl ToIges for SurfaceOfRevolution {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let axis = self.axis().to_entities(model)?;
        let profile = self.profile().to_entities(model)?;
        let params = vec![
            axis.into(),
            profile.into(),
            self.start().rad().into(),
            self.end().rad().into(),
        ];
        Ok(add(
            model,
            Entity::new(EntityType::SurfaceOfRevolution, params),
            self.name(),
        ))
    }
}

impl ToIges for RuledSurface {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let first = self.first().to_entities(model)?;
        let second = self.second().to_entities(model)?;
        let params = vec![first.into(), second.into(), Param::Int(0), Param::Int(1)];
        // form 1: rulings join points of equal parameter value
        let entity = Entity::new(EntityType::RuledSurface, params).with_form(1);
        Ok(add(model, entity, self.name()))
    }
}

impl ToIges for CurveSegment {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        match self {
            Self::Line(line) => line.to_entities(model),
            Self::Spline(spline) => spline.to_entities(model),
        }
    }
}

impl ToIges for CompositeCurve {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let members = self
            .segments()
            .iter()
            .map(|segment| segment.to_entities(model))
            .collect::<Result<Vec<_>>>()?;
        let mut params = Vec::with_capacity(members.len() + 1);
        params.push(members.len().into());
        params.extend(members.into_iter().map(Param::Pointer));
        Ok(add(
            model,
            Entity::new(EntityType::CompositeCurve, params),
            self.name(),
        ))
    }
}

/// Unbounded plane (form 0): `A, B, C, D`, no bounding curve, then the
/// display symbol location and size.
impl ToIges for Plane {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let mut params = Vec::with_capacity(9);
        let n = self.plane_normal();
        push_reals(&mut params, &[n.x, n.y, n.z, self.offset()]);
        params.push(Param::Int(0));
        push_point(&mut params, self.origin());
        params.push(Param::Real(0.0));
        Ok(add(model, Entity::new(EntityType::Plane, params), self.name()))
    }
}

impl CurveOnSurface {
    /// Adds this boundary as a curve on the already-converted `surface`.
    ///
    /// # Errors
    ///
    /// Returns an error if a member curve cannot be converted.
    pub fn to_entities_on(&self, model: &mut IgesModel, surface: EntityId) -> Result<EntityId> {
        let parametric = self.parametric().to_entities(model)?;
        let (model_curve, preference) = match self.model() {
            Some(curve) => (Param::Pointer(curve.to_entities(model)?), 3),
            None => (Param::Int(0), 1),
        };
        let params = vec![
            Param::Int(0),
            surface.into(),
            parametric.into(),
            model_curve,
            Param::Int(preference),
        ];
        Ok(add(
            model,
            Entity::new(EntityType::CurveOnSurface, params),
            self.name(),
        ))
    }

    /// A 141 boundary always carries its model-space curve.
    fn boundary_entity(&self, model: &mut IgesModel, surface: EntityId) -> Result<EntityId> {
        let Some(curve) = self.model() else {
            return Err(GeometryError::Degenerate(format!("{} has no model-space curve", self.name())).into());
        };
        let model_curve = curve.to_entities(model)?;
        let parametric = self.parametric().to_entities(model)?;
        let params = vec![
            Param::Int(1),
            Param::Int(3),
            surface.into(),
            Param::Int(1),
            model_curve.into(),
            Param::Int(1),
            Param::Int(1),
            parametric.into(),
        ];
        Ok(add(model, Entity::new(EntityType::Boundary, params), self.name()))
    }
}

impl ToIges for TrimmedSurface {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let surface = self.surface().to_entities(model)?;
        let outer = self
            .outer()
            .map(|outer| outer.to_entities_on(model, surface))
            .transpose()?;
        let holes = self
            .inner()
            .iter()
            .map(|hole| hole.to_entities_on(model, surface))
            .collect::<Result<Vec<_>>>()?;
        let mut params = vec![
            surface.into(),
            outer.is_some().into(),
            holes.len().into(),
            outer.map_or(Param::Int(0), Param::Pointer),
        ];
        params.extend(holes.into_iter().map(Param::Pointer));
        Ok(add(
            model,
            Entity::new(EntityType::TrimmedSurface, params),
            self.name(),
        ))
    }
}

impl ToIges for BoundedSurface {
    fn to_entities(&self, model: &mut IgesModel) -> Result<EntityId> {
        let surface = self.surface().to_entities(model)?;
        let boundaries = self
            .boundaries()
            .iter()
            .map(|boundary| boundary.boundary_entity(model, surface))
            .collect::<Result<Vec<_>>>()?;
        let mut params = vec![Param::Int(1), surface.into(), boundaries.len().into()];
        params.extend(boundaries.into_iter().map(Param::Pointer));
        Ok(add(
            model,
            Entity::new(EntityType::BoundedSurface, params),
            self.name(),
        ))
    }
}
