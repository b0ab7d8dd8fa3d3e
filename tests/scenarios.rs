//! End-to-end scenarios: a circle from quarter arcs, and a full revolution.

mod common;

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use approx::assert_relative_eq;
use patchwork::geometry::{
    CompositeCurve, Curve, CurveSegment, Line, SplineCurve, SplineSurface, Surface,
    SurfaceOfRevolution,
};
use patchwork::io::iges::{read_entities, IgesModel, IgesWriter, ToIges};
use patchwork::math::{linspace, Point3};
use patchwork::units::Angle;

fn circle(r: f64) -> CompositeCurve {
    let corners = [(r, 0.0), (0.0, r), (-r, 0.0), (0.0, -r), (r, 0.0)];
    let arcs = corners
        .windows(2)
        .map(|w| {
            let ((x0, y0), (x1, y1)) = (w[0], w[1]);
            // the middle control point is the corner of the bounding square
            let mid = Point3::new(x0 + x1, y0 + y1, 0.0);
            SplineCurve::rational_bezier(
                vec![Point3::new(x0, y0, 0.0), mid, Point3::new(x1, y1, 0.0)],
                vec![1.0, FRAC_1_SQRT_2, 1.0],
            )
            .map(CurveSegment::from)
        })
        .collect::<patchwork::Result<Vec<_>>>()
        .unwrap();
    CompositeCurve::new(arcs).unwrap()
}

#[test]
fn quarter_arcs_enclose_a_circle() {
    common::init_tracing();
    for r in [0.5, 1.0, 3.7] {
        let curve = circle(r);
        assert!(curve.is_closed());
        for p in curve.polyline(50).unwrap() {
            assert_relative_eq!(p.coords.norm(), r, max_relative = 1e-12);
        }
        let area = curve.signed_area(1001).unwrap();
        assert_relative_eq!(area, PI * r * r, max_relative = 1e-6);
    }
}

#[test]
fn circle_exports_as_composite_of_rational_curves() {
    let mut model = IgesModel::new();
    circle(1.0).to_entities(&mut model).unwrap();
    let parsed = read_entities(&IgesWriter::default().write(&model).unwrap()).unwrap();
    let types: Vec<u16> = parsed.iter().map(|e| e.entity_type).collect();
    assert_eq!(types, vec![126, 126, 126, 126, 102]);
    let arc = SplineCurve::from_parsed(&parsed[1]).unwrap();
    assert_relative_eq!(arc.evaluate(0.5).unwrap().coords.norm(), 1.0, max_relative = 1e-12);
}

fn bottle_profile() -> SplineCurve {
    SplineCurve::bezier(vec![
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, -1.2, 0.5),
        Point3::new(0.0, -1.3, 1.0),
        Point3::new(0.0, -0.8, 1.5),
    ])
    .unwrap()
}

fn z_axis() -> Line {
    Line::new(Point3::origin(), Point3::new(0.0, 0.0, 1.0)).unwrap()
}

#[test]
fn full_revolution_keeps_profile_radius() {
    common::init_tracing();
    let profile = bottle_profile();
    let surface =
        SplineSurface::revolve(&profile, &z_axis(), Angle::from_deg(0.0), Angle::from_deg(360.0)).unwrap();
    let d = surface.domain();
    let grid = surface.evaluate_grid(30, 30).unwrap();
    assert_eq!(grid.len(), 30);
    assert!(grid.iter().all(|row| row.len() == 30));
    for (u, row) in linspace(d.u_min, d.u_max, 30).into_iter().zip(&grid) {
        let expected = profile.evaluate(u).unwrap();
        for p in row {
            assert_relative_eq!(p.x.hypot(p.y), expected.y.abs(), epsilon = 1e-10);
            assert_relative_eq!(p.z, expected.z, epsilon = 1e-10);
        }
        // the seam closes
        assert_relative_eq!((row[0] - row[29]).norm(), 0.0, epsilon = 1e-10);
    }
}

#[test]
fn analytic_and_spline_revolutions_agree_on_iso_lines() {
    let revolution = SurfaceOfRevolution::new(
        z_axis(),
        bottle_profile(),
        Angle::from_deg(0.0),
        Angle::from_deg(360.0),
    )
    .unwrap();
    let spline = revolution.to_spline().unwrap();
    let angles = revolution.domain();
    for u in linspace(0.0, 1.0, 30) {
        let reference = revolution.evaluate(u, angles.v_min).unwrap();
        let radius = reference.x.hypot(reference.y);
        for v in linspace(0.0, 1.0, 30) {
            let p = spline.evaluate(u, v).unwrap();
            assert_relative_eq!(p.x.hypot(p.y), radius, epsilon = 1e-10);
        }
        for theta in linspace(angles.v_min, angles.v_max, 30) {
            let p = revolution.evaluate(u, theta).unwrap();
            assert_relative_eq!(p.x.hypot(p.y), radius, epsilon = 1e-10);
        }
    }
}
