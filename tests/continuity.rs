//! Enforce-then-verify properties across patch sizes, degrees and edge pairs.

mod common;

use patchwork::error::{ContinuityError, GeometryError};
use patchwork::geometry::{CurveEnd, SplineCurve, SplineSurface, SurfaceEdge};
use patchwork::math::Point3;
use patchwork::operations::continuity::{
    enforce_g0, enforce_g0g1g2, verify_g0, verify_g1, verify_g2, Continuity, EdgeLink,
    EnforceContinuity, VerifyContinuity,
};
use patchwork::PatchworkError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_patch(rng: &mut StdRng, n: usize) -> SplineSurface {
    let grid = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    Point3::new(
                        i as f64 + rng.random_range(-0.3..0.3),
                        j as f64 + rng.random_range(-0.3..0.3),
                        rng.random_range(-0.5..0.5),
                    )
                })
                .collect()
        })
        .collect();
    SplineSurface::bezier(grid).unwrap()
}

#[test]
fn g0_holds_for_every_degree() {
    common::init_tracing();
    let mut rng = StdRng::seed_from_u64(1);
    for degree in 1..=10 {
        let source = random_patch(&mut rng, degree + 1);
        let mut target = random_patch(&mut rng, degree + 1);
        enforce_g0(&mut target, SurfaceEdge::V0, &source, SurfaceEdge::V1).unwrap();
        assert!(
            verify_g0(&target, &source, SurfaceEdge::V0, SurfaceEdge::V1, 1e-10).unwrap(),
            "degree {degree}"
        );

        let points = |rng: &mut StdRng| -> Vec<Point3> {
            (0..=degree)
                .map(|i| Point3::new(i as f64, rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
                .collect()
        };
        let source = SplineCurve::bezier(points(&mut rng)).unwrap();
        let mut target = SplineCurve::bezier(points(&mut rng)).unwrap();
        enforce_g0(&mut target, CurveEnd::Start, &source, CurveEnd::End).unwrap();
        assert!(verify_g0(&target, &source, CurveEnd::Start, CurveEnd::End, 1e-10).unwrap());
    }
}

#[test]
fn g2_holds_for_all_sizes_and_edge_pairs() {
    common::init_tracing();
    let mut rng = StdRng::seed_from_u64(2024);
    for n in 4..=10 {
        for target_edge in SurfaceEdge::ALL {
            for source_edge in SurfaceEdge::ALL {
                let source = random_patch(&mut rng, n);
                let mut target = random_patch(&mut rng, n);
                let f = rng.random_range(0.5..2.0);
                enforce_g0g1g2(&mut target, &source, target_edge, source_edge, f).unwrap();
                let context = format!("{n}x{n}, {target_edge} <- {source_edge}, f = {f}");
                assert!(verify_g0(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G0 {context}");
                assert!(verify_g1(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G1 {context}");
                assert!(verify_g2(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G2 {context}");
            }
        }
    }
}

#[test]
fn reversed_links_hold_too() {
    let mut rng = StdRng::seed_from_u64(99);
    let source = random_patch(&mut rng, 5);
    let mut target = random_patch(&mut rng, 5);
    let link = EdgeLink::new(SurfaceEdge::U1, SurfaceEdge::V0).reversed();
    EnforceContinuity::new(link, Continuity::G2)
        .with_tension(1.5)
        .execute(&mut target, &source)
        .unwrap();
    assert!(VerifyContinuity::new(link, Continuity::G2, 1e-8)
        .execute(&target, &source)
        .unwrap());
}

#[test]
fn mismatched_edges_are_rejected() {
    let source = SplineSurface::bezier(common::wavy_grid(4, 5, -3.0)).unwrap();
    let mut target = SplineSurface::bezier(common::wavy_grid(4, 4, 0.5)).unwrap();
    let err = enforce_g0(&mut target, SurfaceEdge::U0, &source, SurfaceEdge::U1).unwrap_err();
    assert!(matches!(
        err,
        PatchworkError::Continuity(ContinuityError::IncompatibleEdge { .. })
    ));

    // a quadratic edge cannot meet a cubic one
    let source = SplineSurface::bezier(common::wavy_grid(4, 4, -3.0)).unwrap();
    let mut target = SplineSurface::bezier(common::wavy_grid(3, 3, 0.5)).unwrap();
    assert!(enforce_g0g1g2(&mut target, &source, SurfaceEdge::U0, SurfaceEdge::U1, 1.0).is_err());
}

#[test]
fn low_degree_cannot_carry_g2() {
    let source = SplineSurface::bezier(common::wavy_grid(2, 4, -1.0)).unwrap();
    let mut target = SplineSurface::bezier(common::wavy_grid(2, 4, 0.5)).unwrap();
    let err = enforce_g0g1g2(&mut target, &source, SurfaceEdge::U0, SurfaceEdge::U1, 1.0).unwrap_err();
    assert!(matches!(err, PatchworkError::Geometry(GeometryError::Degenerate(_))));
}

fn rational_patch(rng: &mut StdRng, weights: &[Vec<f64>]) -> SplineSurface {
    let n = weights.len();
    let grid = random_patch(rng, n).control_points().to_vec();
    SplineSurface::rational_bezier(grid, weights.to_vec()).unwrap()
}

#[test]
fn separable_rational_patches_hold_g2() {
    common::init_tracing();
    let c = [1.0, 1.3, 0.8, 1.1, 0.9];
    let weights: Vec<Vec<f64>> = c.iter().map(|a| c.iter().map(|b| a * b).collect()).collect();
    let mut rng = StdRng::seed_from_u64(7);
    for target_edge in SurfaceEdge::ALL {
        for source_edge in SurfaceEdge::ALL {
            let source = rational_patch(&mut rng, &weights);
            let mut target = rational_patch(&mut rng, &weights);
            enforce_g0g1g2(&mut target, &source, target_edge, source_edge, 1.0).unwrap();
            let context = format!("{target_edge} <- {source_edge}");
            assert!(verify_g0(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G0 {context}");
            assert!(verify_g1(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G1 {context}");
            assert!(verify_g2(&target, &source, target_edge, source_edge, 1e-8).unwrap(), "G2 {context}");
        }
    }
}

#[test]
fn non_separable_rational_patches_are_refused() {
    let weights: Vec<Vec<f64>> = (0..5)
        .map(|i| (0..5).map(|j| 1.0 + 0.3 * ((i * j) % 3) as f64).collect())
        .collect();
    let mut rng = StdRng::seed_from_u64(8);
    let source = rational_patch(&mut rng, &weights);
    let mut target = rational_patch(&mut rng, &weights);
    let before = target.clone();

    // G0 alone only copies the boundary row
    let mut joined = target.clone();
    enforce_g0(&mut joined, SurfaceEdge::U0, &source, SurfaceEdge::U1).unwrap();
    assert!(verify_g0(&joined, &source, SurfaceEdge::U0, SurfaceEdge::U1, 1e-10).unwrap());

    let err = enforce_g0g1g2(&mut target, &source, SurfaceEdge::U0, SurfaceEdge::U1, 1.0).unwrap_err();
    assert!(matches!(
        err,
        PatchworkError::Continuity(ContinuityError::NonSeparableWeights { .. })
    ));
    assert_eq!(target.control_points(), before.control_points());
    assert_eq!(target.weights(), before.weights());
}
