//! Planar polygon helpers for sampled closed curves in the XY (or UV) plane.

use super::Point3;

/// Consecutive vertex pairs of the implicitly closed polygon.
fn edges(points: &[Point3]) -> impl Iterator<Item = (&Point3, &Point3)> {
    points.iter().zip(points.iter().cycle().skip(1))
}

/// Signed area of a polygon in the XY plane (shoelace formula), positive for
/// counter-clockwise loops.
///
/// A repeated closing vertex contributes nothing, so sampled closed curves
/// can be passed as they come.
#[must_use]
pub fn signed_area_2d(points: &[Point3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    0.5 * edges(points).map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>()
}

/// Whether `(x, y)` lies inside the polygon, by non-zero winding number.
/// Either orientation works.
#[must_use]
pub fn point_in_polygon_2d(x: f64, y: f64, polygon: &[Point3]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let winding: i32 = edges(polygon)
        .map(|(a, b)| {
            let side = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
            match (a.y <= y, b.y <= y) {
                (true, false) if side > 0.0 => 1,
                (false, true) if side < 0.0 => -1,
                _ => 0,
            }
        })
        .sum();
    winding != 0
}
