//! Geometry helpers for placement validation and path collision.

use glam::DVec2;

/// Distance from `p` to the closed segment `a`-`b`.
pub fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// True if `p` lies strictly within `clearance` of any segment of the polyline.
pub fn is_near_path(p: DVec2, waypoints: &[DVec2], clearance: f64) -> bool {
    waypoints
        .windows(2)
        .any(|seg| distance_to_segment(p, seg[0], seg[1]) < clearance)
}

/// Center of the grid cell containing `p`.
pub fn snap_to_grid(p: DVec2, cell: f64) -> DVec2 {
    DVec2::new(
        (p.x / cell).floor() * cell + cell / 2.0,
        (p.y / cell).floor() * cell + cell / 2.0,
    )
}
