//! Plane geometry helpers shared by the placement and clash code.

use super::point::PointF;
use std::f32::consts::{PI, TAU};

/// Two-argument arctangent of `(dx, dy)`, in radians.
pub fn get_angle(dx: f32, dy: f32) -> f32 {
    dy.atan2(dx)
}
/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle.rem_euclid(TAU);
    if a > PI {
        a - TAU
    } else {
        a
    }
}
/// Arithmetic mean of a set of points, or `None` for an empty set.
pub fn center_2d(points: impl IntoIterator<Item = PointF>) -> Option<PointF> {
    let mut n = 0usize;
    let sum: PointF = points.into_iter().inspect(|_| n += 1).sum();
    (n > 0).then(|| sum / n as f32)
}
pub fn intersection_of_segments(
    s1p1: PointF,
    s1p2: PointF,
    s2p1: PointF,
    s2p2: PointF,
) -> Option<PointF> {
    let p = s1p1;
    let r = s1p2 - s1p1;
    let q = s2p1;
    let s = s2p2 - s2p1;
    let rxs = r.cross(s);
    if rxs.abs() < f32::EPSILON {
        return None;
    }
    let qmp = q - p;
    let t = qmp.cross(s) / rxs;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let u = qmp.cross(r) / rxs;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(p + r * t)
}
pub fn unsigned_angle(p1: PointF, p2: PointF, p3: PointF) -> f32 {
    let v1 = p1 - p2;
    let v2 = p3 - p2;
    let l = (v1.sq_length() * v2.sq_length()).sqrt().max(f32::EPSILON);
    (v1.dot(v2) / l).clamp(-1.0, 1.0).acos().to_degrees()
}
pub fn points_coincide(p1: PointF, p2: PointF) -> bool {
    (p1 - p2).sq_length() < f32::EPSILON * f32::EPSILON
}
/// Which side of the line through `line_p1` and `line_p2` a point lies on:
/// positive to the left, negative to the right, zero on the line.
pub fn side_of_line(p: PointF, line_p1: PointF, line_p2: PointF) -> f32 {
    (line_p2 - line_p1).cross(p - line_p1)
}
pub fn same_side(p1: PointF, p2: PointF, line_p1: PointF, line_p2: PointF) -> bool {
    side_of_line(p1, line_p1, line_p2) * side_of_line(p2, line_p1, line_p2) > 0.0
}
pub fn mirror_point(pt: PointF, sp1: PointF, sp2: PointF) -> PointF {
    let sv = sp2 - sp1;
    let v2 = pt - sp1;
    let pc = v2.parallel_component(sv);
    let nc = v2 - pc;
    sp1 + pc - nc
}
