use imageproc::point::Point;

use crate::config::FilterThresholds;
use crate::models::{BoundingQuad, Contour, RegionVerdict};

type Vec2 = (f64, f64);

/// Convex hull using Andrew's monotone chain, counter-clockwise
fn convex_hull(points: &[Point<i32>]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
    pts.dedup();

    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Vec2> = Vec::new();
    for p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Vec2> = Vec::new();
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Corners of the minimum-area enclosing rectangle, by rotating calipers.
///
/// One side of the optimal rectangle is collinear with a hull edge, so every
/// hull edge direction is tried. Returns `None` for an empty point set.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<[Vec2; 4]> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => return None,
        1 => return Some([hull[0]; 4]),
        2 => return Some([hull[0], hull[1], hull[1], hull[0]]),
        _ => {}
    }

    let mut best: Option<(f64, [Vec2; 4])> = None;
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        let len = (b.0 - a.0).hypot(b.1 - a.1);
        if len == 0.0 {
            continue;
        }
        let u = ((b.0 - a.0) / len, (b.1 - a.1) / len);
        let n = (-u.1, u.0);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_n, mut max_n) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let pu = p.0 * u.0 + p.1 * u.1;
            let pn = p.0 * n.0 + p.1 * n.1;
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_n = min_n.min(pn);
            max_n = max_n.max(pn);
        }

        let area = (max_u - min_u) * (max_n - min_n);
        if best.as_ref().is_none_or(|(best_area, _)| area < *best_area) {
            let corner = |su: f64, sn: f64| (su * u.0 + sn * n.0, su * u.1 + sn * n.1);
            best = Some((
                area,
                [
                    corner(min_u, min_n),
                    corner(max_u, min_n),
                    corner(max_u, max_n),
                    corner(min_u, max_n),
                ],
            ));
        }
    }

    best.map(|(_, corners)| corners)
}

/// Put four corners in box order: clockwise in image coordinates (y down),
/// starting from the corner with the smallest `x + y` (ties: smallest `y`).
pub fn order_corners(corners: [Point<i32>; 4]) -> [Point<i32>; 4] {
    let cx = corners.iter().map(|p| p.x as f64).sum::<f64>() / 4.0;
    let cy = corners.iter().map(|p| p.y as f64).sum::<f64>() / 4.0;

    let mut sorted = corners;
    sorted.sort_by(|a, b| {
        let angle_a = (a.y as f64 - cy).atan2(a.x as f64 - cx);
        let angle_b = (b.y as f64 - cy).atan2(b.x as f64 - cx);
        angle_a.total_cmp(&angle_b)
    });

    let start = (0..4)
        .min_by_key(|&i| (sorted[i].x + sorted[i].y, sorted[i].y))
        .unwrap_or(0);
    sorted.rotate_left(start);
    sorted
}

impl BoundingQuad {
    /// Minimum-area rectangle around a contour, corners rounded to pixels
    pub fn from_contour(contour: &Contour) -> Option<Self> {
        let corners = min_area_rect(&contour.points)?
            .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32));
        Some(Self::from_corners(order_corners(corners)))
    }
}

/// Apply the two-tier size filter.
///
/// Comparisons are strict: a quad exactly at a limit passes that limit.
pub fn classify(quad: &BoundingQuad, thresholds: &FilterThresholds) -> RegionVerdict {
    let short_side = quad.short_side();
    if short_side < thresholds.tiny_min_side {
        RegionVerdict::Discard
    } else if quad.area < thresholds.small_area || short_side < thresholds.small_min_side {
        RegionVerdict::Reject
    } else {
        RegionVerdict::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn thresholds() -> FilterThresholds {
        FilterThresholds {
            tiny_area: 10.0,
            tiny_min_side: 2.0,
            small_area: 100.0,
            small_min_side: 5.0,
            highlight_thickness: 1,
        }
    }

    #[test]
    fn hull_drops_interior_points() {
        let hull = convex_hull(&pts(&[(0, 0), (4, 0), (4, 4), (0, 4), (2, 2), (2, 0)]));
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn axis_aligned_rect_is_its_own_bound() {
        let contour = Contour::new(pts(&[(10, 20), (40, 20), (40, 30), (10, 30)]));
        let quad = BoundingQuad::from_contour(&contour).unwrap();
        assert_eq!(
            quad.corners,
            [
                Point::new(10, 20),
                Point::new(40, 20),
                Point::new(40, 30),
                Point::new(10, 30),
            ]
        );
        assert_eq!(quad.width, 30.0);
        assert_eq!(quad.height, 10.0);
        assert_eq!(quad.area, 300.0);
    }

    #[test]
    fn rotated_rect_is_found() {
        // 3-4-5 rotation: sides 50 and 25
        let contour = Contour::new(pts(&[(0, 0), (40, 30), (25, 50), (-15, 20), (10, 20)]));
        let quad = BoundingQuad::from_contour(&contour).unwrap();
        assert!((quad.long_side() - 50.0).abs() < 0.5);
        assert!((quad.short_side() - 25.0).abs() < 0.5);
        assert!((quad.area - 1250.0).abs() < 5.0);
    }

    #[test]
    fn ordering_starts_top_left_and_runs_clockwise() {
        let ordered = order_corners([
            Point::new(40, 30),
            Point::new(10, 30),
            Point::new(40, 20),
            Point::new(10, 20),
        ]);
        assert_eq!(
            ordered,
            [
                Point::new(10, 20),
                Point::new(40, 20),
                Point::new(40, 30),
                Point::new(10, 30),
            ]
        );
    }

    #[test]
    fn ordering_of_a_diamond_starts_at_the_top() {
        let ordered = order_corners([
            Point::new(0, 10),
            Point::new(10, 0),
            Point::new(20, 10),
            Point::new(10, 20),
        ]);
        assert_eq!(ordered[0], Point::new(10, 0));
        assert_eq!(ordered[1], Point::new(20, 10));
    }

    #[test]
    fn collinear_contour_gives_flat_quad() {
        let contour = Contour::new(pts(&[(0, 5), (10, 5), (20, 5)]));
        let quad = BoundingQuad::from_contour(&contour).unwrap();
        assert_eq!(quad.area, 0.0);
        assert_eq!(quad.short_side(), 0.0);
        assert_eq!(classify(&quad, &thresholds()), RegionVerdict::Discard);
    }

    #[test]
    fn empty_contour_has_no_quad() {
        assert!(BoundingQuad::from_contour(&Contour::new(Vec::new())).is_none());
    }

    #[test]
    fn small_area_limit_is_strict() {
        // exactly small_area = 100
        let at_limit = BoundingQuad::from_corners([
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ]);
        assert_eq!(classify(&at_limit, &thresholds()), RegionVerdict::Keep);

        let below = BoundingQuad::from_corners([
            Point::new(0, 0),
            Point::new(11, 0),
            Point::new(11, 9),
            Point::new(0, 9),
        ]);
        assert_eq!(below.area, 99.0);
        assert_eq!(classify(&below, &thresholds()), RegionVerdict::Reject);
    }

    #[test]
    fn thin_region_is_rejected_despite_area() {
        let quad = BoundingQuad::from_corners([
            Point::new(0, 0),
            Point::new(100, 0),
            Point::new(100, 4),
            Point::new(0, 4),
        ]);
        assert_eq!(classify(&quad, &thresholds()), RegionVerdict::Reject);
    }
}
