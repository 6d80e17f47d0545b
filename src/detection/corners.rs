//! Manual straightening from four user-picked corners.
//!
//! A [`CornerSession`] belongs to one image. Points arrive one at a time
//! (clicks, CLI arguments); the fourth point makes the session ready and any
//! further point is refused until [`CornerSession::reset`].

use image::RgbImage;
use imageproc::point::Point;
use tracing::debug;

use crate::detection::rectify;
use crate::error::{ExtractError, Result};
use crate::models::distance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerState {
    Empty,
    /// Holding between one and three points
    Collecting(usize),
    Ready,
}

#[derive(Debug, Clone)]
pub struct CornerSession {
    state: CornerState,
    points: Vec<Point<i32>>,
}

impl Default for CornerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CornerSession {
    pub fn new() -> Self {
        Self {
            state: CornerState::Empty,
            points: Vec::with_capacity(4),
        }
    }

    pub fn state(&self) -> CornerState {
        self.state
    }

    pub fn points(&self) -> &[Point<i32>] {
        &self.points
    }

    /// Offer one corner; refused once four are held
    pub fn push(&mut self, point: Point<i32>) -> Result<CornerState> {
        let next = match self.state {
            CornerState::Ready => {
                return Err(ExtractError::PointRejected {
                    x: point.x,
                    y: point.y,
                });
            }
            CornerState::Empty => CornerState::Collecting(1),
            CornerState::Collecting(3) => CornerState::Ready,
            CornerState::Collecting(n) => CornerState::Collecting(n + 1),
        };
        self.points.push(point);
        self.state = next;
        debug!(x = point.x, y = point.y, state = ?next, "Corner added");
        Ok(next)
    }

    pub fn reset(&mut self) {
        self.points.clear();
        self.state = CornerState::Empty;
    }

    /// The four corners as top-left, top-right, bottom-right, bottom-left.
    ///
    /// Top-left has the smallest `x + y` and bottom-right the largest; of the
    /// other two, the one further left is bottom-left.
    pub fn ordered(&self) -> Result<[Point<i32>; 4]> {
        if self.state != CornerState::Ready {
            return Err(ExtractError::IncompleteCorners {
                collected: self.points.len(),
            });
        }

        let mut rest = self.points.clone();
        let tl = take_by_key(&mut rest, |p| -(p.x + p.y));
        let br = take_by_key(&mut rest, |p| p.x + p.y);
        rest.sort_by_key(|p| p.x);
        let (bl, tr) = (rest[0], rest[1]);

        Ok([tl, tr, br, bl])
    }

    /// Rectify the picked quadrilateral out of `image`.
    ///
    /// Width is the top edge length and height the left edge length, both
    /// truncated to whole pixels.
    pub fn straighten(&self, image: &RgbImage) -> Result<RgbImage> {
        let [tl, tr, br, bl] = self.ordered()?;
        let width = distance(tl, tr).floor() as u32;
        let height = distance(tl, bl).floor() as u32;
        let corners = [tl, tr, br, bl].map(|p| (p.x as f32, p.y as f32));
        rectify::warp_quad(image, corners, width, height)
    }
}

/// Remove and return the point with the largest key (first one on ties)
fn take_by_key(points: &mut Vec<Point<i32>>, key: impl Fn(&Point<i32>) -> i32) -> Point<i32> {
    let mut best = 0;
    for (i, p) in points.iter().enumerate() {
        if key(p) > key(&points[best]) {
            best = i;
        }
    }
    points.remove(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn walks_through_states() {
        let mut session = CornerSession::new();
        assert_eq!(session.state(), CornerState::Empty);
        assert_eq!(session.push(Point::new(0, 0)).unwrap(), CornerState::Collecting(1));
        assert_eq!(session.push(Point::new(9, 0)).unwrap(), CornerState::Collecting(2));
        assert_eq!(session.push(Point::new(9, 9)).unwrap(), CornerState::Collecting(3));
        assert_eq!(session.push(Point::new(0, 9)).unwrap(), CornerState::Ready);
    }

    #[test]
    fn fifth_point_is_rejected() {
        let mut session = CornerSession::new();
        for (x, y) in [(0, 0), (9, 0), (9, 9), (0, 9)] {
            session.push(Point::new(x, y)).unwrap();
        }
        assert!(matches!(
            session.push(Point::new(5, 5)),
            Err(ExtractError::PointRejected { x: 5, y: 5 })
        ));
        assert_eq!(session.points().len(), 4);

        session.reset();
        assert_eq!(session.state(), CornerState::Empty);
        assert!(session.push(Point::new(5, 5)).is_ok());
    }

    #[test]
    fn incomplete_session_cannot_straighten() {
        let mut session = CornerSession::new();
        session.push(Point::new(1, 1)).unwrap();
        let image = RgbImage::new(10, 10);
        assert!(matches!(
            session.straighten(&image),
            Err(ExtractError::IncompleteCorners { collected: 1 })
        ));
    }

    #[test]
    fn click_order_does_not_matter() {
        let mut session = CornerSession::new();
        for (x, y) in [(52, 48), (10, 12), (50, 10), (11, 50)] {
            session.push(Point::new(x, y)).unwrap();
        }
        assert_eq!(
            session.ordered().unwrap(),
            [
                Point::new(10, 12),
                Point::new(50, 10),
                Point::new(52, 48),
                Point::new(11, 50),
            ]
        );
    }

    #[test]
    fn straighten_uses_edge_lengths() {
        let image = RgbImage::from_pixel(100, 100, Rgb([90, 90, 90]));
        let mut session = CornerSession::new();
        for (x, y) in [(10, 10), (70, 10), (70, 40), (10, 40)] {
            session.push(Point::new(x, y)).unwrap();
        }
        let out = session.straighten(&image).unwrap();
        assert_eq!(out.dimensions(), (60, 30));
    }
}
