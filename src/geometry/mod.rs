//! # Geometry
//!
//! Points, axis-aligned bounding boxes and 2D affine transforms. This is all
//! the geometry figure queries need: every shape is reduced to the box that
//! contains it.

pub mod transform;

use serde::Serialize;

pub use transform::{parse_transform, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle given by its extreme coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Box from an origin and a size. A negative size extends the box to
    /// the left or upwards.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x.min(x + width),
            min_y: y.min(y + height),
            max_x: x.max(x + width),
            max_y: y.max(y + height),
        }
    }

    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// Smallest box containing every point. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(
            rest.iter()
                .fold(Self::from_point(*first), |b, p| b.union(&Self::from_point(*p))),
        )
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether `other` lies entirely inside this box. Shared edges count
    /// as inside.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Whether the two boxes overlap. Touching edges count as overlap.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn translate(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rect_normalizes_negative_size() {
        let b = BoundingBox::from_rect(10.0, 10.0, -5.0, 4.0);
        assert_eq!(b.min_x, 5.0);
        assert_eq!(b.max_x, 10.0);
        assert_eq!(b.height(), 4.0);
    }

    #[test]
    fn test_from_points() {
        let b = BoundingBox::from_points(&[
            Point::new(3.0, -1.0),
            Point::new(-2.0, 4.0),
            Point::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b, BoundingBox::from_rect(-2.0, -1.0, 5.0, 5.0));
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let region = BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0);
        assert!(region.contains(&BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0)));
        assert!(region.contains(&BoundingBox::from_rect(2.0, 2.0, 1.0, 1.0)));
        assert!(!region.contains(&BoundingBox::from_rect(5.0, 5.0, 6.0, 1.0)));
    }

    #[test]
    fn test_intersects() {
        let region = BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0);
        assert!(region.intersects(&BoundingBox::from_rect(5.0, 5.0, 10.0, 10.0)));
        assert!(region.intersects(&BoundingBox::from_rect(10.0, 0.0, 5.0, 5.0)));
        assert!(!region.intersects(&BoundingBox::from_rect(11.0, 0.0, 5.0, 5.0)));
    }
}
