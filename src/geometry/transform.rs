//! 2D affine transforms and the SVG `transform` attribute syntax.

use crate::error::{Result, SvgError};
use crate::geometry::{BoundingBox, Point};

/// Affine matrix in SVG order:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::matrix(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `degrees` about the origin.
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::matrix(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation by `degrees` about (cx, cy).
    pub fn rotate_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy)
            .then(&Self::rotate(degrees))
            .then(&Self::translate(-cx, -cy))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::matrix(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::matrix(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// `self × other`: `other` is applied to a point first, then `self`.
    /// This is the order transform lists compose in (`translate(..)
    /// scale(..)` scales first).
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Box containing the four transformed corners of `bbox`.
    pub fn apply_box(&self, bbox: &BoundingBox) -> BoundingBox {
        let corners = bbox.corners().map(|p| self.apply(p));
        BoundingBox::from_points(&corners).unwrap_or(*bbox)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    pub fn inverse(&self) -> Option<Transform> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Transform {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }

    /// Map a displacement through the inverse of the linear part. Used to
    /// express a world-space move in a nested coordinate system, where the
    /// translation part of the matrix does not matter.
    pub fn inverse_apply_vector(&self, dx: f64, dy: f64) -> Option<(f64, f64)> {
        let linear = Transform {
            e: 0.0,
            f: 0.0,
            ..*self
        };
        let p = linear.inverse()?.apply(Point::new(dx, dy));
        Some((p.x, p.y))
    }
}

/// Parse an SVG transform list, e.g. `translate(10 20) rotate(45, 5, 5)`.
pub fn parse_transform(s: &str) -> Result<Transform> {
    let mut result = Transform::identity();
    let mut rest = s.trim();

    while !rest.is_empty() {
        let open = rest
            .find('(')
            .ok_or_else(|| SvgError::InvalidTransform(format!("expected '(' in '{}'", s)))?;
        let close = rest
            .find(')')
            .ok_or_else(|| SvgError::InvalidTransform(format!("expected ')' in '{}'", s)))?;
        if close < open {
            return Err(SvgError::InvalidTransform(format!("unbalanced '{}'", s)));
        }

        let name = rest[..open].trim();
        let args: Vec<f64> = rest[open + 1..close]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| SvgError::InvalidTransform(format!("bad number '{}'", p)))
            })
            .collect::<Result<_>>()?;

        let step = match (name, args.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Transform::matrix(*a, *b, *c, *d, *e, *f),
            ("translate", [tx]) => Transform::translate(*tx, 0.0),
            ("translate", [tx, ty]) => Transform::translate(*tx, *ty),
            ("scale", [s]) => Transform::scale(*s, *s),
            ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
            ("rotate", [deg]) => Transform::rotate(*deg),
            ("rotate", [deg, cx, cy]) => Transform::rotate_about(*deg, *cx, *cy),
            ("skewX", [deg]) => Transform::skew_x(*deg),
            ("skewY", [deg]) => Transform::skew_y(*deg),
            _ => {
                return Err(SvgError::InvalidTransform(format!(
                    "{}({}) is not a valid transform",
                    name,
                    rest[open + 1..close].trim()
                )))
            }
        };
        result = result.then(&step);

        rest = rest[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_point(p: Point, x: f64, y: f64) -> bool {
        (p.x - x).abs() < 0.001 && (p.y - y).abs() < 0.001
    }

    #[test]
    fn test_list_applies_right_to_left() {
        let t = parse_transform("translate(10, 0) scale(2)").unwrap();
        assert!(approx_point(t.apply(Point::new(1.0, 1.0)), 12.0, 2.0));
    }

    #[test]
    fn test_rotate_about_center() {
        let t = parse_transform("rotate(90 5 5)").unwrap();
        assert!(approx_point(t.apply(Point::new(10.0, 5.0)), 5.0, 10.0));
    }

    #[test]
    fn test_matrix_and_skew() {
        let t = parse_transform("matrix(1 0 0 1 3 4)").unwrap();
        assert!(approx_point(t.apply(Point::new(0.0, 0.0)), 3.0, 4.0));
        let s = parse_transform("skewX(45)").unwrap();
        assert!(approx_point(s.apply(Point::new(0.0, 2.0)), 2.0, 2.0));
    }

    #[test]
    fn test_empty_is_identity() {
        assert!(parse_transform("   ").unwrap().is_identity());
    }

    #[test]
    fn test_invalid_transforms() {
        assert!(parse_transform("translate(1 2").is_err());
        assert!(parse_transform("spin(4)").is_err());
        assert!(parse_transform("scale(1 2 3)").is_err());
        assert!(parse_transform("translate(a b)").is_err());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        assert!(parse_transform("scale(NaN)").is_err());
        assert!(parse_transform("translate(inf 0)").is_err());
        assert!(parse_transform("rotate(1e400)").is_err());
        assert!(Transform::matrix(f64::NAN, 0.0, 0.0, 1.0, 0.0, 0.0).inverse().is_none());
        assert!(Transform::scale(f64::INFINITY, 1.0)
            .inverse_apply_vector(1.0, 1.0)
            .is_none());
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = parse_transform("translate(5 -3) rotate(30) scale(2 0.5)").unwrap();
        let inv = t.inverse().unwrap();
        let p = Point::new(7.0, 11.0);
        assert!(approx_point(inv.apply(t.apply(p)), 7.0, 11.0));
        assert!(Transform::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_inverse_apply_vector_ignores_translation() {
        let t = parse_transform("translate(100 100) scale(2)").unwrap();
        let (dx, dy) = t.inverse_apply_vector(10.0, -4.0).unwrap();
        assert!((dx - 5.0).abs() < 0.001);
        assert!((dy + 2.0).abs() < 0.001);
    }

    #[test]
    fn test_apply_box_rotated() {
        let b = BoundingBox::from_rect(0.0, 0.0, 10.0, 10.0);
        let r = Transform::rotate(45.0).apply_box(&b);
        assert!((r.width() - 14.142).abs() < 0.01);
    }
}
