//! # Path Data
//!
//! Parser and writer for the `d` attribute of `<path>`.
//! Commands: M, L, H, V, C, S, Q, T, A, Z (absolute + relative), with
//! implicit repetition. Parsing is lenient in the same way renderers are:
//! everything up to the first malformed segment is kept.

use std::fmt::Write as _;

use tracing::debug;

use crate::geometry::{BoundingBox, Point};
use crate::model::format_number_with_precision;

/// One command with its numeric arguments, exactly as written
/// (absolute or relative).
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub command: char,
    pub args: Vec<f64>,
}

/// A parsed `d` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub segments: Vec<PathSegment>,
}

/// A segment resolved to absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbsoluteSegment {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
    QuadTo(Point, Point),
    ArcTo {
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    ClosePath,
}

fn arity(command: char) -> Option<usize> {
    match command.to_ascii_uppercase() {
        'M' | 'L' | 'T' => Some(2),
        'H' | 'V' => Some(1),
        'C' => Some(6),
        'S' | 'Q' => Some(4),
        'A' => Some(7),
        'Z' => Some(0),
        _ => None,
    }
}

/// Parse a path `d` attribute into segments.
pub fn parse_path_data(d: &str) -> PathData {
    let mut cursor = Cursor::new(d);
    let mut segments: Vec<PathSegment> = Vec::new();
    let mut current: Option<char> = None;

    loop {
        cursor.skip_separators();
        let Some(ch) = cursor.peek() else { break };

        let command = if ch.is_ascii_alphabetic() {
            cursor.bump();
            if arity(ch).is_none() {
                debug!(command = %ch, "unknown path command, stopping");
                break;
            }
            ch
        } else {
            // Implicit repetition of the previous command. A repeated moveto
            // becomes a lineto.
            match current {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) if !c.eq_ignore_ascii_case(&'z') => c,
                _ => {
                    debug!(at = cursor.pos, "path data does not start with a command");
                    break;
                }
            }
        };
        if segments.is_empty() && !command.eq_ignore_ascii_case(&'m') {
            debug!("path data must begin with a moveto");
            break;
        }

        let Some(args) = read_args(&mut cursor, command) else {
            debug!(command = %command, "malformed path arguments, stopping");
            break;
        };
        segments.push(PathSegment { command, args });
        current = Some(command);
    }

    PathData { segments }
}

fn read_args(cursor: &mut Cursor, command: char) -> Option<Vec<f64>> {
    let n = arity(command)?;
    let mut args = Vec::with_capacity(n);
    for i in 0..n {
        cursor.skip_separators();
        let value = if command.eq_ignore_ascii_case(&'a') && (i == 3 || i == 4) {
            cursor.read_flag()?
        } else {
            cursor.read_number()?
        };
        args.push(value);
    }
    Some(args)
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self {
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.bytes.get(self.pos).map(|&b| b as char)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_separators(&mut self) {
        while let Some(c) = self.peek() {
            if c == ',' || c.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Arc flags are a single `0` or `1` and may be written without a
    /// separator (`a1 1 0 01 5 5`).
    fn read_flag(&mut self) -> Option<f64> {
        match self.peek()? {
            '0' => {
                self.bump();
                Some(0.0)
            }
            '1' => {
                self.bump();
                Some(1.0)
            }
            _ => None,
        }
    }

    /// Read one number. A sign or a second decimal point ends the previous
    /// number, so `10-5` and `.5.5` each hold two numbers.
    fn read_number(&mut self) -> Option<f64> {
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let mut digits = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            digits += 1;
        }
        if self.peek() == Some('.') {
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
                digits += 1;
            }
        }
        if digits == 0 {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            let mut exp_digits = 0;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
                exp_digits += 1;
            }
            if exp_digits == 0 {
                self.pos = mark;
            }
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

impl PathData {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve every segment to absolute coordinates. Smooth curves (S, T)
    /// get their reflected control point filled in.
    pub fn absolute_segments(&self) -> Vec<AbsoluteSegment> {
        let mut out = Vec::with_capacity(self.segments.len());
        let mut cur = Point::new(0.0, 0.0);
        let mut start = cur;
        // Last control point of the previous C/S or Q/T, for reflection.
        let mut last_cubic_ctrl: Option<Point> = None;
        let mut last_quad_ctrl: Option<Point> = None;

        for seg in &self.segments {
            let rel = seg.command.is_ascii_lowercase();
            let a = &seg.args;
            let at = |x: f64, y: f64| {
                if rel {
                    Point::new(cur.x + x, cur.y + y)
                } else {
                    Point::new(x, y)
                }
            };
            let mut cubic_ctrl = None;
            let mut quad_ctrl = None;

            match seg.command.to_ascii_uppercase() {
                'M' => {
                    cur = at(a[0], a[1]);
                    start = cur;
                    out.push(AbsoluteSegment::MoveTo(cur));
                }
                'L' => {
                    cur = at(a[0], a[1]);
                    out.push(AbsoluteSegment::LineTo(cur));
                }
                'H' => {
                    cur = Point::new(if rel { cur.x + a[0] } else { a[0] }, cur.y);
                    out.push(AbsoluteSegment::LineTo(cur));
                }
                'V' => {
                    cur = Point::new(cur.x, if rel { cur.y + a[0] } else { a[0] });
                    out.push(AbsoluteSegment::LineTo(cur));
                }
                'C' => {
                    let c1 = at(a[0], a[1]);
                    let c2 = at(a[2], a[3]);
                    let to = at(a[4], a[5]);
                    out.push(AbsoluteSegment::CurveTo(c1, c2, to));
                    cubic_ctrl = Some(c2);
                    cur = to;
                }
                'S' => {
                    let c1 = reflect(last_cubic_ctrl, cur);
                    let c2 = at(a[0], a[1]);
                    let to = at(a[2], a[3]);
                    out.push(AbsoluteSegment::CurveTo(c1, c2, to));
                    cubic_ctrl = Some(c2);
                    cur = to;
                }
                'Q' => {
                    let c = at(a[0], a[1]);
                    let to = at(a[2], a[3]);
                    out.push(AbsoluteSegment::QuadTo(c, to));
                    quad_ctrl = Some(c);
                    cur = to;
                }
                'T' => {
                    let c = reflect(last_quad_ctrl, cur);
                    let to = at(a[0], a[1]);
                    out.push(AbsoluteSegment::QuadTo(c, to));
                    quad_ctrl = Some(c);
                    cur = to;
                }
                'A' => {
                    let to = at(a[5], a[6]);
                    out.push(AbsoluteSegment::ArcTo {
                        rx: a[0],
                        ry: a[1],
                        rotation: a[2],
                        large_arc: a[3] != 0.0,
                        sweep: a[4] != 0.0,
                        to,
                    });
                    cur = to;
                }
                _ => {
                    out.push(AbsoluteSegment::ClosePath);
                    cur = start;
                }
            }
            last_cubic_ctrl = cubic_ctrl;
            last_quad_ctrl = quad_ctrl;
        }
        out
    }

    /// Axis-aligned box containing the whole path. Curves are bounded by
    /// their control polygon, arcs by a box around the chord midpoint sized
    /// by the effective radius.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut points = Vec::new();
        let mut cur = Point::new(0.0, 0.0);
        for seg in self.absolute_segments() {
            match seg {
                AbsoluteSegment::MoveTo(p) | AbsoluteSegment::LineTo(p) => {
                    points.push(p);
                    cur = p;
                }
                AbsoluteSegment::CurveTo(c1, c2, p) => {
                    points.extend([c1, c2, p]);
                    cur = p;
                }
                AbsoluteSegment::QuadTo(c, p) => {
                    points.extend([c, p]);
                    cur = p;
                }
                AbsoluteSegment::ArcTo {
                    rx, ry, rotation, to, ..
                } => {
                    points.push(to);
                    if let Some(r) = effective_arc_radius(cur, to, rx, ry, rotation) {
                        let mid = Point::new((cur.x + to.x) / 2.0, (cur.y + to.y) / 2.0);
                        points.push(Point::new(mid.x - 2.0 * r, mid.y - 2.0 * r));
                        points.push(Point::new(mid.x + 2.0 * r, mid.y + 2.0 * r));
                    }
                    cur = to;
                }
                AbsoluteSegment::ClosePath => {}
            }
        }
        BoundingBox::from_points(&points)
    }

    /// Shift the path by (dx, dy). Only absolute coordinates change; a
    /// leading relative moveto is absolute by definition and moves too.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for (i, seg) in self.segments.iter_mut().enumerate() {
            if seg.command.is_ascii_lowercase() {
                if i == 0 && seg.command == 'm' {
                    seg.args[0] += dx;
                    seg.args[1] += dy;
                }
                continue;
            }
            match seg.command {
                'H' => seg.args[0] += dx,
                'V' => seg.args[0] += dy,
                'A' => {
                    seg.args[5] += dx;
                    seg.args[6] += dy;
                }
                'Z' => {}
                _ => {
                    for pair in seg.args.chunks_mut(2) {
                        pair[0] += dx;
                        pair[1] += dy;
                    }
                }
            }
        }
    }

    /// Write the path back out, rounding coordinates to `precision` decimals.
    pub fn to_string_with_precision(&self, precision: usize) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push(seg.command);
            for (j, v) in seg.args.iter().enumerate() {
                if j > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{}", format_number_with_precision(*v, precision));
            }
        }
        out
    }
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => Point::new(2.0 * about.x - c.x, 2.0 * about.y - c.y),
        None => about,
    }
}

/// Largest semi-axis of the arc's ellipse after out-of-range radii are
/// scaled up. `None` when the arc degenerates to a straight line.
fn effective_arc_radius(from: Point, to: Point, rx: f64, ry: f64, rotation: f64) -> Option<f64> {
    let (rx, ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 || from == to {
        return None;
    }
    let (sin, cos) = rotation.to_radians().sin_cos();
    let hx = (from.x - to.x) / 2.0;
    let hy = (from.y - to.y) / 2.0;
    let x1 = cos * hx + sin * hy;
    let y1 = -sin * hx + cos * hy;
    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    let scale = lambda.sqrt().max(1.0);
    Some(rx.max(ry) * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn test_parse_path_m_l_z() {
        let path = parse_path_data("M 10 20 L 30 40 Z");
        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.segments[0].command, 'M');
        assert_eq!(path.segments[0].args, vec![10.0, 20.0]);
        assert_eq!(path.segments[1].args, vec![30.0, 40.0]);
        assert_eq!(path.segments[2].command, 'Z');
    }

    #[test]
    fn test_implicit_lineto_after_moveto() {
        let path = parse_path_data("m10,20 5,5 5,5");
        let commands: Vec<char> = path.segments.iter().map(|s| s.command).collect();
        assert_eq!(commands, vec!['m', 'l', 'l']);
    }

    #[test]
    fn test_compact_numbers() {
        let path = parse_path_data("M10-20L.5.5l1e1-2E-1");
        assert_eq!(path.segments[0].args, vec![10.0, -20.0]);
        assert_eq!(path.segments[1].args, vec![0.5, 0.5]);
        assert!(approx(path.segments[2].args[0], 10.0));
        assert!(approx(path.segments[2].args[1], -0.2));
    }

    #[test]
    fn test_compact_arc_flags() {
        let path = parse_path_data("M0 0a5 5 0 015 5");
        assert_eq!(path.segments[1].args, vec![5.0, 5.0, 0.0, 0.0, 1.0, 5.0, 5.0]);
    }

    #[test]
    fn test_overflowing_number_ends_path() {
        let path = parse_path_data("M0 0 L1e400 5 L3 3");
        assert_eq!(path.segments.len(), 1);
    }

    #[test]
    fn test_malformed_tail_is_dropped() {
        let path = parse_path_data("M0 0 L10 10 L 5");
        assert_eq!(path.segments.len(), 2);
        assert!(parse_path_data("L10 10").is_empty());
    }

    #[test]
    fn test_relative_resolution() {
        let path = parse_path_data("m 10 20 l 5 5 h 5 v -10 z");
        let abs = path.absolute_segments();
        assert_eq!(abs[1], AbsoluteSegment::LineTo(Point::new(15.0, 25.0)));
        assert_eq!(abs[2], AbsoluteSegment::LineTo(Point::new(20.0, 25.0)));
        assert_eq!(abs[3], AbsoluteSegment::LineTo(Point::new(20.0, 15.0)));
    }

    #[test]
    fn test_smooth_curve_reflects_control() {
        let path = parse_path_data("M0 0 C0 10 10 10 10 0 S 20 -10 20 0");
        let abs = path.absolute_segments();
        match abs[2] {
            AbsoluteSegment::CurveTo(c1, _, _) => assert_eq!(c1, Point::new(10.0, -10.0)),
            other => panic!("unexpected segment {:?}", other),
        }
    }

    #[test]
    fn test_bounds_include_control_points() {
        let b = parse_path_data("M0 0 Q 5 20 10 0").bounds().unwrap();
        assert!(approx(b.min_x, 0.0));
        assert!(approx(b.max_x, 10.0));
        assert!(approx(b.max_y, 20.0));
    }

    #[test]
    fn test_arc_bounds_cover_half_circle() {
        // Half circle of radius 5 bulging below the chord (0,0)-(10,0).
        let b = parse_path_data("M0 0 A5 5 0 0 0 10 0").bounds().unwrap();
        assert!(b.min_y <= -5.0);
        assert!(b.max_y >= 5.0);
        assert!(b.min_x <= 0.0 && b.max_x >= 10.0);
    }

    #[test]
    fn test_translate_absolute_and_leading_relative() {
        let mut path = parse_path_data("m1 1 l2 2 H10 V4 A1 1 0 0 1 5 5 Z");
        path.translate(10.0, 20.0);
        assert_eq!(
            path.to_string_with_precision(3),
            "m11 21 l2 2 H20 V24 A1 1 0 0 1 15 25 Z"
        );
    }

    #[test]
    fn test_translate_preserves_shape_bounds() {
        let mut path = parse_path_data("M0 0 C 0 10 10 10 10 0 s 10 -10 10 0");
        let before = path.bounds().unwrap();
        path.translate(3.0, -4.0);
        let after = path.bounds().unwrap();
        assert!(approx(after.min_x, before.min_x + 3.0));
        assert!(approx(after.max_y, before.max_y - 4.0));
    }
}
