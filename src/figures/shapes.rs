//! Per-element geometry: local bounding boxes and in-place coordinate
//! shifts for the basic shapes.

use crate::geometry::{BoundingBox, Point};
use crate::model::{format_number_with_precision, Element};
use crate::svg::path::parse_path_data;

/// Elements whose children are figures in their own right.
pub(crate) fn is_container(el: &Element) -> bool {
    matches!(el.local_name(), "g" | "a" | "switch" | "svg")
}

/// Elements whose content is never drawn directly.
pub(crate) fn is_non_rendered(el: &Element) -> bool {
    matches!(
        el.local_name(),
        "defs" | "clipPath" | "mask" | "symbol" | "marker" | "pattern"
    )
}

pub(crate) fn is_figure(el: &Element) -> bool {
    is_container(el)
        || matches!(
            el.local_name(),
            "rect"
                | "circle"
                | "ellipse"
                | "line"
                | "polyline"
                | "polygon"
                | "path"
                | "text"
                | "image"
                | "use"
                | "foreignObject"
        )
}

/// Bounding box of a leaf shape in its own user space, before its
/// `transform` is applied. Containers return `None`; their box is the
/// union of their children.
pub(crate) fn local_bounds(el: &Element) -> Option<BoundingBox> {
    let num = |name: &str| el.attr_f64(name).unwrap_or(0.0);
    match el.local_name() {
        "rect" | "image" | "use" | "foreignObject" => Some(BoundingBox::from_rect(
            num("x"),
            num("y"),
            num("width"),
            num("height"),
        )),
        "circle" => {
            let r = num("r").abs();
            Some(BoundingBox::from_rect(num("cx") - r, num("cy") - r, 2.0 * r, 2.0 * r))
        }
        "ellipse" => {
            let rx = num("rx").abs();
            let ry = num("ry").abs();
            Some(BoundingBox::from_rect(
                num("cx") - rx,
                num("cy") - ry,
                2.0 * rx,
                2.0 * ry,
            ))
        }
        "line" => BoundingBox::from_points(&[
            Point::new(num("x1"), num("y1")),
            Point::new(num("x2"), num("y2")),
        ]),
        "polyline" | "polygon" => {
            let points = parse_points(el.attr("points").unwrap_or_default());
            BoundingBox::from_points(&points)
        }
        "path" => parse_path_data(el.attr("d").unwrap_or_default()).bounds(),
        // Text extents need font metrics; the anchor point stands in.
        "text" => {
            let x = first_number(el.attr("x")).unwrap_or(0.0);
            let y = first_number(el.attr("y")).unwrap_or(0.0);
            Some(BoundingBox::from_point(Point::new(x, y)))
        }
        _ => None,
    }
}

/// Viewport rectangle of a nested `<svg>`. Needs an explicit numeric size.
pub(crate) fn viewport_bounds(el: &Element) -> Option<BoundingBox> {
    if el.local_name() != "svg" {
        return None;
    }
    Some(BoundingBox::from_rect(
        el.attr_f64("x").unwrap_or(0.0),
        el.attr_f64("y").unwrap_or(0.0),
        el.attr_f64("width")?,
        el.attr_f64("height")?,
    ))
}

/// Move a shape by rewriting its coordinate attributes. Returns `false`
/// (leaving the element untouched) when the shape cannot be moved this way,
/// e.g. a unit-bearing coordinate or a `<text>` with positioned children.
pub(crate) fn shift_coordinates(el: &mut Element, dx: f64, dy: f64, precision: usize) -> bool {
    let fmt = |v: f64| format_number_with_precision(v, precision);
    match el.local_name() {
        "rect" | "image" | "use" | "foreignObject" => {
            shift_attrs(el, &[("x", dx), ("y", dy)], precision)
        }
        "circle" | "ellipse" => shift_attrs(el, &[("cx", dx), ("cy", dy)], precision),
        "line" => shift_attrs(
            el,
            &[("x1", dx), ("y1", dy), ("x2", dx), ("y2", dy)],
            precision,
        ),
        "text" => {
            if el.child_elements().next().is_some() {
                return false;
            }
            shift_attrs(el, &[("x", dx), ("y", dy)], precision)
        }
        "polyline" | "polygon" => {
            let raw = el.attr("points").unwrap_or_default();
            let Some(numbers) = parse_number_list(raw) else {
                return false;
            };
            if numbers.len() % 2 != 0 {
                return false;
            }
            let shifted: Vec<String> = numbers
                .chunks(2)
                .map(|p| format!("{},{}", fmt(p[0] + dx), fmt(p[1] + dy)))
                .collect();
            el.set_attr("points", shifted.join(" "));
            true
        }
        "path" => {
            let mut path = parse_path_data(el.attr("d").unwrap_or_default());
            path.translate(dx, dy);
            el.set_attr("d", path.to_string_with_precision(precision));
            true
        }
        _ => false,
    }
}

/// Shift each named attribute (which may hold a list of numbers) by its
/// delta. Nothing is written unless every attribute parses.
fn shift_attrs(el: &mut Element, deltas: &[(&str, f64)], precision: usize) -> bool {
    let mut updates = Vec::with_capacity(deltas.len());
    for &(name, delta) in deltas {
        let numbers = match el.attr(name) {
            Some(raw) => match parse_number_list(raw) {
                Some(n) if !n.is_empty() => n,
                _ => return false,
            },
            None => vec![0.0],
        };
        let value: Vec<String> = numbers
            .iter()
            .map(|v| format_number_with_precision(v + delta, precision))
            .collect();
        updates.push((name, value.join(" ")));
    }
    for (name, value) in updates {
        el.set_attr(name, value);
    }
    true
}

/// Parse a `points` attribute (e.g. "10,20 30,40"). Parsing stops at the
/// first bad number and a trailing odd coordinate is ignored.
pub(crate) fn parse_points(s: &str) -> Vec<Point> {
    let numbers: Vec<f64> = number_tokens(s).map_while(|n| n).collect();
    numbers
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect()
}

/// Every number in a comma/whitespace separated list, or `None` if any
/// entry is not a finite number in user units.
fn parse_number_list(s: &str) -> Option<Vec<f64>> {
    number_tokens(s).collect()
}

fn number_tokens(s: &str) -> impl Iterator<Item = Option<f64>> + '_ {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| {
            let p = p.strip_suffix("px").unwrap_or(p);
            p.parse::<f64>().ok().filter(|v| v.is_finite())
        })
}

fn first_number(attr: Option<&str>) -> Option<f64> {
    parse_number_list(attr?)?.first().copied()
}
