//! # Figures
//!
//! Figure-level operations over a [`Document`]: listing every drawable
//! element with its world-space bounding box, region queries, erasing by
//! id, and translation.
//!
//! World space is the user space of the root `<svg>`. A figure's world box
//! is its local box mapped through its own `transform` and those of all its
//! ancestors. Nested `<svg>` elements contribute their `x`/`y` offset; their
//! viewBox scaling is not modelled.

mod shapes;

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, SvgError};
use crate::geometry::{parse_transform, BoundingBox, Transform};
use crate::model::{format_number_with_precision, Document, Element, Node};

/// A drawable element found in a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    /// Position in document order among all figures.
    pub index: usize,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Nesting level; children of the root are at depth 0.
    pub depth: usize,
    /// World-space box, or `None` for figures with no geometry (e.g. an
    /// empty group).
    pub bbox: Option<BoundingBox>,
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{} ", self.tag, self.id.as_deref().unwrap_or("-"))?;
        match &self.bbox {
            Some(b) => write!(
                f,
                "[{}, {}, {}, {}]",
                format_number_with_precision(b.min_x, 3),
                format_number_with_precision(b.min_y, 3),
                format_number_with_precision(b.width(), 3),
                format_number_with_precision(b.height(), 3),
            ),
            None => write!(f, "[empty]"),
        }
    }
}

/// How a region query matches figure boxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegionMode {
    /// The figure's box lies entirely inside the region.
    #[default]
    Contained,
    /// The figure's box overlaps the region.
    Intersects,
}

/// Every figure in document order, descending into groups.
pub fn figures(doc: &Document) -> Vec<Figure> {
    let mut out = Vec::new();
    for child in doc.root.child_elements() {
        collect(child, Transform::identity(), 0, &mut out);
    }
    out
}

/// Recursive walk. Pushes the figure for `el` (if it is one) before its
/// children and returns its world box so the parent can take the union.
fn collect(
    el: &Element,
    parent: Transform,
    depth: usize,
    out: &mut Vec<Figure>,
) -> Option<BoundingBox> {
    if shapes::is_non_rendered(el) || !shapes::is_figure(el) {
        return None;
    }

    let own = match own_transform(el) {
        Ok(t) => t,
        Err(e) => {
            warn!(tag = %el.name, error = %e, "ignoring unparseable transform");
            Transform::identity()
        }
    };
    let world = parent.then(&own);

    let slot = out.len();
    out.push(Figure {
        index: slot,
        tag: el.local_name().to_string(),
        id: el.id().map(str::to_string),
        depth,
        bbox: None,
    });

    let bbox = if shapes::is_container(el) {
        let inner = world.then(&viewport_offset(el));
        let mut union: Option<BoundingBox> = None;
        for child in el.child_elements() {
            if let Some(b) = collect(child, inner, depth + 1, out) {
                union = Some(match union {
                    Some(u) => u.union(&b),
                    None => b,
                });
            }
        }
        // A nested <svg> also occupies its own viewport rectangle.
        let viewport = shapes::viewport_bounds(el).map(|vp| world.apply_box(&vp));
        match (union, viewport) {
            (Some(u), Some(v)) => Some(u.union(&v)),
            (u, v) => u.or(v),
        }
    } else {
        shapes::local_bounds(el).map(|b| world.apply_box(&b))
    };

    out[slot].bbox = bbox;
    bbox
}

fn own_transform(el: &Element) -> Result<Transform> {
    match el.attr("transform") {
        Some(t) => parse_transform(t),
        None => Ok(Transform::identity()),
    }
}

/// Offset a nested `<svg>` applies to its content.
fn viewport_offset(el: &Element) -> Transform {
    if el.local_name() == "svg" {
        Transform::translate(
            el.attr_f64("x").unwrap_or(0.0),
            el.attr_f64("y").unwrap_or(0.0),
        )
    } else {
        Transform::identity()
    }
}

/// Figures matching `region` under `mode`. Figures without a box never
/// match.
pub fn within(doc: &Document, region: &BoundingBox, mode: RegionMode) -> Vec<Figure> {
    figures(doc)
        .into_iter()
        .filter(|f| match (&f.bbox, mode) {
            (Some(b), RegionMode::Contained) => region.contains(b),
            (Some(b), RegionMode::Intersects) => region.intersects(b),
            (None, _) => false,
        })
        .collect()
}

/// World box of the whole drawing: the union of all top-level figures.
pub fn drawing_bounds(doc: &Document) -> Option<BoundingBox> {
    figures(doc)
        .into_iter()
        .filter(|f| f.depth == 0)
        .filter_map(|f| f.bbox)
        .reduce(|a, b| a.union(&b))
}

/// Remove the figure with the given id and return it. Elements that are
/// not figures (gradients, `<title>`, anything under `<defs>`) are never
/// matched.
pub fn erase(doc: &mut Document, id: &str) -> Result<Element> {
    let not_found = || SvgError::FigureNotFound(id.to_string());
    let path = figure_path(&doc.root, id).ok_or_else(not_found)?;
    let (&last, parents) = path.split_last().ok_or_else(not_found)?;
    let parent = element_at_mut(&mut doc.root, parents).ok_or_else(not_found)?;
    match parent.children.remove(last) {
        Node::Element(removed) => {
            debug!(id, tag = %removed.name, "erased element");
            Ok(removed)
        }
        other => {
            parent.children.insert(last, other);
            Err(not_found())
        }
    }
}

/// Move the figure with the given id by (dx, dy) in world coordinates.
pub fn translate(doc: &mut Document, id: &str, dx: f64, dy: f64, precision: usize) -> Result<()> {
    let not_found = || SvgError::FigureNotFound(id.to_string());
    let path = figure_path(&doc.root, id).ok_or_else(not_found)?;
    let ancestors = ancestor_transform(&doc.root, &path)?;
    let (lx, ly) = ancestors.inverse_apply_vector(dx, dy).ok_or_else(|| {
        SvgError::InvalidTransform(format!("cannot move '{}': an ancestor transform is singular", id))
    })?;

    let el = element_at_mut(&mut doc.root, &path).ok_or_else(not_found)?;
    translate_element(el, lx, ly, precision);
    debug!(id, dx, dy, local_dx = lx, local_dy = ly, "translated element");
    Ok(())
}

/// Move every top-level figure by (dx, dy).
pub fn translate_all(doc: &mut Document, dx: f64, dy: f64, precision: usize) -> usize {
    let mut moved = 0;
    for el in doc.root.child_elements_mut() {
        if shapes::is_figure(el) && !shapes::is_non_rendered(el) {
            translate_element(el, dx, dy, precision);
            moved += 1;
        }
    }
    moved
}

/// Apply a move expressed in the element's parent coordinates. Plain shapes
/// get their coordinates rewritten; anything else gets a `translate()`
/// prepended to its transform list.
fn translate_element(el: &mut Element, dx: f64, dy: f64, precision: usize) {
    if dx == 0.0 && dy == 0.0 {
        return;
    }
    if el.attr("transform").is_none()
        && !shapes::is_container(el)
        && shapes::shift_coordinates(el, dx, dy, precision)
    {
        return;
    }
    let step = format!(
        "translate({} {})",
        format_number_with_precision(dx, precision),
        format_number_with_precision(dy, precision)
    );
    let value = match el.attr("transform").map(str::trim) {
        Some(existing) if !existing.is_empty() => format!("{} {}", step, existing),
        _ => step,
    };
    el.set_attr("transform", value);
}

/// Child indices leading from `parent` to the first figure with `id`, in
/// document order. Only containers are entered, as in [`figures`].
fn figure_path(parent: &Element, id: &str) -> Option<Vec<usize>> {
    for (i, node) in parent.children.iter().enumerate() {
        let Node::Element(child) = node else { continue };
        if shapes::is_non_rendered(child) || !shapes::is_figure(child) {
            continue;
        }
        if child.id() == Some(id) {
            return Some(vec![i]);
        }
        if shapes::is_container(child) {
            if let Some(mut rest) = figure_path(child, id) {
                rest.insert(0, i);
                return Some(rest);
            }
        }
    }
    None
}

fn element_at_mut<'a>(root: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    path.iter()
        .try_fold(root, |el, &i| match el.children.get_mut(i) {
            Some(Node::Element(child)) => Some(child),
            _ => None,
        })
}

/// Combined transform of the containers above the figure at `path`.
fn ancestor_transform(root: &Element, path: &[usize]) -> Result<Transform> {
    let mut current = Transform::identity();
    let mut el = root;
    for &i in &path[..path.len().saturating_sub(1)] {
        let Some(Node::Element(child)) = el.children.get(i) else {
            break;
        };
        current = current.then(&own_transform(child)?).then(&viewport_offset(child));
        el = child;
    }
    Ok(current)
}
