//! # SVG Commander
//!
//! A small command shell for SVG drawings: open, save, print, create,
//! erase, translate, and query the figures inside a region.
//!
//! The shell is a thin layer. Underneath it is an in-memory document model
//! that round-trips SVG without losing content, plus just enough geometry
//! (axis-aligned boxes and affine transforms) to answer "what is in this
//! region?" and to move a figure in drawing coordinates.
//!
//! ## Architecture
//!
//! ```text
//! SVG text
//!       ↓
//!   [svg]       quick-xml reader/writer, path data
//!       ↓
//!   [model]     Document tree: elements, attributes, text
//!       ↓
//!   [figures]   Figure listing, region queries, erase, translate
//!       ↑
//!   [geometry]  Points, bounding boxes, transforms
//!       ↓
//!   [shell]     Commands, workspace of open documents
//! ```

pub mod cli;
pub mod error;
pub mod figures;
pub mod geometry;
pub mod logger;
pub mod model;
pub mod shell;
pub mod svg;

pub use error::{Result, SvgError};
pub use figures::{Figure, RegionMode};
pub use geometry::BoundingBox;
pub use model::Document;
pub use shell::{Command, Session, Settings};

/// Parse SVG text into a document.
pub fn parse(text: &str) -> Result<Document> {
    svg::parse(text)
}

/// Serialize a document to SVG text.
pub fn to_svg_string(doc: &Document) -> Result<String> {
    svg::serialize(doc)
}
