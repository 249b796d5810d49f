//! Structured error types for SVG Commander.
//!
//! One enum covers every failure the library reports: file I/O, malformed
//! XML, documents that are not SVG, unknown figures, and bad command
//! arguments coming from the shell.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public SVG Commander functions.
#[derive(Debug, Error)]
pub enum SvgError {
    /// Reading or writing a file failed.
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML reader or writer rejected the input.
    #[error("Malformed XML: {source}{}", hint_suffix(hint))]
    Xml {
        #[source]
        source: quick_xml::Error,
        hint: String,
    },

    /// The XML is well-formed but the document structure is wrong.
    #[error("Invalid document at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The root element is not `<svg>`.
    #[error("Not an SVG document: root element is <{found}>")]
    NotSvg { found: String },

    /// No figure with the given id exists in the document.
    #[error("No figure with id '{0}'")]
    FigureNotFound(String),

    /// A command was given without one of its required arguments.
    #[error("Missing argument for '{command}': <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// A command argument could not be interpreted.
    #[error("Invalid <{argument}> '{value}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        value: String,
        reason: String,
    },

    /// An open buffer has modifications that would be lost.
    #[error("'{}' has unsaved changes", .0.display())]
    UnsavedChanges(PathBuf),

    /// `create` refuses to overwrite an existing file or buffer.
    #[error("'{}' already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// A `transform` attribute could not be parsed or inverted.
    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    /// Figure reports could not be encoded as JSON.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl SvgError {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SvgError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error: 2 for usage mistakes, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            SvgError::MissingArgument { .. } | SvgError::InvalidArgument { .. } => 2,
            _ => 1,
        }
    }
}

impl From<quick_xml::Error> for SvgError {
    fn from(e: quick_xml::Error) -> Self {
        let hint = match &e {
            quick_xml::Error::IllFormed(_) => {
                "Check that every start tag has a matching end tag.".to_string()
            }
            quick_xml::Error::Syntax(_) => {
                "Check for unterminated tags, comments or CDATA sections.".to_string()
            }
            quick_xml::Error::InvalidAttr(_) => {
                "Attribute values must be quoted and names must not repeat.".to_string()
            }
            _ => String::new(),
        };
        SvgError::Xml { source: e, hint }
    }
}

impl From<quick_xml::events::attributes::AttrError> for SvgError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        quick_xml::Error::InvalidAttr(e).into()
    }
}

/// Writer errors surface as `std::io::Error`; no path is known at that point.
impl From<std::io::Error> for SvgError {
    fn from(e: std::io::Error) -> Self {
        SvgError::io("<memory>", e)
    }
}

pub type Result<T> = std::result::Result<T, SvgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_two() {
        let e = SvgError::MissingArgument {
            command: "open",
            argument: "file",
        };
        assert_eq!(e.exit_code(), 2);
        assert_eq!(e.to_string(), "Missing argument for 'open': <file>");
    }

    #[test]
    fn test_runtime_errors_exit_with_one() {
        let e = SvgError::FigureNotFound("hero".to_string());
        assert_eq!(e.exit_code(), 1);
        assert_eq!(e.to_string(), "No figure with id 'hero'");
    }
}
