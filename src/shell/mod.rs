//! # Shell
//!
//! The command layer. A [`Session`] is a workspace of open documents keyed
//! by path. Commands name the file they act on; a file that is not open yet
//! is loaded on first use. Mutating commands mark the buffer dirty, and
//! [`Session::finish`] writes dirty buffers back when autosave is on, which
//! is what makes one-shot invocations like `svg-commander erase a.svg logo`
//! persist.
//!
//! All user-facing output goes to the session's writer so the whole layer
//! can be driven from tests.

pub mod command;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, SvgError};
use crate::figures::{self, Figure};
use crate::model::{format_number_with_precision, Document};
use crate::svg;

pub use command::{Command, TranslateTarget, DEFAULT_CANVAS_SIZE};

pub const USAGE: &str = "Usage: svg-commander <command> [arguments]";

/// The help screen, one line per command, in the order they are listed.
pub const HELP_LINES: [&str; 12] = [
    "This program have functions :",
    "  open - Open an SVG file",
    "  close - Close a SVG file",
    "  save - Save a SVG file",
    "  save as - Save a SVG file",
    "  print - Print a SVG file",
    "  create - Create a SVG file",
    "  erase - Erase an SVG file",
    "  translate - Translate a SVG file",
    "  within - Print all figures from region",
    "  help - Show this help message",
    "  exit - Exit of program",
];

/// Behaviour switches for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Print `within` results as JSON instead of one line per figure.
    pub json: bool,
    /// Decimal places for coordinates written by `translate`.
    pub precision: usize,
    /// Write modified buffers back to disk when the session ends or a
    /// buffer is closed.
    pub autosave: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            json: false,
            precision: 3,
            autosave: true,
        }
    }
}

/// Whether the caller should keep feeding commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Result of running a script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub executed: usize,
    pub failed: usize,
    /// The script ended with `exit` rather than end of input.
    pub exited: bool,
}

struct Buffer {
    doc: Document,
    dirty: bool,
}

pub struct Session<W: Write> {
    settings: Settings,
    buffers: BTreeMap<PathBuf, Buffer>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(settings: Settings, out: W) -> Self {
        Self {
            settings,
            buffers: BTreeMap::new(),
            out,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The open document for `path`, if any.
    pub fn document(&self, path: impl AsRef<Path>) -> Option<&Document> {
        self.buffers.get(path.as_ref()).map(|b| &b.doc)
    }

    pub fn is_dirty(&self, path: impl AsRef<Path>) -> bool {
        self.buffers.get(path.as_ref()).is_some_and(|b| b.dirty)
    }

    pub fn open_paths(&self) -> impl Iterator<Item = &Path> {
        self.buffers.keys().map(PathBuf::as_path)
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Parse and execute one command given as words.
    pub fn run_words<S: AsRef<str>>(&mut self, words: &[S]) -> Result<Flow> {
        let command = Command::parse(words)?;
        self.execute(command)
    }

    /// Read commands line by line until `exit` or end of input. Errors are
    /// handed to `on_error` with their 1-based line number and do not stop
    /// the script.
    pub fn run_script<R, F>(&mut self, input: R, mut on_error: F) -> Result<ScriptOutcome>
    where
        R: BufRead,
        F: FnMut(usize, &SvgError),
    {
        let mut outcome = ScriptOutcome::default();
        for (i, line) in input.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|e| SvgError::io("<script>", e))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let result = match shlex::split(trimmed) {
                Some(words) => self.run_words(words.as_slice()),
                None => Err(SvgError::InvalidArgument {
                    argument: "line",
                    value: trimmed.to_string(),
                    reason: "unbalanced quotes".to_string(),
                }),
            };
            outcome.executed += 1;
            match result {
                Ok(Flow::Exit) => {
                    outcome.exited = true;
                    break;
                }
                Ok(Flow::Continue) => {}
                Err(e) => {
                    outcome.failed += 1;
                    on_error(line_no, &e);
                }
            }
        }
        Ok(outcome)
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        debug!(?command, "executing");
        match command {
            Command::Open { path } => self.open(&path)?,
            Command::Close { path } => self.close(&path)?,
            Command::Save { path } => self.save(&path)?,
            Command::SaveAs { path, target } => self.save_as(&path, &target)?,
            Command::Print { path } => self.print(&path)?,
            Command::Create {
                path,
                width,
                height,
            } => self.create(&path, width, height)?,
            Command::Erase { path, id } => self.erase(&path, &id)?,
            Command::Translate {
                path,
                target,
                dx,
                dy,
            } => self.translate(&path, &target, dx, dy)?,
            Command::Within { path, region, mode } => {
                let doc = &self.buffer(&path)?.doc;
                let hits = figures::within(doc, &region, mode);
                self.report_figures(&hits)?;
            }
            Command::Help => {
                for line in HELP_LINES {
                    self.emit(line)?;
                }
            }
            Command::Exit => {
                self.emit("Exit")?;
                return Ok(Flow::Exit);
            }
            Command::Invalid(word) => self.emit(format_args!("Invalid command: {}", word))?,
        }
        Ok(Flow::Continue)
    }

    /// Write back every modified buffer (autosave) or warn about them. A
    /// failed write does not stop the others; the first error is returned
    /// and that buffer stays dirty.
    pub fn finish(&mut self) -> Result<()> {
        let mut first_error = None;
        for (path, buffer) in self.buffers.iter_mut().filter(|(_, b)| b.dirty) {
            if !self.settings.autosave {
                warn!(path = %path.display(), "unsaved changes discarded");
                continue;
            }
            match svg::save(&buffer.doc, path) {
                Ok(()) => {
                    buffer.dirty = false;
                    info!(path = %path.display(), "saved modified document");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "autosave failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn open(&mut self, path: &Path) -> Result<()> {
        if self.is_dirty(path) {
            return Err(SvgError::UnsavedChanges(path.to_path_buf()));
        }
        let doc = svg::load(path)?;
        let summary = summarize(&doc);
        self.buffers
            .insert(path.to_path_buf(), Buffer { doc, dirty: false });
        self.emit(format_args!("Opened {}: {}", path.display(), summary))
    }

    fn close(&mut self, path: &Path) -> Result<()> {
        let Some(buffer) = self.buffers.get(path) else {
            return self.emit(format_args!("{} is not open", path.display()));
        };
        if buffer.dirty {
            if self.settings.autosave {
                // The buffer stays open if the write fails.
                svg::save(&buffer.doc, path)?;
                info!(path = %path.display(), "saved on close");
            } else {
                warn!(path = %path.display(), "closing with unsaved changes");
                self.emit(format_args!(
                    "Discarded unsaved changes to {}",
                    path.display()
                ))?;
            }
        }
        self.buffers.remove(path);
        self.emit(format_args!("Closed {}", path.display()))
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let buffer = self.buffer(path)?;
        svg::save(&buffer.doc, path)?;
        buffer.dirty = false;
        info!(path = %path.display(), "saved");
        self.emit(format_args!("Saved {}", path.display()))
    }

    fn save_as(&mut self, path: &Path, target: &Path) -> Result<()> {
        if path != target && self.is_dirty(target) {
            return Err(SvgError::UnsavedChanges(target.to_path_buf()));
        }
        self.buffer(path)?;
        let Some(buffer) = self.buffers.remove(path) else {
            return Err(SvgError::io(path, std::io::ErrorKind::NotFound.into()));
        };
        if let Err(e) = svg::save(&buffer.doc, target) {
            self.buffers.insert(path.to_path_buf(), buffer);
            return Err(e);
        }
        info!(from = %path.display(), to = %target.display(), "saved as");
        self.buffers.insert(
            target.to_path_buf(),
            Buffer {
                doc: buffer.doc,
                dirty: false,
            },
        );
        self.emit(format_args!(
            "Saved {} as {}",
            path.display(),
            target.display()
        ))
    }

    fn print(&mut self, path: &Path) -> Result<()> {
        let text = svg::serialize(&self.buffer(path)?.doc)?;
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| SvgError::io("<output>", e))
    }

    fn create(&mut self, path: &Path, width: f64, height: f64) -> Result<()> {
        if self.buffers.contains_key(path) || path.exists() {
            return Err(SvgError::AlreadyExists(path.to_path_buf()));
        }
        let doc = Document::new(width, height);
        svg::save(&doc, path)?;
        info!(path = %path.display(), width, height, "created");
        self.buffers
            .insert(path.to_path_buf(), Buffer { doc, dirty: false });
        self.emit(format_args!(
            "Created {} ({} x {})",
            path.display(),
            format_number_with_precision(width, 3),
            format_number_with_precision(height, 3)
        ))
    }

    fn erase(&mut self, path: &Path, id: &str) -> Result<()> {
        let buffer = self.buffer(path)?;
        let removed = figures::erase(&mut buffer.doc, id)?;
        buffer.dirty = true;
        self.emit(format_args!(
            "Erased {} #{} from {}",
            removed.local_name(),
            id,
            path.display()
        ))
    }

    fn translate(&mut self, path: &Path, target: &TranslateTarget, dx: f64, dy: f64) -> Result<()> {
        let precision = self.settings.precision;
        let buffer = self.buffer(path)?;
        let moved = match target {
            TranslateTarget::Figure(id) => {
                figures::translate(&mut buffer.doc, id, dx, dy, precision)?;
                format!("#{}", id)
            }
            TranslateTarget::All => {
                let n = figures::translate_all(&mut buffer.doc, dx, dy, precision);
                format!("{} figure(s)", n)
            }
        };
        buffer.dirty = true;
        self.emit(format_args!(
            "Translated {} by ({}, {})",
            moved,
            format_number_with_precision(dx, precision),
            format_number_with_precision(dy, precision)
        ))
    }

    fn report_figures(&mut self, hits: &[Figure]) -> Result<()> {
        if self.settings.json {
            let json = serde_json::to_string_pretty(hits)?;
            return self.emit(json);
        }
        if hits.is_empty() {
            return self.emit("No figures in region");
        }
        for figure in hits {
            self.emit(figure)?;
        }
        Ok(())
    }

    /// The buffer for `path`, loading it from disk on first use.
    fn buffer(&mut self, path: &Path) -> Result<&mut Buffer> {
        match self.buffers.entry(path.to_path_buf()) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let doc = svg::load(path)?;
                Ok(e.insert(Buffer { doc, dirty: false }))
            }
        }
    }

    fn emit(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.out, "{}", line).map_err(|e| SvgError::io("<output>", e))
    }
}

fn summarize(doc: &Document) -> String {
    let count = figures::figures(doc).len();
    match (doc.width(), doc.height()) {
        (Some(w), Some(h)) => format!(
            "{} figure(s), {} x {}",
            count,
            format_number_with_precision(w, 3),
            format_number_with_precision(h, 3)
        ),
        _ => format!("{} figure(s)", count),
    }
}
