//! Collaborator traits
//!
//! The export pipeline talks to its environment through three seams: a
//! template lookup service, a templating engine, and a response sink. Hosts
//! plug their own implementations in; this crate ships one of each in the
//! sibling modules.

use crate::domain::{Chunk, RenderError};
use std::io::{self, Read, Write};

/// Template lookup service
///
/// Names are opaque to the pipeline; implementations decide how a name maps
/// to storage (paths, resource bundles, database rows, ...).
pub trait TemplateSource {
    /// Whether a template exists under `name`
    fn exists(&self, name: &str) -> bool;

    /// Opens the template stored under `name`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the template cannot be opened, even if
    /// [`exists`](Self::exists) reported it a moment earlier.
    fn open(&self, name: &str) -> io::Result<Box<dyn Read + '_>>;
}

/// Templating engine
///
/// Renders template bytes against one chunk's data. The engine owns all
/// spreadsheet semantics (cell formatting, formulas, sheet layout).
pub trait TemplateEngine {
    /// Renders `template` with the series views of `chunk`
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the template is malformed, uses an
    /// unexpected encoding, or references data the chunk lacks.
    fn render(
        &self,
        template: &[u8],
        chunk: &Chunk<'_>,
    ) -> Result<Box<dyn RenderedOutput>, RenderError>;
}

/// A rendered document that can serialize itself
pub trait RenderedOutput {
    /// Writes the document to `out`
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by `out`.
    fn write_to(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Response sink for one export
///
/// Headers are set before any body bytes are written for that part of the
/// response.
pub trait ExportResponse {
    /// Sets (or replaces) a response header
    fn set_header(&mut self, name: &str, value: &str);

    /// Output stream for the response body
    fn body(&mut self) -> &mut dyn Write;

    /// Flushes buffered body bytes to the client
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while flushing.
    fn flush(&mut self) -> io::Result<()> {
        self.body().flush()
    }
}
