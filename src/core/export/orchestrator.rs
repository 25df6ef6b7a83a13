//! Export orchestration
//!
//! Drives one bundle through validation, template resolution, partitioning
//! and rendering, and writes either a single document or a zip archive of
//! per-chunk documents to the response.
//!
//! ```text
//! Init -> Resolving -> SingleRender ---------------> Done
//!                   \-> MultiRender -> Streaming -/
//! (any state) -> Failed
//! ```

use super::summary::{ExportMode, ExportSummary};
use super::workdir::WorkingDirectory;
use crate::adapters::{ExportResponse, TemplateEngine, TemplateSource};
use crate::config::ExportConfig;
use crate::core::archive::{ArchiveAssembler, DEFAULT_ARCHIVE_BUFFER_SIZE};
use crate::core::attachment::{AttachmentNamer, ClientCompatibility};
use crate::core::partition::Partitioner;
use crate::core::render::{ChunkRenderer, CountingWriter};
use crate::core::template::{base_name, ResolvedTemplate, TemplateResolver};
use crate::domain::{
    Bundle, BundleError, OutputFormat, Result, CONTENT_TYPE_ZIP, EXTENSION_ZIP,
};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::watch;

/// Response header carrying the media type
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Response header carrying the attachment filename
pub const HEADER_CONTENT_DISPOSITION: &str = "Content-Disposition";

/// Pipeline state of one export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Init,
    Resolving,
    SingleRender,
    MultiRender,
    Streaming,
    Done,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Init => "init",
            ExportState::Resolving => "resolving",
            ExportState::SingleRender => "single_render",
            ExportState::MultiRender => "multi_render",
            ExportState::Streaming => "streaming",
            ExportState::Done => "done",
            ExportState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tunables shared by every export of an orchestrator
#[derive(Debug, Clone)]
pub struct ExportSettings {
    /// Prepended to default view names during template resolution
    pub view_prefix: String,

    /// Spreadsheet format produced by the engine
    pub format: OutputFormat,

    /// Parent of working directories (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,

    /// Read buffer used when streaming archive entries
    pub archive_buffer_size: usize,

    /// Filename encoding used when a request does not choose one
    pub client_compatibility: ClientCompatibility,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            view_prefix: String::new(),
            format: OutputFormat::default(),
            temp_dir: None,
            archive_buffer_size: DEFAULT_ARCHIVE_BUFFER_SIZE,
            client_compatibility: ClientCompatibility::default(),
        }
    }
}

impl From<&ExportConfig> for ExportSettings {
    fn from(config: &ExportConfig) -> Self {
        Self {
            view_prefix: config.view_prefix.clone(),
            format: config.format,
            temp_dir: config.temp_dir.clone(),
            archive_buffer_size: config.archive_buffer_size,
            client_compatibility: config.client_compatibility,
        }
    }
}

/// One export request
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub bundle: &'a Bundle,
    pub default_view_name: &'a str,
    pub compatibility: Option<ClientCompatibility>,
}

impl<'a> ExportRequest<'a> {
    pub fn new(bundle: &'a Bundle, default_view_name: &'a str) -> Self {
        Self {
            bundle,
            default_view_name,
            compatibility: None,
        }
    }

    /// Overrides the configured filename encoding for this request
    pub fn with_compatibility(mut self, compatibility: ClientCompatibility) -> Self {
        self.compatibility = Some(compatibility);
        self
    }
}

struct StateTracker {
    state: ExportState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            state: ExportState::Init,
        }
    }

    fn advance(&mut self, next: ExportState) {
        crate::log_state_transition!(self.state, next);
        self.state = next;
    }
}

/// Runs bundle exports against a template source and engine
pub struct ExportOrchestrator<S: TemplateSource, E: TemplateEngine> {
    source: S,
    engine: E,
    settings: ExportSettings,
    cancel: Option<watch::Receiver<bool>>,
}

impl<S: TemplateSource, E: TemplateEngine> ExportOrchestrator<S, E> {
    /// Creates an orchestrator
    pub fn new(source: S, engine: E, settings: ExportSettings) -> Self {
        Self {
            source,
            engine,
            settings,
            cancel: None,
        }
    }

    /// Aborts exports at the next chunk boundary once `signal` turns `true`
    pub fn with_cancellation(mut self, signal: watch::Receiver<bool>) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Exports `request` onto `response`
    ///
    /// Headers are set before the first body byte. A working directory is
    /// only created when the bundle splits into more than one chunk, and it
    /// is removed before this returns, on success and failure alike.
    ///
    /// # Errors
    ///
    /// - [`BundleError::InvalidBundle`] before any I/O for a bad bundle
    /// - [`BundleError::TemplateNotFound`] when no candidate exists
    /// - [`BundleError::RenderFailure`] when the engine rejects a chunk
    /// - [`BundleError::ArchiveFailure`] when streaming the archive fails
    /// - [`BundleError::Cancelled`] when the cancellation signal was raised
    pub fn export(
        &self,
        request: &ExportRequest<'_>,
        response: &mut dyn ExportResponse,
    ) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut tracker = StateTracker::new();

        crate::log_export_start!(request.default_view_name, request.bundle.split_size);

        match self.run(&mut tracker, request, response) {
            Ok(summary) => {
                tracker.advance(ExportState::Done);
                let summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                let failed_in = tracker.state;
                tracker.advance(ExportState::Failed);
                crate::log_error_with_context!(&e, failed_in.to_string());
                Err(e)
            }
        }
    }

    fn run(
        &self,
        tracker: &mut StateTracker,
        request: &ExportRequest<'_>,
        response: &mut dyn ExportResponse,
    ) -> Result<ExportSummary> {
        let bundle = request.bundle;
        bundle.validate()?;

        tracker.advance(ExportState::Resolving);
        let resolver = TemplateResolver::new(
            &self.source,
            &self.settings.view_prefix,
            self.settings.format,
        );
        let template = resolver.resolve(bundle, request.default_view_name)?;

        let basename = bundle
            .filename
            .as_deref()
            .map(base_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| template.base_name())
            .to_string();
        let namer = AttachmentNamer::new(
            request
                .compatibility
                .unwrap_or(self.settings.client_compatibility),
        );

        let partitioner = Partitioner::for_bundle(bundle);
        let chunk_count = partitioner.chunk_count();
        tracing::debug!(
            chunk_count,
            max_size = partitioner.max_size(),
            split_size = bundle.split_size,
            "Partitioned bundle"
        );

        let mut summary = if chunk_count <= 1 {
            tracker.advance(ExportState::SingleRender);
            self.render_single(&template, partitioner, &basename, &namer, response)?
        } else {
            tracker.advance(ExportState::MultiRender);
            self.render_archive(tracker, &template, partitioner, &basename, &namer, response)?
        };

        response.flush()?;

        summary.chunk_count = chunk_count;
        summary.template = template.name;
        Ok(summary)
    }

    fn render_single(
        &self,
        template: &ResolvedTemplate,
        partitioner: Partitioner<'_>,
        basename: &str,
        namer: &AttachmentNamer,
        response: &mut dyn ExportResponse,
    ) -> Result<ExportSummary> {
        self.check_cancelled(0)?;

        let chunk = partitioner.chunk(0).unwrap_or_else(|| partitioner.whole());
        let output = ChunkRenderer::new(&self.engine).render(&template.bytes, &chunk)?;

        let attachment_name = format!("{basename}{}", self.settings.format.extension());
        let content_type = self.settings.format.content_type();
        response.set_header(HEADER_CONTENT_TYPE, content_type);
        response.set_header(HEADER_CONTENT_DISPOSITION, &namer.name(&attachment_name));

        let mut body = CountingWriter::new(response.body());
        output.write_to(&mut body)?;

        let mut summary = ExportSummary::new(ExportMode::SingleFile);
        summary.documents_rendered = 1;
        summary.bytes_written = body.count;
        summary.attachment_name = attachment_name;
        summary.content_type = content_type.to_string();
        Ok(summary)
    }

    fn render_archive(
        &self,
        tracker: &mut StateTracker,
        template: &ResolvedTemplate,
        partitioner: Partitioner<'_>,
        basename: &str,
        namer: &AttachmentNamer,
        response: &mut dyn ExportResponse,
    ) -> Result<ExportSummary> {
        let workdir = match &self.settings.temp_dir {
            Some(parent) => WorkingDirectory::create_in(parent)?,
            None => WorkingDirectory::create()?,
        };

        let renderer = ChunkRenderer::new(&self.engine);
        let extension = self.settings.format.extension();
        let total = partitioner.chunk_count();
        let mut documents = 0;

        for chunk in partitioner {
            self.check_cancelled(chunk.index)?;

            let path = workdir.file(&format!("{basename}_{}{extension}", chunk.number()));
            let mut writer = BufWriter::new(File::create(&path)?);
            let bytes = renderer.render_to(&template.bytes, &chunk, &mut writer)?;
            writer.flush()?;
            drop(writer);

            documents += 1;
            crate::log_chunk_rendered!(chunk.index, total, bytes);
        }

        tracker.advance(ExportState::Streaming);

        let attachment_name = format!("{basename}{EXTENSION_ZIP}");
        response.set_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_ZIP);
        response.set_header(HEADER_CONTENT_DISPOSITION, &namer.name(&attachment_name));

        let assembler = ArchiveAssembler::new(self.settings.archive_buffer_size);
        let mut body = CountingWriter::new(response.body());
        let stats = assembler.assemble(workdir.path(), &mut body)?;
        let bytes_written = body.count;
        drop(workdir);

        tracing::debug!(
            entries = stats.entries,
            source_bytes = stats.source_bytes,
            archive_bytes = bytes_written,
            "Archive streamed"
        );

        let mut summary = ExportSummary::new(ExportMode::Archive);
        summary.documents_rendered = documents;
        summary.bytes_written = bytes_written;
        summary.attachment_name = attachment_name;
        summary.content_type = CONTENT_TYPE_ZIP.to_string();
        Ok(summary)
    }

    fn check_cancelled(&self, completed_chunks: usize) -> Result<()> {
        match &self.cancel {
            Some(signal) if *signal.borrow() => {
                tracing::warn!(completed_chunks, "Export cancelled");
                Err(BundleError::Cancelled { completed_chunks })
            }
            _ => Ok(()),
        }
    }
}
