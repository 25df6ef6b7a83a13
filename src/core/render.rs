//! Per-chunk rendering

use crate::adapters::{RenderedOutput, TemplateEngine};
use crate::domain::{BundleError, Chunk, Result};
use std::io::Write;

/// Renders chunks through a templating engine
///
/// Engine failures are reported as [`BundleError::RenderFailure`] carrying
/// the index of the failing chunk.
pub struct ChunkRenderer<'e, E: TemplateEngine + ?Sized> {
    engine: &'e E,
}

impl<'e, E: TemplateEngine + ?Sized> ChunkRenderer<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Renders one chunk against `template`
    pub fn render(&self, template: &[u8], chunk: &Chunk<'_>) -> Result<Box<dyn RenderedOutput>> {
        self.engine
            .render(template, chunk)
            .map_err(|source| BundleError::RenderFailure {
                chunk_index: chunk.index,
                source,
            })
    }

    /// Renders one chunk and writes the output to `out`
    ///
    /// Returns the number of bytes written.
    pub fn render_to(
        &self,
        template: &[u8],
        chunk: &Chunk<'_>,
        out: &mut dyn Write,
    ) -> Result<u64> {
        let output = self.render(template, chunk)?;
        let mut counting = CountingWriter::new(out);
        output.write_to(&mut counting)?;
        tracing::trace!(
            chunk_index = chunk.index,
            bytes = counting.count,
            "Chunk written"
        );
        Ok(counting.count)
    }
}

/// Writer adapter that counts bytes passed through
pub(crate) struct CountingWriter<'w> {
    inner: &'w mut dyn Write,
    pub(crate) count: u64,
}

impl<'w> CountingWriter<'w> {
    pub(crate) fn new(inner: &'w mut dyn Write) -> Self {
        Self { inner, count: 0 }
    }
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TextTemplateEngine;
    use crate::core::partition::Partitioner;
    use crate::domain::{Bundle, RenderError};
    use serde_json::json;

    fn bundle(rows: usize, split_size: usize) -> Bundle {
        Bundle::builder()
            .split_size(split_size)
            .series(
                "rows",
                (0..rows).map(|i| json!({ "id": i })).collect::<Vec<_>>(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_render_to_writes_and_counts() {
        let bundle = bundle(3, 10);
        let chunk = Partitioner::for_bundle(&bundle).next().unwrap();
        let engine = TextTemplateEngine::new();
        let renderer = ChunkRenderer::new(&engine);

        let mut out = Vec::new();
        let bytes = renderer
            .render_to(b"#each rows\n${id}\n#end\n", &chunk, &mut out)
            .unwrap();

        assert_eq!(out, b"0\n1\n2\n");
        assert_eq!(bytes, 6);
    }

    #[test]
    fn test_engine_failure_carries_chunk_index() {
        let bundle = bundle(5, 2);
        let chunk = Partitioner::for_bundle(&bundle).nth(2).unwrap();
        let engine = TextTemplateEngine::new();
        let renderer = ChunkRenderer::new(&engine);

        let err = renderer
            .render(b"#each missing\n#end\n", &chunk)
            .err()
            .unwrap();

        match err {
            BundleError::RenderFailure {
                chunk_index,
                source: RenderError::MissingData(name),
            } => {
                assert_eq!(chunk_index, 2);
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
