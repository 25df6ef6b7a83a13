//! Response sinks
//!
//! [`BufferedResponse`] collects headers and body in memory, which suits
//! tests and hosts that hand the body to another layer. [`FileResponse`]
//! streams the body into a file and is what the CLI uses.

use super::traits::ExportResponse;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// In-memory response
#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    flushes: usize,
}

impl BufferedResponse {
    /// Creates an empty response
    pub fn new() -> Self {
        Self::default()
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in the order they were first set
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Body bytes written so far
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consumes the response, returning the body
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Number of explicit flushes
    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl ExportResponse for BufferedResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.body
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Response whose body is streamed to a file
#[derive(Debug)]
pub struct FileResponse {
    path: PathBuf,
    headers: Vec<(String, String)>,
    writer: BufWriter<File>,
}

impl FileResponse {
    /// Creates (or truncates) the body file at `path`
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            headers: Vec::new(),
            writer: BufWriter::new(file),
        })
    }

    /// Path of the body file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl ExportResponse for FileResponse {
    fn set_header(&mut self, name: &str, value: &str) {
        tracing::debug!(header = name, value = value, "Response header");
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_buffered_header_replacement_is_case_insensitive() {
        let mut response = BufferedResponse::new();
        response.set_header("Content-Type", "text/csv");
        response.set_header("content-type", "application/zip");
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/zip"));
    }

    #[test]
    fn test_buffered_body_and_flush() {
        let mut response = BufferedResponse::new();
        response.body().write_all(b"hello").unwrap();
        ExportResponse::flush(&mut response).unwrap();
        assert_eq!(response.body_bytes(), b"hello");
        assert_eq!(response.flush_count(), 1);
    }

    #[test]
    fn test_file_response_writes_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.bin");
        {
            let mut response = FileResponse::create(&path).unwrap();
            response.set_header("Content-Type", "text/csv");
            response.body().write_all(b"a,b\n").unwrap();
            ExportResponse::flush(&mut response).unwrap();
            assert_eq!(response.header("content-type"), Some("text/csv"));
        }
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }
}
