//! Archive assembly
//!
//! Streams every regular file directly inside a directory into a zip
//! archive written to a non-seekable output. Entries are named by file name
//! and ordered naturally, so `report_10.xlsx` follows `report_9.xlsx`.

use crate::domain::{BundleError, Result};
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default read buffer for archive entries (64 KiB)
pub const DEFAULT_ARCHIVE_BUFFER_SIZE: usize = 64 * 1024;

/// Totals for one assembled archive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Number of entries written
    pub entries: usize,
    /// Uncompressed bytes read from the source files
    pub source_bytes: u64,
}

/// Writes a directory's files as a zip stream
#[derive(Debug, Clone)]
pub struct ArchiveAssembler {
    buffer_size: usize,
}

impl Default for ArchiveAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_ARCHIVE_BUFFER_SIZE)
    }
}

impl ArchiveAssembler {
    /// Creates an assembler reading files through a `buffer_size` buffer
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Streams the immediate files of `source_dir` into `out` as a zip archive
    ///
    /// Subdirectories are skipped. When a source file fails, the central
    /// directory is still written so whatever reached `out` stays readable.
    /// Once `out` itself rejects a write, nothing more is sent to it.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ArchiveFailure`] when the directory cannot be
    /// listed, a file cannot be read, or `out` rejects a write.
    pub fn assemble(&self, source_dir: &Path, out: &mut dyn Write) -> Result<ArchiveStats> {
        let files = list_files(source_dir)?;
        tracing::debug!(
            dir = %source_dir.display(),
            entries = files.len(),
            "Assembling archive"
        );

        let mut zip = ZipWriter::new_stream(FusedWriter::new(&mut *out));
        let written = self.write_entries(&mut zip, &files);
        let finished = zip.finish();

        let stats = written?;
        finished.map_err(|e| {
            BundleError::ArchiveFailure(format!("Failed to finish archive: {e}"))
        })?;
        out.flush().map_err(|e| {
            BundleError::ArchiveFailure(format!("Failed to flush archive: {e}"))
        })?;

        Ok(stats)
    }

    fn write_entries<W: Write + std::io::Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        files: &[(String, PathBuf)],
    ) -> Result<ArchiveStats> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut buffer = vec![0u8; self.buffer_size];
        let mut stats = ArchiveStats::default();

        for (name, path) in files {
            zip.start_file(name.as_str(), options)?;

            let mut file = File::open(path).map_err(|e| {
                BundleError::ArchiveFailure(format!("Failed to open '{}': {e}", path.display()))
            })?;

            loop {
                let read = file.read(&mut buffer).map_err(|e| {
                    BundleError::ArchiveFailure(format!("Failed to read '{}': {e}", path.display()))
                })?;
                if read == 0 {
                    break;
                }
                zip.write_all(&buffer[..read]).map_err(|e| {
                    BundleError::ArchiveFailure(format!("Failed to write entry '{name}': {e}"))
                })?;
                stats.source_bytes += read as u64;
            }

            stats.entries += 1;
            tracing::trace!(entry = %name, "Archive entry written");
        }

        Ok(stats)
    }
}

/// Forwards writes until the first failure, then discards them
///
/// Finishing the archive after a broken sink must not retry the sink.
struct FusedWriter<'w> {
    inner: &'w mut dyn Write,
    failed: bool,
}

impl<'w> FusedWriter<'w> {
    fn new(inner: &'w mut dyn Write) -> Self {
        Self {
            inner,
            failed: false,
        }
    }
}

impl Write for FusedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.failed {
            return Ok(buf.len());
        }
        self.inner.write(buf).inspect_err(|e| {
            if e.kind() != io::ErrorKind::Interrupted {
                self.failed = true;
            }
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.failed {
            return Ok(());
        }
        self.inner.flush()
    }
}

/// Regular files directly inside `dir`, in natural name order
fn list_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        BundleError::ArchiveFailure(format!("Failed to list '{}': {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            BundleError::ArchiveFailure(format!("Failed to list '{}': {e}", dir.display()))
        })?;
        let file_type = entry.file_type().map_err(|e| {
            BundleError::ArchiveFailure(format!(
                "Failed to stat '{}': {e}",
                entry.path().display()
            ))
        })?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        files.push((name, entry.path()));
    }

    files.sort_by(|(a, _), (b, _)| natural_cmp(a, b).then_with(|| a.cmp(b)));
    Ok(files)
}

/// Compares names treating runs of ASCII digits as numbers
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_digits = take_digits(&mut left);
                let r_digits = take_digits(&mut right);
                let ordering = compare_digit_runs(&l_digits, &r_digits);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(&r);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}
