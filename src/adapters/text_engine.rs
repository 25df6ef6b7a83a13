//! Line-oriented text template engine
//!
//! Renders delimited-text (CSV) templates. The syntax is deliberately small:
//!
//! ```text
//! Report,${title}
//! id,name,amount
//! #each rows
//! ${id},${name},${amount}
//! #end
//! ```
//!
//! - `${name}` outside a block resolves a scalar series of the chunk.
//! - `#each <series>` ... `#end` repeats its lines once per record of a
//!   sequence or keyed series. Inside the block `${field}` reads a field of
//!   the current record (falling back to scalar series), `${.}` is the record
//!   itself and `${@key}` the entry key of a keyed series.
//! - Missing record fields render empty; unknown top-level names fail.
//!
//! Values are CSV-escaped unless escaping is turned off.

use super::traits::{RenderedOutput, TemplateEngine};
use crate::domain::{Chunk, RenderError, SeriesSlice};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;
use std::io::{self, Write};

const EACH_DIRECTIVE: &str = "#each";
const END_DIRECTIVE: &str = "#end";

/// Engine for `${placeholder}` text templates
#[derive(Debug, Clone)]
pub struct TextTemplateEngine {
    csv_escape: bool,
}

impl Default for TextTemplateEngine {
    fn default() -> Self {
        Self { csv_escape: true }
    }
}

impl TextTemplateEngine {
    /// Creates an engine that CSV-escapes substituted values
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns CSV escaping of substituted values on or off
    pub fn with_csv_escape(mut self, csv_escape: bool) -> Self {
        self.csv_escape = csv_escape;
        self
    }
}

/// Rendered text document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    text: String,
    records: usize,
}

impl TextDocument {
    /// Rendered text
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of records expanded by `#each` blocks
    pub fn records(&self) -> usize {
        self.records
    }
}

impl RenderedOutput for TextDocument {
    fn write_to(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.text.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Line(Vec<Segment>),
    Each { series: String, body: Vec<Vec<Segment>> },
}

impl TemplateEngine for TextTemplateEngine {
    fn render(
        &self,
        template: &[u8],
        chunk: &Chunk<'_>,
    ) -> Result<Box<dyn RenderedOutput>, RenderError> {
        Ok(Box::new(self.render_document(template, chunk)?))
    }
}

impl TextTemplateEngine {
    /// Renders a template into a [`TextDocument`]
    ///
    /// # Errors
    ///
    /// See [`TemplateEngine::render`].
    pub fn render_document(
        &self,
        template: &[u8],
        chunk: &Chunk<'_>,
    ) -> Result<TextDocument, RenderError> {
        let source = std::str::from_utf8(template)
            .map_err(|e| RenderError::Encoding(format!("template is not UTF-8: {e}")))?;
        let nodes = parse(source)?;

        let mut out = Output {
            text: String::with_capacity(source.len()),
            escaper: self.csv_escape.then(CsvEscaper::default),
        };
        let mut records = 0;

        for node in &nodes {
            match node {
                Node::Line(segments) => {
                    render_line(&mut out, segments, chunk, None)?;
                }
                Node::Each { series, body } => {
                    let slice = chunk
                        .get(series)
                        .ok_or_else(|| RenderError::MissingData(series.clone()))?;
                    records += render_block(&mut out, body, chunk, slice, series)?;
                }
            }
        }

        Ok(TextDocument {
            text: out.text,
            records,
        })
    }
}

/// Document text under construction
struct Output {
    text: String,
    escaper: Option<CsvEscaper>,
}

impl Output {
    fn push_value(&mut self, value: &str) -> Result<(), RenderError> {
        match self.escaper.as_mut() {
            Some(escaper) => escaper.push_field(&mut self.text, value),
            None => {
                self.text.push_str(value);
                Ok(())
            }
        }
    }
}

/// Quotes single values the way a CSV writer quotes a field
#[derive(Default)]
struct CsvEscaper {
    scratch: Vec<u8>,
}

impl CsvEscaper {
    const FIELD_BUFFER: usize = 256;

    fn push_field(&mut self, out: &mut String, value: &str) -> Result<(), RenderError> {
        // A lone empty field would come back as `""`
        if value.is_empty() {
            return Ok(());
        }

        self.scratch.clear();
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .quote_style(QuoteStyle::Necessary)
                .terminator(Terminator::CRLF)
                .buffer_capacity(Self::FIELD_BUFFER)
                .from_writer(&mut self.scratch);
            writer.write_record([value]).map_err(escape_error)?;
            writer.flush().map_err(escape_error)?;
        }

        let field = self
            .scratch
            .strip_suffix(b"\r\n")
            .unwrap_or(self.scratch.as_slice());
        let field = std::str::from_utf8(field).map_err(escape_error)?;
        out.push_str(field);
        Ok(())
    }
}

fn escape_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Encoding(format!("failed to escape value: {err}"))
}

fn render_block(
    out: &mut Output,
    body: &[Vec<Segment>],
    chunk: &Chunk<'_>,
    slice: SeriesSlice<'_>,
    series: &str,
) -> Result<usize, RenderError> {
    match slice {
        SeriesSlice::Sequence(rows) => {
            for row in rows {
                for segments in body {
                    render_line(out, segments, chunk, Some((None, row)))?;
                }
            }
            Ok(rows.len())
        }
        SeriesSlice::Keyed(entries) => {
            for (key, row) in entries {
                for segments in body {
                    render_line(out, segments, chunk, Some((Some(key), row)))?;
                }
            }
            Ok(entries.len())
        }
        SeriesSlice::Scalar(_) => Err(RenderError::MalformedTemplate(format!(
            "'{series}' is not a sequence or keyed series"
        ))),
    }
}

fn render_line(
    out: &mut Output,
    segments: &[Segment],
    chunk: &Chunk<'_>,
    record: Option<(Option<&String>, &Value)>,
) -> Result<(), RenderError> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.text.push_str(text),
            Segment::Placeholder(name) => {
                let value = resolve(name, chunk, record)?;
                out.push_value(&value)?;
            }
        }
    }
    out.text.push('\n');
    Ok(())
}

fn resolve(
    name: &str,
    chunk: &Chunk<'_>,
    record: Option<(Option<&String>, &Value)>,
) -> Result<String, RenderError> {
    if let Some((key, row)) = record {
        match name {
            "." => return Ok(display(row)),
            "@key" => return Ok(key.cloned().unwrap_or_default()),
            _ => {}
        }
        if let Some(field) = row.as_object().and_then(|fields| fields.get(name)) {
            return Ok(display(field));
        }
        return Ok(match chunk.get(name) {
            Some(SeriesSlice::Scalar(value)) => display(value),
            _ => String::new(),
        });
    }

    match chunk.get(name) {
        Some(SeriesSlice::Scalar(value)) => Ok(display(value)),
        Some(_) => Err(RenderError::MalformedTemplate(format!(
            "'{name}' is a row series; use it inside an {EACH_DIRECTIVE} block"
        ))),
        None => Err(RenderError::MissingData(name.to_string())),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse(source: &str) -> Result<Vec<Node>, RenderError> {
    let mut nodes = Vec::new();
    let mut open_block: Option<(String, Vec<Vec<Segment>>, usize)> = None;

    for (line_no, line) in source.lines().enumerate() {
        let line_no = line_no + 1;
        let directive = line.trim();

        if let Some(rest) = directive.strip_prefix(EACH_DIRECTIVE) {
            let series = rest.trim();
            if series.is_empty() || !rest.starts_with(char::is_whitespace) {
                return Err(RenderError::MalformedTemplate(format!(
                    "line {line_no}: {EACH_DIRECTIVE} needs a series name"
                )));
            }
            if open_block.is_some() {
                return Err(RenderError::MalformedTemplate(format!(
                    "line {line_no}: nested {EACH_DIRECTIVE} blocks are not supported"
                )));
            }
            open_block = Some((series.to_string(), Vec::new(), line_no));
            continue;
        }

        if directive == END_DIRECTIVE {
            let (series, body, _) = open_block.take().ok_or_else(|| {
                RenderError::MalformedTemplate(format!(
                    "line {line_no}: {END_DIRECTIVE} without {EACH_DIRECTIVE}"
                ))
            })?;
            nodes.push(Node::Each { series, body });
            continue;
        }

        let segments = parse_line(line, line_no)?;
        match open_block.as_mut() {
            Some((_, body, _)) => body.push(segments),
            None => nodes.push(Node::Line(segments)),
        }
    }

    if let Some((series, _, line_no)) = open_block {
        return Err(RenderError::MalformedTemplate(format!(
            "line {line_no}: {EACH_DIRECTIVE} {series} is never closed"
        )));
    }

    Ok(nodes)
}

fn parse_line(line: &str, line_no: usize) -> Result<Vec<Segment>, RenderError> {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(start) = rest.find("${") {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            RenderError::MalformedTemplate(format!("line {line_no}: unclosed placeholder"))
        })?;
        let name = after[..end].trim();
        if name.is_empty() {
            return Err(RenderError::MalformedTemplate(format!(
                "line {line_no}: empty placeholder"
            )));
        }
        segments.push(Segment::Placeholder(name.to_string()));
        rest = &after[end + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Series, Window};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn chunk_of<'a>(series: &'a BTreeMap<String, Series>) -> Chunk<'a> {
        crate::core::partition::Partitioner::new(series, 1_000).whole()
    }

    fn sample() -> BTreeMap<String, Series> {
        let mut series = BTreeMap::new();
        series.insert("title".to_string(), Series::from(json!("Q1, 2024")));
        series.insert(
            "rows".to_string(),
            Series::from(json!([
                {"id": 1, "name": "Ada"},
                {"id": 2, "name": "Grace \"Hopper\""},
                {"id": 3}
            ])),
        );
        series.insert(
            "regions".to_string(),
            Series::from(json!({"north": 10, "south": 20})),
        );
        series
    }

    #[test]
    fn test_renders_scalars_and_blocks() {
        let series = sample();
        let chunk = chunk_of(&series);
        let template = b"Report,${title}\nid,name\n#each rows\n${id},${name}\n#end\n";

        let doc = TextTemplateEngine::new()
            .render_document(template, &chunk)
            .unwrap();

        assert_eq!(
            doc.as_str(),
            "Report,\"Q1, 2024\"\nid,name\n1,Ada\n2,\"Grace \"\"Hopper\"\"\"\n3,\n"
        );
        assert_eq!(doc.records(), 3);
    }

    #[test]
    fn test_values_quoted_like_csv_fields() {
        let mut series = BTreeMap::new();
        series.insert(
            "rows".to_string(),
            Series::from(json!([
                "plain",
                "multi\nline",
                "carriage\rreturn",
                "say \"hi\"",
                ""
            ])),
        );
        let chunk = chunk_of(&series);

        let doc = TextTemplateEngine::new()
            .render_document(b"#each rows\n[${.}]\n#end\n", &chunk)
            .unwrap();

        assert_eq!(
            doc.as_str(),
            "[plain]\n[\"multi\nline\"]\n[\"carriage\rreturn\"]\n[\"say \"\"hi\"\"\"]\n[]\n"
        );
    }

    #[test]
    fn test_keyed_block_exposes_key() {
        let series = sample();
        let chunk = chunk_of(&series);
        let template = b"#each regions\n${@key}=${.}\n#end";

        let doc = TextTemplateEngine::new()
            .render_document(template, &chunk)
            .unwrap();
        assert_eq!(doc.as_str(), "north=10\nsouth=20\n");
    }

    #[test]
    fn test_escape_can_be_disabled() {
        let series = sample();
        let chunk = chunk_of(&series);
        let doc = TextTemplateEngine::new()
            .with_csv_escape(false)
            .render_document(b"${title}", &chunk)
            .unwrap();
        assert_eq!(doc.as_str(), "Q1, 2024\n");
    }

    #[test]
    fn test_empty_window_renders_header_only() {
        let series = sample();
        let chunk = Chunk {
            index: 4,
            window: Window::new(40, 50),
            data: series
                .iter()
                .map(|(k, v)| {
                    let slice = match v {
                        Series::Sequence(_) => SeriesSlice::Sequence(&[]),
                        Series::Keyed(_) => SeriesSlice::Keyed(&[]),
                        Series::Scalar(value) => SeriesSlice::Scalar(value),
                    };
                    (k.as_str(), slice)
                })
                .collect(),
        };
        let doc = TextTemplateEngine::new()
            .render_document(b"id\n#each rows\n${id}\n#end\n", &chunk)
            .unwrap();
        assert_eq!(doc.as_str(), "id\n");
        assert_eq!(doc.records(), 0);
    }

    #[test]
    fn test_unknown_series_is_missing_data() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"#each nope\n#end", &chunk);
        assert!(matches!(result, Err(RenderError::MissingData(name)) if name == "nope"));
    }

    #[test]
    fn test_unknown_scalar_is_missing_data() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"${author}", &chunk);
        assert!(matches!(result, Err(RenderError::MissingData(_))));
    }

    #[test]
    fn test_row_series_outside_block_is_rejected() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"${rows}", &chunk);
        assert!(matches!(result, Err(RenderError::MalformedTemplate(_))));
    }

    #[test]
    fn test_unclosed_block_is_malformed() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"#each rows\n${id}", &chunk);
        assert!(matches!(result, Err(RenderError::MalformedTemplate(_))));
    }

    #[test]
    fn test_stray_end_is_malformed() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"#end", &chunk);
        assert!(matches!(result, Err(RenderError::MalformedTemplate(_))));
    }

    #[test]
    fn test_unclosed_placeholder_is_malformed() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(b"${title", &chunk);
        assert!(matches!(result, Err(RenderError::MalformedTemplate(_))));
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let series = sample();
        let chunk = chunk_of(&series);
        let result = TextTemplateEngine::new().render_document(&[0xff, 0xfe, 0x00], &chunk);
        assert!(matches!(result, Err(RenderError::Encoding(_))));
    }

    #[test]
    fn test_write_to_emits_text() {
        let series = sample();
        let chunk = chunk_of(&series);
        let rendered = TextTemplateEngine::new()
            .render(b"${title}", &chunk)
            .unwrap();
        let mut out = Vec::new();
        rendered.write_to(&mut out).unwrap();
        assert_eq!(out, b"\"Q1, 2024\"\n");
    }
}
