//! Bundle domain model
//!
//! A [`Bundle`] is the payload of one export request: the named data series
//! to render, the split threshold, and optional template and filename hints.

use super::errors::BundleError;
use super::result::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Rows per chunk when the caller does not choose a split size
pub const DEFAULT_SPLIT_SIZE: usize = 10_000;

/// Largest accepted split size (legacy `.xls` sheets stop at 65,536 rows)
pub const MAX_SPLIT_SIZE: usize = 60_000;

/// One named data series
///
/// Sequence and keyed series are partitioned by row position. Every other
/// value is broadcast unchanged into each chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    /// Ordered records
    Sequence(Vec<Value>),

    /// Ordered key/record association; insertion order is the row order
    Keyed(Vec<(String, Value)>),

    /// Any non-collection value
    Scalar(Value),
}

impl Series {
    /// Number of rows, or `None` for scalars
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Series::Sequence(rows) => Some(rows.len()),
            Series::Keyed(entries) => Some(entries.len()),
            Series::Scalar(_) => None,
        }
    }

    /// Builds a keyed series from key/value pairs, keeping their order
    pub fn keyed<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Series::Keyed(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<Value> for Series {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(rows) => Series::Sequence(rows),
            Value::Object(map) => Series::Keyed(map.into_iter().collect()),
            other => Series::Scalar(other),
        }
    }
}

impl From<Vec<Value>> for Series {
    fn from(rows: Vec<Value>) -> Self {
        Series::Sequence(rows)
    }
}

/// Export request payload
///
/// # Examples
///
/// ```
/// use bundle_export::domain::Bundle;
/// use serde_json::json;
///
/// let bundle = Bundle::builder()
///     .filename("sales-2024")
///     .template_name("sales/report.xlsx")
///     .split_size(5_000)
///     .series("rows", json!([{"id": 1}, {"id": 2}]))
///     .series("title", json!("Quarterly sales"))
///     .build()
///     .unwrap();
///
/// assert_eq!(bundle.max_size(), 2);
/// assert_eq!(bundle.chunk_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    /// Output base name; derived from the template name when absent
    pub filename: Option<String>,

    /// Template reference; the caller's default view name is used when absent
    pub template_name: Option<String>,

    /// Maximum rows per chunk, in `1..=MAX_SPLIT_SIZE`
    pub split_size: usize,

    /// Named data series
    pub series: BTreeMap<String, Series>,
}

impl Default for Bundle {
    fn default() -> Self {
        Self {
            filename: None,
            template_name: None,
            split_size: DEFAULT_SPLIT_SIZE,
            series: BTreeMap::new(),
        }
    }
}

impl Bundle {
    /// Creates an empty bundle with the default split size
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    /// Adds or replaces a named series
    pub fn put(&mut self, name: impl Into<String>, series: impl Into<Series>) {
        self.series.insert(name.into(), series.into());
    }

    /// Looks up a series by name
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    /// Checks the split size bound
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidBundle`] when `split_size` is zero or
    /// above [`MAX_SPLIT_SIZE`]. Out-of-range values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<()> {
        if self.split_size == 0 {
            return Err(BundleError::InvalidBundle(
                "split_size must be greater than 0".to_string(),
            ));
        }
        if self.split_size > MAX_SPLIT_SIZE {
            return Err(BundleError::InvalidBundle(format!(
                "The maximum value of split_size is {MAX_SPLIT_SIZE}, got {}",
                self.split_size
            )));
        }
        Ok(())
    }

    /// Largest row count across sequence and keyed series
    pub fn max_size(&self) -> usize {
        self.series
            .values()
            .filter_map(Series::row_count)
            .max()
            .unwrap_or(0)
    }

    /// Number of chunks this bundle partitions into
    pub fn chunk_count(&self) -> usize {
        if self.split_size == 0 {
            return 0;
        }
        self.max_size().div_ceil(self.split_size)
    }

    /// Decodes a bundle from a JSON payload
    ///
    /// Arrays become sequence series, objects become keyed series in source
    /// key order, and everything else is broadcast as a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidBundle`] when the payload is not valid
    /// JSON, lacks a `series` object, or fails validation.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let payload: BundlePayload = serde_json::from_slice(bytes)?;
        Self::try_from(payload)
    }
}

/// Wire shape of a bundle payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundlePayload {
    #[serde(default)]
    filename: Option<String>,

    #[serde(default, alias = "template", alias = "template_name")]
    template_name: Option<String>,

    #[serde(default, alias = "split_size")]
    split_size: Option<usize>,

    #[serde(default)]
    series: Option<serde_json::Map<String, Value>>,
}

impl TryFrom<BundlePayload> for Bundle {
    type Error = BundleError;

    fn try_from(payload: BundlePayload) -> Result<Self> {
        let series = payload
            .series
            .ok_or_else(|| BundleError::InvalidBundle("series is required".to_string()))?;

        let bundle = Bundle {
            filename: payload.filename,
            template_name: payload.template_name,
            split_size: payload.split_size.unwrap_or(DEFAULT_SPLIT_SIZE),
            series: series
                .into_iter()
                .map(|(name, value)| (name, Series::from(value)))
                .collect(),
        };
        bundle.validate()?;
        Ok(bundle)
    }
}

/// Builder for [`Bundle`]
#[derive(Debug, Default)]
pub struct BundleBuilder {
    filename: Option<String>,
    template_name: Option<String>,
    split_size: Option<usize>,
    series: BTreeMap<String, Series>,
}

impl BundleBuilder {
    /// Creates a new BundleBuilder
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output base name
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the template reference
    pub fn template_name(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Sets the maximum rows per chunk
    pub fn split_size(mut self, split_size: usize) -> Self {
        self.split_size = Some(split_size);
        self
    }

    /// Adds a named series
    pub fn series(mut self, name: impl Into<String>, series: impl Into<Series>) -> Self {
        self.series.insert(name.into(), series.into());
        self
    }

    /// Builds and validates the Bundle
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidBundle`] if the split size is out of range
    pub fn build(self) -> Result<Bundle> {
        let bundle = Bundle {
            filename: self.filename,
            template_name: self.template_name,
            split_size: self.split_size.unwrap_or(DEFAULT_SPLIT_SIZE),
            series: self.series,
        };
        bundle.validate()?;
        Ok(bundle)
    }
}
