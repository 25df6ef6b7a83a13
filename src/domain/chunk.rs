//! Chunk domain model
//!
//! A [`Chunk`] is one row window over a [`Bundle`](super::Bundle). It borrows
//! the bundle's records instead of copying them.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Half-open row range `[start, end)` shared by every series in a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// First row (inclusive)
    pub start: usize,
    /// Last row (exclusive)
    pub end: usize,
}

impl Window {
    /// Creates a window
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Nominal width of the window
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window covers no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clamps the window to a collection of `len` rows
    ///
    /// Returns `None` when the window starts at or beyond `len`.
    pub fn clamp(&self, len: usize) -> Option<std::ops::Range<usize>> {
        if self.start < len {
            Some(self.start..self.end.min(len))
        } else {
            None
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Borrowed view of one series inside a chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesSlice<'a> {
    /// Rows of a sequence series falling in the window
    Sequence(&'a [Value]),

    /// Entries of a keyed series whose position falls in the window
    Keyed(&'a [(String, Value)]),

    /// Broadcast value
    Scalar(&'a Value),
}

impl<'a> SeriesSlice<'a> {
    /// Number of rows in the slice, or `None` for scalars
    pub fn row_count(&self) -> Option<usize> {
        match self {
            SeriesSlice::Sequence(rows) => Some(rows.len()),
            SeriesSlice::Keyed(entries) => Some(entries.len()),
            SeriesSlice::Scalar(_) => None,
        }
    }

    /// Iterates the records of a sequence or keyed slice
    ///
    /// Scalars yield nothing.
    pub fn records(&self) -> Box<dyn Iterator<Item = &'a Value> + 'a> {
        match *self {
            SeriesSlice::Sequence(rows) => Box::new(rows.iter()),
            SeriesSlice::Keyed(entries) => Box::new(entries.iter().map(|(_, v)| v)),
            SeriesSlice::Scalar(_) => Box::new(std::iter::empty()),
        }
    }

    /// Converts the slice into an owned JSON value
    pub fn to_value(&self) -> Value {
        match *self {
            SeriesSlice::Sequence(rows) => Value::Array(rows.to_vec()),
            SeriesSlice::Keyed(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<String, Value>>(),
            ),
            SeriesSlice::Scalar(value) => value.clone(),
        }
    }
}

/// One partition window over a bundle's series
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk<'a> {
    /// Zero-based ordinal
    pub index: usize,

    /// Row range applied to every series
    pub window: Window,

    /// Series name to sliced view
    pub data: BTreeMap<&'a str, SeriesSlice<'a>>,
}

impl<'a> Chunk<'a> {
    /// One-based chunk number, used for output file names
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Looks up a series view by name
    pub fn get(&self, name: &str) -> Option<SeriesSlice<'a>> {
        self.data.get(name).copied()
    }

    /// Flattens the chunk into a JSON object for engines that want one
    pub fn to_dataset(&self) -> Map<String, Value> {
        self.data
            .iter()
            .map(|(name, slice)| ((*name).to_string(), slice.to_value()))
            .collect()
    }
}
