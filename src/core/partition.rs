//! Row-aligned partitioning of bundle series
//!
//! Every sequence and keyed series is cut with the same `[start, end)`
//! windows, so chunk `i` holds rows `i * split_size ..` of each series.
//! Series shorter than the longest one simply come up empty in the trailing
//! chunks. Scalars are broadcast into every chunk.

use crate::domain::{Bundle, Chunk, Series, SeriesSlice, Window};
use std::collections::BTreeMap;

/// Lazy chunk iterator over a set of series
///
/// The chunk count is known up front, and each chunk only borrows from the
/// source series.
#[derive(Debug, Clone)]
pub struct Partitioner<'a> {
    series: &'a BTreeMap<String, Series>,
    split_size: usize,
    max_size: usize,
    chunk_count: usize,
    next: usize,
}

impl<'a> Partitioner<'a> {
    /// Creates a partitioner for `series` cut every `split_size` rows
    ///
    /// A zero `split_size` yields no chunks; bundles are validated before
    /// they get here.
    pub fn new(series: &'a BTreeMap<String, Series>, split_size: usize) -> Self {
        let max_size = series
            .values()
            .filter_map(Series::row_count)
            .max()
            .unwrap_or(0);
        let chunk_count = if split_size == 0 {
            0
        } else {
            max_size.div_ceil(split_size)
        };

        Self {
            series,
            split_size,
            max_size,
            chunk_count,
            next: 0,
        }
    }

    /// Creates a partitioner over a bundle's series and split size
    pub fn for_bundle(bundle: &'a Bundle) -> Self {
        Self::new(&bundle.series, bundle.split_size)
    }

    /// Total number of chunks, regardless of iteration progress
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Largest row count across partitionable series
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Builds chunk `index`, or `None` past the last chunk
    pub fn chunk(&self, index: usize) -> Option<Chunk<'a>> {
        if index >= self.chunk_count {
            return None;
        }
        let start = index * self.split_size;
        let window = Window::new(start, start + self.split_size);
        Some(slice_series(self.series, index, window))
    }

    /// Single chunk spanning every row, used when nothing needs splitting
    pub fn whole(&self) -> Chunk<'a> {
        slice_series(self.series, 0, Window::new(0, self.max_size))
    }
}

impl<'a> Iterator for Partitioner<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunk(self.next)?;
        self.next += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_count.saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Partitioner<'_> {}

/// Splits `series` into row-aligned chunks of at most `split_size` rows
///
/// # Examples
///
/// ```
/// use bundle_export::core::partition::partition;
/// use bundle_export::domain::Series;
/// use serde_json::json;
/// use std::collections::BTreeMap;
///
/// let mut series = BTreeMap::new();
/// series.insert("rows".to_string(), Series::from(json!([1, 2, 3, 4, 5])));
///
/// let chunks = partition(&series, 2);
/// let sizes: Vec<_> = chunks
///     .iter()
///     .map(|c| c.get("rows").and_then(|s| s.row_count()).unwrap())
///     .collect();
/// assert_eq!(sizes, vec![2, 2, 1]);
/// ```
pub fn partition(series: &BTreeMap<String, Series>, split_size: usize) -> Vec<Chunk<'_>> {
    Partitioner::new(series, split_size).collect()
}

fn slice_series(series: &BTreeMap<String, Series>, index: usize, window: Window) -> Chunk<'_> {
    let data = series
        .iter()
        .map(|(name, value)| {
            let slice = match value {
                Series::Sequence(rows) => match window.clamp(rows.len()) {
                    Some(range) => SeriesSlice::Sequence(&rows[range]),
                    None => SeriesSlice::Sequence(&[]),
                },
                Series::Keyed(entries) => match window.clamp(entries.len()) {
                    Some(range) => SeriesSlice::Keyed(&entries[range]),
                    None => SeriesSlice::Keyed(&[]),
                },
                Series::Scalar(value) => SeriesSlice::Scalar(value),
            };
            (name.as_str(), slice)
        })
        .collect();

    Chunk {
        index,
        window,
        data,
    }
}
