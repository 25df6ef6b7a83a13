//! Property tests for row-aligned partitioning
//!
//! These tests verify that:
//! - The chunk count is the ceiling of the longest series over the split size
//! - Concatenating a series' slices reproduces the series exactly
//! - Every slice fits in one split and scalars reach every chunk

use bundle_export::core::partition::{partition, Partitioner};
use bundle_export::domain::{Series, SeriesSlice};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use test_case::test_case;

fn numbered(len: usize) -> Vec<Value> {
    (0..len).map(|i| json!(i)).collect()
}

fn series_set(lengths: &[usize]) -> BTreeMap<String, Series> {
    let mut series: BTreeMap<String, Series> = lengths
        .iter()
        .enumerate()
        .map(|(i, &len)| (format!("s{i}"), Series::Sequence(numbered(len))))
        .collect();
    series.insert("title".to_string(), Series::Scalar(json!("Report")));
    series
}

fn sequence_rows<'a>(slice: &SeriesSlice<'a>) -> Vec<&'a Value> {
    match slice {
        SeriesSlice::Sequence(rows) => rows.iter().collect(),
        other => panic!("expected sequence slice, got {other:?}"),
    }
}

#[test_case(25_000, 10_000, &[10_000, 10_000, 5_000] ; "uneven tail")]
#[test_case(20_000, 10_000, &[10_000, 10_000] ; "exact multiple")]
#[test_case(1, 60_000, &[1] ; "single row")]
#[test_case(7, 1, &[1, 1, 1, 1, 1, 1, 1] ; "one row per chunk")]
#[test_case(0, 10, &[] ; "no rows")]
fn test_chunk_sizes(rows: usize, split_size: usize, expected: &[usize]) {
    let series = series_set(&[rows]);
    let sizes: Vec<usize> = partition(&series, split_size)
        .iter()
        .map(|chunk| chunk.get("s0").and_then(|s| s.row_count()).unwrap())
        .collect();
    assert_eq!(sizes, expected);
}

#[test]
fn test_shorter_series_come_up_empty_in_trailing_chunks() {
    let series = series_set(&[5, 2]);
    let chunks = partition(&series, 2);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].get("s1").and_then(|s| s.row_count()), Some(2));
    assert_eq!(chunks[1].get("s1").and_then(|s| s.row_count()), Some(0));
    assert_eq!(chunks[2].get("s1").and_then(|s| s.row_count()), Some(0));
}

proptest! {
    #[test]
    fn prop_chunk_count_is_ceiling(
        lengths in prop::collection::vec(0usize..200, 1..4),
        split_size in 1usize..50,
    ) {
        let series = series_set(&lengths);
        let longest = lengths.iter().copied().max().unwrap_or(0);
        let partitioner = Partitioner::new(&series, split_size);

        prop_assert_eq!(partitioner.max_size(), longest);
        prop_assert_eq!(partitioner.chunk_count(), longest.div_ceil(split_size));
        prop_assert_eq!(partitioner.len(), partitioner.chunk_count());
    }

    #[test]
    fn prop_slices_reassemble_each_series(
        lengths in prop::collection::vec(0usize..200, 1..4),
        split_size in 1usize..50,
    ) {
        let series = series_set(&lengths);
        let chunks = partition(&series, split_size);

        for (i, &len) in lengths.iter().enumerate() {
            let name = format!("s{i}");
            let mut reassembled = Vec::new();
            for chunk in &chunks {
                let slice = chunk.get(&name).unwrap();
                let rows = sequence_rows(&slice);
                prop_assert!(rows.len() <= split_size);
                reassembled.extend(rows.into_iter().cloned());
            }
            prop_assert_eq!(reassembled, numbered(len));
        }
    }

    #[test]
    fn prop_windows_are_contiguous_and_tail_is_remainder(
        len in 1usize..500,
        split_size in 1usize..60,
    ) {
        let series = series_set(&[len]);
        let chunks = partition(&series, split_size);
        let count = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert_eq!(chunk.number(), i + 1);
            prop_assert_eq!(chunk.window.start, i * split_size);
            prop_assert_eq!(chunk.get("title"), Some(SeriesSlice::Scalar(&json!("Report"))));
        }

        let tail = chunks[count - 1].get("s0").and_then(|s| s.row_count());
        prop_assert_eq!(tail, Some(len - (count - 1) * split_size));
    }
}
