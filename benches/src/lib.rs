//! Shared input generators for the benchmarks.

/// Repeat counts cycling through `0..=max_repeat`, so some slices are dropped.
pub fn cyclic_repeats(len: usize, max_repeat: usize) -> Vec<i64> {
    (0..len).map(|i| (i % (max_repeat + 1)) as i64).collect()
}

/// An `[len, 2]` scope table whose offset column is the running sum of the counts.
pub fn scope_rows(repeats: &[i64]) -> Vec<Vec<i64>> {
    let mut offset = 0;
    repeats
        .iter()
        .map(|&count| {
            let row = vec![offset, count];
            offset += count;
            row
        })
        .collect()
}
