//! Alignment of tail-anchored sequences.
//!
//! Recurrences with different warm-up lengths produce outputs that end on the
//! same bar but start at different offsets. Every combinator in the crate
//! reconciles them with [`align_to_common_tail`]: each input is trimmed from
//! the front down to the shortest length.

/// Trim every sequence from the front to the length of the shortest one.
///
/// The last element of each output equals the last element of its input.
pub fn align_to_common_tail<'a>(sequences: &[&'a [f64]]) -> Vec<&'a [f64]> {
    let Some(min_len) = sequences.iter().map(|s| s.len()).min() else {
        return Vec::new();
    };

    sequences
        .iter()
        .map(|&s| &s[s.len() - min_len..])
        .collect()
}

/// Two-sequence form of [`align_to_common_tail`].
pub fn align_pair<'a>(a: &'a [f64], b: &'a [f64]) -> (&'a [f64], &'a [f64]) {
    let aligned = align_to_common_tail(&[a, b]);
    (aligned[0], aligned[1])
}

/// Map a tail-aligned sequence onto `len` bar positions.
///
/// Positions before the first value are `None`. If `values` is longer than
/// `len`, only the last `len` values are kept.
pub fn pad_front(values: &[f64], len: usize) -> Vec<Option<f64>> {
    let kept = &values[values.len().saturating_sub(len)..];
    let mut out = vec![None; len - kept.len()];
    out.extend(kept.iter().copied().map(Some));
    out
}
