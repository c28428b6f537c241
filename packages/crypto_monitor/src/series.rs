//! Derived series computed from raw samples.

/// A raw sample value that can be differenced into a signed `f64` step.
pub trait SeriesValue: Copy {
    /// The step from `earlier` to `later`.
    fn step(earlier: Self, later: Self) -> f64;
}

impl SeriesValue for u64 {
    /// Counter samples are non-decreasing, so a backwards step is clamped to zero.
    #[expect(
        clippy::cast_precision_loss,
        reason = "steps between consecutive samples are far below 2^52"
    )]
    fn step(earlier: Self, later: Self) -> f64 {
        later.saturating_sub(earlier) as f64
    }
}

impl SeriesValue for f64 {
    fn step(earlier: Self, later: Self) -> f64 {
        later - earlier
    }
}

/// Computes the first-difference series `[s1 - s0, s2 - s1, ...]` of `samples`.
///
/// The result has one element fewer than the input and is empty for fewer than two samples.
///
/// # Example
///
/// ```
/// use crypto_monitor::first_differences;
///
/// assert_eq!(first_differences(&[10_u64, 15, 27]), [5.0, 12.0]);
/// assert!(first_differences::<u64>(&[10]).is_empty());
/// ```
#[must_use]
pub fn first_differences<T>(samples: &[T]) -> Vec<f64>
where
    T: SeriesValue,
{
    samples
        .iter()
        .zip(samples.iter().skip(1))
        .map(|(&earlier, &later)| T::step(earlier, later))
        .collect()
}

/// Concatenates the first-difference series of every sample sequence, in iteration order.
pub(crate) fn concat_first_differences<'a, T, I>(sequences: I) -> Vec<f64>
where
    T: SeriesValue + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    sequences.into_iter().flat_map(first_differences).collect()
}
