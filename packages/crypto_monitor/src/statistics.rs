use std::fmt;

/// Summary statistics over a numeric series.
///
/// The standard deviation is the population standard deviation (squared deviations are
/// divided by N, not N - 1). No outlier filtering is applied.
///
/// # Example
///
/// ```
/// use crypto_monitor::Statistics;
///
/// let stats = Statistics::compute(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
///
/// assert!((stats.mean - 5.0).abs() < 1e-12);
/// assert!((stats.std_dev - 2.0).abs() < 1e-12);
/// assert!(Statistics::compute(&[]).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct Statistics {
    /// Arithmetic mean.
    pub mean: f64,

    /// Population standard deviation.
    pub std_dev: f64,

    /// Smallest value.
    pub min: f64,

    /// Largest value.
    pub max: f64,

    /// Number of values summarized.
    pub count: usize,
}

impl Statistics {
    /// Summarizes `data`, returning `None` for an empty series.
    #[must_use]
    pub fn compute(data: &[f64]) -> Option<Self> {
        let (&first, _) = data.split_first()?;

        #[expect(
            clippy::cast_precision_loss,
            reason = "series lengths are far below 2^52"
        )]
        let n = data.len() as f64;

        let mean = data.iter().sum::<f64>() / n;
        let squared_deviations = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();

        let (min, max) = data
            .iter()
            .fold((first, first), |(min, max), &x| (min.min(x), max.max(x)));

        Some(Self {
            mean,
            std_dev: (squared_deviations / n).sqrt(),
            min,
            max,
            count: data.len(),
        })
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean {:.2}, stddev {:.2}, min {:.2}, max {:.2} (n={})",
            self.mean, self.std_dev, self.min, self.max, self.count
        )
    }
}
