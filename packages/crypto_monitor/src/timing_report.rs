use std::fmt;

use crate::series::concat_first_differences;
use crate::{Measurement, Statistics};

/// Timing and power side-channel summary for one operation kind.
///
/// Measurements that have not ended contribute their round and power variations but no
/// execution time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingReport {
    execution_times: Vec<f64>,
    round_variations: Vec<f64>,
    power_variations: Vec<f64>,
    statistics: Option<Statistics>,
}

impl TimingReport {
    pub(crate) fn from_measurements(measurements: &[Measurement]) -> Self {
        #[expect(
            clippy::cast_precision_loss,
            reason = "execution times in nanoseconds stay far below 2^52"
        )]
        let execution_times: Vec<f64> = measurements
            .iter()
            .filter_map(Measurement::execution_time)
            .map(|nanos| nanos as f64)
            .collect();

        let round_variations = concat_first_differences(
            measurements
                .iter()
                .map(|m| m.crypto().round_timings.as_slice()),
        );

        let power_variations = concat_first_differences(
            measurements
                .iter()
                .map(|m| m.crypto().round_power.as_slice()),
        );

        let statistics = Statistics::compute(&execution_times);

        Self {
            execution_times,
            round_variations,
            power_variations,
            statistics,
        }
    }

    /// End-to-end execution time of every ended measurement, in nanoseconds, in start order.
    #[must_use]
    pub fn execution_times(&self) -> &[f64] {
        &self.execution_times
    }

    /// Durations between consecutive rounds, concatenated across measurements.
    #[must_use]
    pub fn round_variations(&self) -> &[f64] {
        &self.round_variations
    }

    /// Energy changes between consecutive rounds, concatenated across measurements.
    #[must_use]
    pub fn power_variations(&self) -> &[f64] {
        &self.power_variations
    }

    /// Statistics over [`execution_times()`](Self::execution_times).
    #[must_use]
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    /// Whether the report carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.execution_times.is_empty()
            && self.round_variations.is_empty()
            && self.power_variations.is_empty()
    }
}

impl fmt::Display for TimingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  timing:")?;
        writeln!(
            f,
            "    execution times: {} samples",
            self.execution_times.len()
        )?;
        writeln!(
            f,
            "    round variations: {} samples",
            self.round_variations.len()
        )?;
        writeln!(
            f,
            "    power variations: {} samples",
            self.power_variations.len()
        )?;

        if let Some(statistics) = &self.statistics {
            writeln!(f, "    execution time (ns): {statistics}")?;
        }

        Ok(())
    }
}
