use std::fmt;

use crate::series::concat_first_differences;
use crate::{Measurement, Statistics};

/// RSA modular exponentiation summary for one RSA operation kind.
///
/// Empty for every non-RSA kind, since only RSA measurements carry the RSA payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RsaReport {
    modular_exponentiation_times: Vec<f64>,
    memory_access_patterns: Vec<f64>,
    cache_behavior: Vec<f64>,
    statistics: Option<Statistics>,
}

impl RsaReport {
    pub(crate) fn from_measurements(measurements: &[Measurement]) -> Self {
        let payloads = || measurements.iter().filter_map(Measurement::rsa);

        let modular_exponentiation_times =
            concat_first_differences(payloads().map(|rsa| rsa.timings.square.as_slice()));

        let memory_access_patterns =
            concat_first_differences(payloads().map(|rsa| rsa.memory.access_pattern.as_slice()));

        #[expect(
            clippy::cast_precision_loss,
            reason = "miss counters stay far below 2^52"
        )]
        let cache_behavior = payloads()
            .flat_map(|rsa| {
                [
                    rsa.cache.key_load_misses as f64,
                    rsa.cache.modulus_load_misses as f64,
                ]
            })
            .collect();

        let statistics = Statistics::compute(&modular_exponentiation_times);

        Self {
            modular_exponentiation_times,
            memory_access_patterns,
            cache_behavior,
            statistics,
        }
    }

    /// Intervals between consecutive squaring samples, concatenated across measurements.
    #[must_use]
    pub fn modular_exponentiation_times(&self) -> &[f64] {
        &self.modular_exponentiation_times
    }

    /// Differences between consecutive RSA memory-access samples, concatenated across
    /// measurements.
    #[must_use]
    pub fn memory_access_patterns(&self) -> &[f64] {
        &self.memory_access_patterns
    }

    /// Key-load then modulus-load miss count of every measurement, flattened in start order.
    #[must_use]
    pub fn cache_behavior(&self) -> &[f64] {
        &self.cache_behavior
    }

    /// Statistics over [`modular_exponentiation_times()`](Self::modular_exponentiation_times).
    #[must_use]
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    /// Whether the report carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modular_exponentiation_times.is_empty()
            && self.memory_access_patterns.is_empty()
            && self.cache_behavior.is_empty()
    }
}

impl fmt::Display for RsaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  rsa:")?;
        writeln!(
            f,
            "    modular exponentiation intervals: {} samples",
            self.modular_exponentiation_times.len()
        )?;
        writeln!(
            f,
            "    memory access intervals: {} samples",
            self.memory_access_patterns.len()
        )?;
        writeln!(
            f,
            "    key/modulus load misses: {} samples",
            self.cache_behavior.len()
        )?;

        if let Some(statistics) = &self.statistics {
            writeln!(f, "    modular exponentiation (ns): {statistics}")?;
        }

        Ok(())
    }
}
