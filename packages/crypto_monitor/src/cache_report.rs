use std::fmt;

use crate::Measurement;

/// Cache behavior summary for one operation kind.
///
/// Only the L1 miss rate is sampled per measurement. The L2 and L3 series are part of the
/// report shape but are always empty.
#[derive(Clone, Debug, Default, PartialEq)]
#[expect(
    clippy::struct_field_names,
    reason = "fields mirror the per-level getters of the report"
)]
pub struct CacheReport {
    l1_miss_rates: Vec<f64>,
    l2_miss_rates: Vec<f64>,
    l3_miss_rates: Vec<f64>,
}

impl CacheReport {
    pub(crate) fn from_measurements(measurements: &[Measurement]) -> Self {
        Self {
            l1_miss_rates: measurements.iter().map(|m| m.cache().miss_rate).collect(),
            l2_miss_rates: Vec::new(),
            l3_miss_rates: Vec::new(),
        }
    }

    /// L1 miss rate of every measurement, in start order.
    #[must_use]
    pub fn l1_miss_rates(&self) -> &[f64] {
        &self.l1_miss_rates
    }

    /// Reserved. Always empty.
    #[must_use]
    pub fn l2_miss_rates(&self) -> &[f64] {
        &self.l2_miss_rates
    }

    /// Reserved. Always empty.
    #[must_use]
    pub fn l3_miss_rates(&self) -> &[f64] {
        &self.l3_miss_rates
    }

    /// Whether the report carries no data at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.l1_miss_rates.is_empty()
    }
}

impl fmt::Display for CacheReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  cache:")?;

        if self.l1_miss_rates.is_empty() {
            writeln!(f, "    l1 miss rates: none")
        } else {
            let rates = self
                .l1_miss_rates
                .iter()
                .map(|rate| format!("{rate:.3}"))
                .collect::<Vec<_>>()
                .join(", ");

            writeln!(f, "    l1 miss rates: {rates}")
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::counters::MockCounterSource;
    use crate::{HardwareEvent, OperationKind};

    #[test]
    fn one_l1_rate_per_measurement() {
        let mut source = MockCounterSource::new();
        source.expect_now().return_const(0_u64);
        source.expect_read_energy().return_const(0.0_f64);
        source.expect_read_event().returning(|event| match event {
            HardwareEvent::L1Accesses => 10,
            HardwareEvent::L1Misses => 4,
            _ => 1,
        });

        let measurements = [
            Measurement::begin(OperationKind::Sha256Hash, 0, &mut source),
            Measurement::begin(OperationKind::Sha256Hash, 0, &mut source),
        ];

        let report = CacheReport::from_measurements(&measurements);

        assert_eq!(report.l1_miss_rates().len(), 2);
        for rate in report.l1_miss_rates() {
            assert!((rate - 0.4).abs() < 1e-12);
        }
        assert!(report.l2_miss_rates().is_empty());
        assert!(report.l3_miss_rates().is_empty());
        assert_eq!(report.to_string(), "  cache:\n    l1 miss rates: 0.400, 0.400\n");
    }

    #[test]
    fn empty_without_measurements() {
        let report = CacheReport::from_measurements(&[]);

        assert!(report.is_empty());
        assert_eq!(report.to_string(), "  cache:\n    l1 miss rates: none\n");
    }
}
