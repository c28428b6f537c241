use std::fmt;

use crate::{CacheReport, Measurement, OperationKind, RsaReport, TimingReport};

/// Composite report for one operation kind: timing and cache summaries, plus the RSA
/// summary for RSA kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchReport {
    kind: OperationKind,
    timing: TimingReport,
    cache: CacheReport,
    rsa: Option<RsaReport>,
}

impl ResearchReport {
    pub(crate) fn from_measurements(kind: OperationKind, measurements: &[Measurement]) -> Self {
        Self {
            kind,
            timing: TimingReport::from_measurements(measurements),
            cache: CacheReport::from_measurements(measurements),
            rsa: kind
                .is_rsa()
                .then(|| RsaReport::from_measurements(measurements)),
        }
    }

    /// The operation kind this report describes.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Timing and power summary.
    #[must_use]
    pub fn timing(&self) -> &TimingReport {
        &self.timing
    }

    /// Cache summary.
    #[must_use]
    pub fn cache(&self) -> &CacheReport {
        &self.cache
    }

    /// RSA summary. Present for RSA kinds only, even when it is empty.
    #[must_use]
    pub fn rsa(&self) -> Option<&RsaReport> {
        self.rsa.as_ref()
    }

    /// Whether none of the contained reports carry any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timing.is_empty()
            && self.cache.is_empty()
            && self.rsa.as_ref().is_none_or(RsaReport::is_empty)
    }
}

impl fmt::Display for ResearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.kind)?;
        write!(f, "{}", self.timing)?;
        write!(f, "{}", self.cache)?;

        if let Some(rsa) = &self.rsa {
            write!(f, "{rsa}")?;
        }

        Ok(())
    }
}
