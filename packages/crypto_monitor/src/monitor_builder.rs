use crate::counters::CounterSourceFacade;
use crate::{CounterSource, MeasurementStore, Monitor};

/// How a [`Monitor`] treats operation names that match no [`OperationKind`](crate::OperationKind).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum UnknownOperationPolicy {
    /// Fail with [`Error::UnknownOperation`](crate::Error::UnknownOperation).
    #[default]
    Reject,

    /// Attribute the call to `AES_ENCRYPT`, logging a warning.
    ///
    /// This reproduces the behavior of earlier monitors, at the cost of silently
    /// misattributing metrics recorded under mistyped names.
    FallbackToAesEncrypt,
}

/// Creates instances of [`Monitor`].
///
/// All parameters are optional. Use `Monitor::builder()` to create a new instance of this
/// builder.
///
/// # Example
///
/// ```
/// use crypto_monitor::{Monitor, SimulatedCounters, UnknownOperationPolicy};
///
/// let mut monitor = Monitor::builder()
///     .counter_source(SimulatedCounters::with_fixed_tick(1_000))
///     .unknown_operations(UnknownOperationPolicy::FallbackToAesEncrypt)
///     .build();
///
/// // Attributed to AES_ENCRYPT.
/// monitor.start_crypto_operation("AES-128", 128).unwrap();
/// ```
#[derive(Debug)]
pub struct MonitorBuilder {
    counters: Option<CounterSourceFacade>,
    unknown_operations: UnknownOperationPolicy,
}

impl MonitorBuilder {
    pub(crate) fn new() -> Self {
        Self {
            counters: None,
            unknown_operations: UnknownOperationPolicy::default(),
        }
    }

    /// Sets the source of timestamps, hardware event counts and energy readings.
    ///
    /// Defaults to [`SimulatedCounters`](crate::SimulatedCounters) following the real
    /// monotonic clock.
    #[must_use]
    pub fn counter_source(self, source: impl CounterSource) -> Self {
        Self {
            counters: Some(CounterSourceFacade::custom(source)),
            ..self
        }
    }

    /// Sets how unrecognized operation names are treated by the name-addressed methods.
    ///
    /// Defaults to [`UnknownOperationPolicy::Reject`].
    #[must_use]
    pub fn unknown_operations(self, policy: UnknownOperationPolicy) -> Self {
        Self {
            unknown_operations: policy,
            ..self
        }
    }

    /// Creates the monitor.
    #[must_use]
    pub fn build(self) -> Monitor {
        Monitor::from_parts(
            MeasurementStore::new(),
            self.counters.unwrap_or_else(CounterSourceFacade::simulated),
            self.unknown_operations,
        )
    }
}
