use std::fmt;

use tracing::{debug, trace, warn};

use crate::counters::CounterSourceFacade;
use crate::{
    CacheReport, Measurement, MeasurementId, MeasurementStore, MonitorBuilder, OperationKind,
    ResearchReport, Result, RsaReport, RsaStep, TimingReport, UnknownOperationPolicy,
};

/// Records measurements of cryptographic operations and derives side-channel reports from them.
///
/// A monitor owns every measurement it records. Measurements are grouped by
/// [`OperationKind`] and kept in start order for the lifetime of the monitor.
///
/// Each kind follows a simple lifecycle: [`start()`](Self::start), any number of
/// [`record_round()`](Self::record_round) calls, then [`end()`](Self::end). The kind-addressed
/// calls act on the most recently started measurement of that kind and silently do nothing
/// if it does not exist or has already ended. Starting a new measurement while the previous
/// one of the same kind is still open leaves the previous one open forever.
///
/// # Examples
///
/// ```
/// use crypto_monitor::{Monitor, OperationKind};
///
/// let mut monitor = Monitor::new();
///
/// for _ in 0..3 {
///     monitor.start(OperationKind::Sha256Hash, 0);
///     for round in 0..64 {
///         monitor.record_round(OperationKind::Sha256Hash, round);
///     }
///     monitor.end(OperationKind::Sha256Hash);
/// }
///
/// let report = monitor.timing_report(OperationKind::Sha256Hash);
/// println!("{:?}", report.statistics());
/// ```
#[derive(Debug)]
pub struct Monitor {
    store: MeasurementStore,
    counters: CounterSourceFacade,
    unknown_operations: UnknownOperationPolicy,
}

impl Monitor {
    /// Creates a monitor backed by simulated counters that rejects unknown operation names.
    ///
    /// Use [`builder()`](Self::builder) to customize either.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a customized monitor.
    #[must_use]
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    pub(crate) fn from_parts(
        store: MeasurementStore,
        counters: CounterSourceFacade,
        unknown_operations: UnknownOperationPolicy,
    ) -> Self {
        Self {
            store,
            counters,
            unknown_operations,
        }
    }

    /// Starts a new measurement of `kind`, capturing the timing, energy, cache, branch and
    /// memory baseline, plus an initial RSA sample for RSA kinds.
    pub fn start(&mut self, kind: OperationKind, key_size: u64) -> MeasurementId {
        if self.store.latest_open_mut(kind).is_some() {
            warn!(%kind, "starting a new measurement abandons the open one");
        }

        let measurement = Measurement::begin(kind, key_size, &mut self.counters);
        let id = self.store.append(measurement);

        debug!(%kind, index = id.index(), key_size, "measurement started");

        id
    }

    /// Records one round of the latest open measurement of `kind`.
    ///
    /// Does nothing if there is no open measurement of that kind.
    pub fn record_round(&mut self, kind: OperationKind, round_index: u64) {
        let Some(measurement) = self.store.latest_open_mut(kind) else {
            debug!(%kind, round_index, "no open measurement, round ignored");
            return;
        };

        measurement.record_round(round_index, &mut self.counters);
        trace!(%kind, round_index, "round recorded");
    }

    /// Records one modular exponentiation step of the latest open measurement of `kind`.
    ///
    /// Does nothing if there is no open measurement of that kind or if it is not an RSA kind.
    pub fn record_rsa_step(&mut self, kind: OperationKind, step: RsaStep) {
        let Some(measurement) = self.store.latest_open_mut(kind) else {
            debug!(%kind, ?step, "no open measurement, RSA step ignored");
            return;
        };

        if measurement.record_rsa_step(step, &mut self.counters) {
            trace!(%kind, ?step, "RSA step recorded");
        }
    }

    /// Ends the latest open measurement of `kind`, stamping the end time and re-sampling
    /// cache, branch and memory counters over the baseline.
    ///
    /// Does nothing if there is no open measurement of that kind.
    pub fn end(&mut self, kind: OperationKind) {
        let Some(measurement) = self.store.latest_open_mut(kind) else {
            debug!(%kind, "no open measurement, end ignored");
            return;
        };

        measurement.finish(&mut self.counters);
        debug!(
            %kind,
            execution_time_ns = measurement.execution_time(),
            "measurement ended"
        );
    }

    /// Records one round of the measurement identified by `id`.
    ///
    /// # Errors
    ///
    /// Fails if the measurement does not exist, has ended, or was superseded by a newer
    /// measurement of the same kind.
    pub fn record_round_at(&mut self, id: MeasurementId, round_index: u64) -> Result<()> {
        self.store
            .open_mut(id)?
            .record_round(round_index, &mut self.counters);

        trace!(%id, round_index, "round recorded");
        Ok(())
    }

    /// Records one modular exponentiation step of the measurement identified by `id`.
    ///
    /// Steps recorded on non-RSA measurements are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the measurement does not exist, has ended, or was superseded by a newer
    /// measurement of the same kind.
    pub fn record_rsa_step_at(&mut self, id: MeasurementId, step: RsaStep) -> Result<()> {
        if self
            .store
            .open_mut(id)?
            .record_rsa_step(step, &mut self.counters)
        {
            trace!(%id, ?step, "RSA step recorded");
        }

        Ok(())
    }

    /// Ends the measurement identified by `id`.
    ///
    /// # Errors
    ///
    /// Fails if the measurement does not exist, has already ended, or was superseded by a
    /// newer measurement of the same kind.
    pub fn end_at(&mut self, id: MeasurementId) -> Result<()> {
        let measurement = self.store.open_mut(id)?;
        measurement.finish(&mut self.counters);

        debug!(
            %id,
            execution_time_ns = measurement.execution_time(),
            "measurement ended"
        );
        Ok(())
    }

    /// All measurements of `kind`, in start order.
    #[must_use]
    pub fn measurements(&self, kind: OperationKind) -> &[Measurement] {
        self.store.measurements(kind)
    }

    /// The measurement identified by `id`, if it exists.
    #[must_use]
    pub fn measurement(&self, id: MeasurementId) -> Option<&Measurement> {
        self.store.get(id)
    }

    /// Total number of measurements across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no measurement has been started yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Execution times, round variations and power variations of all measurements of `kind`.
    #[must_use]
    pub fn timing_report(&self, kind: OperationKind) -> TimingReport {
        TimingReport::from_measurements(self.store.measurements(kind))
    }

    /// L1 miss rates of all measurements of `kind`.
    #[must_use]
    pub fn cache_report(&self, kind: OperationKind) -> CacheReport {
        CacheReport::from_measurements(self.store.measurements(kind))
    }

    /// Modular exponentiation intervals, RSA memory access intervals and key/modulus load
    /// misses of all measurements of `kind`. Empty for non-RSA kinds.
    #[must_use]
    pub fn rsa_report(&self, kind: OperationKind) -> RsaReport {
        RsaReport::from_measurements(self.store.measurements(kind))
    }

    /// Timing and cache reports of `kind`, plus the RSA report for RSA kinds.
    #[must_use]
    pub fn research_report(&self, kind: OperationKind) -> ResearchReport {
        ResearchReport::from_measurements(kind, self.store.measurements(kind))
    }

    /// Resolves an operation name according to the configured [`UnknownOperationPolicy`].
    ///
    /// # Errors
    ///
    /// Fails for unrecognized names under [`UnknownOperationPolicy::Reject`].
    pub fn resolve(&self, operation_name: &str) -> Result<OperationKind> {
        match (operation_name.parse(), self.unknown_operations) {
            (Ok(kind), _) => Ok(kind),
            (Err(_), UnknownOperationPolicy::FallbackToAesEncrypt) => {
                warn!(
                    operation_name,
                    "unknown operation name attributed to AES_ENCRYPT"
                );
                Ok(OperationKind::AesEncrypt)
            }
            (Err(error), UnknownOperationPolicy::Reject) => Err(error),
        }
    }

    /// Name-addressed form of [`start()`](Self::start).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn start_crypto_operation(
        &mut self,
        operation_name: &str,
        key_size: u64,
    ) -> Result<MeasurementId> {
        let kind = self.resolve(operation_name)?;
        Ok(self.start(kind, key_size))
    }

    /// Name-addressed form of [`record_round()`](Self::record_round).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn record_round_metrics(&mut self, operation_name: &str, round_index: u64) -> Result<()> {
        let kind = self.resolve(operation_name)?;
        self.record_round(kind, round_index);
        Ok(())
    }

    /// Name-addressed form of [`end()`](Self::end).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn end_crypto_operation(&mut self, operation_name: &str) -> Result<()> {
        let kind = self.resolve(operation_name)?;
        self.end(kind);
        Ok(())
    }

    /// Name-addressed form of [`timing_report()`](Self::timing_report).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn analyze_timing_side_channels(&self, operation_name: &str) -> Result<TimingReport> {
        Ok(self.timing_report(self.resolve(operation_name)?))
    }

    /// Name-addressed form of [`cache_report()`](Self::cache_report).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn analyze_cache_behavior(&self, operation_name: &str) -> Result<CacheReport> {
        Ok(self.cache_report(self.resolve(operation_name)?))
    }

    /// Name-addressed form of [`rsa_report()`](Self::rsa_report).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn analyze_rsa_performance(&self, operation_name: &str) -> Result<RsaReport> {
        Ok(self.rsa_report(self.resolve(operation_name)?))
    }

    /// Name-addressed form of [`research_report()`](Self::research_report).
    ///
    /// # Errors
    ///
    /// Fails if the name cannot be resolved.
    pub fn get_research_metrics(&self, operation_name: &str) -> Result<ResearchReport> {
        Ok(self.research_report(self.resolve(operation_name)?))
    }

    /// Prints the research report of every used operation kind to stdout.
    ///
    /// Prints nothing if no measurement was ever started.
    #[cfg_attr(test, mutants::skip)] // Stdout output is verified manually.
    pub fn print_to_stdout(&self) {
        if self.is_empty() {
            return;
        }
        println!("{self}");
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No cryptographic operations measured.");
        }

        for kind in self.store.used_kinds() {
            write!(f, "{}", self.research_report(kind))?;
        }

        Ok(())
    }
}
