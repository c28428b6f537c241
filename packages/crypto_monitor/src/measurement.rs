//! One recorded invocation of a cryptographic operation.

use crate::{CounterSource, HardwareEvent, OperationKind, first_differences};

/// Timestamps and retired-instruction counts bracketing the operation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct TimingMetrics {
    /// Monotonic instant at which the operation started, in nanoseconds.
    pub start_time: u64,

    /// Monotonic instant at which the operation ended. `None` until the measurement ends.
    pub end_time: Option<u64>,

    /// Retired-instruction counter at start.
    pub start_instructions: u64,

    /// Retired-instruction counter at end. `None` until the measurement ends.
    pub end_instructions: Option<u64>,
}

/// Cache counters, holding the baseline until the measurement ends and the end-of-operation
/// values afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct CacheMetrics {
    /// L1 data cache accesses.
    pub l1_accesses: u64,

    /// L1 data cache misses.
    pub l1_misses: u64,

    /// L2 cache misses.
    pub l2_misses: u64,

    /// Last-level cache misses.
    pub l3_misses: u64,

    /// `l1_misses / l1_accesses`, or 0 if there were no accesses.
    pub miss_rate: f64,
}

/// Branch prediction counters, sampled like [`CacheMetrics`].
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct BranchMetrics {
    /// Retired branch instructions.
    pub total_branches: u64,

    /// Mispredicted branches.
    pub mispredictions: u64,

    /// `mispredictions / total_branches`, or 0 if there were no branches.
    pub mispredict_rate: f64,
}

/// Energy readings taken over the life of the measurement.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct PowerMetrics {
    /// Energy reading at start.
    pub start_energy: f64,

    /// Energy reading at end. `None` until the measurement ends.
    pub end_energy: Option<f64>,

    /// Voltage fluctuation sampled at end. `None` until the measurement ends or if the
    /// counter source does not report one.
    pub voltage_fluctuation: Option<f64>,

    /// Current draw sampled at end. `None` until the measurement ends or if the counter
    /// source does not report one.
    pub current_draw: Option<f64>,

    /// Every energy reading taken (start, each round, end) in chronological order.
    pub trace: Vec<f64>,
}

/// Memory subsystem counters, sampled like [`CacheMetrics`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct MemoryMetrics {
    /// Page faults.
    pub page_faults: u64,

    /// TLB misses.
    pub tlb_misses: u64,

    /// Memory bandwidth counter.
    pub bandwidth: u64,

    /// Raw bandwidth counter samples, one per hardware sampling point.
    pub access_patterns: Vec<u64>,
}

/// Parameters and per-round signals common to every primitive.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct CryptoMetrics {
    /// Key size declared by the caller when starting the operation.
    pub key_size: u64,

    /// Nominal block size of the primitive in bytes, 0 if not block-based.
    pub block_size: u64,

    /// `round_index + 1` of the last recorded round.
    pub rounds: u64,

    /// Timestamp of each recorded round.
    pub round_timings: Vec<u64>,

    /// Energy reading of each recorded round.
    pub round_power: Vec<f64>,
}

/// Timestamps of the steps of modular exponentiation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct RsaTimings {
    /// Timestamp of the initial sample and of every squaring step.
    pub square: Vec<u64>,

    /// Timestamp of every multiplication step.
    pub multiply: Vec<u64>,

    /// Timestamp of every reduction step.
    pub reduce: Vec<u64>,
}

/// Cache counters specific to RSA key handling.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct RsaCacheMetrics {
    /// Cache misses while loading key material, as of the latest squaring sample.
    pub key_load_misses: u64,

    /// Cache misses while loading the modulus, as of the latest squaring sample.
    pub modulus_load_misses: u64,

    /// Cache misses during Montgomery reduction, as of the latest reduction step.
    pub montgomery_cache_misses: u64,
}

/// Memory counters specific to RSA key handling.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct RsaMemoryMetrics {
    /// Accesses to memory holding key material, sampled at end.
    pub key_memory_accesses: u64,

    /// Accesses to temporary bignum buffers, sampled at end.
    pub temp_buffer_accesses: u64,

    /// Raw memory-access counter samples, one per squaring sample.
    pub access_pattern: Vec<u64>,
}

/// The RSA-specific payload carried only by measurements of RSA kinds.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct RsaMetrics {
    /// Modulus size in bits, taken from the declared key size.
    pub modulus_size: u64,

    /// Number of recorded squaring steps.
    pub modular_exponentiation_count: u64,

    /// Number of recorded Montgomery multiplication steps.
    pub montgomery_multiplications: u64,

    /// Step timestamps.
    pub timings: RsaTimings,

    /// RSA-specific cache counters.
    pub cache: RsaCacheMetrics,

    /// RSA-specific memory counters.
    pub memory: RsaMemoryMetrics,
}

impl RsaMetrics {
    /// Intervals between consecutive squaring samples, an estimate of per-step
    /// modular exponentiation time.
    #[must_use]
    pub fn modular_exponentiation_intervals(&self) -> Vec<f64> {
        first_differences(&self.timings.square)
    }

    /// Differences between consecutive RSA memory-access samples.
    #[must_use]
    pub fn memory_access_intervals(&self) -> Vec<f64> {
        first_differences(&self.memory.access_pattern)
    }

    fn sample_square<S>(&mut self, source: &mut S)
    where
        S: CounterSource + ?Sized,
    {
        self.timings.square.push(source.now());
        self.cache.key_load_misses = source.read_event(HardwareEvent::RsaKeyLoadMisses);
        self.cache.modulus_load_misses = source.read_event(HardwareEvent::RsaModulusLoadMisses);
        self.memory
            .access_pattern
            .push(source.read_event(HardwareEvent::RsaMemoryAccesses));
    }
}

/// A step of RSA modular exponentiation that the caller can mark.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(
    clippy::exhaustive_enums,
    reason = "square-and-multiply with Montgomery reduction has exactly these steps"
)]
pub enum RsaStep {
    /// A modular squaring.
    Square,

    /// A Montgomery multiplication.
    Multiply,

    /// A Montgomery reduction.
    Reduce,
}

/// One complete or in-progress measurement of a single cryptographic operation invocation.
///
/// Measurements are created by [`Monitor::start()`](crate::Monitor::start), modified by round
/// and RSA step calls, and frozen by [`Monitor::end()`](crate::Monitor::end). They stay in the
/// monitor for its whole lifetime.
#[derive(Clone, Debug)]
pub struct Measurement {
    kind: OperationKind,
    timing: TimingMetrics,
    cache: CacheMetrics,
    branch: BranchMetrics,
    power: PowerMetrics,
    memory: MemoryMetrics,
    crypto: CryptoMetrics,

    // Present if and only if `kind.is_rsa()`.
    rsa: Option<RsaMetrics>,
}

impl Measurement {
    pub(crate) fn begin<S>(kind: OperationKind, key_size: u64, source: &mut S) -> Self
    where
        S: CounterSource + ?Sized,
    {
        let start_time = source.now();
        let start_instructions = source.read_event(HardwareEvent::InstructionsRetired);
        let start_energy = source.read_energy();

        let mut measurement = Self {
            kind,
            timing: TimingMetrics {
                start_time,
                end_time: None,
                start_instructions,
                end_instructions: None,
            },
            cache: CacheMetrics::default(),
            branch: BranchMetrics::default(),
            power: PowerMetrics {
                start_energy,
                trace: vec![start_energy],
                ..PowerMetrics::default()
            },
            memory: MemoryMetrics::default(),
            crypto: CryptoMetrics {
                key_size,
                block_size: kind.block_size(),
                ..CryptoMetrics::default()
            },
            rsa: kind.is_rsa().then(|| RsaMetrics {
                modulus_size: key_size,
                ..RsaMetrics::default()
            }),
        };

        measurement.sample_hardware(source);

        if let Some(rsa) = &mut measurement.rsa {
            rsa.sample_square(source);
        }

        measurement
    }

    pub(crate) fn record_round<S>(&mut self, round_index: u64, source: &mut S)
    where
        S: CounterSource + ?Sized,
    {
        debug_assert!(!self.is_ended(), "ended measurements are immutable");

        self.crypto.round_timings.push(source.now());

        let energy = source.read_energy();
        self.crypto.round_power.push(energy);
        self.power.trace.push(energy);

        self.crypto.rounds = round_index.saturating_add(1);
    }

    /// Returns `false` without touching the counter source if there is no RSA payload.
    pub(crate) fn record_rsa_step<S>(&mut self, step: RsaStep, source: &mut S) -> bool
    where
        S: CounterSource + ?Sized,
    {
        debug_assert!(!self.is_ended(), "ended measurements are immutable");

        let Some(rsa) = &mut self.rsa else {
            return false;
        };

        match step {
            RsaStep::Square => {
                rsa.sample_square(source);
                rsa.modular_exponentiation_count =
                    rsa.modular_exponentiation_count.saturating_add(1);
            }
            RsaStep::Multiply => {
                rsa.timings.multiply.push(source.now());
                rsa.montgomery_multiplications = rsa.montgomery_multiplications.saturating_add(1);
            }
            RsaStep::Reduce => {
                rsa.timings.reduce.push(source.now());
                rsa.cache.montgomery_cache_misses =
                    source.read_event(HardwareEvent::MontgomeryCacheMisses);
            }
        }

        true
    }

    pub(crate) fn finish<S>(&mut self, source: &mut S)
    where
        S: CounterSource + ?Sized,
    {
        debug_assert!(!self.is_ended(), "a measurement can only end once");

        self.timing.end_time = Some(source.now());
        self.timing.end_instructions = Some(source.read_event(HardwareEvent::InstructionsRetired));

        let end_energy = source.read_energy();
        self.power.end_energy = Some(end_energy);
        self.power.trace.push(end_energy);
        self.power.voltage_fluctuation = source.read_voltage_fluctuation();
        self.power.current_draw = source.read_current_draw();

        self.sample_hardware(source);

        if let Some(rsa) = &mut self.rsa {
            rsa.memory.key_memory_accesses = source.read_event(HardwareEvent::RsaKeyMemoryAccesses);
            rsa.memory.temp_buffer_accesses =
                source.read_event(HardwareEvent::RsaTempBufferAccesses);
        }
    }

    // Overwrites the cache, branch and memory snapshot with current values.
    fn sample_hardware<S>(&mut self, source: &mut S)
    where
        S: CounterSource + ?Sized,
    {
        self.cache.l1_accesses = source.read_event(HardwareEvent::L1Accesses);
        self.cache.l1_misses = source.read_event(HardwareEvent::L1Misses);
        self.cache.l2_misses = source.read_event(HardwareEvent::L2Misses);
        self.cache.l3_misses = source.read_event(HardwareEvent::L3Misses);
        self.cache.miss_rate = ratio(self.cache.l1_misses, self.cache.l1_accesses);

        self.branch.total_branches = source.read_event(HardwareEvent::Branches);
        self.branch.mispredictions = source.read_event(HardwareEvent::BranchMispredictions);
        self.branch.mispredict_rate = ratio(self.branch.mispredictions, self.branch.total_branches);

        self.memory.tlb_misses = source.read_event(HardwareEvent::TlbMisses);
        self.memory.page_faults = source.read_event(HardwareEvent::PageFaults);
        self.memory.bandwidth = source.read_event(HardwareEvent::MemoryBandwidth);
        self.memory.access_patterns.push(self.memory.bandwidth);
    }

    /// The operation kind this measurement belongs to.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Start and end timestamps and instruction counts.
    #[must_use]
    pub fn timing(&self) -> &TimingMetrics {
        &self.timing
    }

    /// Cache counters.
    #[must_use]
    pub fn cache(&self) -> &CacheMetrics {
        &self.cache
    }

    /// Branch prediction counters.
    #[must_use]
    pub fn branch(&self) -> &BranchMetrics {
        &self.branch
    }

    /// Energy readings.
    #[must_use]
    pub fn power(&self) -> &PowerMetrics {
        &self.power
    }

    /// Memory subsystem counters.
    #[must_use]
    pub fn memory(&self) -> &MemoryMetrics {
        &self.memory
    }

    /// Key and block parameters and per-round signals.
    #[must_use]
    pub fn crypto(&self) -> &CryptoMetrics {
        &self.crypto
    }

    /// The RSA-specific payload. `None` for every non-RSA kind.
    #[must_use]
    pub fn rsa(&self) -> Option<&RsaMetrics> {
        self.rsa.as_ref()
    }

    /// Whether the measurement has ended and is therefore immutable.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.timing.end_time.is_some()
    }

    /// Nanoseconds between start and end. `None` until the measurement ends.
    #[must_use]
    pub fn execution_time(&self) -> Option<u64> {
        self.timing
            .end_time
            .map(|end| end.saturating_sub(self.timing.start_time))
    }

    /// Instructions retired between start and end. `None` until the measurement ends.
    #[must_use]
    pub fn instructions_retired(&self) -> Option<u64> {
        self.timing
            .end_instructions
            .map(|end| end.saturating_sub(self.timing.start_instructions))
    }

    /// Energy consumed between start and end. `None` until the measurement ends.
    #[must_use]
    pub fn energy_consumed(&self) -> Option<f64> {
        self.power
            .end_energy
            .map(|end| end - self.power.start_energy)
    }

    /// Durations between consecutive recorded rounds.
    #[must_use]
    pub fn round_variations(&self) -> Vec<f64> {
        first_differences(&self.crypto.round_timings)
    }

    /// Changes in energy reading between consecutive recorded rounds.
    #[must_use]
    pub fn power_variations(&self) -> Vec<f64> {
        first_differences(&self.crypto.round_power)
    }

    /// Differences between consecutive memory bandwidth samples.
    #[must_use]
    pub fn access_intervals(&self) -> Vec<f64> {
        first_differences(&self.memory.access_patterns)
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "rates tolerate rounding of counters above 2^52"
    )]
    let (part, whole) = (part as f64, whole as f64);

    part / whole
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::SimulatedCounters;
    use crate::counters::MockCounterSource;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn begin_captures_baseline() {
        let mut source = SimulatedCounters::with_fixed_tick(10);
        let measurement = Measurement::begin(OperationKind::AesEncrypt, 256, &mut source);

        assert_eq!(measurement.kind(), OperationKind::AesEncrypt);
        assert_eq!(measurement.timing().start_time, 10);
        assert_eq!(measurement.timing().start_instructions, 1);
        assert!(measurement.timing().end_time.is_none());
        assert!(!measurement.is_ended());

        assert!(close(measurement.power().start_energy, 0.11));
        assert_eq!(measurement.power().trace.len(), 1);

        assert_eq!(measurement.cache().l1_accesses, 1);
        assert_eq!(measurement.branch().total_branches, 1);
        assert_eq!(measurement.memory().access_patterns, [1]);

        assert_eq!(measurement.crypto().key_size, 256);
        assert_eq!(measurement.crypto().block_size, 16);
        assert_eq!(measurement.crypto().rounds, 0);

        assert!(measurement.rsa().is_none());
    }

    #[test]
    fn rsa_kind_takes_initial_sample() {
        let mut source = SimulatedCounters::with_fixed_tick(10);
        let measurement = Measurement::begin(OperationKind::RsaEncrypt, 2048, &mut source);

        let rsa = measurement.rsa().unwrap();
        assert_eq!(rsa.modulus_size, 2048);
        assert_eq!(rsa.timings.square, [20]);
        assert_eq!(rsa.cache.key_load_misses, 1);
        assert_eq!(rsa.cache.modulus_load_misses, 1);
        assert_eq!(rsa.memory.access_pattern, [1]);
        assert_eq!(rsa.modular_exponentiation_count, 0);
        assert!(rsa.modular_exponentiation_intervals().is_empty());
    }

    #[test]
    fn rounds_append_in_order() {
        let mut source = SimulatedCounters::with_fixed_tick(10);
        let mut measurement = Measurement::begin(OperationKind::AesDecrypt, 128, &mut source);

        measurement.record_round(0, &mut source);
        measurement.record_round(1, &mut source);
        measurement.record_round(2, &mut source);

        assert_eq!(measurement.crypto().round_timings, [20, 30, 40]);
        assert_eq!(measurement.crypto().round_power.len(), 3);
        assert_eq!(measurement.crypto().rounds, 3);
        assert_eq!(measurement.round_variations(), [10.0, 10.0]);

        let variations = measurement.power_variations();
        assert_eq!(variations.len(), 2);
        assert!(variations.iter().all(|v| close(*v, 0.01)));

        // Start reading plus one per round.
        assert_eq!(measurement.power().trace.len(), 4);
    }

    #[test]
    fn finish_stamps_end_and_resamples() {
        let mut source = SimulatedCounters::with_fixed_tick(10);
        let mut measurement = Measurement::begin(OperationKind::Sha256Hash, 0, &mut source);
        measurement.record_round(0, &mut source);
        measurement.finish(&mut source);

        assert!(measurement.is_ended());
        assert_eq!(measurement.timing().end_time, Some(30));
        assert_eq!(measurement.execution_time(), Some(20));
        assert_eq!(measurement.instructions_retired(), Some(1));

        assert_eq!(measurement.cache().l1_accesses, 2);
        assert_eq!(measurement.memory().access_patterns, [1, 2]);
        assert_eq!(measurement.access_intervals(), [1.0]);

        assert!(close(measurement.energy_consumed().unwrap(), 0.02));
        assert_eq!(measurement.power().trace.len(), 3);

        assert!(measurement.power().voltage_fluctuation.is_none());
        assert!(measurement.power().current_draw.is_none());
    }

    #[test]
    fn finish_samples_optional_power_readings() {
        let mut source = MockCounterSource::new();
        source.expect_now().return_const(0_u64);
        source.expect_read_event().return_const(0_u64);
        source.expect_read_energy().return_const(1.0_f64);
        source
            .expect_read_voltage_fluctuation()
            .times(1)
            .return_const(Some(0.05_f64));
        source
            .expect_read_current_draw()
            .times(1)
            .return_const(Some(1.2_f64));

        let mut measurement = Measurement::begin(OperationKind::AesEncrypt, 128, &mut source);

        assert!(measurement.power().voltage_fluctuation.is_none());
        assert!(measurement.power().current_draw.is_none());

        measurement.finish(&mut source);

        assert_eq!(measurement.power().voltage_fluctuation, Some(0.05));
        assert_eq!(measurement.power().current_draw, Some(1.2));
    }

    #[test]
    fn rsa_steps_fill_payload() {
        let mut source = SimulatedCounters::with_fixed_tick(5);
        let mut measurement = Measurement::begin(OperationKind::RsaDecrypt, 4096, &mut source);

        assert!(measurement.record_rsa_step(RsaStep::Square, &mut source));
        assert!(measurement.record_rsa_step(RsaStep::Multiply, &mut source));
        assert!(measurement.record_rsa_step(RsaStep::Reduce, &mut source));
        assert!(measurement.record_rsa_step(RsaStep::Square, &mut source));
        measurement.finish(&mut source);

        let rsa = measurement.rsa().unwrap();
        assert_eq!(rsa.modular_exponentiation_count, 2);
        assert_eq!(rsa.montgomery_multiplications, 1);
        assert_eq!(rsa.timings.square.len(), 3);
        assert_eq!(rsa.timings.multiply.len(), 1);
        assert_eq!(rsa.timings.reduce.len(), 1);
        assert_eq!(rsa.cache.montgomery_cache_misses, 1);
        assert_eq!(rsa.memory.access_pattern, [1, 2, 3]);
        assert_eq!(rsa.memory_access_intervals(), [1.0, 1.0]);
        assert_eq!(rsa.modular_exponentiation_intervals().len(), 2);
        assert_eq!(rsa.memory.key_memory_accesses, 1);
        assert_eq!(rsa.memory.temp_buffer_accesses, 1);
    }

    #[test]
    fn rsa_step_on_non_rsa_kind_reads_nothing() {
        let mut source = SimulatedCounters::with_fixed_tick(5);
        let mut measurement = Measurement::begin(OperationKind::EcdsaSign, 256, &mut source);

        // A mock with no expectations panics if the step touches the source.
        let mut untouched = MockCounterSource::new();

        assert!(!measurement.record_rsa_step(RsaStep::Square, &mut untouched));
        assert!(measurement.rsa().is_none());
    }

    #[test]
    fn zero_denominators_yield_zero_rates() {
        let mut source = MockCounterSource::new();
        source.expect_now().return_const(0_u64);
        source.expect_read_energy().return_const(0.0_f64);
        source.expect_read_event().return_const(0_u64);

        let measurement = Measurement::begin(OperationKind::KeyDerivation, 0, &mut source);

        assert!(close(measurement.cache().miss_rate, 0.0));
        assert!(close(measurement.branch().mispredict_rate, 0.0));
    }

    #[test]
    fn rates_divide_misses_by_accesses() {
        let mut source = MockCounterSource::new();
        source.expect_now().return_const(0_u64);
        source.expect_read_energy().return_const(0.0_f64);
        source.expect_read_event().returning(|event| match event {
            HardwareEvent::L1Accesses => 200,
            HardwareEvent::L1Misses => 50,
            HardwareEvent::Branches => 1000,
            HardwareEvent::BranchMispredictions => 10,
            _ => 0,
        });

        let measurement = Measurement::begin(OperationKind::EcdsaVerify, 256, &mut source);

        assert!(close(measurement.cache().miss_rate, 0.25));
        assert!(close(measurement.branch().mispredict_rate, 0.01));
    }
}
