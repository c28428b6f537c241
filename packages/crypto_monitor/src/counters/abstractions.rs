use std::fmt::Debug;

/// A hardware event whose occurrences a [`CounterSource`] can count.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum HardwareEvent {
    /// Retired instructions.
    InstructionsRetired,
    /// L1 data cache accesses.
    L1Accesses,
    /// L1 data cache misses.
    L1Misses,
    /// L2 cache misses.
    L2Misses,
    /// Last-level cache misses.
    L3Misses,
    /// Retired branch instructions.
    Branches,
    /// Mispredicted branches.
    BranchMispredictions,
    /// Translation lookaside buffer misses.
    TlbMisses,
    /// Page faults.
    PageFaults,
    /// Memory bandwidth counter.
    MemoryBandwidth,
    /// Cache misses while loading RSA key material.
    RsaKeyLoadMisses,
    /// Cache misses while loading the RSA modulus.
    RsaModulusLoadMisses,
    /// Memory accesses sampled during RSA modular arithmetic.
    RsaMemoryAccesses,
    /// Cache misses during Montgomery reduction.
    MontgomeryCacheMisses,
    /// Accesses to memory holding RSA key material.
    RsaKeyMemoryAccesses,
    /// Accesses to temporary bignum buffers.
    RsaTempBufferAccesses,
}

impl HardwareEvent {
    /// Number of distinct hardware events.
    pub const COUNT: usize = 16;

    /// Dense index of the event in `0..COUNT`, suitable for array-backed counter banks.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Supplies the raw signals the monitor samples at each lifecycle transition.
///
/// Implementations must return non-decreasing values from [`now()`](Self::now) and,
/// per event, from [`read_event()`](Self::read_event) for the lifetime of the source.
/// Energy readings carry no ordering requirement.
///
/// Voltage and current readings are optional. Sources without the necessary sensors keep the
/// default implementations, which report nothing.
#[cfg_attr(test, mockall::automock)]
pub trait CounterSource: Debug + Send + Sync + 'static {
    /// Current monotonic instant, in nanoseconds from an arbitrary origin.
    fn now(&mut self) -> u64;

    /// Current value of the counter for `event`.
    fn read_event(&mut self, event: HardwareEvent) -> u64;

    /// Current energy or power reading, in source-defined units.
    fn read_energy(&mut self) -> f64;

    /// Supply voltage fluctuation observed so far, in source-defined units.
    fn read_voltage_fluctuation(&mut self) -> Option<f64> {
        None
    }

    /// Current draw observed so far, in source-defined units.
    fn read_current_draw(&mut self) -> Option<f64> {
        None
    }
}

impl<S> CounterSource for Box<S>
where
    S: CounterSource + ?Sized,
{
    fn now(&mut self) -> u64 {
        (**self).now()
    }

    fn read_event(&mut self, event: HardwareEvent) -> u64 {
        (**self).read_event(event)
    }

    fn read_energy(&mut self) -> f64 {
        (**self).read_energy()
    }

    fn read_voltage_fluctuation(&mut self) -> Option<f64> {
        (**self).read_voltage_fluctuation()
    }

    fn read_current_draw(&mut self) -> Option<f64> {
        (**self).read_current_draw()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn event_indexes_are_dense() {
        assert_eq!(HardwareEvent::InstructionsRetired.index(), 0);
        assert_eq!(
            HardwareEvent::RsaTempBufferAccesses.index(),
            HardwareEvent::COUNT - 1
        );
    }

    #[test]
    fn boxed_source_delegates() {
        let mut mock = MockCounterSource::new();
        mock.expect_now().return_const(42_u64);
        mock.expect_read_event()
            .withf(|event| *event == HardwareEvent::PageFaults)
            .return_const(7_u64);
        mock.expect_read_energy().return_const(1.5_f64);
        mock.expect_read_voltage_fluctuation()
            .return_const(Some(0.25_f64));
        mock.expect_read_current_draw().return_const(None::<f64>);

        let mut boxed: Box<dyn CounterSource> = Box::new(mock);

        assert_eq!(boxed.now(), 42);
        assert_eq!(boxed.read_event(HardwareEvent::PageFaults), 7);
        assert!((boxed.read_energy() - 1.5).abs() < f64::EPSILON);
        assert_eq!(boxed.read_voltage_fluctuation(), Some(0.25));
        assert_eq!(boxed.read_current_draw(), None);
    }

    #[derive(Debug)]
    struct EnergyOnly;

    impl CounterSource for EnergyOnly {
        fn now(&mut self) -> u64 {
            0
        }

        fn read_event(&mut self, _event: HardwareEvent) -> u64 {
            0
        }

        fn read_energy(&mut self) -> f64 {
            1.0
        }
    }

    #[test]
    fn optional_readings_default_to_none() {
        let mut source = EnergyOnly;

        assert_eq!(source.read_voltage_fluctuation(), None);
        assert_eq!(source.read_current_draw(), None);
    }

    static_assertions::assert_impl_all!(Box<dyn CounterSource>: Send, Sync);
}
