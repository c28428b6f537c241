use std::time::Instant;

use crate::counters::{CounterSource, HardwareEvent};

const INITIAL_ENERGY: f64 = 0.1;
const ENERGY_STEP: f64 = 0.01;

/// Deterministic stand-in for hardware performance counters and power sensors.
///
/// Every read of a hardware event advances that event's own counter by one and returns the
/// new value, so the first read of any event yields 1. Every energy reading adds 0.01 to a
/// level that starts at 0.1, so the first reading yields 0.11.
///
/// Timestamps come from the real monotonic clock by default. Use
/// [`with_fixed_tick()`](Self::with_fixed_tick) for a fully reproducible timeline.
///
/// # Example
///
/// ```
/// use crypto_monitor::{CounterSource, HardwareEvent, SimulatedCounters};
///
/// let mut counters = SimulatedCounters::with_fixed_tick(100);
///
/// assert_eq!(counters.now(), 100);
/// assert_eq!(counters.now(), 200);
/// assert_eq!(counters.read_event(HardwareEvent::Branches), 1);
/// ```
#[derive(Debug)]
pub struct SimulatedCounters {
    clock: Clock,
    counters: [u64; HardwareEvent::COUNT],
    energy: f64,
}

#[derive(Debug)]
enum Clock {
    Monotonic(Instant),

    // Advances by `tick` nanoseconds before every reading.
    FixedTick { now: u64, tick: u64 },
}

impl SimulatedCounters {
    /// Creates simulated counters whose timestamps follow the real monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Clock::Monotonic(Instant::now()))
    }

    /// Creates simulated counters whose clock advances by exactly `tick_nanos` per reading.
    #[must_use]
    pub fn with_fixed_tick(tick_nanos: u64) -> Self {
        Self::with_clock(Clock::FixedTick {
            now: 0,
            tick: tick_nanos,
        })
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            counters: [0; HardwareEvent::COUNT],
            energy: INITIAL_ENERGY,
        }
    }
}

impl Default for SimulatedCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SimulatedCounters {
    fn now(&mut self) -> u64 {
        match &mut self.clock {
            Clock::Monotonic(origin) => {
                // 584 years of uptime are required to overflow.
                u64::try_from(origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
            }
            Clock::FixedTick { now, tick } => {
                *now = now.saturating_add(*tick);
                *now
            }
        }
    }

    fn read_event(&mut self, event: HardwareEvent) -> u64 {
        #[expect(
            clippy::indexing_slicing,
            reason = "index() is always below HardwareEvent::COUNT"
        )]
        let counter = &mut self.counters[event.index()];

        *counter = counter.saturating_add(1);
        *counter
    }

    fn read_energy(&mut self) -> f64 {
        self.energy += ENERGY_STEP;
        self.energy
    }
}
