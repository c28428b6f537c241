use std::fmt::{self, Debug};

use crate::counters::{CounterSource, HardwareEvent, SimulatedCounters};

/// The counter source a monitor actually holds.
///
/// The built-in simulated source is held inline; anything supplied by the caller is boxed.
pub(crate) enum CounterSourceFacade {
    Simulated(SimulatedCounters),
    Custom(Box<dyn CounterSource>),
}

impl CounterSourceFacade {
    pub(crate) fn simulated() -> Self {
        Self::Simulated(SimulatedCounters::new())
    }

    pub(crate) fn custom(source: impl CounterSource) -> Self {
        Self::Custom(Box::new(source))
    }
}

impl CounterSource for CounterSourceFacade {
    fn now(&mut self) -> u64 {
        match self {
            Self::Simulated(s) => s.now(),
            Self::Custom(s) => s.now(),
        }
    }

    fn read_event(&mut self, event: HardwareEvent) -> u64 {
        match self {
            Self::Simulated(s) => s.read_event(event),
            Self::Custom(s) => s.read_event(event),
        }
    }

    fn read_energy(&mut self) -> f64 {
        match self {
            Self::Simulated(s) => s.read_energy(),
            Self::Custom(s) => s.read_energy(),
        }
    }

    fn read_voltage_fluctuation(&mut self) -> Option<f64> {
        match self {
            Self::Simulated(s) => s.read_voltage_fluctuation(),
            Self::Custom(s) => s.read_voltage_fluctuation(),
        }
    }

    fn read_current_draw(&mut self) -> Option<f64> {
        match self {
            Self::Simulated(s) => s.read_current_draw(),
            Self::Custom(s) => s.read_current_draw(),
        }
    }
}

impl Debug for CounterSourceFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated(s) => s.fmt(f),
            Self::Custom(s) => s.fmt(f),
        }
    }
}
