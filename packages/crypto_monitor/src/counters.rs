//! Sources of timestamps, hardware event counts and energy readings.
//!
//! The monitor only ever talks to a [`CounterSource`]. By default it uses
//! [`SimulatedCounters`], a deterministic stub whose event counters advance by one per read.
//! Production backends (real performance counters, real power sensors) implement the same
//! trait and are plugged in via
//! [`MonitorBuilder::counter_source()`][crate::MonitorBuilder::counter_source].

mod abstractions;
mod facade;
mod simulated;

pub use abstractions::{CounterSource, HardwareEvent};
pub(crate) use facade::CounterSourceFacade;
pub use simulated::SimulatedCounters;

#[cfg(test)]
pub(crate) use abstractions::MockCounterSource;
