//! Side-channel oriented measurement of cryptographic operations.
//!
//! This package records hardware-level execution signals around invocations of opaque
//! cryptographic primitives (cycle counts, retired instructions, cache and branch behavior,
//! energy draw and memory access patterns) and turns them into derived series and summary
//! statistics that support timing, cache and power side-channel research.
//!
//! The package never performs cryptography itself. The caller brackets its own operation
//! with lifecycle calls and the monitor timestamps around it.
//!
//! The core functionality includes:
//! - [`Monitor`] - Owns all measurements and drives the start/round/end lifecycle
//! - [`MonitorBuilder`] - Configures the counter source and the unknown-name policy
//! - [`Measurement`] - One recorded invocation of a cryptographic operation
//! - [`CounterSource`] - Pluggable source of timestamps, hardware events and energy readings
//! - [`TimingReport`], [`CacheReport`], [`RsaReport`], [`ResearchReport`] - Derived summaries
//! - [`Statistics`] - Mean, population standard deviation, min and max of a series
//!
//! # Simple usage
//!
//! ```
//! use crypto_monitor::{Monitor, OperationKind};
//!
//! let mut monitor = Monitor::new();
//!
//! monitor.start(OperationKind::AesEncrypt, 128);
//! for round in 0..10 {
//!     // Perform one cipher round here.
//!     monitor.record_round(OperationKind::AesEncrypt, round);
//! }
//! monitor.end(OperationKind::AesEncrypt);
//!
//! let report = monitor.timing_report(OperationKind::AesEncrypt);
//! assert_eq!(report.execution_times().len(), 1);
//! assert_eq!(report.round_variations().len(), 9);
//! ```
//!
//! # Addressing operations by name
//!
//! Hosts that only speak strings can use the name-addressed surface. Names must match one of
//! the [`OperationKind`] names exactly. By default an unrecognized name is an error; the
//! legacy behavior of silently attributing it to `AES_ENCRYPT` can be enabled via
//! [`UnknownOperationPolicy::FallbackToAesEncrypt`].
//!
//! ```
//! use crypto_monitor::Monitor;
//!
//! # fn main() -> Result<(), crypto_monitor::Error> {
//! let mut monitor = Monitor::new();
//!
//! monitor.start_crypto_operation("RSA_ENCRYPT", 2048)?;
//! monitor.end_crypto_operation("RSA_ENCRYPT")?;
//!
//! let research = monitor.get_research_metrics("RSA_ENCRYPT")?;
//! assert!(research.rsa().is_some());
//!
//! assert!(matches!(
//!     monitor.start_crypto_operation("RSA_ENCRYPTT", 2048),
//!     Err(crypto_monitor::Error::UnknownOperation { .. })
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! # Explicit handles
//!
//! [`Monitor::start()`] returns a [`MeasurementId`]. Round and end calls made through the
//! handle fail loudly if the measurement has already ended or was superseded by a newer
//! measurement of the same kind, whereas the kind-addressed calls silently do nothing.
//!
//! # Threading
//!
//! The monitor is single-threaded and synchronous. It is `Send` and `Sync`, so a
//! multi-threaded host can place one instance behind a single `RwLock`, taking the write lock
//! around lifecycle calls and the read lock around analysis queries.
//!
//! This package is not meant for use in production, serving only as a research tool.

mod cache_report;
mod counters;
mod error;
mod measurement;
mod monitor;
mod monitor_builder;
mod operation_kind;
mod research_report;
mod rsa_report;
mod series;
mod statistics;
mod store;
mod timing_report;

pub use cache_report::CacheReport;
pub use counters::{CounterSource, HardwareEvent, SimulatedCounters};
pub use error::Error;
pub(crate) use error::Result;
pub use measurement::{
    BranchMetrics, CacheMetrics, CryptoMetrics, Measurement, MemoryMetrics, PowerMetrics,
    RsaCacheMetrics, RsaMemoryMetrics, RsaMetrics, RsaStep, RsaTimings, TimingMetrics,
};
pub use monitor::Monitor;
pub use monitor_builder::{MonitorBuilder, UnknownOperationPolicy};
pub use operation_kind::OperationKind;
pub use research_report::ResearchReport;
pub use rsa_report::RsaReport;
pub use series::{SeriesValue, first_differences};
pub use statistics::Statistics;
pub use store::MeasurementId;
pub(crate) use store::MeasurementStore;
pub use timing_report::TimingReport;
