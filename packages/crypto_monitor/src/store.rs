use std::fmt;

use foldhash::{HashMap, HashMapExt};

use crate::{Error, Measurement, OperationKind, Result};

/// Identifies one measurement: its operation kind and its position among measurements of
/// that kind, in start order.
///
/// Returned by [`Monitor::start()`](crate::Monitor::start).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MeasurementId {
    kind: OperationKind,
    index: usize,
}

impl MeasurementId {
    /// The operation kind of the measurement.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Position of the measurement among all measurements of its kind, starting from 0.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for MeasurementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

/// Append-only, per-kind ordered storage of measurements.
///
/// Only the most recently appended measurement of a kind may be modified, and only until
/// it ends. Nothing is ever removed.
#[derive(Debug)]
pub(crate) struct MeasurementStore {
    by_kind: HashMap<OperationKind, Vec<Measurement>>,
}

impl MeasurementStore {
    pub(crate) fn new() -> Self {
        Self {
            by_kind: HashMap::new(),
        }
    }

    pub(crate) fn append(&mut self, measurement: Measurement) -> MeasurementId {
        let kind = measurement.kind();
        let measurements = self.by_kind.entry(kind).or_default();

        let index = measurements.len();
        measurements.push(measurement);

        MeasurementId { kind, index }
    }

    /// All measurements of `kind` in start order. Empty if the kind was never used.
    pub(crate) fn measurements(&self, kind: OperationKind) -> &[Measurement] {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn get(&self, id: MeasurementId) -> Option<&Measurement> {
        self.measurements(id.kind).get(id.index)
    }

    /// The latest measurement of `kind`, if there is one and it has not ended yet.
    pub(crate) fn latest_open_mut(&mut self, kind: OperationKind) -> Option<&mut Measurement> {
        self.by_kind
            .get_mut(&kind)?
            .last_mut()
            .filter(|measurement| !measurement.is_ended())
    }

    /// The measurement addressed by `id`, provided it may still be modified.
    pub(crate) fn open_mut(&mut self, id: MeasurementId) -> Result<&mut Measurement> {
        let MeasurementId { kind, index } = id;

        let measurement_count = self.measurements(kind).len();

        if index >= measurement_count {
            return Err(Error::UnknownMeasurement { kind, index });
        }

        if index.saturating_add(1) != measurement_count {
            return Err(Error::MeasurementSuperseded { kind, index });
        }

        let measurement = self
            .by_kind
            .get_mut(&kind)
            .and_then(|measurements| measurements.last_mut())
            .ok_or(Error::UnknownMeasurement { kind, index })?;

        if measurement.is_ended() {
            return Err(Error::MeasurementEnded { kind, index });
        }

        Ok(measurement)
    }

    /// Operation kinds that have at least one measurement, in declaration order.
    pub(crate) fn used_kinds(&self) -> impl Iterator<Item = OperationKind> + '_ {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| !self.measurements(*kind).is_empty())
    }

    pub(crate) fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::SimulatedCounters;

    fn begin(kind: OperationKind, source: &mut SimulatedCounters) -> Measurement {
        Measurement::begin(kind, 128, source)
    }

    #[test]
    fn append_assigns_indexes_per_kind() {
        let mut source = SimulatedCounters::with_fixed_tick(1);
        let mut store = MeasurementStore::new();

        let a0 = store.append(begin(OperationKind::AesEncrypt, &mut source));
        let s0 = store.append(begin(OperationKind::Sha256Hash, &mut source));
        let a1 = store.append(begin(OperationKind::AesEncrypt, &mut source));

        assert_eq!((a0.kind(), a0.index()), (OperationKind::AesEncrypt, 0));
        assert_eq!((s0.kind(), s0.index()), (OperationKind::Sha256Hash, 0));
        assert_eq!((a1.kind(), a1.index()), (OperationKind::AesEncrypt, 1));

        assert_eq!(store.measurements(OperationKind::AesEncrypt).len(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn unused_kind_has_no_measurements() {
        let store = MeasurementStore::new();

        assert!(store.measurements(OperationKind::RsaEncrypt).is_empty());
        assert_eq!(store.used_kinds().count(), 0);
    }

    #[test]
    fn latest_open_is_none_after_end() {
        let mut source = SimulatedCounters::with_fixed_tick(1);
        let mut store = MeasurementStore::new();
        store.append(begin(OperationKind::EcdsaSign, &mut source));

        store
            .latest_open_mut(OperationKind::EcdsaSign)
            .unwrap()
            .finish(&mut source);

        assert!(store.latest_open_mut(OperationKind::EcdsaSign).is_none());
        assert!(store.latest_open_mut(OperationKind::EcdsaVerify).is_none());
    }

    #[test]
    fn open_mut_rejects_stale_handles() {
        let mut source = SimulatedCounters::with_fixed_tick(1);
        let mut store = MeasurementStore::new();

        let first = store.append(begin(OperationKind::KeyDerivation, &mut source));
        let second = store.append(begin(OperationKind::KeyDerivation, &mut source));

        assert!(matches!(
            store.open_mut(first),
            Err(Error::MeasurementSuperseded { index: 0, .. })
        ));

        store.open_mut(second).unwrap().finish(&mut source);

        assert!(matches!(
            store.open_mut(second),
            Err(Error::MeasurementEnded { index: 1, .. })
        ));

        let missing = MeasurementId {
            kind: OperationKind::KeyDerivation,
            index: 5,
        };
        assert!(matches!(
            store.open_mut(missing),
            Err(Error::UnknownMeasurement { index: 5, .. })
        ));
    }

    #[test]
    fn used_kinds_follow_declaration_order() {
        let mut source = SimulatedCounters::with_fixed_tick(1);
        let mut store = MeasurementStore::new();
        store.append(begin(OperationKind::KeyDerivation, &mut source));
        store.append(begin(OperationKind::AesDecrypt, &mut source));

        let kinds: Vec<_> = store.used_kinds().collect();

        assert_eq!(
            kinds,
            [OperationKind::AesDecrypt, OperationKind::KeyDerivation]
        );
    }

    #[test]
    fn handle_display() {
        let id = MeasurementId {
            kind: OperationKind::RsaEncrypt,
            index: 2,
        };

        assert_eq!(id.to_string(), "RSA_ENCRYPT#2");
    }
}
