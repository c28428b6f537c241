use thiserror::Error;

use crate::OperationKind;

/// Errors that can occur when addressing operations or measurements.
///
/// The kind-addressed lifecycle calls never fail. Errors only arise when resolving an
/// operation name or when an explicit [`MeasurementId`](crate::MeasurementId) is used.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller named an operation that is not one of the recognized operation kinds.
    #[error("unknown cryptographic operation '{name}'")]
    UnknownOperation {
        /// The operation name exactly as supplied by the caller.
        name: String,
    },

    /// The handle does not refer to any stored measurement.
    #[error("no measurement {kind}#{index} exists")]
    UnknownMeasurement {
        /// Operation kind encoded in the handle.
        kind: OperationKind,

        /// Position encoded in the handle.
        index: usize,
    },

    /// The measurement has already ended and can no longer be modified.
    #[error("measurement {kind}#{index} has already ended")]
    MeasurementEnded {
        /// Operation kind of the measurement.
        kind: OperationKind,

        /// Position of the measurement within its kind.
        index: usize,
    },

    /// A newer measurement of the same kind was started, so this one is frozen.
    #[error("measurement {kind}#{index} was superseded by a newer measurement of the same kind")]
    MeasurementSuperseded {
        /// Operation kind of the measurement.
        kind: OperationKind,

        /// Position of the measurement within its kind.
        index: usize,
    },
}

/// A specialized `Result` type for monitor operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn unknown_operation_names_the_input() {
        let error = Error::UnknownOperation {
            name: "AES_ENCRYPTT".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "unknown cryptographic operation 'AES_ENCRYPTT'"
        );
    }

    #[test]
    fn measurement_errors_name_the_handle() {
        let error = Error::MeasurementEnded {
            kind: OperationKind::RsaDecrypt,
            index: 3,
        };

        assert_eq!(
            error.to_string(),
            "measurement RSA_DECRYPT#3 has already ended"
        );
    }
}
