use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The closed set of cryptographic primitive categories the monitor recognizes.
///
/// Every measurement belongs to exactly one kind and the monitor keeps an independent,
/// insertion-ordered sequence of measurements per kind.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(
    clippy::exhaustive_enums,
    reason = "the set of measured primitives is fixed and callers match on it"
)]
pub enum OperationKind {
    /// `AES_ENCRYPT`
    AesEncrypt,
    /// `AES_DECRYPT`
    AesDecrypt,
    /// `RSA_ENCRYPT`
    RsaEncrypt,
    /// `RSA_DECRYPT`
    RsaDecrypt,
    /// `ECDSA_SIGN`
    EcdsaSign,
    /// `ECDSA_VERIFY`
    EcdsaVerify,
    /// `SHA256_HASH`
    Sha256Hash,
    /// `KEY_DERIVATION`
    KeyDerivation,
}

impl OperationKind {
    /// All operation kinds, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::AesEncrypt,
        Self::AesDecrypt,
        Self::RsaEncrypt,
        Self::RsaDecrypt,
        Self::EcdsaSign,
        Self::EcdsaVerify,
        Self::Sha256Hash,
        Self::KeyDerivation,
    ];

    /// The canonical name of the operation kind, as accepted by [`FromStr`].
    ///
    /// # Example
    ///
    /// ```
    /// use crypto_monitor::OperationKind;
    ///
    /// assert_eq!(OperationKind::Sha256Hash.as_str(), "SHA256_HASH");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AesEncrypt => "AES_ENCRYPT",
            Self::AesDecrypt => "AES_DECRYPT",
            Self::RsaEncrypt => "RSA_ENCRYPT",
            Self::RsaDecrypt => "RSA_DECRYPT",
            Self::EcdsaSign => "ECDSA_SIGN",
            Self::EcdsaVerify => "ECDSA_VERIFY",
            Self::Sha256Hash => "SHA256_HASH",
            Self::KeyDerivation => "KEY_DERIVATION",
        }
    }

    /// Whether measurements of this kind carry an RSA-specific payload.
    #[must_use]
    pub const fn is_rsa(self) -> bool {
        matches!(self, Self::RsaEncrypt | Self::RsaDecrypt)
    }

    /// Nominal block size of the primitive in bytes, or 0 if the primitive is not block-based.
    #[must_use]
    pub const fn block_size(self) -> u64 {
        match self {
            Self::AesEncrypt | Self::AesDecrypt => 16,
            Self::Sha256Hash => 64,
            Self::RsaEncrypt
            | Self::RsaDecrypt
            | Self::EcdsaSign
            | Self::EcdsaVerify
            | Self::KeyDerivation => 0,
        }
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    /// Parses an operation name. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownOperation { name: s.to_owned() })
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_every_canonical_name() {
        for kind in OperationKind::ALL {
            assert_eq!(kind.as_str().parse::<OperationKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        for name in ["aes_encrypt", "AES_ENCRYPT ", ""] {
            assert!(matches!(
                name.parse::<OperationKind>(),
                Err(Error::UnknownOperation { .. })
            ));
        }
    }

    #[test]
    fn unknown_name_is_reported_verbatim() {
        let error = "FOO".parse::<OperationKind>().unwrap_err();

        assert!(matches!(error, Error::UnknownOperation { name } if name == "FOO"));
    }

    #[test]
    fn only_rsa_kinds_are_rsa() {
        let rsa: Vec<_> = OperationKind::ALL
            .into_iter()
            .filter(|kind| kind.is_rsa())
            .collect();

        assert_eq!(rsa, [OperationKind::RsaEncrypt, OperationKind::RsaDecrypt]);
    }

    #[test]
    fn block_sizes() {
        assert_eq!(OperationKind::AesDecrypt.block_size(), 16);
        assert_eq!(OperationKind::Sha256Hash.block_size(), 64);
        assert_eq!(OperationKind::EcdsaSign.block_size(), 0);
    }

    #[test]
    fn display_matches_canonical_name() {
        assert_eq!(OperationKind::KeyDerivation.to_string(), "KEY_DERIVATION");
    }
}
