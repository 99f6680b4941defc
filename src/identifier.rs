// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

//! Participant identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use k256::elliptic_curve::Field;
use k256::Scalar;

use crate::error::Error;
use crate::{group, hash};

/// A participant identifier: a non-zero element of the scalar field.
///
/// The identifier is the x-coordinate at which the secret polynomial is
/// evaluated for that participant, which is why zero is forbidden: f(0) is
/// the group secret itself.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Identifier(Scalar);

impl Identifier {
    /// Create an identifier from a scalar, rejecting zero.
    pub fn new(scalar: Scalar) -> Result<Self, Error> {
        if bool::from(scalar.is_zero()) {
            return Err(Error::InvalidZeroScalar);
        }
        Ok(Self(scalar))
    }

    /// Derive an identifier from an arbitrary byte string, e.g. an account
    /// name or a transport-level public key. Hashes with the `id` domain and
    /// reduces mod n; rejects the zero outcome.
    pub fn derive(bytes: &[u8]) -> Result<Self, Error> {
        Self::new(hash::hid(bytes))
    }

    /// The scalar value of this identifier.
    pub fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// Serialize as the canonical 32-byte big-endian scalar encoding.
    pub fn serialize(&self) -> [u8; 32] {
        group::serialize_scalar(&self.0)
    }

    /// Deserialize from a canonical 32-byte big-endian scalar encoding,
    /// rejecting zero.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::new(group::deserialize_scalar(bytes)?)
    }
}

impl TryFrom<u16> for Identifier {
    type Error = Error;

    /// Compute the scalar for a small integer identifier by left-to-right
    /// double-and-add starting from the most significant set bit: exactly
    /// `bitlen(n) - 1` doublings, adding one for every set bit below the MSB.
    fn try_from(n: u16) -> Result<Self, Self::Error> {
        if n == 0 {
            return Err(Error::InvalidZeroScalar);
        }
        let one = Scalar::ONE;
        let mut sum = one;
        let bits = u16::BITS - n.leading_zeros();
        for i in (0..bits - 1).rev() {
            sum += sum;
            if (n >> i) & 1 == 1 {
                sum += one;
            }
        }
        Ok(Self(sum))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier")
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}

// The derived PartialEq is consistent with this ordering: both follow the
// canonical big-endian encoding.
impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialize().cmp(&other.serialize())
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u16_matches_scalar() {
        for n in [1u16, 2, 3, 7, 255, 256, 12345, u16::MAX] {
            let id = Identifier::try_from(n).unwrap();
            assert_eq!(id.to_scalar(), Scalar::from(n as u64));
        }
    }

    #[test]
    fn zero_rejected() {
        assert_eq!(Identifier::try_from(0u16), Err(Error::InvalidZeroScalar));
        assert_eq!(
            Identifier::new(Scalar::ZERO),
            Err(Error::InvalidZeroScalar)
        );
        assert_eq!(
            Identifier::deserialize(&[0u8; 32]),
            Err(Error::InvalidZeroScalar)
        );
    }

    #[test]
    fn ordering_is_numeric_for_small_values() {
        let a = Identifier::try_from(3u16).unwrap();
        let b = Identifier::try_from(300u16).unwrap();
        assert!(a < b);
    }

    #[test]
    fn derive_is_stable_and_nonzero() {
        let a = Identifier::derive(b"alice").unwrap();
        let b = Identifier::derive(b"alice").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Identifier::derive(b"bob").unwrap());
    }
}
