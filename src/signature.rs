// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

//! Schnorr signatures, as produced by aggregation.

use k256::{ProjectivePoint, Scalar};

use crate::error::Error;
use crate::group;
use crate::hash;
use crate::keys::VerifyingKey;

/// A Schnorr signature (R, z) over secp256k1.
///
/// Aggregated threshold signatures are indistinguishable from single-signer
/// ones and verify with the plain relation g^z = R + e·Y.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Signature {
    pub(crate) r: ProjectivePoint,
    pub(crate) z: Scalar,
}

impl Signature {
    /// The group commitment R.
    pub fn r(&self) -> &ProjectivePoint {
        &self.r
    }

    /// The response scalar z.
    pub fn z(&self) -> &Scalar {
        &self.z
    }

    /// Serialize as 65 bytes: the compressed R followed by the big-endian z.
    pub fn serialize(&self) -> Result<[u8; 65], Error> {
        let mut bytes = [0u8; 65];
        bytes[..group::ELEMENT_SIZE].copy_from_slice(&group::serialize_element(&self.r)?);
        bytes[group::ELEMENT_SIZE..].copy_from_slice(&group::serialize_scalar(&self.z));
        Ok(bytes)
    }

    /// Deserialize from the 65-byte encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != group::ELEMENT_SIZE + group::SCALAR_SIZE {
            return Err(Error::MalformedElement);
        }
        Ok(Self {
            r: group::deserialize_element(&bytes[..group::ELEMENT_SIZE])?,
            z: group::deserialize_scalar(&bytes[group::ELEMENT_SIZE..])?,
        })
    }
}

/// The Schnorr challenge e = H2(enc(R) ‖ enc(Y) ‖ message).
pub(crate) fn challenge(
    r: &ProjectivePoint,
    verifying_key: &VerifyingKey,
    message: &[u8],
) -> Result<Scalar, Error> {
    let mut preimage = Vec::with_capacity(2 * group::ELEMENT_SIZE + message.len());
    preimage.extend_from_slice(&group::serialize_element(r)?);
    preimage.extend_from_slice(&group::serialize_element(&verifying_key.element)?);
    preimage.extend_from_slice(message);
    Ok(hash::h2(&preimage))
}

#[cfg(test)]
mod tests {
    use super::*;

    use k256::elliptic_curve::Field;
    use rand::thread_rng;

    #[test]
    fn serialization_round_trip() {
        let mut rng = thread_rng();
        let signature = Signature {
            r: ProjectivePoint::GENERATOR * Scalar::random(&mut rng),
            z: Scalar::random(&mut rng),
        };
        let bytes = signature.serialize().unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(Signature::deserialize(&bytes).unwrap(), signature);
    }

    #[test]
    fn truncated_encoding_rejected() {
        assert!(Signature::deserialize(&[0u8; 64]).is_err());
    }
}
