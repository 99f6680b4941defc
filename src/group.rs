//! Thin helpers over the `k256` arithmetic backend: canonical encodings,
//! scalar sampling and reduction, and variable-time multi-scalar
//! multiplication.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::{Field, Group, PrimeField};
use k256::{EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use rand_core::{CryptoRng, RngCore};

use crate::error::Error;

/// Length in bytes of a canonical scalar encoding (big-endian).
pub(crate) const SCALAR_SIZE: usize = 32;

/// Length in bytes of a SEC1 compressed point encoding.
pub(crate) const ELEMENT_SIZE: usize = 33;

/// Reduce 32 big-endian bytes into a scalar mod n. Zero is a valid result.
pub(crate) fn reduce_scalar(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(*bytes))
}

/// Serialize a scalar as 32 big-endian bytes.
pub(crate) fn serialize_scalar(scalar: &Scalar) -> [u8; 32] {
    scalar.to_bytes().into()
}

/// Parse a canonical 32-byte big-endian scalar encoding. Values at or above
/// the group order are rejected rather than reduced.
pub(crate) fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    let bytes: [u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| Error::MalformedScalar)?;
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(bytes)))
        .ok_or(Error::MalformedScalar)
}

/// Serialize a group element in SEC1 compressed form. The identity has no
/// compressed encoding and is rejected.
pub(crate) fn serialize_element(element: &ProjectivePoint) -> Result<[u8; ELEMENT_SIZE], Error> {
    if bool::from(element.is_identity()) {
        return Err(Error::MalformedElement);
    }
    let encoded = element.to_affine().to_encoded_point(true);
    let mut bytes = [0u8; ELEMENT_SIZE];
    bytes.copy_from_slice(encoded.as_bytes());
    Ok(bytes)
}

/// Compressed encoding used inside DKG transcript hashing. A refresh round
/// commits to a zero constant term, so this encoding must admit the identity
/// element; it maps to an even-parity prefix over a zero X coordinate.
pub(crate) fn transcript_element_bytes(element: &ProjectivePoint) -> [u8; ELEMENT_SIZE] {
    let mut bytes = [0u8; ELEMENT_SIZE];
    bytes[0] = 0x02;
    if !bool::from(element.is_identity()) {
        bytes.copy_from_slice(element.to_affine().to_encoded_point(true).as_bytes());
    }
    bytes
}

/// Parse a SEC1 compressed point. The identity is rejected.
pub(crate) fn deserialize_element(bytes: &[u8]) -> Result<ProjectivePoint, Error> {
    if bytes.len() != ELEMENT_SIZE {
        return Err(Error::MalformedElement);
    }
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::MalformedElement)?;
    let element = Option::<ProjectivePoint>::from(ProjectivePoint::from_encoded_point(&encoded))
        .ok_or(Error::MalformedElement)?;
    if bool::from(element.is_identity()) {
        return Err(Error::MalformedElement);
    }
    Ok(element)
}

/// Sample a uniformly random non-zero scalar: 32 bytes per draw, resampling
/// on the (cosmically unlikely) zero.
pub(crate) fn random_nonzero_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    loop {
        let mut bytes = [0u8; SCALAR_SIZE];
        rng.fill_bytes(&mut bytes);
        let candidate = reduce_scalar(&bytes);
        if !bool::from(candidate.is_zero()) {
            return candidate;
        }
    }
}

/// Variable-time multi-scalar multiplication: Σ kᵢ·Pᵢ.
///
/// Inputs here are public (binding factors and commitments), so a
/// non-constant-time accumulation is acceptable.
pub(crate) fn vartime_multiscalar_mul(
    scalars: &[Scalar],
    elements: &[ProjectivePoint],
) -> ProjectivePoint {
    debug_assert_eq!(scalars.len(), elements.len());
    scalars
        .iter()
        .zip(elements.iter())
        .fold(ProjectivePoint::IDENTITY, |acc, (k, p)| acc + *p * *k)
}
