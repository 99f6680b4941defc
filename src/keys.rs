// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

//! Key material: the group signing key, per-participant shares, and the
//! dealer-based generation path.
//!
//! Dealer generation exists for tests, tooling and migrations; production
//! deployments should prefer the dealerless protocol in [`crate::dkg`],
//! which never materializes the group secret anywhere.

use std::collections::BTreeMap;

use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::commitment::VerifiableSecretSharingCommitment;
use crate::error::Error;
use crate::identifier::Identifier;
use crate::polynomial::{evaluate_polynomial, generate_coefficients, lagrange_coeff_at_zero};
use crate::group;
use crate::signature::{challenge, Signature};
use std::fmt;

/// The group signing key: the joint secret `s` behind the group verifying
/// key.
///
/// This value only ever exists inside a dealer or the diagnostic
/// [`reconstruct`] path; the interactive DKG never materializes it.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    scalar: Scalar,
}

impl SigningKey {
    /// Generate a fresh random signing key.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            scalar: group::random_nonzero_scalar(rng),
        }
    }

    /// Create a signing key from a scalar, rejecting zero.
    pub fn from_scalar(scalar: Scalar) -> Result<Self, Error> {
        if bool::from(scalar.is_zero()) {
            return Err(Error::InvalidZeroScalar);
        }
        Ok(Self { scalar })
    }

    /// The scalar value of this key.
    pub fn to_scalar(&self) -> Scalar {
        self.scalar
    }

    /// The verifying key g^s for this signing key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey {
            element: ProjectivePoint::GENERATOR * self.scalar,
        }
    }

    /// Serialize as 32 big-endian bytes.
    pub fn serialize(&self) -> [u8; 32] {
        group::serialize_scalar(&self.scalar)
    }

    /// Deserialize from 32 big-endian bytes, rejecting zero and
    /// non-canonical encodings.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_scalar(group::deserialize_scalar(bytes)?)
    }
}

impl Zeroize for SigningKey {
    fn zeroize(&mut self) {
        self.scalar = Scalar::ZERO;
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"<redacted>").finish()
    }
}

/// A participant's share sᵢ = f(i) of the group signing key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SigningShare(pub(crate) Scalar);

impl SigningShare {
    /// The scalar value of this share.
    pub fn to_scalar(&self) -> Scalar {
        self.0
    }

    /// Serialize as 32 big-endian bytes.
    pub fn serialize(&self) -> [u8; 32] {
        group::serialize_scalar(&self.0)
    }

    /// Deserialize from 32 big-endian bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(group::deserialize_scalar(bytes)?))
    }
}

impl Zeroize for SigningShare {
    fn zeroize(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

impl Drop for SigningShare {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for SigningShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningShare").field(&"<redacted>").finish()
    }
}

/// A participant's public key Yᵢ = g^{sᵢ}, derivable by anyone from the
/// group commitment vector.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct VerifyingShare(pub(crate) ProjectivePoint);

impl VerifyingShare {
    /// The group element of this verifying share.
    pub fn to_element(&self) -> ProjectivePoint {
        self.0
    }

    /// Serialize as a 33-byte SEC1 compressed point.
    pub fn serialize(&self) -> Result<[u8; 33], Error> {
        group::serialize_element(&self.0)
    }

    /// Deserialize from a 33-byte SEC1 compressed point.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self(group::deserialize_element(bytes)?))
    }
}

impl From<&SigningShare> for VerifyingShare {
    fn from(share: &SigningShare) -> Self {
        Self(ProjectivePoint::GENERATOR * share.0)
    }
}

/// The group verifying key Y = g^s; the public key ordinary Schnorr
/// verifiers check against.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct VerifyingKey {
    pub(crate) element: ProjectivePoint,
}

impl VerifyingKey {
    /// The group element of this verifying key.
    pub fn to_element(&self) -> ProjectivePoint {
        self.element
    }

    /// Serialize as a 33-byte SEC1 compressed point.
    pub fn serialize(&self) -> Result<[u8; 33], Error> {
        group::serialize_element(&self.element)
    }

    /// Deserialize from a 33-byte SEC1 compressed point.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            element: group::deserialize_element(bytes)?,
        })
    }

    /// Verify a purported `signature` over `message` made by this verifying
    /// key: g^z = R + e·Y.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), Error> {
        let e = challenge(&signature.r, self, message)?;
        if ProjectivePoint::GENERATOR * signature.z == signature.r + self.element * e {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

/// A share issued to one participant by a dealer: the secret evaluation
/// f(i) along with the public commitment vector needed to verify it.
///
/// Receivers *MUST* verify the share before using it, either explicitly via
/// [`SecretShare::verify`] or through the [`KeyPackage::try_from`]
/// conversion, which verifies under the hood.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecretShare {
    /// The participant this share was dealt to.
    pub identifier: Identifier,
    pub(crate) signing_share: SigningShare,
    pub(crate) commitment: VerifiableSecretSharingCommitment,
}

impl SecretShare {
    /// Assemble a secret share from its parts.
    pub fn new(
        identifier: Identifier,
        signing_share: SigningShare,
        commitment: VerifiableSecretSharingCommitment,
    ) -> Self {
        Self {
            identifier,
            signing_share,
            commitment,
        }
    }

    /// The secret evaluation itself.
    pub fn signing_share(&self) -> &SigningShare {
        &self.signing_share
    }

    /// The commitment vector this share was dealt under.
    pub fn commitment(&self) -> &VerifiableSecretSharingCommitment {
        &self.commitment
    }

    /// Verify that this share is consistent with its commitment vector:
    /// g^{f(i)} must equal the committed polynomial evaluated at `i`.
    ///
    /// On success, returns the participant's verifying share and the group
    /// verifying key implied by the commitment.
    pub fn verify(&self) -> Result<(VerifyingShare, VerifyingKey), Error> {
        let expected = self.commitment.evaluate(&self.identifier);
        if ProjectivePoint::GENERATOR * self.signing_share.0 != expected {
            return Err(Error::InvalidSecretShare { culprit: None });
        }
        Ok((
            VerifyingShare(expected),
            self.commitment.verifying_key()?,
        ))
    }
}

/// A participant's long-lived signing state: everything needed to produce
/// signature shares.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyPackage {
    pub(crate) identifier: Identifier,
    pub(crate) signing_share: SigningShare,
    pub(crate) verifying_share: VerifyingShare,
    pub(crate) verifying_key: VerifyingKey,
    pub(crate) min_signers: u16,
}

impl KeyPackage {
    /// Assemble a key package from its parts.
    pub fn new(
        identifier: Identifier,
        signing_share: SigningShare,
        verifying_share: VerifyingShare,
        verifying_key: VerifyingKey,
        min_signers: u16,
    ) -> Self {
        Self {
            identifier,
            signing_share,
            verifying_share,
            verifying_key,
            min_signers,
        }
    }

    /// This participant's identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// This participant's secret share.
    pub fn signing_share(&self) -> &SigningShare {
        &self.signing_share
    }

    /// This participant's public key.
    pub fn verifying_share(&self) -> &VerifyingShare {
        &self.verifying_share
    }

    /// The group public key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// The signing threshold.
    pub fn min_signers(&self) -> u16 {
        self.min_signers
    }
}

impl TryFrom<SecretShare> for KeyPackage {
    type Error = Error;

    /// Verify a dealer share and promote it into signing state.
    fn try_from(secret_share: SecretShare) -> Result<Self, Error> {
        let (verifying_share, verifying_key) = secret_share.verify()?;
        Ok(KeyPackage {
            identifier: secret_share.identifier,
            min_signers: secret_share.commitment.len() as u16,
            signing_share: secret_share.signing_share.clone(),
            verifying_share,
            verifying_key,
        })
    }
}

/// Every participant's verifying share plus the group verifying key.
///
/// The coordinator needs this to verify signature shares before publishing
/// an aggregate signature.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PublicKeyPackage {
    pub(crate) verifying_shares: BTreeMap<Identifier, VerifyingShare>,
    pub(crate) verifying_key: VerifyingKey,
}

impl PublicKeyPackage {
    /// Assemble a public key package from its parts.
    pub fn new(
        verifying_shares: BTreeMap<Identifier, VerifyingShare>,
        verifying_key: VerifyingKey,
    ) -> Self {
        Self {
            verifying_shares,
            verifying_key,
        }
    }

    /// Per-participant verifying shares.
    pub fn verifying_shares(&self) -> &BTreeMap<Identifier, VerifyingShare> {
        &self.verifying_shares
    }

    /// The group verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Derive the package for `identifiers` from a single (group) commitment
    /// vector.
    pub fn from_commitment(
        identifiers: &[Identifier],
        commitment: &VerifiableSecretSharingCommitment,
    ) -> Result<Self, Error> {
        let verifying_shares = identifiers
            .iter()
            .map(|id| (*id, commitment.verifying_share(id)))
            .collect();
        Ok(Self {
            verifying_shares,
            verifying_key: commitment.verifying_key()?,
        })
    }

    /// Derive the package from each DKG participant's commitment vector by
    /// summing them into the group commitment.
    pub fn from_dkg_commitments(
        commitments: &BTreeMap<Identifier, &VerifiableSecretSharingCommitment>,
    ) -> Result<Self, Error> {
        let identifiers: Vec<Identifier> = commitments.keys().copied().collect();
        let group_commitment =
            VerifiableSecretSharingCommitment::sum(commitments.values().copied())?;
        Self::from_commitment(&identifiers, &group_commitment)
    }
}

pub(crate) fn validate_num_of_signers(min_signers: u16, max_signers: u16) -> Result<(), Error> {
    if min_signers < 2 {
        return Err(Error::InvalidMinSigners);
    }
    if max_signers < 2 {
        return Err(Error::InvalidMaxSigners);
    }
    if min_signers > max_signers {
        return Err(Error::InvalidMinSigners);
    }
    Ok(())
}

/// The identifiers 1..=max_signers used when the caller has no naming scheme
/// of its own.
pub fn default_identifiers(max_signers: u16) -> Result<Vec<Identifier>, Error> {
    (1..=max_signers).map(Identifier::try_from).collect()
}

/// Generate a fresh group key and split it among `max_signers` participants
/// with threshold `min_signers`, acting as a trusted dealer.
pub fn generate_with_dealer<R: RngCore + CryptoRng>(
    max_signers: u16,
    min_signers: u16,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage), Error> {
    let key = SigningKey::new(rng);
    split(&key, max_signers, min_signers, rng)
}

/// Split an existing signing key into `max_signers` shares with threshold
/// `min_signers`, over the default identifiers 1..=n.
pub fn split<R: RngCore + CryptoRng>(
    key: &SigningKey,
    max_signers: u16,
    min_signers: u16,
    rng: &mut R,
) -> Result<(BTreeMap<Identifier, SecretShare>, PublicKeyPackage), Error> {
    validate_num_of_signers(min_signers, max_signers)?;

    let identifiers = default_identifiers(max_signers)?;
    let coefficients = generate_coefficients(min_signers as usize - 1, rng);

    let shares = generate_secret_shares(
        &key.to_scalar(),
        max_signers,
        min_signers,
        coefficients,
        &identifiers,
    )?;

    let mut verifying_shares = BTreeMap::new();
    let mut shares_by_id = BTreeMap::new();
    for share in shares {
        verifying_shares.insert(share.identifier, VerifyingShare::from(&share.signing_share));
        shares_by_id.insert(share.identifier, share);
    }

    // Every share carries the same commitment; any of them yields the group
    // verifying key.
    let verifying_key = shares_by_id
        .values()
        .next()
        .ok_or(Error::IncorrectNumberOfShares)?
        .commitment
        .verifying_key()?;

    Ok((
        shares_by_id,
        PublicKeyPackage {
            verifying_shares,
            verifying_key,
        },
    ))
}

/// Build the secret polynomial with `secret` as the constant term, plus its
/// commitment vector.
pub(crate) fn generate_secret_polynomial(
    secret: &Scalar,
    max_signers: u16,
    min_signers: u16,
    mut coefficients: Vec<Scalar>,
) -> Result<(Vec<Scalar>, VerifiableSecretSharingCommitment), Error> {
    validate_num_of_signers(min_signers, max_signers)?;
    if coefficients.len() != min_signers as usize - 1 {
        return Err(Error::InvalidCoefficients);
    }
    coefficients.insert(0, *secret);
    let commitment = VerifiableSecretSharingCommitment::from_coefficients(&coefficients);
    Ok((coefficients, commitment))
}

fn generate_secret_shares(
    secret: &Scalar,
    max_signers: u16,
    min_signers: u16,
    coefficients: Vec<Scalar>,
    identifiers: &[Identifier],
) -> Result<Vec<SecretShare>, Error> {
    let (mut coefficients, commitment) =
        generate_secret_polynomial(secret, max_signers, min_signers, coefficients)?;

    if identifiers.len() != max_signers as usize {
        wipe_scalars(&mut coefficients);
        return Err(Error::IncorrectNumberOfIds);
    }
    let mut seen = std::collections::BTreeSet::new();
    for identifier in identifiers {
        if !seen.insert(identifier) {
            wipe_scalars(&mut coefficients);
            return Err(Error::DuplicatedIdentifier);
        }
    }

    let shares = identifiers
        .iter()
        .map(|identifier| SecretShare {
            identifier: *identifier,
            signing_share: SigningShare(evaluate_polynomial(identifier, &coefficients)),
            commitment: commitment.clone(),
        })
        .collect();

    wipe_scalars(&mut coefficients);
    Ok(shares)
}

/// Overwrite polynomial coefficients before their buffer is released.
pub(crate) fn wipe_scalars(scalars: &mut Vec<Scalar>) {
    for scalar in scalars.iter_mut() {
        *scalar = Scalar::ZERO;
    }
    scalars.clear();
}

/// Recombine at least `min_signers` shares into the group signing key.
///
/// This is a diagnostic and dealer-migration path only; production signing
/// never reconstructs the joint secret.
pub fn reconstruct(
    min_signers: u16,
    shares: &BTreeMap<Identifier, SigningShare>,
) -> Result<SigningKey, Error> {
    if shares.is_empty() || shares.len() < min_signers as usize {
        return Err(Error::IncorrectNumberOfShares);
    }

    let identifiers: Vec<Identifier> = shares.keys().copied().collect();

    let mut secret = Scalar::ZERO;
    for (identifier, share) in shares {
        let lambda = lagrange_coeff_at_zero(identifier, &identifiers)?;
        secret += lambda * share.0;
    }

    SigningKey::from_scalar(secret)
}
