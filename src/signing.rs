// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

//! Two-round threshold signing.
//!
//! Round 1: each selected signer generates fresh hiding/binding nonces and
//! publishes their commitments. Round 2: given the full commitment set and
//! the message, each signer produces a signature share; the coordinator
//! aggregates the shares into a plain Schnorr signature and identifies any
//! cheating signer if aggregation fails.

use std::collections::BTreeMap;
use std::fmt;

use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::Error;
use crate::hash;
use crate::identifier::Identifier;
use crate::keys::{KeyPackage, PublicKeyPackage, SigningShare, VerifyingKey, VerifyingShare};
use crate::polynomial::lagrange_coeff_at_zero;
use crate::signature::{challenge, Signature};
use crate::group;

/// The hiding and binding nonces a signer keeps between the two signing
/// rounds.
///
/// A nonce pair must be used for exactly *one* signature share; reuse leaks
/// the long-lived signing share. [`sign`] therefore consumes the nonces,
/// and they are wiped on drop.
pub struct SigningNonces {
    hiding: Scalar,
    binding: Scalar,
    commitments: SigningCommitments,
}

impl SigningNonces {
    /// Generate a fresh nonce pair and its commitments.
    ///
    /// Each nonce hashes 32 bytes of fresh randomness together with the
    /// signing share, so a weak random source alone cannot expose the
    /// nonce.
    pub fn new<R: RngCore + CryptoRng>(secret: &SigningShare, rng: &mut R) -> Self {
        let hiding = generate_nonce(secret, rng);
        let binding = generate_nonce(secret, rng);

        let commitments = SigningCommitments {
            hiding: ProjectivePoint::GENERATOR * hiding,
            binding: ProjectivePoint::GENERATOR * binding,
        };

        Self {
            hiding,
            binding,
            commitments,
        }
    }

    /// The commitments to publish for this nonce pair.
    pub fn commitments(&self) -> &SigningCommitments {
        &self.commitments
    }
}

impl Zeroize for SigningNonces {
    fn zeroize(&mut self) {
        self.hiding = Scalar::ZERO;
        self.binding = Scalar::ZERO;
    }
}

impl Drop for SigningNonces {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for SigningNonces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningNonces")
            .field("hiding", &"<redacted>")
            .field("binding", &"<redacted>")
            .field("commitments", &self.commitments)
            .finish()
    }
}

/// d ← Hnonce(random32 ‖ secret), resampling in the negligible zero case.
fn generate_nonce<R: RngCore + CryptoRng>(secret: &SigningShare, rng: &mut R) -> Scalar {
    loop {
        let mut random_bytes = [0u8; 32];
        rng.fill_bytes(&mut random_bytes);

        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(&random_bytes);
        preimage.extend_from_slice(&secret.serialize());

        let nonce = hash::h3(&preimage);
        if nonce != Scalar::ZERO {
            return nonce;
        }
    }
}

/// A signer's commitments (D, E) to its hiding and binding nonces,
/// published in the first round of signing.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SigningCommitments {
    pub(crate) hiding: ProjectivePoint,
    pub(crate) binding: ProjectivePoint,
}

impl SigningCommitments {
    /// The hiding commitment D.
    pub fn hiding(&self) -> &ProjectivePoint {
        &self.hiding
    }

    /// The binding commitment E.
    pub fn binding(&self) -> &ProjectivePoint {
        &self.binding
    }

    /// This signer's summand of the group commitment: D + ρ·E.
    fn to_group_commitment_share(&self, binding_factor: &Scalar) -> ProjectivePoint {
        self.hiding + self.binding * *binding_factor
    }
}

/// Batch-generate nonce/commitment pairs ahead of signing sessions.
///
/// With `num_nonces = 1` this is exactly the first signing round; larger
/// batches let a signer commit to many future sessions at once. Nonces go
/// to secret storage, commitments to the coordinator.
pub fn preprocess<R: RngCore + CryptoRng>(
    num_nonces: usize,
    secret: &SigningShare,
    rng: &mut R,
) -> (Vec<SigningNonces>, Vec<SigningCommitments>) {
    let mut signing_nonces = Vec::with_capacity(num_nonces);
    let mut signing_commitments = Vec::with_capacity(num_nonces);

    for _ in 0..num_nonces {
        let nonces = SigningNonces::new(secret, rng);
        signing_commitments.push(*nonces.commitments());
        signing_nonces.push(nonces);
    }

    (signing_nonces, signing_commitments)
}

/// The coordinator's round 2 broadcast: every selected signer's commitments
/// plus the message to sign.
///
/// Commitments are keyed by identifier in a [`BTreeMap`], so every signer
/// and the coordinator serialize them in the same ascending order; the
/// binding factors depend on that order being fixed.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SigningPackage {
    pub(crate) signing_commitments: BTreeMap<Identifier, SigningCommitments>,
    #[cfg_attr(feature = "serde", serde(with = "crate::serialize::hex_bytes"))]
    pub(crate) message: Vec<u8>,
}

impl SigningPackage {
    /// Assemble a signing package for `message`.
    pub fn new(
        signing_commitments: BTreeMap<Identifier, SigningCommitments>,
        message: &[u8],
    ) -> Self {
        Self {
            signing_commitments,
            message: message.to_vec(),
        }
    }

    /// The commitments of every selected signer, keyed by identifier.
    pub fn signing_commitments(&self) -> &BTreeMap<Identifier, SigningCommitments> {
        &self.signing_commitments
    }

    /// The commitment for one signer, if selected.
    pub fn signing_commitment(&self, identifier: &Identifier) -> Option<&SigningCommitments> {
        self.signing_commitments.get(identifier)
    }

    /// The message being signed.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// The identifiers of the selected signers, ascending.
    pub fn signing_participants(&self) -> Vec<Identifier> {
        self.signing_commitments.keys().copied().collect()
    }

    /// enc(id) ‖ enc(D) ‖ enc(E) for each signer, ascending by identifier.
    fn encode_group_commitment_list(&self) -> Result<Vec<u8>, Error> {
        let mut buffer =
            Vec::with_capacity(self.signing_commitments.len() * (32 + 2 * group::ELEMENT_SIZE));
        for (identifier, commitments) in &self.signing_commitments {
            buffer.extend_from_slice(&identifier.serialize());
            buffer.extend_from_slice(&serialize_commitment_element(&commitments.hiding)?);
            buffer.extend_from_slice(&serialize_commitment_element(&commitments.binding)?);
        }
        Ok(buffer)
    }

    /// One binding-factor preimage per signer:
    /// enc(Y) ‖ H4(message) ‖ H5(commitment list) ‖ enc(id).
    fn binding_factor_preimages(
        &self,
        verifying_key: &VerifyingKey,
    ) -> Result<Vec<(Identifier, Vec<u8>)>, Error> {
        let mut prefix = Vec::with_capacity(group::ELEMENT_SIZE + 64);
        prefix.extend_from_slice(&verifying_key.serialize()?);
        prefix.extend_from_slice(&hash::h4(&self.message));
        prefix.extend_from_slice(&hash::h5(&self.encode_group_commitment_list()?));

        Ok(self
            .signing_commitments
            .keys()
            .map(|identifier| {
                let mut preimage = Vec::with_capacity(prefix.len() + 32);
                preimage.extend_from_slice(&prefix);
                preimage.extend_from_slice(&identifier.serialize());
                (*identifier, preimage)
            })
            .collect())
    }
}

/// A commitment element destined for a hash preimage; the identity is a
/// protocol violation rather than an encoding accident.
fn serialize_commitment_element(element: &ProjectivePoint) -> Result<[u8; 33], Error> {
    group::serialize_element(element).map_err(|_| Error::IdentityCommitment)
}

/// ρ per signer, derived from the whole signing transcript.
pub(crate) fn compute_binding_factor_list(
    signing_package: &SigningPackage,
    verifying_key: &VerifyingKey,
) -> Result<BTreeMap<Identifier, Scalar>, Error> {
    Ok(signing_package
        .binding_factor_preimages(verifying_key)?
        .into_iter()
        .map(|(identifier, preimage)| (identifier, hash::h1(&preimage)))
        .collect())
}

/// The group commitment R = Σ (Dᵢ + ρᵢ·Eᵢ): a running sum over the hiding
/// commitments plus one multi-scalar multiplication for the binding parts.
pub(crate) fn compute_group_commitment(
    signing_package: &SigningPackage,
    binding_factors: &BTreeMap<Identifier, Scalar>,
) -> Result<ProjectivePoint, Error> {
    let n = signing_package.signing_commitments.len();
    let mut binding_scalars = Vec::with_capacity(n);
    let mut binding_elements = Vec::with_capacity(n);
    let mut hiding_sum = ProjectivePoint::IDENTITY;

    for (identifier, commitments) in &signing_package.signing_commitments {
        if commitments.hiding == ProjectivePoint::IDENTITY
            || commitments.binding == ProjectivePoint::IDENTITY
        {
            return Err(Error::IdentityCommitment);
        }

        let rho = binding_factors
            .get(identifier)
            .ok_or(Error::UnknownIdentifier)?;

        binding_scalars.push(*rho);
        binding_elements.push(commitments.binding);
        hiding_sum += commitments.hiding;
    }

    Ok(hiding_sum + group::vartime_multiscalar_mul(&binding_scalars, &binding_elements))
}

/// A signer's share zᵢ of the response scalar.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SignatureShare {
    pub(crate) share: Scalar,
}

impl SignatureShare {
    /// The share scalar.
    pub fn to_scalar(&self) -> Scalar {
        self.share
    }

    /// Serialize as 32 big-endian bytes.
    pub fn serialize(&self) -> [u8; 32] {
        group::serialize_scalar(&self.share)
    }

    /// Deserialize from 32 big-endian bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            share: group::deserialize_scalar(bytes)?,
        })
    }

    /// gᶻⁱ ?= Rᵢ + (λᵢ·e)·Yᵢ.
    fn is_valid(
        &self,
        verifying_share: &VerifyingShare,
        lambda_i: &Scalar,
        group_commitment_share: &ProjectivePoint,
        challenge: &Scalar,
    ) -> bool {
        ProjectivePoint::GENERATOR * self.share
            == *group_commitment_share + verifying_share.0 * (*lambda_i * *challenge)
    }
}

/// The second signing round, performed once by each selected signer.
///
/// Consumes the nonces: a pair must never produce two shares. The package's
/// commitment for this signer must match the one retained with the nonces,
/// otherwise the coordinator is working from a stale or forged commitment
/// set.
pub fn sign(
    signing_package: &SigningPackage,
    signer_nonces: SigningNonces,
    key_package: &KeyPackage,
) -> Result<SignatureShare, Error> {
    if signing_package.signing_commitments.len() < key_package.min_signers as usize {
        return Err(Error::IncorrectNumberOfCommitments);
    }

    let commitment = signing_package
        .signing_commitment(&key_package.identifier)
        .ok_or(Error::UnknownIdentifier)?;
    if commitment != signer_nonces.commitments() {
        return Err(Error::InvalidCommitment);
    }

    let binding_factors =
        compute_binding_factor_list(signing_package, &key_package.verifying_key)?;
    let group_commitment = compute_group_commitment(signing_package, &binding_factors)?;

    let lambda_i = lagrange_coeff_at_zero(
        &key_package.identifier,
        &signing_package.signing_participants(),
    )?;

    let e = challenge(
        &group_commitment,
        &key_package.verifying_key,
        &signing_package.message,
    )?;

    let rho_i = binding_factors
        .get(&key_package.identifier)
        .ok_or(Error::UnknownIdentifier)?;

    // zᵢ = dᵢ + ρᵢ·eᵢ + λᵢ·sᵢ·e
    let share = signer_nonces.hiding
        + *rho_i * signer_nonces.binding
        + lambda_i * key_package.signing_share.0 * e;

    Ok(SignatureShare { share })
}

/// Aggregate the signature shares into a single Schnorr signature and
/// verify it against the group key.
///
/// On a verification failure the shares are checked individually and the
/// error names the first cheating signer; if every share verifies yet the
/// sum does not, the inputs were assembled inconsistently and
/// [`Error::InvalidSignature`] is returned. A successful aggregation also
/// re-checks the shares, so a pair of canceling cheaters cannot slip a
/// valid-looking transcript past the coordinator.
pub fn aggregate(
    signing_package: &SigningPackage,
    signature_shares: &BTreeMap<Identifier, SignatureShare>,
    pubkeys: &PublicKeyPackage,
) -> Result<Signature, Error> {
    if signing_package.signing_commitments.len() != signature_shares.len() {
        return Err(Error::UnknownIdentifier);
    }
    for identifier in signing_package.signing_commitments.keys() {
        if !signature_shares.contains_key(identifier)
            || !pubkeys.verifying_shares.contains_key(identifier)
        {
            return Err(Error::UnknownIdentifier);
        }
    }

    let binding_factors = compute_binding_factor_list(signing_package, &pubkeys.verifying_key)?;
    let group_commitment = compute_group_commitment(signing_package, &binding_factors)?;

    let mut z = Scalar::ZERO;
    for share in signature_shares.values() {
        z += share.share;
    }

    let signature = Signature {
        r: group_commitment,
        z,
    };

    match pubkeys.verifying_key.verify(&signing_package.message, &signature) {
        Ok(()) => {
            detect_cheater(
                &group_commitment,
                pubkeys,
                signing_package,
                signature_shares,
                &binding_factors,
            )?;
            Ok(signature)
        }
        Err(_) => {
            detect_cheater(
                &group_commitment,
                pubkeys,
                signing_package,
                signature_shares,
                &binding_factors,
            )?;
            // Every share verified individually, yet the sum failed: the
            // aggregation inputs are inconsistent.
            Err(Error::InvalidSignature)
        }
    }
}

/// Verify each share individually and name the first signer whose share
/// fails.
fn detect_cheater(
    group_commitment: &ProjectivePoint,
    pubkeys: &PublicKeyPackage,
    signing_package: &SigningPackage,
    signature_shares: &BTreeMap<Identifier, SignatureShare>,
    binding_factors: &BTreeMap<Identifier, Scalar>,
) -> Result<(), Error> {
    let e = challenge(
        group_commitment,
        &pubkeys.verifying_key,
        &signing_package.message,
    )?;

    for (identifier, signature_share) in signature_shares {
        let verifying_share = pubkeys
            .verifying_shares
            .get(identifier)
            .ok_or(Error::UnknownIdentifier)?;
        verify_share_precomputed(
            identifier,
            signing_package,
            binding_factors,
            signature_share,
            verifying_share,
            &e,
        )?;
    }
    Ok(())
}

/// Verify a single signature share against the transcript, recomputing the
/// binding factors and challenge from scratch.
pub fn verify_signature_share(
    identifier: &Identifier,
    verifying_share: &VerifyingShare,
    signature_share: &SignatureShare,
    signing_package: &SigningPackage,
    verifying_key: &VerifyingKey,
) -> Result<(), Error> {
    let binding_factors = compute_binding_factor_list(signing_package, verifying_key)?;
    let group_commitment = compute_group_commitment(signing_package, &binding_factors)?;
    let e = challenge(&group_commitment, verifying_key, &signing_package.message)?;

    verify_share_precomputed(
        identifier,
        signing_package,
        &binding_factors,
        signature_share,
        verifying_share,
        &e,
    )
}

fn verify_share_precomputed(
    identifier: &Identifier,
    signing_package: &SigningPackage,
    binding_factors: &BTreeMap<Identifier, Scalar>,
    signature_share: &SignatureShare,
    verifying_share: &VerifyingShare,
    challenge: &Scalar,
) -> Result<(), Error> {
    let lambda_i =
        lagrange_coeff_at_zero(identifier, &signing_package.signing_participants())?;

    let rho = binding_factors
        .get(identifier)
        .ok_or(Error::UnknownIdentifier)?;
    let commitments = signing_package
        .signing_commitment(identifier)
        .ok_or(Error::UnknownIdentifier)?;

    let group_commitment_share = commitments.to_group_commitment_share(rho);

    if !signature_share.is_valid(verifying_share, &lambda_i, &group_commitment_share, challenge) {
        return Err(Error::InvalidSignatureShare {
            culprit: *identifier,
        });
    }
    Ok(())
}
