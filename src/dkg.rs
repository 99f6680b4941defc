// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

//! Distributed key generation: a Pedersen-style three-round protocol built
//! on Feldman verifiable secret sharing. Every participant deals a share of
//! the group secret; nobody ever holds the whole thing.
//!
//! ```text
//! (1. sample coefficients, commit, prove knowledge of the constant term)
//!                     broadcast round 1 package
//! ---------------------------------------------------------------->
//!                     collect all round 1 packages
//! <----------------------------------------------------------------
//! (2. verify each proof, evaluate own polynomial per peer)
//!                     send round 2 package to each peer, confidentially
//! ---------------------------------------------------------------->
//!                     collect round 2 packages addressed to us
//! <----------------------------------------------------------------
//! (3. verify each share against its commitment,
//!     sum into the long-lived signing share,
//!     derive the group verifying key)
//! ```
//!
//! Rounds are not re-entrant: each `part*` call consumes the secret package
//! produced by the previous one, and the secret packages wipe their contents
//! on drop.
//!
//! The `refresh_part*` functions run the same three rounds with a zero
//! constant term, producing share rotations that leave the group verifying
//! key untouched.

use std::collections::BTreeMap;

use k256::{ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::commitment::{CoefficientCommitment, VerifiableSecretSharingCommitment};
use crate::error::Error;
use crate::group;
use crate::hash;
use crate::identifier::Identifier;
use crate::keys::{
    generate_secret_polynomial, validate_num_of_signers, wipe_scalars, KeyPackage,
    PublicKeyPackage, SigningKey, SigningShare, VerifyingShare,
};
use crate::polynomial::{evaluate_polynomial, generate_coefficients};

/// The Schnorr proof σᵢ = (Rᵢ, zᵢ) that a participant knows the constant
/// term of its polynomial, binding the commitment vector to that knowledge.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ProofOfKnowledge {
    pub(crate) r: ProjectivePoint,
    pub(crate) z: Scalar,
}

/// Round 1 package types.
pub mod round1 {
    use super::*;

    /// The public output of [`part1`](super::part1), broadcast to every
    /// other participant.
    #[derive(Clone, Eq, PartialEq, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Package {
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) proof_of_knowledge: ProofOfKnowledge,
    }

    impl Package {
        /// Assemble a round 1 package from its parts.
        pub fn new(
            commitment: VerifiableSecretSharingCommitment,
            proof_of_knowledge: ProofOfKnowledge,
        ) -> Self {
            Self {
                commitment,
                proof_of_knowledge,
            }
        }

        /// The sender's commitment vector.
        pub fn commitment(&self) -> &VerifiableSecretSharingCommitment {
            &self.commitment
        }

        /// The sender's proof of knowledge of its constant term.
        pub fn proof_of_knowledge(&self) -> &ProofOfKnowledge {
            &self.proof_of_knowledge
        }
    }

    /// The secret output of [`part1`](super::part1), held locally until
    /// [`part2`](super::part2) consumes it. Wiped on drop.
    pub struct SecretPackage {
        pub(crate) identifier: Identifier,
        pub(crate) coefficients: Vec<Scalar>,
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) min_signers: u16,
        pub(crate) max_signers: u16,
    }

    impl SecretPackage {
        /// The identifier this package belongs to.
        pub fn identifier(&self) -> &Identifier {
            &self.identifier
        }
    }

    impl Drop for SecretPackage {
        fn drop(&mut self) {
            wipe_scalars(&mut self.coefficients);
        }
    }
}

/// Round 2 package types.
pub mod round2 {
    use super::*;

    /// The per-recipient secret output of [`part2`](super::part2): the
    /// evaluation fᵢ(ℓ) of the sender's polynomial at the recipient's
    /// identifier.
    ///
    /// This MUST be carried over a confidential, authenticated channel; it
    /// is a share of the recipient's long-lived secret.
    #[derive(Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Package {
        pub(crate) signing_share: SigningShare,
    }

    impl Package {
        /// Assemble a round 2 package from the transmitted share.
        pub fn new(signing_share: SigningShare) -> Self {
            Self { signing_share }
        }

        /// The secret share addressed to the recipient.
        pub fn signing_share(&self) -> &SigningShare {
            &self.signing_share
        }
    }

    /// The secret output of [`part2`](super::part2), held locally until
    /// [`part3`](super::part3) consumes it. Holds fᵢ(i). Wiped on drop.
    pub struct SecretPackage {
        pub(crate) identifier: Identifier,
        pub(crate) commitment: VerifiableSecretSharingCommitment,
        pub(crate) secret_share: Scalar,
        pub(crate) min_signers: u16,
        pub(crate) max_signers: u16,
    }

    impl SecretPackage {
        /// The identifier this package belongs to.
        pub fn identifier(&self) -> &Identifier {
            &self.identifier
        }
    }

    impl Drop for SecretPackage {
        fn drop(&mut self) {
            self.secret_share = Scalar::ZERO;
        }
    }
}

/// The challenge c = Hdkg(id ‖ enc(φ₀) ‖ enc(R)), reduced mod n. Zero is
/// allowed here, unlike in identifier or nonce derivation.
fn dkg_challenge(
    identifier: &Identifier,
    phi_0: &ProjectivePoint,
    big_r: &ProjectivePoint,
) -> Scalar {
    let mut preimage = Vec::with_capacity(group::SCALAR_SIZE + 2 * group::ELEMENT_SIZE);
    preimage.extend_from_slice(&identifier.serialize());
    preimage.extend_from_slice(&group::transcript_element_bytes(phi_0));
    preimage.extend_from_slice(&group::transcript_element_bytes(big_r));
    hash::hdkg(&preimage)
}

/// σᵢ = (R, z) with R = g^k and z = k + a₀·c for a fresh random nonce k.
fn compute_proof_of_knowledge<R: RngCore + CryptoRng>(
    identifier: &Identifier,
    coefficients: &[Scalar],
    commitment: &VerifiableSecretSharingCommitment,
    rng: &mut R,
) -> Result<ProofOfKnowledge, Error> {
    let a_0 = coefficients.first().ok_or(Error::InvalidCoefficients)?;
    let phi_0 = commitment
        .0
        .first()
        .ok_or(Error::InvalidCommitmentVector)?
        .0;

    let k = group::random_nonzero_scalar(rng);
    let big_r = ProjectivePoint::GENERATOR * k;
    let c = dkg_challenge(identifier, &phi_0, &big_r);

    Ok(ProofOfKnowledge {
        r: big_r,
        z: k + *a_0 * c,
    })
}

/// Check σℓ against the sender's constant-term commitment:
/// Rℓ ?= g^{zℓ} · φ_{ℓ0}^{−cℓ}.
pub(crate) fn verify_proof_of_knowledge(
    identifier: &Identifier,
    commitment: &VerifiableSecretSharingCommitment,
    proof: &ProofOfKnowledge,
) -> Result<(), Error> {
    let phi_0 = commitment
        .0
        .first()
        .ok_or(Error::InvalidCommitmentVector)?
        .0;
    let c = dkg_challenge(identifier, &phi_0, &proof.r);

    if proof.r != ProjectivePoint::GENERATOR * proof.z + phi_0 * (-c) {
        return Err(Error::InvalidProofOfKnowledge {
            culprit: *identifier,
        });
    }
    Ok(())
}

/// DKG round 1.
///
/// The participant's long-term secret becomes the constant term of its
/// polynomial, so the final group key is g raised to the sum of all
/// participants' secrets. Returns the secret package to retain and the
/// public package to broadcast.
pub fn part1<R: RngCore + CryptoRng>(
    identifier: Identifier,
    max_signers: u16,
    min_signers: u16,
    signing_key: &SigningKey,
    rng: &mut R,
) -> Result<(round1::SecretPackage, round1::Package), Error> {
    validate_num_of_signers(min_signers, max_signers)?;
    let coefficients = generate_coefficients(min_signers as usize - 1, rng);
    part1_with_coefficients(identifier, max_signers, min_signers, signing_key, coefficients, rng)
}

/// DKG round 1 with caller-supplied random coefficients.
///
/// The coefficient vector must have length `min_signers - 1`; the constant
/// term is taken from `signing_key`.
pub fn part1_with_coefficients<R: RngCore + CryptoRng>(
    identifier: Identifier,
    max_signers: u16,
    min_signers: u16,
    signing_key: &SigningKey,
    coefficients: Vec<Scalar>,
    rng: &mut R,
) -> Result<(round1::SecretPackage, round1::Package), Error> {
    let (coefficients, commitment) = generate_secret_polynomial(
        &signing_key.to_scalar(),
        max_signers,
        min_signers,
        coefficients,
    )?;

    let proof_of_knowledge =
        compute_proof_of_knowledge(&identifier, &coefficients, &commitment, rng)?;

    let secret_package = round1::SecretPackage {
        identifier,
        coefficients,
        commitment: commitment.clone(),
        min_signers,
        max_signers,
    };
    let package = round1::Package {
        commitment,
        proof_of_knowledge,
    };

    Ok((secret_package, package))
}

/// DKG round 2.
///
/// Takes the other participants' round 1 packages (exactly `n − 1` of
/// them), verifies every proof of knowledge, and produces one confidential
/// package per peer carrying that peer's evaluation of our polynomial.
/// Consumes the round 1 secret package; its coefficients are wiped when it
/// drops.
pub fn part2(
    secret_package: round1::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
) -> Result<(round2::SecretPackage, BTreeMap<Identifier, round2::Package>), Error> {
    if round1_packages.len() != secret_package.max_signers as usize - 1 {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if round1_packages.contains_key(&secret_package.identifier) {
        return Err(Error::IncorrectPackage);
    }

    for (sender, package) in round1_packages {
        if package.commitment.len() != secret_package.min_signers as usize {
            return Err(Error::IncorrectNumberOfCommitments);
        }
        verify_proof_of_knowledge(sender, &package.commitment, &package.proof_of_knowledge)?;
    }

    Ok(build_round2_packages(secret_package, round1_packages.keys()))
}

/// Evaluate our polynomial at every peer identifier and at our own,
/// consuming the round 1 secret package.
fn build_round2_packages<'a>(
    secret_package: round1::SecretPackage,
    recipients: impl Iterator<Item = &'a Identifier>,
) -> (round2::SecretPackage, BTreeMap<Identifier, round2::Package>) {
    let mut packages = BTreeMap::new();
    for recipient in recipients {
        let share = evaluate_polynomial(recipient, &secret_package.coefficients);
        packages.insert(
            *recipient,
            round2::Package {
                signing_share: SigningShare(share),
            },
        );
    }

    let own_share = evaluate_polynomial(&secret_package.identifier, &secret_package.coefficients);

    let round2_secret = round2::SecretPackage {
        identifier: secret_package.identifier,
        commitment: secret_package.commitment.clone(),
        secret_share: own_share,
        min_signers: secret_package.min_signers,
        max_signers: secret_package.max_signers,
    };

    (round2_secret, packages)
}

/// DKG round 3.
///
/// Verifies every received share against its sender's commitment, sums the
/// evaluations into this participant's long-lived signing share, and builds
/// the public key package shared by the whole group. The `round1_packages`
/// map must be the same one passed to [`part2`]; `round2_packages` holds
/// the confidential shares addressed to us, keyed by sender.
pub fn part3(
    round2_secret: round2::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
    round2_packages: &BTreeMap<Identifier, round2::Package>,
) -> Result<(KeyPackage, PublicKeyPackage), Error> {
    if round1_packages.len() != round2_secret.max_signers as usize - 1 {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if round1_packages.len() != round2_packages.len() {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if !round1_packages
        .keys()
        .all(|id| round2_packages.contains_key(id))
    {
        return Err(Error::IncorrectPackage);
    }

    let mut signing_share = Scalar::ZERO;
    for (sender, package) in round2_packages {
        let round1_package = round1_packages.get(sender).ok_or(Error::IncorrectPackage)?;
        verify_share(
            &round2_secret.identifier,
            sender,
            &package.signing_share,
            &round1_package.commitment,
        )?;
        signing_share += package.signing_share.0;
    }
    signing_share += round2_secret.secret_share;

    let verifying_share = VerifyingShare(ProjectivePoint::GENERATOR * signing_share);

    let mut commitments: BTreeMap<Identifier, &VerifiableSecretSharingCommitment> =
        round1_packages
            .iter()
            .map(|(id, package)| (*id, &package.commitment))
            .collect();
    commitments.insert(round2_secret.identifier, &round2_secret.commitment);

    let public_key_package = PublicKeyPackage::from_dkg_commitments(&commitments)?;

    // The summed share must agree with the group commitment's view of us.
    if public_key_package
        .verifying_shares
        .get(&round2_secret.identifier)
        != Some(&verifying_share)
    {
        return Err(Error::InvalidSecretShare { culprit: None });
    }

    let key_package = KeyPackage {
        identifier: round2_secret.identifier,
        signing_share: SigningShare(signing_share),
        verifying_share,
        verifying_key: public_key_package.verifying_key,
        min_signers: round2_secret.min_signers,
    };

    Ok((key_package, public_key_package))
}

/// g^{share} ?= Σₖ φ_{ℓk}·iᵏ; failure names the sender.
fn verify_share(
    receiver: &Identifier,
    sender: &Identifier,
    share: &SigningShare,
    commitment: &VerifiableSecretSharingCommitment,
) -> Result<(), Error> {
    if ProjectivePoint::GENERATOR * share.0 != commitment.evaluate(receiver) {
        return Err(Error::InvalidSecretShare {
            culprit: Some(*sender),
        });
    }
    Ok(())
}

/// Share refresh, round 1.
///
/// Runs [`part1`] with a zero constant term. The broadcast commitment
/// vector omits the (identity) constant-term commitment to keep the
/// identity element off the wire; receivers re-insert it locally.
pub fn refresh_part1<R: RngCore + CryptoRng>(
    identifier: Identifier,
    max_signers: u16,
    min_signers: u16,
    rng: &mut R,
) -> Result<(round1::SecretPackage, round1::Package), Error> {
    validate_num_of_signers(min_signers, max_signers)?;

    let coefficients = generate_coefficients(min_signers as usize - 1, rng);
    let (coefficients, commitment) =
        generate_secret_polynomial(&Scalar::ZERO, max_signers, min_signers, coefficients)?;

    // The proof conveys no binding for a zero exponent; it is produced for
    // wire compatibility and receivers never verify it.
    let proof_of_knowledge =
        compute_proof_of_knowledge(&identifier, &coefficients, &commitment, rng)?;

    let wire_commitment = VerifiableSecretSharingCommitment(commitment.0[1..].to_vec());

    let secret_package = round1::SecretPackage {
        identifier,
        coefficients,
        commitment,
        min_signers,
        max_signers,
    };
    let package = round1::Package {
        commitment: wire_commitment,
        proof_of_knowledge,
    };

    Ok((secret_package, package))
}

/// Share refresh, round 2.
///
/// Like [`part2`], except the incoming commitment vectors have length
/// `t − 1` (the identity constant term stays off the wire) and the proofs
/// of knowledge are not verified.
pub fn refresh_part2(
    secret_package: round1::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
) -> Result<(round2::SecretPackage, BTreeMap<Identifier, round2::Package>), Error> {
    if round1_packages.len() != secret_package.max_signers as usize - 1 {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if round1_packages.contains_key(&secret_package.identifier) {
        return Err(Error::IncorrectPackage);
    }
    for package in round1_packages.values() {
        if package.commitment.len() != secret_package.min_signers as usize - 1 {
            return Err(Error::IncorrectNumberOfCommitments);
        }
    }

    Ok(build_round2_packages(secret_package, round1_packages.keys()))
}

/// Share refresh, round 3.
///
/// Verifies the refreshing shares, adds their sum to the old signing share,
/// and shifts every verifying share by the refresh contribution. The group
/// verifying key must come out unchanged; any drift is a fatal protocol
/// violation.
pub fn refresh_part3(
    round2_secret: round2::SecretPackage,
    round1_packages: &BTreeMap<Identifier, round1::Package>,
    round2_packages: &BTreeMap<Identifier, round2::Package>,
    old_key_package: &KeyPackage,
    old_public_key_package: &PublicKeyPackage,
) -> Result<(KeyPackage, PublicKeyPackage), Error> {
    if round1_packages.len() != round2_secret.max_signers as usize - 1 {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if round1_packages.len() != round2_packages.len() {
        return Err(Error::IncorrectNumberOfPackages);
    }
    if !round1_packages
        .keys()
        .all(|id| round2_packages.contains_key(id))
    {
        return Err(Error::IncorrectPackage);
    }
    if round2_secret.identifier != old_key_package.identifier {
        return Err(Error::UnknownIdentifier);
    }

    // Re-insert the identity constant-term commitment dropped on the wire.
    let expanded: BTreeMap<Identifier, VerifiableSecretSharingCommitment> = round1_packages
        .iter()
        .map(|(id, package)| {
            let mut coefficients = package.commitment.0.clone();
            coefficients.insert(0, CoefficientCommitment(ProjectivePoint::IDENTITY));
            (*id, VerifiableSecretSharingCommitment(coefficients))
        })
        .collect();

    let mut refresh_sum = Scalar::ZERO;
    for (sender, package) in round2_packages {
        let commitment = expanded.get(sender).ok_or(Error::IncorrectPackage)?;
        verify_share(
            &round2_secret.identifier,
            sender,
            &package.signing_share,
            commitment,
        )?;
        refresh_sum += package.signing_share.0;
    }
    refresh_sum += round2_secret.secret_share;

    let mut all_commitments: Vec<&VerifiableSecretSharingCommitment> = expanded.values().collect();
    all_commitments.push(&round2_secret.commitment);
    let refresh_commitment = VerifiableSecretSharingCommitment::sum(all_commitments)?;

    // The summed constant term must still be the identity, or the refresh
    // would move the group key.
    if refresh_commitment.verifying_key()?.element != ProjectivePoint::IDENTITY {
        return Err(Error::VerifyingKeyMismatch);
    }

    let new_signing_share = old_key_package.signing_share.0 + refresh_sum;

    let mut verifying_shares = BTreeMap::new();
    for (id, old_share) in &old_public_key_package.verifying_shares {
        verifying_shares.insert(
            *id,
            VerifyingShare(old_share.0 + refresh_commitment.evaluate(id)),
        );
    }

    let verifying_share = *verifying_shares
        .get(&round2_secret.identifier)
        .ok_or(Error::UnknownIdentifier)?;
    if ProjectivePoint::GENERATOR * new_signing_share != verifying_share.0 {
        return Err(Error::InvalidSecretShare { culprit: None });
    }

    let key_package = KeyPackage {
        identifier: round2_secret.identifier,
        signing_share: SigningShare(new_signing_share),
        verifying_share,
        verifying_key: old_public_key_package.verifying_key,
        min_signers: round2_secret.min_signers,
    };
    let public_key_package = PublicKeyPackage {
        verifying_shares,
        verifying_key: old_public_key_package.verifying_key,
    };

    Ok((key_package, public_key_package))
}
