// -*- mode: rust; -*-
//
// This file is part of frost-secp256k1-taproot.
// See LICENSE for licensing information.

use thiserror::Error;

use crate::Identifier;

/// An error in the threshold signature protocol.
///
/// Every variant aborts the round that raised it; the caller decides whether
/// to restart the protocol. Peer-attributable failures carry the culprit
/// identifier so misbehaving participants can be excluded before a retry.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A scalar that must be non-zero (identifier, nonce) came out zero.
    #[error("Invalid zero scalar.")]
    InvalidZeroScalar,
    /// The number of polynomial coefficients does not match `min_signers - 1`.
    #[error("Invalid coefficients.")]
    InvalidCoefficients,
    /// `min_signers` is below 2 or above `max_signers`.
    #[error("Invalid min_signers.")]
    InvalidMinSigners,
    /// `max_signers` is below 2.
    #[error("Invalid max_signers.")]
    InvalidMaxSigners,
    /// Fewer shares than the reconstruction threshold were supplied.
    #[error("Incorrect number of shares.")]
    IncorrectNumberOfShares,
    /// The identifier set has the wrong cardinality.
    #[error("Incorrect number of identifiers.")]
    IncorrectNumberOfIds,
    /// The same identifier appears more than once in a set that must be unique.
    #[error("Duplicated identifier.")]
    DuplicatedIdentifier,
    /// Commitment vectors being combined disagree on length, or the length
    /// does not match the threshold.
    #[error("Incorrect number of commitments.")]
    IncorrectNumberOfCommitments,
    /// A commitment vector is empty or otherwise malformed.
    #[error("Invalid commitment vector.")]
    InvalidCommitmentVector,
    /// A DKG round received a package map with the wrong cardinality.
    #[error("Incorrect number of packages.")]
    IncorrectNumberOfPackages,
    /// A DKG round received packages whose senders do not match the expected
    /// peer set.
    #[error("Incorrect package.")]
    IncorrectPackage,
    /// A peer's Schnorr proof of knowledge of its constant term failed to
    /// verify.
    #[error("Invalid proof of knowledge from participant {culprit:?}.")]
    InvalidProofOfKnowledge {
        /// The participant whose proof failed.
        culprit: Identifier,
    },
    /// A secret share failed verification against its VSS commitment.
    #[error("Invalid secret share (culprit: {culprit:?}).")]
    InvalidSecretShare {
        /// The participant whose share failed, when attributable.
        culprit: Option<Identifier>,
    },
    /// A signing commitment is the point at infinity.
    #[error("Identity commitment.")]
    IdentityCommitment,
    /// An identifier present in one input is absent from another.
    #[error("Unknown identifier.")]
    UnknownIdentifier,
    /// The commitment the coordinator listed for this signer does not match
    /// the signer's retained nonces.
    #[error("Invalid commitment.")]
    InvalidCommitment,
    /// A signature share failed individual verification.
    #[error("Invalid signature share from participant {culprit:?}.")]
    InvalidSignatureShare {
        /// The participant whose signature share failed.
        culprit: Identifier,
    },
    /// The aggregated signature failed verification even though every
    /// individual share verified, or a standalone signature check failed.
    #[error("Invalid signature.")]
    InvalidSignature,
    /// A share refresh produced a different group verifying key.
    #[error("Refresh changed the group verifying key.")]
    VerifyingKeyMismatch,
    /// A byte string is not a canonical scalar encoding.
    #[error("Malformed scalar encoding.")]
    MalformedScalar,
    /// A byte string is not a compressed encoding of a group element, or
    /// encodes the identity.
    #[error("Malformed element encoding.")]
    MalformedElement,
}
