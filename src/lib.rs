#![deny(missing_docs)]

//! An implementation of FROST (Flexible Round-Optimized Schnorr Threshold)
//! signatures over the secp256k1 curve, with a BIP340-flavored challenge
//! encoding.
//!
//! A group of `max_signers` participants jointly controls a single verifying
//! key; any `min_signers` of them (and no fewer) can produce a standard
//! Schnorr signature for it. Key material can be created either by a trusted
//! dealer ([`keys::generate_with_dealer`]) or with no dealer at all via the
//! three-round distributed key generation protocol in [`dkg`]. Long-lived
//! shares can be proactively rotated with the refresh variant of the DKG
//! while the group verifying key stays fixed.
//!
//! This crate implements only the cryptographic core. Callers provide the
//! transport: an authenticated broadcast channel for round-1 packages and
//! signing commitments, and a confidential per-recipient channel for round-2
//! secret shares. The [`messages`] module defines the canonical wire shapes
//! and their validation rules, but moving them is the caller's business.

mod commitment;
pub mod dkg;
mod error;
mod group;
mod hash;
mod identifier;
pub mod keys;
#[cfg(feature = "serde")]
pub mod messages;
pub mod polynomial;
#[cfg(feature = "serde")]
mod serialize;
mod signature;
pub mod signing;

pub use commitment::{CoefficientCommitment, VerifiableSecretSharingCommitment};
pub use error::Error;
pub use identifier::Identifier;
pub use keys::{
    KeyPackage, PublicKeyPackage, SecretShare, SigningKey, SigningShare, VerifyingKey,
    VerifyingShare,
};
pub use signature::Signature;
pub use signing::{SignatureShare, SigningCommitments, SigningNonces, SigningPackage};
