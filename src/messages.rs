//! The protocol messages exchanged between participants.
//!
//! Every message pairs a [`Header`] naming the sender and the intended
//! receiver with a [`Payload`] carrying one protocol object. The transport
//! is the caller's concern; this module only pins the canonical shapes and
//! the validation rules a receiver applies before feeding a payload into a
//! round function.

use serde::{Deserialize, Serialize};

use crate::{dkg, keys, signing, Identifier, Signature};

pub mod constants;
mod validate;

#[cfg(test)]
mod tests;

pub use validate::{MsgErr, Validate};

/// The data required to serialize a protocol message.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Routing and version information.
    pub header: Header,
    /// The protocol object being carried.
    pub payload: Payload,
}

/// The common header fields for every message.
///
/// Note: the message type is derived from the `payload` enum variant.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    /// The serialization version.
    pub version: MsgVersion,
    /// Who produced the message.
    pub sender: ParticipantId,
    /// Who the message is addressed to.
    pub receiver: ParticipantId,
}

/// The serializable payload of a message.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub enum Payload {
    /// A dealer-issued secret share, delivered confidentially.
    SecretShare(keys::SecretShare),
    /// A DKG round 1 broadcast: commitment vector plus proof of knowledge.
    DkgRound1(dkg::round1::Package),
    /// A DKG round 2 secret share, delivered confidentially.
    DkgRound2(dkg::round2::Package),
    /// A signer's nonce commitments for one signing session.
    SigningCommitments(signing::SigningCommitments),
    /// The coordinator's collected commitments and message.
    SigningPackage(signing::SigningPackage),
    /// A signer's share of the response scalar.
    SignatureShare(signing::SignatureShare),
    /// The final aggregated signature, broadcast by the coordinator.
    AggregateSignature(Signature),
}

/// The numeric values used to identify the serialization version.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub struct MsgVersion(pub(crate) u8);

/// The role and identity of a message endpoint.
///
/// Signers are named by their protocol [`Identifier`]; the dealer and the
/// signing coordinator have fixed role tags, since neither holds a share.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Debug)]
pub enum ParticipantId {
    /// A share-holding participant.
    Signer(Identifier),
    /// The trusted dealer, when dealer key generation is in use.
    Dealer,
    /// The coordinator that assembles signing packages and aggregates
    /// shares.
    Aggregator,
}

impl ParticipantId {
    /// Whether this endpoint is a share-holding signer.
    pub fn is_signer(&self) -> bool {
        matches!(self, ParticipantId::Signer(_))
    }
}
