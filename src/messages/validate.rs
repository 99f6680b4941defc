//! Validation rules applied to incoming messages before their payloads are
//! handed to a round function.

use thiserror::Error;

use super::constants::{BASIC_FROST_SERIALIZATION, MAX_PROTOCOL_MESSAGE_LEN};
use super::*;

/// Checks an object against the rules it must satisfy on receipt.
pub trait Validate {
    /// Validate, returning the object for chaining on success.
    fn validate(&self) -> Result<&Self, MsgErr>;
}

impl Validate for Message {
    fn validate(&self) -> Result<&Self, MsgErr> {
        self.header.validate()?;
        self.payload.validate()?;

        match self.payload {
            Payload::SecretShare(_) => {
                if self.header.sender != ParticipantId::Dealer {
                    return Err(MsgErr::SenderMustBeDealer);
                }
                if !self.header.receiver.is_signer() {
                    return Err(MsgErr::ReceiverMustBeSigner);
                }
            }
            Payload::DkgRound1(_) | Payload::DkgRound2(_) => {
                if !self.header.sender.is_signer() {
                    return Err(MsgErr::SenderMustBeSigner);
                }
                if !self.header.receiver.is_signer() {
                    return Err(MsgErr::ReceiverMustBeSigner);
                }
            }
            Payload::SigningCommitments(_) | Payload::SignatureShare(_) => {
                if !self.header.sender.is_signer() {
                    return Err(MsgErr::SenderMustBeSigner);
                }
                if self.header.receiver != ParticipantId::Aggregator {
                    return Err(MsgErr::ReceiverMustBeAggregator);
                }
            }
            Payload::SigningPackage(_) | Payload::AggregateSignature(_) => {
                if self.header.sender != ParticipantId::Aggregator {
                    return Err(MsgErr::SenderMustBeAggregator);
                }
                if !self.header.receiver.is_signer() {
                    return Err(MsgErr::ReceiverMustBeSigner);
                }
            }
        }

        Ok(self)
    }
}

impl Validate for Header {
    fn validate(&self) -> Result<&Self, MsgErr> {
        // Only one serialization version is defined so far.
        if self.version != BASIC_FROST_SERIALIZATION {
            return Err(MsgErr::WrongVersion);
        }

        if self.sender == self.receiver {
            return Err(MsgErr::SameSenderAndReceiver);
        }
        Ok(self)
    }
}

impl Validate for Payload {
    fn validate(&self) -> Result<&Self, MsgErr> {
        match self {
            Payload::DkgRound1(package) => {
                if package.commitment().is_empty() {
                    return Err(MsgErr::EmptyCommitmentVector);
                }
            }
            Payload::SigningPackage(signing_package) => {
                if signing_package.message().len() > MAX_PROTOCOL_MESSAGE_LEN {
                    return Err(MsgErr::MsgTooBig);
                }
                if signing_package.signing_commitments().is_empty() {
                    return Err(MsgErr::EmptyCommitmentList);
                }
            }
            _ => {}
        }

        Ok(self)
    }
}

/// The error a message can produce if it fails validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MsgErr {
    /// Unsupported serialization version.
    #[error("wrong version number")]
    WrongVersion,
    /// A message may not be addressed to its own sender.
    #[error("sender and receiver are the same")]
    SameSenderAndReceiver,
    /// Dealer shares must come from the dealer.
    #[error("the sender of this message must be the dealer")]
    SenderMustBeDealer,
    /// This payload is only meaningful when addressed to a signer.
    #[error("the receiver of this message must be a signer")]
    ReceiverMustBeSigner,
    /// This payload is only meaningful when produced by a signer.
    #[error("the sender of this message must be a signer")]
    SenderMustBeSigner,
    /// This payload is only meaningful when addressed to the aggregator.
    #[error("the receiver of this message must be the aggregator")]
    ReceiverMustBeAggregator,
    /// This payload is only meaningful when produced by the aggregator.
    #[error("the sender of this message must be the aggregator")]
    SenderMustBeAggregator,
    /// The message to be signed exceeds the protocol cap.
    #[error("the message is too big")]
    MsgTooBig,
    /// A round 1 package must commit to at least one coefficient.
    #[error("the commitment vector is empty")]
    EmptyCommitmentVector,
    /// A signing package must select at least one signer.
    #[error("the commitment list is empty")]
    EmptyCommitmentList,
}
