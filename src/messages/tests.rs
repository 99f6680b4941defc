use std::collections::BTreeMap;

use rand::thread_rng;

use super::constants::BASIC_FROST_SERIALIZATION;
use super::*;
use crate::keys::generate_with_dealer;
use crate::signing::SigningNonces;
use crate::SigningPackage;

fn signer(n: u16) -> ParticipantId {
    ParticipantId::Signer(Identifier::try_from(n).unwrap())
}

fn header(sender: ParticipantId, receiver: ParticipantId) -> Header {
    Header {
        version: BASIC_FROST_SERIALIZATION,
        sender,
        receiver,
    }
}

/// Build a message around a real signing package for two dealer-generated
/// signers.
fn sample_signing_package() -> SigningPackage {
    let mut rng = thread_rng();
    let (shares, _) = generate_with_dealer(3, 2, &mut rng).unwrap();

    let mut commitments = BTreeMap::new();
    for (identifier, share) in shares.iter().take(2) {
        let nonces = SigningNonces::new(share.signing_share(), &mut rng);
        commitments.insert(*identifier, *nonces.commitments());
    }
    SigningPackage::new(commitments, b"message to sign")
}

#[test]
fn validate_header() {
    let ok = header(signer(1), signer(2));
    assert!(ok.validate().is_ok());

    let bad_version = Header {
        version: MsgVersion(1),
        ..ok
    };
    assert_eq!(bad_version.validate().err(), Some(MsgErr::WrongVersion));

    let self_addressed = header(signer(1), signer(1));
    assert_eq!(
        self_addressed.validate().err(),
        Some(MsgErr::SameSenderAndReceiver)
    );
}

#[test]
fn validate_signing_package_roles() {
    let payload = Payload::SigningPackage(sample_signing_package());

    let ok = Message {
        header: header(ParticipantId::Aggregator, signer(1)),
        payload: payload.clone(),
    };
    assert!(ok.validate().is_ok());

    let wrong_sender = Message {
        header: header(signer(2), signer(1)),
        payload,
    };
    assert_eq!(
        wrong_sender.validate().err(),
        Some(MsgErr::SenderMustBeAggregator)
    );
}

#[test]
fn validate_dealer_share_roles() {
    let mut rng = thread_rng();
    let (shares, _) = generate_with_dealer(3, 2, &mut rng).unwrap();
    let share = shares.values().next().unwrap().clone();

    let ok = Message {
        header: header(ParticipantId::Dealer, signer(1)),
        payload: Payload::SecretShare(share.clone()),
    };
    assert!(ok.validate().is_ok());

    let from_signer = Message {
        header: header(signer(2), signer(1)),
        payload: Payload::SecretShare(share),
    };
    assert_eq!(
        from_signer.validate().err(),
        Some(MsgErr::SenderMustBeDealer)
    );
}

#[test]
fn signing_package_message_round_trips_json_and_bincode() {
    let message = Message {
        header: header(ParticipantId::Aggregator, signer(1)),
        payload: Payload::SigningPackage(sample_signing_package()),
    };

    let json = serde_json::to_string(&message).unwrap();
    let from_json: Message = serde_json::from_str(&json).unwrap();
    assert_eq!(from_json, message);

    let bytes = bincode::serialize(&message).unwrap();
    let from_bincode: Message = bincode::deserialize(&bytes).unwrap();
    assert_eq!(from_bincode, message);
}

#[test]
fn dkg_round1_message_round_trips() {
    let mut rng = thread_rng();
    let identifier = Identifier::try_from(1u16).unwrap();
    let key = crate::SigningKey::new(&mut rng);
    let (_, package) = crate::dkg::part1(identifier, 3, 2, &key, &mut rng).unwrap();

    let message = Message {
        header: header(signer(1), signer(2)),
        payload: Payload::DkgRound1(package),
    };
    assert!(message.validate().is_ok());

    let bytes = bincode::serialize(&message).unwrap();
    let parsed: Message = bincode::deserialize(&bytes).unwrap();
    assert_eq!(parsed, message);
}
