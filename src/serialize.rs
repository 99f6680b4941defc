//! Serde representations for the protocol types.
//!
//! Scalars and group elements travel as lowercase hex strings of their
//! canonical encodings (32 bytes big-endian, 33 bytes SEC1 compressed), so
//! the same shapes work for JSON transports and compact binary codecs
//! alike. Composite packages derive their implementations from these leaf
//! encodings.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{self, Serialize, Serializer};

use crate::commitment::{CoefficientCommitment, VerifiableSecretSharingCommitment};
use crate::dkg::ProofOfKnowledge;
use crate::group;
use crate::identifier::Identifier;
use crate::keys::{SigningShare, VerifyingKey, VerifyingShare};
use crate::signature::Signature;
use crate::signing::{SignatureShare, SigningCommitments};

fn hex_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let string = String::deserialize(deserializer)?;
    hex::decode(&string).map_err(de::Error::custom)
}

/// Implements string-hex serde for a type with canonical
/// `serialize`/`deserialize` byte methods.
macro_rules! impl_hex_serde {
    ($type:ty) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&hex::encode(self.serialize()))
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let bytes = hex_string(deserializer)?;
                <$type>::deserialize(&bytes).map_err(de::Error::custom)
            }
        }
    };
    ($type:ty, fallible) => {
        impl Serialize for $type {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let bytes = self.serialize().map_err(ser::Error::custom)?;
                serializer.serialize_str(&hex::encode(bytes))
            }
        }

        impl<'de> Deserialize<'de> for $type {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let bytes = hex_string(deserializer)?;
                <$type>::deserialize(&bytes).map_err(de::Error::custom)
            }
        }
    };
}

impl_hex_serde!(Identifier);
impl_hex_serde!(SigningShare);
impl_hex_serde!(SignatureShare);
impl_hex_serde!(CoefficientCommitment, fallible);
impl_hex_serde!(VerifyingShare, fallible);
impl_hex_serde!(VerifyingKey, fallible);

impl Serialize for VerifiableSecretSharingCommitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VerifiableSecretSharingCommitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coefficients = Vec::<CoefficientCommitment>::deserialize(deserializer)?;
        if coefficients.is_empty() {
            return Err(de::Error::custom(crate::Error::InvalidCommitmentVector));
        }
        Ok(Self(coefficients))
    }
}

/// The `{R, z}` wire shape shared by signatures and proofs of knowledge.
#[derive(serde::Serialize, serde::Deserialize)]
struct RzHelper {
    #[serde(rename = "R")]
    r: String,
    z: String,
}

impl RzHelper {
    fn encode(
        r: &k256::ProjectivePoint,
        z: &k256::Scalar,
    ) -> Result<Self, crate::Error> {
        Ok(Self {
            r: hex::encode(group::serialize_element(r)?),
            z: hex::encode(group::serialize_scalar(z)),
        })
    }

    fn decode(&self) -> Result<(k256::ProjectivePoint, k256::Scalar), crate::Error> {
        let r_bytes = hex::decode(&self.r).map_err(|_| crate::Error::MalformedElement)?;
        let z_bytes = hex::decode(&self.z).map_err(|_| crate::Error::MalformedScalar)?;
        Ok((
            group::deserialize_element(&r_bytes)?,
            group::deserialize_scalar(&z_bytes)?,
        ))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RzHelper::encode(&self.r, &self.z)
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (r, z) = RzHelper::deserialize(deserializer)?
            .decode()
            .map_err(de::Error::custom)?;
        Ok(Signature { r, z })
    }
}

impl Serialize for ProofOfKnowledge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RzHelper::encode(&self.r, &self.z)
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProofOfKnowledge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (r, z) = RzHelper::deserialize(deserializer)?
            .decode()
            .map_err(de::Error::custom)?;
        Ok(ProofOfKnowledge { r, z })
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct SigningCommitmentsHelper {
    hiding: String,
    binding: String,
}

impl Serialize for SigningCommitments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SigningCommitmentsHelper {
            hiding: hex::encode(group::serialize_element(&self.hiding).map_err(ser::Error::custom)?),
            binding: hex::encode(
                group::serialize_element(&self.binding).map_err(ser::Error::custom)?,
            ),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SigningCommitments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let helper = SigningCommitmentsHelper::deserialize(deserializer)?;
        let hiding = hex::decode(&helper.hiding).map_err(de::Error::custom)?;
        let binding = hex::decode(&helper.binding).map_err(de::Error::custom)?;
        Ok(SigningCommitments {
            hiding: group::deserialize_element(&hiding).map_err(de::Error::custom)?,
            binding: group::deserialize_element(&binding).map_err(de::Error::custom)?,
        })
    }
}

/// Hex encoding for raw message bytes, used via `#[serde(with = ...)]`.
pub(crate) mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        hex_string(deserializer)
    }
}
