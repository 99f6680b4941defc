//! Feldman commitments to secret polynomials.

use k256::elliptic_curve::Field;
use k256::{ProjectivePoint, Scalar};

use crate::error::Error;
use crate::group;
use crate::identifier::Identifier;
use crate::keys::{VerifyingKey, VerifyingShare};

/// A commitment φₖ = g^{aₖ} to a single coefficient of a secret polynomial.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct CoefficientCommitment(pub(crate) ProjectivePoint);

impl CoefficientCommitment {
    /// The committed group element.
    pub fn value(&self) -> ProjectivePoint {
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

/// The ordered commitment vector `[φ₀, …, φ_{t−1}]` to a dealer polynomial.
///
/// Participants use this vector to check that their secret share lies on the
/// committed polynomial, without learning anything else about it. Note that
/// all participants MUST be assured they hold the *same* commitment vector,
/// either by pairwise comparison or by an agreed-upon broadcast channel.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VerifiableSecretSharingCommitment(pub(crate) Vec<CoefficientCommitment>);

impl VerifiableSecretSharingCommitment {
    /// Commit to every coefficient of `coefficients` in order.
    pub(crate) fn from_coefficients(coefficients: &[Scalar]) -> Self {
        Self(
            coefficients
                .iter()
                .map(|coefficient| CoefficientCommitment(ProjectivePoint::GENERATOR * *coefficient))
                .collect(),
        )
    }

    /// Evaluate the committed polynomial in the exponent: Σₖ φₖ·idᵏ, with a
    /// running power of `identifier`.
    pub(crate) fn evaluate(&self, identifier: &Identifier) -> ProjectivePoint {
        let x = identifier.to_scalar();
        let mut x_pow = Scalar::ONE;
        let mut value = ProjectivePoint::IDENTITY;
        for commitment in &self.0 {
            value += commitment.0 * x_pow;
            x_pow *= x;
        }
        value
    }

    /// The constant-term commitment φ₀ interpreted as the group verifying
    /// key.
    pub(crate) fn verifying_key(&self) -> Result<VerifyingKey, Error> {
        self.0
            .first()
            .map(|commitment| VerifyingKey {
                element: commitment.0,
            })
            .ok_or(Error::InvalidCommitmentVector)
    }

    /// The verifying share for `identifier`, i.e. the committed polynomial
    /// evaluated at that point.
    pub(crate) fn verifying_share(&self, identifier: &Identifier) -> VerifyingShare {
        VerifyingShare(self.evaluate(identifier))
    }

    /// Element-wise sum of several participants' commitment vectors, as used
    /// to form the group commitment after a DKG.
    pub(crate) fn sum<'a>(
        commitments: impl IntoIterator<Item = &'a VerifiableSecretSharingCommitment>,
    ) -> Result<Self, Error> {
        let mut commitments = commitments.into_iter();
        let first = commitments.next().ok_or(Error::IncorrectNumberOfCommitments)?;
        let mut group: Vec<ProjectivePoint> =
            first.0.iter().map(|commitment| commitment.0).collect();
        for vector in commitments {
            if vector.0.len() != group.len() {
                return Err(Error::IncorrectNumberOfCommitments);
            }
            for (sum, commitment) in group.iter_mut().zip(vector.0.iter()) {
                *sum += commitment.0;
            }
        }
        Ok(Self(group.into_iter().map(CoefficientCommitment).collect()))
    }

    /// The number of committed coefficients, i.e. the threshold `t`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector is empty. An empty vector is never valid on the
    /// wire.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize each coefficient commitment in order.
    pub fn serialize(&self) -> Result<Vec<[u8; 33]>, Error> {
        self.0.iter().map(|commitment| commitment.serialize()).collect()
    }

    /// Deserialize from an ordered list of compressed points.
    pub fn deserialize(parts: &[impl AsRef<[u8]>]) -> Result<Self, Error> {
        if parts.is_empty() {
            return Err(Error::InvalidCommitmentVector);
        }
        parts
            .iter()
            .map(|part| CoefficientCommitment::deserialize(part.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
