//! Polynomial evaluation and Lagrange interpolation over the scalar field.
//!
//! These routines define the algebraic identities the rest of the protocol
//! rests on: shares are polynomial evaluations, verifying shares are the
//! same evaluations in the exponent, and reconstruction is interpolation at
//! zero.

use std::collections::BTreeSet;

use k256::elliptic_curve::Field;
use k256::Scalar;
use rand_core::{CryptoRng, RngCore};

use crate::error::Error;
use crate::group;
use crate::identifier::Identifier;

/// Evaluate f(x) = Σ cₖ·xᵏ at `x = identifier` by Horner's method.
///
/// `coefficients[0]` is the constant term. An empty coefficient vector
/// evaluates to zero.
pub fn evaluate_polynomial(identifier: &Identifier, coefficients: &[Scalar]) -> Scalar {
    let x = identifier.to_scalar();
    let mut value = Scalar::ZERO;
    for coefficient in coefficients.iter().rev() {
        value = value * x + *coefficient;
    }
    value
}

/// Compute the Lagrange coefficient λᵢ(0) = Π_{j≠i} xⱼ · (xⱼ − xᵢ)⁻¹ for
/// `identifier` over the signer set `identifiers`.
///
/// Fails with [`Error::DuplicatedIdentifier`] if the set contains
/// duplicates, and [`Error::UnknownIdentifier`] if `identifier` is not a
/// member.
pub fn lagrange_coeff_at_zero(
    identifier: &Identifier,
    identifiers: &[Identifier],
) -> Result<Scalar, Error> {
    let mut seen = BTreeSet::new();
    for id in identifiers {
        if !seen.insert(id) {
            return Err(Error::DuplicatedIdentifier);
        }
    }

    let mut found = false;
    let mut num = Scalar::ONE;
    let mut den = Scalar::ONE;
    for j in identifiers {
        if j == identifier {
            found = true;
            continue;
        }
        num *= j.to_scalar();
        den *= j.to_scalar() - identifier.to_scalar();
    }
    if !found {
        return Err(Error::UnknownIdentifier);
    }

    // With distinct non-zero identifiers the denominator cannot vanish.
    let inverse = Option::<Scalar>::from(den.invert()).ok_or(Error::DuplicatedIdentifier)?;
    Ok(num * inverse)
}

/// Generate `count` fresh random non-zero coefficients.
pub fn generate_coefficients<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<Scalar> {
    (0..count)
        .map(|_| group::random_nonzero_scalar(rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::thread_rng;

    fn ids(values: &[u16]) -> Vec<Identifier> {
        values
            .iter()
            .map(|v| Identifier::try_from(*v).unwrap())
            .collect()
    }

    #[test]
    fn empty_polynomial_evaluates_to_zero() {
        let id = Identifier::try_from(123u16).unwrap();
        assert_eq!(evaluate_polynomial(&id, &[]), Scalar::ZERO);
    }

    #[test]
    fn constant_polynomial() {
        let id = Identifier::try_from(123u16).unwrap();
        let c0 = group::random_nonzero_scalar(&mut thread_rng());
        assert_eq!(evaluate_polynomial(&id, &[c0]), c0);
    }

    #[test]
    fn horner_matches_naive_power_sum() {
        let mut rng = thread_rng();
        for degree in 1..=5 {
            let coefficients = generate_coefficients(degree + 1, &mut rng);
            for id in ids(&[1, 2, 4, 7, 8]) {
                let x = id.to_scalar();
                let mut x_pow = Scalar::ONE;
                let mut naive = Scalar::ZERO;
                for coefficient in &coefficients {
                    naive += *coefficient * x_pow;
                    x_pow *= x;
                }
                assert_eq!(evaluate_polynomial(&id, &coefficients), naive);
            }
        }
    }

    #[test]
    fn lagrange_is_permutation_invariant() {
        let forward = ids(&[1, 2, 4, 7]);
        let backward = ids(&[7, 4, 2, 1]);
        for id in &forward {
            assert_eq!(
                lagrange_coeff_at_zero(id, &forward).unwrap(),
                lagrange_coeff_at_zero(id, &backward).unwrap(),
            );
        }
    }

    #[test]
    fn lagrange_rejects_malformed_sets() {
        let set = ids(&[1, 2, 2]);
        let member = Identifier::try_from(1u16).unwrap();
        assert_eq!(
            lagrange_coeff_at_zero(&member, &set),
            Err(Error::DuplicatedIdentifier)
        );

        let set = ids(&[1, 2, 3]);
        let stranger = Identifier::try_from(9u16).unwrap();
        assert_eq!(
            lagrange_coeff_at_zero(&stranger, &set),
            Err(Error::UnknownIdentifier)
        );
    }
}
