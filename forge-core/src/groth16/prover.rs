use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use rand_core::{CryptoRng, RngCore};

use super::{qap, Proof, ProvingKey};
use crate::{
    field::CircuitField,
    msm::msm,
    r1cs::{Witness, R1CS},
    utils::errors::{CircuitError, Groth16Error},
};

/// Proves knowledge of `witness` for `r1cs` under `pk`.
///
/// The witness is checked against every constraint before any group operation, so an
/// unsatisfying witness never yields a proof.
#[tracing::instrument(skip_all, name = "Groth16::prove")]
pub fn prove<E, R>(
    pk: &ProvingKey<E>,
    r1cs: &R1CS<E::ScalarField>,
    witness: &Witness<E::ScalarField>,
    rng: &mut R,
) -> Result<Proof<E>, Groth16Error>
where
    E: Pairing,
    E::ScalarField: CircuitField,
    R: RngCore + CryptoRng,
{
    if r1cs.shape_digest()? != pk.vk.shape_digest {
        return Err(Groth16Error::ShapeMismatch);
    }
    r1cs.is_satisfied(witness).map_err(|err| match err {
        CircuitError::UnsatisfiedConstraint { row } => {
            Groth16Error::WitnessConstraintViolation { row }
        }
        err => Groth16Error::Circuit(err),
    })?;

    let domain = qap::domain_for(r1cs)?;
    let w = witness.values();
    let h = qap::witness_map(r1cs, &domain, w)?;

    let r = E::ScalarField::random(rng);
    let s = E::ScalarField::random(rng);

    let ((a_acc, b1_acc), (b2_acc, (h_acc, l_acc))) = rayon::join(
        || {
            rayon::join(
                || msm::<E::G1>(&pk.a_query, w),
                || msm::<E::G1>(&pk.b_g1_query, w),
            )
        },
        || {
            rayon::join(
                || msm::<E::G2>(&pk.b_g2_query, w),
                || {
                    rayon::join(
                        || msm::<E::G1>(&pk.h_query, &h),
                        || msm::<E::G1>(&pk.l_query, &w[r1cs.num_instance_variables()..]),
                    )
                },
            )
        },
    );

    let delta_g1 = pk.delta_g1.into_group();
    let a = a_acc? + pk.vk.alpha_g1 + delta_g1 * r;
    let b1 = b1_acc? + pk.beta_g1 + delta_g1 * s;
    let b2 = b2_acc? + pk.vk.beta_g2 + pk.vk.delta_g2.into_group() * s;
    let c = h_acc? + l_acc? + a * s + b1 * r - delta_g1 * (r * s);

    tracing::debug!("Groth16 proof assembled");
    Ok(Proof {
        a: a.into_affine(),
        b: b2.into_affine(),
        c: c.into_affine(),
    })
}
