use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};

use super::{PreparedVerifyingKey, Proof, VerifyingKey};
use crate::{field::CircuitField, msm::msm, utils::errors::Groth16Error};

pub fn prepare_verifying_key<E: Pairing>(vk: VerifyingKey<E>) -> PreparedVerifyingKey<E> {
    PreparedVerifyingKey {
        alpha_g1_beta_g2: E::pairing(vk.alpha_g1, vk.beta_g2),
        gamma_g2_neg_pc: (-vk.gamma_g2.into_group()).into_affine().into(),
        delta_g2_neg_pc: (-vk.delta_g2.into_group()).into_affine().into(),
        vk,
    }
}

/// Checks `e(A, B) = e(α, β) · e(Σ xᵢ·γ_abcᵢ, γ) · e(C, δ)`.
///
/// Returns `Ok(false)` for a well-formed proof that does not verify; errors only when the public
/// input length does not match the key.
#[tracing::instrument(skip_all, name = "Groth16::verify")]
pub fn verify_with_prepared<E>(
    pvk: &PreparedVerifyingKey<E>,
    public_inputs: &[E::ScalarField],
    proof: &Proof<E>,
) -> Result<bool, Groth16Error>
where
    E: Pairing,
    E::ScalarField: CircuitField,
{
    let gamma_abc = &pvk.vk.gamma_abc_g1;
    if public_inputs.len() + 1 != gamma_abc.len() {
        return Err(Groth16Error::InvalidPublicInputLength {
            expected: pvk.vk.num_public_inputs(),
            actual: public_inputs.len(),
        });
    }
    let acc = msm::<E::G1>(&gamma_abc[1..], public_inputs)? + gamma_abc[0];

    let lhs = E::multi_pairing(
        [proof.a, acc.into_affine(), proof.c],
        [
            E::G2Prepared::from(proof.b),
            pvk.gamma_g2_neg_pc.clone(),
            pvk.delta_g2_neg_pc.clone(),
        ],
    );
    let valid = lhs == pvk.alpha_g1_beta_g2;
    tracing::debug!(valid, "Groth16 verification");
    Ok(valid)
}

pub fn verify<E>(
    vk: &VerifyingKey<E>,
    public_inputs: &[E::ScalarField],
    proof: &Proof<E>,
) -> Result<bool, Groth16Error>
where
    E: Pairing,
    E::ScalarField: CircuitField,
{
    verify_with_prepared(&prepare_verifying_key(vk.clone()), public_inputs, proof)
}

/// [`verify`], with a failed check reported as [`Groth16Error::VerificationFailed`].
pub fn ensure_valid<E>(
    vk: &VerifyingKey<E>,
    public_inputs: &[E::ScalarField],
    proof: &Proof<E>,
) -> Result<(), Groth16Error>
where
    E: Pairing,
    E::ScalarField: CircuitField,
{
    if verify(vk, public_inputs, proof)? {
        Ok(())
    } else {
        Err(Groth16Error::VerificationFailed)
    }
}
