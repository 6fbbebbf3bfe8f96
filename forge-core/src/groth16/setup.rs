use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, One, Zero};
use ark_poly::EvaluationDomain;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{
    qap::{domain_for, evaluate_at},
    ProvingKey, VerifyingKey,
};
use crate::{
    field::CircuitField,
    msm::batch_mul,
    r1cs::R1CS,
    utils::{
        errors::{CircuitError, Groth16Error},
        math::Math,
    },
};

/// Toxic waste. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Trapdoor<F: Field> {
    alpha: F,
    beta: F,
    gamma: F,
    delta: F,
    tau: F,
}

impl<F: CircuitField> Trapdoor<F> {
    fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            alpha: F::random_nonzero(rng),
            beta: F::random_nonzero(rng),
            gamma: F::random_nonzero(rng),
            delta: F::random_nonzero(rng),
            tau: F::random(rng),
        }
    }
}

/// Circuit-specific trusted setup.
#[tracing::instrument(skip_all, name = "Groth16::setup")]
pub fn setup<E, R>(
    r1cs: &R1CS<E::ScalarField>,
    rng: &mut R,
) -> Result<(ProvingKey<E>, VerifyingKey<E>), Groth16Error>
where
    E: Pairing,
    E::ScalarField: CircuitField,
    R: RngCore + CryptoRng,
{
    r1cs.validate()?;
    let domain = domain_for(r1cs)?;
    let mut trapdoor = Trapdoor::sample(rng);
    // τ on the domain would make t(τ) = 0.
    while domain.evaluate_vanishing_polynomial(trapdoor.tau).is_zero() {
        trapdoor.tau = E::ScalarField::random(rng);
    }
    let Trapdoor {
        alpha,
        beta,
        gamma,
        delta,
        tau,
    } = &trapdoor;

    let qap = evaluate_at(r1cs, &domain, *tau);
    let degenerate = || CircuitError::InvalidCircuitState("zero trapdoor element".to_string());
    let mut gamma_inv = gamma.inverse().ok_or_else(degenerate)?;
    let mut delta_inv = delta.inverse().ok_or_else(degenerate)?;

    let num_instance = r1cs.num_instance_variables();
    // Everything below is derived from the trapdoor and is wiped on drop.
    let combined: Zeroizing<Vec<E::ScalarField>> = Zeroizing::new(
        (0..r1cs.num_variables)
            .map(|i| *beta * qap.a[i] + *alpha * qap.b[i] + qap.c[i])
            .collect(),
    );
    let gamma_abc: Zeroizing<Vec<E::ScalarField>> = Zeroizing::new(
        combined[..num_instance]
            .iter()
            .map(|v| *v * gamma_inv)
            .collect(),
    );
    let l: Zeroizing<Vec<E::ScalarField>> = Zeroizing::new(
        combined[num_instance..]
            .iter()
            .map(|v| *v * delta_inv)
            .collect(),
    );

    let mut zt_over_delta = qap.zt * delta_inv;
    let mut h = Zeroizing::new(Vec::with_capacity(domain.size() - 1));
    let mut tau_k = E::ScalarField::one();
    for _ in 0..domain.size() - 1 {
        h.push(tau_k * zt_over_delta);
        tau_k *= tau;
    }
    for scalar in [&mut tau_k, &mut zt_over_delta, &mut gamma_inv, &mut delta_inv] {
        scalar.zeroize();
    }

    let g1 = E::G1Affine::generator().into_group();
    let g2 = E::G2Affine::generator().into_group();

    let vk = VerifyingKey::<E> {
        alpha_g1: (g1 * *alpha).into_affine(),
        beta_g2: (g2 * *beta).into_affine(),
        gamma_g2: (g2 * *gamma).into_affine(),
        delta_g2: (g2 * *delta).into_affine(),
        gamma_abc_g1: batch_mul(g1, &gamma_abc),
        shape_digest: r1cs.shape_digest()?,
    };
    let pk = ProvingKey {
        vk: vk.clone(),
        beta_g1: (g1 * *beta).into_affine(),
        delta_g1: (g1 * *delta).into_affine(),
        a_query: batch_mul(g1, &qap.a),
        b_g1_query: batch_mul(g1, &qap.b),
        b_g2_query: batch_mul(g2, &qap.b),
        h_query: batch_mul(g1, &h),
        l_query: batch_mul(g1, &l),
    };
    tracing::info!(
        log_domain_size = domain.size().log_2(),
        public_inputs = r1cs.num_public_inputs,
        "generated Groth16 keys"
    );
    Ok((pk, vk))
}
