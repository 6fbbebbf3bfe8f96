//! Groth16 over an arbitrary pairing whose scalar field is a [`CircuitField`].
//!
//! The QAP carries one extra `A` row per instance column (`A[m + i][i] = 1`) so the instance
//! polynomials are linearly independent. Keys are bound to the SHA3 digest of the constraint
//! system they were generated for.

use ark_ec::pairing::{Pairing, PairingOutput};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::utils::errors::Groth16Error;

pub mod prover;
pub mod qap;
pub mod setup;
pub mod verifier;


pub use prover::prove;
pub use setup::setup;
pub use verifier::{ensure_valid, prepare_verifying_key, verify, verify_with_prepared};

/// `(A, B, C)`: two G1 points and one G2 point.
#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Proof<E: Pairing> {
    pub a: E::G1Affine,
    pub b: E::G2Affine,
    pub c: E::G1Affine,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingKey<E: Pairing> {
    pub alpha_g1: E::G1Affine,
    pub beta_g2: E::G2Affine,
    pub gamma_g2: E::G2Affine,
    pub delta_g2: E::G2Affine,
    /// `(β·u_i(τ) + α·v_i(τ) + w_i(τ)) / γ` for the instance columns, constant first.
    pub gamma_abc_g1: Vec<E::G1Affine>,
    pub shape_digest: [u8; 32],
}

impl<E: Pairing> VerifyingKey<E> {
    /// Public inputs this key expects, constant excluded.
    pub fn num_public_inputs(&self) -> usize {
        self.gamma_abc_g1.len().saturating_sub(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ProvingKey<E: Pairing> {
    pub vk: VerifyingKey<E>,
    pub beta_g1: E::G1Affine,
    pub delta_g1: E::G1Affine,
    /// `u_i(τ)` for every column.
    pub a_query: Vec<E::G1Affine>,
    /// `v_i(τ)` for every column, in both groups.
    pub b_g1_query: Vec<E::G1Affine>,
    pub b_g2_query: Vec<E::G2Affine>,
    /// `τ^k · t(τ) / δ` for `k < n - 1`.
    pub h_query: Vec<E::G1Affine>,
    /// `(β·u_i(τ) + α·v_i(τ) + w_i(τ)) / δ` for the witness columns.
    pub l_query: Vec<E::G1Affine>,
}

/// Verifying key with `e(α, β)` and the negated G2 elements precomputed.
#[derive(Clone, Debug)]
pub struct PreparedVerifyingKey<E: Pairing> {
    pub vk: VerifyingKey<E>,
    pub alpha_g1_beta_g2: PairingOutput<E>,
    pub gamma_g2_neg_pc: E::G2Prepared,
    pub delta_g2_neg_pc: E::G2Prepared,
}

impl<E: Pairing> From<VerifyingKey<E>> for PreparedVerifyingKey<E> {
    fn from(vk: VerifyingKey<E>) -> Self {
        prepare_verifying_key(vk)
    }
}

/// Compressed canonical encoding. Decoding validates curve and subgroup membership.
pub trait ByteEncoding: CanonicalSerialize + CanonicalDeserialize {
    fn to_bytes(&self) -> Result<Vec<u8>, Groth16Error> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        Ok(bytes)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Groth16Error> {
        Ok(Self::deserialize_compressed(bytes)?)
    }
}

impl<E: Pairing> ByteEncoding for Proof<E> {}
impl<E: Pairing> ByteEncoding for VerifyingKey<E> {}
impl<E: Pairing> ByteEncoding for ProvingKey<E> {}
impl<F: crate::field::CircuitField> ByteEncoding for crate::r1cs::R1CS<F> {}
