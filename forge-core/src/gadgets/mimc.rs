//! MiMC-7 over the circuit field, with a Miyaguchi–Preneel compression on top.
//!
//! Each round computes `m ← (m + k + cᵢ)^7`; the permutation ends with `m + k`. Hashing absorbs
//! one element at a time: `h ← E_h(x) + h + x`, starting from `h = 0`. In a circuit every round
//! costs four multiplications (`t²`, `t⁴`, `t⁶`, `t⁷`).

use sha3::{Digest, Sha3_256};

use crate::{
    field::CircuitField,
    r1cs::{CircuitBuilder, LC},
    utils::errors::CircuitError,
};

pub const DEFAULT_SEED: &str = "seed";
pub const NUM_ROUNDS: usize = 91;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiMC<F: CircuitField> {
    constants: Vec<F>,
}

impl<F: CircuitField> Default for MiMC<F> {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl<F: CircuitField> MiMC<F> {
    pub fn new(seed: &str) -> Self {
        Self::with_rounds(seed, NUM_ROUNDS)
    }

    /// Round constants are `SHA3-256` iterated from the seed, each digest read big-endian and
    /// reduced into the field. The seed's own digest is skipped.
    pub fn with_rounds(seed: &str, rounds: usize) -> Self {
        let mut digest = Sha3_256::digest(seed.as_bytes());
        let constants = (0..rounds)
            .map(|_| {
                digest = Sha3_256::digest(digest);
                F::from_be_bytes_mod_order(&digest)
            })
            .collect();
        Self { constants }
    }

    pub fn constants(&self) -> &[F] {
        &self.constants
    }

    pub fn num_rounds(&self) -> usize {
        self.constants.len()
    }

    pub fn encrypt(&self, key: F, message: F) -> F {
        let mut m = message;
        for c in &self.constants {
            let t = m + key + c;
            let t2 = t.square();
            let t4 = t2.square();
            m = t4 * t2 * t;
        }
        m + key
    }

    pub fn hash(&self, inputs: &[F]) -> F {
        inputs.iter().fold(F::zero(), |h, x| self.encrypt(h, *x) + h + x)
    }

    /// Hashes `bytes` as big-endian 32-byte chunks, each reduced into the field. The last chunk
    /// may be shorter.
    pub fn hash_bytes(&self, bytes: &[u8]) -> F {
        let chunks: Vec<F> = bytes
            .chunks(32)
            .map(F::from_be_bytes_mod_order)
            .collect();
        self.hash(&chunks)
    }

    pub fn encrypt_gadget(
        &self,
        api: &mut CircuitBuilder<F>,
        key: LC<F>,
        message: LC<F>,
    ) -> Result<LC<F>, CircuitError> {
        let mut m = message;
        for c in &self.constants {
            let t = m + key.clone() + LC::constant(*c);
            let t2 = api.square(t.clone())?;
            let t4 = api.square(t2)?;
            let t6 = api.mul(t4, t2)?;
            m = api.mul(t6, t)?.into();
        }
        Ok(m + key)
    }

    pub fn hash_gadget(
        &self,
        api: &mut CircuitBuilder<F>,
        inputs: &[LC<F>],
    ) -> Result<LC<F>, CircuitError> {
        let mut h = LC::zero();
        for x in inputs {
            let e = self.encrypt_gadget(api, h.clone(), x.clone())?;
            h = e + h + x.clone();
        }
        Ok(h)
    }
}
