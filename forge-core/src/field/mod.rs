use ark_ff::PrimeField;
use ark_std::rand::RngCore;

/// Scalar field of the proving curve, as seen by the circuit layer.
///
/// The arithmetic itself comes from `ark_ff`; this trait only adds the
/// integer conversions and bit access the gate builder and solver need.
pub trait CircuitField: PrimeField {
    /// Number of bytes occupied by a single field element.
    const NUM_BYTES: usize;

    fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self;

    /// Samples until a non-zero element comes out.
    fn random_nonzero<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        loop {
            let value = Self::random(rng);
            if !value.is_zero() {
                return value;
            }
        }
    }

    fn from_i64(val: i64) -> Self;

    /// Little-endian bits of the canonical representative, truncated or
    /// zero-padded to exactly `n` entries.
    fn to_bits_le(&self, n: usize) -> Vec<bool>;

    fn to_u64(&self) -> Option<u64>;

    fn num_bits(&self) -> u32;

    /// Largest `n` for which an `n`-bit decomposition of any element is
    /// unique.
    fn max_decomposition_bits() -> usize {
        Self::MODULUS_BIT_SIZE as usize - 1
    }

    /// `2^i` as a field element.
    fn pow2(i: usize) -> Self {
        Self::from(2u64).pow([i as u64])
    }
}

pub mod ark;
