use ark_ff::{BigInteger, PrimeField, UniformRand};
use ark_std::rand::RngCore;

use super::CircuitField;

impl CircuitField for ark_bn254::Fr {
    const NUM_BYTES: usize = 32;

    fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        <Self as UniformRand>::rand(rng)
    }

    fn from_i64(val: i64) -> Self {
        if val >= 0 {
            Self::from(val as u64)
        } else {
            -Self::from(val.unsigned_abs())
        }
    }

    fn to_bits_le(&self, n: usize) -> Vec<bool> {
        let mut bits = self.into_bigint().to_bits_le();
        bits.resize(n, false);
        bits
    }

    fn to_u64(&self) -> Option<u64> {
        let bigint = self.into_bigint();
        if bigint.num_bits() <= 64 {
            Some(bigint.as_ref()[0])
        } else {
            None
        }
    }

    fn num_bits(&self) -> u32 {
        self.into_bigint().num_bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use ark_std::{One, Zero};

    #[test]
    fn signed_conversion() {
        assert_eq!(Fr::from_i64(-1), -Fr::one());
        assert_eq!(Fr::from_i64(0), Fr::zero());
        assert_eq!(Fr::from_i64(42), Fr::from(42u64));
        assert_eq!(Fr::from_i64(i64::MIN) + Fr::from(1u64 << 63), Fr::zero());
    }

    #[test]
    fn bits_are_truncated_and_padded() {
        let ten = Fr::from(10u64);
        assert_eq!(ten.to_bits_le(4), vec![false, true, false, true]);
        assert_eq!(ten.to_bits_le(2), vec![false, true]);
        assert_eq!(ten.to_bits_le(300).len(), 300);
    }

    #[test]
    fn small_values_round_trip_through_u64() {
        assert_eq!(Fr::from(59049u64).to_u64(), Some(59049));
        assert_eq!((-Fr::one()).to_u64(), None);
        assert_eq!(Fr::max_decomposition_bits(), 253);
        assert_eq!(Fr::pow2(10), Fr::from(1024u64));
    }
}
