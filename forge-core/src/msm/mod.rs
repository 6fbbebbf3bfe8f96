use ark_ec::{CurveGroup, VariableBaseMSM};
use rayon::prelude::*;

use crate::utils::errors::Groth16Error;

/// `Σ scalars[i] · bases[i]`. Lengths must match.
pub fn msm<G: CurveGroup>(
    bases: &[G::Affine],
    scalars: &[G::ScalarField],
) -> Result<G, Groth16Error> {
    if bases.len() != scalars.len() {
        return Err(Groth16Error::Msm(bases.len(), scalars.len()));
    }
    <G as VariableBaseMSM>::msm(bases, scalars)
        .map_err(|_| Groth16Error::Msm(bases.len(), scalars.len()))
}

/// `[s · base for s in scalars]`, normalized in one batch.
#[tracing::instrument(skip_all, name = "msm::batch_mul", fields(len = scalars.len()))]
pub fn batch_mul<G: CurveGroup>(base: G, scalars: &[G::ScalarField]) -> Vec<G::Affine> {
    let projective: Vec<G> = scalars.par_iter().map(|s| base * *s).collect();
    G::normalize_batch(&projective)
}

#[cfg(test)]
mod test {
    use super::*;
    use ark_bn254::{Fr, G1Projective};
    use ark_ec::PrimeGroup;
    use ark_std::UniformRand;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn msm_matches_naive_sum() {
        let mut rng = ChaCha20Rng::from_seed([7; 32]);
        let g = G1Projective::generator();
        let points: Vec<Fr> = (0..16).map(|_| Fr::rand(&mut rng)).collect();
        let scalars: Vec<Fr> = (0..16).map(|_| Fr::rand(&mut rng)).collect();
        let bases = batch_mul(g, &points);

        let expected: G1Projective = points
            .iter()
            .zip(&scalars)
            .map(|(p, s)| g * (*p * s))
            .sum();
        assert_eq!(msm::<G1Projective>(&bases, &scalars).unwrap(), expected);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let g = G1Projective::generator();
        let bases = batch_mul(g, &[Fr::from(1u64), Fr::from(2u64)]);
        assert!(matches!(
            msm::<G1Projective>(&bases, &[Fr::from(1u64)]),
            Err(Groth16Error::Msm(2, 1))
        ));
    }
}
