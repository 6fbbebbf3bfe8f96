use ark_poly::{EvaluationDomain, GeneralEvaluationDomain};
use itertools::izip;
use rayon::prelude::*;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{field::CircuitField, r1cs::R1CS, utils::errors::Groth16Error};

/// Domain holding every constraint row plus one extra row per instance column.
pub fn domain_for<F: CircuitField>(
    r1cs: &R1CS<F>,
) -> Result<GeneralEvaluationDomain<F>, Groth16Error> {
    let size = r1cs.num_constraints + r1cs.num_instance_variables();
    GeneralEvaluationDomain::new(size).ok_or(Groth16Error::DomainTooLarge(size))
}

/// `u_i(τ)`, `v_i(τ)`, `w_i(τ)` for every column, and `t(τ)`. τ is recoverable from these, so
/// they are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct QAPEvaluations<F: CircuitField> {
    pub a: Vec<F>,
    pub b: Vec<F>,
    pub c: Vec<F>,
    pub zt: F,
}

#[tracing::instrument(skip_all, name = "QAP::evaluate_at")]
pub fn evaluate_at<F: CircuitField>(
    r1cs: &R1CS<F>,
    domain: &GeneralEvaluationDomain<F>,
    tau: F,
) -> QAPEvaluations<F> {
    let lagrange = domain.evaluate_all_lagrange_coefficients(tau);
    let zt = domain.evaluate_vanishing_polynomial(tau);

    let mut a = vec![F::zero(); r1cs.num_variables];
    let mut b = vec![F::zero(); r1cs.num_variables];
    let mut c = vec![F::zero(); r1cs.num_variables];

    let rows = izip!(&r1cs.a.rows, &r1cs.b.rows, &r1cs.c.rows);
    for (l_i, (a_row, b_row, c_row)) in lagrange.iter().zip(rows) {
        for (col, coeff) in a_row {
            a[*col] += *l_i * coeff;
        }
        for (col, coeff) in b_row {
            b[*col] += *l_i * coeff;
        }
        for (col, coeff) in c_row {
            c[*col] += *l_i * coeff;
        }
    }
    let m = r1cs.num_constraints;
    for (col, a_col) in a.iter_mut().enumerate().take(r1cs.num_instance_variables()) {
        *a_col += lagrange[m + col];
    }

    QAPEvaluations { a, b, c, zt }
}

/// Coefficients of `h(X) = (A(X)·B(X) - C(X)) / t(X)` for a satisfying witness. Has `n - 1`
/// entries for a domain of size `n`.
#[tracing::instrument(skip_all, name = "QAP::witness_map")]
pub fn witness_map<F: CircuitField>(
    r1cs: &R1CS<F>,
    domain: &GeneralEvaluationDomain<F>,
    witness: &[F],
) -> Result<Vec<F>, Groth16Error> {
    let n = domain.size();
    let coset = domain
        .get_coset(F::GENERATOR)
        .ok_or(Groth16Error::DomainTooLarge(n))?;

    let mut a = r1cs.a.mul_vector(witness);
    a.extend_from_slice(&witness[..r1cs.num_instance_variables()]);
    a.resize(n, F::zero());
    let mut b = r1cs.b.mul_vector(witness);
    b.resize(n, F::zero());
    let mut c = r1cs.c.mul_vector(witness);
    c.resize(n, F::zero());
    debug_assert_eq!(a.len(), n);

    rayon::join(
        || {
            domain.ifft_in_place(&mut a);
            coset.fft_in_place(&mut a);
        },
        || {
            domain.ifft_in_place(&mut b);
            coset.fft_in_place(&mut b);
        },
    );
    domain.ifft_in_place(&mut c);
    coset.fft_in_place(&mut c);

    // t is constant on the coset: (g·ω^i)^n - 1 = g^n - 1.
    let vanishing_inv = domain
        .evaluate_vanishing_polynomial(F::GENERATOR)
        .inverse()
        .ok_or(Groth16Error::DomainTooLarge(n))?;

    let mut h: Vec<F> = a
        .par_iter()
        .zip(b.par_iter())
        .zip(c.par_iter())
        .map(|((a, b), c)| (*a * b - c) * vanishing_inv)
        .collect();
    coset.ifft_in_place(&mut h);
    h.truncate(n - 1);
    Ok(h)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r1cs::{test::*, CompiledCircuit};
    use ark_bn254::Fr;
    use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
    use ark_std::UniformRand;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn domain_covers_instance_rows() {
        let compiled = CompiledCircuit::compile(&RangeSumCircuit).unwrap();
        let r1cs = compiled.r1cs();
        // 8 boolean rows, 1 packing row, 1 inverse, 1 equality; 3 instance columns
        assert_eq!(r1cs.num_constraints, 11);
        assert_eq!(domain_for(r1cs).unwrap().size(), 16);
    }

    #[test]
    fn divisibility_holds_at_a_random_point() {
        let compiled = CompiledCircuit::compile(&RangeSumCircuit).unwrap();
        let r1cs = compiled.r1cs();
        let witness = compiled.solve(&range_sum_assignment(200, 9)).unwrap();
        let domain = domain_for(r1cs).unwrap();

        let h = witness_map(r1cs, &domain, witness.values()).unwrap();
        let h = DensePolynomial::from_coefficients_vec(h);

        let mut rng = ChaCha20Rng::from_seed([3; 32]);
        let tau = Fr::rand(&mut rng);
        let qap = evaluate_at(r1cs, &domain, tau);
        let dot = |v: &[Fr]| -> Fr { v.iter().zip(witness.values()).map(|(x, w)| *x * w).sum() };
        assert_eq!(
            dot(&qap.a) * dot(&qap.b) - dot(&qap.c),
            h.evaluate(&tau) * qap.zt
        );
    }
}
