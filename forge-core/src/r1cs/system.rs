use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, Read, SerializationError, Valid, Validate,
};
use rayon::prelude::*;
use sha3::{Digest, Sha3_256};

use super::{
    arena::Layout,
    builder::{Circuit, CircuitBuilder},
    gates::{Gate, GateTrace},
    ops::{Term, Variable, LC},
    witness::Witness,
};
use crate::{field::CircuitField, utils::errors::CircuitError};

/// Constraint over arena slots: `a · b = c`.
#[derive(Clone, Debug)]
pub struct Constraint<F: CircuitField> {
    pub a: LC<F>,
    pub b: LC<F>,
    pub c: LC<F>,
}

impl<F: CircuitField> Constraint<F> {
    fn new(a: LC<F>, b: LC<F>, c: LC<F>) -> Self {
        Self { a, b, c }
    }
}

/// Sparse R1CS matrix, one row per constraint, each row a list of `(column, coeff)` sorted by
/// column.
#[derive(Clone, Debug, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SparseMatrix<F: CircuitField> {
    pub rows: Vec<Vec<(usize, F)>>,
}

impl<F: CircuitField> SparseMatrix<F> {
    pub fn num_non_zero(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// `⟨row, w⟩`
    pub fn evaluate_row(&self, row: usize, witness: &[F]) -> F {
        self.rows[row]
            .iter()
            .map(|(col, coeff)| witness[*col] * coeff)
            .sum()
    }

    /// `M · w`
    pub fn mul_vector(&self, witness: &[F]) -> Vec<F> {
        (0..self.rows.len())
            .into_par_iter()
            .map(|row| self.evaluate_row(row, witness))
            .collect()
    }
}

/// Rank-1 constraint system: `(A·w) ∘ (B·w) = C·w`.
///
/// Column 0 is the constant `1`; columns `1..=num_public_inputs` are the public inputs.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize)]
pub struct R1CS<F: CircuitField> {
    pub a: SparseMatrix<F>,
    pub b: SparseMatrix<F>,
    pub c: SparseMatrix<F>,
    pub num_constraints: usize,
    /// Witness length, constant column included.
    pub num_variables: usize,
    /// Public inputs, constant column excluded.
    pub num_public_inputs: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct R1CSStats {
    pub num_constraints: usize,
    pub num_variables: usize,
    pub num_public_inputs: usize,
    pub a_non_zero: usize,
    pub b_non_zero: usize,
    pub c_non_zero: usize,
}

impl<F: CircuitField> R1CS<F> {
    /// Walks the trace in gate order and materializes A, B, C in column space.
    #[tracing::instrument(skip_all, name = "R1CS::compile")]
    pub fn compile(trace: &GateTrace<F>) -> (Self, Layout) {
        let layout = trace.arena.layout();
        let constraints: Vec<Constraint<F>> = trace.gates.iter().flat_map(emit).collect();

        let to_row = |lc: &LC<F>| -> Vec<(usize, F)> {
            let mut row: Vec<(usize, F)> = lc
                .terms()
                .iter()
                .map(|Term(var, coeff)| (layout.column(*var), *coeff))
                .collect();
            if !lc.constant_term().is_zero() {
                row.push((0, lc.constant_term()));
            }
            row.sort_by_key(|(col, _)| *col);
            row
        };

        let a = constraints.par_iter().map(|row| to_row(&row.a)).collect();
        let b = constraints.par_iter().map(|row| to_row(&row.b)).collect();
        let c = constraints.par_iter().map(|row| to_row(&row.c)).collect();

        let r1cs = R1CS {
            a: SparseMatrix { rows: a },
            b: SparseMatrix { rows: b },
            c: SparseMatrix { rows: c },
            num_constraints: constraints.len(),
            num_variables: layout.num_variables(),
            num_public_inputs: layout.num_public(),
        };
        tracing::debug!(
            num_constraints = r1cs.num_constraints,
            num_variables = r1cs.num_variables,
            num_public_inputs = r1cs.num_public_inputs,
            "compiled circuit"
        );
        (r1cs, layout)
    }

    /// Number of instance columns: the constant plus the public inputs.
    pub fn num_instance_variables(&self) -> usize {
        self.num_public_inputs + 1
    }

    pub fn stats(&self) -> R1CSStats {
        R1CSStats {
            num_constraints: self.num_constraints,
            num_variables: self.num_variables,
            num_public_inputs: self.num_public_inputs,
            a_non_zero: self.a.num_non_zero(),
            b_non_zero: self.b.num_non_zero(),
            c_non_zero: self.c.num_non_zero(),
        }
    }

    /// Checks that every row and column the matrices reference exists.
    pub fn validate(&self) -> Result<(), CircuitError> {
        for (name, matrix) in [("A", &self.a), ("B", &self.b), ("C", &self.c)] {
            if matrix.rows.len() != self.num_constraints {
                return Err(CircuitError::InvalidCircuitState(format!(
                    "{name} has {} rows, expected {}",
                    matrix.rows.len(),
                    self.num_constraints
                )));
            }
            let out_of_range = matrix
                .rows
                .iter()
                .enumerate()
                .find_map(|(row, terms)| {
                    terms
                        .iter()
                        .find(|(col, _)| *col >= self.num_variables)
                        .map(|(col, _)| (row, *col))
                });
            if let Some((row, col)) = out_of_range {
                return Err(CircuitError::InvalidCircuitState(format!(
                    "{name} row {row} references column {col} of {}",
                    self.num_variables
                )));
            }
        }
        if self.num_public_inputs >= self.num_variables {
            return Err(CircuitError::InvalidCircuitState(format!(
                "{} public inputs do not fit in {} variables",
                self.num_public_inputs, self.num_variables
            )));
        }
        Ok(())
    }

    /// Returns the first violated row, if any.
    #[tracing::instrument(skip_all, name = "R1CS::is_satisfied")]
    pub fn is_satisfied(&self, witness: &Witness<F>) -> Result<(), CircuitError> {
        self.validate()?;
        let w = witness.values();
        if w.len() != self.num_variables {
            return Err(CircuitError::InvalidCircuitState(format!(
                "witness has {} entries, constraint system has {} variables",
                w.len(),
                self.num_variables
            )));
        }
        let failing_row = (0..self.num_constraints).into_par_iter().find_first(|row| {
            self.a.evaluate_row(*row, w) * self.b.evaluate_row(*row, w)
                != self.c.evaluate_row(*row, w)
        });
        match failing_row {
            Some(row) => Err(CircuitError::UnsatisfiedConstraint { row }),
            None => Ok(()),
        }
    }

    /// SHA3-256 of the canonical encoding. Keys are bound to this digest.
    pub fn shape_digest(&self) -> Result<[u8; 32], SerializationError> {
        let mut bytes = Vec::with_capacity(self.compressed_size());
        self.serialize_compressed(&mut bytes)?;
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha3_256::digest(&bytes));
        Ok(digest)
    }
}

impl<F: CircuitField> Valid for R1CS<F> {
    fn check(&self) -> Result<(), SerializationError> {
        self.validate().map_err(|_| SerializationError::InvalidData)
    }
}

impl<F: CircuitField> CanonicalDeserialize for R1CS<F> {
    fn deserialize_with_mode<R: Read>(
        mut reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let r1cs = R1CS {
            a: SparseMatrix::deserialize_with_mode(&mut reader, compress, validate)?,
            b: SparseMatrix::deserialize_with_mode(&mut reader, compress, validate)?,
            c: SparseMatrix::deserialize_with_mode(&mut reader, compress, validate)?,
            num_constraints: usize::deserialize_with_mode(&mut reader, compress, validate)?,
            num_variables: usize::deserialize_with_mode(&mut reader, compress, validate)?,
            num_public_inputs: usize::deserialize_with_mode(&mut reader, compress, validate)?,
        };
        if validate == Validate::Yes {
            r1cs.check()?;
        }
        Ok(r1cs)
    }
}

/// Compile-time reading of a gate.
fn emit<F: CircuitField>(gate: &Gate<F>) -> Vec<Constraint<F>> {
    let one = || LC::constant(F::one());
    match gate {
        Gate::Mul { a, b, out } => vec![Constraint::new(a.clone(), b.clone(), LC::from(*out))],
        Gate::Inverse { value, out } => {
            vec![Constraint::new(value.clone(), LC::from(*out), one())]
        }
        Gate::ToBinary { value, bits } => {
            let mut constraints: Vec<Constraint<F>> = bits
                .iter()
                .map(|bit| boolean_constraint(LC::from(*bit)))
                .collect();
            let packed: LC<F> = bits
                .iter()
                .enumerate()
                .map(|(i, bit)| Term(*bit, F::pow2(i)))
                .collect::<Vec<_>>()
                .into();
            constraints.push(Constraint::new(packed - value.clone(), one(), LC::zero()));
            constraints
        }
        Gate::Select { cond, a, b, out } => vec![Constraint::new(
            cond.clone(),
            a.clone() - b.clone(),
            LC::from(*out) - b.clone(),
        )],
        Gate::AssertIsEqual { a, b } => {
            vec![Constraint::new(a.clone() - b.clone(), one(), LC::zero())]
        }
        Gate::AssertIsBoolean { value } => vec![boolean_constraint(value.clone())],
    }
}

fn boolean_constraint<F: CircuitField>(value: LC<F>) -> Constraint<F> {
    // value * (1 - value) == 0
    let b = LC::constant(F::one()) - value.clone();
    Constraint::new(value, b, LC::zero())
}

/// A compiled circuit: the constraint system plus the trace and layout the solver replays.
#[derive(Clone, Debug)]
pub struct CompiledCircuit<F: CircuitField> {
    pub(crate) r1cs: R1CS<F>,
    pub(crate) trace: GateTrace<F>,
    pub(crate) layout: Layout,
}

impl<F: CircuitField> CompiledCircuit<F> {
    #[tracing::instrument(skip_all, name = "CompiledCircuit::compile")]
    pub fn compile<C: Circuit<F> + ?Sized>(circuit: &C) -> Result<Self, CircuitError> {
        let mut api = CircuitBuilder::new();
        circuit.define(&mut api)?;
        let trace = api.finish();
        let (r1cs, layout) = R1CS::compile(&trace);
        tracing::info!(
            constraints = r1cs.num_constraints,
            variables = r1cs.num_variables,
            public_inputs = r1cs.num_public_inputs,
            gates = trace.gates.len(),
            "circuit compiled"
        );
        Ok(Self {
            r1cs,
            trace,
            layout,
        })
    }

    pub fn r1cs(&self) -> &R1CS<F> {
        &self.r1cs
    }

    pub fn trace(&self) -> &GateTrace<F> {
        &self.trace
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Witness column of a named input.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.trace
            .arena
            .lookup(name)
            .map(|var| self.layout.column(var))
    }

    pub fn column_of_variable(&self, var: Variable) -> Result<usize, CircuitError> {
        self.trace.arena.check(var)?;
        Ok(self.layout.column(var))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r1cs::witness::Assignment;
    use ark_bn254::Fr;

    struct Product;

    impl Circuit<Fr> for Product {
        fn define(&self, api: &mut CircuitBuilder<Fr>) -> Result<(), CircuitError> {
            let a = api.secret_input("a")?;
            let b = api.secret_input("b")?;
            let c = api.public_input("c")?;
            let ab = api.mul(a, b)?;
            api.assert_is_equal(ab, api.add(c, api.constant(Fr::from(1u64))))
        }
    }

    #[test]
    fn rows_are_in_column_space() {
        let compiled = CompiledCircuit::compile(&Product).unwrap();
        let r1cs = compiled.r1cs();
        // columns: 0 = one, 1 = c, 2 = a, 3 = b, 4 = ab
        assert_eq!(r1cs.num_variables, 5);
        assert_eq!(r1cs.num_public_inputs, 1);
        assert_eq!(r1cs.num_constraints, 2);
        assert_eq!(r1cs.a.rows[0], vec![(2, Fr::from(1u64))]);
        assert_eq!(r1cs.b.rows[0], vec![(3, Fr::from(1u64))]);
        assert_eq!(r1cs.c.rows[0], vec![(4, Fr::from(1u64))]);
        // (ab - c - 1) * 1 = 0
        assert_eq!(
            r1cs.a.rows[1],
            vec![(0, -Fr::from(1u64)), (1, -Fr::from(1u64)), (4, Fr::from(1u64))]
        );
        assert_eq!(r1cs.b.rows[1], vec![(0, Fr::from(1u64))]);
        assert!(r1cs.c.rows[1].is_empty());
        assert_eq!(compiled.column_of("c"), Some(1));
        assert_eq!(compiled.column_of("b"), Some(3));
    }

    #[test]
    fn unsatisfied_rows_are_reported() {
        let compiled = CompiledCircuit::compile(&Product).unwrap();
        let good = Assignment::new()
            .with("a", Fr::from(3u64))
            .with("b", Fr::from(4u64))
            .with("c", Fr::from(11u64));
        let witness = compiled.solve(&good).unwrap();
        assert!(compiled.r1cs().is_satisfied(&witness).is_ok());

        let bad = good.with("c", Fr::from(12u64));
        let witness = compiled.solve(&bad).unwrap();
        assert_eq!(
            compiled.r1cs().is_satisfied(&witness),
            Err(CircuitError::UnsatisfiedConstraint { row: 1 })
        );
    }

    #[test]
    fn shape_digest_tracks_structure() {
        let first = CompiledCircuit::compile(&Product).unwrap();
        let second = CompiledCircuit::compile(&Product).unwrap();
        assert_eq!(
            first.r1cs().shape_digest().unwrap(),
            second.r1cs().shape_digest().unwrap()
        );
        let mut other = first.r1cs().clone();
        other.a.rows[0][0].1 = Fr::from(2u64);
        assert_ne!(
            first.r1cs().shape_digest().unwrap(),
            other.shape_digest().unwrap()
        );
    }

    fn reencode(r1cs: &R1CS<Fr>) -> Result<R1CS<Fr>, SerializationError> {
        let mut bytes = Vec::new();
        r1cs.serialize_compressed(&mut bytes).unwrap();
        R1CS::deserialize_compressed(bytes.as_slice())
    }

    #[test]
    fn decoding_rejects_out_of_range_columns() {
        let compiled = CompiledCircuit::compile(&Product).unwrap();
        assert_eq!(reencode(compiled.r1cs()).unwrap(), *compiled.r1cs());

        let mut corrupt = compiled.r1cs().clone();
        corrupt.a.rows[0][0].0 = 99;
        assert!(matches!(
            reencode(&corrupt),
            Err(SerializationError::InvalidData)
        ));
        assert!(matches!(
            corrupt.validate(),
            Err(CircuitError::InvalidCircuitState(_))
        ));

        let witness = compiled
            .solve(
                &Assignment::new()
                    .with("a", Fr::from(3u64))
                    .with("b", Fr::from(4u64))
                    .with("c", Fr::from(11u64)),
            )
            .unwrap();
        assert!(matches!(
            corrupt.is_satisfied(&witness),
            Err(CircuitError::InvalidCircuitState(_))
        ));
    }

    #[test]
    fn decoding_rejects_row_count_mismatch() {
        let compiled = CompiledCircuit::compile(&Product).unwrap();

        let mut short = compiled.r1cs().clone();
        short.b.rows.pop();
        assert!(matches!(reencode(&short), Err(SerializationError::InvalidData)));

        let mut oversized = compiled.r1cs().clone();
        oversized.num_public_inputs = oversized.num_variables;
        assert!(matches!(
            reencode(&oversized),
            Err(SerializationError::InvalidData)
        ));

        // Unchecked decoding still leaves `validate` to catch it.
        let mut bytes = Vec::new();
        short.serialize_compressed(&mut bytes).unwrap();
        let unchecked = R1CS::<Fr>::deserialize_compressed_unchecked(bytes.as_slice()).unwrap();
        assert!(matches!(
            unchecked.validate(),
            Err(CircuitError::InvalidCircuitState(_))
        ));
    }
}
