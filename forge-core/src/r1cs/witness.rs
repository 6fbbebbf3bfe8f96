use std::collections::BTreeMap;

use super::{
    builder::indexed_name,
    gates::Gate,
    ops::{Variable, Visibility, LC},
    system::CompiledCircuit,
};
use crate::{field::CircuitField, utils::errors::CircuitError};

/// Values for a circuit's named inputs. Array inputs are addressed as `name[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment<F: CircuitField> {
    values: BTreeMap<String, F>,
}

impl<F: CircuitField> Assignment<F> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: F) {
        self.values.insert(name.into(), value);
    }

    pub fn insert_slice(&mut self, name: &str, values: &[F]) {
        for (i, value) in values.iter().enumerate() {
            self.values.insert(indexed_name(name, i), *value);
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: F) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&F> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Full assignment in column order; `values[0]` is always `1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness<F: CircuitField> {
    values: Vec<F>,
    num_public: usize,
}

impl<F: CircuitField> Witness<F> {
    pub fn new(values: Vec<F>, num_public: usize) -> Result<Self, CircuitError> {
        if values.first() != Some(&F::one()) {
            return Err(CircuitError::InvalidCircuitState(
                "witness column 0 must hold the constant 1".to_string(),
            ));
        }
        if num_public >= values.len() {
            return Err(CircuitError::InvalidCircuitState(format!(
                "{num_public} public inputs do not fit in a witness of length {}",
                values.len()
            )));
        }
        Ok(Self { values, num_public })
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Public inputs, constant column excluded.
    pub fn public_inputs(&self) -> &[F] {
        &self.values[1..=self.num_public]
    }

    pub fn public_witness(&self) -> PublicWitness<F> {
        PublicWitness(self.public_inputs().to_vec())
    }
}

/// The verifier's view of a witness: public inputs in column order, constant excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicWitness<F: CircuitField>(pub Vec<F>);

impl<F: CircuitField> PublicWitness<F> {
    pub fn values(&self) -> &[F] {
        &self.0
    }
}

impl<F: CircuitField> From<Vec<F>> for PublicWitness<F> {
    fn from(values: Vec<F>) -> Self {
        Self(values)
    }
}

impl<F: CircuitField> CompiledCircuit<F> {
    /// Replays the gate trace over `assignment` to fill every column.
    ///
    /// Values that break a constraint (e.g. a `to_binary` input wider than its bit count, whose
    /// bits are the truncated low bits) are still produced; [`super::R1CS::is_satisfied`] reports
    /// them.
    #[tracing::instrument(skip_all, name = "CompiledCircuit::solve")]
    pub fn solve(&self, assignment: &Assignment<F>) -> Result<Witness<F>, CircuitError> {
        let arena = &self.trace.arena;
        let mut slots: Vec<Option<F>> = vec![None; arena.len()];

        for (slot, entry) in arena.entries().iter().enumerate() {
            if let Some(name) = &entry.name {
                let value = assignment
                    .get(name)
                    .ok_or_else(|| CircuitError::MissingAssignment(name.clone()))?;
                slots[slot] = Some(*value);
            }
        }
        for name in assignment.names() {
            if arena.lookup(name).is_none() {
                tracing::debug!(name, "ignoring assignment for unknown input");
            }
        }

        for gate in &self.trace.gates {
            match gate {
                Gate::Mul { a, b, out } => {
                    let value = evaluate(&slots, a)? * evaluate(&slots, b)?;
                    slots[out.slot()] = Some(value);
                }
                Gate::Inverse { value, out } => {
                    // No inverse of zero; the constraint fails at that row.
                    let inverse = evaluate(&slots, value)?.inverse().unwrap_or_else(F::zero);
                    slots[out.slot()] = Some(inverse);
                }
                Gate::ToBinary { value, bits } => {
                    let value = evaluate(&slots, value)?;
                    for (bit, set) in bits.iter().zip(value.to_bits_le(bits.len())) {
                        slots[bit.slot()] = Some(if set { F::one() } else { F::zero() });
                    }
                }
                Gate::Select { cond, a, b, out } => {
                    let cond = evaluate(&slots, cond)?;
                    let (a, b) = (evaluate(&slots, a)?, evaluate(&slots, b)?);
                    slots[out.slot()] = Some(b + cond * (a - b));
                }
                Gate::AssertIsEqual { .. } | Gate::AssertIsBoolean { .. } => {}
            }
        }

        let mut values = vec![F::zero(); self.layout.num_variables()];
        values[0] = F::one();
        for (slot, value) in slots.into_iter().enumerate() {
            let value = value.ok_or_else(|| {
                CircuitError::InvalidCircuitState(format!("slot {slot} was never assigned"))
            })?;
            values[self.layout.column(Variable::new(arena.id(), slot))] = value;
        }
        Witness::new(values, self.layout.num_public())
    }

    /// Public inputs of `assignment` in column order. Only public names need to be present.
    pub fn public_witness(
        &self,
        assignment: &Assignment<F>,
    ) -> Result<PublicWitness<F>, CircuitError> {
        let arena = &self.trace.arena;
        let mut values = vec![F::zero(); self.layout.num_public()];
        for (slot, entry) in arena.entries().iter().enumerate() {
            if entry.visibility != Visibility::Public {
                continue;
            }
            let name = entry.name.as_deref().unwrap_or_default();
            let value = assignment
                .get(name)
                .ok_or_else(|| CircuitError::MissingAssignment(name.to_string()))?;
            values[self.layout.column(Variable::new(arena.id(), slot)) - 1] = *value;
        }
        Ok(PublicWitness(values))
    }
}

fn evaluate<F: CircuitField>(slots: &[Option<F>], lc: &LC<F>) -> Result<F, CircuitError> {
    lc.evaluate_with(|var| slots[var.slot()]).ok_or_else(|| {
        CircuitError::InvalidCircuitState("gate operand read before assignment".to_string())
    })
}
