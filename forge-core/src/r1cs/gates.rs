//! The closed gate vocabulary a circuit description is recorded in.
//!
//! Affine operations (`add`, `sub`, `scale`, `constant`) never reach the trace: they are folded
//! into the [`LC`] operands of the gates below. Each gate is read twice, once by the compiler to
//! emit constraints and once by the solver to compute values.

use super::arena::VariableArena;
use super::ops::{Variable, LC};
use crate::field::CircuitField;

#[derive(Clone, Debug)]
pub enum Gate<F: CircuitField> {
    /// `a · b = out`
    Mul { a: LC<F>, b: LC<F>, out: Variable },
    /// `value · out = 1`
    Inverse { value: LC<F>, out: Variable },
    /// `bits[i] · (1 - bits[i]) = 0` for every bit, then `Σ 2^i · bits[i] = value`
    ToBinary { value: LC<F>, bits: Vec<Variable> },
    /// `cond · (a - b) = out - b`
    Select {
        cond: LC<F>,
        a: LC<F>,
        b: LC<F>,
        out: Variable,
    },
    /// `(a - b) · 1 = 0`
    AssertIsEqual { a: LC<F>, b: LC<F> },
    /// `value · (1 - value) = 0`
    AssertIsBoolean { value: LC<F> },
}

impl<F: CircuitField> Gate<F> {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Mul { .. } => "Mul",
            Gate::Inverse { .. } => "Inverse",
            Gate::ToBinary { .. } => "ToBinary",
            Gate::Select { .. } => "Select",
            Gate::AssertIsEqual { .. } => "AssertIsEqual",
            Gate::AssertIsBoolean { .. } => "AssertIsBoolean",
        }
    }

    /// Number of R1CS rows this gate compiles to.
    pub fn num_constraints(&self) -> usize {
        match self {
            Gate::ToBinary { bits, .. } => bits.len() + 1,
            _ => 1,
        }
    }
}

/// A finished circuit description: the arena plus the gates in construction order.
#[derive(Clone, Debug)]
pub struct GateTrace<F: CircuitField> {
    pub arena: VariableArena,
    pub gates: Vec<Gate<F>>,
}

impl<F: CircuitField> GateTrace<F> {
    pub fn num_constraints(&self) -> usize {
        self.gates.iter().map(Gate::num_constraints).sum()
    }
}
