use super::{
    arena::VariableArena,
    gates::{Gate, GateTrace},
    ops::{Term, Variable, Visibility, LC},
};
use crate::{field::CircuitField, utils::errors::CircuitError};

/// A circuit description. `define` allocates the circuit's inputs and records its gates; it is
/// run exactly once per compilation and its trace is reused for every witness.
pub trait Circuit<F: CircuitField> {
    fn define(&self, api: &mut CircuitBuilder<F>) -> Result<(), CircuitError>;
}

/// Records a circuit as an ordered gate trace over an explicit variable arena.
pub struct CircuitBuilder<F: CircuitField> {
    arena: VariableArena,
    gates: Vec<Gate<F>>,
}

impl<F: CircuitField> Default for CircuitBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CircuitField> CircuitBuilder<F> {
    pub fn new() -> Self {
        Self {
            arena: VariableArena::new(),
            gates: vec![],
        }
    }

    pub fn arena(&self) -> &VariableArena {
        &self.arena
    }

    pub fn num_constraints(&self) -> usize {
        self.gates.iter().map(Gate::num_constraints).sum()
    }

    pub fn finish(self) -> GateTrace<F> {
        GateTrace {
            arena: self.arena,
            gates: self.gates,
        }
    }

    pub fn public_input(&mut self, name: &str) -> Result<Variable, CircuitError> {
        self.arena.allocate(Visibility::Public, Some(name.to_string()))
    }

    pub fn secret_input(&mut self, name: &str) -> Result<Variable, CircuitError> {
        self.arena.allocate(Visibility::Secret, Some(name.to_string()))
    }

    /// Allocates `name[0]`, ..., `name[n-1]` as public inputs.
    pub fn public_inputs(&mut self, name: &str, n: usize) -> Result<Vec<Variable>, CircuitError> {
        (0..n)
            .map(|i| self.arena.allocate(Visibility::Public, Some(indexed_name(name, i))))
            .collect()
    }

    /// Allocates `name[0]`, ..., `name[n-1]` as secret inputs.
    pub fn secret_inputs(&mut self, name: &str, n: usize) -> Result<Vec<Variable>, CircuitError> {
        (0..n)
            .map(|i| self.arena.allocate(Visibility::Secret, Some(indexed_name(name, i))))
            .collect()
    }

    fn internal(&mut self) -> Result<Variable, CircuitError> {
        self.arena.allocate(Visibility::Internal, None)
    }

    fn operand(&self, value: impl Into<LC<F>>) -> Result<LC<F>, CircuitError> {
        let lc = value.into();
        self.arena.check_lc(&lc)?;
        Ok(lc)
    }

    // Affine operations. These never emit constraints.

    pub fn constant(&self, value: F) -> LC<F> {
        LC::constant(value)
    }

    pub fn add(&self, a: impl Into<LC<F>>, b: impl Into<LC<F>>) -> LC<F> {
        a.into() + b.into()
    }

    pub fn add_many<I, T>(&self, items: I) -> LC<F>
    where
        I: IntoIterator<Item = T>,
        T: Into<LC<F>>,
    {
        LC::sum(items.into_iter().map(Into::into))
    }

    pub fn sub(&self, a: impl Into<LC<F>>, b: impl Into<LC<F>>) -> LC<F> {
        a.into() - b.into()
    }

    pub fn neg(&self, a: impl Into<LC<F>>) -> LC<F> {
        -a.into()
    }

    pub fn scale(&self, a: impl Into<LC<F>>, k: F) -> LC<F> {
        a.into().scale(k)
    }

    /// Packs little-endian bits into `Σ 2^i · bits[i]`.
    pub fn from_binary(&self, bits: &[Variable]) -> LC<F> {
        let terms = bits
            .iter()
            .enumerate()
            .map(|(i, bit)| Term(*bit, F::pow2(i)))
            .collect();
        LC::new(terms, F::zero())
    }

    // Constraint-emitting gates.

    /// Allocates `z` and constrains `a · b = z`.
    pub fn mul(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
    ) -> Result<Variable, CircuitError> {
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        let out = self.internal()?;
        self.gates.push(Gate::Mul { a, b, out });
        Ok(out)
    }

    /// Left-to-right chain of binary multiplications. Needs at least two operands.
    pub fn mul_many<I, T>(&mut self, items: I) -> Result<Variable, CircuitError>
    where
        I: IntoIterator<Item = T>,
        T: Into<LC<F>>,
    {
        let mut items = items.into_iter();
        let (Some(first), Some(second)) = (items.next(), items.next()) else {
            return Err(CircuitError::InvalidCircuitState(
                "mul_many needs at least two operands".to_string(),
            ));
        };
        let mut product = self.mul(first, second)?;
        for item in items {
            product = self.mul(product, item)?;
        }
        Ok(product)
    }

    pub fn square(&mut self, a: impl Into<LC<F>>) -> Result<Variable, CircuitError> {
        let a = self.operand(a)?;
        self.mul(a.clone(), a)
    }

    /// Allocates `inv` and constrains `a · inv = 1`. Unsatisfiable when `a = 0`.
    pub fn inverse(&mut self, a: impl Into<LC<F>>) -> Result<Variable, CircuitError> {
        let value = self.operand(a)?;
        let out = self.internal()?;
        self.gates.push(Gate::Inverse { value, out });
        Ok(out)
    }

    /// Decomposes `a` into `n` little-endian bits. The bits come out boolean-constrained.
    pub fn to_binary(
        &mut self,
        a: impl Into<LC<F>>,
        n: usize,
    ) -> Result<Vec<Variable>, CircuitError> {
        let max = F::max_decomposition_bits();
        if n > max {
            return Err(CircuitError::InvalidBitWidth { requested: n, max });
        }
        let value = self.operand(a)?;
        let bits = (0..n)
            .map(|_| self.internal())
            .collect::<Result<Vec<_>, _>>()?;
        for bit in &bits {
            self.arena.mark_boolean(*bit);
        }
        self.gates.push(Gate::ToBinary {
            value,
            bits: bits.clone(),
        });
        Ok(bits)
    }

    /// Returns a new variable equal to `a` when `cond = 1` and `b` when `cond = 0`.
    ///
    /// Both branches are always part of the circuit. A condition that is not already known to be
    /// boolean (a `to_binary` output or an `assert_is_boolean` operand) gets a boolean assertion
    /// first; a constant condition must be 0 or 1.
    pub fn select(
        &mut self,
        cond: impl Into<LC<F>>,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
    ) -> Result<Variable, CircuitError> {
        let cond = self.operand(cond)?;
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        if cond.is_constant() {
            let c = cond.constant_term();
            if !(c.is_zero() || c.is_one()) {
                return Err(CircuitError::InvalidCircuitState(format!(
                    "select condition is the non-boolean constant {c}"
                )));
            }
        } else if !self.is_known_boolean(&cond) {
            self.assert_is_boolean(cond.clone())?;
        }
        let out = self.internal()?;
        self.gates.push(Gate::Select { cond, a, b, out });
        Ok(out)
    }

    /// Constrains `(a - b) · 1 = 0`.
    pub fn assert_is_equal(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
    ) -> Result<(), CircuitError> {
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        self.gates.push(Gate::AssertIsEqual { a, b });
        Ok(())
    }

    /// Constrains `a · (1 - a) = 0`.
    pub fn assert_is_boolean(&mut self, a: impl Into<LC<F>>) -> Result<(), CircuitError> {
        let value = self.operand(a)?;
        if let Some(var) = value.as_variable() {
            self.arena.mark_boolean(var);
        }
        self.gates.push(Gate::AssertIsBoolean { value });
        Ok(())
    }

    /// Boolean AND. Operands are assumed boolean.
    pub fn and(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
    ) -> Result<Variable, CircuitError> {
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        let both_boolean = self.is_known_boolean(&a) && self.is_known_boolean(&b);
        let out = self.mul(a, b)?;
        if both_boolean {
            self.arena.mark_boolean(out);
        }
        Ok(out)
    }

    /// Boolean OR: `a + b - a·b`. Operands are assumed boolean.
    pub fn or(&mut self, a: impl Into<LC<F>>, b: impl Into<LC<F>>) -> Result<LC<F>, CircuitError> {
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        let ab = self.mul(a.clone(), b.clone())?;
        Ok(a + b - ab)
    }

    /// Boolean XOR: `a + b - 2·a·b`. Operands are assumed boolean.
    pub fn xor(
        &mut self,
        a: impl Into<LC<F>>,
        b: impl Into<LC<F>>,
    ) -> Result<LC<F>, CircuitError> {
        let a = self.operand(a)?;
        let b = self.operand(b)?;
        let ab = self.mul(a.clone(), b.clone())?;
        Ok(a + b - LC::from(ab).scale(F::from(2u64)))
    }

    fn is_known_boolean(&self, lc: &LC<F>) -> bool {
        lc.as_variable()
            .is_some_and(|var| self.arena.is_boolean(var))
    }
}

pub(crate) fn indexed_name(name: &str, i: usize) -> String {
    format!("{name}[{i}]")
}
