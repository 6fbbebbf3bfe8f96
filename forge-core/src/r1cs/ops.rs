//! Defines the Linear Combination (LC) object and associated operations.
//! A LinearCombination is a vector of Terms, where each Term is a pair of a Variable and a
//! coefficient, plus a constant. The constant is bound to the reserved `1` column at compile time.

use std::collections::HashMap;

use crate::field::CircuitField;

/// Identifies the builder a variable was allocated by.
pub type CircuitId = u32;

/// Handle to a slot in one circuit's variable arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    circuit: CircuitId,
    slot: usize,
}

impl Variable {
    pub(crate) fn new(circuit: CircuitId, slot: usize) -> Self {
        Self { circuit, slot }
    }

    pub fn circuit(&self) -> CircuitId {
        self.circuit
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Revealed to the verifier.
    Public,
    /// Supplied by the prover, never revealed.
    Secret,
    /// Produced by a gate.
    Internal,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Term<F: CircuitField>(pub Variable, pub F);

/// Linear Combination of terms: `Σ coeff_i · var_i + constant`.
#[derive(Clone, PartialEq, Eq)]
pub struct LC<F: CircuitField> {
    terms: Vec<Term<F>>,
    constant: F,
}

impl<F: CircuitField> LC<F> {
    /// Merges repeated variables and drops zero coefficients. Term order is the order of first
    /// appearance, which keeps compilation deterministic.
    pub fn new(terms: Vec<Term<F>>, constant: F) -> Self {
        let mut combined: Vec<Term<F>> = Vec::with_capacity(terms.len());
        let mut positions: HashMap<Variable, usize> = HashMap::with_capacity(terms.len());
        for term in terms {
            match positions.get(&term.0) {
                Some(&index) => combined[index].1 += term.1,
                None => {
                    positions.insert(term.0, combined.len());
                    combined.push(term);
                }
            }
        }
        combined.retain(|term| !term.1.is_zero());
        LC {
            terms: combined,
            constant,
        }
    }

    /// Sums many combinations with a single merge pass.
    pub fn sum<I: IntoIterator<Item = LC<F>>>(items: I) -> Self {
        let mut terms = vec![];
        let mut constant = F::zero();
        for item in items {
            terms.extend(item.terms);
            constant += item.constant;
        }
        LC::new(terms, constant)
    }

    pub fn zero() -> Self {
        LC {
            terms: vec![],
            constant: F::zero(),
        }
    }

    pub fn constant(value: F) -> Self {
        LC {
            terms: vec![],
            constant: value,
        }
    }

    pub fn terms(&self) -> &[Term<F>] {
        &self.terms
    }

    pub fn constant_term(&self) -> F {
        self.constant
    }

    pub fn num_vars(&self) -> usize {
        self.terms.len()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns the variable if this LC is exactly `1 · var`.
    pub fn as_variable(&self) -> Option<Variable> {
        match self.terms.as_slice() {
            [Term(var, coeff)] if coeff.is_one() && self.constant.is_zero() => Some(*var),
            _ => None,
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.iter().map(|term| term.0)
    }

    pub fn scale(&self, k: F) -> Self {
        if k.is_zero() {
            return LC::zero();
        }
        LC {
            terms: self.terms.iter().map(|t| Term(t.0, t.1 * k)).collect(),
            constant: self.constant * k,
        }
    }

    /// Evaluates with `value_of` resolving each variable. Returns `None` if any variable is
    /// unresolved.
    pub fn evaluate_with(&self, mut value_of: impl FnMut(Variable) -> Option<F>) -> Option<F> {
        let mut result = self.constant;
        for term in &self.terms {
            result += value_of(term.0)? * term.1;
        }
        Some(result)
    }
}

impl<F: CircuitField> Default for LC<F> {
    fn default() -> Self {
        LC::zero()
    }
}

impl<F: CircuitField> std::fmt::Debug for LC<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LC(")?;
        for (index, term) in self.terms.iter().enumerate() {
            if index > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{:?}", term)?;
        }
        if !self.constant.is_zero() || self.terms.is_empty() {
            if !self.terms.is_empty() {
                write!(f, " + ")?;
            }
            write!(f, "{}", self.constant)?;
        }
        write!(f, ")")
    }
}

impl<F: CircuitField> std::fmt::Debug for Term<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*v{}", self.1, self.0.slot)
    }
}

// Arithmetic for LC

impl<F: CircuitField> std::ops::Add for LC<F> {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        let mut terms = self.terms;
        terms.extend(other.terms);
        LC::new(terms, self.constant + other.constant)
    }
}

impl<F: CircuitField> std::ops::Neg for LC<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        LC {
            terms: self.terms.into_iter().map(|term| -term).collect(),
            constant: -self.constant,
        }
    }
}

impl<F: CircuitField> std::ops::Sub for LC<F> {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        self + (-other)
    }
}

impl<F: CircuitField> std::ops::Mul<F> for LC<F> {
    type Output = Self;

    fn mul(self, k: F) -> Self::Output {
        self.scale(k)
    }
}

impl<F: CircuitField> std::ops::Add<Variable> for LC<F> {
    type Output = Self;

    fn add(self, other: Variable) -> Self::Output {
        self + LC::from(other)
    }
}

impl<F: CircuitField> std::ops::Sub<Variable> for LC<F> {
    type Output = Self;

    fn sub(self, other: Variable) -> Self::Output {
        self - LC::from(other)
    }
}

// Arithmetic for Term<F>

impl<F: CircuitField> std::ops::Neg for Term<F> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Term(self.0, -self.1)
    }
}

impl<F: CircuitField> std::ops::Add for Term<F> {
    type Output = LC<F>;

    fn add(self, other: Self) -> Self::Output {
        LC::new(vec![self, other], F::zero())
    }
}

// Into<LC<F>>

impl<F: CircuitField> From<Variable> for Term<F> {
    fn from(val: Variable) -> Self {
        Term(val, F::one())
    }
}

impl<F: CircuitField> From<Variable> for LC<F> {
    fn from(val: Variable) -> Self {
        LC {
            terms: vec![Term(val, F::one())],
            constant: F::zero(),
        }
    }
}

impl<F: CircuitField> From<&Variable> for LC<F> {
    fn from(val: &Variable) -> Self {
        LC::from(*val)
    }
}

impl<F: CircuitField> From<Term<F>> for LC<F> {
    fn from(val: Term<F>) -> Self {
        LC::new(vec![val], F::zero())
    }
}

impl<F: CircuitField> From<Vec<Term<F>>> for LC<F> {
    fn from(val: Vec<Term<F>>) -> Self {
        LC::new(val, F::zero())
    }
}

impl<F: CircuitField> From<&LC<F>> for LC<F> {
    fn from(val: &LC<F>) -> Self {
        val.clone()
    }
}
