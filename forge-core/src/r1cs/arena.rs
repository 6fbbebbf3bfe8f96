use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use super::ops::{CircuitId, Variable, Visibility, LC};
use crate::field::CircuitField;
use crate::utils::errors::CircuitError;

static NEXT_CIRCUIT_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Debug)]
pub struct VariableEntry {
    pub visibility: Visibility,
    /// Inputs are named so assignments can refer to them; internal wires are not.
    pub name: Option<String>,
    /// Set once a constraint pins the value to {0, 1}.
    pub boolean: bool,
}

/// Append-only table of every variable one circuit allocates. Both the compiler and the solver
/// read slot metadata from here.
#[derive(Clone, Debug)]
pub struct VariableArena {
    id: CircuitId,
    entries: Vec<VariableEntry>,
    names: HashMap<String, usize>,
}

impl Default for VariableArena {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableArena {
    pub fn new() -> Self {
        Self {
            id: NEXT_CIRCUIT_ID.fetch_add(1, Ordering::Relaxed),
            entries: vec![],
            names: HashMap::new(),
        }
    }

    pub fn id(&self) -> CircuitId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VariableEntry] {
        &self.entries
    }

    pub fn entry(&self, var: Variable) -> &VariableEntry {
        &self.entries[var.slot()]
    }

    pub fn allocate(
        &mut self,
        visibility: Visibility,
        name: Option<String>,
    ) -> Result<Variable, CircuitError> {
        let slot = self.entries.len();
        if let Some(name) = &name {
            if self.names.contains_key(name) {
                return Err(CircuitError::InvalidCircuitState(format!(
                    "input `{name}` declared twice"
                )));
            }
            self.names.insert(name.clone(), slot);
        }
        self.entries.push(VariableEntry {
            visibility,
            name,
            boolean: false,
        });
        Ok(Variable::new(self.id, slot))
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.names.get(name).map(|slot| Variable::new(self.id, *slot))
    }

    /// Rejects variables allocated by another builder or never allocated at all.
    pub fn check(&self, var: Variable) -> Result<(), CircuitError> {
        if var.circuit() != self.id {
            return Err(CircuitError::InvalidCircuitState(format!(
                "variable from circuit {} used in circuit {}",
                var.circuit(),
                self.id
            )));
        }
        if var.slot() >= self.entries.len() {
            return Err(CircuitError::InvalidCircuitState(format!(
                "variable slot {} was never allocated",
                var.slot()
            )));
        }
        Ok(())
    }

    pub fn check_lc<F: CircuitField>(&self, lc: &LC<F>) -> Result<(), CircuitError> {
        lc.variables().try_for_each(|var| self.check(var))
    }

    pub fn mark_boolean(&mut self, var: Variable) {
        self.entries[var.slot()].boolean = true;
    }

    pub fn is_boolean(&self, var: Variable) -> bool {
        var.circuit() == self.id && self.entries.get(var.slot()).is_some_and(|e| e.boolean)
    }

    /// Assigns witness columns: the constant `1` at 0, public inputs next in allocation order,
    /// then secret inputs and internal wires in allocation order.
    pub fn layout(&self) -> Layout {
        let mut columns = vec![0; self.entries.len()];
        let mut next = 1;
        for (slot, entry) in self.entries.iter().enumerate() {
            if entry.visibility == Visibility::Public {
                columns[slot] = next;
                next += 1;
            }
        }
        let num_public = next - 1;
        for (slot, entry) in self.entries.iter().enumerate() {
            if entry.visibility != Visibility::Public {
                columns[slot] = next;
                next += 1;
            }
        }
        Layout {
            columns,
            num_public,
            num_variables: next,
        }
    }
}

/// Slot → witness column mapping fixed at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    columns: Vec<usize>,
    num_public: usize,
    num_variables: usize,
}

impl Layout {
    pub fn column(&self, var: Variable) -> usize {
        self.columns[var.slot()]
    }

    pub fn num_public(&self) -> usize {
        self.num_public
    }

    /// Includes the constant column.
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn public_inputs_take_the_lowest_columns() {
        let mut arena = VariableArena::new();
        let x = arena.allocate(Visibility::Secret, Some("x".into())).unwrap();
        let t = arena.allocate(Visibility::Internal, None).unwrap();
        let y = arena.allocate(Visibility::Public, Some("y".into())).unwrap();
        let z = arena.allocate(Visibility::Public, Some("z".into())).unwrap();

        let layout = arena.layout();
        assert_eq!(layout.num_public(), 2);
        assert_eq!(layout.num_variables(), 5);
        assert_eq!(layout.column(y), 1);
        assert_eq!(layout.column(z), 2);
        assert_eq!(layout.column(x), 3);
        assert_eq!(layout.column(t), 4);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut arena = VariableArena::new();
        arena.allocate(Visibility::Secret, Some("x".into())).unwrap();
        assert!(matches!(
            arena.allocate(Visibility::Public, Some("x".into())),
            Err(CircuitError::InvalidCircuitState(_))
        ));
    }

    #[test]
    fn foreign_variables_are_rejected() {
        let mut first = VariableArena::new();
        let second = VariableArena::new();
        let x = first.allocate(Visibility::Secret, None).unwrap();
        assert!(first.check(x).is_ok());
        assert!(matches!(
            second.check(x),
            Err(CircuitError::InvalidCircuitState(_))
        ));
    }
}
