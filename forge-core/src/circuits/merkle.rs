use crate::{
    field::CircuitField,
    gadgets::{
        merkle::{verify_proof, MerkleProof},
        mimc::MiMC,
    },
    r1cs::{Assignment, Circuit, CircuitBuilder, LC},
    utils::errors::CircuitError,
};

/// Membership of a leaf under a public root. The circuit shape is fixed by `depth`, the number of
/// siblings in the opening.
#[derive(Clone, Debug)]
pub struct MerkleCircuit<F: CircuitField> {
    pub hasher: MiMC<F>,
    pub depth: usize,
}

impl<F: CircuitField> Circuit<F> for MerkleCircuit<F> {
    fn define(&self, api: &mut CircuitBuilder<F>) -> Result<(), CircuitError> {
        let root = api.public_input("root")?;
        let path: Vec<LC<F>> = api
            .secret_inputs("path", self.depth + 1)?
            .into_iter()
            .map(LC::from)
            .collect();
        let helpers: Vec<LC<F>> = api
            .secret_inputs("helper", self.depth)?
            .into_iter()
            .map(LC::from)
            .collect();
        verify_proof(api, &self.hasher, root, &path, &helpers)
    }
}

impl<F: CircuitField> MerkleCircuit<F> {
    pub fn new(hasher: MiMC<F>, depth: usize) -> Self {
        Self { hasher, depth }
    }

    /// Circuit sized for `proof`.
    pub fn for_proof(hasher: MiMC<F>, proof: &MerkleProof<F>) -> Self {
        Self::new(hasher, proof.helpers.len())
    }

    pub fn assignment(
        &self,
        root: F,
        proof: &MerkleProof<F>,
    ) -> Result<Assignment<F>, CircuitError> {
        if proof.helpers.len() != self.depth || proof.path.len() != self.depth + 1 {
            return Err(CircuitError::InvalidCircuitState(format!(
                "proof with {} siblings does not fit a circuit of depth {}",
                proof.path.len().saturating_sub(1),
                self.depth
            )));
        }
        let mut assignment = Assignment::new().with("root", root);
        assignment.insert_slice("path", &proof.path);
        assignment.insert_slice("helper", &proof.helper_values());
        Ok(assignment)
    }
}
