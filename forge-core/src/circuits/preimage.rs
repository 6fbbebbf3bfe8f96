use crate::{
    field::CircuitField,
    gadgets::mimc::MiMC,
    r1cs::{Assignment, Circuit, CircuitBuilder, LC},
    utils::errors::CircuitError,
};

/// Knowledge of a MiMC preimage: `H(preimage) = hash` with `hash` public.
#[derive(Clone, Debug, Default)]
pub struct PreimageCircuit<F: CircuitField> {
    pub hasher: MiMC<F>,
}

impl<F: CircuitField> Circuit<F> for PreimageCircuit<F> {
    fn define(&self, api: &mut CircuitBuilder<F>) -> Result<(), CircuitError> {
        let preimage = api.secret_input("preimage")?;
        let hash = api.public_input("hash")?;
        let digest = self.hasher.hash_gadget(api, &[LC::from(preimage)])?;
        api.assert_is_equal(hash, digest)
    }
}

impl<F: CircuitField> PreimageCircuit<F> {
    pub fn new(hasher: MiMC<F>) -> Self {
        Self { hasher }
    }

    pub fn assignment(&self, preimage: F) -> Assignment<F> {
        Assignment::new()
            .with("preimage", preimage)
            .with("hash", self.hasher.hash(&[preimage]))
    }

    /// Preimage given as at most 32 big-endian bytes, hashed the way
    /// [`MiMC::hash_bytes`] does.
    pub fn assignment_from_bytes(&self, bytes: &[u8]) -> Result<Assignment<F>, CircuitError> {
        if bytes.len() > 32 {
            return Err(CircuitError::InvalidCircuitState(format!(
                "preimage of {} bytes does not fit in one field element",
                bytes.len()
            )));
        }
        Ok(Assignment::new()
            .with("preimage", F::from_be_bytes_mod_order(bytes))
            .with("hash", self.hasher.hash_bytes(bytes)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r1cs::CompiledCircuit;
    use ark_bn254::Fr;

    #[test]
    fn byte_preimage_matches_native_hash() {
        let circuit = PreimageCircuit::<Fr>::default();
        let compiled = CompiledCircuit::compile(&circuit).unwrap();
        let assignment = circuit.assignment_from_bytes(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(assignment, circuit.assignment(Fr::from(0x010203u64)));

        let witness = compiled.solve(&assignment).unwrap();
        assert!(compiled.r1cs().is_satisfied(&witness).is_ok());
        assert!(circuit.assignment_from_bytes(&[0u8; 33]).is_err());
    }
}
