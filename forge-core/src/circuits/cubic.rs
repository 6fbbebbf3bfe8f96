use crate::{
    field::CircuitField,
    r1cs::{Assignment, Circuit, CircuitBuilder},
    utils::errors::CircuitError,
};

/// `x³ + x + 5 = y` with `x` secret and `y` public.
#[derive(Clone, Copy, Debug, Default)]
pub struct CubicCircuit;

impl<F: CircuitField> Circuit<F> for CubicCircuit {
    fn define(&self, api: &mut CircuitBuilder<F>) -> Result<(), CircuitError> {
        let x = api.secret_input("x")?;
        let y = api.public_input("y")?;
        let x3 = api.mul_many([x, x, x])?;
        let rhs = api.add_many([x3.into(), x.into(), api.constant(F::from(5u64))]);
        api.assert_is_equal(y, rhs)
    }
}

impl CubicCircuit {
    pub fn assignment<F: CircuitField>(x: F) -> Assignment<F> {
        Assignment::new()
            .with("x", x)
            .with("y", x * x * x + x + F::from(5u64))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::r1cs::CompiledCircuit;
    use ark_bn254::Fr;

    #[test]
    fn three_is_the_root_of_thirty_five() {
        let compiled = CompiledCircuit::<Fr>::compile(&CubicCircuit).unwrap();
        assert_eq!(compiled.r1cs().num_constraints, 3);
        let assignment = CubicCircuit::assignment(Fr::from(3u64));
        assert_eq!(assignment.get("y"), Some(&Fr::from(35u64)));
        let witness = compiled.solve(&assignment).unwrap();
        assert!(compiled.r1cs().is_satisfied(&witness).is_ok());

        let wrong = assignment.with("y", Fr::from(36u64));
        let witness = compiled.solve(&wrong).unwrap();
        assert!(compiled.r1cs().is_satisfied(&witness).is_err());
    }
}
