use crate::{
    field::CircuitField,
    r1cs::{Assignment, Circuit, CircuitBuilder, LC},
    utils::errors::CircuitError,
};

/// `y = x^e` by square-and-multiply over the bits of `e`. `x` and `y` are public, `e` is secret.
#[derive(Clone, Copy, Debug)]
pub struct ExponentiateCircuit {
    pub bit_size: usize,
}

impl Default for ExponentiateCircuit {
    fn default() -> Self {
        Self { bit_size: 8 }
    }
}

impl<F: CircuitField> Circuit<F> for ExponentiateCircuit {
    fn define(&self, api: &mut CircuitBuilder<F>) -> Result<(), CircuitError> {
        let x = api.public_input("x")?;
        let y = api.public_input("y")?;
        let e = api.secret_input("e")?;

        let bits = api.to_binary(e, self.bit_size)?;
        let mut output: LC<F> = api.constant(F::one());
        let mut multiply: LC<F> = x.into();
        for bit in bits {
            let product = api.mul(output.clone(), multiply.clone())?;
            output = api.select(bit, product, output)?.into();
            multiply = api.square(multiply)?.into();
        }
        api.assert_is_equal(y, output)
    }
}

impl ExponentiateCircuit {
    pub fn assignment<F: CircuitField>(x: F, e: u64) -> Assignment<F> {
        Assignment::new()
            .with("x", x)
            .with("y", x.pow([e]))
            .with("e", F::from(e))
    }
}
