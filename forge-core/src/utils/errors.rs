use ark_serialize::SerializationError;
use thiserror::Error;

/// Failures while describing, compiling or solving a circuit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Invalid circuit state: {0}")]
    InvalidCircuitState(String),
    #[error("Bit decomposition of width {requested} is not unique in this field (max {max})")]
    InvalidBitWidth { requested: usize, max: usize },
    #[error("No assignment provided for input `{0}`")]
    MissingAssignment(String),
    #[error("Witness does not satisfy constraint {row}")]
    UnsatisfiedConstraint { row: usize },
}

#[derive(Error, Debug)]
pub enum Groth16Error {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error("Witness violates constraint {row}; refusing to prove")]
    WitnessConstraintViolation { row: usize },
    #[error("Proof verification failed")]
    VerificationFailed,
    #[error("Invalid public input length, expected length {expected} but got {actual}")]
    InvalidPublicInputLength { expected: usize, actual: usize },
    #[error("No evaluation domain of size {0} exists for this field")]
    DomainTooLarge(usize),
    #[error("Key was generated for a different constraint system shape")]
    ShapeMismatch,
    #[error("Length Error: bases: {0}, scalars: {1}")]
    Msm(usize, usize),
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),
}
