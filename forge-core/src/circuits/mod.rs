//! Ready-made circuits: each one pairs a [`Circuit`](crate::r1cs::Circuit) with the helper that
//! builds its [`Assignment`](crate::r1cs::Assignment).

pub mod cubic;
pub mod exponentiate;
pub mod merkle;
pub mod preimage;

pub use cubic::CubicCircuit;
pub use exponentiate::ExponentiateCircuit;
pub use merkle::MerkleCircuit;
pub use preimage::PreimageCircuit;
