pub mod arena;
pub mod builder;
pub mod gates;
pub mod ops;
pub mod system;
pub mod witness;


pub use builder::{Circuit, CircuitBuilder};
pub use ops::{Variable, LC};
pub use system::{CompiledCircuit, R1CS};
pub use witness::{Assignment, PublicWitness, Witness};
