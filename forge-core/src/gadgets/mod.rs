pub mod merkle;
pub mod mimc;
