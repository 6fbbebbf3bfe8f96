#![allow(non_snake_case)]
#![allow(clippy::assertions_on_result_states)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::too_long_first_doc_paragraph)]

pub mod circuits;
pub mod field;
pub mod gadgets;
pub mod groth16;
pub mod msm;
pub mod r1cs;
pub mod utils;
