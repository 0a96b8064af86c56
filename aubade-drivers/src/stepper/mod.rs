//! Stepper driver implementations

pub mod uln2003;

pub use uln2003::Uln2003;
