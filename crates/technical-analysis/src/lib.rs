pub mod indicators;
pub mod quote;

#[cfg(test)]
mod indicators_tests;

pub use indicators::*;
pub use quote::*;
