//! Geometric utility functions.

pub mod circumsphere;

pub use circumsphere::*;
