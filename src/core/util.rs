//! Triangulation validation helpers.

pub mod delaunay_validation;

pub use delaunay_validation::*;
