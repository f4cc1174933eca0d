//! Concrete repository implementations.

pub mod session;
