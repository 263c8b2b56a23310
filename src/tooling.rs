//! Tooling surfaces around the store library.

pub mod cli;
