//! Symstore: Content-Addressed Storage for Debugging Artifacts
//!
//! A producer publishes debug-info files and their matching executables into
//! a shared store; downstream tools locate the exact artifact for a running
//! binary via a fingerprint derived from the binary's embedded build-identity
//! fields, never from content hashing.

pub mod archive;
pub mod error;
pub mod fingerprint;
pub mod layout;
pub mod log;
pub mod logging;
pub mod parsers;
pub mod store;
pub mod tooling;
pub mod types;

pub use error::StoreError;
pub use store::Store;
