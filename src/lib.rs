//! Exact rational crystallography library
//!
//! This library provides exact arithmetic on rational tensors and the crystallographic data
//! model built on it: spacegroups, cells, sites, structures, supercells and phase diagrams.

pub mod assignments;
pub mod cell;
pub mod config;
pub mod error;
pub mod fracvector;
pub mod phasediagram;
pub mod sites;
pub mod structure;
pub mod supercell;
pub mod symmetries;

pub use error::CrystalError;
pub use fracvector::FracVector;
pub use structure::{Structure, StructureRequest};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, CrystalError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
