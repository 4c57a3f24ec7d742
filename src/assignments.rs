// Assignments module: which species occupy each coordinate group

// ======================== MODULE DECLARATIONS ========================
pub mod periodic_table;
pub mod site_assignments;

// Test modules
mod _tests_periodic_table;
mod _tests_site_assignments;

// ======================== PERIODIC TABLE ========================
pub use periodic_table::{
    atomic_number,   // fn(symbol: &str) -> Result<u8> - symbol or decimal number
    atomic_symbol,   // fn(z: u8) -> Result<&'static str>
    ELEMENT_SYMBOLS, // const - H ... Og
};

// ======================== ASSIGNMENTS ========================
pub use site_assignments::{
    Assignment,     // struct - Z, ratio, optional isotope weight and magnetic moment
    Assignments,    // struct - one SiteAssignment per coordinate group
    Extension,      // enum - disordered, isotope, magnetic_moments
    SiteAssignment, // struct - species sharing a site, ratios sum to <= 1
};
