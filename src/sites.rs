// Sites module: coordinate groups of a structure and the strings derived from them
// Representative sites expand to unit-cell sites through the operations of their Hall group

// ======================== MODULE DECLARATIONS ========================
pub mod formulas;
pub mod site_groups;
pub mod sites_utils;

mod _tests_site_groups;
mod _tests_sites_utils;

// ======================== SITE GROUPS ========================
pub use site_groups::{
    RepresentativeSites, // struct - representatives + Wyckoff letters and multiplicities
    Sites,               // struct - coordinate groups, Hall symbol, periodicity
    UnitcellSites,       // struct - every atom explicit, P 1
    P1_HALL_SYMBOL,      // const - "P 1"
};
// RepresentativeSites impl methods:
//   get_uc_sites(), get_uc_sites_with_tolerance(eps)    - symmetry expansion
//   wyckoff_sequence(), anonymous_wyckoff_sequence()
//   lattice_symbol(), lattice_system(), crystal_system()

// ======================== UTILITIES ========================
pub use sites_utils::{
    clean_coordgroups,                     // fn(groups) -> Result<Vec<FracVector>> - limit denominators
    coordgroups_reduced_to_unitcell,       // fn(groups, ops, pbc, eps) -> Result<Vec<FracVector>> - expand, dedupe, sort
    coordgroups_match,                     // fn(a, b, pbc, eps) -> Result<bool> - same sites up to eps
    coordgroups_to_coords,                 // fn(groups) -> Result<(FracVector, Vec<usize>)>
    coords_and_counts_to_coordgroups,      // fn(coords, counts) -> Result<Vec<FracVector>>
    coords_and_occupancies_to_coordgroups, // fn(coords, occupancies) -> Result<(groups, distinct occupancies)>
    coordswap,                             // fn(from, to, basis, groups) - swap two cell vectors
    default_coord_tolerance,               // fn() -> BigRational - 1e-6 on squared reduced distance
    min_image_distance_sqr,                // fn(a, b, pbc) -> Result<BigRational> - nearest periodic image
    pbc_to_nonperiodic_vecs,               // fn(&[bool; 3]) -> Result<usize>
    periodicity_to_pbc,                    // fn(Periodicity) -> Result<[bool; 3]>
    Periodicity,                           // enum - Pbc(flags) | NonPeriodicVecs(n)
};

// ======================== FORMULAS ========================
pub use formulas::{
    abstract_symbol,            // fn(n) -> String - A ... Z, Aa, Ab, ...
    anonymous_formula,          // fn(counts) -> Result<String>
    anonymous_wyckoff_sequence, // fn(wyckoff, counts) -> Result<String>
    element_wyckoff_sequence,   // fn(wyckoff, counts, labels) -> Result<String>
    format_formula_count,       // fn(&BigRational) -> Result<String>
    formula,                    // fn(symbols, ratios, counts) -> Result<String> - alphabetical, reduced
    formula_from_parts,         // fn(parts) -> Result<String>
    formula_spaceseparated,     // fn(parts) -> Result<String>
    normalized_formula_parts,   // fn(keys, ratios, counts) -> Result<Vec<(K, BigRational)>>
    sorted_formula_parts,       // fn(symbols, ratios, counts) -> Result<Vec<(String, BigRational)>>
    sorted_formula_totals,      // fn(symbols, ratios, counts) - unreduced, alphabetical
    wyckoff_sequence,           // fn(wyckoff) -> String - '&' sorts last
};
