// Supercell module: re-expressing the atoms of a cell in a transformed cell
// Lattice offsets are searched breadth-first, everything stays exact

// ======================== MODULE DECLARATIONS ========================
pub mod lattice_offsets;
pub mod supercell_builder;
pub mod supercell_search;

mod _tests_supercell_builder;

// ======================== OFFSETS ========================
pub use lattice_offsets::{
    breadth_first_offsets, // fn(max_shell) -> impl Iterator<Item = [i64; 3]>
    shell_offsets,         // fn(shell) -> Vec<[i64; 3]> - max-norm shell, lexicographic
};

// ======================== BUILDER ========================
pub use supercell_builder::{
    build_supercell,       // fn(basis, groups, T, max_search_cells) -> Result<TransformedCell> - integer T
    transform_coordgroups, // fn(basis, groups, T, max_search_cells) -> Result<TransformedCell> - rational T
    TransformedCell,       // struct - new basis and sorted coordinate groups
};

// ======================== SEARCHES ========================
pub use supercell_search::{
    cubic_supercell_transformation,      // fn(basis, tolerance) -> Result<FracVector>
    orthogonal_supercell_transformation, // fn(basis, tolerance, ortho) -> Result<FracVector>
};
