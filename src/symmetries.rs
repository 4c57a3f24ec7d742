// Symmetries module: symmetry operations, Hall symbol generation and the spacegroup table
// Spacegroups are resolved from Hall symbols, IT numbers, Hermann-Mauguin symbols or operation lists

// ======================== MODULE DECLARATIONS ========================
pub mod hall_symbols;
pub mod spacegroup_table;
pub mod spacegroups;
pub mod symmetry_operations;
pub mod symmetry_reduction;

// Test modules
mod _tests_hall_symbols;
mod _tests_symmetry_operations;
mod _tests_symmetry_reduction;

// ======================== SYMMETRY OPERATIONS ========================
pub use symmetry_operations::{
    SymmetryOperation,  // struct - integer rotation + translation in twelfths
    close_group,        // fn(generators: &[SymmetryOperation]) -> Result<Vec<SymmetryOperation>> - group closure
    TRANSLATION_DENOM,  // const - 12
};
// SymmetryOperation impl methods:
//   new(rotation, translation) -> Self                 - translation reduced mod 12
//   identity(), inversion(), pure_translation(t)      - basic operations
//   compose(&self, other) -> Self                      - self after other
//   inverse(&self), with_origin_shift(&self, v)        - group algebra
//   apply(&self, coord: &FracVector) -> Result<FracVector> - exact action on a reduced coordinate
//   parse(text) / Display                              - `x,y,z` notation

// ======================== HALL SYMBOLS ========================
pub use hall_symbols::{
    hall_generators,       // fn(symbol: &str) -> Result<Vec<SymmetryOperation>> - generators of a Hall symbol
    normalize_hall_symbol, // fn(symbol: &str) -> String - canonical spelling
    operations_from_hall,  // fn(symbol: &str) -> Result<Vec<SymmetryOperation>> - closed operation list
};

// ======================== SPACEGROUPS ========================
pub use spacegroup_table::{
    schoenflies_from_number, // fn(number: u16) -> Option<String> - e.g. "Oh^5"
    spacegroup_table,        // fn() -> Result<&'static SpacegroupTable> - shared table, built on first use
    SpacegroupEntry,         // struct - number, setting, symbols and operations of one setting
    SpacegroupTable,         // struct - lookups by Hall, operations, number, HM and Schoenflies symbol
    SPACEGROUP_SETTINGS,     // const - (number, setting, Hall, HM) rows for all 530 settings
};
pub use spacegroups::{
    crystal_system_from_number, // fn(number: u16) -> CrystalSystem
    lattice_symbol_from_hall,   // fn(hall: &str) -> Result<char>
    lattice_system_from_hall,   // fn(hall: &str) -> Result<LatticeSystem>
    CrystalSystem,              // enum - the seven crystal systems
    Spacegroup,                 // struct - resolved table entry
};
// Spacegroup impl methods:
//   parse(identifier: &str) -> Result<Spacegroup>       - Hall, equivalent Hall, number[:setting], HM[:setting], Schoenflies, operation list
//   from_number(number: u16, setting: Option<&str>)      - by IT number
//   number(), setting(), hall_symbol(), hm_symbol(), schoenflies_symbol(), operations(), order()
//   is_standard_setting()
//   crystal_system(), lattice_system(), lattice_symbol(), is_centrosymmetric()

// ======================== REDUCTION ========================
pub use symmetry_reduction::{
    orbit,                   // fn(coord, ops) -> Result<Vec<FracVector>> - distinct images mod lattice
    trivial_symmetry_reduce, // fn(basis, coordgroups) -> Result<SymmetryReduction> - table-driven reduction
    SymmetryReduction,       // struct - rc basis, coordgroups, Hall symbol, Wyckoff letters, multiplicities
    GENERIC_WYCKOFF,         // const - '&'
};
