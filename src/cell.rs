// Cell module: crystal cells and the geometry of their bases
// Conversions between bases, Niggli matrices, metric tensors and lengths/angles, exact where possible

// ======================== MODULE DECLARATIONS ========================
pub mod cell_conversions;
pub mod crystal_cell;
pub mod lattice_systems;

// Test modules
mod _tests_cell_conversions;
mod _tests_crystal_cell;
mod _tests_lattice_systems;

// ======================== LATTICE SYSTEMS ========================
pub use lattice_systems::{
    lattice_system_from_lengths_and_cosangles, // fn(lengths, cosangles, eps) -> Result<LatticeSystem>
    lattice_system_from_niggli,                // fn(niggli, eps) -> Result<LatticeSystem>
    standard_order_axes_transform,             // fn(niggli, eps) -> Result<Option<FracVector>> - axis permutation
    AxisTests,                                 // struct - equal lengths, 90° and 120° tests
    LatticeSystem,                             // enum - cubic ... triclinic, unknown
};

// ======================== CONVERSIONS ========================
pub use cell_conversions::{
    angles_to_cosangles,                           // fn(angles, prec) -> Result<FracVector>
    basis_to_niggli_and_orientation,               // fn(basis) -> Result<(FracVector, i32)>
    get_primitive_to_conventional_basis_transform, // fn(basis) -> Result<FracVector> - identity on failure
    lengths_and_angles_to_niggli,                  // fn(lengths, angles, prec) -> Result<FracVector>
    lengths_and_cosangles_to_conventional_basis,   // fn(lengths, cosangles, system, orientation, prec)
    lengths_and_cosangles_to_niggli,               // fn(lengths, cosangles) -> Result<FracVector>
    metric_to_niggli,                              // fn(metric) -> Result<FracVector>
    niggli_scale_to_vol,                           // fn(niggli, scale, prec) -> Result<BigRational>
    niggli_to_basis,                               // fn(niggli, orientation, prec) -> Result<FracVector>
    niggli_to_conventional_basis,                  // fn(niggli, system, orientation, prec)
    niggli_to_lengths_and_angles,                  // fn(niggli, prec) -> Result<(FracVector, FracVector)>
    niggli_to_lengths_and_cosangles,               // fn(niggli, prec) -> Result<(FracVector, FracVector)>
    niggli_to_metric,                              // fn(niggli) -> Result<FracVector>
    primitive_basis_transform,                     // fn(lattice_symbol) -> Result<FracVector> - P, A, B, C, I, F, R
    scale_to_vol,                                  // fn(basis, scale) -> Result<BigRational>
    scaling_to_scale,                              // fn(basis, scaling, prec) -> Result<BigRational>
    scaling_to_volume,                             // fn(basis, scaling) -> Result<BigRational>
    vol_to_scale,                                  // fn(basis, vol, prec) -> Result<BigRational>
    Scaling,                                       // enum - Scale(factor) | Volume(target)
};

// ======================== CELL ========================
pub use crystal_cell::{
    Cell,                  // struct - basis with Niggli matrix, metric, lattice system, lengths
    CLEAN_MAX_DENOMINATOR, // const - 5_000_000
};
// Cell impl methods:
//   new(basis), with_precision(basis, prec)                     - classify exactly
//   from_niggli, from_metric, from_lengths_and_cosangles, from_lengths_and_angles
//   scaled(&Scaling), get_normalized(), get_normalized_longestvec(), clean()
//   coords_reduced_to_cartesian / coords_cartesian_to_reduced (+ coordgroups variants)
