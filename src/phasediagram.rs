// Phase diagram module: convex hulls of formation energies over composition space
// Every decomposition is an exact linear program, so hull membership has no tolerance

// ======================== MODULE DECLARATIONS ========================
pub mod phase_diagram;
pub mod simplex;
pub mod structure_phase_diagram;

mod _tests_simplex;

// ======================== SIMPLEX ========================
pub use simplex::{
    matrix_rank,       // fn(rows) -> usize - exact Gaussian elimination
    solve_equality_lp, // fn(costs, constraints, rhs) -> Result<LpOutcome> - two-phase, Bland's rule
    LpOutcome,         // enum - Optimal { value, solution } | Infeasible | Unbounded
};

// ======================== PHASE DIAGRAM ========================
pub use phase_diagram::{
    hull_data,     // fn(vectors, energies) -> Result<HullData>
    Decomposition, // struct - cheapest combination of other phases
    HullData,      // struct - hull/interior indices, distances, competitors, phase lines
    Phase,         // struct - id + element amounts
    PhaseDiagram,  // struct - phases with and without energies, lazy hull
};
// PhaseDiagram impl methods:
//   add_phase(phase, energy), add_phase_counts(symbols, counts, id, energy)
//   coord_system(), hull(), hull_indices(), hull_distances(), competing_indices()
//   phase_lines(), interior_competing_phase_lines(), hull_to_interior_competing_phase_lines()
//   hull_point_coords(), interior_point_coords(), other_point_coords(), coords()

// ======================== STRUCTURES ========================
pub use structure_phase_diagram::StructurePhaseDiagram; // struct - phases from Structure unit cells
