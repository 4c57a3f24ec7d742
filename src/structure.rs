// Structure module: the facade tying cells, sites and assignments together
// Views are derived lazily from whatever the construction request gave and cached once built

// ======================== MODULE DECLARATIONS ========================
pub mod collaborators;
pub mod crystal_structure;
pub mod structure_properties;
pub mod structure_request;
pub mod structure_transforms;

// Test modules
mod _tests_collaborators;
mod _tests_crystal_structure;
mod _tests_structure_transforms;

// ======================== COLLABORATORS ========================
pub use collaborators::{
    CollaboratorError,     // type - boxed error returned by collaborators
    InMemoryMetadataStore, // struct - tags and refs keyed by entity id
    MetadataStore,         // trait - get_tags(id), get_refs(id)
    StructureRef,          // struct - literature reference
    StructureTag,          // struct - name/value pair
    SymmetryFinder,        // trait - reduce(basis, coordgroups) -> SymmetryReduction
    TrivialSymmetryFinder, // struct - spacegroup table search, P 1 fallback
};

// ======================== REQUEST ========================
pub use structure_request::{
    CellSpec,         // enum - basis | lengths+angles | Niggli | metric | a..gamma | cell
    SitesSpec,        // enum - sites | coordgroups | coords+counts | coords+occupancies | cartesian
    SpacegroupSpec,   // enum - identifier | Hall symbol | number+setting
    StructureRequest, // struct - builder over all aspects, validated by Structure::create
};

// ======================== STRUCTURE ========================
pub use crystal_structure::{
    RepresentativeView, // struct - rc cell + representative sites
    Structure,          // struct - assignments + lazily derived rc/uc/cc/pc views
    UnitcellView,       // struct - cell + every atom explicit
};
// Structure impl methods:
//   create(request), create_with_settings(request, settings), with_symmetry_finder(finder)
//   rc(), uc(), cc(), pc()                                       - lazy views
//   uc_*/rc_*/pc_* accessors: basis, counts, coords, lengths, angles, volume
//   formula(), anonymous_formula(), uc_formula_parts(), volume_per_atom()
//   spacegroup(), hall_symbol(), wyckoff_sequence(), tags(store), refs(store)
//   transform(T, max), build_supercell(T), build_cubic_supercell(tol), clean()
