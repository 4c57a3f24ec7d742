use std::path::PathBuf;
use thiserror::Error;

/// The error type for all fallible operations in the `fracstruct` library.
///
/// Every variant corresponds to one failure kind of the crystallographic core. Errors coming
/// from collaborators (symmetry finders, metadata stores) are wrapped into
/// [`CrystalError::Collaborator`] together with the view that triggered the call.
#[derive(Error, Debug)]
pub enum CrystalError {
    /// Singular matrix, division by zero, shape mismatch or a value that had to be integral.
    #[error("Math error: {0}")]
    Math(String),

    /// Two operands (or an operand and an operation) disagree on tensor shape.
    #[error("Shape mismatch in {operation}: {left:?} vs {right:?}")]
    ShapeMismatch {
        /// The operation that was attempted.
        operation: &'static str,
        /// Shape of the left operand.
        left: Vec<usize>,
        /// Shape of the right operand.
        right: Vec<usize>,
    },

    /// Insufficient or contradictory structure construction inputs.
    #[error("Structure error: {0}")]
    Structure(String),

    /// No spacegroup in the table matched the given identifier.
    #[error("No matching spacegroup found for '{0}'")]
    SpacegroupUnknown(String),

    /// The identifier matched more than one spacegroup setting.
    #[error("Spacegroup '{identifier}' is ambiguous, {} candidates: {}", candidates.len(), candidates.join(", "))]
    SpacegroupAmbiguous {
        /// The identifier that was parsed.
        identifier: String,
        /// Hall symbols of every matching entry.
        candidates: Vec<String>,
    },

    /// The supercell transformation is not an integer matrix with positive determinant,
    /// or the resulting atom counts are not integral.
    #[error("Invalid supercell transformation: {0}")]
    Transform(String),

    /// The breadth-first lattice search ran out of cells before all atoms were found.
    #[error("Supercell search exhausted after {max_search_cells} cells per dimension; {missing} atoms still missing")]
    SearchExhausted {
        /// The per-dimension search bound that was used.
        max_search_cells: usize,
        /// Number of atoms that were expected but not found.
        missing: usize,
    },

    /// The compositions of a phase diagram do not span the space of its elements.
    #[error("Degenerate phase diagram: {0}")]
    PhaseDiagramDegenerate(String),

    /// An invariant of the library was violated. This always indicates a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    /// An error reported by an external collaborator, annotated with the view that needed it.
    #[error("{view} view: {source}")]
    Collaborator {
        /// The view (`rc`, `uc`, `pc`, `metadata`) whose materialization failed.
        view: &'static str,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O error while reading a settings file.
    #[error("I/O error at path '{path}': {source}")]
    Io {
        /// The path of the file that could not be read.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML or does not match [`crate::config::Settings`].
    #[error("Failed to deserialize settings: {0}")]
    Config(#[from] toml::de::Error),
}

impl CrystalError {
    pub(crate) fn math(msg: impl Into<String>) -> Self {
        CrystalError::Math(msg.into())
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        CrystalError::Structure(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        CrystalError::Internal(msg.into())
    }
}
