// Constants and runtime settings

use crate::error::CrystalError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Tolerances
pub const COORD_EQUALITY_TOLERANCE: (i64, i64) = (1, 1_000_000); // Squared distance under which two expanded sites coincide
pub const LATTICE_SYSTEM_TOLERANCE: (i64, i64) = (0, 1); // Default eps for lattice system classification (exact)
pub const PRIMITIVE_TRANSFORM_TOLERANCE: (i64, i64) = (1, 10_000); // eps when classifying cells built from lengths/angles

// Precision of rational approximations
pub const TRANSCENDENTAL_PRECISION: (i64, i64) = (1, 10_000_000_000); // Default eps for sin, cos, sqrt, ...
pub const STRING_MIN_ACCURACY: (i64, i64) = (1, 10_000); // Assumed accuracy of decimal strings without (sd)

// Search bounds
pub const DEFAULT_MAX_SEARCH_CELLS: usize = 20; // Per-dimension bound of the supercell lattice search
pub const DEFAULT_SUPERCELL_TOLERANCE: usize = 20; // Denominator bound of cubic/orthogonal supercell searches

/// Runtime settings, loadable from a TOML file.
///
/// Every field has a default taken from the constants above, so a settings file only needs to
/// name the values it changes:
///
/// ```toml
/// max_search_cells = 40
/// coord_tolerance = [1, 100000]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Squared-distance tolerance for unit-cell expansion, as `[numerator, denominator]`.
    pub coord_tolerance: (i64, i64),
    /// Precision of transcendental approximations, as `[numerator, denominator]`.
    pub precision: (i64, i64),
    /// Per-dimension bound of the supercell lattice search.
    pub max_search_cells: usize,
    /// Denominator bound used by the cubic and orthogonal supercell searches.
    pub supercell_tolerance: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            coord_tolerance: COORD_EQUALITY_TOLERANCE,
            precision: TRANSCENDENTAL_PRECISION,
            max_search_cells: DEFAULT_MAX_SEARCH_CELLS,
            supercell_tolerance: DEFAULT_SUPERCELL_TOLERANCE,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::Io`] if the file cannot be read and [`CrystalError::Config`] if
    /// its content does not deserialize into `Settings`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CrystalError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CrystalError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CrystalError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.coord_tolerance.1 <= 0 || settings.precision.1 <= 0 {
            return Err(CrystalError::math(
                "tolerance denominators in settings must be positive",
            ));
        }
        Ok(settings)
    }
}
