use num_rational::BigRational;

use crate::assignments::{Assignments, SiteAssignment};
use crate::cell::{Cell, Scaling};
use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::sites::{Periodicity, Sites};
use crate::structure::Structure;
use crate::symmetries::{normalize_hall_symbol, Spacegroup};

type Result<T> = std::result::Result<T, CrystalError>;

// ======================== ASPECTS ========================

/// How a cell is given.
#[derive(Debug, Clone, PartialEq)]
pub enum CellSpec {
    /// Rows are the cell vectors.
    Basis(FracVector),
    /// Lengths and angles in degrees.
    LengthsAndAngles { lengths: FracVector, angles: FracVector },
    LengthsAndCosangles { lengths: FracVector, cosangles: FracVector },
    Niggli { niggli: FracVector, orientation: i32 },
    Metric { metric: FracVector, orientation: i32 },
    /// a, b, c and α, β, γ in degrees.
    Parameters {
        a: BigRational,
        b: BigRational,
        c: BigRational,
        alpha: BigRational,
        beta: BigRational,
        gamma: BigRational,
    },
    Cell(Cell),
}

impl CellSpec {
    /// Builds the cell. A Hall symbol fixes the lattice system of cells given by lengths and
    /// angles.
    pub fn to_cell(&self, hall_symbol: Option<&str>, precision: &BigRational) -> Result<Cell> {
        match self {
            CellSpec::Basis(basis) => Cell::with_precision(basis.clone(), precision),
            CellSpec::LengthsAndAngles { lengths, angles } => {
                Cell::from_lengths_and_angles(lengths, angles, hall_symbol, precision)
            }
            CellSpec::LengthsAndCosangles { lengths, cosangles } => {
                Cell::from_lengths_and_cosangles(lengths, cosangles, hall_symbol, precision)
            }
            CellSpec::Niggli { niggli, orientation } => Cell::from_niggli(niggli, *orientation, precision),
            CellSpec::Metric { metric, orientation } => Cell::from_metric(metric, *orientation, precision),
            CellSpec::Parameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            } => {
                let lengths = FracVector::from_rationals(vec![3], &[a.clone(), b.clone(), c.clone()])?;
                let angles =
                    FracVector::from_rationals(vec![3], &[alpha.clone(), beta.clone(), gamma.clone()])?;
                Cell::from_lengths_and_angles(&lengths, &angles, hall_symbol, precision)
            }
            CellSpec::Cell(cell) => Ok(cell.clone()),
        }
    }
}

/// How the sites of one view are given. Coordinates are reduced unless stated otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum SitesSpec {
    Sites(Sites),
    Coordgroups(Vec<FracVector>),
    CoordsAndCounts { coords: FracVector, counts: Vec<usize> },
    /// One occupancy per coordinate; groups follow the first appearance of each occupancy.
    CoordsAndOccupancies {
        coords: FracVector,
        occupancies: Vec<SiteAssignment>,
    },
    CartesianCoordgroups(Vec<FracVector>),
}

/// Sites built from a [`SitesSpec`], with the assignments implied by occupancies.
pub(crate) struct ResolvedSites {
    pub sites: Sites,
    pub occupancies: Option<Vec<SiteAssignment>>,
}

impl SitesSpec {
    /// Hall symbol carried by prebuilt sites.
    pub(crate) fn hall_symbol(&self) -> Option<&str> {
        match self {
            SitesSpec::Sites(sites) => Some(sites.hall_symbol()),
            _ => None,
        }
    }

    pub(crate) fn resolve(&self, cell: &Cell, hall_symbol: &str, pbc: Option<[bool; 3]>) -> Result<ResolvedSites> {
        let flags = pbc.unwrap_or([true; 3]);
        let (sites, occupancies) = match self {
            SitesSpec::Sites(sites) => {
                if normalize_hall_symbol(sites.hall_symbol()) != normalize_hall_symbol(hall_symbol) {
                    return Err(CrystalError::structure(format!(
                        "sites are in '{}' but the structure is in '{}'",
                        sites.hall_symbol(),
                        hall_symbol
                    )));
                }
                if pbc.is_some_and(|p| p != sites.pbc()) {
                    return Err(CrystalError::structure("periodicity contradicts the given sites"));
                }
                (sites.clone(), None)
            }
            SitesSpec::Coordgroups(groups) => (Sites::new(groups.clone(), hall_symbol, flags)?, None),
            SitesSpec::CoordsAndCounts { coords, counts } => {
                (Sites::from_coords_and_counts(coords, counts, hall_symbol, flags)?, None)
            }
            SitesSpec::CoordsAndOccupancies { coords, occupancies } => {
                let (sites, distinct) = Sites::from_coords_and_occupancies(coords, occupancies, hall_symbol, flags)?;
                (sites, Some(distinct))
            }
            SitesSpec::CartesianCoordgroups(groups) => {
                let reduced = cell.coordgroups_cartesian_to_reduced(groups)?;
                (Sites::new(reduced, hall_symbol, flags)?, None)
            }
        };
        Ok(ResolvedSites { sites, occupancies })
    }
}

/// How the spacegroup of the representative sites is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpacegroupSpec {
    /// Anything [`Spacegroup::parse`] accepts.
    Identifier(String),
    HallSymbol(String),
    Number { number: u16, setting: Option<String> },
}

impl SpacegroupSpec {
    pub fn resolve(&self) -> Result<Spacegroup> {
        match self {
            SpacegroupSpec::Identifier(identifier) | SpacegroupSpec::HallSymbol(identifier) => {
                Spacegroup::parse(identifier)
            }
            SpacegroupSpec::Number { number, setting } => Spacegroup::from_number(*number, setting.as_deref()),
        }
    }
}

// ======================== REQUEST ========================

/// Everything a [`crate::structure::Structure`] can be built from.
///
/// A representative view (cell, sites, spacegroup, Wyckoff data) and a unit-cell view (cell,
/// sites) can each be given; at least one is required. When both are given they must agree.
/// A request carrying an existing structure yields that structure and ignores everything else.
#[derive(Debug, Clone, Default)]
pub struct StructureRequest {
    pub structure: Option<Box<Structure>>,
    pub assignments: Option<Assignments>,
    pub rc_cell: Option<CellSpec>,
    pub rc_sites: Option<SitesSpec>,
    pub uc_cell: Option<CellSpec>,
    pub uc_sites: Option<SitesSpec>,
    pub spacegroup: Option<SpacegroupSpec>,
    pub rc_scaling: Option<Scaling>,
    pub uc_scaling: Option<Scaling>,
    pub periodicity: Option<Periodicity>,
    pub wyckoff_symbols: Option<Vec<char>>,
    pub multiplicities: Option<Vec<usize>>,
    pub entity_id: Option<String>,
}

impl StructureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = Some(Box::new(structure));
        self
    }

    pub fn with_assignments(mut self, assignments: Assignments) -> Self {
        self.assignments = Some(assignments);
        self
    }

    pub fn with_rc_cell(mut self, cell: CellSpec) -> Self {
        self.rc_cell = Some(cell);
        self
    }

    pub fn with_rc_basis(self, basis: FracVector) -> Self {
        self.with_rc_cell(CellSpec::Basis(basis))
    }

    pub fn with_rc_sites(mut self, sites: SitesSpec) -> Self {
        self.rc_sites = Some(sites);
        self
    }

    pub fn with_rc_coordgroups(self, coordgroups: Vec<FracVector>) -> Self {
        self.with_rc_sites(SitesSpec::Coordgroups(coordgroups))
    }

    pub fn with_uc_cell(mut self, cell: CellSpec) -> Self {
        self.uc_cell = Some(cell);
        self
    }

    pub fn with_uc_basis(self, basis: FracVector) -> Self {
        self.with_uc_cell(CellSpec::Basis(basis))
    }

    pub fn with_uc_sites(mut self, sites: SitesSpec) -> Self {
        self.uc_sites = Some(sites);
        self
    }

    pub fn with_uc_coordgroups(self, coordgroups: Vec<FracVector>) -> Self {
        self.with_uc_sites(SitesSpec::Coordgroups(coordgroups))
    }

    pub fn with_spacegroup(mut self, spacegroup: SpacegroupSpec) -> Self {
        self.spacegroup = Some(spacegroup);
        self
    }

    pub fn with_hall_symbol(self, hall_symbol: &str) -> Self {
        self.with_spacegroup(SpacegroupSpec::HallSymbol(hall_symbol.to_string()))
    }

    pub fn with_rc_scaling(mut self, scaling: Scaling) -> Self {
        self.rc_scaling = Some(scaling);
        self
    }

    pub fn with_uc_scaling(mut self, scaling: Scaling) -> Self {
        self.uc_scaling = Some(scaling);
        self
    }

    pub fn with_periodicity(mut self, periodicity: Periodicity) -> Self {
        self.periodicity = Some(periodicity);
        self
    }

    pub fn with_wyckoff_symbols(mut self, wyckoff_symbols: Vec<char>) -> Self {
        self.wyckoff_symbols = Some(wyckoff_symbols);
        self
    }

    pub fn with_multiplicities(mut self, multiplicities: Vec<usize>) -> Self {
        self.multiplicities = Some(multiplicities);
        self
    }

    pub fn with_entity_id(mut self, entity_id: &str) -> Self {
        self.entity_id = Some(entity_id.to_string());
        self
    }

    /// Rejects aspects that have nothing to apply to.
    pub(crate) fn check_combination(&self) -> Result<()> {
        let has_rc = self.rc_cell.is_some() || self.rc_sites.is_some();
        let has_uc = self.uc_cell.is_some() || self.uc_sites.is_some();
        if self.rc_cell.is_some() != self.rc_sites.is_some() {
            return Err(CrystalError::structure(
                "representative cell and representative sites must be given together",
            ));
        }
        if self.uc_cell.is_some() != self.uc_sites.is_some() {
            return Err(CrystalError::structure("unit cell and unit cell sites must be given together"));
        }
        if !has_rc && !has_uc {
            return Err(CrystalError::structure(
                "a structure needs representative or unit cell sites",
            ));
        }
        let rc_only = [
            ("spacegroup", self.spacegroup.is_some()),
            ("representative scaling", self.rc_scaling.is_some()),
            ("Wyckoff symbols", self.wyckoff_symbols.is_some()),
            ("multiplicities", self.multiplicities.is_some()),
        ];
        for (what, given) in rc_only {
            if given && !has_rc {
                return Err(CrystalError::structure(format!(
                    "{} given without representative sites",
                    what
                )));
            }
        }
        if self.uc_scaling.is_some() && !has_uc {
            return Err(CrystalError::structure("unit cell scaling given without unit cell sites"));
        }
        let rc_hall = self.rc_sites.as_ref().and_then(SitesSpec::hall_symbol);
        if has_rc && self.spacegroup.is_none() && rc_hall.is_none() {
            return Err(CrystalError::structure(
                "representative sites cannot be expanded without a spacegroup",
            ));
        }
        Ok(())
    }
}
