use log::{debug, warn};
use num_rational::BigRational;
use std::sync::{Arc, OnceLock};

use super::collaborators::{SymmetryFinder, TrivialSymmetryFinder};
use super::structure_request::{ResolvedSites, StructureRequest};
use crate::assignments::{Assignments, SiteAssignment};
use crate::cell::{
    get_primitive_to_conventional_basis_transform, primitive_basis_transform, standard_order_axes_transform, Cell,
};
use crate::config::{Settings, PRIMITIVE_TRANSFORM_TOLERANCE};
use crate::error::CrystalError;
use crate::fracvector::frac_math::ratio_from_pair;
use crate::fracvector::FracVector;
use crate::sites::{coordgroups_match, periodicity_to_pbc, RepresentativeSites, UnitcellSites, P1_HALL_SYMBOL};
use crate::supercell::transform_coordgroups;
use crate::symmetries::Spacegroup;

type Result<T> = std::result::Result<T, CrystalError>;

// ======================== VIEWS ========================

/// Representative cell: the cell the spacegroup operations refer to and one site per orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentativeView {
    pub cell: Cell,
    pub sites: RepresentativeSites,
}

/// A cell with every atom explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitcellView {
    pub cell: Cell,
    pub sites: UnitcellSites,
}

impl RepresentativeView {
    /// Expands the representatives in the same cell.
    pub fn expand(&self, eps: &BigRational) -> Result<UnitcellView> {
        Ok(UnitcellView {
            cell: self.cell.clone(),
            sites: self.sites.get_uc_sites_with_tolerance(eps)?,
        })
    }
}

// ======================== STRUCTURE ========================

/// A crystal structure: species assignments plus a representative view, a unit-cell view or
/// both.
///
/// Missing views are derived on first use and cached; a cache is filled at most once and never
/// invalidated. `rc` comes from `uc` through the symmetry finder, `uc` and `cc` from `rc` by
/// symmetry expansion, and `pc` from `cc` through the primitive transform of the Hall lattice
/// symbol.
#[derive(Debug, Clone)]
pub struct Structure {
    pub(crate) assignments: Assignments,
    pub(crate) rc: OnceLock<RepresentativeView>,
    pub(crate) uc: OnceLock<UnitcellView>,
    pub(crate) cc: OnceLock<UnitcellView>,
    pub(crate) pc: OnceLock<UnitcellView>,
    pub(crate) rc_given: bool,
    pub(crate) settings: Settings,
    pub(crate) symmetry_finder: Arc<dyn SymmetryFinder>,
    pub(crate) entity_id: Option<String>,
}

impl Structure {
    pub fn create(request: StructureRequest) -> Result<Self> {
        Self::create_with_settings(request, &Settings::default())
    }

    /// Validates the request and builds the views it describes. Nothing is derived yet, except
    /// the symmetry expansion needed to check a request that gives both views.
    ///
    /// An existing structure in the request is returned as is, with its own settings and caches.
    pub fn create_with_settings(request: StructureRequest, settings: &Settings) -> Result<Self> {
        if let Some(structure) = request.structure {
            debug!("Structure request reuses an existing structure");
            return Ok(*structure);
        }
        request.check_combination()?;
        let precision = ratio_from_pair(settings.precision);
        let pbc = request.periodicity.map(periodicity_to_pbc).transpose()?;
        let mut occupancies: Vec<Vec<SiteAssignment>> = Vec::new();

        let rc = match (&request.rc_cell, &request.rc_sites) {
            (Some(cell_spec), Some(sites_spec)) => {
                let spacegroup = match (&request.spacegroup, sites_spec.hall_symbol()) {
                    (Some(spec), _) => spec.resolve()?,
                    (None, Some(hall_symbol)) => Spacegroup::parse(hall_symbol)?,
                    (None, None) => {
                        return Err(CrystalError::structure(
                            "representative sites cannot be expanded without a spacegroup",
                        ))
                    }
                };
                let hall_symbol = spacegroup.hall_symbol();
                let mut cell = cell_spec.to_cell(Some(hall_symbol), &precision)?;
                if let Some(scaling) = &request.rc_scaling {
                    cell = cell.scaled(scaling)?;
                }
                let ResolvedSites { sites, occupancies: occ } = sites_spec.resolve(&cell, hall_symbol, pbc)?;
                occupancies.extend(occ);
                let sites =
                    RepresentativeSites::new(sites, request.wyckoff_symbols.clone(), request.multiplicities.clone())?;
                Some(RepresentativeView { cell, sites })
            }
            _ => None,
        };

        let uc = match (&request.uc_cell, &request.uc_sites) {
            (Some(cell_spec), Some(sites_spec)) => {
                let mut cell = cell_spec.to_cell(None, &precision)?;
                if let Some(scaling) = &request.uc_scaling {
                    cell = cell.scaled(scaling)?;
                }
                let ResolvedSites { sites, occupancies: occ } = sites_spec.resolve(&cell, P1_HALL_SYMBOL, pbc)?;
                occupancies.extend(occ);
                let sites = UnitcellSites::new(sites.coordgroups().to_vec(), sites.pbc())?;
                Some(UnitcellView { cell, sites })
            }
            _ => None,
        };

        let assignments = resolve_assignments(request.assignments, occupancies)?;
        let ngroups = match (&rc, &uc) {
            (Some(rc), _) => rc.sites.coordgroups().len(),
            (None, Some(uc)) => uc.sites.coordgroups().len(),
            (None, None) => return Err(CrystalError::internal("structure request passed without views")),
        };
        if assignments.len() != ngroups {
            return Err(CrystalError::structure(format!(
                "{} site assignments for {} coordinate groups",
                assignments.len(),
                ngroups
            )));
        }

        let structure = Structure {
            assignments,
            rc: OnceLock::new(),
            uc: OnceLock::new(),
            cc: OnceLock::new(),
            pc: OnceLock::new(),
            rc_given: rc.is_some(),
            settings: settings.clone(),
            symmetry_finder: Arc::new(TrivialSymmetryFinder),
            entity_id: request.entity_id,
        };

        match (rc, uc) {
            (Some(rc), Some(uc)) => {
                let eps = structure.coord_tolerance();
                let expanded = rc.expand(&eps)?;
                check_consistent(&expanded, &uc, &eps)?;
                let _ = structure.rc.set(rc);
                let _ = structure.uc.set(uc);
            }
            (Some(rc), None) => {
                let _ = structure.rc.set(rc);
            }
            (None, Some(uc)) => {
                let _ = structure.uc.set(uc);
            }
            (None, None) => {}
        }
        Ok(structure)
    }

    /// A structure holding only a unit-cell view.
    pub(crate) fn from_unitcell(
        assignments: Assignments,
        uc: UnitcellView,
        settings: Settings,
        symmetry_finder: Arc<dyn SymmetryFinder>,
    ) -> Self {
        let structure = Structure {
            assignments,
            rc: OnceLock::new(),
            uc: OnceLock::new(),
            cc: OnceLock::new(),
            pc: OnceLock::new(),
            rc_given: false,
            settings,
            symmetry_finder,
            entity_id: None,
        };
        let _ = structure.uc.set(uc);
        structure
    }

    /// Replaces the symmetry finder used to derive the representative view.
    ///
    /// Has no effect once that view exists.
    pub fn with_symmetry_finder(mut self, finder: Arc<dyn SymmetryFinder>) -> Self {
        self.symmetry_finder = finder;
        self
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub(crate) fn precision(&self) -> BigRational {
        ratio_from_pair(self.settings.precision)
    }

    pub(crate) fn coord_tolerance(&self) -> BigRational {
        ratio_from_pair(self.settings.coord_tolerance)
    }

    // ======================== VIEWS ========================

    /// The representative view, derived from the unit cell on first use.
    pub fn rc(&self) -> Result<&RepresentativeView> {
        if let Some(rc) = self.rc.get() {
            return Ok(rc);
        }
        let rc = self.derive_rc()?;
        Ok(self.rc.get_or_init(|| rc))
    }

    /// The unit-cell view, the expansion of the representative view when not given.
    pub fn uc(&self) -> Result<&UnitcellView> {
        if let Some(uc) = self.uc.get() {
            return Ok(uc);
        }
        let uc = self.rc()?.expand(&self.coord_tolerance())?;
        debug!("Derived uc view with {} atoms", uc.sites.total_number_of_atoms());
        Ok(self.uc.get_or_init(|| uc))
    }

    /// The conventional cell: the representative view expanded in its own cell. Same as `uc`
    /// when the structure was given by representatives.
    pub fn cc(&self) -> Result<&UnitcellView> {
        if self.rc_given {
            return self.uc();
        }
        if let Some(cc) = self.cc.get() {
            return Ok(cc);
        }
        let cc = self.rc()?.expand(&self.coord_tolerance())?;
        Ok(self.cc.get_or_init(|| cc))
    }

    /// The primitive cell.
    pub fn pc(&self) -> Result<&UnitcellView> {
        if let Some(pc) = self.pc.get() {
            return Ok(pc);
        }
        let pc = self.derive_pc()?;
        Ok(self.pc.get_or_init(|| pc))
    }

    fn derive_rc(&self) -> Result<RepresentativeView> {
        let uc = self
            .uc
            .get()
            .ok_or_else(|| CrystalError::internal("structure has neither a rc nor a uc view"))?;
        let pbc = uc.sites.as_sites().pbc();

        // Centred cells are reduced in their conventional setting
        let to_conventional = get_primitive_to_conventional_basis_transform(uc.cell.basis())?;
        let (basis, coordgroups) = if to_conventional == FracVector::eye(3) {
            (uc.cell.basis().clone(), uc.sites.coordgroups().to_vec())
        } else {
            match transform_coordgroups(
                uc.cell.basis(),
                uc.sites.coordgroups(),
                &to_conventional,
                self.settings.max_search_cells,
            ) {
                Ok(conventional) => (conventional.basis, conventional.coordgroups),
                Err(e) => {
                    warn!("Conventional cell not reachable ({}), reducing the unit cell as given", e);
                    (uc.cell.basis().clone(), uc.sites.coordgroups().to_vec())
                }
            }
        };

        let reduction = self
            .symmetry_finder
            .reduce(&basis, &coordgroups)
            .map_err(|source| CrystalError::Collaborator { view: "rc", source })?;
        debug!("Derived rc view in '{}'", reduction.hall_symbol);
        let cell = Cell::with_precision(reduction.basis.clone(), &self.precision())?;
        let sites = RepresentativeSites::from_reduction(&reduction, pbc)?;
        Ok(RepresentativeView { cell, sites })
    }

    fn derive_pc(&self) -> Result<UnitcellView> {
        let lattice_symbol = self.rc()?.sites.lattice_symbol()?;
        let cc = self.cc()?;
        let primitive = primitive_basis_transform(lattice_symbol)?;
        let eps = ratio_from_pair(PRIMITIVE_TRANSFORM_TOLERANCE);
        let transformation = match standard_order_axes_transform(cc.cell.niggli_matrix(), &eps)? {
            Some(axes) => primitive.mul(&axes)?,
            None => primitive,
        };
        let transformed = transform_coordgroups(
            cc.cell.basis(),
            cc.sites.coordgroups(),
            &transformation,
            self.settings.max_search_cells,
        )?;
        debug!(
            "Derived pc view for lattice symbol {} with {} atoms",
            lattice_symbol,
            transformed.total_number_of_atoms()
        );
        Ok(UnitcellView {
            cell: Cell::with_precision(transformed.basis, &self.precision())?,
            sites: UnitcellSites::new(transformed.coordgroups, cc.sites.as_sites().pbc())?,
        })
    }
}

/// Explicit assignments, or the ones implied by occupancies; both must agree when given.
fn resolve_assignments(
    explicit: Option<Assignments>,
    occupancies: Vec<Vec<SiteAssignment>>,
) -> Result<Assignments> {
    let mut implied = occupancies.into_iter().map(Assignments::new);
    let first = implied.next();
    if let Some(first) = &first {
        if implied.any(|other| &other != first) {
            return Err(CrystalError::structure(
                "occupancies of the representative and unit cell sites disagree",
            ));
        }
    }
    match (explicit, first) {
        (Some(explicit), Some(implied)) if explicit != implied => Err(CrystalError::structure(
            "assignments contradict the occupancies of the sites",
        )),
        (Some(explicit), _) => Ok(explicit),
        (None, Some(implied)) => Ok(implied),
        (None, None) => Err(CrystalError::structure("a structure needs site assignments")),
    }
}

/// The given unit cell must be the expansion of the given representatives: the same basis and
/// the same sites in every group, both up to the squared-distance tolerance `eps`.
fn check_consistent(expanded: &UnitcellView, given: &UnitcellView, eps: &BigRational) -> Result<()> {
    for (a, b) in expanded.cell.basis().rows()?.iter().zip(given.cell.basis().rows()?.iter()) {
        if &a.try_sub(b)?.lengthsqr()?.to_rational()? > eps {
            return Err(CrystalError::structure(
                "representative and unit cell bases differ",
            ));
        }
    }
    let groups_a = expanded.sites.coordgroups();
    let groups_b = given.sites.coordgroups();
    if groups_a.len() != groups_b.len() {
        return Err(CrystalError::structure("representative and unit cell group counts differ"));
    }
    let pbc = given.sites.as_sites().pbc();
    for (i, (a, b)) in groups_a.iter().zip(groups_b).enumerate() {
        if !coordgroups_match(a, b, &pbc, eps)? {
            return Err(CrystalError::structure(format!(
                "unit cell group {} is not the expansion of its representatives",
                i
            )));
        }
    }
    Ok(())
}
