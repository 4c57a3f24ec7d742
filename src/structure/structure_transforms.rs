use log::debug;
use std::sync::OnceLock;

use super::crystal_structure::{RepresentativeView, Structure, UnitcellView};
use crate::cell::Cell;
use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::sites::UnitcellSites;
use crate::supercell::{
    build_supercell, cubic_supercell_transformation, orthogonal_supercell_transformation, transform_coordgroups,
    TransformedCell,
};

type Result<T> = std::result::Result<T, CrystalError>;

impl Structure {
    fn from_transformed(&self, transformed: TransformedCell) -> Result<Structure> {
        let pbc = self.uc()?.sites.as_sites().pbc();
        let uc = UnitcellView {
            cell: Cell::with_precision(transformed.basis, &self.precision())?,
            sites: UnitcellSites::new(transformed.coordgroups, pbc)?,
        };
        Ok(Structure::from_unitcell(
            self.assignments.clone(),
            uc,
            self.settings.clone(),
            self.symmetry_finder.clone(),
        ))
    }

    /// The unit cell re-expressed in `transformation · basis`. Rational transformations are
    /// accepted as long as every group keeps an integral number of atoms.
    pub fn transform(&self, transformation: &FracVector, max_search_cells: usize) -> Result<Structure> {
        let uc = self.uc()?;
        let transformed = transform_coordgroups(
            uc.cell.basis(),
            uc.sites.coordgroups(),
            transformation,
            max_search_cells,
        )?;
        self.from_transformed(transformed)
    }

    /// Supercell of the unit cell for an integer transformation with positive determinant.
    pub fn build_supercell(&self, transformation: &FracVector) -> Result<Structure> {
        let uc = self.uc()?;
        let transformed = build_supercell(
            uc.cell.basis(),
            uc.sites.coordgroups(),
            transformation,
            self.settings.max_search_cells,
        )?;
        debug!(
            "Built supercell with {} atoms from {} atoms",
            transformed.total_number_of_atoms(),
            uc.sites.total_number_of_atoms()
        );
        self.from_transformed(transformed)
    }

    /// Supercell as close to cubic as `tolerance` repetitions allow, exact when `None`.
    pub fn build_cubic_supercell(&self, tolerance: Option<usize>) -> Result<Structure> {
        let transformation = cubic_supercell_transformation(self.uc_basis()?, tolerance)?;
        self.build_supercell(&transformation)
    }

    /// Supercell whose cell vectors selected by `ortho` are as close to orthogonal as
    /// `tolerance` repetitions allow.
    pub fn build_orthogonal_supercell(&self, tolerance: Option<usize>, ortho: [bool; 3]) -> Result<Structure> {
        let transformation = orthogonal_supercell_transformation(self.uc_basis()?, tolerance, ortho)?;
        self.build_supercell(&transformation)
    }

    /// Limits the denominators of the bases and coordinates of the views built so far.
    pub fn clean(&self) -> Result<Structure> {
        let rc = match self.rc.get() {
            Some(rc) => Some(RepresentativeView {
                cell: rc.cell.clean()?,
                sites: rc.sites.clean()?,
            }),
            None => None,
        };
        let uc = match self.uc.get() {
            Some(uc) => Some(UnitcellView {
                cell: uc.cell.clean()?,
                sites: uc.sites.clean()?,
            }),
            None => None,
        };
        if rc.is_none() && uc.is_none() {
            return Err(CrystalError::internal("structure has neither a rc nor a uc view"));
        }
        let structure = Structure {
            assignments: self.assignments.clone(),
            rc: OnceLock::new(),
            uc: OnceLock::new(),
            cc: OnceLock::new(),
            pc: OnceLock::new(),
            rc_given: self.rc_given,
            settings: self.settings.clone(),
            symmetry_finder: self.symmetry_finder.clone(),
            entity_id: self.entity_id.clone(),
        };
        if let Some(rc) = rc {
            let _ = structure.rc.set(rc);
        }
        if let Some(uc) = uc {
            let _ = structure.uc.set(uc);
        }
        Ok(structure)
    }
}
