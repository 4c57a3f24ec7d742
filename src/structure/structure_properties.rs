use num_bigint::BigInt;
use num_rational::BigRational;

use super::collaborators::{MetadataStore, StructureRef, StructureTag};
use super::crystal_structure::Structure;
use crate::assignments::Extension;
use crate::cell::{Cell, LatticeSystem};
use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::sites::{
    anonymous_formula, element_wyckoff_sequence, formula, formula_spaceseparated, sorted_formula_parts,
    sorted_formula_totals,
};
use crate::symmetries::{CrystalSystem, Spacegroup};

type Result<T> = std::result::Result<T, CrystalError>;

impl Structure {
    // ======================== UNIT CELL ========================

    pub fn uc_cell(&self) -> Result<&Cell> {
        Ok(&self.uc()?.cell)
    }

    pub fn uc_basis(&self) -> Result<&FracVector> {
        Ok(self.uc()?.cell.basis())
    }

    pub fn uc_counts(&self) -> Result<Vec<usize>> {
        Ok(self.uc()?.sites.counts())
    }

    pub fn uc_nbr_atoms(&self) -> Result<usize> {
        Ok(self.uc()?.sites.total_number_of_atoms())
    }

    pub fn uc_reduced_coordgroups(&self) -> Result<&[FracVector]> {
        Ok(self.uc()?.sites.coordgroups())
    }

    /// All unit-cell coordinates stacked group by group.
    pub fn uc_reduced_coords(&self) -> Result<FracVector> {
        self.uc()?.sites.as_sites().reduced_coords()
    }

    pub fn uc_cartesian_coordgroups(&self) -> Result<Vec<FracVector>> {
        let uc = self.uc()?;
        uc.cell.coordgroups_reduced_to_cartesian(uc.sites.coordgroups())
    }

    pub fn uc_cartesian_coords(&self) -> Result<FracVector> {
        let uc = self.uc()?;
        uc.cell.coords_reduced_to_cartesian(&uc.sites.as_sites().reduced_coords()?)
    }

    pub fn uc_lengths(&self) -> Result<&FracVector> {
        Ok(self.uc()?.cell.lengths())
    }

    pub fn uc_cosangles(&self) -> Result<&FracVector> {
        Ok(self.uc()?.cell.cosangles())
    }

    /// Cell angles in degrees.
    pub fn uc_angles(&self) -> Result<FracVector> {
        self.uc()?.cell.angles()
    }

    pub fn uc_volume(&self) -> Result<BigRational> {
        Ok(self.uc()?.cell.volume())
    }

    // ======================== REPRESENTATIVE CELL ========================

    pub fn rc_cell(&self) -> Result<&Cell> {
        Ok(&self.rc()?.cell)
    }

    pub fn rc_basis(&self) -> Result<&FracVector> {
        Ok(self.rc()?.cell.basis())
    }

    pub fn rc_counts(&self) -> Result<Vec<usize>> {
        Ok(self.rc()?.sites.counts())
    }

    pub fn rc_nbr_atoms(&self) -> Result<usize> {
        Ok(self.rc()?.sites.counts().iter().sum())
    }

    pub fn rc_reduced_coordgroups(&self) -> Result<&[FracVector]> {
        Ok(self.rc()?.sites.coordgroups())
    }

    pub fn rc_reduced_coords(&self) -> Result<FracVector> {
        self.rc()?.sites.as_sites().reduced_coords()
    }

    pub fn rc_cartesian_coordgroups(&self) -> Result<Vec<FracVector>> {
        let rc = self.rc()?;
        rc.cell.coordgroups_reduced_to_cartesian(rc.sites.coordgroups())
    }

    pub fn rc_cartesian_coords(&self) -> Result<FracVector> {
        let rc = self.rc()?;
        rc.cell.coords_reduced_to_cartesian(&rc.sites.as_sites().reduced_coords()?)
    }

    pub fn rc_lengths(&self) -> Result<&FracVector> {
        Ok(self.rc()?.cell.lengths())
    }

    pub fn rc_angles(&self) -> Result<FracVector> {
        self.rc()?.cell.angles()
    }

    pub fn rc_volume(&self) -> Result<BigRational> {
        Ok(self.rc()?.cell.volume())
    }

    // ======================== PRIMITIVE CELL ========================

    pub fn pc_cell(&self) -> Result<&Cell> {
        Ok(&self.pc()?.cell)
    }

    pub fn pc_basis(&self) -> Result<&FracVector> {
        Ok(self.pc()?.cell.basis())
    }

    pub fn pc_counts(&self) -> Result<Vec<usize>> {
        Ok(self.pc()?.sites.counts())
    }

    pub fn pc_nbr_atoms(&self) -> Result<usize> {
        Ok(self.pc()?.sites.total_number_of_atoms())
    }

    pub fn pc_reduced_coordgroups(&self) -> Result<&[FracVector]> {
        Ok(self.pc()?.sites.coordgroups())
    }

    pub fn pc_reduced_coords(&self) -> Result<FracVector> {
        self.pc()?.sites.as_sites().reduced_coords()
    }

    pub fn pc_cartesian_coords(&self) -> Result<FracVector> {
        let pc = self.pc()?;
        pc.cell.coords_reduced_to_cartesian(&pc.sites.as_sites().reduced_coords()?)
    }

    pub fn pc_lengths(&self) -> Result<&FracVector> {
        Ok(self.pc()?.cell.lengths())
    }

    pub fn pc_angles(&self) -> Result<FracVector> {
        self.pc()?.cell.angles()
    }

    pub fn pc_volume(&self) -> Result<BigRational> {
        Ok(self.pc()?.cell.volume())
    }

    // ======================== FORMULAS ========================

    fn uc_species_counts(&self) -> Result<(Vec<String>, Vec<BigRational>, Vec<usize>)> {
        self.assignments.species_counts(&self.uc_counts()?)
    }

    /// Alphabetical reduced formula of the unit cell, e.g. `ClNa`.
    pub fn formula(&self) -> Result<String> {
        let (symbols, ratios, counts) = self.uc_species_counts()?;
        formula(&symbols, &ratios, &counts)
    }

    pub fn formula_spaceseparated(&self) -> Result<String> {
        let (symbols, ratios, counts) = self.uc_species_counts()?;
        formula_spaceseparated(&sorted_formula_parts(&symbols, &ratios, &counts)?)
    }

    pub fn anonymous_formula(&self) -> Result<String> {
        anonymous_formula(&self.uc_counts()?)
    }

    pub fn formula_symbols(&self) -> Result<Vec<String>> {
        let (symbols, ratios, counts) = self.uc_species_counts()?;
        Ok(sorted_formula_parts(&symbols, &ratios, &counts)?
            .into_iter()
            .map(|(symbol, _)| symbol)
            .collect())
    }

    pub fn formula_counts(&self) -> Result<Vec<BigRational>> {
        let (symbols, ratios, counts) = self.uc_species_counts()?;
        Ok(sorted_formula_parts(&symbols, &ratios, &counts)?
            .into_iter()
            .map(|(_, count)| count)
            .collect())
    }

    /// Per-element atom totals of the unit cell, not reduced.
    pub fn uc_formula_parts(&self) -> Result<Vec<(String, BigRational)>> {
        let (symbols, ratios, counts) = self.uc_species_counts()?;
        sorted_formula_totals(&symbols, &ratios, &counts)
    }

    pub fn number_of_elements(&self) -> usize {
        self.assignments.elements().len()
    }

    pub fn volume_per_atom(&self) -> Result<BigRational> {
        let atoms = self.uc_nbr_atoms()?;
        if atoms == 0 {
            return Err(CrystalError::structure("volume per atom of an empty structure"));
        }
        Ok(self.uc_volume()? / BigRational::from_integer(BigInt::from(atoms)))
    }

    // ======================== SYMMETRY ========================

    pub fn spacegroup(&self) -> Result<Spacegroup> {
        self.rc()?.sites.as_sites().spacegroup()
    }

    pub fn spacegroup_number(&self) -> Result<u16> {
        Ok(self.spacegroup()?.number())
    }

    pub fn hall_symbol(&self) -> Result<&str> {
        Ok(self.rc()?.sites.hall_symbol())
    }

    pub fn lattice_system(&self) -> Result<LatticeSystem> {
        self.rc()?.sites.lattice_system()
    }

    pub fn crystal_system(&self) -> Result<CrystalSystem> {
        self.rc()?.sites.crystal_system()
    }

    pub fn wyckoff_sequence(&self) -> Result<Option<String>> {
        Ok(self.rc()?.sites.wyckoff_sequence())
    }

    pub fn anonymous_wyckoff_sequence(&self) -> Result<Option<String>> {
        self.rc()?.sites.anonymous_wyckoff_sequence()
    }

    /// Wyckoff multiset keyed by the species of each site, `None` without Wyckoff symbols.
    pub fn element_wyckoff_sequence(&self) -> Result<Option<String>> {
        let rc = self.rc()?;
        match rc.sites.wyckoff_symbols() {
            Some(wyckoff) => Ok(Some(element_wyckoff_sequence(
                wyckoff,
                &rc.sites.counts(),
                &self.assignments.wyckoff_labels(),
            )?)),
            None => Ok(None),
        }
    }

    // ======================== EXTENSIONS ========================

    pub fn extensions(&self) -> Vec<Extension> {
        self.assignments.extensions()
    }

    /// True for disordered, isotope-labelled or magnetic structures.
    pub fn extended(&self) -> bool {
        self.assignments.extended()
    }

    // ======================== METADATA ========================

    fn required_entity_id(&self) -> Result<&str> {
        self.entity_id()
            .ok_or_else(|| CrystalError::structure("structure has no entity id for metadata lookup"))
    }

    pub fn tags(&self, store: &dyn MetadataStore) -> Result<Vec<StructureTag>> {
        store
            .get_tags(self.required_entity_id()?)
            .map_err(|source| CrystalError::Collaborator { view: "metadata", source })
    }

    pub fn refs(&self, store: &dyn MetadataStore) -> Result<Vec<StructureRef>> {
        store
            .get_refs(self.required_entity_id()?)
            .map_err(|source| CrystalError::Collaborator { view: "metadata", source })
    }
}
