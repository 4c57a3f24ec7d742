use num_rational::BigRational;

use super::formulas::{anonymous_formula, anonymous_wyckoff_sequence, wyckoff_sequence};
use super::sites_utils::{
    checked_coordgroup, clean_coordgroups, coordgroups_reduced_to_unitcell, coordgroups_to_coords,
    coords_and_counts_to_coordgroups, coords_and_occupancies_to_coordgroups, default_coord_tolerance,
    pbc_to_nonperiodic_vecs,
};
use crate::cell::LatticeSystem;
use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::symmetries::{
    lattice_symbol_from_hall, lattice_system_from_hall, CrystalSystem, Spacegroup, SymmetryReduction,
};

type Result<T> = std::result::Result<T, CrystalError>;

pub const P1_HALL_SYMBOL: &str = "P 1";

/// Ordered groups of reduced coordinates under a Hall spacegroup.
///
/// Group `i` holds the positions of the `i`-th species assignment as an `[n, 3]` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Sites {
    coordgroups: Vec<FracVector>,
    hall_symbol: String,
    pbc: [bool; 3],
}

impl Sites {
    pub fn new(coordgroups: Vec<FracVector>, hall_symbol: impl Into<String>, pbc: [bool; 3]) -> Result<Self> {
        let coordgroups = coordgroups
            .iter()
            .map(checked_coordgroup)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            coordgroups,
            hall_symbol: hall_symbol.into(),
            pbc,
        })
    }

    /// Sites from a flat coordinate table split into consecutive groups of `counts` rows.
    pub fn from_coords_and_counts(
        coords: &FracVector,
        counts: &[usize],
        hall_symbol: impl Into<String>,
        pbc: [bool; 3],
    ) -> Result<Self> {
        Self::new(coords_and_counts_to_coordgroups(coords, counts)?, hall_symbol, pbc)
    }

    /// Sites grouped by occupancy, together with the distinct occupancies in group order.
    pub fn from_coords_and_occupancies<T: PartialEq + Clone>(
        coords: &FracVector,
        occupancies: &[T],
        hall_symbol: impl Into<String>,
        pbc: [bool; 3],
    ) -> Result<(Self, Vec<T>)> {
        let (groups, distinct) = coords_and_occupancies_to_coordgroups(coords, occupancies)?;
        Ok((Self::new(groups, hall_symbol, pbc)?, distinct))
    }

    pub fn coordgroups(&self) -> &[FracVector] {
        &self.coordgroups
    }

    /// All coordinates as one `[n, 3]` table, group after group.
    pub fn reduced_coords(&self) -> Result<FracVector> {
        Ok(coordgroups_to_coords(&self.coordgroups)?.0)
    }

    pub fn counts(&self) -> Vec<usize> {
        self.coordgroups.iter().map(|g| g.len()).collect()
    }

    pub fn number_of_sites(&self) -> usize {
        self.coordgroups.iter().map(|g| g.len()).sum()
    }

    /// Group index of every row of [`Sites::reduced_coords`].
    pub fn coords_groupnumber(&self) -> Vec<usize> {
        self.coordgroups
            .iter()
            .enumerate()
            .flat_map(|(i, g)| std::iter::repeat(i).take(g.len()))
            .collect()
    }

    pub fn hall_symbol(&self) -> &str {
        &self.hall_symbol
    }

    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    pub fn nonperiodic_vecs(&self) -> Result<usize> {
        pbc_to_nonperiodic_vecs(&self.pbc)
    }

    pub fn spacegroup(&self) -> Result<Spacegroup> {
        Spacegroup::parse(&self.hall_symbol)
    }

    /// Coordinates with denominators limited, see [`clean_coordgroups`].
    pub fn clean(&self) -> Result<Self> {
        Self::new(clean_coordgroups(&self.coordgroups)?, self.hall_symbol.clone(), self.pbc)
    }

    pub fn anonymous_formula(&self) -> Result<String> {
        anonymous_formula(&self.counts())
    }
}

/// Sites with every atom of the cell explicit, always in `P 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitcellSites {
    sites: Sites,
}

impl UnitcellSites {
    pub fn new(coordgroups: Vec<FracVector>, pbc: [bool; 3]) -> Result<Self> {
        Ok(Self {
            sites: Sites::new(coordgroups, P1_HALL_SYMBOL, pbc)?,
        })
    }

    pub fn from_coords_and_counts(coords: &FracVector, counts: &[usize], pbc: [bool; 3]) -> Result<Self> {
        Self::new(coords_and_counts_to_coordgroups(coords, counts)?, pbc)
    }

    pub fn as_sites(&self) -> &Sites {
        &self.sites
    }

    pub fn coordgroups(&self) -> &[FracVector] {
        self.sites.coordgroups()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.sites.counts()
    }

    pub fn total_number_of_atoms(&self) -> usize {
        self.sites.number_of_sites()
    }

    pub fn clean(&self) -> Result<Self> {
        Ok(Self {
            sites: self.sites.clean()?,
        })
    }
}

/// One representative per Wyckoff orbit, with optional Wyckoff letters and multiplicities in
/// the flattened order of the representatives.
#[derive(Debug, Clone, PartialEq)]
pub struct RepresentativeSites {
    sites: Sites,
    wyckoff_symbols: Option<Vec<char>>,
    multiplicities: Option<Vec<usize>>,
}

impl RepresentativeSites {
    pub fn new(
        sites: Sites,
        wyckoff_symbols: Option<Vec<char>>,
        multiplicities: Option<Vec<usize>>,
    ) -> Result<Self> {
        let n = sites.number_of_sites();
        for (what, len) in [
            ("Wyckoff symbols", wyckoff_symbols.as_ref().map(Vec::len)),
            ("multiplicities", multiplicities.as_ref().map(Vec::len)),
        ] {
            if let Some(len) = len {
                if len != n {
                    return Err(CrystalError::structure(format!(
                        "{} {} given for {} representative sites",
                        len, what, n
                    )));
                }
            }
        }
        Ok(Self {
            sites,
            wyckoff_symbols,
            multiplicities,
        })
    }

    pub fn from_reduction(reduction: &SymmetryReduction, pbc: [bool; 3]) -> Result<Self> {
        let sites = Sites::new(reduction.coordgroups.clone(), reduction.hall_symbol.clone(), pbc)?;
        Self::new(
            sites,
            Some(reduction.wyckoff_symbols.clone()),
            Some(reduction.multiplicities.clone()),
        )
    }

    pub fn as_sites(&self) -> &Sites {
        &self.sites
    }

    pub fn coordgroups(&self) -> &[FracVector] {
        self.sites.coordgroups()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.sites.counts()
    }

    pub fn hall_symbol(&self) -> &str {
        self.sites.hall_symbol()
    }

    pub fn wyckoff_symbols(&self) -> Option<&[char]> {
        self.wyckoff_symbols.as_deref()
    }

    pub fn multiplicities(&self) -> Option<&[usize]> {
        self.multiplicities.as_deref()
    }

    pub fn lattice_symbol(&self) -> Result<char> {
        lattice_symbol_from_hall(self.hall_symbol())
    }

    pub fn lattice_system(&self) -> Result<LatticeSystem> {
        lattice_system_from_hall(self.hall_symbol())
    }

    pub fn crystal_system(&self) -> Result<CrystalSystem> {
        Ok(self.sites.spacegroup()?.crystal_system())
    }

    /// Expands the representatives with the standard coordinate tolerance.
    pub fn get_uc_sites(&self) -> Result<UnitcellSites> {
        self.get_uc_sites_with_tolerance(&default_coord_tolerance())
    }

    pub fn get_uc_sites_with_tolerance(&self, eps: &BigRational) -> Result<UnitcellSites> {
        let spacegroup = self.sites.spacegroup()?;
        let pbc = self.sites.pbc();
        let groups = coordgroups_reduced_to_unitcell(self.coordgroups(), spacegroup.operations(), &pbc, eps)?;
        UnitcellSites::new(groups, self.sites.pbc())
    }

    /// Number of atoms in the unit cell: the sum of the multiplicities when known.
    pub fn total_number_of_atoms(&self) -> Result<usize> {
        match &self.multiplicities {
            Some(m) => Ok(m.iter().sum()),
            None => Ok(self.get_uc_sites()?.total_number_of_atoms()),
        }
    }

    pub fn wyckoff_sequence(&self) -> Option<String> {
        self.wyckoff_symbols.as_deref().map(wyckoff_sequence)
    }

    pub fn anonymous_wyckoff_sequence(&self) -> Result<Option<String>> {
        self.wyckoff_symbols
            .as_deref()
            .map(|w| anonymous_wyckoff_sequence(w, &self.counts()))
            .transpose()
    }

    pub fn clean(&self) -> Result<Self> {
        Ok(Self {
            sites: self.sites.clean()?,
            wyckoff_symbols: self.wyckoff_symbols.clone(),
            multiplicities: self.multiplicities.clone(),
        })
    }
}
