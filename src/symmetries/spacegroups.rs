use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::hall_symbols::operations_from_hall;
use super::spacegroup_table::{spacegroup_table, SpacegroupEntry, SpacegroupTable};
use super::symmetry_operations::{close_group, SymmetryOperation};
use crate::cell::LatticeSystem;
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// The seven crystal systems.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Cubic,
    Unknown,
}

impl CrystalSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrystalSystem::Triclinic => "triclinic",
            CrystalSystem::Monoclinic => "monoclinic",
            CrystalSystem::Orthorhombic => "orthorhombic",
            CrystalSystem::Tetragonal => "tetragonal",
            CrystalSystem::Trigonal => "trigonal",
            CrystalSystem::Hexagonal => "hexagonal",
            CrystalSystem::Cubic => "cubic",
            CrystalSystem::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CrystalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crystal system from the International Tables number.
pub fn crystal_system_from_number(number: u16) -> CrystalSystem {
    match number {
        1..=2 => CrystalSystem::Triclinic,
        3..=15 => CrystalSystem::Monoclinic,
        16..=74 => CrystalSystem::Orthorhombic,
        75..=142 => CrystalSystem::Tetragonal,
        143..=167 => CrystalSystem::Trigonal,
        168..=194 => CrystalSystem::Hexagonal,
        195..=230 => CrystalSystem::Cubic,
        _ => CrystalSystem::Unknown,
    }
}

/// The lattice centring letter of a Hall symbol (`P`, `A`, `B`, `C`, `I`, `R` or `F`).
pub fn lattice_symbol_from_hall(hall: &str) -> Result<char> {
    let symbol = hall.trim().trim_start_matches('-');
    match symbol.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c @ ('P' | 'A' | 'B' | 'C' | 'I' | 'R' | 'F')) => Ok(c),
        _ => Err(CrystalError::SpacegroupUnknown(hall.to_string())),
    }
}

/// Lattice system of a Hall symbol; trigonal groups are rhombohedral when the lattice is
/// `R` or the symbol uses the body-diagonal axis, hexagonal otherwise.
pub fn lattice_system_from_hall(hall: &str) -> Result<LatticeSystem> {
    let spacegroup = Spacegroup::parse(hall)?;
    Ok(spacegroup.lattice_system())
}

/// A resolved spacegroup setting from the shared table.
#[derive(Debug, Clone, Copy)]
pub struct Spacegroup {
    entry: &'static SpacegroupEntry,
}

impl PartialEq for Spacegroup {
    fn eq(&self, other: &Self) -> bool {
        self.entry.hall_symbol == other.entry.hall_symbol
    }
}

impl Eq for Spacegroup {}

impl Spacegroup {
    /// Resolves a user identifier.
    ///
    /// Tried in order: a Hall symbol from the table, any Hall symbol generating the same
    /// operations as a table entry, `number[:setting]`, a Hermann-Mauguin symbol with optional
    /// `:setting`, a Schoenflies symbol such as `Oh^5`, and a list of operations in `x,y,z`
    /// notation separated by `;`. Without a setting, numbers and Schoenflies symbols refer to
    /// the standard settings.
    pub fn parse(identifier: &str) -> Result<Self> {
        let table = spacegroup_table()?;
        let text = identifier.trim();
        if text.is_empty() {
            return Err(CrystalError::SpacegroupUnknown(identifier.to_string()));
        }

        let stages: [fn(&SpacegroupTable, &str) -> Result<Option<usize>>; 6] = [
            match_table_hall,
            match_hall_operations,
            match_number,
            match_hm,
            match_schoenflies,
            match_operation_list,
        ];
        for stage in stages {
            if let Some(index) = stage(table, text)? {
                let entry = table
                    .entry(index)
                    .ok_or_else(|| CrystalError::internal("spacegroup index out of range"))?;
                debug!("Resolved spacegroup '{}' to '{}'", text, entry.hall_symbol);
                return Ok(Self { entry });
            }
        }
        Err(CrystalError::SpacegroupUnknown(identifier.to_string()))
    }

    pub fn from_number(number: u16, setting: Option<&str>) -> Result<Self> {
        match setting {
            Some(s) => Self::parse(&format!("{}:{}", number, s)),
            None => Self::parse(&number.to_string()),
        }
    }

    /// The trivial group `P 1`.
    pub fn p1() -> Result<Self> {
        Self::parse("P 1")
    }

    pub fn number(&self) -> u16 {
        self.entry.number
    }

    pub fn setting(&self) -> &'static str {
        self.entry.setting
    }

    pub fn hall_symbol(&self) -> &'static str {
        self.entry.hall_symbol
    }

    pub fn hm_symbol(&self) -> &'static str {
        self.entry.hm_symbol
    }

    pub fn schoenflies_symbol(&self) -> &'static str {
        &self.entry.schoenflies_symbol
    }

    /// Whether this is the setting a bare IT number refers to.
    pub fn is_standard_setting(&self) -> bool {
        self.entry.standard
    }

    pub fn operations(&self) -> &'static [SymmetryOperation] {
        &self.entry.operations
    }

    /// Number of operations in the conventional cell, centring included.
    pub fn order(&self) -> usize {
        self.entry.operations.len()
    }

    pub fn crystal_system(&self) -> CrystalSystem {
        crystal_system_from_number(self.entry.number)
    }

    pub fn lattice_symbol(&self) -> char {
        // Table symbols always start with a valid lattice letter
        lattice_symbol_from_hall(self.entry.hall_symbol).unwrap_or('P')
    }

    pub fn lattice_system(&self) -> LatticeSystem {
        match self.crystal_system() {
            CrystalSystem::Triclinic => LatticeSystem::Triclinic,
            CrystalSystem::Monoclinic => LatticeSystem::Monoclinic,
            CrystalSystem::Orthorhombic => LatticeSystem::Orthorhombic,
            CrystalSystem::Tetragonal => LatticeSystem::Tetragonal,
            CrystalSystem::Trigonal
                if self.lattice_symbol() == 'R' || self.entry.hall_symbol.contains('*') =>
            {
                LatticeSystem::Rhombohedral
            }
            CrystalSystem::Trigonal | CrystalSystem::Hexagonal => LatticeSystem::Hexagonal,
            CrystalSystem::Cubic => LatticeSystem::Cubic,
            CrystalSystem::Unknown => LatticeSystem::Unknown,
        }
    }

    pub fn is_centrosymmetric(&self) -> bool {
        self.entry
            .operations
            .iter()
            .any(|op| op.rotation == -nalgebra::Matrix3::identity())
    }
}

impl fmt::Display for Spacegroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, #{}", self.entry.hall_symbol, self.entry.hm_symbol, self.entry.number)?;
        if !self.entry.setting.is_empty() {
            write!(f, ":{}", self.entry.setting)?;
        }
        write!(f, ")")
    }
}

fn unique_candidate(table: &SpacegroupTable, identifier: &str, candidates: &[usize]) -> Result<Option<usize>> {
    match candidates {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        many => Err(CrystalError::SpacegroupAmbiguous {
            identifier: identifier.to_string(),
            candidates: many
                .iter()
                .filter_map(|&i| table.entry(i))
                .map(|e| e.hall_symbol.to_string())
                .collect(),
        }),
    }
}

fn split_setting(text: &str) -> (&str, Option<&str>) {
    match text.split_once(':') {
        Some((main, setting)) => (main.trim(), Some(setting.trim())),
        None => (text, None),
    }
}

/// Entries with exactly the given setting. Failing that, an origin choice `1` or `2` also
/// selects among axis permutations, e.g. `P n c b:1` finds setting `1cab`.
fn filter_setting(table: &SpacegroupTable, indices: &[usize], setting: Option<&str>) -> Vec<usize> {
    let Some(setting) = setting else {
        return indices.to_vec();
    };
    let setting_of = |i: usize| table.entry(i).map_or("", |e| e.setting);
    let exact: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| setting_of(i).eq_ignore_ascii_case(setting))
        .collect();
    if !exact.is_empty() || !matches!(setting, "1" | "2") {
        return exact;
    }
    indices
        .iter()
        .copied()
        .filter(|&i| setting_of(i).starts_with(setting))
        .collect()
}

fn standard_only(table: &SpacegroupTable, indices: Vec<usize>) -> Vec<usize> {
    indices
        .into_iter()
        .filter(|&i| table.entry(i).is_some_and(|e| e.standard))
        .collect()
}

fn match_table_hall(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    Ok(table.index_of_hall(text))
}

fn match_hall_operations(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    // `P 3 2 1` is also a valid Hall symbol, for a different group
    if !table.indices_with_hm(split_setting(text).0).is_empty() {
        return Ok(None);
    }
    match operations_from_hall(text) {
        Ok(ops) => Ok(table.index_with_operations(&ops)),
        Err(_) => Ok(None),
    }
}

fn match_number(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    let (main, setting) = split_setting(text);
    let number: u16 = match main.parse() {
        Ok(n) => n,
        Err(_) => return Ok(None),
    };
    let candidates = match setting {
        Some(_) => filter_setting(table, &table.indices_with_number(number), setting),
        None => standard_only(table, table.indices_with_number(number)),
    };
    unique_candidate(table, text, &candidates)
}

fn match_hm(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    let (main, setting) = split_setting(text);
    let candidates = filter_setting(table, table.indices_with_hm(main), setting);
    unique_candidate(table, text, &candidates)
}

fn match_schoenflies(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    let (main, setting) = split_setting(text);
    let candidates = filter_setting(table, table.indices_with_schoenflies(main), setting);
    unique_candidate(table, text, &candidates)
}

fn match_operation_list(table: &SpacegroupTable, text: &str) -> Result<Option<usize>> {
    if !text.contains(',') {
        return Ok(None);
    }
    let ops = match text
        .split(|c| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(SymmetryOperation::parse)
        .collect::<Result<Vec<_>>>()
    {
        Ok(ops) => ops,
        Err(_) => return Ok(None),
    };
    let group = match close_group(&ops) {
        Ok(group) => group,
        Err(_) => return Ok(None),
    };
    Ok(table.index_with_operations(&group))
}
