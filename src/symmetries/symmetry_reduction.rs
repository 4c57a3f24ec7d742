use log::{debug, warn};
use std::collections::{BTreeSet, HashSet};

use super::spacegroup_table::spacegroup_table;
use super::symmetry_operations::SymmetryOperation;
use crate::error::CrystalError;
use crate::fracvector::FracVector;

type Result<T> = std::result::Result<T, CrystalError>;

/// Wyckoff letter used for the generic position.
pub const GENERIC_WYCKOFF: char = '&';

/// Result of reducing unit-cell coordinates to representatives under a spacegroup.
///
/// `wyckoff_symbols` and `multiplicities` follow the flattened order of `coordgroups`.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryReduction {
    pub basis: FracVector,
    pub coordgroups: Vec<FracVector>,
    pub hall_symbol: String,
    pub wyckoff_symbols: Vec<char>,
    pub multiplicities: Vec<usize>,
}

/// Rows of every group, normalized into [0, 1).
pub(crate) fn normalized_groups(coordgroups: &[FracVector]) -> Result<Vec<Vec<FracVector>>> {
    coordgroups
        .iter()
        .map(|group| Ok(group.rows()?.iter().map(|c| c.normalize().simplify()).collect()))
        .collect()
}

/// Distinct images of `coord` under `ops`, modulo lattice translations.
pub fn orbit(coord: &FracVector, ops: &[SymmetryOperation]) -> Result<Vec<FracVector>> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();
    for op in ops {
        let image = op.apply(coord)?.normalize().simplify();
        if seen.insert(image.clone()) {
            images.push(image);
        }
    }
    Ok(images)
}

/// True if `op` maps every coordinate group exactly onto itself.
pub fn maps_onto_itself(op: &SymmetryOperation, groups: &[Vec<FracVector>]) -> Result<bool> {
    for group in groups {
        let members: HashSet<&FracVector> = group.iter().collect();
        for coord in group {
            let image = op.apply(coord)?.normalize().simplify();
            if !members.contains(&image) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Keeps one coordinate per orbit, in input order.
pub fn reduce_by_operations(
    group: &[FracVector],
    ops: &[SymmetryOperation],
) -> Result<Vec<(FracVector, usize)>> {
    let mut kept: Vec<(FracVector, usize)> = Vec::new();
    let mut covered: HashSet<FracVector> = HashSet::new();
    for coord in group {
        if covered.contains(coord) {
            continue;
        }
        let images = orbit(coord, ops)?;
        let multiplicity = images.len();
        covered.extend(images);
        kept.push((coord.clone(), multiplicity));
    }
    Ok(kept)
}

/// Placeholder Wyckoff letters: `a`, `b`, ... by ascending multiplicity, with
/// [`GENERIC_WYCKOFF`] for orbits as large as the group. `P 1` only has `a`.
pub fn wyckoff_letters(multiplicities: &[usize], group_order: usize) -> Vec<char> {
    if group_order <= 1 {
        return vec!['a'; multiplicities.len()];
    }
    let special: BTreeSet<usize> = multiplicities
        .iter()
        .copied()
        .filter(|&m| m < group_order)
        .collect();
    multiplicities
        .iter()
        .map(|m| {
            if *m >= group_order {
                GENERIC_WYCKOFF
            } else {
                let rank = special.iter().position(|s| s == m).unwrap_or(0);
                char::from(b'a' + (rank % 26) as u8)
            }
        })
        .collect()
}

fn as_coordgroup(rows: &[FracVector]) -> Result<FracVector> {
    if rows.is_empty() {
        Ok(FracVector::zeros(&[0, 3]))
    } else {
        Ok(FracVector::stack_vecs(rows)?.simplify())
    }
}

fn reduce_with(
    basis: &FracVector,
    groups: &[Vec<FracVector>],
    hall_symbol: &str,
    ops: &[SymmetryOperation],
) -> Result<SymmetryReduction> {
    let mut coordgroups = Vec::with_capacity(groups.len());
    let mut multiplicities = Vec::new();
    for group in groups {
        let kept = reduce_by_operations(group, ops)?;
        let rows: Vec<FracVector> = kept.iter().map(|(c, _)| c.clone()).collect();
        coordgroups.push(as_coordgroup(&rows)?);
        multiplicities.extend(kept.iter().map(|(_, m)| *m));
    }
    Ok(SymmetryReduction {
        basis: basis.clone(),
        coordgroups,
        hall_symbol: hall_symbol.to_string(),
        wyckoff_symbols: wyckoff_letters(&multiplicities, ops.len()),
        multiplicities,
    })
}

/// Reduces a unit cell without a symmetry finder.
///
/// Every operation of the spacegroup table that maps the structure exactly onto itself is
/// collected; if that set is the operation list of a table entry, the coordinates are reduced
/// under it. Otherwise the structure is returned unchanged in `P 1`.
pub fn trivial_symmetry_reduce(
    basis: &FracVector,
    coordgroups: &[FracVector],
) -> Result<SymmetryReduction> {
    let table = spacegroup_table()?;
    let groups = normalized_groups(coordgroups)?;

    let mut symmetric = Vec::new();
    for op in table.all_operations() {
        if maps_onto_itself(op, &groups)? {
            symmetric.push(*op);
        }
    }
    debug!("{} table operations map the structure onto itself", symmetric.len());

    if let Some(entry) = table
        .index_with_operations(&symmetric)
        .and_then(|i| table.entry(i))
    {
        debug!("Trivial reduction matched '{}'", entry.hall_symbol);
        return reduce_with(basis, &groups, entry.hall_symbol, &entry.operations);
    }

    warn!("Trivial symmetry reduction found no matching spacegroup, falling back to P 1");
    let identity = [SymmetryOperation::identity()];
    reduce_with(basis, &groups, "P 1", &identity)
}
