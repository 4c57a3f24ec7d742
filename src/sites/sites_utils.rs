use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::cell::CLEAN_MAX_DENOMINATOR;
use crate::config::COORD_EQUALITY_TOLERANCE;
use crate::error::CrystalError;
use crate::fracvector::frac_math::ratio_from_pair;
use crate::fracvector::FracVector;
use crate::symmetries::SymmetryOperation;

type Result<T> = std::result::Result<T, CrystalError>;

/// Boundary conditions of a set of sites.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Periodicity {
    /// Explicit periodicity flag per cell vector.
    Pbc([bool; 3]),
    /// The first `n` cell vectors are non-periodic, the rest periodic.
    NonPeriodicVecs(usize),
}

impl Default for Periodicity {
    fn default() -> Self {
        Periodicity::Pbc([true; 3])
    }
}

/// Squared reduced distance under which two expanded sites are taken to coincide.
pub fn default_coord_tolerance() -> BigRational {
    ratio_from_pair(COORD_EQUALITY_TOLERANCE)
}

pub fn periodicity_to_pbc(periodicity: Periodicity) -> Result<[bool; 3]> {
    match periodicity {
        Periodicity::Pbc(pbc) => Ok(pbc),
        Periodicity::NonPeriodicVecs(n) if n <= 3 => {
            let mut pbc = [true; 3];
            pbc.iter_mut().take(n).for_each(|p| *p = false);
            Ok(pbc)
        }
        Periodicity::NonPeriodicVecs(n) => Err(CrystalError::structure(format!(
            "{} non-periodic vectors requested for a three dimensional cell",
            n
        ))),
    }
}

/// Number of non-periodic cell vectors. They must come before the periodic ones.
pub fn pbc_to_nonperiodic_vecs(pbc: &[bool; 3]) -> Result<usize> {
    let n = pbc.iter().filter(|p| !**p).count();
    if pbc.iter().take(n).any(|p| *p) {
        return Err(CrystalError::structure(format!(
            "non-periodic cell vectors must come first, got pbc {:?}",
            pbc
        )));
    }
    Ok(n)
}

// ======================== COORDINATE GROUPS ========================

pub(crate) fn empty_coordgroup() -> FracVector {
    FracVector::zeros(&[0, 3])
}

/// An `[n, 3]` table (empty groups are `[0, 3]`) with the smallest common denominator.
pub(crate) fn checked_coordgroup(group: &FracVector) -> Result<FracVector> {
    if group.is_empty() {
        return Ok(empty_coordgroup());
    }
    let dims = group.dims();
    if dims.len() != 2 || dims[1] != 3 {
        return Err(CrystalError::ShapeMismatch {
            operation: "coordinate group",
            left: dims.to_vec(),
            right: vec![dims.first().copied().unwrap_or(1), 3],
        });
    }
    Ok(group.simplify())
}

pub(crate) fn rows_to_coordgroup(rows: &[FracVector]) -> Result<FracVector> {
    if rows.is_empty() {
        return Ok(empty_coordgroup());
    }
    checked_coordgroup(&FracVector::stack_vecs(rows)?)
}

/// Splits a flat `[n, 3]` coordinate table into consecutive groups of the given sizes.
pub fn coords_and_counts_to_coordgroups(coords: &FracVector, counts: &[usize]) -> Result<Vec<FracVector>> {
    let coords = checked_coordgroup(coords)?;
    let total: usize = counts.iter().sum();
    if total != coords.len() {
        return Err(CrystalError::structure(format!(
            "counts sum to {} but {} coordinates were given",
            total,
            coords.len()
        )));
    }
    let mut start = 0;
    let mut groups = Vec::with_capacity(counts.len());
    for &count in counts {
        groups.push(checked_coordgroup(&coords.slice(start..start + count)?)?);
        start += count;
    }
    Ok(groups)
}

/// Flattens coordinate groups into one table and the per-group counts.
pub fn coordgroups_to_coords(coordgroups: &[FracVector]) -> Result<(FracVector, Vec<usize>)> {
    let counts = coordgroups.iter().map(|g| g.len()).collect();
    let nonempty: Vec<FracVector> = coordgroups.iter().filter(|g| !g.is_empty()).cloned().collect();
    if nonempty.is_empty() {
        return Ok((empty_coordgroup(), counts));
    }
    Ok((FracVector::chain_vecs(&nonempty)?.simplify(), counts))
}

/// Groups coordinates by occupancy. Groups are numbered by the first occurrence of each
/// distinct occupancy; the distinct occupancies are returned in that order.
pub fn coords_and_occupancies_to_coordgroups<T: PartialEq + Clone>(
    coords: &FracVector,
    occupancies: &[T],
) -> Result<(Vec<FracVector>, Vec<T>)> {
    let rows = checked_coordgroup(coords)?.rows()?;
    if rows.len() != occupancies.len() {
        return Err(CrystalError::structure(format!(
            "{} occupancies given for {} coordinates",
            occupancies.len(),
            rows.len()
        )));
    }
    let mut distinct: Vec<T> = Vec::new();
    let mut members: Vec<Vec<FracVector>> = Vec::new();
    for (row, occupancy) in rows.into_iter().zip(occupancies) {
        match distinct.iter().position(|d| d == occupancy) {
            Some(i) => members[i].push(row),
            None => {
                distinct.push(occupancy.clone());
                members.push(vec![row]);
            }
        }
    }
    let groups = members
        .iter()
        .map(|rows| rows_to_coordgroup(rows))
        .collect::<Result<Vec<_>>>()?;
    Ok((groups, distinct))
}

/// Every coordinate limited to a denominator of at most [`CLEAN_MAX_DENOMINATOR`].
pub fn clean_coordgroups(coordgroups: &[FracVector]) -> Result<Vec<FracVector>> {
    let max_denom = BigInt::from(CLEAN_MAX_DENOMINATOR);
    coordgroups
        .iter()
        .map(|g| {
            if g.is_empty() {
                Ok(empty_coordgroup())
            } else {
                Ok(g.limit_denominator(&max_denom)?.simplify())
            }
        })
        .collect()
}

/// Swaps cell vectors `from` and `to`: rows of the basis and columns of every coordinate group.
pub fn coordswap(
    from: usize,
    to: usize,
    basis: &FracVector,
    coordgroups: &[FracVector],
) -> Result<(FracVector, Vec<FracVector>)> {
    if from > 2 || to > 2 {
        return Err(CrystalError::math(format!("cannot swap axes {} and {}", from, to)));
    }
    let mut perm = [[0i64; 3]; 3];
    for (i, row) in perm.iter_mut().enumerate() {
        let j = if i == from {
            to
        } else if i == to {
            from
        } else {
            i
        };
        row[j] = 1;
    }
    let perm = FracVector::create(perm)?;
    let new_basis = perm.mul(basis)?.simplify();
    let new_groups = coordgroups
        .iter()
        .map(|g| {
            if g.is_empty() {
                Ok(empty_coordgroup())
            } else {
                Ok(g.mul(&perm)?.simplify())
            }
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((new_basis, new_groups))
}

// ======================== UNIT CELL EXPANSION ========================

/// Folds the periodic components of a reduced coordinate into [0, 1) (or [-1/2, 1/2) with
/// `half`); non-periodic components are left alone.
fn fold_periodic(coord: &FracVector, pbc: &[bool; 3], half: bool) -> Result<FracVector> {
    if pbc.iter().all(|&p| p) {
        return Ok(if half { coord.normalize_half() } else { coord.normalize().simplify() });
    }
    let one_half = BigRational::new(BigInt::from(1), BigInt::from(2));
    let values: Vec<BigRational> = coord
        .to_fractions()
        .into_iter()
        .zip(pbc)
        .map(|(v, &periodic)| match (periodic, half) {
            (false, _) => v,
            (true, false) => &v - v.floor(),
            (true, true) => &v - (&v + &one_half).floor(),
        })
        .collect();
    Ok(FracVector::from_rationals(coord.dims().to_vec(), &values)?.simplify())
}

/// Squared reduced distance between two coordinates, taking the nearest periodic image along
/// the periodic axes.
pub fn min_image_distance_sqr(a: &FracVector, b: &FracVector, pbc: &[bool; 3]) -> Result<BigRational> {
    fold_periodic(&a.try_sub(b)?, pbc, true)?.lengthsqr()?.to_rational()
}

fn coincides_with_any(image: &FracVector, kept: &[FracVector], pbc: &[bool; 3], eps: &BigRational) -> Result<bool> {
    for other in kept {
        let dist = min_image_distance_sqr(image, other, pbc)?;
        if dist.is_zero() || &dist < eps {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether two coordinate groups hold the same sites: equal sizes and a one-to-one pairing at
/// minimum-image squared distance at most `eps`.
pub fn coordgroups_match(a: &FracVector, b: &FracVector, pbc: &[bool; 3], eps: &BigRational) -> Result<bool> {
    if a.len() != b.len() {
        return Ok(false);
    }
    if a.is_empty() {
        return Ok(true);
    }
    let mut unmatched = b.rows()?;
    for coord in a.rows()? {
        let mut found = None;
        for (k, other) in unmatched.iter().enumerate() {
            if &min_image_distance_sqr(&coord, other, pbc)? <= eps {
                found = Some(k);
                break;
            }
        }
        match found {
            Some(k) => {
                unmatched.swap_remove(k);
            }
            None => return Ok(false),
        }
    }
    Ok(true)
}

/// Applies every operation to every representative, folds the periodic components of the
/// images into [0, 1) and drops images whose minimum-image squared distance to an already kept
/// one is below `eps`. Non-periodic components are never folded.
///
/// Each group of the result is sorted by (x, y, z).
pub fn coordgroups_reduced_to_unitcell(
    coordgroups: &[FracVector],
    operations: &[SymmetryOperation],
    pbc: &[bool; 3],
    eps: &BigRational,
) -> Result<Vec<FracVector>> {
    let mut expanded = Vec::with_capacity(coordgroups.len());
    for group in coordgroups {
        let mut kept: Vec<FracVector> = Vec::new();
        for coord in group.rows()? {
            for op in operations {
                let image = fold_periodic(&op.apply(&coord)?, pbc, false)?;
                if !coincides_with_any(&image, &kept, pbc, eps)? {
                    kept.push(image);
                }
            }
        }
        kept.sort_by_cached_key(|c| c.to_fractions());
        expanded.push(rows_to_coordgroup(&kept)?);
    }
    debug!(
        "Expanded {} representatives to {} sites under {} operations",
        coordgroups.iter().map(|g| g.len()).sum::<usize>(),
        expanded.iter().map(|g| g.len()).sum::<usize>(),
        operations.len()
    );
    Ok(expanded)
}
