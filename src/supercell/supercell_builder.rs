use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive};
use serde::{Deserialize, Serialize};

use super::lattice_offsets::shell_offsets;
use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::sites::sites_utils::{checked_coordgroup, rows_to_coordgroup};

type Result<T> = std::result::Result<T, CrystalError>;

/// Basis and coordinate groups of a transformed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedCell {
    pub basis: FracVector,
    pub coordgroups: Vec<FracVector>,
}

impl TransformedCell {
    pub fn counts(&self) -> Vec<usize> {
        self.coordgroups.iter().map(|g| g.len()).collect()
    }

    pub fn total_number_of_atoms(&self) -> usize {
        self.coordgroups.iter().map(|g| g.len()).sum()
    }
}

fn checked_transformation(transformation: &FracVector) -> Result<FracVector> {
    if transformation.dims() != [3, 3] {
        return Err(CrystalError::ShapeMismatch {
            operation: "cell transformation",
            left: transformation.dims().to_vec(),
            right: vec![3, 3],
        });
    }
    Ok(transformation.simplify())
}

/// True if every component lies in [0, 1).
fn inside_unit_cell(coord: &FracVector) -> bool {
    let denom = coord.denom();
    coord.noms().iter().all(|n| !n.is_negative() && n < denom)
}

/// Number of atoms a group of `count` atoms turns into when the cell volume changes by `det`.
fn expected_count(count: usize, det: &BigRational) -> Result<usize> {
    let expected = det * BigRational::from_integer(BigInt::from(count));
    if !expected.is_integer() {
        return Err(CrystalError::Transform(format!(
            "a group of {} atoms becomes {} atoms under a transformation of determinant {}",
            count, expected, det
        )));
    }
    expected
        .to_integer()
        .to_usize()
        .ok_or_else(|| CrystalError::Transform(format!("{} atoms do not fit in memory", expected)))
}

/// Re-expresses the atoms of a cell in the cell `transformation · basis`.
///
/// The transformation may be rational (e.g. conventional to primitive) as long as its
/// determinant is positive and every group keeps an integral number of atoms. Lattice offsets
/// are searched breadth-first by max-norm shell up to `max_search_cells`. Each group of the
/// result is sorted by (x, y, z).
pub fn transform_coordgroups(
    basis: &FracVector,
    coordgroups: &[FracVector],
    transformation: &FracVector,
    max_search_cells: usize,
) -> Result<TransformedCell> {
    let transformation = checked_transformation(transformation)?;
    let det = transformation.det()?.to_rational()?;
    if !det.is_positive() {
        return Err(CrystalError::Transform(format!(
            "transformation determinant must be positive, got {}",
            det
        )));
    }
    let new_basis = transformation.mul(basis)?.simplify();
    // Old reduced coordinates times T⁻¹ are reduced coordinates of the new cell
    let conversion = transformation.inv()?.simplify();

    let groups = coordgroups
        .iter()
        .map(|g| checked_coordgroup(g)?.rows())
        .collect::<Result<Vec<_>>>()?;
    let mut remaining = groups
        .iter()
        .map(|g| expected_count(g.len(), &det))
        .collect::<Result<Vec<_>>>()?;
    let mut missing: usize = remaining.iter().sum();
    let mut found: Vec<Vec<FracVector>> = vec![Vec::new(); groups.len()];

    let mut shell = 0;
    while missing > 0 && shell <= max_search_cells {
        for offset in shell_offsets(shell) {
            let shift = FracVector::create(offset)?;
            for (idx, group) in groups.iter().enumerate() {
                for coord in group {
                    let image = coord.try_add(&shift)?.mul(&conversion)?.simplify();
                    if !inside_unit_cell(&image) {
                        continue;
                    }
                    if remaining[idx] == 0 {
                        return Err(CrystalError::internal(format!(
                            "more atoms than expected in group {} of the transformed cell",
                            idx
                        )));
                    }
                    remaining[idx] -= 1;
                    missing -= 1;
                    found[idx].push(image);
                }
            }
            if missing == 0 {
                break;
            }
        }
        debug!("Supercell search shell {}: {} atoms missing", shell, missing);
        shell += 1;
    }
    if missing > 0 {
        return Err(CrystalError::SearchExhausted {
            max_search_cells,
            missing,
        });
    }

    let coordgroups = found
        .into_iter()
        .map(|mut rows| {
            rows.sort_by_cached_key(|c| c.to_fractions());
            rows_to_coordgroup(&rows)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TransformedCell {
        basis: new_basis,
        coordgroups,
    })
}

/// [`transform_coordgroups`] restricted to integer transformations, i.e. true supercells.
pub fn build_supercell(
    basis: &FracVector,
    coordgroups: &[FracVector],
    transformation: &FracVector,
    max_search_cells: usize,
) -> Result<TransformedCell> {
    let transformation = checked_transformation(transformation)?;
    if !transformation.denom().is_one() {
        return Err(CrystalError::Transform(format!(
            "supercell transformation must be an integer matrix, got {}",
            transformation
        )));
    }
    transform_coordgroups(basis, coordgroups, &transformation, max_search_cells)
}
