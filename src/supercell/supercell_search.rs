use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::cell::Cell;
use crate::error::CrystalError;
use crate::fracvector::FracVector;

type Result<T> = std::result::Result<T, CrystalError>;

// ======================== SCORES ========================

/// Sum of the absolute off-diagonal Niggli elements; zero for an orthogonal cell.
fn off_diagonal_sum(cell: &Cell) -> Result<BigRational> {
    let niggli = cell.niggli_matrix();
    let mut sum = BigRational::zero();
    for k in 0..3 {
        sum += niggli.at(&[1, k])?.abs();
    }
    Ok(sum)
}

/// `|a² - b²| + |a² - c²|`; zero when all cell vectors have equal length.
fn diagonal_spread(cell: &Cell) -> Result<BigRational> {
    let niggli = cell.niggli_matrix();
    let a2 = niggli.at(&[0, 0])?;
    Ok((&a2 - niggli.at(&[0, 1])?).abs() + (&a2 - niggli.at(&[0, 2])?).abs())
}

// ======================== HELPERS ========================

fn has_zero_row(m: &FracVector) -> Result<bool> {
    Ok(m.rows()?.iter().any(|row| row.noms().iter().all(|n| n.is_zero())))
}

/// Multiplies a rational matrix by its denominator.
fn to_integer_matrix(m: &FracVector) -> FracVector {
    let m = m.simplify();
    m.scale(&BigRational::from_integer(m.denom().clone())).simplify()
}

/// `t` or `-t`, whichever has positive determinant. `None` for a singular `t`.
fn with_positive_determinant(t: FracVector) -> Result<Option<FracVector>> {
    let det = t.det()?.to_rational()?;
    if det.is_zero() {
        Ok(None)
    } else if det.is_negative() {
        Ok(Some(-t))
    } else {
        Ok(Some(t))
    }
}

/// Candidate cell of a transformation, `None` if it is singular.
fn candidate_cell(t: &FracVector, basis: &FracVector) -> Result<Option<Cell>> {
    match Cell::new(t.mul(basis)?) {
        Ok(cell) => Ok(Some(cell)),
        Err(e) => {
            debug!("Skipping supercell candidate {}: {}", t, e);
            Ok(None)
        }
    }
}

/// Divides every row by its largest absolute element and makes it integral. Rows with
/// `ortho[k] == false` are replaced by the unit row, keeping that cell vector.
fn orthogonalizing_rows(inv: &FracVector, ortho: [bool; 3]) -> Result<FracVector> {
    let mut rows = Vec::with_capacity(3);
    for (k, row) in inv.rows()?.into_iter().enumerate() {
        if !ortho[k] {
            let mut unit = [0i64; 3];
            unit[k] = 1;
            rows.push(FracVector::create(unit)?);
            continue;
        }
        let maxabs = row.abs().max()?;
        if maxabs.is_zero() {
            return Err(CrystalError::math("zero row in inverse basis"));
        }
        rows.push(to_integer_matrix(&row.scale(&maxabs.recip())));
    }
    FracVector::stack_vecs(&rows)
}

// ======================== SEARCHES ========================

/// Integer transformation `T` such that `T · basis` is as close to cubic as the search allows.
///
/// Without a tolerance the exact inverse of the basis scaled to integers is used, which always
/// gives a cubic cell but may be large. With a tolerance, approximations of the inverse with
/// denominators `1..tolerance` are tried and the candidate with the smallest off-diagonal
/// Niggli sum wins, ties broken by the smallest diagonal spread and then by the first found.
pub fn cubic_supercell_transformation(basis: &FracVector, tolerance: Option<usize>) -> Result<FracVector> {
    let inv = basis.inv()?.simplify();
    let Some(maxtol) = tolerance else {
        return with_positive_determinant(to_integer_matrix(&inv))?
            .ok_or_else(|| CrystalError::math("singular inverse basis"));
    };

    let mut best: Option<(BigRational, BigRational, FracVector)> = None;
    for tol in 1..maxtol.max(2) {
        let approx = inv.set_denominator(&BigInt::from(tol))?.simplify();
        if has_zero_row(&approx)? {
            continue;
        }
        let Some(t) = with_positive_determinant(to_integer_matrix(&approx))? else {
            continue;
        };
        let Some(cell) = candidate_cell(&t, basis)? else {
            continue;
        };
        let ortho = off_diagonal_sum(&cell)?;
        let spread = diagonal_spread(&cell)?;
        if ortho.is_zero() && spread.is_zero() {
            debug!("Cubic supercell found at denominator {}", tol);
            return Ok(t);
        }
        let better = match &best {
            None => true,
            Some((best_ortho, best_spread, _)) => (&ortho, &spread) < (best_ortho, best_spread),
        };
        if better {
            best = Some((ortho, spread, t));
        }
    }
    best.map(|(_, _, t)| t).ok_or_else(|| {
        CrystalError::Transform(format!(
            "no cubic supercell within {} repetitions, increase the tolerance",
            maxtol
        ))
    })
}

/// Integer transformation `T` such that the vectors of `T · basis` selected by `ortho` are as
/// close to the Cartesian axes as the search allows. Same search scheme as
/// [`cubic_supercell_transformation`], scored by the off-diagonal Niggli sum alone.
pub fn orthogonal_supercell_transformation(
    basis: &FracVector,
    tolerance: Option<usize>,
    ortho: [bool; 3],
) -> Result<FracVector> {
    let inv = basis.inv()?.simplify();
    let Some(maxtol) = tolerance else {
        return with_positive_determinant(orthogonalizing_rows(&inv, ortho)?)?
            .ok_or_else(|| CrystalError::math("singular orthogonalizing transformation"));
    };

    let mut best: Option<(BigRational, FracVector)> = None;
    for tol in 1..maxtol.max(2) {
        let approx = inv.set_denominator(&BigInt::from(tol))?.simplify();
        if has_zero_row(&approx)? {
            continue;
        }
        let Some(t) = with_positive_determinant(orthogonalizing_rows(&approx, ortho)?)? else {
            continue;
        };
        let Some(cell) = candidate_cell(&t, basis)? else {
            continue;
        };
        let score = off_diagonal_sum(&cell)?;
        if score.is_zero() {
            debug!("Orthogonal supercell found at denominator {}", tol);
            return Ok(t);
        }
        if best.as_ref().map_or(true, |(best_score, _)| score < *best_score) {
            best = Some((score, t));
        }
    }
    best.map(|(_, t)| t).ok_or_else(|| {
        CrystalError::Transform(format!(
            "no orthogonal supercell within {} repetitions, increase the tolerance",
            maxtol
        ))
    })
}
