use log::warn;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::lattice_systems::{
    lattice_system_from_lengths_and_cosangles, lattice_system_from_niggli, LatticeSystem,
};
use crate::error::CrystalError;
use crate::fracvector::frac_math::{best_rational_in_interval, frac_acos, frac_cbrt, frac_cos, frac_sqrt};
use crate::fracvector::FracVector;

type Result<T> = std::result::Result<T, CrystalError>;

// ======================== SHAPE HELPERS ========================

/// The two rows of a Niggli matrix: `[s11, s22, s33]` and `[2 s23, 2 s13, 2 s12]`.
pub(crate) fn niggli_entries(niggli: &FracVector) -> Result<([BigRational; 3], [BigRational; 3])> {
    if niggli.dims() != [2, 3] {
        return Err(CrystalError::ShapeMismatch {
            operation: "niggli matrix",
            left: niggli.dims().to_vec(),
            right: vec![2, 3],
        });
    }
    let v = niggli.to_fractions();
    Ok((
        [v[0].clone(), v[1].clone(), v[2].clone()],
        [v[3].clone(), v[4].clone(), v[5].clone()],
    ))
}

pub(crate) fn triple(v: &FracVector, operation: &'static str) -> Result<[BigRational; 3]> {
    if v.dims() != [3] {
        return Err(CrystalError::ShapeMismatch {
            operation,
            left: v.dims().to_vec(),
            right: vec![3],
        });
    }
    let f = v.to_fractions();
    Ok([f[0].clone(), f[1].clone(), f[2].clone()])
}

pub(crate) fn check_basis(basis: &FracVector) -> Result<()> {
    if basis.dims() != [3, 3] {
        return Err(CrystalError::ShapeMismatch {
            operation: "cell basis",
            left: basis.dims().to_vec(),
            right: vec![3, 3],
        });
    }
    Ok(())
}

fn from_rows(rows: [[BigRational; 3]; 3]) -> Result<FracVector> {
    let flat: Vec<BigRational> = rows.into_iter().flatten().collect();
    Ok(FracVector::from_rationals(vec![3, 3], &flat)?.simplify())
}

// Simplest rational within prec/2 of x
fn tidy(x: &BigRational, prec: &BigRational) -> BigRational {
    let half = prec / BigInt::from(2);
    best_rational_in_interval(&(x - &half), &(x + &half))
}

// ======================== NIGGLI / METRIC / BASIS ========================

/// Niggli matrix and orientation (sign of the determinant) of a basis.
///
/// # Errors
///
/// [`CrystalError::Math`] for a singular basis.
pub fn basis_to_niggli_and_orientation(basis: &FracVector) -> Result<(FracVector, i32)> {
    check_basis(basis)?;
    let det = basis.det()?.to_rational()?;
    if det.is_zero() {
        return Err(CrystalError::math("basis_to_niggli: singular cell matrix"));
    }
    let orientation = if det.is_positive() { 1 } else { -1 };
    let rows = basis.rows()?;
    let s = |i: usize, j: usize| -> Result<BigRational> { rows[i].dot(&rows[j])?.to_rational() };
    let two = BigInt::from(2);
    let values = [
        s(0, 0)?,
        s(1, 1)?,
        s(2, 2)?,
        s(1, 2)? * &two,
        s(0, 2)? * &two,
        s(0, 1)? * &two,
    ];
    Ok((FracVector::from_rationals(vec![2, 3], &values)?.simplify(), orientation))
}

/// Metric tensor `[[s11, s12, s13], [s12, s22, s23], [s13, s23, s33]]` of a Niggli matrix.
pub fn niggli_to_metric(niggli: &FracVector) -> Result<FracVector> {
    let ([s11, s22, s33], off) = niggli_entries(niggli)?;
    let [s23, s13, s12] = off.map(|n| n / BigInt::from(2));
    from_rows([
        [s11, s12.clone(), s13.clone()],
        [s12, s22, s23.clone()],
        [s13, s23, s33],
    ])
}

/// Niggli matrix of a metric tensor.
pub fn metric_to_niggli(metric: &FracVector) -> Result<FracVector> {
    check_basis(metric)?;
    let m = |i: usize, j: usize| metric.at(&[i, j]);
    let two = BigInt::from(2);
    let values = [
        m(0, 0)?,
        m(1, 1)?,
        m(2, 2)?,
        m(1, 2)? * &two,
        m(0, 2)? * &two,
        m(0, 1)? * &two,
    ];
    Ok(FracVector::from_rationals(vec![2, 3], &values)?.simplify())
}

/// Axis lengths `(a, b, c)` and cosines of `(α, β, γ)`, each within `prec`.
///
/// Lengths are square roots of the diagonal. A cosine is `s_jk / √(s_jj s_kk)`, so it is exact
/// whenever that product is a perfect square.
pub fn niggli_to_lengths_and_cosangles(
    niggli: &FracVector,
    prec: &BigRational,
) -> Result<(FracVector, FracVector)> {
    let (diag, off) = niggli_entries(niggli)?;
    if diag.iter().any(|s| !s.is_positive()) {
        return Err(CrystalError::math(
            "niggli matrix: squared axis lengths must be positive",
        ));
    }
    let lengths = diag
        .iter()
        .map(|s| frac_sqrt(s, prec))
        .collect::<Result<Vec<_>>>()?;
    let pairs = [(1, 2), (0, 2), (0, 1)];
    let mut cosangles = Vec::with_capacity(3);
    for (n, (j, k)) in off.iter().zip(pairs) {
        let norm = frac_sqrt(&(&diag[j] * &diag[k]), prec)?;
        let cos = n / BigInt::from(2) / norm;
        cosangles.push(clamp_unit(tidy(&cos, prec)));
    }
    Ok((
        FracVector::from_rationals(vec![3], &lengths)?,
        FracVector::from_rationals(vec![3], &cosangles)?,
    ))
}

// Approximated cosines of collinear axes may fall just outside [-1, 1]
fn clamp_unit(x: BigRational) -> BigRational {
    if x > BigRational::one() {
        BigRational::one()
    } else if x < -BigRational::one() {
        -BigRational::one()
    } else {
        x
    }
}

/// Axis lengths and angles in degrees.
pub fn niggli_to_lengths_and_angles(
    niggli: &FracVector,
    prec: &BigRational,
) -> Result<(FracVector, FracVector)> {
    let (lengths, cosangles) = niggli_to_lengths_and_cosangles(niggli, prec)?;
    let angles = cosangles
        .to_fractions()
        .iter()
        .map(|c| frac_acos(c, prec, true))
        .collect::<Result<Vec<_>>>()?;
    Ok((lengths, FracVector::from_rationals(vec![3], &angles)?))
}

/// `[[a², b², c²], [2bc cosα, 2ac cosβ, 2ab cosγ]]`
pub fn lengths_and_cosangles_to_niggli(lengths: &FracVector, cosangles: &FracVector) -> Result<FracVector> {
    let [a, b, c] = triple(lengths, "lengths")?;
    let [ca, cb, cg] = triple(cosangles, "cosangles")?;
    let two = BigInt::from(2);
    let values = [
        &a * &a,
        &b * &b,
        &c * &c,
        &b * &c * ca * &two,
        &a * &c * cb * &two,
        &a * &b * cg * &two,
    ];
    Ok(FracVector::from_rationals(vec![2, 3], &values)?.simplify())
}

/// Cosines of angles given in degrees, each within `prec`.
pub fn angles_to_cosangles(angles: &FracVector, prec: &BigRational) -> Result<FracVector> {
    let cos = triple(angles, "angles")?
        .iter()
        .map(|x| frac_cos(x, prec, true))
        .collect::<Result<Vec<_>>>()?;
    FracVector::from_rationals(vec![3], &cos)
}

pub fn lengths_and_angles_to_niggli(
    lengths: &FracVector,
    angles: &FracVector,
    prec: &BigRational,
) -> Result<FracVector> {
    lengths_and_cosangles_to_niggli(lengths, &angles_to_cosangles(angles, prec)?)
}

/// A basis with the given Niggli matrix: `a` along x, `b` in the xy plane.
///
/// Rows are negated for `orientation < 0`. Entries are rational approximations within `prec`.
///
/// # Errors
///
/// [`CrystalError::Math`] if the cell vectors are degenerate.
pub fn niggli_to_basis(niggli: &FracVector, orientation: i32, prec: &BigRational) -> Result<FracVector> {
    let (lengths, cosangles) = niggli_to_lengths_and_cosangles(niggli, prec)?;
    let basis = triclinic_basis(&lengths, &cosangles, prec)?;
    Ok(oriented(basis, orientation))
}

fn oriented(basis: FracVector, orientation: i32) -> FracVector {
    if orientation < 0 {
        -basis
    } else {
        basis
    }
}

fn triclinic_basis(lengths: &FracVector, cosangles: &FracVector, prec: &BigRational) -> Result<FracVector> {
    let [a, b, c] = triple(lengths, "lengths")?;
    let [ca, cb, cg] = triple(cosangles, "cosangles")?;
    let one = BigRational::one();
    let sg = frac_sqrt(&(&one - &cg * &cg), prec)?;
    let iv = &one - &ca * &ca - &cb * &cb - &cg * &cg + &ca * &cb * &cg * BigInt::from(2);
    if !iv.is_positive() || sg.is_zero() {
        return Err(CrystalError::math(
            "niggli_to_basis: cell vectors are degenerate or very close to degenerate",
        ));
    }
    let v = frac_sqrt(&iv, prec)?;
    let zero = BigRational::zero();
    from_rows([
        [a, zero.clone(), zero.clone()],
        [tidy(&(&b * &cg), prec), tidy(&(&b * &sg), prec), zero],
        [
            tidy(&(&c * &cb), prec),
            tidy(&(&c * (&ca - &cb * &cg) / &sg), prec),
            tidy(&(&c * v / &sg), prec),
        ],
    ])
}

// ======================== CONVENTIONAL BASES ========================

/// Conventional basis for axis lengths and cosines of angles.
///
/// Axes must follow the standard order (γ = 120° for hexagonal, β ≠ 90° for monoclinic),
/// otherwise the cell is classified triclinic and gets the general form. When
/// `lattice_system` is `None` it is determined exactly from the input.
pub fn lengths_and_cosangles_to_conventional_basis(
    lengths: &FracVector,
    cosangles: &FracVector,
    lattice_system: Option<LatticeSystem>,
    orientation: i32,
    prec: &BigRational,
) -> Result<FracVector> {
    let lattice_system = match lattice_system {
        Some(system) => system,
        None => lattice_system_from_lengths_and_cosangles(lengths, cosangles, &BigRational::zero())?,
    };
    let [a, b, c] = triple(lengths, "lengths")?;
    let [ca, cb, cg] = triple(cosangles, "cosangles")?;
    let zero = BigRational::zero();
    let one = BigRational::one();
    let z = || zero.clone();

    let basis = match lattice_system {
        LatticeSystem::Cubic | LatticeSystem::Tetragonal | LatticeSystem::Orthorhombic => {
            from_rows([[a, z(), z()], [z(), b, z()], [z(), z(), c]])?
        }
        LatticeSystem::Hexagonal => {
            let sg = frac_sqrt(&(&one - &cg * &cg), prec)?;
            from_rows([
                [a, z(), z()],
                [&b * &cg, tidy(&(&b * sg), prec), z()],
                [z(), z(), c],
            ])?
        }
        LatticeSystem::Monoclinic => {
            let sb = frac_sqrt(&(&one - &cb * &cb), prec)?;
            from_rows([
                [a, z(), z()],
                [z(), b, z()],
                [&c * &cb, z(), tidy(&(&c * sb), prec)],
            ])?
        }
        LatticeSystem::Rhombohedral => {
            let tx = frac_sqrt(&((&one - &ca) / BigInt::from(2)), prec)?;
            let ty = frac_sqrt(&((&one - &ca) / BigInt::from(6)), prec)?;
            let tz = frac_sqrt(&((&one + &ca * BigInt::from(2)) / BigInt::from(3)), prec)?;
            let t = |x: BigRational| tidy(&x, prec);
            from_rows([
                [t(&a * &ty * BigInt::from(2)), z(), t(&a * &tz)],
                [t(-(&b * &ty)), t(&b * &tx), t(&b * &tz)],
                [t(-(&c * &ty)), t(-(&c * &tx)), t(&c * &tz)],
            ])?
        }
        LatticeSystem::Triclinic | LatticeSystem::Unknown => triclinic_basis(lengths, cosangles, prec)?,
    };
    Ok(oriented(basis, orientation))
}

/// Conventional basis of a Niggli matrix, see [`lengths_and_cosangles_to_conventional_basis`].
pub fn niggli_to_conventional_basis(
    niggli: &FracVector,
    lattice_system: Option<LatticeSystem>,
    orientation: i32,
    prec: &BigRational,
) -> Result<FracVector> {
    let lattice_system = match lattice_system {
        Some(system) => system,
        None => lattice_system_from_niggli(niggli, &BigRational::zero())?,
    };
    let (lengths, cosangles) = niggli_to_lengths_and_cosangles(niggli, prec)?;
    lengths_and_cosangles_to_conventional_basis(&lengths, &cosangles, Some(lattice_system), orientation, prec)
}

/// Integer matrix `T` such that `T · basis` is the conventional cell of a centred primitive
/// basis.
///
/// The basis is rescaled so its largest element is 1/2 and inverted. If the inverse is not made
/// of 0 and ±1 the identity is returned instead. This recovers the cells built by
/// [`lengths_and_cosangles_to_conventional_basis`] from F, I and C centrings; other input gets a
/// valid but non-conventional answer.
pub fn get_primitive_to_conventional_basis_transform(basis: &FracVector) -> Result<FracVector> {
    check_basis(basis)?;
    let values = basis.to_fractions();
    let maxele = values.iter().max().cloned().unwrap_or_else(BigRational::zero);
    let maxeleneg = values.iter().map(|v| -v).max().unwrap_or_else(BigRational::zero);
    let scale = if maxeleneg > maxele { -maxeleneg } else { maxele };
    if scale.is_zero() {
        return Err(CrystalError::math("primitive transform of a zero basis"));
    }
    let rebase = basis.scale(&(scale * BigInt::from(2)).recip());
    let inverse = match rebase.inv() {
        Ok(inverse) => inverse.simplify(),
        Err(e) => {
            warn!("Primitive to conventional transform: {}; using identity", e);
            return Ok(FracVector::eye(3));
        }
    };
    let unit = |v: &BigRational| v.is_zero() || v.abs().is_one();
    if inverse.to_fractions().iter().all(unit) {
        Ok(inverse)
    } else {
        warn!("Primitive to conventional transform is not a 0/±1 matrix; using identity");
        Ok(FracVector::eye(3))
    }
}

/// Rows are the primitive vectors, in reduced coordinates of the conventional cell, of the
/// centring named by a Hall lattice symbol. `R` assumes hexagonal (obverse) axes.
///
/// Applied as `T · conventional_basis`; the determinant is one over the number of lattice
/// points per conventional cell.
pub fn primitive_basis_transform(lattice_symbol: char) -> Result<FracVector> {
    let rows: [[&str; 3]; 3] = match lattice_symbol.to_ascii_uppercase() {
        'P' => return Ok(FracVector::eye(3)),
        'A' => [["1", "0", "0"], ["0", "1/2", "1/2"], ["0", "-1/2", "1/2"]],
        'B' => [["1/2", "0", "1/2"], ["0", "1", "0"], ["-1/2", "0", "1/2"]],
        'C' => [["1/2", "1/2", "0"], ["-1/2", "1/2", "0"], ["0", "0", "1"]],
        'I' => [["-1/2", "1/2", "1/2"], ["1/2", "-1/2", "1/2"], ["1/2", "1/2", "-1/2"]],
        'F' => [["0", "1/2", "1/2"], ["1/2", "0", "1/2"], ["1/2", "1/2", "0"]],
        'R' => [["2/3", "1/3", "1/3"], ["-1/3", "1/3", "1/3"], ["-1/3", "-2/3", "1/3"]],
        other => {
            return Err(CrystalError::structure(format!(
                "no primitive transform for lattice symbol '{}'",
                other
            )))
        }
    };
    FracVector::create(rows)
}

// ======================== VOLUME AND SCALE ========================

/// How a cell basis is scaled: multiplied by a factor, or resized to a target volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scaling {
    Scale(BigRational),
    Volume(BigRational),
}

impl Scaling {
    /// POSCAR-style scaling: a positive value is a scale factor, a negative value the negated
    /// target volume.
    pub fn from_signed(value: BigRational) -> Result<Self> {
        if value.is_positive() {
            Ok(Scaling::Scale(value))
        } else if value.is_negative() {
            Ok(Scaling::Volume(-value))
        } else {
            Err(CrystalError::structure("scaling must be nonzero"))
        }
    }
}

fn abs_det(basis: &FracVector) -> Result<BigRational> {
    check_basis(basis)?;
    let det = basis.det()?.to_rational()?.abs();
    if det.is_zero() {
        return Err(CrystalError::math("singular cell matrix"));
    }
    Ok(det)
}

/// Scale factor that gives `basis` the volume `vol`, within `prec`.
pub fn vol_to_scale(basis: &FracVector, vol: &BigRational, prec: &BigRational) -> Result<BigRational> {
    frac_cbrt(&(vol / abs_det(basis)?), prec)
}

/// Volume of `basis` after multiplying it by `scale`.
pub fn scale_to_vol(basis: &FracVector, scale: &BigRational) -> Result<BigRational> {
    Ok(scale * scale * scale * abs_det(basis)?)
}

/// Volume of the cell with the given Niggli matrix after multiplying it by `scale`.
pub fn niggli_scale_to_vol(niggli: &FracVector, scale: &BigRational, prec: &BigRational) -> Result<BigRational> {
    let volsqr = niggli_to_metric(niggli)?.det()?.to_rational()?;
    if !volsqr.is_positive() {
        return Err(CrystalError::math("niggli_scale_to_vol: singular cell matrix"));
    }
    Ok(scale * scale * scale * frac_sqrt(&volsqr, prec)?)
}

pub fn scaling_to_volume(basis: &FracVector, scaling: &Scaling) -> Result<BigRational> {
    match scaling {
        Scaling::Scale(scale) => scale_to_vol(basis, scale),
        Scaling::Volume(volume) => Ok(volume.clone()),
    }
}

pub fn scaling_to_scale(basis: &FracVector, scaling: &Scaling, prec: &BigRational) -> Result<BigRational> {
    match scaling {
        Scaling::Scale(scale) => Ok(scale.clone()),
        Scaling::Volume(volume) => vol_to_scale(basis, volume, prec),
    }
}
