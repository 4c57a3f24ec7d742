use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use super::cell_conversions::{
    basis_to_niggli_and_orientation, check_basis, lengths_and_cosangles_to_conventional_basis,
    angles_to_cosangles, metric_to_niggli, niggli_to_basis, niggli_to_lengths_and_angles,
    niggli_to_lengths_and_cosangles, niggli_to_metric, scaling_to_scale, Scaling,
};
use super::lattice_systems::{lattice_system_from_lengths_and_cosangles, lattice_system_from_niggli, LatticeSystem};
use crate::config::{LATTICE_SYSTEM_TOLERANCE, PRIMITIVE_TRANSFORM_TOLERANCE};
use crate::error::CrystalError;
use crate::fracvector::frac_math::{default_precision, frac_cbrt, ratio_from_pair};
use crate::fracvector::FracVector;
use crate::symmetries::lattice_system_from_hall;

type Result<T> = std::result::Result<T, CrystalError>;

/// Denominator bound used by [`Cell::clean`].
pub const CLEAN_MAX_DENOMINATOR: i64 = 5_000_000;

/// A crystal cell: a non-singular 3×3 rational basis (rows are the cell vectors) and the
/// quantities derived from it.
///
/// Lengths and cosines of angles are rational approximations within the precision the cell was
/// built with; everything else is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    basis: FracVector,
    niggli: FracVector,
    metric: FracVector,
    orientation: i32,
    lattice_system: LatticeSystem,
    det: BigRational,
    inv: FracVector,
    lengths: FracVector,
    cosangles: FracVector,
    precision: BigRational,
}

impl Cell {
    /// Builds a cell from a basis. The lattice system is classified exactly.
    pub fn new(basis: FracVector) -> Result<Self> {
        Self::with_precision(basis, &default_precision())
    }

    pub fn with_precision(basis: FracVector, precision: &BigRational) -> Result<Self> {
        check_basis(&basis)?;
        let basis = basis.simplify();
        let (niggli, orientation) = basis_to_niggli_and_orientation(&basis)?;
        let lattice_system = lattice_system_from_niggli(&niggli, &ratio_from_pair(LATTICE_SYSTEM_TOLERANCE))?;
        let det = basis.det()?.to_rational()?;
        let inv = basis.inv()?.simplify();
        let metric = niggli_to_metric(&niggli)?;
        let (lengths, cosangles) = niggli_to_lengths_and_cosangles(&niggli, precision)?;
        Ok(Cell {
            basis,
            niggli,
            metric,
            orientation,
            lattice_system,
            det,
            inv,
            lengths,
            cosangles,
            precision: precision.clone(),
        })
    }

    /// Replaces the classified lattice system, e.g. with the one implied by a Hall symbol.
    pub fn with_lattice_system(mut self, lattice_system: LatticeSystem) -> Self {
        self.lattice_system = lattice_system;
        self
    }

    /// A cell with the given Niggli matrix, `a` along x and `b` in the xy plane.
    pub fn from_niggli(niggli: &FracVector, orientation: i32, precision: &BigRational) -> Result<Self> {
        let basis = niggli_to_basis(niggli, orientation, precision)?;
        Self::with_precision(basis, precision)
    }

    pub fn from_metric(metric: &FracVector, orientation: i32, precision: &BigRational) -> Result<Self> {
        Self::from_niggli(&metric_to_niggli(metric)?, orientation, precision)
    }

    /// The conventional cell of the given lengths and cosines of angles.
    ///
    /// A Hall symbol fixes the lattice system; without one it is classified from the input with
    /// a small tolerance, since the input is usually rounded.
    pub fn from_lengths_and_cosangles(
        lengths: &FracVector,
        cosangles: &FracVector,
        hall_symbol: Option<&str>,
        precision: &BigRational,
    ) -> Result<Self> {
        let lattice_system = match hall_symbol {
            Some(hall) => lattice_system_from_hall(hall)?,
            None => lattice_system_from_lengths_and_cosangles(
                lengths,
                cosangles,
                &ratio_from_pair(PRIMITIVE_TRANSFORM_TOLERANCE),
            )?,
        };
        debug!("Conventional {} cell from lengths and angles", lattice_system);
        let basis =
            lengths_and_cosangles_to_conventional_basis(lengths, cosangles, Some(lattice_system), 1, precision)?;
        Ok(Self::with_precision(basis, precision)?.with_lattice_system(lattice_system))
    }

    /// Same as [`Cell::from_lengths_and_cosangles`] with angles in degrees.
    pub fn from_lengths_and_angles(
        lengths: &FracVector,
        angles: &FracVector,
        hall_symbol: Option<&str>,
        precision: &BigRational,
    ) -> Result<Self> {
        let cosangles = angles_to_cosangles(angles, precision)?;
        Self::from_lengths_and_cosangles(lengths, &cosangles, hall_symbol, precision)
    }

    /// This cell with its basis multiplied by a scale factor or resized to a volume.
    pub fn scaled(&self, scaling: &Scaling) -> Result<Self> {
        let factor = scaling_to_scale(&self.basis, scaling, &self.precision)?;
        let lattice_system = self.lattice_system;
        Ok(Self::with_precision(self.basis.scale(&factor), &self.precision)?.with_lattice_system(lattice_system))
    }

    pub fn basis(&self) -> &FracVector {
        &self.basis
    }

    pub fn niggli_matrix(&self) -> &FracVector {
        &self.niggli
    }

    pub fn metric(&self) -> &FracVector {
        &self.metric
    }

    /// +1 for a right-handed basis, -1 for a left-handed one.
    pub fn orientation(&self) -> i32 {
        self.orientation
    }

    pub fn lattice_system(&self) -> LatticeSystem {
        self.lattice_system
    }

    pub fn det(&self) -> &BigRational {
        &self.det
    }

    pub fn volume(&self) -> BigRational {
        self.det.abs()
    }

    pub fn inv(&self) -> &FracVector {
        &self.inv
    }

    pub fn lengths(&self) -> &FracVector {
        &self.lengths
    }

    pub fn cosangles(&self) -> &FracVector {
        &self.cosangles
    }

    pub fn precision(&self) -> &BigRational {
        &self.precision
    }

    /// Angles (α, β, γ) in degrees.
    pub fn angles(&self) -> Result<FracVector> {
        Ok(niggli_to_lengths_and_angles(&self.niggli, &self.precision)?.1)
    }

    // ======================== COORDINATES ========================

    /// Reduced coordinates (one per row, or a single vector) to cartesian: `coords · basis`.
    pub fn coords_reduced_to_cartesian(&self, coords: &FracVector) -> Result<FracVector> {
        if coords.is_empty() {
            return Ok(coords.clone());
        }
        Ok(coords.mul(&self.basis)?.simplify())
    }

    /// Cartesian coordinates to reduced: `coords · basis⁻¹`.
    pub fn coords_cartesian_to_reduced(&self, coords: &FracVector) -> Result<FracVector> {
        if coords.is_empty() {
            return Ok(coords.clone());
        }
        Ok(coords.mul(&self.inv)?.simplify())
    }

    pub fn coordgroups_reduced_to_cartesian(&self, coordgroups: &[FracVector]) -> Result<Vec<FracVector>> {
        coordgroups
            .iter()
            .map(|group| self.coords_reduced_to_cartesian(group))
            .collect()
    }

    pub fn coordgroups_cartesian_to_reduced(&self, coordgroups: &[FracVector]) -> Result<Vec<FracVector>> {
        coordgroups
            .iter()
            .map(|group| self.coords_cartesian_to_reduced(group))
            .collect()
    }

    // ======================== NORMALIZATION ========================

    /// Cube root of the volume, the canonical normalization scale.
    pub fn normalization_scale(&self) -> Result<BigRational> {
        frac_cbrt(&self.volume(), &self.precision)
    }

    /// Largest absolute element of the basis.
    pub fn normalization_longestvec_scale(&self) -> BigRational {
        self.basis
            .to_fractions()
            .iter()
            .map(|v| v.abs())
            .max()
            .unwrap_or_else(BigRational::zero)
    }

    /// This cell divided by [`Cell::normalization_scale`], i.e. with volume close to 1.
    pub fn get_normalized(&self) -> Result<Self> {
        let scale = self.normalization_scale()?;
        self.divided_by(&scale)
    }

    /// This cell divided by [`Cell::normalization_longestvec_scale`].
    pub fn get_normalized_longestvec(&self) -> Result<Self> {
        self.divided_by(&self.normalization_longestvec_scale())
    }

    fn divided_by(&self, scale: &BigRational) -> Result<Self> {
        if scale.is_zero() {
            return Err(CrystalError::math("cell normalization by zero"));
        }
        let lattice_system = self.lattice_system;
        Ok(Self::with_precision(self.basis.scale(&scale.recip()), &self.precision)?
            .with_lattice_system(lattice_system))
    }

    /// This cell with every basis element limited to a denominator of at most
    /// [`CLEAN_MAX_DENOMINATOR`]. The lattice system is classified again from the cleaned basis.
    pub fn clean(&self) -> Result<Self> {
        let basis = self.basis.limit_denominator(&BigInt::from(CLEAN_MAX_DENOMINATOR))?;
        Self::with_precision(basis, &self.precision)
    }
}
