use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_conversions::{niggli_entries, triple};
use crate::error::CrystalError;
use crate::fracvector::FracVector;

type Result<T> = std::result::Result<T, CrystalError>;

/// The seven lattice systems. `Unknown` marks a cell that was never classified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LatticeSystem {
    Cubic,
    Tetragonal,
    Orthorhombic,
    Hexagonal,
    Monoclinic,
    Rhombohedral,
    Triclinic,
    Unknown,
}

impl LatticeSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            LatticeSystem::Cubic => "cubic",
            LatticeSystem::Tetragonal => "tetragonal",
            LatticeSystem::Orthorhombic => "orthorhombic",
            LatticeSystem::Hexagonal => "hexagonal",
            LatticeSystem::Monoclinic => "monoclinic",
            LatticeSystem::Rhombohedral => "rhombohedral",
            LatticeSystem::Triclinic => "triclinic",
            LatticeSystem::Unknown => "unknown",
        }
    }

    /// Cubic, tetragonal and orthorhombic cells have a diagonal conventional basis.
    pub fn is_orthogonal(&self) -> bool {
        matches!(
            self,
            LatticeSystem::Cubic | LatticeSystem::Tetragonal | LatticeSystem::Orthorhombic
        )
    }
}

impl fmt::Display for LatticeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Results of the fixed list of geometric tests a classification is based on.
///
/// Lengths are compared pairwise, angles are tested against 90° and 120°. Every test is
/// carried out with the same tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisTests {
    pub ab: bool,
    pub ac: bool,
    pub bc: bool,
    pub alpha90: bool,
    pub beta90: bool,
    pub gamma90: bool,
    pub alpha120: bool,
    pub beta120: bool,
    pub gamma120: bool,
}

impl AxisTests {
    /// Tests on a Niggli matrix `[[s11, s22, s33], [2 s23, 2 s13, 2 s12]]`.
    ///
    /// Length tests compare the squared lengths. An angle is 120° when its cosine squared,
    /// `(n/2)² / (s_jj s_kk)`, is 1/4 and the off-diagonal element `n` is negative.
    pub fn from_niggli(niggli: &FracVector, eps: &BigRational) -> Result<Self> {
        let (diag, off) = niggli_entries(niggli)?;
        let equal = |x: &BigRational, y: &BigRational| (x - y).abs() <= *eps;
        let right = |n: &BigRational| n.abs() <= *eps;
        let hexagonal = |n: &BigRational, sj: &BigRational, sk: &BigRational| {
            let denom = sj * sk;
            if !n.is_negative() || denom.is_zero() {
                return false;
            }
            let half = n / BigInt::from(2);
            let cos2 = &half * &half / denom;
            (cos2 - BigRational::new(1.into(), 4.into())).abs() <= *eps
        };
        Ok(AxisTests {
            ab: equal(&diag[0], &diag[1]),
            ac: equal(&diag[0], &diag[2]),
            bc: equal(&diag[1], &diag[2]),
            alpha90: right(&off[0]),
            beta90: right(&off[1]),
            gamma90: right(&off[2]),
            alpha120: hexagonal(&off[0], &diag[1], &diag[2]),
            beta120: hexagonal(&off[1], &diag[0], &diag[2]),
            gamma120: hexagonal(&off[2], &diag[0], &diag[1]),
        })
    }

    /// Tests on axis lengths `(a, b, c)` and cosines of `(α, β, γ)`.
    pub fn from_lengths_and_cosangles(
        lengths: &FracVector,
        cosangles: &FracVector,
        eps: &BigRational,
    ) -> Result<Self> {
        let [a, b, c] = triple(lengths, "lengths")?;
        let cos = triple(cosangles, "cosangles")?;
        let half = BigRational::new(1.into(), 2.into());
        let equal = |x: &BigRational, y: &BigRational| (x - y).abs() <= *eps;
        let right = |x: &BigRational| x.abs() <= *eps;
        let hexagonal = |x: &BigRational| (x + &half).abs() <= *eps;
        Ok(AxisTests {
            ab: equal(&a, &b),
            ac: equal(&a, &c),
            bc: equal(&b, &c),
            alpha90: right(&cos[0]),
            beta90: right(&cos[1]),
            gamma90: right(&cos[2]),
            alpha120: hexagonal(&cos[0]),
            beta120: hexagonal(&cos[1]),
            gamma120: hexagonal(&cos[2]),
        })
    }

    fn all_right(&self) -> bool {
        self.alpha90 && self.beta90 && self.gamma90
    }

    /// Classification for axes in standard order (γ = 120° hexagonal, β unique monoclinic).
    /// Anything else comes out triclinic.
    pub fn classify(&self) -> LatticeSystem {
        if self.ab && self.ac && self.bc && self.all_right() {
            LatticeSystem::Cubic
        } else if self.ab && self.all_right() {
            LatticeSystem::Tetragonal
        } else if !self.ab && !self.ac && !self.bc && self.all_right() {
            LatticeSystem::Orthorhombic
        } else if self.gamma120 && self.alpha90 && self.beta90 && self.ab {
            LatticeSystem::Hexagonal
        } else if !self.beta90 && self.alpha90 && self.gamma90 {
            LatticeSystem::Monoclinic
        } else if !self.alpha90 && !self.beta90 && !self.gamma90 && self.ab && self.ac {
            LatticeSystem::Rhombohedral
        } else {
            LatticeSystem::Triclinic
        }
    }

    /// Classification that ignores the order of the axes.
    pub fn classify_any_order(&self) -> LatticeSystem {
        let equals = match [self.ab, self.ac, self.bc].iter().filter(|&&t| t).count() {
            1 => 2,
            n => n,
        };
        let orthos = [self.alpha90, self.beta90, self.gamma90]
            .iter()
            .filter(|&&t| t)
            .count();
        let hexangles = [self.alpha120, self.beta120, self.gamma120]
            .iter()
            .filter(|&&t| t)
            .count();
        match (equals, orthos, hexangles) {
            (3, 3, _) => LatticeSystem::Cubic,
            (2, 3, _) => LatticeSystem::Tetragonal,
            (0, 3, _) => LatticeSystem::Orthorhombic,
            (2, 2, 1) => LatticeSystem::Hexagonal,
            (_, 2, _) => LatticeSystem::Monoclinic,
            (3, _, _) => LatticeSystem::Rhombohedral,
            _ => LatticeSystem::Triclinic,
        }
    }
}

/// Lattice system of a Niggli matrix whose axes are in standard order.
///
/// Use [`standard_order_axes_transform`] first to re-order axes of a cell that may not be.
pub fn lattice_system_from_niggli(niggli: &FracVector, eps: &BigRational) -> Result<LatticeSystem> {
    Ok(AxisTests::from_niggli(niggli, eps)?.classify())
}

/// Lattice system from axis lengths and cosines of the angles between them.
pub fn lattice_system_from_lengths_and_cosangles(
    lengths: &FracVector,
    cosangles: &FracVector,
    eps: &BigRational,
) -> Result<LatticeSystem> {
    Ok(AxisTests::from_lengths_and_cosangles(lengths, cosangles, eps)?.classify())
}

/// Permutation matrix that brings the axes of a cell into standard order, or `None` when
/// they already are.
///
/// Hexagonal cells get their 120° angle as γ. Monoclinic cells get their unique angle as β.
/// The returned matrices have determinant +1, so applying them (`T · basis`) keeps the
/// orientation.
pub fn standard_order_axes_transform(niggli: &FracVector, eps: &BigRational) -> Result<Option<FracVector>> {
    let t = AxisTests::from_niggli(niggli, eps)?;
    let rows: [[i64; 3]; 3] = match t.classify_any_order() {
        LatticeSystem::Hexagonal if !t.gamma120 => {
            if t.alpha120 {
                [[0, 0, -1], [0, -1, 0], [-1, 0, 0]]
            } else if t.beta120 {
                [[-1, 0, 0], [0, 0, -1], [0, -1, 0]]
            } else {
                return Err(CrystalError::internal(
                    "standard_order_axes_transform: hexagonal cell without a 120 degree angle",
                ));
            }
        }
        LatticeSystem::Monoclinic if !(t.alpha90 && t.gamma90 && !t.beta90) => {
            if t.alpha90 && t.beta90 && !t.gamma90 {
                // (a, b, c) -> (-a, -c, -b)
                [[-1, 0, 0], [0, 0, -1], [0, -1, 0]]
            } else if t.beta90 && t.gamma90 && !t.alpha90 {
                // (a, b, c) -> (c, a, b)
                [[0, 0, 1], [1, 0, 0], [0, 1, 0]]
            } else {
                return Ok(None);
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(FracVector::create(rows)?))
}
