use nalgebra::{Matrix3, Vector3};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrystalError;
use crate::fracvector::{frac_math, FracVector};

type Result<T> = std::result::Result<T, CrystalError>;

/// Every crystallographic translation is a multiple of 1/12.
pub const TRANSLATION_DENOM: i32 = 12;

/// A single symmetry operation: integer rotation + fractional translation.
///
/// The rotation acts on reduced coordinates as column vectors, `x' = R·x + t`. The translation
/// is stored in twelfths of a lattice vector and always reduced into [0, 12), so two operations
/// that differ by a lattice translation compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymmetryOperation {
    /// Integer rotation matrix with determinant ±1
    pub rotation: Matrix3<i32>,
    /// Translation in twelfths
    pub translation: Vector3<i32>,
}

impl SymmetryOperation {
    /// Create a new symmetry operation; the translation is reduced modulo the lattice.
    pub fn new(rotation: Matrix3<i32>, translation: Vector3<i32>) -> Self {
        Self {
            rotation,
            translation: translation.map(|t| t.rem_euclid(TRANSLATION_DENOM)),
        }
    }

    /// Create identity operation
    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    pub fn inversion() -> Self {
        Self::new(-Matrix3::identity(), Vector3::zeros())
    }

    /// A pure translation given in twelfths.
    pub fn pure_translation(translation: Vector3<i32>) -> Self {
        Self::new(Matrix3::identity(), translation)
    }

    /// The operation `self ∘ other`: `other` is applied first.
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.rotation * other.rotation,
            self.rotation * other.translation + self.translation,
        )
    }

    pub fn inverse(&self) -> Self {
        let r = &self.rotation;
        let adj = Matrix3::new(
            r[(1, 1)] * r[(2, 2)] - r[(1, 2)] * r[(2, 1)],
            r[(0, 2)] * r[(2, 1)] - r[(0, 1)] * r[(2, 2)],
            r[(0, 1)] * r[(1, 2)] - r[(0, 2)] * r[(1, 1)],
            r[(1, 2)] * r[(2, 0)] - r[(1, 0)] * r[(2, 2)],
            r[(0, 0)] * r[(2, 2)] - r[(0, 2)] * r[(2, 0)],
            r[(0, 2)] * r[(1, 0)] - r[(0, 0)] * r[(1, 2)],
            r[(1, 0)] * r[(2, 1)] - r[(1, 1)] * r[(2, 0)],
            r[(0, 1)] * r[(2, 0)] - r[(0, 0)] * r[(2, 1)],
            r[(0, 0)] * r[(1, 1)] - r[(0, 1)] * r[(1, 0)],
        );
        // det is ±1, so the adjugate times det is the inverse
        let inv = adj * self.determinant();
        Self::new(inv, -(inv * self.translation))
    }

    /// The same operation expressed with the origin moved by `shift` (in twelfths):
    /// `(R, t) -> (R, t + V - R·V)`.
    pub fn with_origin_shift(&self, shift: &Vector3<i32>) -> Self {
        Self::new(
            self.rotation,
            self.translation + shift - self.rotation * shift,
        )
    }

    pub fn determinant(&self) -> i32 {
        let r = &self.rotation;
        r[(0, 0)] * (r[(1, 1)] * r[(2, 2)] - r[(1, 2)] * r[(2, 1)])
            - r[(0, 1)] * (r[(1, 0)] * r[(2, 2)] - r[(1, 2)] * r[(2, 0)])
            + r[(0, 2)] * (r[(1, 0)] * r[(2, 1)] - r[(1, 1)] * r[(2, 0)])
    }

    pub fn is_proper(&self) -> bool {
        self.determinant() > 0
    }

    /// Check if this is the identity operation
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Number of applications needed to reach the identity (modulo lattice translations).
    pub fn order(&self) -> usize {
        let mut current = *self;
        for n in 1..=24 {
            if current.is_identity() {
                return n;
            }
            current = self.compose(&current);
        }
        0
    }

    /// Key for deterministic ordering of operation lists.
    pub fn sort_key(&self) -> ([i32; 9], [i32; 3]) {
        let mut rot = [0; 9];
        for i in 0..3 {
            for j in 0..3 {
                rot[i * 3 + j] = self.rotation[(i, j)];
            }
        }
        (
            rot,
            [self.translation[0], self.translation[1], self.translation[2]],
        )
    }

    pub fn rotation_fracvector(&self) -> FracVector {
        let noms = (0..3)
            .flat_map(|i| (0..3).map(move |j| (i, j)))
            .map(|(i, j)| BigInt::from(self.rotation[(i, j)]))
            .collect();
        FracVector::from_raw(vec![3, 3], noms, BigInt::from(1))
    }

    pub fn translation_fracvector(&self) -> FracVector {
        FracVector::from_raw(
            vec![3],
            self.translation.iter().map(|&t| BigInt::from(t)).collect(),
            BigInt::from(TRANSLATION_DENOM),
        )
        .simplify()
    }

    /// Apply symmetry operation to a reduced coordinate
    pub fn apply(&self, coord: &FracVector) -> Result<FracVector> {
        self.rotation_fracvector()
            .mul(coord)?
            .try_add(&self.translation_fracvector())
    }

    /// Floating point version of [`SymmetryOperation::apply`].
    pub fn apply_f64(&self, point: Vector3<f64>) -> Vector3<f64> {
        let rotation_f64 = self.rotation.map(|x| x as f64);
        rotation_f64 * point + self.translation.map(|t| t as f64 / TRANSLATION_DENOM as f64)
    }

    /// Parses an operation in `x,y,z` notation, e.g. `-y,x-y,z+1/3`.
    pub fn parse(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split(',').collect();
        if parts.len() != 3 {
            return Err(CrystalError::math(format!(
                "symmetry operation '{}' must have three components",
                text
            )));
        }
        let mut rotation = Matrix3::zeros();
        let mut translation = Vector3::zeros();
        for (i, part) in parts.iter().enumerate() {
            let (row, shift) = parse_component(part)?;
            for (j, coef) in row.iter().enumerate() {
                rotation[(i, j)] = *coef;
            }
            let twelfths = shift * BigRational::from_integer(BigInt::from(TRANSLATION_DENOM));
            if !twelfths.is_integer() {
                return Err(CrystalError::math(format!(
                    "translation in '{}' is not a multiple of 1/12",
                    text
                )));
            }
            translation[i] = num_traits::ToPrimitive::to_i32(&twelfths.to_integer())
                .ok_or_else(|| CrystalError::math(format!("translation in '{}' too large", text)))?;
        }
        Ok(Self::new(rotation, translation))
    }
}

fn parse_component(text: &str) -> Result<([i32; 3], BigRational)> {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if chars.is_empty() {
        return Err(CrystalError::math("empty symmetry operation component"));
    }
    let mut row = [0; 3];
    let mut shift = BigRational::zero();
    let mut i = 0;
    while i < chars.len() {
        let mut sign = 1;
        while i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            if chars[i] == '-' {
                sign = -sign;
            }
            i += 1;
        }
        let start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.' || chars[i] == '/') {
            i += 1;
        }
        let number: String = chars[start..i].iter().collect();
        match chars.get(i) {
            Some(&axis @ ('x' | 'y' | 'z')) => {
                let coef: i32 = if number.is_empty() {
                    1
                } else {
                    number.parse().map_err(|_| {
                        CrystalError::math(format!("bad coefficient in component '{}'", text))
                    })?
                };
                row[(axis as u8 - b'x') as usize] += sign * coef;
                i += 1;
            }
            _ if !number.is_empty() => {
                let value = match number.split_once('/') {
                    Some((n, d)) => {
                        let d = frac_math::parse_decimal(d)?;
                        if d.is_zero() {
                            return Err(CrystalError::math(format!("zero denominator in '{}'", text)));
                        }
                        frac_math::parse_decimal(n)? / d
                    }
                    None => frac_math::parse_decimal(&number)?,
                };
                shift += value * BigInt::from(sign);
            }
            _ => {
                return Err(CrystalError::math(format!(
                    "cannot parse symmetry operation component '{}'",
                    text
                )))
            }
        }
    }
    Ok((row, shift))
}

impl FromStr for SymmetryOperation {
    type Err = CrystalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axes = ['x', 'y', 'z'];
        let mut components = Vec::with_capacity(3);
        for i in 0..3 {
            let mut s = String::new();
            for (j, axis) in axes.iter().enumerate() {
                let c = self.rotation[(i, j)];
                if c == 0 {
                    continue;
                }
                if c > 0 && !s.is_empty() {
                    s.push('+');
                }
                match c {
                    1 => {}
                    -1 => s.push('-'),
                    _ => s.push_str(&c.to_string()),
                }
                s.push(*axis);
            }
            let t = BigRational::new(
                BigInt::from(self.translation[i]),
                BigInt::from(TRANSLATION_DENOM),
            );
            if !t.is_zero() {
                if !s.is_empty() && t.is_positive() {
                    s.push('+');
                }
                s.push_str(&t.to_string());
            }
            if s.is_empty() {
                s.push('0');
            }
            components.push(s);
        }
        write!(f, "{}", components.join(","))
    }
}

/// Closes a set of generators into the full group, modulo lattice translations.
///
/// The result starts with the identity and is otherwise sorted by [`SymmetryOperation::sort_key`].
pub fn close_group(generators: &[SymmetryOperation]) -> Result<Vec<SymmetryOperation>> {
    const MAX_ORDER: usize = 384;
    let mut ops = vec![SymmetryOperation::identity()];
    let mut seen: std::collections::HashSet<SymmetryOperation> = ops.iter().copied().collect();
    let mut i = 0;
    while i < ops.len() {
        for g in generators {
            let candidate = ops[i].compose(g);
            if seen.insert(candidate) {
                ops.push(candidate);
                if ops.len() > MAX_ORDER {
                    return Err(CrystalError::math(
                        "symmetry operations do not close into a crystallographic group",
                    ));
                }
            }
        }
        i += 1;
    }
    ops.sort_by_key(|op| (!op.is_identity(), op.sort_key()));
    Ok(ops)
}
