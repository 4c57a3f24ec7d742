use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::One;

use super::frac_vector::FracVector;
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Scratchpad for building a [`FracVector`] element by element.
///
/// Assigning a value whose denominator does not divide the current one rescales all
/// nominators, so the buffer always holds exact values.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableFracVector {
    inner: FracVector,
}

impl MutableFracVector {
    pub fn from_fracvector(v: &FracVector) -> Self {
        Self { inner: v.clone() }
    }

    pub fn zeros(dims: &[usize]) -> Self {
        Self {
            inner: FracVector::zeros(dims),
        }
    }

    pub fn to_fracvector(&self) -> FracVector {
        self.inner.simplify()
    }

    pub fn dims(&self) -> &[usize] {
        self.inner.dims()
    }

    fn flat_index(&self, index: &[usize]) -> Result<usize> {
        let dims = self.inner.dims();
        if index.len() != dims.len() || index.iter().zip(dims).any(|(i, d)| i >= d) {
            return Err(CrystalError::math(format!(
                "index {:?} out of range for dims {:?}",
                index, dims
            )));
        }
        Ok(index.iter().zip(dims).fold(0, |acc, (i, d)| acc * d + i))
    }

    /// Puts the buffer on a denominator that is a multiple of `denom`.
    fn accommodate(&mut self, denom: &BigInt) -> (Vec<BigInt>, BigInt) {
        let (old_denom, dims, noms) = self.inner.to_parts();
        let new_denom = old_denom.lcm(denom);
        let factor = &new_denom / &old_denom;
        let noms = if factor.is_one() {
            noms
        } else {
            noms.into_iter().map(|n| n * &factor).collect()
        };
        self.inner = FracVector::from_raw(dims, noms.clone(), new_denom.clone());
        (noms, new_denom)
    }

    /// Assigns one element.
    pub fn set(&mut self, index: &[usize], value: &BigRational) -> Result<()> {
        let flat = self.flat_index(index)?;
        let (mut noms, denom) = self.accommodate(value.denom());
        noms[flat] = value.numer() * (&denom / value.denom());
        self.inner = FracVector::from_raw(self.inner.dims().to_vec(), noms, denom);
        Ok(())
    }

    /// Replaces the sub-tensor `i` along the first axis.
    pub fn set_row(&mut self, i: usize, row: &FracVector) -> Result<()> {
        let dims = self.inner.dims().to_vec();
        if dims.is_empty() || i >= dims[0] || row.dims() != &dims[1..] {
            return Err(CrystalError::ShapeMismatch {
                operation: "set_row",
                left: dims,
                right: row.dims().to_vec(),
            });
        }
        let (mut noms, denom) = self.accommodate(row.denom());
        let factor = &denom / row.denom();
        let inner = row.noms().len();
        for (k, n) in row.noms().iter().enumerate() {
            noms[i * inner + k] = n * &factor;
        }
        self.inner = FracVector::from_raw(dims, noms, denom);
        Ok(())
    }

    pub fn set_negative(&mut self) {
        self.inner = -&self.inner;
    }

    pub fn set_transpose(&mut self) -> Result<()> {
        self.inner = self.inner.transpose()?;
        Ok(())
    }

    pub fn set_inv(&mut self) -> Result<()> {
        self.inner = self.inner.inv()?;
        Ok(())
    }

    pub fn set_simplify(&mut self) {
        self.inner = self.inner.simplify();
    }

    pub fn set_set_denominator(&mut self, denom: &BigInt) -> Result<()> {
        self.inner = self.inner.set_denominator(denom)?;
        Ok(())
    }

    pub fn set_normalize(&mut self) {
        self.inner = self.inner.normalize();
    }

    pub fn set_normalize_half(&mut self) {
        self.inner = self.inner.normalize_half();
    }
}

impl From<MutableFracVector> for FracVector {
    fn from(m: MutableFracVector) -> Self {
        m.to_fracvector()
    }
}
