use nalgebra::{Matrix3, Vector3};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Neg, Range};

use super::frac_math;
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Input accepted by [`FracVector::create`]: arbitrarily nested lists of anything convertible
/// to a rational number.
///
/// Strings may carry a standard uncertainty in parentheses (`"0.3333(2)"`) and are reduced to
/// the simplest rational inside their uncertainty interval. Floats are converted exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum FracInput {
    Value(BigRational),
    Text(String),
    Float(f64),
    List(Vec<FracInput>),
    Vector(FracVector),
}

macro_rules! frac_input_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FracInput {
            fn from(v: $t) -> Self {
                FracInput::Value(BigRational::from_integer(BigInt::from(v)))
            }
        })*
    };
}

frac_input_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, usize, isize);

impl From<f64> for FracInput {
    fn from(v: f64) -> Self {
        FracInput::Float(v)
    }
}

impl From<&str> for FracInput {
    fn from(v: &str) -> Self {
        FracInput::Text(v.to_string())
    }
}

impl From<String> for FracInput {
    fn from(v: String) -> Self {
        FracInput::Text(v)
    }
}

impl From<BigInt> for FracInput {
    fn from(v: BigInt) -> Self {
        FracInput::Value(BigRational::from_integer(v))
    }
}

impl From<BigRational> for FracInput {
    fn from(v: BigRational) -> Self {
        FracInput::Value(v)
    }
}

impl From<&BigRational> for FracInput {
    fn from(v: &BigRational) -> Self {
        FracInput::Value(v.clone())
    }
}

impl From<FracVector> for FracInput {
    fn from(v: FracVector) -> Self {
        FracInput::Vector(v)
    }
}

impl From<&FracVector> for FracInput {
    fn from(v: &FracVector) -> Self {
        FracInput::Vector(v.clone())
    }
}

impl<T: Into<FracInput>> From<Vec<T>> for FracInput {
    fn from(v: Vec<T>) -> Self {
        FracInput::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FracInput>, const N: usize> From<[T; N]> for FracInput {
    fn from(v: [T; N]) -> Self {
        FracInput::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FracInput> + Clone> From<&[T]> for FracInput {
    fn from(v: &[T]) -> Self {
        FracInput::List(v.iter().cloned().map(Into::into).collect())
    }
}

/// Options for [`FracVector::create_with`].
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Common denominator that every input value is divided by.
    pub denom: Option<BigInt>,
    /// Return the representation with the smallest denominator.
    pub simplify: bool,
    /// Remove the outermost dimension by concatenating the sub-sequences.
    pub chain: bool,
    /// Accuracy assumed for decimal strings without an explicit uncertainty. `None` converts
    /// such strings exactly.
    pub min_accuracy: Option<BigRational>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            denom: None,
            simplify: true,
            chain: false,
            min_accuracy: Some(frac_math::default_min_accuracy()),
        }
    }
}

/// An exact rational tensor: integer nominators over one shared positive denominator.
///
/// The nominators are stored flat in row-major order together with the dimensions. A scalar
/// has empty `dims` and exactly one nominator. Equality is numerical, so two values with
/// different denominators compare equal when they represent the same numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FracVector {
    dims: Vec<usize>,
    noms: Vec<BigInt>,
    denom: BigInt,
}

fn numel(dims: &[usize]) -> usize {
    dims.iter().product()
}

fn lcm_of<'a>(values: impl Iterator<Item = &'a BigInt>) -> BigInt {
    values.fold(BigInt::one(), |acc, d| acc.lcm(d))
}

fn shape_mismatch(operation: &'static str, left: &[usize], right: &[usize]) -> CrystalError {
    CrystalError::ShapeMismatch {
        operation,
        left: left.to_vec(),
        right: right.to_vec(),
    }
}

fn det3(a: &[BigInt]) -> BigInt {
    &a[0] * &a[4] * &a[8] + &a[1] * &a[5] * &a[6] + &a[2] * &a[3] * &a[7]
        - &a[2] * &a[4] * &a[6]
        - &a[1] * &a[3] * &a[8]
        - &a[0] * &a[5] * &a[7]
}

fn cross3(a: &[BigInt], b: &[BigInt]) -> [BigInt; 3] {
    [
        &a[1] * &b[2] - &a[2] * &b[1],
        &a[2] * &b[0] - &a[0] * &b[2],
        &a[0] * &b[1] - &a[1] * &b[0],
    ]
}

/// Formats `x` with exactly `digits` decimals, rounding half away from zero.
fn format_decimal(x: &BigRational, digits: usize) -> String {
    let scale = num_traits::pow(BigInt::from(10), digits);
    let scaled = (x * &scale).round().to_integer();
    let negative = scaled.is_negative();
    let text = scaled.abs().to_string();
    let text = if text.len() <= digits {
        format!("{}{}", "0".repeat(digits + 1 - text.len()), text)
    } else {
        text
    };
    let (int_part, frac_part) = text.split_at(text.len() - digits);
    let sign = if negative { "-" } else { "" };
    if digits == 0 {
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

fn flatten_input(
    input: &FracInput,
    convert: &dyn Fn(&FracInput) -> Result<BigRational>,
) -> Result<(Vec<usize>, Vec<BigRational>)> {
    match input {
        FracInput::List(items) => {
            let mut dims: Option<Vec<usize>> = None;
            let mut values = Vec::new();
            for item in items {
                let (sub_dims, sub_values) = flatten_input(item, convert)?;
                match &dims {
                    Some(d) if *d != sub_dims => {
                        return Err(shape_mismatch("create", d, &sub_dims));
                    }
                    Some(_) => {}
                    None => dims = Some(sub_dims),
                }
                values.extend(sub_values);
            }
            let mut out = vec![items.len()];
            out.extend(dims.unwrap_or_default());
            Ok((out, values))
        }
        FracInput::Vector(v) => Ok((v.dims.clone(), v.to_fractions())),
        scalar => Ok((Vec::new(), vec![convert(scalar)?])),
    }
}

fn convert_scalar(input: &FracInput, min_accuracy: Option<&BigRational>) -> Result<BigRational> {
    match input {
        FracInput::Value(v) => Ok(v.clone()),
        FracInput::Text(s) => frac_math::string_to_fraction(s, min_accuracy),
        FracInput::Float(f) => BigRational::from_float(*f)
            .ok_or_else(|| CrystalError::math(format!("cannot convert non-finite float {}", f))),
        FracInput::List(_) | FracInput::Vector(_) => {
            Err(CrystalError::internal("convert_scalar called on a nested value"))
        }
    }
}

impl FracVector {
    // ======================== CONSTRUCTION ========================

    /// Builds a FracVector from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::Math`] for a zero denominator and
    /// [`CrystalError::ShapeMismatch`] if the number of nominators does not match `dims`.
    pub fn new(dims: Vec<usize>, noms: Vec<BigInt>, denom: BigInt) -> Result<Self> {
        if denom.is_zero() {
            return Err(CrystalError::math("FracVector with zero denominator"));
        }
        if numel(&dims) != noms.len() {
            return Err(shape_mismatch("new", &dims, &[noms.len()]));
        }
        Ok(Self::from_raw(dims, noms, denom))
    }

    /// Unchecked constructor. Fixes the sign of the denominator.
    pub(crate) fn from_raw(dims: Vec<usize>, noms: Vec<BigInt>, denom: BigInt) -> Self {
        if denom.is_negative() {
            Self {
                dims,
                noms: noms.into_iter().map(|n| -n).collect(),
                denom: -denom,
            }
        } else {
            Self { dims, noms, denom }
        }
    }

    /// An integer scalar.
    pub fn scalar(value: impl Into<BigInt>) -> Self {
        Self::from_raw(Vec::new(), vec![value.into()], BigInt::one())
    }

    /// A rational scalar.
    pub fn from_rational(value: &BigRational) -> Self {
        Self::from_raw(Vec::new(), vec![value.numer().clone()], value.denom().clone())
    }

    /// Puts the given rationals on their least common denominator.
    pub fn from_rationals(dims: Vec<usize>, values: &[BigRational]) -> Result<Self> {
        if numel(&dims) != values.len() {
            return Err(shape_mismatch("from_rationals", &dims, &[values.len()]));
        }
        let denom = lcm_of(values.iter().map(|v| v.denom()));
        let noms = values
            .iter()
            .map(|v| v.numer() * (&denom / v.denom()))
            .collect();
        Ok(Self::from_raw(dims, noms, denom))
    }

    /// Creates a simplified FracVector from any nested input.
    ///
    /// ```
    /// use fracstruct::fracvector::FracVector;
    /// let v = FracVector::create(vec!["1/2", "0.25", "0.3333"]).unwrap();
    /// assert_eq!(v.to_string(), "[1/2, 1/4, 1/3]");
    /// ```
    pub fn create(data: impl Into<FracInput>) -> Result<Self> {
        Self::create_with(data, &CreateOptions::default())
    }

    /// Creates a FracVector where every element of `data` is divided by `denom`.
    pub fn create_with_denom(data: impl Into<FracInput>, denom: impl Into<BigInt>) -> Result<Self> {
        Self::create_with(
            data,
            &CreateOptions {
                denom: Some(denom.into()),
                ..CreateOptions::default()
            },
        )
    }

    /// Creates a FracVector with the outermost dimension removed by concatenation, so
    /// `[[1,2],[3,4]]` becomes `[1,2,3,4]`.
    pub fn create_chained(data: impl Into<FracInput>) -> Result<Self> {
        Self::create_with(
            data,
            &CreateOptions {
                chain: true,
                ..CreateOptions::default()
            },
        )
    }

    /// Creates a FracVector converting decimal strings exactly.
    pub fn create_exact(data: impl Into<FracInput>) -> Result<Self> {
        Self::create_with(
            data,
            &CreateOptions {
                min_accuracy: None,
                ..CreateOptions::default()
            },
        )
    }

    pub fn create_with(data: impl Into<FracInput>, options: &CreateOptions) -> Result<Self> {
        let input = data.into();
        let min_accuracy = options.min_accuracy.as_ref();
        let (mut dims, values) = flatten_input(&input, &|x| convert_scalar(x, min_accuracy))?;
        let mut v = Self::from_rationals(dims.clone(), &values)?;
        if options.chain {
            if dims.len() < 2 {
                return Err(shape_mismatch("create (chain)", &dims, &[]));
            }
            let outer = dims.remove(0);
            dims[0] *= outer;
            v.dims = dims;
        }
        if let Some(denom) = &options.denom {
            if denom.is_zero() {
                return Err(CrystalError::math("create: zero denominator"));
            }
            v = Self::from_raw(v.dims, v.noms, v.denom * denom);
        }
        if options.simplify {
            v = v.simplify();
        }
        Ok(v)
    }

    /// Creates a FracVector from floating point data interpreted at the given resolution
    /// (typically `2^32`).
    pub fn from_floats(data: impl Into<FracInput>, resolution: u64) -> Result<Self> {
        if resolution == 0 {
            return Err(CrystalError::math("from_floats: resolution must be positive"));
        }
        let res = resolution as f64;
        let eps = 0.1 / res;
        let convert = |x: &FracInput| -> Result<BigRational> {
            match x {
                FracInput::Float(f) => {
                    let scaled = ((f + eps) * res).trunc();
                    let nom = BigInt::from_f64(scaled).ok_or_else(|| {
                        CrystalError::math(format!("cannot convert non-finite float {}", f))
                    })?;
                    Ok(BigRational::new(nom, BigInt::from(resolution)))
                }
                other => convert_scalar(other, None),
            }
        };
        let (dims, values) = flatten_input(&data.into(), &convert)?;
        Ok(Self::from_rationals(dims, &values)?.simplify())
    }

    /// Applies `func` to every element. String elements are evaluated at both ends of their
    /// uncertainty interval and the simplest rational in the image is kept.
    fn create_func<F>(data: FracInput, func: F) -> Result<Self>
    where
        F: Fn(&BigRational) -> Result<BigRational>,
    {
        let convert = |x: &FracInput| -> Result<BigRational> {
            match x {
                FracInput::Text(s) => frac_math::string_func_to_fraction(s, &func),
                other => func(&convert_scalar(other, None)?),
            }
        };
        let (dims, values) = flatten_input(&data, &convert)?;
        Ok(Self::from_rationals(dims, &values)?.simplify())
    }

    pub fn create_cos(data: impl Into<FracInput>, degrees: bool, prec: &BigRational) -> Result<Self> {
        Self::create_func(data.into(), |x| frac_math::frac_cos(x, prec, degrees))
    }

    pub fn create_sin(data: impl Into<FracInput>, degrees: bool, prec: &BigRational) -> Result<Self> {
        Self::create_func(data.into(), |x| frac_math::frac_sin(x, prec, degrees))
    }

    pub fn create_exp(data: impl Into<FracInput>, prec: &BigRational) -> Result<Self> {
        Self::create_func(data.into(), |x| frac_math::frac_exp(x, prec))
    }

    /// A scalar within `prec` of π.
    pub fn pi(prec: &BigRational) -> Result<Self> {
        Ok(Self::from_rational(&frac_math::frac_pi(prec)?))
    }

    /// The `n`×`n` identity matrix.
    pub fn eye(n: usize) -> Self {
        let mut noms = vec![BigInt::zero(); n * n];
        for i in 0..n {
            noms[i * n + i] = BigInt::one();
        }
        Self::from_raw(vec![n, n], noms, BigInt::one())
    }

    pub fn zeros(dims: &[usize]) -> Self {
        Self::from_raw(dims.to_vec(), vec![BigInt::zero(); numel(dims)], BigInt::one())
    }

    /// Rebuilds a FracVector from the parts returned by [`FracVector::to_parts`].
    pub fn from_parts(denom: BigInt, dims: Vec<usize>, noms: Vec<BigInt>) -> Result<Self> {
        Self::new(dims, noms, denom)
    }

    /// Concatenates FracVectors along their first axis.
    pub fn chain_vecs(vecs: &[FracVector]) -> Result<Self> {
        let Some(first) = vecs.first() else {
            return Ok(Self::zeros(&[0]));
        };
        if first.dims.is_empty() {
            let as_rows: Vec<FracVector> = vecs.iter().map(|v| v.promote()).collect();
            return Self::chain_vecs(&as_rows);
        }
        let inner = &first.dims[1..];
        for v in vecs {
            if v.dims.is_empty() || &v.dims[1..] != inner {
                return Err(shape_mismatch("chain_vecs", &first.dims, &v.dims));
            }
        }
        let denom = lcm_of(vecs.iter().map(|v| &v.denom));
        let mut noms = Vec::new();
        let mut outer = 0;
        for v in vecs {
            let factor = &denom / &v.denom;
            noms.extend(v.noms.iter().map(|n| n * &factor));
            outer += v.dims[0];
        }
        let mut dims = vec![outer];
        dims.extend_from_slice(inner);
        Ok(Self::from_raw(dims, noms, denom))
    }

    /// Stacks equally shaped FracVectors along a new first axis.
    pub fn stack_vecs(vecs: &[FracVector]) -> Result<Self> {
        let Some(first) = vecs.first() else {
            return Ok(Self::zeros(&[0]));
        };
        for v in vecs {
            if v.dims != first.dims {
                return Err(shape_mismatch("stack_vecs", &first.dims, &v.dims));
            }
        }
        let rows: Vec<FracVector> = vecs.iter().map(|v| v.promote()).collect();
        Self::chain_vecs(&rows)
    }

    /// Adds a leading axis of length one.
    fn promote(&self) -> Self {
        let mut dims = vec![1];
        dims.extend_from_slice(&self.dims);
        Self::from_raw(dims, self.noms.clone(), self.denom.clone())
    }

    // ======================== ACCESS ========================

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Length of the first axis (zero for scalars).
    pub fn len(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.noms.is_empty()
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    /// Flat row-major nominators.
    pub fn noms(&self) -> &[BigInt] {
        &self.noms
    }

    /// Returns `(denominator, dims, nominators)`.
    pub fn to_parts(&self) -> (BigInt, Vec<usize>, Vec<BigInt>) {
        (self.denom.clone(), self.dims.clone(), self.noms.clone())
    }

    /// Sub-tensor `i` along the first axis.
    pub fn get(&self, i: usize) -> Result<Self> {
        if self.dims.is_empty() || i >= self.dims[0] {
            return Err(CrystalError::math(format!(
                "index {} out of range for dims {:?}",
                i, self.dims
            )));
        }
        let inner = numel(&self.dims[1..]);
        Ok(Self::from_raw(
            self.dims[1..].to_vec(),
            self.noms[i * inner..(i + 1) * inner].to_vec(),
            self.denom.clone(),
        ))
    }

    /// The element at a full multi-index.
    pub fn at(&self, index: &[usize]) -> Result<BigRational> {
        if index.len() != self.dims.len() || index.iter().zip(&self.dims).any(|(i, d)| i >= d) {
            return Err(CrystalError::math(format!(
                "index {:?} out of range for dims {:?}",
                index, self.dims
            )));
        }
        let flat = index
            .iter()
            .zip(&self.dims)
            .fold(0, |acc, (i, d)| acc * d + i);
        Ok(BigRational::new(self.noms[flat].clone(), self.denom.clone()))
    }

    /// Sub-tensors along the first axis.
    pub fn rows(&self) -> Result<Vec<Self>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Rows `range` along the first axis.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if self.dims.is_empty() || range.start > range.end || range.end > self.dims[0] {
            return Err(CrystalError::math(format!(
                "slice {:?} out of range for dims {:?}",
                range, self.dims
            )));
        }
        let inner = numel(&self.dims[1..]);
        let mut dims = self.dims.clone();
        dims[0] = range.end - range.start;
        Ok(Self::from_raw(
            dims,
            self.noms[range.start * inner..range.end * inner].to_vec(),
            self.denom.clone(),
        ))
    }

    /// Column `j` of a matrix.
    pub fn column(&self, j: usize) -> Result<Self> {
        self.transpose()?.get(j)
    }

    pub fn flatten(&self) -> Self {
        Self::from_raw(vec![self.noms.len()], self.noms.clone(), self.denom.clone())
    }

    // ======================== STRUCTURAL EDITS ========================

    /// Inserts `item` at position `pos` along the first axis.
    pub fn insert(&self, pos: usize, item: &FracVector) -> Result<Self> {
        if self.dims.is_empty() || item.dims[..] != self.dims[1..] {
            return Err(shape_mismatch("insert", &self.dims, &item.dims));
        }
        if pos > self.dims[0] {
            return Err(CrystalError::math(format!("insert position {} out of range", pos)));
        }
        let mut parts = Vec::with_capacity(3);
        if pos > 0 {
            parts.push(self.slice(0..pos)?);
        }
        parts.push(item.promote());
        if pos < self.dims[0] {
            parts.push(self.slice(pos..self.dims[0])?);
        }
        Self::chain_vecs(&parts)
    }

    pub fn append(&self, item: &FracVector) -> Result<Self> {
        self.insert(self.len(), item)
    }

    pub fn prepend(&self, item: &FracVector) -> Result<Self> {
        self.insert(0, item)
    }

    /// Appends all rows of `other`.
    pub fn extend(&self, other: &FracVector) -> Result<Self> {
        Self::chain_vecs(&[self.clone(), other.clone()])
    }

    /// Transpose of a matrix; vectors and scalars are returned unchanged.
    pub fn transpose(&self) -> Result<Self> {
        match self.dims.len() {
            0 | 1 => Ok(self.clone()),
            2 => {
                let (r, c) = (self.dims[0], self.dims[1]);
                let noms = (0..c)
                    .flat_map(|j| (0..r).map(move |i| (i, j)))
                    .map(|(i, j)| self.noms[i * c + j].clone())
                    .collect();
                Ok(Self::from_raw(vec![c, r], noms, self.denom.clone()))
            }
            _ => Err(shape_mismatch("transpose", &self.dims, &[])),
        }
    }

    // ======================== CONVERSIONS ========================

    /// All elements as rationals, flat in row-major order.
    pub fn to_fractions(&self) -> Vec<BigRational> {
        self.noms
            .iter()
            .map(|n| BigRational::new(n.clone(), self.denom.clone()))
            .collect()
    }

    /// The value of a scalar.
    pub fn to_rational(&self) -> Result<BigRational> {
        if !self.is_scalar() {
            return Err(shape_mismatch("to_rational", &self.dims, &[]));
        }
        Ok(BigRational::new(self.noms[0].clone(), self.denom.clone()))
    }

    pub fn to_floats(&self) -> Vec<f64> {
        self.to_fractions()
            .iter()
            .map(|x| x.to_f64().unwrap_or(f64::NAN))
            .collect()
    }

    pub fn to_f64(&self) -> Result<f64> {
        let x = self.to_rational()?;
        x.to_f64()
            .ok_or_else(|| CrystalError::math(format!("{} is not representable as f64", x)))
    }

    /// Elements rounded to the nearest integer (half away from zero).
    pub fn to_ints(&self) -> Vec<BigInt> {
        self.to_fractions()
            .iter()
            .map(|x| x.round().to_integer())
            .collect()
    }

    /// Elements as integers.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::Math`] unless every element is integral.
    pub fn to_integers(&self) -> Result<Vec<BigInt>> {
        self.to_fractions()
            .into_iter()
            .map(|x| {
                if x.is_integer() {
                    Ok(x.to_integer())
                } else {
                    Err(CrystalError::math(format!("{} is not an integer", x)))
                }
            })
            .collect()
    }

    /// Elements as `i64`, requiring every element to be integral and in range.
    pub fn to_i64s(&self) -> Result<Vec<i64>> {
        self.to_integers()?
            .into_iter()
            .map(|n| {
                n.to_i64()
                    .ok_or_else(|| CrystalError::math(format!("{} does not fit in i64", n)))
            })
            .collect()
    }

    /// Decimal strings with `digits` decimals.
    pub fn to_strings(&self, digits: usize) -> Vec<String> {
        self.to_fractions()
            .iter()
            .map(|x| format_decimal(x, digits))
            .collect()
    }

    pub fn to_matrix3(&self) -> Result<Matrix3<f64>> {
        if self.dims != [3, 3] {
            return Err(shape_mismatch("to_matrix3", &self.dims, &[3, 3]));
        }
        Ok(Matrix3::from_row_slice(&self.to_floats()))
    }

    pub fn to_vector3(&self) -> Result<Vector3<f64>> {
        if self.dims != [3] {
            return Err(shape_mismatch("to_vector3", &self.dims, &[3]));
        }
        Ok(Vector3::from_column_slice(&self.to_floats()))
    }

    // ======================== DENOMINATOR CONTROL ========================

    /// The equivalent FracVector with the smallest possible denominator.
    pub fn simplify(&self) -> Self {
        let g = self
            .noms
            .iter()
            .fold(self.denom.clone(), |acc, n| acc.gcd(n));
        if g.is_one() || g.is_zero() {
            return self.clone();
        }
        Self::from_raw(
            self.dims.clone(),
            self.noms.iter().map(|n| n / &g).collect(),
            &self.denom / &g,
        )
    }

    /// Rounds every element to the nearest multiple of `1/denom`. Exact halves go to the lower
    /// multiple.
    pub fn set_denominator(&self, denom: &BigInt) -> Result<Self> {
        if !denom.is_positive() {
            return Err(CrystalError::math("set_denominator: denominator must be positive"));
        }
        let d = &self.denom;
        let noms = self
            .noms
            .iter()
            .map(|x| {
                let low = (x * denom).div_floor(d);
                if x * denom * 2 > (&low * 2 + 1) * d {
                    low + 1
                } else {
                    low
                }
            })
            .collect();
        Ok(Self::from_raw(self.dims.clone(), noms, denom.clone()))
    }

    /// Replaces every element by its closest rational with denominator at most `max_denom`.
    /// The common denominator of the result may exceed `max_denom`.
    pub fn limit_denominator(&self, max_denom: &BigInt) -> Result<Self> {
        let values = self
            .to_fractions()
            .iter()
            .map(|x| frac_math::limit_denominator(x, max_denom))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_rationals(self.dims.clone(), &values)?.simplify())
    }

    // ======================== ELEMENTWISE ========================

    fn map_noms(&self, f: impl Fn(&BigInt) -> BigInt, denom: BigInt) -> Self {
        Self::from_raw(self.dims.clone(), self.noms.iter().map(f).collect(), denom)
    }

    fn map_rationals(&self, f: impl Fn(&BigRational) -> Result<BigRational>) -> Result<Self> {
        let values = self
            .to_fractions()
            .iter()
            .map(f)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_rationals(self.dims.clone(), &values)?.simplify())
    }

    pub fn floor(&self) -> Self {
        self.map_noms(|x| x.div_floor(&self.denom), BigInt::one())
    }

    pub fn ceil(&self) -> Self {
        self.map_noms(|x| -((-x).div_floor(&self.denom)), BigInt::one())
    }

    /// Reduces every element into [0, 1).
    pub fn normalize(&self) -> Self {
        self.map_noms(|x| x.mod_floor(&self.denom), self.denom.clone())
    }

    /// Reduces every element into [-1/2, 1/2).
    pub fn normalize_half(&self) -> Self {
        let d = &self.denom;
        self.map_noms(
            |x| {
                let twice: BigInt = x * BigInt::from(2);
                let double_denom: BigInt = d * BigInt::from(2);
                // k = floor(x/d + 1/2)
                let k: BigInt = (&twice + d).div_floor(&double_denom);
                twice - &double_denom * k
            },
            d * 2,
        )
        .simplify()
    }

    pub fn abs(&self) -> Self {
        self.map_noms(|x| x.abs(), self.denom.clone())
    }

    /// Elementwise sign as -1, 0 or 1.
    pub fn sign(&self) -> Self {
        self.map_noms(|x| x.signum(), BigInt::one())
    }

    fn extreme(&self, ordering: Ordering) -> Result<(usize, BigRational)> {
        let mut best: Option<usize> = None;
        for (i, n) in self.noms.iter().enumerate() {
            match best {
                Some(b) if n.cmp(&self.noms[b]) != ordering => {}
                _ => best = Some(i),
            }
        }
        let best = best.ok_or_else(|| CrystalError::math("extreme value of an empty FracVector"))?;
        Ok((best, BigRational::new(self.noms[best].clone(), self.denom.clone())))
    }

    fn unflatten_index(&self, mut flat: usize) -> Vec<usize> {
        let mut index = vec![0; self.dims.len()];
        for (k, d) in self.dims.iter().enumerate().rev() {
            index[k] = flat % d;
            flat /= d;
        }
        index
    }

    /// The largest element.
    pub fn max(&self) -> Result<BigRational> {
        Ok(self.extreme(Ordering::Greater)?.1)
    }

    pub fn min(&self) -> Result<BigRational> {
        Ok(self.extreme(Ordering::Less)?.1)
    }

    /// Multi-index of the first largest element.
    pub fn argmax(&self) -> Result<Vec<usize>> {
        Ok(self.unflatten_index(self.extreme(Ordering::Greater)?.0))
    }

    pub fn argmin(&self) -> Result<Vec<usize>> {
        Ok(self.unflatten_index(self.extreme(Ordering::Less)?.0))
    }

    // ======================== ARITHMETIC ========================

    fn zip_with(
        &self,
        other: &FracVector,
        operation: &'static str,
        f: impl Fn(BigInt, BigInt) -> BigInt,
    ) -> Result<Self> {
        let denom = self.denom.lcm(&other.denom);
        let ma = &denom / &self.denom;
        let mb = &denom / &other.denom;
        let (dims, noms) = if self.dims == other.dims {
            let noms = self
                .noms
                .iter()
                .zip(&other.noms)
                .map(|(a, b)| f(a * &ma, b * &mb))
                .collect();
            (self.dims.clone(), noms)
        } else if other.is_scalar() {
            let b = &other.noms[0] * &mb;
            let noms = self.noms.iter().map(|a| f(a * &ma, b.clone())).collect();
            (self.dims.clone(), noms)
        } else if self.is_scalar() {
            let a = &self.noms[0] * &ma;
            let noms = other.noms.iter().map(|b| f(a.clone(), b * &mb)).collect();
            (other.dims.clone(), noms)
        } else {
            return Err(shape_mismatch(operation, &self.dims, &other.dims));
        };
        Ok(Self::from_raw(dims, noms, denom))
    }

    /// Elementwise sum; a scalar operand is broadcast.
    pub fn try_add(&self, other: &FracVector) -> Result<Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Elementwise difference; a scalar operand is broadcast.
    pub fn try_sub(&self, other: &FracVector) -> Result<Self> {
        self.zip_with(other, "sub", |a, b| a - b)
    }

    /// Multiplies every element by a rational.
    pub fn scale(&self, factor: &BigRational) -> Self {
        Self::from_raw(
            self.dims.clone(),
            self.noms.iter().map(|n| n * factor.numer()).collect(),
            &self.denom * factor.denom(),
        )
    }

    /// Divides every element by a scalar.
    pub fn div(&self, other: &FracVector) -> Result<Self> {
        let x = other.to_rational()?;
        if x.is_zero() {
            return Err(CrystalError::math("division by zero"));
        }
        Ok(self.scale(&x.recip()))
    }

    /// Rank-aware product.
    ///
    /// Scalars scale the other operand. Two vectors multiply elementwise (use [`FracVector::dot`]
    /// for the scalar product). Matrix·vector, vector·matrix and matrix·matrix are the usual
    /// matrix products, and a rank-3 tensor times a matrix multiplies each of its matrices.
    pub fn mul(&self, other: &FracVector) -> Result<Self> {
        let denom = &self.denom * &other.denom;
        let a = &self.noms;
        let b = &other.noms;
        let (dims, noms): (Vec<usize>, Vec<BigInt>) = match (self.dims.as_slice(), other.dims.as_slice()) {
            (_, []) => (self.dims.clone(), a.iter().map(|x| x * &b[0]).collect()),
            ([], _) => (other.dims.clone(), b.iter().map(|x| &a[0] * x).collect()),
            ([n], [m]) => {
                if n != m {
                    return Err(shape_mismatch("mul", &self.dims, &other.dims));
                }
                (vec![*n], a.iter().zip(b).map(|(x, y)| x * y).collect())
            }
            ([r, c], [m]) => {
                if c != m {
                    return Err(shape_mismatch("mul", &self.dims, &other.dims));
                }
                let noms = (0..*r)
                    .map(|i| (0..*c).map(|k| &a[i * c + k] * &b[k]).sum::<BigInt>())
                    .collect();
                (vec![*r], noms)
            }
            ([n], [r, c]) => {
                if n != r {
                    return Err(shape_mismatch("mul", &self.dims, &other.dims));
                }
                let noms = (0..*c)
                    .map(|j| (0..*r).map(|k| &a[k] * &b[k * c + j]).sum::<BigInt>())
                    .collect();
                (vec![*c], noms)
            }
            ([r, k], [k2, c]) => {
                if k != k2 {
                    return Err(shape_mismatch("mul", &self.dims, &other.dims));
                }
                (vec![*r, *c], matmul_noms(a, b, *r, *k, *c))
            }
            ([p, r, k], [k2, c]) => {
                if k != k2 {
                    return Err(shape_mismatch("mul", &self.dims, &other.dims));
                }
                let block = r * k;
                let noms = (0..*p)
                    .flat_map(|i| matmul_noms(&a[i * block..(i + 1) * block], b, *r, *k, *c))
                    .collect();
                (vec![*p, *r, *c], noms)
            }
            _ => return Err(shape_mismatch("mul", &self.dims, &other.dims)),
        };
        Ok(Self::from_raw(dims, noms, denom))
    }

    /// Scalar product of two vectors.
    pub fn dot(&self, other: &FracVector) -> Result<Self> {
        if self.rank() != 1 || self.dims != other.dims {
            return Err(shape_mismatch("dot", &self.dims, &other.dims));
        }
        let nom: BigInt = self.noms.iter().zip(&other.noms).map(|(a, b)| a * b).sum();
        Ok(Self::from_raw(Vec::new(), vec![nom], &self.denom * &other.denom))
    }

    /// Squared length of a vector (or square of a scalar).
    pub fn lengthsqr(&self) -> Result<Self> {
        match self.rank() {
            0 | 1 => {
                let nom: BigInt = self.noms.iter().map(|x| x * x).sum();
                Ok(Self::from_raw(Vec::new(), vec![nom], &self.denom * &self.denom))
            }
            _ => Err(shape_mismatch("lengthsqr", &self.dims, &[])),
        }
    }

    /// Cross product of two 3-vectors.
    pub fn cross(&self, other: &FracVector) -> Result<Self> {
        if self.dims != [3] || other.dims != [3] {
            return Err(shape_mismatch("cross", &self.dims, &other.dims));
        }
        Ok(Self::from_raw(
            vec![3],
            cross3(&self.noms, &other.noms).to_vec(),
            &self.denom * &other.denom,
        ))
    }

    /// `A·M·Bᵀ` with `self` as the square metric `M`. For matrices `A` and `B` the product is
    /// taken row by row and a vector of results is returned.
    pub fn metric_product(&self, a: &FracVector, b: &FracVector) -> Result<Self> {
        let l = match self.dims.as_slice() {
            [r, c] if r == c => *r,
            _ => return Err(shape_mismatch("metric_product", &self.dims, &[])),
        };
        if a.dims != b.dims || a.dims.last() != Some(&l) || a.rank() > 2 {
            return Err(shape_mismatch("metric_product", &a.dims, &b.dims));
        }
        let m = &self.noms;
        let product = |x: &[BigInt], y: &[BigInt]| -> BigInt {
            (0..l)
                .flat_map(|r| (0..l).map(move |c| (r, c)))
                .map(|(r, c)| &x[r] * &m[r * l + c] * &y[c])
                .sum()
        };
        let denom = &a.denom * &b.denom * &self.denom;
        if a.rank() == 1 {
            return Ok(Self::from_raw(Vec::new(), vec![product(&a.noms, &b.noms)], denom));
        }
        let noms = (0..a.dims[0])
            .map(|i| product(&a.noms[i * l..(i + 1) * l], &b.noms[i * l..(i + 1) * l]))
            .collect();
        Ok(Self::from_raw(vec![a.dims[0]], noms, denom))
    }

    // ======================== LINEAR ALGEBRA ========================

    /// Determinant of a square matrix of size 1 to 4.
    pub fn det(&self) -> Result<Self> {
        let n = match self.dims.as_slice() {
            [r, c] if r == c && (1..=4).contains(r) => *r,
            _ => return Err(shape_mismatch("det", &self.dims, &[])),
        };
        let a = &self.noms;
        let nom = match n {
            1 => a[0].clone(),
            2 => &a[0] * &a[3] - &a[1] * &a[2],
            3 => det3(a),
            _ => (0..4)
                .map(|j| {
                    let minor: Vec<BigInt> = (1..4)
                        .flat_map(|r| (0..4).filter(move |&c| c != j).map(move |c| (r, c)))
                        .map(|(r, c)| a[r * 4 + c].clone())
                        .collect();
                    let term = &a[j] * det3(&minor);
                    if j % 2 == 0 {
                        term
                    } else {
                        -term
                    }
                })
                .sum(),
        };
        let denom = num_traits::pow(self.denom.clone(), n);
        Ok(Self::from_raw(Vec::new(), vec![nom], denom).simplify())
    }

    /// Inverse of a scalar or of a square matrix of size 1 to 3.
    ///
    /// # Errors
    ///
    /// Returns [`CrystalError::Math`] when the value is zero or the matrix singular.
    pub fn inv(&self) -> Result<Self> {
        let a = &self.noms;
        let d = &self.denom;
        match self.dims.as_slice() {
            [] => {
                if a[0].is_zero() {
                    return Err(CrystalError::math("inverse of zero"));
                }
                Ok(Self::from_raw(Vec::new(), vec![d.clone()], a[0].clone()))
            }
            [1, 1] => {
                if a[0].is_zero() {
                    return Err(CrystalError::math("inverse of singular matrix"));
                }
                Ok(Self::from_raw(vec![1, 1], vec![d.clone()], a[0].clone()))
            }
            [2, 2] => {
                let det = &a[0] * &a[3] - &a[1] * &a[2];
                if det.is_zero() {
                    return Err(CrystalError::math("inverse of singular matrix"));
                }
                let noms = [a[3].clone(), -&a[1], -&a[2], a[0].clone()]
                    .into_iter()
                    .map(|x| x * d)
                    .collect();
                Ok(Self::from_raw(vec![2, 2], noms, det).simplify())
            }
            [3, 3] => {
                let det = det3(a);
                if det.is_zero() {
                    return Err(CrystalError::math("inverse of singular matrix"));
                }
                let cof = |i: usize, j: usize, k: usize, l: usize| &a[i] * &a[j] - &a[k] * &a[l];
                let adj = [
                    cof(4, 8, 5, 7),
                    cof(2, 7, 1, 8),
                    cof(1, 5, 2, 4),
                    cof(5, 6, 3, 8),
                    cof(0, 8, 2, 6),
                    cof(2, 3, 0, 5),
                    cof(3, 7, 4, 6),
                    cof(1, 6, 0, 7),
                    cof(0, 4, 1, 3),
                ];
                let noms = adj.into_iter().map(|x| x * d).collect();
                Ok(Self::from_raw(vec![3, 3], noms, det).simplify())
            }
            _ => Err(shape_mismatch("inv", &self.dims, &[])),
        }
    }

    /// Reciprocal lattice of a 3×3 basis: the rows of `(Bᵀ)⁻¹`, without a factor 2π.
    pub fn reciprocal(&self) -> Result<Self> {
        if self.dims != [3, 3] {
            return Err(shape_mismatch("reciprocal", &self.dims, &[3, 3]));
        }
        let a = &self.noms;
        let det = det3(a);
        if det.is_zero() {
            return Err(CrystalError::math("reciprocal of singular basis"));
        }
        let (v1, v2, v3) = (&a[0..3], &a[3..6], &a[6..9]);
        let noms = [cross3(v2, v3), cross3(v3, v1), cross3(v1, v2)]
            .into_iter()
            .flatten()
            .map(|x| x * &self.denom)
            .collect();
        Ok(Self::from_raw(vec![3, 3], noms, det).simplify())
    }

    /// Integer power. Negative exponents use the inverse; zero gives the identity matrix.
    pub fn pow(&self, exp: i32) -> Result<Self> {
        if self.is_scalar() {
            let base = if exp < 0 { self.inv()? } else { self.clone() };
            let e = exp.unsigned_abs() as usize;
            return Ok(Self::from_raw(
                Vec::new(),
                vec![num_traits::pow(base.noms[0].clone(), e)],
                num_traits::pow(base.denom.clone(), e),
            ));
        }
        let n = match self.dims.as_slice() {
            [r, c] if r == c => *r,
            _ => return Err(shape_mismatch("pow", &self.dims, &[])),
        };
        let base = if exp < 0 { self.inv()? } else { self.clone() };
        let mut result = Self::eye(n);
        for _ in 0..exp.unsigned_abs() {
            result = result.mul(&base)?.simplify();
        }
        Ok(result)
    }

    // ======================== TRANSCENDENTALS ========================

    pub fn sqrt(&self, prec: &BigRational) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_sqrt(x, prec))
    }

    pub fn exp(&self, prec: &BigRational) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_exp(x, prec))
    }

    pub fn cos(&self, prec: &BigRational, degrees: bool) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_cos(x, prec, degrees))
    }

    pub fn sin(&self, prec: &BigRational, degrees: bool) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_sin(x, prec, degrees))
    }

    pub fn acos(&self, prec: &BigRational, degrees: bool) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_acos(x, prec, degrees))
    }

    pub fn asin(&self, prec: &BigRational, degrees: bool) -> Result<Self> {
        self.map_rationals(|x| frac_math::frac_asin(x, prec, degrees))
    }
}

fn matmul_noms(a: &[BigInt], b: &[BigInt], r: usize, k: usize, c: usize) -> Vec<BigInt> {
    (0..r)
        .flat_map(|i| (0..c).map(move |j| (i, j)))
        .map(|(i, j)| (0..k).map(|t| &a[i * k + t] * &b[t * c + j]).sum::<BigInt>())
        .collect()
}

impl PartialEq for FracVector {
    fn eq(&self, other: &Self) -> bool {
        if self.dims != other.dims {
            return false;
        }
        if self.denom == other.denom {
            return self.noms == other.noms;
        }
        self.noms
            .iter()
            .zip(&other.noms)
            .all(|(a, b)| a * &other.denom == b * &self.denom)
    }
}

impl Eq for FracVector {}

impl Hash for FracVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let s = self.simplify();
        s.dims.hash(state);
        s.noms.hash(state);
        s.denom.hash(state);
    }
}

/// Scalars are ordered numerically; tensors are not ordered.
impl PartialOrd for FracVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.is_scalar() || !other.is_scalar() {
            return None;
        }
        Some((&self.noms[0] * &other.denom).cmp(&(&other.noms[0] * &self.denom)))
    }
}

impl Neg for FracVector {
    type Output = FracVector;

    fn neg(self) -> FracVector {
        -&self
    }
}

impl Neg for &FracVector {
    type Output = FracVector;

    fn neg(self) -> FracVector {
        self.map_noms(|x| -x, self.denom.clone())
    }
}

impl fmt::Display for FracVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_level(
            f: &mut fmt::Formatter<'_>,
            dims: &[usize],
            values: &[BigRational],
        ) -> fmt::Result {
            match dims.split_first() {
                None => write!(f, "{}", values[0]),
                Some((n, rest)) => {
                    let inner = numel(rest);
                    write!(f, "[")?;
                    for i in 0..*n {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write_level(f, rest, &values[i * inner..(i + 1) * inner])?;
                    }
                    write!(f, "]")
                }
            }
        }
        write_level(f, &self.dims, &self.to_fractions())
    }
}

impl TryFrom<&FracVector> for Matrix3<f64> {
    type Error = CrystalError;

    fn try_from(v: &FracVector) -> Result<Self> {
        v.to_matrix3()
    }
}
