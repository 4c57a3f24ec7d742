//! Scalar rational arithmetic helpers.
//!
//! Continued fractions, best rational approximations inside an interval, decimal strings with
//! standard uncertainty, and rational approximations of transcendental functions. Everything in
//! this module operates on [`BigRational`] so no precision is ever lost.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::config::{STRING_MIN_ACCURACY, TRANSCENDENTAL_PRECISION};
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Shorthand for the rational `n/d`.
pub fn ratio(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// Converts a `(numerator, denominator)` pair from the configuration into a rational.
pub fn ratio_from_pair(pair: (i64, i64)) -> BigRational {
    ratio(pair.0, pair.1)
}

/// The default precision used by the transcendental approximations.
pub fn default_precision() -> BigRational {
    ratio_from_pair(TRANSCENDENTAL_PRECISION)
}

/// The accuracy assumed for decimal strings written without an explicit uncertainty.
pub fn default_min_accuracy() -> BigRational {
    ratio_from_pair(STRING_MIN_ACCURACY)
}

// ======================== CONTINUED FRACTIONS ========================

/// Lazy continued-fraction expansion of `p/q` by Euler's algorithm (floor division).
pub struct ContinuedFraction {
    p: BigInt,
    q: BigInt,
}

impl ContinuedFraction {
    pub fn new(x: &BigRational) -> Self {
        Self {
            p: x.numer().clone(),
            q: x.denom().clone(),
        }
    }
}

impl Iterator for ContinuedFraction {
    type Item = BigInt;

    fn next(&mut self) -> Option<BigInt> {
        if self.q.is_zero() {
            return None;
        }
        let n = self.p.div_floor(&self.q);
        let rest = &self.p - &self.q * &n;
        self.p = std::mem::replace(&mut self.q, rest);
        Some(n)
    }
}

/// Evaluates a finite continued fraction `[a0; a1, a2, ...]`.
pub fn fraction_from_continued_fraction(cf: &[BigInt]) -> BigRational {
    let Some((first, rest)) = cf.split_first() else {
        return BigRational::zero();
    };
    let mut acc = BigRational::zero();
    for term in rest.iter().rev() {
        acc = (BigRational::from_integer(term.clone()) + acc).recip();
    }
    BigRational::from_integer(first.clone()) + acc
}

/// Returns the rational with the smallest denominator in the closed interval `[low, high]`.
///
/// Builds the continued fraction term by term: whenever the interval contains an integer the
/// smallest such integer closes the expansion, otherwise the common integer part is taken and the
/// search continues on the reciprocal of the fractional parts. Endpoints are candidates, so
/// `[1/3, 1/2]` gives `1/2`. Intervals containing zero give zero.
pub fn best_rational_in_interval(low: &BigRational, high: &BigRational) -> BigRational {
    let (low, high) = if low <= high { (low, high) } else { (high, low) };
    if !low.is_positive() && !high.is_negative() {
        return BigRational::zero();
    }
    if high.is_negative() {
        return -best_rational_in_interval(&-high, &-low);
    }

    let mut l = low.clone();
    let mut h = high.clone();
    let mut cf = Vec::new();
    loop {
        let ceil = l.ceil();
        if ceil <= h {
            cf.push(ceil.to_integer());
            break;
        }
        let whole = l.floor();
        cf.push(whole.to_integer());
        // No integer in [l, h], so both fractional parts are strictly positive
        let next_low = (&h - &whole).recip();
        let next_high = (&l - &whole).recip();
        l = next_low;
        h = next_high;
    }
    fraction_from_continued_fraction(&cf)
}

/// Closest rational to `x` with a denominator of at most `max_denom`.
pub fn limit_denominator(x: &BigRational, max_denom: &BigInt) -> Result<BigRational> {
    if max_denom < &BigInt::one() {
        return Err(CrystalError::math("limit_denominator: max_denom must be at least 1"));
    }
    if x.denom() <= max_denom {
        return Ok(x.clone());
    }
    let (mut p0, mut q0, mut p1, mut q1) =
        (BigInt::zero(), BigInt::one(), BigInt::one(), BigInt::zero());
    let mut n = x.numer().clone();
    let mut d = x.denom().clone();
    loop {
        let a = n.div_floor(&d);
        let q2 = &q0 + &a * &q1;
        if &q2 > max_denom {
            break;
        }
        let p2 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, p2);
        q0 = std::mem::replace(&mut q1, q2);
        let rest = &n - &a * &d;
        n = std::mem::replace(&mut d, rest);
    }
    let k = (max_denom - &q0).div_floor(&q1);
    let bound1 = BigRational::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let bound2 = BigRational::new(p1, q1);
    if (&bound2 - x).abs() <= (&bound1 - x).abs() {
        Ok(bound2)
    } else {
        Ok(bound1)
    }
}

// ======================== STRING INPUT ========================

/// Parses a plain decimal number (`-1.25`, `3`, `.5`, `2.5E-3`) exactly.
pub fn parse_decimal(text: &str) -> Result<BigRational> {
    let text = text.trim();
    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(pos) => {
            let exp: i64 = text[pos + 1..]
                .trim_start_matches('+')
                .parse()
                .map_err(|_| CrystalError::math(format!("malformed exponent in '{}'", text)))?;
            (&text[..pos], exp)
        }
        None => (text, 0),
    };
    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty()
        || !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit())
    {
        return Err(CrystalError::math(format!("cannot interpret '{}' as a number", text)));
    }
    let all_digits = format!("{}{}", int_part, frac_part);
    let mut nom: BigInt = all_digits
        .parse()
        .map_err(|_| CrystalError::math(format!("cannot interpret '{}' as a number", text)))?;
    if negative {
        nom = -nom;
    }
    let scale = exponent - frac_part.len() as i64;
    let ten = BigInt::from(10);
    let value = if scale >= 0 {
        BigRational::from_integer(nom * num_traits::pow(ten, scale as usize))
    } else {
        BigRational::new(nom, num_traits::pow(ten, (-scale) as usize))
    };
    Ok(value)
}

/// Splits a numeric string into its value and its uncertainty.
///
/// `"0.33342(10)"` gives `(0.33342, 0.00010)`: the digits in parentheses are right-aligned
/// under the digits of the mantissa. Without parentheses the uncertainty is half a unit in the
/// digit after the last one written, but never worse than `min_accuracy`; with
/// `min_accuracy = None` such strings are taken as exact. Fractions (`"1/3"`) are always exact.
pub fn string_to_val_and_delta(
    arg: &str,
    min_accuracy: Option<&BigRational>,
) -> Result<(BigRational, BigRational)> {
    let arg = arg.trim().to_uppercase();

    if let Some((n, d)) = arg.split_once('/') {
        let n = parse_decimal(n)?;
        let d = parse_decimal(d)?;
        if d.is_zero() {
            return Err(CrystalError::math(format!("zero denominator in '{}'", arg)));
        }
        return Ok((n / d, BigRational::zero()));
    }

    let (val, sd, inferred) = match arg.find('(') {
        Some(start) => {
            let end = arg[start..]
                .find(')')
                .map(|e| start + e)
                .ok_or_else(|| CrystalError::math(format!("unbalanced parenthesis in '{}'", arg)))?;
            let rest = arg[end + 1..].to_string();
            (format!("{}{}", &arg[..start], rest), arg[start + 1..end].to_string(), false)
        }
        None => match min_accuracy {
            Some(_) => (arg.clone(), "5".to_string(), true),
            None => return Ok((parse_decimal(&arg)?, BigRational::zero())),
        },
    };

    let (mantissa, exponent) = match val.find('E') {
        Some(pos) => (val[..pos].to_string(), val[pos..].to_string()),
        None => (val.clone(), String::new()),
    };
    let mantissa = if inferred {
        if mantissa.contains('.') {
            format!("{}0", mantissa)
        } else {
            format!("{}.0", mantissa)
        }
    } else {
        mantissa
    };

    let numdigits = mantissa.chars().filter(|c| c.is_ascii_digit()).count();
    let mut replacement: Vec<char> = if sd.len() <= numdigits {
        "0".repeat(numdigits - sd.len()).chars().chain(sd.chars()).collect()
    } else {
        sd.chars().take(numdigits).collect()
    };
    replacement.reverse();
    let delta_text: String = mantissa
        .chars()
        .map(|c| if c.is_ascii_digit() { replacement.pop().unwrap_or('0') } else { c })
        .collect();
    let delta_text = delta_text.trim_start_matches(['-', '+']).to_string();
    let mut delta = parse_decimal(&format!("{}{}", delta_text, exponent))?;

    if inferred {
        if let Some(min_accuracy) = min_accuracy {
            if &delta > min_accuracy {
                delta = min_accuracy.clone();
            }
        }
    }
    Ok((parse_decimal(&val)?, delta))
}

/// Converts a numeric string into the simplest rational compatible with its uncertainty.
pub fn string_to_fraction(arg: &str, min_accuracy: Option<&BigRational>) -> Result<BigRational> {
    let (val, delta) = string_to_val_and_delta(arg, min_accuracy)?;
    if delta.is_zero() {
        Ok(val)
    } else {
        Ok(best_rational_in_interval(&(&val - &delta), &(&val + &delta)))
    }
}

/// Evaluates `func` at both ends of the uncertainty interval of `arg` and returns the simplest
/// rational between the two images.
pub fn string_func_to_fraction<F>(arg: &str, func: F) -> Result<BigRational>
where
    F: Fn(&BigRational) -> Result<BigRational>,
{
    let (val, delta) = string_to_val_and_delta(arg, Some(&default_min_accuracy()))?;
    let low = func(&(&val - &delta))?;
    let high = func(&(&val + &delta))?;
    Ok(best_rational_in_interval(&low, &high))
}

// ======================== TRANSCENDENTAL FUNCTIONS ========================

/// Picks the simplest rational within `prec/2` of an internal approximation `s`.
fn finalize(s: &BigRational, prec: &BigRational) -> BigRational {
    let half = prec / BigInt::from(2);
    best_rational_in_interval(&(s - &half), &(s + &half))
}

fn check_precision(prec: &BigRational) -> Result<()> {
    if !prec.is_positive() {
        return Err(CrystalError::math("precision must be positive"));
    }
    Ok(())
}

/// Integer square root, rounded down.
pub fn integer_sqrt(n: &BigInt) -> BigInt {
    if n.is_negative() {
        return BigInt::zero();
    }
    n.sqrt()
}

/// A rational within `prec` of π.
pub fn frac_pi(prec: &BigRational) -> Result<BigRational> {
    check_precision(prec)?;
    let s = if prec >= &ratio(1, 10_000_000_000_000) {
        BigRational::new(
            "1812775448643948950904740389629316518445900010127"
                .parse::<BigInt>()
                .map_err(|e| CrystalError::internal(e.to_string()))?,
            "577024346734625462205756697620397878260206571339"
                .parse::<BigInt>()
                .map_err(|e| CrystalError::internal(e.to_string()))?,
        )
    } else {
        let inner = prec / BigInt::from(4);
        let three = BigRational::from_integer(BigInt::from(3));
        let mut t = three.clone();
        let mut s = three;
        let (mut n, mut na, mut d, mut da) = (
            BigInt::one(),
            BigInt::zero(),
            BigInt::zero(),
            BigInt::from(24),
        );
        loop {
            n += &na;
            na += 8;
            d += &da;
            da += 32;
            t = t * BigRational::new(n.clone(), d.clone());
            s += &t;
            if t.abs() <= inner {
                break;
            }
        }
        s
    };
    Ok(finalize(&s, prec))
}

fn degrees_to_radians(x: &BigRational, prec: &BigRational) -> Result<BigRational> {
    let factor = x.abs() / BigInt::from(180) + BigRational::one();
    let pi = frac_pi(&(prec / (factor * BigInt::from(16))))?;
    Ok(x * pi / BigInt::from(180))
}

/// Reduces `x` into roughly [-2π, 2π] when it is large.
fn reduce_angle(x: BigRational, prec: &BigRational) -> Result<BigRational> {
    if x.abs() <= ratio(4, 1) {
        return Ok(x);
    }
    let rough_twopi = frac_pi(&ratio(1, 1000))? * BigInt::from(2);
    let fac = (&x / &rough_twopi).trunc();
    let twopi = frac_pi(&(prec / ((fac.abs() + BigRational::one()) * BigInt::from(32))))?
        * BigInt::from(2);
    let fac = (&x / &twopi).trunc();
    Ok(x - fac * twopi)
}

/// A rational within `prec` of cos(x).
pub fn frac_cos(x: &BigRational, prec: &BigRational, degrees: bool) -> Result<BigRational> {
    check_precision(prec)?;
    let x = if degrees { degrees_to_radians(x, prec)? } else { x.clone() };
    let x = reduce_angle(x, prec)?;
    let inner = prec / BigInt::from(4);
    let x2 = &x * &x;
    let (mut i, mut s, mut term) = (0u64, BigRational::one(), BigRational::one());
    loop {
        i += 2;
        term = -term * &x2 / BigInt::from(i * (i - 1));
        s += &term;
        if term.abs() < inner && BigRational::from_integer(BigInt::from(i)) > x.abs() {
            break;
        }
    }
    Ok(finalize(&s, prec))
}

/// A rational within `prec` of sin(x).
pub fn frac_sin(x: &BigRational, prec: &BigRational, degrees: bool) -> Result<BigRational> {
    check_precision(prec)?;
    let x = if degrees { degrees_to_radians(x, prec)? } else { x.clone() };
    let x = reduce_angle(x, prec)?;
    let inner = prec / BigInt::from(4);
    let x2 = &x * &x;
    let (mut i, mut s, mut term) = (1u64, x.clone(), x.clone());
    loop {
        i += 2;
        term = -term * &x2 / BigInt::from(i * (i - 1));
        s += &term;
        if term.abs() < inner && BigRational::from_integer(BigInt::from(i)) > x.abs() {
            break;
        }
    }
    Ok(finalize(&s, prec))
}

/// A rational within `prec` of e^x.
pub fn frac_exp(x: &BigRational, prec: &BigRational) -> Result<BigRational> {
    check_precision(prec)?;
    if x.is_negative() {
        // e^-x = 1/e^x; the relative error of the inverse is bounded by that of e^x when e^x >= 1
        let positive = exp_series(&-x, &(prec / BigInt::from(8)))?;
        return Ok(finalize(&positive.recip(), prec));
    }
    let s = exp_series(x, &(prec / BigInt::from(4)))?;
    Ok(finalize(&s, prec))
}

fn exp_series(x: &BigRational, inner: &BigRational) -> Result<BigRational> {
    let limit = inner / BigInt::from(2);
    let xabs = x.abs();
    let (mut i, mut s, mut term) = (0u64, BigRational::one(), BigRational::one());
    loop {
        i += 1;
        term = term * x / BigInt::from(i);
        s += &term;
        // Once i > 2|x| the tail is bounded by the last term
        if BigRational::from_integer(BigInt::from(i)) > &xabs * BigInt::from(2) && term.abs() < limit
        {
            break;
        }
    }
    Ok(s)
}

/// A rational within `prec` of √x.
pub fn frac_sqrt(x: &BigRational, prec: &BigRational) -> Result<BigRational> {
    check_precision(prec)?;
    if x.is_negative() {
        return Err(CrystalError::math(format!("sqrt of negative number {}", x)));
    }
    if x.is_zero() {
        return Ok(BigRational::zero());
    }
    let s = BigRational::new(integer_sqrt(x.numer()), integer_sqrt(x.denom()));
    if &s * &s == *x {
        return Ok(s);
    }

    let inner = prec / BigInt::from(4);
    let iterprec = (BigRational::from_integer(BigInt::from(100)) / &inner).to_integer();
    let mut s = if x > &ratio(2, 1) {
        BigRational::from_integer(integer_sqrt(&x.to_integer()))
    } else {
        (x + BigRational::one()) / BigInt::from(2)
    };
    loop {
        let last = s.clone();
        s = (&s + x / &s) / BigInt::from(2);
        if (&s - &last).abs() <= inner {
            break;
        }
        s = limit_denominator(&s, &iterprec)?;
    }
    Ok(finalize(&s, prec))
}

/// A rational within `prec` of the real cube root of x.
pub fn frac_cbrt(x: &BigRational, prec: &BigRational) -> Result<BigRational> {
    check_precision(prec)?;
    if x.is_negative() {
        return Ok(-frac_cbrt(&-x, prec)?);
    }
    if x.is_zero() {
        return Ok(BigRational::zero());
    }
    let s = BigRational::new(x.numer().cbrt(), x.denom().cbrt());
    if &s * &s * &s == *x {
        return Ok(s);
    }

    let inner = prec / BigInt::from(4);
    let iterprec = (BigRational::from_integer(BigInt::from(100)) / &inner).to_integer();
    // Newton from above converges monotonically
    let mut s = if x > &BigRational::one() {
        x.clone()
    } else {
        BigRational::one()
    };
    loop {
        let last = s.clone();
        s = (&s * BigInt::from(2) + x / (&s * &s)) / BigInt::from(3);
        if (&s - &last).abs() <= inner {
            break;
        }
        s = limit_denominator(&s, &iterprec)?;
    }
    Ok(finalize(&s, prec))
}

fn asin_series(x: &BigRational, inner: &BigRational) -> Result<BigRational> {
    let iteracc = (BigRational::from_integer(BigInt::from(1000)) / inner).to_integer();
    let one_half = ratio(1, 2);
    let x2 = x * x;
    let mut i = BigRational::zero();
    let mut s = x.clone();
    let mut gamma = BigRational::one();
    let mut fact = BigRational::one();
    let mut num = x.clone();
    loop {
        i += BigRational::one();
        fact *= &i;
        num = limit_denominator(&(num * &x2), &iteracc)?;
        gamma *= &i - &one_half;
        let coeff = &gamma / ((&i * BigInt::from(2) + BigRational::one()) * &fact);
        let term = coeff * &num;
        s = limit_denominator(&(s + &term), &iteracc)?;
        if term.abs() < *inner {
            break;
        }
    }
    Ok(s)
}

/// A rational within `prec` of asin(x), for -1 ≤ x ≤ 1.
pub fn frac_asin(x: &BigRational, prec: &BigRational, degrees: bool) -> Result<BigRational> {
    check_precision(prec)?;
    if x.abs() > BigRational::one() {
        return Err(CrystalError::math(format!("asin domain error: {}", x)));
    }
    let inner = if degrees {
        prec / BigInt::from(4096)
    } else {
        prec / BigInt::from(32)
    };
    let radians = if x.is_zero() {
        BigRational::zero()
    } else if x.abs() <= ratio(1, 2) {
        asin_series(x, &inner)?
    } else {
        // asin(x) = sign(x) (π/2 - 2 asin(sqrt((1 - |x|)/2)))
        let half_pi = frac_pi(&inner)? / BigInt::from(2);
        let y = frac_sqrt(&((BigRational::one() - x.abs()) / BigInt::from(2)), &inner)?;
        let value = half_pi - asin_series(&y, &inner)? * BigInt::from(2);
        if x.is_negative() {
            -value
        } else {
            value
        }
    };
    let value = if degrees {
        radians * BigInt::from(180) / frac_pi(&(prec / BigInt::from(1000)))?
    } else {
        radians
    };
    Ok(finalize(&value, prec))
}

/// A rational within `prec` of acos(x), for -1 ≤ x ≤ 1.
pub fn frac_acos(x: &BigRational, prec: &BigRational, degrees: bool) -> Result<BigRational> {
    check_precision(prec)?;
    if x.abs() > BigRational::one() {
        return Err(CrystalError::math(format!("acos domain error: {}", x)));
    }
    if x.is_one() {
        return Ok(BigRational::zero());
    }
    if degrees {
        if x.is_zero() {
            return Ok(BigRational::from_integer(BigInt::from(90)));
        }
        if *x == -BigRational::one() {
            return Ok(BigRational::from_integer(BigInt::from(180)));
        }
        let asin = frac_asin(x, &(prec / BigInt::from(4)), true)?;
        return Ok(finalize(&(BigRational::from_integer(BigInt::from(90)) - asin), prec));
    }
    let inner = prec / BigInt::from(4);
    let half_pi = frac_pi(&inner)? / BigInt::from(2);
    let asin = frac_asin(x, &inner, false)?;
    Ok(finalize(&(half_pi - asin), prec))
}
