use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::BTreeMap;

use crate::error::CrystalError;
use crate::fracvector::FracVector;
use crate::symmetries::GENERIC_WYCKOFF;

type Result<T> = std::result::Result<T, CrystalError>;

type SpeciesTotals<K> = (Vec<K>, Vec<BigRational>, Vec<BigInt>);

/// Per-species `Σ ratio · count` and `Σ count`, in order of first appearance.
fn accumulate_species<K: PartialEq + Clone>(
    assignments: &[K],
    ratios: &[BigRational],
    counts: &[usize],
) -> Result<SpeciesTotals<K>> {
    if assignments.len() != counts.len() || ratios.len() != counts.len() {
        return Err(CrystalError::ShapeMismatch {
            operation: "formula parts",
            left: vec![assignments.len(), ratios.len()],
            right: vec![counts.len()],
        });
    }

    let mut keys: Vec<K> = Vec::new();
    let mut totals: Vec<BigRational> = Vec::new();
    let mut occupied: Vec<BigInt> = Vec::new();
    for ((key, ratio), &count) in assignments.iter().zip(ratios).zip(counts) {
        let i = match keys.iter().position(|k| k == key) {
            Some(i) => i,
            None => {
                keys.push(key.clone());
                totals.push(BigRational::zero());
                occupied.push(BigInt::zero());
                keys.len() - 1
            }
        };
        totals[i] += ratio * BigRational::from_integer(BigInt::from(count));
        occupied[i] += BigInt::from(count);
    }
    Ok((keys, totals, occupied))
}

/// Per-species totals reduced by the common factor of the site counts.
///
/// `assignments[i]`, `ratios[i]` and `counts[i]` describe one occupied site: a species key,
/// its occupancy ratio and the number of atoms at the site. A species accumulates
/// `ratio · count` over its sites; the totals are divided by the gcd of the per-species site
/// counts. The result keeps the order in which the species first appear.
pub fn normalized_formula_parts<K: PartialEq + Clone>(
    assignments: &[K],
    ratios: &[BigRational],
    counts: &[usize],
) -> Result<Vec<(K, BigRational)>> {
    let (keys, totals, occupied) = accumulate_species(assignments, ratios, counts)?;
    let divisor = occupied.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
    let divisor = if divisor.is_zero() {
        BigRational::one()
    } else {
        BigRational::from_integer(divisor)
    };
    Ok(keys
        .into_iter()
        .zip(totals)
        .map(|(k, total)| (k, total / &divisor))
        .collect())
}

/// [`normalized_formula_parts`] over element symbols, sorted alphabetically.
pub fn sorted_formula_parts(
    symbols: &[String],
    ratios: &[BigRational],
    counts: &[usize],
) -> Result<Vec<(String, BigRational)>> {
    let mut parts = normalized_formula_parts(symbols, ratios, counts)?;
    parts.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(parts)
}

/// Unreduced per-element totals `Σ ratio · count`, sorted alphabetically.
pub fn sorted_formula_totals(
    symbols: &[String],
    ratios: &[BigRational],
    counts: &[usize],
) -> Result<Vec<(String, BigRational)>> {
    let (keys, totals, _) = accumulate_species(symbols, ratios, counts)?;
    let mut parts: Vec<(String, BigRational)> = keys.into_iter().zip(totals).collect();
    parts.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(parts)
}

/// A formula count rounded to hundredths: empty for 1, an integer when integral and
/// `d.dd` otherwise.
pub fn format_formula_count(count: &BigRational) -> Result<String> {
    let rounded = FracVector::from_rational(count)
        .set_denominator(&BigInt::from(100))?
        .to_rational()?;
    if rounded.is_integer() {
        if rounded.is_one() {
            return Ok(String::new());
        }
        return Ok(rounded.to_integer().to_string());
    }
    let whole = rounded.floor();
    let hundredths = ((&rounded - &whole) * BigRational::from_integer(BigInt::from(100))).floor();
    Ok(format!("{}.{:0>2}", whole.to_integer(), hundredths.to_integer()))
}

/// Concatenates `symbol count` pairs in the given order.
pub fn formula_from_parts<S: AsRef<str>>(parts: &[(S, BigRational)]) -> Result<String> {
    let mut formula = String::new();
    for (symbol, count) in parts {
        formula.push_str(symbol.as_ref());
        formula.push_str(&format_formula_count(count)?);
    }
    Ok(formula)
}

pub fn formula_spaceseparated<S: AsRef<str>>(parts: &[(S, BigRational)]) -> Result<String> {
    let words = parts
        .iter()
        .map(|(symbol, count)| Ok(format!("{}{}", symbol.as_ref(), format_formula_count(count)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(words.join(" "))
}

/// Alphabetical reduced chemical formula, e.g. `Al2O3`.
pub fn formula(symbols: &[String], ratios: &[BigRational], counts: &[usize]) -> Result<String> {
    formula_from_parts(&sorted_formula_parts(symbols, ratios, counts)?)
}

/// Placeholder symbol number `n` (1-based): `A` ... `Z`, then `Aa`, `Ab`, ...
pub fn abstract_symbol(n: usize) -> String {
    if n < 27 {
        return char::from(b'@' + n as u8).to_string();
    }
    let last = char::from(b'a' + ((n - 1) % 26) as u8);
    format!("{}{}", abstract_symbol((n - 1) / 26), last)
}

/// Formula with anonymous species `A`, `B`, ... in order of ascending count.
///
/// Ties keep the order of the groups.
pub fn anonymous_formula(counts: &[usize]) -> Result<String> {
    let keys: Vec<usize> = (0..counts.len()).collect();
    let ones = vec![BigRational::one(); counts.len()];
    let mut parts = normalized_formula_parts(&keys, &ones, counts)?;
    parts.sort_by(|a, b| a.1.cmp(&b.1));
    let mut formula = String::new();
    for (i, (_, count)) in parts.iter().enumerate() {
        formula.push_str(&abstract_symbol(i + 1));
        formula.push_str(&format_formula_count(count)?);
    }
    Ok(formula)
}

// ======================== WYCKOFF SEQUENCES ========================

/// Orders Wyckoff letters alphabetically with the generic position last.
fn wyckoff_order(symbol: char) -> (bool, char) {
    (symbol == GENERIC_WYCKOFF, symbol)
}

fn check_wyckoff_length(wyckoff_symbols: &[char], counts: &[usize]) -> Result<()> {
    let total: usize = counts.iter().sum();
    if wyckoff_symbols.len() != total {
        return Err(CrystalError::structure(format!(
            "{} Wyckoff symbols given for {} representative sites",
            wyckoff_symbols.len(),
            total
        )));
    }
    Ok(())
}

/// Wyckoff group index of every representative site.
fn wyckoff_with_groups<'a>(
    wyckoff_symbols: &'a [char],
    counts: &'a [usize],
) -> impl Iterator<Item = (char, usize)> + 'a {
    counts
        .iter()
        .enumerate()
        .flat_map(|(group, &count)| std::iter::repeat(group).take(count))
        .zip(wyckoff_symbols)
        .map(|(group, &symbol)| (symbol, group))
}

/// Multiset of Wyckoff letters, e.g. `a2c&4`.
pub fn wyckoff_sequence(wyckoff_symbols: &[char]) -> String {
    let mut seen: BTreeMap<(bool, char), usize> = BTreeMap::new();
    for &symbol in wyckoff_symbols {
        *seen.entry(wyckoff_order(symbol)).or_insert(0) += 1;
    }
    seen.into_iter()
        .map(|((_, symbol), n)| if n > 1 { format!("{}{}", symbol, n) } else { symbol.to_string() })
        .collect()
}

/// Wyckoff multiset with the species anonymized, e.g. `1aA1bB`.
///
/// Entries are `count letter species`, sorted by letter, then count, then group; species
/// letters are handed out in that order.
pub fn anonymous_wyckoff_sequence(wyckoff_symbols: &[char], counts: &[usize]) -> Result<String> {
    check_wyckoff_length(wyckoff_symbols, counts)?;
    let mut data: BTreeMap<((bool, char), usize), usize> = BTreeMap::new();
    for (symbol, group) in wyckoff_with_groups(wyckoff_symbols, counts) {
        *data.entry((wyckoff_order(symbol), group)).or_insert(0) += 1;
    }
    let mut entries: Vec<((bool, char), usize, usize)> =
        data.into_iter().map(|((order, group), n)| (order, n, group)).collect();
    entries.sort();

    let mut species: Vec<usize> = Vec::new();
    let mut sequence = String::new();
    for ((_, symbol), n, group) in entries {
        let index = match species.iter().position(|g| *g == group) {
            Some(i) => i,
            None => {
                species.push(group);
                species.len() - 1
            }
        };
        sequence.push_str(&format!("{}{}{}", n, symbol, abstract_symbol(index + 1)));
    }
    Ok(sequence)
}

/// Wyckoff multiset keyed by species label, e.g. `1aCl1bNa`.
///
/// `labels` has one entry per group. Groups with the same label and Wyckoff letter are merged.
pub fn element_wyckoff_sequence(wyckoff_symbols: &[char], counts: &[usize], labels: &[String]) -> Result<String> {
    check_wyckoff_length(wyckoff_symbols, counts)?;
    if labels.len() != counts.len() {
        return Err(CrystalError::structure(format!(
            "{} species labels given for {} site groups",
            labels.len(),
            counts.len()
        )));
    }
    let mut data: BTreeMap<((bool, char), &str), usize> = BTreeMap::new();
    for (symbol, group) in wyckoff_with_groups(wyckoff_symbols, counts) {
        *data.entry((wyckoff_order(symbol), labels[group].as_str())).or_insert(0) += 1;
    }
    let mut entries: Vec<((bool, char), usize, &str)> =
        data.into_iter().map(|((order, label), n)| (order, n, label)).collect();
    entries.sort();
    Ok(entries
        .into_iter()
        .map(|((_, symbol), n, label)| format!("{}{}{}", n, symbol, label))
        .collect())
}
