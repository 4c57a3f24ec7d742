use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::periodic_table::{atomic_number, atomic_symbol};
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Ways in which an assignment goes beyond one fully occupying element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Extension {
    Disordered,
    Isotope,
    MagneticMoments,
}

impl Extension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Disordered => "disordered",
            Extension::Isotope => "isotope",
            Extension::MagneticMoments => "magnetic_moments",
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One species on a site: element, occupancy ratio and optional isotope weight and
/// magnetic moment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    atomic_number: u8,
    weight: Option<BigRational>,
    ratio: BigRational,
    magnetic_moment: Option<[BigRational; 3]>,
}

impl Assignment {
    /// A fully occupying atom of element `atomic_number`.
    pub fn new(atomic_number: u8) -> Result<Self> {
        atomic_symbol(atomic_number)?;
        Ok(Self {
            atomic_number,
            weight: None,
            ratio: BigRational::one(),
            magnetic_moment: None,
        })
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Self::new(atomic_number(symbol)?)
    }

    /// Occupancy ratio in (0, 1].
    pub fn with_ratio(mut self, ratio: BigRational) -> Result<Self> {
        if !ratio.is_positive() || ratio > BigRational::one() {
            return Err(CrystalError::structure(format!(
                "occupancy ratio {} outside (0, 1]",
                ratio
            )));
        }
        self.ratio = ratio;
        Ok(self)
    }

    pub fn with_weight(mut self, weight: BigRational) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_magnetic_moment(mut self, moment: [BigRational; 3]) -> Self {
        self.magnetic_moment = Some(moment);
        self
    }

    pub fn atomic_number(&self) -> u8 {
        self.atomic_number
    }

    pub fn symbol(&self) -> &'static str {
        // Validated on construction
        atomic_symbol(self.atomic_number).unwrap_or("X")
    }

    pub fn ratio(&self) -> &BigRational {
        &self.ratio
    }

    pub fn weight(&self) -> Option<&BigRational> {
        self.weight.as_ref()
    }

    pub fn magnetic_moment(&self) -> Option<&[BigRational; 3]> {
        self.magnetic_moment.as_ref()
    }

    pub fn extensions(&self) -> Vec<Extension> {
        let mut extensions = Vec::new();
        if !self.ratio.is_one() {
            extensions.push(Extension::Disordered);
        }
        if self.weight.is_some() {
            extensions.push(Extension::Isotope);
        }
        if self.magnetic_moment.is_some() {
            extensions.push(Extension::MagneticMoments);
        }
        extensions
    }

    /// Symbol followed by the ratio truncated to hundredths, e.g. `Fe0.33`. Plain symbol for ratio 1.
    fn symbol_with_ratio(&self) -> String {
        if self.ratio.is_one() {
            return self.symbol().to_string();
        }
        let whole = self.ratio.floor();
        let hundredths = ((&self.ratio - &whole) * BigRational::from_integer(BigInt::from(100))).floor();
        format!("{}{}.{:0>2}", self.symbol(), whole.to_integer(), hundredths.to_integer())
    }
}

/// The species sharing one site. The ratios sum to at most one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteAssignment {
    assignments: Vec<Assignment>,
}

impl SiteAssignment {
    pub fn new(assignments: Vec<Assignment>) -> Result<Self> {
        if assignments.is_empty() {
            return Err(CrystalError::structure("a site assignment needs at least one species"));
        }
        let total = assignments
            .iter()
            .fold(BigRational::zero(), |acc, a| acc + a.ratio());
        if total > BigRational::one() {
            return Err(CrystalError::structure(format!(
                "occupancy ratios of one site sum to {}, more than 1",
                total
            )));
        }
        Ok(Self { assignments })
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        Self::new(vec![Assignment::from_symbol(symbol)?])
    }

    pub fn from_atomic_number(atomic_number: u8) -> Result<Self> {
        Self::new(vec![Assignment::new(atomic_number)?])
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn atomic_numbers(&self) -> Vec<u8> {
        self.assignments.iter().map(|a| a.atomic_number()).collect()
    }

    pub fn symbols(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|a| a.symbol()).collect()
    }

    pub fn ratios(&self) -> Vec<BigRational> {
        self.assignments.iter().map(|a| a.ratio().clone()).collect()
    }

    /// The element symbol of a single-species site, `[Fe0.50,Ni0.50]` otherwise.
    pub fn symbol(&self) -> String {
        match self.assignments.as_slice() {
            [single] => single.symbol().to_string(),
            many => {
                let parts: Vec<String> = many
                    .iter()
                    .map(|a| format!("{}{:.2}", a.symbol(), rational_to_f64(a.ratio())))
                    .collect();
                format!("[{}]", parts.join(","))
            }
        }
    }

    /// Occupancy ratio of a single-species site.
    pub fn ratio(&self) -> Option<&BigRational> {
        match self.assignments.as_slice() {
            [single] => Some(single.ratio()),
            _ => None,
        }
    }

    pub fn extensions(&self) -> Vec<Extension> {
        let set: BTreeSet<Extension> = self.assignments.iter().flat_map(|a| a.extensions()).collect();
        set.into_iter().collect()
    }

    /// Label of this site in element Wyckoff sequences: the plain symbol for a single fully
    /// occupying element, otherwise the species with truncated ratios in parentheses.
    pub fn wyckoff_label(&self) -> String {
        match self.assignments.as_slice() {
            [single] if single.ratio().is_one() => single.symbol().to_string(),
            many => {
                let inner: String = many.iter().map(|a| a.symbol_with_ratio()).collect();
                format!("({})", inner)
            }
        }
    }
}

fn rational_to_f64(x: &BigRational) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// One [`SiteAssignment`] per coordinate group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Assignments {
    sites: Vec<SiteAssignment>,
}

impl Assignments {
    pub fn new(sites: Vec<SiteAssignment>) -> Self {
        Self { sites }
    }

    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self> {
        let sites = symbols
            .iter()
            .map(|s| SiteAssignment::from_symbol(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sites))
    }

    pub fn from_atomic_numbers(numbers: &[u8]) -> Result<Self> {
        let sites = numbers
            .iter()
            .map(|&z| SiteAssignment::from_atomic_number(z))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sites))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&SiteAssignment> {
        self.sites.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteAssignment> {
        self.sites.iter()
    }

    pub fn site_assignments(&self) -> &[SiteAssignment] {
        &self.sites
    }

    /// One symbol per site, see [`SiteAssignment::symbol`].
    pub fn symbols(&self) -> Vec<String> {
        self.sites.iter().map(|s| s.symbol()).collect()
    }

    pub fn symbollists(&self) -> Vec<Vec<&'static str>> {
        self.sites.iter().map(|s| s.symbols()).collect()
    }

    pub fn ratioslist(&self) -> Vec<Vec<BigRational>> {
        self.sites.iter().map(|s| s.ratios()).collect()
    }

    pub fn wyckoff_labels(&self) -> Vec<String> {
        self.sites.iter().map(|s| s.wyckoff_label()).collect()
    }

    /// Union of the extensions of all sites, sorted.
    pub fn extensions(&self) -> Vec<Extension> {
        let set: BTreeSet<Extension> = self.sites.iter().flat_map(|s| s.extensions()).collect();
        set.into_iter().collect()
    }

    /// True if any site is partially occupied or carries isotope or magnetic data.
    pub fn extended(&self) -> bool {
        !self.extensions().is_empty()
    }

    /// One `(symbol, ratio, count)` entry per species of every site, with `counts[i]` the
    /// number of atoms in group `i`.
    pub fn species_counts(&self, counts: &[usize]) -> Result<(Vec<String>, Vec<BigRational>, Vec<usize>)> {
        if counts.len() != self.sites.len() {
            return Err(CrystalError::structure(format!(
                "{} site assignments for {} coordinate groups",
                self.sites.len(),
                counts.len()
            )));
        }
        let mut symbols = Vec::new();
        let mut ratios = Vec::new();
        let mut species_counts = Vec::new();
        for (site, &count) in self.sites.iter().zip(counts) {
            for a in site.assignments() {
                symbols.push(a.symbol().to_string());
                ratios.push(a.ratio().clone());
                species_counts.push(count);
            }
        }
        Ok((symbols, ratios, species_counts))
    }

    /// Distinct element symbols, sorted.
    pub fn elements(&self) -> Vec<&'static str> {
        let set: BTreeSet<&'static str> = self.sites.iter().flat_map(|s| s.symbols()).collect();
        set.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a Assignments {
    type Item = &'a SiteAssignment;
    type IntoIter = std::slice::Iter<'a, SiteAssignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}
