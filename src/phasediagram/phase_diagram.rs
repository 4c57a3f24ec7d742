use log::{debug, info};
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::simplex::{matrix_rank, solve_equality_lp, LpOutcome};
use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

// ======================== PHASES ========================

/// A composition with an identifier, e.g. one computed structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    /// Amount of each element, summed over repeated symbols.
    pub composition: BTreeMap<String, BigRational>,
}

impl Phase {
    /// Builds a phase from parallel symbol and count lists. Repeated symbols are summed.
    pub fn new<S: AsRef<str>>(id: &str, symbols: &[S], counts: &[BigRational]) -> Result<Self> {
        if symbols.len() != counts.len() {
            return Err(CrystalError::ShapeMismatch {
                operation: "phase composition",
                left: vec![symbols.len()],
                right: vec![counts.len()],
            });
        }
        let mut composition: BTreeMap<String, BigRational> = BTreeMap::new();
        for (symbol, count) in symbols.iter().zip(counts) {
            if count.is_negative() {
                return Err(CrystalError::math(format!(
                    "negative amount {} of {} in phase '{}'",
                    count,
                    symbol.as_ref(),
                    id
                )));
            }
            *composition.entry(symbol.as_ref().to_string()).or_insert_with(BigRational::zero) += count;
        }
        Ok(Self {
            id: id.to_string(),
            composition,
        })
    }

    pub fn amount(&self, symbol: &str) -> BigRational {
        self.composition.get(symbol).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn total(&self) -> BigRational {
        self.composition.values().fold(BigRational::zero(), |acc, c| acc + c)
    }

    /// Amounts in the order of `coord_system`.
    pub fn vector(&self, coord_system: &[String]) -> Vec<BigRational> {
        coord_system.iter().map(|s| self.amount(s)).collect()
    }

    /// Amounts divided by the total, in the order of `coord_system`.
    pub fn fractions(&self, coord_system: &[String]) -> Result<Vec<BigRational>> {
        let total = self.total();
        if total.is_zero() {
            return Err(CrystalError::PhaseDiagramDegenerate(format!(
                "phase '{}' has an empty composition",
                self.id
            )));
        }
        Ok(coord_system.iter().map(|s| self.amount(s) / &total).collect())
    }
}

// ======================== HULL DATA ========================

/// Decomposition of one phase into the others at minimal energy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decomposition {
    /// Energy of the cheapest combination, `None` if the composition cannot be reached.
    pub energy: Option<BigRational>,
    /// Phases with nonzero weight, ascending.
    pub indices: Vec<usize>,
    pub weights: Vec<BigRational>,
}

/// Everything the convex hull determines about a set of phases with energies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HullData {
    pub hull_indices: Vec<usize>,
    pub interior_indices: Vec<usize>,
    /// `energy - decomposition energy`; `None` for phases no other phases combine into.
    pub hull_distances: Vec<Option<BigRational>>,
    pub competing_indices: Vec<Vec<usize>>,
    pub competing_weights: Vec<Vec<BigRational>>,
    /// Competing phases when only hull members may compete.
    pub hull_competing_indices: Vec<Vec<usize>>,
    pub phase_lines: Vec<(usize, usize)>,
}

/// Cheapest combination of the `candidates` that reproduces `target`.
fn decompose(
    target: &[BigRational],
    candidates: &[usize],
    vectors: &[Vec<BigRational>],
    energies: &[BigRational],
) -> Result<Decomposition> {
    let costs: Vec<BigRational> = candidates.iter().map(|&j| energies[j].clone()).collect();
    let constraints: Vec<Vec<BigRational>> = (0..target.len())
        .map(|k| candidates.iter().map(|&j| vectors[j][k].clone()).collect())
        .collect();
    match solve_equality_lp(&costs, &constraints, target)? {
        LpOutcome::Optimal { value, solution } => {
            let (indices, weights) = candidates
                .iter()
                .zip(solution)
                .filter(|(_, w)| !w.is_zero())
                .map(|(&j, w)| (j, w))
                .unzip();
            Ok(Decomposition {
                energy: Some(value),
                indices,
                weights,
            })
        }
        LpOutcome::Infeasible => Ok(Decomposition {
            energy: None,
            indices: Vec::new(),
            weights: Vec::new(),
        }),
        LpOutcome::Unbounded => Err(CrystalError::internal(
            "phase decomposition is unbounded for nonnegative compositions",
        )),
    }
}

/// Runs `f` for every index, in parallel with the `parallel` feature. Results keep index order.
fn map_indices<T: Send>(n: usize, f: impl Fn(usize) -> Result<T> + Sync + Send) -> Result<Vec<T>> {
    #[cfg(feature = "parallel")]
    {
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..n).map(f).collect()
    }
}

/// Convex hull over `energies` of the compositions `vectors`.
pub fn hull_data(vectors: &[Vec<BigRational>], energies: &[BigRational]) -> Result<HullData> {
    let n = vectors.len();
    if energies.len() != n {
        return Err(CrystalError::ShapeMismatch {
            operation: "phase diagram",
            left: vec![n],
            right: vec![energies.len()],
        });
    }
    let all: Vec<usize> = (0..n).collect();
    let decompositions = map_indices(n, |i| {
        let others: Vec<usize> = all.iter().copied().filter(|&j| j != i).collect();
        decompose(&vectors[i], &others, vectors, energies)
    })?;

    let mut hull_indices = Vec::new();
    let mut interior_indices = Vec::new();
    let mut hull_distances = Vec::with_capacity(n);
    for (i, d) in decompositions.iter().enumerate() {
        let distance = d.energy.as_ref().map(|e| &energies[i] - e);
        match &distance {
            Some(dist) if dist.is_positive() => interior_indices.push(i),
            _ => hull_indices.push(i),
        }
        hull_distances.push(distance);
    }

    let hull_decompositions = map_indices(n, |i| {
        let others: Vec<usize> = hull_indices.iter().copied().filter(|&j| j != i).collect();
        decompose(&vectors[i], &others, vectors, energies)
    })?;
    let hull_competing_indices: Vec<Vec<usize>> = hull_decompositions.into_iter().map(|d| d.indices).collect();

    let mut lines = BTreeSet::new();
    for &h in &hull_indices {
        for &j in &hull_competing_indices[h] {
            lines.insert((h.min(j), h.max(j)));
        }
    }

    let (competing_indices, competing_weights) =
        decompositions.into_iter().map(|d| (d.indices, d.weights)).unzip();
    Ok(HullData {
        hull_indices,
        interior_indices,
        hull_distances,
        competing_indices,
        competing_weights,
        hull_competing_indices,
        phase_lines: lines.into_iter().collect(),
    })
}

// ======================== PHASE DIAGRAM ========================

/// Phases with energies and phases without, over a common element coordinate system.
///
/// Phases without an energy take no part in the hull and are only placed in composition space.
/// Hull data is computed on first use and discarded when a phase is added.
#[derive(Debug, Clone, Default)]
pub struct PhaseDiagram {
    phases: Vec<Phase>,
    energies: Vec<BigRational>,
    other_phases: Vec<Phase>,
    hull: OnceLock<HullData>,
}

impl PhaseDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_phase(&mut self, phase: Phase, energy: Option<BigRational>) {
        match energy {
            Some(energy) => {
                self.phases.push(phase);
                self.energies.push(energy);
            }
            None => self.other_phases.push(phase),
        }
        self.hull = OnceLock::new();
    }

    /// [`PhaseDiagram::add_phase`] from parallel symbol and count lists.
    pub fn add_phase_counts<S: AsRef<str>>(
        &mut self,
        symbols: &[S],
        counts: &[BigRational],
        id: &str,
        energy: Option<BigRational>,
    ) -> Result<()> {
        self.add_phase(Phase::new(id, symbols, counts)?, energy);
        Ok(())
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn energies(&self) -> &[BigRational] {
        &self.energies
    }

    pub fn other_phases(&self) -> &[Phase] {
        &self.other_phases
    }

    /// Sorted union of the element symbols of all phases.
    pub fn coord_system(&self) -> Vec<String> {
        let symbols: BTreeSet<&String> = self
            .phases
            .iter()
            .chain(&self.other_phases)
            .flat_map(|p| p.composition.keys())
            .collect();
        symbols.into_iter().cloned().collect()
    }

    /// Elements present in the phases with energies.
    fn hull_coord_system(&self) -> Vec<String> {
        let symbols: BTreeSet<&String> = self.phases.iter().flat_map(|p| p.composition.keys()).collect();
        symbols.into_iter().cloned().collect()
    }

    fn check_nondegenerate(&self, coord_system: &[String], vectors: &[Vec<BigRational>]) -> Result<()> {
        if let Some(empty) = self.phases.iter().find(|p| p.total().is_zero()) {
            return Err(CrystalError::PhaseDiagramDegenerate(format!(
                "phase '{}' has an empty composition",
                empty.id
            )));
        }
        let rank = matrix_rank(vectors);
        if rank < coord_system.len() {
            return Err(CrystalError::PhaseDiagramDegenerate(format!(
                "compositions span {} of {} element dimensions",
                rank,
                coord_system.len()
            )));
        }
        Ok(())
    }

    /// Hull data, computed on first use.
    pub fn hull(&self) -> Result<&HullData> {
        if let Some(hull) = self.hull.get() {
            return Ok(hull);
        }
        let coord_system = self.hull_coord_system();
        let vectors: Vec<Vec<BigRational>> = self.phases.iter().map(|p| p.vector(&coord_system)).collect();
        self.check_nondegenerate(&coord_system, &vectors)?;
        info!(
            "Computing convex hull of {} phases over {} elements",
            self.phases.len(),
            coord_system.len()
        );
        let hull = hull_data(&vectors, &self.energies)?;
        debug!(
            "{} hull phases, {} interior phases",
            hull.hull_indices.len(),
            hull.interior_indices.len()
        );
        Ok(self.hull.get_or_init(|| hull))
    }

    pub fn hull_indices(&self) -> Result<&[usize]> {
        Ok(&self.hull()?.hull_indices)
    }

    pub fn interior_indices(&self) -> Result<&[usize]> {
        Ok(&self.hull()?.interior_indices)
    }

    pub fn hull_distances(&self) -> Result<&[Option<BigRational>]> {
        Ok(&self.hull()?.hull_distances)
    }

    pub fn competing_indices(&self) -> Result<&[Vec<usize>]> {
        Ok(&self.hull()?.competing_indices)
    }

    pub fn competing_weights(&self) -> Result<&[Vec<BigRational>]> {
        Ok(&self.hull()?.competing_weights)
    }

    pub fn hull_competing_indices(&self) -> Result<&[Vec<usize>]> {
        Ok(&self.hull()?.hull_competing_indices)
    }

    /// Pairs of hull phases that coexist, as sorted index pairs.
    pub fn phase_lines(&self) -> Result<&[(usize, usize)]> {
        Ok(&self.hull()?.phase_lines)
    }

    /// Same as [`PhaseDiagram::phase_lines`].
    pub fn hull_competing_phase_lines(&self) -> Result<&[(usize, usize)]> {
        self.phase_lines()
    }

    /// Pairs of a hull phase and an interior phase that competes with it.
    pub fn hull_to_interior_competing_phase_lines(&self) -> Result<Vec<(usize, usize)>> {
        let hull = self.hull()?;
        let interior: BTreeSet<usize> = hull.interior_indices.iter().copied().collect();
        let mut lines = BTreeSet::new();
        for &h in &hull.hull_indices {
            for &j in hull.competing_indices[h].iter().filter(|&&j| interior.contains(&j)) {
                lines.insert((h, j));
            }
        }
        Ok(lines.into_iter().collect())
    }

    /// Pairs of an interior phase and each phase it decomposes into.
    pub fn interior_competing_phase_lines(&self) -> Result<Vec<(usize, usize)>> {
        let hull = self.hull()?;
        let mut lines = BTreeSet::new();
        for &i in &hull.interior_indices {
            for &j in &hull.competing_indices[i] {
                lines.insert((i, j));
            }
        }
        Ok(lines.into_iter().collect())
    }

    fn point_coords<'a>(
        &self,
        phases: impl Iterator<Item = &'a Phase>,
    ) -> Result<(Vec<Vec<BigRational>>, Vec<String>)> {
        let coord_system = self.coord_system();
        let mut coords = Vec::new();
        let mut ids = Vec::new();
        for phase in phases {
            coords.push(phase.fractions(&coord_system)?);
            ids.push(phase.id.clone());
        }
        Ok((coords, ids))
    }

    /// Normalized compositions and ids of the hull phases.
    pub fn hull_point_coords(&self) -> Result<(Vec<Vec<BigRational>>, Vec<String>)> {
        let hull = self.hull()?;
        self.point_coords(hull.hull_indices.iter().map(|&i| &self.phases[i]))
    }

    pub fn interior_point_coords(&self) -> Result<(Vec<Vec<BigRational>>, Vec<String>)> {
        let hull = self.hull()?;
        self.point_coords(hull.interior_indices.iter().map(|&i| &self.phases[i]))
    }

    /// Normalized compositions of the phases without energy.
    pub fn other_point_coords(&self) -> Result<(Vec<Vec<BigRational>>, Vec<String>)> {
        self.point_coords(self.other_phases.iter())
    }

    /// Normalized compositions of all phases with energies.
    pub fn coords(&self) -> Result<(Vec<Vec<BigRational>>, Vec<String>)> {
        self.point_coords(self.phases.iter())
    }
}
