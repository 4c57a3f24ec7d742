use log::debug;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use crate::error::CrystalError;

type Result<T> = std::result::Result<T, CrystalError>;

/// Result of a linear program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LpOutcome {
    Optimal {
        value: BigRational,
        solution: Vec<BigRational>,
    },
    Infeasible,
    Unbounded,
}

/// Dense simplex tableau `rows · x = rhs` with one basic variable per row.
struct Tableau {
    rows: Vec<Vec<BigRational>>,
    rhs: Vec<BigRational>,
    basis: Vec<usize>,
    pivots: usize,
}

impl Tableau {
    fn reduced_cost(&self, cost: &[BigRational], j: usize) -> BigRational {
        let mut reduced = cost[j].clone();
        for (row, &b) in self.rows.iter().zip(&self.basis) {
            if !row[j].is_zero() && !cost[b].is_zero() {
                reduced -= &cost[b] * &row[j];
            }
        }
        reduced
    }

    fn objective(&self, cost: &[BigRational]) -> BigRational {
        self.rhs
            .iter()
            .zip(&self.basis)
            .fold(BigRational::zero(), |acc, (r, &b)| acc + &cost[b] * r)
    }

    fn pivot(&mut self, r: usize, j: usize) {
        let p = self.rows[r][j].clone();
        for v in self.rows[r].iter_mut() {
            *v /= &p;
        }
        self.rhs[r] /= &p;
        let pivot_row = self.rows[r].clone();
        let pivot_rhs = self.rhs[r].clone();
        for k in 0..self.rows.len() {
            if k == r || self.rows[k][j].is_zero() {
                continue;
            }
            let f = self.rows[k][j].clone();
            for (v, pv) in self.rows[k].iter_mut().zip(&pivot_row) {
                if !pv.is_zero() {
                    *v -= &f * pv;
                }
            }
            self.rhs[k] -= &f * &pivot_rhs;
        }
        self.basis[r] = j;
        self.pivots += 1;
    }

    /// Bland's rule: the smallest column with negative reduced cost enters, the row with the
    /// smallest ratio leaves, ties going to the smallest basic index. Only columns below
    /// `allowed` may enter. Returns false if the objective is unbounded.
    fn minimize(&mut self, cost: &[BigRational], allowed: usize) -> bool {
        loop {
            let entering = (0..allowed)
                .filter(|j| !self.basis.contains(j))
                .find(|&j| self.reduced_cost(cost, j).is_negative());
            let Some(j) = entering else {
                return true;
            };

            let mut leaving: Option<(usize, BigRational)> = None;
            for r in 0..self.rows.len() {
                if !self.rows[r][j].is_positive() {
                    continue;
                }
                let ratio = &self.rhs[r] / &self.rows[r][j];
                let better = match &leaving {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < *best_ratio || (ratio == *best_ratio && self.basis[r] < self.basis[*best])
                    }
                };
                if better {
                    leaving = Some((r, ratio));
                }
            }
            match leaving {
                Some((r, _)) => self.pivot(r, j),
                None => return false,
            }
        }
    }
}

/// Minimizes `costs · x` subject to `constraints · x = rhs`, `x ≥ 0`, exactly.
///
/// `constraints` holds one row per equation with `costs.len()` entries. Two-phase tableau
/// simplex: artificial variables find a feasible basis first, then the real objective is
/// minimized from it. Bland's rule makes both phases terminate.
pub fn solve_equality_lp(
    costs: &[BigRational],
    constraints: &[Vec<BigRational>],
    rhs: &[BigRational],
) -> Result<LpOutcome> {
    let n = costs.len();
    let m = constraints.len();
    if rhs.len() != m || constraints.iter().any(|row| row.len() != n) {
        return Err(CrystalError::ShapeMismatch {
            operation: "linear program",
            left: vec![m, constraints.first().map_or(n, Vec::len)],
            right: vec![rhs.len(), n],
        });
    }

    // Phase 1: rhs made nonnegative, one artificial variable per row
    let mut tableau = Tableau {
        rows: Vec::with_capacity(m),
        rhs: Vec::with_capacity(m),
        basis: (n..n + m).collect(),
        pivots: 0,
    };
    for (r, (row, b)) in constraints.iter().zip(rhs).enumerate() {
        let flip = b.is_negative();
        let mut full: Vec<BigRational> = row.iter().map(|v| if flip { -v } else { v.clone() }).collect();
        full.extend((0..m).map(|k| if k == r { BigRational::one() } else { BigRational::zero() }));
        tableau.rows.push(full);
        tableau.rhs.push(if flip { -b } else { b.clone() });
    }

    let mut phase1_cost = vec![BigRational::zero(); n];
    phase1_cost.extend((0..m).map(|_| BigRational::one()));
    if !tableau.minimize(&phase1_cost, n + m) {
        return Err(CrystalError::internal("phase 1 of the simplex is unbounded"));
    }
    if tableau.objective(&phase1_cost).is_positive() {
        debug!("Linear program infeasible after {} pivots", tableau.pivots);
        return Ok(LpOutcome::Infeasible);
    }

    // Artificials left in the basis sit at zero; pivot them out or drop redundant rows
    let mut r = 0;
    while r < tableau.rows.len() {
        if tableau.basis[r] < n {
            r += 1;
            continue;
        }
        match (0..n).find(|&j| !tableau.rows[r][j].is_zero()) {
            Some(j) => {
                tableau.pivot(r, j);
                r += 1;
            }
            None => {
                tableau.rows.remove(r);
                tableau.rhs.remove(r);
                tableau.basis.remove(r);
            }
        }
    }

    // Phase 2
    let mut phase2_cost = costs.to_vec();
    phase2_cost.extend((0..m).map(|_| BigRational::zero()));
    if !tableau.minimize(&phase2_cost, n) {
        debug!("Linear program unbounded after {} pivots", tableau.pivots);
        return Ok(LpOutcome::Unbounded);
    }

    let mut solution = vec![BigRational::zero(); n];
    for (value, &b) in tableau.rhs.iter().zip(&tableau.basis) {
        if b < n {
            solution[b] = value.clone();
        }
    }
    let value = tableau.objective(&phase2_cost);
    debug!("Linear program solved in {} pivots, optimum {}", tableau.pivots, value);
    Ok(LpOutcome::Optimal { value, solution })
}

/// Rank of a rational matrix given as rows, by exact Gaussian elimination.
pub fn matrix_rank(rows: &[Vec<BigRational>]) -> usize {
    let mut m: Vec<Vec<BigRational>> = rows.to_vec();
    let ncols = m.first().map_or(0, Vec::len);
    let mut rank = 0;
    for col in 0..ncols {
        let Some(p) = (rank..m.len()).find(|&r| !m[r][col].is_zero()) else {
            continue;
        };
        m.swap(rank, p);
        let pivot_row = m[rank].clone();
        for r in rank + 1..m.len() {
            if m[r][col].is_zero() {
                continue;
            }
            let f = &m[r][col] / &pivot_row[col];
            for (v, pv) in m[r].iter_mut().zip(&pivot_row) {
                *v -= &f * pv;
            }
        }
        rank += 1;
    }
    rank
}
