use num_rational::BigRational;

use super::phase_diagram::{Phase, PhaseDiagram};
use crate::error::CrystalError;
use crate::structure::Structure;

type Result<T> = std::result::Result<T, CrystalError>;

/// A phase diagram whose phases are structures, composed by their unit-cell atom totals.
#[derive(Debug, Clone)]
pub struct StructurePhaseDiagram {
    structures: Vec<Structure>,
    /// Structure index of every phase with an energy, in phase order.
    phase_structures: Vec<usize>,
    diagram: PhaseDiagram,
}

impl StructurePhaseDiagram {
    /// One phase per structure, identified by its formula. Structures without an energy are
    /// placed in composition space only.
    pub fn create(structures: Vec<Structure>, energies: Vec<Option<BigRational>>) -> Result<Self> {
        if structures.len() != energies.len() {
            return Err(CrystalError::ShapeMismatch {
                operation: "structure phase diagram",
                left: vec![structures.len()],
                right: vec![energies.len()],
            });
        }
        let mut diagram = PhaseDiagram::new();
        let mut phase_structures = Vec::new();
        for (i, (structure, energy)) in structures.iter().zip(energies).enumerate() {
            let parts = structure.uc_formula_parts()?;
            let (symbols, counts): (Vec<String>, Vec<BigRational>) = parts.into_iter().unzip();
            let phase = Phase::new(&structure.formula()?, &symbols, &counts)?;
            if energy.is_some() {
                phase_structures.push(i);
            }
            diagram.add_phase(phase, energy);
        }
        Ok(Self {
            structures,
            phase_structures,
            diagram,
        })
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn phase_diagram(&self) -> &PhaseDiagram {
        &self.diagram
    }

    /// Structure index of a phase index of [`StructurePhaseDiagram::phase_diagram`].
    pub fn structure_index(&self, phase: usize) -> Option<usize> {
        self.phase_structures.get(phase).copied()
    }

    /// Structures on the convex hull.
    pub fn hull_structures(&self) -> Result<Vec<&Structure>> {
        let hull = self.diagram.hull_indices()?;
        hull.iter()
            .map(|&p| {
                self.structure_index(p)
                    .and_then(|s| self.structures.get(s))
                    .ok_or_else(|| CrystalError::internal("hull phase without a structure"))
            })
            .collect()
    }

    /// Hull distance of every structure; `None` for structures without an energy or without
    /// competing phases.
    pub fn hull_distances(&self) -> Result<Vec<Option<BigRational>>> {
        let distances = self.diagram.hull_distances()?;
        let mut per_structure = vec![None; self.structures.len()];
        for (p, &s) in self.phase_structures.iter().enumerate() {
            per_structure[s] = distances[p].clone();
        }
        Ok(per_structure)
    }
}
