use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::fracvector::FracVector;
use crate::symmetries::{trivial_symmetry_reduce, SymmetryReduction};

/// Error type returned by collaborators. The facade wraps it into
/// [`crate::error::CrystalError::Collaborator`] together with the view that needed it.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

// ======================== SYMMETRY FINDER ========================

/// Reduces the atoms of a unit cell to representatives under their spacegroup.
pub trait SymmetryFinder: fmt::Debug + Send + Sync {
    fn reduce(
        &self,
        basis: &FracVector,
        coordgroups: &[FracVector],
    ) -> std::result::Result<SymmetryReduction, CollaboratorError>;
}

/// Searches the spacegroup table for operations that map the structure onto itself.
/// Falls back to `P 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrivialSymmetryFinder;

impl SymmetryFinder for TrivialSymmetryFinder {
    fn reduce(
        &self,
        basis: &FracVector,
        coordgroups: &[FracVector],
    ) -> std::result::Result<SymmetryReduction, CollaboratorError> {
        Ok(trivial_symmetry_reduce(basis, coordgroups)?)
    }
}

// ======================== METADATA ========================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureTag {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureRef {
    pub reference: String,
}

/// Tags and literature references attached to stored structures, looked up by entity id.
pub trait MetadataStore {
    fn get_tags(&self, entity_id: &str) -> std::result::Result<Vec<StructureTag>, CollaboratorError>;
    fn get_refs(&self, entity_id: &str) -> std::result::Result<Vec<StructureRef>, CollaboratorError>;
}

/// A [`MetadataStore`] held in memory. Unknown ids have no tags and no references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryMetadataStore {
    tags: BTreeMap<String, Vec<StructureTag>>,
    refs: BTreeMap<String, Vec<StructureRef>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a tag, replacing an earlier value with the same name.
    pub fn add_tag(&mut self, entity_id: &str, name: &str, value: &str) {
        let tags = self.tags.entry(entity_id.to_string()).or_default();
        tags.retain(|t| t.name != name);
        tags.push(StructureTag {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn add_ref(&mut self, entity_id: &str, reference: &str) {
        self.refs.entry(entity_id.to_string()).or_default().push(StructureRef {
            reference: reference.to_string(),
        });
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn get_tags(&self, entity_id: &str) -> std::result::Result<Vec<StructureTag>, CollaboratorError> {
        Ok(self.tags.get(entity_id).cloned().unwrap_or_default())
    }

    fn get_refs(&self, entity_id: &str) -> std::result::Result<Vec<StructureRef>, CollaboratorError> {
        Ok(self.refs.get(entity_id).cloned().unwrap_or_default())
    }
}
