use crate::domain::status::{StatusDefinition, StatusKind};
use crate::error::{PaymentError, Result};
use std::collections::{HashMap, HashSet, VecDeque};

/// Answers parent/child questions about a catalog of payment statuses.
///
/// Definitions keep their declaration order, which is the order `children`
/// and `descendants` report them in. The parent links are expected to form a
/// forest; a cycle is never followed forever, every walk that reaches one
/// fails with `HierarchyCorruption`.
#[derive(Debug, Clone)]
pub struct StatusHierarchy {
    definitions: Vec<StatusDefinition>,
    index: HashMap<StatusKind, usize>,
}

impl StatusHierarchy {
    /// Builds the hierarchy.
    ///
    /// Fails on duplicate ids and on parents that are not defined themselves.
    pub fn new(definitions: Vec<StatusDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (position, definition) in definitions.iter().enumerate() {
            if index.insert(definition.id.clone(), position).is_some() {
                return Err(PaymentError::DuplicateStatusKind(definition.id.clone()));
            }
        }
        for definition in &definitions {
            if let Some(parent) = &definition.parent {
                if !index.contains_key(parent) {
                    return Err(PaymentError::UnknownStatusKind(parent.clone()));
                }
            }
        }
        Ok(Self { definitions, index })
    }

    pub fn definitions(&self) -> &[StatusDefinition] {
        &self.definitions
    }

    pub fn contains(&self, kind: &StatusKind) -> bool {
        self.index.contains_key(kind)
    }

    pub fn definition(&self, kind: &StatusKind) -> Result<&StatusDefinition> {
        self.index
            .get(kind)
            .map(|&position| &self.definitions[position])
            .ok_or_else(|| PaymentError::UnknownStatusKind(kind.clone()))
    }

    /// The direct children of `kind`, in declaration order.
    pub fn children(&self, kind: &StatusKind) -> Result<Vec<StatusKind>> {
        self.definition(kind)?;
        Ok(self.children_of(kind).cloned().collect())
    }

    /// All statuses below `kind`, breadth first, each exactly once.
    pub fn descendants(&self, kind: &StatusKind) -> Result<Vec<StatusKind>> {
        self.definition(kind)?;
        let mut seen = HashSet::from([kind]);
        let mut descendants = Vec::new();
        let mut queue = VecDeque::from([kind]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if !seen.insert(child) {
                    return Err(PaymentError::HierarchyCorruption(child.clone()));
                }
                descendants.push(child.clone());
                queue.push_back(child);
            }
        }
        Ok(descendants)
    }

    /// The parent chain of `kind` up to its root, nearest first, without `kind` itself.
    pub fn ancestors(&self, kind: &StatusKind) -> Result<Vec<StatusKind>> {
        let mut seen = HashSet::from([kind]);
        let mut ancestors = Vec::new();
        let mut current = self.definition(kind)?;
        while let Some(parent) = &current.parent {
            if !seen.insert(parent) {
                return Err(PaymentError::HierarchyCorruption(parent.clone()));
            }
            ancestors.push(parent.clone());
            current = self.definition(parent)?;
        }
        Ok(ancestors)
    }

    pub fn has_ancestor(&self, kind: &StatusKind, ancestor: &StatusKind) -> Result<bool> {
        Ok(self.ancestors(kind)?.contains(ancestor))
    }

    pub fn is_or_has_ancestor(&self, kind: &StatusKind, ancestor: &StatusKind) -> Result<bool> {
        self.definition(kind)?;
        if kind == ancestor {
            return Ok(true);
        }
        self.has_ancestor(kind, ancestor)
    }

    /// Walks every parent chain once, failing on the first cycle found.
    pub fn validate(&self) -> Result<()> {
        for definition in &self.definitions {
            self.ancestors(&definition.id)?;
        }
        Ok(())
    }

    fn children_of<'a>(
        &'a self,
        kind: &'a StatusKind,
    ) -> impl Iterator<Item = &'a StatusKind> + 'a {
        self.definitions
            .iter()
            .filter(move |definition| definition.parent.as_ref() == Some(kind))
            .map(|definition| &definition.id)
    }
}
