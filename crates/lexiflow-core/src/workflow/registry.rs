//! Name -> definition lookup, built once at startup.

use std::collections::BTreeMap;

use lexiflow_types::workflow::WorkflowDefinition;

use super::builtin::builtin_workflows;
use super::definition::{DefinitionError, validate_definition};

/// Immutable set of workflow definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    workflows: BTreeMap<String, WorkflowDefinition>,
}

impl WorkflowRegistry {
    /// Validate and index `definitions`. Duplicate names are rejected.
    pub fn new(definitions: Vec<WorkflowDefinition>) -> Result<Self, DefinitionError> {
        let mut workflows = BTreeMap::new();
        for def in definitions {
            validate_definition(&def)?;
            if workflows.contains_key(&def.name) {
                return Err(DefinitionError(format!(
                    "workflow '{}' registered twice",
                    def.name
                )));
            }
            workflows.insert(def.name.clone(), def);
        }
        Ok(Self { workflows })
    }

    /// Registry holding the built-in `vocabulary` and `lesson` workflows.
    pub fn with_builtins(max_regenerations: u32) -> Result<Self, DefinitionError> {
        Self::new(builtin_workflows(max_regenerations))
    }

    pub fn get(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.workflows.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.workflows.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.workflows.values()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::builtin::vocabulary_workflow;

    #[test]
    fn test_builtins_registered() {
        let registry = WorkflowRegistry::with_builtins(3).unwrap();
        assert_eq!(registry.names(), vec!["lesson", "vocabulary"]);
        assert!(registry.get("vocabulary").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = WorkflowRegistry::new(vec![vocabulary_workflow(3), vocabulary_workflow(1)])
            .unwrap_err();
        assert!(err.0.contains("registered twice"));
    }
}
