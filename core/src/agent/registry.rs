use crate::error::AssemblyError;
use crate::traits::{Tool, ToolSpec};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name-keyed registry of callable capabilities. Built once at startup, then
/// shared immutably; concurrent resolution needs no locking.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), AssemblyError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AssemblyError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Resolve a requested name set into tool handles, deduplicated and in
    /// request order. Fails on the first unresolvable name; assembly must
    /// fail fast rather than silently drop a requested capability.
    pub fn resolve(&self, names: &[String]) -> Result<Vec<Arc<dyn Tool>>, AssemblyError> {
        let mut seen = Vec::with_capacity(names.len());
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if seen.contains(name) {
                continue;
            }
            let tool = self
                .get(name)
                .ok_or_else(|| AssemblyError::UnknownTool(name.clone()))?;
            seen.push(name.clone());
            resolved.push(tool);
        }
        Ok(resolved)
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixedTool;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool::new("alpha", "a")).unwrap();
        registry.register(FixedTool::new("beta", "b")).unwrap();
        registry.register(FixedTool::new("gamma", "c")).unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry.register(FixedTool::new("beta", "again")).unwrap_err();
        assert!(matches!(err, AssemblyError::DuplicateTool(name) if name == "beta"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn resolve_returns_exactly_the_requested_set() {
        let registry = registry();
        let forward = registry
            .resolve(&["alpha".to_string(), "gamma".to_string()])
            .unwrap();
        let backward = registry
            .resolve(&["gamma".to_string(), "alpha".to_string()])
            .unwrap();

        let mut forward_names: Vec<&str> = forward.iter().map(|t| t.name()).collect();
        let mut backward_names: Vec<&str> = backward.iter().map(|t| t.name()).collect();
        forward_names.sort_unstable();
        backward_names.sort_unstable();
        assert_eq!(forward_names, backward_names);
        assert_eq!(forward_names, vec!["alpha", "gamma"]);
    }

    #[test]
    fn resolve_preserves_request_order_and_dedupes() {
        let registry = registry();
        let resolved = registry
            .resolve(&[
                "gamma".to_string(),
                "alpha".to_string(),
                "gamma".to_string(),
            ])
            .unwrap();
        let names: Vec<&str> = resolved.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["gamma", "alpha"]);
    }

    #[test]
    fn unknown_name_fails_naming_the_tool() {
        let registry = registry();
        let err = registry
            .resolve(&["alpha".to_string(), "delta".to_string()])
            .unwrap_err();
        assert!(matches!(err, AssemblyError::UnknownTool(name) if name == "delta"));
    }
}
