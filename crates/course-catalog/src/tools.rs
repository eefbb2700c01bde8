/// Explicit registry of string-in/string-out tools exposed to an answering agent.
///
/// Tools are dispatched by exact name. Registration order is preserved so prompts that
/// list the tools are stable.
use std::fmt;
use std::sync::Arc;

use crate::error::CatalogError;
use crate::lookup::PrerequisiteLookup;

pub type ToolFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    func: ToolFn,
}

impl Tool {
    pub fn call(&self, input: &str) -> String {
        (self.func)(input)
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<(), CatalogError>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(CatalogError::DuplicateTool(name));
        }
        self.tools.push(Tool {
            name,
            description: description.into(),
            func: Arc::new(func),
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Invoke the tool named `name`. Returns `None` when no such tool is registered.
    pub fn call(&self, name: &str, input: &str) -> Option<String> {
        self.get(name).map(|tool| tool.call(input))
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Registry holding the catalog-backed tools.
pub fn course_tools(lookup: PrerequisiteLookup) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(
            PrerequisiteLookup::TOOL_NAME,
            PrerequisiteLookup::TOOL_DESCRIPTION,
            move |input| lookup.lookup(input),
        )
        .expect("fresh registry has no tools");
    registry
}
