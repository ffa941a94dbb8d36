//! Appended query variables

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// An arbitrary named query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Parameter name, unique within a query
    pub name: String,
    /// Parameter value: scalar, array or object
    pub value: Value,
}

/// Ordered variables with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    items: Vec<Variable>,
}

impl Variables {
    /// Creates an empty variable list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds a new variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateVariable` if `name` is already present.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Value>) -> DomainResult<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(DomainError::DuplicateVariable(name));
        }
        self.items.push(Variable {
            name,
            value: value.into(),
        });
        Ok(())
    }

    /// Replaces the value of an existing variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownVariable` if `name` was never appended.
    pub fn update(&mut self, name: &str, value: impl Into<Value>) -> DomainResult<()> {
        let variable = self
            .items
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| DomainError::UnknownVariable(name.to_string()))?;
        variable.value = value.into();
        Ok(())
    }

    /// Updates `name` if present, appends it otherwise.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.items.iter_mut().find(|v| v.name == name) {
            Some(variable) => variable.value = value,
            None => self.items.push(Variable {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Removes a variable, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.items.iter().position(|v| v.name == name)?;
        Some(self.items.remove(index).value)
    }

    /// Returns true if a variable with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|v| v.name == name)
    }

    /// Returns the value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.items.iter().find(|v| v.name == name).map(|v| &v.value)
    }

    /// Returns an iterator in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.items.iter()
    }

    /// Returns the number of variables.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no variables.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_append_rejects_duplicates() {
        let mut variables = Variables::new();
        assert!(variables.append("mock", 1).is_ok());
        assert_eq!(
            variables.append("mock", 2),
            Err(DomainError::DuplicateVariable("mock".to_string()))
        );
        assert_eq!(variables.get("mock"), Some(&json!(1)));
    }

    #[test]
    fn test_update_requires_existing() {
        let mut variables = Variables::new();
        assert_eq!(
            variables.update("mock", 2),
            Err(DomainError::UnknownVariable("mock".to_string()))
        );
        assert!(!variables.contains("mock"));
    }

    #[test]
    fn test_set_upserts() {
        let mut variables = Variables::new();
        variables.set("page", 1);
        variables.set("limit", 15);
        variables.set("page", 2);

        let names: Vec<_> = variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["page", "limit"]);
        assert_eq!(variables.get("page"), Some(&json!(2)));
    }
}
