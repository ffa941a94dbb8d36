//! Filter constraints

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single `WHERE`-style condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// The filter name understood by the backend
    pub filter: String,
    /// The value to filter on
    pub value: Value,
}

impl Constraint {
    /// Creates a new constraint.
    #[must_use]
    pub fn new(filter: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            filter: filter.into(),
            value: value.into(),
        }
    }
}

/// Ordered constraints holding one active value per filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints {
    items: Vec<Constraint>,
}

impl Constraints {
    /// Creates an empty constraint list.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets the value for `filter`, keeping its position when it already exists.
    pub fn upsert(&mut self, filter: impl Into<String>, value: impl Into<Value>) {
        let constraint = Constraint::new(filter, value);
        match self.items.iter_mut().find(|c| c.filter == constraint.filter) {
            Some(existing) => existing.value = constraint.value,
            None => self.items.push(constraint),
        }
    }

    /// Removes the constraint for `filter`, returning its value.
    pub fn remove(&mut self, filter: &str) -> Option<Value> {
        let index = self.items.iter().position(|c| c.filter == filter)?;
        Some(self.items.remove(index).value)
    }

    /// Returns true if a constraint exists for `filter`.
    #[must_use]
    pub fn contains(&self, filter: &str) -> bool {
        self.items.iter().any(|c| c.filter == filter)
    }

    /// Returns the value for `filter`.
    #[must_use]
    pub fn get(&self, filter: &str) -> Option<&Value> {
        self.items
            .iter()
            .find(|c| c.filter == filter)
            .map(|c| &c.value)
    }

    /// Returns an iterator in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.items.iter()
    }

    /// Returns the number of constraints.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no constraints.
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
    fn test_upsert_keeps_position() {
        let mut constraints = Constraints::new();
        constraints.upsert("status", "open");
        constraints.upsert("owner", 4);
        constraints.upsert("status", "closed");

        let filters: Vec<_> = constraints.iter().map(|c| c.filter.as_str()).collect();
        assert_eq!(filters, vec!["status", "owner"]);
        assert_eq!(constraints.get("status"), Some(&json!("closed")));
    }

    #[test]
    fn test_remove() {
        let mut constraints = Constraints::new();
        constraints.upsert("status", "open");
        assert_eq!(constraints.remove("status"), Some(json!("open")));
        assert_eq!(constraints.remove("status"), None);
        assert!(constraints.is_empty());
    }
}
