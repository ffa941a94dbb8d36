//! Query state: filter constraints, appended variables and pagination.
//!
//! A [`Query`] is pure data. Executing it against a backend is the job of the
//! application layer's builder.

mod constraint;
mod encode;
mod variable;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

pub use constraint::{Constraint, Constraints};
pub use encode::{FILTERS, encode, render, to_query_string};
pub use variable::{Variable, Variables};

/// Reserved variable holding the page size.
pub const LIMIT: &str = "limit";
/// Reserved variable holding the page number.
pub const PAGE: &str = "page";
/// Reserved variable holding the sort order.
pub const ORDER: &str = "order";
/// Page size used when none is configured.
pub const DEFAULT_LIMIT: i64 = 15;
/// Value returned by [`Query::limit`] when no limit is set.
pub const UNLIMITED: i64 = -1;

/// Sort direction of one ordering pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

impl Direction {
    /// Returns the wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(DomainError::InvalidDirection(other.to_string())),
        }
    }
}

/// Constraints and variables defining one query.
///
/// `limit` and `page` always hold integers: numeric strings and integral
/// floats are converted when appended, anything else is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    constraints: Constraints,
    variables: Variables,
}

impl Query {
    /// Creates a query seeded with `limit = 15` and `page = 1`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Creates a query seeded with the given limit and `page = 1`.
    #[must_use]
    pub fn with_limit(limit: i64) -> Self {
        let mut variables = Variables::new();
        variables.set(LIMIT, limit);
        variables.set(PAGE, 1);
        Self {
            constraints: Constraints::new(),
            variables,
        }
    }

    /// Creates a query without any constraint or variable.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            constraints: Constraints::new(),
            variables: Variables::new(),
        }
    }

    /// Sets the constraint for `filter`, replacing any previous value.
    pub fn filter(&mut self, filter: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.constraints.upsert(filter, value);
        self
    }

    /// Drops the constraint for `filter`.
    pub fn remove_constraint(&mut self, filter: &str) -> &mut Self {
        self.constraints.remove(filter);
        self
    }

    /// Returns true if a constraint exists for `filter`.
    #[must_use]
    pub fn has_constraint(&self, filter: &str) -> bool {
        self.constraints.contains(filter)
    }

    /// Returns an owned copy of the constraint value for `filter`.
    #[must_use]
    pub fn constraint_value(&self, filter: &str) -> Option<Value> {
        self.constraints.get(filter).cloned()
    }

    /// Appends a new variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateVariable` if `name` already exists;
    /// use [`Query::update_variable`] to change it. Returns
    /// `DomainError::InvalidNumber` for a non-integer `limit` or `page`.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> DomainResult<&mut Self> {
        let name = name.into();
        let value = checked_value(&name, value.into())?;
        self.variables.append(name, value)?;
        Ok(self)
    }

    /// Changes the value of an appended variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownVariable` if `name` was never appended,
    /// or `DomainError::InvalidNumber` for a non-integer `limit` or `page`.
    pub fn update_variable(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> DomainResult<&mut Self> {
        let value = checked_value(name, value.into())?;
        self.variables.update(name, value)?;
        Ok(self)
    }

    /// Returns true if a variable with this name exists.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// Returns an owned copy of the variable value.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    /// Returns an owned copy of the variable value, or `default`.
    #[must_use]
    pub fn variable_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.variable(name).unwrap_or_else(|| default.into())
    }

    /// Sets the page size.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.variables.set(LIMIT, limit);
        self
    }

    /// Removes the page size so every record is requested.
    pub fn without_limit(&mut self) -> &mut Self {
        self.variables.remove(LIMIT);
        self
    }

    /// Returns the page size, or [`UNLIMITED`] when none is set.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.integer(LIMIT).unwrap_or(UNLIMITED)
    }

    /// Sets the page number. No lower bound is enforced.
    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.variables.set(PAGE, page);
        self
    }

    /// Returns the page number, `1` when no page variable is set.
    #[must_use]
    pub fn current_page(&self) -> i64 {
        self.integer(PAGE).unwrap_or(1)
    }

    /// Moves to the next page.
    pub fn increment_page(&mut self) -> &mut Self {
        let page = self.current_page().saturating_add(1);
        self.set_page(page)
    }

    /// Moves to the previous page, possibly below 1.
    pub fn decrement_page(&mut self) -> &mut Self {
        let page = self.current_page().saturating_sub(1);
        self.set_page(page)
    }

    fn integer(&self, name: &str) -> Option<i64> {
        self.variables.get(name).and_then(as_integer)
    }

    /// Replaces the sort order with the given `(attribute, direction)` pairs.
    pub fn order_by<I, S>(&mut self, orderings: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        let order: Map<String, Value> = orderings
            .into_iter()
            .map(|(attribute, direction)| (attribute.into(), Value::from(direction.as_str())))
            .collect();
        self.variables.set(ORDER, Value::Object(order));
        self
    }

    /// Returns the ordered attributes, `None` when no order is set.
    #[must_use]
    pub fn ordering_by(&self) -> Option<Vec<String>> {
        self.order_map().map(|order| order.keys().cloned().collect())
    }

    /// Returns the ordering directions, `None` when no order is set.
    #[must_use]
    pub fn ordering_by_direction(&self) -> Option<Vec<Direction>> {
        self.order_map().map(|order| {
            order
                .values()
                .map(|d| d.as_str().and_then(|s| s.parse().ok()).unwrap_or_default())
                .collect()
        })
    }

    fn order_map(&self) -> Option<&Map<String, Value>> {
        self.variables.get(ORDER).and_then(Value::as_object)
    }

    /// Returns the constraints in insertion order.
    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Returns the variables in insertion order.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Serializes the query, `?`-prefixed, or `""` when it is empty.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        to_query_string(&self.constraints, &self.variables)
    }
}

/// Reads an integer from a number, an integral float or a numeric string.
#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_integer(value: &Value) -> Option<i64> {
    let float = |f: f64| {
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
    };
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float))
        }
        _ => None,
    }
}

/// Normalizes `limit` and `page` to integers; other variables pass through.
fn checked_value(name: &str, value: Value) -> DomainResult<Value> {
    if name != LIMIT && name != PAGE {
        return Ok(value);
    }
    as_integer(&value)
        .map(Value::from)
        .ok_or_else(|| DomainError::InvalidNumber {
            name: name.to_string(),
            value: render(&value),
        })
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}
