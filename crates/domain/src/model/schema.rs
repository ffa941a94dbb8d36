//! Per-type model description.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Transforms a stored value on read.
pub type Accessor = fn(&Value) -> Value;

/// Transforms an incoming value before it is stored.
pub type Mutator = fn(Value) -> Value;

/// Wire format of date attributes unless a schema overrides it.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accessor/mutator pair registered for one field.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldAccess {
    /// Applied when the attribute is read
    pub accessor: Option<Accessor>,
    /// Applied when the attribute is written
    pub mutator: Option<Mutator>,
}

/// Everything that is shared by all records of one model type: the resource
/// path, key names, date fields and the accessor/mutator table.
///
/// The table is filled once when the type is registered and never looked up
/// by name at runtime beyond a map access.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    path: String,
    primary_key: String,
    primary_filter: String,
    dates: Vec<String>,
    date_format: String,
    fields: HashMap<String, FieldAccess>,
}

impl ModelSchema {
    /// Creates a schema for the resource at `path`, keyed by `id`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            primary_key: "id".to_string(),
            primary_filter: "id".to_string(),
            dates: Vec::new(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            fields: HashMap::new(),
        }
    }

    /// Sets the attribute holding the record identity.
    #[must_use]
    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = key.into();
        self
    }

    /// Sets the filter name used to target one record in writes.
    #[must_use]
    pub fn with_primary_filter(mut self, filter: impl Into<String>) -> Self {
        self.primary_filter = filter.into();
        self
    }

    /// Declares date attributes.
    #[must_use]
    pub fn with_dates<I, S>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dates.extend(dates.into_iter().map(Into::into));
        self
    }

    /// Overrides the `chrono` format string of date attributes.
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Registers an accessor for `field`.
    #[must_use]
    pub fn accessor(mut self, field: impl Into<String>, accessor: Accessor) -> Self {
        self.fields.entry(field.into()).or_default().accessor = Some(accessor);
        self
    }

    /// Registers a mutator for `field`.
    #[must_use]
    pub fn mutator(mut self, field: impl Into<String>, mutator: Mutator) -> Self {
        self.fields.entry(field.into()).or_default().mutator = Some(mutator);
        self
    }

    /// Resource path relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Primary key attribute name.
    #[must_use]
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Filter name matching the primary key on the backend.
    #[must_use]
    pub fn primary_filter(&self) -> &str {
        &self.primary_filter
    }

    /// Declared date attributes.
    #[must_use]
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Returns true if `field` is a date attribute.
    #[must_use]
    pub fn is_date(&self, field: &str) -> bool {
        self.dates.iter().any(|d| d == field)
    }

    /// Date wire format.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Returns the registered accessor/mutator pair for `field`.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&FieldAccess> {
        self.fields.get(field)
    }

    /// Applies the accessor of `field`, if any.
    #[must_use]
    pub fn read(&self, field: &str, raw: &Value) -> Value {
        match self.field(field).and_then(|f| f.accessor) {
            Some(accessor) => accessor(raw),
            None => raw.clone(),
        }
    }

    /// Applies the mutator of `field`, if any.
    #[must_use]
    pub fn write(&self, field: &str, value: Value) -> Value {
        match self.field(field).and_then(|f| f.mutator) {
            Some(mutator) => mutator(value),
            None => value,
        }
    }

    /// Parses the stored value of a date attribute.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotADateAttribute` for undeclared fields and
    /// `DomainError::InvalidDate` when the value does not match the format.
    pub fn parse_date(&self, field: &str, raw: &Value) -> DomainResult<NaiveDateTime> {
        if !self.is_date(field) {
            return Err(DomainError::NotADateAttribute(field.to_string()));
        }
        let invalid = || DomainError::InvalidDate {
            attribute: field.to_string(),
            value: raw.to_string(),
        };
        let text = raw.as_str().ok_or_else(invalid)?;
        NaiveDateTime::parse_from_str(text, &self.date_format).map_err(|_| invalid())
    }

    /// Formats a date into its wire form.
    #[must_use]
    pub fn format_date(&self, date: &NaiveDateTime) -> String {
        date.format(&self.date_format).to_string()
    }
}
