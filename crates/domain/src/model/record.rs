//! Attribute storage and dirty tracking for one record.

use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Attribute name to value mapping.
pub type Attributes = Map<String, Value>;

/// Name reserved for the record's own bookkeeping.
pub const RESERVED_ATTRIBUTE: &str = "__attributes";

/// Current attributes, the last-persisted snapshot and the sync flags of a
/// record. Cloning yields fully independent storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    attributes: Attributes,
    original: Attributes,
    exists: bool,
    syncing: bool,
}

impl Record {
    /// Creates an empty record that does not exist on the backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from a payload.
    ///
    /// The snapshot is only filled when the record already exists, so a new
    /// record reports every supplied attribute as dirty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` if the payload uses the
    /// reserved attribute name.
    pub fn from_attributes(attributes: Attributes, exists: bool) -> DomainResult<Self> {
        ensure_assignable(attributes.keys())?;
        let original = if exists {
            attributes.clone()
        } else {
            Attributes::new()
        };
        Ok(Self {
            attributes,
            original,
            exists,
            syncing: false,
        })
    }

    /// Merges a payload received from the backend; every supplied value is
    /// also recorded as persisted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` if the payload uses the
    /// reserved attribute name. Nothing is merged in that case.
    pub fn hydrate(&mut self, attributes: Attributes) -> DomainResult<()> {
        ensure_assignable(attributes.keys())?;
        for (name, value) in attributes {
            self.original.insert(name.clone(), value.clone());
            self.attributes.insert(name, value);
        }
        Ok(())
    }

    /// Records every current attribute as persisted.
    pub fn commit(&mut self) {
        self.original = self.attributes.clone();
    }

    /// Returns the stored value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Stores `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` for the reserved name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> DomainResult<()> {
        let name = name.into();
        ensure_assignable(std::iter::once(&name))?;
        self.attributes.insert(name, value);
        Ok(())
    }

    /// Removes an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(name)
    }

    /// Current attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Consumes the record, returning its attributes.
    #[must_use]
    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Last-persisted snapshot.
    #[must_use]
    pub const fn original(&self) -> &Attributes {
        &self.original
    }

    /// Attributes whose value differs from the snapshot. Objects and arrays
    /// are always reported.
    #[must_use]
    pub fn dirty(&self) -> Attributes {
        self.attributes
            .iter()
            .filter(|(name, value)| {
                value.is_object() || value.is_array() || self.original.get(*name) != Some(*value)
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Returns true if [`Record::dirty`] is not empty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty().is_empty()
    }

    /// Restores the snapshot; attributes that were never persisted are
    /// removed.
    pub fn reset(&mut self) {
        let original = &self.original;
        self.attributes.retain(|name, _| original.contains_key(name));
        for (name, value) in &mut self.attributes {
            if let Some(saved) = original.get(name) {
                value.clone_from(saved);
            }
        }
    }

    /// Whether the record is known to be persisted.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.exists
    }

    /// Marks the record as persisted or not.
    pub const fn set_exists(&mut self, exists: bool) {
        self.exists = exists;
    }

    /// Whether a write is in flight.
    #[must_use]
    pub const fn syncing(&self) -> bool {
        self.syncing
    }

    /// Sets the in-flight flag.
    pub const fn set_syncing(&mut self, syncing: bool) {
        self.syncing = syncing;
    }
}

fn ensure_assignable<'a>(mut names: impl Iterator<Item = &'a String>) -> DomainResult<()> {
    match names.find(|name| name.as_str() == RESERVED_ATTRIBUTE) {
        Some(name) => Err(DomainError::InvalidAttribute(name.clone())),
        None => Ok(()),
    }
}
