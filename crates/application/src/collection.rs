//! Ordered, key-addressable result sets with optional pagination.

use remodel_domain::UNLIMITED;
use serde_json::Value;

use crate::builder::Builder;
use crate::error::{QueryError, QueryResult};
use crate::model::Model;

/// Models in insertion order, addressable by primary key.
///
/// Inserting a model whose key is already present replaces the existing
/// entry in place. Models without a key are always appended.
#[derive(Debug, Clone, Default)]
pub struct ModelCollection {
    items: Vec<Model>,
    builder: Option<Builder>,
}

impl ModelCollection {
    /// Creates an empty collection without a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            builder: None,
        }
    }

    /// Creates a collection that can load further pages through `builder`.
    #[must_use]
    pub fn with_builder(models: Vec<Model>, builder: Builder) -> Self {
        let mut collection: Self = models.into_iter().collect();
        collection.builder = Some(builder);
        collection
    }

    /// The builder that produced this collection.
    #[must_use]
    pub const fn builder(&self) -> Option<&Builder> {
        self.builder.as_ref()
    }

    /// Attaches or replaces the builder used for pagination.
    pub fn set_builder(&mut self, builder: Builder) {
        self.builder = Some(builder);
    }

    /// Adds a model, replacing the one with the same key.
    pub fn insert(&mut self, model: Model) {
        let existing = model
            .key()
            .and_then(|key| self.items.iter().position(|m| m.key().as_ref() == Some(&key)));
        match existing {
            Some(index) => self.items[index] = model,
            None => self.items.push(model),
        }
    }

    /// Adds every model of `other`, in order.
    pub fn merge(&mut self, other: Self) {
        for model in other.items {
            self.insert(model);
        }
    }

    /// Returns the model with this key.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<&Model> {
        self.items.iter().find(|m| m.key().as_ref() == Some(key))
    }

    /// Returns the model with this key, mutably.
    pub fn get_mut(&mut self, key: &Value) -> Option<&mut Model> {
        self.items.iter_mut().find(|m| m.key().as_ref() == Some(key))
    }

    /// Removes the model with this key.
    pub fn remove(&mut self, key: &Value) -> Option<Model> {
        let index = self
            .items
            .iter()
            .position(|m| m.key().as_ref() == Some(key))?;
        Some(self.items.remove(index))
    }

    /// First model in order.
    #[must_use]
    pub fn first(&self) -> Option<&Model> {
        self.items.first()
    }

    /// Primary keys in order; models without one are skipped.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.items.iter().filter_map(Model::key).collect()
    }

    /// Iterates over the models in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Model> {
        self.items.iter()
    }

    /// Number of models.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no models.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the collection, returning the models in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<Model> {
        self.items
    }

    /// Loads the next page and merges it into this collection.
    ///
    /// # Errors
    ///
    /// See [`ModelCollection::load_next_page_with`].
    pub async fn load_next_page(&mut self) -> QueryResult<()> {
        let page = self.load_next_page_with().await?;
        self.merge(page);
        Ok(())
    }

    /// Loads the next page and returns it without merging.
    ///
    /// The builder's page is incremented first and moved back if the fetch
    /// fails, so a failed load can simply be retried.
    ///
    /// # Errors
    ///
    /// Returns `MissingQueryBuilder` without a builder, `PaginationDisabled`
    /// when the builder has no limit, or the error of the fetch itself.
    pub async fn load_next_page_with(&mut self) -> QueryResult<Self> {
        let builder = self.builder.as_mut().ok_or(QueryError::MissingQueryBuilder)?;
        if builder.limit() == UNLIMITED {
            return Err(QueryError::PaginationDisabled);
        }

        builder.increment_page();
        match builder.get().await {
            Ok(page) => Ok(page),
            Err(error) => {
                builder.decrement_page();
                tracing::warn!(
                    page = builder.current_page(),
                    %error,
                    "next page failed, page restored"
                );
                Err(error)
            }
        }
    }
}

impl FromIterator<Model> for ModelCollection {
    fn from_iter<T: IntoIterator<Item = Model>>(iter: T) -> Self {
        let mut collection = Self::new();
        for model in iter {
            collection.insert(model);
        }
        collection
    }
}

impl IntoIterator for ModelCollection {
    type Item = Model;
    type IntoIter = std::vec::IntoIter<Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModelCollection {
    type Item = &'a Model;
    type IntoIter = std::slice::Iter<'a, Model>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
