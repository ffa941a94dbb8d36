//! Query builder: accumulates constraints and variables, then executes them
//! against the resource.

use remodel_domain::query::Query;
use remodel_domain::{Attributes, Direction, HttpRequest};
use serde_json::Value;

use crate::collection::ModelCollection;
use crate::error::QueryResult;
use crate::model::Model;
use crate::payload;
use crate::resource::Resource;

/// Builds and runs one query against a resource.
///
/// | operation | request |
/// |---|---|
/// | [`get`](Builder::get) | `GET <url><query>` |
/// | [`update`](Builder::update) | `POST <url>/update<query>` |
/// | [`insert`](Builder::insert) | `POST <url>/store` |
/// | [`delete_results`](Builder::delete_results) | `POST <url>/delete<query>` |
#[derive(Debug, Clone)]
pub struct Builder {
    resource: Resource,
    query: Query,
}

impl Builder {
    /// Creates a builder seeded with the configured limit and page 1.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        let query = Query::with_limit(resource.settings().default_limit);
        Self { resource, query }
    }

    /// Creates a builder without any variable, not even limit or page.
    #[must_use]
    pub const fn bare(resource: Resource) -> Self {
        Self {
            resource,
            query: Query::empty(),
        }
    }

    /// The resource this builder queries.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The accumulated query state.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Sets the constraint for `filter`, replacing any previous value.
    pub fn filter(&mut self, filter: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.query.filter(filter, value);
        self
    }

    /// Drops the constraint for `filter`.
    pub fn remove_constraint(&mut self, filter: &str) -> &mut Self {
        self.query.remove_constraint(filter);
        self
    }

    /// Returns true if a constraint exists for `filter`.
    #[must_use]
    pub fn has_constraint(&self, filter: &str) -> bool {
        self.query.has_constraint(filter)
    }

    /// Returns an owned copy of the constraint value.
    #[must_use]
    pub fn constraint_value(&self, filter: &str) -> Option<Value> {
        self.query.constraint_value(filter)
    }

    /// Appends a new query variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DuplicateVariable` if `name` already exists, or
    /// `DomainError::InvalidNumber` for a non-integer `limit` or `page`.
    pub fn append(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.query.append(name, value)?;
        Ok(self)
    }

    /// Changes an appended query variable.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownVariable` if `name` was never appended.
    pub fn update_variable(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> QueryResult<&mut Self> {
        self.query.update_variable(name, value)?;
        Ok(self)
    }

    /// Returns true if a variable with this name exists.
    #[must_use]
    pub fn has_variable(&self, name: &str) -> bool {
        self.query.has_variable(name)
    }

    /// Returns an owned copy of a variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.query.variable(name)
    }

    /// Returns an owned copy of a variable, or `default`.
    #[must_use]
    pub fn variable_or(&self, name: &str, default: impl Into<Value>) -> Value {
        self.query.variable_or(name, default)
    }

    /// Sets the page size.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.query.set_limit(limit);
        self
    }

    /// Requests every record.
    pub fn without_limit(&mut self) -> &mut Self {
        self.query.without_limit();
        self
    }

    /// Page size, `-1` when unlimited.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.query.limit()
    }

    /// Sets the page number.
    pub fn set_page(&mut self, page: i64) -> &mut Self {
        self.query.set_page(page);
        self
    }

    /// Current page number.
    #[must_use]
    pub fn current_page(&self) -> i64 {
        self.query.current_page()
    }

    /// Moves to the next page.
    pub fn increment_page(&mut self) -> &mut Self {
        self.query.increment_page();
        self
    }

    /// Moves to the previous page. There is no floor.
    pub fn decrement_page(&mut self) -> &mut Self {
        self.query.decrement_page();
        self
    }

    /// Replaces the sort order.
    pub fn order_by<I, S>(&mut self, orderings: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, Direction)>,
        S: Into<String>,
    {
        self.query.order_by(orderings);
        self
    }

    /// Ordered attributes, `None` without ordering.
    #[must_use]
    pub fn ordering_by(&self) -> Option<Vec<String>> {
        self.query.ordering_by()
    }

    /// Ordering directions, `None` without ordering.
    #[must_use]
    pub fn ordering_by_direction(&self) -> Option<Vec<Direction>> {
        self.query.ordering_by_direction()
    }

    /// Serialized constraints and variables.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.query.to_query_string()
    }

    /// Full read URL for the current state.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` for an unusable base URL.
    pub fn url(&self) -> QueryResult<String> {
        self.endpoint("")
    }

    fn endpoint(&self, action: &str) -> QueryResult<String> {
        Ok(format!(
            "{}{action}{}",
            self.resource.url()?,
            self.query.to_query_string()
        ))
    }

    /// Fetches the matching records.
    ///
    /// # Errors
    ///
    /// Returns a driver error, `Rejected` for non-200 answers or
    /// `MalformedPayload` when the body is not a record list.
    pub async fn get(&self) -> QueryResult<ModelCollection> {
        let body = self.resource.send(HttpRequest::get(self.url()?)).await?;
        let models = self.encapsulate_data(payload::records(body)?)?;
        Ok(ModelCollection::with_builder(models, self.clone()))
    }

    /// Fetches the first matching record. The page size of this builder is
    /// set to 1.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Builder::get`].
    pub async fn first(&mut self) -> QueryResult<Option<Model>> {
        self.set_limit(1);
        let collection = self.get().await?;
        Ok(collection.into_vec().into_iter().next())
    }

    /// Applies `attributes` to every matching record.
    ///
    /// # Errors
    ///
    /// Returns a driver error or `Rejected`; `422` carries validation detail.
    pub async fn update(&self, attributes: Attributes) -> QueryResult<ModelCollection> {
        let request = HttpRequest::post(self.endpoint("/update")?, Some(Value::Object(attributes)));
        let body = self.resource.send(request).await?;
        let models = self.encapsulate_data(payload::records(body)?)?;
        Ok(ModelCollection::with_builder(models, self.clone()))
    }

    /// Creates a record and returns it as stored by the backend.
    ///
    /// # Errors
    ///
    /// Returns a driver error or `Rejected`; `422` carries validation detail.
    pub async fn insert(&self, attributes: Attributes) -> QueryResult<Model> {
        let url = format!("{}/store", self.resource.url()?);
        let request = HttpRequest::post(url, Some(Value::Object(attributes)));
        let body = self.resource.send(request).await?;
        Model::from_existing(self.resource.clone(), payload::record(body)?)
    }

    /// Deletes every matching record and returns what the backend echoed.
    ///
    /// # Errors
    ///
    /// Returns a driver error or `Rejected`; `403` when not permitted.
    pub async fn delete_results(&self) -> QueryResult<ModelCollection> {
        let request = HttpRequest::post(self.endpoint("/delete")?, None);
        let body = self.resource.send(request).await?;
        let models = self.encapsulate_data(payload::records(body)?)?;
        Ok(ModelCollection::with_builder(models, self.clone()))
    }

    /// Wraps raw records into persisted models of this resource.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` if a record uses the reserved
    /// attribute name.
    pub fn encapsulate_data(&self, records: Vec<Attributes>) -> QueryResult<Vec<Model>> {
        records
            .into_iter()
            .map(|record| Model::from_existing(self.resource.clone(), record))
            .collect()
    }
}
