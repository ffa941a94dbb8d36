//! A single remote record.

use std::ops::{Deref, DerefMut};

use chrono::NaiveDateTime;
use remodel_domain::{Attributes, DomainError, ModelSchema, Record};
use serde_json::Value;

use crate::builder::Builder;
use crate::error::QueryResult;
use crate::resource::Resource;

/// One record of a resource: attribute storage, the last-persisted
/// snapshot and the sync flags, plus the operations that write it back.
///
/// Reads go through the schema's accessors and writes through its mutators.
/// `save` and `delete_model` borrow the model mutably for the whole round
/// trip, so two writes can never overlap on one instance.
#[derive(Debug, Clone)]
pub struct Model {
    resource: Resource,
    record: Record,
}

impl Model {
    /// Creates an empty model that does not exist on the backend.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            record: Record::new(),
        }
    }

    /// Creates a new model from attributes; all of them start out dirty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` for the reserved name.
    pub fn make(resource: Resource, attributes: Attributes) -> QueryResult<Self> {
        Ok(Self {
            resource,
            record: Record::from_attributes(attributes, false)?,
        })
    }

    /// Creates a model for a record read from the backend.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` for the reserved name.
    pub fn from_existing(resource: Resource, attributes: Attributes) -> QueryResult<Self> {
        Ok(Self {
            resource,
            record: Record::from_attributes(attributes, true)?,
        })
    }

    /// The resource this model belongs to.
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The model schema.
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        self.resource.schema()
    }

    /// Starts a query on this model's resource.
    #[must_use]
    pub fn query(&self) -> Builder {
        self.resource.query()
    }

    /// Reads an attribute through its accessor.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<Value> {
        self.record
            .get(name)
            .map(|raw| self.schema().read(name, raw))
    }

    /// Writes an attribute through its mutator.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` for the reserved name.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> QueryResult<()> {
        let value = self.resource.schema().write(name, value.into());
        self.record.set(name, value)?;
        Ok(())
    }

    /// Removes an attribute locally.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.record.remove(name)
    }

    /// Reads a date attribute.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotADateAttribute` for fields not declared as
    /// dates and `DomainError::InvalidDate` for unparsable values.
    pub fn date(&self, name: &str) -> QueryResult<Option<NaiveDateTime>> {
        match self.record.get(name) {
            None | Some(Value::Null) if self.schema().is_date(name) => Ok(None),
            None | Some(Value::Null) => {
                Err(DomainError::NotADateAttribute(name.to_string()).into())
            }
            Some(raw) => Ok(Some(self.schema().parse_date(name, raw)?)),
        }
    }

    /// Writes a date attribute in its wire format.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotADateAttribute` for fields not declared as
    /// dates.
    pub fn set_date(&mut self, name: &str, date: &NaiveDateTime) -> QueryResult<()> {
        let schema = self.resource.schema();
        if !schema.is_date(name) {
            return Err(DomainError::NotADateAttribute(name.to_string()).into());
        }
        let formatted = schema.format_date(date);
        self.record.set(name, Value::String(formatted))?;
        Ok(())
    }

    /// Raw attribute storage.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        self.record.attributes()
    }

    /// Last-persisted snapshot.
    #[must_use]
    pub const fn original(&self) -> &Attributes {
        self.record.original()
    }

    /// Consumes the model, returning its attributes.
    #[must_use]
    pub fn into_attributes(self) -> Attributes {
        self.record.into_attributes()
    }

    /// Attributes as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.record.attributes().clone())
    }

    /// Value of the primary key attribute.
    #[must_use]
    pub fn key(&self) -> Option<Value> {
        self.record.get(self.schema().primary_key()).cloned()
    }

    /// Attributes changed since the last persisted state.
    ///
    /// Raw stored values are compared; accessors play no part, so a field
    /// whose accessor output changes while its stored value does not is not
    /// dirty.
    #[must_use]
    pub fn dirty(&self) -> Attributes {
        self.record.dirty()
    }

    /// Returns true if any attribute is dirty.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.record.is_dirty()
    }

    /// Whether the record is known to exist on the backend.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.record.exists()
    }

    /// Whether a save or delete is in flight.
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.record.syncing()
    }

    /// Restores the last persisted values and drops local-only attributes.
    pub fn reset(&mut self) {
        self.record.reset();
    }

    /// Persists the dirty attributes.
    ///
    /// Existing records are updated through `/update` filtered on the primary
    /// filter; new records are created through `/store`. The primary key is
    /// always sent. On success the model is re-hydrated from the response;
    /// on failure its attributes are left as they are so the caller can fix
    /// them and retry.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with `422` for validation failures, or any other
    /// error of the underlying builder call.
    pub async fn save(&mut self) -> QueryResult<()> {
        let result = {
            let mut syncing = Syncing::begin(self);
            syncing.persist().await
        };
        if let Err(error) = &result {
            tracing::warn!(path = self.schema().path(), %error, "save failed");
        }
        result
    }

    async fn persist(&mut self) -> QueryResult<()> {
        let mut payload = self.record.dirty();
        if let Some(key) = self.key() {
            payload.insert(self.schema().primary_key().to_string(), key);
        }

        let saved = if self.record.exists() {
            let updated = self.keyed_builder().update(payload).await?;
            updated.into_vec().into_iter().next()
        } else {
            let created = self.keyed_builder().insert(payload).await?;
            self.record.set_exists(true);
            Some(created)
        };

        if let Some(saved) = saved {
            self.record.hydrate(saved.into_attributes())?;
        }
        self.record.commit();
        Ok(())
    }

    /// Deletes the record on the backend.
    ///
    /// On success the model is re-hydrated from the echoed record and no
    /// longer exists. A `422` or `403` answer means nothing was deleted:
    /// every attribute is reset to its persisted value.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with the backend's status, or any other error of
    /// the underlying builder call.
    pub async fn delete_model(&mut self) -> QueryResult<()> {
        let result = {
            let syncing = Syncing::begin(self);
            syncing.keyed_builder().delete_results().await
        };

        match result {
            Ok(deleted) => {
                if let Some(echo) = deleted.into_vec().into_iter().next() {
                    self.record.hydrate(echo.into_attributes())?;
                }
                self.record.set_exists(false);
                Ok(())
            }
            Err(error) => {
                if error.is_validation() || error.is_forbidden() {
                    tracing::warn!(
                        path = self.schema().path(),
                        %error,
                        "delete refused, resetting attributes"
                    );
                    self.record.reset();
                }
                Err(error)
            }
        }
    }

    fn keyed_builder(&self) -> Builder {
        let mut builder = Builder::bare(self.resource.clone());
        builder.filter(
            self.schema().primary_filter().to_string(),
            self.key().unwrap_or(Value::Null),
        );
        builder
    }
}

/// Keeps a model flagged as syncing until dropped, which also covers a
/// save or delete future dropped before the response arrives.
struct Syncing<'a>(&'a mut Model);

impl<'a> Syncing<'a> {
    fn begin(model: &'a mut Model) -> Self {
        model.record.set_syncing(true);
        Self(model)
    }
}

impl Deref for Syncing<'_> {
    type Target = Model;

    fn deref(&self) -> &Model {
        self.0
    }
}

impl DerefMut for Syncing<'_> {
    fn deref_mut(&mut self) -> &mut Model {
        self.0
    }
}

impl Drop for Syncing<'_> {
    fn drop(&mut self) {
        self.0.record.set_syncing(false);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::test_support::{ScriptedDriver, attrs, resource_with};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use remodel_domain::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn marcus() -> (Model, ScriptedDriver) {
        let (resource, driver) = resource_with(ScriptedDriver::new());
        let model = resource
            .make(attrs(json!({"id": 5, "first_name": "Marcus"})))
            .unwrap();
        (model, driver)
    }

    fn stored(value: Value) -> (Model, ScriptedDriver) {
        let (resource, driver) = resource_with(ScriptedDriver::new());
        (Model::from_existing(resource, attrs(value)).unwrap(), driver)
    }

    #[test]
    fn test_fresh_model_is_fully_dirty() {
        let (model, _) = marcus();
        assert_eq!(model.dirty(), attrs(json!({"id": 5, "first_name": "Marcus"})));
        assert!(!model.exists());
        assert!(!model.is_syncing());
    }

    #[test]
    fn test_accessors_and_mutators() {
        fn shout(value: &Value) -> Value {
            json!(format!("{}!", value.as_str().unwrap_or_default()))
        }
        fn lower(value: Value) -> Value {
            json!(value.as_str().unwrap_or_default().to_lowercase())
        }
        let schema = ModelSchema::new("/users")
            .accessor("name", shout)
            .mutator("email", lower);
        let resource = Resource::new(
            schema,
            Arc::new(ScriptedDriver::new()),
            Arc::new(remodel_domain::ClientSettings::new("https://api.example.com")),
        );
        let mut model = resource.make(attrs(json!({"name": "ada"}))).unwrap();

        model.set_attribute("email", "ADA@Example.com").unwrap();

        assert_eq!(model.get_attribute("name"), Some(json!("ada!")));
        assert_eq!(model.attributes().get("name"), Some(&json!("ada")));
        assert_eq!(model.get_attribute("email"), Some(json!("ada@example.com")));
        assert_eq!(model.get_attribute("missing"), None);

        let persisted =
            Model::from_existing(resource, attrs(json!({"id": 1, "name": "ada"}))).unwrap();
        assert_eq!(persisted.get_attribute("name"), Some(json!("ada!")));
        assert!(!persisted.is_dirty());
    }

    #[test]
    fn test_dates() {
        let (mut model, _) = stored(json!({"id": 1, "created_at": "2024-01-31 08:00:00"}));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(model.date("created_at").unwrap(), Some(expected));

        let later = expected + chrono::Duration::days(1);
        model.set_date("created_at", &later).unwrap();
        assert_eq!(
            model.attributes().get("created_at"),
            Some(&json!("2024-02-01 08:00:00"))
        );
        assert!(model.is_dirty());

        model.set_attribute("created_at", "2020-05-05 10:10:10").unwrap();
        assert_eq!(
            model.date("created_at").unwrap().map(|d| d.to_string()),
            Some("2020-05-05 10:10:10".to_string())
        );
    }

    #[test]
    fn test_date_errors() {
        let (mut model, _) = stored(json!({"id": 1, "name": "Ada"}));
        assert!(model.date("created_at").unwrap().is_none());
        assert!(matches!(
            model.date("name"),
            Err(QueryError::Domain(DomainError::NotADateAttribute(_)))
        ));
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(model.set_date("name", &now).is_err());
    }

    #[test]
    fn test_reserved_attribute() {
        let (resource, _) = resource_with(ScriptedDriver::new());
        assert!(matches!(
            resource.make(attrs(json!({"__attributes": {}}))),
            Err(QueryError::Domain(DomainError::InvalidAttribute(_)))
        ));
        let mut model = resource.new_model();
        assert!(model.set_attribute("__attributes", 1).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let (source, _) = stored(json!({"id": 1, "name": "Ada", "meta": {"tags": ["a"]}}));
        let mut copy = source.clone();
        copy.set_attribute("name", "Grace").unwrap();
        copy.set_attribute("meta", json!({"tags": ["b"]})).unwrap();
        copy.reset();
        copy.set_attribute("extra", 1).unwrap();

        assert_eq!(source.get_attribute("name"), Some(json!("Ada")));
        assert_eq!(source.get_attribute("meta"), Some(json!({"tags": ["a"]})));
        assert_eq!(source.get_attribute("extra"), None);

        let mut source = source;
        source.set_attribute("name", "Lin").unwrap();
        assert_eq!(copy.get_attribute("name"), Some(json!("Ada")));
        assert_eq!(copy.exists(), source.exists());
    }

    #[tokio::test]
    async fn test_save_new_model_inserts() {
        let (mut model, driver) = marcus();
        driver.respond_ok(json!({
            "id": 5,
            "first_name": "Marcus",
            "created_at": "2024-01-01 00:00:00"
        }));

        model.save().await.unwrap();

        let sent = &driver.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "https://api.example.com/users/store");
        assert_eq!(sent.body, Some(json!({"id": 5, "first_name": "Marcus"})));
        assert!(model.exists());
        assert!(!model.is_syncing());
        assert!(model.dirty().is_empty());
        assert_eq!(
            model.get_attribute("created_at"),
            Some(json!("2024-01-01 00:00:00"))
        );
    }

    #[tokio::test]
    async fn test_save_existing_model_updates_dirty_and_key() {
        let (mut model, driver) = stored(json!({"id": 8, "first_name": "Ada", "last_name": "L"}));
        model.set_attribute("first_name", "Augusta").unwrap();
        driver.respond_ok(json!({"data": [{"id": 8, "first_name": "Augusta", "last_name": "L"}]}));

        model.save().await.unwrap();

        let sent = &driver.requests()[0];
        assert_eq!(sent.url, "https://api.example.com/users/update?filters[id][]=8");
        assert_eq!(sent.body, Some(json!({"first_name": "Augusta", "id": 8})));
        assert!(!model.is_dirty());
        assert_eq!(model.original().get("first_name"), Some(&json!("Augusta")));
    }

    #[tokio::test]
    async fn test_save_validation_failure_keeps_edits() {
        let (mut model, driver) = stored(json!({"id": 8, "first_name": "Ada"}));
        model.set_attribute("first_name", "").unwrap();
        driver.respond(remodel_domain::HttpResponse::new(
            422,
            json!({"errors": {"first_name": ["required"]}}),
        ));

        let error = model.save().await.unwrap_err();

        assert!(error.is_validation());
        assert!(!model.is_syncing());
        assert_eq!(model.get_attribute("first_name"), Some(json!("")));
        assert!(model.is_dirty());
    }

    #[tokio::test]
    async fn test_delete_success() {
        let (mut model, driver) = stored(json!({"id": 3, "name": "Ada"}));
        driver.respond_ok(json!([{"id": 3, "name": "Ada", "deleted_at": "2024-01-01 00:00:00"}]));

        model.delete_model().await.unwrap();

        assert_eq!(
            driver.last_url(),
            "https://api.example.com/users/delete?filters[id][]=3"
        );
        assert!(!model.is_syncing());
        assert!(!model.exists());
        assert_eq!(
            model.get_attribute("deleted_at"),
            Some(json!("2024-01-01 00:00:00"))
        );
    }

    #[tokio::test]
    async fn test_refused_delete_resets_attributes() {
        for code in [422u16, 403] {
            let (mut model, driver) = stored(json!({"id": 3, "name": "Ada"}));
            model.set_attribute("name", "Changed").unwrap();
            model.set_attribute("local", true).unwrap();
            driver.respond_status(code);

            let error = model.delete_model().await.unwrap_err();

            assert_eq!(error.status().map(|s| s.as_u16()), Some(code));
            assert!(!model.is_syncing());
            assert!(model.exists());
            assert_eq!(model.to_json(), json!({"id": 3, "name": "Ada"}));
        }
    }

    #[tokio::test]
    async fn test_server_error_on_delete_keeps_attributes() {
        let (mut model, driver) = stored(json!({"id": 3, "name": "Ada"}));
        model.set_attribute("name", "Changed").unwrap();
        driver.respond_status(500);

        assert!(model.delete_model().await.is_err());
        assert_eq!(model.get_attribute("name"), Some(json!("Changed")));
    }

    /// Never answers, so the caller's future must be dropped.
    struct StalledDriver;

    #[async_trait::async_trait]
    impl crate::ports::HttpDriver for StalledDriver {
        async fn execute(
            &self,
            _request: remodel_domain::HttpRequest,
        ) -> Result<(), crate::ports::DriverError> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    fn stalled(value: Value) -> Model {
        let resource = Resource::new(
            ModelSchema::new("/users"),
            Arc::new(StalledDriver),
            Arc::new(remodel_domain::ClientSettings::new("https://api.example.com")),
        );
        Model::from_existing(resource, attrs(value)).unwrap()
    }

    #[tokio::test]
    async fn test_dropped_save_clears_syncing() {
        let mut model = stalled(json!({"id": 3, "name": "Ada"}));
        model.set_attribute("name", "Changed").unwrap();

        let elapsed = tokio::time::timeout(Duration::from_millis(10), model.save()).await;

        assert!(elapsed.is_err());
        assert!(!model.is_syncing());
        assert_eq!(model.get_attribute("name"), Some(json!("Changed")));
    }

    #[tokio::test]
    async fn test_dropped_delete_clears_syncing() {
        let mut model = stalled(json!({"id": 3, "name": "Ada"}));

        let elapsed =
            tokio::time::timeout(Duration::from_millis(10), model.delete_model()).await;

        assert!(elapsed.is_err());
        assert!(!model.is_syncing());
        assert!(model.exists());
    }
}
