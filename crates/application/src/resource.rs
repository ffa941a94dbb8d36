//! A remote resource: model schema, driver and client settings.

use std::fmt;
use std::sync::{Arc, Mutex};

use remodel_domain::{
    Attributes, ClientSettings, DataType, HttpRequest, ModelSchema, StatusCode,
};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::builder::Builder;
use crate::collection::ModelCollection;
use crate::error::{QueryError, QueryResult};
use crate::model::Model;
use crate::ports::HttpDriver;

type Outcome = Result<Value, (Value, StatusCode)>;
type OutcomeSlot = Arc<Mutex<Option<oneshot::Sender<Outcome>>>>;

/// Entry point for one model type.
///
/// Cheap to clone: every part is shared. Builders, models and collections
/// produced from a resource keep a clone of it.
#[derive(Clone)]
pub struct Resource {
    schema: Arc<ModelSchema>,
    driver: Arc<dyn HttpDriver>,
    settings: Arc<ClientSettings>,
}

impl Resource {
    /// Registers a model type against a driver and settings.
    #[must_use]
    pub fn new(
        schema: ModelSchema,
        driver: Arc<dyn HttpDriver>,
        settings: Arc<ClientSettings>,
    ) -> Self {
        Self {
            schema: Arc::new(schema),
            driver,
            settings,
        }
    }

    /// The model schema.
    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// The client settings.
    #[must_use]
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Absolute URL of the resource, without query string.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the base URL and path do not form
    /// a valid URL.
    pub fn url(&self) -> QueryResult<String> {
        Ok(self.settings.resource_url(self.schema.path())?)
    }

    /// Starts a query seeded with the configured limit and page 1.
    #[must_use]
    pub fn query(&self) -> Builder {
        Builder::new(self.clone())
    }

    /// Starts a query with a first constraint.
    #[must_use]
    pub fn filter(&self, filter: impl Into<String>, value: impl Into<Value>) -> Builder {
        let mut builder = self.query();
        builder.filter(filter, value);
        builder
    }

    /// Loads the record whose primary filter matches `id`.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Builder::first`].
    pub async fn find(&self, id: impl Into<Value>) -> QueryResult<Option<Model>> {
        let mut builder = self.filter(self.schema.primary_filter().to_string(), id);
        builder.first().await
    }

    /// Loads every record, ignoring the configured page size.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Builder::get`].
    pub async fn all(&self) -> QueryResult<ModelCollection> {
        let mut builder = self.query();
        builder.without_limit();
        builder.get().await
    }

    /// Creates a model that does not exist on the backend yet.
    #[must_use]
    pub fn new_model(&self) -> Model {
        Model::new(self.clone())
    }

    /// Creates a model that does not exist on the backend yet from attributes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAttribute` for the reserved attribute name.
    pub fn make(&self, attributes: Attributes) -> QueryResult<Model> {
        Model::make(self.clone(), attributes)
    }

    /// Sends a request through the driver and waits for its outcome.
    ///
    /// Configured headers and an `Accept` header are added; the two callback
    /// slots are wired to a channel so the outcome can be awaited.
    pub(crate) async fn send(&self, request: HttpRequest) -> QueryResult<Value> {
        let mut request = request
            .with_data_type(DataType::Json)
            .with_headers(self.settings.headers.iter());
        if !request.headers.contains("Accept") {
            let accept = request.data_type.accept();
            request = request.with_header("Accept", accept);
        }

        let (sender, receiver) = oneshot::channel();
        let slot: OutcomeSlot = Arc::new(Mutex::new(Some(sender)));
        let on_success = Arc::clone(&slot);
        request.on_success(move |body| settle(&on_success, Ok(body)));
        request.on_failure(move |body, status| settle(&slot, Err((body, status))));

        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");
        self.driver.execute(request).await?;

        match receiver.await {
            Ok(Ok(body)) => Ok(body),
            Ok(Err((response, status))) => {
                tracing::warn!(status = status.as_u16(), "request rejected");
                Err(QueryError::Rejected { status, response })
            }
            Err(_) => Err(QueryError::NoResponse),
        }
    }
}

fn settle(slot: &OutcomeSlot, outcome: Outcome) {
    let sender = slot.lock().ok().and_then(|mut guard| guard.take());
    if let Some(sender) = sender {
        // The receiver only disappears when the caller stopped waiting.
        let _ = sender.send(outcome);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("schema", &self.schema)
            .field("base_url", &self.settings.base_url)
            .finish_non_exhaustive()
    }
}
