//! Scripted driver shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use remodel_domain::{
    Attributes, ClientSettings, Headers, HttpMethod, HttpRequest, HttpResponse, ModelSchema,
};
use serde_json::{Value, json};

use crate::ports::{DriverError, HttpDriver, ensure_dispatchable};
use crate::resource::Resource;

/// What the driver saw of one request.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    responses: VecDeque<Option<HttpResponse>>,
    requests: Vec<SentRequest>,
}

/// Answers requests from a queue; an empty queue answers `200 {"data": []}`.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    state: Arc<Mutex<State>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: HttpResponse) {
        self.state.lock().unwrap().responses.push_back(Some(response));
    }

    pub fn respond_ok(&self, body: Value) {
        self.respond(HttpResponse::new(200, body));
    }

    pub fn respond_status(&self, code: u16) {
        self.respond(HttpResponse::new(code, json!({"message": "rejected"})));
    }

    /// The next request is dropped without settling either callback.
    pub fn drop_next(&self) {
        self.state.lock().unwrap().responses.push_back(None);
    }

    pub fn requests(&self) -> Vec<SentRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last_url(&self) -> String {
        self.requests().last().map(|r| r.url.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl HttpDriver for ScriptedDriver {
    async fn execute(&self, request: HttpRequest) -> Result<(), DriverError> {
        ensure_dispatchable(&request)?;
        let next = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(SentRequest {
                method: request.method,
                url: request.url.clone(),
                headers: request.headers.clone(),
                body: request.body.clone(),
            });
            state.responses.pop_front()
        };
        match next {
            Some(Some(response)) => request.resolve(response),
            Some(None) => drop(request),
            None => request.resolve(HttpResponse::new(200, json!({"data": []}))),
        }
        Ok(())
    }
}

/// A `users` resource with a `created_at` date, talking to `driver`.
pub fn resource_with(driver: ScriptedDriver) -> (Resource, ScriptedDriver) {
    let schema = ModelSchema::new("/users").with_dates(["created_at"]);
    let settings = ClientSettings::new("https://api.example.com");
    let resource = Resource::new(schema, Arc::new(driver.clone()), Arc::new(settings));
    (resource, driver)
}

pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}
