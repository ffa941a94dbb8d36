//! Drives the reqwest adapter against a one-shot local HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use remodel_application::{Builder, QueryError, Resource};
use remodel_domain::{ClientSettings, ModelSchema};
use remodel_infrastructure::ReqwestDriver;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one response and returns the raw request it received.
async fn serve_once(status: &'static str, body: Value) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;

        let payload = body.to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{payload}",
            payload.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        raw
    });

    (base_url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    let header_end = loop {
        let read = socket.read(&mut chunk).await.unwrap();
        assert!(read > 0, "connection closed before headers ended");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(position) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break position + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
    let content_length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map_or(0, |value| value.trim().parse::<usize>().unwrap());

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    String::from_utf8(buffer).unwrap()
}

fn resource(base_url: &str) -> Resource {
    let settings = ClientSettings::new(base_url);
    let driver = ReqwestDriver::new(&settings).unwrap();
    Resource::new(
        ModelSchema::new("/users"),
        Arc::new(driver),
        Arc::new(settings),
    )
}

#[tokio::test]
async fn get_sends_query_string_and_hydrates_models() {
    let (base_url, server) =
        serve_once("200 OK", json!({"data": [{"id": 1, "name": "Ada"}]})).await;

    let mut builder = Builder::new(resource(&base_url));
    builder.filter("active", json!(true));
    let collection = builder.get().await.unwrap();

    let raw = server.await.unwrap();
    assert!(
        raw.starts_with("GET /users?filters[active][]=true&limit=15&page=1 HTTP/1.1"),
        "unexpected request line: {raw}"
    );
    assert!(raw.to_lowercase().contains("accept: application/json"));

    assert_eq!(collection.len(), 1);
    let model = collection.first().unwrap();
    assert!(model.exists());
    assert_eq!(model.get_attribute("name"), Some(json!("Ada")));
}

#[tokio::test]
async fn store_posts_json_body() {
    let (base_url, server) =
        serve_once("200 OK", json!({"data": {"id": 7, "name": "Grace"}})).await;

    let resource = resource(&base_url);
    let mut model = resource.new_model();
    model.set_attribute("name", json!("Grace")).unwrap();
    model.save().await.unwrap();

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /users/store HTTP/1.1"), "{raw}");
    assert!(raw.ends_with(r#"{"name":"Grace"}"#), "{raw}");

    assert!(model.exists());
    assert_eq!(model.key(), Some(json!(7)));
    assert!(!model.is_dirty());
}

#[tokio::test]
async fn validation_failure_reaches_caller_with_body() {
    let (base_url, server) = serve_once(
        "422 Unprocessable Entity",
        json!({"message": "Name is required"}),
    )
    .await;

    let error = Builder::new(resource(&base_url)).get().await.unwrap_err();
    server.await.unwrap();

    assert!(error.is_validation());
    assert_eq!(error.user_message(), "Name is required");
}

#[tokio::test]
async fn unreachable_host_is_a_driver_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let error = Builder::new(resource(&base_url)).get().await.unwrap_err();
    assert!(matches!(error, QueryError::Driver(_)), "{error:?}");
}
