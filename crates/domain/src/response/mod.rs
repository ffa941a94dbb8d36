//! HTTP response types

mod status;

pub use status::{HttpResponse, StatusCode};
