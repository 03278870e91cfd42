//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use webui_client::{ApiClient, ClientConfig, HttpRequest, HttpResponse, Transport, TransportError};

pub const BASE_URL: &str = "http://lms.test/api/v1";

/// Replays a fixed sequence of outcomes and records every request it sees.
/// Running out of outcomes is a test failure.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: impl IntoIterator<Item = Result<HttpResponse, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", request.method, request.path))
    }
}

pub fn status(code: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse::new(code, body))
}

pub fn refused(message: &str) -> Result<HttpResponse, TransportError> {
    Err(TransportError::new(message))
}

pub fn scripted_client(
    outcomes: impl IntoIterator<Item = Result<HttpResponse, TransportError>>,
) -> ApiClient<ScriptedTransport> {
    ApiClient::with_transport(
        ClientConfig::new(BASE_URL).with_token("tok"),
        ScriptedTransport::new(outcomes),
    )
}

/// Route part of a recorded request, without the base URL.
pub fn route(request: &HttpRequest) -> (String, String) {
    (
        request.method.to_string(),
        request.path.trim_start_matches(BASE_URL).to_string(),
    )
}
