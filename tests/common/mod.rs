#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use trello_cards::{Credentials, RestContext, RestResponse, Result, Transport};

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

struct Route {
    method: Method,
    fragment: String,
    response: RestResponse,
}

/// In-memory transport answering from canned routes and recording calls.
///
/// The first route whose method matches and whose fragment occurs in the
/// URL wins; unmatched requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, method: Method, fragment: &str, status: u16, body: impl Into<String>) {
        self.routes.lock().unwrap().push(Route {
            method,
            fragment: fragment.to_string(),
            response: RestResponse::new(status, body),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, url: &str, method: Method, body: Option<&Value>) -> Result<RestResponse> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            url: url.to_string(),
            body: body.cloned(),
        });

        let routes = self.routes.lock().unwrap();
        let response = routes
            .iter()
            .find(|r| r.method == method && url.contains(&r.fragment))
            .map(|r| r.response.clone())
            .unwrap_or_else(|| RestResponse::new(404, "no route"));
        Ok(response)
    }
}

pub fn context(mock: &Arc<MockTransport>) -> RestContext {
    RestContext::with_transport(Credentials::new("K", "T"), mock.clone())
}
