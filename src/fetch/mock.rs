//! In-memory [`HttpClient`] for exercising request and response handling.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use std::sync::Mutex;

use super::HttpClient;

/// What the client saw of one request.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Answers every request with the same canned status and body.
pub struct RecordingClient {
    status: u16,
    body: String,
    sent: Mutex<Vec<SentRequest>>,
}

impl RecordingClient {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.sent.lock().unwrap().push(SentRequest {
            method: req.method().clone(),
            url: req.url().clone(),
            headers: req.headers().clone(),
            body: req
                .body()
                .and_then(|b| b.as_bytes())
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
        });

        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(Response::from(resp))
    }
}
