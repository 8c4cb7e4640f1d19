mod basic;
mod client;
pub mod auth;
#[cfg(test)]
pub(crate) mod mock;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Response, Url};

/// Sends an already-encoded JSON `body` as a POST through `client`.
///
/// Only transport failures are errors; the caller inspects the status.
pub async fn post_json<C: HttpClient>(
    client: &C,
    url: Url,
    body: Vec<u8>,
) -> reqwest::Result<Response> {
    let mut req = Request::new(Method::POST, url);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(body.into());

    client.execute(req).await
}
