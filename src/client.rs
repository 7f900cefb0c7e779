// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Blocking REST client for the e-commerce backend.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The base URL or request path does not form a valid URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Why it failed to parse.
        #[source]
        source: url::ParseError,
    },
    /// The backend answered with a 4xx/5xx status.
    #[error("API error from {method} {path}: HTTP {status}")]
    Status {
        /// HTTP method.
        method: &'static str,
        /// Request path.
        path: String,
        /// Status code.
        status: u16,
    },
    /// The request could not be sent or the response not read.
    #[error("{method} {path} failed: {source}")]
    Transport {
        /// HTTP method.
        method: &'static str,
        /// Request path.
        path: String,
        /// Underlying transport error.
        #[source]
        source: ureq::Error,
    },
    /// The request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// REST client bound to one backend base URL.
///
/// Requests carry no credentials unless made through a client obtained from
/// [`RestClient::with_token`].
#[derive(Debug, Clone)]
pub struct RestClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
    use_token: bool,
}

impl RestClient {
    /// Creates a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Url::parse(base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            use_token: false,
        })
    }

    /// Returns a copy of this client that sends the bearer token.
    #[must_use]
    pub fn with_token(&self) -> Self {
        Self {
            use_token: true,
            ..self.clone()
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends `GET {base}{path}?{query}` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the request fails, or the
    /// backend answers with an error status.
    pub fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        let url = self.url(path, query)?;
        let mut request = self
            .agent
            .get(url.as_str())
            .header("Content-Type", "application/json");
        if let Some(token) = self.bearer() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        Self::finish("GET", path, &url, request.call())
    }

    /// Sends `POST {base}{path}` with an optional JSON body and returns the
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the body cannot be encoded,
    /// the request fails, or the backend answers with an error status.
    pub fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<String, ApiError> {
        let url = self.url(path, &[])?;
        let mut request = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json");
        if let Some(token) = self.bearer() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let result = match body {
            Some(body) => request.send(&serde_json::to_string(body)?),
            None => request.send_empty(),
        };
        Self::finish("POST", path, &url, result)
    }

    fn bearer(&self) -> Option<&str> {
        if self.use_token {
            self.token.as_deref()
        } else {
            None
        }
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|source| ApiError::InvalidUrl { url: raw, source })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn finish(
        method: &'static str,
        path: &str,
        url: &Url,
        result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<String, ApiError> {
        match result {
            Ok(mut response) => {
                debug!("REST API call: {} {} -> {}", method, url, response.status());
                response
                    .body_mut()
                    .read_to_string()
                    .map_err(|source| ApiError::Transport {
                        method,
                        path: path.to_string(),
                        source,
                    })
            }
            Err(ureq::Error::StatusCode(status)) => {
                debug!("REST API call: {} {} -> {}", method, url, status);
                Err(ApiError::Status {
                    method,
                    path: path.to_string(),
                    status,
                })
            }
            Err(source) => {
                debug!("REST API call: {} {} failed: {}", method, url, source);
                Err(ApiError::Transport {
                    method,
                    path: path.to_string(),
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> Result<RestClient> {
        Ok(RestClient::new(
            &server.uri(),
            token.map(str::to_string),
            Duration::from_secs(5),
        )?)
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() -> Result<()> {
        let client = RestClient::new("http://shop.test/api/v1/", None, Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://shop.test/api/v1");
        Ok(())
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = RestClient::new("not a url", None, Duration::from_secs(1)).err();
        assert!(matches!(err, Some(ApiError::InvalidUrl { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_get_with_query() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server, None)?.get(
            "/products",
            &[("limit", "20".to_string()), ("offset", "0".to_string())],
        )?;
        assert_eq!(body, "{\"ok\":true}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_error_status() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server, None)?.get("/products/9", &[]).err();
        assert!(matches!(err, Some(ApiError::Status { status: 404, .. })));
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("API error from GET /products/9: HTTP 404")
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_token_only_sent_when_requested() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let plain = client(&server, Some("secret"))?;
        plain.get("/cart", &[])?;
        plain.with_token().get("/cart", &[])?;

        let requests = server
            .received_requests()
            .await
            .context("request recording disabled")?;
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].headers.contains_key("authorization"));
        let auth = requests[1]
            .headers
            .get("authorization")
            .context("missing authorization header")?;
        assert_eq!(auth.to_str()?, "Bearer secret");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_token_is_never_sent() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        client(&server, Some(""))?.with_token().get("/cart", &[])?;

        let requests = server
            .received_requests()
            .await
            .context("request recording disabled")?;
        assert!(!requests[0].headers.contains_key("authorization"));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_json_body() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/cart/items"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "product_id": 3, "quantity": 2 })))
            .respond_with(ResponseTemplate::new(201).set_body_string("{\"success\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server, None)?.post(
            "/cart/items",
            Some(&json!({ "product_id": 3, "quantity": 2 })),
        )?;
        assert_eq!(body, "{\"success\":true}");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_without_body() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server, None)?.post::<()>("/orders", None)?;
        Ok(())
    }
}
