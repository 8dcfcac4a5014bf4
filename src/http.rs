use std::future::Future;

use crate::error::Error;
use crate::url_params;

/// A GET request: target URL plus query parameters merged in at send time.
#[derive(Debug, Clone)]
pub struct GetRequest {
    url: String,
    params: Vec<(String, String)>,
}

impl GetRequest {
    /// Create a request for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingUrl`] if `url` is empty.
    pub fn new(url: impl Into<String>) -> Result<Self, Error> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::MissingUrl);
        }
        Ok(Self {
            url,
            params: Vec::new(),
        })
    }

    /// Add one query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Add several query parameters.
    #[must_use]
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Final URL with parameters appended. Parameters already present in the
    /// base URL keep their original value.
    #[must_use]
    pub fn resolved_url(&self) -> String {
        url_params::append_params(
            &self.url,
            self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

/// Raw completed response. The status is not inspected by the fetch helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Single asynchronous GET.
///
/// Futures are not required to be `Send`: everything runs on the browser's
/// event loop.
pub trait Transport {
    /// Issue one GET to a fully resolved URL.
    fn get(&self, url: &str) -> impl Future<Output = Result<RawResponse, Error>>;
}

/// Production transport on top of `reqwest`.
///
/// On `wasm32` reqwest is backed by the browser's `fetch`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, Error> {
        let response = self.http.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Fire-and-forget GET helper: one request per call, no retry, no timeout.
#[derive(Debug, Clone)]
pub struct HttpClient<T> {
    transport: T,
}

impl<T: Transport> HttpClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`.
    ///
    /// Any completed exchange is `Ok`, whatever its HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when the transport itself fails.
    pub async fn get(&self, request: GetRequest) -> Result<RawResponse, Error> {
        let url = request.resolved_url();
        tracing::debug!(url = %redact_token(&url), "GET");
        self.transport.get(&url).await
    }
}

/// Hide the `oauth_token` value when logging a URL.
fn redact_token(url: &str) -> String {
    let Some(start) = url.find("oauth_token=") else {
        return url.to_owned();
    };
    let value_start = start + "oauth_token=".len();
    let value_end = url[value_start..]
        .find(['&', '#'])
        .map_or(url.len(), |i| value_start + i);
    format!("{}***{}", &url[..value_start], &url[value_end..])
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::testing::FakeTransport;

    #[test]
    fn test_empty_url_fails_fast() {
        assert!(matches!(GetRequest::new(""), Err(Error::MissingUrl)));
        assert!(matches!(GetRequest::new("   "), Err(Error::MissingUrl)));
    }

    #[test]
    fn test_params_are_merged_into_url() {
        let request = GetRequest::new("https://api.example.com/search")
            .unwrap()
            .param("limit", 20)
            .params([("m", "foursquare")]);

        assert_eq!(
            request.resolved_url(),
            "https://api.example.com/search?limit=20&m=foursquare"
        );
    }

    #[test]
    fn test_base_url_param_wins() {
        let request = GetRequest::new("https://x/?limit=5")
            .unwrap()
            .param("limit", 20);
        assert_eq!(request.resolved_url(), "https://x/?limit=5");
    }

    #[test]
    fn test_non_success_status_is_still_ok() {
        let transport = FakeTransport::new();
        transport.respond(404, r#"{"meta":{"code":404}}"#);
        let client = HttpClient::new(transport);

        let response = block_on(client.get(GetRequest::new("https://x/").unwrap())).unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(client.transport().requests(), vec!["https://x/".to_string()]);
    }

    #[test]
    fn test_transport_failure_is_error() {
        let transport = FakeTransport::new();
        transport.fail("connection reset");
        let client = HttpClient::new(transport);

        let result = block_on(client.get(GetRequest::new("https://x/").unwrap()));
        assert!(matches!(result, Err(Error::Http(msg)) if msg == "connection reset"));
    }

    #[test]
    fn test_redact_token() {
        assert_eq!(
            redact_token("https://x/?oauth_token=secret&ll=1,2"),
            "https://x/?oauth_token=***&ll=1,2"
        );
        assert_eq!(redact_token("https://x/?oauth_token=secret"), "https://x/?oauth_token=***");
        assert_eq!(redact_token("https://x/"), "https://x/");
    }
}
