//! HTTP client for the Performance Monitoring REST API.

use crate::config::Config;
use crate::error::{ApiError, AuthError, Error, RateLimitError};
use crate::monitor::{StderrObserver, TimingObserver};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_ERROR_LIMIT: u32 = 50;
const DEFAULT_HISTORY_LIMIT: u32 = 100;
const DEFAULT_TEST_ERROR_TYPE: &str = "TEST_ERROR";
const DEFAULT_TEST_ERROR_MESSAGE: &str = "Test error from client";
const DEFAULT_LOAD_DURATION_SECS: u32 = 5;
const MAX_LOAD_DURATION_SECS: u32 = 10;

const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Check your API key.";
const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please slow down your requests.";
const NO_RESPONSE_MESSAGE: &str = "Network error: No response received from server.";

/// Performance Monitoring API client.
///
/// Holds only immutable configuration; cloning is cheap and concurrent use
/// requires no synchronization.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    auth_headers: HeaderMap,
    http: HttpClient,
    pub(crate) observer: Arc<dyn TimingObserver>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("auth_headers", &self.auth_headers)
            .field("http", &self.http)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client. Fails if the base URL or API key is missing.
    pub fn new(config: Config) -> Result<Self, Error> {
        Self::with_observer(config, Arc::new(StderrObserver))
    }

    /// Create a client with a custom sink for monitoring diagnostics.
    pub fn with_observer(config: Config, observer: Arc<dyn TimingObserver>) -> Result<Self, Error> {
        config.validate()?;
        let api_key = HeaderValue::from_str(config.api_key())
            .map_err(|_| Error::Config("api_key contains invalid header characters".to_string()))?;
        let user_agent = HeaderValue::from_str(&format!("monitor-cli/{}", crate::VERSION))
            .map_err(|e| Error::RequestSetup(format!("Request failed: {}", e)))?;
        let mut auth_headers = HeaderMap::new();
        auth_headers.insert("X-API-Key", api_key);
        auth_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        auth_headers.insert(USER_AGENT, user_agent);
        let http = HttpClient::builder()
            .timeout(config.timeout_duration())
            .build()
            .map_err(|e| Error::RequestSetup(format!("Request failed: {}", e)))?;
        Ok(Self {
            base_url: config.base_url().to_string(),
            auth_headers,
            http,
            observer,
        })
    }

    /// Check API health. No API key is attached and the response body is
    /// decoded regardless of HTTP status; only transport failures error out.
    pub async fn health_check(&self) -> Result<Value, Error> {
        let url = format!("{}/api/health", self.base_url);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Network error: {}", e)))?;
        let body = res
            .text()
            .await
            .map_err(|e| Error::Network(format!("Network error: {}", e)))?;
        serde_json::from_str(&body).map_err(|e| Error::RequestSetup(format!("Request failed: {}", e)))
    }

    /// Get current system metrics (CPU, memory, disk).
    pub async fn get_metrics(&self) -> Result<Value, Error> {
        let url = format!("{}/api/metrics", self.base_url);
        self.send(self.auth(self.http.get(&url))).await
    }

    /// Get error history. `limit` defaults to 50; `level` filters by
    /// severity (ERROR, WARNING, INFO) and is omitted when `None`.
    pub async fn get_errors(&self, limit: Option<u32>, level: Option<&str>) -> Result<Value, Error> {
        let mut url = format!(
            "{}/api/errors?limit={}",
            self.base_url,
            limit.unwrap_or(DEFAULT_ERROR_LIMIT)
        );
        if let Some(level) = level {
            url.push_str(&format!("&level={}", urlencoding::encode(level)));
        }
        self.send(self.auth(self.http.get(&url))).await
    }

    /// Get performance metrics history. `limit` defaults to 100.
    pub async fn get_performance_history(&self, limit: Option<u32>) -> Result<Value, Error> {
        let url = format!(
            "{}/api/performance?limit={}",
            self.base_url,
            limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
        );
        self.send(self.auth(self.http.get(&url))).await
    }

    /// Get current performance thresholds.
    pub async fn get_thresholds(&self) -> Result<Value, Error> {
        let url = format!("{}/api/thresholds", self.base_url);
        self.send(self.auth(self.http.get(&url))).await
    }

    /// Update performance thresholds, e.g. `{"cpu": 85.0, "memory": 90.0}`.
    /// Values are forwarded as-is; the server owns validation.
    pub async fn update_thresholds(
        &self,
        thresholds: &HashMap<String, f64>,
    ) -> Result<Value, Error> {
        let url = format!("{}/api/thresholds", self.base_url);
        self.send(self.auth(self.http.post(&url).json(thresholds)))
            .await
    }

    /// Log a test error. Defaults: type `TEST_ERROR`, message
    /// "Test error from client".
    pub async fn log_test_error(
        &self,
        error_type: Option<&str>,
        message: Option<&str>,
    ) -> Result<Value, Error> {
        let url = format!("{}/api/test-error", self.base_url);
        let body = json!({
            "type": error_type.unwrap_or(DEFAULT_TEST_ERROR_TYPE),
            "message": message.unwrap_or(DEFAULT_TEST_ERROR_MESSAGE),
        });
        self.send(self.auth(self.http.post(&url).json(&body))).await
    }

    /// Simulate load on the server for testing. `duration` defaults to 5
    /// seconds and is clamped to 10 before transmission; `cpu_intensive`
    /// (default true) picks CPU vs memory load.
    pub async fn simulate_load(
        &self,
        duration: Option<u32>,
        cpu_intensive: Option<bool>,
    ) -> Result<Value, Error> {
        let url = format!("{}/api/simulate-load", self.base_url);
        let body = json!({
            "duration": duration
                .unwrap_or(DEFAULT_LOAD_DURATION_SECS)
                .min(MAX_LOAD_DURATION_SECS),
            "cpu_intensive": cpu_intensive.unwrap_or(true),
        });
        self.send(self.auth(self.http.post(&url).json(&body))).await
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.headers(self.auth_headers.clone())
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, Error> {
        let res = match req.send().await {
            Ok(res) => res,
            Err(e) if e.is_builder() => {
                return Err(Error::RequestSetup(format!("Request failed: {}", e)))
            }
            Err(_) => return Err(Error::Network(NO_RESPONSE_MESSAGE.to_string())),
        };
        let status = res.status();
        match status.as_u16() {
            401 => {
                return Err(Error::Auth(AuthError {
                    message: AUTH_FAILED_MESSAGE.to_string(),
                }))
            }
            429 => {
                return Err(Error::RateLimited(RateLimitError {
                    message: RATE_LIMITED_MESSAGE.to_string(),
                }))
            }
            _ => {}
        }
        let body = res
            .text()
            .await
            .map_err(|_| Error::Network(NO_RESPONSE_MESSAGE.to_string()))?;
        if !status.is_success() {
            let data: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let message = data
                .get("error")
                .and_then(|m| m.as_str())
                .map(String::from)
                .unwrap_or(body);
            return Err(Error::Api(ApiError::new(
                message,
                Some(status.as_u16()),
                Some(data),
            )));
        }
        serde_json::from_str(&body).map_err(|e| Error::RequestSetup(format!("Request failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(uri: &str) -> Client {
        Client::new(Config::new(uri, "pm_test_key")).expect("client")
    }

    #[test]
    fn missing_base_url_is_a_config_error() {
        let err = Client::new(Config::new("", "pm_test_key")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        let err = Client::new(Config::new("http://localhost:5000", "")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn trailing_slash_does_not_double_up_in_paths() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"metrics": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&format!("{}/", server.uri()));
        client.get_metrics().await.expect("metrics");
    }

    #[tokio::test]
    async fn authenticated_requests_carry_the_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/thresholds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"cpu": 80.0})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.get_thresholds().await.expect("thresholds");

        let requests = server.received_requests().await.unwrap();
        let key = requests[0].headers.get("x-api-key").expect("header");
        assert_eq!(key.to_str().unwrap(), "pm_test_key");
        let content_type = requests[0].headers.get("content-type").expect("header");
        assert_eq!(content_type.to_str().unwrap(), "application/json");
    }

    #[tokio::test]
    async fn health_check_sends_no_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "healthy"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let health = client.health_check().await.expect("health");
        assert_eq!(health["status"], "healthy");

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("x-api-key").is_none());
    }

    #[tokio::test]
    async fn get_errors_defaults_limit_and_omits_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/errors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"errors": []})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.get_errors(None, None).await.expect("errors");

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or("");
        assert_eq!(query, "limit=50");
    }

    #[tokio::test]
    async fn get_errors_passes_limit_and_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/errors"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"errors": []})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client
            .get_errors(Some(10), Some("ERROR"))
            .await
            .expect("errors");

        let requests = server.received_requests().await.unwrap();
        let query = requests[0].url.query().unwrap_or("");
        assert_eq!(query, "limit=10&level=ERROR");
    }

    #[tokio::test]
    async fn performance_history_defaults_limit_to_100() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/performance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"metrics": []})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.get_performance_history(None).await.expect("history");

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query().unwrap_or(""), "limit=100");
    }

    #[tokio::test]
    async fn simulate_load_clamps_duration_to_ten() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/simulate-load"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "done"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.simulate_load(Some(50), None).await.expect("load");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["duration"], 10);
        assert_eq!(body["cpu_intensive"], true);
    }

    #[tokio::test]
    async fn log_test_error_applies_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/test-error"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        client.log_test_error(None, None).await.expect("log");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["type"], "TEST_ERROR");
        assert_eq!(body["message"], "Test error from client");
    }

    #[tokio::test]
    async fn update_thresholds_posts_the_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/thresholds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "updated"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let mut thresholds = HashMap::new();
        thresholds.insert("cpu".to_string(), 85.0);
        client
            .update_thresholds(&thresholds)
            .await
            .expect("update");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["cpu"], 85.0);
    }

    #[tokio::test]
    async fn status_401_maps_to_auth_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({"error": "Invalid API key"})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_metrics().await.unwrap_err();
        match err {
            Error::Auth(e) => assert_eq!(e.message, "Authentication failed. Check your API key."),
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_metrics().await.unwrap_err();
        match err {
            Error::RateLimited(e) => {
                assert_eq!(e.message, "Rate limit exceeded. Please slow down your requests.")
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn other_statuses_use_the_body_error_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "Internal server error"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_metrics().await.unwrap_err();
        match err {
            Error::Api(e) => {
                assert_eq!(e.message, "Internal server error");
                assert_eq!(e.status_code, Some(500));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_statuses_without_error_field_use_the_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let err = client.get_metrics().await.unwrap_err();
        match err {
            Error::Api(e) => assert_eq!(e.message, "bad gateway"),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn no_response_maps_to_network_error() {
        // Bind and drop a port so the request fails with ECONNREFUSED.
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(&format!("http://{}", addr));
        let err = client.get_metrics().await.unwrap_err();
        match err {
            Error::Network(msg) => {
                assert_eq!(msg, "Network error: No response received from server.")
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
