//! HTTP implementation of the FitSearch API client
//!
//! Wraps every request with a per-attempt deadline, retry with
//! exponential backoff, and context-appropriate auth headers. URL shape
//! is delegated to the injected [`ExecutionContext`].

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{
    CompatibleProducts, ErrorBody, FitmentCheck, Make, MakesResponse, Model, ModelsResponse,
    ProductRef, Submodel, SubmodelsResponse, Year, YearsResponse,
};
use super::{VehicleApi, VehicleQuery, INITIAL_BACKOFF, MAX_RETRIES, REQUEST_TIMEOUT};
use crate::context::ExecutionContext;
use crate::error::{ApiError, Result};

/// FitSearch API client over HTTP
pub struct FitmentClient {
    http: HttpClient,
    context: ExecutionContext,
    admin_token: Option<String>,
    request_timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
}

impl FitmentClient {
    /// Create a client for the given execution context.
    ///
    /// `admin_token` is attached as a bearer header only when the context
    /// is the embedded admin.
    pub fn new(context: ExecutionContext, admin_token: Option<String>) -> Result<Self> {
        // Per-request timeouts are set on each attempt, not on the client,
        // so a retry gets a fresh deadline.
        let http = HttpClient::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            context,
            admin_token,
            request_timeout: REQUEST_TIMEOUT,
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    /// Override the per-attempt deadline (tests)
    #[cfg(test)]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the retry budget and initial backoff (tests)
    #[cfg(test)]
    pub fn with_retry(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Build the full URL for an endpoint, appending query parameters
    /// before the context adds its own `shop` parameter.
    fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return self.context.api_url(path);
        }

        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    k,
                    url::form_urlencoded::byte_serialize(v.as_bytes()).collect::<String>()
                )
            })
            .collect();

        self.context.api_url(&format!("{}?{}", path, query.join("&")))
    }

    /// GET a JSON body with retry and exponential backoff.
    ///
    /// Transport failures and 5xx responses are retried up to the budget,
    /// doubling the delay between attempts. Timeouts and 400-class
    /// responses are terminal. A successful body that fails to parse is
    /// terminal as well.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint_url(path, params);
        let mut delay = self.initial_backoff;
        let mut attempt = 1;

        loop {
            debug!("GET {} (attempt {}/{})", url, attempt, self.max_retries);

            match self.attempt(&url).await {
                Ok(body) => {
                    return serde_json::from_slice(&body).map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
                    });
                }
                Err(err) => {
                    if !err.is_retryable() || attempt >= self.max_retries {
                        return Err(err.into());
                    }

                    warn!("Request failed ({}), retrying in {:?}", err, delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }

    /// Perform a single attempt and classify the outcome
    async fn attempt(&self, url: &str) -> std::result::Result<Vec<u8>, ApiError> {
        let mut request = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json");

        if self.context.wants_admin_auth() {
            if let Some(token) = &self.admin_token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        if status.is_success() {
            let body = response.bytes().await.map_err(ApiError::from)?;
            return Ok(body.to_vec());
        }

        // Failure bodies are `{"error": "..."}`; fall back to raw text
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or_else(|_| text.clone());

        match status {
            StatusCode::BAD_REQUEST => Err(ApiError::BadRequest(message)),
            _ => Err(ApiError::Http {
                status: status.as_u16(),
                body: message,
            }),
        }
    }
}

#[async_trait]
impl VehicleApi for FitmentClient {
    async fn list_makes(&self) -> Result<Vec<Make>> {
        let response: MakesResponse = self.get_json("/api/vehicle/makes", &[]).await?;
        Ok(response.makes)
    }

    async fn list_models(&self, make_id: &str) -> Result<Vec<Model>> {
        let params = [("makeId", make_id.to_string())];
        let response: ModelsResponse = self.get_json("/api/vehicle/models", &params).await?;
        Ok(response.models)
    }

    async fn list_years(&self, model_id: &str) -> Result<Vec<Year>> {
        let params = [("modelId", model_id.to_string())];
        let response: YearsResponse = self.get_json("/api/vehicle/years", &params).await?;
        Ok(response.years)
    }

    async fn list_submodels(&self, year_id: &str) -> Result<Vec<Submodel>> {
        let params = [("yearId", year_id.to_string())];
        let response: SubmodelsResponse = self.get_json("/api/vehicle/submodels", &params).await?;
        Ok(response.submodels)
    }

    async fn check_fitment(
        &self,
        product: &ProductRef,
        query: &VehicleQuery,
    ) -> Result<FitmentCheck> {
        let (key, value) = product.query_pair();
        let mut params = vec![(key, value.to_string())];
        params.extend(query.query_pairs());

        self.get_json("/api/fitment/check", &params)
            .await
            .map_err(|err| match err {
                crate::error::Error::Api(ApiError::Http { status: 404, .. }) => {
                    ApiError::ProductNotFound(product.to_string()).into()
                }
                other => other,
            })
    }

    async fn compatible_products(
        &self,
        query: &VehicleQuery,
        page: usize,
        limit: usize,
    ) -> Result<CompatibleProducts> {
        let mut params = query.query_pairs();
        params.push(("page", page.to_string()));
        params.push(("limit", limit.to_string()));

        self.get_json("/api/products/compatible", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn dev_context(base: &str) -> ExecutionContext {
        ExecutionContext::new(ContextKind::Dev, None, "vehicle-search-widget")
            .with_base(base.to_string())
    }

    fn admin_context(base: &str) -> ExecutionContext {
        ExecutionContext::new(
            ContextKind::Admin,
            Some("demo.myshopify.com".to_string()),
            "vehicle-search-widget",
        )
        .with_base(base.to_string())
    }

    /// Serve a fixed sequence of statuses, one connection per request,
    /// recording the arrival instant of each attempt. Used for retry
    /// sequencing, which mockito cannot express.
    async fn spawn_sequence_server(
        statuses: Vec<u16>,
        body: &'static str,
    ) -> (String, Arc<AtomicUsize>, Arc<std::sync::Mutex<Vec<Instant>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(std::sync::Mutex::new(Vec::new()));

        let hits_clone = hits.clone();
        let times_clone = times.clone();
        tokio::spawn(async move {
            for status in statuses {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                times_clone.lock().unwrap().push(Instant::now());
                hits_clone.fetch_add(1, Ordering::SeqCst);

                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits, times)
    }

    #[tokio::test]
    async fn test_list_makes_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vehicle/makes")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"makes":[{"id":"mk1","name":"Toyota"},{"id":"mk2","name":"Honda"}]}"#)
            .create_async()
            .await;

        let client = FitmentClient::new(dev_context(&server.url()), None).unwrap();
        let makes = client.list_makes().await.unwrap();

        mock.assert_async().await;
        assert_eq!(makes.len(), 2);
        assert_eq!(makes[0].name, "Toyota");
    }

    #[tokio::test]
    async fn test_models_request_carries_make_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vehicle/models")
            .match_query(mockito::Matcher::UrlEncoded(
                "makeId".into(),
                "mk1".into(),
            ))
            .with_status(200)
            .with_body(r#"{"models":[{"id":"m1","name":"Camry","makeId":"mk1"}]}"#)
            .create_async()
            .await;

        let client = FitmentClient::new(dev_context(&server.url()), None).unwrap();
        let models = client.list_models("mk1").await.unwrap();

        mock.assert_async().await;
        assert_eq!(models[0].make_id, "mk1");
    }

    #[tokio::test]
    async fn test_admin_context_sends_bearer_and_shop() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vehicle/makes")
            .match_header("authorization", "Bearer session-token")
            .match_header("accept", "application/json")
            .match_query(mockito::Matcher::UrlEncoded(
                "shop".into(),
                "demo.myshopify.com".into(),
            ))
            .with_status(200)
            .with_body(r#"{"makes":[]}"#)
            .create_async()
            .await;

        let client = FitmentClient::new(
            admin_context(&server.url()),
            Some("session-token".to_string()),
        )
        .unwrap();
        client.list_makes().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/vehicle/years")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"modelId parameter is required"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = FitmentClient::new(dev_context(&server.url()), None)
            .unwrap()
            .with_retry(3, Duration::from_millis(10));
        let err = client.list_years("").await.unwrap_err();

        mock.assert_async().await;
        match err {
            crate::error::Error::Api(ApiError::BadRequest(msg)) => {
                assert!(msg.contains("modelId"));
            }
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_fitment_maps_404_to_product_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/fitment/check")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"Product not found"}"#)
            .create_async()
            .await;

        let client = FitmentClient::new(dev_context(&server.url()), None).unwrap();
        let query = VehicleQuery {
            year_id: "y1".to_string(),
            ..Default::default()
        };
        let err = client
            .check_fitment(&ProductRef::Handle("roof-rack".to_string()), &query)
            .await
            .unwrap_err();

        match err {
            crate::error::Error::Api(ApiError::ProductNotFound(p)) => {
                assert_eq!(p, "roof-rack");
            }
            other => panic!("Expected ProductNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_backoff_sequence_two_failures_then_success() {
        let (base, hits, times) =
            spawn_sequence_server(vec![500, 500, 200], r#"{"makes":[]}"#).await;

        let client = FitmentClient::new(dev_context(&base), None).unwrap();
        let makes = client.list_makes().await.unwrap();

        assert!(makes.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        // Delays double: ~500ms then ~1000ms, with scheduling tolerance
        let times = times.lock().unwrap();
        let first_gap = times[1].duration_since(times[0]);
        let second_gap = times[2].duration_since(times[1]);
        assert!(first_gap >= Duration::from_millis(450), "{:?}", first_gap);
        assert!(first_gap < Duration::from_millis(900), "{:?}", first_gap);
        assert!(second_gap >= Duration::from_millis(900), "{:?}", second_gap);
        assert!(second_gap < Duration::from_millis(1800), "{:?}", second_gap);
    }

    #[tokio::test]
    async fn test_retries_exhausted_surfaces_last_error() {
        let (base, hits, _) = spawn_sequence_server(
            vec![500, 500, 500],
            r#"{"error":"Failed to fetch makes"}"#,
        )
        .await;

        let client = FitmentClient::new(dev_context(&base), None)
            .unwrap()
            .with_retry(3, Duration::from_millis(10));
        let err = client.list_makes().await.unwrap_err();

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        match err {
            crate::error::Error::Api(ApiError::Http { status: 500, body }) => {
                assert!(body.contains("Failed to fetch makes"));
            }
            other => panic!("Expected Http 500, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_terminal_not_retried() {
        // Accept connections but never respond
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                hits_clone.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    drop(stream);
                });
            }
        });

        let client = FitmentClient::new(dev_context(&format!("http://{}", addr)), None)
            .unwrap()
            .with_timeout(Duration::from_millis(100))
            .with_retry(3, Duration::from_millis(10));
        let err = client.list_makes().await.unwrap_err();

        match err {
            crate::error::Error::Api(ApiError::Timeout(_)) => (),
            other => panic!("Expected Timeout, got {:?}", other),
        }
        // Give any erroneous retry a moment to show up
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
