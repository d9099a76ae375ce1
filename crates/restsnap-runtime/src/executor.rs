use std::time::{Duration, Instant};

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Request};
use restsnap_config::ComparisonMode;
use restsnap_core::{
    BlobKind, CaseName, CapturedResponse, RequestSpec, ResponseHeaders, ResponseMeta, TestCase,
};

use crate::error::{RuntimeError, RuntimeResult};
use crate::storage::Storage;

/// Loads cases from storage, sends them, and persists what comes back
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    storage: Storage,
    mode: ComparisonMode,
}

impl HttpExecutor {
    /// Create an executor; `timeout` bounds each request end to end.
    pub fn new(storage: Storage, mode: ComparisonMode, timeout: Option<Duration>) -> RuntimeResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            storage,
            mode,
        })
    }

    /// Read the spec blob and the optional body blob of a case
    pub async fn load_case(&self, name: &CaseName) -> RuntimeResult<TestCase> {
        let raw = self.storage.read_text(BlobKind::Spec, name).await?;
        let spec = RequestSpec::from_json(&raw)
            .map_err(|e| RuntimeError::invalid_spec(name, e.to_string()))?;

        // GET requests usually don't have a body file
        let body = if self.storage.exists(BlobKind::Body, name).await? {
            self.storage.read_bytes(BlobKind::Body, name).await?
        } else {
            Vec::new()
        };

        Ok(TestCase::from_spec(name.clone(), spec, body))
    }

    /// Send the case and persist the capture before returning it
    pub async fn execute(&self, case: &TestCase) -> RuntimeResult<CapturedResponse> {
        let request = self.build_request(case)?;
        tracing::debug!(
            case = %case.name,
            method = %request.method(),
            url = %request.url(),
            body_bytes = case.body.len(),
            "sending request"
        );

        let started = Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| RuntimeError::http(&case.name, e))?;

        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), header_text(value)))
            .collect();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RuntimeError::http(&case.name, e))?;
        let body = self
            .storage
            .encoding()
            .decode(&bytes)
            .map_err(|e| RuntimeError::Decode { case: case.name.clone(), message: e.to_string() })?;

        tracing::debug!(
            case = %case.name,
            status,
            body_bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        let captured = CapturedResponse { status, headers, body };
        self.persist(&case.name, &captured).await?;
        Ok(captured)
    }

    fn build_request(&self, case: &TestCase) -> RuntimeResult<Request> {
        let method = Method::from_bytes(case.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| RuntimeError::invalid_spec(&case.name, format!("Invalid HTTP method: {}", case.method)))?;
        let url = reqwest::Url::parse(&case.uri)
            .map_err(|e| RuntimeError::invalid_spec(&case.name, format!("Invalid URI '{}': {}", case.uri, e)))?;

        let mut request_builder = self.client.request(method, url);

        if let Some(headers) = &case.headers {
            for (key, value) in headers {
                let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    RuntimeError::invalid_spec(&case.name, format!("Invalid header name `{}`: {}", key, e))
                })?;
                let header_value = HeaderValue::from_str(value).map_err(|e| {
                    RuntimeError::invalid_spec(&case.name, format!("Invalid header value `{}`: {}", value, e))
                })?;
                request_builder = request_builder.header(header_name, header_value);
            }
        }

        if !case.body.is_empty() {
            request_builder = request_builder.body(case.body.clone());
        }

        request_builder
            .build()
            .map_err(|e| RuntimeError::invalid_spec(&case.name, e.to_string()))
    }

    async fn persist(&self, name: &CaseName, captured: &CapturedResponse) -> RuntimeResult<()> {
        self.storage
            .write_text(BlobKind::Capture, name, &captured.body)
            .await?;
        if self.mode == ComparisonMode::Full {
            let meta = ResponseMeta::from_capture(captured).to_pretty_json()?;
            self.storage.write_text(BlobKind::CaptureMeta, name, &meta).await?;
        }
        Ok(())
    }
}

/// Header bytes read as latin-1, so every byte survives as one character
fn header_text(value: &HeaderValue) -> String {
    value.as_bytes().iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use restsnap_core::{Area, BlobPath, SuffixLayout, TextEncoding};
    use restsnap_store::MemoryBlobStore;
    use std::sync::Arc;

    fn executor(store: &MemoryBlobStore) -> HttpExecutor {
        let storage = Storage::new(
            Arc::new(store.clone()),
            SuffixLayout::default(),
            TextEncoding::Utf8,
        );
        HttpExecutor::new(storage, ComparisonMode::Full, None).unwrap()
    }

    #[tokio::test]
    async fn load_case_defaults_to_empty_body() {
        let store = MemoryBlobStore::new();
        store
            .insert(
                BlobPath::new(Area::Requests, "list.prm"),
                r#"{"Method": "GET", "URI": "http://localhost/items", "Headers": {"Accept": "text/plain"}}"#,
            )
            .await;
        let case = executor(&store).load_case(&"list".into()).await.unwrap();
        assert_eq!(case.method, "GET");
        assert!(case.body.is_empty());
        assert_eq!(case.headers.unwrap()["Accept"], "text/plain");
    }

    #[tokio::test]
    async fn load_case_reads_raw_body() {
        let store = MemoryBlobStore::new();
        store
            .insert(BlobPath::new(Area::Requests, "create.prm"), r#"{"Type": "post", "URI": "http://h/x"}"#)
            .await;
        store.insert(BlobPath::new(Area::Requests, "create.cnt"), r#"{"id":1}"#).await;
        let case = executor(&store).load_case(&"create".into()).await.unwrap();
        assert_eq!(case.body, br#"{"id":1}"#.to_vec());
    }

    #[tokio::test]
    async fn malformed_spec_is_fatal() {
        let store = MemoryBlobStore::new();
        store.insert(BlobPath::new(Area::Requests, "broken.prm"), "{not json").await;
        store
            .insert(BlobPath::new(Area::Requests, "partial.prm"), r#"{"URI": "http://h/"}"#)
            .await;
        let exec = executor(&store);
        assert!(matches!(
            exec.load_case(&"broken".into()).await,
            Err(RuntimeError::InvalidSpec { .. })
        ));
        assert!(matches!(
            exec.load_case(&"partial".into()).await,
            Err(RuntimeError::InvalidSpec { .. })
        ));
    }

    #[test]
    fn build_request_normalizes_method_and_rejects_bad_input() {
        let store = MemoryBlobStore::new();
        let exec = executor(&store);
        let mut case = TestCase {
            name: "c".into(),
            method: "patch".to_string(),
            uri: "http://localhost:9/p".to_string(),
            headers: None,
            body: b"x".to_vec(),
        };
        let request = exec.build_request(&case).unwrap();
        assert_eq!(request.method(), Method::PATCH);
        assert!(request.body().is_some());

        case.uri = "not a url".to_string();
        assert!(matches!(exec.build_request(&case), Err(RuntimeError::InvalidSpec { .. })));

        case.uri = "http://localhost:9/p".to_string();
        case.method = "BAD METHOD".to_string();
        assert!(matches!(exec.build_request(&case), Err(RuntimeError::InvalidSpec { .. })));
    }

    #[test]
    fn header_bytes_decode_as_latin1() {
        let value = HeaderValue::from_bytes(&[0x63, 0x61, 0x66, 0xe9]).unwrap();
        assert_eq!(header_text(&value), "caf\u{e9}");
        assert_eq!(header_text(&HeaderValue::from_static("text/plain")), "text/plain");
    }
}
