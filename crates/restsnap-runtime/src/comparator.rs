//! Golden sample comparison.
//!
//! Two independent checks run per case:
//!
//! 1. status/headers against the `SampleMeta` record (subset match), skipped
//!    when no such record exists or in body-only mode;
//! 2. body against the `Sample` blob (exact match), bootstrapping the sample
//!    from the capture when it does not exist yet.

use std::fmt;

use restsnap_config::ComparisonMode;
use restsnap_core::{BlobKind, CaseName, ResponseHeaders, ResponseMeta};
use serde_json::Value as JsonValue;

use crate::error::{RuntimeError, RuntimeResult};
use crate::storage::Storage;

/// Why a case failed
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Status {
        expected: JsonValue,
        actual: u16,
    },
    Header {
        name: String,
        expected: JsonValue,
        actual: Option<String>,
    },
    Body,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Status { expected, actual } => {
                write!(f, "status {} does not match sample {}", actual, expected)
            }
            Mismatch::Header { name, expected, actual: Some(actual) } => {
                write!(f, "header '{}' is {:?}, sample expects {}", name, actual, expected)
            }
            Mismatch::Header { name, expected, actual: None } => {
                write!(f, "header '{}' is missing, sample expects {}", name, expected)
            }
            Mismatch::Body => f.write_str("body differs from sample"),
        }
    }
}

/// Outcome of a check, and of a whole case
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed,
    /// No sample existed; the capture became the sample
    Bootstrapped,
    Failed(Mismatch),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        !matches!(self, Verdict::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct SampleComparator {
    storage: Storage,
    mode: ComparisonMode,
}

impl SampleComparator {
    pub fn new(storage: Storage, mode: ComparisonMode) -> Self {
        Self { storage, mode }
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Compare status and headers against the stored record, if any.
    ///
    /// A missing record is not a failure and does not bootstrap one.
    pub async fn check_headers(
        &self,
        name: &CaseName,
        status: u16,
        headers: &ResponseHeaders,
    ) -> RuntimeResult<Verdict> {
        if self.mode == ComparisonMode::BodyOnly {
            return Ok(Verdict::Passed);
        }
        if !self.storage.exists(BlobKind::SampleMeta, name).await? {
            tracing::debug!(case = %name, "no status/header sample, skipping check");
            return Ok(Verdict::Passed);
        }

        let raw = self.storage.read_text(BlobKind::SampleMeta, name).await?;
        let sample = ResponseMeta::from_json(&raw)
            .map_err(|e| RuntimeError::invalid_sample(name, e.to_string()))?;
        Ok(compare_meta(&sample, status, headers))
    }

    /// Compare the capture against the stored body sample, creating the
    /// sample on first encounter. A mismatch never rewrites the sample.
    pub async fn check_body(&self, name: &CaseName, captured_body: &str) -> RuntimeResult<Verdict> {
        if !self.storage.exists(BlobKind::Sample, name).await? {
            self.storage.write_text(BlobKind::Sample, name, captured_body).await?;
            tracing::info!(case = %name, "sample created from capture");
            return Ok(Verdict::Bootstrapped);
        }

        let sample = self.storage.read_text(BlobKind::Sample, name).await?;
        let capture = self.storage.read_text(BlobKind::Capture, name).await?;
        if sample == capture {
            Ok(Verdict::Passed)
        } else {
            Ok(Verdict::Failed(Mismatch::Body))
        }
    }
}

/// Subset match of a stored record against an actual response.
///
/// A present `Status` must equal the actual code. Every key of a present
/// `Headers` must match the actual header of the same name exactly; a
/// `null` value matches only an absent header. Extra actual headers are
/// ignored.
pub fn compare_meta(sample: &ResponseMeta, status: u16, headers: &ResponseHeaders) -> Verdict {
    if let Some(expected) = &sample.status {
        let matches = match expected {
            JsonValue::Number(n) => n.as_f64() == Some(f64::from(status)),
            _ => false,
        };
        if !matches {
            return Verdict::Failed(Mismatch::Status {
                expected: expected.clone(),
                actual: status,
            });
        }
    }

    let Some(expected_headers) = &sample.headers else {
        return Verdict::Passed;
    };

    for (name, expected) in expected_headers {
        let actual = headers.get(name);
        let matches = match expected {
            JsonValue::String(value) => actual == Some(value.as_str()),
            JsonValue::Null => actual.is_none(),
            _ => false,
        };
        if !matches {
            return Verdict::Failed(Mismatch::Header {
                name: name.clone(),
                expected: expected.clone(),
                actual: actual.map(str::to_string),
            });
        }
    }

    Verdict::Passed
}

#[cfg(test)]
mod tests {
    use super::*;
    use restsnap_core::{Area, BlobPath, SuffixLayout, TextEncoding};
    use restsnap_store::MemoryBlobStore;
    use serde_json::json;
    use std::sync::Arc;

    fn actual_headers() -> ResponseHeaders {
        [
            ("Content-Type", "application/json"),
            ("Server", "demo"),
            ("Date", "Mon, 01 Jan 2024 00:00:00 GMT"),
        ]
        .into_iter()
        .collect()
    }

    fn meta(value: JsonValue) -> ResponseMeta {
        serde_json::from_value(value).unwrap()
    }

    fn comparator(mode: ComparisonMode) -> (SampleComparator, MemoryBlobStore) {
        let store = MemoryBlobStore::new();
        let storage = Storage::new(
            Arc::new(store.clone()),
            SuffixLayout::default(),
            TextEncoding::Utf8,
        );
        (SampleComparator::new(storage, mode), store)
    }

    #[test]
    fn header_subset_passes_with_extra_actual_headers() {
        let sample = meta(json!({"Status": 200, "Headers": {"content-type": "application/json"}}));
        assert_eq!(compare_meta(&sample, 200, &actual_headers()), Verdict::Passed);
    }

    #[test]
    fn header_names_match_case_insensitively() {
        let sample = meta(json!({"Headers": {"CONTENT-TYPE": "application/json"}}));
        assert_eq!(compare_meta(&sample, 500, &actual_headers()), Verdict::Passed);
    }

    #[test]
    fn header_values_match_exactly() {
        let sample = meta(json!({"Headers": {"Server": "Demo"}}));
        assert!(matches!(
            compare_meta(&sample, 200, &actual_headers()),
            Verdict::Failed(Mismatch::Header { ref name, actual: Some(_), .. }) if name == "Server"
        ));
    }

    #[test]
    fn missing_header_fails() {
        let sample = meta(json!({"Headers": {"X-Request-Id": "abc"}}));
        assert!(matches!(
            compare_meta(&sample, 200, &actual_headers()),
            Verdict::Failed(Mismatch::Header { actual: None, .. })
        ));
    }

    #[test]
    fn null_header_requires_absence() {
        let sample = meta(json!({"Headers": {"X-Debug": null}}));
        assert_eq!(compare_meta(&sample, 200, &actual_headers()), Verdict::Passed);
        let sample = meta(json!({"Headers": {"Server": null}}));
        assert!(!compare_meta(&sample, 200, &actual_headers()).is_pass());
    }

    #[test]
    fn status_mismatch_fails() {
        let sample = meta(json!({"Status": 200}));
        assert_eq!(
            compare_meta(&sample, 404, &actual_headers()),
            Verdict::Failed(Mismatch::Status { expected: json!(200), actual: 404 })
        );
    }

    #[test]
    fn status_only_sample_passes() {
        let sample = meta(json!({"Status": 201}));
        assert_eq!(compare_meta(&sample, 201, &actual_headers()), Verdict::Passed);
        let sample = meta(json!({"Status": 201.0}));
        assert_eq!(compare_meta(&sample, 201, &actual_headers()), Verdict::Passed);
    }

    #[test]
    fn non_numeric_status_never_matches() {
        let sample = meta(json!({"Status": "200"}));
        assert!(!compare_meta(&sample, 200, &actual_headers()).is_pass());
    }

    #[test]
    fn empty_sample_passes() {
        assert_eq!(compare_meta(&ResponseMeta::default(), 418, &ResponseHeaders::new()), Verdict::Passed);
    }

    #[tokio::test]
    async fn missing_meta_sample_is_vacuous() {
        let (cmp, store) = comparator(ComparisonMode::Full);
        let verdict = cmp.check_headers(&"a".into(), 500, &actual_headers()).await.unwrap();
        assert_eq!(verdict, Verdict::Passed);
        // Not a bootstrap point
        assert_eq!(store.get(&BlobPath::new(Area::Samples, "a.snh")).await, None);
    }

    #[tokio::test]
    async fn malformed_meta_sample_is_fatal() {
        let (cmp, store) = comparator(ComparisonMode::Full);
        store.insert(BlobPath::new(Area::Samples, "a.snh"), "{oops").await;
        let err = cmp.check_headers(&"a".into(), 200, &actual_headers()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidSample { .. }));
    }

    #[tokio::test]
    async fn body_only_mode_ignores_meta_sample() {
        let (cmp, store) = comparator(ComparisonMode::BodyOnly);
        store.insert(BlobPath::new(Area::Samples, "a.snh"), r#"{"Status": 200}"#).await;
        let verdict = cmp.check_headers(&"a".into(), 404, &actual_headers()).await.unwrap();
        assert_eq!(verdict, Verdict::Passed);
    }

    #[tokio::test]
    async fn body_bootstraps_missing_sample() {
        let (cmp, store) = comparator(ComparisonMode::Full);
        let verdict = cmp.check_body(&"a".into(), "hello\n").await.unwrap();
        assert_eq!(verdict, Verdict::Bootstrapped);
        assert_eq!(
            store.get(&BlobPath::new(Area::Samples, "a.cnt")).await,
            Some(b"hello\n".to_vec())
        );
    }

    #[tokio::test]
    async fn body_compares_sample_with_stored_capture() {
        let (cmp, store) = comparator(ComparisonMode::Full);
        store.insert(BlobPath::new(Area::Samples, "a.cnt"), "hello\n").await;
        store.insert(BlobPath::new(Area::Responses, "a.cnt"), "hello\n").await;
        assert_eq!(cmp.check_body(&"a".into(), "hello\n").await.unwrap(), Verdict::Passed);

        // No whitespace normalization
        store.insert(BlobPath::new(Area::Responses, "a.cnt"), "hello").await;
        assert_eq!(
            cmp.check_body(&"a".into(), "hello").await.unwrap(),
            Verdict::Failed(Mismatch::Body)
        );
        assert_eq!(
            store.get(&BlobPath::new(Area::Samples, "a.cnt")).await,
            Some(b"hello\n".to_vec())
        );
    }
}
