use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};

/// Name of a test case, taken from the base name of its spec file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseName(pub String);

impl CaseName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One of the four directories a run works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Area {
    Requests,
    Responses,
    Samples,
    Errors,
}

impl Area {
    pub const ALL: [Area; 4] = [Area::Requests, Area::Responses, Area::Samples, Area::Errors];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Requests => "requests",
            Area::Responses => "responses",
            Area::Samples => "samples",
            Area::Errors => "errors",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of per-case blob. Replaces suffix concatenation in business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobKind {
    /// Request parameters (`Method`, `URI`, `Headers`)
    Spec,
    /// Raw request body
    Body,
    /// Captured response body
    Capture,
    /// Captured status and headers
    CaptureMeta,
    /// Golden response body
    Sample,
    /// Golden status and headers
    SampleMeta,
}

impl BlobKind {
    pub fn area(&self) -> Area {
        match self {
            BlobKind::Spec | BlobKind::Body => Area::Requests,
            BlobKind::Capture | BlobKind::CaptureMeta => Area::Responses,
            BlobKind::Sample | BlobKind::SampleMeta => Area::Samples,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    pub kind: BlobKind,
    pub name: CaseName,
}

impl BlobKey {
    pub fn new(kind: BlobKind, name: CaseName) -> Self {
        Self { kind, name }
    }
}

/// Resolved storage location: an area plus a file name inside it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobPath {
    pub area: Area,
    pub file: String,
}

impl BlobPath {
    pub fn new(area: Area, file: impl Into<String>) -> Self {
        Self { area, file: file.into() }
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.area, self.file)
    }
}

pub const ERROR_LOG_FILE: &str = "errors.txt";

/// File suffixes for each blob kind. Defaults follow the historic layout
/// (`.prm` parameters, `.cnt` contents, `.snh` status and headers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuffixLayout {
    pub spec: String,
    pub body: String,
    pub capture: String,
    pub capture_meta: String,
    pub sample: String,
    pub sample_meta: String,
    pub error_log: String,
}

impl Default for SuffixLayout {
    fn default() -> Self {
        Self {
            spec: "prm".to_string(),
            body: "cnt".to_string(),
            capture: "cnt".to_string(),
            capture_meta: "snh".to_string(),
            sample: "cnt".to_string(),
            sample_meta: "snh".to_string(),
            error_log: ERROR_LOG_FILE.to_string(),
        }
    }
}

impl SuffixLayout {
    pub fn suffix(&self, kind: BlobKind) -> &str {
        match kind {
            BlobKind::Spec => &self.spec,
            BlobKind::Body => &self.body,
            BlobKind::Capture => &self.capture,
            BlobKind::CaptureMeta => &self.capture_meta,
            BlobKind::Sample => &self.sample,
            BlobKind::SampleMeta => &self.sample_meta,
        }
    }

    pub fn resolve(&self, key: &BlobKey) -> BlobPath {
        BlobPath::new(
            key.kind.area(),
            format!("{}.{}", key.name.as_str(), self.suffix(key.kind)),
        )
    }

    pub fn error_log(&self) -> BlobPath {
        BlobPath::new(Area::Errors, self.error_log.clone())
    }

    /// Case name for `file` if it carries the extension of `kind`.
    /// Only a terminal `.<suffix>` counts; an empty stem is rejected.
    pub fn case_name(&self, kind: BlobKind, file: &str) -> Option<CaseName> {
        let stem = file.strip_suffix(self.suffix(kind))?.strip_suffix('.')?;
        if stem.is_empty() {
            None
        } else {
            Some(CaseName::new(stem))
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let entries = [
            ("spec", &self.spec),
            ("body", &self.body),
            ("capture", &self.capture),
            ("capture_meta", &self.capture_meta),
            ("sample", &self.sample),
            ("sample_meta", &self.sample_meta),
            ("error_log", &self.error_log),
        ];
        for (field, value) in entries {
            if value.is_empty() {
                return Err(CoreError::Invalid(format!("suffix '{}' must not be empty", field)));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(CoreError::Invalid(format!(
                    "suffix '{}' must not contain a path separator: {}",
                    field, value
                )));
            }
        }
        if self.capture == self.capture_meta {
            return Err(CoreError::Invalid(
                "capture and capture_meta suffixes must differ".to_string(),
            ));
        }
        if self.sample == self.sample_meta {
            return Err(CoreError::Invalid(
                "sample and sample_meta suffixes must differ".to_string(),
            ));
        }
        if self.spec == self.body {
            return Err(CoreError::Invalid("spec and body suffixes must differ".to_string()));
        }
        Ok(())
    }
}

/// On-disk request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequestSpec")]
pub struct RequestSpec {
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "URI")]
    pub uri: String,
    #[serde(rename = "Headers", default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl RequestSpec {
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// `Method` wins; the legacy `Type` key is read only when `Method` is absent.
#[derive(Deserialize)]
struct RawRequestSpec {
    #[serde(rename = "Method", default)]
    method: Option<String>,
    #[serde(rename = "Type", default)]
    legacy_type: Option<String>,
    #[serde(rename = "URI")]
    uri: String,
    #[serde(rename = "Headers", default)]
    headers: Option<BTreeMap<String, String>>,
}

impl TryFrom<RawRequestSpec> for RequestSpec {
    type Error = CoreError;

    fn try_from(raw: RawRequestSpec) -> Result<Self, Self::Error> {
        let method = raw
            .method
            .or(raw.legacy_type)
            .ok_or_else(|| CoreError::Invalid("missing field `Method`".to_string()))?;
        Ok(Self {
            method,
            uri: raw.uri,
            headers: raw.headers,
        })
    }
}

/// A fully loaded test case, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: CaseName,
    pub method: String,
    pub uri: String,
    pub headers: Option<BTreeMap<String, String>>,
    pub body: Vec<u8>,
}

impl TestCase {
    pub fn from_spec(name: CaseName, spec: RequestSpec, body: Vec<u8>) -> Self {
        Self {
            name,
            method: spec.method,
            uri: spec.uri,
            headers: spec.headers,
            body,
        }
    }
}

/// Response headers with case-insensitive names. Names are stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders(BTreeMap<String, String>);

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; a repeated name joins values with `", "`.
    pub fn append(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = ResponseHeaders::new();
        for (k, v) in iter {
            headers.append(k.as_ref(), v.as_ref());
        }
        headers
    }
}

/// The response actually received for a case during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub headers: ResponseHeaders,
    pub body: String,
}

/// Status and headers record, shared by captures and samples.
///
/// Members are loosely typed so hand-edited samples with unexpected value
/// types simply fail to match instead of aborting the run. `null` reads as
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(rename = "Headers", default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, JsonValue>>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JsonValue>,
}

impl ResponseMeta {
    pub fn from_capture(response: &CapturedResponse) -> Self {
        Self {
            headers: Some(
                response
                    .headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), JsonValue::String(v.to_string())))
                    .collect(),
            ),
            status: Some(JsonValue::from(response.status)),
        }
    }

    pub fn from_json(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Sorted keys, four-space indentation, non-ASCII characters escaped so
    /// the record is representable in every supported encoding.
    pub fn to_pretty_json(&self) -> CoreResult<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut ser)?;
        let text = String::from_utf8(out).map_err(|e| CoreError::Encode(e.to_string()))?;
        Ok(escape_non_ascii(&text))
    }
}

// Non-ASCII can only occur inside JSON strings, so escaping every such
// character keeps the document valid.
fn escape_non_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
