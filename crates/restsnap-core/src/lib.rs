pub mod encoding;
pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use encoding::TextEncoding;
pub use error::{CoreError, CoreResult};
pub use store::{BlobStore, WriteMode};
pub use types::{
    Area, BlobKey, BlobKind, BlobPath, CaseName, CapturedResponse, RequestSpec, ResponseHeaders,
    ResponseMeta, SuffixLayout, TestCase, ERROR_LOG_FILE,
};
