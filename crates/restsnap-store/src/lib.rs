pub mod error;
pub mod fs;
pub mod memory;

// Re-export commonly used types
pub use error::{StoreError, StoreResult};
pub use fs::{AreaDirs, FsBlobStore};
pub use memory::MemoryBlobStore;
