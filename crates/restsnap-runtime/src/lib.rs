pub mod catalog;
pub mod comparator;
pub mod error;
pub mod executor;
pub mod reporter;
pub mod runner;
pub mod storage;

// Re-export commonly used types
pub use catalog::CaseCatalog;
pub use comparator::{compare_meta, Mismatch, SampleComparator, Verdict};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::HttpExecutor;
pub use reporter::{outcome_line, ConsoleReporter, MemoryReporter, Reporter};
pub use runner::{CaseResult, RunReport, SnapshotRunner};
pub use storage::Storage;
