pub mod error;
pub mod loader;
pub mod settings;

// Re-export commonly used types
pub use error::{ConfigError, ConfigResult};
pub use loader::{ComparisonMode, ConfigFile, DirsSection, FileFormat};
pub use settings::{ConfigOverrides, RunConfig};
