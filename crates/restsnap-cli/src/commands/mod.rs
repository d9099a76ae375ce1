pub mod list;
pub mod run;

// Re-export command handlers
pub use list::ListCommand;
pub use run::{RunCommand, RunOutcome};
