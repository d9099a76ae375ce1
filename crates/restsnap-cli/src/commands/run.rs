//! Run command: execute all cases and compare against samples

use crate::{
    cli::RunArgs,
    error::CliResult,
    utils::{format_duration, ColoredOutput},
};
use restsnap_config::{ConfigFile, RunConfig};
use restsnap_runtime::{ConsoleReporter, Reporter, RunReport, SnapshotRunner};
use tracing::debug;

/// What a finished run means for the process
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    /// Whether the error log exists after the run
    pub failures_recorded: bool,
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        if self.failures_recorded {
            1
        } else {
            0
        }
    }
}

pub struct RunCommand;

impl RunCommand {
    pub async fn run(args: &RunArgs) -> CliResult<RunOutcome> {
        let config = Self::resolve_config(args)?;
        let mut reporter = ConsoleReporter;
        let outcome = Self::execute(&config, &mut reporter).await?;
        Self::print_summary(&outcome.report);
        Ok(outcome)
    }

    pub fn resolve_config(args: &RunArgs) -> CliResult<RunConfig> {
        let file = match &args.config {
            Some(path) => Some(ConfigFile::load(path)?),
            None => None,
        };
        let config = RunConfig::resolve(file, args.overrides())?;
        debug!("Resolved run configuration: {:?}", config);
        Ok(config)
    }

    /// Run against resolved settings, reporting through `reporter`
    pub async fn execute(config: &RunConfig, reporter: &mut dyn Reporter) -> CliResult<RunOutcome> {
        let runner = SnapshotRunner::open(config).await?;
        let report = runner.run(reporter).await?;
        let failures_recorded = runner.storage().read_error_log().await?.is_some();
        Ok(RunOutcome {
            report,
            failures_recorded,
        })
    }

    fn print_summary(report: &RunReport) {
        let counts = format!(
            "{} cases: {} passed, {} failed, {} new samples",
            report.total(),
            report.passed(),
            report.failed(),
            report.bootstrapped()
        );
        let counts = if report.all_passed() {
            ColoredOutput::success(&counts)
        } else {
            ColoredOutput::error(&counts)
        };
        eprintln!(
            "{} {}",
            counts,
            ColoredOutput::dim(&format!("({})", format_duration(report.duration_ms)))
        );
        for name in report.failed_names() {
            eprintln!("  {} {}", ColoredOutput::warning("failed:"), name);
        }
    }
}
