//! Run orchestration.
//!
//! Cases run strictly one after another in catalog order. Each case is
//! captured, checked, reported and, on failure, appended to the error log
//! before the next one starts. Any fatal error aborts the remaining cases.

use std::sync::Arc;
use std::time::Instant;

use restsnap_config::RunConfig;
use restsnap_core::{BlobStore, CaseName};
use restsnap_store::FsBlobStore;

use crate::catalog::CaseCatalog;
use crate::comparator::{SampleComparator, Verdict};
use crate::error::RuntimeResult;
use crate::executor::HttpExecutor;
use crate::reporter::{outcome_line, Reporter};
use crate::storage::Storage;

/// Outcome of a single case
#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    pub name: CaseName,
    /// Status code received, if the case got that far
    pub status: Option<u16>,
    pub verdict: Verdict,
}

impl CaseResult {
    pub fn new(name: CaseName, status: Option<u16>, verdict: Verdict) -> Self {
        Self { name, status, verdict }
    }

    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub results: Vec<CaseResult>,
    pub duration_ms: u64,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Cases whose body sample was created during this run
    pub fn bootstrapped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.verdict == Verdict::Bootstrapped)
            .count()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failed_names(&self) -> Vec<&CaseName> {
        self.results
            .iter()
            .filter(|r| !r.passed())
            .map(|r| &r.name)
            .collect()
    }
}

#[derive(Debug)]
pub struct SnapshotRunner {
    storage: Storage,
    catalog: CaseCatalog,
    executor: HttpExecutor,
    comparator: SampleComparator,
}

impl SnapshotRunner {
    pub fn new(store: Arc<dyn BlobStore>, config: &RunConfig) -> RuntimeResult<Self> {
        config.validate()?;
        let storage = Storage::new(store, config.layout.clone(), config.encoding);
        Ok(Self {
            catalog: CaseCatalog::new(storage.clone()),
            executor: HttpExecutor::new(storage.clone(), config.mode, config.timeout)?,
            comparator: SampleComparator::new(storage.clone(), config.mode),
            storage,
        })
    }

    /// Runner over the configured directories, creating any that are missing
    pub async fn open(config: &RunConfig) -> RuntimeResult<Self> {
        let store = FsBlobStore::open(config.dirs.clone()).await?;
        Self::new(Arc::new(store), config)
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Execute every case once.
    ///
    /// The error log is removed first, so after the run it exists exactly
    /// when at least one case failed.
    pub async fn run(&self, reporter: &mut dyn Reporter) -> RuntimeResult<RunReport> {
        let started = Instant::now();
        if self.storage.remove_error_log().await? {
            tracing::debug!("removed error log from previous run");
        }

        let cases = self.catalog.list_cases().await?;
        tracing::info!(cases = cases.len(), mode = ?self.comparator.mode(), "starting run");

        let mut report = RunReport::default();
        for name in cases {
            let result = self.run_case(&name).await?;
            reporter.case_finished(&result);
            if let Verdict::Failed(mismatch) = &result.verdict {
                tracing::warn!(case = %name, %mismatch, "case failed");
                self.storage
                    .append_error_line(&format!("{}\n", outcome_line(&result)))
                    .await?;
            }
            report.results.push(result);
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            total = report.total(),
            passed = report.passed(),
            failed = report.failed(),
            bootstrapped = report.bootstrapped(),
            duration_ms = report.duration_ms,
            "run finished"
        );
        Ok(report)
    }

    async fn run_case(&self, name: &CaseName) -> RuntimeResult<CaseResult> {
        let case = self.executor.load_case(name).await?;
        let captured = self.executor.execute(&case).await?;

        let headers = self
            .comparator
            .check_headers(name, captured.status, &captured.headers)
            .await?;
        // A status/header mismatch decides the case; the body is not checked
        // and therefore never bootstrapped.
        let verdict = if headers.is_pass() {
            self.comparator.check_body(name, &captured.body).await?
        } else {
            headers
        };

        Ok(CaseResult::new(name.clone(), Some(captured.status), verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::Mismatch;

    fn result(name: &str, verdict: Verdict) -> CaseResult {
        CaseResult::new(name.into(), Some(200), verdict)
    }

    #[test]
    fn report_counts_outcomes() {
        let report = RunReport {
            results: vec![
                result("a", Verdict::Passed),
                result("b", Verdict::Bootstrapped),
                result("c", Verdict::Failed(Mismatch::Body)),
            ],
            duration_ms: 3,
        };
        assert_eq!(report.total(), 3);
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.bootstrapped(), 1);
        assert!(!report.all_passed());
        assert_eq!(report.failed_names(), vec![&CaseName::new("c")]);
    }

    #[test]
    fn empty_report_passes() {
        assert!(RunReport::default().all_passed());
    }
}
