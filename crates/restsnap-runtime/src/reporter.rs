use crate::runner::CaseResult;

/// Receives each case outcome as soon as it is decided
pub trait Reporter: Send {
    fn case_finished(&mut self, result: &CaseResult);
}

/// Progress line for one case, without trailing newline
pub fn outcome_line(result: &CaseResult) -> String {
    let outcome = if result.passed() { "OK" } else { "FAIL" };
    format!("Test #{} - {}", result.name, outcome)
}

/// Prints one progress line per case to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn case_finished(&mut self, result: &CaseResult) {
        println!("{}", outcome_line(result));
    }
}

/// Collects progress lines in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub lines: Vec<String>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for MemoryReporter {
    fn case_finished(&mut self, result: &CaseResult) {
        self.lines.push(outcome_line(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::{Mismatch, Verdict};

    #[test]
    fn formats_outcome_lines() {
        let ok = CaseResult::new("users".into(), Some(200), Verdict::Bootstrapped);
        let fail = CaseResult::new("orders".into(), Some(500), Verdict::Failed(Mismatch::Body));
        let mut reporter = MemoryReporter::new();
        reporter.case_finished(&ok);
        reporter.case_finished(&fail);
        assert_eq!(reporter.lines, vec!["Test #users - OK", "Test #orders - FAIL"]);
    }
}
