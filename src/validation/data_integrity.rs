//! Integrity checks for an observation stream before simulation.
//!
//! Validates:
//! - Non-empty input
//! - Timestamp ordering (non-decreasing)
//! - Price validity (finite, strictly positive)
//! - Duplicate timestamps
//! - Auxiliary reading coverage

use std::collections::HashSet;

use crate::data::Observation;

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    /// A failed blocking check makes the stream unusable for simulation.
    pub blocking: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            blocking: false,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            blocking: true,
            message: message.to_string(),
            details,
        }
    }

    /// A failed check that is reported but does not block a run.
    pub fn warn(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            blocking: false,
            ..Self::fail(name, message, details)
        }
    }
}

/// Complete integrity report for an observation stream.
#[derive(Debug)]
pub struct IntegrityReport {
    pub observation_count: usize,
    pub checks: Vec<CheckResult>,
}

impl IntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Whether the stream can be simulated at all (no blocking check failed).
    pub fn is_simulatable(&self) -> bool {
        self.checks.iter().all(|c| c.passed || !c.blocking)
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let total = self.checks.len();
        format!(
            "{} observations: {}/{} checks passed",
            self.observation_count, passed, total
        )
    }
}

/// Validator for simulator input.
pub struct ObservationValidator;

impl ObservationValidator {
    /// Run all validation checks.
    pub fn validate(observations: &[Observation]) -> IntegrityReport {
        let checks = vec![
            Self::check_non_empty(observations),
            Self::check_ordering(observations),
            Self::check_prices(observations),
            Self::check_duplicates(observations),
            Self::check_aux_coverage(observations),
        ];

        IntegrityReport {
            observation_count: observations.len(),
            checks,
        }
    }

    fn check_non_empty(observations: &[Observation]) -> CheckResult {
        if observations.is_empty() {
            CheckResult::fail("non_empty", "No observations", None)
        } else {
            CheckResult::pass("non_empty", "Observations present")
        }
    }

    fn check_ordering(observations: &[Observation]) -> CheckResult {
        let violations: Vec<_> = observations
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[1].timestamp < w[0].timestamp)
            .map(|(i, w)| format!("#{} {} after {}", i + 1, w[1].timestamp, w[0].timestamp))
            .collect();

        if violations.is_empty() {
            CheckResult::pass("ordering", "Timestamps non-decreasing")
        } else {
            CheckResult::fail(
                "ordering",
                &format!("{} out-of-order observations", violations.len()),
                Some(violations.into_iter().take(5).collect::<Vec<_>>().join(", ")),
            )
        }
    }

    fn check_prices(observations: &[Observation]) -> CheckResult {
        let bad: Vec<_> = observations
            .iter()
            .filter(|o| !o.mid_price.is_finite() || o.mid_price <= 0.0)
            .map(|o| format!("{}: {}", o.timestamp, o.mid_price))
            .collect();

        if bad.is_empty() {
            CheckResult::pass("prices", "All prices finite and positive")
        } else {
            CheckResult::fail(
                "prices",
                &format!("{} invalid prices", bad.len()),
                Some(bad.into_iter().take(5).collect::<Vec<_>>().join(", ")),
            )
        }
    }

    fn check_duplicates(observations: &[Observation]) -> CheckResult {
        let mut seen = HashSet::new();
        let duplicates = observations
            .iter()
            .filter(|o| !seen.insert(o.timestamp))
            .count();

        if duplicates == 0 {
            CheckResult::pass("duplicate_timestamps", "No duplicate timestamps")
        } else {
            CheckResult::warn(
                "duplicate_timestamps",
                &format!("{} duplicate timestamps", duplicates),
                None,
            )
        }
    }

    fn check_aux_coverage(observations: &[Observation]) -> CheckResult {
        let covered = observations
            .iter()
            .filter(|o| o.aux_reading.is_some())
            .count();

        if covered == 0 {
            return CheckResult::warn("aux_coverage", "No aux readings joined", None);
        }

        let pct = covered as f64 / observations.len() as f64 * 100.0;
        CheckResult::pass(
            "aux_coverage",
            &format!("{:.1}% of observations have an aux reading", pct),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 6)
            .unwrap()
            .and_hms_opt(10, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_clean_stream_passes() {
        let observations = vec![
            Observation::new(ts(0), 100.0).with_aux(15.0),
            Observation::new(ts(1), 101.0).with_aux(15.5),
        ];
        let report = ObservationValidator::validate(&observations);
        assert!(report.all_passed());
        assert!(report.is_simulatable());
        assert_eq!(report.summary(), "2 observations: 5/5 checks passed");
    }

    #[test]
    fn test_empty_stream_not_simulatable() {
        let report = ObservationValidator::validate(&[]);
        assert!(!report.is_simulatable());
        assert!(report.failed_checks().iter().any(|c| c.name == "non_empty"));
    }

    #[test]
    fn test_out_of_order_and_bad_price() {
        let observations = vec![
            Observation::new(ts(2), 100.0),
            Observation::new(ts(1), f64::NAN),
            Observation::new(ts(3), -4.0),
        ];
        let report = ObservationValidator::validate(&observations);
        let failed: Vec<_> = report.failed_checks().iter().map(|c| c.name.clone()).collect();

        assert!(failed.contains(&"ordering".to_string()));
        assert!(failed.contains(&"prices".to_string()));
        assert!(!report.is_simulatable());
    }

    #[test]
    fn test_duplicates_and_missing_aux_do_not_block() {
        let observations = vec![
            Observation::new(ts(0), 100.0),
            Observation::new(ts(0), 100.5),
        ];
        let report = ObservationValidator::validate(&observations);

        assert!(!report.all_passed());
        assert_eq!(report.failed_checks().len(), 2);
        assert!(report.failed_checks().iter().all(|c| !c.blocking));
        assert!(report.is_simulatable());
    }

    #[test]
    fn test_simulatable_follows_blocking_flag() {
        let mut report = IntegrityReport {
            observation_count: 3,
            checks: vec![
                CheckResult::pass("non_empty", "Observations present"),
                CheckResult::warn("sparse_session", "Gaps over an hour", None),
            ],
        };
        assert!(!report.all_passed());
        assert!(report.is_simulatable());

        report
            .checks
            .push(CheckResult::fail("duplicate_timestamps", "Rejected", None));
        assert!(!report.is_simulatable());
    }
}
