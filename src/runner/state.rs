use serde::{Deserialize, Serialize};

/// One recorded check outcome; never mutated once logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// "Tasks (admin)"
    pub test: String,
    pub area: String,
    pub role: String,
    pub success: bool,
    pub message: String,
    pub details: Option<String>,
    /// RFC 3339, local time
    pub timestamp: String,
}

impl TestResult {
    pub fn new(
        test: &str,
        area: &str,
        role: &str,
        success: bool,
        message: String,
        details: Option<String>,
    ) -> Self {
        Self {
            test: test.to_string(),
            area: area.to_string(),
            role: role.to_string(),
            success,
            message,
            details,
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl TestSummary {
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    /// Percentage of passed results; 0 when nothing ran
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Full run for persisted reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub session_id: String,
    pub title: String,
    pub base_url: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
}

impl TestReport {
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
