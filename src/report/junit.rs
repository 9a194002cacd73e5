use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::runner::{TestReport, TestResult};

pub const FILE_NAME: &str = "junit.xml";

/// Generate JUnit XML: one <testsuite> per area, one <testcase> per result
pub fn generate_junit_xml(report: &TestReport) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", report.title.as_str()));
    suites_start.push_attribute(("tests", report.summary.total.to_string().as_str()));
    suites_start.push_attribute(("failures", report.summary.failed.to_string().as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // Areas in first-seen order
    let mut areas: Vec<&str> = Vec::new();
    for result in &report.results {
        if !areas.contains(&result.area.as_str()) {
            areas.push(&result.area);
        }
    }

    for area in areas {
        let cases: Vec<&TestResult> = report.results.iter().filter(|r| r.area == area).collect();
        let failures = cases.iter().filter(|r| !r.success).count();

        let mut suite_start = BytesStart::new("testsuite");
        suite_start.push_attribute(("name", area));
        suite_start.push_attribute(("tests", cases.len().to_string().as_str()));
        suite_start.push_attribute(("failures", failures.to_string().as_str()));
        suite_start.push_attribute(("id", report.session_id.as_str()));
        if let Some(started_at) = &report.started_at {
            suite_start.push_attribute(("timestamp", started_at.as_str()));
        }
        writer.write_event(Event::Start(suite_start))?;

        for case in cases {
            write_test_case(&mut writer, case)?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, result: &TestResult) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    case_start.push_attribute(("name", result.test.as_str()));
    case_start.push_attribute(("classname", result.role.as_str()));
    writer.write_event(Event::Start(case_start))?;

    if result.success {
        if let Some(details) = &result.details {
            writer.write_event(Event::Start(BytesStart::new("system-out")))?;
            writer.write_event(Event::Text(BytesText::new(details)))?;
            writer.write_event(Event::End(BytesEnd::new("system-out")))?;
        }
    } else {
        let mut fail_start = BytesStart::new("failure");
        fail_start.push_attribute(("message", result.message.as_str()));
        fail_start.push_attribute(("type", "CheckFailure"));
        writer.write_event(Event::Start(fail_start))?;
        if let Some(details) = &result.details {
            writer.write_event(Event::Text(BytesText::new(details)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("failure")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file; returns the file path
pub fn write_report(report: &TestReport, output_dir: &Path) -> Result<PathBuf> {
    let xml = generate_junit_xml(report)?;
    let path = output_dir.join(FILE_NAME);
    std::fs::write(&path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TestSummary;

    fn result(test: &str, area: &str, success: bool, message: &str) -> TestResult {
        TestResult::new(
            test,
            area,
            "customer",
            success,
            message.to_string(),
            Some("<html>502 Bad Gateway</html>".to_string()),
        )
    }

    #[test]
    fn test_generate_junit_xml() {
        let results = vec![
            result("Login (customer)", "AUTHENTICATION TESTS", true, "Logged in"),
            result("Tasks (customer)", "TASKS TESTS", true, "Retrieved 2 tasks"),
            result("Task Counts (customer)", "TASKS TESTS", false, "HTTP 502"),
        ];
        let report = TestReport {
            session_id: "test-session".to_string(),
            title: "Portal checks".to_string(),
            base_url: "http://localhost/api".to_string(),
            started_at: Some("2026-01-01T12:00:00+01:00".to_string()),
            finished_at: None,
            summary: TestSummary::from_results(&results),
            results,
        };

        let xml = generate_junit_xml(&report).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="Portal checks" tests="3" failures="1">"#));
        assert!(xml.contains(r#"<testsuite name="TASKS TESTS" tests="2" failures="1""#));
        assert!(xml.contains(r#"<testcase name="Task Counts (customer)" classname="customer">"#));
        assert!(xml.contains(r#"message="HTTP 502""#));
        // Body snippets are escaped
        assert!(xml.contains("&lt;html&gt;502 Bad Gateway&lt;/html&gt;"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = TestReport {
            session_id: "s".to_string(),
            title: "t".to_string(),
            base_url: "u".to_string(),
            started_at: None,
            finished_at: None,
            results: vec![],
            summary: TestSummary::default(),
        };

        let path = write_report(&report, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("junit.xml"));
        let xml = std::fs::read_to_string(path).unwrap();
        assert!(xml.contains(r#"tests="0""#));
    }
}
