//! JSON reporter
//!
//! Outputs the full ValidationReport as pretty-printed JSON.

use crate::models::ValidationReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &ValidationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_valid() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["verdict"], "fail");
        assert_eq!(parsed["summary"]["errors"], 1);
        assert_eq!(parsed["expectation_source"]["kind"], "built_in");

        let findings = parsed["findings"].as_array().expect("findings array");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0]["severity"], "warning");
        assert_eq!(findings[1]["check"], "state");
    }

    #[test]
    fn test_json_empty_findings() {
        let mut report = test_report();
        report.findings = Default::default();
        report.summary = Default::default();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["findings"].as_array().expect("findings array").len(), 0);
    }
}
