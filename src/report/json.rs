use std::path::Path;

use anyhow::{Context, Result};

use crate::models::RunReport;

/// Serialize the report as pretty-printed JSON.
pub fn to_string(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("serializing report")
}

/// Write the JSON report to `path`.
pub fn write(report: &RunReport, path: &Path) -> Result<()> {
    let json = to_string(report)?;
    std::fs::write(path, json).with_context(|| format!("writing report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildSystem, ComparisonOutcome, SkippedFile, VersionMismatch};

    fn sample() -> RunReport {
        let mut outcome = ComparisonOutcome {
            maven_file: "fe/pom.xml".into(),
            gradle_file: "fe/build.gradle.kts".into(),
            ..Default::default()
        };
        outcome.version_mismatch.insert(
            "com.foo:bar".into(),
            VersionMismatch {
                maven: "1.0".into(),
                gradle: "2.0".into(),
                maven_scope: None,
                gradle_config: Some("implementation".into()),
                detected_from: BuildSystem::Maven,
            },
        );
        RunReport {
            comparisons: vec![outcome],
            unpaired: vec!["fe/legacy/pom.xml".into()],
            skipped: vec![SkippedFile {
                file: "fe/broken/pom.xml".into(),
                reason: "Failed to parse XML".into(),
            }],
        }
    }

    #[test]
    fn test_report_shape() {
        let json: serde_json::Value = serde_json::from_str(&to_string(&sample()).unwrap()).unwrap();

        let pair = &json["comparisons"][0];
        assert_eq!(pair["maven_file"], "fe/pom.xml");
        assert_eq!(pair["version_mismatch"]["com.foo:bar"]["detected_from"], "maven");
        assert_eq!(pair["version_mismatch"]["com.foo:bar"]["maven_scope"], serde_json::Value::Null);
        assert!(pair["missing_in_gradle"].as_object().unwrap().is_empty());
        assert_eq!(json["unpaired"][0], "fe/legacy/pom.xml");
        assert_eq!(json["skipped"][0]["file"], "fe/broken/pom.xml");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dependency-comparison-report.json");
        write(&sample(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"only_in_gradle\": {}"));
    }
}
