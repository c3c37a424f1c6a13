use std::path::Path;

use serde::de::DeserializeOwned;

use super::{read_source, ParseError};
use crate::models::{GradleRecord, MavenRecord};

/// Load a JSON array of Maven records, as written by an external extractor.
pub fn load_maven_records(path: &Path) -> Result<Vec<MavenRecord>, ParseError> {
    load(path)
}

/// Load a JSON array of Gradle records, as written by an external extractor.
pub fn load_gradle_records(path: &Path) -> Result<Vec<GradleRecord>, ParseError> {
    load(path)
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ParseError> {
    let content = read_source(path)?;
    serde_json::from_str(&content).map_err(|source| ParseError::Records {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeclarationKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", json).unwrap();
        f
    }

    #[test]
    fn test_load_maven_records() {
        let f = write_json(
            r#"[
  {
    "file": "fe/fe-core/pom.xml",
    "parent": {"groupId": "com.starrocks", "artifactId": "starrocks-fe", "version": "3.4.0", "relativePath": "../pom.xml"},
    "properties": {"kudu.version": "1.17.1", "skipTests": null},
    "dependencies": [
      {"groupId": "org.apache.kudu", "artifactId": "kudu-client", "version": "${kudu.version}", "scope": null, "classifier": null}
    ],
    "dependency_management": []
  }
]"#,
        );

        let records = load_maven_records(f.path()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.file, "fe/fe-core/pom.xml");
        assert_eq!(
            record.parent.as_ref().unwrap().relative_path.as_deref(),
            Some("../pom.xml")
        );
        assert_eq!(record.properties.get("skipTests"), Some(""));
        assert_eq!(record.dependencies[0].artifact.as_deref(), Some("kudu-client"));
        assert_eq!(record.dependencies[0].kind, DeclarationKind::Library);
    }

    #[test]
    fn test_load_gradle_records() {
        let f = write_json(
            r#"[
  {
    "file": "fe/build.gradle.kts",
    "properties": {"kudu.version": "1.17.1"},
    "dependencies": [
      {"group": "project", "name": ":fe-common", "version": null, "config": "implementation"},
      {"group": "com.azure", "name": "platform(azure-sdk-bom)", "version": "1.2.34", "config": "implementation"},
      {"group": "org.apache.kudu", "name": "kudu-client", "version": "${kudu.version}", "config": "implementation"}
    ]
  }
]"#,
        );

        let records = load_gradle_records(f.path()).unwrap();
        let deps = &records[0].dependencies;
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].kind, DeclarationKind::ProjectModule);
        assert_eq!(
            deps[1].kind,
            DeclarationKind::Platform {
                coordinates: "com.azure:azure-sdk-bom".to_string()
            }
        );
        assert_eq!(deps[2].scope_or_config.as_deref(), Some("implementation"));
    }

    #[test]
    fn test_malformed_records() {
        let f = write_json(r#"{"file": "not an array"}"#);
        let err = load_gradle_records(f.path()).unwrap_err();
        assert!(matches!(err, ParseError::Records { .. }));
    }

    #[test]
    fn test_missing_records_file() {
        let err = load_maven_records(Path::new("/no/such/records.json")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
