use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{read_source, Analyzer, ParseError};
use crate::models::{DeclarationKind, DependencyDeclaration, MavenRecord, ParentInfo};

/// Analyzer for Maven `pom.xml` files.
///
/// Extracts the project's own coordinates, `<parent>`, `<properties>`,
/// top-level `<dependencies>` and `<dependencyManagement>`. Dependencies
/// declared under `<build>`, `<profiles>` or plugins are not part of the record.
pub struct MavenAnalyzer;

impl MavenAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for MavenAnalyzer {
    type Record = MavenRecord;

    fn analyze(&self, file_id: &str, path: &Path) -> Result<MavenRecord, ParseError> {
        let content = read_source(path)?;
        parse_pom(file_id, &content)
    }
}

/// Accumulator for the `<dependency>` element being read.
#[derive(Default)]
struct DepAccum {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
    classifier: Option<String>,
}

impl DepAccum {
    fn set(&mut self, field: &str, text: String) {
        let slot = match field {
            "groupId" => &mut self.group_id,
            "artifactId" => &mut self.artifact_id,
            "version" => &mut self.version,
            "scope" => &mut self.scope,
            "classifier" => &mut self.classifier,
            _ => return,
        };
        *slot = Some(text).filter(|t| !t.is_empty());
    }

    fn finish(self) -> DependencyDeclaration {
        DependencyDeclaration {
            group: self.group_id,
            artifact: self.artifact_id,
            version: self.version,
            classifier: self.classifier,
            scope_or_config: self.scope,
            kind: DeclarationKind::Library,
        }
    }
}

/// Parse `pom.xml` content using the quick-xml event API.
pub fn parse_pom(file_id: &str, content: &str) -> Result<MavenRecord, ParseError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut record = MavenRecord {
        file: file_id.to_string(),
        ..Default::default()
    };
    let mut parent = ParentInfo::default();

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut current_dep: Option<DepAccum> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ParseError::Xml {
                path: file_id.to_string(),
                message: e.to_string(),
            })?;

        match event {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                path.push(name);
                text.clear();
                if is_dependency_element(&path) {
                    current_dep = Some(DepAccum::default());
                }
            }
            Event::Empty(ref e) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                path.push(name);
                close_element(&path, String::new(), &mut record, &mut parent, &mut current_dep);
                path.pop();
            }
            Event::Text(ref e) => {
                let unescaped = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(e).into_owned());
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                let value = std::mem::take(&mut text).trim().to_string();
                close_element(&path, value, &mut record, &mut parent, &mut current_dep);
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !parent.is_empty() {
        record.parent = Some(parent);
    }

    Ok(record)
}

fn is_dependency_element(path: &[String]) -> bool {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();
    matches!(
        path.as_slice(),
        ["project", "dependencies", "dependency"]
            | ["project", "dependencyManagement", "dependencies", "dependency"]
    )
}

/// Apply the text of the element at `path`, which is about to close.
fn close_element(
    path: &[String],
    text: String,
    record: &mut MavenRecord,
    parent: &mut ParentInfo,
    current_dep: &mut Option<DepAccum>,
) {
    let path: Vec<&str> = path.iter().map(String::as_str).collect();

    match path.as_slice() {
        ["project", "groupId"] => record.group = Some(text),
        ["project", "artifactId"] => record.artifact = Some(text),
        ["project", "parent", field] => match *field {
            "groupId" => parent.group = Some(text),
            "artifactId" => parent.artifact = Some(text),
            "version" => parent.version = Some(text),
            "relativePath" => parent.relative_path = Some(text),
            _ => {}
        },
        ["project", "properties", key] => record.properties.insert(*key, text),
        ["project", "dependencies", "dependency"] => {
            if let Some(dep) = current_dep.take() {
                record.dependencies.push(dep.finish());
            }
        }
        ["project", "dependencyManagement", "dependencies", "dependency"] => {
            if let Some(dep) = current_dep.take() {
                record.dependency_management.push(dep.finish());
            }
        }
        ["project", "dependencies", "dependency", field]
        | ["project", "dependencyManagement", "dependencies", "dependency", field] => {
            if let Some(dep) = current_dep.as_mut() {
                dep.set(field, text);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>com.starrocks</groupId>
    <artifactId>starrocks-fe</artifactId>
    <version>3.4.0</version>
    <relativePath>../pom.xml</relativePath>
  </parent>
  <artifactId>fe-core</artifactId>
  <properties>
    <kudu.version>1.17.1</kudu.version>
    <skipTests/>
  </properties>
  <dependencies>
    <dependency>
      <groupId>org.apache.kudu</groupId>
      <artifactId>kudu-client</artifactId>
      <version>${kudu.version}</version>
    </dependency>
    <dependency>
      <groupId>com.starrocks</groupId>
      <artifactId>jprotobuf-starrocks</artifactId>
      <classifier>jar-with-dependencies</classifier>
      <scope>provided</scope>
    </dependency>
  </dependencies>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>io.netty</groupId>
        <artifactId>netty-all</artifactId>
        <version>4.1.100.Final</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-shade-plugin</artifactId>
        <dependencies>
          <dependency>
            <groupId>org.ow2.asm</groupId>
            <artifactId>asm</artifactId>
            <version>9.5</version>
          </dependency>
        </dependencies>
      </plugin>
    </plugins>
  </build>
</project>"#;

    #[test]
    fn test_parse_pom() {
        let record = parse_pom("fe/fe-core/pom.xml", POM).unwrap();

        assert_eq!(record.file, "fe/fe-core/pom.xml");
        assert_eq!(record.artifact.as_deref(), Some("fe-core"));
        assert_eq!(record.group, None);

        let parent = record.parent.as_ref().unwrap();
        assert_eq!(parent.group.as_deref(), Some("com.starrocks"));
        assert_eq!(parent.artifact.as_deref(), Some("starrocks-fe"));
        assert_eq!(parent.relative_path.as_deref(), Some("../pom.xml"));

        assert_eq!(record.properties.get("kudu.version"), Some("1.17.1"));
        assert_eq!(record.properties.get("skipTests"), Some(""));

        assert_eq!(record.dependencies.len(), 2);
        assert_eq!(record.dependencies[0].artifact.as_deref(), Some("kudu-client"));
        assert_eq!(record.dependencies[0].version.as_deref(), Some("${kudu.version}"));
        assert_eq!(record.dependencies[0].scope_or_config, None);
        assert_eq!(
            record.dependencies[1].classifier.as_deref(),
            Some("jar-with-dependencies")
        );
        assert_eq!(record.dependencies[1].scope_or_config.as_deref(), Some("provided"));
        assert_eq!(record.dependencies[1].version, None);

        assert_eq!(record.dependency_management.len(), 1);
        assert_eq!(
            record.dependency_management[0].version.as_deref(),
            Some("4.1.100.Final")
        );
    }

    #[test]
    fn test_empty_relative_path_is_kept() {
        let xml = r#"<project>
  <parent><groupId>g</groupId><artifactId>p</artifactId><relativePath/></parent>
</project>"#;
        let record = parse_pom("pom.xml", xml).unwrap();
        assert_eq!(record.parent.unwrap().relative_path.as_deref(), Some(""));
    }

    #[test]
    fn test_no_parent() {
        let xml = "<project><groupId>g</groupId><artifactId>a</artifactId></project>";
        let record = parse_pom("pom.xml", xml).unwrap();
        assert!(record.parent.is_none());
        assert_eq!(record.group.as_deref(), Some("g"));
    }

    #[test]
    fn test_malformed_xml() {
        let xml = "<project><dependencies></project>";
        let err = parse_pom("broken/pom.xml", xml).unwrap_err();
        assert!(matches!(err, ParseError::Xml { .. }));
        assert!(err.to_string().contains("broken/pom.xml"));
    }

    #[test]
    fn test_analyze_file() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", POM).unwrap();
        let record = MavenAnalyzer::new().analyze("pom.xml", f.path()).unwrap();
        assert_eq!(record.dependencies.len(), 2);
        assert_eq!(record.file, "pom.xml");
    }
}
