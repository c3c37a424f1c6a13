use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::{read_source, Analyzer, ParseError};
use crate::models::{DeclarationKind, DependencyDeclaration, GradleRecord, PropertyScope};
use crate::normalize::PROJECT_GROUP;

/// Analyzer for Gradle Kotlin DSL build scripts (`build.gradle.kts`).
///
/// Extension properties are collected from the whole script; dependency
/// declarations only from `dependencies { }` blocks, one per line.
pub struct GradleAnalyzer;

impl GradleAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for GradleAnalyzer {
    type Record = GradleRecord;

    fn analyze(&self, file_id: &str, path: &Path) -> Result<GradleRecord, ParseError> {
        let content = read_source(path)?;
        Ok(parse_gradle_kts(file_id, &content))
    }
}

/// Body of a Kotlin string literal; `${...}` templates may contain quotes.
macro_rules! kotlin_string {
    () => {
        r#"(?:\$\{[^}]*\}|[^"])+"#
    };
}

/// Matches one declaration: `config(...)` or `config "..."`.
static RE_DECLARATION: OnceLock<Regex> = OnceLock::new();
/// `set("key", "value")` and `set("key", project.ext["other"])`.
static RE_SET: OnceLock<Regex> = OnceLock::new();
/// `val key = "value"` and `val key = project.ext["other"]`.
static RE_VAL: OnceLock<Regex> = OnceLock::new();
/// `extra["key"] = "value"`.
static RE_EXTRA: OnceLock<Regex> = OnceLock::new();
/// `ext { ... }` block body.
static RE_EXT_BLOCK: OnceLock<Regex> = OnceLock::new();
/// `key = "value"` inside an `ext { }` block.
static RE_EXT_ITEM: OnceLock<Regex> = OnceLock::new();
static RE_MAP_FIELD: OnceLock<Regex> = OnceLock::new();

fn re_declaration() -> &'static Regex {
    RE_DECLARATION.get_or_init(|| {
        Regex::new(concat!(
            r#"^\s*(?P<config>[A-Za-z_][\w.-]*)\s*(?:"#,
            r#"\(\s*project\s*\(\s*"(?P<project>[^"]+)"\s*\)\s*\)"#,
            r#"|\(\s*(?:platform|enforcedPlatform)\s*\(\s*"(?P<platform>"#,
            kotlin_string!(),
            r#")"\s*\)\s*\)"#,
            r#"|\(\s*"(?P<coords>"#,
            kotlin_string!(),
            r#")"\s*\)"#,
            r#"|\((?P<map>[^)]*\bname\s*=[^)]*)\)"#,
            r#"|\s+"(?P<single>"#,
            kotlin_string!(),
            r#")""#,
            r#")"#,
        ))
        .expect("declaration pattern is valid")
    })
}

fn re_set() -> &'static Regex {
    RE_SET.get_or_init(|| {
        Regex::new(
            r#"\bset\s*\(\s*"([^"]+)"\s*,\s*(?:"([^"]*)"|(project|rootProject)\.(?:ext|extra)\["([^"]+)"\])\s*\)"#,
        )
        .expect("set pattern is valid")
    })
}

fn re_val() -> &'static Regex {
    RE_VAL.get_or_init(|| {
        Regex::new(
            r#"\bval\s+(\w+)\s*(?::\s*String\s*)?=\s*(?:"([^"]*)"|(project|rootProject)\.(?:ext|extra)\["([^"]+)"\])"#,
        )
        .expect("val pattern is valid")
    })
}

fn re_extra() -> &'static Regex {
    RE_EXTRA.get_or_init(|| {
        Regex::new(r#"\bextra\s*\[\s*"([^"]+)"\s*\]\s*=\s*"([^"]*)""#).expect("extra pattern is valid")
    })
}

fn re_ext_block() -> &'static Regex {
    RE_EXT_BLOCK.get_or_init(|| Regex::new(r"\bext\s*\{([^}]*)\}").expect("ext block pattern is valid"))
}

fn re_ext_item() -> &'static Regex {
    RE_EXT_ITEM.get_or_init(|| {
        Regex::new(r#"(?m)^\s*([\w.]+)\s*=\s*"([^"]*)""#).expect("ext item pattern is valid")
    })
}

fn re_map_field() -> &'static Regex {
    RE_MAP_FIELD.get_or_init(|| {
        Regex::new(r#"\b(group|name|version|classifier)\s*=\s*"([^"]*)""#).expect("map field pattern is valid")
    })
}

/// Parse `build.gradle.kts` content into a record.
pub fn parse_gradle_kts(file_id: &str, content: &str) -> GradleRecord {
    GradleRecord {
        file: file_id.to_string(),
        properties: parse_properties(content),
        dependencies: parse_dependencies(content),
    }
}

fn parse_properties(content: &str) -> PropertyScope {
    let mut properties = PropertyScope::new();

    for caps in re_ext_block().captures_iter(content) {
        for item in re_ext_item().captures_iter(&caps[1]) {
            properties.insert(&item[1], &item[2]);
        }
    }

    // Literal value in group 2, or an extension reference split into owner
    // (group 3) and key (group 4). Project references become `${key}`;
    // root references keep their qualified form so they resolve against the root only.
    let mut assign = |caps: Captures<'_>| {
        let value = match (caps.get(2), caps.get(3), caps.get(4)) {
            (Some(literal), _, _) => literal.as_str().to_string(),
            (None, Some(owner), Some(key)) if owner.as_str() == "rootProject" => {
                format!("rootProject.ext[\"{}\"]", key.as_str())
            }
            (None, _, Some(key)) => format!("${{{}}}", key.as_str()),
            _ => String::new(),
        };
        properties.insert(&caps[1], value);
    };
    re_set().captures_iter(content).for_each(&mut assign);
    re_val().captures_iter(content).for_each(&mut assign);

    for caps in re_extra().captures_iter(content) {
        properties.insert(&caps[1], &caps[2]);
    }

    properties
}

fn parse_dependencies(content: &str) -> Vec<DependencyDeclaration> {
    let mut dependencies = Vec::new();

    let mut brace_depth: i32 = 0;
    let mut in_dependencies_block = false;
    let mut deps_brace_depth: i32 = 0;

    for line in content.lines() {
        let trimmed = line.trim();

        if !in_dependencies_block && trimmed.starts_with("dependencies") && trimmed.contains('{') {
            in_dependencies_block = true;
            deps_brace_depth = brace_depth + 1;
        }

        for ch in line.chars() {
            match ch {
                '{' => brace_depth += 1,
                '}' => {
                    brace_depth -= 1;
                    if in_dependencies_block && brace_depth < deps_brace_depth {
                        in_dependencies_block = false;
                    }
                }
                _ => {}
            }
        }

        if !in_dependencies_block && !trimmed.starts_with("dependencies") {
            continue;
        }
        if trimmed.starts_with("//") {
            continue;
        }

        // `dependencies { implementation("g:a:1") }` opens and closes on one line.
        let declaration = match trimmed.strip_prefix("dependencies") {
            Some(rest) => match rest.split_once('{') {
                Some((_, body)) => body.trim().trim_end_matches('}').trim(),
                None => continue,
            },
            None => trimmed,
        };

        if let Some(decl) = parse_declaration(declaration) {
            dependencies.push(decl);
        }
    }

    dependencies
}

fn parse_declaration(line: &str) -> Option<DependencyDeclaration> {
    let caps = re_declaration().captures(line)?;
    let config = caps.name("config")?.as_str();

    let mut decl = if let Some(project) = caps.name("project") {
        DependencyDeclaration {
            group: Some(PROJECT_GROUP.to_string()),
            artifact: Some(project.as_str().to_string()),
            version: None,
            classifier: None,
            scope_or_config: None,
            kind: DeclarationKind::ProjectModule,
        }
    } else if let Some(platform) = caps.name("platform") {
        let coordinates = platform.as_str();
        let mut parts = coordinates.split(':');
        let group = parts.next()?;
        let artifact = parts.next()?;
        DependencyDeclaration {
            group: Some(group.to_string()),
            artifact: Some(artifact.to_string()),
            version: None,
            classifier: None,
            scope_or_config: None,
            kind: DeclarationKind::Platform {
                coordinates: coordinates.to_string(),
            },
        }
    } else if let Some(coords) = caps.name("coords").or_else(|| caps.name("single")) {
        let parts: Vec<&str> = coords.as_str().split(':').collect();
        if parts.len() < 2 {
            return None;
        }
        DependencyDeclaration {
            group: Some(parts[0].to_string()),
            artifact: Some(parts[1].to_string()),
            version: parts.get(2).map(|v| v.to_string()),
            classifier: parts.get(3).map(|c| c.to_string()),
            scope_or_config: None,
            kind: DeclarationKind::Library,
        }
    } else {
        let map = caps.name("map")?.as_str();
        let mut decl = DependencyDeclaration {
            group: None,
            artifact: None,
            version: None,
            classifier: None,
            scope_or_config: None,
            kind: DeclarationKind::Library,
        };
        for field in re_map_field().captures_iter(map) {
            let value = Some(field[2].to_string());
            match &field[1] {
                "group" => decl.group = value,
                "name" => decl.artifact = value,
                "version" => decl.version = value,
                "classifier" => decl.classifier = value,
                _ => {}
            }
        }
        decl.artifact.as_ref()?;
        decl
    };

    decl.scope_or_config = Some(config.to_string());
    Some(decl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ROOT_SCRIPT: &str = r#"
plugins {
    java
    `maven-publish`
}

allprojects {
    repositories {
        mavenCentral()
        maven { url = uri("https://repository.cloudera.com/repository/public/") }
    }
}

val kotlinVersion = "1.9.0"
val hbaseVersion = project.ext["hbase.version"]
val rootKudu = rootProject.ext["kudu.version"]
extra["jetty.version"] = "9.4.51"

subprojects {
    ext {
        set("kudu.version", "1.17.1")
        set("jackson.version", "2.15.2")
        set("alias.version", project.ext["jackson.version"])
    }

    dependencies {
        implementation(platform("com.azure:azure-sdk-bom:${project.ext["azure.version"]}"))

        constraints {
            implementation("org.apache.kudu:kudu-client:${project.ext["kudu.version"]}")
            implementation("com.google.guava:guava:32.0.1-jre")
            // implementation("commented:out:1.0")
            compileOnly("com.starrocks:jprotobuf-starrocks:1.0.0:jar-with-dependencies")
        }
    }
}

dependencies {
    implementation(project(":fe-common"))
    implementation(group = "org.apache.hadoop", name = "hadoop-common", version = "3.4.1")
    testImplementation "junit:junit:4.13.2"
    antlr("org.antlr:antlr4:4.9.2")
    implementation("commons-cli:commons-cli")
    implementation("org.jetbrains.kotlin:kotlin-stdlib:$kotlinVersion") {
        exclude(group = "org.jetbrains", module = "annotations")
    }
}
"#;

    #[test]
    fn test_parse_properties() {
        let record = parse_gradle_kts("build.gradle.kts", ROOT_SCRIPT);
        let props = &record.properties;

        assert_eq!(props.get("kudu.version"), Some("1.17.1"));
        assert_eq!(props.get("jackson.version"), Some("2.15.2"));
        assert_eq!(props.get("alias.version"), Some("${jackson.version}"));
        assert_eq!(props.get("kotlinVersion"), Some("1.9.0"));
        assert_eq!(props.get("hbaseVersion"), Some("${hbase.version}"));
        assert_eq!(props.get("rootKudu"), Some(r#"rootProject.ext["kudu.version"]"#));
        assert_eq!(props.get("jetty.version"), Some("9.4.51"));
    }

    #[test]
    fn test_parse_dependencies() {
        let record = parse_gradle_kts("build.gradle.kts", ROOT_SCRIPT);
        let deps = &record.dependencies;

        let names: Vec<String> = deps
            .iter()
            .map(|d| format!("{}:{}", d.group.as_deref().unwrap_or("?"), d.artifact.as_deref().unwrap_or("?")))
            .collect();
        assert_eq!(
            names,
            vec![
                "com.azure:azure-sdk-bom",
                "org.apache.kudu:kudu-client",
                "com.google.guava:guava",
                "com.starrocks:jprotobuf-starrocks",
                "project::fe-common",
                "org.apache.hadoop:hadoop-common",
                "junit:junit",
                "org.antlr:antlr4",
                "commons-cli:commons-cli",
                "org.jetbrains.kotlin:kotlin-stdlib",
            ]
        );

        assert_eq!(
            deps[0].kind,
            DeclarationKind::Platform {
                coordinates: r#"com.azure:azure-sdk-bom:${project.ext["azure.version"]}"#.to_string()
            }
        );
        assert_eq!(deps[1].version.as_deref(), Some(r#"${project.ext["kudu.version"]}"#));
        assert_eq!(deps[3].version.as_deref(), Some("1.0.0"));
        assert_eq!(deps[3].classifier.as_deref(), Some("jar-with-dependencies"));
        assert_eq!(deps[3].scope_or_config.as_deref(), Some("compileOnly"));
        assert_eq!(deps[4].kind, DeclarationKind::ProjectModule);
        assert_eq!(deps[5].version.as_deref(), Some("3.4.1"));
        assert_eq!(deps[6].scope_or_config.as_deref(), Some("testImplementation"));
        assert_eq!(deps[6].version.as_deref(), Some("4.13.2"));
        assert_eq!(deps[8].version, None);
        assert_eq!(deps[9].version.as_deref(), Some("$kotlinVersion"));
    }

    #[test]
    fn test_single_line_dependencies_block() {
        let script = r#"
dependencies { implementation("g:a:1") }
project(":fe-core") {
    dependencies { api("g:b:2") }
}
"#;
        let deps = parse_gradle_kts("build.gradle.kts", script).dependencies;
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].artifact.as_deref(), Some("a"));
        assert_eq!(deps[0].version.as_deref(), Some("1"));
        assert_eq!(deps[0].scope_or_config.as_deref(), Some("implementation"));
        assert_eq!(deps[1].artifact.as_deref(), Some("b"));
        assert_eq!(deps[1].scope_or_config.as_deref(), Some("api"));
    }

    #[test]
    fn test_ignores_lines_outside_dependency_blocks() {
        let script = r#"
repositories {
    maven("https://example.com:8443/repo")
}
tasks.register("hello:world:1")
"#;
        assert!(parse_gradle_kts("build.gradle.kts", script).dependencies.is_empty());
    }

    #[test]
    fn test_analyze_file() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", ROOT_SCRIPT).unwrap();
        let record = GradleAnalyzer::new().analyze("fe/build.gradle.kts", f.path()).unwrap();
        assert_eq!(record.file, "fe/build.gradle.kts");
        assert_eq!(record.dependencies.len(), 10);
    }
}
