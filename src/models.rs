use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which build system a record or declaration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    Maven,
    Gradle,
}

impl std::fmt::Display for BuildSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildSystem::Maven => write!(f, "Maven"),
            BuildSystem::Gradle => write!(f, "Gradle"),
        }
    }
}

/// Property name → raw value, as declared on a single build file.
///
/// Raw values are kept verbatim; indirections such as `${jackson.version}` are
/// only interpreted by [`crate::resolve::property`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyScope(BTreeMap<String, String>);

// Record files write empty elements such as `<skipTests/>` as `null`.
impl<'de> Deserialize<'de> for PropertyScope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(k, v)| (k, v.unwrap_or_default()))
            .collect())
    }
}

impl PropertyScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyScope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Shape of a declaration, decided once when the declaration is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeclarationKind {
    /// An ordinary external library.
    Library,
    /// A BOM import; `coordinates` is the embedded `group:artifact[:version]` text.
    Platform { coordinates: String },
    /// A reference to another module of the same build (`project(":m")`).
    ProjectModule,
}

/// One declared dependency, immutable once produced by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDeclaration")]
pub struct DependencyDeclaration {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
    pub classifier: Option<String>,
    /// Maven scope (`compile`, `test`, ...) or Gradle configuration (`implementation`, ...).
    pub scope_or_config: Option<String>,
    pub kind: DeclarationKind,
}

impl DependencyDeclaration {
    pub fn library(group: &str, artifact: &str, version: Option<&str>) -> Self {
        Self {
            group: Some(group.to_string()),
            artifact: Some(artifact.to_string()),
            version: version.map(str::to_string),
            classifier: None,
            scope_or_config: None,
            kind: DeclarationKind::Library,
        }
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope_or_config = Some(scope.to_string());
        self
    }

    pub fn with_classifier(mut self, classifier: &str) -> Self {
        self.classifier = Some(classifier.to_string());
        self
    }
}

/// Declaration as it appears in record files, before its kind is assigned.
///
/// Accepts both Maven (`groupId`/`artifactId`/`scope`) and Gradle
/// (`group`/`name`/`config`) field names.
#[derive(Debug, Deserialize)]
struct RawDeclaration {
    #[serde(default, alias = "groupId")]
    group: Option<String>,
    #[serde(default, alias = "artifactId", alias = "name")]
    artifact: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
    #[serde(default, alias = "scope", alias = "config")]
    scope_or_config: Option<String>,
    #[serde(default)]
    kind: Option<DeclarationKind>,
}

impl From<RawDeclaration> for DependencyDeclaration {
    fn from(raw: RawDeclaration) -> Self {
        let mut group = raw.group;
        let mut artifact = raw.artifact;

        let kind = match raw.kind {
            Some(kind) => kind,
            None => {
                let platform = artifact
                    .as_deref()
                    .and_then(|a| a.strip_prefix("platform("))
                    .and_then(|a| a.strip_suffix(')'))
                    .map(str::to_string);

                if let Some(inner) = platform {
                    // The record format carries only the artifact inside the
                    // wrapper; the group sits in the outer field.
                    let coordinates = match group.as_deref() {
                        Some(g) if !inner.contains(':') => format!("{}:{}", g, inner),
                        _ => inner.clone(),
                    };
                    artifact = Some(inner);
                    DeclarationKind::Platform { coordinates }
                } else if group.as_deref() == Some("project") {
                    DeclarationKind::ProjectModule
                } else {
                    DeclarationKind::Library
                }
            }
        };

        if matches!(kind, DeclarationKind::ProjectModule) {
            group = Some("project".to_string());
        }

        Self {
            group,
            artifact,
            version: raw.version,
            classifier: raw.classifier,
            scope_or_config: raw.scope_or_config,
            kind,
        }
    }
}

/// `<parent>` linkage of a Maven build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInfo {
    #[serde(default, alias = "groupId")]
    pub group: Option<String>,
    #[serde(default, alias = "artifactId")]
    pub artifact: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, alias = "relativePath")]
    pub relative_path: Option<String>,
}

impl ParentInfo {
    pub fn is_empty(&self) -> bool {
        self.group.is_none()
            && self.artifact.is_none()
            && self.version.is_none()
            && self.relative_path.is_none()
    }
}

/// Parsed contents of one Maven build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MavenRecord {
    pub file: String,
    #[serde(default, alias = "groupId")]
    pub group: Option<String>,
    #[serde(default, alias = "artifactId")]
    pub artifact: Option<String>,
    #[serde(default, deserialize_with = "declared_parent")]
    pub parent: Option<ParentInfo>,
    #[serde(default)]
    pub properties: PropertyScope,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
    #[serde(default)]
    pub dependency_management: Vec<DependencyDeclaration>,
}

// Record files write a missing `<parent>` as `{}`.
fn declared_parent<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<ParentInfo>, D::Error> {
    let parent = Option::<ParentInfo>::deserialize(deserializer)?;
    Ok(parent.filter(|p| !p.is_empty()))
}

/// Parsed contents of one Gradle build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradleRecord {
    pub file: String,
    #[serde(default)]
    pub properties: PropertyScope,
    #[serde(default)]
    pub dependencies: Vec<DependencyDeclaration>,
}

/// A Maven entry with no counterpart in Gradle at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    pub maven_scope: Option<String>,
    pub original_maven_version: String,
}

/// A Gradle entry with no counterpart in Maven at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraEntry {
    pub gradle_config: Option<String>,
    pub original_gradle_version: String,
}

/// Same group:artifact on both sides, different versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionMismatch {
    pub maven: String,
    pub gradle: String,
    pub maven_scope: Option<String>,
    pub gradle_config: Option<String>,
    pub detected_from: BuildSystem,
}

/// Classification of one matched pair of build files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonOutcome {
    pub maven_file: String,
    pub gradle_file: String,
    pub missing_in_gradle: BTreeMap<String, MissingEntry>,
    pub version_mismatch: BTreeMap<String, VersionMismatch>,
    pub only_in_gradle: BTreeMap<String, ExtraEntry>,
}

impl ComparisonOutcome {
    pub fn is_reconciled(&self) -> bool {
        self.missing_in_gradle.is_empty()
            && self.version_mismatch.is_empty()
            && self.only_in_gradle.is_empty()
    }
}

/// A file that could not take part in a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: String,
}

/// Result of a whole run: every compared pair plus what was left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub comparisons: Vec<ComparisonOutcome>,
    pub unpaired: Vec<String>,
    pub skipped: Vec<SkippedFile>,
}

impl RunReport {
    pub fn has_drift(&self) -> bool {
        self.comparisons.iter().any(|c| !c.is_reconciled())
    }
}
