//! Canonical identity keys for declared dependencies.
//!
//! A declaration is turned into a [`CanonicalKey`] (`group:artifact[:version][:classifier]`,
//! wrapped in `platform(...)` for BOM imports) plus a side table of
//! [`DependencyAttributes`]. Two dependencies are the same identity iff their
//! rendered keys are equal; they are the same logical dependency iff their
//! group and artifact are equal.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use tracing::debug;

use crate::models::{BuildSystem, DeclarationKind, DependencyDeclaration};
use crate::resolve::managed::ManagedVersions;
use crate::resolve::property::{self, ReferenceSyntax, Resolution, ScopeChain};

/// Display value for a Maven dependency whose version is decided outside the loaded files.
pub const EXTERNALLY_MANAGED: &str = "N/A (managed by BOM or parent outside this scope)";

/// Display value for a dependency that declares no version at all.
pub const NO_VERSION: &str = "N/A";

/// Declared version of a Maven dependency whose version came from `dependencyManagement`.
pub const FROM_MANAGEMENT: &str = "From Management";

/// Group synthesized for inter-module references.
pub const PROJECT_GROUP: &str = "project";

#[derive(Debug, Clone)]
pub struct CanonicalKey {
    group: String,
    artifact: String,
    version: Option<String>,
    classifier: Option<String>,
    platform: bool,
    rendered: String,
}

impl CanonicalKey {
    pub fn new(
        group: &str,
        artifact: &str,
        version: Option<&str>,
        classifier: Option<&str>,
        platform: bool,
    ) -> Self {
        let mut parts = vec![group, artifact];
        if let Some(v) = version {
            parts.push(v);
        }
        if let Some(c) = classifier {
            parts.push(c);
        }
        let joined = parts.join(":");
        let rendered = if platform {
            format!("platform({})", joined)
        } else {
            joined
        };

        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.map(str::to_string),
            classifier: classifier.map(str::to_string),
            platform,
            rendered,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    pub fn is_platform(&self) -> bool {
        self.platform
    }

    /// `group:artifact`, the prefix used for fallback matching.
    pub fn coordinates(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// `group:artifact[:classifier]`: the logical dependency regardless of version.
    pub fn logical_name(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}:{}:{}", self.group, self.artifact, c),
            None => self.coordinates(),
        }
    }

    pub fn same_coordinates(&self, other: &CanonicalKey) -> bool {
        self.group == other.group && self.artifact == other.artifact
    }
}

impl PartialEq for CanonicalKey {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for CanonicalKey {}

impl Hash for CanonicalKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for CanonicalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Where a dependency's effective version ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionState {
    Literal(String),
    /// A placeholder no scope could satisfy.
    Unresolved(String),
    /// Maven: no explicit version and no managed entry in the loaded files.
    ExternallyManaged,
    Absent,
}

impl VersionState {
    fn from_resolution(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Literal(v) if v.trim().is_empty() => VersionState::Absent,
            Resolution::Literal(v) => VersionState::Literal(v),
            Resolution::Unresolved(p) => VersionState::Unresolved(p),
        }
    }

    pub fn literal(&self) -> Option<&str> {
        match self {
            VersionState::Literal(v) => Some(v),
            _ => None,
        }
    }

    pub fn display(&self) -> &str {
        match self {
            VersionState::Literal(v) | VersionState::Unresolved(v) => v,
            VersionState::ExternallyManaged => EXTERNALLY_MANAGED,
            VersionState::Absent => NO_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyAttributes {
    pub scope_or_config: Option<String>,
    /// The version as written, or a marker when none was written.
    pub original_version: String,
    pub version: VersionState,
    pub module_reference: bool,
}

/// Normalized dependencies of one build file, ordered by canonical key.
pub type NormalizedSet = BTreeMap<CanonicalKey, DependencyAttributes>;

/// Turns declarations of one build file into canonical keys.
pub struct Normalizer<'a> {
    system: BuildSystem,
    scopes: ScopeChain<'a>,
    managed: Option<&'a ManagedVersions>,
}

impl<'a> Normalizer<'a> {
    pub fn new(system: BuildSystem, scopes: ScopeChain<'a>) -> Self {
        Self {
            system,
            scopes,
            managed: None,
        }
    }

    /// Consult `managed` for Maven declarations that omit a version.
    pub fn with_managed(mut self, managed: &'a ManagedVersions) -> Self {
        self.managed = Some(managed);
        self
    }

    fn syntax(&self) -> ReferenceSyntax {
        match self.system {
            BuildSystem::Maven => ReferenceSyntax::Maven,
            BuildSystem::Gradle => ReferenceSyntax::Gradle,
        }
    }

    fn resolve_version(&self, raw: &str) -> VersionState {
        VersionState::from_resolution(property::resolve(raw, self.syntax(), &self.scopes))
    }

    /// Normalize one declaration. Returns `None` when group or artifact is missing.
    pub fn normalize(&self, decl: &DependencyDeclaration) -> Option<(CanonicalKey, DependencyAttributes)> {
        let group = non_empty(decl.group.as_deref())?;
        let artifact = non_empty(decl.artifact.as_deref())?;
        let raw_version = non_empty(decl.version.as_deref());

        let mut attributes = DependencyAttributes {
            scope_or_config: decl.scope_or_config.clone(),
            original_version: raw_version.unwrap_or(NO_VERSION).to_string(),
            version: VersionState::Absent,
            module_reference: false,
        };

        match &decl.kind {
            DeclarationKind::ProjectModule => {
                attributes.module_reference = true;
                let key = CanonicalKey::new(PROJECT_GROUP, artifact, None, None, false);
                Some((key, attributes))
            }
            DeclarationKind::Platform { coordinates } => {
                let mut parts = coordinates.splitn(3, ':');
                let group = parts.next().and_then(|g| non_empty(Some(g))).unwrap_or(group);
                let artifact = parts
                    .next()
                    .and_then(|a| non_empty(Some(a)))
                    .unwrap_or(artifact);

                // An embedded version wins over the outer one.
                attributes.version = match (non_empty(parts.next()), raw_version) {
                    (Some(embedded), _) => {
                        attributes.original_version = embedded.to_string();
                        self.resolve_version(embedded)
                    }
                    (None, Some(outer)) => self.resolve_version(outer),
                    (None, None) => VersionState::Absent,
                };

                let key = CanonicalKey::new(group, artifact, attributes.version.literal(), None, true);
                Some((key, attributes))
            }
            DeclarationKind::Library => {
                let classifier = non_empty(decl.classifier.as_deref());

                attributes.version = match (raw_version, self.managed) {
                    (Some(raw), _) => self.resolve_version(raw),
                    (None, Some(managed)) if self.system == BuildSystem::Maven => {
                        match managed.lookup(group, artifact, classifier) {
                            Some(v) => {
                                attributes.original_version = FROM_MANAGEMENT.to_string();
                                VersionState::Literal(v.to_string())
                            }
                            None => VersionState::ExternallyManaged,
                        }
                    }
                    (None, _) => VersionState::Absent,
                };

                if let VersionState::Unresolved(p) = &attributes.version {
                    debug!("unresolved version '{}' for {}:{}", p, group, artifact);
                }

                let key = CanonicalKey::new(group, artifact, attributes.version.literal(), classifier, false);
                Some((key, attributes))
            }
        }
    }

    /// Normalize every declaration; the first declaration of a duplicated key wins.
    pub fn normalize_all<'d>(
        &self,
        decls: impl IntoIterator<Item = &'d DependencyDeclaration>,
    ) -> NormalizedSet {
        let mut set = NormalizedSet::new();
        for decl in decls {
            let Some((key, attributes)) = self.normalize(decl) else {
                continue;
            };
            if set.contains_key(&key) {
                debug!("duplicate declaration of {} ignored", key);
                continue;
            }
            set.insert(key, attributes);
        }
        set
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
