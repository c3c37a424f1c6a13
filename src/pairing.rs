//! Pair Maven build files with their Gradle counterparts and run the comparison.
//!
//! A Maven file `dir/pom.xml` pairs with `dir/build.gradle.kts` (descriptor
//! names come from [`LayoutConfig`]). For each pair the Maven side is resolved
//! against its own, its parent's and the root's properties and managed
//! versions; the Gradle side against its own and the root script's properties.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::compare::compare;
use crate::config::{Config, LayoutConfig};
use crate::models::{BuildSystem, GradleRecord, MavenRecord, RunReport};
use crate::normalize::Normalizer;
use crate::resolve::managed::ManagedVersions;
use crate::resolve::property::ScopeChain;

const DEFAULT_RELATIVE_PATH: &str = "../pom.xml";

/// Gradle file id paired with `maven_id`: the last path segment is swapped for
/// the Gradle descriptor name. `None` when `maven_id` is not named after the
/// Maven descriptor.
pub fn gradle_counterpart(maven_id: &str, layout: &LayoutConfig) -> Option<String> {
    let (dir, name) = split_file_id(maven_id);
    if name != layout.maven_descriptor {
        return None;
    }
    Some(join_file_id(dir, &layout.gradle_descriptor))
}

fn split_file_id(id: &str) -> (&str, &str) {
    match id.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", id),
    }
}

fn join_file_id(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Lexically join `relative` onto `dir`, folding `.` and `..` segments.
/// Returns `None` if the path climbs above the scan root.
pub fn normalize_relative(dir: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }
    Some(segments.join("/"))
}

/// Loaded Maven records, addressable by file id.
struct MavenIndex<'r> {
    records: &'r [MavenRecord],
    by_id: HashMap<&'r str, usize>,
}

impl<'r> MavenIndex<'r> {
    fn new(records: &'r [MavenRecord]) -> Self {
        let by_id = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.file.as_str(), i))
            .collect();
        Self { records, by_id }
    }

    fn get(&self, id: &str) -> Option<&'r MavenRecord> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }
}

/// The loaded record `record` inherits from, if any.
///
/// `relativePath` is tried first (default `../pom.xml`, a directory gets the
/// descriptor name appended); an explicitly empty `relativePath` skips it.
/// Otherwise the record whose own coordinates equal the parent's is used.
fn find_parent<'r>(
    record: &MavenRecord,
    index: &MavenIndex<'r>,
    layout: &LayoutConfig,
) -> Option<&'r MavenRecord> {
    let parent = record.parent.as_ref().filter(|p| !p.is_empty())?;

    let relative = parent.relative_path.as_deref().unwrap_or(DEFAULT_RELATIVE_PATH);
    if !relative.trim().is_empty() {
        let (dir, _) = split_file_id(&record.file);
        let relative = relative.trim().trim_end_matches('/');
        let last = relative.rsplit(['/', '\\']).next().unwrap_or(relative);
        let target = if last == layout.maven_descriptor || last.ends_with(".xml") {
            normalize_relative(dir, relative)
        } else {
            normalize_relative(dir, relative).map(|d| join_file_id(&d, &layout.maven_descriptor))
        };
        if let Some(found) = target.as_deref().and_then(|t| index.get(t)) {
            if found.file != record.file {
                return Some(found);
            }
        }
    }

    let (group, artifact) = (parent.group.as_deref()?, parent.artifact.as_deref()?);
    index.records.iter().find(|candidate| {
        candidate.file != record.file
            && candidate.artifact.as_deref() == Some(artifact)
            && effective_group(candidate) == Some(group)
    })
}

/// A Maven project without its own groupId inherits its parent's.
fn effective_group(record: &MavenRecord) -> Option<&str> {
    record
        .group
        .as_deref()
        .or_else(|| record.parent.as_ref().and_then(|p| p.group.as_deref()))
}

/// The configured root file id when it was loaded, otherwise the shallowest
/// loaded id (ties broken lexically).
pub fn find_root<'i>(ids: impl IntoIterator<Item = &'i str>, configured: Option<&str>) -> Option<&'i str> {
    let ids: Vec<&str> = ids.into_iter().collect();
    if let Some(configured) = configured {
        let found = ids.iter().copied().find(|id| *id == configured);
        if found.is_none() {
            warn!("configured root {} was not loaded; continuing without a root", configured);
        }
        return found;
    }
    ids.into_iter()
        .min_by(|a, b| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)))
}

fn depth(id: &str) -> usize {
    id.matches('/').count()
}

fn maven_scopes<'r>(
    record: &'r MavenRecord,
    parent: Option<&'r MavenRecord>,
    root: Option<&'r MavenRecord>,
) -> ScopeChain<'r> {
    ScopeChain::new(&record.properties)
        .with_parent(parent.map(|p| &p.properties))
        .with_root(root.map(|r| &r.properties))
}

/// Managed versions visible from `record`: its own section, then its parent's,
/// then the root's. Each layer is resolved with its owner's properties.
fn managed_versions(
    record: &MavenRecord,
    parent: Option<&MavenRecord>,
    root: Option<&MavenRecord>,
    index: &MavenIndex<'_>,
    layout: &LayoutConfig,
) -> ManagedVersions {
    let mut managed = ManagedVersions::default();
    managed.push_layer(&record.dependency_management, maven_scopes(record, parent, root));

    if let Some(parent) = parent {
        let grandparent = find_parent(parent, index, layout);
        managed.push_layer(&parent.dependency_management, maven_scopes(parent, grandparent, root));
    }

    if let Some(root) = root {
        let already_layered =
            root.file == record.file || parent.is_some_and(|p| p.file == root.file);
        if !already_layered {
            managed.push_layer(&root.dependency_management, ScopeChain::new(&root.properties));
        }
    }

    managed
}

/// Pair every Maven record with its Gradle counterpart and compare them.
///
/// Maven files without a counterpart are listed in [`RunReport::unpaired`].
pub fn reconcile(maven: &[MavenRecord], gradle: &[GradleRecord], config: &Config) -> RunReport {
    let layout = &config.layout;
    let mut report = RunReport::default();

    let index = MavenIndex::new(maven);
    let gradle_by_id: HashMap<&str, &GradleRecord> =
        gradle.iter().map(|g| (g.file.as_str(), g)).collect();

    let maven_root = find_root(maven.iter().map(|m| m.file.as_str()), layout.maven_root.as_deref())
        .and_then(|id| index.get(id));
    let gradle_root = find_root(gradle.iter().map(|g| g.file.as_str()), layout.gradle_root.as_deref())
        .and_then(|id| gradle_by_id.get(id).copied());

    if let Some(root) = maven_root {
        debug!("maven root: {}", root.file);
    }
    if let Some(root) = gradle_root {
        debug!("gradle root: {}", root.file);
    }

    for record in maven {
        let counterpart = gradle_counterpart(&record.file, layout)
            .and_then(|id| gradle_by_id.get(id.as_str()).copied());
        let Some(gradle_record) = counterpart else {
            warn!("no corresponding Gradle file found for {}", record.file);
            report.unpaired.push(record.file.clone());
            continue;
        };

        info!("comparing {} with {}", record.file, gradle_record.file);

        let parent = find_parent(record, &index, layout);
        match (&record.parent, parent) {
            (Some(_), None) => debug!("parent of {} is not among the loaded files", record.file),
            (_, Some(p)) => debug!("parent of {} is {}", record.file, p.file),
            _ => {}
        }

        let managed = managed_versions(record, parent, maven_root, &index, layout);
        if managed.is_empty() {
            debug!("no managed versions visible from {}", record.file);
        }
        let maven_set = Normalizer::new(BuildSystem::Maven, maven_scopes(record, parent, maven_root))
            .with_managed(&managed)
            .normalize_all(&record.dependencies);

        let gradle_scopes =
            ScopeChain::new(&gradle_record.properties).with_root(gradle_root.map(|r| &r.properties));
        let gradle_set =
            Normalizer::new(BuildSystem::Gradle, gradle_scopes).normalize_all(&gradle_record.dependencies);

        report.comparisons.push(compare(
            &record.file,
            &gradle_record.file,
            &maven_set,
            &gradle_set,
            &config.policy,
        ));
    }

    report
}
