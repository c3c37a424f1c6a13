use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::LayoutConfig;

/// A build descriptor found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Path relative to the scan root, `/`-separated. Used as the file id in
    /// records and reports.
    pub id: String,
    pub path: PathBuf,
}

/// Descriptors of both build systems under one project root.
#[derive(Debug, Default)]
pub struct DetectedDescriptors {
    pub maven: Vec<Descriptor>,
    pub gradle: Vec<Descriptor>,
}

impl DetectedDescriptors {
    pub fn is_empty(&self) -> bool {
        self.maven.is_empty() && self.gradle.is_empty()
    }
}

/// Walk `root` and collect Maven and Gradle descriptors by file name,
/// skipping the configured excluded directories. Results are sorted by id.
pub fn detect_descriptors(root: &Path, layout: &LayoutConfig) -> DetectedDescriptors {
    let mut found = DetectedDescriptors::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_dir(e, &layout.exclude_dirs));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let bucket = if name == layout.maven_descriptor.as_str() {
            &mut found.maven
        } else if name == layout.gradle_descriptor.as_str() {
            &mut found.gradle
        } else {
            continue;
        };

        bucket.push(Descriptor {
            id: file_id(root, entry.path()),
            path: entry.path().to_path_buf(),
        });
    }

    found.maven.sort_by(|a, b| a.id.cmp(&b.id));
    found.gradle.sort_by(|a, b| a.id.cmp(&b.id));
    found
}

fn is_excluded_dir(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
    entry.file_type().is_dir()
        && exclude_dirs
            .iter()
            .any(|d| entry.file_name().to_string_lossy() == d.as_str())
}

fn file_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
