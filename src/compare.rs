use std::collections::HashSet;

use crate::config::PolicyConfig;
use crate::models::{BuildSystem, ComparisonOutcome, ExtraEntry, MissingEntry, VersionMismatch};
use crate::normalize::{CanonicalKey, DependencyAttributes, NormalizedSet};

/// First entry of `set` sharing `key`'s group:artifact, in canonical-key order.
fn same_coordinates<'s>(
    set: &'s NormalizedSet,
    key: &CanonicalKey,
) -> Option<(&'s CanonicalKey, &'s DependencyAttributes)> {
    set.iter().find(|(candidate, _)| candidate.same_coordinates(key))
}

/// Classify one matched pair of normalized dependency sets.
///
/// Pass 1 walks Maven entries (skipping excluded scopes): an exact key match is
/// reconciled, a group:artifact match is a version mismatch, anything else is
/// missing in Gradle. Pass 2 walks Gradle entries (skipping module references,
/// platforms and excluded configurations): an exact key match is reconciled, a
/// group:artifact match with a different version is a mismatch unless pass 1
/// already recorded that pair, anything else is Gradle-only unless its group is
/// ignored. Fallback candidates are taken in canonical-key order.
pub fn compare(
    maven_file: &str,
    gradle_file: &str,
    maven: &NormalizedSet,
    gradle: &NormalizedSet,
    policy: &PolicyConfig,
) -> ComparisonOutcome {
    let mut outcome = ComparisonOutcome {
        maven_file: maven_file.to_string(),
        gradle_file: gradle_file.to_string(),
        ..Default::default()
    };
    let mut mismatched_pairs: HashSet<String> = HashSet::new();

    for (key, attrs) in maven {
        if policy.skips_maven_scope(attrs.scope_or_config.as_deref()) {
            continue;
        }
        if gradle.contains_key(key) {
            continue;
        }

        match same_coordinates(gradle, key) {
            Some((_, gradle_attrs)) => {
                mismatched_pairs.insert(key.coordinates());
                outcome
                    .version_mismatch
                    .entry(key.logical_name())
                    .or_insert_with(|| VersionMismatch {
                        maven: attrs.version.display().to_string(),
                        gradle: gradle_attrs.version.display().to_string(),
                        maven_scope: attrs.scope_or_config.clone(),
                        gradle_config: gradle_attrs.scope_or_config.clone(),
                        detected_from: BuildSystem::Maven,
                    });
            }
            None => {
                outcome.missing_in_gradle.insert(
                    key.to_string(),
                    MissingEntry {
                        maven_scope: attrs.scope_or_config.clone(),
                        original_maven_version: attrs.original_version.clone(),
                    },
                );
            }
        }
    }

    for (key, attrs) in gradle {
        if attrs.module_reference || key.is_platform() {
            continue;
        }
        if policy.skips_gradle_configuration(attrs.scope_or_config.as_deref()) {
            continue;
        }
        if maven.contains_key(key) {
            continue;
        }

        match same_coordinates(maven, key) {
            Some((_, maven_attrs)) => {
                if mismatched_pairs.contains(&key.coordinates()) {
                    continue;
                }
                let maven_version = maven_attrs.version.display();
                let gradle_version = attrs.version.display();
                if maven_version != gradle_version {
                    outcome
                        .version_mismatch
                        .entry(key.logical_name())
                        .or_insert_with(|| VersionMismatch {
                            maven: maven_version.to_string(),
                            gradle: gradle_version.to_string(),
                            maven_scope: maven_attrs.scope_or_config.clone(),
                            gradle_config: attrs.scope_or_config.clone(),
                            detected_from: BuildSystem::Gradle,
                        });
                }
            }
            None => {
                if policy.ignores_group(key.group()) {
                    continue;
                }
                outcome.only_in_gradle.insert(
                    key.to_string(),
                    ExtraEntry {
                        gradle_config: attrs.scope_or_config.clone(),
                        original_gradle_version: attrs.original_version.clone(),
                    },
                );
            }
        }
    }

    outcome
}
