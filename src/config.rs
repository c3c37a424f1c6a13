use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root configuration structure, deserialized from `.depdrift/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Descriptor file names and root locations.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Which scopes, configurations and groups take part in the comparison.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Where build descriptors live and how they pair up.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Maven descriptor file name; replaced by `gradle_descriptor` during pairing.
    #[serde(default = "default_maven_descriptor")]
    pub maven_descriptor: String,
    #[serde(default = "default_gradle_descriptor")]
    pub gradle_descriptor: String,
    /// Root Maven file id. Defaults to the shallowest Maven descriptor found.
    #[serde(default)]
    pub maven_root: Option<String>,
    /// Root Gradle file id. Defaults to the shallowest Gradle descriptor found.
    #[serde(default)]
    pub gradle_root: Option<String>,
    /// Directory names never descended into while scanning.
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
}

fn default_maven_descriptor() -> String {
    "pom.xml".to_string()
}

fn default_gradle_descriptor() -> String {
    "build.gradle.kts".to_string()
}

fn default_exclude_dirs() -> Vec<String> {
    ["target", "build", ".gradle", ".git", "node_modules"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            maven_descriptor: default_maven_descriptor(),
            gradle_descriptor: default_gradle_descriptor(),
            maven_root: None,
            gradle_root: None,
            exclude_dirs: default_exclude_dirs(),
        }
    }
}

/// Exclusion tables consulted by the comparator.
///
/// Scope and configuration names compare ASCII case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Maven scopes never reported as missing from Gradle.
    #[serde(default = "default_excluded_maven_scopes")]
    pub excluded_maven_scopes: Vec<String>,
    /// Gradle configurations never reported as Gradle-only (exact names).
    #[serde(default = "default_skipped_configurations")]
    pub skipped_gradle_configurations: Vec<String>,
    /// Gradle configurations never reported as Gradle-only (name suffixes).
    #[serde(default = "default_skipped_configuration_suffixes")]
    pub skipped_gradle_configuration_suffixes: Vec<String>,
    /// Groups with these prefixes are build-tool internals and never reported as Gradle-only.
    #[serde(default = "default_ignored_group_prefixes")]
    pub ignored_group_prefixes: Vec<String>,
}

fn default_excluded_maven_scopes() -> Vec<String> {
    vec!["test".to_string(), "provided".to_string()]
}

fn default_skipped_configurations() -> Vec<String> {
    vec!["compileOnly".to_string(), "antlr".to_string()]
}

fn default_skipped_configuration_suffixes() -> Vec<String> {
    vec!["testImplementation".to_string()]
}

fn default_ignored_group_prefixes() -> Vec<String> {
    vec!["org.jetbrains.kotlin".to_string(), "org.gradle".to_string()]
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            excluded_maven_scopes: default_excluded_maven_scopes(),
            skipped_gradle_configurations: default_skipped_configurations(),
            skipped_gradle_configuration_suffixes: default_skipped_configuration_suffixes(),
            ignored_group_prefixes: default_ignored_group_prefixes(),
        }
    }
}

impl PolicyConfig {
    /// Maven entries in these scopes are left out of the Maven → Gradle pass.
    pub fn skips_maven_scope(&self, scope: Option<&str>) -> bool {
        let Some(scope) = scope else {
            return false;
        };
        self.excluded_maven_scopes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scope.trim()))
    }

    /// Gradle entries in these configurations are left out of the Gradle → Maven pass.
    pub fn skips_gradle_configuration(&self, config: Option<&str>) -> bool {
        let Some(config) = config else {
            return false;
        };
        let lower = config.trim().to_ascii_lowercase();
        self.skipped_gradle_configurations
            .iter()
            .any(|c| c.to_ascii_lowercase() == lower)
            || self
                .skipped_gradle_configuration_suffixes
                .iter()
                .any(|s| lower.ends_with(&s.to_ascii_lowercase()))
    }

    pub fn ignores_group(&self, group: &str) -> bool {
        self.ignored_group_prefixes
            .iter()
            .any(|p| group.starts_with(p.as_str()))
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<project_path>/.depdrift/config.toml`
/// 3. `~/.config/depdrift/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".depdrift").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("depdrift").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
