use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "depdrift",
    about = "Compare Maven and Gradle dependency declarations and report drift",
    version
)]
pub struct Cli {
    /// Project path to scan for build descriptors
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.depdrift/config.toml, fallback ~/.config/depdrift/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Also write the JSON report to a file; use without value to default to dependency-comparison-report.json
    #[arg(
        long,
        value_name = "FILE",
        num_args = 0..=1,
        default_missing_value = "dependency-comparison-report.json"
    )]
    pub output: Option<PathBuf>,

    /// Pre-extracted Maven records (JSON) instead of scanning pom files
    #[arg(long, value_name = "FILE", requires = "gradle_records")]
    pub maven_records: Option<PathBuf>,

    /// Pre-extracted Gradle records (JSON) instead of scanning build scripts
    #[arg(long, value_name = "FILE", requires = "maven_records")]
    pub gradle_records: Option<PathBuf>,

    /// Also list fully reconciled pairs and log progress
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with status 1 when any pair has drift
    #[arg(long)]
    pub fail_on_drift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["depdrift"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.report, ReportFormat::Terminal);
        assert!(cli.output.is_none());
        assert!(!cli.fail_on_drift);
    }

    #[test]
    fn test_output_without_value() {
        let cli = Cli::try_parse_from(["depdrift", "fe", "--output", "--report", "json"]).unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("dependency-comparison-report.json")));
        assert_eq!(cli.report, ReportFormat::Json);
        assert_eq!(cli.path, PathBuf::from("fe"));
    }

    #[test]
    fn test_record_files_go_together() {
        assert!(Cli::try_parse_from(["depdrift", "--maven-records", "poms.json"]).is_err());
        let cli = Cli::try_parse_from([
            "depdrift",
            "--maven-records",
            "poms.json",
            "--gradle-records",
            "gradle.json",
        ])
        .unwrap();
        assert_eq!(cli.gradle_records, Some(PathBuf::from("gradle.json")));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["depdrift", "-v", "-q"]).is_err());
    }
}
