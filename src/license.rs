//! License compliance scanning.
//!
//! Looks for license texts in source files, confirms copyleft violations,
//! and audits the dependency tables of a Cargo manifest against a table of
//! known crate licenses.  Scans never abort on a bad file; read failures
//! are recorded in the results instead.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct ScanError(pub String);

/// Licenses that are fine to use.
const ALLOWED_LICENSES: [&str; 6] = [
    "MIT",
    "Apache-2.0",
    "MIT OR Apache-2.0",
    "BSD-3-Clause",
    "ISC",
    "Unlicense",
];

/// Copyleft licenses that block a release.
const BLOCKED_LICENSES: [&str; 5] = ["GPL", "AGPL", "LGPL", "MPL-2.0", "CC-BY-SA"];

/// File extensions worth checking for embedded license texts.
const SOURCE_EXTENSIONS: [&str; 8] = ["rs", "py", "js", "jsx", "ts", "tsx", "cpp", "hpp"];

/// Directories that only hold generated or third-party content.
const SKIP_DIRS: [&str; 3] = [".git", "target", "node_modules"];

lazy_static! {
    static ref LICENSE_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("MIT", Regex::new(r"(?i)MIT\s+License|The\s+MIT\s+License").unwrap()),
        ("Apache", Regex::new(r"(?i)Apache\s+License\s+2\.0|Apache-2\.0").unwrap()),
        ("BSD", Regex::new(r"(?i)BSD\s+3-Clause|BSD-3-Clause").unwrap()),
        (
            "GPL",
            Regex::new(r"(?i)GNU\s+General\s+Public\s+License|GPL").unwrap()
        ),
        (
            "AGPL",
            Regex::new(r"(?i)GNU\s+Affero\s+General\s+Public\s+License|AGPL").unwrap()
        ),
    ];

    /// Registry licenses for the crates this project may pull in.
    static ref KNOWN_CRATE_LICENSES: HashMap<&'static str, &'static str> = HashMap::from([
        ("actix-cors", "MIT OR Apache-2.0"),
        ("actix-web", "MIT OR Apache-2.0"),
        ("clap", "MIT OR Apache-2.0"),
        ("criterion", "MIT OR Apache-2.0"),
        ("env_logger", "MIT OR Apache-2.0"),
        ("itertools", "MIT OR Apache-2.0"),
        ("lazy_static", "MIT OR Apache-2.0"),
        ("log", "MIT OR Apache-2.0"),
        ("proptest", "MIT OR Apache-2.0"),
        ("regex", "MIT OR Apache-2.0"),
        ("serde", "MIT OR Apache-2.0"),
        ("serde_json", "MIT OR Apache-2.0"),
        ("thiserror", "MIT OR Apache-2.0"),
    ]);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Blocked,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Blocked => write!(f, "BLOCKED"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    pub licenses_found: Vec<String>,
    pub blocked_licenses: Vec<String>,
    pub has_license_header: bool,
    pub is_compliant: bool,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PackageReport {
    pub package: String,
    pub license: String,
    pub is_allowed: bool,
    pub is_blocked: bool,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct ManifestReport {
    pub manifest: PathBuf,
    pub packages: Vec<PackageReport>,
    pub has_blocked_packages: bool,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub compliant_files: usize,
    pub blocked_files: usize,
    pub compliance_rate: f64,
    pub overall_status: Status,
}

#[derive(Debug, Serialize)]
pub struct ScanResults {
    pub project_path: PathBuf,
    pub files_checked: Vec<FileReport>,
    pub license_files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_check: Option<ManifestReport>,
    pub summary: Summary,
}

/// Licenses detected in `content`, together with the subset confirmed as
/// copyleft violations.  Detection alone never blocks.
pub fn detect_licenses(content: &str) -> (BTreeSet<&'static str>, BTreeSet<&'static str>) {
    let mut found = BTreeSet::new();
    let mut blocked = BTreeSet::new();
    for (name, pattern) in LICENSE_PATTERNS.iter() {
        if pattern.is_match(content) {
            found.insert(*name);
            if matches!(*name, "GPL" | "AGPL") && is_actual_violation(content, name) {
                blocked.insert(*name);
            }
        }
    }
    (found, blocked)
}

/// A GPL/AGPL pattern hit counts as a violation only when the license is
/// actually applied to the file, not merely mentioned.
fn is_actual_violation(content: &str, license: &str) -> bool {
    // the checker's own sources name every license in their pattern tables
    if content.contains("LICENSE_PATTERNS") {
        return false;
    }
    let indicators: &[&str] = match license {
        "GPL" => &[
            "This program is free software",
            "GNU General Public License",
            "GPL v2",
            "GPL v3",
            "under the terms of the GNU General Public License",
        ],
        "AGPL" => &[
            "GNU Affero General Public License",
            "AGPL v3",
            "under the terms of the GNU Affero General Public License",
        ],
        _ => return false,
    };
    indicators.iter().any(|phrase| content.contains(phrase))
}

pub fn has_license_header(content: &str) -> bool {
    let lower = content.to_lowercase();
    lower.contains("license") || lower.contains("copyright")
}

/// Check one file.  A file that cannot be read gets an ERROR record so the
/// surrounding scan can keep going.
pub fn check_file(path: &Path) -> FileReport {
    match fs::read_to_string(path) {
        Ok(content) => {
            let (found, blocked) = detect_licenses(&content);
            let is_compliant = blocked.is_empty();
            FileReport {
                file: path.to_path_buf(),
                licenses_found: found.iter().map(|name| name.to_string()).collect(),
                blocked_licenses: blocked.iter().map(|name| name.to_string()).collect(),
                has_license_header: has_license_header(&content),
                is_compliant,
                status: if is_compliant { Status::Ok } else { Status::Blocked },
                error: None,
            }
        }
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            FileReport {
                file: path.to_path_buf(),
                licenses_found: Vec::new(),
                blocked_licenses: Vec::new(),
                has_license_header: false,
                is_compliant: false,
                status: Status::Error,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Package names from the dependency tables of a Cargo manifest.
pub fn parse_manifest_deps(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_deps = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = matches!(
                line,
                "[dependencies]" | "[dev-dependencies]" | "[build-dependencies]"
            );
            continue;
        }
        if !in_deps || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            deps.push(name.trim().to_string());
        }
    }
    deps
}

fn package_report(package: String) -> PackageReport {
    let license = KNOWN_CRATE_LICENSES
        .get(package.as_str())
        .copied()
        .unwrap_or("Unknown")
        .to_string();
    let is_allowed = ALLOWED_LICENSES.contains(&license.as_str());
    let is_blocked = BLOCKED_LICENSES.contains(&license.as_str());
    PackageReport {
        package,
        license,
        is_allowed,
        is_blocked,
        status: if is_blocked { Status::Blocked } else { Status::Ok },
    }
}

/// Audit the dependency tables of a Cargo manifest.
pub fn check_manifest(path: &Path) -> Result<ManifestReport, ScanError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ScanError(format!("Cannot read {}: {}", path.display(), e)))?;
    let packages = parse_manifest_deps(&content)
        .into_iter()
        .map(package_report)
        .collect::<Vec<_>>();
    let has_blocked_packages = packages.iter().any(|package| package.is_blocked);
    Ok(ManifestReport {
        manifest: path.to_path_buf(),
        packages,
        has_blocked_packages,
        status: if has_blocked_packages {
            Status::Blocked
        } else {
            Status::Ok
        },
    })
}

fn summarize(files_checked: &[FileReport]) -> Summary {
    let total_files = files_checked.len();
    let compliant_files = files_checked.iter().filter(|file| file.is_compliant).count();
    let blocked_files = files_checked
        .iter()
        .filter(|file| file.status == Status::Blocked)
        .count();
    let compliance_rate = if total_files > 0 {
        compliant_files as f64 / total_files as f64 * 100.0
    } else {
        0.0
    };
    Summary {
        total_files,
        compliant_files,
        blocked_files,
        compliance_rate,
        overall_status: if blocked_files > 0 {
            Status::Blocked
        } else {
            Status::Ok
        },
    }
}

/// Scan a project tree: every source file, any LICENSE files, and the root
/// Cargo manifest when there is one.
pub fn scan_project(root: &Path) -> Result<ScanResults, ScanError> {
    let mut source_files = Vec::new();
    let mut license_files = Vec::new();
    collect_files(root, &mut source_files, &mut license_files)
        .map_err(|e| ScanError(format!("Cannot walk {}: {}", root.display(), e)))?;
    source_files.sort();
    license_files.sort();

    let files_checked = source_files
        .iter()
        .map(|path| check_file(path))
        .collect::<Vec<_>>();

    let manifest = root.join("Cargo.toml");
    let manifest_check = if manifest.exists() {
        Some(check_manifest(&manifest)?)
    } else {
        None
    };

    let summary = summarize(&files_checked);
    debug!(
        "Checked {} files under {}",
        summary.total_files,
        root.display()
    );

    Ok(ScanResults {
        project_path: root.to_path_buf(),
        files_checked,
        license_files,
        manifest_check,
        summary,
    })
}

fn collect_files(
    dir: &Path,
    sources: &mut Vec<PathBuf>,
    licenses: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            if SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            collect_files(&path, sources, licenses)?;
        } else if name.to_uppercase().starts_with("LICENSE") {
            licenses.push(path);
        } else if let Some(ext) = path.extension() {
            if SOURCE_EXTENSIONS.contains(&ext.to_string_lossy().as_ref()) {
                sources.push(path);
            }
        }
    }
    Ok(())
}

/// Human readable version of the scan results.
pub fn generate_report(results: &ScanResults) -> String {
    let separator = "=".repeat(60);
    let mut out = String::new();
    out.push_str(&separator);
    out.push_str("\nLicense compliance report\n");
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&format!("Project: {}\n", results.project_path.display()));
    out.push_str(&format!(
        "Overall status: {}\n",
        results.summary.overall_status
    ));
    out.push_str(&format!(
        "Compliance rate: {:.1}%\n\n",
        results.summary.compliance_rate
    ));

    out.push_str("Files:\n");
    for file in &results.files_checked {
        out.push_str(&format!("  [{}] {}\n", file.status, file.file.display()));
        if !file.blocked_licenses.is_empty() {
            out.push_str(&format!(
                "        blocked: {}\n",
                file.blocked_licenses.iter().join(", ")
            ));
        }
    }

    if let Some(manifest) = &results.manifest_check {
        out.push_str("\nDependencies:\n");
        for package in &manifest.packages {
            out.push_str(&format!(
                "  [{}] {}: {}\n",
                package.status, package.package, package.license
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::license::*;

    #[test]
    fn test_detect_mit() {
        let content = "Released under the MIT License.\nCopyright (c) 2024";
        let (found, blocked) = detect_licenses(content);
        assert!(found.contains("MIT"));
        assert!(blocked.is_empty());
        assert!(has_license_header(content));
    }

    #[test]
    fn test_gpl_mention_is_not_a_violation() {
        // naming the license is not the same as applying it
        let content = "// strip GPL-licensed snippets before vendoring";
        let (found, blocked) = detect_licenses(content);
        assert!(found.contains("GPL"));
        assert!(blocked.is_empty());
    }

    #[test]
    fn test_gpl_application_is_blocked() {
        let content = "This program is free software: you can redistribute it \
             under the terms of the GNU General Public License, GPL v3.";
        let (found, blocked) = detect_licenses(content);
        assert!(found.contains("GPL"));
        assert!(blocked.contains("GPL"));
    }

    #[test]
    fn test_agpl_application_is_blocked() {
        let content = "Licensed under the terms of the GNU Affero General Public License.";
        let (_, blocked) = detect_licenses(content);
        assert!(blocked.contains("AGPL"));
        assert!(!blocked.contains("GPL"));
    }

    #[test]
    fn test_no_license_header() {
        assert!(!has_license_header("fn main() {}\n"));
    }

    #[test]
    fn test_unreadable_file_is_an_error_record() {
        let report = check_file(Path::new("no/such/file.rs"));
        assert_eq!(report.status, Status::Error);
        assert!(!report.is_compliant);
        assert!(report.error.is_some());
    }

    #[test]
    fn test_parse_manifest_deps() {
        let manifest = r#"
[package]
name = "demo"
version = "0.1.0"

[dependencies]
serde = { version = "1.0", features = ["derive"] }
log = "0.4"
# commented = "1"

[dev-dependencies]
proptest = "1"

[profile.release]
lto = true
"#;
        assert_eq!(parse_manifest_deps(manifest), vec!["serde", "log", "proptest"]);
    }

    #[test]
    fn test_known_package_is_allowed() {
        let report = package_report("serde".to_string());
        assert_eq!(report.license, "MIT OR Apache-2.0");
        assert!(report.is_allowed);
        assert!(!report.is_blocked);
        assert_eq!(report.status, Status::Ok);
    }

    #[test]
    fn test_unknown_package_does_not_block() {
        let report = package_report("leftpad".to_string());
        assert_eq!(report.license, "Unknown");
        assert!(!report.is_allowed);
        assert!(!report.is_blocked);
        assert_eq!(report.status, Status::Ok);
    }

    #[test]
    fn test_summary_counts() {
        let files = vec![
            check_file(Path::new("no/such/a.rs")),
            check_file(Path::new("no/such/b.rs")),
        ];
        let summary = summarize(&files);
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.compliant_files, 0);
        assert_eq!(summary.blocked_files, 0);
        // error files are non-compliant but they don't block the project
        assert_eq!(summary.overall_status, Status::Ok);
        assert_eq!(summary.compliance_rate, 0.0);
    }

    #[test]
    fn test_empty_scan_has_zero_rate() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_files, 0);
        assert_eq!(summary.compliance_rate, 0.0);
        assert_eq!(summary.overall_status, Status::Ok);
    }

    #[test]
    fn test_report_mentions_blocked_files() {
        let results = ScanResults {
            project_path: Path::new("demo").to_path_buf(),
            files_checked: vec![FileReport {
                file: Path::new("demo/vendored.rs").to_path_buf(),
                licenses_found: vec!["GPL".to_string()],
                blocked_licenses: vec!["GPL".to_string()],
                has_license_header: true,
                is_compliant: false,
                status: Status::Blocked,
                error: None,
            }],
            license_files: Vec::new(),
            manifest_check: None,
            summary: Summary {
                total_files: 1,
                compliant_files: 0,
                blocked_files: 1,
                compliance_rate: 0.0,
                overall_status: Status::Blocked,
            },
        };
        let report = generate_report(&results);
        assert!(report.contains("Overall status: BLOCKED"));
        assert!(report.contains("[BLOCKED] demo/vendored.rs"));
        assert!(report.contains("blocked: GPL"));
    }
}
