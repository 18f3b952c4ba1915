//! Filesystem access classifier.
//!
//! Three operations — `check_read`, `check_write`, `check_list` — each
//! returning `Allow` or `Blocked{reason}`. Canonicalization precedes every
//! containment check so `..`, `./`, and symlink traversal cannot defeat it.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::types::PathDecision;

/// Base names that are always sensitive, regardless of directory.
const SENSITIVE_BASENAMES: &[&str] = &[
    ".env",
    "id_rsa",
    "id_rsa.pub",
    "id_ed25519",
    "id_ed25519.pub",
    "credentials",
    "credentials.json",
    "service-account.json",
    ".netrc",
    ".npmrc",
    ".pypirc",
    "known_hosts",
    "authorized_keys",
];

/// Regex patterns matched against the full normalized path when the base
/// name isn't a direct allowlist hit — env-file variants, credential/secret
/// files of common formats, service-account files, private-key suffixes.
fn sensitive_path_regexes() -> Vec<Regex> {
    [
        r"(?i)/\.env(?:\.[^/]+)?$",
        r"(?i)\.pem$",
        r"(?i)\.key$",
        r"(?i)\.p12$",
        r"(?i)\.pfx$",
        r"(?i)service[-_]account.*\.json$",
        r"(?i)/secrets?\.(?:ya?ml|json|toml)$",
        r"(?i)/\.aws/credentials$",
        r"(?i)/\.kube/config$",
        r"(?i)/\.docker/config\.json$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("static sensitive-path regex"))
    .collect()
}

/// Exact absolute directories blocked for listing and base-path containment.
const BLOCKED_DIRECTORIES: &[&str] = &[
    "/etc", "/root", "/proc", "/sys", "/dev", "/boot", "/var/log", "/var/run",
];

/// Sensitive-location prefixes a symlink target must not resolve under.
const SYMLINK_TARGET_DENY_PREFIXES: &[&str] =
    &["/etc", "/root", "/home", "/proc", "/sys", "/dev", "/var"];

pub struct PathClassifier {
    sensitive_regexes: Vec<Regex>,
}

impl PathClassifier {
    pub fn new() -> Self {
        Self {
            sensitive_regexes: sensitive_path_regexes(),
        }
    }

    pub fn check_read(&self, path: &Path, workspace: &Path) -> PathDecision {
        if let Some(reason) = self.sensitive_file_reason(path) {
            return PathDecision::Blocked { reason };
        }
        if let Some(decision) = self.symlink_escape_check(path, workspace) {
            return decision;
        }
        if let Some(dir) = blocked_directory_containing(path) {
            return PathDecision::Blocked {
                reason: format!("Blocked directory listing ({dir})"),
            };
        }
        PathDecision::Allow
    }

    pub fn check_write(&self, path: &Path, workspace: &Path) -> PathDecision {
        if let Some(reason) = self.sensitive_file_reason(path) {
            return PathDecision::Blocked { reason };
        }
        if let Some(decision) = self.symlink_escape_check(path, workspace) {
            return decision;
        }
        match canonicalize_best_effort(path) {
            Some(canonical) if !is_within(&canonical, workspace) => PathDecision::Blocked {
                reason: format!(
                    "Write outside workspace ({})",
                    canonical.display()
                ),
            },
            None => {
                // Path doesn't exist yet: check the parent instead so a new
                // file can be created, but still resolve symlinked parents.
                let normalized = normalize(path);
                if !is_within(&normalized, workspace) {
                    return PathDecision::Blocked {
                        reason: format!(
                            "Write outside workspace ({})",
                            normalized.display()
                        ),
                    };
                }
                PathDecision::Allow
            }
            _ => PathDecision::Allow,
        }
    }

    pub fn check_list(&self, path: &Path, _workspace: &Path) -> PathDecision {
        if let Some(dir) = blocked_directory_containing(path) {
            return PathDecision::Blocked {
                reason: format!("Blocked directory listing ({dir})"),
            };
        }
        PathDecision::Allow
    }

    fn sensitive_file_reason(&self, path: &Path) -> Option<String> {
        let normalized = normalize(path);
        if has_ssh_segment(&normalized) {
            return Some("Path contains .ssh directory segment".to_string());
        }
        if let Some(basename) = normalized
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_lowercase())
        {
            if SENSITIVE_BASENAMES.iter().any(|s| *s == basename) {
                return Some(format!("Sensitive file ({basename})"));
            }
        }
        let normalized_str = normalized.to_string_lossy();
        if self
            .sensitive_regexes
            .iter()
            .any(|re| re.is_match(&normalized_str))
        {
            return Some(format!("Sensitive file pattern ({normalized_str})"));
        }
        None
    }

    /// Resolve both the candidate and workspace to their canonical forms.
    /// Returns `Some(Blocked)` when either escape check fires, `None` when
    /// neither check applies (caller proceeds to its own containment check).
    fn symlink_escape_check(&self, path: &Path, workspace: &Path) -> Option<PathDecision> {
        if let Ok(target) = std::fs::read_link(path) {
            let resolved_target = if target.is_absolute() {
                target.clone()
            } else {
                path.parent().unwrap_or(Path::new("/")).join(&target)
            };
            let resolved_target = normalize(&resolved_target);
            if let Some(prefix) = SYMLINK_TARGET_DENY_PREFIXES
                .iter()
                .find(|p| resolved_target.starts_with(p))
            {
                return Some(PathDecision::Blocked {
                    reason: format!("Symlink points to sensitive location ({prefix})"),
                });
            }
        }

        if let Some(canonical) = canonicalize_best_effort(path) {
            if !is_within(&canonical, workspace) {
                return Some(PathDecision::Blocked {
                    reason: format!(
                        "Symlink points outside workspace ({})",
                        canonical.display()
                    ),
                });
            }
        }
        None
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn has_ssh_segment(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == ".ssh")
}

fn blocked_directory_containing(path: &Path) -> Option<&'static str> {
    let normalized = normalize(path);
    if has_ssh_segment(&normalized) {
        return Some(".ssh");
    }
    BLOCKED_DIRECTORIES
        .iter()
        .find(|dir| normalized == Path::new(*dir) || normalized.starts_with(format!("{dir}/")))
        .copied()
}

/// `workspace` itself, or any descendant of `workspace/`.
fn is_within(candidate: &Path, workspace: &Path) -> bool {
    let workspace = normalize(workspace);
    candidate == workspace || candidate.starts_with(&workspace)
}

fn canonicalize_best_effort(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok()
}

/// Lexical `.`/`..` normalization without touching the filesystem (used when
/// a path doesn't exist yet, so `canonicalize` would fail).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
