//! File globbing
//!
//! Patterns use `/` separators and support `*` (within one component), `?`
//! (one character) and `**` (any number of directories). Hidden files and
//! directories are skipped. Matches are returned sorted, joined to the root.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::core::context::current_context;
use crate::core::paths::join_path;
use crate::error::FilesystemError;

/// Glob under `paths.root`, or the working directory when it is not set
pub fn glob(pattern: &str) -> Result<Vec<String>, FilesystemError> {
    let root = current_context()
        .ok()
        .and_then(|ctx| ctx.get_opt::<String>("paths.root"))
        .unwrap_or_default();
    glob_in(&root, pattern)
}

/// Glob under `root`
pub fn glob_in(root: &str, pattern: &str) -> Result<Vec<String>, FilesystemError> {
    let matcher = Regex::new(&pattern_to_regex(pattern)).map_err(|e| {
        FilesystemError::InvalidPattern {
            pattern: pattern.to_string(),
            error: e.to_string(),
        }
    })?;

    let walk_root = if root.is_empty() { "." } else { root };
    let start = join_path(walk_root, literal_prefix(pattern));
    if !Path::new(&start).exists() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(&start)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
    for entry in walker {
        let entry = entry.map_err(|e| FilesystemError::ReadDir {
            path: e
                .path()
                .map_or_else(|| PathBuf::from(&start), Path::to_path_buf),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(walk_root) else {
            continue;
        };
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.is_match(&relative) {
            matches.push(join_path(root, &relative));
        }
    }
    matches.sort();
    Ok(matches)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Directories before the first wildcard
fn literal_prefix(pattern: &str) -> &str {
    let wildcard = pattern.find(['*', '?']).unwrap_or(pattern.len());
    match pattern[..wildcard].rfind('/') {
        Some(slash) => &pattern[..slash],
        None => "",
    }
}

fn pattern_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**/") {
            regex.push_str("(?:.*/)?");
            rest = after;
        } else if let Some(after) = rest.strip_prefix("**") {
            regex.push_str(".*");
            rest = after;
        } else {
            match c {
                '*' => regex.push_str("[^/]*"),
                '?' => regex.push_str("[^/]"),
                c => regex.push_str(&regex::escape(&c.to_string())),
            }
            rest = &rest[c.len_utf8()..];
        }
    }
    regex.push('$');
    regex
}
