//! Path and sequence helpers shared by the generator and adapters

use std::collections::HashSet;
use std::path::{Path, MAIN_SEPARATOR};

/// Join `path` under `base`; an empty side yields the other
pub fn join_path(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    Path::new(base).join(path).display().to_string()
}

/// Replace the extension of the last path component.
///
/// `None` leaves the path unchanged; `Some("")` strips the extension.
/// Extensions are given without the leading dot.
pub fn change_extension(path: &str, extension: Option<&str>) -> String {
    let Some(extension) = extension else {
        return path.to_string();
    };
    let file_start = path.rfind(['/', MAIN_SEPARATOR]).map_or(0, |i| i + 1);
    let stem_end = match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => file_start + dot,
        _ => path.len(),
    };
    let stem = &path[..stem_end];
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

/// Ensure a directory path ends with a separator
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with('/') || path.ends_with(MAIN_SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{MAIN_SEPARATOR}")
    }
}

/// Remove duplicates, keeping the first occurrence of each item
pub fn dedup<T: Clone + Eq + std::hash::Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}
