//! Build variants and per-platform file naming
//!
//! A variant names the platform a project is built for (`linux64`, `win64`,
//! ...). The default variant is the host's.

/// Detect the host variant
pub fn host_platform() -> String {
    let bits = if cfg!(target_pointer_width = "64") { "64" } else { "32" };
    let os = match std::env::consts::OS {
        "windows" => "win",
        "macos" => "darwin",
        "linux" => "linux",
        other => other,
    };
    format!("{os}{bits}")
}

/// Whether a variant targets Windows
pub fn is_windows(variant: &str) -> bool {
    matches!(variant, "win64" | "win32")
}

/// Whether a variant targets Linux
pub fn is_linux(variant: &str) -> bool {
    matches!(variant, "linux64" | "linux32")
}

/// Executable extension for a variant (without the dot)
pub fn executable_extension(variant: &str) -> Option<&'static str> {
    is_windows(variant).then_some("exe")
}

/// Shared library extension for a variant
pub fn shared_library_extension(variant: &str) -> &'static str {
    if is_windows(variant) {
        "dll"
    } else if variant.starts_with("darwin") {
        "dylib"
    } else {
        "so"
    }
}

/// Shared library file name prefix for a variant
pub fn shared_library_prefix(variant: &str) -> &'static str {
    if is_windows(variant) {
        ""
    } else {
        "lib"
    }
}
