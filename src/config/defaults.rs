//! Default configuration values

/// Ninja executable looked up on PATH
pub const DEFAULT_NINJA_COMMAND: &str = "ninja";

/// Generated build file name
pub const DEFAULT_FILE_NAME: &str = "build.ninja";

/// Column width of generated files (0 disables wrapping)
pub const DEFAULT_COLUMNS: usize = 100;

/// Narrower than this, strict wrapping can break lines apart
pub const MINIMUM_COLUMNS_STRICT: usize = 30;

/// Output directory, relative to the project root
pub const DEFAULT_OUTPUT_RELATIVE: &str = "build";

/// Binary directory, relative to the output directory
pub const DEFAULT_BINARY_RELATIVE: &str = "bin";

/// Object directory, relative to the output directory
pub const DEFAULT_OBJECT_RELATIVE: &str = "obj";

/// Source directory, relative to the project root
pub const DEFAULT_SOURCE_RELATIVE: &str = "src";

/// Manifest file name
pub const DEFAULT_MANIFEST: &str = "shuriken.toml";

/// C compiler driver
pub const DEFAULT_GCC_COMMAND: &str = "gcc";

/// Directory holding ccache's compiler symlinks
pub const DEFAULT_CCACHE_PATH: &str = "/usr/lib/ccache";

/// pkg-config executable
pub const DEFAULT_PKG_CONFIG_COMMAND: &str = "pkg-config";
