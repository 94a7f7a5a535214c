//! Constants for file extensions and resolution strategies.
//!
//! Config files come in two families, selected purely by extension:
//!
//! - **Executable modules**: `.js`, `.mjs`, `.cjs`, `.jsx`, `.ts`, `.mts`, `.cts`, `.tsx`.
//!   These are parsed and their exported configuration is evaluated statically.
//! - **Data**: everything else, parsed as JSON that may contain comments.

/// Extensions of config files that export their configuration from a module
pub const MODULE_CONFIG_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// Extensions appended to a specifier when resolving it to a file (in priority order)
pub const RESOLVE_EXTENSIONS: &[&str] =
    &[".js", ".mjs", ".cjs", ".jsx", ".ts", ".tsx", ".mts", ".cts", ".json"];

/// Index file names to try when a specifier points at a directory
pub const INDEX_FILES: &[&str] = &[
    "index.js",
    "index.mjs",
    "index.cjs",
    "index.jsx",
    "index.ts",
    "index.tsx",
    "index.mts",
    "index.cts",
    "index.json",
];

/// Placeholder substituted with the project root inside config values
pub const ROOT_DIR_PLACEHOLDER: &str = "<rootDir>";

/// Default limit on how many presets may be chained
pub const DEFAULT_MAX_PRESET_DEPTH: usize = 32;
