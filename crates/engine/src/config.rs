//! File-backed configuration for an `AdapterFacade`, via `millrace.toml`.
//!
//! On first open, a default config file is created; to change settings,
//! edit the file and restart — the same model the teacher repo's own
//! `strata.toml` uses.

use millrace_core::{Error, FacadeConfig, Result};
use std::path::Path;

/// Default config file name placed alongside an adapter's data directory.
pub const CONFIG_FILE_NAME: &str = "millrace.toml";

/// Returns the default config file content, with explanatory comments.
pub fn default_toml() -> &'static str {
    r#"# Millrace facade configuration

# Automatically add and stamp a created_at attribute on create.
created_at = true

# Automatically add and stamp an updated_at attribute on create/update.
updated_at = true

# Milliseconds a lock manager critical section may run before a warning
# is logged. 0 disables the warning.
transaction_warning_timer = 30000
"#
}

/// Read and parse a [`FacadeConfig`] from `path`.
pub fn from_file(path: &Path) -> Result<FacadeConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read config file '{}': {e}", path.display())))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse config file '{}': {e}", path.display())))
}

/// Write the default config file if one does not already exist at `path`.
pub fn write_default_if_missing(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::write(path, default_toml())
            .map_err(|e| Error::Config(format!("failed to write config file '{}': {e}", path.display())))?;
    }
    Ok(())
}

/// Serialize `config` to TOML and write it to `path`.
pub fn write_to_file(config: &FacadeConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
    std::fs::write(path, content)
        .map_err(|e| Error::Config(format!("failed to write config file '{}': {e}", path.display())))
}
