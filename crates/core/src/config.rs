//! Facade-level configuration recognized by the attribute augmenter and the
//! lock manager's warning timer.

use serde::{Deserialize, Serialize};

/// Config keys an `AdapterFacade` recognizes.
///
/// Parsing/serializing this to a file lives in `millrace-engine` (the only
/// crate that depends on `toml`); this struct itself is shared with
/// `millrace-primitives`, which needs `created_at`/`updated_at` to decide
/// which timestamp attributes the augmenter adds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacadeConfig {
    /// Automatically add and stamp a `created_at` attribute on `create`.
    #[serde(default = "default_true")]
    pub created_at: bool,
    /// Automatically add and stamp an `updated_at` attribute on `create`
    /// and `update`.
    #[serde(default = "default_true")]
    pub updated_at: bool,
    /// Milliseconds a lock-manager critical section may run before a
    /// warning is logged. `0` disables the warning timer.
    #[serde(default = "default_warning_timer")]
    pub transaction_warning_timer: u64,
}

fn default_true() -> bool {
    true
}

fn default_warning_timer() -> u64 {
    30_000
}

impl Default for FacadeConfig {
    fn default() -> Self {
        FacadeConfig {
            created_at: true,
            updated_at: true,
            transaction_warning_timer: default_warning_timer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_stamps_timestamps_and_warns_after_30s() {
        let config = FacadeConfig::default();
        assert!(config.created_at);
        assert!(config.updated_at);
        assert_eq!(config.transaction_warning_timer, 30_000);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: FacadeConfig = toml::from_str("").unwrap();
        assert_eq!(config, FacadeConfig::default());
    }
}
