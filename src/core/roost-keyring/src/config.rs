//! Keyring configuration.

/// Tunable business rules for the key service.
#[derive(Debug, Clone)]
pub struct KeyringConfig {
    /// Minimum key name length, in characters.
    pub min_key_name_length: usize,
    /// Maximum key name length, in characters.
    pub max_key_name_length: usize,
    /// Optional cap on total keys (active or not) per platform.
    pub max_keys_per_platform: Option<usize>,
    /// Expiration applied to new keys that carry none, in days.
    pub default_expiration_days: Option<i64>,
    /// Whether several keys may be active per platform at once.
    ///
    /// Documented policy only: `add_key` never deactivates prior keys, and
    /// selection among multiple actives follows the store's newest-first
    /// ordering. Not enforced at write time.
    pub allow_multiple_active_keys: bool,
}

impl Default for KeyringConfig {
    fn default() -> Self {
        Self {
            min_key_name_length: 3,
            max_key_name_length: 50,
            max_keys_per_platform: None,
            default_expiration_days: None,
            allow_multiple_active_keys: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeyringConfig::default();
        assert_eq!(config.min_key_name_length, 3);
        assert_eq!(config.max_key_name_length, 50);
        assert!(config.max_keys_per_platform.is_none());
        assert!(config.default_expiration_days.is_none());
        assert!(config.allow_multiple_active_keys);
    }
}
