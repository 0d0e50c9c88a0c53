use serde::{Deserialize, Serialize};

/// Configuration for the members module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MembersConfig {
    /// Fixed page size for member listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Maximum accepted length for a member name.
    #[serde(default = "default_name_max_len")]
    pub name_max_len: usize,
    /// Reject a second member whose canonicalized email matches an
    /// existing one. The storage layer enforces the same rule with a
    /// unique index on LOWER(email).
    #[serde(default = "default_enforce_unique_email")]
    pub enforce_unique_email: bool,
}

impl Default for MembersConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            name_max_len: default_name_max_len(),
            enforce_unique_email: default_enforce_unique_email(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

fn default_name_max_len() -> usize {
    120
}

fn default_enforce_unique_email() -> bool {
    true
}
