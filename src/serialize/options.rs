use serde::{Deserialize, Serialize};

pub const DEFAULT_KEY_LIMIT: usize = 50;
pub const DEFAULT_DEPTH_LIMIT: usize = 4;

/// Bounds applied by the safe serializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializationOptions {
    /// Own-key count above which a plain object is summarized.
    #[serde(alias = "numOfKeysLimit")]
    pub key_limit: usize,
    /// Nested plain-object depth at which a plain object is summarized.
    #[serde(alias = "depthOfLimit")]
    pub depth_limit: usize,
    /// Maximum length of a summarized string. `None` (or `0`) is unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_length_limit: Option<usize>,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self {
            key_limit: DEFAULT_KEY_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            string_length_limit: None,
        }
    }
}

impl SerializationOptions {
    pub fn with_key_limit(mut self, limit: usize) -> Self {
        self.key_limit = limit;
        self
    }

    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit;
        self
    }

    pub fn with_string_length_limit(mut self, limit: usize) -> Self {
        self.string_length_limit = Some(limit);
        self
    }

    /// Effective string length limit; zero counts as unset.
    pub(crate) fn string_limit(&self) -> Option<usize> {
        self.string_length_limit.filter(|&limit| limit > 0)
    }
}
