use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// Backend that produces image descriptions for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Real vision model behind a credential
    Live,
    /// Canned demo descriptions, no network
    Mock,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, OperatingMode::Mock)
    }
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
