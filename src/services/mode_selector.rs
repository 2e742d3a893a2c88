use std::sync::Arc;

use tracing::{info, warn};

use crate::models::mode::OperatingMode;
use crate::models::types::Credential;
use crate::traits::vision_api::{VisionApi, VisionApiError};

/// Value shipped in `.env` templates; treated as "no key configured".
pub const CREDENTIAL_PLACEHOLDER: &str = "your_gemini_api_key_here";

/// True when the credential is present, non-blank and not the placeholder.
/// Format is not checked here; a bad key only shows up on the first live call.
pub fn is_credential_configured(credential: Option<&Credential>) -> bool {
    match credential {
        Some(c) => {
            let token = c.as_str().trim();
            !token.is_empty() && token != CREDENTIAL_PLACEHOLDER
        }
        None => false,
    }
}

/// Mode implied by the credential alone, assuming the live client can be built.
///
/// The mock flag cannot force live mode without a usable credential, and it
/// does not force mock mode when one is present.
pub fn select_mode(credential: Option<&Credential>, _mock_requested: bool) -> OperatingMode {
    if is_credential_configured(credential) {
        OperatingMode::Live
    } else {
        OperatingMode::Mock
    }
}

/// Outcome of startup mode selection, fixed for the process lifetime.
#[derive(Clone)]
pub struct ModeSelection {
    pub mode: OperatingMode,
    pub client: Option<Arc<dyn VisionApi>>,
    pub credential_configured: bool,
    pub mock_requested: bool,
}

impl ModeSelection {
    pub fn live(client: Arc<dyn VisionApi>, mock_requested: bool) -> Self {
        Self {
            mode: OperatingMode::Live,
            client: Some(client),
            credential_configured: true,
            mock_requested,
        }
    }

    pub fn mock(credential_configured: bool, mock_requested: bool) -> Self {
        Self {
            mode: OperatingMode::Mock,
            client: None,
            credential_configured,
            mock_requested,
        }
    }

    /// No key and demo responses switched off: nothing can serve a request.
    pub fn is_unconfigured(&self) -> bool {
        self.mode.is_mock() && !self.credential_configured && !self.mock_requested
    }
}

impl std::fmt::Debug for ModeSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeSelection")
            .field("mode", &self.mode)
            .field("client", &self.client.as_ref().map(|c| c.model_name().to_string()))
            .field("credential_configured", &self.credential_configured)
            .field("mock_requested", &self.mock_requested)
            .finish()
    }
}

/// Decides the operating mode and builds the live client when one is needed.
///
/// A failing `build_client` degrades to mock mode instead of aborting startup.
pub fn select_backend<F>(credential: Option<&Credential>, mock_requested: bool, build_client: F) -> ModeSelection
where
    F: FnOnce(&Credential) -> Result<Arc<dyn VisionApi>, VisionApiError>,
{
    let credential = match credential {
        Some(c) if select_mode(Some(c), mock_requested) == OperatingMode::Live => c,
        _ => {
            if mock_requested {
                info!("no usable API key; demo mode enabled, serving mock responses");
            } else {
                warn!("no usable API key and demo mode disabled; analysis requests will fail");
            }
            return ModeSelection::mock(false, mock_requested);
        }
    };

    match build_client(credential) {
        Ok(client) => {
            info!(model = %client.model_name(), "live vision client ready");
            ModeSelection::live(client, mock_requested)
        }
        Err(e) => {
            warn!(error = %e, "live vision client construction failed; falling back to mock mode");
            ModeSelection::mock(true, mock_requested)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_are_not_configured() {
        assert!(!is_credential_configured(None));
        assert!(!is_credential_configured(Some(&Credential::from(""))));
        assert!(!is_credential_configured(Some(&Credential::from("   "))));
        assert!(!is_credential_configured(Some(&Credential::from(CREDENTIAL_PLACEHOLDER))));
        assert!(is_credential_configured(Some(&Credential::from("AIzaSy-real"))));
    }

    #[test]
    fn unconfigured_only_without_key_and_without_demo() {
        assert!(ModeSelection::mock(false, false).is_unconfigured());
        assert!(!ModeSelection::mock(false, true).is_unconfigured());
        assert!(!ModeSelection::mock(true, false).is_unconfigured());
    }
}
