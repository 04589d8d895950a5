//! Consent facade delegating to the native consent SDK.

use crate::error::BridgeError;
use adbridge_rs_config::ConsentConfig;
use adbridge_rs_protocol::{
    AdProvider, AdsConsentDebugGeography, AdsConsentFormOptions, AdsConsentFormResult,
    AdsConsentInfo, AdsConsentStatus, NativeConsent,
};
use log::{debug, warn};
use std::sync::Arc;

/// Name reported when the native consent SDK is missing.
pub const CONSENT_MODULE_NAME: &str = "admob_consent";

/// Thin async facade over [`NativeConsent`]. Arguments are checked before
/// they reach the native side; consent state itself lives there.
#[derive(Clone)]
pub struct AdsConsent {
    native: Arc<dyn NativeConsent>,
}

impl AdsConsent {
    pub fn new(native: Arc<dyn NativeConsent>) -> Result<Self, BridgeError> {
        if native.native_sdk_missing() {
            warn!("native sdk missing (module={})", CONSENT_MODULE_NAME);
            return Err(BridgeError::MissingNativeCapability(
                CONSENT_MODULE_NAME.to_string(),
            ));
        }
        Ok(Self { native })
    }

    /// Push configured debug geography and under-age tag to the native SDK,
    /// then refresh consent info for the configured publisher ids.
    ///
    /// Returns `None` when no publisher ids are configured.
    pub async fn apply_config(
        &self,
        config: &ConsentConfig,
    ) -> Result<Option<AdsConsentInfo>, BridgeError> {
        self.set_debug_geography(config.debug_geography).await?;
        if let Some(tag) = config.tag_for_under_age_of_consent {
            self.set_tag_for_under_age_of_consent(tag).await?;
        }
        if config.publisher_ids.is_empty() {
            debug!("no publisher ids configured; skipping consent info update");
            return Ok(None);
        }
        let info = self.request_info_update(&config.publisher_ids).await?;
        Ok(Some(info))
    }

    /// Refresh consent info for the given publisher ids.
    pub async fn request_info_update(
        &self,
        publisher_ids: &[String],
    ) -> Result<AdsConsentInfo, BridgeError> {
        if publisher_ids.is_empty() {
            return Err(BridgeError::InvalidArgument(
                "publisher_ids must contain at least one id".to_string(),
            ));
        }
        if publisher_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(BridgeError::InvalidArgument(
                "publisher_ids must not contain empty ids".to_string(),
            ));
        }
        debug!("requesting consent info (publishers={})", publisher_ids.len());
        Ok(self.native.request_info_update(publisher_ids).await?)
    }

    /// Show the Google-rendered consent form.
    pub async fn show_form(
        &self,
        options: &AdsConsentFormOptions,
    ) -> Result<AdsConsentFormResult, BridgeError> {
        let policy = options.privacy_policy.as_str();
        if !(policy.starts_with("http://") || policy.starts_with("https://")) {
            return Err(BridgeError::InvalidArgument(
                "privacy_policy must be a fully formed http(s) url".to_string(),
            ));
        }
        if !(options.with_personalized_ads
            || options.with_non_personalized_ads
            || options.with_ad_free)
        {
            return Err(BridgeError::InvalidArgument(
                "consent form needs at least one option enabled".to_string(),
            ));
        }
        Ok(self.native.show_form(options).await?)
    }

    pub async fn get_ad_providers(&self) -> Result<Vec<AdProvider>, BridgeError> {
        Ok(self.native.get_ad_providers().await?)
    }

    pub async fn set_debug_geography(
        &self,
        geography: AdsConsentDebugGeography,
    ) -> Result<(), BridgeError> {
        Ok(self.native.set_debug_geography(geography).await?)
    }

    pub async fn set_status(&self, status: AdsConsentStatus) -> Result<(), BridgeError> {
        Ok(self.native.set_status(status).await?)
    }

    pub async fn get_status(&self) -> Result<AdsConsentStatus, BridgeError> {
        Ok(self.native.get_status().await?)
    }

    pub async fn set_tag_for_under_age_of_consent(&self, tag: bool) -> Result<(), BridgeError> {
        Ok(self.native.set_tag_for_under_age_of_consent(tag).await?)
    }

    /// Register a test device id with the consent SDK.
    pub async fn add_test_device(&self, device_id: &str) -> Result<(), BridgeError> {
        if device_id.trim().is_empty() {
            return Err(BridgeError::InvalidArgument(
                "device_id must not be empty".to_string(),
            ));
        }
        Ok(self.native.add_test_device(device_id).await?)
    }
}
