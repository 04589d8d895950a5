//! Seam between the bridge and the native ads SDK.
//!
//! Everything behind these traits (ad serving, consent storage) belongs to the
//! native layer; the bridge only subscribes to its emitter and forwards
//! requests.

use crate::{
    AdProvider, AdShowOptions, AdsConsentDebugGeography, AdsConsentFormOptions,
    AdsConsentFormResult, AdsConsentInfo, AdsConsentStatus, NativeError, RequestConfiguration,
    RequestOptions, UpstreamChannel,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Callback the native emitter invokes with each raw upstream record.
pub type NativeHandler = Arc<dyn Fn(Value) + Send + Sync>;

/// Handle for a listener registered on the native emitter.
pub trait NativeSubscription: Send {
    /// Detach the listener from the native emitter.
    fn remove(self: Box<Self>);
}

/// Native ads module: capability flag, event emitter, and delegated requests.
#[async_trait]
pub trait NativeModule: Send + Sync {
    /// Module name used in diagnostics.
    fn name(&self) -> &str;

    /// True when the native SDK is not linked into the host app.
    fn native_sdk_missing(&self) -> bool;

    /// Subscribe to an upstream event stream.
    fn add_listener(&self, event_name: &str, handler: NativeHandler)
    -> Box<dyn NativeSubscription>;

    /// Apply global settings to all future ad requests.
    async fn set_request_configuration(
        &self,
        config: &RequestConfiguration,
    ) -> Result<(), NativeError>;

    /// Start loading an ad; the outcome arrives later as upstream events.
    async fn load_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        options: &RequestOptions,
    ) -> Result<(), NativeError>;

    /// Show a previously loaded ad.
    async fn show_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        options: &AdShowOptions,
    ) -> Result<(), NativeError>;
}

/// Native consent SDK.
#[async_trait]
pub trait NativeConsent: Send + Sync {
    fn native_sdk_missing(&self) -> bool;

    async fn request_info_update(
        &self,
        publisher_ids: &[String],
    ) -> Result<AdsConsentInfo, NativeError>;

    async fn show_form(
        &self,
        options: &AdsConsentFormOptions,
    ) -> Result<AdsConsentFormResult, NativeError>;

    async fn get_ad_providers(&self) -> Result<Vec<AdProvider>, NativeError>;

    async fn set_debug_geography(
        &self,
        geography: AdsConsentDebugGeography,
    ) -> Result<(), NativeError>;

    async fn set_status(&self, status: AdsConsentStatus) -> Result<(), NativeError>;

    async fn get_status(&self) -> Result<AdsConsentStatus, NativeError>;

    async fn set_tag_for_under_age_of_consent(&self, tag: bool) -> Result<(), NativeError>;

    /// Mark a device as a test device so debug geography applies to it.
    async fn add_test_device(&self, device_id: &str) -> Result<(), NativeError>;
}
