//! Configuration schema for the ad event bridge.

use adbridge_rs_protocol::{
    AdsConsentDebugGeography, CONTENT_URL_MAX_LEN, RequestConfiguration, RequestOptions,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root config for the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BridgeConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Global request configuration the application forwards to the native module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_configuration: Option<RequestConfiguration>,
    /// Request options given to ad facades created without their own.
    #[serde(default)]
    pub default_request: RequestOptions,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub consent: ConsentConfig,
}

impl BridgeConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Validate invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let request = &self.default_request;
        if let Some(url) = &request.content_url {
            let len = url.chars().count();
            if len > CONTENT_URL_MAX_LEN {
                return Err(ConfigError::invalid(
                    "default_request.contentUrl",
                    format!("length {len} exceeds {CONTENT_URL_MAX_LEN}"),
                ));
            }
        }
        ensure_non_empty(&request.keywords, "default_request.keywords")?;
        ensure_non_empty(&request.test_devices, "default_request.testDevices")?;
        ensure_non_empty(&self.consent.publisher_ids, "consent.publisher_ids")?;
        Ok(())
    }
}

fn ensure_non_empty(values: &[String], path: &str) -> Result<(), ConfigError> {
    match values.iter().position(|value| value.trim().is_empty()) {
        Some(idx) => Err(ConfigError::invalid(
            format!("{path}[{idx}]"),
            "must not be empty",
        )),
        None => Ok(()),
    }
}

/// Builder for assembling a `BridgeConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_configuration(mut self, request_configuration: RequestConfiguration) -> Self {
        self.config.request_configuration = Some(request_configuration);
        self
    }

    pub fn default_request(mut self, default_request: RequestOptions) -> Self {
        self.config.default_request = default_request;
        self
    }

    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    pub fn consent(mut self, consent: ConsentConfig) -> Self {
        self.config.consent = consent;
        self
    }

    /// Finalize, running the same validation as file-based loading.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// How the bridge treats upstream events during dispatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Log dropped malformed events at warn level instead of debug.
    #[serde(default = "default_true")]
    pub log_malformed_events: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            log_malformed_events: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Consent settings handed to the consent facade.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConsentConfig {
    /// Publisher ids `AdsConsent::apply_config` requests a consent info update for.
    #[serde(default)]
    pub publisher_ids: Vec<String>,
    #[serde(default)]
    pub debug_geography: AdsConsentDebugGeography,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_for_under_age_of_consent: Option<bool>,
}
