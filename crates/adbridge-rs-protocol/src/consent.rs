//! Consent records exchanged with the native consent SDK.
//!
//! Status and debug geography travel as small integers, matching the values
//! the native side reports.

use serde::{Deserialize, Serialize};

/// Consent status of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdsConsentStatus {
    /// Consent must be requested if the user is in the EEA or location is unknown.
    #[default]
    Unknown,
    /// User accepted non-personalized ads.
    NonPersonalized,
    /// User accepted personalized ads.
    Personalized,
}

impl From<AdsConsentStatus> for u8 {
    fn from(status: AdsConsentStatus) -> Self {
        match status {
            AdsConsentStatus::Unknown => 0,
            AdsConsentStatus::NonPersonalized => 1,
            AdsConsentStatus::Personalized => 2,
        }
    }
}

impl TryFrom<u8> for AdsConsentStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AdsConsentStatus::Unknown),
            1 => Ok(AdsConsentStatus::NonPersonalized),
            2 => Ok(AdsConsentStatus::Personalized),
            other => Err(format!("invalid consent status: {other}")),
        }
    }
}

/// Debug location override for consent testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AdsConsentDebugGeography {
    #[default]
    Disabled,
    Eea,
    NotEea,
}

impl From<AdsConsentDebugGeography> for u8 {
    fn from(geography: AdsConsentDebugGeography) -> Self {
        match geography {
            AdsConsentDebugGeography::Disabled => 0,
            AdsConsentDebugGeography::Eea => 1,
            AdsConsentDebugGeography::NotEea => 2,
        }
    }
}

impl TryFrom<u8> for AdsConsentDebugGeography {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AdsConsentDebugGeography::Disabled),
            1 => Ok(AdsConsentDebugGeography::Eea),
            2 => Ok(AdsConsentDebugGeography::NotEea),
            other => Err(format!("invalid debug geography: {other}")),
        }
    }
}

/// Result of a consent info update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdsConsentInfo {
    pub status: AdsConsentStatus,
    pub is_request_location_in_eea_or_unknown: bool,
}

/// Options for the Google-rendered consent form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdsConsentFormOptions {
    /// Fully formed HTTP or HTTPS privacy policy URL.
    pub privacy_policy: String,
    #[serde(default)]
    pub with_personalized_ads: bool,
    #[serde(default)]
    pub with_non_personalized_ads: bool,
    #[serde(default)]
    pub with_ad_free: bool,
}

/// Outcome of the consent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdsConsentFormResult {
    pub status: AdsConsentStatus,
    pub user_prefers_ad_free: bool,
}

/// Ad technology provider listed in the consent form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdProvider {
    pub company_id: String,
    pub company_name: String,
    pub privacy_policy_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn consent_info_decodes_numeric_status() {
        let info: AdsConsentInfo = serde_json::from_value(json!({
            "status": 2,
            "isRequestLocationInEeaOrUnknown": true,
        }))
        .expect("info");
        assert_eq!(info.status, AdsConsentStatus::Personalized);
        assert!(info.is_request_location_in_eea_or_unknown);
    }

    #[test]
    fn out_of_range_status_is_rejected() {
        let err = serde_json::from_value::<AdsConsentStatus>(json!(7)).unwrap_err();
        assert!(err.to_string().contains("invalid consent status"));
    }
}
