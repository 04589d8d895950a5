//! Request records forwarded to the native module untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum length the native SDK accepts for `contentUrl`.
pub const CONTENT_URL_MAX_LEN: usize = 512;

/// Maximum ad content rating, based on digital content label classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxAdContentRating {
    /// General audiences.
    G,
    /// Parental guidance.
    PG,
    /// Teen.
    T,
    /// Mature audiences.
    MA,
}

impl MaxAdContentRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaxAdContentRating::G => "G",
            MaxAdContentRating::PG => "PG",
            MaxAdContentRating::T => "T",
            MaxAdContentRating::MA => "MA",
        }
    }
}

/// Global settings applied to all future ad requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ad_content_rating: Option<MaxAdContentRating>,
    /// Treat content as child-directed for COPPA purposes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_for_child_directed_treatment: Option<bool>,
    /// Handle requests as for users under the age of consent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_for_under_age_of_consent: Option<bool>,
}

/// Per-request options passed along when an ad is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_non_personalized_ads_only: Option<bool>,
    /// Extra key/value pairs for direct campaign delivery.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub network_extras: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Device ids served test ads; `EMULATOR` for emulators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_devices: Vec<String>,
    /// Content URL for targeting, at most [`CONTENT_URL_MAX_LEN`] characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<String>,
    /// Origin of the request, for mediating third parties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_agent: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_test_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_devices = devices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = Some(url.into());
        self
    }

    pub fn with_request_agent(mut self, agent: impl Into<String>) -> Self {
        self.request_agent = Some(agent.into());
        self
    }
}

/// Options used when showing a loaded ad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdShowOptions {
    /// Android immersive mode; ignored on iOS.
    #[serde(default)]
    pub immersive_mode_enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_options_use_camel_case_and_skip_empty() {
        let options = RequestOptions::new()
            .with_keywords(["fashion", "clothing"])
            .with_request_agent("CoolAds");
        let value = serde_json::to_value(&options).expect("json");
        assert_eq!(
            value,
            json!({ "keywords": ["fashion", "clothing"], "requestAgent": "CoolAds" })
        );
    }

    #[test]
    fn request_configuration_parses_rating() {
        let config: RequestConfiguration = serde_json::from_value(json!({
            "maxAdContentRating": "PG",
            "tagForChildDirectedTreatment": true,
        }))
        .expect("config");
        assert_eq!(config.max_ad_content_rating, Some(MaxAdContentRating::PG));
        assert_eq!(config.tag_for_child_directed_treatment, Some(true));
        assert_eq!(config.tag_for_under_age_of_consent, None);
    }
}
