use adbridge_rs_protocol::{
    AdProvider, AdsConsentDebugGeography, AdsConsentFormOptions, AdsConsentFormResult,
    AdsConsentInfo, AdsConsentStatus, NativeConsent, NativeError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Consent request received by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentCall {
    RequestInfoUpdate(Vec<String>),
    ShowForm(AdsConsentFormOptions),
    GetAdProviders,
    SetDebugGeography(AdsConsentDebugGeography),
    SetStatus(AdsConsentStatus),
    GetStatus,
    SetTagForUnderAgeOfConsent(bool),
    AddTestDevice(String),
}

/// Native consent double holding a status in memory.
#[derive(Default)]
pub struct StubConsent {
    missing: bool,
    in_eea: bool,
    status: Mutex<AdsConsentStatus>,
    providers: Vec<AdProvider>,
    calls: Mutex<Vec<ConsentCall>>,
}

impl StubConsent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            missing: true,
            ..Self::default()
        })
    }

    /// Stub reporting a user inside the EEA with the given providers.
    pub fn in_eea(providers: Vec<AdProvider>) -> Arc<Self> {
        Arc::new(Self {
            in_eea: true,
            providers,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<ConsentCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: ConsentCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl NativeConsent for StubConsent {
    fn native_sdk_missing(&self) -> bool {
        self.missing
    }

    async fn request_info_update(
        &self,
        publisher_ids: &[String],
    ) -> Result<AdsConsentInfo, NativeError> {
        self.record(ConsentCall::RequestInfoUpdate(publisher_ids.to_vec()));
        Ok(AdsConsentInfo {
            status: *self.status.lock(),
            is_request_location_in_eea_or_unknown: self.in_eea,
        })
    }

    async fn show_form(
        &self,
        options: &AdsConsentFormOptions,
    ) -> Result<AdsConsentFormResult, NativeError> {
        self.record(ConsentCall::ShowForm(options.clone()));
        let status = if options.with_personalized_ads {
            AdsConsentStatus::Personalized
        } else if options.with_non_personalized_ads {
            AdsConsentStatus::NonPersonalized
        } else {
            AdsConsentStatus::Unknown
        };
        *self.status.lock() = status;
        Ok(AdsConsentFormResult {
            status,
            user_prefers_ad_free: status == AdsConsentStatus::Unknown && options.with_ad_free,
        })
    }

    async fn get_ad_providers(&self) -> Result<Vec<AdProvider>, NativeError> {
        self.record(ConsentCall::GetAdProviders);
        Ok(self.providers.clone())
    }

    async fn set_debug_geography(
        &self,
        geography: AdsConsentDebugGeography,
    ) -> Result<(), NativeError> {
        self.record(ConsentCall::SetDebugGeography(geography));
        Ok(())
    }

    async fn set_status(&self, status: AdsConsentStatus) -> Result<(), NativeError> {
        self.record(ConsentCall::SetStatus(status));
        *self.status.lock() = status;
        Ok(())
    }

    async fn get_status(&self) -> Result<AdsConsentStatus, NativeError> {
        self.record(ConsentCall::GetStatus);
        Ok(*self.status.lock())
    }

    async fn set_tag_for_under_age_of_consent(&self, tag: bool) -> Result<(), NativeError> {
        self.record(ConsentCall::SetTagForUnderAgeOfConsent(tag));
        Ok(())
    }

    async fn add_test_device(&self, device_id: &str) -> Result<(), NativeError> {
        self.record(ConsentCall::AddTestDevice(device_id.to_string()));
        Ok(())
    }
}
