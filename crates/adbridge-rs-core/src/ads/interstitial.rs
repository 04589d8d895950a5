use super::MobileAd;
use crate::bridge::AdMobBridge;
use adbridge_rs_protocol::{RequestOptions, UpstreamChannel};
use std::ops::Deref;

/// Full-screen interstitial ad bound to one ad unit.
pub struct InterstitialAd {
    ad: MobileAd,
}

impl InterstitialAd {
    pub(crate) fn new(bridge: AdMobBridge, ad_unit: String, request: RequestOptions) -> Self {
        Self {
            ad: MobileAd::new(bridge, UpstreamChannel::Interstitial, ad_unit, request),
        }
    }
}

impl Deref for InterstitialAd {
    type Target = MobileAd;

    fn deref(&self) -> &MobileAd {
        &self.ad
    }
}
