use super::MobileAd;
use crate::bridge::AdMobBridge;
use crate::registry::Disposer;
use adbridge_rs_protocol::{AdEvent, AdEventType, RequestOptions, Reward, UpstreamChannel};
use std::ops::Deref;

/// Rewarded video ad bound to one ad unit.
pub struct RewardedVideoAd {
    ad: MobileAd,
}

impl RewardedVideoAd {
    pub(crate) fn new(bridge: AdMobBridge, ad_unit: String, request: RequestOptions) -> Self {
        Self {
            ad: MobileAd::new(bridge, UpstreamChannel::RewardedVideo, ad_unit, request),
        }
    }

    /// Called when the user earned the reward.
    pub fn on_rewarded<F>(&self, f: F) -> Disposer
    where
        F: Fn(&Reward) + Send + Sync + 'static,
    {
        self.ad.on_type(AdEventType::Rewarded, move |event| {
            if let AdEvent::Rewarded(reward) = event {
                f(reward);
            }
        })
    }

    pub fn on_video_started<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ad.on_type(AdEventType::VideoStarted, move |_| f())
    }

    pub fn on_video_completed<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.ad.on_type(AdEventType::VideoCompleted, move |_| f())
    }
}

impl Deref for RewardedVideoAd {
    type Target = MobileAd;

    fn deref(&self) -> &MobileAd {
        &self.ad
    }
}
