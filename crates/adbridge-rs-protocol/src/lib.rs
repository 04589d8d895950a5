//! Wire types shared between the native ads layer and the event bridge.

mod consent;
mod error;
mod event;
mod native;
mod request;

pub use consent::{
    AdProvider, AdsConsentDebugGeography, AdsConsentFormOptions, AdsConsentFormResult,
    AdsConsentInfo, AdsConsentStatus,
};
pub use error::{EventShapeError, ListenerError, NativeError};
pub use event::{
    AdError, AdEvent, AdEventType, EVENT_TYPES, NativeEvent, REWARDED_EVENT_TYPES, Reward,
};
pub use native::{NativeConsent, NativeHandler, NativeModule, NativeSubscription};
pub use request::{
    AdShowOptions, CONTENT_URL_MAX_LEN, MaxAdContentRating, RequestConfiguration, RequestOptions,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream event stream published by the native ads module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamChannel {
    /// Full-screen interstitial ads.
    Interstitial,
    /// Rewarded video ads.
    RewardedVideo,
}

impl UpstreamChannel {
    /// Every upstream channel the bridge subscribes to.
    pub const ALL: [UpstreamChannel; 2] =
        [UpstreamChannel::Interstitial, UpstreamChannel::RewardedVideo];

    /// Event name the native emitter publishes this channel under.
    pub fn event_name(&self) -> &'static str {
        match self {
            UpstreamChannel::Interstitial => "interstitial_event",
            UpstreamChannel::RewardedVideo => "rewarded_video_event",
        }
    }

    /// Prefix used when deriving logical event keys for this channel.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            UpstreamChannel::Interstitial => "interstitial_",
            UpstreamChannel::RewardedVideo => "rewarded_video_",
        }
    }

    /// Resolve a channel from its upstream event name.
    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.event_name() == name)
    }
}

impl fmt::Display for UpstreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Per-ad-unit dispatch key application listeners subscribe against.
///
/// Keys are only ever built through the channel prefix table, either from a
/// channel and ad unit or by parsing an already prefixed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalEventKey(String);

impl LogicalEventKey {
    /// Derive the key for an ad unit on the given channel.
    pub fn new(channel: UpstreamChannel, ad_unit: &str) -> Self {
        Self(format!("{}{}", channel.key_prefix(), ad_unit))
    }

    /// Parse a prefixed key such as `interstitial_abc`. Returns `None` when
    /// no channel prefix matches or the ad unit part is empty.
    pub fn parse(raw: &str) -> Option<Self> {
        UpstreamChannel::ALL.iter().find_map(|channel| {
            raw.strip_prefix(channel.key_prefix())
                .filter(|ad_unit| !ad_unit.is_empty())
                .map(|ad_unit| Self::new(*channel, ad_unit))
        })
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalEventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ad unit ids that always serve test creatives.
pub struct TestIds;

impl TestIds {
    pub const BANNER: &'static str = "ca-app-pub-3940256099942544/6300978111";
    pub const INTERSTITIAL: &'static str = "ca-app-pub-3940256099942544/1033173712";
    pub const REWARDED: &'static str = "ca-app-pub-3940256099942544/5224354917";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keys_carry_channel_prefix() {
        let key = LogicalEventKey::new(UpstreamChannel::Interstitial, "abc");
        assert_eq!(key.as_str(), "interstitial_abc");

        let key = LogicalEventKey::new(UpstreamChannel::RewardedVideo, "abc");
        assert_eq!(key.to_string(), "rewarded_video_abc");
    }

    #[test]
    fn keys_differ_across_channels_and_units() {
        let a = LogicalEventKey::new(UpstreamChannel::Interstitial, "X");
        let b = LogicalEventKey::new(UpstreamChannel::RewardedVideo, "X");
        let c = LogicalEventKey::new(UpstreamChannel::Interstitial, "Y");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn keys_parse_from_prefixed_strings() {
        assert_eq!(
            LogicalEventKey::parse("rewarded_video_abc"),
            Some(LogicalEventKey::new(UpstreamChannel::RewardedVideo, "abc"))
        );
        assert_eq!(LogicalEventKey::parse("interstitial_"), None);
        assert_eq!(LogicalEventKey::parse("banner_abc"), None);
    }

    #[test]
    fn channels_resolve_from_event_names() {
        assert_eq!(
            UpstreamChannel::from_event_name("interstitial_event"),
            Some(UpstreamChannel::Interstitial)
        );
        assert_eq!(
            UpstreamChannel::from_event_name("rewarded_video_event"),
            Some(UpstreamChannel::RewardedVideo)
        );
        assert_eq!(UpstreamChannel::from_event_name("banner_event"), None);
    }
}
