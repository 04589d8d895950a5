//! Per-ad-unit facades over the shared bridge.

mod interstitial;
mod rewarded;

pub use interstitial::InterstitialAd;
pub use rewarded::RewardedVideoAd;

use crate::bridge::AdMobBridge;
use crate::error::BridgeError;
use crate::registry::{Disposer, Listener, listener};
use adbridge_rs_protocol::{
    AdError, AdEvent, AdEventType, AdShowOptions, ListenerError, LogicalEventKey, RequestOptions,
    UpstreamChannel,
};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// State and listener API shared by interstitial and rewarded ads.
///
/// Every registration goes into the bridge registry under this ad's key and is
/// tracked here so [`MobileAd::dispose`] (or dropping the facade) releases all
/// of them.
pub struct MobileAd {
    bridge: AdMobBridge,
    channel: UpstreamChannel,
    ad_unit: String,
    key: LogicalEventKey,
    request: RequestOptions,
    loaded: Arc<AtomicBool>,
    disposers: Mutex<Vec<Disposer>>,
}

impl MobileAd {
    pub(crate) fn new(
        bridge: AdMobBridge,
        channel: UpstreamChannel,
        ad_unit: String,
        request: RequestOptions,
    ) -> Self {
        let key = LogicalEventKey::new(channel, &ad_unit);
        let loaded = Arc::new(AtomicBool::new(false));
        let tracker = {
            let loaded = loaded.clone();
            listener(move |event| {
                match AdEvent::from_native(event) {
                    AdEvent::Loaded => loaded.store(true, Ordering::SeqCst),
                    AdEvent::Closed | AdEvent::FailedToLoad(_) => {
                        loaded.store(false, Ordering::SeqCst)
                    }
                    _ => {}
                }
                Ok(())
            })
        };
        let tracker = bridge.on(key.clone(), tracker);
        debug!("created ad facade (key={})", key);
        Self {
            bridge,
            channel,
            ad_unit,
            key,
            request,
            loaded,
            disposers: Mutex::new(vec![tracker]),
        }
    }

    pub fn ad_unit(&self) -> &str {
        &self.ad_unit
    }

    pub fn channel(&self) -> UpstreamChannel {
        self.channel
    }

    /// Logical key this ad's events are dispatched under.
    pub fn key(&self) -> &LogicalEventKey {
        &self.key
    }

    /// Request options [`MobileAd::load`] sends.
    pub fn request_options(&self) -> &RequestOptions {
        &self.request
    }

    /// Whether the ad has loaded and not since closed or failed.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Listen to every event for this ad unit.
    pub fn on_ad_event<F>(&self, f: F) -> Disposer
    where
        F: Fn(&AdEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.track(listener(move |event| f(&AdEvent::from_native(event))))
    }

    pub fn on_ad_loaded<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_type(AdEventType::Loaded, move |_| f())
    }

    pub fn on_ad_opened<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_type(AdEventType::Opened, move |_| f())
    }

    pub fn on_ad_left_application<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_type(AdEventType::LeftApplication, move |_| f())
    }

    pub fn on_ad_closed<F>(&self, f: F) -> Disposer
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_type(AdEventType::Closed, move |_| f())
    }

    pub fn on_ad_failed_to_load<F>(&self, f: F) -> Disposer
    where
        F: Fn(&AdError) + Send + Sync + 'static,
    {
        self.on_type(AdEventType::FailedToLoad, move |event| {
            if let AdEvent::FailedToLoad(error) = event {
                f(error);
            }
        })
    }

    /// Start loading with the request options this facade was created with.
    pub async fn load(&self) -> Result<(), BridgeError> {
        self.load_with(&self.request).await
    }

    /// Start loading with `options` instead of the facade's own.
    pub async fn load_with(&self, options: &RequestOptions) -> Result<(), BridgeError> {
        self.bridge.ensure_active()?;
        debug!("loading ad (key={})", self.key);
        self.bridge
            .native()
            .load_ad(self.channel, &self.ad_unit, options)
            .await?;
        Ok(())
    }

    /// Show the ad; it must have reported `onAdLoaded` first.
    pub async fn show(&self, options: &AdShowOptions) -> Result<(), BridgeError> {
        self.bridge.ensure_active()?;
        if !self.is_loaded() {
            return Err(BridgeError::NotLoaded(self.ad_unit.clone()));
        }
        debug!("showing ad (key={})", self.key);
        self.bridge
            .native()
            .show_ad(self.channel, &self.ad_unit, options)
            .await?;
        Ok(())
    }

    /// Live bridge registrations held by this facade, including the
    /// load-state tracker.
    pub fn listener_count(&self) -> usize {
        self.disposers
            .lock()
            .iter()
            .filter(|disposer| !disposer.is_disposed())
            .count()
    }

    /// Remove every bridge registration this facade made. Idempotent.
    pub fn dispose(&self) {
        let disposers = std::mem::take(&mut *self.disposers.lock());
        if disposers.is_empty() {
            return;
        }
        debug!(
            "disposing ad facade (key={}, registrations={})",
            self.key,
            disposers.len()
        );
        for disposer in disposers {
            disposer.dispose();
        }
        self.loaded.store(false, Ordering::SeqCst);
    }

    pub(crate) fn on_type<F>(&self, kind: AdEventType, f: F) -> Disposer
    where
        F: Fn(&AdEvent) + Send + Sync + 'static,
    {
        self.on_ad_event(move |event| {
            if event.event_type() == Some(kind) {
                f(event);
            }
            Ok(())
        })
    }

    fn track(&self, listener: Listener) -> Disposer {
        let disposer = self.bridge.on(self.key.clone(), listener);
        let mut disposers = self.disposers.lock();
        disposers.retain(|existing| !existing.is_disposed());
        disposers.push(disposer.clone());
        disposer
    }
}

impl Drop for MobileAd {
    fn drop(&mut self) {
        self.dispose();
    }
}
