//! Event bridge between the native ads emitter and application listeners.

use crate::ads::{InterstitialAd, RewardedVideoAd};
use crate::error::BridgeError;
use crate::registry::{DispatchReport, Disposer, EventRegistry, Listener};
use adbridge_rs_config::{BridgeConfig, DispatchConfig};
use adbridge_rs_protocol::{
    LogicalEventKey, NativeEvent, NativeHandler, NativeModule, NativeSubscription,
    RequestConfiguration, RequestOptions, UpstreamChannel,
};
use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Name reported when the native ads SDK is missing.
pub const MODULE_NAME: &str = "admob";

/// Dispatch behavior taken from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Log malformed upstream events at warn level (debug otherwise).
    pub log_malformed_events: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            log_malformed_events: true,
        }
    }
}

impl From<&DispatchConfig> for DispatchOptions {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            log_malformed_events: config.log_malformed_events,
        }
    }
}

/// Counters for upstream records seen by the bridge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Records received from the native emitter.
    pub received: u64,
    /// Records dropped for missing `adUnit`/`type`.
    pub malformed: u64,
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    malformed: AtomicU64,
}

struct BridgeShared {
    native: Arc<dyn NativeModule>,
    registry: EventRegistry,
    counters: Arc<Counters>,
    default_request: RequestOptions,
    subscriptions: Mutex<Vec<Box<dyn NativeSubscription>>>,
    destroyed: AtomicBool,
}

impl BridgeShared {
    fn teardown(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        info!(
            "tearing down admob bridge (native={}, subscriptions={})",
            self.native.name(),
            subscriptions.len()
        );
        for subscription in subscriptions {
            subscription.remove();
        }
    }
}

impl Drop for BridgeShared {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Subscribes to the native upstream channels and re-emits each event under
/// its per-ad-unit [`LogicalEventKey`].
///
/// Create exactly one bridge per native module; a second bridge on the same
/// emitter would deliver every event twice. Clones share one bridge.
#[derive(Clone)]
pub struct AdMobBridge {
    shared: Arc<BridgeShared>,
}

impl AdMobBridge {
    /// Build a bridge with default dispatch options.
    pub fn new(native: Arc<dyn NativeModule>) -> Result<Self, BridgeError> {
        Self::with_options(native, DispatchOptions::default())
    }

    /// Build a bridge, subscribing once to every upstream channel.
    ///
    /// Fails with [`BridgeError::MissingNativeCapability`] before touching the
    /// emitter when the native SDK is absent.
    pub fn with_options(
        native: Arc<dyn NativeModule>,
        options: DispatchOptions,
    ) -> Result<Self, BridgeError> {
        Self::build(native, options, RequestOptions::default())
    }

    /// Build a bridge from loaded config: dispatch options apply to every
    /// upstream record and `default_request` becomes the request options of
    /// facades created without their own.
    pub fn from_config(
        native: Arc<dyn NativeModule>,
        config: &BridgeConfig,
    ) -> Result<Self, BridgeError> {
        Self::build(
            native,
            DispatchOptions::from(&config.dispatch),
            config.default_request.clone(),
        )
    }

    fn build(
        native: Arc<dyn NativeModule>,
        options: DispatchOptions,
        default_request: RequestOptions,
    ) -> Result<Self, BridgeError> {
        if native.native_sdk_missing() {
            warn!("native sdk missing (module={})", MODULE_NAME);
            return Err(BridgeError::MissingNativeCapability(MODULE_NAME.to_string()));
        }

        let registry = EventRegistry::new();
        let counters = Arc::new(Counters::default());
        let subscriptions = UpstreamChannel::ALL
            .into_iter()
            .map(|channel| {
                debug!("subscribing to upstream channel {}", channel);
                let handler =
                    upstream_handler(channel, registry.clone(), counters.clone(), options);
                native.add_listener(channel.event_name(), handler)
            })
            .collect::<Vec<_>>();

        info!(
            "admob bridge ready (native={}, channels={})",
            native.name(),
            subscriptions.len()
        );
        Ok(Self {
            shared: Arc::new(BridgeShared {
                native,
                registry,
                counters,
                default_request,
                subscriptions: Mutex::new(subscriptions),
                destroyed: AtomicBool::new(false),
            }),
        })
    }

    /// Request options given to facades created without their own.
    pub fn default_request(&self) -> &RequestOptions {
        &self.shared.default_request
    }

    /// Registry application listeners are kept in.
    pub fn registry(&self) -> &EventRegistry {
        &self.shared.registry
    }

    /// Register `listener` under `key`; see [`EventRegistry::on`].
    pub fn on(&self, key: LogicalEventKey, listener: Listener) -> Disposer {
        self.shared.registry.on(key, listener)
    }

    /// Remove the first registration of `listener` under `key`.
    pub fn off(&self, key: &LogicalEventKey, listener: &Listener) -> bool {
        self.shared.registry.off(key, listener)
    }

    /// Deliver `event` to a snapshot of the listeners under `key`.
    pub fn emit(&self, key: &LogicalEventKey, event: &NativeEvent) -> DispatchReport {
        self.shared.registry.emit(key, event)
    }

    /// Whether any listener is registered under `key`.
    pub fn has_listeners(&self, key: &LogicalEventKey) -> bool {
        self.shared.registry.has_listeners(key)
    }

    /// Facade for an interstitial ad unit, loading with the bridge's
    /// default request options.
    pub fn interstitial(&self, ad_unit: impl Into<String>) -> InterstitialAd {
        self.interstitial_for_request(ad_unit, self.default_request().clone())
    }

    /// Facade for an interstitial ad unit that loads with `request`.
    pub fn interstitial_for_request(
        &self,
        ad_unit: impl Into<String>,
        request: RequestOptions,
    ) -> InterstitialAd {
        InterstitialAd::new(self.clone(), ad_unit.into(), request)
    }

    /// Facade for a rewarded video ad unit, loading with the bridge's
    /// default request options.
    pub fn rewarded(&self, ad_unit: impl Into<String>) -> RewardedVideoAd {
        self.rewarded_for_request(ad_unit, self.default_request().clone())
    }

    /// Facade for a rewarded video ad unit that loads with `request`.
    pub fn rewarded_for_request(
        &self,
        ad_unit: impl Into<String>,
        request: RequestOptions,
    ) -> RewardedVideoAd {
        RewardedVideoAd::new(self.clone(), ad_unit.into(), request)
    }

    /// Forward global request settings to the native module.
    pub async fn set_request_configuration(
        &self,
        config: &RequestConfiguration,
    ) -> Result<(), BridgeError> {
        self.ensure_active()?;
        self.shared.native.set_request_configuration(config).await?;
        Ok(())
    }

    /// Counters for records received so far.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            received: self.shared.counters.received.load(Ordering::Relaxed),
            malformed: self.shared.counters.malformed.load(Ordering::Relaxed),
        }
    }

    /// Release the native subscriptions. Idempotent; also runs when the last
    /// clone (including those held by ad facades) is dropped.
    pub fn destroy(&self) {
        self.shared.teardown();
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn native(&self) -> &Arc<dyn NativeModule> {
        &self.shared.native
    }

    pub(crate) fn ensure_active(&self) -> Result<(), BridgeError> {
        if self.is_destroyed() {
            Err(BridgeError::Destroyed)
        } else {
            Ok(())
        }
    }
}

fn upstream_handler(
    channel: UpstreamChannel,
    registry: EventRegistry,
    counters: Arc<Counters>,
    options: DispatchOptions,
) -> NativeHandler {
    Arc::new(move |raw: Value| {
        dispatch_upstream(channel, &registry, &counters, options, raw);
    })
}

fn dispatch_upstream(
    channel: UpstreamChannel,
    registry: &EventRegistry,
    counters: &Counters,
    options: DispatchOptions,
    raw: Value,
) {
    counters.received.fetch_add(1, Ordering::Relaxed);
    let event = match NativeEvent::from_value(raw) {
        Ok(event) => event,
        Err(err) => {
            counters.malformed.fetch_add(1, Ordering::Relaxed);
            if options.log_malformed_events {
                warn!("dropping malformed event on {}: {}", channel, err);
            } else {
                debug!("dropping malformed event on {}: {}", channel, err);
            }
            return;
        }
    };

    let key = LogicalEventKey::new(channel, event.ad_unit());
    // Inspection only; dispatch below is unconditional.
    if !registry.has_listeners(&key) {
        trace!("no listeners for {} (type={})", key, event.kind());
    }
    registry.emit(&key, &event);
}
