//! Tests for the interstitial and rewarded facades.

use adbridge_rs_config::BridgeConfig;
use adbridge_rs_core::{AdMobBridge, BridgeError};
use adbridge_rs_protocol::{
    AdError, AdEvent, AdShowOptions, NativeError, RequestOptions, Reward, UpstreamChannel,
};
use adbridge_rs_test_utils::{FakeNativeModule, NativeCall};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, mpsc};
use std::time::Duration;

fn setup() -> (Arc<FakeNativeModule>, AdMobBridge) {
    let native = FakeNativeModule::new();
    let bridge = AdMobBridge::new(native.clone()).expect("bridge");
    (native, bridge)
}

fn log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Named callbacks fire only for their own event type.
#[test]
fn interstitial_named_callbacks() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let seen = log();

    let s = seen.clone();
    let _loaded = ad.on_ad_loaded(move || s.lock().push("loaded".to_string()));
    let s = seen.clone();
    let _opened = ad.on_ad_opened(move || s.lock().push("opened".to_string()));
    let s = seen.clone();
    let _left = ad.on_ad_left_application(move || s.lock().push("left".to_string()));
    let s = seen.clone();
    let _closed = ad.on_ad_closed(move || s.lock().push("closed".to_string()));

    for kind in [
        "onAdLoaded",
        "onAdOpened",
        "onAdLeftApplication",
        "onAdClosed",
    ] {
        native.fire_event(UpstreamChannel::Interstitial, "abc", kind);
    }

    assert_eq!(*seen.lock(), vec!["loaded", "opened", "left", "closed"]);
}

/// Failed loads surface the native error info.
#[test]
fn failed_to_load_carries_error() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let _disposer = ad.on_ad_failed_to_load(move |error| sink.lock().push(error.clone()));

    native.fire(
        "interstitial_event",
        json!({
            "adUnit": "abc",
            "type": "onAdFailedToLoad",
            "payload": { "code": "admob/no-fill", "message": "No ad to show" },
        }),
    );

    assert_eq!(
        *errors.lock(),
        vec![AdError {
            code: "admob/no-fill".to_string(),
            message: "No ad to show".to_string(),
        }]
    );
}

/// Generic listeners see every event as a typed value.
#[test]
fn on_ad_event_sees_typed_events() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _disposer = ad.on_ad_event(move |event| {
        sink.lock().push(event.clone());
        Ok(())
    });

    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdImpression");

    assert_eq!(
        *events.lock(),
        vec![AdEvent::Loaded, AdEvent::Other("onAdImpression".to_string())]
    );
}

/// Rewarded facades receive rewarded-channel events only.
#[test]
fn rewarded_callbacks_use_rewarded_channel() {
    let (native, bridge) = setup();
    let rewarded = bridge.rewarded("abc");
    let interstitial = bridge.interstitial("abc");
    let rewards = Arc::new(Mutex::new(Vec::new()));
    let sink = rewards.clone();
    let _reward = rewarded.on_rewarded(move |reward| sink.lock().push(reward.clone()));
    let seen = log();
    let s = seen.clone();
    let _started = rewarded.on_video_started(move || s.lock().push("started".to_string()));
    let s = seen.clone();
    let _completed = rewarded.on_video_completed(move || s.lock().push("completed".to_string()));
    let s = seen.clone();
    let _interstitial = interstitial.on_ad_loaded(move || s.lock().push("wrong".to_string()));

    native.fire_event(UpstreamChannel::RewardedVideo, "abc", "onAdLoaded");
    native.fire_event(UpstreamChannel::RewardedVideo, "abc", "onRewardedVideoStarted");
    native.fire(
        "rewarded_video_event",
        json!({
            "adUnit": "abc",
            "type": "onRewarded",
            "payload": { "amount": 5, "type": "coins" },
        }),
    );
    native.fire_event(UpstreamChannel::RewardedVideo, "abc", "onRewardedVideoCompleted");

    assert_eq!(*seen.lock(), vec!["started", "completed"]);
    assert_eq!(
        *rewards.lock(),
        vec![Reward {
            amount: 5.0,
            reward_type: "coins".to_string(),
        }]
    );
    assert!(rewarded.is_loaded());
    assert!(!interstitial.is_loaded());
}

/// Loaded state follows the event stream.
#[test]
fn loaded_state_tracks_events() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    assert!(!ad.is_loaded());

    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    assert!(ad.is_loaded());
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdOpened");
    assert!(ad.is_loaded());
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdClosed");
    assert!(!ad.is_loaded());

    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdFailedToLoad");
    assert!(!ad.is_loaded());
}

/// Dispose removes every registration the facade made.
#[test]
fn dispose_releases_all_registrations() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let seen = log();
    let s = seen.clone();
    let _loaded = ad.on_ad_loaded(move || s.lock().push("loaded".to_string()));
    let _closed = ad.on_ad_closed(|| {});
    assert_eq!(ad.listener_count(), 3);
    assert_eq!(bridge.registry().listener_count(ad.key()), 3);

    ad.dispose();
    ad.dispose();

    assert_eq!(ad.listener_count(), 0);
    assert!(!bridge.has_listeners(ad.key()));
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    assert!(seen.lock().is_empty());
    assert!(!ad.is_loaded());
}

/// Repeated create/drop cycles do not grow the registry.
#[test]
fn dropping_facades_does_not_leak_listeners() {
    let (_native, bridge) = setup();
    for _ in 0..10 {
        let ad = bridge.rewarded("cycle");
        let _disposer = ad.on_ad_loaded(|| {});
        let _reward = ad.on_rewarded(|_| {});
    }
    assert!(bridge.registry().keys().is_empty());
}

/// A single disposer removes only its own registration.
#[test]
fn single_disposer_leaves_other_callbacks() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let seen = log();
    let s = seen.clone();
    let first = ad.on_ad_loaded(move || s.lock().push("first".to_string()));
    let s = seen.clone();
    let _second = ad.on_ad_loaded(move || s.lock().push("second".to_string()));

    first.dispose();
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");

    assert_eq!(*seen.lock(), vec!["second"]);
    assert_eq!(ad.listener_count(), 2);
}

/// Load and show are delegated; show requires a loaded ad.
#[tokio::test]
async fn load_and_show_are_delegated() {
    let (native, bridge) = setup();
    let ad = bridge.interstitial("abc");
    let options = RequestOptions::new().with_request_agent("CoolAds");

    ad.load_with(&options).await.expect("load");
    let err = ad.show(&AdShowOptions::default()).await.unwrap_err();
    assert!(matches!(err, BridgeError::NotLoaded(ref unit) if unit == "abc"));

    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    let show = AdShowOptions {
        immersive_mode_enabled: true,
    };
    ad.show(&show).await.expect("show");

    assert_eq!(
        native.calls(),
        vec![
            NativeCall::Load {
                channel: UpstreamChannel::Interstitial,
                ad_unit: "abc".to_string(),
                options,
            },
            NativeCall::Show {
                channel: UpstreamChannel::Interstitial,
                ad_unit: "abc".to_string(),
                options: show,
            },
        ]
    );
}

/// Native failures surface as bridge errors.
#[tokio::test]
async fn native_failures_propagate() {
    let (native, bridge) = setup();
    let ad = bridge.rewarded("abc");
    native.fail_next(NativeError::Failed {
        code: "admob/invalid-request".to_string(),
        message: "bad unit".to_string(),
    });

    let err = ad.load().await.unwrap_err();

    assert!(matches!(err, BridgeError::Native(NativeError::Failed { .. })));
    assert!(err.to_string().contains("admob/invalid-request"));
}

/// Configured default request options reach the native load call.
#[tokio::test]
async fn configured_default_request_is_used_by_load() {
    let native = FakeNativeModule::new();
    let default_request = RequestOptions::new()
        .with_keywords(["games"])
        .with_test_devices(["EMULATOR"]);
    let config = BridgeConfig::builder()
        .default_request(default_request.clone())
        .build()
        .expect("config");
    let bridge = AdMobBridge::from_config(native.clone(), &config).expect("bridge");
    assert_eq!(bridge.default_request(), &default_request);

    let interstitial = bridge.interstitial("abc");
    let rewarded = bridge.rewarded("def");
    assert_eq!(interstitial.request_options(), &default_request);
    interstitial.load().await.expect("load");
    rewarded.load().await.expect("load");

    assert_eq!(
        native.calls(),
        vec![
            NativeCall::Load {
                channel: UpstreamChannel::Interstitial,
                ad_unit: "abc".to_string(),
                options: default_request.clone(),
            },
            NativeCall::Load {
                channel: UpstreamChannel::RewardedVideo,
                ad_unit: "def".to_string(),
                options: default_request,
            },
        ]
    );
}

/// Facades created for a specific request ignore the bridge default.
#[tokio::test]
async fn facades_for_request_load_with_their_own_options() {
    let native = FakeNativeModule::new();
    let config = BridgeConfig::builder()
        .default_request(RequestOptions::new().with_request_agent("Default"))
        .build()
        .expect("config");
    let bridge = AdMobBridge::from_config(native.clone(), &config).expect("bridge");
    let own = RequestOptions::new().with_content_url("https://example.com/article");

    let ad = bridge.rewarded_for_request("abc", own.clone());
    ad.load().await.expect("load");

    assert_eq!(
        native.calls(),
        vec![NativeCall::Load {
            channel: UpstreamChannel::RewardedVideo,
            ad_unit: "abc".to_string(),
            options: own,
        }]
    );
}

/// A callback may dispose the facade that owns it; siblings still see the
/// current event and nothing runs afterwards.
#[test]
fn callback_can_dispose_its_own_facade() {
    let (native, bridge) = setup();
    let ad = Arc::new(bridge.interstitial("abc"));
    let seen = log();

    let weak = Arc::downgrade(&ad);
    let s = seen.clone();
    let _first = ad.on_ad_loaded(move || {
        s.lock().push("first".to_string());
        if let Some(ad) = weak.upgrade() {
            ad.dispose();
        }
    });
    let s = seen.clone();
    let _second = ad.on_ad_loaded(move || s.lock().push("second".to_string()));

    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");
    native.fire_event(UpstreamChannel::Interstitial, "abc", "onAdLoaded");

    assert_eq!(*seen.lock(), vec!["first", "second"]);
    assert_eq!(ad.listener_count(), 0);
    assert!(!bridge.has_listeners(ad.key()));
}

/// Disposing a facade whose callback owns another facade releases both
/// without blocking.
#[test]
fn disposing_a_facade_that_owns_another_does_not_block() {
    let (_native, bridge) = setup();
    let interstitial = bridge.interstitial("a");
    let next = bridge.rewarded("b");
    let _closed = interstitial.on_ad_closed(move || {
        let _ = next.is_loaded();
    });

    let (done_tx, done_rx) = mpsc::channel();
    let worker = std::thread::spawn(move || {
        interstitial.dispose();
        drop(interstitial);
        let _ = done_tx.send(());
    });

    done_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("dispose finished");
    worker.join().expect("worker");
    assert!(bridge.registry().keys().is_empty());
}
