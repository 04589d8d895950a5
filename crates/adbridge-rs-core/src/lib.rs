//! Core event bridge for native ad SDKs.
//!
//! This crate owns the keyed listener registry, the bridge that fans native
//! upstream events out to per-ad-unit keys, and the typed interstitial,
//! rewarded, and consent facades built on top of it.

pub mod ads;
pub mod bridge;
pub mod consent;
pub mod error;
pub mod registry;

pub use ads::{InterstitialAd, MobileAd, RewardedVideoAd};
pub use bridge::{AdMobBridge, DispatchOptions, DispatchStats, MODULE_NAME};
pub use consent::{AdsConsent, CONSENT_MODULE_NAME};
pub use error::BridgeError;
pub use registry::{DispatchReport, Disposer, EventRegistry, Listener, ListenerId, listener};
