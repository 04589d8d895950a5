//! Public SDK surface for adbridge.
//!
//! This crate re-exports the bridge building blocks, provides the event
//! replay harness used by the `adbridge` binary, and a small logging helper.

/// Re-export for convenience.
pub use adbridge_rs_config as config;
pub use adbridge_rs_core as core;
/// Re-export for convenience.
pub use adbridge_rs_protocol as protocol;

pub mod replay;

pub use replay::{ReplayError, ReplayNativeModule, ReplayRecord, ReplaySummary};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
