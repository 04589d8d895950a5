//! Test helpers shared across adbridge crates.

pub mod consent;
pub mod listener;
pub mod native;

pub use consent::{ConsentCall, StubConsent};
pub use listener::RecordingListener;
pub use native::{FakeNativeModule, NativeCall};
