use adbridge_rs_protocol::{
    AdShowOptions, NativeError, NativeHandler, NativeModule, NativeSubscription,
    RequestConfiguration, RequestOptions, UpstreamChannel,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Request forwarded to the fake native module.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    SetRequestConfiguration(RequestConfiguration),
    Load {
        channel: UpstreamChannel,
        ad_unit: String,
        options: RequestOptions,
    },
    Show {
        channel: UpstreamChannel,
        ad_unit: String,
        options: AdShowOptions,
    },
}

type HandlerList = Mutex<Vec<(u64, String, NativeHandler)>>;

/// In-process native module: counts subscriptions, fires upstream events on
/// demand, and records delegated requests.
#[derive(Default)]
pub struct FakeNativeModule {
    missing: bool,
    subscribe_calls: AtomicUsize,
    next_id: AtomicU64,
    handlers: Arc<HandlerList>,
    calls: Mutex<Vec<NativeCall>>,
    failure: Mutex<Option<NativeError>>,
}

impl FakeNativeModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Module whose capability flag reports the native SDK as missing.
    pub fn missing() -> Arc<Self> {
        Arc::new(Self {
            missing: true,
            ..Self::default()
        })
    }

    /// Number of `add_listener` calls made so far.
    pub fn subscribe_calls(&self) -> usize {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Listeners currently attached to the emitter.
    pub fn active_subscriptions(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Deliver a raw record on an upstream event name. Returns how many
    /// handlers received it.
    pub fn fire(&self, event_name: &str, raw: Value) -> usize {
        let targets: Vec<NativeHandler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, name, _)| name == event_name)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in &targets {
            handler(raw.clone());
        }
        targets.len()
    }

    /// Deliver `{ adUnit, type }` on the channel's upstream event name.
    pub fn fire_event(&self, channel: UpstreamChannel, ad_unit: &str, kind: &str) -> usize {
        self.fire(
            channel.event_name(),
            json!({ "adUnit": ad_unit, "type": kind }),
        )
    }

    /// Delegated requests received so far.
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    /// Make the next delegated request fail with `error`.
    pub fn fail_next(&self, error: NativeError) {
        *self.failure.lock() = Some(error);
    }

    fn record(&self, call: NativeCall) -> Result<(), NativeError> {
        self.calls.lock().push(call);
        match self.failure.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

struct FakeSubscription {
    handlers: Weak<HandlerList>,
    id: u64,
}

impl NativeSubscription for FakeSubscription {
    fn remove(self: Box<Self>) {
        if let Some(handlers) = self.handlers.upgrade() {
            handlers.lock().retain(|(id, _, _)| *id != self.id);
        }
    }
}

#[async_trait]
impl NativeModule for FakeNativeModule {
    fn name(&self) -> &str {
        "fake"
    }

    fn native_sdk_missing(&self) -> bool {
        self.missing
    }

    fn add_listener(
        &self,
        event_name: &str,
        handler: NativeHandler,
    ) -> Box<dyn NativeSubscription> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.handlers
            .lock()
            .push((id, event_name.to_string(), handler));
        Box::new(FakeSubscription {
            handlers: Arc::downgrade(&self.handlers),
            id,
        })
    }

    async fn set_request_configuration(
        &self,
        config: &RequestConfiguration,
    ) -> Result<(), NativeError> {
        self.record(NativeCall::SetRequestConfiguration(config.clone()))
    }

    async fn load_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        options: &RequestOptions,
    ) -> Result<(), NativeError> {
        self.record(NativeCall::Load {
            channel,
            ad_unit: ad_unit.to_string(),
            options: options.clone(),
        })
    }

    async fn show_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        options: &AdShowOptions,
    ) -> Result<(), NativeError> {
        self.record(NativeCall::Show {
            channel,
            ad_unit: ad_unit.to_string(),
            options: *options,
        })
    }
}
