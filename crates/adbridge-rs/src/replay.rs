//! Offline replay of recorded native events through a live bridge.
//!
//! Records are JSON lines of the form
//! `{ "channel": "interstitial_event", "event": { "adUnit": "...", "type": "..." } }`.
//! Each one is handed to a [`ReplayNativeModule`], which plays the part of the
//! native emitter, so the bridge sees exactly what a device would have sent.

use adbridge_rs_config::BridgeConfig;
use adbridge_rs_core::{AdMobBridge, BridgeError, Disposer, listener};
use adbridge_rs_protocol::{
    AdShowOptions, LogicalEventKey, NativeError, NativeEvent, NativeHandler, NativeModule,
    NativeSubscription, RequestConfiguration, RequestOptions, UpstreamChannel,
};
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read events: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid watch key `{0}`")]
    InvalidWatchKey(String),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// One recorded upstream delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    /// Upstream event name the record was published under.
    pub channel: String,
    /// Raw record as the native emitter sent it.
    pub event: Value,
}

impl ReplayRecord {
    pub fn new(channel: UpstreamChannel, event: Value) -> Self {
        Self {
            channel: channel.event_name().to_string(),
            event,
        }
    }

    /// Read JSON-lines records, skipping blank lines.
    pub fn read_all(reader: impl BufRead) -> Result<Vec<Self>, ReplayError> {
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| {
                ReplayError::InvalidRecord {
                    line: index + 1,
                    source,
                }
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Key the record dispatches to, if its channel and ad unit are usable.
    pub fn key(&self) -> Option<LogicalEventKey> {
        let channel = UpstreamChannel::from_event_name(&self.channel)?;
        let ad_unit = self.event.get("adUnit")?.as_str()?;
        Some(LogicalEventKey::new(channel, ad_unit))
    }
}

/// Outcome of a replay run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Records read from the input.
    pub records: usize,
    /// Records skipped because their channel is not an upstream channel.
    pub unknown_channels: usize,
    /// Records the bridge received from the replay emitter.
    pub received: u64,
    /// Records the bridge dropped for a missing `adUnit`/`type`.
    pub malformed: u64,
    /// Events observed per watched key.
    pub delivered: BTreeMap<String, usize>,
}

type Handlers = Mutex<Vec<(u64, String, NativeHandler)>>;

/// Native module stand-in that emits recorded events on demand.
///
/// Ad loading and showing have no meaning offline and are reported as
/// unsupported; request configuration is kept so callers can inspect it.
#[derive(Default)]
pub struct ReplayNativeModule {
    next_id: AtomicU64,
    handlers: Arc<Handlers>,
    request_configuration: Mutex<Option<RequestConfiguration>>,
}

impl ReplayNativeModule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hand a record to every handler subscribed to its channel. Returns the
    /// number of handlers reached.
    pub fn deliver(&self, record: &ReplayRecord) -> usize {
        let targets: Vec<NativeHandler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(_, event_name, _)| *event_name == record.channel)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in &targets {
            handler(record.event.clone());
        }
        targets.len()
    }

    /// Last request configuration pushed by the bridge.
    pub fn request_configuration(&self) -> Option<RequestConfiguration> {
        self.request_configuration.lock().clone()
    }

    pub fn subscription_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

struct ReplaySubscription {
    handlers: Weak<Handlers>,
    id: u64,
}

impl NativeSubscription for ReplaySubscription {
    fn remove(self: Box<Self>) {
        if let Some(handlers) = self.handlers.upgrade() {
            handlers.lock().retain(|(id, _, _)| *id != self.id);
        }
    }
}

#[async_trait]
impl NativeModule for ReplayNativeModule {
    fn name(&self) -> &str {
        "replay"
    }

    fn native_sdk_missing(&self) -> bool {
        false
    }

    fn add_listener(
        &self,
        event_name: &str,
        handler: NativeHandler,
    ) -> Box<dyn NativeSubscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .push((id, event_name.to_string(), handler));
        Box::new(ReplaySubscription {
            handlers: Arc::downgrade(&self.handlers),
            id,
        })
    }

    async fn set_request_configuration(
        &self,
        config: &RequestConfiguration,
    ) -> Result<(), NativeError> {
        *self.request_configuration.lock() = Some(config.clone());
        Ok(())
    }

    async fn load_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        _options: &RequestOptions,
    ) -> Result<(), NativeError> {
        Err(NativeError::Unsupported(format!(
            "load {ad_unit} on {channel} during replay"
        )))
    }

    async fn show_ad(
        &self,
        channel: UpstreamChannel,
        ad_unit: &str,
        _options: &AdShowOptions,
    ) -> Result<(), NativeError> {
        Err(NativeError::Unsupported(format!(
            "show {ad_unit} on {channel} during replay"
        )))
    }
}

/// Drive `records` through a bridge built from `config`.
///
/// A counting listener is attached to each key in `watch`, or to every key
/// the records address when `watch` is empty.
pub async fn replay(
    config: &BridgeConfig,
    records: &[ReplayRecord],
    watch: &[String],
) -> Result<ReplaySummary, ReplayError> {
    let keys: BTreeSet<LogicalEventKey> = if watch.is_empty() {
        records.iter().filter_map(ReplayRecord::key).collect()
    } else {
        watch
            .iter()
            .map(|raw| {
                LogicalEventKey::parse(raw)
                    .ok_or_else(|| ReplayError::InvalidWatchKey(raw.clone()))
            })
            .collect::<Result<_, _>>()?
    };

    let native = ReplayNativeModule::new();
    let bridge = AdMobBridge::from_config(native.clone(), config)?;
    if let Some(request_configuration) = &config.request_configuration {
        bridge
            .set_request_configuration(request_configuration)
            .await?;
    }

    let delivered: Arc<Mutex<BTreeMap<String, usize>>> = Arc::new(Mutex::new(
        keys.iter().map(|key| (key.to_string(), 0)).collect(),
    ));
    let disposers: Vec<Disposer> = keys
        .iter()
        .map(|key| {
            let delivered = delivered.clone();
            let name = key.to_string();
            bridge.on(
                key.clone(),
                listener(move |event: &NativeEvent| {
                    info!("{} <- {}", name, event.kind());
                    *delivered.lock().entry(name.clone()).or_insert(0) += 1;
                    Ok(())
                }),
            )
        })
        .collect();
    debug!(
        "replaying records (records={}, watched_keys={})",
        records.len(),
        disposers.len()
    );

    let mut summary = ReplaySummary {
        records: records.len(),
        ..ReplaySummary::default()
    };
    for record in records {
        if UpstreamChannel::from_event_name(&record.channel).is_none() {
            warn!("skipping record on unknown channel {}", record.channel);
            summary.unknown_channels += 1;
            continue;
        }
        native.deliver(record);
    }

    for disposer in &disposers {
        disposer.dispose();
    }
    let stats = bridge.stats();
    bridge.destroy();

    summary.received = stats.received;
    summary.malformed = stats.malformed;
    summary.delivered = std::mem::take(&mut *delivered.lock());
    Ok(summary)
}
