//! Native event records and their typed views.

use crate::EventShapeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Raw lifecycle event delivered by the native ads module.
///
/// Shaped as `{ adUnit, type, ...payload }` on the wire. Immutable once
/// decoded; listeners only ever see shared references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NativeEvent {
    #[serde(rename = "adUnit")]
    ad_unit: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    payload: Map<String, Value>,
}

impl NativeEvent {
    /// Build an event with an empty payload.
    pub fn new(ad_unit: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            ad_unit: ad_unit.into(),
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// Attach an extra payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Decode an upstream JSON record, rejecting records without `adUnit`/`type`.
    pub fn from_value(value: Value) -> Result<Self, EventShapeError> {
        let Value::Object(mut map) = value else {
            return Err(EventShapeError::NotAnObject);
        };
        let ad_unit = take_string(&mut map, "adUnit")?;
        let kind = take_string(&mut map, "type")?;
        Ok(Self {
            ad_unit,
            kind,
            payload: map,
        })
    }

    /// Ad unit the event belongs to.
    pub fn ad_unit(&self) -> &str {
        &self.ad_unit
    }

    /// Raw event type discriminator (e.g. `onAdLoaded`).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Channel specific payload fields.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Detail object: the nested `payload` object when present, else the top level fields.
    fn detail(&self) -> &Map<String, Value> {
        match self.payload.get("payload") {
            Some(Value::Object(inner)) => inner,
            _ => &self.payload,
        }
    }
}

fn take_string(map: &mut Map<String, Value>, field: &'static str) -> Result<String, EventShapeError> {
    match map.remove(field) {
        Some(Value::String(value)) => Ok(value),
        _ => Err(EventShapeError::MissingField(field)),
    }
}

/// Named event constants application code may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdEventType {
    #[serde(rename = "onAdLoaded")]
    Loaded,
    #[serde(rename = "onAdOpened")]
    Opened,
    #[serde(rename = "onAdLeftApplication")]
    LeftApplication,
    #[serde(rename = "onAdClosed")]
    Closed,
    #[serde(rename = "onAdFailedToLoad")]
    FailedToLoad,
    /// Rewarded only: the user earned the reward.
    #[serde(rename = "onRewarded")]
    Rewarded,
    /// Rewarded only: video playback started.
    #[serde(rename = "onRewardedVideoStarted")]
    VideoStarted,
    /// Rewarded only: video playback completed.
    #[serde(rename = "onRewardedVideoCompleted")]
    VideoCompleted,
}

/// Event types shared by every full-screen ad.
pub const EVENT_TYPES: [AdEventType; 5] = [
    AdEventType::Loaded,
    AdEventType::Opened,
    AdEventType::LeftApplication,
    AdEventType::Closed,
    AdEventType::FailedToLoad,
];

/// Event types only rewarded video ads emit.
pub const REWARDED_EVENT_TYPES: [AdEventType; 3] = [
    AdEventType::Rewarded,
    AdEventType::VideoStarted,
    AdEventType::VideoCompleted,
];

impl AdEventType {
    /// Wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdEventType::Loaded => "onAdLoaded",
            AdEventType::Opened => "onAdOpened",
            AdEventType::LeftApplication => "onAdLeftApplication",
            AdEventType::Closed => "onAdClosed",
            AdEventType::FailedToLoad => "onAdFailedToLoad",
            AdEventType::Rewarded => "onRewarded",
            AdEventType::VideoStarted => "onRewardedVideoStarted",
            AdEventType::VideoCompleted => "onRewardedVideoCompleted",
        }
    }

    /// Parse a wire name; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        EVENT_TYPES
            .into_iter()
            .chain(REWARDED_EVENT_TYPES)
            .find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for AdEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error info attached to `onAdFailedToLoad`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdError {
    pub code: String,
    pub message: String,
}

/// Reward info attached to `onRewarded`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub amount: f64,
    #[serde(rename = "type")]
    pub reward_type: String,
}

/// Typed view over a [`NativeEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum AdEvent {
    Loaded,
    Opened,
    LeftApplication,
    Closed,
    FailedToLoad(AdError),
    Rewarded(Reward),
    VideoStarted,
    VideoCompleted,
    /// Event type this crate does not know about.
    Other(String),
}

impl AdEvent {
    /// Translate a raw event. Missing payload fields fall back to defaults.
    pub fn from_native(event: &NativeEvent) -> Self {
        let Some(kind) = AdEventType::parse(event.kind()) else {
            return AdEvent::Other(event.kind().to_string());
        };
        let detail = event.detail();
        match kind {
            AdEventType::Loaded => AdEvent::Loaded,
            AdEventType::Opened => AdEvent::Opened,
            AdEventType::LeftApplication => AdEvent::LeftApplication,
            AdEventType::Closed => AdEvent::Closed,
            AdEventType::FailedToLoad => AdEvent::FailedToLoad(AdError {
                code: string_field(detail, "code"),
                message: string_field(detail, "message"),
            }),
            AdEventType::Rewarded => AdEvent::Rewarded(Reward {
                amount: number_field(detail, "amount"),
                reward_type: string_field(detail, "type"),
            }),
            AdEventType::VideoStarted => AdEvent::VideoStarted,
            AdEventType::VideoCompleted => AdEvent::VideoCompleted,
        }
    }

    /// Event type constant for this event, if it is a known one.
    pub fn event_type(&self) -> Option<AdEventType> {
        match self {
            AdEvent::Loaded => Some(AdEventType::Loaded),
            AdEvent::Opened => Some(AdEventType::Opened),
            AdEvent::LeftApplication => Some(AdEventType::LeftApplication),
            AdEvent::Closed => Some(AdEventType::Closed),
            AdEvent::FailedToLoad(_) => Some(AdEventType::FailedToLoad),
            AdEvent::Rewarded(_) => Some(AdEventType::Rewarded),
            AdEvent::VideoStarted => Some(AdEventType::VideoStarted),
            AdEvent::VideoCompleted => Some(AdEventType::VideoCompleted),
            AdEvent::Other(_) => None,
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        _ => String::new(),
    }
}

fn number_field(map: &Map<String, Value>, key: &str) -> f64 {
    match map.get(key) {
        Some(Value::Number(value)) => value.as_f64().unwrap_or_default(),
        Some(Value::String(value)) => value.parse().unwrap_or_default(),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_upstream_record() {
        let event = NativeEvent::from_value(json!({
            "adUnit": "abc",
            "type": "onAdLoaded",
            "extra": 1,
        }))
        .expect("event");
        assert_eq!(event.ad_unit(), "abc");
        assert_eq!(event.kind(), "onAdLoaded");
        assert_eq!(event.payload().get("extra"), Some(&json!(1)));
    }

    #[test]
    fn rejects_records_without_discriminators() {
        assert_eq!(
            NativeEvent::from_value(json!({ "type": "onAdLoaded" })),
            Err(EventShapeError::MissingField("adUnit"))
        );
        assert_eq!(
            NativeEvent::from_value(json!({ "adUnit": "abc", "type": 3 })),
            Err(EventShapeError::MissingField("type"))
        );
        assert_eq!(
            NativeEvent::from_value(json!("onAdLoaded")),
            Err(EventShapeError::NotAnObject)
        );
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let event = NativeEvent::new("abc", "onAdClosed").with_field("extra", json!(true));
        let value = serde_json::to_value(&event).expect("json");
        assert_eq!(
            value,
            json!({ "adUnit": "abc", "type": "onAdClosed", "extra": true })
        );
    }

    #[test]
    fn translates_error_and_reward_payloads() {
        let failed = NativeEvent::new("abc", "onAdFailedToLoad").with_field(
            "payload",
            json!({ "code": "admob/no-fill", "message": "no ad" }),
        );
        assert_eq!(
            AdEvent::from_native(&failed),
            AdEvent::FailedToLoad(AdError {
                code: "admob/no-fill".to_string(),
                message: "no ad".to_string(),
            })
        );

        let rewarded = NativeEvent::new("abc", "onRewarded")
            .with_field("payload", json!({ "amount": 10, "type": "coins" }));
        assert_eq!(
            AdEvent::from_native(&rewarded),
            AdEvent::Rewarded(Reward {
                amount: 10.0,
                reward_type: "coins".to_string(),
            })
        );
    }

    #[test]
    fn unknown_types_are_kept_as_other() {
        let event = NativeEvent::new("abc", "onAdImpression");
        let typed = AdEvent::from_native(&event);
        assert_eq!(typed, AdEvent::Other("onAdImpression".to_string()));
        assert_eq!(typed.event_type(), None);
    }

    #[test]
    fn event_type_names_round_trip_through_parse() {
        for kind in EVENT_TYPES.into_iter().chain(REWARDED_EVENT_TYPES) {
            assert_eq!(AdEventType::parse(kind.as_str()), Some(kind));
        }
    }
}
