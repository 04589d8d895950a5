//! End-to-end replay through the public SDK surface.

use adbridge_rs::config::{BridgeConfig, DispatchConfig};
use adbridge_rs::protocol::{MaxAdContentRating, RequestConfiguration, UpstreamChannel};
use adbridge_rs::replay::{self, ReplayError, ReplayRecord, ReplaySummary};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;

fn record(channel: UpstreamChannel, ad_unit: &str, kind: &str) -> ReplayRecord {
    ReplayRecord::new(channel, json!({ "adUnit": ad_unit, "type": kind }))
}

fn scenario() -> Vec<ReplayRecord> {
    vec![
        record(UpstreamChannel::Interstitial, "abc", "onAdLoaded"),
        record(UpstreamChannel::RewardedVideo, "abc", "onAdLoaded"),
        ReplayRecord::new(
            UpstreamChannel::RewardedVideo,
            json!({
                "adUnit": "abc",
                "type": "onRewarded",
                "payload": { "amount": 1, "type": "coin" },
            }),
        ),
        record(UpstreamChannel::Interstitial, "abc", "onAdClosed"),
        record(UpstreamChannel::Interstitial, "other", "onAdLoaded"),
    ]
}

#[tokio::test]
async fn replays_every_key_seen_when_nothing_is_watched() {
    adbridge_rs::init_logging();
    let summary = replay::replay(&BridgeConfig::default(), &scenario(), &[])
        .await
        .expect("replay");

    assert_eq!(
        summary,
        ReplaySummary {
            records: 5,
            unknown_channels: 0,
            received: 5,
            malformed: 0,
            delivered: BTreeMap::from([
                ("interstitial_abc".to_string(), 2),
                ("interstitial_other".to_string(), 1),
                ("rewarded_video_abc".to_string(), 2),
            ]),
        }
    );
}

#[tokio::test]
async fn watched_keys_limit_the_listeners() {
    let watch = vec![
        "rewarded_video_abc".to_string(),
        "interstitial_silent".to_string(),
    ];
    let summary = replay::replay(&BridgeConfig::default(), &scenario(), &watch)
        .await
        .expect("replay");

    assert_eq!(
        summary.delivered,
        BTreeMap::from([
            ("interstitial_silent".to_string(), 0),
            ("rewarded_video_abc".to_string(), 2),
        ])
    );
    assert_eq!(summary.received, 5);
}

#[tokio::test]
async fn invalid_watch_keys_are_rejected() {
    let err = replay::replay(&BridgeConfig::default(), &scenario(), &["banner_x".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, ReplayError::InvalidWatchKey(ref key) if key == "banner_x"));
}

#[tokio::test]
async fn malformed_and_unknown_records_are_counted() {
    let config = BridgeConfig::builder()
        .dispatch(DispatchConfig {
            log_malformed_events: false,
        })
        .request_configuration(RequestConfiguration {
            max_ad_content_rating: Some(MaxAdContentRating::T),
            tag_for_child_directed_treatment: None,
            tag_for_under_age_of_consent: None,
        })
        .build()
        .expect("config");
    let records = vec![
        ReplayRecord {
            channel: "interstitial_event".to_string(),
            event: json!({ "type": "onAdLoaded" }),
        },
        ReplayRecord {
            channel: "banner_event".to_string(),
            event: json!({ "adUnit": "abc", "type": "onAdLoaded" }),
        },
        record(UpstreamChannel::Interstitial, "abc", "onAdOpened"),
    ];

    let summary = replay::replay(&config, &records, &[])
        .await
        .expect("replay");

    assert_eq!(summary.records, 3);
    assert_eq!(summary.unknown_channels, 1);
    assert_eq!(summary.received, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(
        summary.delivered,
        BTreeMap::from([("interstitial_abc".to_string(), 1)])
    );
}

#[tokio::test]
async fn records_round_trip_through_a_jsonl_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    for record in scenario() {
        writeln!(file, "{}", serde_json::to_string(&record).expect("json")).expect("write");
    }
    writeln!(file).expect("write");

    let reader = std::io::BufReader::new(file.reopen().expect("reopen"));
    let records = ReplayRecord::read_all(reader).expect("records");
    assert_eq!(records, scenario());

    let summary = replay::replay(&BridgeConfig::default(), &records, &[])
        .await
        .expect("replay");
    assert_eq!(summary.received, 5);
}
