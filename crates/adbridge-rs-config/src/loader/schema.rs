//! Schema validation for bridge JSON5 configuration layers.
//!
//! The accepted shape is described as static field tables so each layer can
//! be checked before merging, with errors naming the layer and dotted path.

use crate::ConfigError;
use serde_json::Value;

#[derive(Clone, Copy)]
enum Kind {
    Bool,
    String,
    StringList,
    StringMap,
    /// String drawn from a fixed set.
    Enum {
        name: &'static str,
        values: &'static [&'static str],
    },
    /// Integer code in `0..=max`.
    Code { name: &'static str, max: u64 },
    Block(&'static [Field]),
}

type Field = (&'static str, Kind);

const REQUEST_CONFIGURATION: &[Field] = &[
    (
        "maxAdContentRating",
        Kind::Enum {
            name: "content rating",
            values: &["G", "PG", "T", "MA"],
        },
    ),
    ("tagForChildDirectedTreatment", Kind::Bool),
    ("tagForUnderAgeOfConsent", Kind::Bool),
];

const DEFAULT_REQUEST: &[Field] = &[
    ("requestNonPersonalizedAdsOnly", Kind::Bool),
    ("networkExtras", Kind::StringMap),
    ("keywords", Kind::StringList),
    ("testDevices", Kind::StringList),
    ("contentUrl", Kind::String),
    ("location", Kind::StringList),
    ("requestAgent", Kind::String),
];

const DISPATCH: &[Field] = &[("log_malformed_events", Kind::Bool)];

const CONSENT: &[Field] = &[
    ("publisher_ids", Kind::StringList),
    (
        "debug_geography",
        Kind::Code {
            name: "debug geography",
            max: 2,
        },
    ),
    ("tag_for_under_age_of_consent", Kind::Bool),
];

const ROOT: &[Field] = &[
    ("$schema", Kind::String),
    ("request_configuration", Kind::Block(REQUEST_CONFIGURATION)),
    ("default_request", Kind::Block(DEFAULT_REQUEST)),
    ("dispatch", Kind::Block(DISPATCH)),
    ("consent", Kind::Block(CONSENT)),
];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    check(value, Kind::Block(ROOT), layer, "")
}

fn check(value: &Value, kind: Kind, layer: &str, path: &str) -> Result<(), ConfigError> {
    let fail = |message: String| {
        let path = if path.is_empty() { "root" } else { path };
        Err(ConfigError::invalid(format!("{layer}:{path}"), message))
    };

    match kind {
        Kind::Bool if value.is_boolean() => Ok(()),
        Kind::Bool => fail("expected bool".to_string()),
        Kind::String if value.is_string() => Ok(()),
        Kind::String => fail("expected string".to_string()),
        Kind::Enum { name, values } => match value.as_str() {
            Some(found) if values.contains(&found) => Ok(()),
            Some(_) => fail(format!(
                "invalid {name} (expected one of {})",
                values.join(", ")
            )),
            None => fail("expected string".to_string()),
        },
        Kind::Code { name, max } => match value.as_u64() {
            Some(code) if code <= max => Ok(()),
            Some(_) => fail(format!("invalid {name} (expected 0..={max})")),
            None => fail("expected integer".to_string()),
        },
        Kind::StringList => {
            let Value::Array(items) = value else {
                return fail("expected array".to_string());
            };
            for (idx, item) in items.iter().enumerate() {
                check(item, Kind::String, layer, &format!("{path}[{idx}]"))?;
            }
            Ok(())
        }
        Kind::StringMap => {
            let Value::Object(map) = value else {
                return fail("expected object".to_string());
            };
            for (key, item) in map {
                check(item, Kind::String, layer, &join_path(path, key))?;
            }
            Ok(())
        }
        Kind::Block(fields) => {
            let Value::Object(map) = value else {
                return fail("expected object".to_string());
            };
            for (key, item) in map {
                let child = join_path(path, key);
                match fields.iter().find(|(name, _)| *name == key.as_str()) {
                    Some((_, kind)) => check(item, *kind, layer, &child)?,
                    None => {
                        return Err(ConfigError::invalid(
                            format!("{layer}:{child}"),
                            "unknown key",
                        ));
                    }
                }
            }
            Ok(())
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
