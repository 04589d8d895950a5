//! Layer merging.

use serde_json::Value;

/// Fold `overlay` into `base`. Objects merge key by key; anything else,
/// arrays included, replaces what was there.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let slot = base_map.entry(key.as_str()).or_insert(Value::Null);
                merge_json_values(slot, value);
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}
