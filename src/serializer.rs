//! Reversible text serialization for cached item lists.
//!
//! JSON cannot express dates or big integers, so [`SmartSerializer`] encodes
//! them as marked strings: `@` followed by an RFC 3339 instant for dates,
//! `#` followed by decimal digits for big integers. A user string that
//! happens to start with a marker gets its first character doubled on the
//! way out and collapsed back on the way in, so `"@@home"` round-trips to
//! `"@home"` and never turns into a date.
//!
//! Object keys serialize in sorted order, making the blob canonical for a
//! given structural value.
//!
//! ```
//! use cache_manager::{CacheItem, Serializer, SmartSerializer, Value};
//!
//! let serializer = SmartSerializer;
//! let items = vec![CacheItem {
//!     key: Value::from("k"),
//!     value: Value::BigInt(170_141_183_460_469_231_731_687_303_715_884_105_727),
//!     inserted_at: 1_000,
//! }];
//!
//! let blob = serializer.serialize(&items)?;
//! let restored = serializer.deserialize(&blob)?;
//! assert_eq!(restored[0].value, items[0].value);
//! # Ok::<(), cache_manager::CacheError>(())
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value as JsonValue};
use tracing::trace;

use crate::cache::CacheItem;
use crate::error::Result;
use crate::value::Value;

const DATE_MARKER: char = '@';
const BIGINT_MARKER: char = '#';
const MARKERS: [char; 2] = [DATE_MARKER, BIGINT_MARKER];

/// Symmetric codec between an item list and a text blob.
///
/// Used by persistence adapters, not by the engine itself.
pub trait Serializer {
    /// Encodes the complete item list into a text blob.
    fn serialize(&self, items: &[CacheItem<Value, Value>]) -> Result<String>;

    /// Decodes a text blob back into an item list.
    fn deserialize(&self, raw: &str) -> Result<Vec<CacheItem<Value, Value>>>;
}

/// The default codec: JSON with escape markers for non-JSON-native values.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmartSerializer;

impl SmartSerializer {
    fn encode(&self, value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            // NaN and infinities have no JSON form; they degrade to null.
            Value::Float(x) => Number::from_f64(*x)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::BigInt(b) => JsonValue::String(format!("{BIGINT_MARKER}{b}")),
            Value::Date(d) => JsonValue::String(format!(
                "{DATE_MARKER}{}",
                d.to_rfc3339_opts(SecondsFormat::Millis, true)
            )),
            Value::Str(s) => JsonValue::String(escape_collision(s)),
            Value::Array(items) => {
                JsonValue::Array(items.iter().map(|item| self.encode(item)).collect())
            }
            Value::Object(entries) => {
                // serde_json's map is key-ordered, which sorts the output.
                let mut map = Map::new();
                for (key, entry) in entries {
                    map.insert(key.clone(), self.encode(entry));
                }
                JsonValue::Object(map)
            }
        }
    }

    fn decode(&self, value: JsonValue) -> Value {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::BigInt(i128::from(u))
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => revive_string(s),
            JsonValue::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.decode(item)).collect())
            }
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, entry)| (key, self.decode(entry)))
                    .collect(),
            ),
        }
    }
}

impl Serializer for SmartSerializer {
    fn serialize(&self, items: &[CacheItem<Value, Value>]) -> Result<String> {
        let encoded: Vec<JsonValue> = items
            .iter()
            .map(|item| {
                let mut map = Map::new();
                map.insert("key".to_string(), self.encode(&item.key));
                map.insert("set".to_string(), JsonValue::Number(item.inserted_at.into()));
                map.insert("value".to_string(), self.encode(&item.value));
                JsonValue::Object(map)
            })
            .collect();
        Ok(serde_json::to_string(&JsonValue::Array(encoded))?)
    }

    fn deserialize(&self, raw: &str) -> Result<Vec<CacheItem<Value, Value>>> {
        let parsed: JsonValue = serde_json::from_str(raw)?;
        let JsonValue::Array(entries) = parsed else {
            return Ok(Vec::new());
        };

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let JsonValue::Object(mut map) = entry else {
                continue;
            };
            let inserted_at = map.get("set").and_then(JsonValue::as_u64).unwrap_or(0);
            let key = map
                .remove("key")
                .map(|raw_key| self.decode(raw_key))
                .unwrap_or(Value::Null);
            let value = map
                .remove("value")
                .map(|raw_value| self.decode(raw_value))
                .unwrap_or(Value::Null);
            items.push(CacheItem {
                key,
                value,
                inserted_at,
            });
        }
        Ok(items)
    }
}

/// Doubles the first character of strings that collide with a marker.
fn escape_collision(s: &str) -> String {
    match s.chars().next() {
        Some(first) if MARKERS.contains(&first) => format!("{first}{s}"),
        _ => s.to_string(),
    }
}

/// Undoes marker escaping: strips a doubled marker, revives a single one.
fn revive_string(s: String) -> Value {
    let Some(marker) = s.chars().next().filter(|c| MARKERS.contains(c)) else {
        return Value::Str(s);
    };

    let rest = &s[marker.len_utf8()..];
    if rest.starts_with(marker) {
        // Doubled marker: an escaped user string.
        return Value::Str(rest.to_string());
    }

    let revived = match marker {
        DATE_MARKER => DateTime::parse_from_rfc3339(rest)
            .ok()
            .map(|d| Value::Date(d.with_timezone(&Utc))),
        _ => rest.parse::<i128>().ok().map(Value::BigInt),
    };

    match revived {
        Some(value) => value,
        None => {
            // Not a payload this codec wrote; keep the raw text.
            trace!(marker = %marker, "unparsable marked string kept verbatim");
            Value::Str(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn roundtrip(value: Value) -> Value {
        let serializer = SmartSerializer;
        let items = vec![CacheItem {
            key: Value::from("k"),
            value,
            inserted_at: 42,
        }];
        let blob = serializer.serialize(&items).unwrap();
        let mut restored = serializer.deserialize(&blob).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].inserted_at, 42);
        restored.remove(0).value
    }

    #[test]
    fn test_dates_roundtrip_by_instant() {
        let date = Utc.timestamp_millis_opt(1_724_000_000_123).unwrap();
        assert_eq!(roundtrip(Value::Date(date)), Value::Date(date));
    }

    #[test]
    fn test_big_integers_roundtrip() {
        let big = Value::BigInt(i128::MIN);
        assert_eq!(roundtrip(big.clone()), big);
    }

    #[test]
    fn test_marker_collisions_are_escaped() {
        assert_eq!(
            roundtrip(Value::from("@not-a-date")),
            Value::from("@not-a-date")
        );
        assert_eq!(roundtrip(Value::from("#42")), Value::from("#42"));
        assert_eq!(roundtrip(Value::from("plain")), Value::from("plain"));
    }

    #[test]
    fn test_escaped_marker_appears_doubled_on_the_wire() {
        let serializer = SmartSerializer;
        let blob = serializer
            .serialize(&[CacheItem {
                key: Value::from("k"),
                value: Value::from("@home"),
                inserted_at: 0,
            }])
            .unwrap();
        assert!(blob.contains("@@home"), "blob: {blob}");
    }

    #[test]
    fn test_object_keys_serialize_sorted() {
        let serializer = SmartSerializer;
        let blob = serializer
            .serialize(&[CacheItem {
                key: Value::from("k"),
                value: Value::object([("zeta", Value::from(1)), ("alpha", Value::from(2))]),
                inserted_at: 0,
            }])
            .unwrap();
        let zeta = blob.find("zeta").unwrap();
        let alpha = blob.find("alpha").unwrap();
        assert!(alpha < zeta, "blob: {blob}");
    }

    #[test]
    fn test_nested_structures_roundtrip() {
        let value = Value::object([
            ("list", Value::array([Value::from(1), Value::Null])),
            (
                "inner",
                Value::object([("flag", Value::from(true)), ("x", Value::from(0.5))]),
            ),
        ]);
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_nan_degrades_to_null() {
        assert_eq!(roundtrip(Value::Float(f64::NAN)), Value::Null);
    }

    #[test]
    fn test_unparsable_marked_string_is_kept_verbatim() {
        // Decoding a blob someone else wrote: "@tomorrow" is not RFC 3339.
        let serializer = SmartSerializer;
        let items = serializer
            .deserialize(r#"[{"key":"k","set":1,"value":"@tomorrow"}]"#)
            .unwrap();
        assert_eq!(items[0].value, Value::from("@tomorrow"));
    }

    #[test]
    fn test_non_array_blob_decodes_empty() {
        let serializer = SmartSerializer;
        assert!(serializer.deserialize("{}").unwrap().is_empty());
        assert!(serializer.deserialize("null").unwrap().is_empty());
    }
}
