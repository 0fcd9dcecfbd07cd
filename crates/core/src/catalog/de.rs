//! Lenient field deserializers for provider payloads.
//!
//! Xtream panels disagree on JSON types: ids show up as numbers or strings,
//! empty objects are sent as `[]`, and counters are sometimes quoted.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::Episode;

/// Unsigned id from a number or a numeric string.
pub fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom(format!("invalid id: {}", n))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid id: {:?}", s))),
        other => Err(D::Error::custom(format!("invalid id: {}", other))),
    }
}

/// String from a string, number or null (null becomes empty).
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

/// Optional string from a string, number, bool or null.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Counter from a number or a numeric string; anything else is 0.
pub fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Object payload, or the default when the provider sends `[]` or null.
pub fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => T::deserialize(Value::Object(map)).map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// Season number -> episodes.
///
/// Accepts the usual object keyed by season number, an array of episode
/// arrays (seasons numbered from 1), or `[]`/null for no episodes.
pub fn episode_map<'de, D>(deserializer: D) -> Result<BTreeMap<u32, Vec<Episode>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => {
            let mut seasons = BTreeMap::new();
            for (key, episodes) in map {
                let number: u32 = key
                    .trim()
                    .parse()
                    .map_err(|_| D::Error::custom(format!("invalid season key: {:?}", key)))?;
                let episodes: Vec<Episode> =
                    serde_json::from_value(episodes).map_err(D::Error::custom)?;
                seasons.insert(number, episodes);
            }
            Ok(seasons)
        }
        Value::Array(items) => {
            let mut seasons = BTreeMap::new();
            for (idx, episodes) in items.into_iter().enumerate() {
                let episodes: Vec<Episode> =
                    serde_json::from_value(episodes).map_err(D::Error::custom)?;
                seasons.insert(idx as u32 + 1, episodes);
            }
            Ok(seasons)
        }
        _ => Ok(BTreeMap::new()),
    }
}
