//! The common shape of every synchronized record.

use crate::entities::Status;
use crate::module::SyncModule;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use tracing::warn;

/// A record belonging to one of the synchronized collections.
pub trait Record: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection this record lives in.
    const MODULE: SyncModule;

    fn id(&self) -> &str;

    /// Human-facing name used in activity log entries.
    fn label(&self) -> &str;

    /// Adjusts the raw JSON before deserialization (field aliases etc).
    fn prepare(_value: &mut Value) {}

    /// Fills blank fields with their display fallbacks.
    fn normalize(&mut self) {}

    /// Builds a record from a backend payload.
    ///
    /// Backends are lenient: identifiers may be numbers, named `_id` or
    /// nested under `ref.id`, statuses may differ in case or spacing, and
    /// any field may be `null` or missing. A status nothing matches falls
    /// back to the record's default.
    fn from_backend(mut value: Value) -> serde_json::Result<Self> {
        if let Value::Object(map) = &mut value {
            map.retain(|_, v| !v.is_null());

            if !map.contains_key("id") {
                let fallback = map
                    .get("_id")
                    .or_else(|| map.get("ref").and_then(|r| r.get("id")))
                    .cloned();
                if let Some(id) = fallback {
                    map.insert("id".to_string(), id);
                }
            }
            if let Some(Value::Number(n)) = map.get("id") {
                let id = n.to_string();
                map.insert("id".to_string(), Value::String(id));
            }

            let status = map.get("status").map(|raw| {
                let parsed = raw.as_str().and_then(|s| s.parse::<Status>().ok());
                (parsed, raw.to_string())
            });
            match status {
                Some((Some(status), _)) => {
                    map.insert("status".to_string(), Value::String(status.to_string()));
                }
                Some((None, raw)) => {
                    warn!("unrecognised {} status {raw}, using default", Self::MODULE);
                    map.remove("status");
                }
                None => {}
            }
        }
        Self::prepare(&mut value);
        let mut record: Self = serde_json::from_value(value)?;
        record.normalize();
        Ok(record)
    }
}
