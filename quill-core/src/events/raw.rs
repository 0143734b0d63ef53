use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event exactly as the homeserver delivered it.
///
/// Nothing beyond "is a JSON object" is checked on the way in. Every accessor
/// returns `None` when the field is missing or has the wrong JSON type, so a
/// half-formed event from an odd homeserver is still readable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap an arbitrary JSON value. Anything other than an object becomes an
    /// empty event.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn sender(&self) -> Option<&str> {
        self.get_str("sender")
    }

    pub fn event_id(&self) -> Option<&str> {
        self.get_str("event_id")
    }

    /// The `type` field, e.g. `m.room.message`.
    pub fn event_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    pub fn room_id(&self) -> Option<&str> {
        self.get_str("room_id")
    }

    /// Present only on state events.
    pub fn state_key(&self) -> Option<&str> {
        self.get_str("state_key")
    }

    pub fn origin_server_ts(&self) -> Option<u64> {
        self.0.get("origin_server_ts").and_then(Value::as_u64)
    }

    /// The `content` object. A missing or non-object `content` reads as `None`.
    pub fn content(&self) -> Option<&Map<String, Value>> {
        self.0.get("content").and_then(Value::as_object)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
