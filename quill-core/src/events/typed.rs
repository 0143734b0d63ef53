use std::{marker::PhantomData, ops::Deref};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::events::raw::RawEvent;

/// A content shape with a fixed Matrix event type.
pub trait EventContent {
    const EVENT_TYPE: &'static str;
}

/// A borrowed view of a [`RawEvent`] whose content is asserted to be `C`.
///
/// The assertion is never checked. Construction always succeeds and the
/// content view points straight at the raw event's `content` object, so
/// whatever the homeserver sent is what the getters see.
pub struct TypedEvent<'a, C> {
    raw: &'a RawEvent,
    _shape: PhantomData<fn() -> C>,
}

impl<'a, C> TypedEvent<'a, C> {
    pub fn new(raw: &'a RawEvent) -> Self {
        Self { raw, _shape: PhantomData }
    }

    pub fn raw(&self) -> &'a RawEvent {
        self.raw
    }

    pub fn sender(&self) -> Option<&'a str> {
        self.raw.sender()
    }

    pub fn event_id(&self) -> Option<&'a str> {
        self.raw.event_id()
    }

    pub fn content(&self) -> Content<'a, C> {
        Content { fields: self.raw.content(), _shape: PhantomData }
    }
}

impl<C> Clone for TypedEvent<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for TypedEvent<'_, C> {}

/// The `content` object of a [`TypedEvent`], viewed as shape `C`.
///
/// Specific content shapes add their semantic getters as inherent impls on
/// `Content<'_, TheirShape>`.
pub struct Content<'a, C> {
    fields: Option<&'a Map<String, Value>>,
    _shape: PhantomData<fn() -> C>,
}

impl<'a, C> Content<'a, C> {
    /// The underlying object, or `None` if the event carried no object content.
    pub fn as_map(&self) -> Option<&'a Map<String, Value>> {
        self.fields
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|f| f.get(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Strict, opt-in parse into `C`. Absent content parses as `{}`.
    pub fn deserialize(&self) -> Result<C, serde_json::Error>
    where
        C: DeserializeOwned,
    {
        let value = Value::Object(self.fields.cloned().unwrap_or_default());
        serde_json::from_value(value)
    }
}

impl<C> Clone for Content<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Content<'_, C> {}

/// A [`TypedEvent`] scoped to a `(room, state_key)` pair.
pub struct StateEvent<'a, C>(TypedEvent<'a, C>);

impl<'a, C> StateEvent<'a, C> {
    pub fn new(raw: &'a RawEvent) -> Self {
        Self(TypedEvent::new(raw))
    }

    pub fn state_key(&self) -> Option<&'a str> {
        self.0.raw().state_key()
    }
}

impl<'a, C> Deref for StateEvent<'a, C> {
    type Target = TypedEvent<'a, C>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<C> Clone for StateEvent<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for StateEvent<'_, C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Topic {
        topic: String,
    }

    #[test]
    fn content_is_the_raw_object() {
        let raw = RawEvent::from_value(json!({
            "sender": "@alice:example.org",
            "event_id": "$1",
            "content": { "topic": "rust" },
        }));
        let event = TypedEvent::<Topic>::new(&raw);

        assert!(std::ptr::eq(event.content().as_map().unwrap(), raw.content().unwrap()));
        assert_eq!(event.sender(), Some("@alice:example.org"));
        assert_eq!(event.event_id(), Some("$1"));
        assert_eq!(event.content().get_str("topic"), Some("rust"));
    }

    #[test]
    fn construction_never_validates() {
        let raw = RawEvent::from_value(json!({ "content": { "topic": 7 } }));
        let event = TypedEvent::<Topic>::new(&raw);

        assert_eq!(event.content().get_str("topic"), None);
        assert_eq!(event.content().get("topic"), Some(&json!(7)));
        assert!(event.content().deserialize().is_err());
    }

    #[test]
    fn missing_content_reads_as_empty() {
        let raw = RawEvent::from_value(json!({ "sender": "@alice:example.org" }));
        let event = TypedEvent::<Topic>::new(&raw);

        assert!(event.content().as_map().is_none());
        assert_eq!(event.content().get("topic"), None);
    }

    #[test]
    fn strict_parse_when_asked() {
        let raw = RawEvent::from_value(json!({ "content": { "topic": "rust" } }));
        let parsed = TypedEvent::<Topic>::new(&raw).content().deserialize().unwrap();
        assert_eq!(parsed, Topic { topic: "rust".into() });
    }

    #[test]
    fn state_event_exposes_state_key() {
        let raw = RawEvent::from_value(json!({ "state_key": "", "content": {} }));
        let event = StateEvent::<Topic>::new(&raw);
        assert_eq!(event.state_key(), Some(""));
        assert_eq!(event.sender(), None);
    }
}
