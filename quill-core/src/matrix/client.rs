use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::{
    events::{EventContent, RawEvent},
    matrix::{
        dispatch::RequestDispatcher,
        error::MatrixError,
        http::{ClientConfig, HttpDispatcher},
        unstable::UnstableApis,
    },
    reply::RichReply,
};

/// Characters left alone when a room, event, or user ID goes into a path.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Quill's handle to a Matrix account.
///
/// One instance per access token. Everything higher-level (room helpers,
/// replies, group APIs) goes through the dispatcher held here.
pub struct MatrixClient<D = HttpDispatcher> {
    dispatcher: D,
}

impl MatrixClient<HttpDispatcher> {
    /// Client talking HTTP to the homeserver named in `config`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_dispatcher(HttpDispatcher::new(config))
    }

    /// Client configured from `QUILL_HS` / `QUILL_TOKEN`.
    pub fn from_env() -> Result<Self, MatrixError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }
}

impl<D: RequestDispatcher> MatrixClient<D> {
    pub fn with_dispatcher(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        body: Option<Value>,
    ) -> Result<Value, MatrixError> {
        self.dispatcher.do_request(method, path, query, body).await
    }

    /// Group APIs over this client's dispatcher.
    pub fn unstable_apis(&self) -> UnstableApis<&D> {
        UnstableApis::new(&self.dispatcher)
    }

    /// The user ID the access token belongs to.
    pub async fn whoami(&self) -> Result<String, MatrixError> {
        let response = self
            .do_request(Method::GET, "/_matrix/client/r0/account/whoami", None, None)
            .await?;
        response
            .get("user_id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(MatrixError::MissingField("user_id"))
    }

    pub async fn get_event(&self, room_id: &str, event_id: &str) -> Result<RawEvent, MatrixError> {
        let path = format!(
            "/_matrix/client/r0/rooms/{}/event/{}",
            encode(room_id),
            encode(event_id)
        );
        let response = self.do_request(Method::GET, &path, None, None).await?;
        Ok(RawEvent::from_value(response))
    }

    /// Content of the `C` state event at `state_key`, as the server sent it.
    ///
    /// The state endpoint only returns content, so the result is wrapped into
    /// a [`RawEvent`] carrying `type`, `room_id`, `state_key` and `content`.
    /// Wrap it in the matching typed view to read it.
    pub async fn get_state_event<C: EventContent>(
        &self,
        room_id: &str,
        state_key: &str,
    ) -> Result<RawEvent, MatrixError> {
        let path = format!(
            "/_matrix/client/r0/rooms/{}/state/{}/{}",
            encode(room_id),
            encode(C::EVENT_TYPE),
            encode(state_key)
        );
        let content = self.do_request(Method::GET, &path, None, None).await?;

        let mut fields = Map::new();
        fields.insert("type".into(), C::EVENT_TYPE.into());
        fields.insert("room_id".into(), room_id.into());
        fields.insert("state_key".into(), state_key.into());
        fields.insert("content".into(), content);
        Ok(RawEvent::new(fields))
    }

    /// Send `content` as an `m.room.message`. Returns the new event ID.
    pub async fn send_message<T: Serialize>(
        &self,
        room_id: &str,
        txn_id: &str,
        content: &T,
    ) -> Result<String, MatrixError> {
        let path = format!(
            "/_matrix/client/r0/rooms/{}/send/m.room.message/{}",
            encode(room_id),
            encode(txn_id)
        );
        let body = serde_json::to_value(content)?;
        let response = self.do_request(Method::PUT, &path, None, Some(body)).await?;
        response
            .get("event_id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(MatrixError::MissingField("event_id"))
    }

    /// Reply to `event` with a rich reply. Returns the new event ID.
    pub async fn reply_to(
        &self,
        room_id: &str,
        event: &RawEvent,
        text: &str,
        html: &str,
    ) -> Result<String, MatrixError> {
        let mut content = serde_json::to_value(RichReply::create_for(room_id, event, text, html))?;
        if let Some(fields) = content.as_object_mut() {
            fields.insert("msgtype".into(), "m.text".into());
        }

        let txn_id = Uuid::new_v4().to_string();
        let event_id = self.send_message(room_id, &txn_id, &content).await?;
        info!("replied to {} in {room_id} with {event_id}", event.event_id().unwrap_or("?"));
        Ok(event_id)
    }
}
