// Rich replies: content for a message that quotes the event it answers.

use serde::{Deserialize, Serialize};

use crate::events::RawEvent;

/// The only `format` value Matrix defines for `formatted_body`.
pub const HTML_FORMAT: &str = "org.matrix.custom.html";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InReplyTo {
    pub event_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatesTo {
    #[serde(rename = "m.in_reply_to")]
    pub in_reply_to: InReplyTo,
}

/// Content of a reply: a relation to the original event plus a plain-text and
/// HTML quotation of it for clients that don't understand the relation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyContent {
    #[serde(rename = "m.relates_to")]
    pub relates_to: RelatesTo,
    pub body: String,
    pub format: String,
    pub formatted_body: String,
}

pub struct RichReply;

impl RichReply {
    /// Build the content that replies to `event` (in `room_id`) with the given
    /// text and HTML.
    ///
    /// Never fails: missing `sender`, `event_id`, `body` or `formatted_body`
    /// are quoted as empty strings. `formatted_body` of the original is
    /// embedded as-is, without escaping.
    pub fn create_for(room_id: &str, event: &RawEvent, with_text: &str, with_html: &str) -> ReplyContent {
        let sender = event.sender().unwrap_or_default();
        let event_id = event.event_id().unwrap_or_default();
        let original_body = content_str(event, "body");
        let original_html = content_str(event, "formatted_body");

        let fallback_text = format!("> <{sender}> {}", original_body.replace('\n', "\n> "));
        let fallback_html = format!(
            "<mx-reply><blockquote>\
             <a href=\"https://matrix.to/#/{room_id}/{event_id}\">In reply to</a>\
             <a href=\"https://matrix.to/#/{sender}\">{sender}</a>\
             <br />{original_html}\
             </blockquote></mx-reply>"
        );

        ReplyContent {
            relates_to: RelatesTo { in_reply_to: InReplyTo { event_id: event_id.to_owned() } },
            body: format!("{fallback_text}\n\n{with_text}"),
            format: HTML_FORMAT.to_owned(),
            formatted_body: fallback_html + with_html,
        }
    }
}

fn content_str<'a>(event: &'a RawEvent, key: &str) -> &'a str {
    event
        .content()
        .and_then(|c| c.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
}
