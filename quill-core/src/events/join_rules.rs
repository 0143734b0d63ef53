use std::fmt;

use serde::{Deserialize, Serialize};

use crate::events::typed::{Content, EventContent, StateEvent};

/// Who may join a room.
///
/// Homeservers are free to send values outside the four defined by the
/// protocol; those come through as [`JoinRule::Other`] unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JoinRule {
    Public,
    Knock,
    Invite,
    Private,
    Other(String),
}

impl JoinRule {
    pub fn as_str(&self) -> &str {
        match self {
            JoinRule::Public => "public",
            JoinRule::Knock => "knock",
            JoinRule::Invite => "invite",
            JoinRule::Private => "private",
            JoinRule::Other(s) => s,
        }
    }
}

impl From<&str> for JoinRule {
    fn from(s: &str) -> Self {
        match s {
            "public" => JoinRule::Public,
            "knock" => JoinRule::Knock,
            "invite" => JoinRule::Invite,
            "private" => JoinRule::Private,
            other => JoinRule::Other(other.to_owned()),
        }
    }
}

impl From<String> for JoinRule {
    fn from(s: String) -> Self {
        JoinRule::from(s.as_str())
    }
}

impl From<JoinRule> for String {
    fn from(rule: JoinRule) -> Self {
        match rule {
            JoinRule::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for JoinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of `m.room.join_rules`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRulesContent {
    pub join_rule: JoinRule,
}

impl JoinRulesContent {
    pub fn new(join_rule: JoinRule) -> Self {
        Self { join_rule }
    }
}

impl EventContent for JoinRulesContent {
    const EVENT_TYPE: &'static str = "m.room.join_rules";
}

impl Content<'_, JoinRulesContent> {
    /// `join_rule` as sent, or `None` if absent or not a string.
    pub fn join_rule(&self) -> Option<JoinRule> {
        self.get_str("join_rule").map(JoinRule::from)
    }
}

/// An `m.room.join_rules` state event.
pub type JoinRulesEvent<'a> = StateEvent<'a, JoinRulesContent>;

impl JoinRulesEvent<'_> {
    /// The join rule for the room.
    pub fn rule(&self) -> Option<JoinRule> {
        self.content().join_rule()
    }
}
