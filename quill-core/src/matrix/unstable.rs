use std::fmt;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::matrix::{dispatch::RequestDispatcher, error::MatrixError};

/// A group's server-side profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProfile {
    pub name: String,
    /// An `mxc://` URI.
    pub avatar_url: String,
    /// Equivalent to a room's topic.
    pub short_description: String,
    /// Most clients render HTML in this.
    pub long_description: String,
}

/// Outcome of inviting a user to a group.
///
/// Normally `Invite`; `Join` or `Reject` when the invitee's homeserver
/// answered right away. Anything else the server says is kept in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InviteState {
    Join,
    Invite,
    Reject,
    Other(String),
}

impl From<String> for InviteState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "join" => InviteState::Join,
            "invite" => InviteState::Invite,
            "reject" => InviteState::Reject,
            _ => InviteState::Other(s),
        }
    }
}

impl From<InviteState> for String {
    fn from(state: InviteState) -> Self {
        match state {
            InviteState::Join => "join".into(),
            InviteState::Invite => "invite".into(),
            InviteState::Reject => "reject".into(),
            InviteState::Other(s) => s,
        }
    }
}

/// Whether anyone may join a group or only invitees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinPolicy {
    Open,
    Invite,
}

impl JoinPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinPolicy::Open => "open",
            JoinPolicy::Invite => "invite",
        }
    }
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group ("community") endpoints. These are unstable and most homeservers
/// have dropped them; avoid unless you know the server supports them.
///
/// Every call is a single request through the dispatcher. Errors come back
/// exactly as the dispatcher produced them.
pub struct UnstableApis<D> {
    dispatcher: D,
}

impl<D: RequestDispatcher> UnstableApis<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Create a group and return its ID.
    pub async fn create_group(&self, localpart: &str) -> Result<String, MatrixError> {
        let response = self
            .dispatcher
            .do_request(
                Method::POST,
                "/_matrix/client/r0/create_group",
                None,
                Some(json!({ "localpart": localpart })),
            )
            .await?;
        take_string(response, "group_id")
    }

    /// Invite `user_id` to `group_id`.
    pub async fn invite_user_to_group(&self, group_id: &str, user_id: &str) -> Result<InviteState, MatrixError> {
        let path = format!("/_matrix/client/r0/groups/{group_id}/admin/users/invite/{user_id}");
        let response = self
            .dispatcher
            .do_request(Method::PUT, &path, None, Some(json!({})))
            .await?;
        take_string(response, "state").map(InviteState::from)
    }

    pub async fn set_group_profile(&self, group_id: &str, profile: &GroupProfile) -> Result<Value, MatrixError> {
        let path = format!("/_matrix/client/r0/groups/{group_id}/profile");
        let body = serde_json::to_value(profile)?;
        self.dispatcher.do_request(Method::POST, &path, None, Some(body)).await
    }

    pub async fn set_group_join_policy(&self, group_id: &str, policy: JoinPolicy) -> Result<Value, MatrixError> {
        let path = format!("/_matrix/client/r0/groups/{group_id}/settings/m.join_policy");
        let body = json!({ "m.join_policy": { "type": policy } });
        self.dispatcher.do_request(Method::PUT, &path, None, Some(body)).await
    }
}

fn take_string(mut response: Value, field: &'static str) -> Result<String, MatrixError> {
    match response.get_mut(field).map(Value::take) {
        Some(Value::String(s)) => Ok(s),
        _ => Err(MatrixError::MissingField(field)),
    }
}
