// Event models: raw homeserver JSON plus narrowly typed views over it.

mod join_rules;
mod raw;
mod typed;

pub use join_rules::{JoinRule, JoinRulesContent, JoinRulesEvent};
pub use raw::RawEvent;
pub use typed::{Content, EventContent, StateEvent, TypedEvent};
