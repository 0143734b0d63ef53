//! Matrix client building blocks: typed views over raw event JSON, rich
//! reply content, and endpoint helpers over a pluggable request dispatcher.

pub mod events;
pub mod matrix;
pub mod reply;
