//! Print a room's join rule.
//!
//! Run from the workspace root:
//!   cargo run -p quill-core --example join_rules -- '!room:example.org'
//!
//! Env vars:
//!   QUILL_HS     http://localhost:8448 (default)
//!   QUILL_TOKEN  access token (required)
//!   RUST_LOG     quill_core=debug (default)

use std::env;

use anyhow::Context;
use quill_core::{
    events::{JoinRulesContent, JoinRulesEvent},
    matrix::MatrixClient,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "quill_core=debug".into()),
        )
        .init();

    let room_id = env::args().nth(1).context("usage: join_rules <room_id>")?;

    let client = MatrixClient::from_env()?;
    info!("connected as {}", client.whoami().await?);

    let raw = client
        .get_state_event::<JoinRulesContent>(&room_id, "")
        .await?;
    let rule = JoinRulesEvent::new(&raw)
        .rule()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "<unset>".into());
    println!("{room_id}: join rule is {rule}");

    Ok(())
}
