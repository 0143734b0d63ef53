// quill-bot: one-shot Matrix commands from the shell.
//
// Run `quill-bot --help` for the command list.
//
// Env vars:
//   QUILL_HS     http://localhost:8448 (default)
//   QUILL_TOKEN  access token (required)
//   RUST_LOG     quill_core=debug,quill_bot=info (default)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use quill_core::{
    events::{JoinRulesContent, JoinRulesEvent},
    matrix::{ClientConfig, GroupProfile, JoinPolicy, MatrixClient},
};
use tracing::info;

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(version, about = "One-shot Matrix commands")]
struct Cli {
    #[arg(long, env = "QUILL_HS", default_value = "http://localhost:8448")]
    homeserver: String,

    #[arg(long, env = "QUILL_TOKEN", hide_env_values = true)]
    token: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print a room's join rule
    JoinRule { room_id: String },
    /// Post a rich reply to an event
    Reply { room_id: String, event_id: String, text: String },
    /// Create a group and print its ID
    CreateGroup { localpart: String },
    /// Invite a user to a group
    Invite { group_id: String, user_id: String },
    /// Replace a group's profile
    GroupProfile {
        group_id: String,
        name: String,
        avatar_url: String,
        short_description: String,
        long_description: String,
    },
    /// Set who may join a group
    JoinPolicy {
        group_id: String,
        #[arg(value_enum)]
        policy: Policy,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Policy {
    Open,
    Invite,
}

impl From<Policy> for JoinPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Open => JoinPolicy::Open,
            Policy::Invite => JoinPolicy::Invite,
        }
    }
}

/// Minimal HTML escaping so plain text can double as `formatted_body`.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "quill_core=debug,quill_bot=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.homeserver, cli.token).context("loading config")?;
    run(MatrixClient::new(config), cli.command).await
}

async fn run(client: MatrixClient, command: Command) -> Result<()> {
    info!("acting as {}", client.whoami().await?);

    match command {
        Command::JoinRule { room_id } => {
            let raw = client
                .get_state_event::<JoinRulesContent>(&room_id, "")
                .await?;
            match JoinRulesEvent::new(&raw).rule() {
                Some(rule) => println!("{rule}"),
                None => println!("<unset>"),
            }
        }

        Command::Reply { room_id, event_id, text } => {
            let event = client.get_event(&room_id, &event_id).await?;
            let reply_id = client
                .reply_to(&room_id, &event, &text, &escape_html(&text))
                .await?;
            println!("{reply_id}");
        }

        Command::CreateGroup { localpart } => {
            let group_id = client.unstable_apis().create_group(&localpart).await?;
            println!("{group_id}");
        }

        Command::Invite { group_id, user_id } => {
            let state = client
                .unstable_apis()
                .invite_user_to_group(&group_id, &user_id)
                .await?;
            println!("{}", String::from(state));
        }

        Command::GroupProfile { group_id, name, avatar_url, short_description, long_description } => {
            let profile = GroupProfile { name, avatar_url, short_description, long_description };
            let response = client
                .unstable_apis()
                .set_group_profile(&group_id, &profile)
                .await?;
            println!("{response}");
        }

        Command::JoinPolicy { group_id, policy } => {
            let response = client
                .unstable_apis()
                .set_group_join_policy(&group_id, policy.into())
                .await?;
            println!("{response}");
        }
    }

    Ok(())
}
