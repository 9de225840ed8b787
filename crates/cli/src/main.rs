//! Gohan CLI - Tools for exercising a running bot locally.
//!
//! # Usage
//!
//! ```bash
//! # Print the handshake body Slack sends when the URL is registered
//! gohan-cli payload challenge abc123
//!
//! # Print an app_mention callback
//! gohan-cli payload mention "<@U0BOT> ping" -c C0CHAN -u U0USER
//!
//! # Print a form-encoded block action
//! gohan-cli payload action select-item 寿司 -r https://hooks.slack.com/actions/T/1/abc
//!
//! # Sign a body with SLACK_SIGNING_SECRET and print the headers
//! gohan-cli sign --body '{"type":"url_verification","challenge":"abc123"}'
//!
//! # Convert a message link id into a timestamp
//! gohan-cli message-ts 1625097600123456
//! ```
//!
//! # Commands
//!
//! - `sign` - Compute Slack signature headers for a body
//! - `payload` - Print webhook bodies for local testing
//! - `message-ts` - Convert a message id into a Slack timestamp

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gohan-cli")]
#[command(author, version, about = "Gohan bot CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute Slack signature headers for a request body
    Sign {
        /// Body to sign
        #[arg(short, long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the body to sign from a file
        #[arg(short = 'f', long)]
        body_file: Option<PathBuf>,

        /// Unix timestamp to sign with (default: now)
        #[arg(short, long)]
        timestamp: Option<u64>,
    },
    /// Print webhook bodies for local testing
    Payload {
        #[command(subcommand)]
        kind: PayloadKind,
    },
    /// Convert a numeric message id into a Slack timestamp
    MessageTs {
        /// Message id, e.g. the digits after `p` in a message link
        id: String,
    },
}

#[derive(Subcommand)]
enum PayloadKind {
    /// `url_verification` handshake
    Challenge {
        /// Challenge token to embed
        token: String,
    },
    /// `event_callback` wrapping an `app_mention`
    Mention {
        /// Full message text, starting with the bot mention
        text: String,

        /// Channel ID
        #[arg(short, long, default_value = "C0000000000")]
        channel: String,

        /// User ID
        #[arg(short, long, default_value = "U0000000000")]
        user: String,
    },
    /// Form-encoded `block_actions` interaction
    Action {
        /// Block ID (`select-item` or `confirm-item`)
        block_id: String,

        /// Selected or button value
        value: String,

        /// Response URL of the interactive message
        #[arg(short, long, default_value = "https://hooks.slack.com/actions/T0/0/local")]
        response_url: String,

        /// Channel ID
        #[arg(short, long, default_value = "C0000000000")]
        channel: String,

        /// User ID
        #[arg(short, long, default_value = "U0000000000")]
        user: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CliError> {
    let output = match cli.command {
        Commands::Sign {
            body,
            body_file,
            timestamp,
        } => commands::sign::run(body, body_file.as_deref(), timestamp)?,
        Commands::Payload { kind } => match kind {
            PayloadKind::Challenge { token } => commands::payload::challenge(&token),
            PayloadKind::Mention {
                text,
                channel,
                user,
            } => commands::payload::mention(&text, &channel, &user),
            PayloadKind::Action {
                block_id,
                value,
                response_url,
                channel,
                user,
            } => commands::payload::action(&block_id, &value, &response_url, &channel, &user),
        },
        Commands::MessageTs { id } => commands::message_ts::run(&id)?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
