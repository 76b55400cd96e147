//! Command-line entry point.
//!
//! ```bash
//! twilio-notify send-sms my-twilio-account 'Test sms' '+18019999999' '+18011111111'
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use twilio_notify::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "twilio-notify", version, about = "Send SMS notifications through Twilio")]
struct Cli {
    /// Additional configuration file layered over config/ and below the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send an sms
    SendSms {
        profile: String,
        body: String,
        to: String,
        from: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = ProfileStore::load(cli.config.as_deref())?;
    let app = AppConfig::from_config(store.config())?;
    init_tracing(&app.logging);

    let notifier = NotifierAdapter::load(&app.twilio, Arc::new(store))?;

    match cli.command {
        Command::SendSms {
            profile,
            body,
            to,
            from,
        } => {
            let result = notifier.send_sms(&profile, &body, &to, &from).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
