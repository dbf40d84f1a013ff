use std::path::PathBuf;

use anyhow::Context;
use backend_lib::{config::Settings, crypto::CryptoProvider, Tollgate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Signing, hashing and session repository tooling
#[derive(Debug, Parser)]
#[command(name = "tollgate", version, about)]
struct Cli {
    /// Config file, layered under `TOLLGATE_*` environment variables
    #[arg(short, long, default_value = backend_lib::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the HMAC-SHA256 signature of TEXT
    Sign { text: String },
    /// Check SIGNATURE against TEXT
    Verify { text: String, signature: String },
    /// Print a bcrypt hash of TEXT
    Bcrypt { text: String },
    /// Check TEXT against a bcrypt HASH
    BcryptVerify { text: String, hash: String },
    /// Encrypt TEXT with the configured key
    Encrypt { text: String },
    /// Decrypt CIPHERTEXT with the configured key
    Decrypt { ciphertext: String },
    /// Print the SHA-512 digest of TEXT, optionally salted and stretched
    Sha512 {
        text: String,
        #[arg(long)]
        salt: Option<String>,
        #[arg(long, default_value_t = 1)]
        iterations: u32,
    },
    /// Print the session repository properties
    Properties,
    /// Run the session repository and its expiry sweep until Ctrl-C
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let tollgate = Tollgate::new(settings)?;
    let crypto = &tollgate.crypto;

    match cli.command {
        Command::Sign { text } => println!("{}", crypto.make_signature(&text)?),
        Command::Verify { text, signature } => {
            println!("{}", crypto.test_signature(&text, &signature)?)
        },
        Command::Bcrypt { text } => println!("{}", crypto.make_bcrypt(&text)?),
        Command::BcryptVerify { text, hash } => println!("{}", crypto.test_bcrypt(&text, &hash)),
        Command::Encrypt { text } => println!("{}", crypto.encrypt(&text)?),
        Command::Decrypt { ciphertext } => println!("{}", crypto.decrypt(&ciphertext)?),
        Command::Sha512 {
            text,
            salt,
            iterations,
        } => {
            let digest = match salt {
                Some(salt) => crypto.sha512_iterated(&text, &salt, iterations)?,
                None => crypto.sha512(&text),
            };
            println!("{digest}");
        },
        Command::Properties => {
            let properties = tollgate.sessions.get_properties();
            println!("{}", serde_json::to_string_pretty(&properties)?);
        },
        Command::Serve => {
            let sweeper = tollgate.spawn_sweeper()?;
            info!(
                interval_secs = tollgate.settings.sessions.sweep_interval_secs,
                "session sweeper running, press Ctrl-C to stop"
            );

            tokio::signal::ctrl_c().await?;

            sweeper.shutdown().await;
            info!(remaining = tollgate.sessions.len(), "shutting down");
        },
    }

    Ok(())
}
