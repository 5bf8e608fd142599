use std::time::Duration as StdDuration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use paseto_v3::cli::{self, DEFAULT_EXPIRATION};

#[derive(Parser, Debug)]
#[command(name = "paseto-v3", version, about = "Sign and verify PASETO v3.public tokens")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new P-384 key pair (base64 encoded)
    Generate,

    /// Sign a message into a v3.public token
    Sign {
        /// Message to sign
        #[arg(long)]
        message: String,

        /// Base64-encoded secret key
        #[arg(long, env = "PASETO_SECRET_KEY", hide_env_values = true)]
        key: String,

        /// Token lifetime, e.g. "5m", "1h 30m"
        #[arg(long, value_parser = humantime::parse_duration, default_value = "5m")]
        expiration: StdDuration,
    },

    /// Verify a v3.public token and print its claims
    Verify {
        /// Token to verify
        #[arg(long)]
        token: String,

        /// Base64-encoded public key
        #[arg(long, env = "PASETO_PUBLIC_KEY")]
        key: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Generate => {
            let keys = cli::generate_encoded_keypair().context("generating key pair")?;
            println!("private: '{}'", keys.secret_key);
            println!("public: '{}'", keys.public_key);
        }

        Command::Sign {
            message,
            key,
            expiration,
        } => {
            if message.is_empty() {
                bail!("--message must not be empty");
            }

            let expiration = time::Duration::try_from(expiration)
                .context("expiration out of range")?;
            if expiration <= time::Duration::ZERO {
                bail!(
                    "expiration must be positive (default is {} minutes)",
                    DEFAULT_EXPIRATION.whole_minutes()
                );
            }

            let token = cli::sign_message(&message, &key, expiration, OffsetDateTime::now_utc())
                .context("signing token")?;

            println!("Signed PASETO v3.public token:");
            println!("{token}");
        }

        Command::Verify { token, key } => {
            let claims = cli::verify_token(&token, &key, OffsetDateTime::now_utc())
                .context("token verification failed")?;

            let message = claims
                .get_string(cli::MESSAGE_CLAIM)
                .context("failed to get message from token")?;

            println!("Token verification successful!");
            println!("Message: {message}");
            println!("\nAll claims:");
            println!("{}", claims.to_json_pretty()?);
        }
    }

    Ok(())
}
