//! Login CLI — drives the passwordless handshake against a running auth
//! service, the same way the reading apps do.
//!
//! # Usage
//!
//! ```bash
//! # Telegram flow: prints the deep link, then polls until completion
//! cargo run -p login-cli -- --base-url http://localhost:3101 telegram --bot-username kitob_login_bot
//!
//! # SMS flow: requests a code, reads it from stdin, verifies
//! cargo run -p login-cli -- --base-url http://localhost:3101 sms --phone 901234567
//! ```

use std::io::Write as _;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use kitob_client::AuthClient;
use kitob_domain::handshake::telegram_deep_link;

#[derive(Parser)]
#[command(about = "Drive the Kitob passwordless login handshake")]
struct Args {
    /// Base URL of the auth service (e.g. http://localhost:3101)
    #[arg(long)]
    base_url: String,

    #[command(subcommand)]
    flow: Flow,
}

#[derive(Subcommand)]
enum Flow {
    /// Create a handshake, print its deep link, poll until completion
    Telegram {
        /// Bot username for the deep link
        #[arg(long, default_value = "kitob_login_bot")]
        bot_username: String,
    },
    /// Request an SMS code, read it from stdin, verify it
    Sms {
        /// Phone number in any accepted form (e.g. 901234567)
        #[arg(long)]
        phone: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = AuthClient::new(&args.base_url);

    match args.flow {
        Flow::Telegram { bot_username } => {
            let request_id = client
                .create_auth_request()
                .await
                .context("create auth request")?;
            println!("Open this link to sign in:");
            println!("  {}", telegram_deep_link(&bot_username, request_id));
            println!("Waiting for completion (up to 60s)...");

            let user = client
                .poll_until_complete(request_id)
                .await
                .context("poll auth status")?;
            println!("Signed in as {} ({})", user.full_name, user.id);
        }
        Flow::Sms { phone } => {
            let ticket = client.request_otp(&phone).await.context("request OTP")?;
            println!(
                "Code sent (request {}), valid for {}s.",
                ticket.request_id, ticket.expires_in_seconds
            );

            print!("Enter the 6-digit code: ");
            std::io::stdout().flush()?;
            let mut code = String::new();
            std::io::stdin().read_line(&mut code)?;

            let user = client
                .verify_otp(&phone, code.trim())
                .await
                .context("verify OTP")?;
            println!("Signed in as {} ({})", user.full_name, user.id);
        }
    }

    Ok(())
}
