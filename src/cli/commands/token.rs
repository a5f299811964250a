use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{decode_token, encode_token, Claims};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a signed development token")]
    Mint {
        #[arg(long, help = "User id (random when omitted)")]
        user: Option<Uuid>,
        #[arg(long, help = "Email claim")]
        email: String,
        #[arg(long, help = "Display name claim")]
        name: String,
        #[arg(long, help = "Hours until expiry (defaults to security.jwt_expiry_hours)")]
        hours: Option<u64>,
        #[arg(long, env = "CMS_JWT_SECRET", hide_env_values = true, help = "Signing secret")]
        secret: Option<String>,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        #[arg(help = "Bearer token")]
        token: String,
        #[arg(long, env = "CMS_JWT_SECRET", hide_env_values = true, help = "Signing secret")]
        secret: Option<String>,
    },
}

fn secret_or_configured(secret: Option<String>) -> String {
    secret.unwrap_or_else(|| config::config().security.jwt_secret.clone())
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Mint {
            user,
            email,
            name,
            hours,
            secret,
        } => {
            let user_id = user.unwrap_or_else(Uuid::new_v4);
            let hours = hours.unwrap_or(config::config().security.jwt_expiry_hours);
            let claims = Claims::with_expiry(user_id, email, name, hours);
            let token = encode_token(&claims, &secret_or_configured(secret))?;

            match output_format {
                OutputFormat::Json => output_success(
                    output_format,
                    "Token minted",
                    Some(json!({ "token": token, "claims": claims })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Inspect { token, secret } => {
            let claims = decode_token(token.trim(), &secret_or_configured(secret))?;
            output_value(output_format, &claims)
        }
    }
}
