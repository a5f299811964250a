use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{load_cli_config, save_cli_config};
use crate::cli::utils::{output_success, output_value};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the CLI settings and the server configuration this environment resolves to")]
    Show,

    #[command(about = "Set the server `cms remote` talks to")]
    SetServer {
        #[arg(help = "Server base URL, e.g. http://localhost:9001")]
        url: String,
    },

    #[command(about = "Store the bearer token used by `cms remote`")]
    SetToken {
        #[arg(help = "Bearer token; omit to clear")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let cli = load_cli_config()?;
            // The secret is never serialized.
            let server = config::config();
            output_value(
                output_format,
                &json!({
                    "cli": {
                        "server": cli.server_url(),
                        "token_set": cli.token.is_some(),
                        "updated_at": cli.updated_at,
                    },
                    "server": server,
                }),
            )
        }
        ConfigCommands::SetServer { url } => {
            let mut cli = load_cli_config()?;
            cli.set_server(&url)?;
            save_cli_config(&cli)?;
            output_success(
                output_format,
                &format!("Server set to {}", cli.server_url()),
                Some(json!({ "server": cli.server_url() })),
            )
        }
        ConfigCommands::SetToken { token } => {
            let mut cli = load_cli_config()?;
            cli.set_token(token);
            save_cli_config(&cli)?;
            let message = if cli.token.is_some() { "Token saved" } else { "Token cleared" };
            output_success(output_format, message, None)
        }
    }
}
