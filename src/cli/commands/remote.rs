use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::config::load_cli_config;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RemoteCommands {
    #[command(about = "Check server health from the /health endpoint")]
    Health,

    #[command(about = "List the teams the stored token can see")]
    Teams,

    #[command(about = "Show a navigation (published view unless --draft)")]
    Navigation {
        #[arg(help = "Team id or slug")]
        team: String,
        #[arg(help = "Navigation key", default_value = "main")]
        key: String,
        #[arg(long, help = "Show the editable tree instead (needs a token)")]
        draft: bool,
    },
}

pub async fn handle(cmd: RemoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::new(&load_cli_config()?)?;

    let data = match cmd {
        RemoteCommands::Health => client.get("/health").await?,
        RemoteCommands::Teams => client.get("/api/teams").await?,
        RemoteCommands::Navigation { team, key, draft } => {
            let path = if draft {
                format!("/api/teams/{}/navigation/{}", team, key)
            } else {
                format!("/api/teams/{}/navigation/{}/published", team, key)
            };
            client.get(&path).await?
        }
    };

    output_value(output_format, &data)
}
