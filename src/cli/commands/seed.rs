use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{SeedFile, StoreManager};

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Validate a seed file and load it into a scratch store")]
    Check {
        #[arg(help = "YAML seed file")]
        file: PathBuf,
        #[arg(long, help = "Navigation depth limit (defaults to tree.max_navigation_depth)")]
        max_depth: Option<usize>,
    },
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SeedCommands::Check { file, max_depth } => {
            let max_depth = max_depth.unwrap_or(config::config().tree.max_navigation_depth);
            let seed = SeedFile::load(&file)?;

            let problems = seed.validate(max_depth);
            if !problems.is_empty() {
                match output_format {
                    OutputFormat::Json => {
                        output_error(
                            output_format,
                            &format!("{} has {} problems", file.display(), problems.len()),
                            Some(json!({ "problems": problems })),
                        )?;
                    }
                    OutputFormat::Text => {
                        for problem in &problems {
                            eprintln!("  - {}", problem);
                        }
                    }
                }
                anyhow::bail!("seed check failed for {}", file.display());
            }

            // Applying to a scratch store catches what validation cannot, such
            // as slug collisions after derivation.
            let scratch = StoreManager::new();
            let teams = seed.apply(&scratch, max_depth).await?;

            output_success(
                output_format,
                &format!("{}: {} teams, no problems", file.display(), teams),
                Some(json!({ "teams": teams })),
            )
        }
    }
}
