use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::utils::{output_error, output_success, output_value, read_structured};
use crate::cli::OutputFormat;
use crate::tree::{self, TreeItem, TreeRecord};

/// Payload columns are kept as-is.
type Node = Map<String, Value>;

#[derive(Subcommand)]
pub enum TreeCommands {
    #[command(about = "Report duplicate ids, orphans, cycles and depth")]
    Check {
        #[arg(help = "JSON or YAML file with nested items or flat records")]
        file: PathBuf,
        #[arg(long, help = "Fail when the tree has more levels than this")]
        max_depth: Option<usize>,
    },

    #[command(about = "Print the depth-first flat list with parent pointers")]
    Flatten {
        #[arg(help = "JSON or YAML file with nested items or flat records")]
        file: PathBuf,
    },

    #[command(about = "Promote orphans and break cycles, printing repaired records")]
    Repair {
        #[arg(help = "JSON or YAML file with nested items or flat records")]
        file: PathBuf,
    },
}

/// A tree file holds either nested items or flat records, optionally wrapped
/// as `{ "items": [...] }` / `{ "records": [...] }`.
#[derive(Debug)]
enum TreeFile {
    Nested(Vec<TreeItem<Node>>),
    Records(Vec<TreeRecord<Node>>),
}

impl TreeFile {
    fn parse(value: Value) -> anyhow::Result<Self> {
        if let Some(items) = value.get("items") {
            return Ok(TreeFile::Nested(serde_json::from_value(items.clone())?));
        }
        if let Some(records) = value.get("records") {
            return Ok(TreeFile::Records(serde_json::from_value(records.clone())?));
        }

        let rows = value
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Expected a list of tree rows"))?;
        let flat = rows
            .iter()
            .any(|row| row.get("parent_id").is_some() || row.get("position").is_some());
        if flat {
            Ok(TreeFile::Records(serde_json::from_value(value)?))
        } else {
            Ok(TreeFile::Nested(serde_json::from_value(value)?))
        }
    }

    fn load(path: &Path) -> anyhow::Result<Self> {
        Self::parse(read_structured(path)?)
    }

    fn into_records(self) -> Vec<TreeRecord<Node>> {
        match self {
            TreeFile::Nested(items) => tree::to_records(&items),
            TreeFile::Records(records) => records,
        }
    }
}

pub async fn handle(cmd: TreeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TreeCommands::Check { file, max_depth } => {
            let records = TreeFile::load(&file)?.into_records();
            let report = tree::check_integrity(&records);
            let rows = records.len();

            if !report.is_clean() {
                output_error(
                    output_format,
                    &format!("{} has integrity problems", file.display()),
                    Some(json!({ "rows": rows, "report": report })),
                )?;
                anyhow::bail!("tree check failed");
            }

            let items = tree::from_records(records)?;
            let levels = tree::max_depth(&items);
            if let Some(limit) = max_depth {
                if levels > limit {
                    output_error(
                        output_format,
                        &format!("{} has {} levels, limit is {}", file.display(), levels, limit),
                        Some(json!({ "rows": rows, "levels": levels })),
                    )?;
                    anyhow::bail!("tree check failed");
                }
            }

            output_success(
                output_format,
                &format!("{}: {} rows, {} levels, no problems", file.display(), rows, levels),
                Some(json!({ "rows": rows, "levels": levels, "report": report })),
            )
        }
        TreeCommands::Flatten { file } => {
            let items = match TreeFile::load(&file)? {
                TreeFile::Nested(items) => items,
                TreeFile::Records(records) => tree::from_records(records)?,
            };
            output_value(output_format, &tree::flatten(&items))
        }
        TreeCommands::Repair { file } => {
            let records = TreeFile::load(&file)?.into_records();
            let (records, report) = tree::repair(records);
            if !report.is_clean() {
                tracing::info!(
                    "Repaired {} orphans and {} cycles",
                    report.orphans.len(),
                    report.cycles.len()
                );
            }
            output_value(output_format, &json!({ "report": report, "records": records }))
        }
    }
}
