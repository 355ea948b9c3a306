use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use registry_types::ModelStatus;

#[derive(Parser)]
#[command(name = "mreg")]
#[command(about = "Model registry with SQLite metadata and remote artifact storage", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 作用域标志
#[derive(Args, Debug, Clone, Copy)]
pub struct ScopeArgs {
    /// Use local registry (./.mreg)
    #[arg(short, long)]
    pub local: bool,

    /// Use global registry (~/.mreg)
    #[arg(short, long)]
    pub global: bool,
}

/// 可选元数据字段（insert 与 update 共用）
#[derive(Args, Debug, Clone, Default)]
pub struct MetadataArgs {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub framework: Option<String>,

    #[arg(long)]
    pub framework_version: Option<String>,

    #[arg(long)]
    pub training_data: Option<String>,

    /// Hyperparameters as an opaque string (e.g. JSON)
    #[arg(long)]
    pub hyperparameters: Option<String>,

    /// Evaluation metrics as an opaque string (e.g. JSON)
    #[arg(long)]
    pub evaluation_metrics: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// Feature list as an opaque string
    #[arg(long)]
    pub features: Option<String>,

    /// deployed | archived | "under review" | special-use
    #[arg(long, value_parser = parse_status)]
    pub status: Option<ModelStatus>,
}

fn parse_status(value: &str) -> Result<ModelStatus, String> {
    value.parse().map_err(|e: registry_types::ValidationError| e.to_string())
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize registry configuration and tables")]
    Init {
        /// Initialize in local directory (./.mreg) instead of global (~/.mreg)
        #[arg(short, long)]
        local: bool,
    },

    #[command(about = "Register a model and upload its artifact")]
    Insert {
        name: String,

        version: String,

        /// Path to the serialized model file
        artifact: PathBuf,

        /// Labels for the model (comma-separated, e.g., "prod,cv")
        #[arg(short = 't', long, value_delimiter = ',')]
        labels: Option<Vec<String>>,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    #[command(about = "Show a model's metadata, optionally downloading its artifact")]
    Fetch {
        name: String,

        version: String,

        /// Download the artifact as well
        #[arg(short, long)]
        download: bool,

        /// Target directory for the download (defaults to download_dir in config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    #[command(about = "Update metadata fields and/or replace labels")]
    Update {
        name: String,

        version: String,

        /// Replacement labels (comma-separated); omit to keep current labels
        #[arg(short = 't', long, value_delimiter = ',')]
        labels: Option<Vec<String>>,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    #[command(about = "Delete a model and its artifact")]
    Delete {
        name: String,

        version: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    #[command(about = "Export all models to a CSV file")]
    Export {
        /// Output file (defaults to export_path in config)
        output: Option<PathBuf>,

        #[command(flatten)]
        scope: ScopeArgs,
    },
}
