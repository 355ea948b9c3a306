mod cli;
mod config;
mod service;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use ui::Output;

#[tokio::main]
async fn main() {
    // 日志写到 stderr，默认只显示警告；RUST_LOG 可覆盖
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            Output::new().error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Init { local } => {
            service::init::initialize(local).await?;
            Ok(true)
        }
        Commands::Insert {
            name,
            version,
            artifact,
            labels,
            metadata,
            scope,
        } => {
            service::insert::insert(
                name,
                version,
                artifact,
                labels,
                metadata,
                scope.local,
                scope.global,
            )
            .await
        }
        Commands::Fetch {
            name,
            version,
            download,
            output,
            json,
            scope,
        } => {
            service::fetch::fetch(
                &name,
                &version,
                download,
                output,
                json,
                scope.local,
                scope.global,
            )
            .await
        }
        Commands::Update {
            name,
            version,
            labels,
            metadata,
            scope,
        } => {
            service::update::update(&name, &version, labels, metadata, scope.local, scope.global)
                .await
        }
        Commands::Delete {
            name,
            version,
            force,
            scope,
        } => service::delete::delete(&name, &version, scope.local, scope.global, force).await,
        Commands::Export { output, scope } => {
            service::export::export(output, scope.local, scope.global).await
        }
    }
}
