use anyhow::{bail, Context, Result};
use box_sync::cli::{Cli, Command};
use box_sync::{BoxSyncService, CoreError};
use clap::Parser;
use core_runtime::logging::init_logging;
use core_runtime::{BoxEndpoints, SyncConfig};
use std::process::ExitCode;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.logging_config()) {
        eprintln!("{}", err);
        return ExitCode::from(1);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let user = cli
        .resolve_user()
        .context("No user given; pass --user or set BOX_SYNC_USER")?;

    let config = SyncConfig::builder()
        .user_id(user)
        .endpoints(BoxEndpoints::from_env())
        .suppress_warnings(cli.yes)
        .build()
        .context("Invalid configuration")?;
    debug!(?config, "Configuration loaded");

    let service = BoxSyncService::new(config)?;

    match cli.command {
        Command::Auth => {
            if service.authenticate().await?.is_none() {
                bail!(CoreError::AuthenticationDeclined);
            }
            println!("Authenticated with Box as {}", service.user_id());
        }
        Command::Mkdir { path, root } => {
            for folder in service.create_folder_path(&path, &root).await? {
                println!("{}\t{}", folder.id, folder.name);
            }
        }
        Command::Upload {
            folder_id,
            local_path,
            overwrite,
        } => {
            let report = service
                .upload_path(&folder_id, &local_path, overwrite)
                .await?;
            debug!(
                uploaded = report.uploaded.len(),
                replaced = report.replaced.len(),
                skipped = report.skipped.len(),
                "Upload finished"
            );
        }
        Command::Forget => {
            service.forget().await?;
            println!("Removed stored Box credentials for {}", service.user_id());
        }
    }

    Ok(())
}
