//! datagroomer - command-line front end for the DataGroomer client
//!
//! Uploads CSV files, runs server-side comparisons and prints the
//! discrepancies as text tables.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use groomer_client::report::{render_comparison, render_file_list};
use groomer_client::{DataFileId, ProgressFn, Transport, UploadFile, UploadSession, Workbench};
use groomer_common::config::{SettingsResolver, TomlConfig, ENV_SERVER_URL, ENV_UPLOAD_URL};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for datagroomer
#[derive(Parser, Debug)]
#[command(name = "datagroomer")]
#[command(about = "Upload CSV files and compare them on a DataGroomer server")]
#[command(version)]
struct Args {
    /// Base URL of the DataGroomer server
    #[arg(long, env = ENV_SERVER_URL)]
    server_url: Option<String>,

    /// Upload session URL for the first upload
    #[arg(long, env = ENV_UPLOAD_URL)]
    upload_url: Option<String>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload CSV files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Compare the uploaded files once the upload completes
        #[arg(long)]
        compare: bool,
    },

    /// Show data files by id
    Files {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Compare previously uploaded data files by id
    Compare {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    let settings = SettingsResolver::new(toml)
        .with_cli_server_url(args.server_url.clone())
        .with_cli_upload_url(args.upload_url.clone())
        .resolve()
        .context("Invalid configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "groomer_client={0},groomer_common={0}",
        settings.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Server: {}", settings.server_url);

    let transport = Arc::new(
        Transport::new(&settings.server_url).context("Failed to create HTTP transport")?,
    );
    let workbench = Workbench::new(transport, UploadSession::new(settings.upload_url.clone()));

    match args.command {
        Command::Upload { files, compare } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                let file = UploadFile::from_path(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                uploads.push(file);
            }

            let on_progress: ProgressFn = Arc::new(|fraction| {
                info!("Upload progress: {:.0}%", fraction * 100.0);
            });

            workbench
                .drop_files(uploads, Some(on_progress))
                .await
                .context("Upload failed")?;
            print!("{}", render_file_list(&workbench.data_files()));

            if compare {
                run_comparison(&workbench).await?;
            }
        }
        Command::Files { ids } => {
            let ids: Vec<DataFileId> = ids.into_iter().map(DataFileId).collect();
            workbench
                .load_files(&ids)
                .await
                .context("Fetching data files failed")?;
            print!("{}", render_file_list(&workbench.data_files()));
        }
        Command::Compare { ids } => {
            let ids: Vec<DataFileId> = ids.into_iter().map(DataFileId).collect();
            workbench
                .load_files(&ids)
                .await
                .context("Fetching data files failed")?;
            run_comparison(&workbench).await?;
        }
    }

    Ok(())
}

async fn run_comparison(workbench: &Workbench) -> Result<()> {
    let comparison = workbench.compare().await.context("Comparison failed")?;

    let rendered = render_comparison(&comparison, &workbench.data_files());
    if rendered.is_empty() {
        println!("No discrepancies found");
    } else {
        print!("{}", rendered);
    }
    Ok(())
}
