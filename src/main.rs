use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mutavault::cli::{Cli, Command, KvCommand};
use mutavault::core::{AdmissionGate, Walker, get_custom_metadata, set_custom_metadata};
use mutavault::models::CustomMetadata;
use mutavault::store::{VaultConfig, VaultStore};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn setup_logging(verbose: bool) {
    let default_directive = if verbose {
        "mutavault=debug"
    } else {
        "mutavault=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let Command::Kv { mount, command } = cli.command;

    let config = VaultConfig::new(cli.vault_addr, cli.vault_token, mount)
        .with_namespace(cli.vault_namespace);
    let store = Arc::new(VaultStore::new(config).context("failed to create vault client")?);

    let gate = Arc::new(AdmissionGate::new(cli.concurrency));
    let interrupt = Arc::clone(&gate);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling outstanding requests");
            interrupt.cancel();
        }
    });

    match command {
        KvCommand::ListAll { root } => list_all(store, gate, &root).await,
        KvCommand::GetCustomMetas { paths } => {
            let records = get_custom_metadata(store, gate, paths).await?;
            let mut stdout = io::stdout().lock();
            serde_json::to_writer(&mut stdout, &records)?;
            writeln!(stdout)?;
            Ok(())
        }
        KvCommand::SetCustomMetas => {
            let records = tokio::task::spawn_blocking(|| {
                serde_json::from_reader::<_, Vec<CustomMetadata>>(io::stdin().lock())
            })
            .await?
            .context("failed to decode custom metadata from stdin")?;
            set_custom_metadata(store.as_ref(), records).await?;
            Ok(())
        }
    }
}

async fn list_all(store: Arc<VaultStore>, gate: Arc<AdmissionGate>, root: &str) -> Result<()> {
    let root = mutavault::walk_root(root)
        .ok_or_else(|| anyhow!("root path {root} is not a directory (must end with '/')"))?;

    let traversal = Walker::new(store, gate).walk(&root).await?;

    let mut stdout = io::BufWriter::new(io::stdout().lock());
    for path in traversal.into_sorted_leaves() {
        writeln!(stdout, "{}", mutavault::display_path(&path))?;
    }
    stdout.flush()?;
    Ok(())
}
