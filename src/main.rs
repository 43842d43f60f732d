//! build-papyrus - command line front end.
//!
//! Resolves the Papyrus build targets for a project directory and prints them
//! as JSON, the same descriptors a host build tool would receive.
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/build-papyrus.<date> (plus stderr)
//! 2. Load user settings from `<settings-dir>/build-papyrus.yaml`
//! 3. Bind a [`PapyrusBuildProvider`] to the directory, scan and resolve
//! 4. With `--watch`, re-scan and re-resolve whenever the provider asks for a
//!    refresh or the settings file changes, until Ctrl+C

use anyhow::{Context, Result, bail};
use build_papyrus::notifications::LogNotificationSink;
use build_papyrus::{
    APP_NAME, PapyrusBuildProvider, RefreshListener, SettingsManager, VERSION,
};
use camino::Utf8PathBuf;
use clap::Parser;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "build-papyrus", version, about = "Resolve Papyrus compiler build targets")]
struct Cli {
    /// Project directory containing a .papyrus.* config file or a .ppj project
    #[arg(default_value = ".")]
    directory: Utf8PathBuf,

    /// Directory holding build-papyrus.yaml
    #[arg(long, default_value = "build-papyrus Data")]
    settings_dir: Utf8PathBuf,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    /// Keep running and re-resolve when the project or settings change
    #[arg(long)]
    watch: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

/// Forwards refresh requests to the main loop
struct ChannelRefresh(mpsc::UnboundedSender<()>);

impl RefreshListener for ChannelRefresh {
    fn refresh(&self) {
        // The receiver only goes away on shutdown
        let _ = self.0.send(());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = build_papyrus::logging::setup_logging(&cli.log_dir, "build-papyrus", cli.debug, true)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = Utf8PathBuf::try_from(std::path::absolute(&cli.directory)?)
        .context("Project directory is not valid UTF-8")?;

    let manager = SettingsManager::new(&cli.settings_dir)?;
    let store = manager.load_settings()?.to_store();

    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel();
    let mut provider = PapyrusBuildProvider::new(
        cwd.clone(),
        Arc::new(store.clone()),
        Arc::new(LogNotificationSink::new()),
        Arc::new(ChannelRefresh(refresh_tx)),
    );
    tracing::info!("{} build provider bound to {}", provider.nice_name(), cwd);

    let resolved = resolve_and_print(&mut provider).await?;
    if !cli.watch {
        if !resolved {
            bail!("No build targets for {}", cwd);
        }
        return Ok(());
    }

    let (settings_tx, mut settings_rx) = mpsc::unbounded_channel();
    let _settings_watcher = watch_settings_file(&manager, settings_tx)?;
    tracing::info!("Watching {} for changes, press Ctrl+C to stop", cwd);

    loop {
        tokio::select! {
            Some(()) = refresh_rx.recv() => {
                // Editors tend to produce bursts of events for one save
                tokio::time::sleep(Duration::from_millis(200)).await;
                while refresh_rx.try_recv().is_ok() {}
                resolve_and_print(&mut provider).await?;
            }
            Some(()) = settings_rx.recv() => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                while settings_rx.try_recv().is_ok() {}
                match manager.load_settings() {
                    // Observers on the store raise the refresh
                    Ok(settings) => settings.apply_to(&store),
                    Err(e) => tracing::warn!("Keeping previous settings: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch mode");
                break;
            }
        }
    }

    Ok(())
}

/// Scan, resolve and print the targets as JSON. Returns whether any were found.
async fn resolve_and_print(provider: &mut PapyrusBuildProvider) -> Result<bool> {
    if !provider.is_eligible()? {
        tracing::warn!("{} is not a Papyrus project", provider.state().cwd);
        return Ok(false);
    }

    match provider.settings().await {
        Ok(targets) => {
            println!("{}", serde_json::to_string_pretty(&targets)?);
            Ok(true)
        }
        Err(e) => {
            tracing::error!("{}", e);
            Ok(false)
        }
    }
}

fn watch_settings_file(
    manager: &SettingsManager,
    tx: mpsc::UnboundedSender<()>,
) -> Result<RecommendedWatcher> {
    let settings_path = manager.settings_path().as_std_path().to_path_buf();
    let file_name = settings_path.file_name().map(|n| n.to_os_string());

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else { return };
        let touches_settings = event
            .paths
            .iter()
            .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
        if touches_settings && !event.kind.is_access() {
            let _ = tx.send(());
        }
    })?;

    // Watch the directory so the file may be created after startup
    watcher.watch(manager.settings_dir().as_std_path(), RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
