//! RayOS Presenter
//!
//! Main entry point. This application:
//! - Receives skeleton frames from a depth-sensor bridge (or simulates one)
//! - Recognizes slideshow gestures from the closest tracked subject
//! - Presses the matching key through the configured dispatch backend
//! - Applies recognized voice phrases to the operator view

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use rayos_presenter::config::DispatchBackend;
use rayos_presenter::dispatch::build_sink;
use rayos_presenter::{spawn_console, Presenter, PresenterConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rayos-presenter")]
#[command(about = "Drive a slideshow with body gestures and voice", long_about = None)]
#[command(after_help = "Without --skeleton-udp a simulated subject performs every gesture in a loop.")]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Key dispatch backend: log, xdotool or qemu
    #[arg(long, value_name = "BACKEND")]
    dispatch: Option<DispatchBackend>,

    /// QEMU HMP monitor unix socket (implies --dispatch qemu)
    #[arg(long, value_name = "PATH")]
    qemu_monitor_sock: Option<PathBuf>,

    /// UDP address to receive skeleton frames on
    #[arg(long, value_name = "ADDR")]
    skeleton_udp: Option<SocketAddr>,

    /// UDP address to receive recognized phrases on
    #[arg(long, value_name = "ADDR")]
    voice_udp: Option<SocketAddr>,

    /// Do not read console keys from stdin
    #[arg(long)]
    no_console: bool,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut PresenterConfig) {
        if let Some(addr) = self.skeleton_udp {
            config.sensor.udp_addr = Some(addr);
        }
        if let Some(addr) = self.voice_udp {
            config.voice.udp_addr = Some(addr);
        }
        if let Some(sock) = &self.qemu_monitor_sock {
            config.dispatch.backend = DispatchBackend::Qemu;
            config.dispatch.qemu_monitor_sock = Some(sock.clone());
        }
        if let Some(backend) = self.dispatch {
            config.dispatch.backend = backend;
        }
        if self.no_console {
            config.console = false;
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .init();

    // Load configuration: file < env < CLI
    let mut config = match &cli.config {
        Some(path) => PresenterConfig::load(path)?,
        None => PresenterConfig::default(),
    };
    config.apply_env();
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    log::info!("═══════════════════════════════════════");
    log::info!("  RayOS Presenter");
    log::info!("═══════════════════════════════════════");

    let sink = build_sink(&config.dispatch)?;
    let console = config.console;
    let mut presenter = match Presenter::new(config, sink) {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to initialize Presenter: {e:#}");
            return Err(e);
        }
    };

    // Set up Ctrl+C handler
    let (tx, rx) = tokio::sync::mpsc::channel::<()>(1);
    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal...");
        let _ = ctrlc_tx.blocking_send(());
    })?;

    if console {
        spawn_console(presenter.view_sender(), tx.clone())?;
        log::info!("Console: type `c` + Enter to toggle circles, `q` to quit");
    }
    drop(tx);

    log::info!("Press Ctrl+C to exit");
    log::info!("───────────────────────────────────────");

    let result = presenter.run(rx).await;
    if let Err(e) = &result {
        log::error!("Presenter error: {e:#}");
    }

    presenter.shutdown().await?;
    log::info!("Presenter shutdown complete. Goodbye!");
    result
}
