//! Example: replay the simulated performer through the full pipeline
//!
//! Every gesture command is logged by the dry-run sink instead of pressing keys.

use anyhow::Result;
use rayos_presenter::dispatch::LogSink;
use rayos_presenter::skeleton::SimulatedPerformer;
use rayos_presenter::{Presenter, PresenterConfig};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut config = PresenterConfig::default();
    config.console = false;
    let mut presenter = Presenter::new(config, Box::new(LogSink))?;

    let performer = SimulatedPerformer::default();
    let mut emitted = 0;
    let mut t = Duration::ZERO;
    while t < Duration::from_secs(12) {
        emitted += presenter.handle_frame(&performer.frame_at(t)).await.len();
        t += Duration::from_millis(33);
    }

    println!("{emitted} commands from one pass of the gesture script");
    presenter.shutdown().await
}
