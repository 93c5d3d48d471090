//! # RayOS Presenter
//!
//! Drives a slideshow from body posture and voice. Skeleton frames from a
//! depth sensor are reduced to one subject's head and hands, fed through an
//! edge-triggered gesture engine, and each resulting command becomes a single
//! key press. Recognized voice phrases toggle what the operator window shows.
//!
//! | Gesture | Key |
//! |---|---|
//! | Right arm stretched out | Right arrow (next slide) |
//! | Left arm stretched out | Left arrow (previous slide) |
//! | Both hands raised | `B` (blank screen) |
//! | Both hands level with the head | F5 (start slideshow) |

pub mod config;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod skeleton;
pub mod types;
pub mod view;
pub mod voice;

pub use config::PresenterConfig;
pub use dispatch::CommandSink;
pub use error::PresenterError;
pub use gesture::{GestureEngine, GestureLatchState, GestureThresholds};
pub use types::*;

use anyhow::Result;
use skeleton::{SkeletonPathway, SkipReason};
use std::io::BufRead;
use tokio::sync::mpsc;
use view::{JointOverlay, ViewEvent, ViewHandle, ViewState};
use voice::VoicePathway;

/// The main Presenter coordinator: frames in, key presses out
pub struct Presenter {
    config: PresenterConfig,
    engine: GestureEngine,
    sink: Box<dyn CommandSink>,
    skeleton: SkeletonPathway,
    voice: VoicePathway,
    view: ViewHandle,
    frames_processed: u64,
    frames_skipped: u64,
}

impl Presenter {
    pub fn new(config: PresenterConfig, sink: Box<dyn CommandSink>) -> Result<Self> {
        config.validate()?;
        log::info!("Initializing RayOS Presenter (dispatch: {})...", sink.name());

        let engine = GestureEngine::new(config.gesture);
        let skeleton = SkeletonPathway::new(config.sensor.clone());
        let voice = VoicePathway::new(config.voice.clone());
        let view = ViewHandle::spawn()?;

        Ok(Self {
            config,
            engine,
            sink,
            skeleton,
            voice,
            view,
            frames_processed: 0,
            frames_skipped: 0,
        })
    }

    /// Run one frame to completion: select, evaluate, dispatch.
    pub async fn handle_frame(&mut self, frame: &SkeletonFrame) -> Vec<Command> {
        let sample = match skeleton::sample_frame(frame) {
            Ok(sample) => sample,
            Err(reason) => {
                self.frames_skipped += 1;
                match reason {
                    SkipReason::NoSubject => log::trace!("Frame {}: no tracked subject", frame.timestamp),
                    SkipReason::MissingJoint { skeleton_id, joint } => log::debug!(
                        "Frame {}: subject {} lost {}",
                        frame.timestamp,
                        skeleton_id,
                        joint.as_str()
                    ),
                }
                return Vec::new();
            }
        };

        self.frames_processed += 1;
        let commands = self.engine.process(&sample);

        let overlay = JointOverlay::from_sample(&sample, &self.engine.latches());
        let _ = self.view.sender().send(ViewEvent::Overlay(overlay));

        for &command in &commands {
            log::info!("Gesture command: {:?}", command);
            if let Err(e) = self.sink.dispatch(command).await {
                log::warn!("Failed to dispatch {:?} via {}: {e:#}", command, self.sink.name());
            }
        }
        commands
    }

    /// Start the pathways and process frames until `shutdown` fires or the
    /// frame source ends.
    pub async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        log::info!("Starting Presenter main loop...");

        let mut frames = self.skeleton.start().await?;
        self.voice.start(self.view.sender()).await?;

        loop {
            tokio::select! {
                frame = frames.recv() => match frame {
                    Some(frame) => {
                        self.handle_frame(&frame).await;
                    }
                    None => {
                        log::info!("Skeleton stream ended");
                        break;
                    }
                },
                _ = shutdown.recv() => break,
            }
        }

        log::info!(
            "Main loop finished: {} frames processed, {} skipped",
            self.frames_processed,
            self.frames_skipped
        );
        Ok(())
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn view_state(&self) -> ViewState {
        self.view.snapshot()
    }

    pub fn view_sender(&self) -> crossbeam_channel::Sender<ViewEvent> {
        self.view.sender()
    }

    /// Stop the pathways and flush the view.
    pub async fn shutdown(mut self) -> Result<()> {
        log::info!("Shutting down Presenter...");
        self.skeleton.stop().await;
        self.voice.stop().await;
        self.engine.reset();
        self.view.shutdown();
        Ok(())
    }
}

/// Read console keys on a plain thread: `c` toggles the joint circles, `q`
/// requests shutdown. The thread ends with stdin.
pub fn spawn_console(
    view: crossbeam_channel::Sender<ViewEvent>,
    quit: mpsc::Sender<()>,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("presenter-console".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match line.trim() {
                    "c" | "C" => {
                        if view.send(ViewEvent::Action(UiAction::ToggleCircles)).is_err() {
                            break;
                        }
                    }
                    "q" | "Q" => {
                        log::info!("Quit requested from console");
                        let _ = quit.blocking_send(());
                        break;
                    }
                    "" => {}
                    other => log::info!("Unknown console key {other:?} (c = circles, q = quit)"),
                }
            }
        })
}
