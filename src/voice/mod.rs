//! Voice pathway - maps recognized phrases to UI actions
//!
//! Recognition itself happens in an external engine; this side only applies
//! the confidence floor and the fixed phrase table. Unlike gestures there is
//! no edge-triggering: every qualifying event acts, repeats included.

use crate::config::VoiceConfig;
use crate::types::{PhraseKind, RecognizedPhrase, UiAction};
use crate::view::ViewEvent;
use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

mod udp_phrase;

pub use udp_phrase::parse_phrase_message;

/// Phrases the recognizer grammar is built from
pub const PHRASES: [(&str, UiAction); 4] = [
    ("computer show window", UiAction::ShowWindow),
    ("computer hide window", UiAction::HideWindow),
    ("computer show circles", UiAction::ShowCircles),
    ("computer hide circles", UiAction::HideCircles),
];

/// Confidence-gated phrase table
#[derive(Debug, Clone)]
pub struct VoiceCommandRouter {
    confidence_floor: f32,
}

impl VoiceCommandRouter {
    pub fn new(confidence_floor: f32) -> Self {
        Self { confidence_floor }
    }

    pub fn confidence_floor(&self) -> f32 {
        self.confidence_floor
    }

    pub fn route(&self, phrase: &RecognizedPhrase) -> Option<UiAction> {
        match phrase.kind {
            PhraseKind::Hypothesized => {
                log::debug!("Speech hypothesized: {}", phrase.text);
                return None;
            }
            PhraseKind::Rejected => {
                log::info!("Speech rejected, confidence: {:.2}", phrase.confidence);
                return None;
            }
            PhraseKind::Recognized => {}
        }

        if phrase.confidence < self.confidence_floor {
            log::info!("Speech rejected by floor, confidence: {:.2}", phrase.confidence);
            return None;
        }

        log::info!(
            "Speech recognized, confidence: {:.2}: {}",
            phrase.confidence,
            phrase.text
        );
        let action = PHRASES
            .iter()
            .find(|(text, _)| *text == phrase.text)
            .map(|(_, action)| *action);
        if action.is_none() {
            log::debug!("No action bound to {:?}", phrase.text);
        }
        action
    }
}

impl Default for VoiceCommandRouter {
    fn default() -> Self {
        Self::new(VoiceConfig::default().confidence_floor)
    }
}

/// The Voice Pathway - listens for recognizer events and forwards actions
pub struct VoicePathway {
    config: VoiceConfig,
    task: Option<JoinHandle<()>>,
}

impl VoicePathway {
    pub fn new(config: VoiceConfig) -> Self {
        Self { config, task: None }
    }

    /// Start listening. Actions are delivered to the view owner. A listener
    /// that is already running is stopped first.
    pub async fn start(&mut self, view: Sender<ViewEvent>) -> Result<()> {
        self.stop().await;
        let Some(addr) = self.config.udp_addr else {
            log::warn!("No voice source configured, speech commands disabled");
            return Ok(());
        };

        log::info!("Starting Voice Pathway...");
        let router = VoiceCommandRouter::new(self.config.confidence_floor);
        let delay = Duration::from_millis(self.config.start_delay_ms);
        self.task = Some(spawn_udp_phrase_task(addr, delay, router, view).await?);
        Ok(())
    }

    /// Stop listening; pending recognizer events are dropped.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            log::info!("Stopping Voice Pathway...");
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for VoicePathway {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn spawn_udp_phrase_task(
    bind_addr: SocketAddr,
    start_delay: Duration,
    router: VoiceCommandRouter,
    view: Sender<ViewEvent>,
) -> Result<JoinHandle<()>> {
    let sock = UdpSocket::bind(bind_addr)
        .await
        .with_context(|| format!("bind voice UDP listener on {bind_addr}"))?;
    log::info!("UDP voice listener bound on {bind_addr}");

    Ok(tokio::spawn(async move {
        let mut buf = [0u8; 2048];
        if !start_delay.is_zero() {
            log::info!("Speech recognition starts in {}ms", start_delay.as_millis());
            tokio::time::sleep(start_delay).await;

            // Speech from before recognition started never acts.
            let mut stale = 0usize;
            while sock.try_recv_from(&mut buf).is_ok() {
                stale += 1;
            }
            if stale > 0 {
                log::debug!("Discarded {stale} phrase event(s) received during warm-up");
            }
        }
        log::info!("Speech recognition started");

        loop {
            let (len, _src) = match sock.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("UDP voice recv error: {e}");
                    continue;
                }
            };

            let Some(phrase) = std::str::from_utf8(&buf[..len]).ok().and_then(parse_phrase_message) else {
                continue;
            };

            if let Some(action) = router.route(&phrase) {
                if view.send(ViewEvent::Action(action)).is_err() {
                    break;
                }
            }
        }
    }))
}
