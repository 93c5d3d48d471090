//! Command dispatch - turns slideshow commands into key presses
//!
//! The gesture engine only produces `Command` values. A `CommandSink` decides
//! how the matching key press reaches the slideshow: logged, typed into the
//! focused X11 window with `xdotool`, or injected into a QEMU guest through
//! the HMP monitor's `sendkey`.

use crate::config::{DispatchBackend, DispatchConfig};
use crate::error::PresenterError;
use crate::types::Command;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::Duration;

/// The one key each command presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStroke {
    Right,
    Left,
    B,
    F5,
}

impl KeyStroke {
    pub fn for_command(command: Command) -> Self {
        match command {
            Command::Next => Self::Right,
            Command::Previous => Self::Left,
            Command::ToggleBlank => Self::B,
            Command::TogglePresent => Self::F5,
        }
    }

    /// X keysym name
    pub fn xdotool_name(&self) -> &'static str {
        match self {
            Self::Right => "Right",
            Self::Left => "Left",
            Self::B => "b",
            Self::F5 => "F5",
        }
    }

    /// QEMU `sendkey` name
    pub fn qemu_name(&self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::B => "b",
            Self::F5 => "f5",
        }
    }
}

/// Anything that can deliver a command's key press
#[async_trait]
pub trait CommandSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn dispatch(&self, command: Command) -> Result<()>;
}

/// Build the sink selected by configuration.
pub fn build_sink(config: &DispatchConfig) -> Result<Box<dyn CommandSink>> {
    let sink: Box<dyn CommandSink> = match config.backend {
        DispatchBackend::Log => Box::new(LogSink),
        DispatchBackend::Xdotool => Box::new(XdotoolSink::default()),
        DispatchBackend::Qemu => {
            let sock = config
                .qemu_monitor_sock
                .clone()
                .ok_or(PresenterError::MissingMonitorSocket)?;
            let sink = QemuMonitorSink::new(sock);
            log::info!("Key presses go to QEMU monitor {}", sink.sock_path().display());
            Box::new(sink)
        }
    };
    Ok(sink)
}

/// Dry run: only logs what would be pressed
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl CommandSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        log::info!("[dry-run] {:?} -> key {:?}", command, KeyStroke::for_command(command));
        Ok(())
    }
}

/// Forwards commands to an in-process consumer
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: crossbeam_channel::Sender<Command>,
}

impl ChannelSink {
    pub fn new(tx: crossbeam_channel::Sender<Command>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl CommandSink for ChannelSink {
    fn name(&self) -> &'static str {
        "channel"
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| PresenterError::Dispatch {
            backend: "channel",
            message: "receiver dropped".to_string(),
        })?;
        Ok(())
    }
}

/// Presses keys in the focused X11 window via `xdotool key`
#[derive(Debug, Clone)]
pub struct XdotoolSink {
    program: PathBuf,
}

impl Default for XdotoolSink {
    fn default() -> Self {
        Self {
            program: PathBuf::from("xdotool"),
        }
    }
}

impl XdotoolSink {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl CommandSink for XdotoolSink {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        let key = KeyStroke::for_command(command).xdotool_name();
        let status = tokio::process::Command::new(&self.program)
            .args(["key", "--clearmodifiers", key])
            .status()
            .await
            .with_context(|| format!("spawn {}", self.program.display()))?;

        if !status.success() {
            return Err(PresenterError::Dispatch {
                backend: "xdotool",
                message: format!("`key {key}` exited with {status}"),
            }
            .into());
        }
        Ok(())
    }
}

/// QEMU HMP monitor link that injects key presses via `sendkey`.
pub struct QemuMonitorSink {
    sock_path: PathBuf,
}

impl QemuMonitorSink {
    pub fn new(sock_path: impl Into<PathBuf>) -> Self {
        Self {
            sock_path: sock_path.into(),
        }
    }

    pub fn sock_path(&self) -> &Path {
        &self.sock_path
    }

    async fn send_monitor_cmd(&self, cmd: &str) -> Result<()> {
        let mut s = UnixStream::connect(&self.sock_path)
            .await
            .with_context(|| format!("connect to QEMU monitor: {}", self.sock_path.display()))?;

        // Drain banner/prompt (best-effort).
        let mut tmp = [0u8; 4096];
        let _ = tokio::time::timeout(Duration::from_millis(200), s.read(&mut tmp)).await;

        s.write_all(cmd.as_bytes()).await?;
        s.write_all(b"\r\n").await?;
        s.flush().await?;

        let _ = tokio::time::timeout(Duration::from_millis(50), s.read(&mut tmp)).await;
        Ok(())
    }
}

#[async_trait]
impl CommandSink for QemuMonitorSink {
    fn name(&self) -> &'static str {
        "qemu"
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        let cmd = sendkey_cmd(KeyStroke::for_command(command));
        self.send_monitor_cmd(&cmd).await
    }
}

fn sendkey_cmd(key: KeyStroke) -> String {
    format!("sendkey {}", key.qemu_name())
}
