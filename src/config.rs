//! Presenter configuration, loaded from TOML with env/CLI overrides

use crate::error::{PresenterError, Result};
use crate::gesture::GestureThresholds;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Configuration for the Presenter system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    pub gesture: GestureThresholds,
    pub voice: VoiceConfig,
    pub sensor: SensorConfig,
    pub dispatch: DispatchConfig,
    /// Read `c`/`q` commands from stdin
    pub console: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            gesture: GestureThresholds::default(),
            voice: VoiceConfig::default(),
            sensor: SensorConfig::default(),
            dispatch: DispatchConfig::default(),
            console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Minimum recognizer confidence for a phrase to act
    pub confidence_floor: f32,
    /// Wait before listening, lets the audio source settle
    pub start_delay_ms: u64,
    /// Where the external recognizer sends phrase datagrams
    pub udp_addr: Option<SocketAddr>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.70,
            start_delay_ms: 4000,
            udp_addr: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Where the sensor bridge sends skeleton frames; simulated when unset
    pub udp_addr: Option<SocketAddr>,
    /// Frame rate of the simulated performer
    pub simulated_fps: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            udp_addr: None,
            simulated_fps: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchBackend {
    #[default]
    Log,
    Xdotool,
    Qemu,
}

impl std::str::FromStr for DispatchBackend {
    type Err = PresenterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "xdotool" => Ok(Self::Xdotool),
            "qemu" => Ok(Self::Qemu),
            other => Err(PresenterError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub backend: DispatchBackend,
    /// QEMU HMP monitor unix socket, for the `qemu` backend
    pub qemu_monitor_sock: Option<PathBuf>,
}

impl PresenterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| PresenterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `RAYOS_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("RAYOS_SKELETON_UDP_ADDR").and_then(|v| parse_addr("RAYOS_SKELETON_UDP_ADDR", &v)) {
            self.sensor.udp_addr = Some(addr);
        }
        if let Some(addr) = lookup("RAYOS_VOICE_UDP_ADDR").and_then(|v| parse_addr("RAYOS_VOICE_UDP_ADDR", &v)) {
            self.voice.udp_addr = Some(addr);
        }
        if let Some(sock) = lookup("RAYOS_QEMU_MONITOR_SOCK") {
            self.dispatch.backend = DispatchBackend::Qemu;
            self.dispatch.qemu_monitor_sock = Some(PathBuf::from(sock));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.gesture.validate()?;
        let floor = self.voice.confidence_floor;
        if !(0.0..=1.0).contains(&floor) {
            return Err(PresenterError::InvalidConfidenceFloor(floor));
        }
        if self.dispatch.backend == DispatchBackend::Qemu && self.dispatch.qemu_monitor_sock.is_none() {
            return Err(PresenterError::MissingMonitorSocket);
        }
        Ok(())
    }
}

fn parse_addr(key: &str, raw: &str) -> Option<SocketAddr> {
    match raw.parse() {
        Ok(addr) => Some(addr),
        Err(e) => {
            log::warn!("Ignoring {key}={raw}: {e}");
            None
        }
    }
}
