use crate::types::{Joint, JointName, Point3, Skeleton, SkeletonFrame};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireSkeletonState {
    Tracked,
    PositionOnly,
    NotTracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WireJointState {
    #[default]
    Tracked,
    Inferred,
    NotTracked,
}

#[derive(Debug, Clone, Deserialize)]
struct WireJoint {
    position: [f32; 3],
    #[serde(default)]
    state: WireJointState,
}

#[derive(Debug, Clone, Deserialize)]
struct WireSkeleton {
    #[serde(default)]
    id: u32,
    state: WireSkeletonState,
    position: [f32; 3],
    #[serde(default)]
    joints: HashMap<String, WireJoint>,
}

#[derive(Debug, Clone, Deserialize)]
struct WireFrame {
    #[serde(default)]
    timestamp: Option<u64>,
    #[serde(default)]
    skeletons: Vec<WireSkeleton>,
}

fn point(p: [f32; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

/// Parse one JSON skeleton frame as sent by the sensor bridge.
///
/// `{"timestamp":1,"skeletons":[{"id":1,"state":"tracked","position":[0,0,2],
///   "joints":{"head":{"position":[0,0.6,2],"state":"tracked"}}}]}`
///
/// Joints other than head and hands are dropped. `inferred` joints count as
/// tracked; only `not_tracked` does not.
pub fn parse_skeleton_message(msg: &str) -> Option<SkeletonFrame> {
    let msg = msg.trim();
    if !msg.starts_with('{') {
        return None;
    }

    let wire: WireFrame = serde_json::from_str(msg).ok()?;
    let skeletons = wire
        .skeletons
        .into_iter()
        .map(|s| {
            let joints = s
                .joints
                .iter()
                .filter_map(|(name, j)| {
                    let name = JointName::from_wire(name)?;
                    let joint = Joint {
                        position: point(j.position),
                        tracked: j.state != WireJointState::NotTracked,
                    };
                    Some((name, joint))
                })
                .collect();
            Skeleton {
                id: s.id,
                tracked: s.state == WireSkeletonState::Tracked,
                position: point(s.position),
                joints,
            }
        })
        .collect();

    Some(SkeletonFrame {
        timestamp: wire.timestamp.unwrap_or_else(now_ms),
        skeletons,
    })
}

/// Bind `bind_addr` and forward every parsed frame to `frames`.
pub async fn spawn_udp_skeleton_task(
    bind_addr: SocketAddr,
    frames: mpsc::Sender<SkeletonFrame>,
) -> Result<JoinHandle<()>> {
    let sock = UdpSocket::bind(bind_addr)
        .await
        .with_context(|| format!("bind skeleton UDP listener on {bind_addr}"))?;
    log::info!("UDP skeleton listener bound on {bind_addr}");

    Ok(tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        loop {
            let (len, src) = match sock.recv_from(&mut buf).await {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("UDP skeleton recv error: {e}");
                    continue;
                }
            };

            let Some(frame) = std::str::from_utf8(&buf[..len]).ok().and_then(parse_skeleton_message) else {
                log::debug!("Dropping malformed skeleton datagram from {src}");
                continue;
            };

            match frames.try_send(frame) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => log::trace!("Frame queue full, dropping frame"),
                Err(TrySendError::Closed(_)) => break,
            }
        }
        log::info!("UDP skeleton listener stopped");
    }))
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
