//! Skeleton pathway - receives body frames and picks the gesture subject

use crate::config::SensorConfig;
use crate::types::{Joint, JointName, Point3, Skeleton, SkeletonFrame};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

mod selector;
mod udp_skeleton;

pub use selector::{joint_sample, sample_frame, select_subject, SkipReason};
pub use udp_skeleton::{parse_skeleton_message, spawn_udp_skeleton_task};

/// Frames buffered between the receiver and the processing loop
const FRAME_QUEUE_DEPTH: usize = 64;

/// The Skeleton Pathway - owns whichever frame source is configured
pub struct SkeletonPathway {
    config: SensorConfig,
    task: Option<JoinHandle<()>>,
}

impl SkeletonPathway {
    pub fn new(config: SensorConfig) -> Self {
        if let Some(addr) = config.udp_addr {
            log::info!("Skeleton frames expected over UDP on {addr}");
        } else {
            log::warn!("No skeleton source configured, using simulated performer");
        }
        Self { config, task: None }
    }

    /// Start receiving frames. A source that is already running is stopped
    /// first, so its receiver closes.
    pub async fn start(&mut self) -> Result<mpsc::Receiver<SkeletonFrame>> {
        self.stop().await;
        log::info!("Starting Skeleton Pathway...");
        let (tx, rx) = mpsc::channel(FRAME_QUEUE_DEPTH);

        let task = match self.config.udp_addr {
            Some(addr) => spawn_udp_skeleton_task(addr, tx).await?,
            None => spawn_simulated_task(self.config.simulated_fps, tx),
        };
        self.task = Some(task);
        Ok(rx)
    }

    /// Stop the frame source; the receiver drains and then closes.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            log::info!("Stopping Skeleton Pathway...");
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for SkeletonPathway {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn spawn_simulated_task(fps: u32, frames: mpsc::Sender<SkeletonFrame>) -> JoinHandle<()> {
    let period = Duration::from_secs_f64(1.0 / f64::from(fps.max(1)));
    tokio::spawn(async move {
        let performer = SimulatedPerformer::default();
        let started = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let frame = performer.frame_at(started.elapsed());
            if frames.send(frame).await.is_err() {
                break;
            }
        }
    })
}

/// Simulated pose held for one phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pose {
    Rest,
    RightArmOut,
    LeftArmOut,
    HandsUp,
    HandsAtHead,
}

/// A scripted subject standing 2 m from the sensor, cycling through every
/// gesture with a rest pose in between.
#[derive(Debug, Clone)]
pub struct SimulatedPerformer {
    pub phase: Duration,
    pub head: Point3,
}

impl Default for SimulatedPerformer {
    fn default() -> Self {
        Self {
            phase: Duration::from_millis(1500),
            head: Point3::new(0.0, 0.6, 2.0),
        }
    }
}

impl SimulatedPerformer {
    const SCRIPT: [Pose; 8] = [
        Pose::Rest,
        Pose::RightArmOut,
        Pose::Rest,
        Pose::LeftArmOut,
        Pose::Rest,
        Pose::HandsUp,
        Pose::Rest,
        Pose::HandsAtHead,
    ];

    pub fn pose_at(&self, elapsed: Duration) -> Pose {
        let phase_ms = self.phase.as_millis().max(1);
        let index = (elapsed.as_millis() / phase_ms) as usize % Self::SCRIPT.len();
        Self::SCRIPT[index]
    }

    pub fn frame_at(&self, elapsed: Duration) -> SkeletonFrame {
        let h = self.head;
        let (left, right) = match self.pose_at(elapsed) {
            Pose::Rest => ((h.x - 0.2, h.y - 0.6), (h.x + 0.2, h.y - 0.6)),
            Pose::RightArmOut => ((h.x - 0.2, h.y - 0.6), (h.x + 0.7, h.y - 0.3)),
            Pose::LeftArmOut => ((h.x - 0.7, h.y - 0.3), (h.x + 0.2, h.y - 0.6)),
            Pose::HandsUp => ((h.x - 0.3, h.y + 0.2), (h.x + 0.3, h.y + 0.2)),
            Pose::HandsAtHead => ((h.x - 0.25, h.y), (h.x + 0.25, h.y)),
        };

        let mut joints = HashMap::new();
        joints.insert(JointName::Head, Joint::tracked(h));
        joints.insert(JointName::LeftHand, Joint::tracked(Point3::new(left.0, left.1, h.z)));
        joints.insert(JointName::RightHand, Joint::tracked(Point3::new(right.0, right.1, h.z)));

        SkeletonFrame {
            timestamp: elapsed.as_millis() as u64,
            skeletons: vec![Skeleton {
                id: 1,
                tracked: true,
                position: Point3::new(h.x, h.y - 0.5, h.z),
                joints,
            }],
        }
    }
}
