//! Core data types for the Presenter system

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A point in sensor space (meters, camera-relative). Larger `y` is higher.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A single tracked body point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub position: Point3,
    /// Untracked joints carry no meaningful position
    pub tracked: bool,
}

impl Joint {
    pub const fn tracked(position: Point3) -> Self {
        Self { position, tracked: true }
    }

    pub const fn untracked() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            tracked: false,
        }
    }
}

/// The joints this system consumes. A full skeleton has more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointName {
    Head,
    LeftHand,
    RightHand,
}

impl JointName {
    pub const ALL: [JointName; 3] = [JointName::Head, JointName::LeftHand, JointName::RightHand];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::LeftHand => "hand_left",
            Self::RightHand => "hand_right",
        }
    }

    /// Resolve a wire joint name; unknown joints return `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "head" => Some(Self::Head),
            "hand_left" | "left_hand" => Some(Self::LeftHand),
            "hand_right" | "right_hand" => Some(Self::RightHand),
            _ => None,
        }
    }
}

/// One body reported by the sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    pub id: u32,
    pub tracked: bool,
    /// Body center position
    pub position: Point3,
    pub joints: HashMap<JointName, Joint>,
}

impl Skeleton {
    /// Selection key: smaller means closer to the sensor and more centered.
    pub fn distance_score(&self) -> f32 {
        self.position.z * self.position.x.abs()
    }

    /// Missing joints are reported as untracked.
    pub fn joint(&self, name: JointName) -> Joint {
        self.joints.get(&name).copied().unwrap_or_else(Joint::untracked)
    }
}

/// All bodies reported for one sensor frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkeletonFrame {
    /// Timestamp in milliseconds
    pub timestamp: u64,
    pub skeletons: Vec<Skeleton>,
}

/// Per-frame input to the gesture engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub head: Joint,
    pub left_hand: Joint,
    pub right_hand: Joint,
}

impl JointSample {
    /// Sample with all three joints tracked.
    pub const fn new(head: Point3, left_hand: Point3, right_hand: Point3) -> Self {
        Self {
            head: Joint::tracked(head),
            left_hand: Joint::tracked(left_hand),
            right_hand: Joint::tracked(right_hand),
        }
    }

    pub fn is_fully_tracked(&self) -> bool {
        self.head.tracked && self.left_hand.tracked && self.right_hand.tracked
    }
}

/// Discrete slideshow command emitted by the gesture engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Advance to the next slide
    Next,
    /// Go back one slide
    Previous,
    /// Blank/unblank the screen
    ToggleBlank,
    /// Start the slideshow
    TogglePresent,
}

/// UI visibility action, from voice or the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiAction {
    ShowWindow,
    HideWindow,
    ShowCircles,
    HideCircles,
    ToggleCircles,
}

/// How the recognizer classified an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseKind {
    #[default]
    Recognized,
    Hypothesized,
    Rejected,
}

/// A phrase event from the external speech recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedPhrase {
    pub text: String,
    /// Recognizer confidence (0.0-1.0)
    pub confidence: f32,
    #[serde(default)]
    pub kind: PhraseKind,
}

impl RecognizedPhrase {
    pub fn recognized(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            kind: PhraseKind::Recognized,
        }
    }
}
