//! Gesture engine - turns joint samples into edge-triggered slideshow commands
//!
//! Four independent latches remember whether each gesture was already active
//! on the previous frame. A command fires only on the frame a latch goes from
//! inactive to active, so holding a pose produces exactly one command.
//!
//! | Gesture | Condition | Command |
//! |---|---|---|
//! | Forward | right hand stretched out to the right of the head | `Next` |
//! | Back | left hand stretched out to the left of the head | `Previous` |
//! | Blank | both hands raised to about head height or above | `ToggleBlank` |
//! | Present | both hands level with the head, not mid forward/back | `TogglePresent` |

use crate::error::{PresenterError, Result};
use crate::types::{Command, JointSample};
use serde::{Deserialize, Serialize};

/// Distance thresholds in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureThresholds {
    /// Horizontal hand offset from the head for a stretched arm
    pub arm_stretched: f32,
    /// Vertical margin below the head that still counts as raised
    pub arm_raised: f32,
    /// Vertical distance that counts as level with the head
    pub near_head: f32,
}

impl GestureThresholds {
    pub const DEFAULT_ARM_STRETCHED: f32 = 0.45;
    pub const DEFAULT_ARM_RAISED: f32 = 0.20;
    pub const DEFAULT_NEAR_HEAD: f32 = 0.05;

    pub fn new(arm_stretched: f32, arm_raised: f32, near_head: f32) -> Result<Self> {
        let thresholds = Self {
            arm_stretched,
            arm_raised,
            near_head,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("gesture.arm_stretched", self.arm_stretched),
            ("gesture.arm_raised", self.arm_raised),
            ("gesture.near_head", self.near_head),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PresenterError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            arm_stretched: Self::DEFAULT_ARM_STRETCHED,
            arm_raised: Self::DEFAULT_ARM_RAISED,
            near_head: Self::DEFAULT_NEAR_HEAD,
        }
    }
}

/// Whether each gesture was already emitting on the previous frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureLatchState {
    forward_active: bool,
    back_active: bool,
    blank_active: bool,
    present_active: bool,
}

impl GestureLatchState {
    pub fn forward_active(&self) -> bool {
        self.forward_active
    }

    pub fn back_active(&self) -> bool {
        self.back_active
    }

    pub fn blank_active(&self) -> bool {
        self.blank_active
    }

    pub fn present_active(&self) -> bool {
        self.present_active
    }

    /// Advance the state machine by one frame.
    ///
    /// Present is evaluated against the forward/back latches as already
    /// updated for this frame, so hands sweeping through head height on the
    /// way to a stretched arm never start the slideshow.
    pub fn step(&mut self, sample: &JointSample, thresholds: &GestureThresholds) -> Vec<Command> {
        let mut commands = Vec::new();
        if !sample.is_fully_tracked() {
            return commands;
        }

        let head = sample.head.position;
        let left = sample.left_hand.position;
        let right = sample.right_hand.position;

        let forward = right.x > head.x + thresholds.arm_stretched;
        if latch(&mut self.forward_active, forward) {
            commands.push(Command::Next);
        }

        let back = left.x < head.x - thresholds.arm_stretched;
        if latch(&mut self.back_active, back) {
            commands.push(Command::Previous);
        }

        let raised_line = head.y - thresholds.arm_raised;
        let blank = left.y > raised_line && right.y > raised_line;
        if latch(&mut self.blank_active, blank) {
            commands.push(Command::ToggleBlank);
        }

        let present = (head.y - right.y).abs() < thresholds.near_head
            && (head.y - left.y).abs() < thresholds.near_head
            && !self.forward_active
            && !self.back_active;
        if latch(&mut self.present_active, present) {
            commands.push(Command::TogglePresent);
        }

        commands
    }
}

/// Store `condition` in the latch; true only on a rising edge.
fn latch(active: &mut bool, condition: bool) -> bool {
    let rising = condition && !*active;
    *active = condition;
    rising
}

/// Owns the latch state and thresholds for one tracked subject
#[derive(Debug, Clone, Default)]
pub struct GestureEngine {
    thresholds: GestureThresholds,
    latches: GestureLatchState,
}

impl GestureEngine {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            latches: GestureLatchState::default(),
        }
    }

    /// Evaluate one frame. Returns the commands whose gesture just started.
    ///
    /// A sample with any untracked joint is ignored: nothing is emitted and
    /// no latch changes.
    pub fn process(&mut self, sample: &JointSample) -> Vec<Command> {
        let commands = self.latches.step(sample, &self.thresholds);
        if !commands.is_empty() {
            log::debug!("Gesture latches now {:?}", self.latches);
        }
        commands
    }

    pub fn latches(&self) -> GestureLatchState {
        self.latches
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    pub fn reset(&mut self) {
        self.latches = GestureLatchState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Joint, Point3};

    const ORIGIN: Point3 = Point3::new(0.0, 0.0, 0.0);

    /// Hands hanging low at the sides: no gesture active.
    fn rest() -> JointSample {
        JointSample::new(
            ORIGIN,
            Point3::new(-0.2, -0.5, 0.0),
            Point3::new(0.2, -0.5, 0.0),
        )
    }

    fn forward_only() -> JointSample {
        JointSample::new(
            ORIGIN,
            Point3::new(-0.2, -0.5, 0.0),
            Point3::new(0.6, -0.5, 0.0),
        )
    }

    fn back_only() -> JointSample {
        JointSample::new(
            ORIGIN,
            Point3::new(-0.6, -0.5, 0.0),
            Point3::new(0.2, -0.5, 0.0),
        )
    }

    #[test]
    fn holding_a_gesture_fires_once() {
        let mut engine = GestureEngine::default();
        assert_eq!(engine.process(&forward_only()), vec![Command::Next]);
        for _ in 0..10 {
            assert!(engine.process(&forward_only()).is_empty());
        }
        assert!(engine.latches().forward_active());
    }

    #[test]
    fn releasing_and_repeating_refires() {
        let mut engine = GestureEngine::default();
        assert_eq!(engine.process(&back_only()), vec![Command::Previous]);
        assert!(engine.process(&rest()).is_empty());
        assert!(!engine.latches().back_active());
        assert!(engine.process(&rest()).is_empty());
        assert_eq!(engine.process(&back_only()), vec![Command::Previous]);
    }

    #[test]
    fn forward_alone_emits_only_next() {
        let mut engine = GestureEngine::default();
        let commands = engine.process(&forward_only());
        assert_eq!(commands, vec![Command::Next]);
        let latches = engine.latches();
        assert!(!latches.back_active());
        assert!(!latches.blank_active());
        assert!(!latches.present_active());
    }

    #[test]
    fn stretched_right_hand_at_head_height() {
        // Both hands also sit above head.y - arm_raised, so blank starts too.
        let sample = JointSample::new(ORIGIN, ORIGIN, Point3::new(0.5, 0.0, 0.0));
        let mut engine = GestureEngine::default();

        assert_eq!(
            engine.process(&sample),
            vec![Command::Next, Command::ToggleBlank]
        );
        assert!(engine.process(&sample).is_empty());

        // Arm pulled in with both hands level with the head: forward releases
        // and the present pose is no longer masked.
        let pulled_in = JointSample::new(ORIGIN, ORIGIN, Point3::new(0.1, 0.0, 0.0));
        assert_eq!(engine.process(&pulled_in), vec![Command::TogglePresent]);
        assert_eq!(engine.process(&sample), vec![Command::Next]);
    }

    #[test]
    fn stretched_right_hand_with_hands_low() {
        let stretched = forward_only();
        let pulled_in = JointSample::new(
            ORIGIN,
            Point3::new(-0.2, -0.5, 0.0),
            Point3::new(0.1, -0.5, 0.0),
        );
        let mut engine = GestureEngine::default();

        assert_eq!(engine.process(&stretched), vec![Command::Next]);
        assert!(engine.process(&stretched).is_empty());
        assert!(engine.process(&pulled_in).is_empty());
        assert_eq!(engine.process(&stretched), vec![Command::Next]);
    }

    #[test]
    fn both_hands_raised_blanks_once() {
        let sample = JointSample::new(
            ORIGIN,
            Point3::new(-0.01, 0.25, 0.0),
            Point3::new(0.01, 0.25, 0.0),
        );
        let mut engine = GestureEngine::default();
        assert_eq!(engine.process(&sample), vec![Command::ToggleBlank]);
        assert!(engine.process(&sample).is_empty());
        assert!(engine.process(&sample).is_empty());
    }

    #[test]
    fn lowering_and_raising_hands_blanks_again() {
        let raised = JointSample::new(
            ORIGIN,
            Point3::new(-0.01, 0.25, 0.0),
            Point3::new(0.01, 0.25, 0.0),
        );
        let mut engine = GestureEngine::default();
        assert_eq!(engine.process(&raised), vec![Command::ToggleBlank]);

        assert!(engine.process(&rest()).is_empty());
        assert!(!engine.latches().blank_active());

        assert_eq!(engine.process(&raised), vec![Command::ToggleBlank]);
    }

    #[test]
    fn dropping_hands_from_head_rearms_present() {
        let at_head = JointSample::new(
            Point3::new(0.0, 0.6, 2.0),
            Point3::new(-0.25, 0.6, 2.0),
            Point3::new(0.25, 0.6, 2.0),
        );
        let dropped = JointSample::new(
            Point3::new(0.0, 0.6, 2.0),
            Point3::new(-0.25, 0.0, 2.0),
            Point3::new(0.25, 0.0, 2.0),
        );
        let mut engine = GestureEngine::default();
        assert_eq!(
            engine.process(&at_head),
            vec![Command::ToggleBlank, Command::TogglePresent]
        );
        assert!(engine.process(&at_head).is_empty());

        assert!(engine.process(&dropped).is_empty());
        assert!(!engine.latches().present_active());
        assert!(!engine.latches().blank_active());

        assert_eq!(
            engine.process(&at_head),
            vec![Command::ToggleBlank, Command::TogglePresent]
        );
    }

    #[test]
    fn one_raised_hand_does_not_blank() {
        let sample = JointSample::new(
            ORIGIN,
            Point3::new(-0.1, 0.25, 0.0),
            Point3::new(0.1, -0.5, 0.0),
        );
        let mut engine = GestureEngine::default();
        assert!(engine.process(&sample).is_empty());
    }

    #[test]
    fn hands_level_with_head_start_presentation() {
        let sample = JointSample::new(
            Point3::new(0.0, 0.6, 2.0),
            Point3::new(-0.25, 0.62, 2.0),
            Point3::new(0.25, 0.58, 2.0),
        );
        let mut engine = GestureEngine::default();
        let commands = engine.process(&sample);
        assert!(commands.contains(&Command::TogglePresent));
        assert!(engine.latches().present_active());
        assert!(engine.process(&sample).is_empty());
    }

    #[test]
    fn present_suppressed_while_forward_latched() {
        let mut engine = GestureEngine::default();
        engine.process(&forward_only());
        assert!(engine.latches().forward_active());

        // Hands level with the head and the right arm still stretched.
        let sample = JointSample::new(
            ORIGIN,
            Point3::new(-0.1, 0.01, 0.0),
            Point3::new(0.6, -0.01, 0.0),
        );
        let commands = engine.process(&sample);
        assert!(!commands.contains(&Command::TogglePresent));
        assert!(!engine.latches().present_active());
    }

    #[test]
    fn present_suppressed_while_back_latched() {
        let mut engine = GestureEngine::default();
        let sample = JointSample::new(
            ORIGIN,
            Point3::new(-0.6, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
        );
        let commands = engine.process(&sample);
        assert!(commands.contains(&Command::Previous));
        assert!(!commands.contains(&Command::TogglePresent));
    }

    #[test]
    fn simultaneous_gestures_fire_together_in_order() {
        let sample = JointSample::new(
            ORIGIN,
            Point3::new(-0.6, 0.1, 0.0),
            Point3::new(0.6, 0.1, 0.0),
        );
        let mut engine = GestureEngine::default();
        assert_eq!(
            engine.process(&sample),
            vec![Command::Next, Command::Previous, Command::ToggleBlank]
        );
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let thresholds = GestureThresholds::new(0.5, 0.25, 0.125).expect("valid");
        let mut engine = GestureEngine::new(thresholds);
        let on_line = JointSample::new(
            ORIGIN,
            Point3::new(-0.5, -1.0, 0.0),
            Point3::new(0.5, -1.0, 0.0),
        );
        assert!(engine.process(&on_line).is_empty());
    }

    #[test]
    fn untracked_joint_is_a_no_op() {
        let mut engine = GestureEngine::default();
        engine.process(&forward_only());
        let before = engine.latches();

        let mut sample = rest();
        sample.right_hand = Joint::untracked();
        assert!(engine.process(&sample).is_empty());
        assert_eq!(engine.latches(), before);
    }

    #[test]
    fn custom_thresholds_change_trigger_distance() {
        let thresholds = GestureThresholds::new(0.8, 0.2, 0.05).expect("valid");
        let mut engine = GestureEngine::new(thresholds);
        assert!(engine.process(&forward_only()).is_empty());

        let far = JointSample::new(
            ORIGIN,
            Point3::new(-0.2, -0.5, 0.0),
            Point3::new(0.9, -0.5, 0.0),
        );
        assert_eq!(engine.process(&far), vec![Command::Next]);
    }

    #[test]
    fn reset_clears_latches() {
        let mut engine = GestureEngine::default();
        engine.process(&forward_only());
        engine.reset();
        assert_eq!(engine.latches(), GestureLatchState::default());
        assert_eq!(engine.process(&forward_only()), vec![Command::Next]);
    }

    #[test]
    fn rejects_bad_thresholds() {
        assert!(GestureThresholds::new(0.0, 0.2, 0.05).is_err());
        assert!(GestureThresholds::new(0.45, -0.2, 0.05).is_err());
        assert!(GestureThresholds::new(0.45, 0.2, f32::NAN).is_err());
        assert!(GestureThresholds::default().validate().is_ok());
    }
}
