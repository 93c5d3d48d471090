//! Subject selection - picks the one body whose gestures count

use crate::types::{JointName, JointSample, Skeleton, SkeletonFrame};
use std::cmp::Ordering;

/// Why a frame produced no joint sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No skeleton in the frame is tracked
    NoSubject,
    /// The chosen subject has an untracked head or hand
    MissingJoint { skeleton_id: u32, joint: JointName },
}

/// Tracked skeleton with the smallest `z * |x|`; the first one wins ties.
pub fn select_subject(skeletons: &[Skeleton]) -> Option<&Skeleton> {
    skeletons
        .iter()
        .filter(|s| s.tracked)
        .min_by(|a, b| {
            a.distance_score()
                .partial_cmp(&b.distance_score())
                .unwrap_or(Ordering::Equal)
        })
}

/// Reduce a skeleton to the three joints the gesture engine reads.
pub fn joint_sample(skeleton: &Skeleton) -> Result<JointSample, SkipReason> {
    let sample = JointSample {
        head: skeleton.joint(JointName::Head),
        left_hand: skeleton.joint(JointName::LeftHand),
        right_hand: skeleton.joint(JointName::RightHand),
    };

    let missing = [
        (JointName::Head, sample.head),
        (JointName::LeftHand, sample.left_hand),
        (JointName::RightHand, sample.right_hand),
    ]
    .into_iter()
    .find(|(_, joint)| !joint.tracked);

    match missing {
        Some((joint, _)) => Err(SkipReason::MissingJoint {
            skeleton_id: skeleton.id,
            joint,
        }),
        None => Ok(sample),
    }
}

/// Subject selection followed by joint reduction for a whole frame.
pub fn sample_frame(frame: &SkeletonFrame) -> Result<JointSample, SkipReason> {
    let subject = select_subject(&frame.skeletons).ok_or(SkipReason::NoSubject)?;
    joint_sample(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Joint, Point3};
    use std::collections::HashMap;

    fn body(id: u32, tracked: bool, x: f32, z: f32) -> Skeleton {
        let mut joints = HashMap::new();
        joints.insert(JointName::Head, Joint::tracked(Point3::new(x, 0.6, z)));
        joints.insert(JointName::LeftHand, Joint::tracked(Point3::new(x - 0.2, 0.0, z)));
        joints.insert(JointName::RightHand, Joint::tracked(Point3::new(x + 0.2, 0.0, z)));
        Skeleton {
            id,
            tracked,
            position: Point3::new(x, 0.0, z),
            joints,
        }
    }

    #[test]
    fn picks_most_centered_and_closest() {
        let bodies = vec![body(1, true, 0.8, 2.0), body(2, true, 0.1, 3.0), body(3, true, -0.5, 1.0)];
        // scores: 1.6, 0.3, 0.5
        assert_eq!(select_subject(&bodies).map(|s| s.id), Some(2));
    }

    #[test]
    fn ignores_untracked_bodies() {
        let bodies = vec![body(1, false, 0.0, 1.0), body(2, true, 0.5, 2.0)];
        assert_eq!(select_subject(&bodies).map(|s| s.id), Some(2));
    }

    #[test]
    fn ties_keep_input_order() {
        let bodies = vec![body(7, true, 0.5, 2.0), body(8, true, -0.5, 2.0)];
        assert_eq!(select_subject(&bodies).map(|s| s.id), Some(7));
    }

    #[test]
    fn no_tracked_body_means_no_subject() {
        let frame = SkeletonFrame {
            timestamp: 0,
            skeletons: vec![body(1, false, 0.0, 1.0)],
        };
        assert_eq!(sample_frame(&frame), Err(SkipReason::NoSubject));
        assert_eq!(sample_frame(&SkeletonFrame::default()), Err(SkipReason::NoSubject));
    }

    #[test]
    fn untracked_hand_skips_frame() {
        let mut subject = body(4, true, 0.0, 2.0);
        subject.joints.insert(JointName::LeftHand, Joint::untracked());
        assert_eq!(
            joint_sample(&subject),
            Err(SkipReason::MissingJoint {
                skeleton_id: 4,
                joint: JointName::LeftHand
            })
        );
    }

    #[test]
    fn absent_head_skips_frame() {
        let mut subject = body(5, true, 0.0, 2.0);
        subject.joints.remove(&JointName::Head);
        assert!(matches!(
            joint_sample(&subject),
            Err(SkipReason::MissingJoint { joint: JointName::Head, .. })
        ));
    }

    #[test]
    fn tracked_subject_yields_sample() {
        let frame = SkeletonFrame {
            timestamp: 0,
            skeletons: vec![body(1, true, 0.0, 2.0)],
        };
        let sample = sample_frame(&frame).expect("sample");
        assert!(sample.is_fully_tracked());
        assert!((sample.right_hand.position.x - 0.2).abs() < 1e-6);
    }
}
