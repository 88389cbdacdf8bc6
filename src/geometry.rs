//! Geometric features derived from pixel-space hand landmarks.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};

use crate::error::HandError;
use crate::hand::{midpoint, BoundingBox, Digit, FingerState, HandLandmarkSet, LandmarkIdx};

/// Computes the axis-aligned bounding box of `points`.
///
/// A single point yields a zero-area box. An empty input is rejected.
pub fn bounding_box<I>(points: I) -> Result<BoundingBox, HandError>
where
    I: IntoIterator<Item = (i32, i32)>,
{
    points
        .into_iter()
        .fold(None, |bbox: Option<BoundingBox>, (x, y)| {
            Some(match bbox {
                None => BoundingBox::new(x, y, x, y),
                Some(b) => BoundingBox::new(
                    b.xmin.min(x),
                    b.ymin.min(y),
                    b.xmax.max(x),
                    b.ymax.max(y),
                ),
            })
        })
        .ok_or(HandError::EmptyPointSet)
}

/// Angle of the line from `origin` to `target`, as `atan(dy / dx)`.
///
/// The result lies in (-π/2, π/2) except on a vertical line, where it is π/2 when `target` is
/// below `origin` in image coordinates and 3π/2 otherwise (including coincident points).
// NOTE: 3π/2 rather than -π/2 for the upward case. Finger classification depends on it.
pub fn slope_angle(origin: Point2<i32>, target: Point2<i32>) -> f64 {
    let dx = i64::from(target.x) - i64::from(origin.x);
    let dy = i64::from(target.y) - i64::from(origin.y);
    if dx == 0 {
        if target.y > origin.y {
            PI / 2.0
        } else {
            PI * 2.0 * 3.0 / 4.0
        }
    } else {
        (dy as f64 / dx as f64).atan()
    }
}

/// Rotates `target` around `origin` by `rotation` radians, returning the offset from `origin`.
///
/// The direction of `target` is taken from [`slope_angle`], so offsets that point left of
/// `origin` are folded onto the right half-plane before rotating.
pub fn rotate_about(rotation: f64, origin: Point2<i32>, target: Point2<i32>) -> Vector2<f64> {
    let angle = slope_angle(origin, target);
    let radius = distance(origin, target);
    Vector2::new(
        (angle + rotation).cos() * radius,
        (angle + rotation).sin() * radius,
    )
}

// f64 holds every i32 difference exactly
fn distance(a: Point2<i32>, b: Point2<i32>) -> f64 {
    let dx = f64::from(b.x) - f64::from(a.x);
    let dy = f64::from(b.y) - f64::from(a.y);
    dx.hypot(dy)
}

/// Classifies which digits of `hand` are extended.
///
/// The thumb is compared in a frame rotated so that the wrist→pinky-MCP line is vertical; the
/// other digits compare the wrist distance of the tip against the joint two landmarks below it.
/// Comparisons are strict, so a digit collapsed onto its joint or the wrist counts as not
/// extended. Any `i32` coordinates are accepted.
pub fn fingers_up(hand: &HandLandmarkSet) -> Result<FingerState, HandError> {
    hand.ensure_complete()?;

    let wrist = hand.landmark(LandmarkIdx::Wrist)?.point();
    let pinky_mcp = hand.landmark(LandmarkIdx::PinkyMcp)?.point();
    let reference = slope_angle(wrist, pinky_mcp);

    let mut extended = [false; 5];
    extended[0] = thumb_extended(hand, wrist, reference)?;
    for digit in &Digit::ALL[1..] {
        extended[*digit as usize] = finger_extended(hand, wrist, digit.tip())?;
    }

    log::trace!("fingers up: {:?}", extended);
    Ok(FingerState::new(extended))
}

fn thumb_extended(
    hand: &HandLandmarkSet,
    wrist: Point2<i32>,
    reference: f64,
) -> Result<bool, HandError> {
    let tip = hand.get(Digit::Thumb.tip())?.point();
    let joint = hand.get(Digit::Thumb.tip() - 1)?.point();

    let rotation = PI / 2.0 - reference;
    let tip_x = rotate_about(rotation, wrist, tip).x;
    let joint_x = rotate_about(rotation, wrist, joint).x;
    Ok(tip_x.abs() > joint_x.abs())
}

fn finger_extended(
    hand: &HandLandmarkSet,
    wrist: Point2<i32>,
    tip_id: usize,
) -> Result<bool, HandError> {
    let tip = hand.get(tip_id)?.point();
    let joint = hand.get(tip_id - 2)?.point();

    let tip_dist = distance(wrist, tip);
    let joint_dist = distance(wrist, joint);
    Ok(tip_dist > joint_dist)
}

/// Distance between two landmarks, with the endpoints and midpoint for annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceMeasurement {
    pub length: f64,
    pub start: (i32, i32),
    pub end: (i32, i32),
    pub center: (i32, i32),
}

impl DistanceMeasurement {
    /// `[x1, y1, x2, y2, cx, cy]`
    pub fn to_array(&self) -> [i32; 6] {
        [
            self.start.0,
            self.start.1,
            self.end.0,
            self.end.1,
            self.center.0,
            self.center.1,
        ]
    }
}

/// Measures the Euclidean distance between landmarks `p1` and `p2` of `hand`.
pub fn point_distance(
    hand: &HandLandmarkSet,
    p1: usize,
    p2: usize,
) -> Result<DistanceMeasurement, HandError> {
    let a = hand.get(p1)?;
    let b = hand.get(p2)?;

    Ok(DistanceMeasurement {
        length: distance(a.point(), b.point()),
        start: (a.x, a.y),
        end: (b.x, b.y),
        center: (midpoint(a.x, b.x), midpoint(a.y, b.y)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// A hand with every landmark on the wrist, to be moved into place by the test.
    fn collapsed_hand(wrist: (i32, i32)) -> Vec<(i32, i32)> {
        vec![wrist; 21]
    }

    #[test]
    fn bounding_box_is_min_max() {
        let bbox = bounding_box([(5, 9), (-3, 12), (7, 1), (0, 0)]).unwrap();
        assert_eq!(bbox, BoundingBox::new(-3, 0, 7, 12));
    }

    #[test]
    fn bounding_box_of_single_point_is_empty() {
        let bbox = bounding_box([(42, 17)]).unwrap();
        assert_eq!(bbox.width(), 0);
        assert_eq!(bbox.height(), 0);
        assert_eq!(bbox.to_tuple(), (42, 17, 42, 17));
    }

    #[test]
    fn bounding_box_of_nothing_fails() {
        assert_eq!(
            bounding_box(std::iter::empty::<(i32, i32)>()),
            Err(HandError::EmptyPointSet)
        );
    }

    #[test]
    fn slope_angle_of_vertical_lines() {
        let origin = Point2::new(10, 10);
        assert_relative_eq!(slope_angle(origin, Point2::new(10, 30)), PI / 2.0);
        assert_relative_eq!(slope_angle(origin, Point2::new(10, 0)), 3.0 * PI / 2.0);
        assert_relative_eq!(slope_angle(origin, origin), 3.0 * PI / 2.0);
    }

    #[test]
    fn slope_angle_ignores_quadrant() {
        let origin = Point2::new(0, 0);
        assert_relative_eq!(slope_angle(origin, Point2::new(50, 0)), 0.0);
        assert_relative_eq!(slope_angle(origin, Point2::new(10, 10)), PI / 4.0);
        assert_relative_eq!(slope_angle(origin, Point2::new(-10, -10)), PI / 4.0);
        assert_relative_eq!(slope_angle(origin, Point2::new(-10, 10)), -PI / 4.0);
    }

    #[test]
    fn rotation_matches_manual_computation() {
        let wrist = Point2::new(100, 100);
        let tip = Point2::new(80, 60);
        let rotated = rotate_about(PI / 2.0, wrist, tip);

        let angle = (-40.0f64 / -20.0).atan();
        let radius = (20.0f64 * 20.0 + 40.0 * 40.0).sqrt();
        assert_relative_eq!(rotated.x, (angle + PI / 2.0).cos() * radius, epsilon = 1e-9);
        assert_relative_eq!(rotated.y, (angle + PI / 2.0).sin() * radius, epsilon = 1e-9);
        assert_relative_eq!(rotated.x, -40.0, epsilon = 1e-9);
    }

    #[test]
    fn thumb_out_is_extended() {
        let mut points = collapsed_hand((100, 100));
        points[17] = (150, 100);
        points[3] = (90, 90);
        points[4] = (80, 60);
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert!(state.is_extended(Digit::Thumb));
    }

    #[test]
    fn thumb_tucked_is_folded() {
        let mut points = collapsed_hand((100, 100));
        points[17] = (150, 100);
        points[3] = (80, 60);
        points[4] = (90, 90);
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert!(!state.is_extended(Digit::Thumb));
    }

    #[test]
    fn thumb_on_wrist_is_folded() {
        let mut points = collapsed_hand((100, 100));
        points[17] = (150, 100);
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert!(!state.is_extended(Digit::Thumb));
    }

    #[test]
    fn index_tip_beyond_joint_is_extended() {
        let mut points = collapsed_hand((100, 150));
        points[6] = (100, 80);
        points[8] = (100, 50);
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert!(state.is_extended(Digit::Index));
        assert!(!state.is_extended(Digit::Middle));
    }

    #[test]
    fn all_tips_beyond_joints_are_extended() {
        let mut points = collapsed_hand((200, 300));
        for (i, tip) in [8usize, 12, 16, 20].into_iter().enumerate() {
            let x = 140 + 40 * i as i32;
            points[tip - 2] = (x, 200);
            points[tip] = (x, 120);
        }
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert_eq!(&state.flags()[1..], &[1, 1, 1, 1]);
    }

    #[test]
    fn coincident_tip_and_joint_is_folded() {
        let mut points = collapsed_hand((200, 300));
        for tip in [8usize, 12, 16, 20] {
            points[tip - 2] = (220, 180);
            points[tip] = (220, 180);
        }
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        assert_eq!(&state.flags()[1..], &[0, 0, 0, 0]);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let mut points = collapsed_hand((i32::MIN, 0));
        points[8] = (i32::MAX, 0);
        points[12] = (i32::MIN, i32::MAX);
        points[10] = (i32::MIN, i32::MIN);
        let state = fingers_up(&HandLandmarkSet::from_points(points)).unwrap();
        // thumb, ring and pinky sit on the wrist; the middle tip is nearer than its joint
        assert_eq!(state.flags(), [0, 1, 0, 0, 0]);
    }

    #[test]
    fn saturated_model_output_is_classified() {
        let mut normalized = vec![Point3::new(0.5f32, 0.5, 0.0); 21];
        normalized[8] = Point3::new(1e9, -1e9, 0.0);
        normalized[4] = Point3::new(-1e9, 1e9, 0.0);
        normalized[17] = Point3::new(f32::MAX, 0.5, 0.0);
        let hand = HandLandmarkSet::from_normalized(&normalized, 640, 480);
        assert_eq!(hand.get(8).unwrap().x, i32::MAX);

        let state = fingers_up(&hand).unwrap();
        assert_eq!(state.flags(), [1, 1, 0, 0, 0]);
    }

    #[test]
    fn fingers_up_requires_full_skeleton() {
        assert_eq!(
            fingers_up(&HandLandmarkSet::default()),
            Err(HandError::IncompleteHand { found: 0 })
        );
        let partial = HandLandmarkSet::from_points(vec![(0, 0); 17]);
        assert_eq!(
            fingers_up(&partial),
            Err(HandError::IncompleteHand { found: 17 })
        );
    }

    #[test]
    fn distance_is_symmetric() {
        let hand = HandLandmarkSet::from_points([(0, 0), (3, 4), (-7, 2)]);
        let ab = point_distance(&hand, 1, 2).unwrap();
        let ba = point_distance(&hand, 2, 1).unwrap();
        assert_relative_eq!(ab.length, ba.length);
        assert_relative_eq!(point_distance(&hand, 0, 1).unwrap().length, 5.0);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let hand = HandLandmarkSet::from_points([(12, 34)]);
        let m = point_distance(&hand, 0, 0).unwrap();
        assert_eq!(m.length, 0.0);
        assert_eq!(m.center, (12, 34));
    }

    #[test]
    fn distance_midpoint_floors() {
        let hand = HandLandmarkSet::from_points([(1, -1), (4, -4)]);
        let m = point_distance(&hand, 0, 1).unwrap();
        assert_eq!(m.to_array(), [1, -1, 4, -4, 2, -3]);
    }

    #[test]
    fn distance_across_full_range() {
        let hand = HandLandmarkSet::from_points([(i32::MIN, i32::MIN), (i32::MAX, i32::MAX)]);
        let m = point_distance(&hand, 0, 1).unwrap();
        let span = f64::from(i32::MAX) - f64::from(i32::MIN);
        assert_relative_eq!(m.length, span * 2f64.sqrt(), max_relative = 1e-12);
        assert_eq!(m.center, (-1, -1));
    }

    #[test]
    fn distance_rejects_missing_landmarks() {
        let hand = HandLandmarkSet::from_points([(0, 0)]);
        assert_eq!(
            point_distance(&hand, 0, 4),
            Err(HandError::LandmarkOutOfRange { index: 4, len: 1 })
        );
    }
}
