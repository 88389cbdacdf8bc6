//! Annotations drawn onto camera frames.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut,
};
use nalgebra::Vector2;
use rusttype::{Font, Scale};

use crate::config::OverlayStyle;
use crate::geometry::DistanceMeasurement;
use crate::hand::{BoundingBox, HandLandmarkSet, HAND_CONNECTIONS};

/// Loads a TrueType font for [`draw_fps`].
pub fn load_font(path: impl AsRef<Path>) -> Result<Font<'static>> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
    Font::try_from_vec(bytes).ok_or_else(|| anyhow!("{} is not a usable font", path.display()))
}

/// Draws the bones of the hand skeleton and a dot on every joint.
pub fn draw_hand_skeleton(image: &mut RgbImage, hand: &HandLandmarkSet, style: &OverlayStyle) {
    for (a, b) in HAND_CONNECTIONS {
        let (Ok(a), Ok(b)) = (hand.landmark(*a), hand.landmark(*b)) else {
            continue;
        };
        draw_line_segment_mut(
            image,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            style.connection_color,
        );
    }
    for (x, y) in hand.points() {
        draw_filled_circle_mut(image, (x, y), style.joint_radius, style.joint_color);
    }
}

/// Draws a filled circle on every landmark.
pub fn draw_landmark_points(image: &mut RgbImage, hand: &HandLandmarkSet, style: &OverlayStyle) {
    for (x, y) in hand.points() {
        draw_filled_circle_mut(image, (x, y), style.landmark_radius, style.landmark_color);
    }
}

/// Draws `bbox` grown by the style's padding.
pub fn draw_bounding_box(image: &mut RgbImage, bbox: &BoundingBox, style: &OverlayStyle) {
    for i in 0..style.bbox_thickness.max(1) {
        let rect = bbox.padded(style.bbox_padding + i as i32).to_rect();
        draw_hollow_rect_mut(image, rect, style.bbox_color);
    }
}

/// Draws the measured segment with its endpoints and midpoint.
pub fn draw_distance(image: &mut RgbImage, measurement: &DistanceMeasurement, style: &OverlayStyle) {
    draw_thick_line(
        image,
        measurement.start,
        measurement.end,
        style.distance_thickness,
        style.distance_color,
    );
    for point in [measurement.start, measurement.end] {
        draw_filled_circle_mut(image, point, style.distance_radius, style.distance_color);
    }
    draw_filled_circle_mut(
        image,
        measurement.center,
        style.distance_radius,
        style.midpoint_color,
    );
}

/// Writes the frame rate in the top left corner.
pub fn draw_fps(image: &mut RgbImage, fps: f32, font: &Font<'_>, style: &OverlayStyle) {
    let text = format!("{}", fps as i32);
    let y = 70 - style.text_scale as i32;
    draw_text_mut(
        image,
        style.text_color,
        10,
        y,
        Scale::uniform(style.text_scale),
        font,
        &text,
    );
}

/// Draws `thickness` parallel one pixel lines centred on the segment.
fn draw_thick_line(
    image: &mut RgbImage,
    start: (i32, i32),
    end: (i32, i32),
    thickness: u32,
    color: Rgb<u8>,
) {
    let direction = Vector2::new(
        end.0 as f32 - start.0 as f32,
        end.1 as f32 - start.1 as f32,
    );
    let normal = if direction.norm() > 0.0 {
        Vector2::new(-direction.y, direction.x).normalize()
    } else {
        Vector2::zeros()
    };

    let half = (thickness.max(1) as f32 - 1.0) / 2.0;
    for i in 0..thickness.max(1) {
        let offset = normal * (i as f32 - half);
        draw_line_segment_mut(
            image,
            (start.0 as f32 + offset.x, start.1 as f32 + offset.y),
            (end.0 as f32 + offset.x, end.1 as f32 + offset.y),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point_distance;

    fn blank(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    #[test]
    fn landmark_points_are_filled_circles() {
        let style = OverlayStyle::default();
        let mut image = blank(64, 64);
        let hand = HandLandmarkSet::from_points([(20, 20), (40, 30)]);

        draw_landmark_points(&mut image, &hand, &style);

        assert_eq!(*image.get_pixel(20, 20), style.landmark_color);
        assert_eq!(*image.get_pixel(43, 30), style.landmark_color);
        assert_eq!(*image.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn bounding_box_is_padded() {
        let style = OverlayStyle::default();
        let mut image = blank(100, 100);
        let bbox = BoundingBox::new(30, 30, 60, 60);

        draw_bounding_box(&mut image, &bbox, &style);

        assert_eq!(*image.get_pixel(10, 45), style.bbox_color);
        assert_eq!(*image.get_pixel(9, 45), style.bbox_color);
        assert_eq!(*image.get_pixel(30, 30), Rgb([0, 0, 0]));
    }

    #[test]
    fn distance_marks_endpoints_and_midpoint() {
        let style = OverlayStyle::default();
        let mut image = blank(200, 100);
        let hand = HandLandmarkSet::from_points([(20, 50), (180, 50)]);
        let measurement = point_distance(&hand, 0, 1).unwrap();

        draw_distance(&mut image, &measurement, &style);

        assert_eq!(*image.get_pixel(20, 50), style.distance_color);
        assert_eq!(*image.get_pixel(180, 50), style.distance_color);
        assert_eq!(*image.get_pixel(100, 50), style.midpoint_color);
        // the line between the circles
        assert_eq!(*image.get_pixel(60, 50), style.distance_color);
        assert_eq!(*image.get_pixel(60, 51), style.distance_color);
        assert_eq!(*image.get_pixel(60, 49), style.distance_color);
    }

    #[test]
    fn skeleton_skips_missing_landmarks() {
        let style = OverlayStyle::default();
        let mut image = blank(32, 32);
        let hand = HandLandmarkSet::from_points([(5, 5), (25, 5)]);

        draw_hand_skeleton(&mut image, &hand, &style);

        assert_eq!(*image.get_pixel(15, 5), style.connection_color);
        assert_eq!(*image.get_pixel(5, 5), style.joint_color);
    }
}
