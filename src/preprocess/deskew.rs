use image::GrayImage;
use imageproc::point::Point;
use tracing::debug;

use crate::imaging::{foreground_count, min_area_rect_angle, rotate_about_center};

/// Rotation in degrees, within `(-45, 45]`, that levels the foreground of an
/// inverted bitmap (ink = non-zero). `None` for a page without foreground.
pub fn skew_angle(inverted: &GrayImage) -> Option<f32> {
    let points = foreground_outline(inverted);
    if points.is_empty() {
        return None;
    }
    Some(normalize_rect_angle(min_area_rect_angle(&points)))
}

/// Folds a `[-90, 0)` rectangle angle into the rotation that undoes it.
pub fn normalize_rect_angle(angle: f32) -> f32 {
    let rotation = if angle < -45.0 {
        -(90.0 + angle)
    } else {
        -angle
    };
    // avoid emitting -0.0
    rotation + 0.0
}

/// Rotates an inverted bitmap so its foreground sits level.
///
/// Blank pages come back unchanged.
pub fn deskew(inverted: &GrayImage) -> GrayImage {
    match skew_angle(inverted) {
        Some(angle) if angle != 0.0 => {
            debug!(angle, ink = foreground_count(inverted), "deskewing page");
            rotate_about_center(inverted, angle)
        }
        _ => inverted.clone(),
    }
}

/// Leftmost and rightmost foreground pixel of every row.
///
/// These span the same convex hull as the full foreground set.
fn foreground_outline(image: &GrayImage) -> Vec<Point<i32>> {
    let mut points = Vec::new();
    for (y, row) in image.rows().enumerate() {
        let mut first = None;
        let mut last = None;
        for (x, pixel) in row.enumerate() {
            if pixel[0] > 0 {
                first.get_or_insert(x);
                last = Some(x);
            }
        }
        if let (Some(first), Some(last)) = (first, last) {
            points.push(Point::new(first as i32, y as i32));
            if last != first {
                points.push(Point::new(last as i32, y as i32));
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_polygon_mut;

    fn tilted_page(angle_deg: f32) -> GrayImage {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let (cx, cy) = (250.0f32, 250.0f32);
        let corners: Vec<Point<i32>> = [(-180.0f32, -25.0f32), (180.0, -25.0), (180.0, 25.0), (-180.0, 25.0)]
            .iter()
            .map(|&(x, y)| {
                Point::new(
                    (cx + x * cos - y * sin).round() as i32,
                    (cy + x * sin + y * cos).round() as i32,
                )
            })
            .collect();
        let mut img = GrayImage::new(500, 500);
        draw_polygon_mut(&mut img, &corners, Luma([255]));
        img
    }

    #[test]
    fn blank_page_has_no_angle() {
        let blank = GrayImage::new(32, 32);
        assert_eq!(skew_angle(&blank), None);
        assert_eq!(deskew(&blank), blank);
    }

    #[test]
    fn level_text_needs_no_rotation() {
        assert_eq!(skew_angle(&tilted_page(0.0)), Some(0.0));
    }

    #[test]
    fn clockwise_tilt_is_undone_counter_clockwise() {
        let angle = skew_angle(&tilted_page(6.0)).unwrap();
        assert!((angle + 6.0).abs() < 1.0, "angle was {angle}");
    }

    #[test]
    fn counter_clockwise_tilt_is_undone_clockwise() {
        let angle = skew_angle(&tilted_page(-8.0)).unwrap();
        assert!((angle - 8.0).abs() < 1.0, "angle was {angle}");
    }

    #[test]
    fn normalized_angle_stays_within_half_quadrant() {
        for raw in [-90.0f32, -89.5, -60.0, -45.5, -45.0, -44.9, -10.0, -0.1] {
            let rotation = normalize_rect_angle(raw);
            assert!(rotation > -45.0 && rotation <= 45.0, "{raw} -> {rotation}");
        }
    }

    #[test]
    fn deskew_levels_a_tilted_bar() {
        let straightened = deskew(&tilted_page(5.0));
        let residual = skew_angle(&straightened).unwrap();
        assert!(residual.abs() < 1.5, "residual was {residual}");
    }

    #[test]
    fn outline_keeps_row_extremes_only() {
        let mut img = GrayImage::new(10, 3);
        for x in 2..8 {
            img.put_pixel(x, 1, Luma([255]));
        }
        assert_eq!(
            foreground_outline(&img),
            vec![Point::new(2, 1), Point::new(7, 1)]
        );
    }
}
