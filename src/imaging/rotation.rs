use image::{GrayImage, Luma};
use imageproc::geometry::convex_hull;
use imageproc::point::Point;

/// Angle of the minimum-area rectangle enclosing `points`, in degrees.
///
/// Uses the legacy convention where the angle lies in `[-90, 0)`: the
/// rectangle edge closest to horizontal, measured in image coordinates (y
/// down), shifted into that range. Fewer than two distinct points give `-90`
/// (an axis-aligned rectangle).
pub fn min_area_rect_angle(points: &[Point<i32>]) -> f32 {
    let hull = convex_hull(points);
    if hull.len() < 2 {
        return -90.0;
    }

    let mut best_area = f64::MAX;
    let mut best_angle = 0.0f64;

    for (i, a) in hull.iter().enumerate() {
        let b = hull[(i + 1) % hull.len()];
        let dx = f64::from(b.x - a.x);
        let dy = f64::from(b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f64::EPSILON {
            continue;
        }
        let (ux, uy) = (dx / len, dy / len);

        let mut min_u = f64::MAX;
        let mut max_u = f64::MIN;
        let mut min_v = f64::MAX;
        let mut max_v = f64::MIN;
        for p in &hull {
            let (px, py) = (f64::from(p.x), f64::from(p.y));
            let u = px * ux + py * uy;
            let v = -px * uy + py * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }

        let area = (max_u - min_u) * (max_v - min_v);
        if area < best_area {
            best_area = area;
            best_angle = dy.atan2(dx).to_degrees();
        }
    }

    let mut folded = best_angle.rem_euclid(90.0);
    // atan2 noise around multiples of 90 degrees
    if folded < 1e-9 || 90.0 - folded < 1e-9 {
        folded = 0.0;
    }
    (folded - 90.0) as f32
}

/// Rotates `image` clockwise (as displayed) by `degrees` about its centre.
///
/// Samples with bicubic interpolation. Source coordinates falling outside the
/// image repeat the nearest edge pixel, so no artificial border is introduced.
pub fn rotate_about_center(image: &GrayImage, degrees: f32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || degrees == 0.0 {
        return image.clone();
    }

    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;
    let (sin, cos) = degrees.to_radians().sin_cos();

    GrayImage::from_fn(width, height, |x, y| {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let sx = cos * dx + sin * dy + cx;
        let sy = -sin * dx + cos * dy + cy;
        Luma([sample_bicubic(image, sx, sy)])
    })
}

fn sample_bicubic(image: &GrayImage, sx: f32, sy: f32) -> u8 {
    let (width, height) = image.dimensions();
    let x0 = sx.floor();
    let y0 = sy.floor();
    let fx = sx - x0;
    let fy = sy - y0;
    let wx = cubic_weights(fx);
    let wy = cubic_weights(fy);

    let mut acc = 0.0f32;
    for (j, wyj) in wy.iter().enumerate() {
        let py = clamp_index(y0 as i64 + j as i64 - 1, height);
        for (i, wxi) in wx.iter().enumerate() {
            let px = clamp_index(x0 as i64 + i as i64 - 1, width);
            acc += wxi * wyj * f32::from(image.get_pixel(px, py)[0]);
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}

fn clamp_index(value: i64, len: u32) -> u32 {
    value.clamp(0, i64::from(len) - 1) as u32
}

/// Keys cubic convolution weights (a = -0.75) for offsets -1, 0, 1, 2.
fn cubic_weights(t: f32) -> [f32; 4] {
    const A: f32 = -0.75;
    let w0 = ((A * (t + 1.0) - 5.0 * A) * (t + 1.0) + 8.0 * A) * (t + 1.0) - 4.0 * A;
    let w1 = ((A + 2.0) * t - (A + 3.0)) * t * t + 1.0;
    let w2 = ((A + 2.0) * (1.0 - t) - (A + 3.0)) * (1.0 - t) * (1.0 - t) + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}
