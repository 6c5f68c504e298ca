use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};

use crate::core::geometry::PixelRect;

/// Binary dilation with a `kernel_width` x `kernel_height` rectangle.
///
/// The kernel anchor sits at `(kernel_width / 2, kernel_height / 2)`, so even
/// sized kernels grow the mask one pixel further right/down than left/up. Any non-zero
/// input pixel counts as foreground. The rectangle is separable, so each
/// iteration is a horizontal pass followed by a vertical one.
pub fn dilate_rect(
    image: &GrayImage,
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut mask: Vec<bool> = image.pixels().map(|p| p[0] > 0).collect();
    let w = width as usize;
    let h = height as usize;

    for _ in 0..iterations {
        mask = dilate_rows(&mask, w, h, kernel_width as usize);
        mask = dilate_columns(&mask, w, h, kernel_height as usize);
    }

    GrayImage::from_fn(width, height, |x, y| {
        if mask[y as usize * w + x as usize] {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Window `[i - anchor, i + (kernel - 1 - anchor)]` clipped to `[0, len)`.
fn window(i: usize, len: usize, kernel: usize) -> (usize, usize) {
    let anchor = kernel / 2;
    let start = i.saturating_sub(anchor);
    let end = (i + (kernel - 1 - anchor)).min(len - 1);
    (start, end)
}

fn dilate_rows(mask: &[bool], width: usize, height: usize, kernel: usize) -> Vec<bool> {
    if kernel <= 1 || width == 0 {
        return mask.to_vec();
    }
    let mut out = vec![false; mask.len()];
    let mut prefix = vec![0usize; width + 1];
    for y in 0..height {
        let row = &mask[y * width..(y + 1) * width];
        for (x, &set) in row.iter().enumerate() {
            prefix[x + 1] = prefix[x] + usize::from(set);
        }
        for x in 0..width {
            let (start, end) = window(x, width, kernel);
            out[y * width + x] = prefix[end + 1] > prefix[start];
        }
    }
    out
}

fn dilate_columns(mask: &[bool], width: usize, height: usize, kernel: usize) -> Vec<bool> {
    if kernel <= 1 || height == 0 {
        return mask.to_vec();
    }
    let mut out = vec![false; mask.len()];
    let mut prefix = vec![0usize; height + 1];
    for x in 0..width {
        for y in 0..height {
            prefix[y + 1] = prefix[y] + usize::from(mask[y * width + x]);
        }
        for y in 0..height {
            let (start, end) = window(y, height, kernel);
            out[y * width + x] = prefix[end + 1] > prefix[start];
        }
    }
    out
}

/// Bounding rectangles of the outermost foreground contours.
///
/// Contours nested inside a hole of another component are skipped. The mask
/// is traced inside a one-pixel background frame, so components touching the
/// image border are still reported as outer contours.
pub fn external_bounding_rects(mask: &GrayImage) -> Vec<PixelRect> {
    find_contours::<u32>(&with_background_frame(mask))
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| {
            let mut points = contour.points.iter();
            let first = points.next()?;
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
            for p in points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            // undo the frame offset; foreground never lies on the frame
            Some(PixelRect::from_extents(
                min_x.saturating_sub(1),
                min_y.saturating_sub(1),
                max_x.saturating_sub(1),
                max_y.saturating_sub(1),
            ))
        })
        .collect()
}

fn with_background_frame(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut framed = GrayImage::new(width + 2, height + 2);
    image::imageops::replace(&mut framed, mask, 1, 1);
    framed
}
