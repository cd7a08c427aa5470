//! Gradient Hough transform for circles.
//!
//! Edge pixels vote along their gradient direction for every candidate
//! radius; accumulator peaks become circle centers, and each center's radius
//! is the distance most edge pixels agree on.

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use ndarray::Array2;

/// Sensitivity of the circle search, all distances in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Inverse accumulator resolution, 1 votes at full image resolution
    pub dp: f32,
    /// Minimum distance between accepted centers
    pub min_dist: f32,
    /// Upper Canny threshold, the lower one is half of it
    pub param1: f32,
    /// Votes a center needs
    pub param2: f32,
    pub min_radius: u32,
    pub max_radius: u32,
}

/// A circle found in the searched image, in that image's coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedCircle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub votes: u32,
}

/// Finds circles in `gray`, strongest first
pub fn detect_circles(gray: &GrayImage, params: &HoughParams) -> Vec<DetectedCircle> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 || params.max_radius == 0 || params.max_radius < params.min_radius {
        return Vec::new();
    }
    let min_radius = params.min_radius.max(1);
    let max_radius = params.max_radius.max(min_radius);

    let edges = canny(gray, params.param1 / 2.0, params.param1);
    let edge_points: Vec<(u32, u32)> = edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();
    if edge_points.is_empty() {
        return Vec::new();
    }

    let dp = params.dp.max(1.0);
    let accumulator = vote(gray, &edge_points, dp, min_radius, max_radius);

    let mut peaks: Vec<(usize, usize, u32)> = accumulator
        .indexed_iter()
        .filter(|&((ay, ax), &votes)| votes > 0 && votes as f32 >= params.param2 && is_local_maximum(&accumulator, ay, ax))
        .map(|((ay, ax), &votes)| (ax, ay, votes))
        .collect();
    peaks.sort_by(|a, b| b.2.cmp(&a.2).then((a.1, a.0).cmp(&(b.1, b.0))));

    let mut circles: Vec<DetectedCircle> = Vec::new();
    for (ax, ay, votes) in peaks {
        let x = (ax as f32 + 0.5) * dp;
        let y = (ay as f32 + 0.5) * dp;
        if circles.iter().any(|c| (c.x - x).hypot(c.y - y) < params.min_dist) {
            continue;
        }
        if let Some(r) = estimate_radius(&edge_points, x, y, min_radius, max_radius) {
            circles.push(DetectedCircle { x, y, r, votes });
        }
    }
    circles
}

fn vote(gray: &GrayImage, edge_points: &[(u32, u32)], dp: f32, min_radius: u32, max_radius: u32) -> Array2<u32> {
    let (width, height) = gray.dimensions();
    let acc_w = ((width as f32 / dp).ceil() as usize).max(1);
    let acc_h = ((height as f32 / dp).ceil() as usize).max(1);
    let mut accumulator = Array2::<u32>::zeros((acc_h, acc_w));

    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    for &(x, y) in edge_points {
        let dx = f32::from(gx.get_pixel(x, y)[0]);
        let dy = f32::from(gy.get_pixel(x, y)[0]);
        let magnitude = dx.hypot(dy);
        if magnitude < f32::EPSILON {
            continue;
        }
        let (ux, uy) = (dx / magnitude, dy / magnitude);

        // The center may lie on either side of the edge.
        for sign in [1.0f32, -1.0] {
            let mut last_cell = None;
            for r in min_radius..=max_radius {
                let cx = x as f32 + sign * r as f32 * ux;
                let cy = y as f32 + sign * r as f32 * uy;
                if cx < 0.0 || cy < 0.0 {
                    break;
                }
                let (ax, ay) = ((cx / dp) as usize, (cy / dp) as usize);
                if ax >= acc_w || ay >= acc_h {
                    break;
                }
                if last_cell == Some((ax, ay)) {
                    continue;
                }
                last_cell = Some((ax, ay));
                accumulator[[ay, ax]] += 1;
            }
        }
    }
    accumulator
}

fn is_local_maximum(accumulator: &Array2<u32>, ay: usize, ax: usize) -> bool {
    let (rows, cols) = accumulator.dim();
    let votes = accumulator[[ay, ax]];
    for ny in ay.saturating_sub(1)..=(ay + 1).min(rows - 1) {
        for nx in ax.saturating_sub(1)..=(ax + 1).min(cols - 1) {
            if (ny, nx) != (ay, ax) && accumulator[[ny, nx]] > votes {
                return false;
            }
        }
    }
    true
}

/// Radius supported by the most edge pixels around `(x, y)`
fn estimate_radius(edge_points: &[(u32, u32)], x: f32, y: f32, min_radius: u32, max_radius: u32) -> Option<f32> {
    let bins = (max_radius - min_radius + 1) as usize;
    let mut histogram = vec![0u32; bins];
    for &(px, py) in edge_points {
        let d = (px as f32 - x).hypot(py as f32 - y).round();
        if d >= min_radius as f32 && d <= max_radius as f32 {
            histogram[d as usize - min_radius as usize] += 1;
        }
    }

    // Neighbouring bins share the support of a rasterized ring.
    let support = |i: usize| {
        let lo = i.saturating_sub(1);
        let hi = (i + 1).min(bins - 1);
        histogram[lo..=hi].iter().sum::<u32>()
    };
    let (best, best_support) = (0..bins)
        .map(|i| (i, support(i)))
        .fold((0, 0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    if best_support == 0 {
        return None;
    }

    let best_radius = (best as u32 + min_radius) as f32;
    let (sum, n) = edge_points
        .iter()
        .map(|&(px, py)| (px as f32 - x).hypot(py as f32 - y))
        .filter(|d| (d - best_radius).abs() <= 1.5)
        .fold((0.0f32, 0u32), |(sum, n), d| (sum + d, n + 1));
    Some(if n > 0 { sum / n as f32 } else { best_radius })
}
