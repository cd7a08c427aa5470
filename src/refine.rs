use crate::config::RefineParams;
use crate::geometry::{BoundingBox, HeadCircle};
use crate::hough::{DetectedCircle, HoughParams, detect_circles};
use image::{GrayImage, RgbImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use log::debug;

const MIN_CROP_HEIGHT: u32 = 4;
const DENOISE_SIGMA: f32 = 1.0;

/// Region of the frame searched for a head, in frame pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Corrects geometric head estimates by searching the top of each body box
/// for a circular edge.
#[derive(Debug, Clone, Copy)]
pub struct HeadRefiner {
    params: RefineParams,
}

impl HeadRefiner {
    pub fn new(params: RefineParams) -> Self {
        Self { params }
    }

    /// The top `top_scale` of the box (at least 4 px tall), clipped to the frame.
    /// `None` when nothing of the box remains inside the frame.
    pub fn search_region(&self, bbox: &BoundingBox, frame_width: u32, frame_height: u32) -> Option<SearchRegion> {
        if bbox.width() <= 0 || bbox.height() <= 0 {
            return None;
        }
        let top_height = ((bbox.height() as f32 * self.params.top_scale) as i64).max(i64::from(MIN_CROP_HEIGHT));

        let x0 = i64::from(bbox.x1).max(0);
        let x1 = i64::from(bbox.x2).min(i64::from(frame_width));
        let y0 = i64::from(bbox.y1).max(0);
        let y1 = (i64::from(bbox.y1) + top_height).min(i64::from(frame_height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(SearchRegion {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    /// Searches the box's top region for a head. The returned circle is in
    /// frame coordinates and not yet fitted to the head radius range.
    pub fn refine(&self, frame: &RgbImage, bbox: &BoundingBox) -> Option<HeadCircle> {
        let region = self.search_region(bbox, frame.width(), frame.height())?;
        let crop = imageops::crop_imm(frame, region.x, region.y, region.width, region.height).to_image();
        let gray: GrayImage = imageops::grayscale(&crop);
        let gray = gaussian_blur_f32(&gray, DENOISE_SIGMA);

        let shorter = region.width.min(region.height) as f32;
        let hough = HoughParams {
            dp: self.params.dp,
            min_dist: self.params.min_dist,
            param1: self.params.param1,
            param2: self.params.param2,
            min_radius: (shorter * self.params.min_radius_scale) as u32,
            max_radius: (shorter * self.params.max_radius_scale) as u32,
        };
        let circles = detect_circles(&gray, &hough);
        if circles.is_empty() {
            debug!("no head circle in {:?} for {:?}", region, bbox);
            return None;
        }

        let chosen = closest_to_midline(&circles, region.x as f32, bbox.center_x())?;
        debug!("{} head circles in {:?}, chose {:?}", circles.len(), region, chosen);
        Some(HeadCircle::new(
            region.x as f32 + chosen.x,
            region.y as f32 + chosen.y,
            chosen.r,
        ))
    }
}

/// The circle whose frame x is nearest the body's vertical midline, so an
/// off-axis shoulder or bag loses to a centered head.
pub fn closest_to_midline(circles: &[DetectedCircle], offset_x: f32, midline_x: f32) -> Option<DetectedCircle> {
    circles.iter().copied().min_by(|a, b| {
        let da = (offset_x + a.x - midline_x).abs();
        let db = (offset_x + b.x - midline_x).abs();
        da.total_cmp(&db)
    })
}
