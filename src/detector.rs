use crate::error::DetectorError;
use crate::geometry::BoundingBox;
use image::RgbImage;
use std::time::Duration;

/// Person boxes found in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    /// Person-class boxes in frame pixels
    pub boxes: Vec<BoundingBox>,
    /// Inference time as measured by the detector, if it measures it
    pub latency: Option<Duration>,
}

impl Detections {
    pub fn new(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes, latency: None }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

/// A person detector the analyzer calls once per frame.
///
/// `imgsz` is the resolution hint from the previous frame's controller step.
/// Implementations return boxes in the coordinates of `frame`.
pub trait PersonDetector {
    fn detect(&mut self, frame: &RgbImage, imgsz: u32) -> Result<Detections, DetectorError>;
}

impl<D: PersonDetector + ?Sized> PersonDetector for &mut D {
    fn detect(&mut self, frame: &RgbImage, imgsz: u32) -> Result<Detections, DetectorError> {
        (**self).detect(frame, imgsz)
    }
}

impl<D: PersonDetector + ?Sized> PersonDetector for Box<D> {
    fn detect(&mut self, frame: &RgbImage, imgsz: u32) -> Result<Detections, DetectorError> {
        (**self).detect(frame, imgsz)
    }
}

/// Factor that maps a frame onto an `imgsz` long side, never upscaling
pub fn letterbox_scale(width: u32, height: u32, imgsz: u32) -> f32 {
    let long_side = width.max(height);
    if long_side == 0 || imgsz == 0 {
        return 1.0;
    }
    (imgsz as f32 / long_side as f32).min(1.0)
}

/// Maps a box found on a resized frame back to the original frame
pub fn rescale_box(xyxy: [f32; 4], scale: f32) -> BoundingBox {
    if scale <= 0.0 || !scale.is_finite() {
        return BoundingBox::from_xyxy(xyxy[0], xyxy[1], xyxy[2], xyxy[3]);
    }
    BoundingBox::from_xyxy(xyxy[0] / scale, xyxy[1] / scale, xyxy[2] / scale, xyxy[3] / scale)
}
