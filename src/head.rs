use crate::config::HeadGeometry;
use crate::geometry::{BoundingBox, HeadCircle};

const TALL_ASPECT: f32 = 2.0;
const SQUAT_ASPECT: f32 = 1.2;

/// Picks the head offset ratio for a body of the given height/width aspect.
///
/// Tall, narrow bodies carry the head closer to the box top; squat boxes
/// (sitting, partially occluded or cut off) push it further down.
pub fn offset_ratio(base_ratio: f32, aspect: f32) -> f32 {
    if aspect >= TALL_ASPECT {
        (base_ratio * 0.9).clamp(0.12, 0.20)
    } else if aspect <= SQUAT_ASPECT {
        (base_ratio * 1.2).clamp(0.16, 0.26)
    } else {
        base_ratio
    }
}

/// Derives head circles from body boxes
#[derive(Debug, Clone, Copy)]
pub struct HeadEstimator {
    geometry: HeadGeometry,
}

impl HeadEstimator {
    pub fn new(geometry: HeadGeometry) -> Self {
        Self { geometry }
    }

    /// Geometric head estimate for one body box inside a `frame_width x frame_height` frame
    pub fn estimate(&self, bbox: &BoundingBox, frame_width: u32, frame_height: u32) -> HeadCircle {
        let body_w = bbox.width() as f32;
        let body_h = bbox.height() as f32;
        let aspect = if body_w > 0.0 { body_h / body_w } else { f32::INFINITY };
        let ratio = offset_ratio(self.geometry.head_top_ratio, aspect);

        let cx = bbox.center_x();
        let cy = bbox.y1 as f32 + body_h * ratio;
        let r = body_w.min(body_h) * self.geometry.head_radius_scale;

        self.fit(HeadCircle::new(cx, cy, r), frame_width, frame_height)
    }

    /// Estimate for one box, preferring `refined` when a refinement found a head
    pub fn estimate_with(
        &self,
        bbox: &BoundingBox,
        refined: Option<HeadCircle>,
        frame_width: u32,
        frame_height: u32,
    ) -> HeadCircle {
        match refined {
            Some(circle) => self.fit(circle, frame_width, frame_height),
            None => self.estimate(bbox, frame_width, frame_height),
        }
    }

    /// Clamps the center into the frame and the radius into the configured head range
    pub fn fit(&self, circle: HeadCircle, frame_width: u32, frame_height: u32) -> HeadCircle {
        let max_x = (frame_width as f32 - 1.0).max(0.0);
        let max_y = (frame_height as f32 - 1.0).max(0.0);
        let r = if circle.r.is_nan() {
            self.geometry.min_head_radius
        } else {
            circle.r
        };
        HeadCircle::new(
            clamp_coordinate(circle.cx, max_x),
            clamp_coordinate(circle.cy, max_y),
            r.clamp(self.geometry.min_head_radius, self.geometry.max_head_radius),
        )
    }
}

fn clamp_coordinate(value: f32, max: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> HeadEstimator {
        HeadEstimator::new(HeadGeometry {
            min_head_radius: 4.0,
            max_head_radius: 80.0,
            head_top_ratio: 0.17,
            head_radius_scale: 0.22,
        })
    }

    #[test]
    fn test_offset_ratio_by_aspect() {
        // tall: 0.17 * 0.9 = 0.153
        assert!((offset_ratio(0.17, 2.5) - 0.153).abs() < 1e-6);
        // squat: 0.17 * 1.2 = 0.204
        assert!((offset_ratio(0.17, 1.0) - 0.204).abs() < 1e-6);
        // in between keeps the base ratio
        assert_eq!(offset_ratio(0.17, 1.6), 0.17);
        // clamps
        assert_eq!(offset_ratio(0.30, 3.0), 0.20);
        assert_eq!(offset_ratio(0.05, 3.0), 0.12);
        assert_eq!(offset_ratio(0.30, 0.8), 0.26);
        assert_eq!(offset_ratio(0.05, 0.8), 0.16);
    }

    #[test]
    fn test_offset_ratio_thresholds_are_inclusive() {
        assert!((offset_ratio(0.17, 2.0) - 0.153).abs() < 1e-6);
        assert!((offset_ratio(0.17, 1.2) - 0.204).abs() < 1e-6);
    }

    #[test]
    fn test_tall_body_estimate() {
        // 60 x 180 body, aspect 3.0
        let bbox = BoundingBox::new(100, 50, 160, 230);
        let head = estimator().estimate(&bbox, 640, 480);
        assert_eq!(head.cx, 130.0);
        assert!((head.cy - (50.0 + 180.0 * 0.153)).abs() < 1e-3);
        assert!((head.r - 60.0 * 0.22).abs() < 1e-4);
    }

    #[test]
    fn test_radius_is_clamped_to_head_range() {
        let tiny = BoundingBox::new(0, 0, 10, 30);
        assert_eq!(estimator().estimate(&tiny, 640, 480).r, 4.0);

        let huge = BoundingBox::new(0, 0, 600, 1000);
        assert_eq!(estimator().estimate(&huge, 2000, 2000).r, 80.0);
    }

    #[test]
    fn test_center_is_clamped_into_frame() {
        // Box hanging off the bottom right corner of a 200 x 100 frame
        let bbox = BoundingBox::new(190, 95, 260, 300);
        let head = estimator().estimate(&bbox, 200, 100);
        assert_eq!(head.cx, 199.0);
        assert_eq!(head.cy, 99.0);
        assert!(head.is_inside(200, 100));

        let negative = BoundingBox::new(-80, -200, -20, -10);
        let head = estimator().estimate(&negative, 200, 100);
        assert_eq!((head.cx, head.cy), (0.0, 0.0));
    }

    #[test]
    fn test_refined_circle_is_fitted() {
        let bbox = BoundingBox::new(0, 0, 100, 200);
        let refined = HeadCircle::new(250.0, 40.0, 300.0);
        let head = estimator().estimate_with(&bbox, Some(refined), 200, 100);
        assert_eq!(head, HeadCircle::new(199.0, 40.0, 80.0));
    }

    #[test]
    fn test_missing_refinement_falls_back_to_geometry() {
        let bbox = BoundingBox::new(100, 50, 160, 230);
        let est = estimator();
        assert_eq!(est.estimate_with(&bbox, None, 640, 480), est.estimate(&bbox, 640, 480));
    }
}
