use crate::geometry::BoundingBox;

/// Keeps the boxes whose pixel area reaches `min_bbox_area`.
///
/// Order is preserved. Boxes with no positive area are always dropped,
/// even when the floor is zero.
pub fn retain_boxes_above_area(boxes: &[BoundingBox], min_bbox_area: u32) -> Vec<BoundingBox> {
    boxes
        .iter()
        .filter(|bbox| is_large_enough(bbox, min_bbox_area))
        .copied()
        .collect()
}

pub fn is_large_enough(bbox: &BoundingBox, min_bbox_area: u32) -> bool {
    let area = bbox.area();
    area > 0 && area >= i64::from(min_bbox_area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_boxes_are_discarded() {
        let boxes = [
            BoundingBox::new(0, 0, 10, 10),   // 100
            BoundingBox::new(0, 0, 20, 20),   // 400
            BoundingBox::new(5, 5, 40, 80),   // 2625
            BoundingBox::new(0, 0, 19, 21),   // 399
        ];
        let kept = retain_boxes_above_area(&boxes, 400);
        assert_eq!(kept, vec![boxes[1], boxes[2]]);
    }

    #[test]
    fn test_degenerate_boxes_dropped_with_zero_floor() {
        let boxes = [
            BoundingBox::new(10, 10, 10, 50),
            BoundingBox::new(30, 10, 20, 50),
            BoundingBox::new(0, 0, 1, 1),
        ];
        assert_eq!(retain_boxes_above_area(&boxes, 0), vec![boxes[2]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(retain_boxes_above_area(&[], 400).is_empty());
    }
}
