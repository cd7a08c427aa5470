use std::f64::consts::PI;

/// A person bounding box in integer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Builds a box from floating point corners, truncating toward zero
    /// the way detector outputs are usually cast to pixels.
    pub fn from_xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1 as i32, y1 as i32, x2 as i32, y2 as i32)
    }

    /// Widened to `i64` so boxes spanning the whole `i32` range do not overflow
    pub fn width(&self) -> i64 {
        i64::from(self.x2) - i64::from(self.x1)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.y2) - i64::from(self.y1)
    }

    /// Pixel area, zero for inverted or degenerate boxes
    pub fn area(&self) -> i64 {
        self.width().max(0).saturating_mul(self.height().max(0))
    }

    pub fn center_x(&self) -> f32 {
        ((f64::from(self.x1) + f64::from(self.x2)) / 2.0) as f32
    }
}

/// Estimated head position: center and radius in frame pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadCircle {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
}

impl HeadCircle {
    pub fn new(cx: f32, cy: f32, r: f32) -> Self {
        Self { cx, cy, r }
    }

    pub fn area(&self) -> f32 {
        (PI * f64::from(self.r) * f64::from(self.r)) as f32
    }

    /// Euclidean distance between the two centers
    pub fn distance_to(&self, other: &HeadCircle) -> f32 {
        (self.cx - other.cx).hypot(self.cy - other.cy)
    }

    pub fn iou(&self, other: &HeadCircle) -> f32 {
        circle_iou(self, other)
    }

    /// Whether the center lies inside `[0, width) x [0, height)`
    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.cx >= 0.0 && self.cy >= 0.0 && self.cx < width as f32 && self.cy < height as f32
    }
}

/// Area shared by two circles.
///
/// Disjoint circles share nothing, a circle nested in the other shares its whole
/// area, and partially overlapping circles share the lens bounded by the two
/// arcs. The lens is computed from the half angle subtended at each center.
pub fn circle_overlap_area(a: &HeadCircle, b: &HeadCircle) -> f32 {
    let r1 = f64::from(a.r.max(0.0));
    let r2 = f64::from(b.r.max(0.0));
    let d = f64::from(a.distance_to(b));

    if d >= r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        let smaller = r1.min(r2);
        return (PI * smaller * smaller) as f32;
    }

    let r1_sq = r1 * r1;
    let r2_sq = r2 * r2;
    let d_sq = d * d;
    let alpha = ((d_sq + r1_sq - r2_sq) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let beta = ((d_sq + r2_sq - r1_sq) / (2.0 * d * r2)).clamp(-1.0, 1.0).acos();

    let lens = r1_sq * (alpha - (2.0 * alpha).sin() / 2.0) + r2_sq * (beta - (2.0 * beta).sin() / 2.0);
    lens.max(0.0) as f32
}

/// Intersection over union of two circles, 0 when the union is empty
pub fn circle_iou(a: &HeadCircle, b: &HeadCircle) -> f32 {
    let overlap = f64::from(circle_overlap_area(a, b));
    let r1 = f64::from(a.r);
    let r2 = f64::from(b.r);
    let union = PI * r1 * r1 + PI * r2 * r2 - overlap;
    if union <= 0.0 {
        return 0.0;
    }
    (overlap / union) as f32
}
