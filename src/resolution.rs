use crate::config::ResolutionParams;
use log::info;
use std::time::Duration;

/// Every resolution change moves by exactly this many pixels
pub const IMGSZ_STEP: u32 = 64;

/// Below this share of the target frame rate the resolution drops
const SLOW_RATIO: f32 = 0.9;
/// Above this share of the target frame rate the resolution rises
const FAST_RATIO: f32 = 1.2;

/// Tracks a target frame rate by stepping the detector's input resolution.
///
/// The gap between the slow and fast thresholds is a dead zone, so noisy
/// latencies near the target do not flip between adjacent steps.
#[derive(Debug, Clone)]
pub struct AdaptiveResolutionController {
    imgsz: u32,
    min_imgsz: u32,
    max_imgsz: u32,
    target_fps: f32,
    adaptive: bool,
}

impl AdaptiveResolutionController {
    pub fn new(params: &ResolutionParams) -> Self {
        Self {
            imgsz: params.imgsz.clamp(params.min_imgsz, params.max_imgsz),
            min_imgsz: params.min_imgsz,
            max_imgsz: params.max_imgsz,
            target_fps: params.target_fps,
            adaptive: params.adaptive,
        }
    }

    /// Resolution hint for the next detector call
    pub fn imgsz(&self) -> u32 {
        self.imgsz
    }

    /// Feeds one inference latency and returns the resolution for the next frame
    pub fn observe(&mut self, latency: Duration) -> u32 {
        self.observe_latency_ms(latency.as_secs_f64() * 1000.0)
    }

    pub fn observe_latency_ms(&mut self, latency_ms: f64) -> u32 {
        if !self.adaptive || latency_ms.is_nan() || latency_ms < 0.0 {
            return self.imgsz;
        }
        let current_fps = 1000.0 / latency_ms;
        let target = f64::from(self.target_fps);
        let previous = self.imgsz;

        if current_fps < target * f64::from(SLOW_RATIO) && self.imgsz > self.min_imgsz {
            self.imgsz = self.imgsz.saturating_sub(IMGSZ_STEP).max(self.min_imgsz);
        } else if current_fps > target * f64::from(FAST_RATIO) && self.imgsz < self.max_imgsz {
            self.imgsz = (self.imgsz + IMGSZ_STEP).min(self.max_imgsz);
        }

        if self.imgsz != previous {
            info!(
                "inference at {:.1} fps (target {:.1}), imgsz {} -> {}",
                current_fps, target, previous, self.imgsz
            );
        }
        self.imgsz
    }
}
