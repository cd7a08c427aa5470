//! Per-stream pipeline: person boxes in, deduplicated heads, smoothed count
//! and alert out.

use crate::alert::AlertEvaluator;
use crate::config::{AnalyzerConfig, CountMode};
use crate::dedup::NmsStrategy;
use crate::detector::{Detections, PersonDetector};
use crate::error::{self, AnalyzerError, ConfigError};
use crate::filter::retain_boxes_above_area;
use crate::geometry::{BoundingBox, HeadCircle};
use crate::head::HeadEstimator;
use crate::history::CountHistory;
use crate::refine::HeadRefiner;
use crate::resolution::AdaptiveResolutionController;
use chrono::{DateTime, Utc};
use image::RgbImage;
use log::{debug, warn};
use std::time::Instant;

/// The frame a set of detections belongs to
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub width: u32,
    pub height: u32,
    /// Pixels, needed only when refinement is enabled
    pub pixels: Option<&'a RgbImage>,
}

impl<'a> FrameView<'a> {
    pub fn from_image(image: &'a RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            pixels: Some(image),
        }
    }

    /// A frame known only by its size
    pub fn dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl<'a> From<&'a RgbImage> for FrameView<'a> {
    fn from(image: &'a RgbImage) -> Self {
        Self::from_image(image)
    }
}

/// Heads found in one frame before any stream state is touched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadPass {
    /// Boxes that survived the area filter
    pub persons: usize,
    /// Circles before suppression
    pub candidates: usize,
    pub heads: Vec<HeadCircle>,
}

/// Outcome of one analyzed frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// 1-based position of the frame in the stream
    pub frame_index: u64,
    pub timestamp: DateTime<Utc>,
    pub person_count: u32,
    pub head_count: u32,
    /// The count selected by the configured count mode
    pub count: u32,
    pub average_count: u32,
    pub alert: bool,
    pub heads: Vec<HeadCircle>,
    /// Resolution the detector was asked for on this frame
    pub imgsz_used: u32,
    /// Resolution to request on the next frame
    pub next_imgsz: u32,
}

/// Carries one video stream's state from frame to frame
#[derive(Debug, Clone)]
pub struct StreamAnalyzer {
    camera_id: String,
    config: AnalyzerConfig,
    estimator: HeadEstimator,
    refiner: Option<HeadRefiner>,
    nms: NmsStrategy,
    controller: AdaptiveResolutionController,
    history: CountHistory,
    alert: AlertEvaluator,
    frame_index: u64,
}

impl StreamAnalyzer {
    /// Builds an analyzer for one stream, rejecting invalid configuration
    pub fn new(camera_id: impl Into<String>, config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let refiner = config.refine.enabled.then(|| HeadRefiner::new(config.refine));
        Ok(Self {
            camera_id: camera_id.into(),
            estimator: HeadEstimator::new(config.head),
            refiner,
            nms: NmsStrategy::from_config(&config),
            controller: AdaptiveResolutionController::new(&config.resolution),
            history: CountHistory::new(config.history_capacity),
            alert: AlertEvaluator::new(config.alert_threshold),
            frame_index: 0,
            config,
        })
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Resolution to pass to the detector for the next frame
    pub fn imgsz(&self) -> u32 {
        self.controller.imgsz()
    }

    pub fn history(&self) -> &CountHistory {
        &self.history
    }

    /// Number of frames ingested so far
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Filters, estimates and deduplicates heads for one frame. Pure with
    /// respect to stream state.
    pub fn estimate_heads(&self, boxes: &[BoundingBox], frame: FrameView<'_>) -> HeadPass {
        if frame.is_empty() {
            return HeadPass::default();
        }
        let kept = retain_boxes_above_area(boxes, self.config.min_bbox_area);
        let candidates: Vec<HeadCircle> = kept
            .iter()
            .map(|bbox| {
                let refined = match (&self.refiner, frame.pixels) {
                    (Some(refiner), Some(pixels)) => refiner.refine(pixels, bbox),
                    _ => None,
                };
                self.estimator.estimate_with(bbox, refined, frame.width, frame.height)
            })
            .collect();
        let heads = self.nms.suppress(&candidates);
        HeadPass {
            persons: kept.len(),
            candidates: candidates.len(),
            heads,
        }
    }

    /// Folds one frame's detections into the stream state.
    ///
    /// The controller is stepped only for non-empty frames that carry a latency.
    pub fn ingest(&mut self, detections: &Detections, frame: FrameView<'_>) -> FrameReport {
        let pass = self.estimate_heads(&detections.boxes, frame);
        let imgsz_used = self.controller.imgsz();

        let person_count = pass.persons as u32;
        let head_count = pass.heads.len() as u32;
        let count = match self.config.count_mode {
            CountMode::Heads => head_count,
            CountMode::Persons => person_count,
        };

        self.frame_index += 1;
        self.history.push(count);
        let average_count = self.history.average();
        let alert = self.alert.evaluate(count);

        let next_imgsz = match detections.latency {
            Some(latency) if !frame.is_empty() => self.controller.observe(latency),
            _ => self.controller.imgsz(),
        };

        debug!(
            "[{}] frame {}: {} boxes, {} persons, {} candidates, {} heads, avg {}, imgsz {} -> {}",
            self.camera_id,
            self.frame_index,
            detections.boxes.len(),
            person_count,
            pass.candidates,
            head_count,
            average_count,
            imgsz_used,
            next_imgsz
        );

        FrameReport {
            frame_index: self.frame_index,
            timestamp: Utc::now(),
            person_count,
            head_count,
            count,
            average_count,
            alert,
            heads: pass.heads,
            imgsz_used,
            next_imgsz,
        }
    }

    /// Runs the detector on `frame` at the current resolution and ingests the result.
    ///
    /// A missing or empty frame yields a zero report without calling the
    /// detector. A detector failure leaves the stream state untouched.
    pub fn process<D: PersonDetector + ?Sized>(
        &mut self,
        detector: &mut D,
        frame: Option<&RgbImage>,
    ) -> error::Result<FrameReport> {
        let frame = match frame {
            Some(image) if image.width() > 0 && image.height() > 0 => image,
            _ => return Ok(self.ingest(&Detections::default(), FrameView::dimensions(0, 0))),
        };

        let started = Instant::now();
        let mut detections = detector.detect(frame, self.controller.imgsz()).map_err(|err| {
            warn!("[{}] detector failed on frame {}: {}", self.camera_id, self.frame_index + 1, err);
            AnalyzerError::DetectionUnavailable(err)
        })?;
        if detections.latency.is_none() {
            detections.latency = Some(started.elapsed());
        }
        Ok(self.ingest(&detections, FrameView::from_image(frame)))
    }
}
