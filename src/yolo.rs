use crate::cli::Args;
use crate::config::ResolutionParams;
use crate::detector::{Detections, PersonDetector, letterbox_scale, rescale_box};
use crate::error::DetectorError;
use anyhow::Result;
use image::{RgbImage, imageops};
use std::time::Instant;
use usls::{Config, Image, NAMES_COCO_80, Task, models::YOLO};

const PERSON: &str = "person";
const PERSON_CLASS_ID: usize = 0;

/// Builds a YOLO person detection configuration from command line arguments.
///
/// The height and width axes are declared dynamic over the resolution
/// controller's range, with the initial `imgsz` as the optimal shape.
pub fn build_detector_config(args: &Args, resolution: &ResolutionParams) -> Result<Config> {
    let (min, opt, max) = resolution.input_range();
    let axis = (min as usize, opt as usize, max as usize);
    let config = Config::yolo()
        .with_model_file(args.model.as_ref().map_or("", String::as_str))
        .with_task(Task::ObjectDetection)
        .with_version(args.ver.try_into()?)
        .with_scale(args.scale.parse()?)
        .with_model_dtype(args.dtype.parse()?)
        .with_model_device(args.device.parse()?)
        .with_model_ixx(0, 0, (1, 1, 1).into())
        .with_model_ixx(0, 2, axis.into())
        .with_model_ixx(0, 3, axis.into())
        .with_class_confs(&[args.confidence])
        .with_class_names(&NAMES_COCO_80)
        .retain_classes(&[PERSON_CLASS_ID])
        .with_model_num_dry_run(2);
    Ok(config)
}

/// Person detector backed by a usls YOLO model.
///
/// The `imgsz` hint shrinks the frame before it reaches the model, which cuts
/// decode and letterbox cost. The usls preprocessor still letterboxes to the
/// shape the session was committed with, so the network's own input size does
/// not follow the hint. Treat it as advisory for this backend.
pub struct UslsPersonDetector {
    model: YOLO,
    confidence: f32,
}

impl UslsPersonDetector {
    pub fn new(model: YOLO, confidence: f32) -> Self {
        Self { model, confidence }
    }

    pub fn from_args(args: &Args, resolution: &ResolutionParams) -> Result<Self> {
        let model = YOLO::new(build_detector_config(args, resolution)?.commit()?)?;
        Ok(Self::new(model, args.confidence))
    }
}

impl PersonDetector for UslsPersonDetector {
    fn detect(&mut self, frame: &RgbImage, imgsz: u32) -> std::result::Result<Detections, DetectorError> {
        // Shrink so the long side matches the requested resolution
        let scale = letterbox_scale(frame.width(), frame.height(), imgsz);
        let input = if scale < 1.0 {
            let width = ((frame.width() as f32 * scale).round() as u32).max(1);
            let height = ((frame.height() as f32 * scale).round() as u32).max(1);
            imageops::resize(frame, width, height, imageops::FilterType::Triangle)
        } else {
            frame.clone()
        };

        let started = Instant::now();
        let ys = self
            .model
            .forward(&[Image::from(input)])
            .map_err(|e| DetectorError::inference(e.to_string()))?;
        let latency = started.elapsed();

        let y = ys
            .first()
            .ok_or_else(|| DetectorError::malformed("model returned no result for the frame"))?;
        let boxes = match y.hbbs() {
            Some(hbbs) => hbbs
                .iter()
                .filter(|hbb| hbb.name() == Some(PERSON))
                .filter(|hbb| hbb.confidence().is_some_and(|c| c >= self.confidence))
                .map(|hbb| rescale_box([hbb.xmin(), hbb.ymin(), hbb.xmax(), hbb.ymax()], scale))
                .collect(),
            None => Vec::new(),
        };

        Ok(Detections {
            boxes,
            latency: Some(latency),
        })
    }
}
