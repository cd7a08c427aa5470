//! Error types for the head counting pipeline

use std::time::Duration;
use thiserror::Error;

/// Result type alias for stream analysis
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Configuration values rejected when an analyzer is built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("min_head_radius ({min}) must not exceed max_head_radius ({max})")]
    HeadRadiusRange { min: f32, max: f32 },

    #[error("min_imgsz ({min}) must not exceed max_imgsz ({max})")]
    ImgszRange { min: u32, max: u32 },

    #[error("initial imgsz {imgsz} lies outside [{min}, {max}]")]
    ImgszOutOfBounds { imgsz: u32, min: u32, max: u32 },

    #[error("imgsz bounds {min}..={max} and start {imgsz} are not reachable in steps of {step}")]
    ImgszStep { imgsz: u32, min: u32, max: u32, step: u32 },

    #[error("{name} = {value} is out of range (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("unknown {kind} `{value}`")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ConfigError {
    pub fn out_of_range(name: &'static str, value: impl Into<f64>, expected: &'static str) -> Self {
        Self::OutOfRange {
            name,
            value: value.into(),
            expected,
        }
    }
}

/// Failures reported by an external person detector
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("detector timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed detector output: {0}")]
    Malformed(String),
}

impl DetectorError {
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Failures reported by a forecasting engine
#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("not enough history: need {needed} counts, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("forecaster failed: {0}")]
    Engine(String),
}

/// Errors surfaced while analyzing a stream
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// The detector produced no usable result for this frame. Stream state
    /// is left untouched so the caller can hold, skip or stop.
    #[error("detection unavailable: {0}")]
    DetectionUnavailable(#[source] DetectorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
