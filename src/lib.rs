//! Crowd head counting over live video.
//!
//! Person boxes from an external detector are turned into deduplicated head
//! circles, a smoothed per-stream count and a density alert, while the
//! detector's input resolution is adapted to hold a target frame rate.

pub mod alert;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod detector;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod geometry;
pub mod head;
pub mod history;
pub mod hough;
pub mod progress;
pub mod refine;
pub mod resolution;
pub mod runner;
#[cfg(feature = "usls")]
pub mod yolo;

pub use analyzer::{FrameReport, FrameView, StreamAnalyzer};
pub use config::{AnalyzerConfig, CountMode, NmsMode};
pub use dedup::NmsStrategy;
pub use detector::{Detections, PersonDetector};
pub use error::{AnalyzerError, ConfigError, DetectorError, ForecastError};
pub use forecast::{ForecastGate, Forecaster};
pub use geometry::{BoundingBox, HeadCircle};
pub use history::CountHistory;
