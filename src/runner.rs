use crate::analyzer::{FrameReport, StreamAnalyzer};
use crate::detector::PersonDetector;
use crate::error::AnalyzerError;
use image::RgbImage;
use log::{debug, info};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

/// Admits every `rate`th frame read from a source, counting from one.
///
/// A rate of 0 or 1 admits every frame.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    rate: u64,
    seen: u64,
}

impl FrameSampler {
    pub fn new(rate: u64) -> Self {
        Self { rate: rate.max(1), seen: 0 }
    }

    /// Records one read frame and says whether it should be analyzed
    pub fn admit(&mut self) -> bool {
        self.seen += 1;
        self.seen % self.rate == 0
    }

    /// Frames read so far, admitted or not
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

/// One frame's outcome, tagged with the stream it came from
#[derive(Debug)]
pub struct StreamEvent {
    pub camera_id: String,
    pub outcome: Result<FrameReport, AnalyzerError>,
}

/// Runs one stream on its own task.
///
/// Frames are analyzed one at a time in arrival order on the blocking pool,
/// since detection and refinement are CPU bound. The task finishes when the
/// frame channel closes or nobody listens for events anymore, and hands the
/// analyzer back so its final state can be inspected.
pub fn spawn_stream<D>(
    mut analyzer: StreamAnalyzer,
    mut detector: D,
    mut frames: mpsc::Receiver<RgbImage>,
    events: mpsc::Sender<StreamEvent>,
) -> JoinHandle<Result<StreamAnalyzer, JoinError>>
where
    D: PersonDetector + Send + 'static,
{
    tokio::spawn(async move {
        let camera_id = analyzer.camera_id().to_string();
        info!("[{}] stream started at imgsz {}", camera_id, analyzer.imgsz());

        while let Some(frame) = frames.recv().await {
            let (returned_analyzer, returned_detector, outcome) = tokio::task::spawn_blocking(move || {
                let outcome = analyzer.process(&mut detector, Some(&frame));
                (analyzer, detector, outcome)
            })
            .await?;
            analyzer = returned_analyzer;
            detector = returned_detector;

            let event = StreamEvent {
                camera_id: camera_id.clone(),
                outcome,
            };
            if events.send(event).await.is_err() {
                debug!("[{}] event receiver dropped", camera_id);
                break;
            }
        }

        info!("[{}] stream ended after {} frames", camera_id, analyzer.frame_index());
        Ok::<_, JoinError>(analyzer)
    })
}
