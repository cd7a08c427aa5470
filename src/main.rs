use anyhow::{Context, Result};
use headcount::cli::Args;
use headcount::config::build_config;
use headcount::progress::StreamProgress;
use headcount::runner::{self, FrameSampler};
use headcount::yolo::UslsPersonDetector;
use headcount::StreamAnalyzer;
use log::{info, warn};
use tokio::sync::mpsc;
use usls::DataLoader;

const FRAME_QUEUE: usize = 8;
const EVENT_QUEUE: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = argh::from_env();

    let config = build_config(&args).context("invalid analyzer configuration")?;
    let detector =
        UslsPersonDetector::from_args(&args, &config.resolution).context("failed to load the person detector")?;
    let analyzer = StreamAnalyzer::new(args.camera_id.clone(), config)?;
    info!("[{}] reading {}", args.camera_id, args.source);

    let (frame_tx, frame_rx) = mpsc::channel(FRAME_QUEUE);
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_QUEUE);
    let stream = runner::spawn_stream(analyzer, detector, frame_rx, event_tx);

    let camera_id = args.camera_id.clone();
    let max_frames = args.max_frames;
    let reporter = tokio::spawn(async move {
        let mut progress = match max_frames {
            Some(total) => StreamProgress::new(total, &camera_id),
            None => StreamProgress::new_unknown_total(&camera_id),
        };
        while let Some(event) = event_rx.recv().await {
            match event.outcome {
                Ok(report) => {
                    info!(
                        "[{}] {} frame {}: persons {} heads {} avg {} alert {} imgsz {}",
                        event.camera_id,
                        report.timestamp.format("%H:%M:%S%.3f"),
                        report.frame_index,
                        report.person_count,
                        report.head_count,
                        report.average_count,
                        report.alert,
                        report.imgsz_used
                    );
                    progress.record_report(&report);
                }
                Err(err) => {
                    warn!("[{}] frame skipped: {}", event.camera_id, err);
                    progress.record_failure();
                }
            }
        }
        progress.finish();
    });

    // The loader decodes synchronously, so it feeds the stream from the blocking pool.
    let source = args.source.clone();
    let mut sampler = FrameSampler::new(args.sample_rate);
    let loader = tokio::task::spawn_blocking(move || -> Result<(u64, u64)> {
        let data_loader = DataLoader::new(&source)?.with_batch(1).build()?;
        let mut sent = 0u64;
        'frames: for xs in &data_loader {
            for x in xs.iter() {
                if max_frames.is_some_and(|limit| sent >= limit) {
                    break 'frames;
                }
                if !sampler.admit() {
                    continue;
                }
                if frame_tx.blocking_send(x.to_rgb8()).is_err() {
                    break 'frames;
                }
                sent += 1;
            }
        }
        Ok((sampler.seen(), sent))
    });

    let (read, sent) = loader.await?.context("failed to read frames")?;
    let analyzer = stream.await??;
    reporter.await?;

    info!(
        "[{}] {} frames read, {} sampled, {} analyzed, final average {}",
        analyzer.camera_id(),
        read,
        sent,
        analyzer.frame_index(),
        analyzer.history().average()
    );
    Ok(())
}
