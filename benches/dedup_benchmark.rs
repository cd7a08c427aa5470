use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use headcount::config::AnalyzerConfig;
use headcount::dedup::NmsStrategy;
use headcount::detector::Detections;
use headcount::geometry::{BoundingBox, HeadCircle};
use headcount::{FrameView, StreamAnalyzer};

// Mock data for benchmarking
fn create_mock_candidates(count: usize) -> Vec<HeadCircle> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state % 10_000) as f32 / 10_000.0
    };
    (0..count)
        .map(|_| HeadCircle::new(next() * 1920.0, next() * 1080.0, 6.0 + next() * 30.0))
        .collect()
}

fn create_mock_boxes(count: usize) -> Vec<BoundingBox> {
    (0..count as i32)
        .map(|i| {
            let x = (i % 24) * 80;
            let y = (i / 24) * 180;
            BoundingBox::new(x, y, x + 60, y + 170)
        })
        .collect()
}

fn benchmark_suppression(c: &mut Criterion) {
    let mut group = c.benchmark_group("suppression");

    // Below, between and above the density thresholds
    for candidate_count in [20, 90, 150, 400].iter() {
        let candidates = create_mock_candidates(*candidate_count);

        group.bench_with_input(
            BenchmarkId::new("distance", candidate_count),
            &candidates,
            |b, candidates| {
                let strategy = NmsStrategy::Distance { factor: 0.8 };
                b.iter(|| black_box(strategy.suppress(black_box(candidates))))
            },
        );

        group.bench_with_input(BenchmarkId::new("area", candidate_count), &candidates, |b, candidates| {
            let strategy = NmsStrategy::Area { iou_threshold: 0.3 };
            b.iter(|| black_box(strategy.suppress(black_box(candidates))))
        });
    }

    group.finish();
}

fn benchmark_frame_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_ingest");

    for box_count in [10, 60, 140].iter() {
        let detections = Detections::new(create_mock_boxes(*box_count));
        group.bench_with_input(BenchmarkId::new("ingest", box_count), &detections, |b, detections| {
            let mut analyzer = StreamAnalyzer::new("bench", AnalyzerConfig::default()).unwrap();
            b.iter(|| black_box(analyzer.ingest(black_box(detections), FrameView::dimensions(1920, 1080))))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_suppression, benchmark_frame_ingest);
criterion_main!(benches);
