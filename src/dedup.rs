use crate::config::{AnalyzerConfig, NmsMode};
use crate::geometry::HeadCircle;
use log::debug;

/// Candidate count above which suppression gets stricter
const DENSE_CANDIDATES: usize = 60;
/// Candidate count above which suppression gets strictest
const CROWDED_CANDIDATES: usize = 120;

/// Non-maximum suppression over head circles, largest radius first
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NmsStrategy {
    /// Keep a circle only if its center is at least `min(r_a, r_b) * factor`
    /// away from every kept circle. The factor grows with candidate count.
    Distance { factor: f32 },
    /// Keep a circle only if its IoU with every kept circle is at most `iou_threshold`
    Area { iou_threshold: f32 },
}

impl NmsStrategy {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        match config.nms_mode {
            NmsMode::Distance => Self::Distance {
                factor: config.circle_nms_factor,
            },
            NmsMode::Area => Self::Area {
                iou_threshold: config.nms_iou,
            },
        }
    }

    /// Removes redundant candidates. The output order is not meaningful.
    pub fn suppress(&self, candidates: &[HeadCircle]) -> Vec<HeadCircle> {
        match *self {
            Self::Distance { factor } => {
                let effective = effective_distance_factor(factor, candidates.len());
                debug!(
                    "distance nms over {} candidates, factor {:.3} -> {:.3}",
                    candidates.len(),
                    factor,
                    effective
                );
                suppress_by_distance(candidates, effective)
            }
            Self::Area { iou_threshold } => suppress_by_area(candidates, iou_threshold),
        }
    }
}

/// Scales the distance factor up for crowded frames to keep false positives
/// from multiplying.
pub fn effective_distance_factor(factor: f32, candidate_count: usize) -> f32 {
    if candidate_count > CROWDED_CANDIDATES {
        factor.max(0.9) * 1.25
    } else if candidate_count > DENSE_CANDIDATES {
        factor.max(0.85) * 1.1
    } else {
        factor
    }
}

/// Greedy distance suppression with a fixed `factor`, no density scaling
pub fn suppress_by_distance(candidates: &[HeadCircle], factor: f32) -> Vec<HeadCircle> {
    greedy(candidates, |candidate, kept| {
        candidate.distance_to(kept) >= candidate.r.min(kept.r) * factor
    })
}

/// Greedy IoU suppression
pub fn suppress_by_area(candidates: &[HeadCircle], iou_threshold: f32) -> Vec<HeadCircle> {
    greedy(candidates, |candidate, kept| candidate.iou(kept) <= iou_threshold)
}

fn greedy<F>(candidates: &[HeadCircle], compatible: F) -> Vec<HeadCircle>
where
    F: Fn(&HeadCircle, &HeadCircle) -> bool,
{
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| b.r.total_cmp(&a.r));

    let mut kept: Vec<HeadCircle> = Vec::with_capacity(ordered.len());
    for candidate in ordered {
        if kept.iter().all(|k| compatible(&candidate, k)) {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic scatter of circles for property checks
    fn scatter(count: usize, seed: u64) -> Vec<HeadCircle> {
        let mut state = seed;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f32) / (u32::MAX >> 1) as f32
        };
        (0..count)
            .map(|_| HeadCircle::new(next() * 400.0, next() * 300.0, 4.0 + next() * 20.0))
            .collect()
    }

    fn grid(cols: usize, rows: usize, spacing: f32, r: f32) -> Vec<HeadCircle> {
        (0..rows)
            .flat_map(|row| (0..cols).map(move |col| HeadCircle::new(col as f32 * spacing, row as f32 * spacing, r)))
            .collect()
    }

    #[test]
    fn test_close_equal_circles_collapse() {
        let candidates = [HeadCircle::new(100.0, 100.0, 10.0), HeadCircle::new(105.0, 100.0, 10.0)];
        let kept = NmsStrategy::Distance { factor: 0.8 }.suppress(&candidates);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_distance_exactly_at_threshold_is_kept() {
        let candidates = [HeadCircle::new(0.0, 0.0, 10.0), HeadCircle::new(5.0, 0.0, 10.0)];
        assert_eq!(suppress_by_distance(&candidates, 0.5).len(), 2);
        assert_eq!(suppress_by_distance(&candidates, 0.75).len(), 1);
    }

    #[test]
    fn test_largest_radius_wins() {
        let candidates = [
            HeadCircle::new(50.0, 50.0, 6.0),
            HeadCircle::new(52.0, 50.0, 14.0),
            HeadCircle::new(49.0, 51.0, 9.0),
        ];
        let kept = suppress_by_distance(&candidates, 0.8);
        assert_eq!(kept, vec![HeadCircle::new(52.0, 50.0, 14.0)]);
    }

    #[test]
    fn test_effective_factor_by_density() {
        assert_eq!(effective_distance_factor(0.8, 60), 0.8);
        assert!((effective_distance_factor(0.8, 61) - 0.935).abs() < 1e-6);
        assert!((effective_distance_factor(0.8, 120) - 0.935).abs() < 1e-6);
        assert!((effective_distance_factor(0.8, 121) - 1.125).abs() < 1e-6);
        assert!((effective_distance_factor(1.2, 150) - 1.5).abs() < 1e-6);
        assert!((effective_distance_factor(1.0, 90) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_crowded_frames_suppress_harder() {
        // 150 candidates, 9 px apart: every pair clears 10 * 0.8 but not 10 * 1.125
        let candidates = grid(15, 10, 9.0, 10.0);
        assert_eq!(candidates.len(), 150);

        let at_base = suppress_by_distance(&candidates, 0.8);
        let scaled = NmsStrategy::Distance { factor: 0.8 }.suppress(&candidates);
        assert_eq!(at_base.len(), 150);
        // Only a checkerboard survives 11.25 px spacing
        assert_eq!(scaled.len(), 75);
    }

    #[test]
    fn test_distance_output_respects_effective_factor() {
        for (count, seed) in [(20, 1), (90, 2), (200, 3)] {
            let candidates = scatter(count, seed);
            let kept = NmsStrategy::Distance { factor: 0.8 }.suppress(&candidates);
            let factor = effective_distance_factor(0.8, count);
            for (i, a) in kept.iter().enumerate() {
                for b in &kept[i + 1..] {
                    assert!(a.distance_to(b) >= a.r.min(b.r) * factor);
                }
            }
        }
    }

    #[test]
    fn test_area_output_respects_iou_threshold() {
        let candidates = scatter(150, 7);
        let kept = NmsStrategy::Area { iou_threshold: 0.3 }.suppress(&candidates);
        assert!(!kept.is_empty());
        assert!(kept.len() < candidates.len());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(a.iou(b) <= 0.3);
            }
        }
    }

    #[test]
    fn test_area_mode_drops_nested_circle() {
        let candidates = [HeadCircle::new(0.0, 0.0, 20.0), HeadCircle::new(1.0, 0.0, 15.0)];
        // IoU = 225 / 400
        let kept = suppress_by_area(&candidates, 0.5);
        assert_eq!(kept, vec![HeadCircle::new(0.0, 0.0, 20.0)]);
        assert_eq!(suppress_by_area(&candidates, 0.6).len(), 2);
    }

    #[test]
    fn test_strategy_from_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(NmsStrategy::from_config(&config), NmsStrategy::Distance { factor: 0.8 });
        let config = config.with_nms_mode(NmsMode::Area).with_nms_iou(0.4);
        assert_eq!(NmsStrategy::from_config(&config), NmsStrategy::Area { iou_threshold: 0.4 });
    }

    #[test]
    fn test_empty_candidates() {
        assert!(NmsStrategy::Distance { factor: 0.8 }.suppress(&[]).is_empty());
        assert!(NmsStrategy::Area { iou_threshold: 0.3 }.suppress(&[]).is_empty());
    }
}
