/// Flags frames whose count reaches a crowd threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEvaluator {
    threshold: u32,
}

impl AlertEvaluator {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// `true` when `count` is at or above the threshold
    pub fn evaluate(&self, count: u32) -> bool {
        count >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let alert = AlertEvaluator::new(9);
        assert!(!alert.evaluate(8));
        assert!(alert.evaluate(9));
        assert!(alert.evaluate(40));
    }

    #[test]
    fn test_threshold_of_one() {
        let alert = AlertEvaluator::new(1);
        assert!(!alert.evaluate(0));
        assert!(alert.evaluate(1));
        assert_eq!(alert.threshold(), 1);
    }
}
