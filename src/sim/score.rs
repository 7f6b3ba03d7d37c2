//! Destroyed-target counter

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreKeeper {
    pub destroyed: u32,
    pub threshold: u32,
}

impl ScoreKeeper {
    pub fn new(threshold: u32) -> Self {
        Self {
            destroyed: 0,
            threshold,
        }
    }

    /// Count one destroyed target; true once the win threshold is reached
    pub fn record_hit(&mut self) -> bool {
        self.destroyed += 1;
        self.reached()
    }

    pub fn reached(&self) -> bool {
        self.destroyed >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let mut score = ScoreKeeper::new(3);
        assert!(!score.record_hit());
        assert!(!score.record_hit());
        assert!(score.record_hit());
        assert_eq!(score.destroyed, 3);
    }
}
