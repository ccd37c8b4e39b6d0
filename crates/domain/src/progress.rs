use serde::{Deserialize, Serialize};

use crate::{CountSession, SnapshotId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub checked: usize,
    pub percentage: f64,
}

impl Progress {
    pub fn compute(total: usize, checked: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            (checked as f64 / total as f64 * 1000.0).round() / 10.0
        };
        Self {
            total,
            checked,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session: CountSession,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    pub id: SnapshotId,
    pub part_number: String,
    pub total: usize,
    pub checked_count: usize,
    pub percentage: f64,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_part_has_zero_percent() {
        let progress = Progress::compute(0, 0);
        assert_eq!(progress.percentage, 0.0);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        assert_eq!(Progress::compute(3, 1).percentage, 33.3);
        assert_eq!(Progress::compute(3, 2).percentage, 66.7);
        assert_eq!(Progress::compute(8, 8).percentage, 100.0);
    }
}
