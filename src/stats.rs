use serde::{Deserialize, Serialize};

/// Streaming mean and standard deviation (Welford's update).
pub struct Accumulator {
    count: usize,
    mean: f64,
    sum_sq_diff: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub mean: f64,
    pub std_dev: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            sum_sq_diff: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.count += 1;

        let diff_before = val - self.mean;
        self.mean += diff_before / self.count as f64;

        let diff_after = val - self.mean;
        self.sum_sq_diff += diff_before * diff_after;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            mean: self.mean,
            std_dev: if self.count > 1 {
                (self.sum_sq_diff / (self.count as f64 - 1.0)).sqrt()
            } else {
                f64::NAN
            },
        }
    }
}
