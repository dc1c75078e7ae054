//! Integer exponential smoothing.
//!
//! `filtered += (sample - filtered) / weight`.  Plain integer division
//! stalls up to `weight - 1` counts short of a constant input, so a
//! residual smaller than one step is closed by a single count instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialFilter {
    weight: i32,
    current: i32,
}

impl ExponentialFilter {
    /// New filter at zero.  Weights below 1 are treated as 1 (no smoothing).
    pub fn new(weight: i32) -> Self {
        Self {
            weight: weight.max(1),
            current: 0,
        }
    }

    /// Feed one sample and return the new filtered value.
    pub fn update(&mut self, sample: i32) -> i32 {
        let diff = i64::from(sample) - i64::from(self.current);
        let mut delta = diff / i64::from(self.weight);
        // Departs from plain truncating division so a constant input is
        // reached exactly.
        if delta == 0 {
            delta = diff.signum();
        }
        self.current = (i64::from(self.current) + delta) as i32;
        self.current
    }

    pub fn value(&self) -> i32 {
        self.current
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }
}
