//! Minimum-significance filter.
//!
//! Drops nodes and edges from rendered output when their time fraction is
//! below a threshold. The statistics themselves are never touched.

/// Optional time-fraction cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeFilter {
    pub fraction: Option<f64>,
}

impl TimeFilter {
    pub fn new(fraction: Option<f64>) -> Self {
        Self { fraction }
    }

    pub fn disabled() -> Self {
        Self { fraction: None }
    }

    /// Nodes at exactly the threshold are kept.
    pub fn passes_node(&self, time_frac: f64) -> bool {
        match self.fraction {
            None => true,
            Some(threshold) => threshold <= time_frac,
        }
    }

    /// Edges at exactly the threshold are dropped; edge sets grow faster than node sets.
    pub fn passes_edge(&self, time_frac: f64) -> bool {
        match self.fraction {
            None => true,
            Some(threshold) => threshold < time_frac,
        }
    }
}
