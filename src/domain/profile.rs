// Profile structures for callviz.
// An aggregated call profile: per-function totals, caller/callee traffic and groups.

use serde::{Deserialize, Serialize};

/// Per-function totals for one profiling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStat {
    pub name: String, // fully-qualified function name, unique within a run
    pub calls: u64,
    pub time: f64, // cumulative seconds
    #[serde(default)]
    pub memory_in: i64,
    #[serde(default)]
    pub memory_out: i64,
}

impl FunctionStat {
    pub fn new(name: &str, calls: u64, time: f64) -> Self {
        Self {
            name: name.to_string(),
            calls,
            time,
            memory_in: 0,
            memory_out: 0,
        }
    }

    pub fn with_memory(mut self, memory_in: i64, memory_out: i64) -> Self {
        self.memory_in = memory_in;
        self.memory_out = memory_out;
        self
    }
}

/// Traffic along one caller -> callee relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStat {
    /// Empty for the synthetic program-entry edge.
    #[serde(default)]
    pub caller: String,
    pub callee: String,
    pub calls: u64,
}

impl EdgeStat {
    pub fn new(caller: &str, callee: &str, calls: u64) -> Self {
        Self {
            caller: caller.to_string(),
            callee: callee.to_string(),
            calls,
        }
    }

    /// Entry edges have no caller and never appear in rendered output.
    pub fn is_synthetic_root(&self) -> bool {
        self.caller.is_empty()
    }
}

/// A named cluster of functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Raw counters normalized against the run-wide maxima.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FractionalMetrics {
    pub calls_frac: f64,
    pub time_frac: f64,
    pub time: f64,
    pub memory_in_frac: f64,
    pub memory_in: i64,
    pub memory_out_frac: f64,
    pub memory_out: i64,
}

/// A complete, immutable profile as produced by the aggregation engine.
///
/// Every collection is a `Vec` so that the order in which the profiler
/// recorded things is the order in which they are rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub memory_tracked: bool,
    #[serde(default)]
    pub functions: Vec<FunctionStat>,
    #[serde(default)]
    pub edges: Vec<EdgeStat>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Ratio against a maximum, defined as 0 when the maximum is 0.
pub fn fraction(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}
