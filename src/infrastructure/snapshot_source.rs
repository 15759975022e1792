//! JSON Profile Source
//!
//! Loads an aggregated profile from disk and answers normalization queries
//! against the run-wide maxima.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::domain::grouping::group_by_module;
use crate::domain::profile::{fraction, EdgeStat, FractionalMetrics, FunctionStat, Group, ProfileSnapshot};
use crate::ports::StatisticsSource;

/// Run-wide maxima used as normalization denominators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Maxima {
    calls: u64,
    time: f64,
    memory_in: i64,
    memory_out: i64,
}

impl Maxima {
    fn of(functions: &[FunctionStat]) -> Self {
        functions.iter().fold(Maxima::default(), |max, f| Maxima {
            calls: max.calls.max(f.calls),
            time: max.time.max(f.time),
            memory_in: max.memory_in.max(f.memory_in),
            memory_out: max.memory_out.max(f.memory_out),
        })
    }
}

/// Statistics source backed by an in-memory snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    snapshot: ProfileSnapshot,
    maxima: Maxima,
    // name -> index into snapshot.functions
    by_name: HashMap<String, usize>,
    group_by_module: bool,
}

impl SnapshotSource {
    pub fn new(snapshot: ProfileSnapshot) -> Self {
        let maxima = Maxima::of(&snapshot.functions);
        let mut by_name = HashMap::with_capacity(snapshot.functions.len());
        for (idx, func) in snapshot.functions.iter().enumerate() {
            if by_name.insert(func.name.clone(), idx).is_some() {
                warn!(function = %func.name, "duplicate function in profile, keeping the last entry");
            }
        }

        Self {
            snapshot,
            maxima,
            by_name,
            group_by_module: false,
        }
    }

    /// Derive module clusters when the snapshot has no explicit groups.
    pub fn with_module_grouping(mut self, enabled: bool) -> Self {
        self.group_by_module = enabled;
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: ProfileSnapshot =
            serde_json::from_str(content).context("Invalid profile JSON")?;
        Ok(Self::new(snapshot))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let source = Self::from_json(&content)
            .with_context(|| format!("Failed to load profile {}", path.display()))?;
        debug!(
            path = %path.display(),
            functions = source.snapshot.functions.len(),
            edges = source.snapshot.edges.len(),
            "profile loaded"
        );
        Ok(source)
    }

    pub fn snapshot(&self) -> &ProfileSnapshot {
        &self.snapshot
    }

    fn function(&self, name: &str) -> Option<&FunctionStat> {
        self.by_name.get(name).map(|&idx| &self.snapshot.functions[idx])
    }
}

impl StatisticsSource for SnapshotSource {
    fn function_counts(&self) -> &[FunctionStat] {
        &self.snapshot.functions
    }

    fn edge_counts(&self) -> &[EdgeStat] {
        &self.snapshot.edges
    }

    fn groups(&self) -> Vec<Group> {
        if self.snapshot.groups.is_empty() && self.group_by_module {
            group_by_module(&self.snapshot.functions)
        } else {
            self.snapshot.groups.clone()
        }
    }

    fn fractional_metrics(&self, name: &str, calls: u64) -> FractionalMetrics {
        let max = &self.maxima;
        let (time, memory_in, memory_out) = self
            .function(name)
            .map(|f| (f.time, f.memory_in, f.memory_out))
            .unwrap_or((0.0, 0, 0));

        FractionalMetrics {
            calls_frac: unit(fraction(calls as f64, max.calls as f64)),
            time_frac: unit(fraction(time, max.time)),
            time,
            memory_in_frac: unit(fraction(memory_in as f64, max.memory_in as f64)),
            memory_in,
            memory_out_frac: unit(fraction(memory_out as f64, max.memory_out as f64)),
            memory_out,
        }
    }

    fn is_memory_tracked(&self) -> bool {
        self.snapshot.memory_tracked
    }
}

// Edge counts and negative memory deltas can land outside [0,1].
fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SnapshotSource {
        SnapshotSource::new(ProfileSnapshot {
            memory_tracked: true,
            functions: vec![
                FunctionStat::new("app::a", 10, 2.0).with_memory(4096, -100),
                FunctionStat::new("app::b", 5, 0.5).with_memory(1024, 200),
                FunctionStat::new("main", 1, 0.0),
            ],
            edges: vec![EdgeStat::new("", "main", 1), EdgeStat::new("app::a", "app::b", 5)],
            groups: vec![],
        })
    }

    #[test]
    fn test_fractions_against_maxima() {
        let src = source();
        let m = src.fractional_metrics("app::b", 5);
        assert_eq!(m.calls_frac, 0.5);
        assert_eq!(m.time_frac, 0.25);
        assert_eq!(m.time, 0.5);
        assert_eq!(m.memory_in_frac, 0.25);
        assert_eq!(m.memory_out_frac, 1.0);
        assert_eq!(m.memory_out, 200);
    }

    #[test]
    fn test_negative_memory_clamped() {
        let m = source().fractional_metrics("app::a", 10);
        assert_eq!(m.memory_out, -100);
        assert_eq!(m.memory_out_frac, 0.0);
    }

    #[test]
    fn test_unknown_function_has_zero_time() {
        let m = source().fractional_metrics("missing", 10);
        assert_eq!(m.time_frac, 0.0);
        assert_eq!(m.calls_frac, 1.0);
    }

    #[test]
    fn test_zero_maxima_give_zero_fractions() {
        let src = SnapshotSource::new(ProfileSnapshot {
            functions: vec![FunctionStat::new("idle", 0, 0.0)],
            ..Default::default()
        });
        let m = src.fractional_metrics("idle", 0);
        assert_eq!(m.calls_frac, 0.0);
        assert_eq!(m.time_frac, 0.0);
        assert_eq!(m.memory_in_frac, 0.0);
    }

    #[test]
    fn test_module_grouping_only_without_explicit_groups() {
        let grouped = source().with_module_grouping(true);
        let groups = grouped.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "app");

        let mut snapshot = source().snapshot().clone();
        snapshot.groups = vec![Group::new("explicit", &["main"])];
        let explicit = SnapshotSource::new(snapshot).with_module_grouping(true);
        assert_eq!(explicit.groups()[0].name, "explicit");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{"functions": [{"name": "f", "calls": 1, "time": 0.1}]}"#).unwrap();
        let src = SnapshotSource::load(&path).unwrap();
        assert_eq!(src.function_counts().len(), 1);

        fs::write(&path, "not json").unwrap();
        let err = SnapshotSource::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load profile"));
    }
}
