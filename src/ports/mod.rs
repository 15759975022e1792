use crate::domain::profile::{EdgeStat, FractionalMetrics, FunctionStat, Group};
use crate::error::RenderError;

/// Read-only view over an aggregated profile.
pub trait StatisticsSource {
    /// Functions in the order the profiler recorded them.
    fn function_counts(&self) -> &[FunctionStat];
    /// Caller -> callee traffic; entries with an empty caller are synthetic roots.
    fn edge_counts(&self) -> &[EdgeStat];
    fn groups(&self) -> Vec<Group>;
    /// Normalize `calls` and the totals recorded for `name` against the run maxima.
    fn fractional_metrics(&self, name: &str, calls: u64) -> FractionalMetrics;
    fn is_memory_tracked(&self) -> bool;
}

/// Something externally visible done with a projected graph.
///
/// Lifecycle: `sanity_check`, `start`, zero or more `update`s while
/// `should_update` holds, then `done`.
pub trait OutputSink {
    fn sanity_check(&self) -> Result<(), RenderError> {
        Ok(())
    }

    fn start(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    fn should_update(&self, _source: &dyn StatisticsSource) -> bool {
        false
    }

    fn update(&mut self, _source: &dyn StatisticsSource) -> Result<(), RenderError> {
        Ok(())
    }

    fn done(&mut self, source: &dyn StatisticsSource) -> Result<(), RenderError>;
}

/// Remote procedures of an Ubigraph server used by live mode.
pub trait UbigraphClient {
    fn clear(&mut self) -> Result<(), RenderError>;
    fn new_vertex_w_id(&mut self, id: i64) -> Result<(), RenderError>;
    /// Returns the server-assigned edge id.
    fn new_edge(&mut self, from: i64, to: i64) -> Result<i64, RenderError>;
    /// Also drops the vertex's incident edges on the server.
    fn remove_vertex(&mut self, id: i64) -> Result<(), RenderError>;
    fn remove_edge(&mut self, edge_id: i64) -> Result<(), RenderError>;
    fn set_vertex_attribute(&mut self, id: i64, key: &str, value: &str) -> Result<(), RenderError>;
}
