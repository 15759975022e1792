//! Live Ubigraph output.
//!
//! Pushes vertices and edges to a running Ubigraph server as the profile
//! grows. Each update reconciles the server with the projected graph, so
//! functions that fall below the threshold are taken down again.
//! Intermediate states may be visually inconsistent; the server converges
//! once the profile stops changing.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::domain::projection::GraphProjector;
use crate::error::RenderError;
use crate::ports::{OutputSink, StatisticsSource, UbigraphClient};

/// Vertices in the placeholder ring shown before the first real update.
pub const PLACEHOLDER_VERTICES: i64 = 10;

/// Cheap fingerprint used to decide whether the profile changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotDigest {
    pub functions: usize,
    pub edges: usize,
    pub total_calls: u64,
    pub total_time: f64,
}

impl SnapshotDigest {
    pub fn of(source: &dyn StatisticsSource) -> Self {
        let functions = source.function_counts();
        Self {
            functions: functions.len(),
            edges: source.edge_counts().len(),
            total_calls: functions.iter().map(|f| f.calls).sum(),
            total_time: functions.iter().map(|f| f.time).sum(),
        }
    }
}

/// Ubigraph labels take real line breaks, not DOT `\n` escapes.
fn vertex_label(label: &str) -> String {
    label.replace("\\n", "\n")
}

pub struct UbigraphSink<C: UbigraphClient> {
    client: C,
    projector: GraphProjector,
    vertices: HashMap<String, i64>,
    /// Server edge id per shown (caller, callee) pair.
    edges: HashMap<(String, String), i64>,
    next_vertex_id: i64,
    showing_placeholder: bool,
    last_digest: Option<SnapshotDigest>,
}

impl<C: UbigraphClient> UbigraphSink<C> {
    pub fn new(client: C, projector: GraphProjector) -> Self {
        Self {
            client,
            projector,
            vertices: HashMap::new(),
            edges: HashMap::new(),
            next_vertex_id: PLACEHOLDER_VERTICES,
            showing_placeholder: false,
            last_digest: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Vertex id assigned to `function`, if it has been pushed.
    pub fn vertex_id(&self, function: &str) -> Option<i64> {
        self.vertices.get(function).copied()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl<C: UbigraphClient> OutputSink for UbigraphSink<C> {
    fn start(&mut self) -> Result<(), RenderError> {
        for i in 0..PLACEHOLDER_VERTICES {
            self.client.new_vertex_w_id(i)?;
        }
        for i in 0..PLACEHOLDER_VERTICES {
            self.client.new_edge(i, (i + 1) % PLACEHOLDER_VERTICES)?;
        }
        self.showing_placeholder = true;
        info!(vertices = PLACEHOLDER_VERTICES, "ubigraph placeholder seeded");
        Ok(())
    }

    fn should_update(&self, source: &dyn StatisticsSource) -> bool {
        self.last_digest != Some(SnapshotDigest::of(source))
    }

    fn update(&mut self, source: &dyn StatisticsSource) -> Result<(), RenderError> {
        if self.showing_placeholder {
            self.client.clear()?;
            self.showing_placeholder = false;
        }

        let graph = self.projector.project(source);
        let shown: HashSet<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
        let linked: HashSet<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.caller.as_str(), e.callee.as_str()))
            .filter(|(caller, callee)| shown.contains(caller) && shown.contains(callee))
            .collect();

        // Edges first: removing a vertex drops its edges on the server too.
        let mut stale_edges: Vec<(String, String)> = self
            .edges
            .keys()
            .filter(|(caller, callee)| !linked.contains(&(caller.as_str(), callee.as_str())))
            .cloned()
            .collect();
        stale_edges.sort();
        for key in &stale_edges {
            if let Some(&edge_id) = self.edges.get(key) {
                self.client.remove_edge(edge_id)?;
                self.edges.remove(key);
            }
        }

        let mut stale_vertices: Vec<String> = self
            .vertices
            .keys()
            .filter(|name| !shown.contains(name.as_str()))
            .cloned()
            .collect();
        stale_vertices.sort();
        for name in &stale_vertices {
            if let Some(&id) = self.vertices.get(name) {
                self.client.remove_vertex(id)?;
                self.vertices.remove(name);
            }
        }

        let mut new_vertices = 0;
        for node in &graph.nodes {
            let id = match self.vertices.get(&node.name) {
                Some(&id) => id,
                None => {
                    let id = self.next_vertex_id;
                    self.client.new_vertex_w_id(id)?;
                    self.vertices.insert(node.name.clone(), id);
                    self.next_vertex_id += 1;
                    new_vertices += 1;
                    id
                }
            };
            self.client
                .set_vertex_attribute(id, "label", &vertex_label(&node.label))?;
            self.client
                .set_vertex_attribute(id, "color", &node.color.to_rgb_hex())?;
        }

        let mut new_edges = 0;
        for edge in &graph.edges {
            let key = (edge.caller.clone(), edge.callee.clone());
            if self.edges.contains_key(&key) {
                continue;
            }
            let (Some(&from), Some(&to)) = (self.vertices.get(&edge.caller), self.vertices.get(&edge.callee)) else {
                debug!(caller = %edge.caller, callee = %edge.callee, "edge endpoint not shown");
                continue;
            };
            let edge_id = self.client.new_edge(from, to)?;
            self.edges.insert(key, edge_id);
            new_edges += 1;
        }

        self.last_digest = Some(SnapshotDigest::of(source));
        info!(
            new_vertices,
            new_edges,
            removed_vertices = stale_vertices.len(),
            removed_edges = stale_edges.len(),
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "ubigraph updated"
        );
        Ok(())
    }

    fn done(&mut self, _source: &dyn StatisticsSource) -> Result<(), RenderError> {
        info!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            "ubigraph session finished"
        );
        Ok(())
    }
}
