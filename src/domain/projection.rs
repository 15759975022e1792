//! Graph Projection
//!
//! Turns an aggregated profile into a weighted, filtered graph and serializes
//! it as a Graphviz DOT document. Output is byte-for-byte stable for identical
//! input: every section follows the source's iteration order.

use tracing::debug;

use crate::config::RenderConfig;
use crate::domain::attributes::{escape_id, AttrKey, AttrList};
use crate::domain::filter::TimeFilter;
use crate::domain::profile::Group;
use crate::domain::weight::{edge_color, node_color, Hsv};
use crate::ports::StatisticsSource;

/// Fixed styling shared by every projection.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    pub font_name: String,
    pub font_size: u32,
    pub group_font_size: u32,
    pub group_border_color: String,
    pub title: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl GraphStyle {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            font_name: config.font_name.clone(),
            font_size: config.font_size,
            group_font_size: config.group_font_size,
            group_border_color: config.group_border_color.clone(),
            title: format!("Generated by callviz v{}", env!("CARGO_PKG_VERSION")),
        }
    }

    fn graph_defaults(&self) -> AttrList {
        AttrList::new()
            .with(AttrKey::Overlap, "scalexy")
            .with(AttrKey::FontName, &self.font_name)
            .with(AttrKey::FontSize, self.font_size)
            .with(AttrKey::FontColor, "0 0 0.5")
            .with(AttrKey::Label, &self.title)
    }

    fn node_defaults(&self) -> AttrList {
        AttrList::new()
            .with(AttrKey::FontName, &self.font_name)
            .with(AttrKey::FontSize, self.font_size)
            .with(AttrKey::Color, ".5 0 .9")
            .with(AttrKey::Style, "filled")
            .with(AttrKey::Shape, "rect")
    }

    fn edge_defaults(&self) -> AttrList {
        AttrList::new()
            .with(AttrKey::FontName, &self.font_name)
            .with(AttrKey::FontSize, self.font_size)
            .with(AttrKey::Color, "0 0 0")
    }
}

/// Node label layout, fixed before any node is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelTemplate {
    memory: bool,
}

impl LabelTemplate {
    pub fn new(memory: bool) -> Self {
        Self { memory }
    }

    pub fn includes_memory(&self) -> bool {
        self.memory
    }

    /// Lines are separated by a literal `\n`, which Graphviz turns into line breaks.
    pub fn render(&self, func: &str, hits: u64, total_time: f64, memory_in: i64, memory_out: i64) -> String {
        let mut label = format!(
            "{}\\ncalls: {}\\ntotal time: {:.6}",
            func.replace('\\', "\\\\"),
            hits,
            total_time
        );
        if self.memory {
            label.push_str(&format!(
                "\\nmemory in: {}\\nmemory out: {}",
                human_readable_size(memory_in),
                human_readable_size(memory_out)
            ));
        }
        label
    }
}

/// A node that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub name: String,
    pub label: String,
    pub color: Hsv,
}

/// An edge that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedEdge {
    pub caller: String,
    pub callee: String,
    pub calls: u64,
    pub color: Hsv,
}

/// Everything a sink needs to draw the graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectedGraph {
    pub groups: Vec<Group>,
    pub nodes: Vec<ProjectedNode>,
    pub edges: Vec<ProjectedEdge>,
}

/// Projects a profile into a weighted graph.
#[derive(Debug, Clone, Default)]
pub struct GraphProjector {
    style: GraphStyle,
    filter: TimeFilter,
}

impl GraphProjector {
    pub fn new(style: GraphStyle, filter: TimeFilter) -> Self {
        Self { style, filter }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(GraphStyle::from_config(config), TimeFilter::new(config.threshold))
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    pub fn filter(&self) -> TimeFilter {
        self.filter
    }

    /// Compute colors and labels, then drop whatever the filter rejects.
    pub fn project(&self, source: &dyn StatisticsSource) -> ProjectedGraph {
        let template = LabelTemplate::new(source.is_memory_tracked());

        let mut nodes = Vec::new();
        for func in source.function_counts() {
            let metrics = source.fractional_metrics(&func.name, func.calls);
            let color = node_color(metrics.calls_frac, metrics.time_frac);
            let label = template.render(
                &func.name,
                func.calls,
                metrics.time,
                metrics.memory_in,
                metrics.memory_out,
            );
            if self.filter.passes_node(metrics.time_frac) {
                nodes.push(ProjectedNode {
                    name: func.name.clone(),
                    label,
                    color,
                });
            }
        }

        let mut edges = Vec::new();
        for edge in source.edge_counts() {
            if edge.is_synthetic_root() {
                continue;
            }
            let metrics = source.fractional_metrics(&edge.callee, edge.calls);
            let color = edge_color(metrics.calls_frac, metrics.time_frac);
            if self.filter.passes_edge(metrics.time_frac) {
                edges.push(ProjectedEdge {
                    caller: edge.caller.clone(),
                    callee: edge.callee.clone(),
                    calls: edge.calls,
                    color,
                });
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            functions = source.function_counts().len(),
            "graph projected"
        );

        ProjectedGraph {
            groups: source.groups(),
            nodes,
            edges,
        }
    }

    /// Build the complete DOT document for `source`.
    pub fn generate(&self, source: &dyn StatisticsSource) -> String {
        self.render(&self.project(source))
    }

    /// Serialize an already projected graph.
    pub fn render(&self, graph: &ProjectedGraph) -> String {
        let defaults = [
            ("graph", self.style.graph_defaults()),
            ("node", self.style.node_defaults()),
            ("edge", self.style.edge_defaults()),
        ]
        .iter()
        .map(|(target, attrs)| format!("{} [ {} ];", target, attrs.to_default_block()))
        .collect::<Vec<_>>();

        let groups = graph
            .groups
            .iter()
            .map(|group| self.cluster_statement(group))
            .collect::<Vec<_>>();

        let nodes = graph
            .nodes
            .iter()
            .map(|node| {
                let attrs = AttrList::new()
                    .with(AttrKey::Color, node.color)
                    .with(AttrKey::Label, &node.label);
                format!("\"{}\" [{}];", escape_id(&node.name), attrs.to_inline())
            })
            .collect::<Vec<_>>();

        let edges = graph
            .edges
            .iter()
            .map(|edge| {
                let attrs = AttrList::new()
                    .with(AttrKey::Color, edge.color)
                    .with(AttrKey::Label, edge.calls);
                format!(
                    "\"{}\" -> \"{}\" [{}];",
                    escape_id(&edge.caller),
                    escape_id(&edge.callee),
                    attrs.to_inline()
                )
            })
            .collect::<Vec<_>>();

        format!(
            "digraph G {{\n\t{}\n\n\t{}\n\n\t{}\n\n\t{}\n}}\n",
            defaults.join("\n\t"),
            groups.join("\n\t"),
            nodes.join("\n\t"),
            edges.join("\n\t"),
        )
    }

    fn cluster_statement(&self, group: &Group) -> String {
        let name = escape_id(&group.name);
        let members = if group.members.is_empty() {
            String::new()
        } else {
            let quoted = group
                .members
                .iter()
                .map(|m| format!("\"{}\"", escape_id(m)))
                .collect::<Vec<_>>();
            format!("{}; ", quoted.join(" "))
        };

        format!(
            "subgraph \"cluster_{name}\" {{ {members}label = \"{name}\"; node [style=filled]; \
             fontsize = \"{}\"; fontcolor = \"black\"; color=\"{}\"; }}",
            self.style.group_font_size, self.style.group_border_color,
        )
    }
}

/// Byte count abbreviated in 1024 steps, e.g. `1.0KB`.
pub fn human_readable_size(bytes: i64) -> String {
    let mut num = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if num.abs() < 1024.0 {
            return format!("{:.1}{}", num, unit);
        }
        num /= 1024.0;
    }
    format!("{:.1}TB", num)
}
