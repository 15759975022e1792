//! Live-mode behaviour against a recording Ubigraph client.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use callviz::application::LiveUsecase;
use callviz::domain::filter::TimeFilter;
use callviz::domain::profile::{EdgeStat, FunctionStat, ProfileSnapshot};
use callviz::domain::projection::{GraphProjector, GraphStyle};
use callviz::domain::weight::node_color;
use callviz::error::RenderError;
use callviz::infrastructure::ubigraph::PLACEHOLDER_VERTICES;
use callviz::infrastructure::{SnapshotSource, UbigraphSink};
use callviz::ports::{OutputSink, UbigraphClient};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Clear,
    Vertex(i64),
    Edge(i64, i64),
    RemoveVertex(i64),
    RemoveEdge(i64),
    Attr(i64, String, String),
}

#[derive(Default)]
struct RecordingClient {
    calls: Vec<Call>,
    next_edge: i64,
}

impl RecordingClient {
    fn vertices(&self) -> Vec<i64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Vertex(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn edges(&self) -> Vec<(i64, i64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Edge(from, to) => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl UbigraphClient for RecordingClient {
    fn clear(&mut self) -> Result<(), RenderError> {
        self.calls.push(Call::Clear);
        Ok(())
    }

    fn new_vertex_w_id(&mut self, id: i64) -> Result<(), RenderError> {
        self.calls.push(Call::Vertex(id));
        Ok(())
    }

    fn new_edge(&mut self, from: i64, to: i64) -> Result<i64, RenderError> {
        self.calls.push(Call::Edge(from, to));
        self.next_edge += 1;
        Ok(self.next_edge)
    }

    fn remove_vertex(&mut self, id: i64) -> Result<(), RenderError> {
        self.calls.push(Call::RemoveVertex(id));
        Ok(())
    }

    fn remove_edge(&mut self, edge_id: i64) -> Result<(), RenderError> {
        self.calls.push(Call::RemoveEdge(edge_id));
        Ok(())
    }

    fn set_vertex_attribute(&mut self, id: i64, key: &str, value: &str) -> Result<(), RenderError> {
        self.calls.push(Call::Attr(id, key.to_string(), value.to_string()));
        Ok(())
    }
}

fn profile(functions: &[(&str, u64, f64)], edges: &[(&str, &str, u64)]) -> SnapshotSource {
    SnapshotSource::new(ProfileSnapshot {
        functions: functions
            .iter()
            .map(|(name, calls, time)| FunctionStat::new(name, *calls, *time))
            .collect(),
        edges: edges
            .iter()
            .map(|(caller, callee, calls)| EdgeStat::new(caller, callee, *calls))
            .collect(),
        ..Default::default()
    })
}

#[test]
fn test_start_seeds_placeholder_ring() {
    let mut sink = UbigraphSink::new(RecordingClient::default(), GraphProjector::default());
    sink.start().unwrap();

    let client = sink.client();
    assert_eq!(client.vertices(), (0..PLACEHOLDER_VERTICES).collect::<Vec<_>>());
    let edges = client.edges();
    assert_eq!(edges.len(), PLACEHOLDER_VERTICES as usize);
    assert_eq!(edges[9], (9, 0));
}

#[test]
fn test_first_update_replaces_placeholder() {
    let mut sink = UbigraphSink::new(RecordingClient::default(), GraphProjector::default());
    sink.start().unwrap();
    let src = profile(&[("a", 10, 1.0), ("b", 5, 0.5)], &[("", "a", 1), ("a", "b", 5)]);

    assert!(sink.should_update(&src));
    sink.update(&src).unwrap();

    let calls = &sink.client().calls;
    let clear_at = calls.iter().position(|c| *c == Call::Clear).unwrap();
    assert_eq!(calls[clear_at + 1], Call::Vertex(PLACEHOLDER_VERTICES));
    assert_eq!(sink.vertex_id("a"), Some(10));
    assert_eq!(sink.vertex_id("b"), Some(11));
    let label = "a\ncalls: 10\ntotal time: 1.000000".to_string();
    assert!(calls.contains(&Call::Attr(10, "label".to_string(), label)));
    let hot = node_color(1.0, 1.0).to_rgb_hex();
    assert_eq!(hot, "#e60000");
    assert!(calls.contains(&Call::Attr(10, "color".to_string(), hot)));
    assert_eq!(sink.client().edges().last(), Some(&(10, 11)));
    assert_eq!(sink.edge_count(), 1);
}

#[test]
fn test_unchanged_profile_is_not_pushed_again() {
    let mut sink = UbigraphSink::new(RecordingClient::default(), GraphProjector::default());
    let src = profile(&[("a", 1, 0.1)], &[]);

    sink.update(&src).unwrap();
    assert!(!sink.should_update(&src));

    let grown = profile(&[("a", 2, 0.2)], &[]);
    assert!(sink.should_update(&grown));
}

#[test]
fn test_only_new_vertices_and_edges_are_created() {
    let mut sink = UbigraphSink::new(RecordingClient::default(), GraphProjector::default());
    sink.update(&profile(&[("a", 1, 0.1)], &[])).unwrap();
    sink.update(&profile(&[("a", 2, 0.2), ("b", 1, 0.1)], &[("a", "b", 1)]))
        .unwrap();
    sink.update(&profile(&[("a", 3, 0.3), ("b", 2, 0.2)], &[("a", "b", 2)]))
        .unwrap();

    let client = sink.client();
    assert_eq!(client.vertices(), vec![10, 11]);
    assert_eq!(client.edges(), vec![(10, 11)]);
    // No placeholder was seeded, so nothing is cleared.
    assert!(!client.calls.contains(&Call::Clear));
}

#[test]
fn test_filtered_functions_get_no_vertex() {
    let projector = GraphProjector::new(GraphStyle::default(), TimeFilter::new(Some(0.9)));
    let mut sink = UbigraphSink::new(RecordingClient::default(), projector);
    sink.update(&profile(&[("hot", 10, 1.0), ("cold", 1, 0.1)], &[("hot", "cold", 1)]))
        .unwrap();

    assert_eq!(sink.vertex_id("hot"), Some(10));
    assert_eq!(sink.vertex_id("cold"), None);
    assert!(sink.client().edges().is_empty());
}

#[test]
fn test_functions_falling_below_threshold_are_removed() {
    let projector = GraphProjector::new(GraphStyle::default(), TimeFilter::new(Some(0.5)));
    let mut sink = UbigraphSink::new(RecordingClient::default(), projector);

    sink.update(&profile(&[("a", 1, 1.0), ("b", 1, 0.9)], &[("a", "b", 1)]))
        .unwrap();
    assert_eq!(sink.vertex_id("b"), Some(11));
    assert_eq!(sink.edge_count(), 1);

    // a's time grows, so b is now below half of the maximum.
    sink.update(&profile(&[("a", 1, 10.0), ("b", 1, 0.9)], &[("a", "b", 1)]))
        .unwrap();
    assert_eq!(sink.vertex_id("a"), Some(10));
    assert_eq!(sink.vertex_id("b"), None);
    assert_eq!(sink.edge_count(), 0);

    let calls = &sink.client().calls;
    let edge_removed = calls.iter().position(|c| *c == Call::RemoveEdge(1)).unwrap();
    let vertex_removed = calls.iter().position(|c| *c == Call::RemoveVertex(11)).unwrap();
    assert!(edge_removed < vertex_removed);
    assert!(!calls.contains(&Call::RemoveVertex(10)));

    // b heats up again and comes back under a fresh id.
    sink.update(&profile(&[("a", 1, 10.0), ("b", 1, 20.0)], &[("a", "b", 1)]))
        .unwrap();
    assert_eq!(sink.vertex_id("b"), Some(12));
    assert_eq!(sink.client().edges().last(), Some(&(10, 12)));
    assert_eq!(sink.edge_count(), 1);
}

#[test]
fn test_edge_to_removed_vertex_is_removed_first() {
    let projector = GraphProjector::new(GraphStyle::default(), TimeFilter::new(Some(0.5)));
    let mut sink = UbigraphSink::new(RecordingClient::default(), projector);

    sink.update(&profile(&[("main", 1, 1.0), ("work", 4, 1.0)], &[("main", "work", 4)]))
        .unwrap();
    // main cools down but the edge into the still-hot callee would pass.
    sink.update(&profile(&[("main", 1, 1.0), ("work", 4, 5.0)], &[("main", "work", 4)]))
        .unwrap();

    assert_eq!(sink.vertex_id("main"), None);
    assert_eq!(sink.vertex_id("work"), Some(11));
    assert_eq!(sink.edge_count(), 0);
    assert!(sink.client().calls.contains(&Call::RemoveEdge(1)));
}

#[test]
fn test_live_usecase_polls_until_tick_limit() {
    let snapshots = Rc::new(RefCell::new(vec![
        profile(&[("a", 1, 0.1)], &[]),
        profile(&[("a", 1, 0.1)], &[]),
        profile(&[("a", 2, 0.2), ("b", 1, 0.1)], &[("a", "b", 1)]),
    ]));
    let feed = Rc::clone(&snapshots);

    let mut sink = UbigraphSink::new(RecordingClient::default(), GraphProjector::default());
    let updates = LiveUsecase {
        sink: &mut sink,
        loader: move || {
            let mut queue = feed.borrow_mut();
            if queue.is_empty() {
                anyhow::bail!("profile not written yet");
            }
            let next = queue.remove(0);
            Ok(next)
        },
        interval: Duration::from_millis(0),
        ticks: Some(4),
    }
    .run()
    .unwrap();

    // Tick 2 repeats tick 1 and tick 4 has no profile: two pushes.
    assert_eq!(updates, 2);
    assert!(snapshots.borrow().is_empty());
    assert_eq!(sink.vertex_id("b"), Some(11));
    assert_eq!(sink.client().calls.iter().filter(|c| **c == Call::Clear).count(), 1);
}
