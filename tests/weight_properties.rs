/// Numeric properties of the heat/color mapping and the significance filter.

use callviz::domain::filter::TimeFilter;
use callviz::domain::profile::{FunctionStat, ProfileSnapshot};
use callviz::domain::projection::{human_readable_size, GraphProjector};
use callviz::domain::weight::{edge_color, heat, node_color};
use callviz::infrastructure::SnapshotSource;
use proptest::prelude::*;

proptest! {
    #[test]
    fn heat_and_hue_stay_in_range(c in 0.0f64..=1.0, t in 0.0f64..=1.0) {
        let value = heat(c, t);
        prop_assert!((0.0..=1.0).contains(&value));

        let node = node_color(c, t);
        prop_assert!(node.h >= 0.5 && node.h <= 1.0);
        prop_assert_eq!(node.s, value);
        prop_assert_eq!(node.v, 0.9);
        prop_assert_eq!(edge_color(c, t).v, 0.7);
    }

    #[test]
    fn node_filter_is_monotonic(time_frac in 0.0f64..=1.0, tau in 0.0f64..=1.0, lower in 0.0f64..=1.0) {
        let lower = tau * lower;
        if TimeFilter::new(Some(tau)).passes_node(time_frac) {
            prop_assert!(TimeFilter::new(Some(lower)).passes_node(time_frac));
        }
        if TimeFilter::new(Some(tau)).passes_edge(time_frac) {
            prop_assert!(TimeFilter::new(Some(lower)).passes_edge(time_frac));
        }
    }

    #[test]
    fn filter_equality_boundary(tau in 0.0f64..=1.0) {
        let filter = TimeFilter::new(Some(tau));
        prop_assert!(filter.passes_node(tau));
        prop_assert!(!filter.passes_edge(tau));
    }

    #[test]
    fn generation_is_deterministic(
        stats in prop::collection::vec((1u64..1000, 0.0f64..10.0), 1..20),
        threshold in prop::option::of(0.0f64..=1.0),
    ) {
        let functions = stats
            .iter()
            .enumerate()
            .map(|(i, (calls, time))| FunctionStat::new(&format!("mod{}::f{}", i % 3, i), *calls, *time))
            .collect();
        let source = SnapshotSource::new(ProfileSnapshot { functions, ..Default::default() })
            .with_module_grouping(true);
        let projector = GraphProjector::new(Default::default(), TimeFilter::new(threshold));

        prop_assert_eq!(projector.generate(&source), projector.generate(&source));
    }
}

#[test]
fn test_human_readable_size_examples() {
    assert_eq!(human_readable_size(1024), "1.0KB");
    assert_eq!(human_readable_size(0), "0.0B");
}
