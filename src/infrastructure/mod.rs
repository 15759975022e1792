// Infrastructure implementations for callviz: profile loading, sinks and transports.

pub mod graphviz;
pub mod logging;
pub mod snapshot_source;
pub mod ubigraph;
pub mod xmlrpc;

pub use graphviz::{GraphvizImageSink, GraphvizSourceSink};
pub use snapshot_source::SnapshotSource;
pub use ubigraph::UbigraphSink;
pub use xmlrpc::XmlRpcClient;
