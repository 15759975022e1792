// Core domain for callviz: profile model, weighting, filtering and projection.

pub mod attributes;
pub mod filter;
pub mod grouping;
pub mod profile;
pub mod projection;
pub mod weight;
