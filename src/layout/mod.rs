//! Layered layout of the planning graph.

mod adapter;
mod config;
mod layered;

pub use adapter::{Layout, layout_elements};
pub use config::{ConfigError, Direction, Footprint, LayoutConfig, Side};
pub use layered::{LayeredGraph, Point, Solution};
