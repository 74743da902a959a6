mod component;
mod geometry;
mod render;
mod state;

pub use component::PlanningCanvas;
