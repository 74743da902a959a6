pub mod planning_canvas;
pub mod workspace;
